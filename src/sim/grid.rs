/// Grid connection rules: export rate limit, rolling monthly export quota,
/// and an optional import cap.
///
/// The quota resets every `month_length_days` simulated days. Import is
/// unconstrained unless `import_limit_kw` is set.
#[derive(Debug, Clone, PartialEq)]
pub struct GridPolicy {
    export_rate_limit_kw: f64,
    monthly_export_quota_kwh: f64,
    exported_this_month_kwh: f64,
    month_index: u64,
    month_length_days: u64,
    import_limit_kw: Option<f64>,
}

impl GridPolicy {
    /// Creates a grid policy with unconstrained import.
    ///
    /// # Panics
    ///
    /// Panics if a limit or quota is negative or `month_length_days` is zero.
    pub fn new(export_rate_limit_kw: f64, monthly_export_quota_kwh: f64, month_length_days: u64) -> Self {
        assert!(export_rate_limit_kw >= 0.0);
        assert!(monthly_export_quota_kwh >= 0.0);
        assert!(month_length_days > 0);

        Self {
            export_rate_limit_kw,
            monthly_export_quota_kwh,
            exported_this_month_kwh: 0.0,
            month_index: 0,
            month_length_days,
            import_limit_kw: None,
        }
    }

    /// Caps grid import at `import_limit_kw`; the shortfall becomes unmet load.
    ///
    /// # Panics
    ///
    /// Panics if `import_limit_kw` is negative.
    pub fn with_import_limit(mut self, import_limit_kw: f64) -> Self {
        assert!(import_limit_kw >= 0.0);
        self.import_limit_kw = Some(import_limit_kw);
        self
    }

    /// Returns the export rate limit in kW.
    pub fn export_rate_limit_kw(&self) -> f64 {
        self.export_rate_limit_kw
    }

    /// Returns the monthly export quota in kWh.
    pub fn monthly_export_quota_kwh(&self) -> f64 {
        self.monthly_export_quota_kwh
    }

    /// Returns the energy exported since the last quota reset.
    pub fn exported_this_month_kwh(&self) -> f64 {
        self.exported_this_month_kwh
    }

    /// Returns the zero-based billing month.
    pub fn month_index(&self) -> u64 {
        self.month_index
    }

    /// Returns the import cap in kW, if any.
    pub fn import_limit_kw(&self) -> Option<f64> {
        self.import_limit_kw
    }

    /// Quota left this month (kWh, never negative).
    pub fn remaining_quota_kwh(&self) -> f64 {
        (self.monthly_export_quota_kwh - self.exported_this_month_kwh).max(0.0)
    }

    /// Returns `true` while some export quota remains.
    pub fn has_quota(&self) -> bool {
        self.remaining_quota_kwh() > super::types::FLOW_EPSILON_KWH
    }

    /// Most energy that may be exported in a step of `dt_hours`.
    pub fn export_cap_kwh(&self, dt_hours: f64) -> f64 {
        (self.export_rate_limit_kw * dt_hours).min(self.remaining_quota_kwh())
    }

    /// Most energy that may be imported in a step of `dt_hours`, if capped.
    pub fn import_cap_kwh(&self, dt_hours: f64) -> Option<f64> {
        self.import_limit_kw.map(|kw| kw * dt_hours)
    }

    /// Exports up to `offered_kwh`, bounded by rate and quota.
    ///
    /// # Returns
    ///
    /// The exported energy (kWh), already added to the monthly total.
    pub fn export(&mut self, offered_kwh: f64, dt_hours: f64) -> f64 {
        if offered_kwh <= super::types::FLOW_EPSILON_KWH || !self.has_quota() {
            return 0.0;
        }
        let kwh = offered_kwh.min(self.export_cap_kwh(dt_hours)).max(0.0);
        self.exported_this_month_kwh += kwh;
        kwh
    }

    /// Starts a new billing month when `day` is a positive multiple of the month length.
    ///
    /// # Returns
    ///
    /// `true` if the quota was reset.
    pub fn roll_month(&mut self, day: u64) -> bool {
        if day == 0 || day % self.month_length_days != 0 {
            return false;
        }
        self.exported_this_month_kwh = 0.0;
        self.month_index += 1;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_policy_defaults() {
        let grid = GridPolicy::new(5.0, 100.0, 30);
        assert_eq!(grid.export_rate_limit_kw(), 5.0);
        assert_eq!(grid.remaining_quota_kwh(), 100.0);
        assert_eq!(grid.month_index(), 0);
        assert_eq!(grid.import_limit_kw(), None);
        assert_eq!(grid.import_cap_kwh(0.5), None);
    }

    #[test]
    fn test_export_limited_by_rate() {
        let mut grid = GridPolicy::new(2.0, 100.0, 30);
        let kwh = grid.export(5.0, 0.5);
        assert_eq!(kwh, 1.0);
        assert_eq!(grid.exported_this_month_kwh(), 1.0);
    }

    #[test]
    fn test_export_limited_by_quota() {
        let mut grid = GridPolicy::new(10.0, 1.5, 30);
        assert_eq!(grid.export(1.0, 1.0), 1.0);
        assert_eq!(grid.export(1.0, 1.0), 0.5);
        assert!(!grid.has_quota());
        assert_eq!(grid.export(1.0, 1.0), 0.0);
        assert_eq!(grid.exported_this_month_kwh(), 1.5);
    }

    #[test]
    fn test_zero_rate_never_exports() {
        let mut grid = GridPolicy::new(0.0, 100.0, 30);
        assert_eq!(grid.export(50.0, 1.0), 0.0);
    }

    #[test]
    fn test_roll_month_on_multiples_only() {
        let mut grid = GridPolicy::new(10.0, 5.0, 7);
        grid.export(5.0, 1.0);
        assert!(!grid.roll_month(0));
        assert!(!grid.roll_month(6));
        assert_eq!(grid.exported_this_month_kwh(), 5.0);
        assert!(grid.roll_month(7));
        assert_eq!(grid.exported_this_month_kwh(), 0.0);
        assert_eq!(grid.month_index(), 1);
        assert!(grid.roll_month(14));
        assert_eq!(grid.month_index(), 2);
    }

    #[test]
    fn test_import_limit() {
        let grid = GridPolicy::new(5.0, 100.0, 30).with_import_limit(3.0);
        assert_eq!(grid.import_cap_kwh(0.5), Some(1.5));
    }

    #[test]
    #[should_panic]
    fn test_zero_month_length_panics() {
        GridPolicy::new(5.0, 100.0, 0);
    }
}
