/// Stationary battery bank with symmetric charge/discharge losses.
///
/// The round-trip efficiency is split evenly between the two directions:
/// `eta_charge = eta_discharge = sqrt(round_trip_efficiency)`, so one full
/// charge+discharge cycle loses `1 - round_trip_efficiency` of the energy put in.
///
/// All quantities are energies (kWh) for the current timestep; the dispatch
/// engine converts power to energy before calling in here.
#[derive(Debug, Clone, PartialEq)]
pub struct Battery {
    /// Nameplate energy capacity in kilowatt-hours.
    pub capacity_kwh: f64,

    /// Energy currently stored in kilowatt-hours.
    pub soc_kwh: f64,

    /// Fraction of capacity that discharge may not go below.
    pub min_soc_fraction: f64,

    /// One-way charging efficiency (0..=1).
    pub charge_efficiency: f64,

    /// One-way discharging efficiency (0..=1).
    pub discharge_efficiency: f64,
}

/// SoC fraction at or above which the battery counts as full.
pub const FULL_SOC_FRACTION: f64 = 0.99;

impl Battery {
    /// Creates a battery at `initial_soc_fraction` of its capacity.
    ///
    /// # Arguments
    ///
    /// * `capacity_kwh` - Usable capacity in kWh (must be > 0)
    /// * `initial_soc_fraction` - Starting state of charge (0.0 to 1.0)
    /// * `min_soc_fraction` - Discharge floor as a fraction of capacity
    /// * `round_trip_efficiency` - Round-trip efficiency (0.0 to 1.0)
    ///
    /// # Panics
    ///
    /// Panics if capacity is not positive or any fraction is outside `[0, 1]`.
    pub fn new(
        capacity_kwh: f64,
        initial_soc_fraction: f64,
        min_soc_fraction: f64,
        round_trip_efficiency: f64,
    ) -> Self {
        assert!(capacity_kwh > 0.0);
        assert!((0.0..=1.0).contains(&initial_soc_fraction));
        assert!((0.0..=1.0).contains(&min_soc_fraction));
        assert!((0.0..=1.0).contains(&round_trip_efficiency));

        let eta = round_trip_efficiency.sqrt();
        Self {
            capacity_kwh,
            soc_kwh: capacity_kwh * initial_soc_fraction,
            min_soc_fraction,
            charge_efficiency: eta,
            discharge_efficiency: eta,
        }
    }

    /// Energy (kWh) below which discharge is not allowed.
    pub fn floor_kwh(&self) -> f64 {
        self.capacity_kwh * self.min_soc_fraction
    }

    /// Empty space left in the battery (kWh, cell side).
    pub fn headroom_kwh(&self) -> f64 {
        (self.capacity_kwh - self.soc_kwh).max(0.0)
    }

    /// Stored energy above the discharge floor (kWh, cell side).
    pub fn usable_kwh(&self) -> f64 {
        (self.soc_kwh - self.floor_kwh()).max(0.0)
    }

    /// State of charge as a fraction of capacity.
    pub fn soc_fraction(&self) -> f64 {
        self.soc_kwh / self.capacity_kwh
    }

    /// Returns `true` once the SoC has reached 99% of capacity.
    pub fn is_full(&self) -> bool {
        self.soc_kwh >= FULL_SOC_FRACTION * self.capacity_kwh
    }

    /// Returns `true` while the SoC sits within 1% above the discharge floor.
    pub fn is_low(&self) -> bool {
        self.soc_kwh <= self.floor_kwh() * 1.01
    }

    /// Offers `offered_kwh` of bus energy to the battery.
    ///
    /// Accepts `min(offered, headroom / eta_charge)` and stores
    /// `accepted * eta_charge`. With zero charge efficiency nothing is accepted.
    ///
    /// # Returns
    ///
    /// Energy taken from the bus (kWh, before charge loss).
    pub fn charge(&mut self, offered_kwh: f64) -> f64 {
        if offered_kwh <= 0.0 || self.charge_efficiency <= 0.0 {
            return 0.0;
        }

        let accepted = offered_kwh.min(self.headroom_kwh() / self.charge_efficiency);
        self.soc_kwh += accepted * self.charge_efficiency;
        accepted
    }

    /// Requests `required_kwh` of bus energy from the battery.
    ///
    /// Draws `min(required / eta_discharge, usable)` from the cells and
    /// delivers `drawn * eta_discharge`. With zero discharge efficiency
    /// nothing is drawn or delivered.
    ///
    /// # Returns
    ///
    /// Energy delivered to the bus (kWh, after discharge loss).
    pub fn discharge(&mut self, required_kwh: f64) -> f64 {
        if required_kwh <= 0.0 || self.discharge_efficiency <= 0.0 {
            return 0.0;
        }

        let drawn = (required_kwh / self.discharge_efficiency).min(self.usable_kwh());
        self.soc_kwh -= drawn;
        drawn * self.discharge_efficiency
    }

    /// Pins the SoC into `[0, capacity]` after float drift.
    pub fn clamp(&mut self) {
        self.soc_kwh = self.soc_kwh.clamp(0.0, self.capacity_kwh);
    }
}
