/// Flat tariff for the run: what imports cost and what exports earn.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EconomicRates {
    pub import_cost_per_kwh: f64,
    pub export_revenue_per_kwh: f64,
}

/// Money side of one step.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Settlement {
    pub import_cost: f64,
    pub export_revenue: f64,
    /// `import_cost - export_revenue`; negative means the site earned money.
    pub net_cost: f64,
}

impl EconomicRates {
    pub fn new(import_cost_per_kwh: f64, export_revenue_per_kwh: f64) -> Self {
        Self {
            import_cost_per_kwh,
            export_revenue_per_kwh,
        }
    }

    /// Prices one step's grid exchange.
    pub fn settle(&self, import_kwh: f64, export_kwh: f64) -> Settlement {
        let import_cost = import_kwh * self.import_cost_per_kwh;
        let export_revenue = export_kwh * self.export_revenue_per_kwh;
        Settlement {
            import_cost,
            export_revenue,
            net_cost: import_cost - export_revenue,
        }
    }
}
