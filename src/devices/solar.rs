use std::f64::consts::PI;

/// A rooftop PV array behind a single inverter.
///
/// `SolarArray` produces a half-sine clear-sky profile between 06:00 and
/// 18:00 that peaks at noon, scaled down by the day's cloud fraction and
/// clipped at the inverter's rated output. It holds no randomness; all
/// weather variability arrives through `cloud_fraction`.
#[derive(Debug, Clone, PartialEq)]
pub struct SolarArray {
    /// DC peak output in kilowatts under a clear sky at noon.
    pub peak_kw: f64,

    /// Inverter AC rating in kilowatts; output is clipped to this.
    pub inverter_max_kw: f64,
}

impl SolarArray {
    /// Creates a PV array; negative ratings are clamped to zero.
    pub fn new(peak_kw: f64, inverter_max_kw: f64) -> Self {
        Self {
            peak_kw: peak_kw.max(0.0),
            inverter_max_kw: inverter_max_kw.max(0.0),
        }
    }

    /// Clear-sky fraction of peak output for an hour of day.
    ///
    /// `sin((hour - 6) * pi / 12)`, floored at zero outside daylight.
    pub fn daylight_frac(hour: u64) -> f64 {
        let angle = (hour as f64 - 6.0) * (PI / 12.0);
        angle.sin().max(0.0)
    }

    /// AC output in kW at `minute_of_day`.
    ///
    /// # Arguments
    ///
    /// * `minute_of_day` - Minute within the day (0..1440)
    /// * `cloud_fraction` - Share of clear-sky output removed by clouds
    /// * `inverter_available` - Whether the inverter is online
    ///
    /// # Returns
    ///
    /// Zero when the inverter is down; otherwise the cloud-attenuated
    /// half-sine output clipped to `inverter_max_kw`.
    pub fn output_kw(&self, minute_of_day: u64, cloud_fraction: f64, inverter_available: bool) -> f64 {
        if !inverter_available {
            return 0.0;
        }

        let hour = (minute_of_day / 60) % 24;
        let ideal = self.peak_kw * Self::daylight_frac(hour);
        let actual = ideal * (1.0 - cloud_fraction);
        actual.min(self.inverter_max_kw).max(0.0)
    }
}
