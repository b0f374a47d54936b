use rand::Rng;

/// Extra load during the 07:00-09:00 morning window (kW).
pub const MORNING_BUMP_KW: f64 = 0.6;
/// Extra load during the 18:00-21:00 evening window (kW).
pub const EVENING_BUMP_KW: f64 = 0.8;
/// Chance that any single reading carries an appliance spike.
pub const SPIKE_PROBABILITY: f64 = 0.05;
/// Uniform measurement noise bounds (kW).
const NOISE_LOW_KW: f64 = -0.1;
const NOISE_HIGH_KW: f64 = 0.2;

/// A household demand generator with daily peaks and random spikes.
///
/// `DemandModel` layers a flat base load, fixed morning and evening bumps,
/// an occasional spike up to `peak_kw`, and small uniform noise. Readings
/// are independent draws; nothing carries over between timesteps.
///
/// # Examples
///
/// ```
/// use microgrid_sim::devices::DemandModel;
/// use rand::{SeedableRng, rngs::StdRng};
///
/// let demand = DemandModel::new(0.9, 3.5);
/// let mut rng = StdRng::seed_from_u64(42);
///
/// // Demand at 19:30
/// let kw = demand.load_kw(19 * 60 + 30, &mut rng);
/// assert!(kw >= 0.0);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct DemandModel {
    /// Always-on consumption in kilowatts.
    pub base_kw: f64,

    /// Upper bound of a random appliance spike in kilowatts.
    pub peak_kw: f64,
}

impl DemandModel {
    /// Creates a demand model; negative inputs are clamped to zero.
    pub fn new(base_kw: f64, peak_kw: f64) -> Self {
        Self {
            base_kw: base_kw.max(0.0),
            peak_kw: peak_kw.max(0.0),
        }
    }

    /// Deterministic part of the load profile at `minute_of_day` (kW).
    pub fn scheduled_kw(&self, minute_of_day: u64) -> f64 {
        let hour = (minute_of_day / 60) % 24;
        let mut kw = self.base_kw;
        if (7..9).contains(&hour) {
            kw += MORNING_BUMP_KW;
        }
        if (18..21).contains(&hour) {
            kw += EVENING_BUMP_KW;
        }
        kw
    }

    /// Samples the instantaneous load at `minute_of_day`.
    ///
    /// Consumes one spike trial, possibly one spike magnitude, and one noise
    /// draw from `rng`. The result is never negative.
    pub fn load_kw<R: Rng + ?Sized>(&self, minute_of_day: u64, rng: &mut R) -> f64 {
        let mut kw = self.scheduled_kw(minute_of_day);
        if rng.random_bool(SPIKE_PROBABILITY) {
            kw += rng.random::<f64>() * self.peak_kw;
        }
        kw += rng.random_range(NOISE_LOW_KW..=NOISE_HIGH_KW);
        kw.max(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{SeedableRng, rngs::StdRng};

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_scheduled_windows() {
        let demand = DemandModel::new(1.0, 3.0);
        assert!(approx(demand.scheduled_kw(3 * 60), 1.0));
        assert!(approx(demand.scheduled_kw(7 * 60), 1.6));
        assert!(approx(demand.scheduled_kw(8 * 60 + 59), 1.6));
        assert!(approx(demand.scheduled_kw(9 * 60), 1.0));
        assert!(approx(demand.scheduled_kw(18 * 60), 1.8));
        assert!(approx(demand.scheduled_kw(20 * 60 + 30), 1.8));
        assert!(approx(demand.scheduled_kw(21 * 60), 1.0));
    }

    #[test]
    fn test_load_never_negative() {
        let demand = DemandModel::new(0.0, 0.0);
        let mut rng = StdRng::seed_from_u64(1);
        for minute in (0..1440).step_by(15) {
            assert!(demand.load_kw(minute, &mut rng) >= 0.0);
        }
    }

    #[test]
    fn test_load_bounded_by_noise_and_spike() {
        let demand = DemandModel::new(0.9, 3.5);
        let mut rng = StdRng::seed_from_u64(5);
        for minute in (0..1440).step_by(10) {
            let scheduled = demand.scheduled_kw(minute);
            let kw = demand.load_kw(minute, &mut rng);
            assert!(kw >= scheduled + NOISE_LOW_KW - 1e-12);
            assert!(kw <= scheduled + 3.5 + NOISE_HIGH_KW + 1e-12);
        }
    }

    #[test]
    fn test_evening_mean_exceeds_night_mean() {
        let demand = DemandModel::new(0.9, 3.5);
        let mut rng = StdRng::seed_from_u64(9);
        let n = 2_000;
        let night: f64 = (0..n).map(|_| demand.load_kw(2 * 60, &mut rng)).sum::<f64>() / n as f64;
        let evening: f64 = (0..n).map(|_| demand.load_kw(19 * 60, &mut rng)).sum::<f64>() / n as f64;
        assert!(evening > night + 0.5, "evening={evening:.3} night={night:.3}");
    }

    #[test]
    fn test_deterministic_with_same_seed() {
        let demand = DemandModel::new(0.9, 3.5);
        let mut a = StdRng::seed_from_u64(42);
        let mut b = StdRng::seed_from_u64(42);
        for minute in (0..1440).step_by(30) {
            assert_eq!(demand.load_kw(minute, &mut a), demand.load_kw(minute, &mut b));
        }
    }
}
