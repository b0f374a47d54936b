//! Inverter reliability: daily failure trials and outage tracking.

use rand::Rng;
use rand_distr::{Distribution, Normal};

/// Shortest outage a failure can cause (hours).
pub const MIN_OUTAGE_HOURS: f64 = 4.0;
/// Longest outage a failure can cause (hours).
pub const MAX_OUTAGE_HOURS: f64 = 72.0;

/// A sampled inverter failure.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Outage {
    /// Drawn outage length in hours, after clamping.
    pub duration_hours: f64,
    /// Virtual minute at which the inverter comes back.
    pub until_min: u64,
}

/// Inverter availability driven by a once-a-day Bernoulli failure trial.
///
/// Availability is not stored; it is derived by comparing the current time
/// with `unavailable_until`. `None` means the inverter has never failed.
#[derive(Debug, Clone, PartialEq)]
pub struct Inverter {
    /// Probability of a failure on any given day (0.0 to 1.0).
    pub failure_frequency: f64,

    /// Mean outage length in hours.
    pub mean_outage_hours: f64,

    /// First virtual minute at which the inverter is back online.
    pub unavailable_until: Option<u64>,
}

impl Inverter {
    /// Creates an inverter that starts online.
    ///
    /// # Panics
    ///
    /// Panics if `failure_frequency` is outside `[0, 1]` or the mean outage is negative.
    pub fn new(failure_frequency: f64, mean_outage_hours: f64) -> Self {
        assert!((0.0..=1.0).contains(&failure_frequency));
        assert!(mean_outage_hours >= 0.0);
        Self {
            failure_frequency,
            mean_outage_hours,
            unavailable_until: None,
        }
    }

    /// Returns `true` when the inverter is online at `now_min`.
    pub fn is_available(&self, now_min: u64) -> bool {
        self.unavailable_until.is_none_or(|until| now_min >= until)
    }

    /// Runs the day's failure trial at `now_min`.
    ///
    /// On failure the outage length is drawn from
    /// `N(mean, 0.5 * mean)` hours and clamped to `[4, 72]`. The outage ends
    /// at `now_min` plus that duration, replacing any earlier end time.
    ///
    /// # Returns
    ///
    /// `Some(Outage)` when the trial fails, `None` otherwise.
    pub fn daily_trial<R: Rng + ?Sized>(&mut self, now_min: u64, rng: &mut R) -> Option<Outage> {
        if !rng.random_bool(self.failure_frequency) {
            return None;
        }

        let duration_hours = sample_outage_hours(self.mean_outage_hours, rng);
        let until_min = now_min + (duration_hours * 60.0) as u64;
        self.unavailable_until = Some(until_min);

        Some(Outage {
            duration_hours,
            until_min,
        })
    }
}

/// Draws an outage length (hours) around `mean_hours`, clamped to `[4, 72]`.
pub fn sample_outage_hours<R: Rng + ?Sized>(mean_hours: f64, rng: &mut R) -> f64 {
    let hours = match Normal::new(mean_hours, 0.5 * mean_hours) {
        Ok(dist) => dist.sample(rng),
        Err(_) => mean_hours,
    };
    hours.clamp(MIN_OUTAGE_HOURS, MAX_OUTAGE_HOURS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{SeedableRng, rngs::StdRng};

    #[test]
    fn test_starts_available() {
        let inverter = Inverter::new(0.5, 7.0);
        assert!(inverter.is_available(0));
        assert!(inverter.is_available(u64::MAX));
    }

    #[test]
    fn test_never_fails_at_zero_frequency() {
        let mut inverter = Inverter::new(0.0, 7.0);
        let mut rng = StdRng::seed_from_u64(1);
        for day in 0..365 {
            assert!(inverter.daily_trial(day * 1440, &mut rng).is_none());
        }
        assert_eq!(inverter.unavailable_until, None);
    }

    #[test]
    fn test_always_fails_at_unit_frequency() {
        let mut inverter = Inverter::new(1.0, 7.0);
        let mut rng = StdRng::seed_from_u64(2);
        let outage = inverter.daily_trial(0, &mut rng);
        assert!(outage.is_some());
        let outage = outage.unwrap();
        assert!((MIN_OUTAGE_HOURS..=MAX_OUTAGE_HOURS).contains(&outage.duration_hours));
        assert!(!inverter.is_available(0));
        assert!(!inverter.is_available(outage.until_min - 1));
        assert!(inverter.is_available(outage.until_min));
    }

    #[test]
    fn test_outage_duration_clamped() {
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..1_000 {
            let short = sample_outage_hours(0.5, &mut rng);
            assert_eq!(short, MIN_OUTAGE_HOURS);
            let long = sample_outage_hours(500.0, &mut rng);
            assert!((MIN_OUTAGE_HOURS..=MAX_OUTAGE_HOURS).contains(&long));
        }
    }

    #[test]
    fn test_zero_mean_yields_minimum_outage() {
        let mut rng = StdRng::seed_from_u64(4);
        assert_eq!(sample_outage_hours(0.0, &mut rng), MIN_OUTAGE_HOURS);
    }

    #[test]
    fn test_repeat_failure_resets_outage_end() {
        let mut inverter = Inverter::new(1.0, 7.0);
        inverter.unavailable_until = Some(100_000);
        let mut rng = StdRng::seed_from_u64(5);
        let outage = inverter.daily_trial(0, &mut rng).unwrap();
        let expected = (outage.duration_hours * 60.0) as u64;
        assert!(expected < 100_000);
        assert_eq!(outage.until_min, expected);
        assert_eq!(inverter.unavailable_until, Some(expected));
        assert!(inverter.is_available(expected));
    }
}
