//! Daily cloud-cover sampling with season-dependent weather regimes.

use std::fmt;
use std::str::FromStr;

use rand::Rng;
use rand::distr::Distribution;
use rand::distr::weighted::WeightedIndex;
use serde::{Deserialize, Serialize};

/// Calendar season selecting the cloud regime weights.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Season {
    Spring,
    #[default]
    Summer,
    Fall,
    Winter,
}

impl Season {
    /// All seasons, in calendar order.
    pub const ALL: [Season; 4] = [Season::Spring, Season::Summer, Season::Fall, Season::Winter];

    /// Relative weights of the clear / partly / mostly cloudy / overcast regimes.
    ///
    /// Weights are relative; they are normalized by their sum when sampled.
    pub fn cloud_weights(self) -> [f64; 4] {
        match self {
            Season::Spring => [0.1, 0.3, 0.4, 0.2],
            Season::Summer => [0.05, 0.15, 0.3, 0.5],
            Season::Fall => [0.2, 0.4, 0.3, 0.1],
            Season::Winter => [0.3, 0.4, 0.2, 0.1],
        }
    }

    /// Lowercase name used in configuration files.
    pub fn as_str(self) -> &'static str {
        match self {
            Season::Spring => "spring",
            Season::Summer => "summer",
            Season::Fall => "fall",
            Season::Winter => "winter",
        }
    }
}

impl fmt::Display for Season {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Season {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Season::ALL
            .into_iter()
            .find(|season| season.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| {
                format!("unknown season \"{s}\", expected one of: spring, summer, fall, winter")
            })
    }
}

/// Cloud fraction ranges `[lo, hi)`: clear, partly cloudy, mostly cloudy, overcast.
pub const CLOUD_BUCKETS: [(f64, f64); 4] = [(0.0, 0.2), (0.2, 0.6), (0.6, 0.8), (0.8, 0.9)];

/// Draws one day's cloud attenuation in `[0, 0.9)`.
///
/// Picks a regime bucket with the season's weights, then samples uniformly
/// inside it. A value of 0.3 removes 30% of the clear-sky solar output.
pub fn sample_daily_cloud_fraction<R: Rng + ?Sized>(season: Season, rng: &mut R) -> f64 {
    let bucket = match WeightedIndex::new(season.cloud_weights()) {
        Ok(dist) => dist.sample(rng),
        Err(_) => 0,
    };
    let (lo, hi) = CLOUD_BUCKETS[bucket];
    rng.random_range(lo..hi)
}

/// Weather for the current simulated day.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WeatherState {
    pub season: Season,
    /// Fraction of clear-sky output removed by clouds (0.0 to 0.9).
    pub cloud_fraction: f64,
}

impl WeatherState {
    /// Starts with a clear sky; the first daily update replaces it.
    pub fn new(season: Season) -> Self {
        Self {
            season,
            cloud_fraction: 0.0,
        }
    }

    /// Resamples the cloud fraction for a new day and returns it.
    pub fn resample<R: Rng + ?Sized>(&mut self, rng: &mut R) -> f64 {
        self.cloud_fraction = sample_daily_cloud_fraction(self.season, rng);
        self.cloud_fraction
    }
}
