//! Virtual-time helpers shared by the site models.

/// Minutes in one simulated day.
pub const MINUTES_PER_DAY: u64 = 24 * MINUTES_PER_HOUR;

/// Minutes in one simulated hour.
pub const MINUTES_PER_HOUR: u64 = 60;

/// Returns the minute within the current simulated day (0..1440).
pub fn minute_of_day(time_min: u64) -> u64 {
    time_min % MINUTES_PER_DAY
}

/// Returns the integer hour of day (0..24) for a virtual timestamp.
///
/// # Examples
///
/// ```
/// use microgrid_sim::devices::types::hour_of_day;
///
/// assert_eq!(hour_of_day(0), 0);
/// assert_eq!(hour_of_day(13 * 60 + 59), 13);
/// assert_eq!(hour_of_day(25 * 60), 1);
/// ```
pub fn hour_of_day(time_min: u64) -> u64 {
    minute_of_day(time_min) / MINUTES_PER_HOUR
}

/// Returns the zero-based simulated day index for a virtual timestamp.
pub fn day_index(time_min: u64) -> u64 {
    time_min / MINUTES_PER_DAY
}
