/// A virtual clock that advances in fixed minute increments over a horizon.
///
/// The `Clock` stands in for a discrete-event scheduler: each tick yields the
/// current virtual time, and the caller invokes the engine before the clock
/// moves forward by `dt_minutes`. No real time passes.
///
/// # Examples
///
/// ```
/// use microgrid_sim::sim::clock::Clock;
///
/// let mut clock = Clock::new(30, 120);
/// let mut times = Vec::new();
///
/// clock.run(|t| times.push(t));
/// assert_eq!(times, vec![0, 30, 60, 90]);
/// ```
pub struct Clock {
    /// Current virtual time in minutes
    now_min: u64,
    /// Step length in minutes
    dt_minutes: u64,
    /// Number of steps left to run
    remaining: u64,
}

impl Clock {
    /// Creates a clock that runs `floor(total_minutes / dt_minutes)` steps.
    ///
    /// # Arguments
    ///
    /// * `dt_minutes` - Step length in minutes (must be > 0)
    /// * `total_minutes` - Horizon in minutes; a trailing partial step is dropped
    ///
    /// # Panics
    ///
    /// Panics if `dt_minutes` is zero.
    pub fn new(dt_minutes: u64, total_minutes: u64) -> Self {
        assert!(dt_minutes > 0, "dt_minutes must be > 0");
        Self {
            now_min: 0,
            dt_minutes,
            remaining: total_minutes / dt_minutes,
        }
    }

    /// Current virtual time in minutes.
    pub fn now(&self) -> u64 {
        self.now_min
    }

    /// Advances the clock by one step.
    ///
    /// # Returns
    ///
    /// * `Some(time_min)` - The virtual time of the step before advancing
    /// * `None` - If the horizon has been reached
    pub fn tick(&mut self) -> Option<u64> {
        if self.remaining == 0 {
            return None;
        }
        let t = self.now_min;
        self.now_min += self.dt_minutes;
        self.remaining -= 1;
        Some(t)
    }

    /// Runs a function for each remaining step, passing the virtual time.
    pub fn run(&mut self, mut f: impl FnMut(u64)) {
        while let Some(t) = self.tick() {
            f(t);
        }
    }
}
