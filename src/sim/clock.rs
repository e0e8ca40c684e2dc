/// A tick counter that yields a fixed number of world ticks.
///
/// The `Clock` starts after a given world tick and hands out the following
/// ticks one by one until its budget is used up.
///
/// # Examples
///
/// ```
/// use tiered_grid::sim::clock::Clock;
///
/// let mut clock = Clock::new(10, 3);
/// let mut ticks = Vec::new();
///
/// clock.run(|tick| ticks.push(tick));
/// assert_eq!(ticks, vec![11, 12, 13]);
/// ```
pub struct Clock {
    /// Last tick handed out (or the starting tick)
    current: u64,
    /// Final tick to hand out
    end: u64,
}

impl Clock {
    /// Creates a clock that yields `ticks` ticks after `start`.
    ///
    /// # Arguments
    ///
    /// * `start` - The world tick the clock starts from (not yielded)
    /// * `ticks` - How many ticks to yield
    pub fn new(start: u64, ticks: u64) -> Self {
        Self {
            current: start,
            end: start.saturating_add(ticks),
        }
    }

    /// Advances the clock by one tick.
    ///
    /// # Returns
    ///
    /// * `Some(tick)` - The tick just reached
    /// * `None` - If the clock has used up its budget
    pub fn tick(&mut self) -> Option<u64> {
        if self.current < self.end {
            self.current += 1;
            Some(self.current)
        } else {
            None
        }
    }

    /// Ticks still to be yielded.
    pub fn remaining(&self) -> u64 {
        self.end - self.current
    }

    /// Runs a function for each remaining tick.
    pub fn run(&mut self, mut f: impl FnMut(u64)) {
        while let Some(tick) = self.tick() {
            f(tick);
        }
    }
}
