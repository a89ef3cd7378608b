/// Counts loop iterations and reports once a maximum has been reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoopBudget {
    ticks: usize,
    max_ticks: usize,
}

impl LoopBudget {
    #[must_use]
    pub const fn new(max_ticks: usize) -> Self {
        Self {
            ticks: 0,
            max_ticks,
        }
    }

    /// Spends one tick, or returns true if there are none left.
    pub fn limit_reached(&mut self) -> bool {
        if self.ticks >= self.max_ticks {
            return true;
        }

        self.ticks += 1;
        false
    }

    #[must_use]
    pub const fn ticks(&self) -> usize {
        self.ticks
    }

    #[must_use]
    pub const fn max_ticks(&self) -> usize {
        self.max_ticks
    }
}
