//! Lives counter - bounded decrement with reset

/// A life pool that never goes below zero or above its maximum
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lives {
    max: u32,
    current: u32,
}

impl Lives {
    /// Create a full pool
    pub fn new(max: u32) -> Self {
        Self { max, current: max }
    }

    /// Lose one life. Returns false (and changes nothing) when already empty.
    pub fn lose(&mut self) -> bool {
        if self.current == 0 {
            return false;
        }
        self.current -= 1;
        true
    }

    pub fn reset(&mut self) {
        self.current = self.max;
    }

    pub fn is_empty(&self) -> bool {
        self.current == 0
    }

    pub fn current(&self) -> u32 {
        self.current
    }

    pub fn max(&self) -> u32 {
        self.max
    }
}
