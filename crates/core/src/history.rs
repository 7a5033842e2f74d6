use std::collections::VecDeque;

/// Number of samples each metric keeps by default.
pub const MAX_HISTORY_COUNT: usize = 50;

/// Bounded rolling history of per-tick samples, oldest first.
///
/// Once full, every [`push`](History::push) evicts exactly one sample from the
/// front, so the length never exceeds the capacity.
#[derive(Debug, Clone, PartialEq)]
pub struct History<T> {
    samples:  VecDeque<T>,
    capacity: usize,
}

impl<T: Copy> History<T> {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            samples: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Push a new sample, evicting the oldest if at capacity.
    pub fn push(&mut self, value: T) {
        if self.samples.len() == self.capacity {
            self.samples.pop_front();
        }
        self.samples.push_back(value);
    }

    /// Newest sample, if any.
    pub fn latest(&self) -> Option<T> {
        self.samples.back().copied()
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Samples in chronological order.
    pub fn iter(&self) -> impl Iterator<Item = &T> + '_ {
        self.samples.iter()
    }

    /// Chronological copy of the window, as published in a snapshot.
    pub fn to_vec(&self) -> Vec<T> {
        self.samples.iter().copied().collect()
    }
}

impl History<f64> {
    /// Average of all samples in the history window.
    pub fn average(&self) -> f64 {
        if self.samples.is_empty() {
            return 0.0;
        }
        self.samples.iter().sum::<f64>() / self.samples.len() as f64
    }
}

impl<T: Copy> Default for History<T> {
    fn default() -> Self {
        Self::new(MAX_HISTORY_COUNT)
    }
}
