//! Sliding window of demand samples.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

/// Fixed-capacity sliding window of demand samples, oldest first.
///
/// Forecasting waits until the window has filled once; until then the
/// daemon is in its warm-up phase and makes no decisions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DemandWindow {
    samples: VecDeque<f64>,
    capacity: usize,
}

impl DemandWindow {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            samples: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Append a sample, evicting the oldest once at capacity.
    pub fn push(&mut self, sample: f64) {
        if self.samples.len() == self.capacity {
            self.samples.pop_front();
        }
        self.samples.push_back(sample);
    }

    /// Whether the window has filled once and forecasting may begin.
    pub fn is_warm(&self) -> bool {
        self.samples.len() == self.capacity
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

    /// The window contents, oldest first.
    pub fn snapshot(&self) -> Vec<f64> {
        self.samples.iter().copied().collect()
    }
}
