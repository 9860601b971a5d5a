//! Bounded few-shot example window.

use std::collections::VecDeque;

use crate::domain::PromptExample;

/// Trailing window of accepted prompt examples.
///
/// Insertion order is preserved and length never exceeds capacity: once
/// the window is full, adds evict from the front so the most recently
/// added examples remain. A plain bounded deque - there is no
/// scoring-based retention.
///
/// Not internally synchronized; the pipeline mutates it only through
/// `&mut self`, and a host driving feedback from multiple threads must
/// wrap it in its own lock.
#[derive(Debug, Clone)]
pub struct ExampleStore {
    window: VecDeque<PromptExample>,
    capacity: usize,
}

impl ExampleStore {
    pub fn new(capacity: usize) -> Self {
        Self {
            window: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Append an example, evicting from the front past capacity.
    /// A no-op when the capacity is zero.
    pub fn add(&mut self, example: PromptExample) {
        if self.capacity == 0 {
            return;
        }
        self.window.push_back(example);
        while self.window.len() > self.capacity {
            self.window.pop_front();
        }
    }

    /// Read-only view of the current window, oldest first.
    pub fn examples(&self) -> impl Iterator<Item = &PromptExample> {
        self.window.iter()
    }

    pub fn len(&self) -> usize {
        self.window.len()
    }

    pub fn is_empty(&self) -> bool {
        self.window.is_empty()
    }
}
