//! Lock-protected sequence counter with a wrap-to-zero rule.

use crate::lock::HybridLock;

#[derive(Debug)]
struct CounterState {
    current: u64,
}

/// Monotonic counter that wraps to **0** after passing `max`.
///
/// The wrap target is always zero, never `start`: a counter created with
/// `start = 5, max = 7` yields `5, 6, 7, 0, 1, ...`.
///
/// # Example
///
/// ```
/// use melsec_mc::WrappingCounter;
///
/// let counter = WrappingCounter::new(3, 0);
/// let values: Vec<u64> = (0..6).map(|_| counter.current_value()).collect();
/// assert_eq!(values, vec![0, 1, 2, 3, 0, 1]);
/// ```
#[derive(Debug)]
pub struct WrappingCounter {
    state: HybridLock<CounterState>,
    start: u64,
    max: u64,
}

impl WrappingCounter {
    /// Creates a counter starting at `start` that wraps after `max`.
    pub fn new(max: u64, start: u64) -> Self {
        Self {
            state: HybridLock::new(CounterState { current: start }),
            start,
            max,
        }
    }

    /// Returns the current value and advances the counter.
    pub fn current_value(&self) -> u64 {
        self.state.with(|state| {
            let value = state.current;
            state.current = if state.current >= self.max {
                0
            } else {
                state.current + 1
            };
            value
        })
    }

    /// Initial value.
    pub fn start(&self) -> u64 {
        self.start
    }

    /// Largest value returned before wrapping.
    pub fn max(&self) -> u64 {
        self.max
    }
}

impl Default for WrappingCounter {
    fn default() -> Self {
        Self::new(u64::MAX, 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_wraps_to_zero_not_start() {
        let counter = WrappingCounter::new(7, 5);
        let values: Vec<u64> = (0..6).map(|_| counter.current_value()).collect();
        assert_eq!(values, vec![5, 6, 7, 0, 1, 2]);
    }

    #[test]
    fn test_sequence_from_zero() {
        let counter = WrappingCounter::new(3, 0);
        let values: Vec<u64> = (0..9).map(|_| counter.current_value()).collect();
        assert_eq!(values, vec![0, 1, 2, 3, 0, 1, 2, 3, 0]);
    }

    #[test]
    fn test_max_value_does_not_overflow() {
        let counter = WrappingCounter::new(u64::MAX, u64::MAX - 1);
        assert_eq!(counter.current_value(), u64::MAX - 1);
        assert_eq!(counter.current_value(), u64::MAX);
        assert_eq!(counter.current_value(), 0);
    }

    #[test]
    fn test_concurrent_values_are_unique() {
        let counter = Arc::new(WrappingCounter::default());
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let counter = Arc::clone(&counter);
                thread::spawn(move || (0..250).map(|_| counter.current_value()).collect::<Vec<_>>())
            })
            .collect();
        let mut seen = HashSet::new();
        for handle in handles {
            for value in handle.join().unwrap() {
                assert!(seen.insert(value));
            }
        }
        assert_eq!(seen.len(), 1000);
        assert_eq!(counter.start(), 0);
        assert_eq!(counter.max(), u64::MAX);
    }
}
