//! Sliding-window list of the most recently appended values.

use tracing::debug;

use crate::error::{McError, Result};
use crate::lock::HybridLock;

/// Headroom added to the window for normal lists.
const DEFAULT_HEADROOM: usize = 2048;
/// Headroom for windows larger than [`LARGE_WINDOW`].
const LARGE_HEADROOM: usize = 4096;
const LARGE_WINDOW: usize = 8192;

#[derive(Debug)]
struct ListState<T> {
    array: Vec<T>,
    cursor: usize,
}

/// Fixed-length window over an append-only stream of values.
///
/// The backing array holds `count` plus some headroom. Appends are O(1)
/// until the headroom is used up, at which point the latest `count` values
/// are moved to the front of a fresh array.
///
/// # Example
///
/// ```
/// use melsec_mc::BoundedList;
///
/// let list = BoundedList::new(3);
/// for value in 1..=5 {
///     list.append(value);
/// }
/// assert_eq!(list.to_vec(), vec![3, 4, 5]);
/// assert_eq!(list.get(0).unwrap(), 3);
/// ```
#[derive(Debug)]
pub struct BoundedList<T> {
    state: HybridLock<ListState<T>>,
    count: usize,
    headroom: usize,
}

impl<T: Clone + Default> BoundedList<T> {
    /// Creates an empty window holding at most `count` values.
    pub fn new(count: usize) -> Self {
        Self::with_cursor(count, 0)
    }

    /// Creates a window that already holds `count` default values, so
    /// indexing is valid immediately and new values push the defaults out.
    pub fn prefilled(count: usize) -> Self {
        Self::with_cursor(count, count)
    }

    fn with_cursor(count: usize, cursor: usize) -> Self {
        let headroom = if count > LARGE_WINDOW {
            LARGE_HEADROOM
        } else {
            DEFAULT_HEADROOM
        };
        Self {
            state: HybridLock::new(ListState {
                array: vec![T::default(); headroom + count],
                cursor,
            }),
            count,
            headroom,
        }
    }

    /// Window length.
    pub fn count(&self) -> usize {
        self.count
    }

    /// Appends a value, evicting the oldest once the window is full.
    pub fn append(&self, value: T) {
        self.state.with(|state| self.push(state, value));
    }

    /// Appends every value in order under a single lock acquisition.
    pub fn extend<I: IntoIterator<Item = T>>(&self, values: I) {
        self.state.with(|state| {
            for value in values {
                self.push(state, value);
            }
        });
    }

    fn push(&self, state: &mut ListState<T>, value: T) {
        if state.cursor >= state.array.len() {
            let mut array = vec![T::default(); self.headroom + self.count];
            let start = state.cursor - self.count;
            array[..self.count].clone_from_slice(&state.array[start..state.cursor]);
            state.array = array;
            state.cursor = self.count;
            debug!(count = self.count, "bounded list compacted");
        }
        state.array[state.cursor] = value;
        state.cursor += 1;
    }

    /// Returns the value at logical position `index`, oldest first.
    ///
    /// # Errors
    ///
    /// Returns [`McError::OutOfBounds`] unless `index < count`.
    pub fn get(&self, index: usize) -> Result<T> {
        self.check_index(index)?;
        Ok(self.state.with(|state| {
            let physical = self.physical_index(state.cursor, index);
            state.array[physical].clone()
        }))
    }

    /// Overwrites the value at logical position `index`.
    ///
    /// # Errors
    ///
    /// Returns [`McError::OutOfBounds`] unless `index < count`.
    pub fn set(&self, index: usize, value: T) -> Result<()> {
        self.check_index(index)?;
        self.state.with(|state| {
            let physical = self.physical_index(state.cursor, index);
            state.array[physical] = value;
        });
        Ok(())
    }

    /// Snapshot of the window in insertion order.
    ///
    /// Holds fewer than `count` values until the window has filled.
    pub fn to_vec(&self) -> Vec<T> {
        self.state.with(|state| {
            let start = state.cursor.saturating_sub(self.count);
            state.array[start..state.cursor].to_vec()
        })
    }

    fn check_index(&self, index: usize) -> Result<()> {
        if index >= self.count {
            return Err(McError::out_of_bounds(index, self.count));
        }
        Ok(())
    }

    fn physical_index(&self, cursor: usize, index: usize) -> usize {
        if cursor < self.count {
            index
        } else {
            index + cursor - self.count
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window_keeps_latest() {
        let list = BoundedList::new(3);
        list.extend([1, 2, 3, 4, 5]);
        assert_eq!(list.to_vec(), vec![3, 4, 5]);
        assert_eq!(list.get(0).unwrap(), 3);
        assert_eq!(list.get(2).unwrap(), 5);
    }

    #[test]
    fn test_partial_window() {
        let list = BoundedList::new(4);
        list.append(7u16);
        list.append(8);
        assert_eq!(list.to_vec(), vec![7, 8]);
        assert_eq!(list.get(1).unwrap(), 8);
        // Slots not yet written read as the default value.
        assert_eq!(list.get(3).unwrap(), 0);
    }

    #[test]
    fn test_index_out_of_range() {
        let list: BoundedList<i32> = BoundedList::new(3);
        let err = list.get(3).unwrap_err();
        assert!(matches!(err, McError::OutOfBounds { index: 3, len: 3 }));
        assert!(list.set(5, 1).is_err());
    }

    #[test]
    fn test_set_updates_logical_slot() {
        let list = BoundedList::new(2);
        list.extend([10, 20, 30]);
        list.set(0, 99).unwrap();
        assert_eq!(list.to_vec(), vec![99, 30]);
    }

    #[test]
    fn test_compaction_keeps_appended_value() {
        let list = BoundedList::new(3);
        let total = DEFAULT_HEADROOM + 3 + 5;
        for value in 0..total {
            list.append(value);
        }
        assert_eq!(list.to_vec(), vec![total - 3, total - 2, total - 1]);
        assert_eq!(list.get(2).unwrap(), total - 1);
    }

    #[test]
    fn test_large_window_headroom() {
        let list: BoundedList<u8> = BoundedList::new(LARGE_WINDOW + 1);
        assert_eq!(list.headroom, LARGE_HEADROOM);
        let list: BoundedList<u8> = BoundedList::new(LARGE_WINDOW);
        assert_eq!(list.headroom, DEFAULT_HEADROOM);
    }

    #[test]
    fn test_prefilled() {
        let list = BoundedList::prefilled(3);
        assert_eq!(list.to_vec(), vec![0, 0, 0]);
        list.append(4);
        assert_eq!(list.to_vec(), vec![0, 0, 4]);
    }

    #[test]
    fn test_concurrent_appends_compact_safely() {
        use std::sync::Arc;
        use std::thread;

        let list = Arc::new(BoundedList::<u32>::new(3));
        let handles: Vec<_> = (0..4u32)
            .map(|t| {
                let list = Arc::clone(&list);
                thread::spawn(move || {
                    for i in 0..1000 {
                        list.append(t * 1000 + i);
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let window = list.to_vec();
        assert_eq!(window.len(), 3);
        assert!(window.iter().all(|v| *v < 4000));
        assert!(window[0] != window[1] && window[1] != window[2] && window[0] != window[2]);
        // The last value appended by some thread is always the newest.
        assert!([999, 1999, 2999, 3999].contains(&window[2]));
    }
}
