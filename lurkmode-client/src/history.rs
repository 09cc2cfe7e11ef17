//! Fixed-capacity chat history
//!
//! A circular buffer that keeps the most recent messages. Writers take an
//! exclusive lock; snapshots and length checks share a read lock.

use parking_lot::RwLock;

/// Default number of messages kept in the chat view
pub const DEFAULT_HISTORY_SIZE: usize = 200;

#[derive(Debug)]
struct Slots<T> {
    /// Grows in arrival order until full, then is overwritten in place
    items: Vec<T>,
    /// Logical oldest slot once `items` is full, zero before that
    head: usize,
}

/// Thread-safe circular buffer holding the last `capacity` items
#[derive(Debug)]
pub struct HistoryBuffer<T> {
    capacity: usize,
    slots: RwLock<Slots<T>>,
}

impl<T: Clone> HistoryBuffer<T> {
    /// Create an empty buffer; capacities below 1 are clamped to 1
    pub fn new(capacity: i64) -> Self {
        let capacity = usize::try_from(capacity.max(1)).unwrap_or(usize::MAX);
        Self {
            capacity,
            slots: RwLock::new(Slots {
                items: Vec::with_capacity(capacity.min(4096)),
                head: 0,
            }),
        }
    }

    /// Append an item, overwriting the oldest one when full
    pub fn add(&self, item: T) {
        let mut slots = self.slots.write();

        if slots.items.len() < self.capacity {
            slots.items.push(item);
            return;
        }

        let head = slots.head;
        slots.items[head] = item;
        slots.head = (head + 1) % self.capacity;
    }

    /// Snapshot of all retained items, oldest first
    ///
    /// The returned vector is an independent copy.
    pub fn get(&self) -> Vec<T> {
        let slots = self.slots.read();
        let (newer, older) = slots.items.split_at(slots.head);

        let mut result = Vec::with_capacity(slots.items.len());
        result.extend_from_slice(older);
        result.extend_from_slice(newer);
        result
    }

    /// Number of retained items, never more than the capacity
    pub fn len(&self) -> usize {
        self.slots.read().items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::collections::HashSet;
    use std::sync::Arc;

    #[test]
    fn test_new_is_empty() {
        let buffer = HistoryBuffer::<u32>::new(3);
        assert!(buffer.is_empty());
        assert_eq!(buffer.len(), 0);
        assert_eq!(buffer.capacity(), 3);
        assert!(buffer.get().is_empty());
    }

    #[test]
    fn test_fills_in_arrival_order() {
        let buffer = HistoryBuffer::new(3);
        buffer.add(1);
        buffer.add(2);
        assert_eq!(buffer.get(), vec![1, 2]);
        assert_eq!(buffer.len(), 2);
    }

    #[test]
    fn test_wraparound_keeps_last_items() {
        let buffer = HistoryBuffer::new(3);
        for i in 1..=5 {
            buffer.add(i);
        }
        assert_eq!(buffer.get(), vec![3, 4, 5]);
        assert_eq!(buffer.len(), 3);
    }

    #[test]
    fn test_exact_multiple_of_capacity() {
        let buffer = HistoryBuffer::new(3);
        for i in 1..=6 {
            buffer.add(i);
        }
        assert_eq!(buffer.get(), vec![4, 5, 6]);
    }

    #[test]
    fn test_backing_store_not_resized_once_full() {
        let buffer = HistoryBuffer::new(4);
        for i in 0..4 {
            buffer.add(i);
        }
        let allocated = buffer.slots.read().items.capacity();
        for i in 4..100 {
            buffer.add(i);
        }
        let slots = buffer.slots.read();
        assert_eq!(slots.items.len(), 4);
        assert_eq!(slots.items.capacity(), allocated);
        assert!(slots.head < 4);
    }

    #[test]
    fn test_head_stays_zero_until_full() {
        let buffer = HistoryBuffer::new(5);
        for i in 0..5 {
            buffer.add(i);
            assert_eq!(buffer.slots.read().head, 0);
        }
        buffer.add(5);
        assert_eq!(buffer.slots.read().head, 1);
    }

    #[test]
    fn test_capacity_clamped_to_one() {
        for capacity in [0, -5, 1] {
            let buffer = HistoryBuffer::new(capacity);
            assert_eq!(buffer.capacity(), 1);
            buffer.add("a");
            buffer.add("b");
            assert_eq!(buffer.get(), vec!["b"]);
            assert_eq!(buffer.len(), 1);
        }
    }

    #[test]
    fn test_snapshot_is_independent_copy() {
        let buffer = HistoryBuffer::new(3);
        buffer.add(String::from("a"));
        buffer.add(String::from("b"));

        let mut snapshot = buffer.get();
        snapshot[0].push_str("-changed");
        snapshot.push(String::from("extra"));
        snapshot.clear();

        assert_eq!(buffer.get(), vec!["a".to_string(), "b".to_string()]);
        assert_eq!(buffer.len(), 2);
    }

    #[test]
    fn test_readers_run_alongside_writer() {
        let buffer = Arc::new(HistoryBuffer::new(50));
        let writer = {
            let buffer = Arc::clone(&buffer);
            std::thread::spawn(move || {
                for i in 0..1000u32 {
                    buffer.add(i);
                }
            })
        };
        let readers: Vec<_> = (0..4)
            .map(|_| {
                let buffer = Arc::clone(&buffer);
                std::thread::spawn(move || {
                    for _ in 0..200 {
                        let snapshot = buffer.get();
                        assert!(snapshot.len() <= 50);
                        assert!(snapshot.windows(2).all(|w| w[0] < w[1]));
                    }
                })
            })
            .collect();

        writer.join().unwrap();
        for reader in readers {
            reader.join().unwrap();
        }
        assert_eq!(buffer.get(), (950..1000).collect::<Vec<_>>());
    }

    proptest! {
        #[test]
        fn len_is_min_of_adds_and_capacity(capacity in 1i64..64, adds in 0usize..200) {
            let buffer = HistoryBuffer::new(capacity);
            for i in 0..adds {
                buffer.add(i);
            }
            prop_assert_eq!(buffer.len(), adds.min(capacity as usize));
        }

        #[test]
        fn snapshot_is_last_items_in_order(capacity in 1i64..32, adds in 0usize..100) {
            let buffer = HistoryBuffer::new(capacity);
            for i in 0..adds {
                buffer.add(i);
            }
            let expected: Vec<usize> =
                (adds.saturating_sub(capacity as usize)..adds).collect();
            prop_assert_eq!(buffer.get(), expected);
        }

        #[test]
        fn concurrent_adds_never_corrupt_slots(
            capacity in 1i64..32,
            threads in 1usize..8,
            per_thread in 1usize..40,
        ) {
            let buffer = Arc::new(HistoryBuffer::new(capacity));
            let handles: Vec<_> = (0..threads)
                .map(|t| {
                    let buffer = Arc::clone(&buffer);
                    std::thread::spawn(move || {
                        for i in 0..per_thread {
                            buffer.add((t, i));
                        }
                    })
                })
                .collect();
            for handle in handles {
                handle.join().unwrap();
            }

            let total = threads * per_thread;
            let snapshot = buffer.get();
            prop_assert_eq!(snapshot.len(), total.min(capacity as usize));

            let unique: HashSet<_> = snapshot.iter().copied().collect();
            prop_assert_eq!(unique.len(), snapshot.len());

            // Each writer's items stay in its own order
            for t in 0..threads {
                let own: Vec<usize> = snapshot
                    .iter()
                    .filter(|(owner, _)| *owner == t)
                    .map(|(_, i)| *i)
                    .collect();
                prop_assert!(own.windows(2).all(|w| w[0] < w[1]));
            }
        }
    }
}
