use std::collections::VecDeque;

use serde::{Serialize, Serializer};

/// Fixed-capacity FIFO buffer: pushing past capacity evicts the oldest entry.
#[derive(Debug, Clone)]
pub struct BoundedSeries<T> {
    items: VecDeque<T>,
    capacity: usize,
}

impl<T> BoundedSeries<T> {
    /// Capacity is clamped to at least 1.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            items: VecDeque::with_capacity(capacity + 1),
            capacity,
        }
    }

    /// Append, returning the evicted entry if the series was full.
    pub fn push(&mut self, item: T) -> Option<T> {
        self.items.push_back(item);
        if self.items.len() > self.capacity {
            self.items.pop_front()
        } else {
            None
        }
    }

    pub fn last(&self) -> Option<&T> {
        self.items.back()
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> + '_ {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }
}

impl<T: Clone> BoundedSeries<T> {
    pub fn to_vec(&self) -> Vec<T> {
        self.items.iter().cloned().collect()
    }
}

impl<T: Serialize> Serialize for BoundedSeries<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.items.iter())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn evicts_oldest_once_full() {
        let mut series = BoundedSeries::new(3);
        assert_eq!(series.push(1), None);
        assert_eq!(series.push(2), None);
        assert_eq!(series.push(3), None);
        assert_eq!(series.push(4), Some(1));
        assert_eq!(series.to_vec(), vec![2, 3, 4]);
        assert_eq!(series.last(), Some(&4));
    }

    #[test]
    fn zero_capacity_is_clamped() {
        let mut series = BoundedSeries::new(0);
        series.push("a");
        series.push("b");
        assert_eq!(series.capacity(), 1);
        assert_eq!(series.to_vec(), vec!["b"]);
    }

    #[test]
    fn serializes_as_plain_array() {
        let mut series = BoundedSeries::new(2);
        series.push(1.5);
        series.push(2.5);
        series.push(3.5);
        assert_eq!(serde_json::to_string(&series).unwrap(), "[2.5,3.5]");
    }

    proptest! {
        #[test]
        fn keeps_the_most_recent_n(
            capacity in 1usize..64,
            values in proptest::collection::vec(any::<i32>(), 0..256),
        ) {
            let mut series = BoundedSeries::new(capacity);
            for v in &values {
                series.push(*v);
                prop_assert!(series.len() <= capacity);
            }
            let expected: Vec<i32> = values
                .iter()
                .skip(values.len().saturating_sub(capacity))
                .copied()
                .collect();
            prop_assert_eq!(series.to_vec(), expected);
        }
    }
}
