//! This module contains utility structures for managing k-best elements using a binary heap.

use std::cmp::Ordering;
use std::collections::BinaryHeap;
use ordered_float::OrderedFloat; // For using f64 in BinaryHeap

/// Represents an element in the KBestNeighbors heap, pairing a distance with data.
#[derive(Debug)]
pub struct HeapElement<P> {
    pub distance: OrderedFloat<f64>, // Max-heap stores by distance
    pub data: P,
}

impl<P> PartialEq for HeapElement<P> {
    fn eq(&self, other: &Self) -> bool {
        self.distance == other.distance
    }
}
impl<P> Eq for HeapElement<P> {}

impl<P> PartialOrd for HeapElement<P> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<P> Ord for HeapElement<P> {
    fn cmp(&self, other: &Self) -> Ordering {
        // BinaryHeap is a max-heap, so the worst of the kept neighbors sits on top.
        self.distance.cmp(&other.distance)
    }
}

/// Manages a collection of the K "best" (smallest distance) items seen so far.
///
/// Until `capacity` items have been offered, the worst kept distance counts as
/// infinitely bad, so every candidate is accepted.
#[derive(Debug)]
pub struct KBestNeighbors<P> {
    capacity: usize,
    heap: BinaryHeap<HeapElement<P>>,
}

impl<P> KBestNeighbors<P> {
    pub fn new(capacity: usize) -> Self {
        KBestNeighbors {
            capacity,
            heap: BinaryHeap::with_capacity(capacity),
        }
    }

    /// Offers a candidate, replacing the current worst one if it is strictly closer.
    pub fn add(&mut self, distance: f64, point_data: P) {
        if self.capacity == 0 {
            return;
        }
        let item = HeapElement { distance: OrderedFloat(distance), data: point_data };
        if self.heap.len() < self.capacity {
            self.heap.push(item);
        } else if let Some(mut worst) = self.heap.peek_mut() {
            if item.distance < worst.distance {
                *worst = item;
            }
        }
    }

    /// Distance of the worst kept neighbor, or `None` while the heap is not full.
    pub fn current_farthest_distance(&self) -> Option<f64> {
        if self.heap.len() == self.capacity {
            self.heap.peek().map(|heap_elem| heap_elem.distance.0)
        } else {
            None // Not full yet, effectively infinite radius for pruning
        }
    }

    /// Whether a subtree whose closest possible point is `lower_bound` away
    /// can still improve the result.
    pub fn admits(&self, lower_bound: f64) -> bool {
        self.current_farthest_distance().map_or(true, |farthest| lower_bound <= farthest)
    }

    /// Drains the kept neighbors as `(distance, data)` pairs by ascending distance.
    pub fn into_sorted_pairs(self) -> Vec<(f64, P)> {
        self.heap
            .into_sorted_vec()
            .into_iter()
            .map(|elem| (elem.distance.0, elem.data))
            .collect()
    }

    /// Returns the current number of neighbors stored.
    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keeps_k_smallest() {
        let mut best = KBestNeighbors::new(3);
        for (d, label) in [(5.0, 'e'), (1.0, 'a'), (4.0, 'd'), (2.0, 'b'), (3.0, 'c')] {
            best.add(d, label);
        }
        assert_eq!(best.len(), 3);
        let pairs = best.into_sorted_pairs();
        assert_eq!(pairs, vec![(1.0, 'a'), (2.0, 'b'), (3.0, 'c')]);
    }

    #[test]
    fn test_farthest_is_none_until_full() {
        let mut best = KBestNeighbors::new(2);
        assert_eq!(best.current_farthest_distance(), None);
        assert!(best.admits(f64::INFINITY));
        best.add(7.0, ());
        assert_eq!(best.current_farthest_distance(), None);
        best.add(3.0, ());
        assert_eq!(best.current_farthest_distance(), Some(7.0));
        assert!(best.admits(7.0));
        assert!(!best.admits(7.5));
    }

    #[test]
    fn test_equal_distance_does_not_replace() {
        let mut best = KBestNeighbors::new(1);
        best.add(1.0, "first");
        best.add(1.0, "second");
        assert_eq!(best.into_sorted_pairs(), vec![(1.0, "first")]);
    }

    #[test]
    fn test_zero_capacity_ignores_everything() {
        let mut best = KBestNeighbors::new(0);
        best.add(1.0, 1);
        assert!(best.is_empty());
        assert!(best.into_sorted_pairs().is_empty());
    }
}
