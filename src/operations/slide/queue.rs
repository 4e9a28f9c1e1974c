use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap, HashSet};

use crate::math::TOLERANCE;
use crate::topology::Movable;

#[derive(Debug, Clone, Copy)]
struct Entry {
    delay: f64,
    movable: Movable,
}

impl PartialEq for Entry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Entry {}

impl PartialOrd for Entry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Entry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reversed for a min-heap; ties resolve by movable for determinism.
        other
            .delay
            .total_cmp(&self.delay)
            .then_with(|| other.movable.cmp(&self.movable))
    }
}

/// Min-priority queue of movables keyed by delay, with decrease-key.
///
/// Lowering a key pushes a fresh entry; the superseded one is skipped when
/// it surfaces. A movable is final once popped and ignores later offers.
#[derive(Debug, Default)]
pub(super) struct DelayQueue {
    heap: BinaryHeap<Entry>,
    best: HashMap<Movable, f64>,
    finalized: HashSet<Movable>,
}

impl DelayQueue {
    pub(super) fn new() -> Self {
        Self::default()
    }

    /// Proposes `delay` for `movable`. Returns whether it was accepted.
    pub(super) fn offer(&mut self, movable: Movable, delay: f64) -> bool {
        if self.finalized.contains(&movable) {
            return false;
        }
        let delay = delay.max(0.0);
        let improves = self
            .best
            .get(&movable)
            .is_none_or(|best| delay < best - TOLERANCE);
        if improves {
            self.best.insert(movable, delay);
            self.heap.push(Entry { delay, movable });
        }
        improves
    }

    /// Removes and finalizes the movable with the smallest delay.
    pub(super) fn pop(&mut self) -> Option<(Movable, f64)> {
        while let Some(Entry { delay, movable }) = self.heap.pop() {
            if self.finalized.contains(&movable) {
                continue;
            }
            if self.best.get(&movable).is_some_and(|best| delay > *best) {
                continue;
            }
            self.finalized.insert(movable);
            return Some((movable, delay));
        }
        None
    }

    pub(super) fn is_final(&self, movable: Movable) -> bool {
        self.finalized.contains(&movable)
    }
}

#[cfg(test)]
mod tests {
    use slotmap::SlotMap;

    use super::*;
    use crate::topology::JunctionId;

    fn keys(n: usize) -> Vec<Movable> {
        let mut map: SlotMap<JunctionId, ()> = SlotMap::with_key();
        (0..n).map(|_| Movable::Junction(map.insert(()))).collect()
    }

    #[test]
    fn pops_in_delay_order() {
        let m = keys(3);
        let mut q = DelayQueue::new();
        q.offer(m[0], 5.0);
        q.offer(m[1], 1.0);
        q.offer(m[2], 3.0);
        let order: Vec<f64> = std::iter::from_fn(|| q.pop()).map(|(_, d)| d).collect();
        assert_eq!(order, vec![1.0, 3.0, 5.0]);
    }

    #[test]
    fn decrease_key_supersedes_stale_entry() {
        let m = keys(2);
        let mut q = DelayQueue::new();
        q.offer(m[0], 10.0);
        q.offer(m[1], 4.0);
        assert!(q.offer(m[0], 2.0));
        assert!(!q.offer(m[0], 7.0));
        assert_eq!(q.pop(), Some((m[0], 2.0)));
        assert_eq!(q.pop(), Some((m[1], 4.0)));
        assert_eq!(q.pop(), None);
    }

    #[test]
    fn finalized_entries_ignore_offers() {
        let m = keys(1);
        let mut q = DelayQueue::new();
        q.offer(m[0], 3.0);
        assert_eq!(q.pop(), Some((m[0], 3.0)));
        assert!(q.is_final(m[0]));
        assert!(!q.offer(m[0], 0.0));
        assert_eq!(q.pop(), None);
    }
}
