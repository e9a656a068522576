//! Binary heap priority queues that support decreasing the priority of an
//! item that is already in the queue. The fixed variant is used by the
//! shortest path search and stores the small integers 0..n. The generic
//! variant works with any hashable item and any priority ordering.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::hash::Hash;

const ABSENT: usize = usize::MAX;

/// A min-heap of the integers 0..n with f64 priorities.
#[derive(Debug, Clone)]
pub struct BinaryHeapPriorityQueue {
    // The heap, as a list of (priority, item).
    heap: Vec<(f64, usize)>,
    // Maps each item to its index in the heap, or ABSENT.
    positions: Vec<usize>,
}

impl BinaryHeapPriorityQueue {
    /// Create a queue that can hold the items 0..n.
    pub fn new(n: usize) -> Self {
        Self {
            heap: Vec::new(),
            positions: vec![ABSENT; n],
        }
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    pub fn contains(&self, item: usize) -> bool {
        self.positions[item] != ABSENT
    }

    /// Insert \p item with the priority \p priority. The item must not be in
    /// the queue.
    pub fn enqueue(&mut self, item: usize, priority: f64) {
        assert!(item < self.positions.len(), "Item out of range");
        assert!(!self.contains(item), "Item is already in the queue");
        self.heap.push((priority, item));
        let idx = self.heap.len() - 1;
        self.positions[item] = idx;
        self.sift_up(idx);
    }

    /// \returns the item with the lowest priority, without removing it.
    pub fn peek(&self) -> Option<(usize, f64)> {
        self.heap.first().map(|(p, i)| (*i, *p))
    }

    pub fn dequeue(&mut self) -> Option<usize> {
        self.dequeue_with_priority().map(|x| x.0)
    }

    /// Remove and return the item with the lowest priority.
    pub fn dequeue_with_priority(&mut self) -> Option<(usize, f64)> {
        if self.heap.is_empty() {
            return None;
        }
        let last = self.heap.len() - 1;
        self.swap(0, last);
        let (priority, item) = self.heap.pop()?;
        self.positions[item] = ABSENT;
        if !self.heap.is_empty() {
            self.sift_down(0);
        }
        Some((item, priority))
    }

    /// Lower the priority of \p item to \p priority. The item must be in the
    /// queue, and the new priority must not be higher than the current one.
    pub fn decrease_priority(&mut self, item: usize, priority: f64) {
        assert!(self.contains(item), "Item is not in the queue");
        let idx = self.positions[item];
        assert!(priority <= self.heap[idx].0, "Priority can only decrease");
        self.heap[idx].0 = priority;
        self.sift_up(idx);
    }

    /// \returns the current priority of \p item, if it is in the queue.
    pub fn priority_of(&self, item: usize) -> Option<f64> {
        if !self.contains(item) {
            return None;
        }
        Some(self.heap[self.positions[item]].0)
    }

    fn less(&self, a: usize, b: usize) -> bool {
        self.heap[a].0 < self.heap[b].0
    }

    fn swap(&mut self, a: usize, b: usize) {
        self.heap.swap(a, b);
        self.positions[self.heap[a].1] = a;
        self.positions[self.heap[b].1] = b;
    }

    fn sift_up(&mut self, mut idx: usize) {
        while idx > 0 {
            let parent = (idx - 1) / 2;
            if !self.less(idx, parent) {
                break;
            }
            self.swap(idx, parent);
            idx = parent;
        }
    }

    fn sift_down(&mut self, mut idx: usize) {
        loop {
            let left = idx * 2 + 1;
            let right = left + 1;
            let mut smallest = idx;
            if left < self.heap.len() && self.less(left, smallest) {
                smallest = left;
            }
            if right < self.heap.len() && self.less(right, smallest) {
                smallest = right;
            }
            if smallest == idx {
                break;
            }
            self.swap(idx, smallest);
            idx = smallest;
        }
    }

    #[cfg(test)]
    fn verify(&self) {
        for i in 1..self.heap.len() {
            assert!(self.heap[(i - 1) / 2].0 <= self.heap[i].0);
        }
        for (i, (_, item)) in self.heap.iter().enumerate() {
            assert_eq!(self.positions[*item], i);
        }
    }
}

/// A heap of hashable items with priorities of type \p P, ordered by the
/// comparator \p C. The item that compares lowest is dequeued first.
pub struct GenericBinaryHeapPriorityQueue<T, P, C>
where
    T: Hash + Eq + Clone,
    C: Fn(&P, &P) -> Ordering,
{
    heap: Vec<(P, T)>,
    positions: HashMap<T, usize>,
    compare: C,
}

impl<T, P, C> GenericBinaryHeapPriorityQueue<T, P, C>
where
    T: Hash + Eq + Clone,
    C: Fn(&P, &P) -> Ordering,
{
    pub fn new(compare: C) -> Self {
        Self {
            heap: Vec::new(),
            positions: HashMap::new(),
            compare,
        }
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    pub fn contains(&self, item: &T) -> bool {
        self.positions.contains_key(item)
    }

    pub fn enqueue(&mut self, item: T, priority: P) {
        assert!(!self.contains(&item), "Item is already in the queue");
        self.heap.push((priority, item.clone()));
        let idx = self.heap.len() - 1;
        self.positions.insert(item, idx);
        self.sift_up(idx);
    }

    pub fn peek(&self) -> Option<(&T, &P)> {
        self.heap.first().map(|(p, i)| (i, p))
    }

    pub fn dequeue(&mut self) -> Option<T> {
        self.dequeue_with_priority().map(|x| x.0)
    }

    pub fn dequeue_with_priority(&mut self) -> Option<(T, P)> {
        if self.heap.is_empty() {
            return None;
        }
        let last = self.heap.len() - 1;
        self.swap(0, last);
        let (priority, item) = self.heap.pop()?;
        self.positions.remove(&item);
        if !self.heap.is_empty() {
            self.sift_down(0);
        }
        Some((item, priority))
    }

    /// \returns the priority of \p item, if it is in the queue.
    pub fn priority_of(&self, item: &T) -> Option<&P> {
        self.positions.get(item).map(|idx| &self.heap[*idx].0)
    }

    /// Lower the priority of \p item. The item must be in the queue and the
    /// new priority must not compare higher than the current one.
    pub fn decrease_priority(&mut self, item: &T, priority: P) {
        let Some(&idx) = self.positions.get(item) else {
            panic!("Item is not in the queue");
        };
        assert!(
            (self.compare)(&priority, &self.heap[idx].0) != Ordering::Greater,
            "Priority can only decrease"
        );
        self.heap[idx].0 = priority;
        self.sift_up(idx);
    }

    fn less(&self, a: usize, b: usize) -> bool {
        (self.compare)(&self.heap[a].0, &self.heap[b].0) == Ordering::Less
    }

    fn swap(&mut self, a: usize, b: usize) {
        self.heap.swap(a, b);
        for idx in [a, b] {
            if let Some(pos) = self.positions.get_mut(&self.heap[idx].1) {
                *pos = idx;
            }
        }
    }

    fn sift_up(&mut self, mut idx: usize) {
        while idx > 0 {
            let parent = (idx - 1) / 2;
            if !self.less(idx, parent) {
                break;
            }
            self.swap(idx, parent);
            idx = parent;
        }
    }

    fn sift_down(&mut self, mut idx: usize) {
        loop {
            let left = idx * 2 + 1;
            let right = left + 1;
            let mut smallest = idx;
            if left < self.heap.len() && self.less(left, smallest) {
                smallest = left;
            }
            if right < self.heap.len() && self.less(right, smallest) {
                smallest = right;
            }
            if smallest == idx {
                break;
            }
            self.swap(idx, smallest);
            idx = smallest;
        }
    }
}

#[cfg(test)]
fn shuffled(n: usize) -> Vec<usize> {
    let mut v: Vec<usize> = (0..n).collect();
    let mut state: u32 = 41;
    for i in (1..n).rev() {
        state = state.saturating_mul(11).saturating_add(101) % 91241241;
        v.swap(i, state as usize % (i + 1));
    }
    v
}

#[test]
fn test_fixed_queue_order() {
    let mut pq = BinaryHeapPriorityQueue::new(30);
    for i in shuffled(30) {
        pq.enqueue(i, i as f64);
        pq.verify();
    }
    assert_eq!(pq.len(), 30);
    let mut prev = -1.;
    while let Some((_, p)) = pq.dequeue_with_priority() {
        assert!(p > prev);
        prev = p;
        pq.verify();
    }
    assert!(pq.is_empty());
}

#[test]
fn test_fixed_queue_decrease() {
    let mut pq = BinaryHeapPriorityQueue::new(10);
    for i in 0..10 {
        pq.enqueue(i, 10. + i as f64);
    }
    pq.decrease_priority(7, 1.);
    pq.verify();
    assert_eq!(pq.peek(), Some((7, 1.)));
    assert_eq!(pq.dequeue(), Some(7));
    assert!(!pq.contains(7));
    assert_eq!(pq.dequeue(), Some(0));
    assert_eq!(pq.priority_of(1), Some(11.));
}

#[test]
#[should_panic]
fn test_fixed_queue_decrease_absent() {
    let mut pq = BinaryHeapPriorityQueue::new(4);
    pq.enqueue(1, 1.);
    pq.decrease_priority(2, 0.);
}

#[test]
fn test_generic_queue() {
    let mut pq = GenericBinaryHeapPriorityQueue::new(|a: &(f64, usize), b: &(f64, usize)| {
        a.0.total_cmp(&b.0).then(a.1.cmp(&b.1))
    });
    for i in shuffled(30) {
        pq.enqueue(format!("n{}", i), (i as f64, i));
    }
    assert_eq!(pq.len(), 30);
    pq.decrease_priority(&"n20".to_string(), (-1., 20));
    assert_eq!(pq.dequeue(), Some("n20".to_string()));
    let mut prev = -1.;
    while let Some((_, p)) = pq.dequeue_with_priority() {
        assert!(p.0 > prev);
        prev = p.0;
    }
}
