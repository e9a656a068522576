//! Unordered pairs of small integers, used as keys for undirected edges, and
//! a set of such pairs that is bucketed by the smaller element.

use std::collections::HashSet;

/// An unordered pair. The constructor normalizes the pair so that x <= y.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct IntPair {
    pub x: usize,
    pub y: usize,
}

impl IntPair {
    pub fn new(a: usize, b: usize) -> Self {
        Self {
            x: a.min(b),
            y: a.max(b),
        }
    }

    /// \returns the other element of the pair.
    pub fn other(&self, v: usize) -> usize {
        assert!(v == self.x || v == self.y, "Not an element of the pair");
        if v == self.x {
            self.y
        } else {
            self.x
        }
    }
}

/// A set of unordered pairs. Each pair is stored in the bucket of its
/// smaller element.
#[derive(Debug, Clone, Default)]
pub struct IntPairSet {
    buckets: Vec<HashSet<usize>>,
    count: usize,
}

impl IntPairSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a set that is expected to hold pairs of elements below \p n.
    pub fn with_capacity(n: usize) -> Self {
        Self {
            buckets: vec![HashSet::new(); n],
            count: 0,
        }
    }

    /// Insert the pair (a, b). \returns True if the pair was not in the set.
    pub fn add(&mut self, a: usize, b: usize) -> bool {
        let p = IntPair::new(a, b);
        if self.buckets.len() <= p.x {
            self.buckets.resize(p.x + 1, HashSet::new());
        }
        let inserted = self.buckets[p.x].insert(p.y);
        if inserted {
            self.count += 1;
        }
        inserted
    }

    pub fn contains(&self, a: usize, b: usize) -> bool {
        let p = IntPair::new(a, b);
        self.buckets
            .get(p.x)
            .map_or(false, |bucket| bucket.contains(&p.y))
    }

    /// Remove the pair (a, b). \returns True if the pair was in the set.
    pub fn remove(&mut self, a: usize, b: usize) -> bool {
        let p = IntPair::new(a, b);
        let removed = match self.buckets.get_mut(p.x) {
            Some(bucket) => bucket.remove(&p.y),
            None => false,
        };
        if removed {
            self.count -= 1;
        }
        removed
    }

    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    pub fn clear(&mut self) {
        for b in self.buckets.iter_mut() {
            b.clear();
        }
        self.count = 0;
    }

    /// Iterate over the pairs in the set, in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = IntPair> + '_ {
        self.buckets
            .iter()
            .enumerate()
            .flat_map(|(x, bucket)| bucket.iter().map(move |y| IntPair::new(x, *y)))
    }
}

#[test]
fn test_int_pair_set() {
    let mut set = IntPairSet::new();
    assert!(set.add(1, 2));
    assert!(set.add(3, 0));
    assert!(set.add(5, 5));
    assert!(!set.add(2, 1));
    assert_eq!(set.len(), 3);
    assert!(set.contains(2, 1));
    assert!(set.contains(0, 3));
    assert!(!set.contains(1, 3));
    let mut pairs: Vec<IntPair> = set.iter().collect();
    pairs.sort();
    assert_eq!(pairs, vec![IntPair::new(0, 3), IntPair::new(1, 2), IntPair::new(5, 5)]);
    assert!(set.remove(3, 0));
    assert!(!set.remove(3, 0));
    assert_eq!(set.len(), 2);
    set.clear();
    assert!(set.is_empty());
}

#[test]
fn test_int_pair() {
    let p = IntPair::new(7, 3);
    assert_eq!((p.x, p.y), (3, 7));
    assert_eq!(p.other(3), 7);
    assert_eq!(IntPair::new(3, 7), p);
}
