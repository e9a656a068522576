//! Logarithmic time searches for the extreme values of sequences with known
//! shape. A unimodal sequence rises and then falls (or the reverse) over a
//! linear domain. A bimodal sequence lives on a cyclic domain and has one
//! maximum and one minimum, like the projection of the vertices of a convex
//! polygon on a direction, or the angle in which the vertices are seen from
//! an outside point.

/// Below this length the searches just scan the sequence.
const SCAN_LIMIT: usize = 8;

fn argmax_scan(f: &impl Fn(usize) -> f64, indices: impl Iterator<Item = usize>) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for i in indices {
        let v = f(i);
        match best {
            Some((_, bv)) if bv >= v => {}
            _ => best = Some((i, v)),
        }
    }
    best.map(|x| x.0)
}

/// A sequence f(0), ..., f(len - 1) that increases and then decreases, or
/// decreases and then increases. This is the linear-domain counterpart of
/// `BimodalSequence`, for open chains such as one side of a convex boundary.
pub struct UnimodalSequence<F: Fn(usize) -> f64> {
    f: F,
    len: usize,
}

impl<F: Fn(usize) -> f64> UnimodalSequence<F> {
    pub fn new(f: F, len: usize) -> Self {
        Self { f, len }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// \returns the index of the largest element.
    pub fn find_maximum(&self) -> Option<usize> {
        self.find_max_of(&self.f)
    }

    /// \returns the index of the smallest element.
    pub fn find_minimum(&self) -> Option<usize> {
        let neg = |i: usize| -(self.f)(i);
        self.find_max_of(&neg)
    }

    fn find_max_of(&self, f: &impl Fn(usize) -> f64) -> Option<usize> {
        if self.len == 0 {
            return None;
        }
        let last = self.len - 1;
        if self.len <= SCAN_LIMIT {
            return argmax_scan(f, 0..self.len);
        }

        // Binary search on the slope. The search converges on the peak of a
        // rising-then-falling sequence. For a falling-then-rising sequence the
        // maximum is at one of the ends, so the ends are always checked.
        let mut lo = 0;
        let mut hi = last;
        while hi - lo > 2 {
            let mid = (lo + hi) / 2;
            let a = f(mid);
            let b = f(mid + 1);
            if a < b {
                lo = mid + 1;
            } else if a > b {
                hi = mid;
            } else {
                // A plateau hides the direction of the slope.
                let inner = argmax_scan(f, lo..=hi)?;
                return argmax_scan(f, [inner, 0, last].into_iter());
            }
        }
        let inner = argmax_scan(f, lo..=hi)?;
        argmax_scan(f, [inner, 0, last].into_iter())
    }
}

/// A cyclic sequence f(0), ..., f(len - 1) with a single maximum and a
/// single minimum.
pub struct BimodalSequence<F: Fn(usize) -> f64> {
    f: F,
    len: usize,
}

impl<F: Fn(usize) -> f64> BimodalSequence<F> {
    pub fn new(f: F, len: usize) -> Self {
        Self { f, len }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// \returns the index of the largest element.
    pub fn find_maximum(&self) -> Option<usize> {
        self.find_max_of(&self.f)
    }

    /// \returns the index of the smallest element.
    pub fn find_minimum(&self) -> Option<usize> {
        let neg = |i: usize| -(self.f)(i);
        self.find_max_of(&neg)
    }

    fn find_max_of(&self, f: &impl Fn(usize) -> f64) -> Option<usize> {
        let n = self.len;
        if n == 0 {
            return None;
        }
        if n <= SCAN_LIMIT {
            return argmax_scan(f, 0..n);
        }
        match Self::search(f, n) {
            Some(idx) => Some(idx),
            // Plateaus and collapsed chains break the search.
            None => argmax_scan(f, 0..n),
        }
    }

    /// The binary search for the maximum of a cyclic bimodal sequence. The
    /// chain [a, b] always contains the maximum; an index is "up" if the
    /// sequence rises from it to the next index. \returns None if the search
    /// got confused by equal values.
    fn search(f: &impl Fn(usize) -> f64, n: usize) -> Option<usize> {
        let at = |i: usize| f(i % n);
        let is_max = |i: usize| at(i + 1) <= at(i) && at(i + n - 1) <= at(i);

        if is_max(0) {
            return Some(0);
        }

        let mut a = 0;
        let mut b = n;
        let mut up_a = at(1) > at(0);
        // Each iteration halves the chain.
        let limit = 2 * (usize::BITS - n.leading_zeros()) as usize + 4;
        for _ in 0..limit {
            if b <= a + 1 {
                return None;
            }
            let c = (a + b) / 2;
            if is_max(c) {
                return Some(c % n);
            }
            let up_c = at(c + 1) > at(c);
            if up_a {
                if !up_c || at(a) > at(c) {
                    b = c;
                } else {
                    a = c;
                    up_a = up_c;
                }
            } else if up_c || at(a) >= at(c) {
                a = c;
                up_a = up_c;
            } else {
                b = c;
            }
        }
        None
    }
}

#[test]
fn test_unimodal() {
    // Rises and then falls.
    let v: Vec<f64> = vec![1., 3., 5., 9., 12., 11., 7., 4., 2., 1., 0., -1.];
    let seq = UnimodalSequence::new(|i| v[i], v.len());
    assert_eq!(seq.find_maximum(), Some(4));
    let min = seq.find_minimum().unwrap();
    assert_eq!(v[min], -1.);

    // Falls and then rises.
    let w: Vec<f64> = v.iter().map(|x| -x).collect();
    let seq = UnimodalSequence::new(|i| w[i], w.len());
    assert_eq!(seq.find_minimum(), Some(4));
    let max = seq.find_maximum().unwrap();
    assert_eq!(w[max], 1.);

    // Monotonic sequences have their extremes at the ends.
    let seq = UnimodalSequence::new(|i| i as f64, 100);
    assert_eq!(seq.find_maximum(), Some(99));
    assert_eq!(seq.find_minimum(), Some(0));

    // With a plateau.
    let p: Vec<f64> = vec![0., 1., 2., 2., 2., 2., 2., 2., 2., 1., 0.];
    let seq = UnimodalSequence::new(|i| p[i], p.len());
    assert_eq!(p[seq.find_maximum().unwrap()], 2.);
}

#[test]
fn test_bimodal() {
    for n in [3, 9, 10, 17, 64, 101] {
        for shift in 0..n {
            let f = |i: usize| {
                let t = ((i + shift) % n) as f64 / n as f64;
                (t * std::f64::consts::TAU).sin() + 0.3 * (t * std::f64::consts::TAU).cos()
            };
            let seq = BimodalSequence::new(f, n);
            let max = seq.find_maximum().unwrap();
            let min = seq.find_minimum().unwrap();
            let brute_max = (0..n).map(f).fold(f64::NEG_INFINITY, f64::max);
            let brute_min = (0..n).map(f).fold(f64::INFINITY, f64::min);
            assert_eq!(f(max), brute_max, "n = {} shift = {}", n, shift);
            assert_eq!(f(min), brute_min, "n = {} shift = {}", n, shift);
        }
    }

    // A collapsed chain.
    let seq = BimodalSequence::new(|_| 1., 20);
    assert!(seq.find_maximum().is_some());
}
