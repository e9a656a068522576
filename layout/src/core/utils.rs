//! This is a collection of useful utilities.

use std::fs::File;
use std::io::{Error, Write};

/// Write \p content into the file \p filename.
pub fn save_to_file(filename: &str, content: &str) -> Result<(), Error> {
    let mut f = File::create(filename)?;
    f.write_all(content.as_bytes())?;
    #[cfg(feature = "log")]
    log::info!("Wrote {}", filename);
    Result::Ok(())
}

/// A tiny deterministic pseudo random generator, used for seeding the power
/// iteration and for generating synthetic graphs.
#[derive(Debug, Clone)]
pub struct PseudoRandom {
    state: u32,
}

const RAND_MODULO: u32 = 91241241;

impl PseudoRandom {
    pub fn new(seed: u32) -> Self {
        Self {
            state: seed % RAND_MODULO,
        }
    }

    pub fn next_u32(&mut self) -> u32 {
        let k = self
            .state
            .saturating_mul(11)
            .saturating_add(101)
            .wrapping_rem(RAND_MODULO);
        self.state = k;
        k
    }

    /// \returns a number in the range [0, 1).
    pub fn next_f64(&mut self) -> f64 {
        self.next_u32() as f64 / RAND_MODULO as f64
    }

    /// \returns a number in the range [0, n).
    pub fn below(&mut self, n: usize) -> usize {
        assert!(n > 0);
        self.next_u32() as usize % n
    }
}

#[test]
fn test_pseudo_random() {
    let mut a = PseudoRandom::new(41);
    let mut b = PseudoRandom::new(41);
    for _ in 0..100 {
        let x = a.next_f64();
        assert!((0. ..1.).contains(&x));
        assert_eq!(x, b.next_f64());
    }
    assert!(a.below(3) < 3);
}
