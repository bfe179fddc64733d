//! Arithmetic in the prime field GF(p).
//!
//! Elements are the residues `0..p` stored as `u32`; every operation widens to
//! `u64` before reducing, so any `p` that fits in a `u32` is safe.

use serde::{Deserialize, Serialize};

/// The prime field of order `p`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PrimeField {
    p: u32,
}

impl PrimeField {
    /// Returns `None` unless `p` is prime.
    pub fn new(p: u32) -> Option<Self> {
        is_prime(p).then_some(Self { p })
    }

    pub const fn order(self) -> u32 {
        self.p
    }

    pub fn elements(self) -> std::ops::Range<u32> {
        0..self.p
    }

    pub fn reduce(self, a: u64) -> u32 {
        (a % self.p as u64) as u32
    }

    pub fn add(self, a: u32, b: u32) -> u32 {
        self.reduce(a as u64 + b as u64)
    }

    pub fn mul(self, a: u32, b: u32) -> u32 {
        self.reduce(a as u64 * b as u64)
    }

    pub fn neg(self, a: u32) -> u32 {
        let a = a % self.p;
        if a == 0 {
            0
        } else {
            self.p - a
        }
    }

    pub fn pow(self, base: u32, mut exp: u32) -> u32 {
        let mut result = 1 % self.p;
        let mut base = base % self.p;
        while exp > 0 {
            if exp & 1 == 1 {
                result = self.mul(result, base);
            }
            base = self.mul(base, base);
            exp >>= 1;
        }
        result
    }

    /// Multiplicative inverse via Fermat's little theorem; `None` for zero.
    pub fn inv(self, a: u32) -> Option<u32> {
        if a % self.p == 0 {
            return None;
        }
        Some(self.pow(a, self.p - 2))
    }

    /// `a / b`, or `None` when `b` is zero.
    pub fn div(self, a: u32, b: u32) -> Option<u32> {
        self.inv(b).map(|inv| self.mul(a, inv))
    }

    /// Dot product of two homogeneous coordinate vectors.
    pub fn dot(self, a: [u32; 3], b: [u32; 3]) -> u32 {
        let sum = a
            .iter()
            .zip(b.iter())
            .map(|(&x, &y)| x as u64 * y as u64)
            .sum::<u64>();
        self.reduce(sum)
    }
}

/// Trial division; plenty for the orders a deck can have.
pub fn is_prime(n: u32) -> bool {
    if n < 2 {
        return false;
    }
    if n % 2 == 0 {
        return n == 2;
    }
    let n = n as u64;
    let mut d = 3u64;
    while d * d <= n {
        if n % d == 0 {
            return false;
        }
        d += 2;
    }
    true
}
