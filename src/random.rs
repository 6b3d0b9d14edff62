//! Random sources. Every operation that needs randomness takes an explicit `&mut impl Rng`, so
//! a run is reproducible from its seed and tests can substitute deterministic doubles.

use core::cmp::min;
use rand::{RngCore, SeedableRng};
use std::{
    fs::File,
    io::{self, Read},
};

/// Small and fast seedable generator, the default random source of an evolution
#[derive(Debug, Clone)]
pub struct WyRng {
    state: u64,
}

impl WyRng {
    pub fn seeded(state: u64) -> Self {
        Self { state }
    }
}

impl RngCore for WyRng {
    fn next_u32(&mut self) -> u32 {
        self.next_u64() as u32
    }

    fn next_u64(&mut self) -> u64 {
        const WY_CONST_0: u64 = 0x2d35_8dcc_aa6c_78a5;
        const WY_CONST_1: u64 = 0x8bb8_4b93_962e_acc9;
        self.state = self.state.wrapping_add(WY_CONST_0);
        let t = u128::from(self.state) * u128::from(self.state ^ WY_CONST_1);
        (t as u64) ^ (t >> 64) as u64
    }

    fn fill_bytes(&mut self, dst: &mut [u8]) {
        let mut idx = 0;
        while idx < dst.len() {
            let lim = min(8, dst.len() - idx);
            dst[idx..idx + lim].copy_from_slice(&self.next_u64().to_ne_bytes()[..lim]);
            idx += lim;
        }
    }
}

impl SeedableRng for WyRng {
    type Seed = [u8; 8];

    fn from_seed(seed: Self::Seed) -> Self {
        Self::seeded(u64::from_le_bytes(seed))
    }

    fn seed_from_u64(state: u64) -> Self {
        Self::seeded(state)
    }
}

pub fn seed_urandom() -> io::Result<u64> {
    let mut file = File::open("/dev/urandom")?;
    let mut buffer = [0u8; 8];
    file.read_exact(&mut buffer)?;
    Ok(u64::from_le_bytes(buffer))
}

/// A generator seeded from the OS, for runs that don't need to be reproduced
pub fn default_rng() -> io::Result<WyRng> {
    Ok(WyRng::seeded(seed_urandom()?))
}

/// Test double that returns the same word forever. Uniform floats drawn from it are constant,
/// which pins down every accept/reject decision made against a probability.
#[cfg(test)]
#[derive(Debug, Clone)]
pub struct ConstRng(pub u64);

#[cfg(test)]
impl ConstRng {
    /// A generator whose `random::<f64>()` is (almost exactly) `p`, for `p` in `[0, 1)`
    pub fn uniform(p: f64) -> Self {
        Self(((p * (1u64 << 53) as f64) as u64) << 11)
    }
}

#[cfg(test)]
impl RngCore for ConstRng {
    fn next_u32(&mut self) -> u32 {
        (self.0 >> 32) as u32
    }

    fn next_u64(&mut self) -> u64 {
        self.0
    }

    fn fill_bytes(&mut self, dst: &mut [u8]) {
        for chunk in dst.chunks_mut(8) {
            let lim = chunk.len();
            chunk.copy_from_slice(&self.0.to_ne_bytes()[..lim]);
        }
    }
}
