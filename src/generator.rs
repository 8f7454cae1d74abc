use zeroize::Zeroize;

use crate::error::Error;
use crate::primitives::CryptoPrimitives;

pub const KEY_LEN: usize = 32;
pub const BLOCK_LEN: usize = 16;

/// Default per-request byte cap. Bounds the output produced under a single
/// key before the mandatory rekey.
pub const DEFAULT_MAX_REQUEST: usize = 1 << 20;

/// Fortuna generator core: a 32-byte key and a 16-byte big-endian counter.
///
/// The key is only ever replaced wholesale: by `reseed` (mixed with fresh
/// entropy through the hash) or by the rekey step at the end of every
/// `pseudo_random_data` call. The counter is strictly monotonic while a key
/// is fixed and is never reset, so (key, counter) pairs are never reused.
pub struct Generator {
    key: [u8; KEY_LEN],
    counter: [u8; BLOCK_LEN],
    seeded: bool,
    max_request: usize,
}

impl Generator {
    pub fn new(max_request: usize) -> Self {
        Generator {
            key: [0u8; KEY_LEN],
            counter: [0u8; BLOCK_LEN],
            seeded: false,
            max_request,
        }
    }

    pub fn is_seeded(&self) -> bool {
        self.seeded
    }

    /// Snapshot of the counter, for callers that need to observe whether an
    /// operation advanced generator state.
    pub fn counter(&self) -> [u8; BLOCK_LEN] {
        self.counter
    }

    /// Mixes `seed_material` into the key: `key = hash(key || seed_material)`,
    /// then advances the counter by one. The counter is never reset, so
    /// counter values stay unique across the generator's whole lifetime.
    pub fn reseed(&mut self, seed_material: &[u8], prims: &dyn CryptoPrimitives) {
        let mut input = Vec::with_capacity(KEY_LEN + seed_material.len());
        input.extend_from_slice(&self.key);
        input.extend_from_slice(seed_material);
        let new_key = prims.hash(&input);
        input.zeroize();
        self.key.zeroize();
        self.key = new_key;
        increment_counter(&mut self.counter);
        self.seeded = true;
    }

    /// Produces `k` 16-byte blocks by encrypting successive counter values.
    /// Fails with `NotSeeded` before the first reseed.
    pub fn generate_blocks(
        &mut self,
        k: usize,
        prims: &dyn CryptoPrimitives,
    ) -> Result<Vec<u8>, Error> {
        if !self.seeded {
            return Err(Error::NotSeeded);
        }
        let mut out = Vec::with_capacity(k * BLOCK_LEN);
        for _ in 0..k {
            let block = prims.encrypt_block(&self.key, &self.counter);
            out.extend_from_slice(&block);
            increment_counter(&mut self.counter);
        }
        Ok(out)
    }

    /// Produces exactly `n` pseudorandom bytes, then unconditionally rekeys
    /// from two freshly generated blocks so the output just returned cannot
    /// be derived from the key left behind.
    pub fn pseudo_random_data(
        &mut self,
        n: usize,
        prims: &dyn CryptoPrimitives,
    ) -> Result<Vec<u8>, Error> {
        if n > self.max_request {
            return Err(Error::InvalidArgument(format!(
                "requested {} bytes, per-request cap is {}",
                n, self.max_request
            )));
        }
        if !self.seeded {
            return Err(Error::NotSeeded);
        }
        if n == 0 {
            return Ok(Vec::new());
        }

        let blocks = (n + BLOCK_LEN - 1) / BLOCK_LEN;
        let mut out = self.generate_blocks(blocks, prims)?;

        let mut fresh = self.generate_blocks(2, prims)?;
        self.key.zeroize();
        self.key.copy_from_slice(&fresh);
        fresh.zeroize();

        out.truncate(n);
        Ok(out)
    }
}

impl Drop for Generator {
    fn drop(&mut self) {
        self.key.zeroize();
        self.counter.zeroize();
    }
}

/// Big-endian increment with byte-wise carry from the least significant
/// (last) byte. A full wrap of all 16 bytes rolls over to zero.
pub fn increment_counter(counter: &mut [u8; BLOCK_LEN]) {
    for byte in counter.iter_mut().rev() {
        let (v, overflow) = byte.overflowing_add(1);
        *byte = v;
        if !overflow {
            break;
        }
    }
}
