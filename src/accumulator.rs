use zeroize::Zeroize;

use crate::error::Error;
use crate::primitives::CryptoPrimitives;

pub const NUM_POOLS: usize = 32;
pub const MAX_PAYLOAD: usize = 32;

/// 32 independent entropy pools. Events are appended in the self-delimiting
/// form `[source:1][len:1][payload:len]`; reseeding consumes a pool as one
/// opaque hash input via `digest_and_clear`.
pub struct Accumulator {
    pools: [Vec<u8>; NUM_POOLS],
    /// When non-zero, a pool exceeding this byte count is compressed down to
    /// its 32-byte digest, trading raw entropy volume for bounded memory.
    compress_limit: usize,
}

impl Accumulator {
    pub fn new(compress_limit: usize) -> Self {
        Accumulator {
            pools: std::array::from_fn(|_| Vec::new()),
            compress_limit,
        }
    }

    /// Appends one entropy event to the named pool.
    pub fn submit(
        &mut self,
        source: u8,
        pool: u8,
        payload: &[u8],
        prims: &dyn CryptoPrimitives,
    ) -> Result<(), Error> {
        if pool as usize >= NUM_POOLS {
            return Err(Error::InvalidArgument(format!(
                "pool id {} out of range 0..{}",
                pool, NUM_POOLS
            )));
        }
        if payload.is_empty() || payload.len() > MAX_PAYLOAD {
            return Err(Error::InvalidArgument(format!(
                "payload length {} outside 1..={}",
                payload.len(),
                MAX_PAYLOAD
            )));
        }

        let contents = &mut self.pools[pool as usize];
        contents.push(source);
        contents.push(payload.len() as u8);
        contents.extend_from_slice(payload);

        if self.compress_limit > 0 && contents.len() > self.compress_limit {
            let digest = prims.hash(contents);
            contents.zeroize();
            contents.clear();
            contents.extend_from_slice(&digest);
        }
        Ok(())
    }

    /// Current byte length of a pool (the reseed scheduler gates on pool 0).
    pub fn pool_len(&self, pool: usize) -> usize {
        self.pools[pool].len()
    }

    /// Hashes the pool's contents and resets it to empty. Calling again
    /// before new events arrive returns the digest of empty input, not the
    /// consumed entropy.
    pub fn digest_and_clear(&mut self, pool: usize, prims: &dyn CryptoPrimitives) -> [u8; 32] {
        let contents = &mut self.pools[pool];
        let digest = prims.hash(contents);
        contents.zeroize();
        contents.clear();
        digest
    }
}
