use std::time::Instant;

use zeroize::Zeroize;

use crate::accumulator::{Accumulator, NUM_POOLS};
use crate::generator::Generator;
use crate::primitives::CryptoPrimitives;

/// Millisecond wall-clock source, behind a seam so tests can drive time.
pub trait Clock: Send + Sync {
    fn now_ms(&self) -> u64;
}

/// Monotonic clock measured from construction.
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        SystemClock {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now_ms(&self) -> u64 {
        self.origin.elapsed().as_millis() as u64
    }
}

/// Pools consumed for a given reseed count: pool `i` iff `count % 2^i == 0`.
/// Pool 0 feeds every reseed; pool 31 only every 2^31st.
pub fn eligible_pools(reseed_counter: u64) -> Vec<usize> {
    (0..NUM_POOLS)
        .filter(|&i| reseed_counter % (1u64 << i) == 0)
        .collect()
}

/// Decides, per output request, whether accumulated entropy justifies a
/// reseed, and performs it. Two gates must both hold: pool 0 has reached
/// `min_pool_size` bytes, and `min_interval_ms` has elapsed since the last
/// reseed (bounding reseed frequency under entropy flooding).
pub struct Scheduler {
    reseed_counter: u64,
    last_reseed_ms: Option<u64>,
    min_pool_size: usize,
    min_interval_ms: u64,
}

impl Scheduler {
    pub fn new(min_pool_size: usize, min_interval_ms: u64) -> Self {
        Scheduler {
            reseed_counter: 0,
            last_reseed_ms: None,
            min_pool_size,
            min_interval_ms,
        }
    }

    pub fn reseed_counter(&self) -> u64 {
        self.reseed_counter
    }

    /// Records the initial 64-byte seed time so the interval gate applies to
    /// the first scheduled reseed as well.
    pub fn record_initial_seed(&mut self, now_ms: u64) {
        self.last_reseed_ms = Some(now_ms);
    }

    /// Runs before any bytes are produced for a request. Returns whether a
    /// reseed happened. No-op until the generator has its initial seed.
    pub fn maybe_reseed(
        &mut self,
        acc: &mut Accumulator,
        generator: &mut Generator,
        prims: &dyn CryptoPrimitives,
        now_ms: u64,
    ) -> bool {
        if !generator.is_seeded() {
            return false;
        }
        if acc.pool_len(0) < self.min_pool_size {
            return false;
        }
        if let Some(last) = self.last_reseed_ms {
            if now_ms.saturating_sub(last) < self.min_interval_ms {
                return false;
            }
        }

        self.reseed_counter += 1;
        let mut seed = Vec::with_capacity(32 * 4);
        for pool in eligible_pools(self.reseed_counter) {
            seed.extend_from_slice(&acc.digest_and_clear(pool, prims));
        }
        generator.reseed(&seed, prims);
        seed.zeroize();
        self.last_reseed_ms = Some(now_ms);
        log::debug!(
            "reseed #{} consumed {} pool(s)",
            self.reseed_counter,
            eligible_pools(self.reseed_counter).len()
        );
        true
    }
}
