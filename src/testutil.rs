//! Deterministic stand-ins for the clock and the crypto primitives, used by
//! tests that assert byte-level reproducibility.

use std::sync::atomic::{AtomicU64, Ordering};

use crate::primitives::CryptoPrimitives;
use crate::scheduler::Clock;

/// Cheap deterministic primitives. Not cryptographic; only the shape of the
/// protocol (sizes, determinism, key sensitivity) matters in tests.
pub struct FakePrimitives;

impl CryptoPrimitives for FakePrimitives {
    fn hash(&self, data: &[u8]) -> [u8; 32] {
        let mut digest = [0u8; 32];
        for (i, &b) in data.iter().enumerate() {
            digest[i % 32] = digest[i % 32].wrapping_mul(31).wrapping_add(b);
        }
        // Fold the length in so prefixes hash differently.
        let len = (data.len() as u64).to_be_bytes();
        for (i, &b) in len.iter().enumerate() {
            digest[24 + i] ^= b;
        }
        digest
    }

    fn encrypt_block(&self, key: &[u8; 32], block: &[u8; 16]) -> [u8; 16] {
        let mut out = [0u8; 16];
        for i in 0..16 {
            out[i] = block[i] ^ key[i] ^ key[i + 16].rotate_left(3);
        }
        out
    }
}

/// A clock that only moves when a test tells it to.
pub struct ManualClock {
    now_ms: AtomicU64,
}

impl ManualClock {
    pub fn new(start_ms: u64) -> Self {
        ManualClock {
            now_ms: AtomicU64::new(start_ms),
        }
    }

    pub fn advance(&self, delta_ms: u64) {
        self.now_ms.fetch_add(delta_ms, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> u64 {
        self.now_ms.load(Ordering::SeqCst)
    }
}
