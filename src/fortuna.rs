use std::sync::{Arc, Mutex, MutexGuard};
use std::thread;

use rand_core::TryRngCore;
use zeroize::Zeroize;

use crate::accumulator::{Accumulator, NUM_POOLS};
use crate::config::PoolrandConfig;
use crate::error::Error;
use crate::generator::Generator;
use crate::primitives::{CryptoPrimitives, StdPrimitives};
use crate::sampler;
use crate::scheduler::{Clock, Scheduler, SystemClock};
use crate::sources;

/// Initial seed material must be exactly this long.
pub const SEED_LEN: usize = 64;

/// Reserved source ids (top four of the id space, by convention) for
/// internally generated low-grade entropy, kept clear of caller sources.
pub const SOURCE_SELF: u8 = 255;
pub const SOURCE_TIMER: u8 = 254;
pub const SOURCE_PROCFS: u8 = 253;
pub const SOURCE_JITTER: u8 = 252;

/// Bytes of own output fed back into the pools between chunks of an
/// over-cap read.
const SELF_FEED_BYTES: usize = 32;

/// Draws between voluntary yields inside a batch. The lock stays held, so
/// the batch's value sequence is unaffected.
const YIELD_EVERY: usize = 1024;

struct Inner {
    acc: Accumulator,
    generator: Generator,
    scheduler: Scheduler,
    /// Round-robin target for self-feed events.
    feed_pool: u8,
}

/// The assembled Fortuna instrument: accumulator, generator and reseed
/// scheduler behind one exclusive lock.
///
/// Construction is two-phase: a fresh instance is unseeded and every draw
/// fails with [`Error::NotSeeded`] until [`seed_from_external_material`]
/// runs (or use [`Fortuna::with_os_seed`] to do both in one step).
///
/// [`seed_from_external_material`]: Fortuna::seed_from_external_material
pub struct Fortuna {
    inner: Mutex<Inner>,
    prims: Arc<dyn CryptoPrimitives>,
    clock: Arc<dyn Clock>,
    max_request: usize,
    self_feed: bool,
}

impl Fortuna {
    /// Unseeded instance with the default primitives and system clock.
    pub fn new(config: &PoolrandConfig) -> Self {
        Self::with_parts(config, Arc::new(StdPrimitives), Arc::new(SystemClock::new()))
    }

    /// Unseeded instance with caller-supplied primitives and clock.
    pub fn with_parts(
        config: &PoolrandConfig,
        prims: Arc<dyn CryptoPrimitives>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Fortuna {
            inner: Mutex::new(Inner {
                acc: Accumulator::new(config.pool_compress_limit),
                generator: Generator::new(config.max_request_bytes),
                scheduler: Scheduler::new(config.min_pool_size, config.min_reseed_interval_ms),
                feed_pool: 0,
            }),
            prims,
            clock,
            max_request: config.max_request_bytes,
            self_feed: config.self_feed,
        }
    }

    /// Convenience bootstrap: build and seed from 64 bytes of OS randomness.
    pub fn with_os_seed(config: &PoolrandConfig) -> Result<Self, Error> {
        let fortuna = Self::new(config);
        let mut seed = [0u8; SEED_LEN];
        sources::os::fill_os_random(&mut seed)?;
        fortuna.seed_from_external_material(&seed)?;
        seed.zeroize();
        Ok(fortuna)
    }

    fn lock(&self) -> Result<MutexGuard<'_, Inner>, Error> {
        self.inner
            .lock()
            .map_err(|_| Error::Internal("generator lock poisoned".into()))
    }

    pub fn is_seeded(&self) -> Result<bool, Error> {
        Ok(self.lock()?.generator.is_seeded())
    }

    /// Reseeds performed so far (not counting the initial seed).
    pub fn reseed_count(&self) -> Result<u64, Error> {
        Ok(self.lock()?.scheduler.reseed_counter())
    }

    /// Snapshot of the generator counter, for observing whether an
    /// operation advanced generator state.
    pub fn counter_snapshot(&self) -> Result<[u8; 16], Error> {
        Ok(self.lock()?.generator.counter())
    }

    /// Appends one entropy event to the named pool. Producers distribute
    /// events over pools themselves (round-robin or random); the
    /// accumulator takes the target as given.
    pub fn submit_entropy(&self, source: u8, pool: u8, payload: &[u8]) -> Result<(), Error> {
        let mut guard = self.lock()?;
        guard.acc.submit(source, pool, payload, self.prims.as_ref())
    }

    /// Performs the one-time initial seeding with exactly 64 bytes of
    /// externally drawn material. A second call fails: the
    /// awaiting-seed → operational transition happens at most once.
    pub fn seed_from_external_material(&self, material: &[u8]) -> Result<(), Error> {
        if material.len() != SEED_LEN {
            return Err(Error::InvalidSeedLength(material.len()));
        }
        let mut guard = self.lock()?;
        if guard.generator.is_seeded() {
            return Err(Error::InvalidArgument(
                "generator is already seeded; initial seeding happens at most once".into(),
            ));
        }
        guard.generator.reseed(material, self.prims.as_ref());
        guard.scheduler.record_initial_seed(self.clock.now_ms());
        log::info!("generator seeded from {} bytes of external material", SEED_LEN);
        Ok(())
    }

    /// One output request under the lock: reseed check first, then bytes.
    fn random_data_locked(&self, inner: &mut Inner, n: usize) -> Result<Vec<u8>, Error> {
        inner.scheduler.maybe_reseed(
            &mut inner.acc,
            &mut inner.generator,
            self.prims.as_ref(),
            self.clock.now_ms(),
        );
        inner.generator.pseudo_random_data(n, self.prims.as_ref())
    }

    fn self_feed_locked(&self, inner: &mut Inner) -> Result<(), Error> {
        // A tiny configured cap still leaves a valid (smaller) feed event.
        let feed_len = SELF_FEED_BYTES.min(self.max_request);
        let mut feed = inner
            .generator
            .pseudo_random_data(feed_len, self.prims.as_ref())?;
        let pool = inner.feed_pool;
        inner.feed_pool = (inner.feed_pool + 1) % NUM_POOLS as u8;
        inner.acc.submit(SOURCE_SELF, pool, &feed, self.prims.as_ref())?;
        feed.zeroize();
        Ok(())
    }

    /// Produces `n` pseudorandom bytes. Requests above the per-call cap are
    /// served in capped chunks; between chunks, a slice of fresh output is
    /// fed back into the accumulator when the `self_feed` policy is on.
    pub fn random_bytes(&self, n: usize) -> Result<Vec<u8>, Error> {
        let mut guard = self.lock()?;
        let inner = &mut *guard;
        if n <= self.max_request {
            return self.random_data_locked(inner, n);
        }
        let mut out = Vec::with_capacity(n);
        let mut remaining = n;
        while remaining > 0 {
            let chunk = remaining.min(self.max_request);
            out.extend_from_slice(&self.random_data_locked(inner, chunk)?);
            remaining -= chunk;
            if remaining > 0 && self.self_feed {
                self.self_feed_locked(inner)?;
            }
        }
        Ok(out)
    }

    fn sample_locked(&self, inner: &mut Inner, min: i64, max: i64) -> Result<i64, Error> {
        sampler::sample_int(min, max, |buf| {
            let bytes = self.random_data_locked(inner, buf.len())?;
            buf.copy_from_slice(&bytes);
            Ok(())
        })
    }

    /// Uniform integer over the inclusive range `min..=max`. `min == max`
    /// returns immediately without touching generator state.
    pub fn uniform_int(&self, min: i64, max: i64) -> Result<i64, Error> {
        if min == max {
            return Ok(min);
        }
        let mut guard = self.lock()?;
        self.sample_locked(&mut guard, min, max)
    }

    /// `count` independent uniform draws with the lock held for the whole
    /// batch, so no other caller's draw interleaves mid-batch. Long batches
    /// yield the CPU periodically without releasing the lock.
    pub fn uniform_int_batch(&self, count: usize, min: i64, max: i64) -> Result<Vec<i64>, Error> {
        if min > max {
            return Err(Error::InvalidArgument(format!(
                "inverted bounds: min {} > max {}",
                min, max
            )));
        }
        if count == 0 {
            return Ok(Vec::new());
        }
        if min == max {
            return Ok(vec![min; count]);
        }
        let mut guard = self.lock()?;
        let inner = &mut *guard;
        let mut out = Vec::with_capacity(count);
        for i in 0..count {
            out.push(self.sample_locked(inner, min, max)?);
            if (i + 1) % YIELD_EVERY == 0 {
                thread::yield_now();
            }
        }
        Ok(out)
    }
}

impl TryRngCore for Fortuna {
    type Error = Error;

    fn try_next_u32(&mut self) -> Result<u32, Error> {
        let b = self.random_bytes(4)?;
        Ok(u32::from_be_bytes([b[0], b[1], b[2], b[3]]))
    }

    fn try_next_u64(&mut self) -> Result<u64, Error> {
        let b = self.random_bytes(8)?;
        let mut buf = [0u8; 8];
        buf.copy_from_slice(&b);
        Ok(u64::from_be_bytes(buf))
    }

    fn try_fill_bytes(&mut self, dst: &mut [u8]) -> Result<(), Error> {
        let b = self.random_bytes(dst.len())?;
        dst.copy_from_slice(&b);
        Ok(())
    }
}
