//! Entropy producers. Every producer is a plain caller of
//! [`Fortuna::submit_entropy`]; none of them ever holds the generator lock
//! across its own work, so the accumulator stays the sole synchronization
//! point.

pub mod jitter;
pub mod os;
pub mod procfs;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use blake2::{
    digest::{consts::U32, Digest},
    Blake2b,
};

use crate::accumulator::NUM_POOLS;
use crate::config::SourcesConfig;
use crate::error::Error;
use crate::fortuna::{Fortuna, SOURCE_JITTER, SOURCE_PROCFS, SOURCE_TIMER};

type Blake2b256 = Blake2b<U32>;

/// Squashes one labelled snapshot into a 32-byte event payload. The label
/// is length-prefixed so distinct sources can never collide on content.
fn digest_event(label: &str, data: &[u8]) -> [u8; 32] {
    let mut hasher = Blake2b256::new();
    hasher.update(b"poolrand-source-v1");
    let label_bytes = label.as_bytes();
    hasher.update((label_bytes.len() as u64).to_le_bytes());
    hasher.update(label_bytes);
    hasher.update((data.len() as u64).to_le_bytes());
    hasher.update(data);
    let result = hasher.finalize();
    let mut payload = [0u8; 32];
    payload.copy_from_slice(&result);
    payload
}

/// Submits `data` as a run of <=32-byte events, rotating through the pools.
/// Distribution over pools is the producer's job, not the accumulator's.
fn submit_chunks(fortuna: &Fortuna, source: u8, pool: &mut u8, data: &[u8]) {
    for chunk in data.chunks(32) {
        if let Err(e) = fortuna.submit_entropy(source, *pool, chunk) {
            log::warn!("entropy event dropped: {}", e);
        }
        *pool = (*pool + 1) % NUM_POOLS as u8;
    }
}

fn timestamp_payload() -> Vec<u8> {
    let mut payload = Vec::with_capacity(20);
    if let Ok(now) = SystemTime::now().duration_since(UNIX_EPOCH) {
        payload.extend_from_slice(&now.as_secs().to_le_bytes());
        payload.extend_from_slice(&now.subsec_nanos().to_le_bytes());
    }
    payload.extend_from_slice(&std::process::id().to_le_bytes());
    payload
}

/// One synchronous harvesting pass over the enabled sources. The CLI runs
/// this before drawing; long-running hosts use [`spawn`] instead.
pub fn prime(fortuna: &Fortuna, cfg: &SourcesConfig) {
    let mut pool = 0u8;
    if cfg.jitter {
        submit_chunks(fortuna, SOURCE_JITTER, &mut pool, &jitter::sample_deltas(64));
    }
    if cfg.procfs {
        for (label, data) in procfs::snapshots() {
            submit_chunks(fortuna, SOURCE_PROCFS, &mut pool, &digest_event(label, &data));
        }
    }
    submit_chunks(fortuna, SOURCE_TIMER, &mut pool, &timestamp_payload());
}

/// Running background producers. Stopping (or dropping) the handle signals
/// the workers and joins them.
pub struct SourceHandle {
    shutdown: Arc<AtomicBool>,
    workers: Vec<JoinHandle<()>>,
}

impl SourceHandle {
    pub fn stop(self) {
        // Drop does the signalling and joining.
    }
}

impl Drop for SourceHandle {
    fn drop(&mut self) {
        self.shutdown.store(true, Ordering::Relaxed);
        for worker in self.workers.drain(..) {
            let _ = worker.join();
        }
    }
}

/// Sleeps in 250 ms steps, checking the shutdown flag between each.
fn interruptible_sleep(total: Duration, shutdown: &AtomicBool) {
    let mut remaining = total;
    while !shutdown.load(Ordering::Relaxed) && remaining > Duration::ZERO {
        let step = remaining.min(Duration::from_millis(250));
        thread::sleep(step);
        remaining = remaining.saturating_sub(step);
    }
}

fn spawn_worker<F>(
    name: &str,
    shutdown: Arc<AtomicBool>,
    interval: Duration,
    mut round: F,
) -> Result<JoinHandle<()>, Error>
where
    F: FnMut() + Send + 'static,
{
    let handle = thread::Builder::new()
        .name(format!("poolrand-{}", name))
        .spawn(move || {
            while !shutdown.load(Ordering::Relaxed) {
                round();
                interruptible_sleep(interval, &shutdown);
            }
        })?;
    Ok(handle)
}

/// Starts one background thread per enabled source, each submitting
/// periodic low-grade entropy events on its own timer.
pub fn spawn(fortuna: Arc<Fortuna>, cfg: &SourcesConfig) -> Result<SourceHandle, Error> {
    let shutdown = Arc::new(AtomicBool::new(false));
    let interval = Duration::from_millis(cfg.timer_interval_ms);
    let mut workers = Vec::new();

    {
        let f = fortuna.clone();
        let mut pool = 0u8;
        workers.push(spawn_worker("timer", shutdown.clone(), interval, move || {
            submit_chunks(&f, SOURCE_TIMER, &mut pool, &timestamp_payload());
        })?);
    }

    if cfg.jitter {
        let f = fortuna.clone();
        let mut pool = 0u8;
        workers.push(spawn_worker("jitter", shutdown.clone(), interval, move || {
            submit_chunks(&f, SOURCE_JITTER, &mut pool, &jitter::sample_deltas(64));
        })?);
    }

    if cfg.procfs {
        let f = fortuna;
        let mut pool = 0u8;
        workers.push(spawn_worker("procfs", shutdown.clone(), interval, move || {
            for (label, data) in procfs::snapshots() {
                submit_chunks(&f, SOURCE_PROCFS, &mut pool, &digest_event(label, &data));
            }
        })?);
    }

    Ok(SourceHandle { shutdown, workers })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PoolrandConfig;

    #[test]
    fn test_digest_event_deterministic() {
        let a = digest_event("label", b"data");
        let b = digest_event("label", b"data");
        assert_eq!(a, b);
    }

    #[test]
    fn test_digest_event_domain_separation() {
        let a = digest_event("label-a", b"same");
        let b = digest_event("label-b", b"same");
        assert_ne!(a, b);
    }

    #[test]
    fn test_digest_event_input_matters() {
        let a = digest_event("label", b"data1");
        let b = digest_event("label", b"data2");
        assert_ne!(a, b);
    }

    #[test]
    fn test_timestamp_payload_within_event_bounds() {
        let payload = timestamp_payload();
        assert!(!payload.is_empty());
        assert!(payload.len() <= 32);
    }

    #[test]
    fn test_prime_accepts_all_source_combinations() {
        let fortuna = Fortuna::new(&PoolrandConfig::default());
        for (jitter, procfs) in [(false, false), (true, false), (false, true), (true, true)] {
            let cfg = SourcesConfig {
                jitter,
                procfs,
                timer_interval_ms: 1_000,
            };
            prime(&fortuna, &cfg);
        }
    }

    #[test]
    fn test_spawn_and_stop() {
        let fortuna = Arc::new(Fortuna::new(&PoolrandConfig::default()));
        let cfg = SourcesConfig {
            jitter: true,
            procfs: true,
            timer_interval_ms: 50,
        };
        let handle = spawn(fortuna, &cfg).unwrap();
        thread::sleep(Duration::from_millis(120));
        handle.stop();
    }
}
