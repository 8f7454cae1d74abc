//! poolrand: a Fortuna CSPRNG.
//!
//! An entropy-accumulating generator producing unbounded pseudorandom byte
//! streams and bias-free uniform integers. Entropy events feed 32 pools;
//! a scheduler periodically folds pool digests into the generator key on a
//! binary-weighted schedule; the generator encrypts a monotonic counter
//! under that key and rekeys itself after every request.
//!
//! ```no_run
//! use poolrand::config::PoolrandConfig;
//! use poolrand::fortuna::Fortuna;
//!
//! let fortuna = Fortuna::with_os_seed(&PoolrandConfig::default())?;
//! fortuna.submit_entropy(1, 0, b"device interrupt timings")?;
//! let bytes = fortuna.random_bytes(32)?;
//! let roll = fortuna.uniform_int(1, 6)?;
//! # Ok::<(), poolrand::error::Error>(())
//! ```

pub mod accumulator;
pub mod cli;
pub mod config;
pub mod error;
pub mod fortuna;
pub mod generator;
pub mod logging;
pub mod output;
pub mod primitives;
pub mod sampler;
pub mod scheduler;
pub mod sources;

#[cfg(test)]
pub(crate) mod testutil;

pub use config::PoolrandConfig;
pub use error::Error;
pub use fortuna::Fortuna;
