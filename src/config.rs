use std::path::Path;

use serde::Deserialize;

use crate::error::Error;

/// Tuning for the Fortuna core and its entropy producers. Layered
/// defaults → TOML file → CLI overrides; `validate()` clamps every field
/// to its legal range.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PoolrandConfig {
    /// Bytes pool 0 must hold before a reseed is considered.
    pub min_pool_size: usize,
    /// Minimum time between reseeds, bounding reseed frequency under
    /// entropy flooding.
    pub min_reseed_interval_ms: u64,
    /// Per-request output cap; larger reads are chunked and rekeyed.
    pub max_request_bytes: usize,
    /// Feed fresh generator output back into the pools between chunks of
    /// an over-cap read.
    pub self_feed: bool,
    /// Compress a pool down to its digest once it exceeds this many bytes
    /// (0 = never compress).
    pub pool_compress_limit: usize,
    pub sources: SourcesConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SourcesConfig {
    /// CPU timing jitter producer.
    pub jitter: bool,
    /// /proc snapshot producer.
    pub procfs: bool,
    /// Interval between background producer rounds.
    pub timer_interval_ms: u64,
}

impl Default for PoolrandConfig {
    fn default() -> Self {
        Self {
            min_pool_size: 64,
            min_reseed_interval_ms: 100,
            max_request_bytes: 1 << 20,
            self_feed: true,
            pool_compress_limit: 65_536,
            sources: SourcesConfig::default(),
        }
    }
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            jitter: true,
            procfs: true,
            timer_interval_ms: 1_000,
        }
    }
}

impl PoolrandConfig {
    /// Clamp fields to valid ranges.
    pub fn validate(&mut self) {
        self.min_pool_size = self.min_pool_size.clamp(1, 4096);
        self.min_reseed_interval_ms = self.min_reseed_interval_ms.clamp(10, 60_000);
        self.max_request_bytes = self.max_request_bytes.clamp(16, 16 << 20);
        if self.pool_compress_limit != 0 {
            self.pool_compress_limit = self.pool_compress_limit.clamp(64, 16 << 20);
        }
        self.sources.timer_interval_ms = self.sources.timer_interval_ms.clamp(50, 60_000);
    }
}

/// Load configuration from a TOML file.
///
/// - If `explicit_path` is `Some` and the file is missing, returns an error.
/// - If `explicit_path` is `None`, tries `/etc/poolrand.toml`; if missing,
///   returns defaults.
pub fn load_config(explicit_path: Option<&Path>) -> Result<PoolrandConfig, Error> {
    let path = match explicit_path {
        Some(p) => {
            if !p.exists() {
                return Err(Error::InvalidArgument(format!(
                    "config file not found: {}",
                    p.display()
                )));
            }
            p.to_path_buf()
        }
        None => {
            let default = Path::new("/etc/poolrand.toml");
            if !default.exists() {
                return Ok(PoolrandConfig::default());
            }
            default.to_path_buf()
        }
    };

    let contents = std::fs::read_to_string(&path).map_err(|e| {
        Error::InvalidArgument(format!("failed to read config {}: {}", path.display(), e))
    })?;

    let config: PoolrandConfig = toml::from_str(&contents).map_err(|e| {
        Error::InvalidArgument(format!("failed to parse config {}: {}", path.display(), e))
    })?;

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_values() {
        let cfg = PoolrandConfig::default();
        assert_eq!(cfg.min_pool_size, 64);
        assert_eq!(cfg.min_reseed_interval_ms, 100);
        assert_eq!(cfg.max_request_bytes, 1 << 20);
        assert!(cfg.self_feed);
        assert_eq!(cfg.pool_compress_limit, 65_536);
        assert!(cfg.sources.jitter);
        assert!(cfg.sources.procfs);
        assert_eq!(cfg.sources.timer_interval_ms, 1_000);
    }

    #[test]
    fn test_validate_clamps_high() {
        let mut cfg = PoolrandConfig {
            min_pool_size: 100_000,
            min_reseed_interval_ms: 1_000_000,
            max_request_bytes: usize::MAX,
            pool_compress_limit: usize::MAX,
            ..Default::default()
        };
        cfg.sources.timer_interval_ms = 1_000_000;
        cfg.validate();
        assert_eq!(cfg.min_pool_size, 4096);
        assert_eq!(cfg.min_reseed_interval_ms, 60_000);
        assert_eq!(cfg.max_request_bytes, 16 << 20);
        assert_eq!(cfg.pool_compress_limit, 16 << 20);
        assert_eq!(cfg.sources.timer_interval_ms, 60_000);
    }

    #[test]
    fn test_validate_clamps_low() {
        let mut cfg = PoolrandConfig {
            min_pool_size: 0,
            min_reseed_interval_ms: 0,
            max_request_bytes: 0,
            pool_compress_limit: 1,
            ..Default::default()
        };
        cfg.validate();
        assert_eq!(cfg.min_pool_size, 1);
        assert_eq!(cfg.min_reseed_interval_ms, 10);
        assert_eq!(cfg.max_request_bytes, 16);
        assert_eq!(cfg.pool_compress_limit, 64);
    }

    #[test]
    fn test_validate_keeps_compress_disabled() {
        let mut cfg = PoolrandConfig {
            pool_compress_limit: 0,
            ..Default::default()
        };
        cfg.validate();
        assert_eq!(cfg.pool_compress_limit, 0); // 0 means never compress
    }

    #[test]
    fn test_toml_parsing() {
        let dir = std::env::temp_dir();
        let path = dir.join("poolrand_test_config.toml");
        {
            let mut f = std::fs::File::create(&path).unwrap();
            write!(
                f,
                r#"
min_pool_size = 128
self_feed = false

[sources]
jitter = false
timer_interval_ms = 250
"#
            )
            .unwrap();
        }
        let config = load_config(Some(&path)).unwrap();
        assert_eq!(config.min_pool_size, 128);
        assert!(!config.self_feed);
        assert!(!config.sources.jitter);
        assert_eq!(config.sources.timer_interval_ms, 250);
        // Unset fields should get defaults
        assert!(config.sources.procfs);
        assert_eq!(config.min_reseed_interval_ms, 100);
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_missing_explicit_config_errors() {
        let path = std::path::Path::new("/tmp/poolrand_nonexistent_config.toml");
        let result = load_config(Some(path));
        assert!(result.is_err());
    }
}
