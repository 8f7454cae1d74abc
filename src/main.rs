use std::fs;
use std::path::Path;
use std::process;

use clap::Parser;

use poolrand::cli::Cli;
use poolrand::config::{self, PoolrandConfig};
use poolrand::error::Error;
use poolrand::fortuna::Fortuna;
use poolrand::{logging, output, sources};

/// Build a PoolrandConfig by layering: defaults → TOML file → CLI overrides.
fn build_config(cli: &Cli) -> PoolrandConfig {
    let mut cfg = match config::load_config(cli.config_file.as_deref()) {
        Ok(c) => c,
        Err(e) => {
            log::warn!("{}", e);
            PoolrandConfig::default()
        }
    };

    if cli.no_jitter {
        cfg.sources.jitter = false;
    }
    if cli.no_procfs {
        cfg.sources.procfs = false;
    }
    if cli.no_self_feed {
        cfg.self_feed = false;
    }

    cfg.validate();
    cfg
}

/// Seed from a file holding exactly 64 raw bytes, or fall back to OS
/// randomness when no file is given.
fn build_seeded(cfg: &PoolrandConfig, seed_file: Option<&Path>) -> Result<Fortuna, Error> {
    match seed_file {
        Some(path) => {
            let material = fs::read(path)?;
            let fortuna = Fortuna::new(cfg);
            fortuna.seed_from_external_material(&material)?;
            Ok(fortuna)
        }
        None => Fortuna::with_os_seed(cfg),
    }
}

fn run(cli: &Cli, cfg: &PoolrandConfig) -> Result<(), Error> {
    let fortuna = build_seeded(cfg, cli.seed_file.as_deref())?;
    sources::prime(&fortuna, &cfg.sources);
    let bytes = fortuna.random_bytes(cli.bytes)?;
    output::write_output(&bytes, &cli.format, cli.output_file.as_deref())?;
    Ok(())
}

fn main() {
    let cli = Cli::parse();
    logging::init(&cli.log);
    let cfg = build_config(&cli);

    if let Err(e) = run(&cli, &cfg) {
        log::error!("{}", e);
        process::exit(1);
    }
}
