//! Subcommand implementations

pub mod call;
pub mod info;
pub mod init;

use amx_runtime::RuntimeOptions;
use anyhow::Context;
use std::path::Path;

/// Read a program image from disk
pub fn read_image(path: &Path) -> anyhow::Result<Vec<u8>> {
    std::fs::read(path).with_context(|| format!("cannot read {}", path.display()))
}

/// Runtime options from `config`, or the defaults
pub fn load_options(config: Option<&Path>) -> anyhow::Result<RuntimeOptions> {
    match config {
        Some(path) => RuntimeOptions::from_file(path)
            .with_context(|| format!("invalid runtime options in {}", path.display())),
        None => Ok(RuntimeOptions::default()),
    }
}
