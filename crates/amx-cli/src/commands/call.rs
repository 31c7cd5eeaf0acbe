//! `amx call`: Initialize a machine and call one native.

use super::{load_options, read_image};
use amx_engine::Amx;
use amx_sdk::Cell;
use anyhow::Context;
use std::path::Path;
use tracing::debug;

pub fn execute(
    path: &Path,
    native: &str,
    args: &[String],
    config: Option<&Path>,
) -> anyhow::Result<()> {
    let initializer = load_options(config)?.build_initializer()?;
    let program = read_image(path)?;

    let mut amx = Amx::new();
    initializer
        .initialize(&mut amx, &program)
        .context("initialization failed")?;

    let cells = args
        .iter()
        .map(|arg| to_cell(&mut amx, arg))
        .collect::<anyhow::Result<Vec<Cell>>>()?;

    debug!(native, args = cells.len(), "calling native");
    let result = amx
        .call_native_by_name(native, &cells)
        .with_context(|| format!("native {} failed", native))?;
    println!("{}", result);
    Ok(())
}

/// Integers become cells; other text is stored on the heap as a string
fn to_cell(amx: &mut Amx, arg: &str) -> anyhow::Result<Cell> {
    if let Ok(value) = arg.parse::<i32>() {
        return Ok(Cell::new(value));
    }
    let cells = arg.chars().count() + 1;
    let addr = amx
        .allot(cells)
        .with_context(|| format!("no heap space for argument {:?}", arg))?;
    amx.write_string(addr, arg, false, cells)?;
    Ok(addr)
}
