//! `amx init`: Initialize a machine and report every stage.

use super::{load_options, read_image};
use amx_engine::{Amx, InitPolicy};
use std::path::Path;

pub fn execute(
    path: &Path,
    policy: Option<InitPolicy>,
    config: Option<&Path>,
    as_json: bool,
) -> anyhow::Result<()> {
    let mut options = load_options(config)?;
    if let Some(policy) = policy {
        options.policy = policy;
    }
    let initializer = options.build_initializer()?;
    let program = read_image(path)?;

    let mut amx = Amx::new();
    let report = initializer.run(&mut amx, &program);
    let outcome = report.outcome(options.policy);

    if as_json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        for outcome in report.outcomes() {
            match outcome.status {
                Ok(()) => println!("{:<16} ok", outcome.stage.to_string()),
                Err(err) => println!(
                    "{:<16} error {} ({})",
                    outcome.stage.to_string(),
                    outcome.code(),
                    err
                ),
            }
        }
        let unbound = amx.unbound_natives();
        if !unbound.is_empty() {
            println!("unbound natives: {}", unbound.join(", "));
        }
    }

    outcome.map_err(|err| anyhow::anyhow!("initialization failed: {} (code {})", err, err.code()))
}
