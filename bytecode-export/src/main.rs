use bytecode_export::{export, ExportConfig};

use std::env;
use tracing_subscriber::EnvFilter;

fn main() -> eyre::Result<()> {
    // Initialize logging, quiet unless RUST_LOG says otherwise
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let tracing_sub = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(tracing_sub)?;

    // Paths are relative to the contracts repository root
    let root = env::current_dir()?;
    let config = ExportConfig::load(root)?;

    // Load every artifact, then replace the generated file in one write
    export(&config)?;

    Ok(())
}
