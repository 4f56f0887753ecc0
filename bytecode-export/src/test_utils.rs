use std::{fs, path::Path};

use tracing_subscriber::EnvFilter;

/// Install a debug-level subscriber that writes through the test harness.
/// Safe to call from every test.
pub fn initialize_logger() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new("debug"))
        .with_target(false)
        .with_test_writer()
        .try_init();
}

/// Write a minimal forge artifact holding `bytecode` to `path`, creating parent directories
pub fn write_artifact(path: &Path, bytecode: &str) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let artifact = serde_json::json!({
        "abi": [],
        "bytecode": { "object": bytecode, "sourceMap": "", "linkReferences": {} },
        "deployedBytecode": { "object": bytecode, "sourceMap": "", "linkReferences": {} },
    });
    fs::write(path, artifact.to_string())
}
