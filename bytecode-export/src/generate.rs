use std::{fmt::Write as _, fs, io::Write as _, path::Path};
use tempfile::NamedTempFile;
use tracing::{debug, info};

use crate::{
    config::ExportConfig,
    helpers::{output_parent, resolve_path, total_bytecode_chars},
    types::{Artifact, Bytecode, ContractTarget, ExportError, ExportSummary, ExportedContract},
};

/// Read one artifact and extract its deployment bytecode
pub fn load_contract(
    root: &Path,
    target: &ContractTarget,
) -> Result<ExportedContract, ExportError> {
    let path = resolve_path(root, &target.artifact);
    debug!("Reading artifact for {}: {}", target.name, path.display());

    let content = fs::read_to_string(&path).map_err(|source| ExportError::ArtifactRead {
        path: path.to_path_buf(),
        source,
    })?;
    let artifact: Artifact =
        serde_json::from_str(&content).map_err(|source| ExportError::ArtifactParse {
            path: path.to_path_buf(),
            source,
        })?;

    let raw = artifact
        .into_object()
        .ok_or_else(|| ExportError::MissingBytecode {
            contract: target.name.clone(),
            path: path.to_path_buf(),
        })?;
    let bytecode = Bytecode::parse(raw).map_err(|source| ExportError::InvalidBytecode {
        contract: target.name.clone(),
        path: path.to_path_buf(),
        source,
    })?;

    Ok(ExportedContract {
        target: target.clone(),
        bytecode,
    })
}

/// Load every configured contract, in configuration order.
/// Fails on the first artifact that cannot be loaded.
pub fn load_contracts(config: &ExportConfig) -> Result<Vec<ExportedContract>, ExportError> {
    config
        .contracts
        .iter()
        .map(|target| load_contract(&config.root, target))
        .collect()
}

/// Render the generated source: one `export const` line per contract
pub fn render(contracts: &[ExportedContract], hex_type: &str) -> Result<String, ExportError> {
    let mut content = String::new();
    for contract in contracts {
        writeln!(
            content,
            "export const {}: {} = \"{}\";",
            contract.target.constant_name(),
            hex_type,
            contract.bytecode
        )?;
    }
    Ok(content)
}

/// Replace `path` with `content` in one step.
///
/// The content goes to a temporary file next to `path`, which is then renamed
/// over it, so readers see either the old file or the new one.
pub fn write_output(path: &Path, content: &str) -> Result<(), ExportError> {
    let write_err = |source: std::io::Error| ExportError::OutputWrite {
        path: path.to_path_buf(),
        source,
    };

    let parent = output_parent(path)?;
    let mut file = NamedTempFile::new_in(&parent).map_err(write_err)?;
    file.write_all(content.as_bytes()).map_err(write_err)?;
    set_output_permissions(&file, path).map_err(write_err)?;
    file.as_file().sync_all().map_err(write_err)?;
    file.persist(path).map_err(|e| write_err(e.error))?;

    Ok(())
}

// Temp files are created owner-only; keep the mode of the file being replaced,
// or fall back to a world-readable one for a fresh file.
fn set_output_permissions(file: &NamedTempFile, path: &Path) -> std::io::Result<()> {
    let permissions = match fs::metadata(path) {
        Ok(metadata) => metadata.permissions(),
        #[cfg(unix)]
        Err(_) => {
            use std::os::unix::fs::PermissionsExt;
            fs::Permissions::from_mode(0o644)
        }
        #[cfg(not(unix))]
        Err(_) => return Ok(()),
    };
    file.as_file().set_permissions(permissions)
}

/// Run a full export: load all artifacts, then write the generated file once
pub fn export(config: &ExportConfig) -> Result<ExportSummary, ExportError> {
    config.validate()?;

    let contracts = load_contracts(config)?;
    for (i, contract) in contracts.iter().enumerate() {
        debug!(" {}. {}", i + 1, contract);
    }

    let content = render(&contracts, &config.hex_type)?;
    let output = resolve_path(&config.root, &config.output);
    write_output(&output, &content)?;

    let summary = ExportSummary {
        output: output.to_path_buf(),
        contracts: contracts.len(),
        bytecode_chars: total_bytecode_chars(&contracts),
    };
    info!(
        "Exported {} contracts ({} hex chars) to {}",
        summary.contracts,
        summary.bytecode_chars,
        summary.output.display()
    );

    Ok(summary)
}
