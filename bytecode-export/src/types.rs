use serde::Deserialize;
use std::{
    fmt,
    path::{Path, PathBuf},
};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("Formatting error: {0}")]
    FormattingError(#[from] std::fmt::Error),
    #[error("Failed to read artifact {}: {source}", path.display())]
    ArtifactRead {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Malformed artifact {}: {source}", path.display())]
    ArtifactParse {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("Artifact {} for {contract} has no `bytecode.object`", path.display())]
    MissingBytecode { contract: String, path: PathBuf },
    #[error("Artifact {} for {contract} has invalid bytecode: {source}", path.display())]
    InvalidBytecode {
        contract: String,
        path: PathBuf,
        source: BytecodeError,
    },
    #[error("Failed to read config {}: {source}", path.display())]
    ConfigRead {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Invalid TOML format in {}: {source}", path.display())]
    ConfigParse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("No contracts configured for export")]
    NoContracts,
    #[error("Invalid contract name: {0:?}")]
    InvalidContractName(String),
    #[error("Duplicate contract name: {0}")]
    DuplicateContractName(String),
    #[error("Invalid hex type annotation: {0:?}")]
    InvalidHexType(String),
    #[error("Invalid path: {0}")]
    PathError(String),
    #[error("Failed to write output {}: {source}", path.display())]
    OutputWrite {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Reasons a `bytecode.object` string is rejected
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BytecodeError {
    #[error("empty bytecode")]
    Empty,
    #[error("missing `0x` prefix")]
    MissingPrefix,
    #[error("unexpected character {0:?}")]
    InvalidCharacter(char),
}

/// Deployment bytecode exactly as the compiler emitted it, `0x` prefix included.
///
/// The body is hex, except for unlinked library placeholders (`__$<hash>$__`),
/// which are kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bytecode(String);

impl Bytecode {
    pub const PREFIX: &'static str = "0x";

    pub fn parse(raw: String) -> Result<Self, BytecodeError> {
        let body = raw
            .strip_prefix(Self::PREFIX)
            .ok_or(BytecodeError::MissingPrefix)?;

        // forge emits a bare "0x" for abstract contracts and interfaces
        if body.is_empty() {
            return Err(BytecodeError::Empty);
        }

        if let Some(c) = body
            .chars()
            .find(|c| !(c.is_ascii_alphanumeric() || *c == '_' || *c == '$'))
        {
            return Err(BytecodeError::InvalidCharacter(c));
        }

        Ok(Self(raw))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Length of the string without the prefix
    pub fn body_len(&self) -> usize {
        self.0.len() - Self::PREFIX.len()
    }
}

impl fmt::Display for Bytecode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A contract whose bytecode is exported, and the artifact it is read from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContractTarget {
    /// Contract name, also the prefix of the exported constant
    pub name: String,
    /// Path to the build artifact, relative to the export root unless absolute
    pub artifact: PathBuf,
}

impl ContractTarget {
    pub fn new(name: impl Into<String>, artifact: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            artifact: artifact.into(),
        }
    }

    /// Target laid out the way forge writes artifacts: `<dir>/<Name>.sol/<Name>.json`
    pub fn forge(artifacts_dir: &Path, name: &str) -> Self {
        let artifact = artifacts_dir
            .join(format!("{name}.sol"))
            .join(format!("{name}.json"));
        Self::new(name, artifact)
    }

    pub fn constant_name(&self) -> String {
        format!("{}_bytecode", self.name)
    }
}

/// The subset of a forge build artifact the exporter reads
#[derive(Debug, Deserialize)]
pub struct Artifact {
    #[serde(default)]
    pub bytecode: Option<ArtifactBytecode>,
}

#[derive(Debug, Deserialize)]
pub struct ArtifactBytecode {
    #[serde(default)]
    pub object: Option<String>,
}

impl Artifact {
    pub fn into_object(self) -> Option<String> {
        self.bytecode.and_then(|b| b.object)
    }
}

/// A target whose artifact was loaded and validated
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportedContract {
    pub target: ContractTarget,
    pub bytecode: Bytecode,
}

impl fmt::Display for ExportedContract {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({} hex chars from {})",
            self.target.name,
            self.bytecode.body_len(),
            self.target.artifact.display()
        )
    }
}

/// Outcome of a successful export run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportSummary {
    pub output: PathBuf,
    pub contracts: usize,
    pub bytecode_chars: usize,
}
