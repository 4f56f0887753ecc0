//! Export configuration: which artifacts to read, in which order, and where to
//! write the generated file.

use serde::Deserialize;
use std::{
    collections::HashSet,
    fs, io,
    path::{Path, PathBuf},
};
use tracing::debug;

use crate::{
    helpers::is_valid_identifier,
    types::{ContractTarget, ExportError},
};

/// Config file looked up in the export root
pub const CONFIG_FILE: &str = "bytecode-export.toml";

pub const DEFAULT_ARTIFACTS_DIR: &str = "forge-out";
pub const DEFAULT_OUTPUT: &str = "src/bytecode/bytecode.generated.ts";
pub const DEFAULT_HEX_TYPE: &str = "`0x${string}`";

/// Contracts exported when no config file is present, in export order
pub const DEFAULT_CONTRACTS: [&str; 8] = [
    "AaveFLTaker",
    "AaveLiquidator",
    "BatchLiquidator",
    "GhoFMTaker",
    "GhoLiquidator",
    "PriceHelper",
    "SiloFLTaker",
    "SiloLiquidator",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportConfig {
    /// Directory relative paths are resolved against
    pub root: PathBuf,
    /// Generated file, overwritten on every run
    pub output: PathBuf,
    /// Type annotation applied to every exported constant
    pub hex_type: String,
    /// Contracts to export. Order is preserved in the output.
    pub contracts: Vec<ContractTarget>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    output: Option<PathBuf>,
    hex_type: Option<String>,
    artifacts_dir: Option<PathBuf>,
    #[serde(default)]
    contracts: Vec<ContractEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ContractEntry {
    name: String,
    artifact: Option<PathBuf>,
}

impl ExportConfig {
    /// The built-in liquidator contract table, rooted at `root`
    pub fn default_for(root: impl Into<PathBuf>) -> Self {
        let artifacts_dir = Path::new(DEFAULT_ARTIFACTS_DIR);
        Self {
            root: root.into(),
            output: PathBuf::from(DEFAULT_OUTPUT),
            hex_type: DEFAULT_HEX_TYPE.to_string(),
            contracts: DEFAULT_CONTRACTS
                .iter()
                .map(|name| ContractTarget::forge(artifacts_dir, name))
                .collect(),
        }
    }

    /// Load `<root>/bytecode-export.toml`, or the built-in table if it doesn't exist.
    /// The result is validated either way.
    pub fn load(root: impl Into<PathBuf>) -> Result<Self, ExportError> {
        let root = root.into();
        let config_path = root.join(CONFIG_FILE);

        let config = match fs::metadata(&config_path) {
            Ok(metadata) if metadata.is_file() => {
                debug!("Loading config from {}", config_path.display());
                let content = fs::read_to_string(&config_path).map_err(|source| {
                    ExportError::ConfigRead {
                        path: config_path.clone(),
                        source,
                    }
                })?;
                Self::from_toml(root, &content).map_err(|source| ExportError::ConfigParse {
                    path: config_path,
                    source,
                })?
            }
            Ok(_) => {
                return Err(ExportError::ConfigRead {
                    path: config_path,
                    source: io::Error::other("not a regular file"),
                })
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!("No {} in {}, using defaults", CONFIG_FILE, root.display());
                Self::default_for(root)
            }
            Err(source) => {
                return Err(ExportError::ConfigRead {
                    path: config_path,
                    source,
                })
            }
        };

        config.validate()?;
        Ok(config)
    }

    /// Parse a config file body. Missing keys fall back to the defaults, except
    /// `contracts`, which replaces the built-in table when non-empty.
    pub fn from_toml(root: impl Into<PathBuf>, content: &str) -> Result<Self, toml::de::Error> {
        let file: ConfigFile = toml::from_str(content)?;
        let mut config = Self::default_for(root);

        if let Some(output) = file.output {
            config.output = output;
        }
        if let Some(hex_type) = file.hex_type {
            config.hex_type = hex_type;
        }

        let relocated = file.artifacts_dir.is_some();
        let artifacts_dir = file
            .artifacts_dir
            .unwrap_or_else(|| PathBuf::from(DEFAULT_ARTIFACTS_DIR));

        if !file.contracts.is_empty() {
            config.contracts = file
                .contracts
                .into_iter()
                .map(|entry| match entry.artifact {
                    Some(artifact) => ContractTarget::new(entry.name, artifact),
                    None => ContractTarget::forge(&artifacts_dir, &entry.name),
                })
                .collect();
        } else if relocated {
            config.contracts = DEFAULT_CONTRACTS
                .iter()
                .map(|name| ContractTarget::forge(&artifacts_dir, name))
                .collect();
        }

        Ok(config)
    }

    pub fn with_output(mut self, output: impl Into<PathBuf>) -> Self {
        self.output = output.into();
        self
    }

    pub fn with_contracts(mut self, contracts: Vec<ContractTarget>) -> Self {
        self.contracts = contracts;
        self
    }

    /// Every constant must be a distinct, well-formed identifier, and the type
    /// annotation must fit on one line of a single statement
    pub fn validate(&self) -> Result<(), ExportError> {
        if self.contracts.is_empty() {
            return Err(ExportError::NoContracts);
        }

        if self.hex_type.trim().is_empty()
            || self
                .hex_type
                .chars()
                .any(|c| c.is_control() || c == '"' || c == ';')
        {
            return Err(ExportError::InvalidHexType(self.hex_type.clone()));
        }

        let mut seen = HashSet::new();
        for target in &self.contracts {
            if !is_valid_identifier(&target.name) {
                return Err(ExportError::InvalidContractName(target.name.clone()));
            }
            if !seen.insert(target.name.as_str()) {
                return Err(ExportError::DuplicateContractName(target.name.clone()));
            }
        }

        Ok(())
    }
}
