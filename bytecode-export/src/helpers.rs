use std::{
    borrow::Cow,
    path::{Path, PathBuf},
};

use crate::types::{ExportError, ExportedContract};

/// Whether `name` can be used as the prefix of an exported constant
pub fn is_valid_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Resolve `path` against `root`, leaving absolute paths untouched
pub fn resolve_path<'a>(root: &Path, path: &'a Path) -> Cow<'a, Path> {
    if path.is_absolute() {
        Cow::Borrowed(path)
    } else {
        Cow::Owned(root.join(path))
    }
}

/// Directory that must already exist for `output` to be written
pub fn output_parent(output: &Path) -> Result<PathBuf, ExportError> {
    match output.parent() {
        Some(parent) if parent.as_os_str().is_empty() => Ok(PathBuf::from(".")),
        Some(parent) => Ok(parent.to_path_buf()),
        None => Err(ExportError::PathError(format!(
            "Output path {:?} has no parent directory",
            output
        ))),
    }
}

/// Total length of all exported bytecode bodies
pub fn total_bytecode_chars(contracts: &[ExportedContract]) -> usize {
    contracts.iter().map(|c| c.bytecode.body_len()).sum()
}
