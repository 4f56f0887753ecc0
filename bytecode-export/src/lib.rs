//! Export the deployment bytecode of compiled contracts as typed constants in a
//! generated source file.
//!
//! Each configured contract's forge artifact is read, its `bytecode.object` is
//! validated, and one line per contract is written to the output file:
//!
//! ```text
//! export const AaveFLTaker_bytecode: `0x${string}` = "0x6080604052...";
//! ```
//!
//! Nothing is written unless every artifact loads.

pub mod config;
pub mod generate;
mod helpers;
pub mod test_utils;
pub mod types;

pub use config::ExportConfig;
pub use generate::{export, load_contracts, render, write_output};
pub use types::{
    Bytecode, BytecodeError, ContractTarget, ExportError, ExportSummary, ExportedContract,
};
