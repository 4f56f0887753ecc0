use std::{fs, path::Path};

use bytecode_export::{
    config::{DEFAULT_CONTRACTS, DEFAULT_OUTPUT},
    export,
    test_utils::{initialize_logger, write_artifact},
    BytecodeError, ContractTarget, ExportConfig, ExportError,
};
use tempfile::TempDir;
use tracing::info;

/// Fake bytecode for the i-th default contract
fn bytecode_for(i: usize) -> String {
    format!("0x608060{:04x}", i)
}

/// Lay out a forge-out tree for the default table and create the output directory
fn setup_liquidator_repo() -> (TempDir, ExportConfig) {
    let dir = TempDir::new().unwrap();
    let config = ExportConfig::default_for(dir.path());

    // Written in reverse so file creation order differs from export order
    for (i, target) in config.contracts.iter().enumerate().rev() {
        write_artifact(&dir.path().join(&target.artifact), &bytecode_for(i)).unwrap();
    }
    fs::create_dir_all(dir.path().join("src/bytecode")).unwrap();

    (dir, config)
}

fn read_output(root: &Path) -> String {
    fs::read_to_string(root.join(DEFAULT_OUTPUT)).unwrap()
}

#[test]
fn round_trip_single_contract() {
    initialize_logger();

    let dir = TempDir::new().unwrap();
    write_artifact(&dir.path().join("AaveFLTaker.json"), "0x6080604052").unwrap();

    let config = ExportConfig::default_for(dir.path())
        .with_output("bytecode.generated.ts")
        .with_contracts(vec![ContractTarget::new("AaveFLTaker", "AaveFLTaker.json")]);
    let summary = export(&config).unwrap();
    info!("{:?}", summary);

    let content = fs::read_to_string(dir.path().join("bytecode.generated.ts")).unwrap();
    assert_eq!(
        content,
        "export const AaveFLTaker_bytecode: `0x${string}` = \"0x6080604052\";\n"
    );
    assert_eq!(summary.contracts, 1);
    assert_eq!(summary.bytecode_chars, 10);
}

#[test]
fn exports_default_table_in_declared_order() {
    initialize_logger();

    let (dir, config) = setup_liquidator_repo();
    export(&config).unwrap();

    let content = read_output(dir.path());
    assert!(content.ends_with(";\n"));

    let lines: Vec<_> = content.lines().collect();
    assert_eq!(lines.len(), DEFAULT_CONTRACTS.len());
    for (i, (line, name)) in lines.iter().zip(DEFAULT_CONTRACTS).enumerate() {
        assert_eq!(
            *line,
            format!(
                "export const {}_bytecode: `0x${{string}}` = \"{}\";",
                name,
                bytecode_for(i)
            )
        );
    }
}

#[test]
fn repeated_runs_are_byte_identical() {
    initialize_logger();

    let (dir, config) = setup_liquidator_repo();
    export(&config).unwrap();
    let first = fs::read(dir.path().join(DEFAULT_OUTPUT)).unwrap();

    export(&config).unwrap();
    let second = fs::read(dir.path().join(DEFAULT_OUTPUT)).unwrap();

    assert_eq!(first, second);
}

#[test]
fn stale_output_is_replaced_not_merged() {
    initialize_logger();

    let (dir, config) = setup_liquidator_repo();
    let output = dir.path().join(DEFAULT_OUTPUT);
    fs::write(&output, "export const Old_bytecode = \"0xdead\";\n".repeat(100)).unwrap();

    export(&config).unwrap();

    let content = read_output(dir.path());
    assert!(!content.contains("Old_bytecode"));
    assert_eq!(content.lines().count(), DEFAULT_CONTRACTS.len());

    // Only the generated file is left behind
    let entries: Vec<_> = fs::read_dir(dir.path().join("src/bytecode"))
        .unwrap()
        .map(|e| e.unwrap().file_name())
        .collect();
    assert_eq!(entries, vec!["bytecode.generated.ts"]);
}

#[test]
fn missing_artifact_leaves_output_untouched() {
    initialize_logger();

    let (dir, config) = setup_liquidator_repo();
    let output = dir.path().join(DEFAULT_OUTPUT);
    fs::write(&output, "previous\n").unwrap();

    let missing = dir.path().join(&config.contracts[5].artifact);
    fs::remove_file(&missing).unwrap();

    match export(&config) {
        Err(ExportError::ArtifactRead { path, .. }) => assert_eq!(path, missing),
        other => panic!("expected ArtifactRead, got {:?}", other),
    }
    assert_eq!(fs::read_to_string(&output).unwrap(), "previous\n");
}

#[test]
fn missing_artifact_creates_no_output() {
    initialize_logger();

    let (dir, config) = setup_liquidator_repo();
    fs::remove_file(dir.path().join(&config.contracts[0].artifact)).unwrap();

    assert!(export(&config).is_err());
    assert!(!dir.path().join(DEFAULT_OUTPUT).exists());
}

#[test]
fn malformed_artifact_is_fatal() {
    initialize_logger();

    let (dir, config) = setup_liquidator_repo();
    let broken = dir.path().join(&config.contracts[3].artifact);
    fs::write(&broken, "{ \"bytecode\": ").unwrap();

    match export(&config) {
        Err(ExportError::ArtifactParse { path, .. }) => assert_eq!(path, broken),
        other => panic!("expected ArtifactParse, got {:?}", other),
    }
    assert!(!dir.path().join(DEFAULT_OUTPUT).exists());
}

#[test]
fn missing_bytecode_field_is_fatal() {
    initialize_logger();

    let (dir, config) = setup_liquidator_repo();
    let target = &config.contracts[1];
    fs::write(
        dir.path().join(&target.artifact),
        r#"{"abi": [], "deployedBytecode": {"object": "0x6080"}}"#,
    )
    .unwrap();

    match export(&config) {
        Err(ExportError::MissingBytecode { contract, .. }) => assert_eq!(contract, target.name),
        other => panic!("expected MissingBytecode, got {:?}", other),
    }
    assert!(!dir.path().join(DEFAULT_OUTPUT).exists());
}

#[test]
fn empty_bytecode_is_fatal() {
    initialize_logger();

    let (dir, config) = setup_liquidator_repo();
    let target = &config.contracts[7];
    write_artifact(&dir.path().join(&target.artifact), "0x").unwrap();

    match export(&config) {
        Err(ExportError::InvalidBytecode {
            contract, source, ..
        }) => {
            assert_eq!(contract, "SiloLiquidator");
            assert_eq!(source, BytecodeError::Empty);
        }
        other => panic!("expected InvalidBytecode, got {:?}", other),
    }
}

#[test]
fn missing_output_directory_is_fatal() {
    initialize_logger();

    let (dir, config) = setup_liquidator_repo();
    let config = config.with_output("does/not/exist/bytecode.generated.ts");

    match export(&config) {
        Err(ExportError::OutputWrite { path, .. }) => {
            assert_eq!(path, dir.path().join("does/not/exist/bytecode.generated.ts"))
        }
        other => panic!("expected OutputWrite, got {:?}", other),
    }
}

#[test]
fn duplicate_names_fail_before_reading() {
    initialize_logger();

    let dir = TempDir::new().unwrap();
    let config = ExportConfig::default_for(dir.path()).with_contracts(vec![
        ContractTarget::new("PriceHelper", "missing.json"),
        ContractTarget::new("PriceHelper", "missing.json"),
    ]);

    assert!(matches!(
        export(&config),
        Err(ExportError::DuplicateContractName(_))
    ));
}

#[test]
fn bytecode_that_cannot_form_a_hex_literal_is_fatal() {
    initialize_logger();

    for (raw, expected) in [
        ("6080604052", BytecodeError::MissingPrefix),
        ("0x6080\"; evil", BytecodeError::InvalidCharacter('"')),
    ] {
        let (dir, config) = setup_liquidator_repo();
        let target = &config.contracts[4];
        write_artifact(&dir.path().join(&target.artifact), raw).unwrap();

        match export(&config) {
            Err(ExportError::InvalidBytecode {
                contract, source, ..
            }) => {
                assert_eq!(contract, "GhoLiquidator");
                assert_eq!(source, expected);
            }
            other => panic!("expected InvalidBytecode for {raw:?}, got {:?}", other),
        }
        assert!(!dir.path().join(DEFAULT_OUTPUT).exists());
    }
}

#[cfg(unix)]
#[test]
fn read_only_output_directory_is_fatal() {
    use std::os::unix::fs::PermissionsExt;

    initialize_logger();

    let (dir, config) = setup_liquidator_repo();
    let output_dir = dir.path().join("src/bytecode");
    let output = dir.path().join(DEFAULT_OUTPUT);
    fs::write(&output, "previous\n").unwrap();
    fs::set_permissions(&output_dir, fs::Permissions::from_mode(0o555)).unwrap();

    // Permission bits don't bind privileged users
    let writable_check = output_dir.join(".writable");
    if fs::write(&writable_check, "").is_ok() {
        fs::remove_file(&writable_check).unwrap();
        fs::set_permissions(&output_dir, fs::Permissions::from_mode(0o755)).unwrap();
        info!("Directory permissions not enforced, skipping");
        return;
    }

    let result = export(&config);
    fs::set_permissions(&output_dir, fs::Permissions::from_mode(0o755)).unwrap();

    match result {
        Err(ExportError::OutputWrite { path, .. }) => assert_eq!(path, output),
        other => panic!("expected OutputWrite, got {:?}", other),
    }
    assert_eq!(fs::read_to_string(&output).unwrap(), "previous\n");
}
