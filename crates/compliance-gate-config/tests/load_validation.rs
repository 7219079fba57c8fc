//! Config load validation tests for compliance-gate-config.
// crates/compliance-gate-config/tests/load_validation.rs
// =============================================================================
// Module: Config Load Validation Tests
// Description: Validate config loading guards (path, size, encoding).
// Purpose: Ensure config input handling is strict and fail-closed.
// =============================================================================

use std::io::Write;
use std::path::Path;

use compliance_gate_config::ComplianceGateConfig;
use compliance_gate_config::ConfigError;
use tempfile::NamedTempFile;

type TestResult = Result<(), String>;

fn assert_invalid(result: Result<ComplianceGateConfig, ConfigError>, needle: &str) -> TestResult {
    match result {
        Err(error) => {
            let message = error.to_string();
            if message.contains(needle) {
                Ok(())
            } else {
                Err(format!("error {message} did not contain {needle}"))
            }
        }
        Ok(_) => Err("expected invalid config load".to_string()),
    }
}

fn write_config(content: &[u8]) -> Result<NamedTempFile, String> {
    let mut file = NamedTempFile::new().map_err(|err| err.to_string())?;
    file.write_all(content).map_err(|err| err.to_string())?;
    Ok(file)
}

#[test]
fn load_rejects_path_too_long() -> TestResult {
    let long_path = "a".repeat(5_000);
    assert_invalid(
        ComplianceGateConfig::load(Some(Path::new(&long_path))),
        "config path exceeds max length",
    )
}

#[test]
fn load_rejects_path_component_too_long() -> TestResult {
    let long_component = "a".repeat(300);
    assert_invalid(
        ComplianceGateConfig::load(Some(Path::new(&long_component))),
        "config path component too long",
    )
}

#[test]
fn load_rejects_oversized_file() -> TestResult {
    let file = write_config(&vec![b'#'; 1_048_577])?;
    assert_invalid(ComplianceGateConfig::load(Some(file.path())), "config file exceeds size limit")
}

#[test]
fn load_rejects_non_utf8_file() -> TestResult {
    let file = write_config(&[0xFF, 0xFE, 0xFF])?;
    assert_invalid(ComplianceGateConfig::load(Some(file.path())), "config file must be utf-8")
}

#[test]
fn load_reports_missing_file_as_io_error() -> TestResult {
    let dir = tempfile::tempdir().map_err(|err| err.to_string())?;
    let missing = dir.path().join("absent.toml");
    assert_invalid(ComplianceGateConfig::load(Some(&missing)), "config io error")
}

#[test]
fn load_rejects_malformed_toml() -> TestResult {
    let file = write_config(b"[executor\nmax_concurrency = 4")?;
    assert_invalid(ComplianceGateConfig::load(Some(file.path())), "config parse error")
}

#[test]
fn load_rejects_unknown_fields() -> TestResult {
    let file = write_config(b"[executor]\nmax_workers = 4\n")?;
    assert_invalid(ComplianceGateConfig::load(Some(file.path())), "config parse error")
}

#[test]
fn load_validates_after_parsing() -> TestResult {
    let file = write_config(b"[executor]\nmax_concurrency = 0\n")?;
    assert_invalid(ComplianceGateConfig::load(Some(file.path())), "executor.max_concurrency")
}

#[test]
fn load_accepts_empty_file_with_defaults() -> TestResult {
    let file = write_config(b"")?;
    let config = ComplianceGateConfig::load(Some(file.path())).map_err(|err| err.to_string())?;
    if config != ComplianceGateConfig::default() {
        return Err("empty config should equal defaults".to_string());
    }
    Ok(())
}

#[test]
fn load_reads_full_file() -> TestResult {
    let file = write_config(
        br#"
[executor]
default_timeout_ms = 5000
max_concurrency = 8

[evidence]
sign_evidence = true

[sealing]
environment = "staging"
algorithm = "ed25519"
key_env = "RELEASE_SEAL_KEY"

[gates.pii-scan]
timeout_ms = 1000
settings = { kind = "patterns", patterns = ["\\d{3}-\\d{2}-\\d{4}"] }

[gates.latency]
enabled = false
"#,
    )?;
    let config = ComplianceGateConfig::load(Some(file.path())).map_err(|err| err.to_string())?;
    if config.executor.max_concurrency != 8 || config.executor.default_timeout_ms != 5_000 {
        return Err("executor section not applied".to_string());
    }
    if !config.evidence.sign_evidence || config.sealing.key_env != "RELEASE_SEAL_KEY" {
        return Err("evidence or sealing section not applied".to_string());
    }
    if config.gates.len() != 2 {
        return Err(format!("expected 2 gate overrides, got {}", config.gates.len()));
    }
    Ok(())
}
