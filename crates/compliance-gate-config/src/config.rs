// crates/compliance-gate-config/src/config.rs
// ============================================================================
// Module: Compliance Gate Configuration
// Description: Configuration loading and validation for Compliance Gate.
// Purpose: Provide strict, fail-closed config parsing with hard limits.
// Dependencies: compliance-gate-core, serde, toml
// ============================================================================

//! ## Overview
//! Configuration is loaded from a TOML file with strict size and path limits.
//! Unknown fields, out-of-range limits, and malformed gate settings all fail
//! the load. Production deployments without a signing key fail when the key
//! is resolved rather than falling back to the development key.
//! Security posture: config inputs are untrusted.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::env;
use std::fs;
use std::path::Path;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use compliance_gate_core::BaselineSealer;
use compliance_gate_core::Ed25519Signer;
use compliance_gate_core::EvidenceBuilder;
use compliance_gate_core::ExecutorConfig;
use compliance_gate_core::GateConfig;
use compliance_gate_core::GateExecutor;
use compliance_gate_core::GateId;
use compliance_gate_core::GateRegistry;
use compliance_gate_core::HmacSha256Signer;
use compliance_gate_core::KeyError;
use compliance_gate_core::MAX_GATE_TIMEOUT_MS;
use compliance_gate_core::SealPolicy;
use compliance_gate_core::SealSigner;
use compliance_gate_core::SealStore;
use compliance_gate_core::SignatureAlgorithm;
use compliance_gate_core::SigningSecret;
use compliance_gate_core::runtime::DEFAULT_GATE_TIMEOUT_MS;
use compliance_gate_core::runtime::DEFAULT_MAX_CONCURRENCY;
use compliance_gate_core::runtime::DEFAULT_SEAL_KEY_ENV;
use compliance_gate_core::runtime::resolve_signing_secret;
use serde::Deserialize;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default configuration filename when no path is specified.
const DEFAULT_CONFIG_NAME: &str = "compliance-gate.toml";
/// Environment variable used to override the config path.
pub(crate) const CONFIG_ENV_VAR: &str = "COMPLIANCE_GATE_CONFIG";
/// Maximum configuration file size in bytes.
pub(crate) const MAX_CONFIG_FILE_SIZE: usize = 1024 * 1024;
/// Maximum length of a single path component.
pub(crate) const MAX_PATH_COMPONENT_LENGTH: usize = 255;
/// Maximum total path length.
pub(crate) const MAX_TOTAL_PATH_LENGTH: usize = 4096;
/// Upper bound for `executor.max_concurrency`.
pub(crate) const MAX_CONCURRENCY_LIMIT: usize = 256;
/// Environment name that always applies production key rules.
const PRODUCTION_ENVIRONMENT: &str = "production";

// ============================================================================
// SECTION: Configuration Types
// ============================================================================

/// Compliance Gate configuration.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ComplianceGateConfig {
    /// Executor limits.
    #[serde(default)]
    pub executor: ExecutorSection,
    /// Evidence options.
    #[serde(default)]
    pub evidence: EvidenceSection,
    /// Sealing options.
    #[serde(default)]
    pub sealing: SealingSection,
    /// Per-gate overrides keyed by gate id.
    #[serde(default)]
    pub gates: BTreeMap<GateId, GateConfig>,
}

impl ComplianceGateConfig {
    /// Loads configuration from disk using the default resolution rules.
    ///
    /// An explicit `path` wins, then `COMPLIANCE_GATE_CONFIG`, then
    /// `compliance-gate.toml` in the working directory.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when loading or validation fails.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let resolved = resolve_path(path, env::var(CONFIG_ENV_VAR).ok())?;
        validate_path(&resolved)?;
        let bytes = fs::read(&resolved).map_err(|err| ConfigError::Io(err.to_string()))?;
        if bytes.len() > MAX_CONFIG_FILE_SIZE {
            return Err(ConfigError::Invalid("config file exceeds size limit".to_string()));
        }
        let content = std::str::from_utf8(&bytes)
            .map_err(|_| ConfigError::Invalid("config file must be utf-8".to_string()))?;
        Self::from_toml_str(content)
    }

    /// Parses and validates configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when parsing or validation fails.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        if content.len() > MAX_CONFIG_FILE_SIZE {
            return Err(ConfigError::Invalid("config file exceeds size limit".to_string()));
        }
        let config: Self =
            toml::from_str(content).map_err(|err| ConfigError::Parse(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration for internal consistency.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when configuration is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.executor.validate()?;
        self.sealing.validate()?;
        for (gate_id, gate) in &self.gates {
            if gate_id.as_str().trim().is_empty() {
                return Err(ConfigError::Invalid("gate ids must be non-empty".to_string()));
            }
            gate.validate()
                .map_err(|err| ConfigError::Invalid(format!("gates.{gate_id}: {err}")))?;
        }
        Ok(())
    }

    /// Returns the executor limits.
    #[must_use]
    pub const fn executor_config(&self) -> ExecutorConfig {
        ExecutorConfig {
            default_timeout: Duration::from_millis(self.executor.default_timeout_ms),
            max_concurrency: self.executor.max_concurrency,
        }
    }

    /// Returns the per-gate overrides.
    #[must_use]
    pub const fn gate_configs(&self) -> &BTreeMap<GateId, GateConfig> {
        &self.gates
    }

    /// Returns the seal policy.
    #[must_use]
    pub fn seal_policy(&self) -> SealPolicy {
        SealPolicy {
            require_all_gates_passed: self.sealing.require_all_gates_passed,
            version: self.sealing.version.clone(),
        }
    }

    /// Resolves the signing secret through `lookup`, which maps the
    /// configured key variable name to its value.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Key`] when a production deployment has no key.
    pub fn signing_secret<F>(&self, lookup: F) -> Result<SigningSecret, ConfigError>
    where
        F: FnOnce(&str) -> Option<String>,
    {
        let key_env = self.sealing.key_env.as_str();
        Ok(resolve_signing_secret(self.sealing.is_production(), key_env, lookup(key_env))?)
    }

    /// Resolves the signing secret from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Key`] when a production deployment has no key.
    pub fn signing_secret_from_env(&self) -> Result<SigningSecret, ConfigError> {
        self.signing_secret(|name| env::var(name).ok())
    }

    /// Builds the configured signer from a resolved secret.
    #[must_use]
    pub fn seal_signer(&self, secret: &SigningSecret) -> Arc<dyn SealSigner> {
        match self.sealing.algorithm {
            SignatureAlgorithm::HmacSha256 => Arc::new(HmacSha256Signer::new(secret.clone())),
            SignatureAlgorithm::Ed25519 => Arc::new(Ed25519Signer::from_secret(secret)),
        }
    }

    /// Builds an executor with the configured limits, evidence signing, and
    /// gate overrides applied.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] when a gate override is rejected.
    pub fn build_executor(
        &self,
        registry: Arc<GateRegistry>,
        signer: Arc<dyn SealSigner>,
    ) -> Result<GateExecutor, ConfigError> {
        let evidence = if self.evidence.sign_evidence {
            EvidenceBuilder::signed(signer)
        } else {
            EvidenceBuilder::unsigned()
        };
        let mut executor =
            GateExecutor::new(registry, self.executor_config()).with_evidence_builder(evidence);
        for (gate_id, gate) in &self.gates {
            executor
                .set_gate_config(gate_id.clone(), gate.clone())
                .map_err(|err| ConfigError::Invalid(format!("gates.{gate_id}: {err}")))?;
        }
        Ok(executor)
    }

    /// Builds a sealer with the configured policy.
    #[must_use]
    pub fn build_sealer(
        &self,
        signer: Arc<dyn SealSigner>,
        store: Arc<dyn SealStore>,
    ) -> BaselineSealer {
        BaselineSealer::new(signer, store, self.seal_policy())
    }
}

/// Executor limits.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ExecutorSection {
    /// Default per-gate timeout in milliseconds.
    #[serde(default = "default_timeout_ms")]
    pub default_timeout_ms: u64,
    /// Chunk size (parallel) and wave width (dag).
    #[serde(default = "default_max_concurrency")]
    pub max_concurrency: usize,
}

impl Default for ExecutorSection {
    fn default() -> Self {
        Self {
            default_timeout_ms: default_timeout_ms(),
            max_concurrency: default_max_concurrency(),
        }
    }
}

impl ExecutorSection {
    /// Validates executor limits.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.default_timeout_ms == 0 || self.default_timeout_ms > MAX_GATE_TIMEOUT_MS {
            return Err(ConfigError::Invalid(format!(
                "executor.default_timeout_ms must be between 1 and {MAX_GATE_TIMEOUT_MS}"
            )));
        }
        if self.max_concurrency == 0 || self.max_concurrency > MAX_CONCURRENCY_LIMIT {
            return Err(ConfigError::Invalid(format!(
                "executor.max_concurrency must be between 1 and {MAX_CONCURRENCY_LIMIT}"
            )));
        }
        Ok(())
    }
}

/// Evidence options.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EvidenceSection {
    /// Sign every evidence record with the seal signer.
    #[serde(default)]
    pub sign_evidence: bool,
}

/// Sealing options.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SealingSection {
    /// Deployment environment name.
    #[serde(default = "default_environment")]
    pub environment: String,
    /// Production opt-in for environments not named `production`.
    #[serde(default)]
    pub production: Option<bool>,
    /// Environment variable holding the signing key.
    #[serde(default = "default_key_env")]
    pub key_env: String,
    /// Signature scheme.
    #[serde(default = "default_algorithm")]
    pub algorithm: SignatureAlgorithm,
    /// Refuse to seal when any gate failed.
    #[serde(default = "default_true")]
    pub require_all_gates_passed: bool,
    /// Seal format version.
    #[serde(default = "default_seal_version")]
    pub version: String,
}

impl Default for SealingSection {
    fn default() -> Self {
        Self {
            environment: default_environment(),
            production: None,
            key_env: default_key_env(),
            algorithm: default_algorithm(),
            require_all_gates_passed: true,
            version: default_seal_version(),
        }
    }
}

impl SealingSection {
    /// Returns true when production key rules apply.
    ///
    /// The `production` flag can opt other environments in but never opts the
    /// production environment out.
    #[must_use]
    pub fn is_production(&self) -> bool {
        self.production == Some(true) || self.environment == PRODUCTION_ENVIRONMENT
    }

    /// Validates sealing options.
    fn validate(&self) -> Result<(), ConfigError> {
        for (field, value) in [
            ("sealing.environment", &self.environment),
            ("sealing.key_env", &self.key_env),
            ("sealing.version", &self.version),
        ] {
            if value.trim().is_empty() {
                return Err(ConfigError::Invalid(format!("{field} must be non-empty")));
            }
        }
        if self.key_env.contains('=') || self.key_env.contains('\0') {
            return Err(ConfigError::Invalid(
                "sealing.key_env must be a valid environment variable name".to_string(),
            ));
        }
        if self.production == Some(false) && self.environment == PRODUCTION_ENVIRONMENT {
            return Err(ConfigError::Invalid(format!(
                "sealing.production cannot be false when sealing.environment is {PRODUCTION_ENVIRONMENT}"
            )));
        }
        Ok(())
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Configuration loading or validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// I/O failure while reading configuration.
    #[error("config io error: {0}")]
    Io(String),
    /// TOML parsing error.
    #[error("config parse error: {0}")]
    Parse(String),
    /// Invalid configuration data.
    #[error("invalid config: {0}")]
    Invalid(String),
    /// Signing key resolution failed.
    #[error(transparent)]
    Key(#[from] KeyError),
}

// ============================================================================
// SECTION: Defaults
// ============================================================================

/// Default `executor.default_timeout_ms`.
const fn default_timeout_ms() -> u64 {
    DEFAULT_GATE_TIMEOUT_MS
}

/// Default `executor.max_concurrency`.
const fn default_max_concurrency() -> usize {
    DEFAULT_MAX_CONCURRENCY
}

/// Default `sealing.environment`.
fn default_environment() -> String {
    "development".to_string()
}

/// Default `sealing.key_env`.
fn default_key_env() -> String {
    DEFAULT_SEAL_KEY_ENV.to_string()
}

/// Default `sealing.algorithm`.
const fn default_algorithm() -> SignatureAlgorithm {
    SignatureAlgorithm::HmacSha256
}

/// Default for boolean flags that are on unless disabled.
const fn default_true() -> bool {
    true
}

/// Default `sealing.version`.
fn default_seal_version() -> String {
    SealPolicy::default().version
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Resolves the config path from an explicit argument or the env override.
fn resolve_path(path: Option<&Path>, env_path: Option<String>) -> Result<PathBuf, ConfigError> {
    if let Some(path) = path {
        return Ok(path.to_path_buf());
    }
    if let Some(env_path) = env_path {
        if env_path.len() > MAX_TOTAL_PATH_LENGTH {
            return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
        }
        return Ok(PathBuf::from(env_path));
    }
    Ok(PathBuf::from(DEFAULT_CONFIG_NAME))
}

/// Validates the resolved path against security limits.
fn validate_path(path: &Path) -> Result<(), ConfigError> {
    let text = path.to_string_lossy();
    if text.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
    }
    for component in path.components() {
        let value = component.as_os_str().to_string_lossy();
        if value.len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(ConfigError::Invalid("config path component too long".to_string()));
        }
    }
    Ok(())
}

// ============================================================================
// SECTION: Tests
// ============================================================================
