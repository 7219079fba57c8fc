// crates/compliance-gate-core/src/core/gate_config.rs
// ============================================================================
// Module: Compliance Gate Configuration Overrides
// Description: Per-run gate overrides with typed gate settings.
// Purpose: Validate enablement, timeouts, and gate settings before execution.
// Dependencies: serde, serde_json, thiserror
// ============================================================================

//! ## Overview
//! [`GateConfig`] is supplied per orchestration. Gate-specific settings are a
//! tagged union rather than an untyped bag, and are validated when a plan is
//! built so that gate bodies never see malformed settings.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;

use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

// ============================================================================
// SECTION: Limits
// ============================================================================

/// Maximum per-gate timeout accepted by validation (ten minutes).
pub const MAX_GATE_TIMEOUT_MS: u64 = 600_000;

// ============================================================================
// SECTION: Gate Settings
// ============================================================================

/// Gate-specific settings, tagged by `kind`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case", deny_unknown_fields)]
pub enum GateSettings {
    /// No gate-specific settings.
    #[default]
    None,
    /// Named numeric thresholds (e.g. `min_hit_rate`, `max_p99_ms`).
    Thresholds {
        /// Threshold values keyed by name.
        values: BTreeMap<String, f64>,
    },
    /// Pattern lists (e.g. PII detectors).
    Patterns {
        /// Pattern expressions evaluated by the gate body.
        patterns: Vec<String>,
    },
    /// Rate-limit expectations.
    RateLimit {
        /// Maximum requests allowed per window.
        max_requests: u32,
        /// Window length in milliseconds.
        window_ms: u64,
    },
    /// Opaque settings forwarded unchanged to a custom gate.
    Custom {
        /// Raw settings value.
        value: Value,
    },
}

// ============================================================================
// SECTION: Gate Config
// ============================================================================

/// Per-run override for one gate.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GateConfig {
    /// Explicit enablement; `Some(false)` skips the gate.
    #[serde(default)]
    pub enabled: Option<bool>,
    /// Timeout override in milliseconds.
    #[serde(default)]
    pub timeout_ms: Option<u64>,
    /// Gate-specific settings.
    #[serde(default)]
    pub settings: GateSettings,
}

impl GateConfig {
    /// Returns a config that disables the gate.
    #[must_use]
    pub fn disabled() -> Self {
        Self {
            enabled: Some(false),
            ..Self::default()
        }
    }

    /// Returns a config with a timeout override.
    #[must_use]
    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = Some(timeout_ms);
        self
    }

    /// Returns a config with gate-specific settings.
    #[must_use]
    pub fn with_settings(mut self, settings: GateSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Returns true when the config explicitly disables the gate.
    #[must_use]
    pub fn is_disabled(&self) -> bool {
        self.enabled == Some(false)
    }

    /// Validates timeout bounds and gate settings.
    ///
    /// # Errors
    ///
    /// Returns [`GateConfigError`] when any value is out of range.
    pub fn validate(&self) -> Result<(), GateConfigError> {
        if let Some(timeout_ms) = self.timeout_ms
            && (timeout_ms == 0 || timeout_ms > MAX_GATE_TIMEOUT_MS)
        {
            return Err(GateConfigError::TimeoutOutOfRange(timeout_ms));
        }
        match &self.settings {
            GateSettings::None | GateSettings::Custom { .. } => Ok(()),
            GateSettings::Thresholds { values } => {
                if values.is_empty() {
                    return Err(GateConfigError::Invalid("thresholds must not be empty".to_string()));
                }
                for (name, value) in values {
                    if name.trim().is_empty() {
                        return Err(GateConfigError::Invalid(
                            "threshold names must not be blank".to_string(),
                        ));
                    }
                    if !value.is_finite() {
                        return Err(GateConfigError::Invalid(format!(
                            "threshold {name} must be finite"
                        )));
                    }
                }
                Ok(())
            }
            GateSettings::Patterns { patterns } => {
                if patterns.is_empty() {
                    return Err(GateConfigError::Invalid("patterns must not be empty".to_string()));
                }
                if patterns.iter().any(|pattern| pattern.trim().is_empty()) {
                    return Err(GateConfigError::Invalid("patterns must not be blank".to_string()));
                }
                Ok(())
            }
            GateSettings::RateLimit { max_requests, window_ms } => {
                if *max_requests == 0 || *window_ms == 0 {
                    return Err(GateConfigError::Invalid(
                        "rate limit requests and window must be greater than zero".to_string(),
                    ));
                }
                Ok(())
            }
        }
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Gate configuration validation errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GateConfigError {
    /// Timeout override is zero or above [`MAX_GATE_TIMEOUT_MS`].
    #[error("gate timeout out of range: {0}ms")]
    TimeoutOutOfRange(u64),
    /// Gate settings are malformed.
    #[error("invalid gate settings: {0}")]
    Invalid(String),
}
