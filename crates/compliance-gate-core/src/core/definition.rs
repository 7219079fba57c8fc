// crates/compliance-gate-core/src/core/definition.rs
// ============================================================================
// Module: Compliance Gate Definitions
// Description: Static gate catalog metadata.
// Purpose: Describe gates, their severity, category, and declared dependencies.
// Dependencies: crate::core::identifiers, serde
// ============================================================================

//! ## Overview
//! A [`GateDefinition`] is pure metadata: it carries no execution logic.
//! Dependencies reference other gates by id and are not required to be
//! registered; an unregistered dependency can simply never be satisfied at
//! run time.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;

use crate::core::identifiers::GateId;

// ============================================================================
// SECTION: Classification
// ============================================================================

/// Functional area a gate verifies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GateCategory {
    /// Latency, caching, and throughput checks.
    Performance,
    /// Access control, secrets, and hardening checks.
    Security,
    /// Personal data handling checks.
    Privacy,
    /// Availability, rate limiting, and failure handling checks.
    Reliability,
    /// Regulatory and policy conformance checks.
    Compliance,
    /// Operational readiness checks.
    Operations,
    /// Audit trail and sealing checks.
    Integrity,
}

/// Severity attached to gates and findings, ordered from least to most severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// Informational only.
    Info,
    /// Low impact.
    Low,
    /// Medium impact.
    Medium,
    /// High impact.
    High,
    /// Blocks release.
    Critical,
}

impl Severity {
    /// Returns a stable label for the severity.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Critical => "critical",
        }
    }
}

// ============================================================================
// SECTION: Display Names
// ============================================================================

/// Bilingual display name for a gate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayName {
    /// Primary (English) name.
    pub primary: String,
    /// Secondary-language name.
    pub secondary: String,
}

impl DisplayName {
    /// Creates a display name pair.
    #[must_use]
    pub fn new(primary: impl Into<String>, secondary: impl Into<String>) -> Self {
        Self {
            primary: primary.into(),
            secondary: secondary.into(),
        }
    }
}

// ============================================================================
// SECTION: Gate Definition
// ============================================================================

/// Catalog entry describing one gate.
///
/// # Invariants
/// - `id` is unique within a registry; registering the same id again replaces the entry.
/// - Immutable once registered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GateDefinition {
    /// Gate identifier.
    pub id: GateId,
    /// Bilingual display names.
    pub name: DisplayName,
    /// Functional category.
    pub category: GateCategory,
    /// Default severity of the gate's findings.
    pub severity: Severity,
    /// Direct dependency identifiers.
    #[serde(default)]
    pub dependencies: Vec<GateId>,
    /// Whether the gate runs when no configuration says otherwise.
    #[serde(default = "default_enabled")]
    pub enabled_by_default: bool,
}

impl GateDefinition {
    /// Creates an enabled gate definition with no dependencies.
    #[must_use]
    pub fn new(
        id: impl Into<GateId>,
        name: DisplayName,
        category: GateCategory,
        severity: Severity,
    ) -> Self {
        Self {
            id: id.into(),
            name,
            category,
            severity,
            dependencies: Vec::new(),
            enabled_by_default: true,
        }
    }

    /// Sets the direct dependencies.
    #[must_use]
    pub fn with_dependencies<I, G>(mut self, dependencies: I) -> Self
    where
        I: IntoIterator<Item = G>,
        G: Into<GateId>,
    {
        self.dependencies = dependencies.into_iter().map(Into::into).collect();
        self
    }

    /// Marks the gate as disabled unless explicitly enabled.
    #[must_use]
    pub const fn disabled_by_default(mut self) -> Self {
        self.enabled_by_default = false;
        self
    }
}

/// Serde default for `enabled_by_default`.
const fn default_enabled() -> bool {
    true
}
