// crates/compliance-gate-core/src/core/result.rs
// ============================================================================
// Module: Compliance Gate Results
// Description: Gate outcomes, findings, and metrics.
// Purpose: Define the structured record produced by every gate attempt.
// Dependencies: crate::core, serde
// ============================================================================

//! ## Overview
//! Every gate attempt yields exactly one [`GateResult`]. Results are never
//! mutated after a gate returns except for the executor appending evidence.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;

use serde::Deserialize;
use serde::Serialize;

use crate::core::context::ContextSummary;
use crate::core::definition::Severity;
use crate::core::evidence::Evidence;
use crate::core::identifiers::GateId;
use crate::core::time::Timestamp;

// ============================================================================
// SECTION: Status
// ============================================================================

/// Outcome of a gate attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GateStatus {
    /// All checks passed.
    Passed,
    /// At least one blocking check failed, or the gate could not run.
    Failed,
    /// Non-blocking issues were found.
    Warning,
    /// The gate was not run (disabled by configuration).
    Skipped,
}

impl GateStatus {
    /// Returns a stable label for the status.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Passed => "passed",
            Self::Failed => "failed",
            Self::Warning => "warning",
            Self::Skipped => "skipped",
        }
    }
}

// ============================================================================
// SECTION: Findings
// ============================================================================

/// Classification of a finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FindingType {
    /// A rule was broken.
    Violation,
    /// A potential issue worth reviewing.
    Warning,
    /// Neutral information.
    Info,
    /// Suggested improvement.
    Recommendation,
}

/// A single issue reported by a gate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Finding {
    /// Finding identifier (stable per rule).
    pub id: String,
    /// Finding classification.
    #[serde(rename = "type")]
    pub finding_type: FindingType,
    /// Finding severity.
    pub severity: Severity,
    /// Short title.
    pub title: String,
    /// Detailed description.
    pub description: String,
    /// Optional location (file, endpoint, or resource).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    /// Optional remediation guidance.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remediation: Option<String>,
}

impl Finding {
    /// Creates a finding of the given type.
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        finding_type: FindingType,
        severity: Severity,
        title: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            finding_type,
            severity,
            title: title.into(),
            description: description.into(),
            location: None,
            remediation: None,
        }
    }

    /// Creates a violation finding.
    #[must_use]
    pub fn violation(
        id: impl Into<String>,
        severity: Severity,
        title: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self::new(id, FindingType::Violation, severity, title, description)
    }

    /// Creates a warning finding.
    #[must_use]
    pub fn warning(
        id: impl Into<String>,
        severity: Severity,
        title: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self::new(id, FindingType::Warning, severity, title, description)
    }

    /// Creates an informational finding.
    #[must_use]
    pub fn info(id: impl Into<String>, title: impl Into<String>, description: impl Into<String>) -> Self {
        Self::new(id, FindingType::Info, Severity::Info, title, description)
    }

    /// Creates a recommendation finding.
    #[must_use]
    pub fn recommendation(
        id: impl Into<String>,
        severity: Severity,
        title: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self::new(id, FindingType::Recommendation, severity, title, description)
    }

    /// Attaches a location.
    #[must_use]
    pub fn at(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    /// Attaches remediation guidance.
    #[must_use]
    pub fn with_remediation(mut self, remediation: impl Into<String>) -> Self {
        self.remediation = Some(remediation.into());
        self
    }
}

// ============================================================================
// SECTION: Metrics
// ============================================================================

/// Direction of a metric threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ThresholdKind {
    /// The value must be at least the threshold (e.g. cache hit rate).
    Minimum,
    /// The value must be at most the threshold (e.g. p99 latency).
    Maximum,
}

/// A quantitative measurement reported by a gate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metric {
    /// Metric name.
    pub name: String,
    /// Measured value.
    pub value: f64,
    /// Unit label (`ms`, `%`, `count`, ...).
    pub unit: String,
    /// Optional threshold.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub threshold: Option<f64>,
    /// Threshold direction when a threshold is present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub threshold_kind: Option<ThresholdKind>,
    /// Whether the value violates the threshold.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub threshold_exceeded: Option<bool>,
    /// Free-form labels.
    #[serde(default)]
    pub labels: BTreeMap<String, String>,
}

impl Metric {
    /// Creates a metric without a threshold.
    #[must_use]
    pub fn new(name: impl Into<String>, value: f64, unit: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value,
            unit: unit.into(),
            threshold: None,
            threshold_kind: None,
            threshold_exceeded: None,
            labels: BTreeMap::new(),
        }
    }

    /// Attaches a threshold and evaluates it using the given direction.
    ///
    /// A minimum threshold is violated when the value falls below it; a
    /// maximum threshold is violated when the value rises above it.
    #[must_use]
    pub fn with_threshold(mut self, threshold: f64, kind: ThresholdKind) -> Self {
        let exceeded = match kind {
            ThresholdKind::Minimum => self.value < threshold,
            ThresholdKind::Maximum => self.value > threshold,
        };
        self.threshold = Some(threshold);
        self.threshold_kind = Some(kind);
        self.threshold_exceeded = Some(exceeded);
        self
    }

    /// Adds a label.
    #[must_use]
    pub fn with_label(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.labels.insert(key.into(), value.into());
        self
    }
}

// ============================================================================
// SECTION: Gate Result
// ============================================================================

/// Structured record of one gate attempt.
///
/// # Invariants
/// - Created once per attempt; only `evidence` is appended after the gate returns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GateResult {
    /// Gate identifier.
    pub gate_id: GateId,
    /// Outcome status.
    pub status: GateStatus,
    /// Attempt duration in milliseconds.
    pub duration_ms: u64,
    /// Human-readable summary.
    pub message: String,
    /// Reported findings.
    #[serde(default)]
    pub findings: Vec<Finding>,
    /// Reported metrics.
    #[serde(default)]
    pub metrics: Vec<Metric>,
    /// Evidence attached by the executor.
    #[serde(default)]
    pub evidence: Vec<Evidence>,
    /// Completion timestamp.
    pub timestamp: Timestamp,
    /// Reference to the execution context the attempt ran under.
    pub context: ContextSummary,
}

impl GateResult {
    /// Returns true when the status is [`GateStatus::Passed`].
    #[must_use]
    pub fn is_passed(&self) -> bool {
        self.status == GateStatus::Passed
    }

    /// Returns true when the status is [`GateStatus::Failed`].
    #[must_use]
    pub fn is_failed(&self) -> bool {
        self.status == GateStatus::Failed
    }
}
