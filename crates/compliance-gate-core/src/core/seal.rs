// crates/compliance-gate-core/src/core/seal.rs
// ============================================================================
// Module: Compliance Gate Seal Records
// Description: Sealed baseline payloads, policies, and verification reports.
// Purpose: Define the durable, independently re-verifiable audit artifact.
// Dependencies: crate::core, serde, serde_json
// ============================================================================

//! ## Overview
//! A [`SealedBaseline`] binds an evidence chain and a gate-results summary to
//! a signature computed over the canonical serialization of [`SealData`].
//! Verification only ever flips `status` and `verified_at`; `seal_data` is
//! never rewritten.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;

use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;

use crate::core::evidence::EvidenceChainEntry;
use crate::core::evidence::SignatureAlgorithm;
use crate::core::identifiers::GateId;
use crate::core::identifiers::SealId;
use crate::core::result::GateResult;
use crate::core::result::GateStatus;
use crate::core::time::Timestamp;

// ============================================================================
// SECTION: Gate Results Summary
// ============================================================================

/// Outcome counts across a known gate set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GateResultsSummary {
    /// Number of gates summarized.
    pub total_gates: usize,
    /// Number of passed gates.
    pub passed_gates: usize,
    /// Number of failed gates.
    pub failed_gates: usize,
    /// Number of gates with warnings.
    pub warning_gates: usize,
    /// Number of skipped gates.
    pub skipped_gates: usize,
    /// Gate identifiers in summary order.
    pub gate_ids: Vec<GateId>,
}

impl GateResultsSummary {
    /// Aggregates a summary from gate results.
    #[must_use]
    pub fn from_results(results: &[GateResult]) -> Self {
        let mut summary = Self {
            total_gates: results.len(),
            ..Self::default()
        };
        for result in results {
            match result.status {
                GateStatus::Passed => summary.passed_gates += 1,
                GateStatus::Failed => summary.failed_gates += 1,
                GateStatus::Warning => summary.warning_gates += 1,
                GateStatus::Skipped => summary.skipped_gates += 1,
            }
            summary.gate_ids.push(result.gate_id.clone());
        }
        summary
    }
}

// ============================================================================
// SECTION: Seal Policy and Request
// ============================================================================

/// Policy applied when creating a seal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SealPolicy {
    /// Refuse to seal when any summarized gate failed.
    pub require_all_gates_passed: bool,
    /// Seal format version stamped into [`SealData`].
    pub version: String,
}

impl Default for SealPolicy {
    fn default() -> Self {
        Self {
            require_all_gates_passed: true,
            version: "1.0.0".to_string(),
        }
    }
}

/// Inputs to a seal operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SealRequest {
    /// Evidence chain to seal.
    pub evidence_chain: Vec<EvidenceChainEntry>,
    /// Gate results summary to seal.
    pub gate_results: GateResultsSummary,
    /// Caller metadata copied into the seal.
    #[serde(default)]
    pub metadata: BTreeMap<String, Value>,
}

// ============================================================================
// SECTION: Sealed Baseline
// ============================================================================

/// Signed seal payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SealData {
    /// Seal identifier.
    pub seal_id: SealId,
    /// Seal format version.
    pub version: String,
    /// Seal creation timestamp.
    pub timestamp: Timestamp,
    /// Verification target.
    pub target: String,
    /// Deployment environment.
    pub environment: String,
    /// Sealed evidence chain.
    pub evidence_chain: Vec<EvidenceChainEntry>,
    /// Sealed gate results summary.
    pub gate_results_summary: GateResultsSummary,
    /// Caller metadata.
    #[serde(default)]
    pub metadata: BTreeMap<String, Value>,
}

/// Lifecycle status of a sealed baseline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SealStatus {
    /// Signed but not yet verified.
    Sealed,
    /// Signature recomputed and matched.
    Verified,
    /// Signature recomputation did not match.
    Invalid,
}

/// Durable sealed baseline record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SealedBaseline {
    /// Signed payload.
    pub seal_data: SealData,
    /// Lowercase hex signature over the canonical `seal_data`.
    pub signature: String,
    /// Signature scheme.
    pub algorithm: SignatureAlgorithm,
    /// Fingerprint of the signing key.
    pub key_fingerprint: String,
    /// Lifecycle status.
    pub status: SealStatus,
    /// Timestamp of the last successful verification.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verified_at: Option<Timestamp>,
}

impl SealedBaseline {
    /// Returns the seal identifier.
    #[must_use]
    pub const fn seal_id(&self) -> &SealId {
        &self.seal_data.seal_id
    }
}

/// Result of (re-)verifying a sealed baseline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SealVerification {
    /// Seal identifier.
    pub seal_id: SealId,
    /// Whether the recomputed signature matched.
    pub valid: bool,
    /// Status after verification.
    pub status: SealStatus,
    /// Verification timestamp when valid.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verified_at: Option<Timestamp>,
    /// Failure reason when invalid.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}
