// crates/compliance-gate-core/src/core/summary.rs
// ============================================================================
// Module: Compliance Gate Execution Summary
// Description: Aggregated orchestration outcome with an evidence chain hash.
// Purpose: Report counts, overall status, and a tamper-evident digest per run.
// Dependencies: crate::core, serde
// ============================================================================

//! ## Overview
//! The summary keeps every result actually produced, in production order,
//! alongside a deterministic digest over `(gate id, status, timestamp,
//! evidence hashes)` tuples. Changing any recorded outcome changes the digest.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;

use crate::core::hashing::HashDigest;
use crate::core::identifiers::ExecutionId;
use crate::core::identifiers::OrchestrationId;
use crate::core::plan::ExecutionMode;
use crate::core::result::GateResult;
use crate::core::result::GateStatus;
use crate::core::time::Timestamp;

// ============================================================================
// SECTION: Status Counts
// ============================================================================

/// Result counts by status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusCounts {
    /// Total results.
    pub total: usize,
    /// Passed results.
    pub passed: usize,
    /// Failed results.
    pub failed: usize,
    /// Warning results.
    pub warning: usize,
    /// Skipped results.
    pub skipped: usize,
}

impl StatusCounts {
    /// Counts results by status.
    #[must_use]
    pub fn from_results(results: &[GateResult]) -> Self {
        let mut counts = Self {
            total: results.len(),
            ..Self::default()
        };
        for result in results {
            match result.status {
                GateStatus::Passed => counts.passed += 1,
                GateStatus::Failed => counts.failed += 1,
                GateStatus::Warning => counts.warning += 1,
                GateStatus::Skipped => counts.skipped += 1,
            }
        }
        counts
    }

    /// Returns the overall status.
    ///
    /// Precedence is failed, then warning, then skipped (only when every
    /// result was skipped), then passed. An empty run is passed.
    #[must_use]
    pub const fn overall_status(&self) -> GateStatus {
        if self.failed > 0 {
            GateStatus::Failed
        } else if self.warning > 0 {
            GateStatus::Warning
        } else if self.total > 0 && self.skipped == self.total {
            GateStatus::Skipped
        } else {
            GateStatus::Passed
        }
    }
}

// ============================================================================
// SECTION: Execution Summary
// ============================================================================

/// Aggregated outcome of one orchestration run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionSummary {
    /// Orchestration plan identifier.
    pub orchestration_id: OrchestrationId,
    /// Execution identifier.
    pub execution_id: ExecutionId,
    /// Execution mode used.
    pub mode: ExecutionMode,
    /// Counts by status.
    pub counts: StatusCounts,
    /// Overall status.
    pub overall_status: GateStatus,
    /// Wall-clock duration in milliseconds.
    pub duration_ms: u64,
    /// Start timestamp.
    pub started_at: Timestamp,
    /// Completion timestamp.
    pub completed_at: Timestamp,
    /// Every result produced, in production order.
    pub results: Vec<GateResult>,
    /// Digest over the ordered result tuples.
    pub evidence_chain_hash: HashDigest,
}
