// crates/compliance-gate-core/src/runtime/result_builder.rs
// ============================================================================
// Module: Compliance Gate Result Builder
// Description: Shared helpers for gate authors to assemble results.
// Purpose: Keep result construction uniform across gate implementations.
// Dependencies: crate::{core, interfaces}
// ============================================================================

//! ## Overview
//! [`GateResultBuilder`] measures duration from construction, collects
//! findings and metrics, and finishes with an explicit status or one derived
//! from the findings.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::time::Instant;

use crate::core::ContextSummary;
use crate::core::ExecutionContext;
use crate::core::Finding;
use crate::core::FindingType;
use crate::core::GateId;
use crate::core::GateResult;
use crate::core::GateStatus;
use crate::core::Metric;
use crate::core::Severity;
use crate::core::Timestamp;
use crate::interfaces::Clock;
use crate::runtime::clock::SystemClock;

// ============================================================================
// SECTION: Builder
// ============================================================================

/// Incremental builder for [`GateResult`].
#[derive(Debug, Clone)]
pub struct GateResultBuilder {
    /// Gate identifier.
    gate_id: GateId,
    /// Context reference.
    context: ContextSummary,
    /// Construction instant used for duration.
    started: Instant,
    /// Summary message.
    message: String,
    /// Collected findings.
    findings: Vec<Finding>,
    /// Collected metrics.
    metrics: Vec<Metric>,
    /// Explicit completion timestamp.
    timestamp: Option<Timestamp>,
}

impl GateResultBuilder {
    /// Starts a result for a gate under a context.
    #[must_use]
    pub fn new(gate_id: impl Into<GateId>, context: &ExecutionContext) -> Self {
        Self {
            gate_id: gate_id.into(),
            context: context.summary(),
            started: Instant::now(),
            message: String::new(),
            findings: Vec::new(),
            metrics: Vec::new(),
            timestamp: None,
        }
    }

    /// Sets the summary message.
    #[must_use]
    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// Adds a finding.
    #[must_use]
    pub fn finding(mut self, finding: Finding) -> Self {
        self.findings.push(finding);
        self
    }

    /// Adds several findings.
    #[must_use]
    pub fn findings(mut self, findings: impl IntoIterator<Item = Finding>) -> Self {
        self.findings.extend(findings);
        self
    }

    /// Adds a metric.
    #[must_use]
    pub fn metric(mut self, metric: Metric) -> Self {
        self.metrics.push(metric);
        self
    }

    /// Pins the completion timestamp instead of reading the system clock.
    #[must_use]
    pub const fn timestamp(mut self, timestamp: Timestamp) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    /// Finishes as passed.
    #[must_use]
    pub fn passed(self) -> GateResult {
        self.finish(GateStatus::Passed)
    }

    /// Finishes as failed.
    #[must_use]
    pub fn failed(self) -> GateResult {
        self.finish(GateStatus::Failed)
    }

    /// Finishes as warning.
    #[must_use]
    pub fn warning(self) -> GateResult {
        self.finish(GateStatus::Warning)
    }

    /// Finishes as skipped.
    #[must_use]
    pub fn skipped(self) -> GateResult {
        self.finish(GateStatus::Skipped)
    }

    /// Finishes with a status derived from findings and metric thresholds.
    ///
    /// High or critical violations fail the gate; any other violation,
    /// warning, or exceeded threshold yields a warning; otherwise it passes.
    #[must_use]
    pub fn derive_status(self) -> GateResult {
        let blocking = self.findings.iter().any(|finding| {
            finding.finding_type == FindingType::Violation && finding.severity >= Severity::High
        });
        let concerning = self.findings.iter().any(|finding| {
            matches!(finding.finding_type, FindingType::Violation | FindingType::Warning)
        }) || self.metrics.iter().any(|metric| metric.threshold_exceeded == Some(true));
        let status = if blocking {
            GateStatus::Failed
        } else if concerning {
            GateStatus::Warning
        } else {
            GateStatus::Passed
        };
        self.finish(status)
    }

    /// Finishes with an explicit status.
    #[must_use]
    pub fn finish(self, status: GateStatus) -> GateResult {
        let duration_ms = u64::try_from(self.started.elapsed().as_millis()).unwrap_or(u64::MAX);
        GateResult {
            gate_id: self.gate_id,
            status,
            duration_ms,
            message: self.message,
            findings: self.findings,
            metrics: self.metrics,
            evidence: Vec::new(),
            timestamp: self.timestamp.unwrap_or_else(|| SystemClock.now()),
            context: self.context,
        }
    }
}
