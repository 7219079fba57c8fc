// crates/compliance-gate-core/src/core/context.rs
// ============================================================================
// Module: Compliance Gate Execution Context
// Description: Per-run context and typed dependency results.
// Purpose: Carry run identity, target, metadata, and prior gate outcomes.
// Dependencies: crate::core, serde, serde_json
// ============================================================================

//! ## Overview
//! An [`ExecutionContext`] is created once per orchestration run. It is
//! read-only during execution except for [`DependencyResults`], which grows
//! as gates complete. Dependency outcomes live in exactly one typed field;
//! there is no fallback lookup under alternative metadata keys.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;

use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;

use crate::core::identifiers::ExecutionId;
use crate::core::identifiers::GateId;
use crate::core::result::GateResult;
use crate::core::result::GateStatus;
use crate::core::time::Timestamp;

// ============================================================================
// SECTION: Dependency Results
// ============================================================================

/// Prior gate results keyed by gate identifier.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DependencyResults(BTreeMap<GateId, GateResult>);

impl DependencyResults {
    /// Creates an empty results map.
    #[must_use]
    pub const fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Records a result, replacing any earlier result for the same gate.
    pub fn insert(&mut self, result: GateResult) {
        self.0.insert(result.gate_id.clone(), result);
    }

    /// Returns the recorded result for a gate.
    #[must_use]
    pub fn get(&self, gate_id: &GateId) -> Option<&GateResult> {
        self.0.get(gate_id)
    }

    /// Returns the recorded status for a gate.
    #[must_use]
    pub fn status_of(&self, gate_id: &GateId) -> Option<GateStatus> {
        self.0.get(gate_id).map(|result| result.status)
    }

    /// Returns the number of recorded results.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true when no results are recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates recorded results in gate-id order.
    pub fn iter(&self) -> impl Iterator<Item = (&GateId, &GateResult)> {
        self.0.iter()
    }
}

impl FromIterator<GateResult> for DependencyResults {
    fn from_iter<I: IntoIterator<Item = GateResult>>(iter: I) -> Self {
        let mut results = Self::new();
        for result in iter {
            results.insert(result);
        }
        results
    }
}

// ============================================================================
// SECTION: Execution Context
// ============================================================================

/// Context shared by every gate attempt in one run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionContext {
    /// Execution identifier (also the event correlation id).
    pub execution_id: ExecutionId,
    /// Run start timestamp.
    pub timestamp: Timestamp,
    /// Deployment environment (`development`, `staging`, `production`, ...).
    pub environment: String,
    /// Verification target (service, artifact, or release identifier).
    pub target: String,
    /// Free-form caller metadata.
    #[serde(default)]
    pub metadata: BTreeMap<String, Value>,
    /// Outcomes of gates already completed in this run.
    #[serde(default)]
    pub results: DependencyResults,
}

impl ExecutionContext {
    /// Creates a context with empty metadata and no prior results.
    #[must_use]
    pub fn new(
        execution_id: impl Into<ExecutionId>,
        timestamp: Timestamp,
        environment: impl Into<String>,
        target: impl Into<String>,
    ) -> Self {
        Self {
            execution_id: execution_id.into(),
            timestamp,
            environment: environment.into(),
            target: target.into(),
            metadata: BTreeMap::new(),
            results: DependencyResults::new(),
        }
    }

    /// Adds a metadata entry.
    #[must_use]
    pub fn with_metadata(mut self, key: impl Into<String>, value: Value) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }

    /// Replaces the prior results.
    #[must_use]
    pub fn with_results(mut self, results: DependencyResults) -> Self {
        self.results = results;
        self
    }

    /// Returns the summary embedded into results and evidence.
    #[must_use]
    pub fn summary(&self) -> ContextSummary {
        ContextSummary {
            execution_id: self.execution_id.clone(),
            environment: self.environment.clone(),
            target: self.target.clone(),
            timestamp: self.timestamp,
        }
    }
}

/// Compact reference to the context a result was produced under.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextSummary {
    /// Execution identifier.
    pub execution_id: ExecutionId,
    /// Deployment environment.
    pub environment: String,
    /// Verification target.
    pub target: String,
    /// Run start timestamp.
    pub timestamp: Timestamp,
}
