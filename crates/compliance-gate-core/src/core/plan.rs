// crates/compliance-gate-core/src/core/plan.rs
// ============================================================================
// Module: Compliance Gate Orchestration Plans
// Description: Validated plans naming gates, execution mode, and overrides.
// Purpose: Reject malformed gate configuration before any gate runs.
// Dependencies: crate::core, serde, thiserror
// ============================================================================

//! ## Overview
//! Plans are built through [`OrchestrationPlanBuilder`], which validates
//! every per-gate [`GateConfig`] and rejects duplicate gate ids. A built plan
//! is immutable.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::collections::BTreeSet;

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

use crate::core::gate_config::GateConfig;
use crate::core::gate_config::GateConfigError;
use crate::core::identifiers::GateId;
use crate::core::identifiers::OrchestrationId;

// ============================================================================
// SECTION: Execution Mode
// ============================================================================

/// Scheduling mode for an orchestration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionMode {
    /// One gate at a time, in listed order.
    Sequential,
    /// Fixed-size concurrent chunks, in listed order.
    Parallel,
    /// Dependency-respecting concurrent waves.
    Dag,
}

impl ExecutionMode {
    /// Returns a stable label for the mode.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Sequential => "sequential",
            Self::Parallel => "parallel",
            Self::Dag => "dag",
        }
    }
}

// ============================================================================
// SECTION: Plan
// ============================================================================

/// Validated orchestration plan.
#[derive(Debug, Clone, PartialEq)]
pub struct OrchestrationPlan {
    /// Plan identifier.
    id: OrchestrationId,
    /// Gates to run, in requested order.
    gate_ids: Vec<GateId>,
    /// Scheduling mode.
    mode: ExecutionMode,
    /// Stop launching gates after a failure.
    stop_on_failure: bool,
    /// Per-gate overrides for this run.
    configs: BTreeMap<GateId, GateConfig>,
}

impl OrchestrationPlan {
    /// Starts building a plan.
    #[must_use]
    pub fn builder(id: impl Into<OrchestrationId>, mode: ExecutionMode) -> OrchestrationPlanBuilder {
        OrchestrationPlanBuilder {
            id: id.into(),
            gate_ids: Vec::new(),
            mode,
            stop_on_failure: false,
            configs: BTreeMap::new(),
        }
    }

    /// Returns the plan identifier.
    #[must_use]
    pub const fn id(&self) -> &OrchestrationId {
        &self.id
    }

    /// Returns the requested gate order.
    #[must_use]
    pub fn gate_ids(&self) -> &[GateId] {
        &self.gate_ids
    }

    /// Returns the scheduling mode.
    #[must_use]
    pub const fn mode(&self) -> ExecutionMode {
        self.mode
    }

    /// Returns whether the run stops after a failure.
    #[must_use]
    pub const fn stop_on_failure(&self) -> bool {
        self.stop_on_failure
    }

    /// Returns the plan-level override for a gate.
    #[must_use]
    pub fn config(&self, gate_id: &GateId) -> Option<&GateConfig> {
        self.configs.get(gate_id)
    }
}

// ============================================================================
// SECTION: Builder
// ============================================================================

/// Builder for [`OrchestrationPlan`].
#[derive(Debug, Clone)]
pub struct OrchestrationPlanBuilder {
    /// Plan identifier.
    id: OrchestrationId,
    /// Gates to run.
    gate_ids: Vec<GateId>,
    /// Scheduling mode.
    mode: ExecutionMode,
    /// Stop-on-failure flag.
    stop_on_failure: bool,
    /// Per-gate overrides.
    configs: BTreeMap<GateId, GateConfig>,
}

impl OrchestrationPlanBuilder {
    /// Appends a gate.
    #[must_use]
    pub fn gate(mut self, gate_id: impl Into<GateId>) -> Self {
        self.gate_ids.push(gate_id.into());
        self
    }

    /// Appends several gates.
    #[must_use]
    pub fn gates<I, G>(mut self, gate_ids: I) -> Self
    where
        I: IntoIterator<Item = G>,
        G: Into<GateId>,
    {
        self.gate_ids.extend(gate_ids.into_iter().map(Into::into));
        self
    }

    /// Sets the stop-on-failure flag.
    #[must_use]
    pub const fn stop_on_failure(mut self, stop: bool) -> Self {
        self.stop_on_failure = stop;
        self
    }

    /// Sets the override for a gate.
    #[must_use]
    pub fn config(mut self, gate_id: impl Into<GateId>, config: GateConfig) -> Self {
        self.configs.insert(gate_id.into(), config);
        self
    }

    /// Validates and builds the plan.
    ///
    /// # Errors
    ///
    /// Returns [`PlanError`] for duplicate gates, overrides naming gates outside
    /// the plan, or invalid gate configuration.
    pub fn build(self) -> Result<OrchestrationPlan, PlanError> {
        let mut seen = BTreeSet::new();
        for gate_id in &self.gate_ids {
            if !seen.insert(gate_id) {
                return Err(PlanError::DuplicateGate(gate_id.clone()));
            }
        }
        for (gate_id, config) in &self.configs {
            if !seen.contains(gate_id) {
                return Err(PlanError::ConfigForUnplannedGate(gate_id.clone()));
            }
            config.validate().map_err(|source| PlanError::InvalidConfig {
                gate_id: gate_id.clone(),
                source,
            })?;
        }
        Ok(OrchestrationPlan {
            id: self.id,
            gate_ids: self.gate_ids,
            mode: self.mode,
            stop_on_failure: self.stop_on_failure,
            configs: self.configs,
        })
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Plan construction errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlanError {
    /// A gate appears more than once.
    #[error("gate listed more than once: {0}")]
    DuplicateGate(GateId),
    /// An override names a gate that is not in the plan.
    #[error("config supplied for gate not in plan: {0}")]
    ConfigForUnplannedGate(GateId),
    /// A gate override failed validation.
    #[error("invalid config for gate {gate_id}: {source}")]
    InvalidConfig {
        /// Gate identifier.
        gate_id: GateId,
        /// Validation failure.
        source: GateConfigError,
    },
}
