// crates/compliance-gate-core/src/runtime/orchestration.rs
// ============================================================================
// Module: Compliance Gate Orchestration
// Description: Sequential, parallel, and dependency-wave execution of gate plans.
// Purpose: Run an orchestration plan and aggregate a hash-anchored summary.
// Dependencies: crate::{core, interfaces, runtime}, futures, serde, serde_json
// ============================================================================

//! ## Overview
//! [`GateExecutor::execute_orchestration`] runs every gate of a plan through
//! the single-gate path and folds the results into an [`ExecutionSummary`].
//!
//! Each produced result is recorded into the run's working context before the
//! next gate, chunk, or wave starts, so in-plan dependencies are gated on the
//! outcomes of this run. Gates inside one chunk or wave share the snapshot
//! taken when the chunk or wave starts.
//!
//! Ordering checks from [`GateRegistry::validate_execution_order`] are advisory
//! and only logged. The dag mode enforces acyclicity and is the only path that
//! returns an error.
//!
//! [`GateRegistry::validate_execution_order`]: crate::runtime::GateRegistry::validate_execution_order

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeSet;
use std::time::Instant;

use futures::future::join_all;
use serde::Serialize;
use serde_json::json;
use thiserror::Error;

use crate::core::DEFAULT_HASH_ALGORITHM;
use crate::core::ExecutionContext;
use crate::core::ExecutionMode;
use crate::core::ExecutionSummary;
use crate::core::GateConfig;
use crate::core::GateEvent;
use crate::core::GateEventType;
use crate::core::GateId;
use crate::core::GateResult;
use crate::core::GateStatus;
use crate::core::HashDigest;
use crate::core::HashError;
use crate::core::OrchestrationPlan;
use crate::core::StatusCounts;
use crate::core::Timestamp;
use crate::core::hashing::hash_canonical_json;
use crate::interfaces::LogLevel;
use crate::interfaces::LogRecord;
use crate::runtime::executor::GateExecutor;
use crate::runtime::executor::duration_millis;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Orchestration failures that abort the whole run.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OrchestrationError {
    /// Dag mode found remaining gates with no ready member.
    #[error("circular dependency detected among gates: {}", join_ids(.remaining))]
    CircularDependency {
        /// Gates that could not be scheduled, in plan order.
        remaining: Vec<GateId>,
    },
    /// The evidence chain hash could not be computed.
    #[error(transparent)]
    Hash(#[from] HashError),
}

/// Joins gate ids for display.
fn join_ids(ids: &[GateId]) -> String {
    ids.iter().map(GateId::as_str).collect::<Vec<_>>().join(", ")
}

// ============================================================================
// SECTION: Evidence Chain Hash
// ============================================================================

/// Hashed tuple describing one recorded outcome.
#[derive(Serialize)]
struct OutcomeTuple<'a> {
    /// Gate identifier.
    gate_id: &'a GateId,
    /// Outcome status.
    status: GateStatus,
    /// Result timestamp (RFC 3339).
    timestamp: Timestamp,
    /// Evidence content hashes in attachment order.
    evidence_hashes: Vec<&'a str>,
}

/// Computes the digest over the ordered `(gate id, status, timestamp,
/// evidence hashes)` tuples of a run.
///
/// # Errors
///
/// Returns [`HashError`] when canonicalization fails.
pub fn compute_evidence_chain_hash(results: &[GateResult]) -> Result<HashDigest, HashError> {
    let tuples: Vec<OutcomeTuple<'_>> = results
        .iter()
        .map(|result| OutcomeTuple {
            gate_id: &result.gate_id,
            status: result.status,
            timestamp: result.timestamp,
            evidence_hashes: result
                .evidence
                .iter()
                .map(|evidence| evidence.hash.value.as_str())
                .collect(),
        })
        .collect();
    hash_canonical_json(DEFAULT_HASH_ALGORITHM, &tuples)
}

// ============================================================================
// SECTION: Orchestration
// ============================================================================

impl GateExecutor {
    /// Runs an orchestration plan and aggregates its summary.
    ///
    /// # Errors
    ///
    /// Returns [`OrchestrationError::CircularDependency`] when a dag plan
    /// cannot make progress, or [`OrchestrationError::Hash`] when the
    /// evidence chain hash cannot be computed.
    pub async fn execute_orchestration(
        &self,
        plan: &OrchestrationPlan,
        context: &ExecutionContext,
    ) -> Result<ExecutionSummary, OrchestrationError> {
        let started = Instant::now();
        let started_at = self.now();

        for violation in self.registry.validate_execution_order(plan.gate_ids()) {
            self.log(
                LogRecord::new(LogLevel::Warn, "orchestration.order", violation)
                    .execution(&context.execution_id)
                    .fields(json!({ "orchestration_id": plan.id() })),
            );
        }
        self.log(
            LogRecord::new(LogLevel::Info, "orchestration.started", "orchestration started")
                .execution(&context.execution_id)
                .fields(json!({
                    "orchestration_id": plan.id(),
                    "mode": plan.mode().as_str(),
                    "gate_count": plan.gate_ids().len(),
                })),
        );
        self.emit(GateEvent::new(
            GateEventType::OrchestrationStarted,
            None,
            started_at,
            json!({
                "orchestration_id": plan.id(),
                "mode": plan.mode().as_str(),
                "gate_ids": plan.gate_ids(),
                "stop_on_failure": plan.stop_on_failure(),
            }),
            context.execution_id.clone(),
        ));

        let results = match plan.mode() {
            ExecutionMode::Sequential => self.run_sequential(plan, context).await,
            ExecutionMode::Parallel => self.run_parallel(plan, context).await,
            ExecutionMode::Dag => match self.run_dag(plan, context).await {
                Ok(results) => results,
                Err(err) => {
                    self.log(
                        LogRecord::new(LogLevel::Error, "orchestration.aborted", err.to_string())
                            .execution(&context.execution_id)
                            .fields(json!({ "orchestration_id": plan.id() })),
                    );
                    return Err(err);
                }
            },
        };

        let evidence_chain_hash = compute_evidence_chain_hash(&results)?;
        let counts = StatusCounts::from_results(&results);
        let summary = ExecutionSummary {
            orchestration_id: plan.id().clone(),
            execution_id: context.execution_id.clone(),
            mode: plan.mode(),
            counts,
            overall_status: counts.overall_status(),
            duration_ms: duration_millis(started.elapsed()),
            started_at,
            completed_at: self.now(),
            results,
            evidence_chain_hash,
        };

        self.log(
            LogRecord::new(LogLevel::Info, "orchestration.completed", "orchestration completed")
                .execution(&context.execution_id)
                .fields(json!({
                    "orchestration_id": plan.id(),
                    "overall_status": summary.overall_status.as_str(),
                    "duration_ms": summary.duration_ms,
                })),
        );
        self.emit(GateEvent::new(
            GateEventType::OrchestrationCompleted,
            None,
            summary.completed_at,
            json!({
                "orchestration_id": plan.id(),
                "overall_status": summary.overall_status.as_str(),
                "duration_ms": summary.duration_ms,
                "counts": summary.counts,
                "evidence_chain_hash": summary.evidence_chain_hash.value,
            }),
            context.execution_id.clone(),
        ));
        Ok(summary)
    }

    /// Runs gates one at a time in plan order.
    async fn run_sequential(
        &self,
        plan: &OrchestrationPlan,
        context: &ExecutionContext,
    ) -> Vec<GateResult> {
        let mut working = context.clone();
        let mut results = Vec::with_capacity(plan.gate_ids().len());
        for gate_id in plan.gate_ids() {
            let result = self.run_gate(gate_id, &working, self.plan_config(plan, gate_id)).await;
            let failed = result.status == GateStatus::Failed;
            working.results.insert(result.clone());
            results.push(result);
            if failed && plan.stop_on_failure() {
                break;
            }
        }
        results
    }

    /// Runs gates in fixed-size concurrent chunks in plan order.
    async fn run_parallel(
        &self,
        plan: &OrchestrationPlan,
        context: &ExecutionContext,
    ) -> Vec<GateResult> {
        let mut working = context.clone();
        let mut results = Vec::with_capacity(plan.gate_ids().len());
        for chunk in plan.gate_ids().chunks(self.width()) {
            let batch = self.run_batch(plan, chunk.iter(), &working).await;
            let failed = record_batch(&mut working, &mut results, batch);
            if failed && plan.stop_on_failure() {
                break;
            }
        }
        results
    }

    /// Runs gates in dependency-respecting waves.
    async fn run_dag(
        &self,
        plan: &OrchestrationPlan,
        context: &ExecutionContext,
    ) -> Result<Vec<GateResult>, OrchestrationError> {
        let in_plan: BTreeSet<&GateId> = plan.gate_ids().iter().collect();
        let mut executed: BTreeSet<&GateId> = BTreeSet::new();
        let mut remaining: Vec<&GateId> = plan.gate_ids().iter().collect();
        let mut working = context.clone();
        let mut results = Vec::with_capacity(remaining.len());

        while !remaining.is_empty() {
            let ready: Vec<&GateId> = remaining
                .iter()
                .copied()
                .filter(|gate_id| {
                    self.registry.get(gate_id).is_none_or(|definition| {
                        definition.dependencies.iter().all(|dependency| {
                            executed.contains(dependency) || !in_plan.contains(dependency)
                        })
                    })
                })
                .take(self.width())
                .collect();
            if ready.is_empty() {
                return Err(OrchestrationError::CircularDependency {
                    remaining: remaining.into_iter().cloned().collect(),
                });
            }

            let batch = self.run_batch(plan, ready.iter().copied(), &working).await;
            let failed = record_batch(&mut working, &mut results, batch);
            remaining.retain(|gate_id| !ready.contains(gate_id));
            executed.extend(ready);
            if failed && plan.stop_on_failure() {
                break;
            }
        }
        Ok(results)
    }

    /// Runs a set of gates concurrently against one context snapshot.
    async fn run_batch<'a>(
        &self,
        plan: &OrchestrationPlan,
        gate_ids: impl Iterator<Item = &'a GateId>,
        context: &ExecutionContext,
    ) -> Vec<GateResult> {
        join_all(
            gate_ids.map(|gate_id| self.run_gate(gate_id, context, self.plan_config(plan, gate_id))),
        )
        .await
    }

    /// Resolves a gate's override: plan-level first, then executor-level.
    fn plan_config<'a>(
        &'a self,
        plan: &'a OrchestrationPlan,
        gate_id: &GateId,
    ) -> Option<&'a GateConfig> {
        plan.config(gate_id).or_else(|| self.configs.get(gate_id))
    }

    /// Returns the chunk size and wave width (at least one).
    fn width(&self) -> usize {
        self.config.max_concurrency.max(1)
    }
}

/// Records a batch into the working context and result list; returns whether any failed.
fn record_batch(
    working: &mut ExecutionContext,
    results: &mut Vec<GateResult>,
    batch: Vec<GateResult>,
) -> bool {
    let mut failed = false;
    for result in batch {
        failed |= result.status == GateStatus::Failed;
        working.results.insert(result.clone());
        results.push(result);
    }
    failed
}
