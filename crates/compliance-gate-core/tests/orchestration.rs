// crates/compliance-gate-core/tests/orchestration.rs
// ============================================================================
// Module: Orchestration Tests
// Description: Sequential, parallel, and dag scheduling plus summaries.
// ============================================================================
//! ## Overview
//! Validates mode-specific ordering, stop-on-failure boundaries, dag wave
//! progression and cycle rejection, summary aggregation, and the evidence
//! chain hash.

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only output and panic-based assertions are permitted."
)]

mod common;

use std::sync::Arc;
use std::sync::Mutex;
use std::time::Duration;

use compliance_gate_core::ExecutionMode;
use compliance_gate_core::ExecutorConfig;
use compliance_gate_core::GateConfig;
use compliance_gate_core::GateFailureKind;
use compliance_gate_core::GateId;
use compliance_gate_core::GateStatus;
use compliance_gate_core::OrchestrationError;
use compliance_gate_core::OrchestrationPlan;
use compliance_gate_core::PlanError;
use compliance_gate_core::runtime::compute_evidence_chain_hash;

use crate::common::MislabeledGate;
use crate::common::RecordingListener;
use crate::common::RecordingLogSink;
use crate::common::StaticGate;
use crate::common::Trace;
use crate::common::definition;
use crate::common::executor;
use crate::common::executor_with_config;
use crate::common::sample_context;

fn new_trace() -> Trace {
    Arc::new(Mutex::new(Vec::new()))
}

fn ran(summary: &compliance_gate_core::ExecutionSummary) -> Vec<&str> {
    summary.results.iter().map(|result| result.gate_id.as_str()).collect()
}

fn position(trace: &[String], marker: &str) -> usize {
    trace.iter().position(|entry| entry == marker).unwrap()
}

// ============================================================================
// SECTION: Sequential
// ============================================================================

#[tokio::test]
async fn sequential_runs_in_listed_order() {
    let trace = new_trace();
    let executor = executor(
        vec![definition("a", &[]), definition("b", &[]), definition("c", &[])],
        vec![
            Arc::new(StaticGate::passing("a").with_trace(&trace)),
            Arc::new(StaticGate::passing("b").with_trace(&trace)),
            Arc::new(StaticGate::passing("c").with_trace(&trace)),
        ],
    );
    let plan = OrchestrationPlan::builder("release", ExecutionMode::Sequential)
        .gates(["c", "a", "b"])
        .build()
        .unwrap();

    let summary = executor.execute_orchestration(&plan, &sample_context()).await.unwrap();
    assert_eq!(ran(&summary), vec!["c", "a", "b"]);
    assert_eq!(
        *trace.lock().unwrap(),
        vec!["start:c", "end:c", "start:a", "end:a", "start:b", "end:b"]
    );
    assert_eq!(summary.overall_status, GateStatus::Passed);
    assert_eq!(summary.counts.passed, 3);
}

#[tokio::test]
async fn sequential_stop_on_failure_never_attempts_later_gates() {
    let executor = executor(
        vec![definition("a", &[]), definition("b", &[]), definition("c", &[])],
        vec![
            Arc::new(StaticGate::passing("a")),
            Arc::new(StaticGate::new("b", GateStatus::Failed)),
            Arc::new(StaticGate::passing("c")),
        ],
    );
    let plan = OrchestrationPlan::builder("release", ExecutionMode::Sequential)
        .gates(["a", "b", "c"])
        .stop_on_failure(true)
        .build()
        .unwrap();

    let summary = executor.execute_orchestration(&plan, &sample_context()).await.unwrap();
    assert_eq!(ran(&summary), vec!["a", "b"]);
    assert_eq!(summary.counts.total, 2);
    assert_eq!(summary.counts.skipped, 0);
    assert_eq!(summary.overall_status, GateStatus::Failed);
}

#[tokio::test]
async fn sequential_feeds_results_to_later_dependencies() {
    let executor = executor(
        vec![definition("a", &[]), definition("b", &["a"])],
        vec![Arc::new(StaticGate::passing("a")), Arc::new(StaticGate::passing("b"))],
    );
    let plan = OrchestrationPlan::builder("release", ExecutionMode::Sequential)
        .gates(["a", "b"])
        .build()
        .unwrap();
    let summary = executor.execute_orchestration(&plan, &sample_context()).await.unwrap();
    assert!(summary.results.iter().all(|result| result.status == GateStatus::Passed));
}

#[tokio::test]
async fn mislabeled_result_cannot_satisfy_a_failed_dependency() {
    let executor = executor(
        vec![definition("a", &[]), definition("x", &[]), definition("b", &["a"])],
        vec![
            Arc::new(StaticGate::new("a", GateStatus::Failed)),
            Arc::new(MislabeledGate::new("x", "a")),
            Arc::new(StaticGate::passing("b")),
        ],
    );
    let plan = OrchestrationPlan::builder("release", ExecutionMode::Sequential)
        .gates(["a", "x", "b"])
        .build()
        .unwrap();

    let summary = executor.execute_orchestration(&plan, &sample_context()).await.unwrap();
    assert_eq!(ran(&summary), vec!["a", "x", "b"]);
    let statuses: Vec<GateStatus> = summary.results.iter().map(|result| result.status).collect();
    assert_eq!(statuses, vec![GateStatus::Failed; 3]);
    assert_eq!(summary.results[1].findings[0].id, GateFailureKind::ExecutionException.finding_id());
    assert_eq!(summary.results[2].findings[0].id, GateFailureKind::DependencyUnsatisfied.finding_id());
}

#[tokio::test]
async fn out_of_order_plan_is_logged_not_blocked() {
    let sink = Arc::new(RecordingLogSink::default());
    let executor = executor(
        vec![definition("a", &[]), definition("b", &["a"])],
        vec![Arc::new(StaticGate::passing("a")), Arc::new(StaticGate::passing("b"))],
    )
    .with_logger(sink.clone());
    let plan = OrchestrationPlan::builder("release", ExecutionMode::Sequential)
        .gates(["b", "a"])
        .build()
        .unwrap();

    let summary = executor.execute_orchestration(&plan, &sample_context()).await.unwrap();
    assert_eq!(ran(&summary), vec!["b", "a"]);
    assert_eq!(summary.results[0].status, GateStatus::Failed);
    assert_eq!(summary.results[1].status, GateStatus::Passed);
    assert!(sink.events().contains(&"orchestration.order"));
}

// ============================================================================
// SECTION: Parallel
// ============================================================================

#[tokio::test]
async fn parallel_awaits_each_chunk_before_the_next() {
    let trace = new_trace();
    let config = ExecutorConfig {
        max_concurrency: 2,
        ..ExecutorConfig::default()
    };
    let executor = executor_with_config(
        vec![definition("a", &[]), definition("b", &[]), definition("c", &[])],
        vec![
            Arc::new(StaticGate::passing("a").with_delay(Duration::from_millis(30)).with_trace(&trace)),
            Arc::new(StaticGate::passing("b").with_delay(Duration::from_millis(5)).with_trace(&trace)),
            Arc::new(StaticGate::passing("c").with_trace(&trace)),
        ],
        config,
    );
    let plan = OrchestrationPlan::builder("release", ExecutionMode::Parallel)
        .gates(["a", "b", "c"])
        .build()
        .unwrap();

    let summary = executor.execute_orchestration(&plan, &sample_context()).await.unwrap();
    let trace = trace.lock().unwrap();
    assert!(position(&trace, "start:b") < position(&trace, "end:a"));
    assert!(position(&trace, "end:a") < position(&trace, "start:c"));
    assert!(position(&trace, "end:b") < position(&trace, "start:c"));
    assert_eq!(summary.counts.total, 3);
}

#[tokio::test]
async fn parallel_stop_on_failure_checks_chunk_boundaries() {
    let config = ExecutorConfig {
        max_concurrency: 2,
        ..ExecutorConfig::default()
    };
    let executor = executor_with_config(
        vec![definition("a", &[]), definition("b", &[]), definition("c", &[])],
        vec![
            Arc::new(StaticGate::new("a", GateStatus::Failed)),
            Arc::new(StaticGate::passing("b").with_delay(Duration::from_millis(10))),
            Arc::new(StaticGate::passing("c")),
        ],
        config,
    );
    let plan = OrchestrationPlan::builder("release", ExecutionMode::Parallel)
        .gates(["a", "b", "c"])
        .stop_on_failure(true)
        .build()
        .unwrap();

    let summary = executor.execute_orchestration(&plan, &sample_context()).await.unwrap();
    let mut names = ran(&summary);
    names.sort_unstable();
    assert_eq!(names, vec!["a", "b"]);
    assert_eq!(summary.overall_status, GateStatus::Failed);
}

// ============================================================================
// SECTION: Dag
// ============================================================================

#[tokio::test]
async fn dag_runs_dependency_waves() {
    let trace = new_trace();
    let executor = executor(
        vec![definition("a", &[]), definition("b", &["a"]), definition("c", &["b"])],
        vec![
            Arc::new(StaticGate::passing("a").with_delay(Duration::from_millis(5)).with_trace(&trace)),
            Arc::new(StaticGate::passing("b").with_delay(Duration::from_millis(5)).with_trace(&trace)),
            Arc::new(StaticGate::passing("c").with_trace(&trace)),
        ],
    );
    let plan = OrchestrationPlan::builder("release", ExecutionMode::Dag)
        .gates(["c", "b", "a"])
        .build()
        .unwrap();

    let summary = executor.execute_orchestration(&plan, &sample_context()).await.unwrap();
    assert_eq!(ran(&summary), vec!["a", "b", "c"]);
    assert_eq!(
        *trace.lock().unwrap(),
        vec!["start:a", "end:a", "start:b", "end:b", "start:c", "end:c"]
    );
    assert_eq!(summary.overall_status, GateStatus::Passed);
}

#[tokio::test]
async fn dag_progresses_on_completion_not_on_pass() {
    let executor = executor(
        vec![definition("a", &[]), definition("b", &["a"])],
        vec![
            Arc::new(StaticGate::new("a", GateStatus::Warning)),
            Arc::new(StaticGate::passing("b")),
        ],
    );
    let plan = OrchestrationPlan::builder("release", ExecutionMode::Dag)
        .gates(["a", "b"])
        .build()
        .unwrap();

    let summary = executor.execute_orchestration(&plan, &sample_context()).await.unwrap();
    assert_eq!(ran(&summary), vec!["a", "b"]);
    assert_eq!(summary.results[1].status, GateStatus::Failed);
    assert!(summary.results[1].message.contains("unsatisfied dependencies: a"));
}

#[tokio::test]
async fn dag_rejects_in_plan_cycles() {
    let executor = executor(
        vec![definition("a", &["b"]), definition("b", &["a"])],
        vec![Arc::new(StaticGate::passing("a")), Arc::new(StaticGate::passing("b"))],
    );
    let plan = OrchestrationPlan::builder("release", ExecutionMode::Dag)
        .gates(["a", "b"])
        .build()
        .unwrap();

    let err = executor.execute_orchestration(&plan, &sample_context()).await.unwrap_err();
    assert_eq!(
        err,
        OrchestrationError::CircularDependency {
            remaining: vec![GateId::new("a"), GateId::new("b")],
        }
    );
    assert!(err.to_string().contains("circular dependency"));
}

#[tokio::test]
async fn dag_treats_out_of_plan_dependencies_as_ready() {
    let executor = executor(
        vec![definition("a", &[]), definition("b", &["a"])],
        vec![Arc::new(StaticGate::passing("a")), Arc::new(StaticGate::passing("b"))],
    );
    let plan =
        OrchestrationPlan::builder("release", ExecutionMode::Dag).gate("b").build().unwrap();

    let summary = executor.execute_orchestration(&plan, &sample_context()).await.unwrap();
    assert_eq!(ran(&summary), vec!["b"]);
    assert_eq!(summary.results[0].status, GateStatus::Failed);
}

#[tokio::test]
async fn dag_waves_respect_max_concurrency() {
    let config = ExecutorConfig {
        max_concurrency: 1,
        ..ExecutorConfig::default()
    };
    let trace = new_trace();
    let executor = executor_with_config(
        vec![definition("a", &[]), definition("b", &[])],
        vec![
            Arc::new(StaticGate::passing("a").with_delay(Duration::from_millis(5)).with_trace(&trace)),
            Arc::new(StaticGate::passing("b").with_trace(&trace)),
        ],
        config,
    );
    let plan = OrchestrationPlan::builder("release", ExecutionMode::Dag)
        .gates(["a", "b"])
        .build()
        .unwrap();
    executor.execute_orchestration(&plan, &sample_context()).await.unwrap();
    assert_eq!(*trace.lock().unwrap(), vec!["start:a", "end:a", "start:b", "end:b"]);
}

// ============================================================================
// SECTION: Plans, Summaries, and Events
// ============================================================================

#[test]
fn plan_builder_rejects_duplicates_and_stray_configs() {
    let duplicate = OrchestrationPlan::builder("release", ExecutionMode::Sequential)
        .gates(["a", "a"])
        .build();
    assert_eq!(duplicate.unwrap_err(), PlanError::DuplicateGate(GateId::new("a")));

    let stray = OrchestrationPlan::builder("release", ExecutionMode::Sequential)
        .gate("a")
        .config("b", GateConfig::disabled())
        .build();
    assert_eq!(stray.unwrap_err(), PlanError::ConfigForUnplannedGate(GateId::new("b")));

    let invalid = OrchestrationPlan::builder("release", ExecutionMode::Sequential)
        .gate("a")
        .config("a", GateConfig::default().with_timeout_ms(0))
        .build();
    assert!(matches!(invalid.unwrap_err(), PlanError::InvalidConfig { .. }));
}

#[tokio::test]
async fn plan_config_overrides_executor_config() {
    let mut executor =
        executor(vec![definition("a", &[])], vec![Arc::new(StaticGate::passing("a"))]);
    executor.set_gate_config("a", GateConfig::disabled()).unwrap();
    let plan = OrchestrationPlan::builder("release", ExecutionMode::Sequential)
        .gate("a")
        .config("a", GateConfig::default())
        .build()
        .unwrap();
    let summary = executor.execute_orchestration(&plan, &sample_context()).await.unwrap();
    assert_eq!(summary.results[0].status, GateStatus::Passed);
}

#[tokio::test]
async fn all_skipped_run_is_skipped() {
    let executor = executor(
        vec![definition("a", &[]), definition("b", &[])],
        vec![Arc::new(StaticGate::passing("a")), Arc::new(StaticGate::passing("b"))],
    );
    let plan = OrchestrationPlan::builder("release", ExecutionMode::Parallel)
        .gates(["a", "b"])
        .config("a", GateConfig::disabled())
        .config("b", GateConfig::disabled())
        .build()
        .unwrap();
    let summary = executor.execute_orchestration(&plan, &sample_context()).await.unwrap();
    assert_eq!(summary.counts.skipped, 2);
    assert_eq!(summary.overall_status, GateStatus::Skipped);
}

#[tokio::test]
async fn warning_outranks_skipped_and_passed() {
    let executor = executor(
        vec![definition("a", &[]), definition("b", &[]), definition("c", &[])],
        vec![
            Arc::new(StaticGate::passing("a")),
            Arc::new(StaticGate::new("b", GateStatus::Warning)),
            Arc::new(StaticGate::passing("c")),
        ],
    );
    let plan = OrchestrationPlan::builder("release", ExecutionMode::Sequential)
        .gates(["a", "b", "c"])
        .config("c", GateConfig::disabled())
        .build()
        .unwrap();
    let summary = executor.execute_orchestration(&plan, &sample_context()).await.unwrap();
    assert_eq!(summary.overall_status, GateStatus::Warning);
    assert_eq!(summary.counts.warning, 1);
    assert_eq!(summary.counts.skipped, 1);
}

#[tokio::test]
async fn summary_chain_hash_matches_recomputation_and_detects_tampering() {
    let executor = executor(
        vec![definition("a", &[]), definition("b", &[])],
        vec![Arc::new(StaticGate::passing("a")), Arc::new(StaticGate::passing("b"))],
    );
    let plan = OrchestrationPlan::builder("release", ExecutionMode::Sequential)
        .gates(["a", "b"])
        .build()
        .unwrap();
    let summary = executor.execute_orchestration(&plan, &sample_context()).await.unwrap();

    let recomputed = compute_evidence_chain_hash(&summary.results).unwrap();
    assert_eq!(recomputed, summary.evidence_chain_hash);

    let mut tampered = summary.results.clone();
    tampered[1].status = GateStatus::Warning;
    assert_ne!(compute_evidence_chain_hash(&tampered).unwrap(), summary.evidence_chain_hash);
}

#[tokio::test]
async fn orchestration_events_wrap_gate_events() {
    let executor = executor(vec![definition("a", &[])], vec![Arc::new(StaticGate::passing("a"))]);
    let listener = Arc::new(RecordingListener::default());
    executor.add_event_listener(listener.clone());
    let plan = OrchestrationPlan::builder("release", ExecutionMode::Sequential)
        .gate("a")
        .build()
        .unwrap();
    executor.execute_orchestration(&plan, &sample_context()).await.unwrap();
    assert_eq!(
        listener.labels(),
        vec![
            "orchestration.started:-",
            "gate.started:a",
            "gate.completed:a",
            "orchestration.completed:-",
        ]
    );
}
