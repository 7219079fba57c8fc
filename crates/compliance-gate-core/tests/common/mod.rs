// crates/compliance-gate-core/tests/common/mod.rs
// ============================================================================
// Module: Common Test Fixtures
// Description: Shared gates, listeners, clocks, and contexts for core tests.
// Purpose: Provide reusable test infrastructure for deterministic testing.
// Dependencies: compliance-gate-core, tokio
// ============================================================================

//! ## Overview
//! Fixture gates cover every outcome the executor has to classify: static
//! statuses, delayed completion, never-settling bodies, body errors, and
//! panics. The ticking clock makes every timestamp strictly increasing so
//! evidence chains built from fixture runs are monotonic.

#![allow(dead_code, reason = "Shared test helpers may be unused in some cases.")]

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::AtomicI64;
use std::sync::atomic::Ordering;
use std::time::Duration;

use async_trait::async_trait;
use compliance_gate_core::Clock;
use compliance_gate_core::DisplayName;
use compliance_gate_core::EventListener;
use compliance_gate_core::ExecutionContext;
use compliance_gate_core::ExecutorConfig;
use compliance_gate_core::Gate;
use compliance_gate_core::GateCategory;
use compliance_gate_core::GateConfig;
use compliance_gate_core::GateDefinition;
use compliance_gate_core::GateEvent;
use compliance_gate_core::GateExecutionError;
use compliance_gate_core::GateExecutor;
use compliance_gate_core::GateId;
use compliance_gate_core::GateRegistry;
use compliance_gate_core::GateResult;
use compliance_gate_core::GateResultBuilder;
use compliance_gate_core::GateStatus;
use compliance_gate_core::ListenerError;
use compliance_gate_core::LogRecord;
use compliance_gate_core::LogSink;
use compliance_gate_core::Metric;
use compliance_gate_core::Severity;
use compliance_gate_core::Timestamp;

// ============================================================================
// SECTION: Clock
// ============================================================================

/// Base timestamp used by fixtures (2023-11-14T22:13:20Z).
pub const BASE_MILLIS: i64 = 1_700_000_000_000;

/// Clock that advances by one millisecond on every read.
#[derive(Debug)]
pub struct TickingClock {
    next: AtomicI64,
}

impl TickingClock {
    pub fn new() -> Self {
        Self {
            next: AtomicI64::new(BASE_MILLIS),
        }
    }
}

impl Clock for TickingClock {
    fn now(&self) -> Timestamp {
        Timestamp::from_unix_millis(self.next.fetch_add(1, Ordering::SeqCst))
    }
}

// ============================================================================
// SECTION: Contexts and Definitions
// ============================================================================

pub fn sample_context() -> ExecutionContext {
    ExecutionContext::new("exec-0001", Timestamp::from_unix_millis(BASE_MILLIS), "staging", "payments-api")
}

pub fn definition(id: &str, dependencies: &[&str]) -> GateDefinition {
    GateDefinition::new(
        id,
        DisplayName::new(id, id),
        GateCategory::Reliability,
        Severity::High,
    )
    .with_dependencies(dependencies.iter().copied())
}

pub fn passed_result(id: &str, context: &ExecutionContext) -> GateResult {
    GateResultBuilder::new(id, context).timestamp(Timestamp::from_unix_millis(BASE_MILLIS)).passed()
}

pub fn result_with_status(id: &str, context: &ExecutionContext, status: GateStatus) -> GateResult {
    GateResultBuilder::new(id, context)
        .timestamp(Timestamp::from_unix_millis(BASE_MILLIS))
        .finish(status)
}

// ============================================================================
// SECTION: Gates
// ============================================================================

/// Shared log of gate start/end markers.
pub type Trace = Arc<Mutex<Vec<String>>>;

/// Gate that reports a fixed status, optionally after a delay.
pub struct StaticGate {
    id: GateId,
    names: DisplayName,
    status: GateStatus,
    delay: Option<Duration>,
    trace: Trace,
}

impl StaticGate {
    pub fn new(id: &str, status: GateStatus) -> Self {
        Self {
            id: GateId::new(id),
            names: DisplayName::new(id, id),
            status,
            delay: None,
            trace: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn passing(id: &str) -> Self {
        Self::new(id, GateStatus::Passed)
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn with_trace(mut self, trace: &Trace) -> Self {
        self.trace = Arc::clone(trace);
        self
    }
}

#[async_trait]
impl Gate for StaticGate {
    fn gate_id(&self) -> &GateId {
        &self.id
    }

    fn names(&self) -> &DisplayName {
        &self.names
    }

    async fn execute(
        &self,
        context: &ExecutionContext,
        _config: &GateConfig,
    ) -> Result<GateResult, GateExecutionError> {
        self.trace.lock().unwrap().push(format!("start:{}", self.id));
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.trace.lock().unwrap().push(format!("end:{}", self.id));
        Ok(GateResultBuilder::new(self.id.clone(), context)
            .message(format!("{} finished", self.id))
            .metric(Metric::new("checks", 3.0, "count"))
            .finish(self.status))
    }
}

/// Gate whose body never settles.
pub struct PendingGate {
    id: GateId,
    names: DisplayName,
}

impl PendingGate {
    pub fn new(id: &str) -> Self {
        Self {
            id: GateId::new(id),
            names: DisplayName::new(id, id),
        }
    }
}

#[async_trait]
impl Gate for PendingGate {
    fn gate_id(&self) -> &GateId {
        &self.id
    }

    fn names(&self) -> &DisplayName {
        &self.names
    }

    async fn execute(
        &self,
        _context: &ExecutionContext,
        _config: &GateConfig,
    ) -> Result<GateResult, GateExecutionError> {
        std::future::pending::<()>().await;
        Err(GateExecutionError::Execution("unreachable".to_string()))
    }
}

/// Gate whose body returns an error.
pub struct ErrorGate {
    id: GateId,
    names: DisplayName,
    error: GateExecutionError,
}

impl ErrorGate {
    pub fn new(id: &str, error: GateExecutionError) -> Self {
        Self {
            id: GateId::new(id),
            names: DisplayName::new(id, id),
            error,
        }
    }
}

#[async_trait]
impl Gate for ErrorGate {
    fn gate_id(&self) -> &GateId {
        &self.id
    }

    fn names(&self) -> &DisplayName {
        &self.names
    }

    async fn execute(
        &self,
        _context: &ExecutionContext,
        _config: &GateConfig,
    ) -> Result<GateResult, GateExecutionError> {
        Err(self.error.clone())
    }
}

/// Gate whose body panics.
pub struct PanicGate {
    id: GateId,
    names: DisplayName,
}

impl PanicGate {
    pub fn new(id: &str) -> Self {
        Self {
            id: GateId::new(id),
            names: DisplayName::new(id, id),
        }
    }
}

#[async_trait]
impl Gate for PanicGate {
    fn gate_id(&self) -> &GateId {
        &self.id
    }

    fn names(&self) -> &DisplayName {
        &self.names
    }

    async fn execute(
        &self,
        _context: &ExecutionContext,
        _config: &GateConfig,
    ) -> Result<GateResult, GateExecutionError> {
        panic!("gate body exploded");
    }
}

/// Gate that requires a metadata key before running.
pub struct RequiresMetadataGate {
    id: GateId,
    names: DisplayName,
    key: &'static str,
}

impl RequiresMetadataGate {
    pub fn new(id: &str, key: &'static str) -> Self {
        Self {
            id: GateId::new(id),
            names: DisplayName::new(id, id),
            key,
        }
    }
}

#[async_trait]
impl Gate for RequiresMetadataGate {
    fn gate_id(&self) -> &GateId {
        &self.id
    }

    fn names(&self) -> &DisplayName {
        &self.names
    }

    async fn execute(
        &self,
        context: &ExecutionContext,
        _config: &GateConfig,
    ) -> Result<GateResult, GateExecutionError> {
        Ok(GateResultBuilder::new(self.id.clone(), context).passed())
    }

    fn validate_prerequisites(&self, context: &ExecutionContext) -> Result<(), GateExecutionError> {
        if context.metadata.contains_key(self.key) {
            Ok(())
        } else {
            Err(GateExecutionError::Prerequisite(format!("metadata key {} is required", self.key)))
        }
    }
}

/// Gate that reports a passing result under another gate's identifier.
pub struct MislabeledGate {
    id: GateId,
    names: DisplayName,
    reported: GateId,
}

impl MislabeledGate {
    pub fn new(id: &str, reported: &str) -> Self {
        Self {
            id: GateId::new(id),
            names: DisplayName::new(id, id),
            reported: GateId::new(reported),
        }
    }
}

#[async_trait]
impl Gate for MislabeledGate {
    fn gate_id(&self) -> &GateId {
        &self.id
    }

    fn names(&self) -> &DisplayName {
        &self.names
    }

    async fn execute(
        &self,
        context: &ExecutionContext,
        _config: &GateConfig,
    ) -> Result<GateResult, GateExecutionError> {
        Ok(GateResultBuilder::new(self.reported.clone(), context).passed())
    }
}

/// Gate that rewrites the context summary on its own result.
pub struct ContextRewritingGate {
    id: GateId,
    names: DisplayName,
}

impl ContextRewritingGate {
    pub fn new(id: &str) -> Self {
        Self {
            id: GateId::new(id),
            names: DisplayName::new(id, id),
        }
    }
}

#[async_trait]
impl Gate for ContextRewritingGate {
    fn gate_id(&self) -> &GateId {
        &self.id
    }

    fn names(&self) -> &DisplayName {
        &self.names
    }

    async fn execute(
        &self,
        context: &ExecutionContext,
        _config: &GateConfig,
    ) -> Result<GateResult, GateExecutionError> {
        let mut result = GateResultBuilder::new(self.id.clone(), context).passed();
        result.context.environment = "production".to_string();
        result.context.target = "someone-else".to_string();
        Ok(result)
    }
}

// ============================================================================
// SECTION: Listeners and Sinks
// ============================================================================

/// Listener that records every event.
#[derive(Default)]
pub struct RecordingListener {
    pub events: Mutex<Vec<GateEvent>>,
}

impl RecordingListener {
    pub fn labels(&self) -> Vec<String> {
        self.events
            .lock()
            .unwrap()
            .iter()
            .map(|event| {
                let gate = event.gate_id.as_ref().map_or("-", GateId::as_str).to_string();
                format!("{}:{gate}", event.event_type.as_str())
            })
            .collect()
    }
}

impl EventListener for RecordingListener {
    fn on_event(&self, event: &GateEvent) -> Result<(), ListenerError> {
        self.events.lock().unwrap().push(event.clone());
        Ok(())
    }
}

/// Listener that always fails.
pub struct FailingListener;

impl EventListener for FailingListener {
    fn on_event(&self, _event: &GateEvent) -> Result<(), ListenerError> {
        Err(ListenerError("audit sink offline".to_string()))
    }
}

/// Listener that always panics.
pub struct PanickingListener;

impl EventListener for PanickingListener {
    fn on_event(&self, _event: &GateEvent) -> Result<(), ListenerError> {
        panic!("listener exploded");
    }
}

/// Log sink that records every entry.
#[derive(Default)]
pub struct RecordingLogSink {
    pub records: Mutex<Vec<LogRecord>>,
}

impl RecordingLogSink {
    pub fn events(&self) -> Vec<&'static str> {
        self.records.lock().unwrap().iter().map(|record| record.event).collect()
    }
}

impl LogSink for RecordingLogSink {
    fn record(&self, record: &LogRecord) {
        self.records.lock().unwrap().push(record.clone());
    }
}

// ============================================================================
// SECTION: Executor Builders
// ============================================================================

pub fn registry(definitions: Vec<GateDefinition>) -> Arc<GateRegistry> {
    Arc::new(GateRegistry::with_definitions(definitions))
}

pub fn executor(definitions: Vec<GateDefinition>, gates: Vec<Arc<dyn Gate>>) -> GateExecutor {
    executor_with_config(definitions, gates, ExecutorConfig::default())
}

pub fn executor_with_config(
    definitions: Vec<GateDefinition>,
    gates: Vec<Arc<dyn Gate>>,
    config: ExecutorConfig,
) -> GateExecutor {
    let mut executor = GateExecutor::new(registry(definitions), config)
        .with_clock(Arc::new(TickingClock::new()))
        .with_logger(Arc::new(compliance_gate_core::NoopLogSink));
    for gate in gates {
        executor.register_gate(gate);
    }
    executor
}
