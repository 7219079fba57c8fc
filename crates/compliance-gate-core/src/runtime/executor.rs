// crates/compliance-gate-core/src/runtime/executor.rs
// ============================================================================
// Module: Compliance Gate Executor
// Description: Single-gate execution with dependency gating, timeouts, and events.
// Purpose: Run gate bodies and collapse every failure into a structured result.
// Dependencies: crate::{core, interfaces, runtime}, futures, serde_json, tokio
// ============================================================================

//! ## Overview
//! [`GateExecutor::execute_gate`] never returns an error and never panics:
//! unknown gates, missing implementations, unsatisfied dependencies, failed
//! prerequisites, timeouts, body errors, and body panics all become a failed
//! [`GateResult`] with exactly one synthetic critical finding.
//!
//! A dependency is satisfied only when an implementation is bound for it and
//! the context's results record it as exactly `passed`.
//!
//! Timeouts drop the gate future, which cancels it at its next suspension
//! point. Work a gate body moved onto other tasks is not cancelled and may
//! keep running unobserved.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::fmt;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::sync::RwLock;
use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering;
use std::time::Duration;
use std::time::Instant;

use futures::FutureExt;
use serde_json::json;

use crate::core::ExecutionContext;
use crate::core::Finding;
use crate::core::GateConfig;
use crate::core::GateConfigError;
use crate::core::GateDefinition;
use crate::core::GateEvent;
use crate::core::GateEventType;
use crate::core::GateId;
use crate::core::GateResult;
use crate::core::GateStatus;
use crate::core::Severity;
use crate::core::Timestamp;
use crate::interfaces::Clock;
use crate::interfaces::EventListener;
use crate::interfaces::Gate;
use crate::interfaces::GateExecutionError;
use crate::interfaces::LogLevel;
use crate::interfaces::LogRecord;
use crate::interfaces::LogSink;
use crate::runtime::clock::SystemClock;
use crate::runtime::evidence::EvidenceBuilder;
use crate::runtime::logging::TracingLogSink;
use crate::runtime::registry::GateRegistry;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default per-gate timeout in milliseconds.
pub const DEFAULT_GATE_TIMEOUT_MS: u64 = 30_000;
/// Default maximum number of gates run concurrently.
pub const DEFAULT_MAX_CONCURRENCY: usize = 5;

// ============================================================================
// SECTION: Configuration
// ============================================================================

/// Executor-wide settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExecutorConfig {
    /// Timeout applied when a gate has no override.
    pub default_timeout: Duration,
    /// Chunk size (parallel) and wave width (dag); values below one are treated as one.
    pub max_concurrency: usize,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            default_timeout: Duration::from_millis(DEFAULT_GATE_TIMEOUT_MS),
            max_concurrency: DEFAULT_MAX_CONCURRENCY,
        }
    }
}

// ============================================================================
// SECTION: Failure Classification
// ============================================================================

/// Classification of a gate attempt that did not produce its own result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GateFailureKind {
    /// The gate id is not in the registry.
    NotFound,
    /// The gate is registered but no implementation is bound.
    Unimplemented,
    /// A dependency is unbound, absent from results, or not `passed`.
    DependencyUnsatisfied,
    /// The gate rejected the context's prerequisites.
    PrerequisiteFailed,
    /// The gate body did not settle before its timeout.
    Timeout,
    /// The gate body returned an error, panicked, or its evidence failed.
    ExecutionException,
}

impl GateFailureKind {
    /// Returns the finding id used for the synthetic finding.
    #[must_use]
    pub const fn finding_id(self) -> &'static str {
        match self {
            Self::NotFound => "gate-not-found",
            Self::Unimplemented => "gate-not-registered",
            Self::DependencyUnsatisfied => "dependency-unsatisfied",
            Self::PrerequisiteFailed => "prerequisite-failed",
            Self::Timeout => "gate-timeout",
            Self::ExecutionException => "execution-exception",
        }
    }

    /// Returns the title used for the synthetic finding.
    #[must_use]
    pub const fn title(self) -> &'static str {
        match self {
            Self::NotFound => "Gate not found",
            Self::Unimplemented => "Gate implementation not registered",
            Self::DependencyUnsatisfied => "Dependencies not satisfied",
            Self::PrerequisiteFailed => "Prerequisites not met",
            Self::Timeout => "Gate timed out",
            Self::ExecutionException => "Gate execution failed",
        }
    }
}

/// Internal failure carried until it is rendered as a result.
#[derive(Debug)]
struct GateFailure {
    /// Failure classification.
    kind: GateFailureKind,
    /// Result message.
    message: String,
}

impl GateFailure {
    /// Creates a failure.
    fn new(kind: GateFailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

// ============================================================================
// SECTION: Listener Handles
// ============================================================================

/// Handle returned when registering an event listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ListenerId(u64);

/// Registered listeners with their handles.
type ListenerList = Vec<(ListenerId, Arc<dyn EventListener>)>;

// ============================================================================
// SECTION: Executor
// ============================================================================

/// Gate scheduler.
pub struct GateExecutor {
    /// Shared, read-only gate catalog.
    pub(crate) registry: Arc<GateRegistry>,
    /// Bound gate implementations.
    gates: BTreeMap<GateId, Arc<dyn Gate>>,
    /// Executor-level gate overrides.
    pub(crate) configs: BTreeMap<GateId, GateConfig>,
    /// Event listeners.
    listeners: RwLock<ListenerList>,
    /// Next listener handle.
    next_listener_id: AtomicU64,
    /// Evidence synthesizer.
    evidence: EvidenceBuilder,
    /// Executor settings.
    pub(crate) config: ExecutorConfig,
    /// Time source.
    clock: Arc<dyn Clock>,
    /// Log sink.
    logger: Arc<dyn LogSink>,
}

impl fmt::Debug for GateExecutor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GateExecutor")
            .field("gates", &self.gates.keys().collect::<Vec<_>>())
            .field("configs", &self.configs)
            .field("evidence", &self.evidence)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl GateExecutor {
    /// Creates an executor over a registry.
    #[must_use]
    pub fn new(registry: Arc<GateRegistry>, config: ExecutorConfig) -> Self {
        Self {
            registry,
            gates: BTreeMap::new(),
            configs: BTreeMap::new(),
            listeners: RwLock::new(Vec::new()),
            next_listener_id: AtomicU64::new(1),
            evidence: EvidenceBuilder::unsigned(),
            config,
            clock: Arc::new(SystemClock),
            logger: Arc::new(TracingLogSink),
        }
    }

    /// Replaces the time source.
    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Replaces the log sink.
    #[must_use]
    pub fn with_logger(mut self, logger: Arc<dyn LogSink>) -> Self {
        self.logger = logger;
        self
    }

    /// Replaces the evidence builder (e.g. to enable signed evidence).
    #[must_use]
    pub fn with_evidence_builder(mut self, evidence: EvidenceBuilder) -> Self {
        self.evidence = evidence;
        self
    }

    /// Returns the registry.
    #[must_use]
    pub fn registry(&self) -> &GateRegistry {
        &self.registry
    }

    /// Returns the executor settings.
    #[must_use]
    pub const fn config(&self) -> ExecutorConfig {
        self.config
    }

    /// Binds an implementation under its gate id, returning the replaced one.
    pub fn register_gate(&mut self, gate: Arc<dyn Gate>) -> Option<Arc<dyn Gate>> {
        self.gates.insert(gate.gate_id().clone(), gate)
    }

    /// Returns true when an implementation is bound for the gate.
    #[must_use]
    pub fn has_implementation(&self, gate_id: &GateId) -> bool {
        self.gates.contains_key(gate_id)
    }

    /// Sets the executor-level override for a gate.
    ///
    /// # Errors
    ///
    /// Returns [`GateConfigError`] when the override is invalid.
    pub fn set_gate_config(
        &mut self,
        gate_id: impl Into<GateId>,
        config: GateConfig,
    ) -> Result<(), GateConfigError> {
        config.validate()?;
        self.configs.insert(gate_id.into(), config);
        Ok(())
    }

    /// Returns the executor-level override for a gate.
    #[must_use]
    pub fn gate_config(&self, gate_id: &GateId) -> Option<&GateConfig> {
        self.configs.get(gate_id)
    }

    /// Registers an event listener.
    pub fn add_event_listener(&self, listener: Arc<dyn EventListener>) -> ListenerId {
        let id = ListenerId(self.next_listener_id.fetch_add(1, Ordering::Relaxed));
        match self.listeners.write() {
            Ok(mut guard) => guard.push((id, listener)),
            Err(poisoned) => poisoned.into_inner().push((id, listener)),
        }
        id
    }

    /// Removes an event listener, returning whether it was registered.
    pub fn remove_event_listener(&self, id: ListenerId) -> bool {
        let mut guard = match self.listeners.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        let before = guard.len();
        guard.retain(|(listener_id, _)| *listener_id != id);
        before != guard.len()
    }

    /// Executes one gate using the executor-level override.
    pub async fn execute_gate(&self, gate_id: &GateId, context: &ExecutionContext) -> GateResult {
        self.run_gate(gate_id, context, self.configs.get(gate_id)).await
    }

    /// Executes one gate with an explicit override.
    pub(crate) async fn run_gate(
        &self,
        gate_id: &GateId,
        context: &ExecutionContext,
        config: Option<&GateConfig>,
    ) -> GateResult {
        let Some(definition) = self.registry.get(gate_id) else {
            return self.failure_result(
                gate_id,
                context,
                GateFailure::new(
                    GateFailureKind::NotFound,
                    format!("gate not found in registry: {gate_id}"),
                ),
                0,
            );
        };
        let config = config.cloned().unwrap_or_default();
        if config.is_disabled() {
            return self.skipped_result(gate_id, context);
        }
        let Some(gate) = self.gates.get(gate_id).cloned() else {
            return self.failure_result(
                gate_id,
                context,
                GateFailure::new(
                    GateFailureKind::Unimplemented,
                    format!("gate implementation not registered: {gate_id}"),
                ),
                0,
            );
        };

        let timeout = config.timeout_ms.map_or(self.config.default_timeout, Duration::from_millis);
        self.emit(GateEvent::new(
            GateEventType::GateStarted,
            Some(gate_id.clone()),
            self.clock.now(),
            json!({
                "gate_id": gate_id,
                "timeout_ms": duration_millis(timeout),
                "dependencies": definition.dependencies,
            }),
            context.execution_id.clone(),
        ));

        let started = Instant::now();
        let result = match self.guarded_run(definition, gate.as_ref(), context, &config, timeout).await {
            Ok(result) => result,
            Err(failure) => {
                let elapsed = duration_millis(started.elapsed());
                self.failure_result(gate_id, context, failure, elapsed)
            }
        };

        let event_type = if result.status == GateStatus::Failed {
            GateEventType::GateFailed
        } else {
            GateEventType::GateCompleted
        };
        self.emit(GateEvent::new(
            event_type,
            Some(gate_id.clone()),
            self.clock.now(),
            json!({
                "status": result.status.as_str(),
                "duration_ms": result.duration_ms,
                "finding_count": result.findings.len(),
            }),
            context.execution_id.clone(),
        ));
        result
    }

    /// Runs dependency gating, prerequisites, the timed body, and evidence.
    async fn guarded_run(
        &self,
        definition: &GateDefinition,
        gate: &dyn Gate,
        context: &ExecutionContext,
        config: &GateConfig,
        timeout: Duration,
    ) -> Result<GateResult, GateFailure> {
        let unsatisfied = self.unsatisfied_dependencies(definition, context);
        if !unsatisfied.is_empty() {
            let names: Vec<&str> = unsatisfied.iter().map(GateId::as_str).collect();
            return Err(GateFailure::new(
                GateFailureKind::DependencyUnsatisfied,
                format!("unsatisfied dependencies: {}", names.join(", ")),
            ));
        }

        gate.validate_prerequisites(context).map_err(|err| {
            GateFailure::new(GateFailureKind::PrerequisiteFailed, err.to_string())
        })?;

        let body = AssertUnwindSafe(gate.execute(context, config)).catch_unwind();
        let mut result = match tokio::time::timeout(timeout, body).await {
            Err(_) => {
                let timeout_ms = duration_millis(timeout);
                self.log(
                    LogRecord::new(LogLevel::Warn, "gate.timeout", "gate execution timed out")
                        .execution(&context.execution_id)
                        .gate(&definition.id)
                        .fields(json!({ "timeout_ms": timeout_ms })),
                );
                return Err(GateFailure::new(
                    GateFailureKind::Timeout,
                    format!("gate execution timed out after {timeout_ms}ms"),
                ));
            }
            Ok(Err(_panic)) => {
                return Err(GateFailure::new(
                    GateFailureKind::ExecutionException,
                    "gate execution panicked",
                ));
            }
            Ok(Ok(Err(GateExecutionError::Prerequisite(message)))) => {
                return Err(GateFailure::new(
                    GateFailureKind::PrerequisiteFailed,
                    format!("prerequisites not met: {message}"),
                ));
            }
            Ok(Ok(Err(err))) => {
                return Err(GateFailure::new(GateFailureKind::ExecutionException, err.to_string()));
            }
            Ok(Ok(Ok(result))) => result,
        };
        if result.gate_id != definition.id {
            return Err(GateFailure::new(
                GateFailureKind::ExecutionException,
                format!("gate {} returned a result for {}", definition.id, result.gate_id),
            ));
        }
        result.context = context.summary();

        let evidence = self.evidence.build(&result, context, self.clock.now()).map_err(|err| {
            GateFailure::new(
                GateFailureKind::ExecutionException,
                format!("evidence generation failed: {err}"),
            )
        })?;
        result.evidence.push(evidence);
        Ok(result)
    }

    /// Returns declared dependencies that are not satisfied for this context.
    fn unsatisfied_dependencies(
        &self,
        definition: &GateDefinition,
        context: &ExecutionContext,
    ) -> Vec<GateId> {
        definition
            .dependencies
            .iter()
            .filter(|dependency| {
                !(self.gates.contains_key(*dependency)
                    && context.results.status_of(dependency) == Some(GateStatus::Passed))
            })
            .cloned()
            .collect()
    }

    /// Renders a failure as a failed result with one critical finding.
    fn failure_result(
        &self,
        gate_id: &GateId,
        context: &ExecutionContext,
        failure: GateFailure,
        duration_ms: u64,
    ) -> GateResult {
        self.log(
            LogRecord::new(LogLevel::Info, "gate.failed", failure.message.clone())
                .execution(&context.execution_id)
                .gate(gate_id)
                .fields(json!({ "kind": failure.kind.finding_id() })),
        );
        GateResult {
            gate_id: gate_id.clone(),
            status: GateStatus::Failed,
            duration_ms,
            findings: vec![Finding::violation(
                failure.kind.finding_id(),
                Severity::Critical,
                failure.kind.title(),
                failure.message.clone(),
            )],
            message: failure.message,
            metrics: Vec::new(),
            evidence: Vec::new(),
            timestamp: self.clock.now(),
            context: context.summary(),
        }
    }

    /// Builds the result for a gate disabled by configuration.
    fn skipped_result(&self, gate_id: &GateId, context: &ExecutionContext) -> GateResult {
        GateResult {
            gate_id: gate_id.clone(),
            status: GateStatus::Skipped,
            duration_ms: 0,
            message: format!("gate disabled by configuration: {gate_id}"),
            findings: Vec::new(),
            metrics: Vec::new(),
            evidence: Vec::new(),
            timestamp: self.clock.now(),
            context: context.summary(),
        }
    }

    /// Delivers an event to every listener; failures are logged and skipped.
    pub(crate) fn emit(&self, event: GateEvent) {
        let listeners = match self.listeners.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        };
        for (listener_id, listener) in listeners {
            let outcome = std::panic::catch_unwind(AssertUnwindSafe(|| listener.on_event(&event)));
            let failure = match outcome {
                Ok(Ok(())) => continue,
                Ok(Err(err)) => err.to_string(),
                Err(_) => "event listener panicked".to_string(),
            };
            self.log(
                LogRecord::new(LogLevel::Warn, "listener.failed", failure)
                    .execution(&event.correlation_id)
                    .fields(json!({
                        "listener_id": listener_id.0,
                        "event_type": event.event_type.as_str(),
                    })),
            );
        }
    }

    /// Records a log entry.
    pub(crate) fn log(&self, record: LogRecord) {
        self.logger.record(&record);
    }

    /// Returns the current time from the injected clock.
    pub(crate) fn now(&self) -> Timestamp {
        self.clock.now()
    }
}

/// Converts a duration to whole milliseconds, saturating.
pub(crate) fn duration_millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}
