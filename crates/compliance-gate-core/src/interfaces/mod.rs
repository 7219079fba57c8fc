// crates/compliance-gate-core/src/interfaces/mod.rs
// ============================================================================
// Module: Compliance Gate Interfaces
// Description: Capability traits for gates, listeners, logging, signing, and storage.
// Purpose: Define the contract surfaces used by the Compliance Gate runtime.
// Dependencies: crate::core, async-trait, serde, thiserror
// ============================================================================

//! ## Overview
//! Interfaces define how the runtime integrates with gate authors and the
//! host process without embedding backend details. Gate bodies, signing
//! schemes, seal storage, log routing, and time are all injected.

// ============================================================================
// SECTION: Imports
// ============================================================================

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use crate::core::DisplayName;
use crate::core::ExecutionContext;
use crate::core::GateConfig;
use crate::core::GateEvent;
use crate::core::GateId;
use crate::core::GateResult;
use crate::core::SealId;
use crate::core::SealedBaseline;
use crate::core::SignatureAlgorithm;
use crate::core::Timestamp;

// ============================================================================
// SECTION: Gate
// ============================================================================

/// Errors a gate body may return instead of a result.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GateExecutionError {
    /// The context does not satisfy the gate's prerequisites.
    #[error("prerequisites not met: {0}")]
    Prerequisite(String),
    /// The gate body failed unexpectedly.
    #[error("gate execution failed: {0}")]
    Execution(String),
}

/// Pluggable gate implementation.
///
/// The executor owns dependency gating, timeouts, evidence, and events; a gate
/// body only inspects the context and configuration and reports a result.
#[async_trait]
pub trait Gate: Send + Sync {
    /// Returns the gate identifier this implementation serves.
    fn gate_id(&self) -> &GateId;

    /// Returns the bilingual display names.
    fn names(&self) -> &DisplayName;

    /// Runs the gate body.
    ///
    /// # Errors
    ///
    /// Returns [`GateExecutionError`] when the body cannot produce a result.
    async fn execute(
        &self,
        context: &ExecutionContext,
        config: &GateConfig,
    ) -> Result<GateResult, GateExecutionError>;

    /// Checks that the context carries what the gate needs.
    ///
    /// # Errors
    ///
    /// Returns [`GateExecutionError::Prerequisite`] when a prerequisite is missing.
    fn validate_prerequisites(&self, _context: &ExecutionContext) -> Result<(), GateExecutionError> {
        Ok(())
    }
}

// ============================================================================
// SECTION: Event Listener
// ============================================================================

/// Listener failure reported back to the executor.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("event listener failed: {0}")]
pub struct ListenerError(pub String);

/// Receives gate lifecycle events.
///
/// Failures are logged by the executor and never abort a run. A listener that
/// must not miss events has to persist them itself before returning.
pub trait EventListener: Send + Sync {
    /// Handles one event.
    ///
    /// # Errors
    ///
    /// Returns [`ListenerError`] when the listener cannot record the event.
    fn on_event(&self, event: &GateEvent) -> Result<(), ListenerError>;
}

// ============================================================================
// SECTION: Logging
// ============================================================================

/// Log record severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LogLevel {
    /// Verbose diagnostics.
    Debug,
    /// Normal operation.
    Info,
    /// Recoverable problems.
    Warn,
    /// Failures.
    Error,
}

/// Structured log record emitted by the runtime.
#[derive(Debug, Clone, Serialize)]
pub struct LogRecord {
    /// Severity.
    pub level: LogLevel,
    /// Stable event label (e.g. `gate.timeout`).
    pub event: &'static str,
    /// Human-readable message.
    pub message: String,
    /// Execution identifier when known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub execution_id: Option<String>,
    /// Gate identifier when known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gate_id: Option<String>,
    /// Additional structured fields.
    pub fields: Value,
}

impl LogRecord {
    /// Creates a record with no ids and empty fields.
    #[must_use]
    pub fn new(level: LogLevel, event: &'static str, message: impl Into<String>) -> Self {
        Self {
            level,
            event,
            message: message.into(),
            execution_id: None,
            gate_id: None,
            fields: Value::Null,
        }
    }

    /// Attaches an execution identifier.
    #[must_use]
    pub fn execution(mut self, execution_id: impl ToString) -> Self {
        self.execution_id = Some(execution_id.to_string());
        self
    }

    /// Attaches a gate identifier.
    #[must_use]
    pub fn gate(mut self, gate_id: impl ToString) -> Self {
        self.gate_id = Some(gate_id.to_string());
        self
    }

    /// Attaches structured fields.
    #[must_use]
    pub fn fields(mut self, fields: Value) -> Self {
        self.fields = fields;
        self
    }
}

/// Injectable log sink.
pub trait LogSink: Send + Sync {
    /// Records one log entry.
    fn record(&self, record: &LogRecord);
}

// ============================================================================
// SECTION: Signing
// ============================================================================

/// Signing failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SignerError {
    /// Key material is unusable.
    #[error("invalid signing key: {0}")]
    Key(String),
    /// Signature bytes are malformed.
    #[error("malformed signature: {0}")]
    Malformed(String),
}

/// Pluggable signature scheme for evidence and seals.
pub trait SealSigner: Send + Sync {
    /// Returns the signature scheme.
    fn algorithm(&self) -> SignatureAlgorithm;

    /// Returns a stable fingerprint of the key (never the key itself).
    fn key_fingerprint(&self) -> String;

    /// Signs a message.
    ///
    /// # Errors
    ///
    /// Returns [`SignerError`] when signing fails.
    fn sign(&self, message: &[u8]) -> Result<Vec<u8>, SignerError>;

    /// Verifies a signature over a message.
    ///
    /// # Errors
    ///
    /// Returns [`SignerError`] when the signature or key is unusable; a
    /// well-formed signature that does not match returns `Ok(false)`.
    fn verify(&self, message: &[u8], signature: &[u8]) -> Result<bool, SignerError>;
}

// ============================================================================
// SECTION: Seal Store
// ============================================================================

/// Seal store errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// Store backend failure.
    #[error("seal store error: {0}")]
    Store(String),
}

/// Durable storage for sealed baselines keyed by seal id.
pub trait SealStore: Send + Sync {
    /// Persists a baseline, replacing any record with the same seal id.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when persistence fails.
    fn save(&self, baseline: &SealedBaseline) -> Result<(), StoreError>;

    /// Loads a baseline by seal id.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when loading fails.
    fn load(&self, seal_id: &SealId) -> Result<Option<SealedBaseline>, StoreError>;

    /// Lists stored seal ids in ascending order.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when listing fails.
    fn list(&self) -> Result<Vec<SealId>, StoreError>;
}

// ============================================================================
// SECTION: Clock
// ============================================================================

/// Time source for results, events, evidence, and seals.
pub trait Clock: Send + Sync {
    /// Returns the current time.
    fn now(&self) -> Timestamp;
}
