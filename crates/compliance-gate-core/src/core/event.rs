// crates/compliance-gate-core/src/core/event.rs
// ============================================================================
// Module: Compliance Gate Events
// Description: Event envelope emitted to executor listeners.
// Purpose: Expose gate lifecycle notifications to the host process.
// Dependencies: crate::core, serde, serde_json
// ============================================================================

//! ## Overview
//! Events are fire-and-forget notifications. The correlation id is always the
//! run's execution id so hosts can group events per orchestration.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;

use crate::core::identifiers::EventId;
use crate::core::identifiers::ExecutionId;
use crate::core::identifiers::GateId;
use crate::core::time::Timestamp;

// ============================================================================
// SECTION: Event Types
// ============================================================================

/// Lifecycle event kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GateEventType {
    /// A gate passed the registry and implementation checks and is about to run.
    #[serde(rename = "gate.started")]
    GateStarted,
    /// A gate finished with a non-failed status.
    #[serde(rename = "gate.completed")]
    GateCompleted,
    /// A gate finished with a failed status.
    #[serde(rename = "gate.failed")]
    GateFailed,
    /// An orchestration run began.
    #[serde(rename = "orchestration.started")]
    OrchestrationStarted,
    /// An orchestration run produced its summary.
    #[serde(rename = "orchestration.completed")]
    OrchestrationCompleted,
}

impl GateEventType {
    /// Returns the wire label for the event type.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::GateStarted => "gate.started",
            Self::GateCompleted => "gate.completed",
            Self::GateFailed => "gate.failed",
            Self::OrchestrationStarted => "orchestration.started",
            Self::OrchestrationCompleted => "orchestration.completed",
        }
    }
}

// ============================================================================
// SECTION: Event Envelope
// ============================================================================

/// Event envelope delivered to listeners.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GateEvent {
    /// Event identifier.
    pub event_id: EventId,
    /// Event kind.
    #[serde(rename = "type")]
    pub event_type: GateEventType,
    /// Gate identifier for gate-scoped events.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gate_id: Option<GateId>,
    /// Emission timestamp.
    pub timestamp: Timestamp,
    /// Event-specific payload.
    pub payload: Value,
    /// Correlation identifier (the execution id).
    pub correlation_id: ExecutionId,
}

impl GateEvent {
    /// Creates an event with a fresh identifier.
    #[must_use]
    pub fn new(
        event_type: GateEventType,
        gate_id: Option<GateId>,
        timestamp: Timestamp,
        payload: Value,
        correlation_id: ExecutionId,
    ) -> Self {
        Self {
            event_id: EventId::generate(),
            event_type,
            gate_id,
            timestamp,
            payload,
            correlation_id,
        }
    }
}
