// crates/compliance-gate-core/src/lib.rs
// ============================================================================
// Module: Compliance Gate Core Library
// Description: Public API surface for the Compliance Gate core.
// Purpose: Expose gate metadata, execution, evidence, and sealing primitives.
// Dependencies: crate::{core, interfaces, runtime}
// ============================================================================

//! ## Overview
//! Compliance Gate core runs named verification gates against a target, orders
//! them by declared dependencies, and records a tamper-evident audit trail.
//! Gate bodies are external capabilities plugged in through [`Gate`]; the core
//! owns scheduling, dependency gating, timeouts, evidence hashing, and the
//! final seal that turns an evidence chain into a signed baseline.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod core;
pub mod interfaces;
pub mod runtime;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use core::*;

pub use interfaces::Clock;
pub use interfaces::EventListener;
pub use interfaces::Gate;
pub use interfaces::GateExecutionError;
pub use interfaces::ListenerError;
pub use interfaces::LogLevel;
pub use interfaces::LogRecord;
pub use interfaces::LogSink;
pub use interfaces::SealSigner;
pub use interfaces::SealStore;
pub use interfaces::SignerError;
pub use interfaces::StoreError;
pub use runtime::BaselineSealer;
pub use runtime::Ed25519Signer;
pub use runtime::EvidenceBuilder;
pub use runtime::EvidenceChain;
pub use runtime::ExecutorConfig;
pub use runtime::FileLogSink;
pub use runtime::FinalSealGate;
pub use runtime::GateExecutor;
pub use runtime::GateFailureKind;
pub use runtime::GateRegistry;
pub use runtime::GateResultBuilder;
pub use runtime::HmacSha256Signer;
pub use runtime::InMemorySealStore;
pub use runtime::KeyError;
pub use runtime::ListenerId;
pub use runtime::NoopLogSink;
pub use runtime::OrchestrationError;
pub use runtime::SealError;
pub use runtime::SigningSecret;
pub use runtime::StderrLogSink;
pub use runtime::SystemClock;
pub use runtime::TracingLogSink;
