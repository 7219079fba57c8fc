// crates/compliance-gate-core/src/runtime/mod.rs
// ============================================================================
// Module: Compliance Gate Runtime
// Description: Registry, executor, evidence, signing, and sealing runtime.
// Purpose: Execute gate plans and produce tamper-evident audit records.
// Dependencies: crate::{core, interfaces}
// ============================================================================

//! ## Overview
//! Runtime modules implement the gate catalog, single-gate execution,
//! orchestration, evidence synthesis, signing, and baseline sealing. Every
//! orchestration mode routes through the same single-gate path so dependency
//! gating, timeouts, evidence, and events behave identically across modes.

// ============================================================================
// SECTION: Submodules
// ============================================================================

pub mod clock;
pub mod evidence;
pub mod executor;
pub mod logging;
pub mod orchestration;
pub mod registry;
pub mod result_builder;
pub mod sealing;
pub mod signer;
pub mod store;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use clock::SystemClock;
pub use evidence::ChainBuildError;
pub use evidence::EvidenceBuilder;
pub use evidence::EvidenceChain;
pub use evidence::EvidenceError;
pub use evidence::verify_evidence_signature;
pub use executor::DEFAULT_GATE_TIMEOUT_MS;
pub use executor::DEFAULT_MAX_CONCURRENCY;
pub use executor::ExecutorConfig;
pub use executor::GateExecutor;
pub use executor::GateFailureKind;
pub use executor::ListenerId;
pub use logging::FileLogSink;
pub use logging::NoopLogSink;
pub use logging::StderrLogSink;
pub use logging::TracingLogSink;
pub use orchestration::OrchestrationError;
pub use orchestration::compute_evidence_chain_hash;
pub use registry::GateRegistry;
pub use result_builder::GateResultBuilder;
pub use sealing::BaselineSealer;
pub use sealing::FINAL_SEAL_GATE_ID;
pub use sealing::FinalSealGate;
pub use sealing::SealError;
pub use signer::DEFAULT_SEAL_KEY_ENV;
pub use signer::Ed25519Signer;
pub use signer::HmacSha256Signer;
pub use signer::KeyError;
pub use signer::SigningSecret;
pub use signer::resolve_signing_secret;
pub use store::InMemorySealStore;
