// crates/compliance-gate-core/src/core/mod.rs
// ============================================================================
// Module: Compliance Gate Core Types
// Description: Canonical gate metadata, result, evidence, and seal structures.
// Purpose: Provide stable, serializable types for gate runs and audit records.
// Dependencies: serde, serde_json
// ============================================================================

//! ## Overview
//! Core types define gate definitions, execution contexts, gate results,
//! evidence records, orchestration plans, and sealed baselines. These types
//! are the canonical source of truth for any derived surface (CLI, HTTP, or
//! audit exports).

// ============================================================================
// SECTION: Submodules
// ============================================================================

pub mod context;
pub mod definition;
pub mod event;
pub mod evidence;
pub mod gate_config;
pub mod hashing;
pub mod identifiers;
pub mod plan;
pub mod result;
pub mod seal;
pub mod summary;
pub mod time;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use context::ContextSummary;
pub use context::DependencyResults;
pub use context::ExecutionContext;
pub use definition::DisplayName;
pub use definition::GateCategory;
pub use definition::GateDefinition;
pub use definition::Severity;
pub use event::GateEvent;
pub use event::GateEventType;
pub use evidence::ChainError;
pub use evidence::EVIDENCE_CHAIN_GENESIS;
pub use evidence::Evidence;
pub use evidence::EvidenceChainEntry;
pub use evidence::EvidenceSignature;
pub use evidence::EvidenceType;
pub use evidence::SignatureAlgorithm;
pub use evidence::validate_chain;
pub use gate_config::GateConfig;
pub use gate_config::GateConfigError;
pub use gate_config::GateSettings;
pub use gate_config::MAX_GATE_TIMEOUT_MS;
pub use hashing::DEFAULT_HASH_ALGORITHM;
pub use hashing::HashAlgorithm;
pub use hashing::HashDigest;
pub use hashing::HashError;
pub use identifiers::EventId;
pub use identifiers::EvidenceId;
pub use identifiers::ExecutionId;
pub use identifiers::GateId;
pub use identifiers::OrchestrationId;
pub use identifiers::SealId;
pub use plan::ExecutionMode;
pub use plan::OrchestrationPlan;
pub use plan::OrchestrationPlanBuilder;
pub use plan::PlanError;
pub use result::Finding;
pub use result::FindingType;
pub use result::GateResult;
pub use result::GateStatus;
pub use result::Metric;
pub use result::ThresholdKind;
pub use seal::GateResultsSummary;
pub use seal::SealData;
pub use seal::SealPolicy;
pub use seal::SealRequest;
pub use seal::SealStatus;
pub use seal::SealVerification;
pub use seal::SealedBaseline;
pub use summary::ExecutionSummary;
pub use summary::StatusCounts;
pub use time::Timestamp;
