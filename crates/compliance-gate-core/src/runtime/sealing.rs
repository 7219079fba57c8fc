// crates/compliance-gate-core/src/runtime/sealing.rs
// ============================================================================
// Module: Compliance Gate Baseline Sealer
// Description: Signed, self-verified sealing of evidence chains and gate summaries.
// Purpose: Produce durable, independently re-verifiable sealed baselines.
// Dependencies: crate::{core, interfaces, runtime}, async-trait, serde_json
// ============================================================================

//! ## Overview
//! [`BaselineSealer::create_seal`] is all-or-nothing: prerequisites, chain
//! integrity, and the gate-results policy are checked before anything is
//! signed, and the signed record is re-verified from its stored form before
//! it is persisted. A baseline is either stored fully verified or not at all.
//!
//! [`FinalSealGate`] exposes sealing as a gate: it seals the evidence of every
//! result already recorded on the context and reports the outcome as a
//! regular [`GateResult`].
//! Security posture: sealed data is untrusted on re-verification; every field
//! is covered by the recomputed signature.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;
use thiserror::Error;

use crate::core::ChainError;
use crate::core::DisplayName;
use crate::core::ExecutionContext;
use crate::core::Finding;
use crate::core::GateCategory;
use crate::core::GateConfig;
use crate::core::GateDefinition;
use crate::core::GateId;
use crate::core::GateResult;
use crate::core::GateResultsSummary;
use crate::core::HashError;
use crate::core::Metric;
use crate::core::SealData;
use crate::core::SealId;
use crate::core::SealPolicy;
use crate::core::SealRequest;
use crate::core::SealStatus;
use crate::core::SealVerification;
use crate::core::SealedBaseline;
use crate::core::Severity;
use crate::core::hashing::canonical_json_bytes;
use crate::core::hashing::hex_decode;
use crate::core::hashing::hex_encode;
use crate::core::validate_chain;
use crate::interfaces::Clock;
use crate::interfaces::Gate;
use crate::interfaces::GateExecutionError;
use crate::interfaces::LogLevel;
use crate::interfaces::LogRecord;
use crate::interfaces::LogSink;
use crate::interfaces::SealSigner;
use crate::interfaces::SealStore;
use crate::interfaces::SignerError;
use crate::interfaces::StoreError;
use crate::runtime::clock::SystemClock;
use crate::runtime::evidence::ChainBuildError;
use crate::runtime::evidence::EvidenceChain;
use crate::runtime::logging::TracingLogSink;
use crate::runtime::result_builder::GateResultBuilder;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default identifier of the final seal gate.
pub const FINAL_SEAL_GATE_ID: &str = "final-seal";

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Sealing failures. None of them leaves a stored baseline behind.
#[derive(Debug, Error)]
pub enum SealError {
    /// A required context field is empty.
    #[error("seal prerequisite missing: {0}")]
    MissingPrerequisite(&'static str),
    /// The evidence chain failed linkage or monotonicity checks.
    #[error("evidence chain integrity violation: {0}")]
    Chain(#[from] ChainError),
    /// Policy requires every gate to pass but some failed.
    #[error("seal policy violation: {failed_gates} gate(s) failed")]
    PolicyViolation {
        /// Number of failed gates in the summary.
        failed_gates: usize,
    },
    /// The seal payload could not be canonicalized.
    #[error(transparent)]
    Hash(#[from] HashError),
    /// The signer failed.
    #[error(transparent)]
    Signer(#[from] SignerError),
    /// Self-verification of a freshly signed baseline failed.
    #[error("seal signature mismatch on self-verification: {0}")]
    SignatureMismatch(SealId),
    /// No stored baseline has the requested id.
    #[error("sealed baseline not found: {0}")]
    NotFound(SealId),
    /// The seal store failed.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl SealError {
    /// Returns the finding id used when a seal failure is reported as a gate result.
    #[must_use]
    pub const fn finding_id(&self) -> &'static str {
        match self {
            Self::MissingPrerequisite(_) => "seal-prerequisite-missing",
            Self::Chain(_) => "chain-integrity-violation",
            Self::PolicyViolation { .. } => "seal-policy-violation",
            Self::SignatureMismatch(_) => "seal-signature-mismatch",
            Self::Hash(_) | Self::Signer(_) | Self::NotFound(_) | Self::Store(_) => "seal-failed",
        }
    }
}

impl From<ChainBuildError> for SealError {
    fn from(err: ChainBuildError) -> Self {
        match err {
            ChainBuildError::Chain(err) => Self::Chain(err),
            ChainBuildError::Hash(err) => Self::Hash(err),
        }
    }
}

// ============================================================================
// SECTION: Sealer
// ============================================================================

/// Creates, stores, and re-verifies sealed baselines.
pub struct BaselineSealer {
    /// Signature scheme.
    signer: Arc<dyn SealSigner>,
    /// Baseline storage.
    store: Arc<dyn SealStore>,
    /// Seal policy.
    policy: SealPolicy,
    /// Time source.
    clock: Arc<dyn Clock>,
    /// Log sink.
    logger: Arc<dyn LogSink>,
}

impl fmt::Debug for BaselineSealer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BaselineSealer")
            .field("algorithm", &self.signer.algorithm())
            .field("key_fingerprint", &self.signer.key_fingerprint())
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}

impl BaselineSealer {
    /// Creates a sealer.
    #[must_use]
    pub fn new(signer: Arc<dyn SealSigner>, store: Arc<dyn SealStore>, policy: SealPolicy) -> Self {
        Self {
            signer,
            store,
            policy,
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

    /// Returns the seal policy.
    #[must_use]
    pub const fn policy(&self) -> &SealPolicy {
        &self.policy
    }

    /// Seals an evidence chain and gate-results summary.
    ///
    /// # Errors
    ///
    /// Returns [`SealError`] when prerequisites are missing, the chain is
    /// broken, the policy rejects the summary, signing fails, self-verification
    /// fails, or the store fails. No baseline is stored in any error case.
    pub fn create_seal(
        &self,
        context: &ExecutionContext,
        request: SealRequest,
    ) -> Result<SealedBaseline, SealError> {
        match self.try_create_seal(context, request) {
            Ok(baseline) => {
                self.logger.record(
                    &LogRecord::new(LogLevel::Info, "seal.created", "sealed baseline created")
                        .execution(&context.execution_id)
                        .fields(json!({
                            "seal_id": baseline.seal_id(),
                            "algorithm": baseline.algorithm.as_str(),
                            "key_fingerprint": baseline.key_fingerprint,
                            "chain_length": baseline.seal_data.evidence_chain.len(),
                        })),
                );
                Ok(baseline)
            }
            Err(err) => {
                self.logger.record(
                    &LogRecord::new(LogLevel::Warn, "seal.rejected", err.to_string())
                        .execution(&context.execution_id)
                        .fields(json!({ "reason": err.finding_id() })),
                );
                Err(err)
            }
        }
    }

    /// Runs the sealing steps without logging.
    fn try_create_seal(
        &self,
        context: &ExecutionContext,
        request: SealRequest,
    ) -> Result<SealedBaseline, SealError> {
        if context.execution_id.as_str().trim().is_empty() {
            return Err(SealError::MissingPrerequisite("execution_id"));
        }
        if context.target.trim().is_empty() {
            return Err(SealError::MissingPrerequisite("target"));
        }
        if context.environment.trim().is_empty() {
            return Err(SealError::MissingPrerequisite("environment"));
        }
        validate_chain(&request.evidence_chain)?;
        if self.policy.require_all_gates_passed && request.gate_results.failed_gates > 0 {
            return Err(SealError::PolicyViolation {
                failed_gates: request.gate_results.failed_gates,
            });
        }

        let seal_data = SealData {
            seal_id: SealId::generate(),
            version: self.policy.version.clone(),
            timestamp: self.clock.now(),
            target: context.target.clone(),
            environment: context.environment.clone(),
            evidence_chain: request.evidence_chain,
            gate_results_summary: request.gate_results,
            metadata: request.metadata,
        };
        let message = canonical_json_bytes(&seal_data)?;
        let signature = hex_encode(&self.signer.sign(&message)?);
        let mut baseline = SealedBaseline {
            seal_data,
            signature,
            algorithm: self.signer.algorithm(),
            key_fingerprint: self.signer.key_fingerprint(),
            status: SealStatus::Sealed,
            verified_at: None,
        };

        if self.mismatch_reason(&baseline)?.is_some() {
            return Err(SealError::SignatureMismatch(baseline.seal_id().clone()));
        }
        baseline.status = SealStatus::Verified;
        baseline.verified_at = Some(self.clock.now());
        self.store.save(&baseline)?;
        Ok(baseline)
    }

    /// Verifies a detached baseline without touching the store.
    ///
    /// # Errors
    ///
    /// Returns [`SealError`] when the payload cannot be canonicalized or the
    /// signer key is unusable. A mismatch is reported as `valid == false`.
    pub fn verify_baseline(&self, baseline: &SealedBaseline) -> Result<SealVerification, SealError> {
        let reason = self.mismatch_reason(baseline)?;
        Ok(match reason {
            None => SealVerification {
                seal_id: baseline.seal_id().clone(),
                valid: true,
                status: SealStatus::Verified,
                verified_at: Some(self.clock.now()),
                reason: None,
            },
            Some(reason) => SealVerification {
                seal_id: baseline.seal_id().clone(),
                valid: false,
                status: SealStatus::Invalid,
                verified_at: None,
                reason: Some(reason),
            },
        })
    }

    /// Re-verifies a stored baseline and persists the resulting status.
    ///
    /// # Errors
    ///
    /// Returns [`SealError::NotFound`] for unknown ids, or [`SealError`] when
    /// verification or the store fails.
    pub fn verify_seal(&self, seal_id: &SealId) -> Result<SealVerification, SealError> {
        let mut baseline =
            self.store.load(seal_id)?.ok_or_else(|| SealError::NotFound(seal_id.clone()))?;
        let verification = self.verify_baseline(&baseline)?;
        baseline.status = verification.status;
        if verification.valid {
            baseline.verified_at = verification.verified_at;
        }
        self.store.save(&baseline)?;

        let (level, event) = if verification.valid {
            (LogLevel::Info, "seal.verified")
        } else {
            (LogLevel::Warn, "seal.invalid")
        };
        self.logger.record(
            &LogRecord::new(level, event, "sealed baseline re-verified").fields(json!({
                "seal_id": seal_id,
                "valid": verification.valid,
                "reason": verification.reason,
            })),
        );
        Ok(verification)
    }

    /// Loads a stored baseline.
    ///
    /// # Errors
    ///
    /// Returns [`SealError::Store`] when the store fails.
    pub fn get_seal(&self, seal_id: &SealId) -> Result<Option<SealedBaseline>, SealError> {
        Ok(self.store.load(seal_id)?)
    }

    /// Lists stored seal ids.
    ///
    /// # Errors
    ///
    /// Returns [`SealError::Store`] when the store fails.
    pub fn list_seals(&self) -> Result<Vec<SealId>, SealError> {
        Ok(self.store.list()?)
    }

    /// Recomputes the signature over `seal_data` and returns why it does not
    /// match, or `None` when it does.
    fn mismatch_reason(&self, baseline: &SealedBaseline) -> Result<Option<String>, SealError> {
        if baseline.algorithm != self.signer.algorithm() {
            return Ok(Some(format!(
                "signature algorithm mismatch: sealed with {}",
                baseline.algorithm.as_str()
            )));
        }
        if baseline.key_fingerprint != self.signer.key_fingerprint() {
            return Ok(Some("signing key fingerprint mismatch".to_string()));
        }
        if let Err(err) = validate_chain(&baseline.seal_data.evidence_chain) {
            return Ok(Some(err.to_string()));
        }
        let Some(signature) = hex_decode(&baseline.signature) else {
            return Ok(Some("signature is not hex".to_string()));
        };
        let message = canonical_json_bytes(&baseline.seal_data)?;
        match self.signer.verify(&message, &signature) {
            Ok(true) => Ok(None),
            Ok(false) => Ok(Some("signature does not match seal data".to_string())),
            Err(SignerError::Malformed(reason)) => Ok(Some(reason)),
            Err(err) => Err(err.into()),
        }
    }
}

// ============================================================================
// SECTION: Final Seal Gate
// ============================================================================

/// Gate that seals the evidence recorded on the context.
///
/// The evidence chain is rebuilt from every prior result on the context and
/// the gate-results summary covers the same results in gate-id order.
#[derive(Debug)]
pub struct FinalSealGate {
    /// Gate identifier.
    gate_id: GateId,
    /// Display names.
    names: DisplayName,
    /// Sealer used to create baselines.
    sealer: Arc<BaselineSealer>,
}

impl FinalSealGate {
    /// Creates the gate under [`FINAL_SEAL_GATE_ID`].
    #[must_use]
    pub fn new(sealer: Arc<BaselineSealer>) -> Self {
        Self {
            gate_id: GateId::new(FINAL_SEAL_GATE_ID),
            names: DisplayName::new("Final Seal", "最终封存"),
            sealer,
        }
    }

    /// Overrides the gate identifier.
    #[must_use]
    pub fn with_id(mut self, gate_id: impl Into<GateId>) -> Self {
        self.gate_id = gate_id.into();
        self
    }

    /// Returns the catalog entry for this gate with the given dependencies.
    #[must_use]
    pub fn definition<I, G>(&self, dependencies: I) -> GateDefinition
    where
        I: IntoIterator<Item = G>,
        G: Into<GateId>,
    {
        GateDefinition::new(
            self.gate_id.clone(),
            self.names.clone(),
            GateCategory::Integrity,
            Severity::Critical,
        )
        .with_dependencies(dependencies)
    }

    /// Builds the seal request from the context's recorded results.
    fn seal_request(context: &ExecutionContext) -> Result<SealRequest, SealError> {
        let results: Vec<GateResult> =
            context.results.iter().map(|(_, result)| result.clone()).collect();
        let chain = EvidenceChain::from_results(&results)?;
        Ok(SealRequest {
            evidence_chain: chain.into_entries(),
            gate_results: GateResultsSummary::from_results(&results),
            metadata: context.metadata.clone(),
        })
    }
}

#[async_trait]
impl Gate for FinalSealGate {
    fn gate_id(&self) -> &GateId {
        &self.gate_id
    }

    fn names(&self) -> &DisplayName {
        &self.names
    }

    async fn execute(
        &self,
        context: &ExecutionContext,
        _config: &GateConfig,
    ) -> Result<GateResult, GateExecutionError> {
        let builder =
            GateResultBuilder::new(self.gate_id.clone(), context).timestamp(self.sealer.clock.now());
        let outcome = Self::seal_request(context)
            .and_then(|request| self.sealer.create_seal(context, request));
        Ok(match outcome {
            Ok(baseline) => builder
                .message(format!("baseline sealed: {}", baseline.seal_id()))
                .finding(
                    Finding::info(
                        "baseline-sealed",
                        "Baseline sealed",
                        format!(
                            "sealed {} evidence entries across {} gates",
                            baseline.seal_data.evidence_chain.len(),
                            baseline.seal_data.gate_results_summary.total_gates
                        ),
                    )
                    .at(baseline.seal_id().as_str()),
                )
                .metric(Metric::new(
                    "evidence_chain_length",
                    count_metric(baseline.seal_data.evidence_chain.len()),
                    "entries",
                ))
                .passed(),
            Err(err) => builder
                .message(err.to_string())
                .finding(Finding::violation(
                    err.finding_id(),
                    Severity::Critical,
                    "Baseline not sealed",
                    err.to_string(),
                ))
                .failed(),
        })
    }

    fn validate_prerequisites(&self, context: &ExecutionContext) -> Result<(), GateExecutionError> {
        for (field, value) in [
            ("execution_id", context.execution_id.as_str()),
            ("target", context.target.as_str()),
            ("environment", context.environment.as_str()),
        ] {
            if value.trim().is_empty() {
                return Err(GateExecutionError::Prerequisite(format!("{field} is required")));
            }
        }
        Ok(())
    }
}

/// Converts a count to a metric value.
fn count_metric(count: usize) -> f64 {
    u32::try_from(count).map_or(f64::from(u32::MAX), f64::from)
}
