// crates/compliance-gate-core/src/runtime/evidence.rs
// ============================================================================
// Module: Compliance Gate Evidence Builder
// Description: Per-gate evidence synthesis and hash-linked chain construction.
// Purpose: Produce hashed, optionally signed evidence and auditable chains.
// Dependencies: crate::{core, interfaces}, serde, serde_json
// ============================================================================

//! ## Overview
//! [`EvidenceBuilder`] turns a completed gate result into an [`Evidence`]
//! record: a canonical content record, its hash, and, when a signer is
//! configured, a signature over `(evidence id, hash, timestamp)`.
//! [`EvidenceChain`] links evidence hashes into an append-only chain whose
//! integrity is checked by [`crate::core::validate_chain`].

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;
use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;

use crate::core::ChainError;
use crate::core::ContextSummary;
use crate::core::DEFAULT_HASH_ALGORITHM;
use crate::core::EVIDENCE_CHAIN_GENESIS;
use crate::core::Evidence;
use crate::core::EvidenceChainEntry;
use crate::core::EvidenceId;
use crate::core::EvidenceSignature;
use crate::core::EvidenceType;
use crate::core::ExecutionContext;
use crate::core::GateId;
use crate::core::GateResult;
use crate::core::GateStatus;
use crate::core::HashAlgorithm;
use crate::core::HashDigest;
use crate::core::HashError;
use crate::core::Metric;
use crate::core::Timestamp;
use crate::core::hashing::canonical_json_bytes;
use crate::core::hashing::hash_canonical_json;
use crate::core::hashing::hash_chain_link;
use crate::core::hashing::hex_decode;
use crate::core::hashing::hex_encode;
use crate::interfaces::SealSigner;
use crate::interfaces::SignerError;

// ============================================================================
// SECTION: Records
// ============================================================================

/// Canonical content hashed into per-gate evidence.
#[derive(Serialize)]
struct GateEvidenceRecord<'a> {
    /// Gate identifier.
    gate_id: &'a GateId,
    /// Gate status.
    status: GateStatus,
    /// Evidence timestamp.
    timestamp: Timestamp,
    /// Context reference.
    context: ContextSummary,
    /// Number of findings reported.
    finding_count: usize,
    /// Reported metrics.
    metrics: &'a [Metric],
}

/// Payload covered by an evidence signature.
#[derive(Serialize)]
struct EvidenceSigningPayload<'a> {
    /// Evidence identifier.
    evidence_id: &'a EvidenceId,
    /// Evidence content hash.
    hash: &'a str,
    /// Evidence timestamp.
    timestamp: Timestamp,
}

/// Payload hashed into each chain link.
#[derive(Serialize)]
struct ChainLinkPayload<'a> {
    /// Entry identifier.
    id: &'a str,
    /// Entry kind label.
    #[serde(rename = "type")]
    entry_type: &'a str,
    /// Hash of the linked content.
    content_hash: &'a str,
    /// Entry timestamp.
    timestamp: Timestamp,
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Evidence synthesis failures.
#[derive(Debug, Error)]
pub enum EvidenceError {
    /// Canonical hashing failed.
    #[error(transparent)]
    Hash(#[from] HashError),
    /// Serializing the evidence record failed.
    #[error("failed to serialize evidence record: {0}")]
    Serialize(String),
    /// Signing failed.
    #[error(transparent)]
    Signer(#[from] SignerError),
}

// ============================================================================
// SECTION: Evidence Builder
// ============================================================================

/// Synthesizes evidence for completed gate results.
#[derive(Clone)]
pub struct EvidenceBuilder {
    /// Hash algorithm for content hashes.
    algorithm: HashAlgorithm,
    /// Signer used when evidence sealing is enabled.
    signer: Option<Arc<dyn SealSigner>>,
}

impl fmt::Debug for EvidenceBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EvidenceBuilder")
            .field("algorithm", &self.algorithm)
            .field("signed", &self.signer.is_some())
            .finish()
    }
}

impl Default for EvidenceBuilder {
    fn default() -> Self {
        Self::unsigned()
    }
}

impl EvidenceBuilder {
    /// Creates a builder that hashes but does not sign.
    #[must_use]
    pub const fn unsigned() -> Self {
        Self {
            algorithm: DEFAULT_HASH_ALGORITHM,
            signer: None,
        }
    }

    /// Creates a builder that hashes and signs (sealed evidence).
    #[must_use]
    pub fn signed(signer: Arc<dyn SealSigner>) -> Self {
        Self {
            algorithm: DEFAULT_HASH_ALGORITHM,
            signer: Some(signer),
        }
    }

    /// Returns true when evidence is signed.
    #[must_use]
    pub const fn is_sealing(&self) -> bool {
        self.signer.is_some()
    }

    /// Builds evidence for a completed gate result.
    ///
    /// # Errors
    ///
    /// Returns [`EvidenceError`] when hashing, serialization, or signing fails.
    pub fn build(
        &self,
        result: &GateResult,
        context: &ExecutionContext,
        timestamp: Timestamp,
    ) -> Result<Evidence, EvidenceError> {
        let record = GateEvidenceRecord {
            gate_id: &result.gate_id,
            status: result.status,
            timestamp,
            context: context.summary(),
            finding_count: result.findings.len(),
            metrics: &result.metrics,
        };
        let content =
            serde_json::to_value(&record).map_err(|err| EvidenceError::Serialize(err.to_string()))?;
        let hash = hash_canonical_json(self.algorithm, &content)?;
        let id = EvidenceId::generate();
        let signature = match &self.signer {
            Some(signer) => Some(sign_evidence(signer.as_ref(), &id, &hash, timestamp)?),
            None => None,
        };
        Ok(Evidence {
            id,
            evidence_type: EvidenceType::GateExecution,
            content,
            hash,
            timestamp,
            sealed: signature.is_some(),
            signature,
        })
    }
}

/// Signs `(evidence id, hash, timestamp)` with the configured signer.
fn sign_evidence(
    signer: &dyn SealSigner,
    id: &EvidenceId,
    hash: &HashDigest,
    timestamp: Timestamp,
) -> Result<EvidenceSignature, EvidenceError> {
    let payload = EvidenceSigningPayload {
        evidence_id: id,
        hash: &hash.value,
        timestamp,
    };
    let bytes = canonical_json_bytes(&payload)?;
    let signature = signer.sign(&bytes)?;
    Ok(EvidenceSignature {
        algorithm: signer.algorithm(),
        key_fingerprint: signer.key_fingerprint(),
        value: hex_encode(&signature),
    })
}

/// Verifies an evidence signature with the given signer.
///
/// Returns `Ok(false)` for unsigned evidence or a non-matching signature.
///
/// # Errors
///
/// Returns [`EvidenceError`] when the payload cannot be canonicalized or the
/// signature is malformed.
pub fn verify_evidence_signature(
    signer: &dyn SealSigner,
    evidence: &Evidence,
) -> Result<bool, EvidenceError> {
    let Some(signature) = &evidence.signature else {
        return Ok(false);
    };
    if signature.algorithm != signer.algorithm() {
        return Ok(false);
    }
    let bytes = hex_decode(&signature.value)
        .ok_or_else(|| SignerError::Malformed("signature is not hex".to_string()))?;
    let payload = EvidenceSigningPayload {
        evidence_id: &evidence.id,
        hash: &evidence.hash.value,
        timestamp: evidence.timestamp,
    };
    let message = canonical_json_bytes(&payload)?;
    signer.verify(&message, &bytes).map_err(EvidenceError::from)
}

// ============================================================================
// SECTION: Evidence Chain
// ============================================================================

/// Append-only, hash-linked evidence chain.
#[derive(Debug, Clone)]
pub struct EvidenceChain {
    /// Hash algorithm for link hashes.
    algorithm: HashAlgorithm,
    /// Chain entries in append order.
    entries: Vec<EvidenceChainEntry>,
}

impl Default for EvidenceChain {
    fn default() -> Self {
        Self::new()
    }
}

impl EvidenceChain {
    /// Creates an empty chain anchored at [`EVIDENCE_CHAIN_GENESIS`].
    #[must_use]
    pub const fn new() -> Self {
        Self {
            algorithm: DEFAULT_HASH_ALGORITHM,
            entries: Vec::new(),
        }
    }

    /// Builds a chain from every evidence record in a run's results.
    ///
    /// Records are ordered by timestamp (stable for equal timestamps) so that
    /// concurrently produced evidence still yields a monotonic chain.
    ///
    /// # Errors
    ///
    /// Returns [`ChainError`] or [`HashError`] wrapped in [`ChainBuildError`].
    pub fn from_results(results: &[GateResult]) -> Result<Self, ChainBuildError> {
        let mut evidence: Vec<&Evidence> =
            results.iter().flat_map(|result| result.evidence.iter()).collect();
        evidence.sort_by_key(|record| record.timestamp);
        let mut chain = Self::new();
        for record in evidence {
            chain.append(
                record.id.as_str(),
                record.evidence_type.as_str(),
                &record.hash.value,
                record.timestamp,
            )?;
        }
        Ok(chain)
    }

    /// Appends an entry linking `content_hash` to the current head.
    ///
    /// # Errors
    ///
    /// Returns [`ChainBuildError`] when the timestamp regresses or hashing fails.
    pub fn append(
        &mut self,
        id: &str,
        entry_type: &str,
        content_hash: &str,
        timestamp: Timestamp,
    ) -> Result<&EvidenceChainEntry, ChainBuildError> {
        if let Some(last) = self.entries.last()
            && timestamp < last.timestamp
        {
            return Err(ChainBuildError::Chain(ChainError::TimestampRegression {
                index: self.entries.len(),
            }));
        }
        let previous_hash = self.head_hash().to_string();
        let payload = ChainLinkPayload {
            id,
            entry_type,
            content_hash,
            timestamp,
        };
        let hash = hash_chain_link(self.algorithm, &previous_hash, &payload)?;
        self.entries.push(EvidenceChainEntry {
            id: id.to_string(),
            entry_type: entry_type.to_string(),
            hash: hash.value,
            previous_hash,
            timestamp,
        });
        let index = self.entries.len() - 1;
        Ok(&self.entries[index])
    }

    /// Returns the current head hash (genesis when empty).
    #[must_use]
    pub fn head_hash(&self) -> &str {
        self.entries.last().map_or(EVIDENCE_CHAIN_GENESIS, |entry| entry.hash.as_str())
    }

    /// Returns the chain entries.
    #[must_use]
    pub fn entries(&self) -> &[EvidenceChainEntry] {
        &self.entries
    }

    /// Consumes the chain and returns its entries.
    #[must_use]
    pub fn into_entries(self) -> Vec<EvidenceChainEntry> {
        self.entries
    }
}

/// Chain construction failures.
#[derive(Debug, Error)]
pub enum ChainBuildError {
    /// Chain invariant violated.
    #[error(transparent)]
    Chain(#[from] ChainError),
    /// Link hashing failed.
    #[error(transparent)]
    Hash(#[from] HashError),
}
