// crates/compliance-gate-core/src/core/evidence.rs
// ============================================================================
// Module: Compliance Gate Evidence
// Description: Hashed evidence records and hash-linked evidence chain entries.
// Purpose: Provide tamper-evident audit records for gate executions.
// Dependencies: crate::core, serde, serde_json, thiserror
// ============================================================================

//! ## Overview
//! Evidence records carry a canonical content hash and, when sealing is
//! enabled, a signature over `(evidence id, hash, timestamp)`. Chain entries
//! link records by hash; [`validate_chain`] enforces linkage and timestamp
//! monotonicity.
//! Security posture: evidence is an audit artifact and must never be
//! rewritten once hashed.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use crate::core::hashing::HashDigest;
use crate::core::identifiers::EvidenceId;
use crate::core::time::Timestamp;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Previous-hash value used by the first entry of a freshly built chain.
pub const EVIDENCE_CHAIN_GENESIS: &str =
    "0000000000000000000000000000000000000000000000000000000000000000";

// ============================================================================
// SECTION: Signatures
// ============================================================================

/// Signature scheme used for evidence and seal signatures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SignatureAlgorithm {
    /// Symmetric keyed digest (HMAC-SHA256).
    #[serde(rename = "hmac-sha256")]
    HmacSha256,
    /// Asymmetric Ed25519 signature.
    #[serde(rename = "ed25519")]
    Ed25519,
}

impl SignatureAlgorithm {
    /// Returns a stable label for the algorithm.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::HmacSha256 => "hmac-sha256",
            Self::Ed25519 => "ed25519",
        }
    }
}

/// Detached signature over an evidence record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvidenceSignature {
    /// Signature scheme.
    pub algorithm: SignatureAlgorithm,
    /// Fingerprint of the signing key.
    pub key_fingerprint: String,
    /// Lowercase hex signature bytes.
    pub value: String,
}

// ============================================================================
// SECTION: Evidence
// ============================================================================

/// Kind of evidence record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EvidenceType {
    /// Record of a single gate execution.
    GateExecution,
}

impl EvidenceType {
    /// Returns a stable label for the evidence type.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::GateExecution => "gate_execution",
        }
    }
}

/// Hashed (and optionally signed) evidence record.
///
/// # Invariants
/// - `hash` is the canonical JSON hash of `content`.
/// - `sealed` is true iff `signature` is present.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Evidence {
    /// Evidence identifier.
    pub id: EvidenceId,
    /// Evidence kind.
    #[serde(rename = "type")]
    pub evidence_type: EvidenceType,
    /// Canonical evidence content.
    pub content: Value,
    /// Canonical content hash.
    pub hash: HashDigest,
    /// Creation timestamp.
    pub timestamp: Timestamp,
    /// Whether a signature was applied.
    pub sealed: bool,
    /// Optional signature over `(id, hash, timestamp)`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signature: Option<EvidenceSignature>,
}

// ============================================================================
// SECTION: Evidence Chain
// ============================================================================

/// One link of a hash-linked evidence chain.
///
/// # Invariants
/// - `previous_hash` equals the `hash` of the preceding entry.
/// - Timestamps are non-decreasing along the chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvidenceChainEntry {
    /// Entry identifier (usually the evidence id).
    pub id: String,
    /// Entry kind label.
    #[serde(rename = "type")]
    pub entry_type: String,
    /// Entry hash (hex).
    pub hash: String,
    /// Hash of the preceding entry (hex).
    pub previous_hash: String,
    /// Entry timestamp.
    pub timestamp: Timestamp,
}

/// Evidence chain integrity violations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChainError {
    /// The chain has no entries.
    #[error("evidence chain is empty")]
    Empty,
    /// An entry does not reference its predecessor's hash.
    #[error("evidence chain broken at entry {index}: expected previous hash {expected}, found {found}")]
    BrokenLink {
        /// Index of the offending entry.
        index: usize,
        /// Hash of the preceding entry.
        expected: String,
        /// Previous hash recorded on the offending entry.
        found: String,
    },
    /// An entry is older than its predecessor.
    #[error("evidence chain timestamp regression at entry {index}")]
    TimestampRegression {
        /// Index of the offending entry.
        index: usize,
    },
}

/// Validates chain linkage and timestamp monotonicity.
///
/// # Errors
///
/// Returns [`ChainError`] on the first violation found, or when the chain is empty.
pub fn validate_chain(entries: &[EvidenceChainEntry]) -> Result<(), ChainError> {
    if entries.is_empty() {
        return Err(ChainError::Empty);
    }
    for (offset, pair) in entries.windows(2).enumerate() {
        let (previous, current) = (&pair[0], &pair[1]);
        let index = offset + 1;
        if current.previous_hash != previous.hash {
            return Err(ChainError::BrokenLink {
                index,
                expected: previous.hash.clone(),
                found: current.previous_hash.clone(),
            });
        }
        if current.timestamp < previous.timestamp {
            return Err(ChainError::TimestampRegression {
                index,
            });
        }
    }
    Ok(())
}
