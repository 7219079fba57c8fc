// crates/compliance-gate-core/src/runtime/signer.rs
// ============================================================================
// Module: Compliance Gate Signers
// Description: HMAC-SHA256 and Ed25519 signers plus signing-key resolution.
// Purpose: Provide pluggable signature schemes for evidence and seals.
// Dependencies: crate::{core, interfaces}, ed25519-dalek, hmac, sha2
// ============================================================================

//! ## Overview
//! Two [`SealSigner`] implementations ship with the core: a symmetric keyed
//! digest ([`HmacSha256Signer`]) and an asymmetric scheme ([`Ed25519Signer`]).
//! Both are constructed from a [`SigningSecret`] resolved by
//! [`resolve_signing_secret`], which fails closed in production when no key is
//! configured.
//! Security posture: key bytes are never logged or serialized; only a
//! truncated SHA-256 fingerprint leaves this module.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use ed25519_dalek::Signature;
use ed25519_dalek::Signer as _;
use ed25519_dalek::SigningKey;
use ed25519_dalek::VerifyingKey;
use hmac::Hmac;
use hmac::Mac;
use sha2::Digest;
use sha2::Sha256;
use thiserror::Error;

use crate::core::SignatureAlgorithm;
use crate::core::hashing::hex_encode;
use crate::interfaces::SealSigner;
use crate::interfaces::SignerError;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default environment variable holding the signing key.
pub const DEFAULT_SEAL_KEY_ENV: &str = "COMPLIANCE_GATE_SEAL_KEY";

/// Fixed key used outside production when no key is configured.
///
/// Never valid for production seals; fingerprints derived from it are marked
/// by [`SigningSecret::is_development_fallback`].
const DEVELOPMENT_FALLBACK_KEY: &[u8] = b"compliance-gate-development-only-insecure-seal-key";

/// Number of hex characters kept in key fingerprints.
const FINGERPRINT_HEX_LEN: usize = 16;

/// HMAC-SHA256 instance type.
type HmacSha256 = Hmac<Sha256>;

// ============================================================================
// SECTION: Signing Secret
// ============================================================================

/// Raw signing key material.
#[derive(Clone)]
pub struct SigningSecret {
    /// Key bytes.
    bytes: Vec<u8>,
    /// Whether the fixed development key is in use.
    development_fallback: bool,
}

impl SigningSecret {
    /// Wraps caller-provided key bytes.
    #[must_use]
    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            bytes: bytes.into(),
            development_fallback: false,
        }
    }

    /// Returns the fixed development fallback key.
    #[must_use]
    pub fn development_fallback() -> Self {
        Self {
            bytes: DEVELOPMENT_FALLBACK_KEY.to_vec(),
            development_fallback: true,
        }
    }

    /// Returns true when the fixed development key is in use.
    #[must_use]
    pub const fn is_development_fallback(&self) -> bool {
        self.development_fallback
    }

    /// Returns the fingerprint of the key bytes.
    #[must_use]
    pub fn fingerprint(&self) -> String {
        fingerprint(&self.bytes)
    }
}

impl fmt::Debug for SigningSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SigningSecret")
            .field("bytes", &"<redacted>")
            .field("development_fallback", &self.development_fallback)
            .finish()
    }
}

/// Signing key resolution errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KeyError {
    /// Production requires a configured key.
    #[error("signing key {source_name} is missing or empty in a production environment")]
    MissingProductionKey {
        /// Name of the key source (e.g. the environment variable).
        source_name: String,
    },
}

/// Resolves a signing secret from a raw configured value.
///
/// A present, non-blank value is always used. Otherwise production fails with
/// [`KeyError::MissingProductionKey`] and every other environment receives the
/// clearly marked development fallback key.
///
/// # Errors
///
/// Returns [`KeyError`] when a production environment has no key.
pub fn resolve_signing_secret(
    production: bool,
    source_name: &str,
    raw: Option<String>,
) -> Result<SigningSecret, KeyError> {
    match raw {
        Some(value) if !value.trim().is_empty() => Ok(SigningSecret::from_bytes(value.into_bytes())),
        _ if production => Err(KeyError::MissingProductionKey {
            source_name: source_name.to_string(),
        }),
        _ => Ok(SigningSecret::development_fallback()),
    }
}

// ============================================================================
// SECTION: HMAC-SHA256
// ============================================================================

/// Symmetric keyed-digest signer.
#[derive(Clone)]
pub struct HmacSha256Signer {
    /// Key material.
    secret: SigningSecret,
}

impl HmacSha256Signer {
    /// Creates a signer from a secret.
    #[must_use]
    pub const fn new(secret: SigningSecret) -> Self {
        Self {
            secret,
        }
    }

    /// Builds a keyed MAC instance.
    fn mac(&self) -> Result<HmacSha256, SignerError> {
        HmacSha256::new_from_slice(&self.secret.bytes)
            .map_err(|err| SignerError::Key(err.to_string()))
    }
}

impl SealSigner for HmacSha256Signer {
    fn algorithm(&self) -> SignatureAlgorithm {
        SignatureAlgorithm::HmacSha256
    }

    fn key_fingerprint(&self) -> String {
        self.secret.fingerprint()
    }

    fn sign(&self, message: &[u8]) -> Result<Vec<u8>, SignerError> {
        let mut mac = self.mac()?;
        mac.update(message);
        Ok(mac.finalize().into_bytes().to_vec())
    }

    fn verify(&self, message: &[u8], signature: &[u8]) -> Result<bool, SignerError> {
        let mut mac = self.mac()?;
        mac.update(message);
        Ok(mac.verify_slice(signature).is_ok())
    }
}

// ============================================================================
// SECTION: Ed25519
// ============================================================================

/// Asymmetric Ed25519 signer.
#[derive(Clone)]
pub struct Ed25519Signer {
    /// Signing key.
    signing_key: SigningKey,
}

impl Ed25519Signer {
    /// Creates a signer from a raw 32-byte seed.
    #[must_use]
    pub fn from_seed(seed: &[u8; 32]) -> Self {
        Self {
            signing_key: SigningKey::from_bytes(seed),
        }
    }

    /// Derives a signer deterministically from arbitrary secret bytes (SHA-256 of the secret).
    #[must_use]
    pub fn from_secret(secret: &SigningSecret) -> Self {
        let mut seed = [0_u8; 32];
        seed.copy_from_slice(&Sha256::digest(&secret.bytes));
        Self::from_seed(&seed)
    }

    /// Returns the public verifying key.
    #[must_use]
    pub fn verifying_key(&self) -> VerifyingKey {
        self.signing_key.verifying_key()
    }
}

impl SealSigner for Ed25519Signer {
    fn algorithm(&self) -> SignatureAlgorithm {
        SignatureAlgorithm::Ed25519
    }

    fn key_fingerprint(&self) -> String {
        fingerprint(self.verifying_key().as_bytes())
    }

    fn sign(&self, message: &[u8]) -> Result<Vec<u8>, SignerError> {
        Ok(self.signing_key.sign(message).to_bytes().to_vec())
    }

    fn verify(&self, message: &[u8], signature: &[u8]) -> Result<bool, SignerError> {
        let signature = Signature::from_slice(signature)
            .map_err(|err| SignerError::Malformed(err.to_string()))?;
        Ok(self.verifying_key().verify_strict(message, &signature).is_ok())
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Returns the truncated SHA-256 fingerprint of key bytes.
fn fingerprint(bytes: &[u8]) -> String {
    let mut hex = hex_encode(&Sha256::digest(bytes));
    hex.truncate(FINGERPRINT_HEX_LEN);
    hex
}
