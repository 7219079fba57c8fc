// crates/compliance-gate-core/tests/evidence.rs
// ============================================================================
// Module: Evidence and Chain Tests
// Description: Evidence synthesis, signatures, and hash-linked chain integrity.
// ============================================================================
//! ## Overview
//! Validates evidence hashing and signing, chain construction from results,
//! and fail-closed chain validation on broken links or time regressions.

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only output and panic-based assertions are permitted."
)]

mod common;

use std::collections::HashSet;
use std::sync::Arc;

use compliance_gate_core::ChainError;
use compliance_gate_core::DEFAULT_HASH_ALGORITHM;
use compliance_gate_core::EVIDENCE_CHAIN_GENESIS;
use compliance_gate_core::Ed25519Signer;
use compliance_gate_core::EvidenceBuilder;
use compliance_gate_core::EvidenceChain;
use compliance_gate_core::GateStatus;
use compliance_gate_core::HashAlgorithm;
use compliance_gate_core::HmacSha256Signer;
use compliance_gate_core::Metric;
use compliance_gate_core::SealSigner;
use compliance_gate_core::SignatureAlgorithm;
use compliance_gate_core::SigningSecret;
use compliance_gate_core::Timestamp;
use compliance_gate_core::runtime::ChainBuildError;
use compliance_gate_core::runtime::verify_evidence_signature;
use compliance_gate_core::validate_chain;
use serde_json::json;

use crate::common::BASE_MILLIS;
use crate::common::passed_result;
use crate::common::result_with_status;
use crate::common::sample_context;

fn at(offset: i64) -> Timestamp {
    Timestamp::from_unix_millis(BASE_MILLIS + offset)
}

// ============================================================================
// SECTION: Evidence Builder
// ============================================================================

#[test]
fn evidence_content_records_gate_outcome() {
    let context = sample_context();
    let mut result = result_with_status("cache", &context, GateStatus::Warning);
    result.metrics.push(Metric::new("hit_rate", 0.5, "ratio"));

    let evidence = EvidenceBuilder::unsigned().build(&result, &context, at(10)).unwrap();
    assert_eq!(evidence.content["gate_id"], json!("cache"));
    assert_eq!(evidence.content["status"], json!("warning"));
    assert_eq!(evidence.content["metrics"][0]["name"], json!("hit_rate"));
    assert_eq!(evidence.content["context"]["execution_id"], json!("exec-0001"));
    assert_eq!(evidence.timestamp, at(10));
    assert_eq!(evidence.hash.value.len(), 64);
}

#[test]
fn identical_content_hashes_identically() {
    let context = sample_context();
    let result = passed_result("cache", &context);
    let builder = EvidenceBuilder::unsigned();
    let first = builder.build(&result, &context, at(1)).unwrap();
    let second = builder.build(&result, &context, at(1)).unwrap();
    assert_ne!(first.id, second.id);
    assert_eq!(first.hash, second.hash);

    let later = builder.build(&result, &context, at(2)).unwrap();
    assert_ne!(first.hash, later.hash);

    let digests: HashSet<_> = [&first.hash, &second.hash, &later.hash].into_iter().collect();
    assert_eq!(digests.len(), 2);
    let algorithms: HashSet<HashAlgorithm> = digests.iter().map(|digest| digest.algorithm).collect();
    assert_eq!(algorithms, HashSet::from([DEFAULT_HASH_ALGORITHM]));
}

#[test]
fn signed_evidence_round_trips_for_both_signers() {
    let secret = SigningSecret::from_bytes(b"shared-secret".to_vec());
    let signers: Vec<Arc<dyn SealSigner>> = vec![
        Arc::new(HmacSha256Signer::new(secret.clone())),
        Arc::new(Ed25519Signer::from_secret(&secret)),
    ];
    let context = sample_context();
    let result = passed_result("cache", &context);

    for signer in signers {
        let evidence =
            EvidenceBuilder::signed(signer.clone()).build(&result, &context, at(3)).unwrap();
        let signature = evidence.signature.as_ref().unwrap();
        assert!(evidence.sealed);
        assert_eq!(signature.algorithm, signer.algorithm());
        assert_eq!(signature.key_fingerprint, signer.key_fingerprint());
        assert!(verify_evidence_signature(signer.as_ref(), &evidence).unwrap());

        let mut moved = evidence.clone();
        moved.timestamp = at(4);
        assert!(!verify_evidence_signature(signer.as_ref(), &moved).unwrap());
    }
}

#[test]
fn verification_rejects_other_keys_and_unsigned_evidence() {
    let context = sample_context();
    let result = passed_result("cache", &context);
    let signer = HmacSha256Signer::new(SigningSecret::from_bytes(b"key-one".to_vec()));
    let other = HmacSha256Signer::new(SigningSecret::from_bytes(b"key-two".to_vec()));
    let evidence =
        EvidenceBuilder::signed(Arc::new(signer)).build(&result, &context, at(1)).unwrap();
    assert!(!verify_evidence_signature(&other, &evidence).unwrap());

    let unsigned = EvidenceBuilder::unsigned().build(&result, &context, at(1)).unwrap();
    assert!(!verify_evidence_signature(&other, &unsigned).unwrap());
}

#[test]
fn ed25519_fingerprint_uses_public_key() {
    let signer = Ed25519Signer::from_seed(&[7_u8; 32]);
    assert_eq!(signer.algorithm(), SignatureAlgorithm::Ed25519);
    assert_eq!(signer.key_fingerprint().len(), 16);
    assert_ne!(signer.key_fingerprint(), SigningSecret::from_bytes(vec![7_u8; 32]).fingerprint());
}

// ============================================================================
// SECTION: Evidence Chain
// ============================================================================

#[test]
fn chain_links_each_entry_to_its_predecessor() {
    let mut chain = EvidenceChain::new();
    assert_eq!(chain.head_hash(), EVIDENCE_CHAIN_GENESIS);
    chain.append("e1", "gate_execution", &"a".repeat(64), at(1)).unwrap();
    chain.append("e2", "gate_execution", &"b".repeat(64), at(2)).unwrap();
    chain.append("e3", "gate_execution", &"c".repeat(64), at(2)).unwrap();

    let entries = chain.entries();
    assert_eq!(entries[0].previous_hash, EVIDENCE_CHAIN_GENESIS);
    assert_eq!(entries[1].previous_hash, entries[0].hash);
    assert_eq!(entries[2].previous_hash, entries[1].hash);
    assert_eq!(chain.head_hash(), entries[2].hash);
    validate_chain(entries).unwrap();
}

#[test]
fn chain_append_rejects_time_regression() {
    let mut chain = EvidenceChain::new();
    chain.append("e1", "gate_execution", "aa", at(5)).unwrap();
    let err = chain.append("e2", "gate_execution", "bb", at(4)).unwrap_err();
    assert!(matches!(err, ChainBuildError::Chain(ChainError::TimestampRegression { index: 1 })));
    assert_eq!(chain.entries().len(), 1);
}

#[test]
fn chain_from_results_orders_evidence_by_time() {
    let context = sample_context();
    let builder = EvidenceBuilder::unsigned();
    let mut late = passed_result("late", &context);
    let late_evidence = builder.build(&late, &context, at(20)).unwrap();
    late.evidence.push(late_evidence);
    let mut early = passed_result("early", &context);
    let early_evidence = builder.build(&early, &context, at(10)).unwrap();
    early.evidence.push(early_evidence);

    let chain = EvidenceChain::from_results(&[late.clone(), early.clone()]).unwrap();
    let entries = chain.entries();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].id, early.evidence[0].id.as_str());
    assert_eq!(entries[1].id, late.evidence[0].id.as_str());
    validate_chain(entries).unwrap();
}

#[test]
fn validate_chain_detects_broken_links_and_regressions() {
    let mut chain = EvidenceChain::new();
    chain.append("e1", "gate_execution", "aa", at(1)).unwrap();
    chain.append("e2", "gate_execution", "bb", at(2)).unwrap();
    chain.append("e3", "gate_execution", "cc", at(3)).unwrap();

    let mut broken = chain.entries().to_vec();
    broken[2].previous_hash = "f".repeat(64);
    assert!(matches!(validate_chain(&broken), Err(ChainError::BrokenLink { index: 2, .. })));

    let mut regressed = chain.entries().to_vec();
    regressed[1].timestamp = at(0);
    assert!(matches!(
        validate_chain(&regressed),
        Err(ChainError::TimestampRegression { index: 1 })
    ));

    assert_eq!(validate_chain(&[]), Err(ChainError::Empty));
}
