// crates/compliance-gate-config/src/lib.rs
// ============================================================================
// Module: Compliance Gate Config Library
// Description: Canonical config model and fail-closed validation.
// Purpose: Single source of truth for compliance-gate.toml semantics.
// Dependencies: compliance-gate-core, serde, toml
// ============================================================================

//! ## Overview
//! `compliance-gate-config` loads `compliance-gate.toml`, validates it, and
//! turns it into the core runtime pieces: executor limits, per-gate
//! overrides, the seal policy, and the signing key.
//!
//! Security posture: config inputs are untrusted and the signing key is read
//! from the environment, never from the file itself.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod config;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use config::*;
