// crates/compliance-gate-core/src/runtime/store.rs
// ============================================================================
// Module: Compliance Gate In-Memory Seal Store
// Description: Simple in-memory sealed baseline store for tests and local runs.
// Purpose: Provide a deterministic store implementation without external deps.
// Dependencies: crate::{core, interfaces}
// ============================================================================

//! ## Overview
//! This module provides a simple in-memory implementation of [`SealStore`]
//! keyed by seal id. It is not intended for production use; durable audit
//! storage is a host concern.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::MutexGuard;

use crate::core::SealId;
use crate::core::SealedBaseline;
use crate::interfaces::SealStore;
use crate::interfaces::StoreError;

// ============================================================================
// SECTION: In-Memory Store
// ============================================================================

/// In-memory sealed baseline store.
#[derive(Debug, Default, Clone)]
pub struct InMemorySealStore {
    /// Baselines keyed by seal id, protected by a mutex.
    baselines: Arc<Mutex<BTreeMap<SealId, SealedBaseline>>>,
}

impl InMemorySealStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of stored baselines.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the store mutex is poisoned.
    pub fn len(&self) -> Result<usize, StoreError> {
        Ok(self.lock()?.len())
    }

    /// Returns true when no baselines are stored.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the store mutex is poisoned.
    pub fn is_empty(&self) -> Result<bool, StoreError> {
        Ok(self.lock()?.is_empty())
    }

    /// Locks the baseline map.
    fn lock(&self) -> Result<MutexGuard<'_, BTreeMap<SealId, SealedBaseline>>, StoreError> {
        self.baselines
            .lock()
            .map_err(|_| StoreError::Store("seal store mutex poisoned".to_string()))
    }
}

impl SealStore for InMemorySealStore {
    fn save(&self, baseline: &SealedBaseline) -> Result<(), StoreError> {
        self.lock()?.insert(baseline.seal_id().clone(), baseline.clone());
        Ok(())
    }

    fn load(&self, seal_id: &SealId) -> Result<Option<SealedBaseline>, StoreError> {
        Ok(self.lock()?.get(seal_id).cloned())
    }

    fn list(&self) -> Result<Vec<SealId>, StoreError> {
        Ok(self.lock()?.keys().cloned().collect())
    }
}
