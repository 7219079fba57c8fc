// crates/compliance-gate-core/src/runtime/registry.rs
// ============================================================================
// Module: Compliance Gate Registry
// Description: Owned catalog of gate definitions and dependency queries.
// Purpose: Answer metadata, dependency-closure, and ordering questions.
// Dependencies: crate::core
// ============================================================================

//! ## Overview
//! The registry is an explicitly constructed, owned catalog. It is populated
//! through [`GateRegistry::register`] and then shared read-only (typically in
//! an `Arc`) with the executor; once shared it can no longer be mutated.
//! Registration is permissive: dependencies may name gates that are never
//! registered.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::collections::BTreeSet;

use crate::core::GateCategory;
use crate::core::GateDefinition;
use crate::core::GateId;
use crate::core::Severity;

// ============================================================================
// SECTION: Registry
// ============================================================================

/// Catalog of gate definitions keyed by gate id.
#[derive(Debug, Clone, Default)]
pub struct GateRegistry {
    /// Definitions keyed by gate id.
    definitions: BTreeMap<GateId, GateDefinition>,
}

impl GateRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            definitions: BTreeMap::new(),
        }
    }

    /// Creates a registry populated with the given definitions.
    #[must_use]
    pub fn with_definitions(definitions: impl IntoIterator<Item = GateDefinition>) -> Self {
        let mut registry = Self::new();
        for definition in definitions {
            registry.register(definition);
        }
        registry
    }

    /// Registers or replaces a definition, returning the replaced entry.
    pub fn register(&mut self, definition: GateDefinition) -> Option<GateDefinition> {
        self.definitions.insert(definition.id.clone(), definition)
    }

    /// Returns a definition by id.
    #[must_use]
    pub fn get(&self, gate_id: &GateId) -> Option<&GateDefinition> {
        self.definitions.get(gate_id)
    }

    /// Returns true when the id is registered.
    #[must_use]
    pub fn contains(&self, gate_id: &GateId) -> bool {
        self.definitions.contains_key(gate_id)
    }

    /// Returns the number of registered definitions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    /// Returns true when nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    /// Lists every definition in id order.
    #[must_use]
    pub fn list(&self) -> Vec<&GateDefinition> {
        self.definitions.values().collect()
    }

    /// Lists definitions in a category.
    #[must_use]
    pub fn list_by_category(&self, category: GateCategory) -> Vec<&GateDefinition> {
        self.definitions.values().filter(|definition| definition.category == category).collect()
    }

    /// Lists definitions with a given default severity.
    #[must_use]
    pub fn list_by_severity(&self, severity: Severity) -> Vec<&GateDefinition> {
        self.definitions.values().filter(|definition| definition.severity == severity).collect()
    }

    /// Lists definitions enabled by default.
    #[must_use]
    pub fn list_enabled(&self) -> Vec<&GateDefinition> {
        self.definitions.values().filter(|definition| definition.enabled_by_default).collect()
    }

    /// Returns the transitive dependency closure of a gate.
    ///
    /// Traversal is depth-first with a visited set, so cyclic definitions
    /// terminate. The gate itself is never part of its own closure, and
    /// unregistered dependencies are included but not expanded.
    #[must_use]
    pub fn dependencies(&self, gate_id: &GateId) -> Vec<GateId> {
        let mut visited = BTreeSet::from([gate_id.clone()]);
        let mut closure = Vec::new();
        let mut stack: Vec<&GateId> = self
            .get(gate_id)
            .map(|definition| definition.dependencies.iter().rev().collect())
            .unwrap_or_default();
        while let Some(next) = stack.pop() {
            if !visited.insert(next.clone()) {
                continue;
            }
            closure.push(next.clone());
            if let Some(definition) = self.get(next) {
                stack.extend(definition.dependencies.iter().rev());
            }
        }
        closure
    }

    /// Checks a proposed order against direct dependencies.
    ///
    /// Advisory only: returns one human-readable violation per dependency that
    /// does not appear earlier in `order`. Unknown ids are ignored.
    #[must_use]
    pub fn validate_execution_order(&self, order: &[GateId]) -> Vec<String> {
        let mut executed: BTreeSet<&GateId> = BTreeSet::new();
        let mut violations = Vec::new();
        for gate_id in order {
            if let Some(definition) = self.get(gate_id) {
                for dependency in &definition.dependencies {
                    if !executed.contains(dependency) {
                        violations.push(format!(
                            "gate {gate_id} depends on {dependency}, which is not scheduled before it"
                        ));
                    }
                }
            }
            executed.insert(gate_id);
        }
        violations
    }

    /// Exports the catalog as an id-to-definition map.
    #[must_use]
    pub fn export(&self) -> BTreeMap<GateId, GateDefinition> {
        self.definitions.clone()
    }
}
