//! Resolution engine: one winning atom per field path.
//!
//! The tie-break order is total and stable, so the same atom set always
//! produces the same winner (required for reproducible verification and
//! caching):
//!
//! 1. higher trust level wins,
//! 2. on trust tie, the lexically smaller layer id wins (earlier-precedence
//!    layer),
//! 3. on further tie, a cited atom beats an uncited one,
//! 4. on further tie, the lexically greatest commit hash wins (most recent
//!    ingestion run, commit identifiers being monotonically comparable),
//! 5. finally the atom id, as a stabilizer for pathological duplicates.

use std::cmp::Reverse;
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use stratum_core::{Atom, AtomId, TrustLevel};
use stratum_store::{AtomStore, StoreError};

/// The winning atom for a field path plus everything it shadowed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedField {
    pub winner: Atom,
    /// Losing atoms for the same path, in precedence order. Kept for audit
    /// display, excluded from the merged map.
    pub shadowed: Vec<Atom>,
}

/// Merged view of a container: each distinct field path mapped to exactly
/// one winner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedView {
    pub container_id: String,
    pub fields: BTreeMap<String, ResolvedField>,
}

impl ResolvedView {
    pub fn winner(&self, field_path: &str) -> Option<&Atom> {
        self.fields.get(field_path).map(|f| &f.winner)
    }

    pub fn shadowed(&self, field_path: &str) -> &[Atom] {
        self.fields
            .get(field_path)
            .map(|f| f.shadowed.as_slice())
            .unwrap_or(&[])
    }
}

/// Total precedence key; smaller sorts first, first wins.
fn precedence_key(atom: &Atom) -> (Reverse<TrustLevel>, String, bool, Reverse<String>, AtomId) {
    (
        Reverse(atom.trust_level),
        atom.layer_id.clone(),
        atom.citation.is_none(),
        Reverse(atom.commit_hash.clone()),
        atom.atom_id,
    )
}

/// Pure resolution over an atom set. Atoms belonging to other containers
/// are not filtered here; callers pass exactly one container's atoms.
pub fn resolve_atoms(container_id: impl Into<String>, atoms: Vec<Atom>) -> ResolvedView {
    let mut by_path: BTreeMap<String, Vec<Atom>> = BTreeMap::new();
    for atom in atoms {
        by_path.entry(atom.field_path.clone()).or_default().push(atom);
    }

    let mut fields = BTreeMap::new();
    for (path, mut competing) in by_path {
        competing.sort_by_key(precedence_key);
        let mut it = competing.into_iter();
        let Some(winner) = it.next() else {
            continue;
        };
        fields.insert(
            path,
            ResolvedField {
                winner,
                shadowed: it.collect(),
            },
        );
    }

    ResolvedView {
        container_id: container_id.into(),
        fields,
    }
}

/// Resolve a container from the store.
pub fn resolve(store: &AtomStore, id: &str) -> Result<ResolvedView, StoreError> {
    let record = store
        .container(id)
        .ok_or_else(|| StoreError::ContainerNotFound(id.to_string()))?;
    let atoms = store.atoms(id)?;
    Ok(resolve_atoms(record.identity_key, atoms))
}
