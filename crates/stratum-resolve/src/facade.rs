//! Provenance query facade.
//!
//! Read-side contract for external consumers (registry API, verification
//! pipeline): merged data for direct consumption, citations for display,
//! shadowed facts for audit. Never mutates store state.

use std::collections::{BTreeMap, HashSet};

use serde_json::Value;

use stratum_core::{Atom, Citation};
use stratum_store::{AtomStore, StoreError};

use crate::resolver::{resolve, ResolvedView};

pub struct ProvenanceFacade<'a> {
    store: &'a AtomStore,
}

impl<'a> ProvenanceFacade<'a> {
    pub fn new(store: &'a AtomStore) -> Self {
        Self { store }
    }

    pub fn resolved(&self, container_id: &str) -> Result<ResolvedView, StoreError> {
        resolve(self.store, container_id)
    }

    /// Winners only, unit-stripped: `field_path -> value`.
    pub fn merged_data(&self, container_id: &str) -> Result<BTreeMap<String, Value>, StoreError> {
        let view = self.resolved(container_id)?;
        Ok(view
            .fields
            .into_iter()
            .map(|(path, field)| (path, field.winner.value))
            .collect())
    }

    /// Ordered citations, deduplicated by `(document_id, page, quote)`.
    /// Winners' citations come first (field-path order), then citations of
    /// shadowed atoms, so audit consumers see the full document set.
    pub fn citations(&self, container_id: &str) -> Result<Vec<Citation>, StoreError> {
        let view = self.resolved(container_id)?;
        let mut seen: HashSet<(String, Option<u32>, Option<String>)> = HashSet::new();
        let mut out = Vec::new();

        let mut push = |citation: &Citation| {
            let key = (
                citation.document_id.clone(),
                citation.page,
                citation.quote.clone(),
            );
            if seen.insert(key) {
                out.push(citation.clone());
            }
        };

        for field in view.fields.values() {
            if let Some(citation) = &field.winner.citation {
                push(citation);
            }
        }
        for field in view.fields.values() {
            for atom in &field.shadowed {
                if let Some(citation) = &atom.citation {
                    push(citation);
                }
            }
        }
        Ok(out)
    }

    /// Shadowed (overridden) atoms per field path. Paths with no competing
    /// assertions are omitted.
    pub fn shadowed(&self, container_id: &str) -> Result<BTreeMap<String, Vec<Atom>>, StoreError> {
        let view = self.resolved(container_id)?;
        Ok(view
            .fields
            .into_iter()
            .filter(|(_, field)| !field.shadowed.is_empty())
            .map(|(path, field)| (path, field.shadowed))
            .collect())
    }
}
