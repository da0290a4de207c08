//! Stratum atom store.
//!
//! Maintains verifiable, multi-source containers built from atomic facts
//! contributed at different trust levels:
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────┐
//! │                      ATOM STORE                            │
//! ├────────────────────────────────────────────────────────────┤
//! │                                                            │
//! │  source document ──► section routing ──► atom ingestion    │
//! │                                               │            │
//! │          namespaces / contributors (shared,   ▼            │
//! │          insert-if-absent)            layers + atoms       │
//! │                                               │            │
//! │          delete-then-recreate import          ▼            │
//! │          (one transaction per run)    recounted layers     │
//! │                                                            │
//! └────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Semantics
//!
//! - **Replace, never merge**: re-importing a container identity deletes the
//!   prior container and all dependent rows, then recreates everything from
//!   the source document. Re-running an import is safe and deterministic.
//! - **First writer wins** for layers; contributors and namespaces are
//!   insert-if-absent and never modified by later ingestions.
//! - **Denormalized provenance**: every atom copies trust level and
//!   contributor from its owning layer at ingestion time.
//! - **Single writer**: an import holds the store write lock for the whole
//!   run, so readers never observe a transiently empty or half-imported
//!   container and concurrent imports of the same identity are serialized.

pub mod source;

pub use source::SourceDocument;


use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};
use thiserror::Error;
use tracing::{debug, info};
use uuid::Uuid;

use stratum_core::{
    normalize_citation, Atom, AtomId, ChainProof, Citation, ContainerKey, ContainerKind,
    ContainerMeta, Contributor, IdError, Layer, SourceType, TrustLevel, ValueType, Version,
};

use source::{
    section_fields, LAYER_CLASSIFICATION, LAYER_DATASHEET, LAYER_MANUFACTURER, SECTION_ROUTES,
};

// ============================================================================
// Errors
// ============================================================================

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("container `{0}` not found")]
    ContainerNotFound(String),

    #[error("layer `{layer_id}` not found in container `{container_id}`")]
    LayerNotFound {
        container_id: String,
        layer_id: String,
    },

    #[error("empty field path for atom in layer `{layer_id}`")]
    EmptyFieldPath { layer_id: String },

    #[error("duplicate field path `{field_path}` in layer `{layer_id}` of container `{container_id}`")]
    DuplicateFieldPath {
        container_id: String,
        layer_id: String,
        field_path: String,
    },

    #[error("source document is missing `{0}`")]
    MissingSourceField(&'static str),

    #[error(transparent)]
    Id(#[from] IdError),

    /// Container-level import failure. The run's rows have been removed; the
    /// previously deleted container version is *not* restored — callers must
    /// treat the identity as consistent-but-empty until a successful
    /// re-import.
    #[error("import of container `{container_id}` failed at stage `{stage}`: {source}")]
    Import {
        container_id: String,
        stage: &'static str,
        #[source]
        source: Box<StoreError>,
    },
}

// ============================================================================
// Rows
// ============================================================================

/// Manufacturer namespace row, shared across containers. Insert-if-absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Namespace {
    pub name: String,
    pub display_name: String,
    pub verified: bool,
}

/// Container row: identity, current version, metadata, content hash of the
/// source document that produced it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContainerRecord {
    /// Version-free identity key, e.g. `0711:product:bosch:7736606982`.
    pub identity_key: String,
    pub namespace: String,
    pub kind: ContainerKind,
    pub manufacturer: String,
    pub identifier: String,
    pub version: u32,
    pub meta: ContainerMeta,
    /// SHA-256 of the canonical source document JSON.
    pub content_hash: String,
}

impl ContainerRecord {
    /// Fully-qualified id including the current version.
    pub fn full_id(&self) -> String {
        format!("{}:v{}", self.identity_key, self.version)
    }
}

/// Denormalized identity projection for fast lookup (manufacturer part
/// number, classification code).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IdentityProjection {
    pub container_id: String,
    pub identifier: String,
    pub manufacturer: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub class_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub class_name: Option<String>,
}

/// One import run, appended per successful `import_document`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommitRecord {
    pub container_id: String,
    pub version: u32,
    pub commit_hash: String,
    pub author: String,
    pub message: String,
    pub created_at: DateTime<Utc>,
}

/// Request shape for [`AtomStore::ensure_layer`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerSpec {
    pub layer_id: String,
    pub name: String,
    pub layer_type: SourceType,
    pub contributor_id: String,
    pub trust_level: TrustLevel,
}

/// Request shape for [`AtomStore::ingest_atom`]. Trust level, contributor,
/// and source type are *not* part of the input: they are copied from the
/// owning layer so they can never diverge from it.
#[derive(Debug, Clone)]
pub struct AtomInput {
    pub container_id: String,
    pub layer_id: String,
    pub field_path: String,
    pub field_name: String,
    pub value: Value,
    pub unit: Option<String>,
    pub commit_hash: String,
    pub citation: Option<Citation>,
}

/// Result of one import run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportSummary {
    /// Fully-qualified id including the imported version.
    pub container_id: String,
    pub version: u32,
    pub total_atoms: u64,
    pub per_layer_counts: BTreeMap<String, u64>,
}

/// Import configuration: the fixed namespace/kind the registry assigns plus
/// commit attribution.
#[derive(Debug, Clone)]
pub struct ImportConfig {
    pub namespace: String,
    pub kind: ContainerKind,
    pub author: String,
    /// Commit message; a summary line is generated when absent.
    pub message: Option<String>,
    /// Commit hash for this run; a monotonically comparable one is generated
    /// when absent.
    pub commit_hash: Option<String>,
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            namespace: "0711".to_string(),
            kind: ContainerKind::Product,
            author: "import".to_string(),
            message: None,
            commit_hash: None,
        }
    }
}

// ============================================================================
// Tables
// ============================================================================

/// Serializable snapshot of every table. The relational shape a registry
/// service would persist; the engine behind it is out of scope here.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoreSnapshot {
    namespaces: BTreeMap<String, Namespace>,
    contributors: BTreeMap<String, Contributor>,
    containers: BTreeMap<String, ContainerRecord>,
    identities: BTreeMap<String, IdentityProjection>,
    /// identity key → layer id → layer.
    layers: BTreeMap<String, BTreeMap<String, Layer>>,
    atoms: Vec<Atom>,
    commits: Vec<CommitRecord>,
    proofs: BTreeMap<String, ChainProof>,
}

impl StoreSnapshot {
    /// Resolve an id (identity key, or fully-qualified id whose version is
    /// `latest` or matches the live version) to its container row.
    fn find_container(&self, id: &str) -> Option<&ContainerRecord> {
        if let Some(rec) = self.containers.get(id) {
            return Some(rec);
        }
        let key = ContainerKey::parse(id).ok()?;
        let rec = self.containers.get(&key.identity_key())?;
        match key.version {
            Version::Latest => Some(rec),
            Version::Number(n) if n == rec.version => Some(rec),
            Version::Number(_) => None,
        }
    }

    /// Cascade-delete a container and every dependent row. Returns the
    /// deleted version, if the container existed. Shared contributor and
    /// namespace rows are left untouched.
    fn delete_container(&mut self, identity_key: &str) -> Option<u32> {
        let prior = self.containers.remove(identity_key)?;
        self.identities.remove(identity_key);
        self.layers.remove(identity_key);
        self.atoms.retain(|a| a.container_id != identity_key);
        self.commits.retain(|c| c.container_id != identity_key);
        self.proofs.remove(identity_key);
        Some(prior.version)
    }

    fn ensure_namespace(&mut self, name: &str, display_name: &str) -> Namespace {
        self.namespaces
            .entry(name.to_string())
            .or_insert_with(|| Namespace {
                name: name.to_string(),
                display_name: display_name.to_string(),
                verified: false,
            })
            .clone()
    }

    fn ensure_contributor(&mut self, contributor: Contributor) -> Contributor {
        self.contributors
            .entry(contributor.id.clone())
            .or_insert(contributor)
            .clone()
    }

    fn ensure_layer(
        &mut self,
        container_id: &str,
        spec: LayerSpec,
        commit_hash: &str,
    ) -> Result<Layer, StoreError> {
        let identity_key = self
            .find_container(container_id)
            .ok_or_else(|| StoreError::ContainerNotFound(container_id.to_string()))?
            .identity_key
            .clone();

        let layer = self
            .layers
            .entry(identity_key)
            .or_default()
            .entry(spec.layer_id.clone())
            .or_insert_with(|| Layer {
                layer_id: spec.layer_id,
                name: spec.name,
                layer_type: spec.layer_type,
                contributor_id: spec.contributor_id,
                trust_level: spec.trust_level,
                commit_hash: commit_hash.to_string(),
                atom_count: 0,
            });
        Ok(layer.clone())
    }

    fn insert_atom(&mut self, input: AtomInput) -> Result<AtomId, StoreError> {
        if input.field_path.trim().is_empty() {
            return Err(StoreError::EmptyFieldPath {
                layer_id: input.layer_id,
            });
        }

        let identity_key = self
            .find_container(&input.container_id)
            .ok_or_else(|| StoreError::ContainerNotFound(input.container_id.clone()))?
            .identity_key
            .clone();

        let layer = self
            .layers
            .get(&identity_key)
            .and_then(|ls| ls.get(&input.layer_id))
            .ok_or_else(|| StoreError::LayerNotFound {
                container_id: identity_key.clone(),
                layer_id: input.layer_id.clone(),
            })?
            .clone();

        // Field paths are unique within a layer; competing assertions live
        // in different layers.
        let duplicate = self.atoms.iter().any(|a| {
            a.container_id == identity_key
                && a.layer_id == input.layer_id
                && a.field_path == input.field_path
        });
        if duplicate {
            return Err(StoreError::DuplicateFieldPath {
                container_id: identity_key,
                layer_id: input.layer_id,
                field_path: input.field_path,
            });
        }

        let atom_id = Uuid::new_v4();
        let value_type = ValueType::of(&input.value);
        debug!(container = %identity_key, layer = %input.layer_id, field = %input.field_path, "ingesting atom");
        self.atoms.push(Atom {
            atom_id,
            container_id: identity_key,
            layer_id: input.layer_id,
            field_path: input.field_path,
            field_name: input.field_name,
            value: input.value,
            value_type,
            unit: input.unit,
            source_type: layer.layer_type,
            contributor_id: layer.contributor_id,
            trust_level: layer.trust_level,
            commit_hash: input.commit_hash,
            citation: input.citation,
            created_at: Utc::now(),
        });
        Ok(atom_id)
    }

    /// Recompute `atom_count` for every layer of a container from the live
    /// atom rows. Idempotent by construction.
    fn recount_atoms(&mut self, container_id: &str) -> Result<BTreeMap<String, u64>, StoreError> {
        let identity_key = self
            .find_container(container_id)
            .ok_or_else(|| StoreError::ContainerNotFound(container_id.to_string()))?
            .identity_key
            .clone();

        let mut counts: BTreeMap<String, u64> = BTreeMap::new();
        for atom in self.atoms.iter().filter(|a| a.container_id == identity_key) {
            *counts.entry(atom.layer_id.clone()).or_default() += 1;
        }

        if let Some(layers) = self.layers.get_mut(&identity_key) {
            for (layer_id, layer) in layers.iter_mut() {
                layer.atom_count = counts.get(layer_id).copied().unwrap_or(0);
                counts.entry(layer_id.clone()).or_default();
            }
        }
        Ok(counts)
    }
}

// ============================================================================
// Store
// ============================================================================

/// Thread-safe atom store. Reads take the shared lock and see a consistent
/// snapshot; imports take the exclusive lock for the whole run.
#[derive(Debug, Default)]
pub struct AtomStore {
    tables: RwLock<StoreSnapshot>,
}

impl AtomStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_snapshot(snapshot: StoreSnapshot) -> Self {
        Self {
            tables: RwLock::new(snapshot),
        }
    }

    pub fn snapshot(&self) -> StoreSnapshot {
        self.tables.read().clone()
    }

    // ------------------------------------------------------------------
    // EnsureExists operations (insert if absent, else return existing,
    // never modify)
    // ------------------------------------------------------------------

    pub fn ensure_namespace(&self, name: &str, display_name: &str) -> Namespace {
        self.tables.write().ensure_namespace(name, display_name)
    }

    pub fn ensure_contributor(&self, contributor: Contributor) -> Contributor {
        self.tables.write().ensure_contributor(contributor)
    }

    /// Insert a layer if absent. First writer wins: an existing layer's
    /// trust and type are never updated.
    pub fn ensure_layer(
        &self,
        container_id: &str,
        spec: LayerSpec,
        commit_hash: &str,
    ) -> Result<Layer, StoreError> {
        self.tables.write().ensure_layer(container_id, spec, commit_hash)
    }

    // ------------------------------------------------------------------
    // Atom ingestion
    // ------------------------------------------------------------------

    /// Ingest one atom. The container and layer must already exist; trust
    /// level, contributor, and source type are copied from the layer.
    /// Rejects a duplicate field path within the same layer.
    pub fn ingest_atom(&self, input: AtomInput) -> Result<AtomId, StoreError> {
        self.tables.write().insert_atom(input)
    }

    /// Recompute per-layer atom counts. Called once per import run, after
    /// all atoms are written; safe to call again at any time.
    pub fn recount_atoms(&self, container_id: &str) -> Result<BTreeMap<String, u64>, StoreError> {
        self.tables.write().recount_atoms(container_id)
    }

    // ------------------------------------------------------------------
    // Container import
    // ------------------------------------------------------------------

    /// Import a whole source document as one logical, re-runnable operation.
    ///
    /// An existing container with the same identity is deleted (cascade)
    /// first: the import is a replace, never a merge, and the version
    /// counter continues from the replaced row. On failure the run's rows
    /// are removed; the previously deleted container is *not* restored (the
    /// registry is consistent-but-empty for that identity until a
    /// successful re-import).
    pub fn import_document(
        &self,
        doc: &SourceDocument,
        cfg: &ImportConfig,
    ) -> Result<ImportSummary, StoreError> {
        if doc.identifier.trim().is_empty() {
            return Err(StoreError::MissingSourceField("identifier"));
        }
        if doc.manufacturer.trim().is_empty() {
            return Err(StoreError::MissingSourceField("manufacturer"));
        }

        let key = ContainerKey::new(
            &cfg.namespace,
            cfg.kind,
            Some(doc.manufacturer.clone()),
            &doc.identifier,
            Version::Latest,
        );
        let identity_key = key.identity_key();
        let commit_hash = cfg
            .commit_hash
            .clone()
            .unwrap_or_else(generate_commit_hash);

        let mut tables = self.tables.write();
        let prior_version = tables.delete_container(&identity_key);
        let version = prior_version.map_or(1, |v| v + 1);
        if let Some(prior) = prior_version {
            info!(container = %identity_key, prior_version = prior, "replacing existing container");
        }

        match run_import(&mut tables, doc, cfg, &identity_key, version, &commit_hash) {
            Ok(summary) => {
                info!(
                    container = %summary.container_id,
                    atoms = summary.total_atoms,
                    commit = %commit_hash,
                    "import complete"
                );
                Ok(summary)
            }
            Err((stage, err)) => {
                tables.delete_container(&identity_key);
                Err(StoreError::Import {
                    container_id: identity_key,
                    stage,
                    source: Box::new(err),
                })
            }
        }
    }

    /// Record an externally produced chain proof for a container. The store
    /// only keeps the result; anchoring itself happens elsewhere.
    pub fn record_proof(&self, proof: ChainProof) -> Result<(), StoreError> {
        let mut tables = self.tables.write();
        let identity_key = tables
            .find_container(&proof.container_id)
            .ok_or_else(|| StoreError::ContainerNotFound(proof.container_id.clone()))?
            .identity_key
            .clone();
        tables.proofs.insert(
            identity_key.clone(),
            ChainProof {
                container_id: identity_key,
                ..proof
            },
        );
        Ok(())
    }

    // ------------------------------------------------------------------
    // Read side
    // ------------------------------------------------------------------

    pub fn container(&self, id: &str) -> Option<ContainerRecord> {
        self.tables.read().find_container(id).cloned()
    }

    pub fn containers(&self) -> Vec<ContainerRecord> {
        self.tables.read().containers.values().cloned().collect()
    }

    pub fn identity(&self, id: &str) -> Option<IdentityProjection> {
        let tables = self.tables.read();
        let key = tables.find_container(id)?.identity_key.clone();
        tables.identities.get(&key).cloned()
    }

    /// Layers of a container in precedence order (lexical layer-id order).
    pub fn layers(&self, id: &str) -> Result<Vec<Layer>, StoreError> {
        let tables = self.tables.read();
        let key = tables
            .find_container(id)
            .ok_or_else(|| StoreError::ContainerNotFound(id.to_string()))?
            .identity_key
            .clone();
        Ok(tables
            .layers
            .get(&key)
            .map(|ls| ls.values().cloned().collect())
            .unwrap_or_default())
    }

    /// All live atoms of a container.
    pub fn atoms(&self, id: &str) -> Result<Vec<Atom>, StoreError> {
        let tables = self.tables.read();
        let key = tables
            .find_container(id)
            .ok_or_else(|| StoreError::ContainerNotFound(id.to_string()))?
            .identity_key
            .clone();
        Ok(tables
            .atoms
            .iter()
            .filter(|a| a.container_id == key)
            .cloned()
            .collect())
    }

    pub fn commits(&self, id: &str) -> Vec<CommitRecord> {
        let tables = self.tables.read();
        let Some(key) = tables.find_container(id).map(|c| c.identity_key.clone()) else {
            return Vec::new();
        };
        tables
            .commits
            .iter()
            .filter(|c| c.container_id == key)
            .cloned()
            .collect()
    }

    pub fn proof(&self, id: &str) -> Option<ChainProof> {
        let tables = self.tables.read();
        let key = tables.find_container(id)?.identity_key.clone();
        tables.proofs.get(&key).cloned()
    }

    pub fn contributor(&self, id: &str) -> Option<Contributor> {
        self.tables.read().contributors.get(id).cloned()
    }
}

// ============================================================================
// Import internals
// ============================================================================

type StageResult<T> = Result<T, (&'static str, StoreError)>;

fn stage(name: &'static str) -> impl FnOnce(StoreError) -> (&'static str, StoreError) {
    move |err| (name, err)
}

fn run_import(
    tables: &mut StoreSnapshot,
    doc: &SourceDocument,
    cfg: &ImportConfig,
    identity_key: &str,
    version: u32,
    commit_hash: &str,
) -> StageResult<ImportSummary> {
    let manufacturer = doc.manufacturer.as_str();

    // Namespace row for the manufacturer, insert-if-absent.
    let display_name = doc
        .identity
        .brand
        .clone()
        .unwrap_or_else(|| manufacturer.to_string());
    tables.ensure_namespace(manufacturer, &display_name);

    // Container row + denormalized identity projection.
    let name = doc
        .identity
        .name
        .clone()
        .unwrap_or_else(|| doc.identifier.clone());
    let mut meta = ContainerMeta::new(name, cfg.author.clone());
    meta.description = doc.identity.description_short.clone();

    let etim = doc.classification.as_ref().and_then(|c| c.etim.as_ref());
    tables.containers.insert(
        identity_key.to_string(),
        ContainerRecord {
            identity_key: identity_key.to_string(),
            namespace: cfg.namespace.clone(),
            kind: cfg.kind,
            manufacturer: manufacturer.to_string(),
            identifier: doc.identifier.clone(),
            version,
            meta,
            content_hash: content_hash(doc),
        },
    );
    tables.identities.insert(
        identity_key.to_string(),
        IdentityProjection {
            container_id: identity_key.to_string(),
            identifier: doc.identifier.clone(),
            manufacturer: manufacturer.to_string(),
            class_code: etim.map(|e| e.class_code.clone()),
            class_name: etim.and_then(|e| e.class_name.clone()),
        },
    );

    // Fixed contributor roster, insert-if-absent.
    for contributor in contributor_roster(manufacturer, &display_name, &cfg.namespace) {
        tables.ensure_contributor(contributor);
    }

    // Fixed ordered layer roster; precedence is encoded in the id prefix.
    for spec in layer_roster(manufacturer) {
        tables
            .ensure_layer(identity_key, spec, commit_hash)
            .map_err(stage("layers"))?;
    }

    let mut ingest = |layer_id: &str,
                      field_path: String,
                      field_name: String,
                      value: Value,
                      unit: Option<String>,
                      citation: Option<Citation>|
     -> StageResult<()> {
        tables
            .insert_atom(AtomInput {
                container_id: identity_key.to_string(),
                layer_id: layer_id.to_string(),
                field_path,
                field_name,
                value,
                unit,
                commit_hash: commit_hash.to_string(),
                citation,
            })
            .map_err(stage("atoms"))?;
        Ok(())
    };

    // Class-level classification atoms belong to the classification
    // authority's layer, not the extraction layer.
    if let Some(etim) = etim {
        ingest(
            LAYER_CLASSIFICATION,
            "etim.class_code".to_string(),
            "ETIM Klasse".to_string(),
            Value::String(etim.class_code.clone()),
            None,
            None,
        )?;
        if let Some(class_name) = &etim.class_name {
            ingest(
                LAYER_CLASSIFICATION,
                "etim.class_name".to_string(),
                "ETIM Klassenname".to_string(),
                Value::String(class_name.clone()),
                None,
                None,
            )?;
        }
        if let Some(version) = &etim.version {
            ingest(
                LAYER_CLASSIFICATION,
                "etim.version".to_string(),
                "ETIM Version".to_string(),
                Value::String(version.clone()),
                None,
                None,
            )?;
        }
    }

    // Routed sections: one atom per field that carries a value.
    for route in SECTION_ROUTES {
        let Some(raw) = doc.sections.get(route.section) else {
            continue;
        };
        for field in section_fields(route.section, raw) {
            let citation = field
                .citation
                .as_ref()
                .and_then(|raw| normalize_citation(raw, &cfg.namespace, manufacturer));
            ingest(
                route.layer_id,
                format!("{}.{}", route.section, field.key),
                field.name,
                field.value,
                field.unit,
                citation,
            )?;
        }
    }

    let per_layer_counts = tables
        .recount_atoms(identity_key)
        .map_err(stage("recount"))?;
    let total_atoms = per_layer_counts.values().sum();

    tables.commits.push(CommitRecord {
        container_id: identity_key.to_string(),
        version,
        commit_hash: commit_hash.to_string(),
        author: cfg.author.clone(),
        message: cfg
            .message
            .clone()
            .unwrap_or_else(|| format!("Imported {total_atoms} atoms from source document")),
        created_at: Utc::now(),
    });

    Ok(ImportSummary {
        container_id: format!("{identity_key}:v{version}"),
        version,
        total_atoms,
        per_layer_counts,
    })
}

/// Fixed contributor roster: manufacturer, classification authority, AI
/// extraction pipeline.
fn contributor_roster(
    manufacturer: &str,
    manufacturer_name: &str,
    namespace: &str,
) -> Vec<Contributor> {
    vec![
        Contributor {
            id: manufacturer.to_string(),
            name: manufacturer_name.to_string(),
            role: "manufacturer".to_string(),
            organization: manufacturer_name.to_string(),
        },
        Contributor {
            id: "etim-international".to_string(),
            name: "ETIM International".to_string(),
            role: "classifier".to_string(),
            organization: "ETIM".to_string(),
        },
        Contributor {
            id: "audit-pipeline".to_string(),
            name: "Audit Pipeline".to_string(),
            role: "ai_agent".to_string(),
            organization: namespace.to_string(),
        },
    ]
}

/// Fixed ordered layer roster. Manufacturer first, classification second,
/// AI extraction third; insertion order matches the id prefixes.
fn layer_roster(manufacturer: &str) -> Vec<LayerSpec> {
    vec![
        LayerSpec {
            layer_id: LAYER_MANUFACTURER.to_string(),
            name: "Manufacturer Original".to_string(),
            layer_type: SourceType::Manufacturer,
            contributor_id: manufacturer.to_string(),
            trust_level: TrustLevel::Highest,
        },
        LayerSpec {
            layer_id: LAYER_CLASSIFICATION.to_string(),
            name: "ETIM Klassifikation".to_string(),
            layer_type: SourceType::Classification,
            contributor_id: "etim-international".to_string(),
            trust_level: TrustLevel::High,
        },
        LayerSpec {
            layer_id: LAYER_DATASHEET.to_string(),
            name: "Datenblatt-Extraktion".to_string(),
            layer_type: SourceType::AiGenerated,
            contributor_id: "audit-pipeline".to_string(),
            trust_level: TrustLevel::Medium,
        },
    ]
}

/// Commit hashes sort lexically by run time, so the resolution tie-break
/// "greatest commit hash" picks the most recent ingestion run.
fn generate_commit_hash() -> String {
    format!("run-{:016x}", Utc::now().timestamp_millis())
}

fn content_hash(doc: &SourceDocument) -> String {
    let bytes = serde_json::to_vec(doc).unwrap_or_default();
    let digest = Sha256::digest(&bytes);
    format!("{digest:x}")
}
