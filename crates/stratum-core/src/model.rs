//! Typed data model for the layered atom store.
//!
//! The relational shape mirrors what a registry service would persist:
//! containers own ordered layers, layers own atoms, contributors are global,
//! chain proofs are externally produced verification records that the core
//! only interprets.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// Unique identifier for an atom row. Fresh per ingestion, never reused
/// across re-imports.
pub type AtomId = Uuid;

/// Trust ranking of a layer. Ordering is semantic: `Highest > High > Medium
/// > Low`, and resolution uses it as the primary tie-break.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum TrustLevel {
    Low,
    Medium,
    High,
    Highest,
}

impl TrustLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            TrustLevel::Low => "low",
            TrustLevel::Medium => "medium",
            TrustLevel::High => "high",
            TrustLevel::Highest => "highest",
        }
    }
}

impl fmt::Display for TrustLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where a fact came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceType {
    Manufacturer,
    Classification,
    AiGenerated,
    Catalog,
    User,
}

impl fmt::Display for SourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SourceType::Manufacturer => "manufacturer",
            SourceType::Classification => "classification",
            SourceType::AiGenerated => "ai_generated",
            SourceType::Catalog => "catalog",
            SourceType::User => "user",
        };
        f.write_str(s)
    }
}

/// Runtime type of an atom value, captured at ingestion time so consumers
/// can interpret the stored JSON without re-sniffing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueType {
    String,
    Number,
    Boolean,
    Object,
    Array,
    Null,
}

impl ValueType {
    pub fn of(value: &Value) -> Self {
        match value {
            Value::String(_) => ValueType::String,
            Value::Number(_) => ValueType::Number,
            Value::Bool(_) => ValueType::Boolean,
            Value::Object(_) => ValueType::Object,
            Value::Array(_) => ValueType::Array,
            Value::Null => ValueType::Null,
        }
    }
}

/// Global, container-independent contributor identity. Created
/// insert-if-absent on first reference and never overwritten afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contributor {
    pub id: String,
    pub name: String,
    pub role: String,
    pub organization: String,
}

/// A named, trust-ranked source of facts within a container.
///
/// `layer_id` carries a numeric prefix (`000-`, `001-`, ...) encoding
/// precedence: lexically smaller means evaluated first and wins trust ties.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Layer {
    pub layer_id: String,
    pub name: String,
    pub layer_type: SourceType,
    pub contributor_id: String,
    pub trust_level: TrustLevel,
    pub commit_hash: String,
    /// Cached live atom count. Recomputed after every ingestion batch,
    /// never incrementally trusted.
    pub atom_count: u64,
}

/// A reference to the source document backing an atom.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Citation {
    /// Always fully qualified (`ns:document:manufacturer:id:vN`) or an
    /// allow-listed legacy form; never a bare filename.
    pub document_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quote: Option<String>,
    pub confidence: f64,
}

/// One field's asserted value plus full provenance.
///
/// `trust_level` and `contributor_id` are copied from the owning layer at
/// ingestion time (denormalized for query efficiency) and only change via
/// re-ingestion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Atom {
    pub atom_id: AtomId,
    /// Identity key of the owning container (version-free form).
    pub container_id: String,
    pub layer_id: String,
    /// Dot-qualified field address, e.g. `effizienz.cop`. Unique within a
    /// layer; may repeat across layers as competing assertions.
    pub field_path: String,
    pub field_name: String,
    pub value: Value,
    pub value_type: ValueType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    pub source_type: SourceType,
    pub contributor_id: String,
    pub trust_level: TrustLevel,
    pub commit_hash: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub citation: Option<Citation>,
    pub created_at: DateTime<Utc>,
}

/// Container metadata (display-facing, not part of the identity).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContainerMeta {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub author: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
}

impl ContainerMeta {
    pub fn new(name: impl Into<String>, author: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            name: name.into(),
            description: None,
            author: author.into(),
            created_at: now,
            updated_at: now,
            tags: Vec::new(),
        }
    }
}

/// Externally produced verification record for a container.
///
/// Interpretation rule: `verified = true` requires both `tx_hash` and
/// `block_number`. A `tx_hash` without a `block_number` is *pending*, never
/// verified.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChainProof {
    pub container_id: String,
    pub verified: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub network: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub batch_id: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tx_hash: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub block_number: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verified_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl ChainProof {
    /// Whether the anchoring record itself is complete. `tx_hash` present
    /// with `block_number` absent denotes "pending", never "verified".
    pub fn is_anchored(&self) -> bool {
        self.tx_hash.is_some() && self.block_number.is_some()
    }

    pub fn is_pending(&self) -> bool {
        self.tx_hash.is_some() && self.block_number.is_none()
    }
}
