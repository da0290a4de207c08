//! Stratum core: identity grammar and provenance data model.
//!
//! A *container* is a versioned bundle of atomic facts ("atoms") about one
//! entity, contributed by unequally-trusted sources organized into ordered
//! *layers*. This crate defines:
//!
//! - the colon-delimited identity grammar for containers and documents
//!   (`id`),
//! - the typed data model shared by the store and the resolution engine
//!   (`model`),
//! - the pure citation normalizer (`citation`).
//!
//! No I/O happens here; the store and resolver crates build on these types.

pub mod citation;
pub mod id;
pub mod model;

pub use citation::{normalize_citation, RawCitation, DEFAULT_CITATION_CONFIDENCE};
pub use id::{ContainerKey, ContainerKind, IdError, Version};
pub use model::{
    Atom, AtomId, ChainProof, Citation, ContainerMeta, Contributor, Layer, SourceType,
    TrustLevel, ValueType,
};
