//! Stratum resolution layer.
//!
//! Read side of the atom store: given all atoms of a container, compute the
//! single canonical value per field path (the *merged view*) without losing
//! the audit trail of who asserted what and why one assertion won.
//!
//! - [`resolver`] — deterministic, total tie-break across competing layer
//!   assertions; winners plus shadowed atoms per field path.
//! - [`facade`] — read-only contract for external consumers: merged data,
//!   deduplicated citations, shadowed facts for audit display.
//! - [`verify`] — interpretation of externally produced chain proofs
//!   (verified vs. pending vs. unverified).
//! - [`inject`] — assembles resolved containers, citations, and proofs into
//!   a rendered context with a token estimate.

pub mod facade;
pub mod inject;
pub mod resolver;
pub mod verify;

#[cfg(test)]
mod tests;

pub use facade::ProvenanceFacade;
pub use inject::{inject, ContextFormat, InjectOptions, InjectedContainer, InjectedContext};
pub use resolver::{resolve, resolve_atoms, ResolvedField, ResolvedView};
pub use verify::evaluate_proof;
