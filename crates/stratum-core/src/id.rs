//! Container and document identity grammar.
//!
//! Identifiers are colon-delimited 4–5 tuples:
//!
//! ```text
//! namespace:kind:identifier:version
//! namespace:kind:manufacturer:identifier:version
//! ```
//!
//! Examples:
//!
//! ```text
//! 0711:product:bosch:7736606982:v3
//! 0711:document:bosch:DS123:v1
//! acme:knowledge:heat-pumps:latest
//! ```
//!
//! Anything not matching this shape is *unqualified* and must be rewritten
//! (see [`crate::citation`]) before it is stored.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdError {
    #[error("invalid id shape `{0}`: expected 4 or 5 colon-delimited segments")]
    InvalidShape(String),
    #[error("empty segment in id `{0}`")]
    EmptySegment(String),
    #[error("unknown container kind `{0}`")]
    UnknownKind(String),
    #[error("invalid version segment `{0}`: expected `v<digits>` or `latest`")]
    InvalidVersion(String),
}

/// What kind of entity a container describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContainerKind {
    Product,
    Campaign,
    Project,
    Memory,
    Knowledge,
    /// Source documents cited by atoms (datasheets, catalogs).
    Document,
}

impl ContainerKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContainerKind::Product => "product",
            ContainerKind::Campaign => "campaign",
            ContainerKind::Project => "project",
            ContainerKind::Memory => "memory",
            ContainerKind::Knowledge => "knowledge",
            ContainerKind::Document => "document",
        }
    }
}

impl FromStr for ContainerKind {
    type Err = IdError;

    fn from_str(s: &str) -> Result<Self, IdError> {
        match s {
            "product" => Ok(ContainerKind::Product),
            "campaign" => Ok(ContainerKind::Campaign),
            "project" => Ok(ContainerKind::Project),
            "memory" => Ok(ContainerKind::Memory),
            "knowledge" => Ok(ContainerKind::Knowledge),
            "document" => Ok(ContainerKind::Document),
            other => Err(IdError::UnknownKind(other.to_string())),
        }
    }
}

impl fmt::Display for ContainerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Version segment: a concrete number (`v3`) or the floating `latest`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Version {
    Latest,
    Number(u32),
}

impl FromStr for Version {
    type Err = IdError;

    fn from_str(s: &str) -> Result<Self, IdError> {
        if s == "latest" {
            return Ok(Version::Latest);
        }
        let digits = s.strip_prefix('v').unwrap_or(s);
        if !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()) {
            digits
                .parse::<u32>()
                .map(Version::Number)
                .map_err(|_| IdError::InvalidVersion(s.to_string()))
        } else {
            Err(IdError::InvalidVersion(s.to_string()))
        }
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Version::Latest => f.write_str("latest"),
            Version::Number(n) => write!(f, "v{n}"),
        }
    }
}

/// Parsed container identity `(namespace, kind, [manufacturer], identifier, version)`.
///
/// The optional manufacturer segment qualifies product and document ids; the
/// 4-tuple form is used for namespace-local containers (projects, memories).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContainerKey {
    pub namespace: String,
    pub kind: ContainerKind,
    pub manufacturer: Option<String>,
    pub identifier: String,
    pub version: Version,
}

impl ContainerKey {
    pub fn new(
        namespace: impl Into<String>,
        kind: ContainerKind,
        manufacturer: Option<String>,
        identifier: impl Into<String>,
        version: Version,
    ) -> Self {
        Self {
            namespace: namespace.into(),
            kind,
            manufacturer,
            identifier: identifier.into(),
            version,
        }
    }

    pub fn parse(id: &str) -> Result<Self, IdError> {
        let parts: Vec<&str> = id.split(':').collect();
        if parts.len() != 4 && parts.len() != 5 {
            return Err(IdError::InvalidShape(id.to_string()));
        }
        if parts.iter().any(|p| p.is_empty()) {
            return Err(IdError::EmptySegment(id.to_string()));
        }

        let kind: ContainerKind = parts[1].parse()?;
        let version: Version = parts[parts.len() - 1].parse()?;
        let (manufacturer, identifier) = if parts.len() == 5 {
            (Some(parts[2].to_string()), parts[3].to_string())
        } else {
            (None, parts[2].to_string())
        };

        Ok(Self {
            namespace: parts[0].to_string(),
            kind,
            manufacturer,
            identifier,
            version,
        })
    }

    /// The stable identity of the container across versions: the id string
    /// with the version segment dropped. Store tables key on this.
    pub fn identity_key(&self) -> String {
        match &self.manufacturer {
            Some(m) => format!("{}:{}:{}:{}", self.namespace, self.kind, m, self.identifier),
            None => format!("{}:{}:{}", self.namespace, self.kind, self.identifier),
        }
    }

    /// Same key, floating version.
    pub fn latest(&self) -> Self {
        Self {
            version: Version::Latest,
            ..self.clone()
        }
    }

    pub fn with_version(&self, version: u32) -> Self {
        Self {
            version: Version::Number(version),
            ..self.clone()
        }
    }
}

impl fmt::Display for ContainerKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.identity_key(), self.version)
    }
}

/// Grammar check without constructing a key. Used by the citation normalizer
/// to decide pass-through vs. rewrite.
pub fn is_qualified(id: &str) -> bool {
    ContainerKey::parse(id).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_five_tuple_product_id() {
        let key = ContainerKey::parse("0711:product:bosch:7736606982:v3").unwrap();
        assert_eq!(key.namespace, "0711");
        assert_eq!(key.kind, ContainerKind::Product);
        assert_eq!(key.manufacturer.as_deref(), Some("bosch"));
        assert_eq!(key.identifier, "7736606982");
        assert_eq!(key.version, Version::Number(3));
        assert_eq!(key.to_string(), "0711:product:bosch:7736606982:v3");
    }

    #[test]
    fn parses_four_tuple_and_latest() {
        let key = ContainerKey::parse("acme:knowledge:heat-pumps:latest").unwrap();
        assert_eq!(key.manufacturer, None);
        assert_eq!(key.version, Version::Latest);
        assert_eq!(key.identity_key(), "acme:knowledge:heat-pumps");
    }

    #[test]
    fn rejects_bad_shapes() {
        assert!(ContainerKey::parse("datasheet.pdf").is_err());
        assert!(ContainerKey::parse("a:b").is_err());
        assert!(ContainerKey::parse("ns:product::id:v1").is_err());
        assert!(ContainerKey::parse("ns:gadget:x:v1").is_err());
        assert!(ContainerKey::parse("ns:product:x:vNaN").is_err());
        assert!(ContainerKey::parse("ns:product:a:b:c:v1").is_err());
    }

    #[test]
    fn qualification_check_matches_grammar() {
        assert!(is_qualified("0711:document:bosch:DS123:v1"));
        assert!(!is_qualified("DS123"));
        assert!(!is_qualified("bosch_datasheet_2024.pdf"));
    }

    #[test]
    fn latest_projection_keeps_identity() {
        let key = ContainerKey::parse("0711:product:bosch:7736606982:v3").unwrap();
        assert_eq!(key.latest().to_string(), "0711:product:bosch:7736606982:latest");
    }
}
