//! Citation normalization.
//!
//! Source documents carry loosely-shaped citation records; this module
//! canonicalizes them into fully-qualified [`Citation`]s. Pure functions,
//! no errors: malformed or absent citation fields degrade to "no citation".

use serde_json::Value;

use crate::id::is_qualified;
use crate::model::Citation;

/// Confidence assigned when a citation exists but the source did not grade
/// it. No confidence is invented for uncited atoms.
pub const DEFAULT_CITATION_CONFIDENCE: f64 = 0.95;

/// Document-id prefixes grandfathered in from pre-grammar imports. Anything
/// else that fails the id grammar gets rewritten.
pub const LEGACY_DOCUMENT_PREFIXES: &[&str] = &["arge_"];

/// Loosely-typed citation record as it appears in source documents.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawCitation {
    pub document: Option<String>,
    pub source: Option<String>,
    pub page: Option<u32>,
    pub quote: Option<String>,
    pub raw_value: Option<String>,
}

impl RawCitation {
    /// Lenient extraction from arbitrary JSON. Non-object input, non-string
    /// documents, and out-of-range pages all degrade to absent fields.
    pub fn from_value(value: &Value) -> Self {
        let Some(obj) = value.as_object() else {
            return Self::default();
        };
        let str_field = |key: &str| obj.get(key).and_then(Value::as_str).map(str::to_string);
        Self {
            document: str_field("document"),
            source: str_field("source"),
            page: obj
                .get("page")
                .and_then(Value::as_u64)
                .and_then(|p| u32::try_from(p).ok()),
            quote: str_field("quote"),
            raw_value: str_field("raw_value"),
        }
    }

    fn document_ref(&self) -> Option<&str> {
        self.document.as_deref().or(self.source.as_deref())
    }
}

/// Canonicalize a raw citation under a container's namespace and
/// manufacturer.
///
/// - No `document`/`source` → no citation (the atom is uncited).
/// - Already qualified or legacy-prefixed → passed through unchanged.
/// - Otherwise rewritten to `{namespace}:document:{manufacturer}:{raw}:v1`.
/// - `quote` is preferred over `raw_value` when both are present.
pub fn normalize_citation(
    raw: &RawCitation,
    namespace: &str,
    manufacturer: &str,
) -> Option<Citation> {
    let doc = raw.document_ref()?;

    let document_id = if is_qualified(doc) || has_legacy_prefix(doc) {
        doc.to_string()
    } else {
        format!("{namespace}:document:{manufacturer}:{doc}:v1")
    };

    Some(Citation {
        document_id,
        page: raw.page,
        quote: raw.quote.clone().or_else(|| raw.raw_value.clone()),
        confidence: DEFAULT_CITATION_CONFIDENCE,
    })
}

fn has_legacy_prefix(doc: &str) -> bool {
    LEGACY_DOCUMENT_PREFIXES.iter().any(|p| doc.starts_with(p))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn bare_document_id_is_qualified() {
        let raw = RawCitation {
            document: Some("DS123".into()),
            page: Some(4),
            ..Default::default()
        };
        let citation = normalize_citation(&raw, "0711", "bosch").unwrap();
        assert_eq!(citation.document_id, "0711:document:bosch:DS123:v1");
        assert_eq!(citation.page, Some(4));
        assert_eq!(citation.confidence, DEFAULT_CITATION_CONFIDENCE);
    }

    #[test]
    fn qualified_document_id_passes_through() {
        let raw = RawCitation {
            document: Some("0711:document:bosch:DS123:v1".into()),
            ..Default::default()
        };
        let citation = normalize_citation(&raw, "0711", "bosch").unwrap();
        assert_eq!(citation.document_id, "0711:document:bosch:DS123:v1");
    }

    #[test]
    fn legacy_prefix_passes_through() {
        let raw = RawCitation {
            document: Some("arge_norm_2019.pdf".into()),
            ..Default::default()
        };
        let citation = normalize_citation(&raw, "0711", "bosch").unwrap();
        assert_eq!(citation.document_id, "arge_norm_2019.pdf");
    }

    #[test]
    fn absent_document_means_no_citation() {
        assert_eq!(normalize_citation(&RawCitation::default(), "0711", "bosch"), None);
        let only_page = RawCitation {
            page: Some(2),
            ..Default::default()
        };
        assert_eq!(normalize_citation(&only_page, "0711", "bosch"), None);
    }

    #[test]
    fn source_is_fallback_and_quote_beats_raw_value() {
        let raw = RawCitation {
            source: Some("DS9".into()),
            quote: Some("COP 4.5 at A7/W35".into()),
            raw_value: Some("4,5".into()),
            ..Default::default()
        };
        let citation = normalize_citation(&raw, "0711", "bosch").unwrap();
        assert_eq!(citation.document_id, "0711:document:bosch:DS9:v1");
        assert_eq!(citation.quote.as_deref(), Some("COP 4.5 at A7/W35"));
    }

    #[test]
    fn lenient_json_extraction_never_panics() {
        let raw = RawCitation::from_value(&json!({
            "document": 42,
            "page": "four",
            "quote": ["not", "a", "string"]
        }));
        assert_eq!(raw, RawCitation::default());

        let raw = RawCitation::from_value(&json!("just a string"));
        assert_eq!(raw, RawCitation::default());

        let raw = RawCitation::from_value(&json!({
            "source": "DS123",
            "page": 4,
            "raw_value": "55 kW"
        }));
        assert_eq!(raw.source.as_deref(), Some("DS123"));
        assert_eq!(raw.page, Some(4));
    }
}
