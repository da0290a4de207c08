//! Source-document model and section routing.
//!
//! Upstream producers hand us nested sections of named fields, each
//! optionally `{value, unit, citation: {document|source, page, quote|raw_value}}`.
//! Rather than branching on source shape, ingestion walks a fixed table of
//! [`SectionRoute`] descriptors: each known section routes to one designated
//! layer, and unknown sections are ignored. Fields lacking a `value` key,
//! `_meta` sentinels, and non-object entries are skipped — heterogeneous
//! documents routinely omit optional fields, and omission is never an error.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

use stratum_core::RawCitation;

/// Layer ids of the fixed import roster. The numeric prefix encodes
/// precedence: the manufacturer layer is evaluated first.
pub const LAYER_MANUFACTURER: &str = "000-manufacturer";
pub const LAYER_CLASSIFICATION: &str = "001-classification";
pub const LAYER_DATASHEET: &str = "002-datasheet";

/// Keys skipped while walking section fields.
const SENTINEL_KEYS: &[&str] = &["_meta"];

/// A source document as produced upstream (manufacturer exports, extraction
/// pipelines). Unknown top-level keys land in `sections` and are routed — or
/// ignored — by the descriptor table.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SourceDocument {
    /// Manufacturer part number; becomes the container identifier.
    pub identifier: String,
    pub manufacturer: String,
    #[serde(default)]
    pub identity: SourceIdentity,
    #[serde(default)]
    pub classification: Option<SourceClassification>,
    #[serde(flatten)]
    pub sections: BTreeMap<String, Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SourceIdentity {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description_short: Option<String>,
    #[serde(default)]
    pub description_long: Option<String>,
    #[serde(default)]
    pub brand: Option<String>,
    #[serde(default)]
    pub product_series: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SourceClassification {
    #[serde(default)]
    pub etim: Option<EtimClass>,
}

/// ETIM classification block (class-level facts, distinct from extracted
/// per-feature values).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EtimClass {
    pub class_code: String,
    #[serde(default)]
    pub class_name: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
}

/// Routes one named source section to its designated layer.
#[derive(Debug, Clone, Copy)]
pub struct SectionRoute {
    pub section: &'static str,
    pub layer_id: &'static str,
}

/// The fixed routing table: manufacturer spec sections go to the
/// manufacturer layer, AI-extracted classification features to the
/// datasheet-extraction layer. Class-level classification atoms are handled
/// separately (they belong to the classification authority's layer).
pub const SECTION_ROUTES: &[SectionRoute] = &[
    SectionRoute {
        section: "abmessungen",
        layer_id: LAYER_MANUFACTURER,
    },
    SectionRoute {
        section: "effizienz",
        layer_id: LAYER_MANUFACTURER,
    },
    SectionRoute {
        section: "leistung",
        layer_id: LAYER_MANUFACTURER,
    },
    SectionRoute {
        section: "etim",
        layer_id: LAYER_DATASHEET,
    },
];

/// One ingestable field extracted from a section.
#[derive(Debug, Clone)]
pub struct SourceField {
    /// Field key within the section; `{section}.{key}` becomes the atom's
    /// field path.
    pub key: String,
    /// Human-readable field name (`name` or `ef_code` in the source, the
    /// key as fallback).
    pub name: String,
    pub value: Value,
    pub unit: Option<String>,
    pub citation: Option<RawCitation>,
}

/// Walk a section's fields, keeping only records that carry a `value` key.
///
/// Skips are logged, never raised: sentinel keys, non-object entries, and
/// value-less records all produce zero fields.
pub fn section_fields(section: &str, raw: &Value) -> Vec<SourceField> {
    let Some(entries) = raw.as_object() else {
        if !raw.is_null() {
            warn!(section, "source section is not an object, skipping");
        }
        return Vec::new();
    };

    let mut fields = Vec::new();
    for (key, entry) in entries {
        if SENTINEL_KEYS.contains(&key.as_str()) {
            continue;
        }
        let Some(record) = entry.as_object() else {
            warn!(section, field = %key, "source field is not an object, skipping");
            continue;
        };
        let Some(value) = record.get("value") else {
            warn!(section, field = %key, "source field carries no value, skipping");
            continue;
        };

        let name = record
            .get("name")
            .or_else(|| record.get("ef_code"))
            .and_then(Value::as_str)
            .unwrap_or(key)
            .to_string();

        fields.push(SourceField {
            key: key.clone(),
            name,
            value: value.clone(),
            unit: record.get("unit").and_then(Value::as_str).map(str::to_string),
            citation: record.get("citation").map(RawCitation::from_value),
        });
    }
    fields
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn section_walk_skips_meta_and_valueless() {
        let section = json!({
            "_meta": {"extracted_at": "2026-02-10"},
            "cop": {"value": 4.5, "unit": "", "name": "COP"},
            "scop": {"note": "pending extraction"},
            "raw": "not an object"
        });
        let fields = section_fields("effizienz", &section);
        assert_eq!(fields.len(), 1);
        assert_eq!(fields[0].key, "cop");
        assert_eq!(fields[0].name, "COP");
    }

    #[test]
    fn field_name_falls_back_to_ef_code_then_key() {
        let section = json!({
            "ef000123": {"value": "55", "ef_code": "EF000123"},
            "width": {"value": 600}
        });
        let fields = section_fields("etim", &section);
        let by_key: BTreeMap<_, _> = fields.iter().map(|f| (f.key.as_str(), f)).collect();
        assert_eq!(by_key["ef000123"].name, "EF000123");
        assert_eq!(by_key["width"].name, "width");
    }

    #[test]
    fn non_object_section_yields_nothing() {
        assert!(section_fields("leistung", &json!(42)).is_empty());
        assert!(section_fields("leistung", &Value::Null).is_empty());
    }

    #[test]
    fn document_deserializes_with_flattened_sections() {
        let doc: SourceDocument = serde_json::from_value(json!({
            "identifier": "7736606982",
            "manufacturer": "bosch",
            "identity": {"name": "Compress 7000i AW"},
            "classification": {"etim": {"class_code": "EC012034", "class_name": "Luft/Wasser-Wärmepumpe"}},
            "effizienz": {"cop": {"value": 4.6}},
            "unknown_section": {"x": {"value": 1}}
        }))
        .unwrap();
        assert_eq!(doc.identifier, "7736606982");
        assert!(doc.sections.contains_key("effizienz"));
        assert!(doc.sections.contains_key("unknown_section"));
        assert_eq!(
            doc.classification.unwrap().etim.unwrap().class_code,
            "EC012034"
        );
    }
}
