//! End-to-end tests for resolution, facade, verification, and injection.

use chrono::Utc;
use proptest::prelude::*;
use serde_json::json;
use uuid::Uuid;

use stratum_core::{
    Atom, ChainProof, Citation, SourceType, TrustLevel, ValueType,
    DEFAULT_CITATION_CONFIDENCE,
};
use stratum_store::{AtomStore, AtomInput, ImportConfig, SourceDocument};

use crate::facade::ProvenanceFacade;
use crate::inject::{inject, ContextFormat, InjectOptions};
use crate::resolver::resolve_atoms;
use crate::verify::evaluate_proof;

fn atom(
    field_path: &str,
    layer_id: &str,
    trust: TrustLevel,
    commit: &str,
    cited: bool,
    value: serde_json::Value,
) -> Atom {
    Atom {
        atom_id: Uuid::new_v4(),
        container_id: "0711:product:bosch:7736606982".to_string(),
        layer_id: layer_id.to_string(),
        field_path: field_path.to_string(),
        field_name: field_path.to_string(),
        value_type: ValueType::of(&value),
        value,
        unit: None,
        source_type: SourceType::Manufacturer,
        contributor_id: "bosch".to_string(),
        trust_level: trust,
        commit_hash: commit.to_string(),
        citation: cited.then(|| Citation {
            document_id: "0711:document:bosch:DS123:v1".to_string(),
            page: Some(4),
            quote: None,
            confidence: DEFAULT_CITATION_CONFIDENCE,
        }),
        created_at: Utc::now(),
    }
}

// ----------------------------------------------------------------------
// Resolution tie-break order
// ----------------------------------------------------------------------

#[test]
fn higher_trust_beats_citation() {
    // A highest-trust uncited assertion beats a medium-trust cited one.
    let atoms = vec![
        atom("effizienz.cop", "002-datasheet", TrustLevel::Medium, "run-1", true, json!(4.2)),
        atom("effizienz.cop", "000-manufacturer", TrustLevel::Highest, "run-1", false, json!(4.6)),
    ];
    let view = resolve_atoms("c", atoms);
    let winner = view.winner("effizienz.cop").unwrap();
    assert_eq!(winner.trust_level, TrustLevel::Highest);
    assert_eq!(winner.value, json!(4.6));
    assert_eq!(view.shadowed("effizienz.cop").len(), 1);
}

#[test]
fn earlier_layer_wins_on_trust_tie() {
    let atoms = vec![
        atom("leistung.max", "003-later", TrustLevel::High, "run-1", true, json!(8)),
        atom("leistung.max", "001-earlier", TrustLevel::High, "run-1", false, json!(7)),
    ];
    let view = resolve_atoms("c", atoms);
    assert_eq!(view.winner("leistung.max").unwrap().layer_id, "001-earlier");
}

#[test]
fn citation_wins_on_trust_and_layer_tie() {
    let atoms = vec![
        atom("p.x", "001-a", TrustLevel::High, "run-1", false, json!(1)),
        atom("p.x", "001-a", TrustLevel::High, "run-1", true, json!(2)),
    ];
    let view = resolve_atoms("c", atoms);
    assert!(view.winner("p.x").unwrap().citation.is_some());
}

#[test]
fn greatest_commit_hash_wins_last() {
    let atoms = vec![
        atom("p.x", "001-a", TrustLevel::High, "run-0000000001", true, json!("old")),
        atom("p.x", "001-a", TrustLevel::High, "run-0000000002", true, json!("new")),
    ];
    let view = resolve_atoms("c", atoms);
    assert_eq!(view.winner("p.x").unwrap().value, json!("new"));
}

#[test]
fn resolution_is_input_order_independent() {
    let atoms = vec![
        atom("a.x", "000-m", TrustLevel::Highest, "run-1", false, json!(1)),
        atom("a.x", "001-c", TrustLevel::High, "run-1", true, json!(2)),
        atom("a.x", "002-d", TrustLevel::Medium, "run-2", true, json!(3)),
        atom("b.y", "002-d", TrustLevel::Medium, "run-2", false, json!(4)),
    ];
    let mut reversed = atoms.clone();
    reversed.reverse();
    assert_eq!(resolve_atoms("c", atoms), resolve_atoms("c", reversed));
}

proptest! {
    /// The tie-break is total: any atom set resolves identically however
    /// the input is permuted, and repeated calls agree.
    #[test]
    fn resolution_is_deterministic(
        specs in prop::collection::vec(
            (
                prop::sample::select(vec!["a.x", "a.y", "b.z"]),
                prop::sample::select(vec!["000-m", "001-c", "002-d"]),
                prop::sample::select(vec![
                    TrustLevel::Low,
                    TrustLevel::Medium,
                    TrustLevel::High,
                    TrustLevel::Highest,
                ]),
                prop::sample::select(vec!["run-1", "run-2", "run-3"]),
                any::<bool>(),
                0u32..100,
            ),
            1..24,
        )
    ) {
        let atoms: Vec<Atom> = specs
            .into_iter()
            .map(|(path, layer, trust, commit, cited, v)| {
                atom(path, layer, trust, commit, cited, json!(v))
            })
            .collect();

        let mut shuffled = atoms.clone();
        shuffled.rotate_left(atoms.len() / 2);
        shuffled.reverse();

        let first = resolve_atoms("c", atoms.clone());
        let second = resolve_atoms("c", atoms);
        let third = resolve_atoms("c", shuffled);
        prop_assert_eq!(&first, &second);
        prop_assert_eq!(&first, &third);
    }
}

// ----------------------------------------------------------------------
// Store-integrated resolution and facade
// ----------------------------------------------------------------------

fn seeded_store() -> (AtomStore, String) {
    let store = AtomStore::new();
    let doc: SourceDocument = serde_json::from_value(json!({
        "identifier": "7736606982",
        "manufacturer": "bosch",
        "identity": {"name": "Compress 7000i AW"},
        "effizienz": {
            "cop": {"value": 4.6, "unit": "", "name": "COP"}
        },
        "abmessungen": {
            "hoehe": {"value": 1380, "unit": "mm", "name": "Höhe",
                      "citation": {"document": "DS123", "page": 4}}
        }
    }))
    .unwrap();
    let summary = store.import_document(&doc, &ImportConfig::default()).unwrap();
    (store, summary.container_id)
}

#[test]
fn manufacturer_layer_shadows_ai_extraction() {
    let (store, id) = seeded_store();
    // Competing AI-extracted assertion for the same field path, cited.
    store
        .ingest_atom(AtomInput {
            container_id: id.clone(),
            layer_id: "002-datasheet".to_string(),
            field_path: "effizienz.cop".to_string(),
            field_name: "COP".to_string(),
            value: json!(4.2),
            unit: None,
            commit_hash: "run-later".to_string(),
            citation: Some(Citation {
                document_id: "0711:document:bosch:DS123:v1".to_string(),
                page: Some(7),
                quote: Some("COP 4,2".to_string()),
                confidence: DEFAULT_CITATION_CONFIDENCE,
            }),
        })
        .unwrap();

    let facade = ProvenanceFacade::new(&store);
    let merged = facade.merged_data(&id).unwrap();
    assert_eq!(merged["effizienz.cop"], json!(4.6));

    let shadowed = facade.shadowed(&id).unwrap();
    assert_eq!(shadowed["effizienz.cop"].len(), 1);
    assert_eq!(shadowed["effizienz.cop"][0].value, json!(4.2));
    // Shadowed paths never leak into the merged map beyond their winner.
    assert_eq!(merged.len(), 2);
}

#[test]
fn citations_are_ordered_and_deduplicated() {
    let (store, id) = seeded_store();
    store
        .ingest_atom(AtomInput {
            container_id: id.clone(),
            layer_id: "002-datasheet".to_string(),
            field_path: "abmessungen.hoehe".to_string(),
            field_name: "Höhe".to_string(),
            value: json!(1380),
            unit: Some("mm".to_string()),
            commit_hash: "run-later".to_string(),
            // Same document reference as the winner: must dedupe.
            citation: Some(Citation {
                document_id: "0711:document:bosch:DS123:v1".to_string(),
                page: Some(4),
                quote: None,
                confidence: DEFAULT_CITATION_CONFIDENCE,
            }),
        })
        .unwrap();

    let facade = ProvenanceFacade::new(&store);
    let citations = facade.citations(&id).unwrap();
    assert_eq!(citations.len(), 1);
    assert_eq!(citations[0].document_id, "0711:document:bosch:DS123:v1");
}

// ----------------------------------------------------------------------
// Proof interpretation
// ----------------------------------------------------------------------

#[test]
fn pending_proof_is_not_verified() {
    let proof = ChainProof {
        container_id: "c".to_string(),
        tx_hash: Some("0xabc".to_string()),
        block_number: None,
        ..Default::default()
    };
    let report = evaluate_proof("c", Some(&proof), None);
    assert!(!report.verified);
    assert!(report.reason.as_deref().unwrap().contains("pending"));
}

#[test]
fn anchored_proof_is_verified() {
    let proof = ChainProof {
        container_id: "c".to_string(),
        network: Some("base-mainnet".to_string()),
        tx_hash: Some("0xabc".to_string()),
        block_number: Some(100),
        ..Default::default()
    };
    let report = evaluate_proof("c", Some(&proof), None);
    assert!(report.verified);
    assert!(report.verified_at.is_some());
    assert_eq!(report.reason, None);
}

#[test]
fn network_mismatch_is_unverified() {
    let proof = ChainProof {
        container_id: "c".to_string(),
        network: Some("base-sepolia".to_string()),
        tx_hash: Some("0xabc".to_string()),
        block_number: Some(100),
        ..Default::default()
    };
    let report = evaluate_proof("c", Some(&proof), Some("base-mainnet"));
    assert!(!report.verified);
    assert!(report.reason.as_deref().unwrap().contains("base-sepolia"));

    let matching = evaluate_proof("c", Some(&proof), Some("base-sepolia"));
    assert!(matching.verified);
}

#[test]
fn missing_proof_is_unverified() {
    let report = evaluate_proof("c", None, None);
    assert!(!report.verified);
    assert_eq!(report.reason.as_deref(), Some("no chain proof recorded"));
}

// ----------------------------------------------------------------------
// Injection
// ----------------------------------------------------------------------

#[test]
fn injection_without_proof_is_unverified() {
    let (store, id) = seeded_store();
    let context = inject(
        &store,
        &InjectOptions {
            containers: vec![id],
            ..Default::default()
        },
    )
    .unwrap();

    assert!(!context.verified);
    assert_eq!(context.proofs.len(), 1);
    assert_eq!(context.containers.len(), 1);
    assert!(context.formatted.starts_with("# Verified Context"));
    assert!(context.formatted.contains("effizienz.cop"));
    assert!(context.token_estimate > 0);
}

#[test]
fn injection_verifies_only_when_every_proof_does() {
    let (store, id) = seeded_store();
    store
        .record_proof(ChainProof {
            container_id: id.clone(),
            verified: false,
            network: Some("base-mainnet".to_string()),
            tx_hash: Some("0xabc".to_string()),
            block_number: Some(100),
            ..Default::default()
        })
        .unwrap();

    let context = inject(
        &store,
        &InjectOptions {
            containers: vec![id.clone()],
            ..Default::default()
        },
    )
    .unwrap();
    assert!(context.verified);

    // Second requested container without proof poisons the whole context.
    let doc: SourceDocument = serde_json::from_value(json!({
        "identifier": "other",
        "manufacturer": "bosch",
        "leistung": {"p": {"value": 1}}
    }))
    .unwrap();
    let other = store.import_document(&doc, &ImportConfig::default()).unwrap();
    let context = inject(
        &store,
        &InjectOptions {
            containers: vec![id, other.container_id],
            ..Default::default()
        },
    )
    .unwrap();
    assert!(!context.verified);
}

#[test]
fn injection_skips_unknown_containers() {
    let store = AtomStore::new();
    let context = inject(
        &store,
        &InjectOptions {
            containers: vec!["0711:product:bosch:nope".to_string()],
            ..Default::default()
        },
    )
    .unwrap();
    assert!(context.containers.is_empty());
    assert!(!context.verified);
}

#[test]
fn injection_respects_token_budget_and_json_format() {
    let (store, id) = seeded_store();
    let context = inject(
        &store,
        &InjectOptions {
            containers: vec![id.clone()],
            max_tokens: Some(10),
            ..Default::default()
        },
    )
    .unwrap();
    assert!(context.formatted.ends_with("[...truncated]"));
    assert!(context.formatted.len() <= 40 + "\n\n[...truncated]".len());

    let context = inject(
        &store,
        &InjectOptions {
            containers: vec![id],
            format: ContextFormat::Json,
            verify: false,
            ..Default::default()
        },
    )
    .unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&context.formatted).unwrap();
    assert!(parsed["containers"][0]["data"]["effizienz.cop"].is_number());
    assert!(context.proofs.is_empty());
}
