//! Context injection: resolved containers packaged for LLM consumption.
//!
//! Pulls the merged view, citations, and chain proofs for a set of
//! containers, renders them (markdown or JSON), and reports an overall
//! `verified` flag that is true only if every requested container's proof is
//! individually verified. With verification enabled, an unverified proof
//! marks the *whole* context unverified — never silently downgraded to
//! "unverified-but-served".

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::warn;

use stratum_core::Citation;
use stratum_store::{AtomStore, ContainerRecord, StoreError};

use crate::facade::ProvenanceFacade;
use crate::verify::evaluate_proof;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContextFormat {
    Markdown,
    Json,
}

#[derive(Debug, Clone)]
pub struct InjectOptions {
    /// Container ids to inject (identity keys or fully-qualified ids).
    pub containers: Vec<String>,
    /// Evaluate chain proofs and gate the overall `verified` flag.
    pub verify: bool,
    pub include_citations: bool,
    pub format: ContextFormat,
    /// Truncate the rendered output to roughly this many tokens.
    pub max_tokens: Option<usize>,
    /// When set, proofs anchored on any other network count as unverified.
    pub network: Option<String>,
}

impl Default for InjectOptions {
    fn default() -> Self {
        Self {
            containers: Vec::new(),
            verify: true,
            include_citations: true,
            format: ContextFormat::Markdown,
            max_tokens: None,
            network: None,
        }
    }
}

/// One resolved container in the injected context.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InjectedContainer {
    pub record: ContainerRecord,
    pub merged: BTreeMap<String, Value>,
    /// Units per field path, kept separate so `merged` stays directly
    /// consumable.
    pub units: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InjectedContext {
    pub containers: Vec<InjectedContainer>,
    pub citations: Vec<Citation>,
    pub proofs: Vec<stratum_core::ChainProof>,
    /// Rendered representation, ready for prompt assembly.
    pub formatted: String,
    /// Rough size estimate (4 chars ≈ 1 token).
    pub token_estimate: usize,
    /// True only if every requested container's proof verified.
    pub verified: bool,
    pub verified_at: DateTime<Utc>,
}

/// Assemble an injected context from the store.
///
/// Containers that do not resolve are skipped with a warning, matching
/// ingestion's skip-don't-raise posture; an empty result is an unverified
/// empty context.
pub fn inject(store: &AtomStore, options: &InjectOptions) -> Result<InjectedContext, StoreError> {
    let facade = ProvenanceFacade::new(store);
    let mut containers = Vec::new();
    let mut citations = Vec::new();
    let mut proofs = Vec::new();

    for id in &options.containers {
        let Some(record) = store.container(id) else {
            warn!(container = %id, "container not found, skipping injection");
            continue;
        };

        let view = facade.resolved(id)?;
        let mut merged = BTreeMap::new();
        let mut units = BTreeMap::new();
        for (path, field) in &view.fields {
            merged.insert(path.clone(), field.winner.value.clone());
            if let Some(unit) = &field.winner.unit {
                units.insert(path.clone(), unit.clone());
            }
        }

        if options.include_citations {
            for citation in facade.citations(id)? {
                if !citations.contains(&citation) {
                    citations.push(citation);
                }
            }
        }

        if options.verify {
            proofs.push(evaluate_proof(
                &record.identity_key,
                store.proof(id).as_ref(),
                options.network.as_deref(),
            ));
        }

        containers.push(InjectedContainer {
            record,
            merged,
            units,
        });
    }

    let verified =
        options.verify && !containers.is_empty() && proofs.iter().all(|p| p.verified);

    let mut formatted = match options.format {
        ContextFormat::Markdown => {
            render_markdown(&containers, &citations, &proofs, options.include_citations)
        }
        ContextFormat::Json => render_json(&containers, &citations, &proofs),
    };
    if let Some(max_tokens) = options.max_tokens {
        let max_chars = max_tokens.saturating_mul(4);
        if formatted.len() > max_chars {
            let mut cut = max_chars;
            while !formatted.is_char_boundary(cut) {
                cut -= 1;
            }
            formatted.truncate(cut);
            formatted.push_str("\n\n[...truncated]");
        }
    }

    let token_estimate = formatted.len().div_ceil(4);
    Ok(InjectedContext {
        containers,
        citations,
        proofs,
        formatted,
        token_estimate,
        verified,
        verified_at: Utc::now(),
    })
}

fn render_markdown(
    containers: &[InjectedContainer],
    citations: &[Citation],
    proofs: &[stratum_core::ChainProof],
    include_citations: bool,
) -> String {
    let mut lines = Vec::new();
    lines.push("# Verified Context".to_string());
    lines.push(String::new());
    lines.push(format!("> {} container(s)", containers.len()));
    lines.push(String::new());

    for container in containers {
        let record = &container.record;
        lines.push(format!("## {}", record.meta.name));
        lines.push(String::new());
        lines.push(format!("**ID:** `{}`", record.full_id()));
        lines.push(format!(
            "**Type:** {} | **Version:** v{}",
            record.kind, record.version
        ));
        lines.push(String::new());

        if !container.merged.is_empty() {
            lines.push("### Data".to_string());
            lines.push(String::new());
            for (path, value) in &container.merged {
                let unit = container
                    .units
                    .get(path)
                    .map(|u| format!(" {u}"))
                    .unwrap_or_default();
                lines.push(format!("- **{path}**: {}{unit}", display_value(value)));
            }
            lines.push(String::new());
        }
    }

    if include_citations && !citations.is_empty() {
        lines.push("### Sources".to_string());
        lines.push(String::new());
        for citation in citations {
            let page = citation
                .page
                .map(|p| format!(" (p.{p})"))
                .unwrap_or_default();
            lines.push(format!(
                "- {}{page} [{:.2}]",
                citation.document_id, citation.confidence
            ));
        }
        lines.push(String::new());
    }

    if !proofs.is_empty() {
        lines.push("### Verification".to_string());
        lines.push(String::new());
        for proof in proofs {
            if proof.verified {
                let network = proof.network.as_deref().unwrap_or("unknown network");
                let block = proof
                    .block_number
                    .map(|b| format!(" (block {b})"))
                    .unwrap_or_default();
                lines.push(format!("- ✓ {}: anchored on {network}{block}", proof.container_id));
            } else {
                let reason = proof.reason.as_deref().unwrap_or("unverified");
                lines.push(format!("- ✗ {}: {reason}", proof.container_id));
            }
        }
        lines.push(String::new());
    }

    lines.join("\n")
}

fn render_json(
    containers: &[InjectedContainer],
    citations: &[Citation],
    proofs: &[stratum_core::ChainProof],
) -> String {
    let value = json!({
        "containers": containers
            .iter()
            .map(|c| json!({
                "id": c.record.full_id(),
                "name": c.record.meta.name,
                "data": c.merged,
                "units": c.units,
            }))
            .collect::<Vec<_>>(),
        "citations": citations,
        "proofs": proofs,
    });
    serde_json::to_string_pretty(&value).unwrap_or_default()
}

fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
