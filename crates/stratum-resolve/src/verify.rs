//! Chain proof interpretation.
//!
//! Anchoring happens in an external pipeline; the store only holds its
//! result. This module applies the interpretation rule: a proof is verified
//! only when both `tx_hash` and `block_number` are present (and, when a
//! network is requested, the proof was anchored on that network). A
//! `tx_hash` without a `block_number` is *pending*, never verified.

use chrono::Utc;

use stratum_core::ChainProof;

/// Evaluate the recorded proof for a container into a report with a definite
/// `verified` flag and, when unverified, a reason. Never errors: a missing
/// or incomplete proof is an unverified report, not a failure.
pub fn evaluate_proof(
    container_id: &str,
    proof: Option<&ChainProof>,
    expected_network: Option<&str>,
) -> ChainProof {
    let now = Utc::now();

    let Some(proof) = proof else {
        return ChainProof {
            container_id: container_id.to_string(),
            verified: false,
            verified_at: Some(now),
            reason: Some("no chain proof recorded".to_string()),
            ..Default::default()
        };
    };

    let mut report = ChainProof {
        container_id: container_id.to_string(),
        verified_at: Some(now),
        reason: None,
        verified: false,
        ..proof.clone()
    };

    if let Some(expected) = expected_network {
        match proof.network.as_deref() {
            Some(network) if network == expected => {}
            Some(network) => {
                report.reason = Some(format!(
                    "proof anchored on `{network}`, expected `{expected}`"
                ));
                return report;
            }
            None => {
                report.reason = Some(format!("proof has no network, expected `{expected}`"));
                return report;
            }
        }
    }

    if proof.tx_hash.is_none() {
        report.reason = Some("no anchoring transaction recorded".to_string());
    } else if proof.is_pending() {
        report.reason = Some("anchoring transaction pending, no block number yet".to_string());
    } else {
        report.verified = true;
    }
    report
}
