//! Belief Consolidator - threshold-gated promotion of a cluster to a belief
//!
//! Scores a cluster's potential and, when it crosses the configured
//! threshold, emits a durable belief record. Not crossing the threshold is
//! the normal non-formation path, not an error. Consolidation is idempotent:
//! the belief id is derived from the member feeling ids, and every field is a
//! pure function of the cluster snapshot and the consolidation instant.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use doxa_core::squash::squash_unit;
use doxa_core::{
    Belief, BeliefEvidence, BeliefSources, DoxaConfig, EmotionalSignature,
};

use crate::cluster::FeelingCluster;

/// Namespace for deriving belief ids from cluster membership.
const BELIEF_NAMESPACE: Uuid = Uuid::from_u128(0x8f0c_42d1_7a5e_4b3c_9d26_315e_ab09_c4f7);

/// Cluster potential: totalWeight × coherence × |avgValence| × avgArousal.
///
/// Emotionally flat clusters (near-zero valence or arousal) score near zero
/// no matter how heavy they are - indifference does not consolidate.
pub fn evaluate(cluster: &FeelingCluster) -> f32 {
    cluster.total_weight
        * cluster.coherence
        * cluster.average_valence.abs()
        * cluster.average_arousal
}

/// Promote the cluster to a belief if its potential crosses the threshold.
pub fn consolidate(
    cluster: &FeelingCluster,
    now: DateTime<Utc>,
    config: &DoxaConfig,
) -> Option<Belief> {
    let potential = evaluate(cluster);
    if potential < config.tunables.belief_threshold {
        tracing::debug!(
            potential,
            threshold = config.tunables.belief_threshold,
            "Cluster below belief threshold"
        );
        return None;
    }

    let mut sources = BeliefSources::default();
    for member in &cluster.members {
        sources.primary.insert(member.source);
    }

    // Members arrive ordered by contribution strength descending; the
    // evidence list preserves that order.
    let mut evidence = BeliefEvidence::default();
    for member in &cluster.members {
        evidence.feelings.push(member.id);
        if !evidence.contexts.contains(&member.environment) {
            evidence.contexts.push(member.environment);
        }
        if !evidence.contexts.contains(&member.trigger) {
            evidence.contexts.push(member.trigger);
        }
    }

    let belief = Belief {
        id: belief_id(cluster),
        content: cluster.centroid_content.clone(),
        confidence: squash_unit(potential),
        signature: EmotionalSignature::new(cluster.average_valence, cluster.average_arousal),
        sources,
        evidence,
        formed_at: now,
        last_updated: now,
        version: 1,
        adaptability: adaptability(cluster, config),
        trust_score: trust_score(cluster, config),
        superseded: false,
    };

    tracing::info!(
        belief = %belief.id,
        potential,
        confidence = belief.confidence,
        members = cluster.len(),
        "Consolidated cluster into belief"
    );
    Some(belief)
}

/// Deterministic belief id: v5 over the ordered member feeling ids, so an
/// unchanged cluster snapshot always consolidates to the same identity.
fn belief_id(cluster: &FeelingCluster) -> Uuid {
    let mut bytes = Vec::with_capacity(cluster.members.len() * 16);
    for member in &cluster.members {
        bytes.extend_from_slice(member.id.as_bytes());
    }
    Uuid::new_v5(&BELIEF_NAMESPACE, &bytes)
}

/// Base adaptability, raised proportionally when member-weight variance
/// signals a volatile cluster. Variance of values in [0,1] is at most 0.25,
/// which normalizes the raise.
fn adaptability(cluster: &FeelingCluster, config: &DoxaConfig) -> f32 {
    let n = cluster.members.len() as f32;
    let mean = cluster.total_weight / n;
    let variance = cluster
        .members
        .iter()
        .map(|m| (m.strength - mean).powi(2))
        .sum::<f32>()
        / n;
    let volatility = (variance / 0.25).min(1.0);
    (config.tunables.base_adaptability + config.tunables.volatility_gain * volatility)
        .clamp(0.0, 1.0)
}

/// Strength-weighted mean of per-source trust values.
fn trust_score(cluster: &FeelingCluster, config: &DoxaConfig) -> f32 {
    if cluster.total_weight <= f32::EPSILON {
        return 1.0;
    }
    cluster
        .members
        .iter()
        .map(|m| m.strength * config.source_trust(&m.source))
        .sum::<f32>()
        / cluster.total_weight
}
