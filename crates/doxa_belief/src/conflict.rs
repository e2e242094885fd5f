//! Conflict Resolver - selection or synthesis between competing beliefs
//!
//! Two active beliefs conflict when they talk about the same thing with
//! opposing valence. Resolution is a pure function of the two snapshots and
//! always yields a result: strengths within the resolution epsilon merge into
//! a synthesized belief; otherwise the stronger side survives unchanged and
//! the weaker is marked superseded. Inputs are ordered canonically first, so
//! resolve(a, b) and resolve(b, a) produce content-equivalent outcomes.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use doxa_core::{Belief, DoxaConfig, EmotionalSignature, Similarity};

/// Whether two beliefs compete: similar content, opposing valence.
/// Superseded beliefs never conflict - they already lost.
pub fn in_conflict(
    a: &Belief,
    b: &Belief,
    similarity: &dyn Similarity,
    config: &DoxaConfig,
) -> bool {
    if a.superseded || b.superseded || a.id == b.id {
        return false;
    }
    let dead_zone = config.tunables.conflict_dead_zone;
    let va = a.signature.valence;
    let vb = b.signature.valence;
    if va.abs() < dead_zone || vb.abs() < dead_zone || (va > 0.0) == (vb > 0.0) {
        return false;
    }
    similarity.score(&a.content, &b.content) >= config.tunables.similarity_threshold
}

/// Outcome of resolving one conflict.
#[derive(Debug, Clone)]
pub enum Resolution {
    /// Strengths were within the resolution epsilon: a synthesized belief
    /// replaces the stronger side's node; the weaker side is superseded.
    Merged { merged: Belief, superseded: Uuid },

    /// One side dominated: it survives unchanged, the other is superseded.
    Selected { winner: Uuid, superseded: Uuid },
}

impl Resolution {
    pub fn superseded_id(&self) -> Uuid {
        match self {
            Resolution::Merged { superseded, .. } => *superseded,
            Resolution::Selected { superseded, .. } => *superseded,
        }
    }
}

/// Resolve a conflict between two belief snapshots.
pub fn resolve(a: &Belief, b: &Belief, now: DateTime<Utc>, config: &DoxaConfig) -> Resolution {
    // Canonical order: strength descending, id ascending on ties. Everything
    // after this point only sees (stronger, weaker), which is what makes the
    // operation symmetric in its arguments.
    let (stronger, weaker) = if b.strength() > a.strength()
        || (b.strength() == a.strength() && b.id < a.id)
    {
        (b, a)
    } else {
        (a, b)
    };

    if (stronger.strength() - weaker.strength()).abs() < config.tunables.resolution_epsilon {
        let merged = synthesize(stronger, weaker, now);
        tracing::info!(
            merged = %merged.id,
            superseded = %weaker.id,
            "Conflict within resolution epsilon, synthesized merge"
        );
        Resolution::Merged {
            merged,
            superseded: weaker.id,
        }
    } else {
        tracing::info!(
            winner = %stronger.id,
            superseded = %weaker.id,
            "Conflict resolved by selection"
        );
        Resolution::Selected {
            winner: stronger.id,
            superseded: weaker.id,
        }
    }
}

/// Build the merged belief. Keeps the stronger side's identity and content so
/// existing edges and behavior-pattern dependencies stay valid.
fn synthesize(stronger: &Belief, weaker: &Belief, now: DateTime<Utc>) -> Belief {
    let mut merged = stronger.clone();

    merged.confidence = stronger.confidence.max(weaker.confidence);
    merged.signature = EmotionalSignature::weighted_mean(
        &stronger.signature,
        stronger.confidence,
        &weaker.signature,
        weaker.confidence,
    );

    // Evidence union: stronger side's trail first, then the weaker side's,
    // deduplicated while preserving first occurrence.
    for id in &weaker.evidence.feelings {
        if !merged.evidence.feelings.contains(id) {
            merged.evidence.feelings.push(*id);
        }
    }
    for id in &weaker.evidence.contexts {
        if !merged.evidence.contexts.contains(id) {
            merged.evidence.contexts.push(*id);
        }
    }
    merged.sources.primary.extend(weaker.sources.primary.iter().copied());
    merged
        .sources
        .supporting
        .extend(weaker.sources.supporting.iter().copied());

    merged.version = stronger.version.max(weaker.version) + 1;
    merged.adaptability = stronger.adaptability.max(weaker.adaptability);
    merged.trust_score = stronger.trust_score.max(weaker.trust_score);
    merged.formed_at = stronger.formed_at.min(weaker.formed_at);
    merged.last_updated = now;
    merged.superseded = false;
    merged
}
