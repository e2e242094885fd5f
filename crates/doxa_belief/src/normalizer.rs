//! Signal Normalizer - validation, squashing, context weighting, decay
//!
//! The first stage of the pipeline. A raw feeling either becomes a valid
//! `Feeling` with every field inside its canonical range, or it is rejected
//! here and never enters the pipeline. Rejection is local to the signal, not
//! fatal to the agent.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use doxa_core::squash::{squash_signed, squash_unit};
use doxa_core::{DoxaConfig, EmotionalSignature, Feeling, RawFeeling, ValidationError};

/// Validate a raw feeling and squash its magnitudes into canonical ranges.
///
/// Weight and arousal land in [0,1], valence in [-1,1], through monotone
/// bounded maps - arbitrarily large or negative raw values cannot violate the
/// range invariants downstream.
pub fn ingest(raw: RawFeeling, now: DateTime<Utc>) -> Result<Feeling, ValidationError> {
    if raw.content.trim().is_empty() {
        return Err(ValidationError::EmptyContent);
    }
    if raw.source.is_nil() {
        return Err(ValidationError::NilSource);
    }
    if raw.created_at > now {
        return Err(ValidationError::FutureTimestamp(raw.created_at));
    }
    for (field, value) in [
        ("weight", raw.weight),
        ("valence", raw.valence),
        ("arousal", raw.arousal),
    ] {
        if !value.is_finite() {
            return Err(ValidationError::NonFinite { field });
        }
    }

    Ok(Feeling {
        id: Uuid::new_v4(),
        content: raw.content,
        weight: squash_unit(raw.weight),
        signature: EmotionalSignature::new(squash_signed(raw.valence), squash_unit(raw.arousal)),
        source: raw.source,
        context: raw.context,
        created_at: raw.created_at,
    })
}

/// Multiply the feeling's weight by its environment factor and the product of
/// its relationship-trust factors. Unknown ids degrade to a neutral 1.0 (the
/// lookup itself logs). The result is clamped back into [0,1] so an
/// environment factor above 1.0 cannot break the range invariant.
pub fn apply_context_weight(feeling: &mut Feeling, config: &DoxaConfig) {
    let mut factor = config.environment_weight(&feeling.context.environment);
    for relationship in &feeling.context.relationships {
        factor *= config.relationship_trust(relationship);
    }
    feeling.weight = (feeling.weight * factor).clamp(0.0, 1.0);
}

/// Drop feelings whose decayed strength fell below the pruning epsilon.
///
/// Pruning is silent - it is the normal end of a feeling's lifecycle when it
/// was never consolidated. Returns the number pruned.
pub fn prune_decayed(
    working_set: &mut BTreeMap<Uuid, Feeling>,
    now: DateTime<Utc>,
    config: &DoxaConfig,
) -> usize {
    let before = working_set.len();
    let rate = config.tunables.decay_rate;
    let epsilon = config.tunables.prune_epsilon;
    working_set.retain(|id, feeling| {
        let strength = feeling.current_strength(now, rate);
        if strength < epsilon {
            tracing::debug!(%id, strength, "Pruning decayed feeling");
            false
        } else {
            true
        }
    });
    before - working_set.len()
}
