//! Personality Projector - folding belief changes into agent-level state
//!
//! Projection is a pure fold: each processed belief change produces a new
//! `PersonalityState` snapshot, never an in-place mutation of the caller's
//! prior one. Traits drift by an affinity-weighted contribution of the
//! belief's confidence × trust, and the emotional baseline follows belief
//! signatures as a confidence-weighted exponential moving average.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use doxa_core::{Belief, DoxaConfig, EmotionalSignature};

/// Agent-level personality snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersonalityState {
    /// Trait name → value in [0,1].
    pub traits: BTreeMap<String, f32>,

    /// Long-term emotional resting point.
    pub baseline: EmotionalSignature,
}

impl PersonalityState {
    /// Fresh state: every configured trait starts at its neutral midpoint.
    pub fn new(config: &DoxaConfig) -> Self {
        let traits = config
            .trait_specs()
            .iter()
            .map(|spec| (spec.name.clone(), 0.5))
            .collect();
        Self {
            traits,
            baseline: EmotionalSignature::neutral(),
        }
    }

    /// Top traits by value, strongest first.
    pub fn dominant_traits(&self, n: usize) -> Vec<(String, f32)> {
        let mut sorted: Vec<_> = self
            .traits
            .iter()
            .map(|(k, v)| (k.clone(), *v))
            .collect();
        sorted.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));
        sorted.truncate(n);
        sorted
    }
}

/// Fold one belief change into the personality. Superseded beliefs project
/// nothing - the prior snapshot is returned unchanged (cloned).
pub fn project(
    state: &PersonalityState,
    belief: &Belief,
    config: &DoxaConfig,
) -> PersonalityState {
    let mut next = state.clone();
    if belief.superseded {
        return next;
    }

    let contribution = belief.confidence * belief.trust_score;
    for spec in config.trait_specs() {
        let affinity = spec.affinity(belief.signature.valence, belief.signature.arousal);
        let entry = next.traits.entry(spec.name.clone()).or_insert(0.5);
        *entry = (*entry + affinity * contribution * config.tunables.trait_rate).clamp(0.0, 1.0);
    }

    // Baseline chases the belief's signature, harder for confident beliefs.
    let pull = (config.tunables.baseline_rate * belief.confidence).clamp(0.0, 1.0);
    next.baseline = next.baseline.lerp(&belief.signature, pull);

    next
}
