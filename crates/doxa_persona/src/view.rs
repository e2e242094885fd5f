//! Read-only projected views for the query boundary

use serde::{Deserialize, Serialize};

use doxa_core::EmotionalSignature;

use crate::behavior::BehaviorPattern;
use crate::projector::PersonalityState;

/// Immutable view of an agent's externally observable state. Published as a
/// whole after each pipeline step; readers never see a partial update.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersonalityView {
    pub traits: Vec<(String, f32)>,
    pub baseline: EmotionalSignature,
    pub patterns: Vec<BehaviorPattern>,
    pub active_beliefs: usize,
}

impl PersonalityView {
    pub fn of(
        state: &PersonalityState,
        patterns: &[BehaviorPattern],
        active_beliefs: usize,
    ) -> Self {
        Self {
            traits: state
                .traits
                .iter()
                .map(|(name, value)| (name.clone(), *value))
                .collect(),
            baseline: state.baseline,
            patterns: patterns.to_vec(),
            active_beliefs,
        }
    }
}
