//! Behavior patterns - trigger/response rules tracking their beliefs
//!
//! A pattern's confidence is never set directly; it is recomputed from the
//! current confidences of the beliefs it depends on, weighted by their trust.
//! Superseded dependencies stop counting, and a pattern whose dependencies
//! are all gone drops to zero rather than coasting on stale confidence.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use doxa_belief::BeliefNetwork;
use doxa_core::DoxaConfig;

/// A trigger → response rule conditioned on beliefs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BehaviorPattern {
    pub trigger: Uuid,
    pub response: Uuid,

    /// Derived from dependencies, in [0,1].
    pub confidence: f32,

    /// Belief ids this pattern is conditioned on, in declaration order.
    pub depends_on: Vec<Uuid>,
}

impl BehaviorPattern {
    pub fn new(trigger: Uuid, response: Uuid, depends_on: Vec<Uuid>) -> Self {
        Self {
            trigger,
            response,
            confidence: 0.0,
            depends_on,
        }
    }
}

/// Recompute the confidence of every pattern that depends on `changed`.
/// Pure: returns the updated pattern list, leaving the input untouched.
pub fn refresh_dependents(
    patterns: &[BehaviorPattern],
    changed: &Uuid,
    network: &BeliefNetwork,
    now: DateTime<Utc>,
    config: &DoxaConfig,
) -> Vec<BehaviorPattern> {
    patterns
        .iter()
        .map(|pattern| {
            if pattern.depends_on.contains(changed) {
                let mut next = pattern.clone();
                next.confidence = pattern_confidence(pattern, network, now, config);
                next
            } else {
                pattern.clone()
            }
        })
        .collect()
}

/// Trust-weighted average of the live dependencies' current (decayed)
/// confidences. No live dependencies → 0.
pub fn pattern_confidence(
    pattern: &BehaviorPattern,
    network: &BeliefNetwork,
    now: DateTime<Utc>,
    config: &DoxaConfig,
) -> f32 {
    let rate = config.tunables.decay_rate;
    let mut weighted = 0.0;
    let mut total = 0.0;

    for dep in &pattern.depends_on {
        let Some(belief) = network.get(dep) else {
            continue;
        };
        if belief.superseded {
            continue;
        }
        let trust = belief.trust_score.max(f32::EPSILON);
        weighted += trust * belief.current_confidence(now, rate);
        total += trust;
    }

    if total <= f32::EPSILON {
        tracing::debug!(
            trigger = %pattern.trigger,
            "Behavior pattern has no live dependencies, confidence 0"
        );
        0.0
    } else {
        (weighted / total).clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use doxa_core::{
        Belief, BeliefEvidence, BeliefSources, EmotionalSignature,
    };

    fn belief(confidence: f32, trust: f32) -> Belief {
        Belief {
            id: Uuid::new_v4(),
            content: "open doors lead somewhere good".to_string(),
            confidence,
            signature: EmotionalSignature::new(0.5, 0.5),
            sources: BeliefSources::default(),
            evidence: BeliefEvidence::default(),
            formed_at: Utc::now(),
            last_updated: Utc::now(),
            version: 1,
            adaptability: 0.3,
            trust_score: trust,
            superseded: false,
        }
    }

    #[test]
    fn test_confidence_is_trust_weighted_average() {
        let config = DoxaConfig::default();
        let now = Utc::now();
        let mut network = BeliefNetwork::new();
        let strong = belief(0.9, 1.0);
        let weak = belief(0.3, 1.0);
        let pattern =
            BehaviorPattern::new(Uuid::new_v4(), Uuid::new_v4(), vec![strong.id, weak.id]);
        network.insert(strong);
        network.insert(weak);

        let conf = pattern_confidence(&pattern, &network, now, &config);
        assert!((conf - 0.6).abs() < 0.01);
    }

    #[test]
    fn test_higher_trust_dominates() {
        let config = DoxaConfig::default();
        let now = Utc::now();
        let mut network = BeliefNetwork::new();
        let trusted = belief(0.9, 10.0);
        let doubted = belief(0.1, 0.1);
        let pattern =
            BehaviorPattern::new(Uuid::new_v4(), Uuid::new_v4(), vec![trusted.id, doubted.id]);
        network.insert(trusted);
        network.insert(doubted);

        let conf = pattern_confidence(&pattern, &network, now, &config);
        assert!(conf > 0.85);
    }

    #[test]
    fn test_superseded_dependency_excluded() {
        let config = DoxaConfig::default();
        let now = Utc::now();
        let mut network = BeliefNetwork::new();
        let live = belief(0.8, 1.0);
        let dead = belief(0.2, 1.0);
        let dead_id = dead.id;
        let pattern =
            BehaviorPattern::new(Uuid::new_v4(), Uuid::new_v4(), vec![live.id, dead_id]);
        network.insert(live);
        network.insert(dead);
        network.mark_superseded(&dead_id, now);

        let conf = pattern_confidence(&pattern, &network, now, &config);
        assert!((conf - 0.8).abs() < 0.01);
    }

    #[test]
    fn test_no_live_dependencies_drops_to_zero() {
        let config = DoxaConfig::default();
        let now = Utc::now();
        let mut network = BeliefNetwork::new();
        let dead = belief(0.9, 1.0);
        let dead_id = dead.id;
        let pattern = BehaviorPattern::new(Uuid::new_v4(), Uuid::new_v4(), vec![dead_id]);
        network.insert(dead);
        network.mark_superseded(&dead_id, now);

        assert_eq!(pattern_confidence(&pattern, &network, now, &config), 0.0);
    }

    #[test]
    fn test_refresh_touches_only_dependents() {
        let config = DoxaConfig::default();
        let now = Utc::now();
        let mut network = BeliefNetwork::new();
        let b = belief(0.9, 1.0);
        let b_id = b.id;
        network.insert(b);

        let dependent = BehaviorPattern::new(Uuid::new_v4(), Uuid::new_v4(), vec![b_id]);
        let mut unrelated =
            BehaviorPattern::new(Uuid::new_v4(), Uuid::new_v4(), vec![Uuid::new_v4()]);
        unrelated.confidence = 0.42;

        let refreshed =
            refresh_dependents(&[dependent, unrelated], &b_id, &network, now, &config);
        assert!(refreshed[0].confidence > 0.8);
        assert!((refreshed[1].confidence - 0.42).abs() < 1e-6);
    }
}
