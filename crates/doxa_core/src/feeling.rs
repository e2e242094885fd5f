//! Feeling signals - the transient input of the pipeline
//!
//! A raw feeling arrives from an already-authenticated submitter with
//! unbounded magnitudes. Ingestion validates and squashes it into a `Feeling`,
//! which then lives in the agent's working set until it either decays below
//! the pruning epsilon or is absorbed as evidence into a belief. After
//! absorption only its id survives, as an evidence reference.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::signature::EmotionalSignature;

/// Unvalidated input as submitted by the ingestion boundary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawFeeling {
    pub content: String,

    /// Raw magnitude, any finite value. Squashed into [0,1] at ingestion.
    pub weight: f32,

    /// Raw valence, any finite value. Squashed into [-1,1] at ingestion.
    pub valence: f32,

    /// Raw arousal, any finite value. Squashed into [0,1] at ingestion.
    pub arousal: f32,

    /// Identity of the submitter (authenticated upstream).
    pub source: Uuid,

    pub context: FeelingContext,

    pub created_at: DateTime<Utc>,
}

/// Where and why a feeling arose.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FeelingContext {
    pub environment: Uuid,
    pub trigger: Uuid,

    /// Relationships implicated in the signal, in submission order.
    /// Each id is looked up in the relationship-trust table during
    /// context weighting.
    pub relationships: Vec<Uuid>,
}

/// A validated, normalized, context-weighted signal.
///
/// `weight` already includes the environment and relationship-trust factors.
/// Temporal decay is NOT baked in - it is recomputed lazily from `created_at`
/// whenever the current strength is read, so repeated reads never compound.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Feeling {
    pub id: Uuid,
    pub content: String,
    pub weight: f32,
    pub signature: EmotionalSignature,
    pub source: Uuid,
    pub context: FeelingContext,
    pub created_at: DateTime<Utc>,
}

impl Feeling {
    /// Age in seconds at `now`. A clock that reads slightly behind
    /// `created_at` yields zero, never a negative age.
    pub fn age_secs(&self, now: DateTime<Utc>) -> f32 {
        let ms = (now - self.created_at).num_milliseconds();
        (ms.max(0) as f32) / 1000.0
    }

    /// Current decayed strength: weight × exp(−decay_rate · age).
    pub fn current_strength(&self, now: DateTime<Utc>, decay_rate: f32) -> f32 {
        self.weight * (-decay_rate * self.age_secs(now)).exp()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn feeling_with_weight(weight: f32) -> Feeling {
        Feeling {
            id: Uuid::new_v4(),
            content: "the corridor felt safe".to_string(),
            weight,
            signature: EmotionalSignature::new(0.5, 0.5),
            source: Uuid::new_v4(),
            context: FeelingContext::default(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_strength_at_zero_age() {
        let f = feeling_with_weight(0.8);
        let s = f.current_strength(f.created_at, 0.1);
        assert!((s - 0.8).abs() < 1e-6);
    }

    #[test]
    fn test_future_clock_reads_zero_age() {
        let f = feeling_with_weight(0.8);
        let earlier = f.created_at - chrono::Duration::seconds(30);
        assert!((f.current_strength(earlier, 0.1) - 0.8).abs() < 1e-6);
    }

    proptest! {
        #[test]
        fn prop_decay_monotone_nonincreasing(
            weight in 0.0f32..1.0,
            rate in 0.001f32..1.0,
            age1 in 0i64..10_000,
            extra in 0i64..10_000,
        ) {
            let f = feeling_with_weight(weight);
            let t1 = f.created_at + chrono::Duration::seconds(age1);
            let t2 = t1 + chrono::Duration::seconds(extra);
            prop_assert!(f.current_strength(t2, rate) <= f.current_strength(t1, rate) + 1e-6);
        }
    }
}
