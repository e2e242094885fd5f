//! Belief records - the durable output of consolidation
//!
//! A belief is created once by the consolidator and then mutated only through
//! two paths: evolution (confidence, evidence, version) and conflict
//! resolution (the superseded flag). Superseded beliefs are never deleted;
//! they stay in the network for audit but stop influencing propagation and
//! projection.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::signature::EmotionalSignature;

/// Source identities behind a belief. Sets, order-insensitive: the same
/// source reported twice contributes once.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BeliefSources {
    /// Sources whose feelings formed the belief.
    pub primary: BTreeSet<Uuid>,

    /// Sources that later reinforced it.
    pub supporting: BTreeSet<Uuid>,
}

/// Evidence trail behind a belief. Feeling ids are ordered by contribution
/// weight at formation time; later reinforcements append.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BeliefEvidence {
    pub feelings: Vec<Uuid>,
    pub contexts: Vec<Uuid>,
}

/// A consolidated, versioned belief.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Belief {
    pub id: Uuid,
    pub content: String,

    /// Current strength in [0,1]. Stored as of `last_updated`; passive decay
    /// on top of it is computed lazily via [`Belief::current_confidence`].
    pub confidence: f32,

    pub signature: EmotionalSignature,
    pub sources: BeliefSources,
    pub evidence: BeliefEvidence,

    pub formed_at: DateTime<Utc>,
    pub last_updated: DateTime<Utc>,

    /// Monotonically increasing; bumped on every evolution or merge.
    pub version: u32,

    /// Sensitivity to new evidence vs. inertia, in [0,1].
    pub adaptability: f32,

    /// Aggregated reliability of the contributing sources, ≥ 0.
    pub trust_score: f32,

    /// Set by conflict resolution. Terminal: a superseded belief is excluded
    /// from propagation and projection but retained for audit.
    pub superseded: bool,
}

impl Belief {
    /// Confidence at `now` under lazy passive decay:
    /// confidence(last_updated) × exp(−decay_rate · elapsed).
    ///
    /// Never mutates; callers that want to materialize the decayed value
    /// (e.g. the evolver) write it back together with a fresh `last_updated`.
    pub fn current_confidence(&self, now: DateTime<Utc>, decay_rate: f32) -> f32 {
        let ms = (now - self.last_updated).num_milliseconds();
        let elapsed = (ms.max(0) as f32) / 1000.0;
        (self.confidence * (-decay_rate * elapsed).exp()).max(0.0)
    }

    /// Competitive strength used by conflict resolution.
    pub fn strength(&self) -> f32 {
        self.confidence * self.trust_score
    }
}

/// What happened to a belief, from the persistence hook's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BeliefEvent {
    Formed,
    Evolved,
    Superseded,
}

/// Immutable copy handed to the persistence collaborator. Delivery is keyed
/// by (belief id, version, event): re-sending the same snapshot is safe.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BeliefSnapshot {
    pub event: BeliefEvent,
    pub belief: Belief,
}

impl BeliefSnapshot {
    pub fn new(event: BeliefEvent, belief: &Belief) -> Self {
        Self {
            event,
            belief: belief.clone(),
        }
    }

    /// Idempotency key for the persistence boundary. The event kind is part
    /// of the key because supersession reuses the version of the state it
    /// froze.
    pub fn key(&self) -> (Uuid, u32, BeliefEvent) {
        (self.belief.id, self.belief.version, self.event)
    }
}

/// Discovered relationship kinds between beliefs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationKind {
    Supports,
    Contradicts,
    Related,
}

/// A directed edge in the belief network. At most one edge exists per ordered
/// (source, target) pair; re-discovery overwrites it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BeliefRelation {
    pub source: Uuid,
    pub target: Uuid,
    pub kind: RelationKind,

    /// Influence strength in [0,1].
    pub strength: f32,
}
