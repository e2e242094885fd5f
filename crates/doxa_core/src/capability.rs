//! Pluggable capabilities at the pipeline's seams
//!
//! The engine fixes only the range contracts: similarity scores live in
//! [0,1], relation strengths in [0,1]. How they are computed - embeddings,
//! lexical overlap, an external model - is a deployment choice. The default
//! implementations here are deterministic and dependency-free so the
//! pipeline's determinism guarantees hold out of the box.

use async_trait::async_trait;

use crate::belief::{Belief, BeliefSnapshot, RelationKind};

/// Semantic similarity between two content strings, in [0,1].
pub trait Similarity: Send + Sync {
    fn score(&self, a: &str, b: &str) -> f32;
}

/// Default similarity: Jaccard overlap of lowercased token sets.
///
/// A placeholder for an embedding-backed capability; good enough to make
/// near-identical phrasings cluster and unrelated content stay apart.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokenJaccard;

impl Similarity for TokenJaccard {
    fn score(&self, a: &str, b: &str) -> f32 {
        let a_tokens: std::collections::HashSet<String> = a
            .split_whitespace()
            .map(|t| t.to_lowercase())
            .collect();
        let b_tokens: std::collections::HashSet<String> = b
            .split_whitespace()
            .map(|t| t.to_lowercase())
            .collect();

        if a_tokens.is_empty() && b_tokens.is_empty() {
            return 1.0;
        }

        let intersection = a_tokens.intersection(&b_tokens).count() as f32;
        let union = a_tokens.union(&b_tokens).count() as f32;

        if union == 0.0 {
            return 0.0;
        }

        intersection / union
    }
}

/// Relation discovery between two beliefs: may propose at most one directed
/// edge (kind, strength ∈ [0,1]) per ordered pair.
pub trait RelationDiscovery: Send + Sync {
    fn propose(&self, from: &Belief, to: &Belief) -> Option<(RelationKind, f32)>;
}

/// Default relation discovery: content similarity decides whether beliefs
/// are connected at all, valence agreement decides the kind.
#[derive(Debug, Clone, Copy)]
pub struct AffectAlignedRelations {
    /// Similarity below this proposes no edge.
    pub relate_floor: f32,

    /// Valence magnitudes below this are treated as sign-neutral.
    pub dead_zone: f32,
}

impl Default for AffectAlignedRelations {
    fn default() -> Self {
        Self {
            relate_floor: 0.3,
            dead_zone: 0.1,
        }
    }
}

impl AffectAlignedRelations {
    fn classify(&self, sim: f32, va: f32, vb: f32) -> (RelationKind, f32) {
        let agreement = 1.0 - (va - vb).abs() / 2.0;
        if va.abs() < self.dead_zone || vb.abs() < self.dead_zone {
            (RelationKind::Related, (sim * 0.5).clamp(0.0, 1.0))
        } else if (va > 0.0) == (vb > 0.0) {
            (RelationKind::Supports, (sim * agreement).clamp(0.0, 1.0))
        } else {
            (RelationKind::Contradicts, (sim * (1.0 - agreement)).clamp(0.0, 1.0))
        }
    }
}

impl RelationDiscovery for AffectAlignedRelations {
    fn propose(&self, from: &Belief, to: &Belief) -> Option<(RelationKind, f32)> {
        let sim = TokenJaccard.score(&from.content, &to.content);
        if sim < self.relate_floor {
            return None;
        }
        Some(self.classify(sim, from.signature.valence, to.signature.valence))
    }
}

/// External persistence collaborator. Receives immutable snapshots whenever a
/// belief is formed, evolved, or superseded. Storage, minting, and
/// access-control semantics live entirely on the other side of this trait;
/// the core only promises that re-delivering the same (id, version) is safe.
#[async_trait]
pub trait BeliefSink: Send + Sync {
    async fn persist(&self, snapshot: BeliefSnapshot) -> anyhow::Result<()>;
}
