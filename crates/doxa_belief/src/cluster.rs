//! Cluster Builder - deterministic grouping of live feelings
//!
//! One clustering pass over the working set. Feelings are walked in a fixed
//! order (current strength descending, id ascending on ties) and greedily
//! attached to the most similar existing centroid, so an identical input set
//! under identical config always yields identical cluster membership and
//! ordering. Clusters live only within the pass; they are never persisted.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use doxa_core::{DoxaConfig, EmotionalSignature, Feeling, Similarity};

/// A member's contribution to a cluster, captured at pass time.
#[derive(Debug, Clone)]
pub struct ClusterMember {
    pub id: Uuid,
    pub source: Uuid,

    /// Decayed, context-weighted strength at the time of the pass.
    pub strength: f32,

    /// Similarity to the final centroid.
    pub similarity: f32,

    pub signature: EmotionalSignature,
    pub environment: Uuid,
    pub trigger: Uuid,
}

/// An ephemeral grouping of similar feelings.
#[derive(Debug, Clone)]
pub struct FeelingCluster {
    /// The member chosen as the cluster's representative.
    pub centroid_id: Uuid,
    pub centroid_content: String,

    /// Ordered by contribution strength descending, id ascending on ties.
    pub members: Vec<ClusterMember>,

    pub total_weight: f32,
    pub average_valence: f32,
    pub average_arousal: f32,

    /// 1 − normalized dispersion of member similarities to the centroid.
    pub coherence: f32,
}

impl FeelingCluster {
    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn member_ids(&self) -> Vec<Uuid> {
        self.members.iter().map(|m| m.id).collect()
    }
}

/// Group the active feelings into clusters.
///
/// Clusters smaller than `min_cluster_size` are discarded, not emitted; their
/// feelings stay in the working set and remain eligible for the next pass.
pub fn build_clusters(
    working_set: &BTreeMap<Uuid, Feeling>,
    now: DateTime<Utc>,
    config: &DoxaConfig,
    similarity: &dyn Similarity,
) -> Vec<FeelingCluster> {
    let rate = config.tunables.decay_rate;
    let threshold = config.tunables.similarity_threshold;

    // Fixed walk order: strength descending, feeling id ascending on ties.
    let mut ordered: Vec<(&Feeling, f32)> = working_set
        .values()
        .map(|f| (f, f.current_strength(now, rate)))
        .collect();
    ordered.sort_by(|(fa, sa), (fb, sb)| sb.total_cmp(sa).then(fa.id.cmp(&fb.id)));

    // Greedy assignment: best matching centroid wins; on equal similarity the
    // lowest cluster index wins because only a strictly better score replaces
    // the current best.
    let mut groups: Vec<(String, Vec<(&Feeling, f32)>)> = Vec::new();
    for (feeling, strength) in ordered {
        let mut best: Option<(usize, f32)> = None;
        for (idx, (centroid_content, _)) in groups.iter().enumerate() {
            let score = similarity.score(&feeling.content, centroid_content);
            if score >= threshold && best.map_or(true, |(_, b)| score > b) {
                best = Some((idx, score));
            }
        }
        match best {
            Some((idx, _)) => groups[idx].1.push((feeling, strength)),
            None => groups.push((feeling.content.clone(), vec![(feeling, strength)])),
        }
    }

    let mut clusters = Vec::new();
    for (_, members) in groups {
        if members.len() < config.tunables.min_cluster_size {
            tracing::debug!(
                size = members.len(),
                min = config.tunables.min_cluster_size,
                "Discarding undersized cluster; members stay active"
            );
            continue;
        }
        clusters.push(finalize(members, similarity));
    }
    clusters
}

/// Recompute the centroid as the strength-weighted representative of the
/// members, then derive the cluster aggregates against it.
fn finalize(members: Vec<(&Feeling, f32)>, similarity: &dyn Similarity) -> FeelingCluster {
    let total: f32 = members.iter().map(|(_, s)| s).sum();

    // Centroid: the member whose content maximizes the strength-weighted mean
    // similarity to all members. Ties break to the lowest feeling id.
    let mut centroid: Option<(&Feeling, f32)> = None;
    for (candidate, _) in &members {
        let mut score = 0.0;
        for (other, other_strength) in &members {
            score += *other_strength * similarity.score(&candidate.content, &other.content);
        }
        if total > f32::EPSILON {
            score /= total;
        }
        let better = match centroid {
            None => true,
            Some((current, best)) => {
                score > best || (score == best && candidate.id < current.id)
            }
        };
        if better {
            centroid = Some((*candidate, score));
        }
    }
    let (centroid_feeling, _) = centroid.expect("finalize called with empty member set");

    let cluster_members: Vec<ClusterMember> = members
        .iter()
        .map(|(f, strength)| ClusterMember {
            id: f.id,
            source: f.source,
            strength: *strength,
            similarity: similarity.score(&f.content, &centroid_feeling.content),
            signature: f.signature,
            environment: f.context.environment,
            trigger: f.context.trigger,
        })
        .collect();

    let (average_valence, average_arousal) = if total > f32::EPSILON {
        (
            cluster_members
                .iter()
                .map(|m| m.strength * m.signature.valence)
                .sum::<f32>()
                / total,
            cluster_members
                .iter()
                .map(|m| m.strength * m.signature.arousal)
                .sum::<f32>()
                / total,
        )
    } else {
        let n = cluster_members.len() as f32;
        (
            cluster_members.iter().map(|m| m.signature.valence).sum::<f32>() / n,
            cluster_members.iter().map(|m| m.signature.arousal).sum::<f32>() / n,
        )
    };

    FeelingCluster {
        centroid_id: centroid_feeling.id,
        centroid_content: centroid_feeling.content.clone(),
        coherence: coherence(&cluster_members),
        total_weight: total,
        average_valence,
        average_arousal,
        members: cluster_members,
    }
}

/// 1 − min(1, stddev(similarities) / 0.5). The divisor is the maximum
/// possible standard deviation of values in [0,1], so dispersion is
/// normalized before inversion: tight clusters approach 1, scattered ones
/// approach 0.
fn coherence(members: &[ClusterMember]) -> f32 {
    if members.len() < 2 {
        return 1.0;
    }
    let n = members.len() as f32;
    let mean = members.iter().map(|m| m.similarity).sum::<f32>() / n;
    let variance = members
        .iter()
        .map(|m| (m.similarity - mean).powi(2))
        .sum::<f32>()
        / n;
    1.0 - (variance.sqrt() / 0.5).min(1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use doxa_core::{FeelingContext, TokenJaccard};

    fn feeling(content: &str, weight: f32, valence: f32, created_at: DateTime<Utc>) -> Feeling {
        Feeling {
            id: Uuid::new_v4(),
            content: content.to_string(),
            weight,
            signature: EmotionalSignature::new(valence, 0.6),
            source: Uuid::new_v4(),
            context: FeelingContext::default(),
            created_at,
        }
    }

    fn working_set(feelings: Vec<Feeling>) -> BTreeMap<Uuid, Feeling> {
        feelings.into_iter().map(|f| (f.id, f)).collect()
    }

    #[test]
    fn test_similar_feelings_form_one_cluster() {
        let config = DoxaConfig::default();
        let now = Utc::now();
        let set = working_set(vec![
            feeling("the corridor is safe", 0.9, 0.8, now),
            feeling("the corridor is safe", 0.8, 0.7, now),
            feeling("the corridor is safe", 0.7, 0.9, now),
        ]);

        let clusters = build_clusters(&set, now, &config, &TokenJaccard);
        assert_eq!(clusters.len(), 1);
        assert_eq!(clusters[0].len(), 3);
        assert!(clusters[0].coherence > 0.9);
    }

    #[test]
    fn test_undersized_clusters_not_emitted() {
        let config = DoxaConfig::default();
        let now = Utc::now();
        let set = working_set(vec![
            feeling("alone in the dark", 0.9, -0.5, now),
            feeling("a completely different topic entirely", 0.9, 0.5, now),
        ]);

        let clusters = build_clusters(&set, now, &config, &TokenJaccard);
        assert!(clusters.is_empty());
    }

    #[test]
    fn test_single_feeling_never_clusters() {
        let config = DoxaConfig::default();
        let now = Utc::now();
        let set = working_set(vec![feeling("alone in the dark", 0.9, -0.5, now)]);
        assert!(build_clusters(&set, now, &config, &TokenJaccard).is_empty());
    }

    #[test]
    fn test_dissimilar_feelings_split_clusters() {
        let config = DoxaConfig::default();
        let now = Utc::now();
        let mut feelings = Vec::new();
        for _ in 0..3 {
            feelings.push(feeling("the corridor is safe", 0.9, 0.8, now));
        }
        for _ in 0..3 {
            feelings.push(feeling("markets fell sharply overnight", 0.9, -0.6, now));
        }
        let set = working_set(feelings);

        let clusters = build_clusters(&set, now, &config, &TokenJaccard);
        assert_eq!(clusters.len(), 2);
        assert!(clusters.iter().all(|c| c.len() == 3));
    }

    #[test]
    fn test_deterministic_membership_and_order() {
        let config = DoxaConfig::default();
        let now = Utc::now();
        let set = working_set(vec![
            feeling("the corridor is safe", 0.9, 0.8, now),
            feeling("the corridor is safe", 0.8, 0.7, now),
            feeling("the corridor is safe", 0.7, 0.9, now),
            feeling("markets fell sharply overnight", 0.9, -0.6, now),
            feeling("markets fell sharply overnight", 0.8, -0.5, now),
            feeling("markets fell sharply overnight", 0.7, -0.7, now),
        ]);

        let a = build_clusters(&set, now, &config, &TokenJaccard);
        let b = build_clusters(&set, now, &config, &TokenJaccard);

        assert_eq!(a.len(), b.len());
        for (ca, cb) in a.iter().zip(b.iter()) {
            assert_eq!(ca.member_ids(), cb.member_ids());
            assert_eq!(ca.centroid_id, cb.centroid_id);
            assert_eq!(ca.total_weight.to_bits(), cb.total_weight.to_bits());
            assert_eq!(ca.coherence.to_bits(), cb.coherence.to_bits());
        }
    }

    #[test]
    fn test_members_ordered_by_strength() {
        let config = DoxaConfig::default();
        let now = Utc::now();
        let set = working_set(vec![
            feeling("the corridor is safe", 0.5, 0.8, now),
            feeling("the corridor is safe", 0.9, 0.7, now),
            feeling("the corridor is safe", 0.7, 0.9, now),
        ]);

        let clusters = build_clusters(&set, now, &config, &TokenJaccard);
        let strengths: Vec<f32> = clusters[0].members.iter().map(|m| m.strength).collect();
        for pair in strengths.windows(2) {
            assert!(pair[0] >= pair[1]);
        }
    }

    #[test]
    fn test_decayed_strength_drives_ordering() {
        let config = DoxaConfig::default();
        let now = Utc::now();
        // Heavier but much older: decay should push it below the fresh one.
        let old = feeling(
            "the corridor is safe",
            0.9,
            0.8,
            now - chrono::Duration::minutes(40),
        );
        let fresh = feeling("the corridor is safe", 0.6, 0.7, now);
        let third = feeling("the corridor is safe", 0.3, 0.9, now);
        let fresh_id = fresh.id;
        let set = working_set(vec![old, fresh, third]);

        let clusters = build_clusters(&set, now, &config, &TokenJaccard);
        assert_eq!(clusters[0].members[0].id, fresh_id);
    }
}
