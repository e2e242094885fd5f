//! Belief Network - arena of beliefs plus an ordered-pair edge index
//!
//! Beliefs influence each other, and the influence graph is inherently
//! cyclic. The network therefore owns every belief in an id-keyed arena and
//! keeps adjacency as an explicit (source, target) → relation index instead
//! of object-to-object links: ownership stays in one place, propagation stays
//! bounded and auditable. BTree maps give deterministic iteration, which the
//! pipeline's reproducibility guarantees lean on.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use uuid::Uuid;

use doxa_core::{Belief, BeliefRelation, DoxaConfig, RelationDiscovery};

#[derive(Debug, Default, Clone)]
pub struct BeliefNetwork {
    nodes: BTreeMap<Uuid, Belief>,
    edges: BTreeMap<(Uuid, Uuid), BeliefRelation>,
}

impl BeliefNetwork {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn get(&self, id: &Uuid) -> Option<&Belief> {
        self.nodes.get(id)
    }

    pub fn edge(&self, source: &Uuid, target: &Uuid) -> Option<&BeliefRelation> {
        self.edges.get(&(*source, *target))
    }

    /// All beliefs, superseded included (audit view).
    pub fn beliefs(&self) -> impl Iterator<Item = &Belief> {
        self.nodes.values()
    }

    /// Beliefs still eligible for propagation and projection.
    pub fn active(&self) -> impl Iterator<Item = &Belief> {
        self.nodes.values().filter(|b| !b.superseded)
    }

    /// Insert or overwrite a node without touching edges.
    pub fn insert(&mut self, belief: Belief) {
        self.nodes.insert(belief.id, belief);
    }

    /// Mark a belief superseded, returning a copy of its final state.
    /// The node and its edges are retained for audit.
    pub fn mark_superseded(&mut self, id: &Uuid, now: DateTime<Utc>) -> Option<Belief> {
        let belief = self.nodes.get_mut(id)?;
        belief.superseded = true;
        belief.last_updated = now;
        Some(belief.clone())
    }

    /// Insert the belief and discover its relationships against every other
    /// active belief, in both directions. Each ordered pair holds at most one
    /// edge; re-discovery overwrites rather than accumulates.
    pub fn integrate(&mut self, belief: Belief, discovery: &dyn RelationDiscovery) {
        let id = belief.id;
        self.nodes.insert(id, belief);

        let mut proposals: Vec<BeliefRelation> = Vec::new();
        let new = &self.nodes[&id];
        for other in self.nodes.values() {
            if other.id == id || other.superseded {
                continue;
            }
            if let Some((kind, strength)) = discovery.propose(new, other) {
                proposals.push(BeliefRelation {
                    source: id,
                    target: other.id,
                    kind,
                    strength: strength.clamp(0.0, 1.0),
                });
            }
            if let Some((kind, strength)) = discovery.propose(other, new) {
                proposals.push(BeliefRelation {
                    source: other.id,
                    target: id,
                    kind,
                    strength: strength.clamp(0.0, 1.0),
                });
            }
        }

        for relation in proposals {
            self.edges
                .insert((relation.source, relation.target), relation);
        }
    }

    /// Outgoing edges of one node.
    pub fn outgoing(&self, id: &Uuid) -> impl Iterator<Item = &BeliefRelation> {
        self.edges
            .range((*id, Uuid::nil())..=(*id, Uuid::max()))
            .map(|(_, relation)| relation)
    }

    /// Breadth-first confidence propagation out of `changed`.
    ///
    /// Each reached belief is adjusted once by
    /// edge.strength × delta × damping^hop and joins the next frontier. The
    /// walk stops at `max_hops` no matter what - the hop bound, not cycle
    /// detection, is the termination guarantee. Superseded beliefs neither
    /// receive nor relay adjustments. Returns the adjusted ids in visit
    /// order.
    pub fn propagate(
        &mut self,
        changed: Uuid,
        delta: f32,
        now: DateTime<Utc>,
        config: &DoxaConfig,
    ) -> Vec<Uuid> {
        let damping = config.tunables.damping;
        let max_hops = config.tunables.max_hops;

        let mut visited: BTreeSet<Uuid> = BTreeSet::new();
        visited.insert(changed);
        let mut frontier = vec![changed];
        let mut touched = Vec::new();

        for hop in 1..=max_hops {
            let attenuation = delta * damping.powi(hop as i32);
            let mut next = Vec::new();

            for node in &frontier {
                let targets: Vec<(Uuid, f32)> = self
                    .outgoing(node)
                    .map(|r| (r.target, r.strength))
                    .collect();
                for (target, strength) in targets {
                    if !visited.insert(target) {
                        continue;
                    }
                    let Some(belief) = self.nodes.get_mut(&target) else {
                        continue;
                    };
                    if belief.superseded {
                        continue;
                    }
                    belief.confidence =
                        (belief.confidence + strength * attenuation).clamp(0.0, 1.0);
                    belief.last_updated = now;
                    touched.push(target);
                    next.push(target);
                }
            }

            if next.is_empty() {
                break;
            }
            frontier = next;
        }

        touched
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use doxa_core::{
        AffectAlignedRelations, BeliefEvidence, BeliefSources, EmotionalSignature, RelationKind,
    };

    fn belief(content: &str, confidence: f32, valence: f32) -> Belief {
        Belief {
            id: Uuid::new_v4(),
            content: content.to_string(),
            confidence,
            signature: EmotionalSignature::new(valence, 0.6),
            sources: BeliefSources::default(),
            evidence: BeliefEvidence::default(),
            formed_at: Utc::now(),
            last_updated: Utc::now(),
            version: 1,
            adaptability: 0.3,
            trust_score: 1.0,
            superseded: false,
        }
    }

    fn edge(network: &mut BeliefNetwork, source: Uuid, target: Uuid, strength: f32) {
        let relation = BeliefRelation {
            source,
            target,
            kind: RelationKind::Supports,
            strength,
        };
        network.edges.insert((source, target), relation);
    }

    #[test]
    fn test_integrate_discovers_both_directions() {
        let mut network = BeliefNetwork::new();
        let a = belief("the corridor is safe and bright", 0.8, 0.6);
        let b = belief("the corridor is safe and warm", 0.7, 0.5);
        let (a_id, b_id) = (a.id, b.id);

        network.integrate(a, &AffectAlignedRelations::default());
        network.integrate(b, &AffectAlignedRelations::default());

        assert!(network.edge(&a_id, &b_id).is_some());
        assert!(network.edge(&b_id, &a_id).is_some());
        assert_eq!(network.edge_count(), 2);
    }

    #[test]
    fn test_reintegration_overwrites_edges() {
        let mut network = BeliefNetwork::new();
        let a = belief("the corridor is safe and bright", 0.8, 0.6);
        let b = belief("the corridor is safe and warm", 0.7, 0.5);

        network.integrate(a.clone(), &AffectAlignedRelations::default());
        network.integrate(b.clone(), &AffectAlignedRelations::default());
        let before = network.edge_count();

        network.integrate(a, &AffectAlignedRelations::default());
        assert_eq!(network.edge_count(), before);
    }

    #[test]
    fn test_superseded_excluded_from_discovery() {
        let mut network = BeliefNetwork::new();
        let a = belief("the corridor is safe and bright", 0.8, 0.6);
        let b = belief("the corridor is safe and warm", 0.7, 0.5);
        let a_id = a.id;

        network.insert(a);
        network.mark_superseded(&a_id, Utc::now());
        network.integrate(b, &AffectAlignedRelations::default());

        assert_eq!(network.edge_count(), 0);
    }

    #[test]
    fn test_propagation_attenuates_per_hop() {
        let config = DoxaConfig::default(); // damping 0.5
        let mut network = BeliefNetwork::new();
        let a = belief("a", 0.5, 0.5);
        let b = belief("b", 0.5, 0.5);
        let c = belief("c", 0.5, 0.5);
        let (a_id, b_id, c_id) = (a.id, b.id, c.id);
        network.insert(a);
        network.insert(b);
        network.insert(c);
        edge(&mut network, a_id, b_id, 1.0);
        edge(&mut network, b_id, c_id, 1.0);

        let touched = network.propagate(a_id, 0.4, Utc::now(), &config);
        assert_eq!(touched, vec![b_id, c_id]);
        // hop 1: 0.4 × 0.5 = 0.2; hop 2: 0.4 × 0.25 = 0.1
        assert!((network.get(&b_id).unwrap().confidence - 0.7).abs() < 1e-6);
        assert!((network.get(&c_id).unwrap().confidence - 0.6).abs() < 1e-6);
    }

    #[test]
    fn test_propagation_terminates_on_cycle() {
        let config = DoxaConfig::default();
        let mut network = BeliefNetwork::new();
        let a = belief("a", 0.5, 0.5);
        let b = belief("b", 0.5, 0.5);
        let (a_id, b_id) = (a.id, b.id);
        network.insert(a);
        network.insert(b);
        edge(&mut network, a_id, b_id, 1.0);
        edge(&mut network, b_id, a_id, 1.0);

        let touched = network.propagate(a_id, 0.4, Utc::now(), &config);
        // The cycle comes straight back to the origin; it is not re-adjusted.
        assert_eq!(touched, vec![b_id]);
        assert!((network.get(&a_id).unwrap().confidence - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_propagation_respects_hop_bound() {
        let mut config = DoxaConfig::default();
        config.tunables.max_hops = 2;
        let mut network = BeliefNetwork::new();

        let chain: Vec<Belief> = (0..5).map(|i| belief(&format!("n{i}"), 0.5, 0.5)).collect();
        let ids: Vec<Uuid> = chain.iter().map(|b| b.id).collect();
        for b in chain {
            network.insert(b);
        }
        for pair in ids.windows(2) {
            edge(&mut network, pair[0], pair[1], 1.0);
        }

        let touched = network.propagate(ids[0], 0.4, Utc::now(), &config);
        assert_eq!(touched.len(), 2);
    }

    #[test]
    fn test_propagation_skips_superseded() {
        let config = DoxaConfig::default();
        let mut network = BeliefNetwork::new();
        let a = belief("a", 0.5, 0.5);
        let b = belief("b", 0.5, 0.5);
        let c = belief("c", 0.5, 0.5);
        let (a_id, b_id, c_id) = (a.id, b.id, c.id);
        network.insert(a);
        network.insert(b);
        network.insert(c);
        edge(&mut network, a_id, b_id, 1.0);
        edge(&mut network, b_id, c_id, 1.0);
        network.mark_superseded(&b_id, Utc::now());

        let touched = network.propagate(a_id, 0.4, Utc::now(), &config);
        // b is inactive: it neither receives nor relays toward c.
        assert!(touched.is_empty());
        assert!((network.get(&c_id).unwrap().confidence - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_propagation_clamps_confidence() {
        let config = DoxaConfig::default();
        let mut network = BeliefNetwork::new();
        let a = belief("a", 0.5, 0.5);
        let b = belief("b", 0.95, 0.5);
        let (a_id, b_id) = (a.id, b.id);
        network.insert(a);
        network.insert(b);
        edge(&mut network, a_id, b_id, 1.0);

        network.propagate(a_id, 1.0, Utc::now(), &config);
        let conf = network.get(&b_id).unwrap().confidence;
        assert!(conf <= 1.0);
    }
}
