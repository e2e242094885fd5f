//! Agent pipeline - one owner, strictly ordered stages
//!
//! Each agent's pipeline is an independent instance: it exclusively owns the
//! agent's working set of feelings, belief network, personality state, and
//! behavior patterns. Pipelines for different agents share nothing mutable
//! and may run in parallel. Within one agent, a step applies the stages in a
//! fixed order - decay/prune, cluster, consolidate, resolve, integrate,
//! propagate, project - and no stage observes a partially-updated network
//! from a later one.

use std::collections::BTreeMap;
use std::sync::Arc;

use arc_swap::ArcSwap;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use doxa_belief::{
    apply_context_weight, build_clusters, conflict, consolidate, evolve, ingest, prune_decayed,
    BeliefNetwork, FeelingCluster, Resolution,
};
use doxa_core::{
    AffectAlignedRelations, Belief, BeliefEvent, BeliefSnapshot, DoxaConfig, Feeling,
    RawFeeling, RelationDiscovery, Similarity, TokenJaccard, ValidationError,
};
use doxa_persona::{project, refresh_dependents, BehaviorPattern, PersonalityState, PersonalityView};

use crate::sink::PersistenceQueue;

/// What one step did, for callers that want to log or assert on it.
#[derive(Debug, Default, Clone)]
pub struct StepReport {
    pub pruned: usize,
    pub clusters: usize,
    pub formed: Vec<Uuid>,
    pub evolved: Vec<Uuid>,
    pub superseded: Vec<Uuid>,
}

pub struct AgentPipeline {
    config: Arc<DoxaConfig>,
    similarity: Arc<dyn Similarity>,
    discovery: Arc<dyn RelationDiscovery>,

    feelings: BTreeMap<Uuid, Feeling>,
    network: BeliefNetwork,
    personality: PersonalityState,
    patterns: Vec<BehaviorPattern>,

    queue: Option<PersistenceQueue>,
    view: Arc<ArcSwap<PersonalityView>>,
}

impl AgentPipeline {
    pub fn new(config: DoxaConfig) -> Self {
        let personality = PersonalityState::new(&config);
        let view = PersonalityView::of(&personality, &[], 0);
        Self {
            config: Arc::new(config),
            similarity: Arc::new(TokenJaccard),
            discovery: Arc::new(AffectAlignedRelations::default()),
            feelings: BTreeMap::new(),
            network: BeliefNetwork::new(),
            personality,
            patterns: Vec::new(),
            queue: None,
            view: Arc::new(ArcSwap::from_pointee(view)),
        }
    }

    /// Swap in a different similarity capability (e.g. embedding-backed).
    pub fn with_similarity(mut self, similarity: Arc<dyn Similarity>) -> Self {
        self.similarity = similarity;
        self
    }

    /// Swap in a different relation-discovery capability.
    pub fn with_discovery(mut self, discovery: Arc<dyn RelationDiscovery>) -> Self {
        self.discovery = discovery;
        self
    }

    /// Attach the persistence queue. Without one, snapshots are discarded.
    pub fn with_queue(mut self, queue: PersistenceQueue) -> Self {
        self.queue = Some(queue);
        self
    }

    pub fn add_pattern(&mut self, pattern: BehaviorPattern) {
        self.patterns.push(pattern);
    }

    /// Lock-free handle for the query boundary. The view behind it is
    /// replaced wholesale after every step.
    pub fn view_handle(&self) -> Arc<ArcSwap<PersonalityView>> {
        self.view.clone()
    }

    pub fn personality(&self) -> &PersonalityState {
        &self.personality
    }

    pub fn network(&self) -> &BeliefNetwork {
        &self.network
    }

    pub fn patterns(&self) -> &[BehaviorPattern] {
        &self.patterns
    }

    pub fn active_feelings(&self) -> usize {
        self.feelings.len()
    }

    /// Ingestion boundary: validate, squash, context-weight, and admit one
    /// feeling into the working set. The submitter was authenticated
    /// upstream; a validation failure rejects only this signal.
    pub fn submit(&mut self, raw: RawFeeling, now: DateTime<Utc>) -> Result<Uuid, ValidationError> {
        let mut feeling = ingest(raw, now)?;
        apply_context_weight(&mut feeling, &self.config);
        let id = feeling.id;
        tracing::debug!(%id, weight = feeling.weight, "Feeling admitted to working set");
        self.feelings.insert(id, feeling);
        Ok(id)
    }

    /// Run one full pass of the pipeline at `now`.
    pub fn step(&mut self, now: DateTime<Utc>) -> StepReport {
        let mut report = StepReport::default();

        // 1. Decay and prune the working set.
        report.pruned = prune_decayed(&mut self.feelings, now, &self.config);

        // 2. Cluster what is still alive.
        let clusters = build_clusters(&self.feelings, now, &self.config, &*self.similarity);
        report.clusters = clusters.len();

        // 3. Each cluster either reinforces an existing belief or attempts
        //    to consolidate into a new one.
        for cluster in clusters {
            if let Some(target) = self.reinforcement_target(&cluster) {
                self.reinforce(target, &cluster, now, &mut report);
            } else {
                self.form(&cluster, now, &mut report);
            }
        }

        // 4. Publish the read-only view.
        self.publish_view();
        report
    }

    /// An existing active belief this cluster reinforces: content similar
    /// enough, valence not in opposition. Highest similarity wins, ties by
    /// lowest belief id (BTreeMap iteration order).
    fn reinforcement_target(&self, cluster: &FeelingCluster) -> Option<Uuid> {
        let threshold = self.config.tunables.similarity_threshold;
        let dead_zone = self.config.tunables.conflict_dead_zone;
        let mut best: Option<(Uuid, f32)> = None;

        for belief in self.network.active() {
            let score = self
                .similarity
                .score(&cluster.centroid_content, &belief.content);
            if score < threshold {
                continue;
            }
            let opposed = cluster.average_valence.abs() >= dead_zone
                && belief.signature.valence.abs() >= dead_zone
                && (cluster.average_valence > 0.0) != (belief.signature.valence > 0.0);
            if opposed {
                continue;
            }
            if best.map_or(true, |(_, b)| score > b) {
                best = Some((belief.id, score));
            }
        }
        best.map(|(id, _)| id)
    }

    /// Fold a cluster's members into an existing belief as new evidence.
    fn reinforce(
        &mut self,
        target: Uuid,
        cluster: &FeelingCluster,
        now: DateTime<Utc>,
        report: &mut StepReport,
    ) {
        let Some(existing) = self.network.get(&target).cloned() else {
            return;
        };
        let prior = existing.confidence;

        let mut current = existing;
        for member in &cluster.members {
            if let Some(feeling) = self.feelings.get(&member.id) {
                current = evolve(&current, feeling, now, &self.config);
            }
        }
        self.absorb(cluster);

        let delta = current.confidence - prior;
        tracing::info!(
            belief = %current.id,
            version = current.version,
            delta,
            "Belief reinforced by cluster"
        );

        self.emit(BeliefEvent::Evolved, &current);
        report.evolved.push(current.id);
        self.apply_change(current, delta, now);
    }

    /// Consolidate a cluster into a new belief, then resolve any conflicts
    /// it raises with existing active beliefs.
    fn form(&mut self, cluster: &FeelingCluster, now: DateTime<Utc>, report: &mut StepReport) {
        let Some(belief) = consolidate(cluster, now, &self.config) else {
            return; // Normal non-formation path.
        };
        self.absorb(cluster);

        let mut current = belief;
        let mut prior_confidence = 0.0;

        let opponents: Vec<Uuid> = self
            .network
            .active()
            .filter(|other| conflict::in_conflict(&current, other, &*self.similarity, &self.config))
            .map(|other| other.id)
            .collect();

        for opponent_id in opponents {
            if opponent_id == current.id {
                continue;
            }
            let Some(opponent) = self.network.get(&opponent_id).cloned() else {
                continue;
            };
            match conflict::resolve(&current, &opponent, now, &self.config) {
                Resolution::Merged { merged, superseded } => {
                    if superseded == current.id {
                        // The network-resident side won the identity; the
                        // newcomer is retained, superseded, for audit.
                        self.supersede_detached(current, now, report);
                        prior_confidence = opponent.confidence;
                    } else {
                        self.supersede_resident(&superseded, now, report);
                    }
                    current = merged;
                }
                Resolution::Selected { winner, superseded } => {
                    if winner == current.id {
                        self.supersede_resident(&superseded, now, report);
                    } else {
                        // The newcomer lost outright: record it for audit and
                        // stop - nothing propagates, nothing projects.
                        self.supersede_detached(current, now, report);
                        return;
                    }
                }
            }
        }

        let delta = current.confidence - prior_confidence;
        if current.version > 1 {
            // A merge evolved an existing identity rather than minting one.
            report.evolved.push(current.id);
            self.emit(BeliefEvent::Evolved, &current);
        } else {
            report.formed.push(current.id);
            self.emit(BeliefEvent::Formed, &current);
        }
        self.apply_change(current, delta, now);
    }

    /// Shared tail of every belief change: integrate, propagate, project,
    /// refresh dependent behavior patterns.
    fn apply_change(&mut self, belief: Belief, delta: f32, now: DateTime<Utc>) {
        let id = belief.id;
        self.network.integrate(belief.clone(), &*self.discovery);
        let touched = self.network.propagate(id, delta, now, &self.config);
        self.personality = project(&self.personality, &belief, &self.config);

        self.patterns = refresh_dependents(&self.patterns, &id, &self.network, now, &self.config);
        for touched_id in touched {
            self.patterns =
                refresh_dependents(&self.patterns, &touched_id, &self.network, now, &self.config);
        }
    }

    /// Remove a cluster's members from the working set: they are absorbed as
    /// evidence and survive only as id references.
    fn absorb(&mut self, cluster: &FeelingCluster) {
        for member in &cluster.members {
            self.feelings.remove(&member.id);
        }
    }

    /// Supersede a belief already resident in the network.
    fn supersede_resident(&mut self, id: &Uuid, now: DateTime<Utc>, report: &mut StepReport) {
        if let Some(final_state) = self.network.mark_superseded(id, now) {
            self.emit(BeliefEvent::Superseded, &final_state);
            report.superseded.push(*id);
            self.patterns =
                refresh_dependents(&self.patterns, id, &self.network, now, &self.config);
        }
    }

    /// Supersede a belief that never made it into the network: insert it
    /// flagged, purely for the audit trail.
    fn supersede_detached(&mut self, mut belief: Belief, now: DateTime<Utc>, report: &mut StepReport) {
        belief.superseded = true;
        belief.last_updated = now;
        self.emit(BeliefEvent::Superseded, &belief);
        report.superseded.push(belief.id);
        self.network.insert(belief);
    }

    fn emit(&self, event: BeliefEvent, belief: &Belief) {
        if let Some(queue) = &self.queue {
            queue.enqueue(BeliefSnapshot::new(event, belief));
        }
    }

    fn publish_view(&self) {
        let active = self.network.active().count();
        let view = PersonalityView::of(&self.personality, &self.patterns, active);
        self.view.store(Arc::new(view));
    }
}
