use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;
use uuid::Uuid;

// ============================================================================
// Top-level config
// ============================================================================

/// Immutable per-agent configuration.
///
/// Passed into every pipeline call rather than held as ambient global state,
/// so pipelines for different agents or deployments never interfere. Unknown
/// keys in the lookup tables degrade to documented defaults instead of
/// failing.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DoxaConfig {
    pub tunables: Tunables,

    /// Environment id → weighting factor. Unknown id → 1.0 (logged).
    pub environment_weights: BTreeMap<Uuid, f32>,

    /// Relationship id → trust factor. Unknown id → 1.0.
    pub relationship_trust: BTreeMap<Uuid, f32>,

    /// Source id → trust value, feeding belief trust scores.
    /// Unknown id → 1.0.
    pub source_trust: BTreeMap<Uuid, f32>,

    /// Personality trait definitions used by projection.
    pub traits: Vec<TraitSpec>,
}

impl DoxaConfig {
    /// Load config from a TOML file, falling back to defaults for missing
    /// fields.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;
        let config: DoxaConfig =
            toml::from_str(&content).with_context(|| "Failed to parse TOML config")?;
        Ok(config)
    }

    /// Try to load from path; if the file is missing or invalid, return
    /// defaults.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Self {
        match Self::load(path) {
            Ok(cfg) => cfg,
            Err(e) => {
                tracing::info!("Config file not found or invalid ({}), using defaults", e);
                Self::default()
            }
        }
    }

    /// Environment weighting factor; 1.0 for unknown environments.
    pub fn environment_weight(&self, environment: &Uuid) -> f32 {
        match self.environment_weights.get(environment) {
            Some(w) => *w,
            None => {
                tracing::warn!(%environment, "Unknown environment id, weighting 1.0");
                1.0
            }
        }
    }

    /// Relationship trust factor; 1.0 for unknown relationships.
    pub fn relationship_trust(&self, relationship: &Uuid) -> f32 {
        match self.relationship_trust.get(relationship) {
            Some(t) => *t,
            None => {
                tracing::warn!(%relationship, "Unknown relationship id, trust 1.0");
                1.0
            }
        }
    }

    /// Per-source trust value; 1.0 for unknown sources.
    pub fn source_trust(&self, source: &Uuid) -> f32 {
        self.source_trust.get(source).copied().unwrap_or(1.0)
    }
}

// ============================================================================
// Tunables
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Tunables {
    /// Exponential decay rate (per second) for feeling strength and passive
    /// belief confidence erosion.
    pub decay_rate: f32,

    /// Feelings whose decayed strength drops below this are pruned from the
    /// working set.
    pub prune_epsilon: f32,

    /// Minimum content similarity for a feeling to join an existing cluster,
    /// and for two beliefs to be considered related/conflicting.
    pub similarity_threshold: f32,

    /// Clusters smaller than this are not emitted.
    pub min_cluster_size: usize,

    /// Minimum cluster potential for consolidation to fire.
    pub belief_threshold: f32,

    /// Conflicting beliefs whose strengths differ by less than this are
    /// merged instead of one superseding the other.
    pub resolution_epsilon: f32,

    /// Per-hop attenuation during propagation, strictly inside (0,1).
    pub damping: f32,

    /// Hop bound on propagation. This is the termination guarantee on a
    /// cyclic graph.
    pub max_hops: usize,

    /// Adaptability assigned to a freshly consolidated belief before the
    /// volatility raise.
    pub base_adaptability: f32,

    /// How strongly member-weight variance raises adaptability.
    pub volatility_gain: f32,

    /// Step size for trait updates during projection.
    pub trait_rate: f32,

    /// EMA rate for the emotional baseline.
    pub baseline_rate: f32,

    /// Valence magnitudes below this are treated as sign-neutral during
    /// conflict detection.
    pub conflict_dead_zone: f32,
}

impl Default for Tunables {
    fn default() -> Self {
        Self {
            decay_rate: 0.001, // Halves a signal in ~11.5 minutes
            prune_epsilon: 0.01,
            similarity_threshold: 0.85,
            min_cluster_size: 3,
            belief_threshold: 0.3,
            resolution_epsilon: 0.1,
            damping: 0.5,
            max_hops: 3,
            base_adaptability: 0.3,
            volatility_gain: 0.5,
            trait_rate: 0.1,
            baseline_rate: 0.25,
            conflict_dead_zone: 0.1,
        }
    }
}

// ============================================================================
// Trait definitions
// ============================================================================

/// How strongly a belief's emotional signature pulls on one personality
/// trait. Affinity = clamp(bias + valence_gain·valence + arousal_gain·arousal).
#[derive(Debug, Clone, Deserialize)]
pub struct TraitSpec {
    pub name: String,
    pub valence_gain: f32,
    pub arousal_gain: f32,
    pub bias: f32,
}

impl TraitSpec {
    pub fn affinity(&self, valence: f32, arousal: f32) -> f32 {
        (self.bias + self.valence_gain * valence + self.arousal_gain * arousal).clamp(0.0, 1.0)
    }
}

/// Default trait set used when the config supplies none.
pub fn default_traits() -> Vec<TraitSpec> {
    vec![
        TraitSpec {
            name: "optimism".to_string(),
            valence_gain: 1.0,
            arousal_gain: 0.0,
            bias: 0.0,
        },
        TraitSpec {
            name: "caution".to_string(),
            valence_gain: -0.8,
            arousal_gain: 0.4,
            bias: 0.0,
        },
        TraitSpec {
            name: "openness".to_string(),
            valence_gain: 0.3,
            arousal_gain: 0.5,
            bias: 0.1,
        },
        TraitSpec {
            name: "resilience".to_string(),
            valence_gain: 0.5,
            arousal_gain: -0.3,
            bias: 0.2,
        },
        TraitSpec {
            name: "sociability".to_string(),
            valence_gain: 0.4,
            arousal_gain: 0.3,
            bias: 0.1,
        },
    ]
}

impl DoxaConfig {
    /// Trait definitions, falling back to the default set when the config
    /// carries none.
    pub fn trait_specs(&self) -> Vec<TraitSpec> {
        if self.traits.is_empty() {
            default_traits()
        } else {
            self.traits.clone()
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
