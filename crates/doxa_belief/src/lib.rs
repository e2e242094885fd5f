pub mod cluster;
pub mod conflict;
pub mod consolidate;
pub mod evolve;
pub mod network;
pub mod normalizer;

pub use cluster::{build_clusters, ClusterMember, FeelingCluster};
pub use conflict::{in_conflict, resolve, Resolution};
pub use consolidate::{consolidate, evaluate};
pub use evolve::evolve;
pub use network::BeliefNetwork;
pub use normalizer::{apply_context_weight, ingest, prune_decayed};
