pub mod belief;
pub mod capability;
pub mod config;
pub mod error;
pub mod feeling;
pub mod signature;
pub mod squash;

pub use belief::{
    Belief, BeliefEvent, BeliefEvidence, BeliefRelation, BeliefSnapshot, BeliefSources,
    RelationKind,
};
pub use capability::{AffectAlignedRelations, BeliefSink, RelationDiscovery, Similarity, TokenJaccard};
pub use config::{default_traits, DoxaConfig, TraitSpec, Tunables};
pub use error::ValidationError;
pub use feeling::{Feeling, FeelingContext, RawFeeling};
pub use signature::EmotionalSignature;
pub use squash::{squash_signed, squash_unit};
