pub mod behavior;
pub mod projector;
pub mod view;

pub use behavior::{pattern_confidence, refresh_dependents, BehaviorPattern};
pub use projector::{project, PersonalityState};
pub use view::PersonalityView;
