//! Manually paced step engines.
//!
//! [`StepMachine`] owns the lifecycle shared by both walkthroughs; each [`Walkthrough`]
//! contributes its input capture and an ordered table of pure step functions.

pub mod engine;
pub mod recommendation;
pub mod review;
pub mod states;

pub use engine::{StepFn, StepMachine, Walkthrough};
pub use recommendation::{RecommendationEngine, RecommendationWalkthrough};
pub use review::{ReviewEngine, ReviewWalkthrough};
pub use states::{RecommendationTrace, ReviewTrace, Snapshot, WalkthroughKind};
