pub mod audit;
pub mod config;
pub mod dataset;
pub mod errors;
pub mod nlp;
pub mod similarity;
pub mod walkthrough;

pub use audit::{AuditContext, AuditEvent, AuditSink, InMemoryAuditSink};
pub use dataset::{Dataset, DatasetDiagnostic, DatasetError};
pub use errors::{ApplicationError, InterfaceError, StepError};
pub use nlp::Classification;
pub use similarity::SimilarityEntry;
pub use walkthrough::{
    RecommendationEngine, RecommendationTrace, ReviewEngine, ReviewTrace, Snapshot, StepMachine,
    Walkthrough, WalkthroughKind,
};
