//! Core traits defined in `matchhub-core` and implemented by other crates.

pub mod source;
pub mod store;

pub use source::{FetchError, MatchDataSource};
pub use store::{BackfillKind, MatchStore, MatchStub, MatchUpdate, ParticipantRecord};
