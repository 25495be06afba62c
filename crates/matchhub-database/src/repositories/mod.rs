//! Repository implementations for MatchHub entities.

pub mod lol_match;
pub mod participant;
pub mod store;

pub use lol_match::MatchRepository;
pub use participant::ParticipantRepository;
pub use store::PgMatchStore;
