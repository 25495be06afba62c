//! Domain entity models for MatchHub.

pub mod lol_match;

pub use lol_match::model::LolMatch;
