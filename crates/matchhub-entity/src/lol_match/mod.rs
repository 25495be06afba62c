//! League match entity.

pub mod model;

pub use model::LolMatch;
