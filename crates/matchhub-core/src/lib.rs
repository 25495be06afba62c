//! # matchhub-core
//!
//! Core crate for MatchHub. Contains configuration schemas, typed
//! identifiers, the seam traits consumed by the sync engine, and the
//! unified error system.
//!
//! This crate has **no** internal dependencies on other MatchHub crates.

pub mod config;
pub mod error;
pub mod result;
pub mod traits;
pub mod types;

pub use error::AppError;
pub use result::AppResult;
