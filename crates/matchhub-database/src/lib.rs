//! # matchhub-database
//!
//! PostgreSQL connection management, migrations, and repository
//! implementations for MatchHub. The [`repositories::MatchRepository`]
//! also implements the `MatchStore` seam trait consumed by the sync jobs.

pub mod connection;
pub mod migration;
pub mod repositories;

pub use connection::DatabasePool;
