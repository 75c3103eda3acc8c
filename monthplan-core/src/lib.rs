//! Core library for monthplan.
//!
//! This crate provides the domain models and the JSON record store for
//! monthplan, independent of any transport layer (HTTP, CLI, etc.).
//!
//! # Usage
//!
//! ```no_run
//! use monthplan_core::db::Database;
//! use monthplan_core::models::*;
//!
//! let db = Database::open_default()?;
//!
//! let who = Identity::Session("s1".into());
//! let plans = db.list_plans("2024-05-01", &who)?;
//! # Ok::<(), anyhow::Error>(())
//! ```

pub mod db;
pub mod models;
pub mod store;

// Re-export commonly used types at crate root
pub use db::Database;
pub use store::PlanStore;
