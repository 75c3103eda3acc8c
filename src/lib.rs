//! monthplan: a monthly exercise plan tracker.
//!
//! Plans are stored per calendar day and scoped to either a signed-in user
//! or an anonymous client session. The HTTP API lives in [`api`]; [`client`]
//! provides the same plan operations against any configured backend.

pub mod api;
pub mod auth;
pub mod client;
pub mod config;

pub use monthplan_core::{db, models, store};
