//! Hotel API service
//!
//! Hosts the request pipeline shared by every hotel endpoint:
//! request logging, correlation IDs, failure normalization and bearer token
//! revocation, in that order from the outside in.

pub mod app;
pub mod config;
pub mod handlers;
pub mod store;
pub mod telemetry;

pub use app::{build_app, AppState};
pub use config::Config;
