//! Server crate for the movie recommendation engine.
//!
//! This crate contains the recommendation service that answers lookups
//! from the trained artifacts, and the HTTP API that exposes it.

pub mod api;
pub mod config;
pub mod error;
pub mod service;

pub use api::{AppState, create_router};
pub use config::ServerConfig;
pub use error::{AppError, AppResult};
pub use service::{Recommendation, RecommendError, RecommendationService};
