//! # Postflow Core
//!
//! The domain layer of Postflow: how a generated social-media post moves
//! through regeneration, image-variant management, scheduling and publishing.
//! This crate holds the business rules and the ports they run against; it
//! has no HTTP or database dependencies.

pub mod config;
pub mod domain;
pub mod error;
pub mod ports;
pub mod services;

pub use config::OrchestratorConfig;
pub use error::{DomainError, ServiceError};
pub use services::{EditingSession, PostOrchestrator};
