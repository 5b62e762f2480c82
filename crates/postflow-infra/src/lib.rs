//! # Postflow Infrastructure
//!
//! Concrete implementations of the ports defined in `postflow-core`.
//!
//! ## Feature Flags
//!
//! - `full` (default) - All features enabled
//! - `minimal` - No network, in-memory only
//! - `http` - Upstream service adapters via reqwest

pub mod memory;

#[cfg(feature = "http")]
pub mod http;

pub use memory::InMemoryPostRepository;

#[cfg(feature = "http")]
pub use http::{
    ApiClient, HttpAccountService, HttpContentGenerator, HttpPostRepository, HttpSocialPublisher,
    UpstreamConfig,
};
