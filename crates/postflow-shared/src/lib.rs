//! # Postflow Shared
//!
//! Types exchanged between the editor UI and the API server.

pub mod dto;
pub mod response;

pub use response::{ApiResponse, ErrorResponse};
