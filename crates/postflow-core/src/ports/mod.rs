//! Ports - trait definitions for the external collaborators.
//! Infrastructure implements these; the orchestrator only talks to them.

mod account;
mod content;
mod publisher;
mod repository;

pub use account::AccountService;
pub use content::ContentGenerator;
pub use publisher::SocialPublisher;
pub use repository::{PostPatch, PostRepository};
