//! In-memory port implementations.

mod posts;

pub use posts::InMemoryPostRepository;
