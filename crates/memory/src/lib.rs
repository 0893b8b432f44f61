//! Persistent memory document: what the assistant has learned about the
//! user, organized into four categories plus a free-form profile map.

mod schema;
mod store;

pub use schema::{Category, MemoryDocument};
pub use store::{FileStore, MemoryStore};
