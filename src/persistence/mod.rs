//! Player profile persistence
//!
//! Features:
//! - Versionless JSON profile file
//! - Atomic replace on save (tmp → save)
//! - Missing file yields a fresh profile
//! - In-memory store for tests and headless runs

pub mod profile;
pub mod store;

pub use profile::{ContentId, PlayerProfile, ShopContent, shop_catalogue};
pub use store::{JsonPersistence, MemoryPersistence, Persistence};

/// Persistence failures
#[derive(thiserror::Error, Debug)]
pub enum PersistenceError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}
