//! # doauth store
//!
//! The persistence port used by key derivation. Slip records (salt and cost
//! parameters) are kept outside the core and read back on every unlock, so
//! the same password reproduces the same keys without a secret ever being
//! written anywhere.
//!
//! ## Key Types
//!
//! - [`KvStore`] - The async trait for string records
//! - [`SqliteStore`] - SQLite-based persistent storage
//! - [`MemoryStore`] - In-memory storage for tests and ephemeral sessions
//!
//! ## Usage
//!
//! ```rust,no_run
//! use doauth_store::{KvStore, SqliteStore};
//!
//! async fn example() -> doauth_store::Result<()> {
//!     let store = SqliteStore::open("doauth.db")?;
//!     store.put("doauth_slip", "{}").await?;
//!     let record = store.get("doauth_slip").await?;
//!     assert!(record.is_some());
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod memory;
pub mod migration;
pub mod sqlite;
pub mod traits;

pub use error::{Result, StoreError};
pub use memory::MemoryStore;
pub use sqlite::SqliteStore;
pub use traits::KvStore;
