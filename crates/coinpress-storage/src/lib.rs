//! Storage abstraction layer for coinpress.
//!
//! Everything that touches a cache or a database goes through the capability
//! traits defined here, injected at construction time. That keeps the badge
//! resolver and the HTTP handlers unit-testable against the in-memory
//! implementations in [`memory`], with the real backends living in
//! `coinpress-cache-redis` and `coinpress-db-postgres`.

pub mod error;
pub mod memory;
pub mod traits;
pub mod types;

pub use error::{CacheError, StorageError};
pub use memory::{MemoryContentStore, MemoryHoldingStore, MemoryKvStats, MemoryKvStore};
pub use traits::{ContentStore, HoldingStore, KeyValueStore, UnconfiguredKvStore};
pub use types::{ScanCursor, ScanPage};
