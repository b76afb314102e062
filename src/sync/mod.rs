//! External mirrors of view state (impure shell).
//!
//! The in-memory state inside each manager is the source of truth. The query
//! string and durable storage are loosely synchronized mirrors: written by
//! one-way effects after each commit, read only at initialization and when an
//! explicit external-change notification arrives.
//!
//! - `history`: query-string access ([`History`], [`MemoryHistory`])
//! - `storage`: durable key/value access ([`Storage`]) and change events
//! - `memory_storage`: in-process store with a change feed
//! - `file_storage`: JSON-file store for native hosts

pub mod file_storage;
pub mod history;
pub mod memory_storage;
pub mod storage;

// Re-export for convenience
pub use file_storage::{default_storage_path, FileStorage};
pub use history::{rewrite_query, History, HistoryMode, MemoryHistory};
pub use memory_storage::MemoryStorage;
pub use storage::{storage_key, InstanceId, Storage, StorageEvent};
