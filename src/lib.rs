//! viewsync
//!
//! Headless view-state engine for large tabular displays.
//!
//! Owns which rows are visible (filters, debounced search), in what order
//! (sort, column order), how wide columns are, and which slice of a huge row
//! set is actually rendered. State is mirrored into the address-bar query
//! string and into durable storage so it survives reloads, navigation and
//! remounts. Everything runs on the caller's thread; deferred work is driven
//! by explicit `now_ms` timestamps.

pub mod codec;
pub mod condition;
pub mod config;
pub mod logging;
pub mod model;
pub mod registry;
pub mod state;
pub mod sync;
pub mod table;
pub mod view_state;

pub use condition::Condition;
pub use registry::Registry;
pub use table::{TableRegistry, TableView, ViewQuery};
