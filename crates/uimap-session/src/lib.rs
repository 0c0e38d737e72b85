//! # uimap-session
//!
//! Session lifecycle for uimap.
//!
//! This crate provides:
//! - [`Session`]: one scanned application window, with stale-node recovery
//!   and the click gesture
//! - [`SessionManager`]: explicit ownership of several sessions
//! - [`ComponentCache`]: the component tree persisted as JSON or YAML
//!
//! ## Architecture
//!
//! This is Layer 3 in the architecture - it depends on uimap-core,
//! uimap-driver and uimap-detector, and is driven by the `uimap` binary.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod cache;
pub mod manager;
pub mod session;

// Re-export commonly used types
pub use cache::{ComponentCache, CACHE_VERSION};
pub use manager::{SessionManager, SessionManagerConfig};
pub use session::Session;
