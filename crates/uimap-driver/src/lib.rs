//! # uimap-driver
//!
//! The boundary between uimap and the remote automation driver.
//!
//! This crate provides:
//! - The [`Driver`] trait: the blocking node queries and gestures uimap consumes
//! - [`NodeAttributes`]: one snapshot of a node's attributes
//! - [`DriverExt`]: lossy helpers treating transport failures as "not found"
//! - [`WaitPolicy`]: bounded polling, used only when re-resolving nodes
//! - [`MemoryDriver`]: a recorded accessibility tree replayed in memory
//!
//! ## Architecture
//!
//! This is Layer 1 in the architecture - it depends on uimap-core and is
//! consumed by the detector and session crates.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod attributes;
pub mod driver;
pub mod memory;
pub mod poll;

// Re-export commonly used types
pub use attributes::NodeAttributes;
pub use driver::{Driver, DriverExt};
pub use memory::{MemoryDriver, RecordedNode};
pub use poll::WaitPolicy;
