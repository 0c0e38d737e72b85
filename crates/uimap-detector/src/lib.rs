//! # uimap-detector
//!
//! Perception engine for uimap.
//!
//! This crate provides:
//! - [`LocatorSynthesizer`]: tiered structural locators for one node
//! - [`TypeClassifier`]: control type to element kind, including the combo probe
//! - [`SpecializationFactory`]: table, list, tab and menu representations
//! - [`LayoutGrouper`]: row/column bucketing by bounding box
//! - [`LabelAssociator`]: label to input binding and collision-safe registration
//! - [`ContainerInspector`]: the orchestration of all of the above per container
//!
//! ## Architecture
//!
//! This is Layer 2 in the architecture - it depends on uimap-core and
//! uimap-driver and is driven by the session crate.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod associator;
pub mod classifier;
pub mod grouper;
pub mod inspector;
pub mod specialization;
pub mod synthesizer;

// Re-export commonly used types
pub use associator::LabelAssociator;
pub use classifier::{Classification, TypeClassifier};
pub use grouper::LayoutGrouper;
pub use inspector::{ContainerInspector, ScanContext};
pub use specialization::SpecializationFactory;
pub use synthesizer::{is_generated_id, LocatorSynthesizer};
