//! # uimap-core
//!
//! Core types for uimap, the perception layer of a desktop UI test-automation tool.
//!
//! This crate contains all fundamental types with **no internal dependencies**
//! on other uimap crates. It provides:
//!
//! - Geometry types (Point, BoundingRectangle)
//! - Element kinds and the `Element` wrapper with its component registry
//! - The structural locator grammar
//! - Scan strategies (locator strategy, layout, combo heuristic)
//! - Predeclared component definitions
//! - Configuration, session ids and error types
//!
//! ## Architecture
//!
//! This is Layer 0 in the architecture - all other crates depend on this one,
//! but this crate has no dependencies on other uimap crates.

#![warn(missing_docs)]
#![warn(clippy::all)]

// Re-export all modules
pub mod attr;
pub mod config;
pub mod definition;
pub mod element;
pub mod error;
pub mod geometry;
pub mod kind;
pub mod locator;
pub mod registry;
pub mod session;
pub mod strategy;

// Re-export commonly used types
pub use config::{
    CacheSettings, ClassificationSettings, DriverSettings, LayoutSettings, LocatorSettings,
    PerceptionConfig, SessionSettings, TableSettings,
};
pub use definition::{find_definition, load_definitions, parse_definitions, ComponentDefinition};
pub use element::{
    Element, ListSpec, MenuBarSpec, NodeHandle, ScrollBars, Specialization, TabGroupSpec,
    TableSpec,
};
pub use error::{Error, Result};
pub use geometry::{BoundingRectangle, Point};
pub use kind::ElementKind;
pub use locator::{quote_literal, Axis, Locator, Predicate, Step};
pub use registry::{ComponentRegistry, PATH_SEPARATOR};
pub use session::{SessionId, SessionInfo, SessionStatus};
pub use strategy::{ComboHeuristic, Layout, LocatorStrategy};
