//! Persisted component trees.
//!
//! A cache document holds a scanned root window keyed by label. Live node
//! references do not survive serialization; [`ComponentCache::reattach`]
//! re-binds them before first use.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use chrono::{DateTime, Utc};
use schemars::{schema_for, JsonSchema, Schema};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use uimap_core::{ComponentDefinition, Element, Error, Result};
use uimap_driver::{Driver, DriverExt};

/// Version of the cache document layout.
pub const CACHE_VERSION: &str = "1";

/// A serialized scan of one application window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ComponentCache {
    /// Document layout version
    pub version: String,

    /// When the scan was taken
    pub captured_at: DateTime<Utc>,

    /// Scanned root window
    pub root: Element,
}

impl ComponentCache {
    /// Wrap a scanned root window, stamped now.
    pub fn new(root: Element) -> Self {
        Self {
            version: CACHE_VERSION.to_string(),
            captured_at: Utc::now(),
            root,
        }
    }

    /// JSON schema of the cache document.
    pub fn json_schema() -> Schema {
        schema_for!(ComponentCache)
    }

    /// Serialize as pretty-printed JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parse a JSON cache document.
    pub fn from_json(json: &str) -> Result<Self> {
        let cache: Self = serde_json::from_str(json)?;
        cache.checked()
    }

    /// Serialize as YAML.
    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Parse a YAML cache document.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let cache: Self = serde_yaml::from_str(yaml)?;
        cache.checked()
    }

    /// Write to `path`; `.yaml`/`.yml` files are written as YAML, anything else as JSON.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let document = if is_yaml(path) {
            self.to_yaml()?
        } else {
            self.to_json()?
        };
        fs::write(path, document)?;
        info!("Cache written to {}", path.display());
        Ok(())
    }

    /// Read from `path`, choosing the format by extension like [`ComponentCache::save`].
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let document = fs::read_to_string(path)?;
        let cache = if is_yaml(path) {
            Self::from_yaml(&document)?
        } else {
            Self::from_json(&document)?
        };
        debug!(
            "Cache loaded from {} ({} component(s))",
            path.display(),
            cache.root.components.len()
        );
        Ok(cache)
    }

    /// Definitions for the root window's children, for the next scan.
    pub fn definitions(&self) -> Vec<ComponentDefinition> {
        self.root
            .components
            .iter()
            .map(|child| ComponentDefinition::from_element(child, &self.root.xpath))
            .collect()
    }

    /// Re-bind live nodes by locator. Returns how many elements were bound.
    ///
    /// Elements whose locator no longer resolves keep no node; they will be
    /// re-resolved (or reported stale) on first use.
    pub fn reattach<D: Driver + ?Sized>(&mut self, driver: &D) -> usize {
        let mut attached = 0;
        let mut missing = Vec::new();
        self.root.walk_mut(&mut |element| {
            element.node = driver.find_or_empty(&element.xpath).into_iter().next();
            match element.node {
                Some(_) => attached += 1,
                // closed drop-downs hide their options
                None if element.popup_owner.is_some() => {}
                None => missing.push(element.xpath.clone()),
            }
            if let Some(caption) = element.caption.as_mut() {
                caption.node = driver.find_or_empty(&caption.xpath).into_iter().next();
            }
        });
        for xpath in &missing {
            warn!("Cached locator no longer resolves: {}", xpath);
        }
        attached
    }

    /// Label to locator pairs of the cached tree.
    pub fn label_map(&self) -> BTreeMap<String, String> {
        self.root.label_map()
    }

    fn checked(mut self) -> Result<Self> {
        if self.version != CACHE_VERSION {
            return Err(Error::Config(format!(
                "unsupported cache version '{}' (expected '{}')",
                self.version, CACHE_VERSION
            )));
        }
        self.root.relink();
        Ok(self)
    }
}

fn is_yaml(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("yaml") | Some("yml")
    )
}
