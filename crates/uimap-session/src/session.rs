//! Perception session for one target application.

use chrono::{DateTime, Utc};
use tracing::{debug, error, info, warn};

use uimap_core::{
    ComponentDefinition, ComponentRegistry, Element, ElementKind, Error, NodeHandle,
    PerceptionConfig, Result, SessionId, SessionInfo, SessionStatus, PATH_SEPARATOR,
};
use uimap_detector::{ContainerInspector, ScanContext};
use uimap_driver::{Driver, DriverExt, WaitPolicy};

use crate::cache::ComponentCache;

/// A scanned application window and the driver it was scanned through.
#[derive(Debug)]
pub struct Session<D: Driver> {
    /// Session identifier
    id: SessionId,

    /// Driver for the target application
    driver: D,

    /// Scan configuration
    config: PerceptionConfig,

    /// Definitions of the root window's children
    definitions: Vec<ComponentDefinition>,

    /// Scanned root window
    root: Option<Element>,

    /// Current session status
    status: SessionStatus,

    /// Session creation time
    created_at: DateTime<Utc>,
}

impl<D: Driver> Session<D> {
    /// Create a session; nothing is scanned until [`Session::load`].
    pub fn new(driver: D, config: PerceptionConfig) -> Self {
        let id = SessionId::new();
        info!("Session created: id={}", id);
        Self {
            id,
            driver,
            config,
            definitions: Vec::new(),
            root: None,
            status: SessionStatus::Attached,
            created_at: Utc::now(),
        }
    }

    /// Use `definitions` for the root window's children.
    pub fn with_definitions(mut self, definitions: Vec<ComponentDefinition>) -> Self {
        self.definitions = definitions;
        self
    }

    /// Resume from a cached component tree, re-binding live nodes.
    ///
    /// The cached tree also becomes the definition set of later scans.
    pub fn from_cache(driver: D, config: PerceptionConfig, mut cache: ComponentCache) -> Self {
        let attached = cache.reattach(&driver);
        let mut session = Self::new(driver, config);
        info!(
            "Session {} resumed from cache captured at {} ({} node(s) attached)",
            session.id, cache.captured_at, attached
        );
        session.definitions = cache.definitions();
        session.root = Some(cache.root);
        session.status = SessionStatus::Loaded;
        session
    }

    /// Get the session ID.
    pub fn id(&self) -> &SessionId {
        &self.id
    }

    /// Get the driver.
    pub fn driver(&self) -> &D {
        &self.driver
    }

    /// Get the configuration.
    pub fn config(&self) -> &PerceptionConfig {
        &self.config
    }

    /// Get the current status.
    pub fn status(&self) -> SessionStatus {
        self.status
    }

    /// Get the creation time.
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Scan the application's main window, replacing any earlier scan.
    pub fn load(&mut self) -> Result<&Element> {
        let inspector = ContainerInspector::new(&self.driver, &self.config)?;
        let root = match inspector.load_root(&self.definitions) {
            Ok(root) => root,
            Err(e) => {
                error!("Session {} failed to load: {}", self.id, e);
                return Err(e);
            }
        };
        info!(
            "Session {} loaded '{}' with {} component(s)",
            self.id,
            root.label,
            root.components.len()
        );
        if self.config.session.debug {
            for (label, xpath) in root.label_map() {
                info!("  {} => {}", label, xpath);
            }
        }
        self.status = SessionStatus::Loaded;
        Ok(&*self.root.insert(root))
    }

    /// The scanned root window.
    pub fn root(&self) -> Option<&Element> {
        self.root.as_ref()
    }

    /// Component at `path` (`::`-separated labels).
    pub fn component(&self, path: &str) -> Option<&Element> {
        self.root.as_ref()?.component(path)
    }

    /// Locator of the root window.
    pub fn xpath(&self) -> Option<&str> {
        self.root.as_ref().map(Element::xpath)
    }

    /// Kind of the root window.
    pub fn element_type(&self) -> Option<ElementKind> {
        self.root.as_ref().map(Element::element_type)
    }

    /// Components of the root window.
    pub fn components(&self) -> Option<&ComponentRegistry> {
        self.root.as_ref().map(Element::components)
    }

    /// Force a fresh classification of the component at `path`.
    ///
    /// Returns `None` when no component has that path.
    pub fn inspect_component(&mut self, path: &str) -> Result<Option<&Element>> {
        let (parent_path, label) = match path.rsplit_once(PATH_SEPARATOR) {
            Some((parent, label)) => (parent, label),
            None => ("", path),
        };
        let definitions = definitions_for(&self.definitions, parent_path);
        if let Some(owner) = self.element(path).ok().and_then(|e| e.popup_owner.clone()) {
            self.open_popup(&owner)?;
        }
        let root = self.root.as_mut().ok_or_else(not_loaded)?;
        let ctx = ScanContext::for_container(&self.config, root, parent_path);

        let container = if parent_path.is_empty() {
            root
        } else {
            match root.component_mut(parent_path) {
                Some(container) => container,
                None => return Ok(None),
            }
        };
        let inspector = ContainerInspector::new(&self.driver, &self.config)?;
        inspector.inspect_component(container, label, &definitions, &ctx)
    }

    /// Live node of the component at `path` (empty for the root window).
    ///
    /// A missing or stale node is re-resolved through the component's
    /// locator, polling within the configured explicit wait. Options of a
    /// drop-down are re-resolved after opening the drop-down. Fails with
    /// [`Error::StaleNode`] when that also fails.
    pub fn resolve(&mut self, path: &str) -> Result<NodeHandle> {
        let element = self.element(path)?;
        if let Some(node) = element.node {
            if self.driver.is_live(node) {
                return Ok(node);
            }
        }
        let xpath = element.xpath.clone();
        let owner = element.popup_owner.clone();
        debug!("Re-resolving '{}' via {}", path, xpath);
        if let Some(owner) = owner {
            self.open_popup(&owner)?;
        }

        let policy = WaitPolicy::from_settings(&self.config.driver);
        let found = policy.poll(|| Ok(self.driver.find_or_empty(&xpath).into_iter().next()))?;
        match found {
            Some(node) => {
                self.element_mut(path)?.node = Some(node);
                Ok(node)
            }
            None => {
                warn!("Component '{}' no longer resolves ({})", path, xpath);
                Err(Error::StaleNode(format!("{path} ({xpath})")))
            }
        }
    }

    /// Click the component at `path`.
    ///
    /// Node references are dropped afterwards, since a click may move focus
    /// or spawn windows.
    pub fn click(&mut self, path: &str) -> Result<()> {
        let node = self.resolve(path)?;
        match self.driver.click(node) {
            Ok(()) => {}
            Err(Error::StaleNode(detail)) => {
                debug!("Node went stale before the click ({}), retrying once", detail);
                self.element_mut(path)?.node = None;
                let node = self.resolve(path)?;
                self.driver.click(node)?;
            }
            Err(e) => return Err(e),
        }
        info!("Clicked '{}'", path);
        self.invalidate();
        Ok(())
    }

    /// Drop every node reference; components are kept.
    pub fn invalidate(&mut self) {
        if let Some(root) = self.root.as_mut() {
            root.clear_nodes();
            self.status = SessionStatus::Invalidated;
            debug!("Session {} invalidated", self.id);
        }
    }

    /// Snapshot of the component tree for caching.
    pub fn cache(&self) -> Result<ComponentCache> {
        let root = self.root.as_ref().ok_or_else(not_loaded)?;
        Ok(ComponentCache::new(root.clone()))
    }

    /// Summary of this session.
    pub fn info(&self) -> SessionInfo {
        SessionInfo {
            id: self.id,
            status: self.status,
            root_xpath: self.xpath().map(str::to_string),
            component_count: self.components().map_or(0, ComponentRegistry::len),
        }
    }

    /// Mark the session closed and drop its component tree.
    pub fn close(&mut self) {
        self.root = None;
        self.status = SessionStatus::Closed;
        info!("Session {} closed", self.id);
    }

    /// Expand the drop-down at `owner` unless it is already open.
    fn open_popup(&self, owner: &str) -> Result<()> {
        let policy = WaitPolicy::from_settings(&self.config.driver);
        let found = policy.poll(|| Ok(self.driver.find_or_empty(owner).into_iter().next()))?;
        let Some(node) = found else {
            warn!("Drop-down {} no longer resolves", owner);
            return Err(Error::StaleNode(owner.to_string()));
        };
        if !self.driver.is_expanded(node) {
            debug!("Opening drop-down {}", owner);
            self.driver.click(node)?;
        }
        Ok(())
    }

    fn element(&self, path: &str) -> Result<&Element> {
        let root = self.root.as_ref().ok_or_else(not_loaded)?;
        if path.is_empty() {
            return Ok(root);
        }
        root.component(path)
            .ok_or_else(|| Error::ComponentNotFound(path.to_string()))
    }

    fn element_mut(&mut self, path: &str) -> Result<&mut Element> {
        let root = self.root.as_mut().ok_or_else(not_loaded)?;
        if path.is_empty() {
            return Ok(root);
        }
        root.component_mut(path)
            .ok_or_else(|| Error::ComponentNotFound(path.to_string()))
    }
}

fn not_loaded() -> Error {
    Error::ComponentNotFound("no component tree loaded".to_string())
}

/// Definitions of the container at `path`, following definition labels.
fn definitions_for(definitions: &[ComponentDefinition], path: &str) -> Vec<ComponentDefinition> {
    if path.is_empty() {
        return definitions.to_vec();
    }
    let mut current = definitions;
    for label in path.split(PATH_SEPARATOR) {
        match current.iter().find(|d| d.label == label) {
            Some(definition) => current = &definition.components,
            None => return Vec::new(),
        }
    }
    current.to_vec()
}
