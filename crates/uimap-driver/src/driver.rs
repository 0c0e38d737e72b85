//! The driver trait and its lossy helpers.

use tracing::debug;

use uimap_core::{attr, BoundingRectangle, NodeHandle, Result};

/// Blocking access to a live accessibility tree.
///
/// Every call is one round trip to the remote driver. Implementations own
/// transport-level retries; callers never retry.
pub trait Driver {
    /// Top-level window of the application under test.
    fn root(&self) -> Result<NodeHandle>;

    /// Direct children of `node`, in tree order.
    fn find_children(&self, node: NodeHandle) -> Result<Vec<NodeHandle>>;

    /// Every node matching an absolute locator.
    fn find_by_locator(&self, locator: &str) -> Result<Vec<NodeHandle>>;

    /// Click `node`. Handles issued before the click may be stale afterwards.
    fn click(&self, node: NodeHandle) -> Result<()>;

    /// Read one attribute of `node`.
    fn attribute(&self, node: NodeHandle, name: &str) -> Result<String>;

    /// Bounding rectangle of `node`.
    fn bounding_rectangle(&self, node: NodeHandle) -> Result<BoundingRectangle>;
}

impl<D: Driver + ?Sized> Driver for &D {
    fn root(&self) -> Result<NodeHandle> {
        (**self).root()
    }

    fn find_children(&self, node: NodeHandle) -> Result<Vec<NodeHandle>> {
        (**self).find_children(node)
    }

    fn find_by_locator(&self, locator: &str) -> Result<Vec<NodeHandle>> {
        (**self).find_by_locator(locator)
    }

    fn click(&self, node: NodeHandle) -> Result<()> {
        (**self).click(node)
    }

    fn attribute(&self, node: NodeHandle, name: &str) -> Result<String> {
        (**self).attribute(node, name)
    }

    fn bounding_rectangle(&self, node: NodeHandle) -> Result<BoundingRectangle> {
        (**self).bounding_rectangle(node)
    }
}

impl<D: Driver + ?Sized> Driver for Box<D> {
    fn root(&self) -> Result<NodeHandle> {
        (**self).root()
    }

    fn find_children(&self, node: NodeHandle) -> Result<Vec<NodeHandle>> {
        (**self).find_children(node)
    }

    fn find_by_locator(&self, locator: &str) -> Result<Vec<NodeHandle>> {
        (**self).find_by_locator(locator)
    }

    fn click(&self, node: NodeHandle) -> Result<()> {
        (**self).click(node)
    }

    fn attribute(&self, node: NodeHandle, name: &str) -> Result<String> {
        (**self).attribute(node, name)
    }

    fn bounding_rectangle(&self, node: NodeHandle) -> Result<BoundingRectangle> {
        (**self).bounding_rectangle(node)
    }
}

/// Lossy queries: a failed round trip reads as "not found".
pub trait DriverExt: Driver {
    /// Attribute value, empty on failure.
    fn attribute_or_empty(&self, node: NodeHandle, name: &str) -> String {
        match self.attribute(node, name) {
            Ok(value) => value,
            Err(e) => {
                debug!("{} attribute '{}' unavailable: {}", node, name, e);
                String::new()
            }
        }
    }

    /// Children, empty on failure.
    fn children_or_empty(&self, node: NodeHandle) -> Vec<NodeHandle> {
        match self.find_children(node) {
            Ok(children) => children,
            Err(e) => {
                debug!("{} children unavailable: {}", node, e);
                Vec::new()
            }
        }
    }

    /// Bounds, `None` on failure.
    fn bounds_or_none(&self, node: NodeHandle) -> Option<BoundingRectangle> {
        match self.bounding_rectangle(node) {
            Ok(bounds) => Some(bounds),
            Err(e) => {
                debug!("{} bounds unavailable: {}", node, e);
                None
            }
        }
    }

    /// Nodes matching `locator`, empty on failure.
    fn find_or_empty(&self, locator: &str) -> Vec<NodeHandle> {
        match self.find_by_locator(locator) {
            Ok(nodes) => nodes,
            Err(e) => {
                debug!("locator {} unresolved: {}", locator, e);
                Vec::new()
            }
        }
    }

    /// Whether a drop-down reports itself expanded.
    fn is_expanded(&self, node: NodeHandle) -> bool {
        self.attribute_or_empty(node, attr::EXPAND_COLLAPSE_STATE)
            .eq_ignore_ascii_case("expanded")
    }

    /// Whether `node` answers a round trip at all.
    fn is_live(&self, node: NodeHandle) -> bool {
        self.attribute(node, attr::CONTROL_TYPE).is_ok()
    }
}

impl<D: Driver + ?Sized> DriverExt for D {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{MemoryDriver, RecordedNode};

    fn driver() -> MemoryDriver {
        MemoryDriver::new(
            RecordedNode::new("Window")
                .with_name("Main")
                .with_child(RecordedNode::new("Edit").with_automation_id("txtUser")),
        )
    }

    #[test]
    fn test_attribute_or_empty_swallows_failure() {
        let driver = driver().with_failing_attribute(attr::NAME);
        let root = driver.root().unwrap();
        assert!(driver.attribute(root, attr::NAME).is_err());
        assert_eq!(driver.attribute_or_empty(root, attr::NAME), "");
    }

    #[test]
    fn test_children_or_empty_on_stale_handle() {
        let driver = driver();
        let root = driver.root().unwrap();
        driver.invalidate();
        assert!(driver.find_children(root).is_err());
        assert!(driver.children_or_empty(root).is_empty());
        assert!(!driver.is_live(root));
    }

    #[test]
    fn test_driver_through_reference() {
        let driver = driver();
        let by_ref: &dyn Driver = &driver;
        let root = by_ref.root().unwrap();
        assert_eq!(by_ref.children_or_empty(root).len(), 1);
    }
}
