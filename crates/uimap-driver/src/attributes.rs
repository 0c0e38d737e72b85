//! Attribute snapshots.

use uimap_core::{attr, BoundingRectangle, NodeHandle};

use crate::DriverExt;

/// The attributes classification and locator synthesis read from one node.
///
/// Fetched once per node; every field falls back to empty when the driver
/// cannot answer.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NodeAttributes {
    /// Full control type string (`ControlType.Edit`)
    pub control_type: String,
    /// Visible name
    pub name: String,
    /// Automation id
    pub automation_id: String,
    /// Toolkit class name
    pub class_name: String,
    /// Enabled flag (`true` when unknown)
    pub enabled: bool,
    /// Bounds, when the driver reports them
    pub bounds: Option<BoundingRectangle>,
}

impl NodeAttributes {
    /// Read the attributes of `node`.
    pub fn fetch<D: DriverExt + ?Sized>(driver: &D, node: NodeHandle) -> Self {
        let enabled = driver.attribute_or_empty(node, attr::IS_ENABLED);
        Self {
            control_type: attr::qualified_control_type(
                &driver.attribute_or_empty(node, attr::CONTROL_TYPE),
            ),
            name: driver.attribute_or_empty(node, attr::NAME),
            automation_id: driver.attribute_or_empty(node, attr::AUTOMATION_ID),
            class_name: driver.attribute_or_empty(node, attr::CLASS_NAME),
            enabled: enabled.is_empty() || attr::is_true(&enabled),
            bounds: driver.bounds_or_none(node),
        }
    }

    /// Control type without the `ControlType.` prefix.
    pub fn short_type(&self) -> &str {
        attr::short_control_type(&self.control_type)
    }

    /// Whether the short control type equals `short`.
    pub fn is(&self, short: &str) -> bool {
        self.short_type() == short
    }

    /// Class name, name and automation id are all blank.
    pub fn is_anonymous(&self) -> bool {
        self.class_name.trim().is_empty()
            && self.name.trim().is_empty()
            && self.automation_id.trim().is_empty()
    }
}
