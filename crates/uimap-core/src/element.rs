//! Typed, labeled wrappers around accessibility nodes.

use std::collections::BTreeMap;
use std::str::FromStr;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::locator::{Locator, Predicate};
use crate::registry::ComponentRegistry;
use crate::{BoundingRectangle, ElementKind, Result};

/// Opaque live handle into the accessibility tree, issued by the driver.
///
/// Handles do not survive serialization and must be treated as stale after
/// any gesture that may move focus or open windows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeHandle(pub u64);

impl std::fmt::Display for NodeHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "node#{}", self.0)
    }
}

/// Column layout of a table or tree-grid.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
pub struct TableSpec {
    /// Column header texts, left to right
    pub columns: Vec<String>,
    /// Number of data rows visible at scan time
    pub row_count: usize,
    /// Header height in pixels (toolkit constant)
    pub header_height: u32,
    /// Row height in pixels (toolkit constant)
    pub row_height: u32,
}

/// Items of a list.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
pub struct ListSpec {
    /// Item names in display order
    pub items: Vec<String>,
    /// Whether several items may be selected
    pub multi_select: bool,
}

/// Pages of a tab control.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
pub struct TabGroupSpec {
    /// Tab names in display order
    pub tabs: Vec<String>,
    /// Tab selected at scan time
    pub selected: Option<String>,
}

/// Top-level entries of a menu bar.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
pub struct MenuBarSpec {
    /// Menu names in display order
    pub menus: Vec<String>,
}

/// Specialized representation of a promoted element.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Specialization {
    /// Not promoted
    #[default]
    Generic,
    /// Data grid
    Table(TableSpec),
    /// Tree-grid
    HierTable(TableSpec),
    /// List
    List(ListSpec),
    /// Tab control
    TabGroup(TabGroupSpec),
    /// Menu bar
    MenuBar(MenuBarSpec),
}

impl Specialization {
    /// Whether the element was left generic.
    pub fn is_generic(&self) -> bool {
        matches!(self, Specialization::Generic)
    }
}

/// Locators of a container's scrollbars.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
pub struct ScrollBars {
    /// Vertical scrollbar locator
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vertical: Option<String>,
    /// Horizontal scrollbar locator
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub horizontal: Option<String>,
}

impl ScrollBars {
    /// No scrollbar recorded.
    pub fn is_empty(&self) -> bool {
        self.vertical.is_none() && self.horizontal.is_none()
    }
}

/// A classified, labeled control.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Element {
    /// Assigned label, possibly `(n)` indexed
    #[serde(default)]
    pub label: String,
    /// Synthesized locator, prefixed by the container's locator
    pub xpath: String,
    /// Raw control type string
    #[serde(default)]
    pub control_type: String,
    /// Automation id
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub automation_id: String,
    /// Visible name
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
    /// Toolkit class name
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub class_name: String,
    /// Classified kind
    pub element_type: ElementKind,
    /// Accepts typed input
    #[serde(default)]
    pub editable: bool,
    /// Free-form hint for downstream component handlers
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub component_type_hint: Option<String>,
    /// Per-element configuration
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub extra: BTreeMap<String, String>,
    /// Specialized representation
    #[serde(default, skip_serializing_if = "Specialization::is_generic")]
    pub specialization: Specialization,
    /// Scrollbar slots (containers only)
    #[serde(default, skip_serializing_if = "ScrollBars::is_empty")]
    pub scroll_bars: ScrollBars,
    /// Label element that named this element
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caption: Option<Box<Element>>,
    /// Named children, in registration order
    #[serde(default, skip_serializing_if = "ComponentRegistry::is_empty")]
    #[schemars(with = "BTreeMap<String, Element>")]
    pub components: ComponentRegistry,
    /// Locator of the drop-down that must be open for this element to exist
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub popup_owner: Option<String>,
    /// Locator of the owning container (non-owning back-reference)
    #[serde(skip)]
    pub container: Option<String>,
    /// Live node, dropped whenever the tree is invalidated
    #[serde(skip)]
    pub node: Option<NodeHandle>,
    /// Bounds at scan time
    #[serde(skip)]
    pub bounds: Option<BoundingRectangle>,
    /// 1-based position among same-control-type siblings at scan time
    #[serde(skip)]
    pub sibling_position: Option<usize>,
    /// Label supplied by a predeclared or cached definition
    #[serde(skip)]
    pub predeclared_label: Option<String>,
}

impl Element {
    /// Create an element with the given locator, control type and kind.
    pub fn new(xpath: impl Into<String>, control_type: impl Into<String>, kind: ElementKind) -> Self {
        Self {
            label: String::new(),
            xpath: xpath.into(),
            control_type: control_type.into(),
            automation_id: String::new(),
            name: String::new(),
            class_name: String::new(),
            element_type: kind,
            editable: kind.is_editable(),
            component_type_hint: None,
            extra: BTreeMap::new(),
            specialization: Specialization::Generic,
            scroll_bars: ScrollBars::default(),
            caption: None,
            components: ComponentRegistry::new(),
            popup_owner: None,
            container: None,
            node: None,
            bounds: None,
            sibling_position: None,
            predeclared_label: None,
        }
    }

    /// Set the label.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    /// Set the name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Set the automation id.
    pub fn with_automation_id(mut self, automation_id: impl Into<String>) -> Self {
        self.automation_id = automation_id.into();
        self
    }

    /// Set the scan-time bounds.
    pub fn with_bounds(mut self, bounds: BoundingRectangle) -> Self {
        self.bounds = Some(bounds);
        self
    }

    /// Locator of this element.
    pub fn xpath(&self) -> &str {
        &self.xpath
    }

    /// Classified kind.
    pub fn element_type(&self) -> ElementKind {
        self.element_type
    }

    /// Named children.
    pub fn components(&self) -> &ComponentRegistry {
        &self.components
    }

    /// Look up a child by label; `::` separates nested labels.
    pub fn component(&self, path: &str) -> Option<&Element> {
        self.components.get_path(path)
    }

    /// Mutable lookup by label path.
    pub fn component_mut(&mut self, path: &str) -> Option<&mut Element> {
        self.components.get_path_mut(path)
    }

    /// Parse a per-element setting out of `extra`.
    pub fn setting<T: FromStr>(&self, key: &str) -> Option<std::result::Result<T, T::Err>> {
        self.extra.get(key).map(|value| value.parse::<T>())
    }

    /// Register a child, resolving label collisions. Returns the final label.
    pub fn add_component(&mut self, mut child: Element) -> String {
        child.container = Some(self.xpath.clone());
        self.components.add(child)
    }

    /// Forget this element's label text once it has been bound as another element's caption.
    ///
    /// Blanks the name and removes the `@Name` predicate from the last
    /// locator step. If no automation id remains, the step is narrowed by
    /// control type and sibling position instead.
    pub fn strip_name(&mut self) -> Result<()> {
        self.name.clear();
        let mut locator = Locator::parse(&self.xpath)?;
        let Some(step) = locator.last_mut() else {
            return Ok(());
        };
        step.strip_name();

        if !step.has_attribute(crate::attr::AUTOMATION_ID) {
            if !step.has_attribute(crate::attr::CONTROL_TYPE) && !self.control_type.is_empty() {
                step.predicates
                    .push(Predicate::ControlType(self.control_type.clone()));
            }
            if step.position().is_none() && step.has_attribute(crate::attr::CONTROL_TYPE) {
                if let Some(position) = self.sibling_position {
                    step.predicates.push(Predicate::Position(position));
                }
            }
        }
        self.xpath = locator.to_string();
        Ok(())
    }

    /// Restore container back-references after deserialization.
    pub fn relink(&mut self) {
        let xpath = self.xpath.clone();
        for child in self.components.iter_mut() {
            child.container = Some(xpath.clone());
            child.relink();
        }
        if let Some(caption) = self.caption.as_mut() {
            caption.container = self.container.clone();
        }
    }

    /// Drop every live node reference in this subtree.
    pub fn clear_nodes(&mut self) {
        self.node = None;
        for child in self.components.iter_mut() {
            child.clear_nodes();
        }
        if let Some(caption) = self.caption.as_mut() {
            caption.node = None;
        }
    }

    /// Visit this element and every descendant, depth first.
    pub fn walk<'a>(&'a self, visit: &mut dyn FnMut(&'a Element)) {
        visit(self);
        for child in self.components.iter() {
            child.walk(visit);
        }
    }

    /// Mutable depth-first visit.
    pub fn walk_mut(&mut self, visit: &mut dyn FnMut(&mut Element)) {
        visit(self);
        for child in self.components.iter_mut() {
            child.walk_mut(visit);
        }
    }

    /// Label to xpath pairs of this subtree, nested labels joined with `::`.
    pub fn label_map(&self) -> BTreeMap<String, String> {
        fn collect(element: &Element, prefix: &str, out: &mut BTreeMap<String, String>) {
            for child in element.components.iter() {
                let path = if prefix.is_empty() {
                    child.label.clone()
                } else {
                    format!("{prefix}::{}", child.label)
                };
                out.insert(path.clone(), child.xpath.clone());
                collect(child, &path, out);
            }
        }
        let mut out = BTreeMap::new();
        collect(self, "", &mut out);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn window() -> Element {
        Element::new("/*[@Name='Main']", "ControlType.Window", ElementKind::Window)
            .with_label("Main")
            .with_name("Main")
    }

    #[test]
    fn test_new_sets_editable_from_kind() {
        let edit = Element::new("/*", "ControlType.Edit", ElementKind::Textbox);
        assert!(edit.editable);
        let button = Element::new("/*", "ControlType.Button", ElementKind::Button);
        assert!(!button.editable);
    }

    #[test]
    fn test_add_component_sets_container() {
        let mut root = window();
        let ok = Element::new("/*[@Name='Main']/*[@Name='OK']", "ControlType.Button", ElementKind::Button)
            .with_label("OK");
        let label = root.add_component(ok);
        assert_eq!(label, "OK");
        assert_eq!(
            root.component("OK").unwrap().container.as_deref(),
            Some("/*[@Name='Main']")
        );
    }

    #[test]
    fn test_nested_component_path() {
        let mut root = window();
        let mut group = Element::new(
            "/*[@Name='Main']/*[@Name='Address']",
            "ControlType.Group",
            ElementKind::LabelGrouping,
        )
        .with_label("Address");
        group.add_component(
            Element::new(
                "/*[@Name='Main']/*[@Name='Address']/*[@AutomationId='zip']",
                "ControlType.Edit",
                ElementKind::Textbox,
            )
            .with_label("Zip"),
        );
        root.add_component(group);

        let zip = root.component("Address::Zip").unwrap();
        assert_eq!(zip.element_type(), ElementKind::Textbox);
        assert!(root.component("Address::City").is_none());
        assert!(root.component("Zip").is_none());
    }

    #[test]
    fn test_strip_name_keeps_control_type_and_position() {
        let mut label = Element::new(
            "/*[@Name='Main']/*[@Name='User Name' and @ControlType='ControlType.Text']",
            "ControlType.Text",
            ElementKind::Label,
        )
        .with_name("User Name");
        label.sibling_position = Some(2);

        label.strip_name().unwrap();
        assert!(label.name.is_empty());
        assert_eq!(
            label.xpath,
            "/*[@Name='Main']/*[@ControlType='ControlType.Text' and position()=2]"
        );
        assert!(!label.xpath.ends_with("@Name='User Name']"));
    }

    #[test]
    fn test_strip_name_with_automation_id_adds_nothing() {
        let mut label = Element::new(
            "/*[@Name='Main']/*[@AutomationId='lblUser' and @Name='User']",
            "ControlType.Text",
            ElementKind::Label,
        );
        label.sibling_position = Some(1);
        label.strip_name().unwrap();
        assert_eq!(label.xpath, "/*[@Name='Main']/*[@AutomationId='lblUser']");
    }

    #[test]
    fn test_setting_parses_extra() {
        let mut element = window();
        element
            .extra
            .insert("layout".to_string(), "two_line".to_string());
        let layout: crate::Layout = element.setting("layout").unwrap().unwrap();
        assert_eq!(layout, crate::Layout::TwoLine);
        assert!(element.setting::<crate::Layout>("missing").is_none());
    }

    #[test]
    fn test_serialization_skips_live_state() {
        let mut element = window();
        element.node = Some(NodeHandle(7));
        element.bounds = Some(BoundingRectangle::new(0, 0, 10, 10));

        let json = serde_json::to_string(&element).unwrap();
        assert!(!json.contains("node"));
        assert!(!json.contains("bounds"));

        let back: Element = serde_json::from_str(&json).unwrap();
        assert_eq!(back.node, None);
        assert_eq!(back.xpath, element.xpath);
    }

    #[test]
    fn test_relink_and_clear_nodes() {
        let mut root = window();
        let mut ok = Element::new("/*[@Name='Main']/*[@Name='OK']", "ControlType.Button", ElementKind::Button)
            .with_label("OK");
        ok.node = Some(NodeHandle(3));
        root.add_component(ok);

        let json = serde_json::to_string(&root).unwrap();
        let mut back: Element = serde_json::from_str(&json).unwrap();
        assert_eq!(back.component("OK").unwrap().container, None);
        back.relink();
        assert_eq!(
            back.component("OK").unwrap().container.as_deref(),
            Some("/*[@Name='Main']")
        );

        root.clear_nodes();
        assert_eq!(root.component("OK").unwrap().node, None);
    }

    #[test]
    fn test_label_map() {
        let mut root = window();
        root.add_component(
            Element::new("/*[@Name='Main']/*[@Name='OK']", "ControlType.Button", ElementKind::Button)
                .with_label("OK"),
        );
        let map = root.label_map();
        assert_eq!(map.get("OK").map(String::as_str), Some("/*[@Name='Main']/*[@Name='OK']"));
    }

    #[test]
    fn test_specialization_serialization_is_tagged() {
        let spec = Specialization::List(ListSpec {
            items: vec!["Red".to_string()],
            multi_select: true,
        });
        let json = serde_json::to_value(&spec).unwrap();
        assert_eq!(json["kind"], "list");
        assert_eq!(json["multi_select"], true);
    }
}
