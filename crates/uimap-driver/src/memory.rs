//! In-memory replay of a recorded accessibility tree.
//!
//! A recording is a YAML or JSON document describing the application's main
//! window and its descendants:
//!
//! ```yaml
//! control_type: Window
//! name: Login
//! bounds: "0,0,400,300"
//! children:
//!   - control_type: Text
//!     name: User Name
//!     bounds: "10,10,80,18"
//!   - control_type: Edit
//!     automation_id: txtUser
//!     bounds: "100,11,200,20"
//!   - control_type: ComboBox
//!     automation_id: cmbColors
//!     popup:
//!       - control_type: List
//!         attributes:
//!           Selection.CanSelectMultiple: "True"
//! ```
//!
//! `popup` children only exist while their owner is expanded; clicking the
//! owner toggles it. Handles carry an epoch, and [`MemoryDriver::invalidate`]
//! makes every handle issued so far stale.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use uimap_core::{
    attr, Axis, BoundingRectangle, Error, Locator, NodeHandle, Predicate, Result, Step,
};

use crate::Driver;

/// One node of a recorded tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecordedNode {
    /// Control type, short (`Edit`) or full (`ControlType.Edit`)
    pub control_type: String,
    /// Visible name
    #[serde(skip_serializing_if = "String::is_empty")]
    pub name: String,
    /// Automation id
    #[serde(skip_serializing_if = "String::is_empty")]
    pub automation_id: String,
    /// Toolkit class name
    #[serde(skip_serializing_if = "String::is_empty")]
    pub class_name: String,
    /// Enabled flag
    pub enabled: bool,
    /// Bounds as `"x,y,w,h"`
    #[serde(with = "bounds_text", skip_serializing_if = "Option::is_none")]
    pub bounds: Option<BoundingRectangle>,
    /// Further attributes (`Window.IsModal`, `Selection.CanSelectMultiple`, ...)
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub attributes: BTreeMap<String, String>,
    /// Children, always present
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<RecordedNode>,
    /// Children present only while this node is expanded
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub popup: Vec<RecordedNode>,
}

impl Default for RecordedNode {
    fn default() -> Self {
        Self {
            control_type: String::new(),
            name: String::new(),
            automation_id: String::new(),
            class_name: String::new(),
            enabled: true,
            bounds: None,
            attributes: BTreeMap::new(),
            children: Vec::new(),
            popup: Vec::new(),
        }
    }
}

impl RecordedNode {
    /// Create a node of the given control type.
    pub fn new(control_type: impl Into<String>) -> Self {
        Self {
            control_type: control_type.into(),
            ..Self::default()
        }
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

    /// Set the class name.
    pub fn with_class_name(mut self, class_name: impl Into<String>) -> Self {
        self.class_name = class_name.into();
        self
    }

    /// Set the bounds.
    pub fn with_bounds(mut self, x: i32, y: i32, width: i32, height: i32) -> Self {
        self.bounds = Some(BoundingRectangle::new(x, y, width, height));
        self
    }

    /// Set a further attribute.
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    /// Mark as disabled.
    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    /// Append a child.
    pub fn with_child(mut self, child: RecordedNode) -> Self {
        self.children.push(child);
        self
    }

    /// Append several children.
    pub fn with_children(mut self, children: impl IntoIterator<Item = RecordedNode>) -> Self {
        self.children.extend(children);
        self
    }

    /// Append a child shown only while expanded.
    pub fn with_popup(mut self, child: RecordedNode) -> Self {
        self.popup.push(child);
        self
    }

    fn validate(&self) -> Result<()> {
        if self.control_type.trim().is_empty() {
            return Err(Error::Config(format!(
                "recorded node '{}' has no control_type",
                if self.name.is_empty() { &self.automation_id } else { &self.name }
            )));
        }
        self.children.iter().try_for_each(RecordedNode::validate)?;
        self.popup.iter().try_for_each(RecordedNode::validate)
    }
}

mod bounds_text {
    use serde::{Deserialize, Deserializer, Serializer};
    use uimap_core::BoundingRectangle;

    pub fn serialize<S: Serializer>(
        bounds: &Option<BoundingRectangle>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match bounds {
            Some(b) => serializer.serialize_str(&format!("{},{},{},{}", b.x, b.y, b.width, b.height)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<BoundingRectangle>, D::Error> {
        let text: Option<String> = Option::deserialize(deserializer)?;
        match text {
            None => Ok(None),
            Some(text) => BoundingRectangle::parse(&text)
                .map(Some)
                .ok_or_else(|| serde::de::Error::custom(format!("invalid bounds '{text}'"))),
        }
    }
}

#[derive(Debug)]
struct NodeData {
    control_type: String,
    name: String,
    automation_id: String,
    class_name: String,
    enabled: bool,
    bounds: Option<BoundingRectangle>,
    attributes: BTreeMap<String, String>,
    parent: Option<usize>,
    children: Vec<usize>,
    popup: Vec<usize>,
    in_popup: bool,
    expanded: bool,
}

#[derive(Debug, Default)]
struct State {
    nodes: Vec<NodeData>,
    epoch: u32,
    clicks: Vec<usize>,
}

impl State {
    fn push(&mut self, record: &RecordedNode, parent: Option<usize>, in_popup: bool) -> usize {
        let index = self.nodes.len();
        self.nodes.push(NodeData {
            control_type: attr::qualified_control_type(record.control_type.trim()),
            name: record.name.clone(),
            automation_id: record.automation_id.clone(),
            class_name: record.class_name.clone(),
            enabled: record.enabled,
            bounds: record.bounds,
            attributes: record.attributes.clone(),
            parent,
            children: Vec::new(),
            popup: Vec::new(),
            in_popup,
            expanded: false,
        });
        for child in &record.children {
            let child_index = self.push(child, Some(index), false);
            self.nodes[index].children.push(child_index);
        }
        for child in &record.popup {
            let child_index = self.push(child, Some(index), true);
            self.nodes[index].popup.push(child_index);
        }
        index
    }

    fn handle(&self, index: usize) -> NodeHandle {
        NodeHandle((u64::from(self.epoch) << 32) | index as u64)
    }

    fn visible(&self, index: usize) -> bool {
        let mut current = index;
        loop {
            let node = &self.nodes[current];
            match node.parent {
                Some(parent) => {
                    if node.in_popup && !self.nodes[parent].expanded {
                        return false;
                    }
                    current = parent;
                }
                None => return true,
            }
        }
    }

    fn resolve(&self, handle: NodeHandle) -> Result<usize> {
        let epoch = (handle.0 >> 32) as u32;
        let index = (handle.0 & 0xffff_ffff) as usize;
        if epoch != self.epoch || index >= self.nodes.len() || !self.visible(index) {
            return Err(Error::StaleNode(handle.to_string()));
        }
        Ok(index)
    }

    /// Visible children; `None` is the desktop, whose only child is the main window.
    fn visible_children(&self, parent: Option<usize>) -> Vec<usize> {
        match parent {
            None => {
                if self.nodes.is_empty() {
                    Vec::new()
                } else {
                    vec![0]
                }
            }
            Some(index) => {
                let node = &self.nodes[index];
                let mut children = node.children.clone();
                if node.expanded {
                    children.extend(node.popup.iter().copied());
                }
                children
            }
        }
    }

    fn self_and_descendants(&self, start: Option<usize>) -> Vec<Option<usize>> {
        let mut out = vec![start];
        let mut i = 0;
        while i < out.len() {
            let children = self.visible_children(out[i]);
            out.extend(children.into_iter().map(Some));
            i += 1;
        }
        out
    }

    fn matches(&self, index: usize, predicate: &Predicate) -> bool {
        let node = &self.nodes[index];
        match predicate {
            Predicate::AutomationId(v) => node.automation_id == *v,
            Predicate::Name(v) => node.name == *v,
            Predicate::ControlType(v) => node.control_type == attr::qualified_control_type(v),
            Predicate::ClassName(v) => node.class_name == *v,
            Predicate::Position(_) => true,
        }
    }

    fn select(&self, step: &Step, candidates: Vec<usize>) -> Vec<usize> {
        let matching: Vec<usize> = candidates
            .into_iter()
            .filter(|&i| step.attribute_predicates().all(|p| self.matches(i, p)))
            .collect();
        match step.position() {
            Some(position) => matching.get(position - 1).copied().into_iter().collect(),
            None => matching,
        }
    }

    fn evaluate(&self, locator: &Locator) -> Vec<usize> {
        let mut contexts: Vec<Option<usize>> = vec![None];
        for step in &locator.steps {
            let mut next: Vec<usize> = Vec::new();
            for context in &contexts {
                let parents = match step.axis {
                    Axis::Child => vec![*context],
                    Axis::Descendant => self.self_and_descendants(*context),
                };
                for parent in parents {
                    for index in self.select(step, self.visible_children(parent)) {
                        if !next.contains(&index) {
                            next.push(index);
                        }
                    }
                }
            }
            contexts = next.into_iter().map(Some).collect();
        }
        contexts.into_iter().flatten().collect()
    }
}

/// Driver replaying a recorded tree.
///
/// Single-threaded, like the scans it serves.
#[derive(Debug)]
pub struct MemoryDriver {
    state: RefCell<State>,
    failing_attributes: Vec<String>,
}

impl MemoryDriver {
    /// Replay `root` as the application's main window.
    pub fn new(root: RecordedNode) -> Self {
        let mut state = State::default();
        state.push(&root, None, false);
        Self {
            state: RefCell::new(state),
            failing_attributes: Vec::new(),
        }
    }

    /// Parse a recording from YAML.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let root: RecordedNode = serde_yaml::from_str(yaml)?;
        root.validate()?;
        Ok(Self::new(root))
    }

    /// Parse a recording from JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        let root: RecordedNode = serde_json::from_str(json)?;
        root.validate()?;
        Ok(Self::new(root))
    }

    /// Load a recording, JSON when the extension is `.json`, YAML otherwise.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let is_json = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("json"));
        if is_json {
            Self::from_json(&content)
        } else {
            Self::from_yaml(&content)
        }
    }

    /// Make every reading of `name` fail, as a broken transport would.
    pub fn with_failing_attribute(mut self, name: impl Into<String>) -> Self {
        self.failing_attributes.push(name.into());
        self
    }

    /// Make every handle issued so far stale (focus change, re-render).
    pub fn invalidate(&self) {
        let mut state = self.state.borrow_mut();
        state.epoch = state.epoch.wrapping_add(1);
        debug!("recorded tree invalidated, epoch {}", state.epoch);
    }

    /// Number of clicks received.
    pub fn click_count(&self) -> usize {
        self.state.borrow().clicks.len()
    }

    /// Name (or automation id) of every clicked node, in order.
    pub fn clicked(&self) -> Vec<String> {
        let state = self.state.borrow();
        state
            .clicks
            .iter()
            .map(|&i| {
                let node = &state.nodes[i];
                if node.name.is_empty() {
                    node.automation_id.clone()
                } else {
                    node.name.clone()
                }
            })
            .collect()
    }

    /// Number of drop-downs currently expanded.
    pub fn expanded_count(&self) -> usize {
        self.state
            .borrow()
            .nodes
            .iter()
            .filter(|n| n.expanded)
            .count()
    }
}

impl Driver for MemoryDriver {
    fn root(&self) -> Result<NodeHandle> {
        let state = self.state.borrow();
        if state.nodes.is_empty() {
            return Err(Error::Driver("recording has no main window".to_string()));
        }
        Ok(state.handle(0))
    }

    fn find_children(&self, node: NodeHandle) -> Result<Vec<NodeHandle>> {
        let state = self.state.borrow();
        let index = state.resolve(node)?;
        Ok(state
            .visible_children(Some(index))
            .into_iter()
            .map(|i| state.handle(i))
            .collect())
    }

    fn find_by_locator(&self, locator: &str) -> Result<Vec<NodeHandle>> {
        let parsed = Locator::parse(locator)?;
        let state = self.state.borrow();
        let found: Vec<NodeHandle> = state
            .evaluate(&parsed)
            .into_iter()
            .map(|i| state.handle(i))
            .collect();
        trace!("{} matched {} node(s)", locator, found.len());
        Ok(found)
    }

    fn click(&self, node: NodeHandle) -> Result<()> {
        let mut state = self.state.borrow_mut();
        let index = state.resolve(node)?;
        state.clicks.push(index);
        if !state.nodes[index].popup.is_empty() {
            let expanded = !state.nodes[index].expanded;
            state.nodes[index].expanded = expanded;
        } else if state.nodes[index].in_popup {
            // selecting an item closes the drop-down that owns it
            let mut current = index;
            loop {
                let Some(parent) = state.nodes[current].parent else {
                    break;
                };
                if state.nodes[current].in_popup {
                    state.nodes[parent].expanded = false;
                    break;
                }
                current = parent;
            }
        }
        Ok(())
    }

    fn attribute(&self, node: NodeHandle, name: &str) -> Result<String> {
        let state = self.state.borrow();
        let index = state.resolve(node)?;
        if self.failing_attributes.iter().any(|f| f == name) {
            return Err(Error::Driver(format!("{node}: attribute '{name}' unavailable")));
        }
        let data = &state.nodes[index];
        let value = match name {
            attr::NAME => data.name.clone(),
            attr::AUTOMATION_ID => data.automation_id.clone(),
            attr::CLASS_NAME => data.class_name.clone(),
            attr::CONTROL_TYPE => data.control_type.clone(),
            attr::IS_ENABLED => (if data.enabled { "True" } else { "False" }).to_string(),
            attr::EXPAND_COLLAPSE_STATE if !data.popup.is_empty() => {
                (if data.expanded { "Expanded" } else { "Collapsed" }).to_string()
            }
            other => data.attributes.get(other).cloned().ok_or_else(|| {
                Error::Driver(format!("{node}: attribute '{other}' not supported"))
            })?,
        };
        Ok(value)
    }

    fn bounding_rectangle(&self, node: NodeHandle) -> Result<BoundingRectangle> {
        let state = self.state.borrow();
        let index = state.resolve(node)?;
        state.nodes[index]
            .bounds
            .ok_or_else(|| Error::Driver(format!("{node}: no bounding rectangle")))
    }
}
