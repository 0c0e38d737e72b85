//! Type classification.
//!
//! Maps a node's control type, plus a few secondary attributes and the
//! shape of its children, to one [`ElementKind`]. Combo boxes are opened to
//! look at their drop-down and closed again afterwards.

use regex::Regex;
use tracing::{debug, error, warn};

use uimap_core::{
    attr, ClassificationSettings, ComboHeuristic, ElementKind, Error, NodeHandle, Result,
};
use uimap_driver::{Driver, DriverExt, NodeAttributes};

/// Outcome of classifying one node.
#[derive(Debug, Clone, PartialEq)]
pub enum Classification {
    /// The node is an element of this kind
    Kind(ElementKind),
    /// The node is a radio group posing as a combo box; its children (with
    /// attributes read while visible) replace it as siblings
    PromoteChildren(Vec<(NodeHandle, NodeAttributes)>),
}

/// Classifies nodes through a driver.
pub struct TypeClassifier<'a, D: Driver + ?Sized> {
    driver: &'a D,
    settings: &'a ClassificationSettings,
    option_set: Option<Regex>,
}

impl<'a, D: Driver + ?Sized> TypeClassifier<'a, D> {
    /// Create a classifier.
    pub fn new(driver: &'a D, settings: &'a ClassificationSettings) -> Result<Self> {
        let option_set = settings
            .option_set_pattern
            .as_deref()
            .map(Regex::new)
            .transpose()
            .map_err(|e| Error::Config(format!("Invalid option_set_pattern: {e}")))?;
        Ok(Self {
            driver,
            settings,
            option_set,
        })
    }

    /// Classify `node`.
    ///
    /// `allow_probe` permits clicking combo boxes open. Fails with
    /// [`Error::Unclassified`] or [`Error::AmbiguousComboShape`].
    pub fn classify(
        &self,
        node: NodeHandle,
        attrs: &NodeAttributes,
        heuristic: ComboHeuristic,
        allow_probe: bool,
    ) -> Result<Classification> {
        let kind = match attrs.short_type() {
            "TitleBar" => ElementKind::TitleBar,
            "StatusBar" => ElementKind::StatusBar,
            "ToolBar" => ElementKind::ToolBar,
            "MenuBar" => ElementKind::MenuBar,
            "MenuItem" => ElementKind::MenuItem,
            "CheckBox" => ElementKind::Checkbox,
            "RadioButton" => ElementKind::Radio,
            "Button" | "SplitButton" | "Hyperlink" => ElementKind::Button,
            "Group" => ElementKind::LabelGrouping,
            "Text" => ElementKind::Label,
            "Document" => ElementKind::TextArea,
            "Table" | "DataGrid" => ElementKind::Table,
            "Tree" => ElementKind::HierTable,
            "List" => self.classify_list(attrs),
            "ListItem" | "DataItem" => ElementKind::ListItem,
            "ComboBox" => return self.probe_combo(node, attrs, heuristic, allow_probe),
            "Window" => self.classify_window(node),
            "Pane" => self.classify_pane(node, attrs),
            "Edit" => self.classify_edit(node),
            "Tab" => ElementKind::TabGroup,
            "TabItem" => ElementKind::Tab,
            "Custom" => self.classify_custom(node, attrs, heuristic, allow_probe),
            _ => return Err(unclassified(attrs)),
        };
        debug!("{} classified as {}", node, kind);
        Ok(Classification::Kind(kind))
    }

    fn classify_list(&self, attrs: &NodeAttributes) -> ElementKind {
        let option_set = self
            .option_set
            .as_ref()
            .is_some_and(|re| !attrs.automation_id.is_empty() && re.is_match(&attrs.automation_id));
        if option_set {
            ElementKind::Form
        } else {
            ElementKind::ListGrouping
        }
    }

    fn classify_window(&self, node: NodeHandle) -> ElementKind {
        if attr::is_true(&self.driver.attribute_or_empty(node, attr::IS_MODAL)) {
            ElementKind::Dialog
        } else {
            ElementKind::Window
        }
    }

    fn classify_pane(&self, node: NodeHandle, attrs: &NodeAttributes) -> ElementKind {
        if self
            .settings
            .text_pane_class_names
            .iter()
            .any(|class| class == &attrs.class_name)
        {
            return ElementKind::TextPane;
        }
        let children = self.driver.children_or_empty(node);
        if !(1..=2).contains(&children.len()) {
            return ElementKind::Form;
        }
        let first = self.driver.attribute_or_empty(children[0], attr::CONTROL_TYPE);
        match attr::short_control_type(&first) {
            "Document" => ElementKind::TextArea,
            "Edit" => ElementKind::Textbox,
            "List" => ElementKind::ListGrouping,
            _ => ElementKind::Form,
        }
    }

    fn classify_edit(&self, node: NodeHandle) -> ElementKind {
        let nested_edit = self.driver.children_or_empty(node).into_iter().any(|child| {
            attr::short_control_type(&self.driver.attribute_or_empty(child, attr::CONTROL_TYPE))
                == "Edit"
        });
        if nested_edit {
            ElementKind::FormattedTextbox
        } else {
            ElementKind::Textbox
        }
    }

    fn classify_custom(
        &self,
        node: NodeHandle,
        attrs: &NodeAttributes,
        heuristic: ComboHeuristic,
        allow_probe: bool,
    ) -> ElementKind {
        if attrs.name == self.settings.grip_name {
            return ElementKind::Grip;
        }
        let children = self.driver.children_or_empty(node);
        if let [only] = children.as_slice() {
            let child_attrs = NodeAttributes::fetch(self.driver, *only);
            if let Ok(Classification::Kind(kind)) = self.classify(*only, &child_attrs, heuristic, allow_probe) {
                debug!("{} wraps a single {}", node, kind);
                return kind;
            }
        }
        ElementKind::CustomGrouping
    }

    /// Open a combo box, classify it by the shape of its drop-down, and
    /// restore its original open/closed state.
    pub fn probe_combo(
        &self,
        node: NodeHandle,
        attrs: &NodeAttributes,
        heuristic: ComboHeuristic,
        allow_probe: bool,
    ) -> Result<Classification> {
        let was_expanded = self.driver.is_expanded(node);
        let mut opened = false;
        if !was_expanded && allow_probe && self.settings.probe_combos {
            match self.driver.click(node) {
                Ok(()) => opened = true,
                Err(e) => warn!("Could not open combo {}: {}", node, e),
            }
        }

        let children: Vec<(NodeHandle, NodeAttributes)> = self
            .driver
            .children_or_empty(node)
            .into_iter()
            .map(|child| (child, NodeAttributes::fetch(self.driver, child)))
            .collect();

        let use_child_count = heuristic == ComboHeuristic::ChildCount
            || self.settings.uses_child_count(&attrs.class_name);
        let shape = match use_child_count.then(|| self.shape_by_child_count(attrs, &children)) {
            Some(Some(classification)) => Ok(classification),
            _ => self.shape_by_first_child(attrs, &children),
        };

        if opened {
            if let Err(e) = self.driver.click(node) {
                error!("Could not close combo {} after probing: {}", node, e);
            }
        }

        if let Ok(Classification::Kind(kind)) = &shape {
            debug!("{} probed as {}", node, kind);
        }
        shape
    }

    fn shape_by_first_child(
        &self,
        attrs: &NodeAttributes,
        children: &[(NodeHandle, NodeAttributes)],
    ) -> Result<Classification> {
        let Some((first, first_attrs)) = children.first() else {
            warn!(
                "Combo '{}' ({}) shows no children; assuming not editable, re-probe when enabled",
                attrs.name, attrs.automation_id
            );
            return Ok(Classification::Kind(ElementKind::SingleSelectComboNotEditable));
        };

        if children.iter().all(|(_, a)| a.is("RadioButton")) {
            return Ok(Classification::PromoteChildren(children.to_vec()));
        }

        let kind = match first_attrs.short_type() {
            "Edit" => self.editable_combo_kind(attrs),
            "List" => self.list_combo_kind(*first),
            "ComboBox" => self.nested_combo_kind(*first, first_attrs),
            other => {
                return Err(Error::AmbiguousComboShape(format!(
                    "combo '{}' ({}) opens onto a {} first child",
                    attrs.name, attrs.automation_id, other
                )))
            }
        };
        Ok(Classification::Kind(kind))
    }

    /// Tally children by type; `None` when the tally is inconclusive.
    fn shape_by_child_count(
        &self,
        attrs: &NodeAttributes,
        children: &[(NodeHandle, NodeAttributes)],
    ) -> Option<Classification> {
        let count = |short: &str| children.iter().filter(|(_, a)| a.is(short)).count();
        let edits = count("Edit");
        let lists = count("List");
        let list_items = count("ListItem");
        let combos = count("ComboBox");
        let radios = count("RadioButton");
        debug!(
            "combo tally: {} edits, {} lists, {} items, {} combos, {} radios",
            edits, lists, list_items, combos, radios
        );

        if radios > 0 && radios == children.len() {
            return Some(Classification::PromoteChildren(children.to_vec()));
        }
        let kind = if lists == 1 {
            let (list, _) = children.iter().find(|(_, a)| a.is("List"))?;
            self.list_combo_kind(*list)
        } else if combos == 1 && edits == 0 {
            let (combo, combo_attrs) = children.iter().find(|(_, a)| a.is("ComboBox"))?;
            self.nested_combo_kind(*combo, combo_attrs)
        } else if edits >= 1 && lists == 0 && combos == 0 && list_items == 0 {
            self.editable_combo_kind(attrs)
        } else if list_items > 0 && edits == 1 {
            ElementKind::SingleSelectCombo
        } else if list_items > 0 && edits == 0 {
            ElementKind::SingleSelectComboNotEditable
        } else {
            return None;
        };
        Some(Classification::Kind(kind))
    }

    fn editable_combo_kind(&self, attrs: &NodeAttributes) -> ElementKind {
        if !self.settings.date_time_hint.is_empty()
            && attrs.automation_id.contains(&self.settings.date_time_hint)
        {
            ElementKind::DateTimeCombo
        } else {
            ElementKind::TypeAheadCombo
        }
    }

    fn list_combo_kind(&self, list: NodeHandle) -> ElementKind {
        if attr::is_true(&self.driver.attribute_or_empty(list, attr::CAN_SELECT_MULTIPLE)) {
            ElementKind::MultiSelectCombo
        } else {
            ElementKind::SingleSelectList
        }
    }

    fn nested_combo_kind(&self, combo: NodeHandle, combo_attrs: &NodeAttributes) -> ElementKind {
        let holds_edit = self.driver.children_or_empty(combo).into_iter().any(|child| {
            attr::short_control_type(&self.driver.attribute_or_empty(child, attr::CONTROL_TYPE))
                == "Edit"
        });
        if holds_edit {
            ElementKind::DateTimeCombo
        } else if combo_attrs.enabled {
            ElementKind::SingleSelectCombo
        } else {
            ElementKind::SingleSelectComboNotEditable
        }
    }
}

fn unclassified(attrs: &NodeAttributes) -> Error {
    Error::Unclassified {
        control_type: attrs.control_type.clone(),
        name: attrs.name.clone(),
        automation_id: attrs.automation_id.clone(),
    }
}
