//! Semantic kinds assigned to classified controls.

use std::fmt;
use std::str::FromStr;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// The semantic category of a classified control.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ElementKind {
    /// Top-level, non-modal window
    Window,
    /// Modal window
    Dialog,
    /// Window title bar
    TitleBar,
    /// Status bar
    StatusBar,
    /// Tool bar
    ToolBar,
    /// Menu bar or popup menu
    MenuBar,
    /// Entry of a menu
    MenuItem,
    /// Push, split or hyperlink button
    Button,
    /// Check box
    Checkbox,
    /// Radio button
    Radio,
    /// Static text
    Label,
    /// Group box
    LabelGrouping,
    /// Toolkit-specific custom container
    CustomGrouping,
    /// Generic form container
    Form,
    /// Multi-line text (document)
    TextArea,
    /// Read-only rich text pane
    TextPane,
    /// Single-line edit
    Textbox,
    /// Masked edit composed of nested edits
    FormattedTextbox,
    /// Grid or data table
    Table,
    /// Tree or tree-grid
    HierTable,
    /// List of items
    ListGrouping,
    /// Item of a list
    ListItem,
    /// Tab control
    TabGroup,
    /// Tab page
    Tab,
    /// Window resize grip
    Grip,
    /// Combo holding a date/time editor
    DateTimeCombo,
    /// Editable combo with suggestions
    TypeAheadCombo,
    /// Combo whose dropdown allows several selections
    MultiSelectCombo,
    /// Editable single-selection combo
    SingleSelectCombo,
    /// Single-selection combo that does not accept typing
    SingleSelectComboNotEditable,
    /// Combo whose dropdown is a single-selection list
    SingleSelectList,
}

impl ElementKind {
    /// Every kind, in declaration order.
    pub const ALL: [ElementKind; 31] = [
        ElementKind::Window,
        ElementKind::Dialog,
        ElementKind::TitleBar,
        ElementKind::StatusBar,
        ElementKind::ToolBar,
        ElementKind::MenuBar,
        ElementKind::MenuItem,
        ElementKind::Button,
        ElementKind::Checkbox,
        ElementKind::Radio,
        ElementKind::Label,
        ElementKind::LabelGrouping,
        ElementKind::CustomGrouping,
        ElementKind::Form,
        ElementKind::TextArea,
        ElementKind::TextPane,
        ElementKind::Textbox,
        ElementKind::FormattedTextbox,
        ElementKind::Table,
        ElementKind::HierTable,
        ElementKind::ListGrouping,
        ElementKind::ListItem,
        ElementKind::TabGroup,
        ElementKind::Tab,
        ElementKind::Grip,
        ElementKind::DateTimeCombo,
        ElementKind::TypeAheadCombo,
        ElementKind::MultiSelectCombo,
        ElementKind::SingleSelectCombo,
        ElementKind::SingleSelectComboNotEditable,
        ElementKind::SingleSelectList,
    ];

    /// Snake-case name, identical to the serialized form.
    pub fn as_str(&self) -> &'static str {
        match self {
            ElementKind::Window => "window",
            ElementKind::Dialog => "dialog",
            ElementKind::TitleBar => "title_bar",
            ElementKind::StatusBar => "status_bar",
            ElementKind::ToolBar => "tool_bar",
            ElementKind::MenuBar => "menu_bar",
            ElementKind::MenuItem => "menu_item",
            ElementKind::Button => "button",
            ElementKind::Checkbox => "checkbox",
            ElementKind::Radio => "radio",
            ElementKind::Label => "label",
            ElementKind::LabelGrouping => "label_grouping",
            ElementKind::CustomGrouping => "custom_grouping",
            ElementKind::Form => "form",
            ElementKind::TextArea => "text_area",
            ElementKind::TextPane => "text_pane",
            ElementKind::Textbox => "textbox",
            ElementKind::FormattedTextbox => "formatted_textbox",
            ElementKind::Table => "table",
            ElementKind::HierTable => "hier_table",
            ElementKind::ListGrouping => "list_grouping",
            ElementKind::ListItem => "list_item",
            ElementKind::TabGroup => "tab_group",
            ElementKind::Tab => "tab",
            ElementKind::Grip => "grip",
            ElementKind::DateTimeCombo => "date_time_combo",
            ElementKind::TypeAheadCombo => "type_ahead_combo",
            ElementKind::MultiSelectCombo => "multi_select_combo",
            ElementKind::SingleSelectCombo => "single_select_combo",
            ElementKind::SingleSelectComboNotEditable => "single_select_combo_not_editable",
            ElementKind::SingleSelectList => "single_select_list",
        }
    }

    /// Controls whose own visible name is their label.
    pub fn is_self_labeling(&self) -> bool {
        matches!(
            self,
            ElementKind::Button
                | ElementKind::Checkbox
                | ElementKind::Radio
                | ElementKind::Tab
                | ElementKind::MenuItem
                | ElementKind::ListItem
        )
    }

    /// Window chrome registered under its own name (or kind when nameless).
    pub fn is_chrome(&self) -> bool {
        matches!(
            self,
            ElementKind::TitleBar
                | ElementKind::StatusBar
                | ElementKind::ToolBar
                | ElementKind::MenuBar
                | ElementKind::Grip
        )
    }

    /// Static text that can name a neighbouring input.
    pub fn is_label(&self) -> bool {
        matches!(self, ElementKind::Label)
    }

    /// Kinds whose children are scanned into their own component registry.
    pub fn is_container(&self) -> bool {
        matches!(
            self,
            ElementKind::Window
                | ElementKind::Dialog
                | ElementKind::LabelGrouping
                | ElementKind::CustomGrouping
                | ElementKind::Form
                | ElementKind::TabGroup
                | ElementKind::Tab
                | ElementKind::ToolBar
        )
    }

    /// Any of the combo-box kinds.
    pub fn is_combo(&self) -> bool {
        matches!(
            self,
            ElementKind::DateTimeCombo
                | ElementKind::TypeAheadCombo
                | ElementKind::MultiSelectCombo
                | ElementKind::SingleSelectCombo
                | ElementKind::SingleSelectComboNotEditable
                | ElementKind::SingleSelectList
        )
    }

    /// Kinds that accept typed input.
    pub fn is_editable(&self) -> bool {
        matches!(
            self,
            ElementKind::Textbox
                | ElementKind::FormattedTextbox
                | ElementKind::TextArea
                | ElementKind::TypeAheadCombo
                | ElementKind::SingleSelectCombo
                | ElementKind::DateTimeCombo
        )
    }

    /// Kinds that get a specialized representation at promotion time.
    pub fn is_specializable(&self) -> bool {
        matches!(
            self,
            ElementKind::Table
                | ElementKind::HierTable
                | ElementKind::ListGrouping
                | ElementKind::TabGroup
                | ElementKind::MenuBar
        )
    }
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ElementKind {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        ElementKind::ALL
            .iter()
            .copied()
            .find(|kind| kind.as_str() == wanted)
            .ok_or_else(|| crate::Error::InvalidInput(format!("unknown element kind: {s}")))
    }
}
