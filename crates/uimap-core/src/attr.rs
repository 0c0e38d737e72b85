//! Accessibility attribute names and control type strings as the driver reports them.

/// Node name
pub const NAME: &str = "Name";
/// Automation id
pub const AUTOMATION_ID: &str = "AutomationId";
/// Control type (`ControlType.Edit`, ...)
pub const CONTROL_TYPE: &str = "ControlType";
/// Toolkit class name
pub const CLASS_NAME: &str = "ClassName";
/// `True` / `False`
pub const IS_ENABLED: &str = "IsEnabled";
/// `True` for modal windows
pub const IS_MODAL: &str = "Window.IsModal";
/// `True` for lists accepting several selected items
pub const CAN_SELECT_MULTIPLE: &str = "Selection.CanSelectMultiple";
/// `Expanded` / `Collapsed`
pub const EXPAND_COLLAPSE_STATE: &str = "ExpandCollapse.ExpandCollapseState";
/// `True` for the selected tab or list item
pub const IS_SELECTED: &str = "SelectionItem.IsSelected";

/// Prefix of every control type string.
pub const CONTROL_TYPE_PREFIX: &str = "ControlType.";

/// Strip the `ControlType.` prefix: `ControlType.Edit` becomes `Edit`.
pub fn short_control_type(control_type: &str) -> &str {
    control_type
        .trim()
        .strip_prefix(CONTROL_TYPE_PREFIX)
        .unwrap_or_else(|| control_type.trim())
}

/// Qualify a short control type: `Edit` becomes `ControlType.Edit`.
pub fn qualified_control_type(short: &str) -> String {
    if short.starts_with(CONTROL_TYPE_PREFIX) {
        short.to_string()
    } else {
        format!("{CONTROL_TYPE_PREFIX}{short}")
    }
}

/// Interpret a driver boolean (`True`, `true`, `1`).
pub fn is_true(value: &str) -> bool {
    matches!(value.trim().to_ascii_lowercase().as_str(), "true" | "1")
}
