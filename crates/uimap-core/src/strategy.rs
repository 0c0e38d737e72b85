//! Scan strategies inherited top-down through the container tree.

use std::fmt;
use std::str::FromStr;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::Error;

/// `extra` key overriding the layout of a container and its descendants.
pub const EXTRA_LAYOUT: &str = "layout";
/// `extra` key overriding the locator strategy of a container and its descendants.
pub const EXTRA_LOCATOR_STRATEGY: &str = "locator_strategy";
/// `extra` key selecting the combo probe heuristic of a container and its descendants.
pub const EXTRA_COMBO_HEURISTIC: &str = "combo_heuristic";

/// Which attributes may appear in a synthesized locator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum LocatorStrategy {
    /// Automation id, name and control type, whichever are present
    #[default]
    Full,
    /// Skip purely numeric and `Item N` automation ids (generated by the toolkit)
    IgnoreNumericIds,
    /// Skip the name whenever an automation id is available
    PreferAutomationId,
    /// Both of the above
    IgnoreNumericIdsPreferAutomationId,
}

impl LocatorStrategy {
    /// Whether numeric and `Item N` automation ids may be used.
    pub fn permits_numeric_ids(&self) -> bool {
        matches!(
            self,
            LocatorStrategy::Full | LocatorStrategy::PreferAutomationId
        )
    }

    /// Whether the name is dropped when an automation id is present.
    pub fn prefers_id_over_name(&self) -> bool {
        matches!(
            self,
            LocatorStrategy::PreferAutomationId
                | LocatorStrategy::IgnoreNumericIdsPreferAutomationId
        )
    }

    fn as_str(&self) -> &'static str {
        match self {
            LocatorStrategy::Full => "full",
            LocatorStrategy::IgnoreNumericIds => "ignore_numeric_ids",
            LocatorStrategy::PreferAutomationId => "prefer_automation_id",
            LocatorStrategy::IgnoreNumericIdsPreferAutomationId => {
                "ignore_numeric_ids_prefer_automation_id"
            }
        }
    }
}

impl fmt::Display for LocatorStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LocatorStrategy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "full" => Ok(LocatorStrategy::Full),
            "ignore_numeric_ids" => Ok(LocatorStrategy::IgnoreNumericIds),
            "prefer_automation_id" => Ok(LocatorStrategy::PreferAutomationId),
            "ignore_numeric_ids_prefer_automation_id" => {
                Ok(LocatorStrategy::IgnoreNumericIdsPreferAutomationId)
            }
            other => Err(Error::Config(format!("unknown locator strategy: {other}"))),
        }
    }
}

/// How a container's label/input pairs are arranged on screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum Layout {
    /// Label to the left of its input, grouped by row
    #[default]
    LeftToRight,
    /// Label above its input, grouped by column
    TwoLine,
}

impl fmt::Display for Layout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Layout::LeftToRight => f.write_str("left_to_right"),
            Layout::TwoLine => f.write_str("two_line"),
        }
    }
}

impl FromStr for Layout {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "left_to_right" => Ok(Layout::LeftToRight),
            "two_line" => Ok(Layout::TwoLine),
            other => Err(Error::Config(format!("unknown layout: {other}"))),
        }
    }
}

/// How a combo box's opened shape is inspected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ComboHeuristic {
    /// Inspect the first child of the opened combo
    #[default]
    FirstChild,
    /// Tally editors, lists, list items, combos and radios first; fall back to `FirstChild`
    ChildCount,
}

impl FromStr for ComboHeuristic {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "first_child" => Ok(ComboHeuristic::FirstChild),
            "child_count" => Ok(ComboHeuristic::ChildCount),
            other => Err(Error::Config(format!("unknown combo heuristic: {other}"))),
        }
    }
}
