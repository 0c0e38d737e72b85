//! Configuration types for uimap.
//!
//! Every toolkit-specific threshold the scanner relies on lives here as a
//! named, overridable value.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::{Error, Layout, LocatorStrategy};

/// Perception configuration loaded from a YAML file.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct PerceptionConfig {
    /// Locator synthesis settings
    pub locator: LocatorSettings,
    /// Spatial grouping settings
    pub layout: LayoutSettings,
    /// Type classification settings
    pub classification: ClassificationSettings,
    /// Table specialization constants
    pub table: TableSettings,
    /// Driver round-trip settings
    pub driver: DriverSettings,
    /// Session settings
    pub session: SessionSettings,
    /// Component cache settings
    pub cache: CacheSettings,
}

impl PerceptionConfig {
    /// Load configuration from a YAML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse configuration from YAML string.
    pub fn from_yaml(yaml: &str) -> crate::Result<Self> {
        let config: PerceptionConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values.
    pub fn validate(&self) -> crate::Result<()> {
        if self.session.max_sessions == 0 {
            return Err(Error::Config("session.max_sessions must be > 0".to_string()));
        }

        if self.layout.tolerance_px < 0 {
            return Err(Error::Config("layout.tolerance_px must be >= 0".to_string()));
        }

        if self.classification.max_depth == 0 {
            return Err(Error::Config(
                "classification.max_depth must be > 0".to_string(),
            ));
        }

        if self.driver.poll_interval_ms == 0 {
            return Err(Error::Config(
                "driver.poll_interval_ms must be > 0".to_string(),
            ));
        }

        if let Some(pattern) = &self.classification.option_set_pattern {
            regex::Regex::new(pattern).map_err(|e| {
                Error::Config(format!("Invalid option_set_pattern '{pattern}': {e}"))
            })?;
        }

        if !matches!(self.cache.format.as_str(), "json" | "yaml") {
            return Err(Error::Config(format!(
                "cache.format must be json or yaml, got '{}'",
                self.cache.format
            )));
        }

        Ok(())
    }
}

/// Locator synthesis settings.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct LocatorSettings {
    /// Strategy for the root container (overridable per element)
    pub strategy: LocatorStrategy,
    /// Never put `@ControlType` in a locator (global)
    pub omit_control_type: bool,
}

/// Spatial grouping settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutSettings {
    /// Layout of the root container (overridable per element)
    pub default: Layout,
    /// Bucket keys closer than this many pixels are merged
    pub tolerance_px: i32,
    /// Run the leftover pass for two-line layouts
    pub leftover_pass: bool,
}

impl Default for LayoutSettings {
    fn default() -> Self {
        Self {
            default: Layout::LeftToRight,
            tolerance_px: 10,
            leftover_pass: true,
        }
    }
}

/// Type classification settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassificationSettings {
    /// Automation id substring marking a combo as a date/time picker
    pub date_time_hint: String,
    /// Automation id pattern turning a List into a Form (option sets)
    pub option_set_pattern: Option<String>,
    /// Pane class names classified as TextPane
    pub text_pane_class_names: Vec<String>,
    /// Control types skipped during inspection
    pub ignored_control_types: Vec<String>,
    /// Class name prefixes selecting the child-counting combo heuristic
    pub child_count_class_prefixes: Vec<String>,
    /// Name of the window resize grip
    pub grip_name: String,
    /// Open combos to classify them
    pub probe_combos: bool,
    /// Maximum container nesting followed by the inspector
    pub max_depth: usize,
    /// Label prefix for inputs no label could be bound to
    pub unmatched_prefix: String,
}

impl Default for ClassificationSettings {
    fn default() -> Self {
        Self {
            date_time_hint: "DateTime".to_string(),
            option_set_pattern: Some("(?i)(option|radio)(set|group)".to_string()),
            text_pane_class_names: vec!["RichEdit20W".to_string(), "RICHEDIT50W".to_string()],
            ignored_control_types: vec![
                "ControlType.Image".to_string(),
                "ControlType.Separator".to_string(),
                "ControlType.ToolTip".to_string(),
                "ControlType.Thumb".to_string(),
            ],
            child_count_class_prefixes: vec![
                "Infragistics.".to_string(),
                "DevExpress.".to_string(),
            ],
            grip_name: "Window.Grip".to_string(),
            probe_combos: true,
            max_depth: 32,
            unmatched_prefix: "Unmatched_".to_string(),
        }
    }
}

impl ClassificationSettings {
    /// Whether `class_name` belongs to a toolkit using the child-counting combo heuristic.
    pub fn uses_child_count(&self, class_name: &str) -> bool {
        !class_name.is_empty()
            && self
                .child_count_class_prefixes
                .iter()
                .any(|prefix| class_name.starts_with(prefix.as_str()))
    }

    /// Whether nodes of `control_type` are skipped.
    pub fn is_ignored(&self, control_type: &str) -> bool {
        self.ignored_control_types
            .iter()
            .any(|ignored| ignored == control_type)
    }
}

/// Table specialization constants.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TableSettings {
    /// Column header height in pixels
    pub header_height: u32,
    /// Data row height in pixels
    pub row_height: u32,
}

impl Default for TableSettings {
    fn default() -> Self {
        Self {
            header_height: 22,
            row_height: 18,
        }
    }
}

/// Driver round-trip settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DriverSettings {
    /// How long re-resolution polls before giving up
    pub explicit_wait_ms: u64,
    /// Delay between polls
    pub poll_interval_ms: u64,
}

impl Default for DriverSettings {
    fn default() -> Self {
        Self {
            explicit_wait_ms: 2000,
            poll_interval_ms: 100,
        }
    }
}

/// Session settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionSettings {
    /// Maximum number of concurrently attached applications
    pub max_sessions: usize,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
    /// Verbose scan diagnostics
    pub debug: bool,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            max_sessions: 4,
            log_level: "info".to_string(),
            debug: false,
        }
    }
}

/// Component cache settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheSettings {
    /// Reuse cached scans as definitions
    pub enabled: bool,
    /// Document format: json or yaml
    pub format: String,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            format: "json".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = PerceptionConfig::default();
        assert_eq!(config.layout.tolerance_px, 10);
        assert_eq!(config.classification.date_time_hint, "DateTime");
        assert_eq!(config.classification.grip_name, "Window.Grip");
        assert_eq!(config.locator.strategy, LocatorStrategy::Full);
        assert!(config.classification.probe_combos);
    }

    #[test]
    fn test_config_validation() {
        let config = PerceptionConfig::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_invalid_max_sessions() {
        let mut config = PerceptionConfig::default();
        config.session.max_sessions = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_option_set_pattern() {
        let mut config = PerceptionConfig::default();
        config.classification.option_set_pattern = Some("(unclosed".to_string());
        assert!(matches!(config.validate(), Err(Error::Config(_))));
    }

    #[test]
    fn test_invalid_cache_format() {
        let mut config = PerceptionConfig::default();
        config.cache.format = "toml".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_from_yaml_partial() {
        let yaml = r#"
locator:
  strategy: ignore_numeric_ids
layout:
  default: two_line
  tolerance_px: 6
classification:
  date_time_hint: Dtp
session:
  debug: true
"#;
        let config = PerceptionConfig::from_yaml(yaml).unwrap();
        assert_eq!(config.locator.strategy, LocatorStrategy::IgnoreNumericIds);
        assert_eq!(config.layout.default, Layout::TwoLine);
        assert_eq!(config.layout.tolerance_px, 6);
        assert!(config.layout.leftover_pass);
        assert_eq!(config.classification.date_time_hint, "Dtp");
        assert_eq!(config.classification.grip_name, "Window.Grip");
        assert!(config.session.debug);
        assert_eq!(config.table.row_height, 18);
    }

    #[test]
    fn test_from_yaml_rejects_unknown_strategy() {
        let yaml = "locator:\n  strategy: sometimes\n";
        assert!(PerceptionConfig::from_yaml(yaml).is_err());
    }

    #[test]
    fn test_uses_child_count() {
        let settings = ClassificationSettings::default();
        assert!(settings.uses_child_count("Infragistics.Win.UltraWinGrid"));
        assert!(!settings.uses_child_count("WindowsForms10.COMBOBOX"));
        assert!(!settings.uses_child_count(""));
    }

    #[test]
    fn test_is_ignored() {
        let settings = ClassificationSettings::default();
        assert!(settings.is_ignored("ControlType.Image"));
        assert!(!settings.is_ignored("ControlType.Edit"));
    }
}
