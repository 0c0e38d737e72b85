//! Locator synthesis.
//!
//! Builds the step that addresses one node under its container from the
//! node's own attributes, tiered:
//!
//! 1. `@AutomationId`, unless the strategy rejects toolkit-generated ids
//! 2. `@Name`, unless the strategy prefers a usable automation id
//! 3. `@ControlType`, plus `position()` among same-type siblings when
//!    neither tier above contributed

use lazy_static::lazy_static;
use regex::Regex;

use uimap_core::{Error, LocatorStrategy, PerceptionConfig, Predicate, Result, Step};
use uimap_driver::NodeAttributes;

lazy_static! {
    static ref NUMERIC_ID: Regex = Regex::new(r"^-?\d+$").unwrap();
    static ref ITEM_N_ID: Regex = Regex::new(r"^Item \d+$").unwrap();
}

/// Automation ids the toolkit generates (`42`, `Item 3`), unstable across runs.
pub fn is_generated_id(automation_id: &str) -> bool {
    let id = automation_id.trim();
    NUMERIC_ID.is_match(id) || ITEM_N_ID.is_match(id)
}

/// Builds relative locators for nodes.
#[derive(Debug, Clone, Default)]
pub struct LocatorSynthesizer {
    omit_control_type: bool,
}

impl LocatorSynthesizer {
    /// Create a synthesizer.
    pub fn new(omit_control_type: bool) -> Self {
        Self { omit_control_type }
    }

    /// Synthesizer for the `locator` configuration section.
    pub fn from_config(config: &PerceptionConfig) -> Self {
        Self::new(config.locator.omit_control_type)
    }

    /// Predicates addressing a node; empty when no attribute qualifies.
    ///
    /// `position` is only consulted when the control type is the sole
    /// attribute left; returning `None` yields a bare control-type step.
    pub fn predicates<F>(
        &self,
        attrs: &NodeAttributes,
        strategy: LocatorStrategy,
        position: F,
    ) -> Vec<Predicate>
    where
        F: FnOnce() -> Option<usize>,
    {
        let mut predicates = Vec::new();

        let id = attrs.automation_id.trim();
        let use_id = !id.is_empty() && (strategy.permits_numeric_ids() || !is_generated_id(id));
        if use_id {
            predicates.push(Predicate::AutomationId(attrs.automation_id.clone()));
        }

        if !attrs.name.trim().is_empty() && (!strategy.prefers_id_over_name() || !use_id) {
            predicates.push(Predicate::Name(attrs.name.clone()));
        }

        if !self.omit_control_type && !attrs.control_type.trim().is_empty() {
            let sole = predicates.is_empty();
            predicates.push(Predicate::ControlType(attrs.control_type.clone()));
            if sole {
                if let Some(position) = position() {
                    predicates.push(Predicate::Position(position));
                }
            }
        }

        predicates
    }

    /// Absolute locator of a node under `container_xpath`.
    ///
    /// Fails with [`Error::UnresolvableLocator`] naming `container_label`
    /// when no attribute qualifies.
    pub fn synthesize<F>(
        &self,
        container_xpath: &str,
        container_label: &str,
        attrs: &NodeAttributes,
        strategy: LocatorStrategy,
        position: F,
    ) -> Result<String>
    where
        F: FnOnce() -> Option<usize>,
    {
        let predicates = self.predicates(attrs, strategy, position);
        if predicates.is_empty() {
            return Err(Error::UnresolvableLocator {
                container: container_label.to_string(),
                detail: format!(
                    "node with automation id '{}', name '{}', control type '{}' has no usable attribute",
                    attrs.automation_id, attrs.name, attrs.control_type
                ),
            });
        }
        Ok(format!("{container_xpath}{}", Step::child(predicates)))
    }
}
