//! Predeclared component definitions.
//!
//! Definitions are written by hand (or derived from a cached scan) and merged
//! into freshly classified elements that share their locator.

use std::collections::BTreeMap;
use std::path::Path;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::locator::Locator;
use crate::{Element, ElementKind, Error, Result};

/// A predeclared component.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
pub struct ComponentDefinition {
    /// Label to register the matching element under
    pub label: String,
    /// Locator fragment relative to the container (`/*[@AutomationId='ok']`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub xpath: Option<String>,
    /// Automation id override (also used for matching when `xpath` is absent)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub automation_id: Option<String>,
    /// Name override (also used for matching when `xpath` and `automation_id` are absent)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Control type override
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub control_type: Option<String>,
    /// Kind override
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub element_type: Option<ElementKind>,
    /// Per-element configuration merged over the scanned element's
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub extra: BTreeMap<String, String>,
    /// Definitions of this component's own children
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub components: Vec<ComponentDefinition>,
}

impl ComponentDefinition {
    /// Definition matching by relative locator fragment.
    pub fn with_xpath(label: impl Into<String>, xpath: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            xpath: Some(xpath.into()),
            ..Self::default()
        }
    }

    /// Definition matching by automation id.
    pub fn with_automation_id(label: impl Into<String>, automation_id: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            automation_id: Some(automation_id.into()),
            ..Self::default()
        }
    }

    /// Derive a definition from a scanned element, its locator made relative to `container_xpath`.
    pub fn from_element(element: &Element, container_xpath: &str) -> Self {
        let xpath = element
            .xpath
            .strip_prefix(container_xpath)
            .unwrap_or(&element.xpath)
            .to_string();
        Self {
            label: element.label.clone(),
            xpath: Some(xpath),
            automation_id: None,
            name: None,
            control_type: None,
            element_type: Some(element.element_type),
            extra: element.extra.clone(),
            components: element
                .components
                .iter()
                .map(|child| ComponentDefinition::from_element(child, &element.xpath))
                .collect(),
        }
    }

    /// Absolute locator of this definition under `container_xpath`, if it carries a fragment.
    pub fn anchored_xpath(&self, container_xpath: &str) -> Result<Option<String>> {
        self.xpath
            .as_deref()
            .map(|fragment| Locator::anchor(container_xpath, fragment))
            .transpose()
    }

    /// Whether this definition describes `element`, scanned under `container_xpath`.
    pub fn matches(&self, element: &Element, container_xpath: &str) -> Result<bool> {
        if let Some(anchored) = self.anchored_xpath(container_xpath)? {
            return Ok(anchored == element.xpath);
        }
        let control_type_ok = self
            .control_type
            .as_deref()
            .map_or(true, |ct| ct == element.control_type);
        if let Some(id) = self.automation_id.as_deref().filter(|id| !id.is_empty()) {
            return Ok(id == element.automation_id && control_type_ok);
        }
        if let Some(name) = self.name.as_deref().filter(|n| !n.is_empty()) {
            return Ok(name == element.name && control_type_ok);
        }
        Ok(false)
    }

    /// Merge this definition into `element`.
    ///
    /// Cosmetic fields of the definition win. The locator is only replaced
    /// when the definition supplies one.
    pub fn apply_to(&self, element: &mut Element, container_xpath: &str) -> Result<()> {
        if !self.label.is_empty() {
            element.label = self.label.clone();
            element.predeclared_label = Some(self.label.clone());
        }
        if let Some(id) = &self.automation_id {
            element.automation_id = id.clone();
        }
        if let Some(name) = &self.name {
            element.name = name.clone();
        }
        if let Some(control_type) = &self.control_type {
            element.control_type = control_type.clone();
        }
        if let Some(kind) = self.element_type {
            element.element_type = kind;
            element.editable = kind.is_editable();
        }
        for (key, value) in &self.extra {
            element.extra.insert(key.clone(), value.clone());
        }
        if let Some(anchored) = self.anchored_xpath(container_xpath)? {
            element.xpath = anchored;
        }
        Ok(())
    }
}

/// Find the first definition describing `element`.
pub fn find_definition<'a>(
    definitions: &'a [ComponentDefinition],
    element: &Element,
    container_xpath: &str,
) -> Result<Option<&'a ComponentDefinition>> {
    for definition in definitions {
        if definition.matches(element, container_xpath)? {
            return Ok(Some(definition));
        }
    }
    Ok(None)
}

/// Load definitions from a YAML file (a list of definitions).
pub fn load_definitions<P: AsRef<Path>>(path: P) -> Result<Vec<ComponentDefinition>> {
    let content = std::fs::read_to_string(path)?;
    parse_definitions(&content)
}

/// Parse definitions from YAML text.
pub fn parse_definitions(yaml: &str) -> Result<Vec<ComponentDefinition>> {
    let definitions: Vec<ComponentDefinition> = serde_yaml::from_str(yaml)?;
    for definition in &definitions {
        validate(definition)?;
    }
    Ok(definitions)
}

fn validate(definition: &ComponentDefinition) -> Result<()> {
    if definition.label.trim().is_empty() {
        return Err(Error::Config("component definition label cannot be empty".to_string()));
    }
    if let Some(fragment) = &definition.xpath {
        Locator::anchor("/*", fragment).map_err(|e| {
            Error::Config(format!("definition '{}': {e}", definition.label))
        })?;
    }
    definition.components.iter().try_for_each(validate)
}

#[cfg(test)]
mod tests {
    use super::*;

    const MAIN: &str = "/*[@Name='Main']";

    fn edit(xpath: &str) -> Element {
        Element::new(xpath, "ControlType.Edit", ElementKind::Textbox)
            .with_automation_id("txtUser")
            .with_name("")
    }

    #[test]
    fn test_matches_by_fragment() {
        let element = edit("/*[@Name='Main']/*[@AutomationId='txtUser']");
        let definition = ComponentDefinition::with_xpath("User", "/*[@AutomationId='txtUser']");
        assert!(definition.matches(&element, MAIN).unwrap());

        let other = ComponentDefinition::with_xpath("User", "/*[@AutomationId='txtOther']");
        assert!(!other.matches(&element, MAIN).unwrap());
    }

    #[test]
    fn test_matches_by_automation_id() {
        let element = edit("/*[@Name='Main']/*[@AutomationId='txtUser']");
        let definition = ComponentDefinition::with_automation_id("User", "txtUser");
        assert!(definition.matches(&element, MAIN).unwrap());
    }

    #[test]
    fn test_definition_without_keys_matches_nothing() {
        let element = edit("/*[@Name='Main']/*[@AutomationId='txtUser']");
        let definition = ComponentDefinition {
            label: "User".to_string(),
            ..Default::default()
        };
        assert!(!definition.matches(&element, MAIN).unwrap());
    }

    #[test]
    fn test_apply_overrides_cosmetics_but_keeps_xpath() {
        let mut element = edit("/*[@Name='Main']/*[@AutomationId='txtUser']");
        let mut definition = ComponentDefinition::with_automation_id("Login", "txtUser");
        definition.name = Some("Login name".to_string());
        definition.extra.insert("layout".to_string(), "two_line".to_string());

        definition.apply_to(&mut element, MAIN).unwrap();

        assert_eq!(element.label, "Login");
        assert_eq!(element.predeclared_label.as_deref(), Some("Login"));
        assert_eq!(element.name, "Login name");
        assert_eq!(element.extra.get("layout").map(String::as_str), Some("two_line"));
        assert_eq!(element.xpath, "/*[@Name='Main']/*[@AutomationId='txtUser']");
    }

    #[test]
    fn test_apply_supplies_xpath() {
        let mut element = edit("/*[@Name='Main']/*[@AutomationId='txtUser']");
        let definition = ComponentDefinition::with_xpath("User", "//*[@AutomationId='txtUser']");
        definition.apply_to(&mut element, MAIN).unwrap();
        assert_eq!(element.xpath, "/*[@Name='Main']//*[@AutomationId='txtUser']");
    }

    #[test]
    fn test_apply_kind_updates_editable() {
        let mut element = edit("/*[@Name='Main']/*[@AutomationId='txtUser']");
        let definition = ComponentDefinition {
            label: "User".to_string(),
            element_type: Some(ElementKind::Label),
            ..Default::default()
        };
        definition.apply_to(&mut element, MAIN).unwrap();
        assert_eq!(element.element_type, ElementKind::Label);
        assert!(!element.editable);
    }

    #[test]
    fn test_from_element_is_relative() {
        let mut group = Element::new(
            "/*[@Name='Main']/*[@Name='Address']",
            "ControlType.Group",
            ElementKind::LabelGrouping,
        )
        .with_label("Address");
        group.add_component(edit("/*[@Name='Main']/*[@Name='Address']/*[@AutomationId='zip']").with_label("Zip"));

        let definition = ComponentDefinition::from_element(&group, MAIN);
        assert_eq!(definition.xpath.as_deref(), Some("/*[@Name='Address']"));
        assert_eq!(definition.components.len(), 1);
        assert_eq!(
            definition.components[0].xpath.as_deref(),
            Some("/*[@AutomationId='zip']")
        );
    }

    #[test]
    fn test_parse_definitions_yaml() {
        let yaml = r#"
- label: Username
  automation_id: txtUser
- label: Customer Table
  xpath: "/*[@AutomationId='grid']"
  element_type: table
  extra:
    row_height: "22"
- label: Address
  xpath: "/*[@Name='Address']"
  components:
    - label: Zip
      automation_id: zip
"#;
        let definitions = parse_definitions(yaml).unwrap();
        assert_eq!(definitions.len(), 3);
        assert_eq!(definitions[1].element_type, Some(ElementKind::Table));
        assert_eq!(definitions[2].components[0].label, "Zip");
    }

    #[test]
    fn test_parse_definitions_rejects_bad_fragment() {
        let yaml = r#"
- label: Broken
  xpath: "/*[@Name='x'"
"#;
        assert!(parse_definitions(yaml).is_err());
    }

    #[test]
    fn test_parse_definitions_rejects_empty_label() {
        let yaml = r#"
- label: ""
  automation_id: x
"#;
        assert!(matches!(parse_definitions(yaml), Err(Error::Config(_))));
    }
}
