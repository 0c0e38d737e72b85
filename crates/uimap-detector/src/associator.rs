//! Label association.
//!
//! Walks grouped buckets in reading order. A static label arms itself as the
//! name of the inputs that follow it in the same bucket; the first input it
//! names keeps the label element as its caption.

use tracing::debug;

use uimap_core::{attr, ClassificationSettings, Element, ElementKind, Result};

/// Names grouped elements and registers them in their container.
#[derive(Debug, Clone)]
pub struct LabelAssociator {
    unmatched_prefix: String,
}

impl Default for LabelAssociator {
    fn default() -> Self {
        Self::from_config(&ClassificationSettings::default())
    }
}

struct Armed {
    label: Element,
    text: String,
    bound: bool,
}

impl LabelAssociator {
    /// Create an associator using `unmatched_prefix` for inputs with no label.
    pub fn new(unmatched_prefix: impl Into<String>) -> Self {
        Self {
            unmatched_prefix: unmatched_prefix.into(),
        }
    }

    /// Associator for the `classification` configuration section.
    pub fn from_config(settings: &ClassificationSettings) -> Self {
        Self::new(settings.unmatched_prefix.clone())
    }

    /// Name every member of `groups` and register it in `container`.
    pub fn associate(&self, container: &mut Element, groups: Vec<Vec<Element>>) -> Result<()> {
        for group in groups {
            let mut current: Option<Armed> = None;
            for member in group {
                if member.element_type.is_label() {
                    let text = member.name.trim().to_string();
                    if is_decorative(&text) {
                        debug!("skipping decorative label {}", member.xpath);
                        continue;
                    }
                    if let Some(previous) = current.take() {
                        register_orphan(container, previous);
                    }
                    current = Some(Armed {
                        label: member,
                        text,
                        bound: false,
                    });
                    continue;
                }
                self.bind(container, member, current.as_mut())?;
            }
            if let Some(previous) = current {
                register_orphan(container, previous);
            }
        }
        Ok(())
    }

    fn bind(
        &self,
        container: &mut Element,
        mut member: Element,
        current: Option<&mut Armed>,
    ) -> Result<()> {
        let table = table_name(container, &member);
        let armed_text = match current {
            // tables leave the label beside them to name itself
            Some(armed) if table.is_none() => {
                if !armed.bound {
                    let mut caption = armed.label.clone();
                    caption.label = armed.text.clone();
                    caption.strip_name()?;
                    member.caption = Some(Box::new(caption));
                    armed.bound = true;
                }
                Some(armed.text.clone())
            }
            _ => None,
        };
        if let Some(predeclared) = member.predeclared_label.clone() {
            member.label = predeclared;
        } else if let Some(name) = table {
            member.label = name;
        } else if let Some(text) = armed_text {
            member.label = text;
        } else {
            let suffix = if member.automation_id.trim().is_empty() {
                attr::short_control_type(&member.control_type).to_string()
            } else {
                member.automation_id.clone()
            };
            member.label = format!("{}{}", self.unmatched_prefix, suffix);
        }
        let xpath = member.xpath.clone();
        let label = container.add_component(member);
        debug!("registered {} as '{}'", xpath, label);
        Ok(())
    }
}

fn is_decorative(text: &str) -> bool {
    text.chars().all(|c| c == '_')
}

/// Tables are named after their container.
fn table_name(container: &Element, member: &Element) -> Option<String> {
    if !matches!(
        member.element_type,
        ElementKind::Table | ElementKind::HierTable
    ) {
        return None;
    }
    [&container.name, &container.label]
        .into_iter()
        .find(|text| !text.trim().is_empty())
        .cloned()
}

/// A label that named nothing stays addressable under its own text.
fn register_orphan(container: &mut Element, armed: Armed) {
    if armed.bound {
        return;
    }
    let mut label = armed.label;
    label.label = label.predeclared_label.clone().unwrap_or(armed.text);
    debug!("label '{}' named no input", label.label);
    container.add_component(label);
}
