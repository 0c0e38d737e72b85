//! Label to element map owned by each container.

use std::fmt;

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::Element;

/// Separator of nested label paths (`Address::Zip`).
pub const PATH_SEPARATOR: &str = "::";

/// Split `OK(2)` into `("OK", Some(2))`; unindexed labels yield `None`.
pub fn split_index(label: &str) -> (&str, Option<usize>) {
    let Some(body) = label.strip_suffix(')') else {
        return (label, None);
    };
    let Some(open) = body.rfind('(') else {
        return (label, None);
    };
    let digits = &body[open + 1..];
    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
        return (label, None);
    }
    match digits.parse::<usize>() {
        Ok(n) => (&body[..open], Some(n)),
        Err(_) => (label, None),
    }
}

/// Ordered label to element map with collision indexing.
///
/// Keys are unique. Collisions are resolved by `(n)` suffixes, and an
/// unsuffixed label is only ever replaced by an element with the exact same
/// locator.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ComponentRegistry {
    entries: Vec<Element>,
}

impl ComponentRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of registered components.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Components in registration order.
    pub fn iter(&self) -> std::slice::Iter<'_, Element> {
        self.entries.iter()
    }

    /// Mutable components in registration order.
    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, Element> {
        self.entries.iter_mut()
    }

    /// Labels in registration order.
    pub fn labels(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.label.as_str()).collect()
    }

    /// Component registered under exactly `label`.
    pub fn get(&self, label: &str) -> Option<&Element> {
        self.entries.iter().find(|e| e.label == label)
    }

    /// Mutable component registered under exactly `label`.
    pub fn get_mut(&mut self, label: &str) -> Option<&mut Element> {
        self.entries.iter_mut().find(|e| e.label == label)
    }

    /// Resolve a `::` separated label path through nested registries.
    pub fn get_path(&self, path: &str) -> Option<&Element> {
        let mut parts = path.split(PATH_SEPARATOR);
        let mut current = self.get(parts.next()?)?;
        for part in parts {
            current = current.components.get(part)?;
        }
        Some(current)
    }

    /// Mutable variant of [`ComponentRegistry::get_path`].
    pub fn get_path_mut(&mut self, path: &str) -> Option<&mut Element> {
        let mut parts = path.split(PATH_SEPARATOR);
        let mut current = self.get_mut(parts.next()?)?;
        for part in parts {
            current = current.components.get_mut(part)?;
        }
        Some(current)
    }

    /// Component whose locator is exactly `xpath`.
    pub fn find_by_xpath(&self, xpath: &str) -> Option<&Element> {
        self.entries.iter().find(|e| e.xpath == xpath)
    }

    /// Register an element and return the label it ended up under.
    ///
    /// - an element whose locator is already registered takes over that
    ///   entry and its label (override refresh);
    /// - a new label registers as-is;
    /// - a collision renames an unindexed occupant to `label(1)` and gives the
    ///   newcomer the next free index.
    pub fn add(&mut self, mut element: Element) -> String {
        if let Some(existing) = self.entries.iter_mut().find(|e| e.xpath == element.xpath) {
            element.label = existing.label.clone();
            *existing = element;
            return existing.label.clone();
        }

        if self.get(&element.label).is_none() && !self.is_indexed_base(&element.label) {
            let label = element.label.clone();
            self.entries.push(element);
            return label;
        }

        let base = match split_index(&element.label) {
            (base, Some(_)) if self.get(&element.label).is_some() => base.to_string(),
            _ => element.label.clone(),
        };
        let first = format!("{base}(1)");
        let occupant_label = if self.get(&first).is_none() {
            first
        } else {
            format!("{base}({})", self.max_index(&base) + 1)
        };
        if let Some(occupant) = self.entries.iter_mut().find(|e| e.label == base) {
            occupant.label = occupant_label;
        }
        element.label = format!("{base}({})", self.max_index(&base) + 1);
        let label = element.label.clone();
        self.entries.push(element);
        label
    }

    /// Highest `n` among `base(n)` labels (0 when none).
    fn max_index(&self, base: &str) -> usize {
        self.entries
            .iter()
            .filter_map(|e| match split_index(&e.label) {
                (b, Some(n)) if b == base => Some(n),
                _ => None,
            })
            .max()
            .unwrap_or(0)
    }

    /// Whether `base(n)` entries exist for an unindexed `base`.
    fn is_indexed_base(&self, label: &str) -> bool {
        if split_index(label).1.is_some() {
            return false;
        }
        self.entries
            .iter()
            .any(|e| matches!(split_index(&e.label), (b, Some(_)) if b == label))
    }

    /// Remove and return the component registered under `label`.
    pub fn remove(&mut self, label: &str) -> Option<Element> {
        let index = self.entries.iter().position(|e| e.label == label)?;
        Some(self.entries.remove(index))
    }

    /// Remove every component.
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

impl<'a> IntoIterator for &'a ComponentRegistry {
    type Item = &'a Element;
    type IntoIter = std::slice::Iter<'a, Element>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

impl IntoIterator for ComponentRegistry {
    type Item = Element;
    type IntoIter = std::vec::IntoIter<Element>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl Serialize for ComponentRegistry {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for element in &self.entries {
            map.serialize_entry(&element.label, element)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for ComponentRegistry {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct RegistryVisitor;

        impl<'de> Visitor<'de> for RegistryVisitor {
            type Value = ComponentRegistry;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of label to element")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut entries: Vec<Element> = Vec::with_capacity(access.size_hint().unwrap_or(0));
                while let Some((label, mut element)) = access.next_entry::<String, Element>()? {
                    if entries.iter().any(|e| e.label == label) {
                        return Err(serde::de::Error::custom(format!(
                            "duplicate component label '{label}'"
                        )));
                    }
                    element.label = label;
                    entries.push(element);
                }
                Ok(ComponentRegistry { entries })
            }
        }

        deserializer.deserialize_map(RegistryVisitor)
    }
}
