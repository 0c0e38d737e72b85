//! Structural locator grammar.
//!
//! A locator is a sequence of steps, each selecting nodes by a conjunction of
//! attribute predicates:
//!
//! ```text
//! /*[@Name='Main']/*[@AutomationId='txtUser' and @ControlType='ControlType.Edit']
//! //*[@ControlType='ControlType.Edit' and position()=2]
//! ```
//!
//! `position()=N` counts among the siblings that satisfy the step's other
//! predicates, so `*[@ControlType='ControlType.Edit' and position()=2]` is the
//! second edit of its parent.

use std::fmt;
use std::str::FromStr;

use crate::{attr, Error, Result};

/// Navigation axis of a step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    /// `/`: direct children
    Child,
    /// `//`: any descendant
    Descendant,
}

/// One predicate of a step.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Predicate {
    /// `@AutomationId='...'`
    AutomationId(String),
    /// `@Name='...'`
    Name(String),
    /// `@ControlType='...'`
    ControlType(String),
    /// `@ClassName='...'`
    ClassName(String),
    /// `position()=N`, 1-based
    Position(usize),
}

impl Predicate {
    /// Attribute name tested by the predicate (`None` for positions).
    pub fn attribute(&self) -> Option<&'static str> {
        match self {
            Predicate::AutomationId(_) => Some(attr::AUTOMATION_ID),
            Predicate::Name(_) => Some(attr::NAME),
            Predicate::ControlType(_) => Some(attr::CONTROL_TYPE),
            Predicate::ClassName(_) => Some(attr::CLASS_NAME),
            Predicate::Position(_) => None,
        }
    }

    /// Expected attribute value (`None` for positions).
    pub fn value(&self) -> Option<&str> {
        match self {
            Predicate::AutomationId(v)
            | Predicate::Name(v)
            | Predicate::ControlType(v)
            | Predicate::ClassName(v) => Some(v),
            Predicate::Position(_) => None,
        }
    }

    fn from_attribute(name: &str, value: String) -> Result<Self> {
        match name {
            attr::AUTOMATION_ID => Ok(Predicate::AutomationId(value)),
            attr::NAME => Ok(Predicate::Name(value)),
            attr::CONTROL_TYPE => Ok(Predicate::ControlType(value)),
            attr::CLASS_NAME => Ok(Predicate::ClassName(value)),
            other => Err(Error::InvalidLocator(format!(
                "unsupported attribute @{other}"
            ))),
        }
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Predicate::Position(n) = self {
            return write!(f, "position()={n}");
        }
        let name = self.attribute().unwrap_or_default();
        let value = self.value().unwrap_or_default();
        write!(f, "@{name}={}", quote_literal(value))
    }
}

/// One step of a locator.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Step {
    /// Navigation axis
    pub axis: Axis,
    /// Conjunction of predicates (empty selects every node on the axis)
    pub predicates: Vec<Predicate>,
}

impl Step {
    /// Child step with the given predicates.
    pub fn child(predicates: Vec<Predicate>) -> Self {
        Self {
            axis: Axis::Child,
            predicates,
        }
    }

    /// The `position()` predicate, if any.
    pub fn position(&self) -> Option<usize> {
        self.predicates.iter().find_map(|p| match p {
            Predicate::Position(n) => Some(*n),
            _ => None,
        })
    }

    /// Predicates other than `position()`.
    pub fn attribute_predicates(&self) -> impl Iterator<Item = &Predicate> {
        self.predicates
            .iter()
            .filter(|p| !matches!(p, Predicate::Position(_)))
    }

    /// Whether the step tests the given attribute.
    pub fn has_attribute(&self, name: &str) -> bool {
        self.predicates.iter().any(|p| p.attribute() == Some(name))
    }

    /// Drop every `@Name` predicate; returns whether anything was removed.
    pub fn strip_name(&mut self) -> bool {
        let before = self.predicates.len();
        self.predicates.retain(|p| !matches!(p, Predicate::Name(_)));
        before != self.predicates.len()
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.axis {
            Axis::Child => f.write_str("/*")?,
            Axis::Descendant => f.write_str("//*")?,
        }
        if self.predicates.is_empty() {
            return Ok(());
        }
        f.write_str("[")?;
        for (i, predicate) in self.predicates.iter().enumerate() {
            if i > 0 {
                f.write_str(" and ")?;
            }
            write!(f, "{predicate}")?;
        }
        f.write_str("]")
    }
}

/// A parsed locator.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Locator {
    /// Steps from the root
    pub steps: Vec<Step>,
}

impl Locator {
    /// Parse locator text.
    pub fn parse(text: &str) -> Result<Self> {
        Parser::new(text).locator()
    }

    /// Append the steps of `fragment` to `base`.
    ///
    /// Used to anchor a predeclared relative fragment onto its container's
    /// locator. A fragment without a leading `/` is treated as a child step.
    pub fn anchor(base: &str, fragment: &str) -> Result<String> {
        let fragment = fragment.trim();
        let fragment = if fragment.starts_with('/') {
            fragment.to_string()
        } else {
            format!("/{fragment}")
        };
        let mut locator = if base.trim().is_empty() {
            Locator { steps: Vec::new() }
        } else {
            Locator::parse(base)?
        };
        locator.steps.extend(Locator::parse(&fragment)?.steps);
        Ok(locator.to_string())
    }

    /// Last step.
    pub fn last(&self) -> Option<&Step> {
        self.steps.last()
    }

    /// Mutable last step.
    pub fn last_mut(&mut self) -> Option<&mut Step> {
        self.steps.last_mut()
    }

    /// Whether `self` starts with every step of `container`.
    pub fn is_within(&self, container: &Locator) -> bool {
        self.steps.len() > container.steps.len()
            && self.steps[..container.steps.len()] == container.steps[..]
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for step in &self.steps {
            write!(f, "{step}")?;
        }
        Ok(())
    }
}

impl FromStr for Locator {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Locator::parse(s)
    }
}

/// Quote a value for safe inclusion as a locator literal.
///
/// Uses single quotes, double quotes when the value contains a single quote,
/// and `concat(...)` when it contains both.
pub fn quote_literal(value: &str) -> String {
    if !value.contains('\'') {
        return format!("'{value}'");
    }
    if !value.contains('"') {
        return format!("\"{value}\"");
    }
    let mut parts = Vec::new();
    for (i, chunk) in value.split('\'').enumerate() {
        if i > 0 {
            parts.push("\"'\"".to_string());
        }
        if !chunk.is_empty() {
            parts.push(format!("'{chunk}'"));
        }
    }
    format!("concat({})", parts.join(", "))
}

struct Parser<'a> {
    text: &'a str,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn new(text: &'a str) -> Self {
        Self {
            text: text.trim(),
            pos: 0,
        }
    }

    fn rest(&self) -> &'a str {
        &self.text[self.pos..]
    }

    fn error(&self, what: &str) -> Error {
        Error::InvalidLocator(format!("{what} at offset {} in '{}'", self.pos, self.text))
    }

    fn skip_ws(&mut self) {
        let trimmed = self.rest().trim_start();
        self.pos = self.text.len() - trimmed.len();
    }

    fn eat(&mut self, token: &str) -> bool {
        self.skip_ws();
        if self.rest().starts_with(token) {
            self.pos += token.len();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, token: &str) -> Result<()> {
        if self.eat(token) {
            Ok(())
        } else {
            Err(self.error(&format!("expected '{token}'")))
        }
    }

    fn locator(&mut self) -> Result<Locator> {
        let mut steps = Vec::new();
        loop {
            self.skip_ws();
            if self.rest().is_empty() {
                break;
            }
            steps.push(self.step()?);
        }
        if steps.is_empty() {
            return Err(self.error("empty locator"));
        }
        Ok(Locator { steps })
    }

    fn step(&mut self) -> Result<Step> {
        let axis = if self.eat("//") {
            Axis::Descendant
        } else if self.eat("/") {
            Axis::Child
        } else {
            return Err(self.error("expected '/'"));
        };
        self.expect("*")?;

        let mut predicates = Vec::new();
        while self.eat("[") {
            loop {
                predicates.push(self.predicate()?);
                if !self.eat("and") {
                    break;
                }
            }
            self.expect("]")?;
        }
        Ok(Step { axis, predicates })
    }

    fn predicate(&mut self) -> Result<Predicate> {
        if self.eat("position()") {
            self.expect("=")?;
            return Ok(Predicate::Position(self.number()?));
        }
        self.expect("@")?;
        let name = self.identifier()?;
        self.expect("=")?;
        let value = self.literal()?;
        Predicate::from_attribute(name, value)
    }

    fn identifier(&mut self) -> Result<&'a str> {
        let rest = self.rest();
        let len = rest
            .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_' || c == '.'))
            .unwrap_or(rest.len());
        if len == 0 {
            return Err(self.error("expected attribute name"));
        }
        self.pos += len;
        Ok(&rest[..len])
    }

    fn number(&mut self) -> Result<usize> {
        self.skip_ws();
        let rest = self.rest();
        let len = rest
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(rest.len());
        let n = rest[..len]
            .parse::<usize>()
            .map_err(|_| self.error("expected position number"))?;
        if n == 0 {
            return Err(self.error("positions are 1-based"));
        }
        self.pos += len;
        Ok(n)
    }

    fn literal(&mut self) -> Result<String> {
        if self.eat("concat(") {
            let mut value = String::new();
            loop {
                value.push_str(&self.quoted()?);
                if !self.eat(",") {
                    break;
                }
            }
            self.expect(")")?;
            return Ok(value);
        }
        self.quoted()
    }

    fn quoted(&mut self) -> Result<String> {
        self.skip_ws();
        let quote = match self.rest().chars().next() {
            Some(q @ ('\'' | '"')) => q,
            _ => return Err(self.error("expected quoted literal")),
        };
        self.pos += 1;
        let rest = self.rest();
        let end = rest
            .find(quote)
            .ok_or_else(|| self.error("unterminated literal"))?;
        let value = rest[..end].to_string();
        self.pos += end + 1;
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_and_display_round_trip() {
        let text = "/*[@Name='Main']/*[@AutomationId='txtUser' and @ControlType='ControlType.Edit']";
        let locator = Locator::parse(text).unwrap();
        assert_eq!(locator.steps.len(), 2);
        assert_eq!(locator.to_string(), text);
    }

    #[test]
    fn test_parse_position_and_descendant() {
        let locator =
            Locator::parse("//*[@ControlType='ControlType.Edit' and position()=2]").unwrap();
        let step = locator.last().unwrap();
        assert_eq!(step.axis, Axis::Descendant);
        assert_eq!(step.position(), Some(2));
        assert_eq!(step.attribute_predicates().count(), 1);
    }

    #[test]
    fn test_parse_merges_bracket_groups() {
        let locator = Locator::parse("/*[@Name='A'][@ClassName='Pane']").unwrap();
        assert_eq!(locator.steps[0].predicates.len(), 2);
    }

    #[test]
    fn test_parse_bare_step() {
        let locator = Locator::parse("/*").unwrap();
        assert!(locator.steps[0].predicates.is_empty());
        assert_eq!(locator.to_string(), "/*");
    }

    #[test]
    fn test_parse_errors() {
        assert!(Locator::parse("").is_err());
        assert!(Locator::parse("*[@Name='x']").is_err());
        assert!(Locator::parse("/*[@Name='x'").is_err());
        assert!(Locator::parse("/*[@Value='x']").is_err());
        assert!(Locator::parse("/*[position()=0]").is_err());
        assert!(Locator::parse("/*[@Name='x]").is_err());
    }

    #[test]
    fn test_quote_literal_plain() {
        assert_eq!(quote_literal("Submit"), "'Submit'");
    }

    #[test]
    fn test_quote_literal_single_quote() {
        assert_eq!(quote_literal("Customer's name"), "\"Customer's name\"");
    }

    #[test]
    fn test_quote_literal_both_quotes_round_trips() {
        let value = r#"He said "it's" fine"#;
        let quoted = quote_literal(value);
        assert!(quoted.starts_with("concat("));

        let locator = Locator::parse(&format!("/*[@Name={quoted}]")).unwrap();
        assert_eq!(locator.steps[0].predicates[0], Predicate::Name(value.to_string()));
    }

    #[test]
    fn test_anchor_fragment() {
        let anchored = Locator::anchor("/*[@Name='Main']", "*[@AutomationId='ok']").unwrap();
        assert_eq!(anchored, "/*[@Name='Main']/*[@AutomationId='ok']");

        let anchored = Locator::anchor("/*[@Name='Main']", "//*[@Name='Save']").unwrap();
        assert_eq!(anchored, "/*[@Name='Main']//*[@Name='Save']");
    }

    #[test]
    fn test_strip_name() {
        let mut locator =
            Locator::parse("/*[@Name='User Name' and @ControlType='ControlType.Text']").unwrap();
        assert!(locator.last_mut().unwrap().strip_name());
        assert_eq!(locator.to_string(), "/*[@ControlType='ControlType.Text']");
        assert!(!locator.last_mut().unwrap().strip_name());
    }

    #[test]
    fn test_is_within() {
        let container = Locator::parse("/*[@Name='Main']").unwrap();
        let child = Locator::parse("/*[@Name='Main']/*[@Name='OK']").unwrap();
        assert!(child.is_within(&container));
        assert!(!container.is_within(&container));
        assert!(!container.is_within(&child));
    }
}
