//! Container inspection.
//!
//! `inspect` enumerates a container's direct nodes, classifies and addresses
//! each one, merges predeclared definitions, recurses into sub-containers and
//! finally names everything into the container's component registry.
//!
//! Nameless containers never become components: their children are spliced
//! into the enclosing container's flat list. Named containers are inspected
//! recursively and registered as one component.

use std::fmt::Display;
use std::str::FromStr;

use tracing::{debug, error, info, warn};

use uimap_core::strategy::{EXTRA_COMBO_HEURISTIC, EXTRA_LAYOUT, EXTRA_LOCATOR_STRATEGY};
use uimap_core::{
    find_definition, ComboHeuristic, ComponentDefinition, Element, ElementKind, Error, Layout,
    LocatorStrategy, NodeHandle, PerceptionConfig, Result, ScrollBars, PATH_SEPARATOR,
};
use uimap_driver::{Driver, DriverExt, NodeAttributes};

use crate::{
    Classification, LabelAssociator, LayoutGrouper, LocatorSynthesizer, SpecializationFactory,
    TypeClassifier,
};

/// Strategies inherited top-down through the container tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanContext {
    /// Locator generation strategy
    pub strategy: LocatorStrategy,
    /// Grouping layout
    pub layout: Layout,
    /// Combo probe heuristic
    pub heuristic: ComboHeuristic,
    /// Nesting depth below the root
    pub depth: usize,
}

impl ScanContext {
    /// Context at the root, from configuration defaults.
    pub fn from_config(config: &PerceptionConfig) -> Self {
        Self {
            strategy: config.locator.strategy,
            layout: config.layout.default,
            heuristic: ComboHeuristic::default(),
            depth: 0,
        }
    }

    /// Context of a container at `path` (labels joined with `::`) under `root`.
    ///
    /// Stops at the first label that does not resolve.
    pub fn for_container(config: &PerceptionConfig, root: &Element, path: &str) -> Self {
        let mut ctx = Self::from_config(config).inherit(root);
        if path.is_empty() {
            return ctx;
        }
        let mut current = root;
        for label in path.split(PATH_SEPARATOR) {
            let Some(next) = current.components.get(label) else {
                break;
            };
            ctx = ctx.inherit(next).deeper();
            current = next;
        }
        ctx
    }

    /// Apply the overrides an element carries in `extra`.
    ///
    /// Unparsable overrides are logged and ignored.
    pub fn inherit(&self, element: &Element) -> Self {
        Self {
            strategy: override_setting(element, EXTRA_LOCATOR_STRATEGY, self.strategy),
            layout: override_setting(element, EXTRA_LAYOUT, self.layout),
            heuristic: override_setting(element, EXTRA_COMBO_HEURISTIC, self.heuristic),
            depth: self.depth,
        }
    }

    /// One level further down.
    pub fn deeper(mut self) -> Self {
        self.depth += 1;
        self
    }
}

fn override_setting<T>(element: &Element, key: &str, inherited: T) -> T
where
    T: FromStr,
    T::Err: Display,
{
    match element.setting::<T>(key) {
        Some(Ok(value)) => value,
        Some(Err(e)) => {
            warn!("Ignoring '{}' override on {}: {}", key, element.xpath, e);
            inherited
        }
        None => inherited,
    }
}

/// The container whose registry collected nodes end up in.
struct Scope<'s> {
    container_xpath: &'s str,
    container_label: &'s str,
    definitions: &'s [ComponentDefinition],
}

/// Orchestrates synthesis, classification, grouping and association for
/// one container at a time.
pub struct ContainerInspector<'a, D: Driver + ?Sized> {
    driver: &'a D,
    config: &'a PerceptionConfig,
    synthesizer: LocatorSynthesizer,
    classifier: TypeClassifier<'a, D>,
    factory: SpecializationFactory,
    grouper: LayoutGrouper,
    associator: LabelAssociator,
}

impl<'a, D: Driver + ?Sized> ContainerInspector<'a, D> {
    /// Create an inspector.
    pub fn new(driver: &'a D, config: &'a PerceptionConfig) -> Result<Self> {
        Ok(Self {
            driver,
            config,
            synthesizer: LocatorSynthesizer::from_config(config),
            classifier: TypeClassifier::new(driver, &config.classification)?,
            factory: SpecializationFactory::new(config.table.clone()),
            grouper: LayoutGrouper::from_config(&config.layout),
            associator: LabelAssociator::from_config(&config.classification),
        })
    }

    /// Classify the application's main window and inspect it.
    ///
    /// `definitions` describe the main window's children.
    pub fn load_root(&self, definitions: &[ComponentDefinition]) -> Result<Element> {
        let node = self.driver.root()?;
        let attrs = NodeAttributes::fetch(self.driver, node);
        let ctx = ScanContext::from_config(self.config);

        let xpath = self
            .synthesizer
            .synthesize("", "desktop", &attrs, ctx.strategy, || Some(1))?;
        let kind = self.classify_kind(node, &attrs, &xpath, ctx.heuristic)?;

        let mut root = self.element_for(xpath, &attrs, kind, node, Some(1));
        root.label = if attrs.name.trim().is_empty() {
            kind.as_str().to_string()
        } else {
            attrs.name.clone()
        };
        self.inspect(&mut root, definitions, &ctx)?;
        Ok(root)
    }

    /// Rebuild `container`'s component registry from the live tree.
    ///
    /// `ctx` is the context the container was reached with; the container's
    /// own overrides are applied here. Fails with
    /// [`Error::UnresolvableLocator`] when any descendant cannot be
    /// addressed, and with [`Error::StaleNode`] when the container has no
    /// live node.
    pub fn inspect(
        &self,
        container: &mut Element,
        definitions: &[ComponentDefinition],
        ctx: &ScanContext,
    ) -> Result<()> {
        let node = container
            .node
            .filter(|node| self.driver.is_live(*node))
            .ok_or_else(|| Error::StaleNode(container.xpath.clone()))?;
        let ctx = ctx.inherit(container);
        info!(
            "Inspecting container '{}' ({}) at depth {}",
            container.label, container.element_type, ctx.depth
        );

        let xpath = container.xpath.clone();
        let label = container.label.clone();
        let scope = Scope {
            container_xpath: &xpath,
            container_label: &label,
            definitions,
        };
        let mut scroll_bars = ScrollBars::default();
        let mut collected = Vec::new();
        self.collect(node, &xpath, &scope, &ctx, &mut scroll_bars, &mut collected)?;

        container.components.clear();
        container.scroll_bars = scroll_bars;

        let (named, grouped): (Vec<Element>, Vec<Element>) =
            collected.into_iter().partition(is_self_named);
        for mut element in named {
            element.label = own_label(&element);
            container.add_component(element);
        }
        let groups = self.grouper.group(grouped, ctx.layout);
        self.associator.associate(container, groups)?;

        info!(
            "Container '{}' holds {} component(s)",
            container.label,
            container.components.len()
        );
        Ok(())
    }

    /// Reclassify one named child of `container` from the live tree.
    ///
    /// `ctx` is the container's own context (see
    /// [`ScanContext::for_container`]). The child keeps its label, locator,
    /// caption and overrides; everything else is rebuilt. Returns `None`
    /// when no child has that label.
    pub fn inspect_component<'c>(
        &self,
        container: &'c mut Element,
        label: &str,
        definitions: &[ComponentDefinition],
        ctx: &ScanContext,
    ) -> Result<Option<&'c Element>> {
        let Some(existing) = container.components.get(label) else {
            return Ok(None);
        };
        let xpath = existing.xpath.clone();
        let node = self
            .driver
            .find_by_locator(&xpath)?
            .into_iter()
            .next()
            .ok_or_else(|| Error::StaleNode(xpath.clone()))?;
        let attrs = NodeAttributes::fetch(self.driver, node);
        let kind = self.classify_kind(node, &attrs, &xpath, ctx.heuristic)?;

        let mut fresh = self.element_for(xpath.clone(), &attrs, kind, node, existing.sibling_position);
        fresh.label = existing.label.clone();
        fresh.extra = existing.extra.clone();
        fresh.caption = existing.caption.clone();
        fresh.predeclared_label = existing.predeclared_label.clone();
        fresh.popup_owner = existing.popup_owner.clone();
        if existing.element_type != kind && existing.predeclared_label.is_some() {
            // a predeclared kind survives reclassification
            fresh.element_type = existing.element_type;
            fresh.editable = existing.editable;
        }

        let definition = find_definition(definitions, &fresh, &container.xpath)?;
        if let Some(definition) = definition {
            definition.apply_to(&mut fresh, &container.xpath)?;
        }
        if fresh.element_type.is_specializable() {
            fresh.specialization = self.factory.build(self.driver, node, fresh.element_type);
        }
        if fresh.element_type.is_container() {
            let child_definitions = definition.map(|d| d.components.clone()).unwrap_or_default();
            self.inspect(&mut fresh, &child_definitions, &ctx.deeper())?;
        }

        debug!("{} reinspected as {}", xpath, fresh.element_type);
        let registered = container.add_component(fresh);
        Ok(container.components.get(&registered))
    }

    fn classify_kind(
        &self,
        node: NodeHandle,
        attrs: &NodeAttributes,
        xpath: &str,
        heuristic: ComboHeuristic,
    ) -> Result<ElementKind> {
        match self.classifier.classify(node, attrs, heuristic, true)? {
            Classification::Kind(kind) => Ok(kind),
            Classification::PromoteChildren(_) => Err(Error::AmbiguousComboShape(format!(
                "{xpath} opens onto radio buttons only"
            ))),
        }
    }

    /// Gather the elements `parent` contributes to the scope's container.
    fn collect(
        &self,
        parent: NodeHandle,
        parent_xpath: &str,
        scope: &Scope<'_>,
        ctx: &ScanContext,
        scroll_bars: &mut ScrollBars,
        out: &mut Vec<Element>,
    ) -> Result<()> {
        let children: Vec<(NodeHandle, NodeAttributes)> = self
            .driver
            .children_or_empty(parent)
            .into_iter()
            .map(|child| (child, NodeAttributes::fetch(self.driver, child)))
            .collect();

        for (index, (node, attrs)) in children.iter().enumerate() {
            let position = sibling_position(&children, index);
            if attrs.is("ScrollBar") {
                self.slot_scroll_bar(attrs, position, parent_xpath, scope, ctx, scroll_bars)?;
                continue;
            }
            if self.config.classification.is_ignored(&attrs.control_type) {
                debug!("ignoring {} under {}", attrs.control_type, parent_xpath);
                continue;
            }
            if attrs.is_anonymous() && self.driver.children_or_empty(*node).is_empty() {
                debug!("skipping opaque {} under {}", attrs.control_type, parent_xpath);
                continue;
            }
            self.collect_node(*node, attrs, position, parent_xpath, scope, ctx, scroll_bars, out)?;
        }
        Ok(())
    }

    #[allow(clippy::too_many_arguments)]
    fn collect_node(
        &self,
        node: NodeHandle,
        attrs: &NodeAttributes,
        position: Option<usize>,
        parent_xpath: &str,
        scope: &Scope<'_>,
        ctx: &ScanContext,
        scroll_bars: &mut ScrollBars,
        out: &mut Vec<Element>,
    ) -> Result<()> {
        let xpath = self
            .synthesizer
            .synthesize(parent_xpath, scope.container_label, attrs, ctx.strategy, || position)
            .map_err(|e| {
                error!("Aborting load of '{}': {}", scope.container_label, e);
                e
            })?;

        let kind = match self.classifier.classify(node, attrs, ctx.heuristic, true) {
            Ok(Classification::Kind(kind)) => kind,
            Ok(Classification::PromoteChildren(radios)) => {
                debug!("{} is a radio group, promoting {} option(s)", xpath, radios.len());
                let first = out.len();
                for (index, (radio, radio_attrs)) in radios.iter().enumerate() {
                    let position = sibling_position(&radios, index);
                    self.collect_node(*radio, radio_attrs, position, &xpath, scope, ctx, scroll_bars, out)?;
                }
                // options only exist while the combo is open
                for option in &mut out[first..] {
                    option.popup_owner.get_or_insert_with(|| xpath.clone());
                }
                return Ok(());
            }
            Err(Error::AmbiguousComboShape(detail)) => {
                warn!("Dropping combo {}: {}", xpath, detail);
                return Ok(());
            }
            Err(e @ Error::Unclassified { .. }) => {
                let within_depth = ctx.depth < self.config.classification.max_depth;
                if within_depth && !self.driver.children_or_empty(node).is_empty() {
                    debug!("{}; scanning its children in place", e);
                    return self.collect(node, &xpath, scope, &ctx.deeper(), scroll_bars, out);
                }
                warn!("Dropping {}: {}", xpath, e);
                return Ok(());
            }
            Err(e) => return Err(e),
        };

        let mut element = self.element_for(xpath, attrs, kind, node, position);

        let mut definition = find_definition(scope.definitions, &element, scope.container_xpath)?
            .map(|d| (d, scope.container_xpath));
        if definition.is_none() && parent_xpath != scope.container_xpath {
            definition = find_definition(scope.definitions, &element, parent_xpath)?
                .map(|d| (d, parent_xpath));
        }
        if let Some((definition, anchor)) = definition {
            definition.apply_to(&mut element, anchor)?;
            debug!("{} matches definition '{}'", element.xpath, definition.label);
        }

        if element.element_type.is_specializable() {
            element.specialization = self.factory.build(self.driver, node, element.element_type);
        }

        if element.element_type.is_container() {
            if ctx.depth + 1 > self.config.classification.max_depth {
                warn!("{} exceeds the maximum scan depth, not descending", element.xpath);
                out.push(element);
                return Ok(());
            }
            let child_definitions: Vec<ComponentDefinition> = definition
                .map(|(d, _)| d.components.clone())
                .unwrap_or_default();

            if element.name.trim().is_empty() && element.predeclared_label.is_none() {
                let mut lent = scope.definitions.to_vec();
                lent.extend(child_definitions);
                let inner = Scope {
                    container_xpath: scope.container_xpath,
                    container_label: scope.container_label,
                    definitions: &lent,
                };
                debug!("splicing nameless {} {}", element.element_type, element.xpath);
                let ctx = ctx.inherit(&element).deeper();
                return self.collect(node, &element.xpath, &inner, &ctx, scroll_bars, out);
            }

            element.label = own_label(&element);
            self.inspect(&mut element, &child_definitions, &ctx.deeper())?;
        }

        out.push(element);
        Ok(())
    }

    fn slot_scroll_bar(
        &self,
        attrs: &NodeAttributes,
        position: Option<usize>,
        parent_xpath: &str,
        scope: &Scope<'_>,
        ctx: &ScanContext,
        scroll_bars: &mut ScrollBars,
    ) -> Result<()> {
        let vertical = match attrs.bounds {
            Some(bounds) => bounds.is_vertical(),
            None => !attrs.name.contains("Horizontal"),
        };
        let slot = if vertical {
            &mut scroll_bars.vertical
        } else {
            &mut scroll_bars.horizontal
        };
        if slot.is_none() {
            let xpath = self.synthesizer.synthesize(
                parent_xpath,
                scope.container_label,
                attrs,
                ctx.strategy,
                || position,
            )?;
            debug!("{} scrollbar at {}", if vertical { "vertical" } else { "horizontal" }, xpath);
            *slot = Some(xpath);
        }
        Ok(())
    }

    fn element_for(
        &self,
        xpath: String,
        attrs: &NodeAttributes,
        kind: ElementKind,
        node: NodeHandle,
        position: Option<usize>,
    ) -> Element {
        let mut element = Element::new(xpath, attrs.control_type.clone(), kind);
        element.name = attrs.name.clone();
        element.automation_id = attrs.automation_id.clone();
        element.class_name = attrs.class_name.clone();
        element.bounds = attrs.bounds;
        element.node = Some(node);
        element.sibling_position = position;
        if self.config.classification.uses_child_count(&attrs.class_name) {
            element.component_type_hint = self
                .config
                .classification
                .child_count_class_prefixes
                .iter()
                .find(|prefix| attrs.class_name.starts_with(prefix.as_str()))
                .map(|prefix| prefix.trim_end_matches('.').to_string());
        }
        element
    }
}

/// 1-based position among snapshot siblings of the same control type.
fn sibling_position(siblings: &[(NodeHandle, NodeAttributes)], index: usize) -> Option<usize> {
    let control_type = &siblings.get(index)?.1.control_type;
    Some(
        siblings[..=index]
            .iter()
            .filter(|(_, a)| &a.control_type == control_type)
            .count(),
    )
}

/// Elements registered under their own name, bypassing spatial pairing.
fn is_self_named(element: &Element) -> bool {
    let kind = element.element_type;
    kind.is_self_labeling()
        || kind.is_chrome()
        || (kind.is_container()
            && (!element.name.trim().is_empty() || element.predeclared_label.is_some()))
}

fn own_label(element: &Element) -> String {
    if let Some(label) = &element.predeclared_label {
        return label.clone();
    }
    if !element.name.trim().is_empty() {
        return element.name.clone();
    }
    if !element.automation_id.trim().is_empty() {
        return element.automation_id.clone();
    }
    element.element_type.as_str().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use uimap_driver::{MemoryDriver, RecordedNode};

    fn load(root: RecordedNode) -> Element {
        load_with(root, &PerceptionConfig::default(), &[])
    }

    fn load_with(
        root: RecordedNode,
        config: &PerceptionConfig,
        definitions: &[ComponentDefinition],
    ) -> Element {
        let driver = MemoryDriver::new(root);
        let inspector = ContainerInspector::new(&driver, config).unwrap();
        inspector.load_root(definitions).unwrap()
    }

    #[test]
    fn test_root_is_addressed_and_labeled() {
        let root = load(RecordedNode::new("Window").with_name("Main"));
        assert_eq!(root.label, "Main");
        assert_eq!(root.xpath, "/*[@Name='Main' and @ControlType='ControlType.Window']");
        assert_eq!(root.element_type, ElementKind::Window);
        assert!(root.components.is_empty());
    }

    #[test]
    fn test_self_labeling_register_first() {
        let root = load(
            RecordedNode::new("Window")
                .with_name("Main")
                .with_child(RecordedNode::new("Text").with_name("Name").with_bounds(10, 10, 50, 18))
                .with_child(
                    RecordedNode::new("Edit")
                        .with_automation_id("txtName")
                        .with_bounds(80, 10, 100, 18),
                )
                .with_child(RecordedNode::new("Button").with_name("Save").with_bounds(10, 50, 60, 20)),
        );
        assert_eq!(root.components.labels(), vec!["Save", "Name"]);
        assert_eq!(root.component("Name").unwrap().element_type, ElementKind::Textbox);
    }

    #[test]
    fn test_scroll_bars_are_slotted() {
        let root = load(
            RecordedNode::new("Window")
                .with_name("Main")
                .with_child(
                    RecordedNode::new("ScrollBar")
                        .with_automation_id("vbar")
                        .with_bounds(380, 0, 20, 300),
                )
                .with_child(
                    RecordedNode::new("ScrollBar")
                        .with_automation_id("hbar")
                        .with_bounds(0, 280, 380, 20),
                ),
        );
        assert!(root.components.is_empty());
        assert!(root.scroll_bars.vertical.as_deref().unwrap().contains("vbar"));
        assert!(root.scroll_bars.horizontal.as_deref().unwrap().contains("hbar"));
    }

    #[test]
    fn test_ignored_and_opaque_nodes_are_skipped() {
        let root = load(
            RecordedNode::new("Window")
                .with_name("Main")
                .with_child(RecordedNode::new("Image").with_name("logo"))
                .with_child(RecordedNode::new("Edit"))
                .with_child(RecordedNode::new("Button").with_name("OK")),
        );
        assert_eq!(root.components.labels(), vec!["OK"]);
    }

    #[test]
    fn test_unclassified_node_is_dropped_without_aborting() {
        let root = load(
            RecordedNode::new("Window")
                .with_name("Main")
                .with_child(RecordedNode::new("Spinner").with_name("Qty"))
                .with_child(RecordedNode::new("Button").with_name("OK")),
        );
        assert_eq!(root.components.labels(), vec!["OK"]);
    }

    #[test]
    fn test_unclassified_wrapper_yields_its_children() {
        let root = load(
            RecordedNode::new("Window").with_name("Main").with_child(
                RecordedNode::new("Spinner")
                    .with_automation_id("wrapper")
                    .with_child(RecordedNode::new("Button").with_name("Up")),
            ),
        );
        let up = root.component("Up").unwrap();
        assert!(up.xpath.contains("@AutomationId='wrapper'"));
    }

    #[test]
    fn test_named_container_is_kept_nameless_is_spliced() {
        let root = load(
            RecordedNode::new("Window")
                .with_name("Main")
                .with_child(
                    RecordedNode::new("Group")
                        .with_name("Shipping")
                        .with_child(RecordedNode::new("CheckBox").with_name("Express")),
                )
                .with_child(
                    RecordedNode::new("Group")
                        .with_child(RecordedNode::new("CheckBox").with_name("Gift wrap")),
                ),
        );
        assert_eq!(root.components.labels(), vec!["Shipping", "Gift wrap"]);
        let express = root.component("Shipping::Express").unwrap();
        assert_eq!(express.element_type, ElementKind::Checkbox);
        assert_eq!(express.container.as_deref(), Some(root.component("Shipping").unwrap().xpath.as_str()));

        let gift = root.component("Gift wrap").unwrap();
        assert!(gift
            .xpath
            .contains("/*[@ControlType='ControlType.Group' and position()=2]/"));
        assert_eq!(gift.container.as_deref(), Some(root.xpath.as_str()));
    }

    #[test]
    fn test_unresolvable_locator_aborts_load() {
        let mut config = PerceptionConfig::default();
        config.locator.omit_control_type = true;
        let driver = MemoryDriver::new(
            RecordedNode::new("Window").with_name("Main").with_child(
                RecordedNode::new("Edit").with_class_name("WindowsForms10.EDIT"),
            ),
        );
        let inspector = ContainerInspector::new(&driver, &config).unwrap();
        let err = inspector.load_root(&[]).unwrap_err();
        assert!(matches!(err, Error::UnresolvableLocator { ref container, .. } if container == "Main"));
    }

    #[test]
    fn test_definition_overrides_cosmetics_and_label() {
        let definitions = vec![ComponentDefinition {
            element_type: Some(ElementKind::FormattedTextbox),
            extra: [("mask".to_string(), "000-00".to_string())].into_iter().collect(),
            ..ComponentDefinition::with_automation_id("Zip Code", "txtZip")
        }];
        let root = load_with(
            RecordedNode::new("Window")
                .with_name("Main")
                .with_child(RecordedNode::new("Edit").with_automation_id("txtZip")),
            &PerceptionConfig::default(),
            &definitions,
        );
        let zip = root.component("Zip Code").unwrap();
        assert_eq!(zip.element_type, ElementKind::FormattedTextbox);
        assert_eq!(zip.extra.get("mask").map(String::as_str), Some("000-00"));
        assert_eq!(
            zip.xpath,
            "/*[@Name='Main' and @ControlType='ControlType.Window']/*[@AutomationId='txtZip' and @ControlType='ControlType.Edit']"
        );
    }

    #[test]
    fn test_layout_override_is_inherited() {
        let definitions = vec![ComponentDefinition {
            extra: [(EXTRA_LAYOUT.to_string(), "two_line".to_string())]
                .into_iter()
                .collect(),
            ..ComponentDefinition::with_automation_id("Address", "grpAddress")
        }];
        let root = load_with(
            RecordedNode::new("Window").with_name("Main").with_child(
                RecordedNode::new("Group")
                    .with_automation_id("grpAddress")
                    .with_child(RecordedNode::new("Text").with_name("Street").with_bounds(10, 10, 60, 18))
                    .with_child(RecordedNode::new("Text").with_name("City").with_bounds(200, 10, 60, 18))
                    .with_child(RecordedNode::new("Edit").with_automation_id("txtStreet").with_bounds(10, 30, 150, 20))
                    .with_child(RecordedNode::new("Edit").with_automation_id("txtCity").with_bounds(200, 30, 150, 20)),
            ),
            &PerceptionConfig::default(),
            &definitions,
        );
        let address = root.component("Address").unwrap();
        assert_eq!(address.component("Street").unwrap().automation_id, "txtStreet");
        assert_eq!(address.component("City").unwrap().automation_id, "txtCity");
    }

    #[test]
    fn test_nameless_tab_group_is_spliced() {
        let root = load(
            RecordedNode::new("Window").with_name("Main").with_child(
                RecordedNode::new("Tab")
                    .with_automation_id("tabs")
                    .with_child(RecordedNode::new("TabItem").with_name("General"))
                    .with_child(RecordedNode::new("TabItem").with_name("Advanced")),
            ),
        );
        assert_eq!(root.components.labels(), vec!["General", "Advanced"]);
        assert_eq!(root.component("General").unwrap().element_type, ElementKind::Tab);
    }

    #[test]
    fn test_inspect_component_refreshes_in_place() {
        let driver = MemoryDriver::new(
            RecordedNode::new("Window")
                .with_name("Main")
                .with_child(RecordedNode::new("Button").with_name("OK")),
        );
        let config = PerceptionConfig::default();
        let inspector = ContainerInspector::new(&driver, &config).unwrap();
        let mut root = inspector.load_root(&[]).unwrap();
        let ctx = ScanContext::for_container(&config, &root, "");

        driver.invalidate();
        let ok = inspector
            .inspect_component(&mut root, "OK", &[], &ctx)
            .unwrap()
            .unwrap();
        assert_eq!(ok.label, "OK");
        assert!(driver.is_live(ok.node.unwrap()));
        assert_eq!(root.components.len(), 1);

        assert!(inspector
            .inspect_component(&mut root, "Cancel", &[], &ctx)
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_inspect_stale_container_keeps_registry() {
        let driver = MemoryDriver::new(
            RecordedNode::new("Window")
                .with_name("Main")
                .with_child(RecordedNode::new("Button").with_name("OK")),
        );
        let config = PerceptionConfig::default();
        let inspector = ContainerInspector::new(&driver, &config).unwrap();
        let mut root = inspector.load_root(&[]).unwrap();
        let ctx = ScanContext::from_config(&config);

        driver.invalidate();
        let err = inspector.inspect(&mut root, &[], &ctx).unwrap_err();
        assert!(matches!(err, Error::StaleNode(ref xpath) if *xpath == root.xpath));
        assert_eq!(root.components.labels(), vec!["OK"]);
    }

    #[test]
    fn test_scan_context_inherits_and_ignores_bad_overrides() {
        let config = PerceptionConfig::default();
        let mut element = Element::new("/*[@Name='Main']", "ControlType.Window", ElementKind::Window);
        element
            .extra
            .insert(EXTRA_COMBO_HEURISTIC.to_string(), "child_count".to_string());
        element
            .extra
            .insert(EXTRA_LAYOUT.to_string(), "diagonal".to_string());
        let ctx = ScanContext::from_config(&config).inherit(&element);
        assert_eq!(ctx.heuristic, ComboHeuristic::ChildCount);
        assert_eq!(ctx.layout, Layout::LeftToRight);
        assert_eq!(ctx.deeper().depth, 1);
    }
}
