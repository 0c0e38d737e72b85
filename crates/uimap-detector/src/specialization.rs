//! Promotion of generic elements to specialized representations.

use tracing::debug;

use uimap_core::{
    attr, ElementKind, ListSpec, MenuBarSpec, NodeHandle, Specialization, TabGroupSpec,
    TableSettings, TableSpec,
};
use uimap_driver::{Driver, DriverExt, NodeAttributes};

/// Builds the [`Specialization`] of a table, list, tab or menu element.
///
/// Lossy: children that cannot be read are left out.
#[derive(Debug, Clone, Default)]
pub struct SpecializationFactory {
    table: TableSettings,
}

impl SpecializationFactory {
    /// Create a factory with the given table constants.
    pub fn new(table: TableSettings) -> Self {
        Self { table }
    }

    /// Specialization for `node`, classified as `kind`.
    pub fn build<D: Driver + ?Sized>(
        &self,
        driver: &D,
        node: NodeHandle,
        kind: ElementKind,
    ) -> Specialization {
        let children: Vec<NodeAttributes> = driver
            .children_or_empty(node)
            .into_iter()
            .map(|child| NodeAttributes::fetch(driver, child))
            .collect();

        let specialization = match kind {
            ElementKind::Table => Specialization::Table(self.table_spec(driver, node)),
            ElementKind::HierTable => Specialization::HierTable(self.table_spec(driver, node)),
            ElementKind::ListGrouping => Specialization::List(ListSpec {
                items: names_of(&children, &["ListItem", "DataItem"]),
                multi_select: attr::is_true(
                    &driver.attribute_or_empty(node, attr::CAN_SELECT_MULTIPLE),
                ),
            }),
            ElementKind::TabGroup => {
                let selected = driver
                    .children_or_empty(node)
                    .into_iter()
                    .find(|&tab| attr::is_true(&driver.attribute_or_empty(tab, attr::IS_SELECTED)))
                    .map(|tab| driver.attribute_or_empty(tab, attr::NAME));
                Specialization::TabGroup(TabGroupSpec {
                    tabs: names_of(&children, &["TabItem"]),
                    selected,
                })
            }
            ElementKind::MenuBar => Specialization::MenuBar(MenuBarSpec {
                menus: names_of(&children, &["MenuItem"]),
            }),
            _ => Specialization::Generic,
        };
        debug!("{} specialized as {:?}", node, specialization);
        specialization
    }

    fn table_spec<D: Driver + ?Sized>(&self, driver: &D, node: NodeHandle) -> TableSpec {
        let mut columns = Vec::new();
        let mut row_count = 0;
        for child in driver.children_or_empty(node) {
            let attrs = NodeAttributes::fetch(driver, child);
            match attrs.short_type() {
                "Header" => {
                    columns.extend(
                        driver
                            .children_or_empty(child)
                            .into_iter()
                            .map(|item| driver.attribute_or_empty(item, attr::NAME))
                            .filter(|name| !name.is_empty()),
                    );
                }
                "DataItem" | "Custom" | "TreeItem" | "ListItem" => row_count += 1,
                _ => {}
            }
        }
        TableSpec {
            columns,
            row_count,
            header_height: self.table.header_height,
            row_height: self.table.row_height,
        }
    }
}

fn names_of(children: &[NodeAttributes], types: &[&str]) -> Vec<String> {
    children
        .iter()
        .filter(|a| types.contains(&a.short_type()) && !a.name.is_empty())
        .map(|a| a.name.clone())
        .collect()
}
