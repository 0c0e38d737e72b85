//! Spatial grouping of a container's children.
//!
//! Left-to-right layouts read in rows: labels sit beside their inputs, so
//! members are bucketed by `y` and ordered by `x`. Two-line layouts read in
//! columns: labels sit above their inputs, so members are bucketed by `x`
//! and ordered by `y`.

use tracing::trace;

use uimap_core::{Element, Layout, LayoutSettings};

/// Buckets elements by bounding-box proximity.
#[derive(Debug, Clone)]
pub struct LayoutGrouper {
    tolerance: i32,
    leftover_pass: bool,
}

impl Default for LayoutGrouper {
    fn default() -> Self {
        Self::from_config(&LayoutSettings::default())
    }
}

impl LayoutGrouper {
    /// Create a grouper.
    pub fn new(tolerance: i32, leftover_pass: bool) -> Self {
        Self {
            tolerance,
            leftover_pass,
        }
    }

    /// Grouper for the `layout` configuration section.
    pub fn from_config(settings: &LayoutSettings) -> Self {
        Self::new(settings.tolerance_px, settings.leftover_pass)
    }

    /// Group `elements` under `layout`.
    ///
    /// Every element lands in exactly one bucket. Elements without bounds
    /// form a final bucket in their original order.
    pub fn group(&self, elements: Vec<Element>, layout: Layout) -> Vec<Vec<Element>> {
        let (mut placed, unplaced): (Vec<Element>, Vec<Element>) =
            elements.into_iter().partition(|e| e.bounds.is_some());

        placed.sort_by_key(|e| bucket_key(e, layout));

        let mut buckets: Vec<Vec<Element>> = Vec::new();
        let mut anchor = 0;
        for element in placed {
            let key = bucket_key(&element, layout);
            match buckets.last_mut() {
                Some(bucket) if (key - anchor).abs() <= self.tolerance => bucket.push(element),
                _ => {
                    anchor = key;
                    buckets.push(vec![element]);
                }
            }
        }
        for bucket in &mut buckets {
            bucket.sort_by_key(|e| order_key(e, layout));
        }

        if layout == Layout::TwoLine && self.leftover_pass {
            buckets = extract_leftovers(buckets);
        }
        if !unplaced.is_empty() {
            buckets.push(unplaced);
        }
        trace!("grouped into {} bucket(s) under {:?}", buckets.len(), layout);
        buckets
    }
}

/// Pull singleton and label-free buckets into one trailing bucket ordered by
/// `y`, recovering inputs whose labels were not aligned with them.
fn extract_leftovers(buckets: Vec<Vec<Element>>) -> Vec<Vec<Element>> {
    let (mut leftover, mut kept): (Vec<Element>, Vec<Vec<Element>>) = (Vec::new(), Vec::new());
    for bucket in buckets {
        let has_label = bucket.iter().any(|e| e.element_type.is_label());
        if bucket.len() == 1 || !has_label {
            leftover.extend(bucket);
        } else {
            kept.push(bucket);
        }
    }
    if !leftover.is_empty() {
        leftover.sort_by_key(|e| order_key(e, Layout::TwoLine));
        kept.push(leftover);
    }
    kept
}

fn bucket_key(element: &Element, layout: Layout) -> i32 {
    let Some(bounds) = element.bounds else {
        return 0;
    };
    match layout {
        Layout::LeftToRight => bounds.y,
        Layout::TwoLine => bounds.x,
    }
}

fn order_key(element: &Element, layout: Layout) -> (i32, i32) {
    let Some(bounds) = element.bounds else {
        return (0, 0);
    };
    match layout {
        Layout::LeftToRight => (bounds.x, bounds.y),
        Layout::TwoLine => (bounds.y, bounds.x),
    }
}
