use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use uimap_core::{BoundingRectangle, Element, ElementKind, Layout, PerceptionConfig};
use uimap_detector::{ContainerInspector, LayoutGrouper};
use uimap_driver::{MemoryDriver, RecordedNode};

/// Create a form with `rows` label/input pairs and a combo per ten rows
fn create_form(rows: i32) -> RecordedNode {
    let mut form = RecordedNode::new("Window").with_name("Orders").with_bounds(0, 0, 800, 30 * rows + 40);
    for row in 0..rows {
        let y = 10 + row * 30;
        form = form
            .with_child(RecordedNode::new("Text").with_name(format!("Field {row}")).with_bounds(10, y, 80, 18))
            .with_child(
                RecordedNode::new("Edit")
                    .with_automation_id(format!("txtField{row}"))
                    .with_bounds(100, y + 1, 200, 20),
            );
        if row % 10 == 0 {
            form = form.with_child(
                RecordedNode::new("ComboBox")
                    .with_automation_id(format!("cmbChoice{row}"))
                    .with_bounds(320, y, 150, 20)
                    .with_popup(RecordedNode::new("List").with_child(RecordedNode::new("ListItem").with_name("A"))),
            );
        }
    }
    form.with_child(
        RecordedNode::new("Group")
            .with_child(RecordedNode::new("Button").with_name("OK"))
            .with_child(RecordedNode::new("Button").with_name("Cancel")),
    )
}

/// Create loose elements scattered over a screen
fn create_scattered(count: i32) -> Vec<Element> {
    (0..count)
        .map(|i| {
            let kind = if i % 2 == 0 { ElementKind::Label } else { ElementKind::Textbox };
            Element::new(format!("/*[@AutomationId='e{i}']"), "ControlType.Edit", kind)
                .with_label(format!("e{i}"))
                .with_bounds(BoundingRectangle::new((i * 37) % 700, (i * 53) % 500, 60, 18))
        })
        .collect()
}

fn bench_full_scan(c: &mut Criterion) {
    let mut group = c.benchmark_group("full_scan");
    let config = PerceptionConfig::default();

    for rows in [10, 50, 200].iter() {
        let driver = MemoryDriver::new(create_form(*rows));

        group.bench_with_input(BenchmarkId::from_parameter(format!("{rows}_rows")), &driver, |b, d| {
            b.iter(|| {
                let inspector = ContainerInspector::new(d, &config).unwrap();
                let root = inspector.load_root(&[]).unwrap();
                black_box(root);
            });
        });
    }

    group.finish();
}

fn bench_grouping(c: &mut Criterion) {
    let grouper = LayoutGrouper::default();
    let elements = create_scattered(500);

    c.bench_function("group_left_to_right", |b| {
        b.iter(|| {
            let buckets = grouper.group(black_box(elements.clone()), Layout::LeftToRight);
            black_box(buckets);
        });
    });

    c.bench_function("group_two_line", |b| {
        b.iter(|| {
            let buckets = grouper.group(black_box(elements.clone()), Layout::TwoLine);
            black_box(buckets);
        });
    });
}

criterion_group!(benches, bench_full_scan, bench_grouping);
criterion_main!(benches);
