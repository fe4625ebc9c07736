use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use family_tree_renderer::branches::partition_branches;
use family_tree_renderer::config::LayoutConfig;
use family_tree_renderer::graph::build_graph;
use family_tree_renderer::layout::compute_layout;
use family_tree_renderer::model::{Member, ViewMode};
use family_tree_renderer::parser::parse_members;
use family_tree_renderer::render::render_svg;
use family_tree_renderer::theme::Theme;
use std::hint::black_box;

/// `generations` levels below `roots` founding couples, each couple having
/// `children` kids who marry in a partner from outside the tree.
fn synthetic_family(roots: usize, generations: usize, children: usize) -> Vec<Member> {
    let mut members = Vec::new();
    let mut next_id = 1u64;
    let mut couples: Vec<(u64, u64)> = Vec::new();

    for _ in 0..roots {
        let a = next_id;
        let b = next_id + 1;
        next_id += 2;
        members.push(Member::new(a, "Founder", "A").with_spouse(b));
        members.push(Member::new(b, "Founder", "B").with_spouse(a));
        couples.push((a, b));
    }

    for _ in 0..generations {
        let mut next_couples = Vec::new();
        for (a, b) in couples {
            for _ in 0..children {
                let child = next_id;
                let partner = next_id + 1;
                next_id += 2;
                members.push(
                    Member::new(child, "Child", "A")
                        .with_parents(&[a, b])
                        .with_spouse(partner),
                );
                members.push(Member::new(partner, "Partner", "B").with_spouse(child));
                next_couples.push((child, partner));
            }
        }
        couples = next_couples;
    }
    members
}

fn members_json(members: &[Member]) -> String {
    serde_json::to_string(members).unwrap_or_default()
}

fn bench_parse(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse");
    for (name, members) in [
        ("small", synthetic_family(1, 2, 2)),
        ("medium", synthetic_family(2, 3, 3)),
    ] {
        let json = members_json(&members);
        group.bench_with_input(BenchmarkId::from_parameter(name), &json, |b, json| {
            b.iter(|| parse_members(black_box(json)).unwrap_or_default());
        });
    }
    group.finish();
}

fn bench_partition(c: &mut Criterion) {
    let mut group = c.benchmark_group("partition");
    for size in [2usize, 4, 6] {
        let members = synthetic_family(3, size, 2);
        group.bench_with_input(BenchmarkId::from_parameter(members.len()), &members, |b, m| {
            b.iter(|| partition_branches(black_box(m)).len());
        });
    }
    group.finish();
}

fn bench_layout(c: &mut Criterion) {
    let theme = Theme::classic();
    let config = LayoutConfig::default();
    let mut group = c.benchmark_group("layout");
    for (name, members) in [
        ("small", synthetic_family(1, 2, 2)),
        ("medium", synthetic_family(2, 3, 3)),
        ("large", synthetic_family(3, 4, 2)),
    ] {
        let graph = build_graph(&members, ViewMode::Branches, &theme);
        group.bench_with_input(BenchmarkId::from_parameter(name), &graph, |b, graph| {
            b.iter(|| compute_layout(black_box(graph), &config));
        });
    }
    group.finish();
}

fn bench_end_to_end(c: &mut Criterion) {
    let theme = Theme::classic();
    let config = LayoutConfig::default();
    let mut group = c.benchmark_group("end_to_end");
    for mode in [ViewMode::Plain, ViewMode::Branches] {
        let members = synthetic_family(2, 3, 2);
        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{mode:?}").to_lowercase()),
            &members,
            |b, members| {
                b.iter(|| {
                    let graph = build_graph(black_box(members), mode, &theme);
                    let layout = compute_layout(&graph, &config);
                    render_svg(&layout, &theme, &config)
                });
            },
        );
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_parse,
    bench_partition,
    bench_layout,
    bench_end_to_end
);
criterion_main!(benches);
