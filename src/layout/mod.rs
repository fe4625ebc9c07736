mod routing;
pub(crate) mod types;
pub use types::*;
use routing::*;

use crate::config::LayoutConfig;
use crate::graph::{EdgeKind, FamilyGraph, Position};
use dagre_rust::{
    GraphConfig as DagreConfig, GraphEdge as DagreEdge, GraphNode as DagreNode,
    layout as dagre_layout,
};
use graphlib_rust::{Graph as DagreGraph, GraphOption};
use std::collections::{HashMap, HashSet};

/// Lay out a family graph top-to-bottom and route its edges.
pub fn compute_layout(graph: &FamilyGraph, config: &LayoutConfig) -> Layout {
    let mut positioned = graph.clone();
    assign_positions(&mut positioned, config);

    let nodes: Vec<NodeLayout> = positioned
        .nodes
        .into_iter()
        .map(|node| NodeLayout {
            id: node.id,
            x: node.position.x,
            y: node.position.y,
            width: config.node_width,
            height: config.node_height,
            data: node.data,
        })
        .collect();

    let by_id: HashMap<&str, &NodeLayout> = nodes.iter().map(|n| (n.id.as_str(), n)).collect();
    let mut edges = Vec::with_capacity(positioned.edges.len());
    for edge in positioned.edges {
        let (Some(from), Some(to)) = (
            by_id.get(edge.source.as_str()),
            by_id.get(edge.target.as_str()),
        ) else {
            continue;
        };
        let points = match edge.kind {
            EdgeKind::Parent => route_parent_edge(from, to),
            EdgeKind::Spouse => route_spouse_edge(from, to),
        };
        edges.push(EdgeLayout {
            id: edge.id,
            from: edge.source,
            to: edge.target,
            kind: edge.kind,
            points,
            style: edge.style,
        });
    }

    let (width, height) = bounds(&nodes, config.margin);
    Layout {
        view_mode: config.view_mode,
        nodes,
        edges,
        width,
        height,
    }
}

/// Overwrite every node position with its hierarchical placement.
///
/// Ranks come from parent edges only; spouse edges are laid over the result. Positions
/// are the top-left corner of a `node_width` x `node_height` box. Returns `false` when
/// nothing was placed (an empty graph).
pub fn assign_positions(graph: &mut FamilyGraph, config: &LayoutConfig) -> bool {
    if graph.nodes.is_empty() {
        return false;
    }

    let mut dagre_graph: DagreGraph<DagreConfig, DagreNode, DagreEdge> =
        DagreGraph::new(Some(GraphOption {
            directed: Some(true),
            multigraph: Some(false),
            compound: Some(false),
        }));

    let mut graph_config = DagreConfig::default();
    graph_config.rankdir = Some("tb".to_string());
    // network-simplex can cycle on some family shapes; longest-path is a single DFS
    graph_config.ranker = Some("longest-path".to_string());
    graph_config.nodesep = Some(config.node_spacing);
    graph_config.ranksep = Some(config.rank_spacing);
    graph_config.marginx = Some(config.margin);
    graph_config.marginy = Some(config.margin);
    dagre_graph.set_graph(graph_config);

    for node in &graph.nodes {
        let mut dagre_node = DagreNode::default();
        dagre_node.width = config.node_width;
        dagre_node.height = config.node_height;
        dagre_graph.set_node(node.id.clone(), Some(dagre_node));
    }

    let mut edge_set: HashSet<(String, String)> = HashSet::new();
    for edge in graph.parent_edges() {
        if !edge_set.insert((edge.source.clone(), edge.target.clone())) {
            continue;
        }
        let edge_label = DagreEdge::default();
        let _ = dagre_graph.set_edge(&edge.source, &edge.target, Some(edge_label), None);
    }

    dagre_layout::run_layout(&mut dagre_graph);

    let mut applied = false;
    for node in &mut graph.nodes {
        let Some(dagre_node) = dagre_graph.node(&node.id) else {
            tracing::warn!(node = %node.id, "layout left node unplaced; keeping placeholder");
            continue;
        };
        node.position = Position {
            x: dagre_node.x - config.node_width / 2.0,
            y: dagre_node.y - config.node_height / 2.0,
        };
        applied = true;
    }
    tracing::debug!(
        nodes = graph.nodes.len(),
        parent_edges = edge_set.len(),
        "assigned hierarchical positions"
    );

    applied
}

fn bounds(nodes: &[NodeLayout], margin: f32) -> (f32, f32) {
    let mut max_x = 0.0f32;
    let mut max_y = 0.0f32;
    for node in nodes {
        max_x = max_x.max(node.x + node.width);
        max_y = max_y.max(node.y + node.height);
    }
    (max_x + margin, max_y + margin)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::build_graph;
    use crate::model::{Member, ViewMode};
    use crate::theme::Theme;
    use std::sync::mpsc;
    use std::time::Duration;

    fn three_generations() -> Vec<Member> {
        vec![
            Member::new(1, "Grand", "Pa").with_spouse(2),
            Member::new(2, "Grand", "Ma").with_spouse(1),
            Member::new(3, "Father", "X").with_parents(&[1, 2]).with_spouse(4),
            Member::new(4, "Mother", "Y"),
            Member::new(5, "Uncle", "X").with_parents(&[1, 2]),
            Member::new(6, "Child", "X").with_parents(&[3, 4]),
            Member::new(7, "Child", "Z").with_parents(&[3, 4]),
        ]
    }

    #[test]
    fn children_sit_below_parents() {
        let graph = build_graph(&three_generations(), ViewMode::Plain, &Theme::classic());
        let layout = compute_layout(&graph, &LayoutConfig::default());
        assert_eq!(layout.nodes.len(), 7);
        for edge in layout.edges.iter().filter(|e| e.kind == EdgeKind::Parent) {
            let parent = layout.node(&edge.from).unwrap();
            let child = layout.node(&edge.to).unwrap();
            assert!(child.y > parent.y, "{} should be below {}", edge.to, edge.from);
        }
    }

    #[test]
    fn nodes_in_one_rank_do_not_overlap() {
        let graph = build_graph(&three_generations(), ViewMode::Plain, &Theme::classic());
        let config = LayoutConfig::default();
        let layout = compute_layout(&graph, &config);
        for (i, a) in layout.nodes.iter().enumerate() {
            for b in layout.nodes.iter().skip(i + 1) {
                let overlap_x = a.x < b.x + b.width && b.x < a.x + a.width;
                let overlap_y = a.y < b.y + b.height && b.y < a.y + a.height;
                assert!(!(overlap_x && overlap_y), "{} overlaps {}", a.id, b.id);
            }
        }
    }

    #[test]
    fn layout_is_deterministic() {
        let graph = build_graph(&three_generations(), ViewMode::Branches, &Theme::classic());
        let config = LayoutConfig::default();
        let first = compute_layout(&graph, &config);
        let second = compute_layout(&graph, &config);
        for (a, b) in first.nodes.iter().zip(&second.nodes) {
            assert_eq!((a.id.as_str(), a.x, a.y), (b.id.as_str(), b.x, b.y));
        }
    }

    #[test]
    fn isolated_members_still_get_positions() {
        let members = vec![Member::new(1, "Lone", "A"), Member::new(2, "Lone", "B")];
        let mut graph = build_graph(&members, ViewMode::Plain, &Theme::classic());
        assert!(assign_positions(&mut graph, &LayoutConfig::default()));
        let a = graph.node("1").unwrap().position;
        let b = graph.node("2").unwrap().position;
        assert!(a.x.is_finite() && a.y.is_finite());
        assert_ne!(a, b);
    }

    #[test]
    fn positions_are_top_left_corners() {
        let members = vec![Member::new(1, "Root", "A")];
        let graph = build_graph(&members, ViewMode::Plain, &Theme::classic());
        let config = LayoutConfig::default();
        let layout = compute_layout(&graph, &config);
        let node = &layout.nodes[0];
        assert!(node.x >= 0.0 && node.y >= 0.0);
        assert!((layout.width - (node.x + config.node_width + config.margin)).abs() < 0.01);
    }

    #[test]
    fn edges_are_routed_from_final_coordinates() {
        let graph = build_graph(&three_generations(), ViewMode::Plain, &Theme::classic());
        let layout = compute_layout(&graph, &LayoutConfig::default());
        let spouse = layout
            .edges
            .iter()
            .find(|e| e.kind == EdgeKind::Spouse && e.from == "3")
            .unwrap();
        assert_eq!(spouse.points.len(), 2);
        let parent = layout.node("1").unwrap();
        let edge = layout.edges.iter().find(|e| e.id == "edge-1-3").unwrap();
        assert_eq!(edge.points[0], (parent.x + parent.width / 2.0, parent.y + parent.height));
    }

    fn assert_layered(layout: &Layout, label: &str) {
        for edge in layout.edges.iter().filter(|e| e.kind == EdgeKind::Parent) {
            let parent = layout.node(&edge.from).unwrap();
            let child = layout.node(&edge.to).unwrap();
            assert!(child.y > parent.y, "{label}: {} not below {}", edge.to, edge.from);
        }
        for (i, a) in layout.nodes.iter().enumerate() {
            for b in layout.nodes.iter().skip(i + 1) {
                let overlap_x = a.x < b.x + b.width && b.x < a.x + a.width;
                let overlap_y = a.y < b.y + b.height && b.y < a.y + a.height;
                assert!(!(overlap_x && overlap_y), "{label}: {} overlaps {}", a.id, b.id);
            }
        }
    }

    fn layout_within(members: Vec<Member>, limit: Duration) -> Option<Layout> {
        let (tx, rx) = mpsc::channel();
        std::thread::spawn(move || {
            let graph = build_graph(&members, ViewMode::Plain, &Theme::classic());
            let _ = tx.send(compute_layout(&graph, &LayoutConfig::default()));
        });
        rx.recv_timeout(limit).ok()
    }

    #[test]
    fn family_with_unlinked_in_laws_finishes() {
        let members = vec![
            Member::new(1, "Grand", "Pa").with_spouse(2),
            Member::new(2, "Grand", "Ma").with_spouse(1),
            Member::new(3, "Son", "A").with_parents(&[1, 2]).with_spouse(4),
            Member::new(4, "Wife", "B").with_spouse(3),
            Member::new(5, "Son", "C").with_parents(&[1, 2]).with_spouse(6),
            Member::new(6, "Wife", "D").with_spouse(5),
            Member::new(7, "Daughter", "E").with_parents(&[1, 2]),
            Member::new(8, "Kid", "A").with_parents(&[3, 4]),
            Member::new(9, "InLaw", "F"),
            Member::new(10, "Kid", "A").with_parents(&[3, 4]),
            Member::new(11, "InLaw", "G"),
            Member::new(12, "Kid", "A").with_parents(&[3, 4]),
            Member::new(13, "Kid", "C").with_parents(&[5, 6]),
            Member::new(14, "InLaw", "H"),
            Member::new(15, "Kid", "C").with_parents(&[5, 6]),
            Member::new(16, "InLaw", "I"),
            Member::new(17, "Kid", "C").with_parents(&[5, 6]),
            Member::new(18, "InLaw", "J"),
        ];
        let layout = layout_within(members, Duration::from_secs(10))
            .expect("layout of an 18-member family should finish");
        assert_eq!(layout.nodes.len(), 18);
        assert_layered(&layout, "in-law family");
    }

    /// Multi-generation families from a fixed LCG: founders, children of any existing
    /// couple (most of whom marry), plus unrelated in-laws scattered through the list.
    fn generated_family(seed: &mut u64, size: usize) -> Vec<Member> {
        let mut next = || {
            *seed = seed.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
            *seed >> 33
        };
        let mut members = vec![
            Member::new(1, "Founder", "A").with_spouse(2),
            Member::new(2, "Founder", "B").with_spouse(1),
        ];
        let mut couples: Vec<(u64, u64)> = vec![(1, 2)];
        let mut id = 3u64;
        while members.len() < size {
            let roll = next() % 10;
            if roll < 2 {
                members.push(Member::new(id, "InLaw", "X"));
                id += 1;
                continue;
            }
            let (a, b) = couples[(next() as usize) % couples.len()];
            let mut child = Member::new(id, "Child", "Y").with_parents(&[a, b]);
            if roll < 9 && members.len() + 1 < size {
                child = child.with_spouse(id + 1);
                members.push(child);
                members.push(Member::new(id + 1, "Spouse", "Z").with_spouse(id));
                couples.push((id, id + 1));
                id += 2;
            } else {
                members.push(child);
                id += 1;
            }
        }
        members
    }

    #[test]
    fn generated_families_lay_out_in_layers() {
        let mut seed = 0x5eed_u64;
        for round in 0..40 {
            let size = 10 + (round % 41);
            let members = generated_family(&mut seed, size);
            let count = members.len();
            let layout = layout_within(members, Duration::from_secs(20))
                .unwrap_or_else(|| panic!("round {round}: layout of {count} members did not finish"));
            assert_eq!(layout.nodes.len(), count);
            assert_layered(&layout, &format!("round {round}"));
        }
    }

    #[test]
    fn empty_graph_has_no_layout() {
        let mut graph = FamilyGraph::default();
        assert!(!assign_positions(&mut graph, &LayoutConfig::default()));
        let layout = compute_layout(&graph, &LayoutConfig::default());
        assert!(layout.nodes.is_empty());
    }
}
