//! Project a member list onto renderable nodes and edges.

use crate::branches::{branch_colors, partition_branches};
use crate::model::{Member, MemberId, ViewMode};
use crate::theme::Theme;
use serde::Serialize;
use std::collections::{HashMap, HashSet};

const PLACEHOLDER_COLUMNS: usize = 5;
const PLACEHOLDER_STEP: f32 = 200.0;
const PLACEHOLDER_OFFSET: f32 = 100.0;
const EDGE_STROKE_WIDTH: f32 = 2.0;
const SPOUSE_DASHARRAY: &str = "5,5";

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Position {
    pub x: f32,
    pub y: f32,
}

#[derive(Debug, Clone, Serialize)]
pub struct NodeData {
    pub member: Member,
    pub branch_color: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct FamilyNode {
    pub id: String,
    pub position: Position,
    pub data: NodeData,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EdgeKind {
    Parent,
    Spouse,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EdgeCurve {
    SmoothStep,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EdgeStyle {
    pub stroke: String,
    pub stroke_width: f32,
    pub dasharray: Option<String>,
    pub animated: bool,
    pub curve: EdgeCurve,
}

#[derive(Debug, Clone, Serialize)]
pub struct FamilyEdge {
    pub id: String,
    pub source: String,
    pub target: String,
    pub kind: EdgeKind,
    pub style: EdgeStyle,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct FamilyGraph {
    pub nodes: Vec<FamilyNode>,
    pub edges: Vec<FamilyEdge>,
}

impl FamilyGraph {
    pub fn node(&self, id: &str) -> Option<&FamilyNode> {
        self.nodes.iter().find(|node| node.id == id)
    }

    pub fn parent_edges(&self) -> impl Iterator<Item = &FamilyEdge> {
        self.edges.iter().filter(|e| e.kind == EdgeKind::Parent)
    }

    pub fn spouse_edges(&self) -> impl Iterator<Item = &FamilyEdge> {
        self.edges.iter().filter(|e| e.kind == EdgeKind::Spouse)
    }
}

/// Build nodes and edges in input order.
///
/// References to members outside `members` produce no edge. In [`ViewMode::Branches`]
/// every node carries its branch color and parent edges are animated.
pub fn build_graph(members: &[Member], mode: ViewMode, theme: &Theme) -> FamilyGraph {
    let present: HashSet<MemberId> = members.iter().map(|m| m.id).collect();
    let colors: HashMap<MemberId, String> = match mode {
        ViewMode::Branches => branch_colors(&partition_branches(members), theme),
        ViewMode::Plain => HashMap::new(),
    };
    let animated = mode == ViewMode::Branches;

    let mut graph = FamilyGraph::default();
    let mut seen_nodes: HashSet<MemberId> = HashSet::new();
    let mut seen_edges: HashSet<(MemberId, MemberId, EdgeKind)> = HashSet::new();

    for member in members {
        if seen_nodes.insert(member.id) {
            let slot = graph.nodes.len();
            graph.nodes.push(FamilyNode {
                id: member.id.to_string(),
                position: placeholder_position(slot),
                data: NodeData {
                    member: member.clone(),
                    branch_color: colors.get(&member.id).cloned(),
                },
            });
        }

        for parent in &member.parent_ids {
            if !present.contains(parent) || *parent == member.id {
                continue;
            }
            if !seen_edges.insert((*parent, member.id, EdgeKind::Parent)) {
                continue;
            }
            let stroke = colors
                .get(parent)
                .cloned()
                .unwrap_or_else(|| theme.edge_color.clone());
            graph.edges.push(FamilyEdge {
                id: format!("edge-{}-{}", parent, member.id),
                source: parent.to_string(),
                target: member.id.to_string(),
                kind: EdgeKind::Parent,
                style: EdgeStyle {
                    stroke,
                    stroke_width: EDGE_STROKE_WIDTH,
                    dasharray: None,
                    animated,
                    curve: EdgeCurve::SmoothStep,
                },
            });
        }

        let Some(spouse) = member.spouse else {
            continue;
        };
        // One edge per couple, emitted from the lower id.
        if !present.contains(&spouse) || member.id >= spouse {
            continue;
        }
        if !seen_edges.insert((member.id, spouse, EdgeKind::Spouse)) {
            continue;
        }
        let stroke = colors
            .get(&member.id)
            .cloned()
            .unwrap_or_else(|| theme.spouse_color.clone());
        graph.edges.push(FamilyEdge {
            id: format!("spouse-{}-{}", member.id, spouse),
            source: member.id.to_string(),
            target: spouse.to_string(),
            kind: EdgeKind::Spouse,
            style: EdgeStyle {
                stroke,
                stroke_width: EDGE_STROKE_WIDTH,
                dasharray: Some(SPOUSE_DASHARRAY.to_string()),
                animated: false,
                curve: EdgeCurve::SmoothStep,
            },
        });
    }

    graph
}

fn placeholder_position(slot: usize) -> Position {
    Position {
        x: (slot % PLACEHOLDER_COLUMNS) as f32 * PLACEHOLDER_STEP + PLACEHOLDER_OFFSET,
        y: (slot / PLACEHOLDER_COLUMNS) as f32 * PLACEHOLDER_STEP + PLACEHOLDER_OFFSET,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn edge_pairs(graph: &FamilyGraph, kind: EdgeKind) -> Vec<(String, String)> {
        graph
            .edges
            .iter()
            .filter(|e| e.kind == kind)
            .map(|e| (e.source.clone(), e.target.clone()))
            .collect()
    }

    #[test]
    fn dangling_spouse_yields_parent_edges_only() {
        let members = vec![
            Member::new(1, "Root", "A"),
            Member::new(2, "Child", "A").with_parents(&[1]).with_spouse(4),
            Member::new(3, "Child", "B").with_parents(&[1]),
        ];
        let graph = build_graph(&members, ViewMode::Plain, &Theme::classic());
        assert_eq!(graph.nodes.len(), 3);
        assert_eq!(
            edge_pairs(&graph, EdgeKind::Parent),
            vec![
                ("1".to_string(), "2".to_string()),
                ("1".to_string(), "3".to_string())
            ]
        );
        assert_eq!(graph.spouse_edges().count(), 0);
    }

    #[test]
    fn dangling_parent_is_skipped() {
        let members = vec![Member::new(5, "Only", "Child").with_parents(&[77, 78])];
        let graph = build_graph(&members, ViewMode::Plain, &Theme::classic());
        assert_eq!(graph.nodes.len(), 1);
        assert!(graph.edges.is_empty());
    }

    #[test]
    fn spouse_pair_emits_one_edge_from_lower_id() {
        let members = vec![
            Member::new(9, "B", "Y").with_spouse(3),
            Member::new(3, "A", "X").with_spouse(9),
        ];
        let graph = build_graph(&members, ViewMode::Plain, &Theme::classic());
        let spouses: Vec<&FamilyEdge> = graph.spouse_edges().collect();
        assert_eq!(spouses.len(), 1);
        assert_eq!(spouses[0].id, "spouse-3-9");
        assert_eq!(spouses[0].style.dasharray.as_deref(), Some("5,5"));
        assert_eq!(spouses[0].style.stroke, "#ec4899");
    }

    #[test]
    fn one_sided_spouse_from_higher_id_is_not_emitted() {
        let members = vec![
            Member::new(3, "A", "X"),
            Member::new(9, "B", "Y").with_spouse(3),
        ];
        let graph = build_graph(&members, ViewMode::Plain, &Theme::classic());
        assert_eq!(graph.spouse_edges().count(), 0);
    }

    #[test]
    fn every_edge_endpoint_is_a_node() {
        let members = vec![
            Member::new(1, "A", "X").with_spouse(2),
            Member::new(2, "B", "Y").with_spouse(1).with_parents(&[40]),
            Member::new(3, "C", "X").with_parents(&[1, 2, 41]).with_spouse(42),
            Member::new(4, "D", "X").with_parents(&[3, 3]),
        ];
        let graph = build_graph(&members, ViewMode::Branches, &Theme::classic());
        let ids: HashSet<&str> = graph.nodes.iter().map(|n| n.id.as_str()).collect();
        for edge in &graph.edges {
            assert!(ids.contains(edge.source.as_str()), "{}", edge.id);
            assert!(ids.contains(edge.target.as_str()), "{}", edge.id);
        }
        assert_eq!(graph.parent_edges().count(), 3);
    }

    #[test]
    fn branch_view_colors_nodes_and_animates_parent_edges() {
        let theme = Theme::classic();
        let members = vec![
            Member::new(1, "A", "X"),
            Member::new(2, "B", "X").with_parents(&[1]),
            Member::new(3, "C", "Y"),
        ];
        let graph = build_graph(&members, ViewMode::Branches, &theme);
        let first = theme.branch_color(0);
        let second = theme.branch_color(1);
        assert_eq!(graph.node("2").unwrap().data.branch_color.as_ref(), Some(&first));
        assert_eq!(graph.node("3").unwrap().data.branch_color.as_ref(), Some(&second));
        let edge = graph.parent_edges().next().unwrap();
        assert_eq!(edge.style.stroke, first);
        assert!(edge.style.animated);

        let plain = build_graph(&members, ViewMode::Plain, &theme);
        assert!(plain.nodes.iter().all(|n| n.data.branch_color.is_none()));
        let edge = plain.parent_edges().next().unwrap();
        assert_eq!(edge.style.stroke, theme.edge_color);
        assert!(!edge.style.animated);
    }

    #[test]
    fn duplicate_records_share_one_node() {
        let members = vec![
            Member::new(1, "A", "X"),
            Member::new(2, "B", "X").with_parents(&[1]),
            Member::new(2, "B", "X").with_parents(&[1]),
        ];
        let graph = build_graph(&members, ViewMode::Plain, &Theme::classic());
        assert_eq!(graph.nodes.len(), 2);
        assert_eq!(graph.edges.len(), 1);
    }

    #[test]
    fn placeholder_positions_follow_a_grid() {
        let members: Vec<Member> = (1..=6).map(|id| Member::new(id, "M", "X")).collect();
        let graph = build_graph(&members, ViewMode::Plain, &Theme::classic());
        assert_eq!(graph.nodes[0].position, Position { x: 100.0, y: 100.0 });
        assert_eq!(graph.nodes[4].position, Position { x: 900.0, y: 100.0 });
        assert_eq!(graph.nodes[5].position, Position { x: 100.0, y: 300.0 });
    }
}
