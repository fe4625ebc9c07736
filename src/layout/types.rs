use crate::graph::{EdgeKind, EdgeStyle, NodeData};
use crate::model::ViewMode;

#[derive(Debug, Clone)]
pub struct NodeLayout {
    pub id: String,
    /// Top-left corner of the node's bounding box.
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub data: NodeData,
}

impl NodeLayout {
    pub fn center(&self) -> (f32, f32) {
        (self.x + self.width / 2.0, self.y + self.height / 2.0)
    }
}

#[derive(Debug, Clone)]
pub struct EdgeLayout {
    pub id: String,
    pub from: String,
    pub to: String,
    pub kind: EdgeKind,
    pub points: Vec<(f32, f32)>,
    pub style: EdgeStyle,
}

#[derive(Debug, Clone)]
pub struct Layout {
    pub view_mode: ViewMode,
    pub nodes: Vec<NodeLayout>,
    pub edges: Vec<EdgeLayout>,
    pub width: f32,
    pub height: f32,
}

impl Layout {
    pub fn node(&self, id: &str) -> Option<&NodeLayout> {
        self.nodes.iter().find(|node| node.id == id)
    }
}
