use crate::graph::{EdgeKind, EdgeStyle};
use crate::layout::Layout;
use crate::model::{MemberId, ViewMode};
use serde::Serialize;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

/// Flat, serializable view of a computed layout for debugging and diffing.
#[derive(Debug, Serialize)]
pub struct LayoutDump {
    pub view_mode: ViewMode,
    pub width: f32,
    pub height: f32,
    pub nodes: Vec<NodeDump>,
    pub edges: Vec<EdgeDump>,
}

#[derive(Debug, Serialize)]
pub struct NodeDump {
    pub id: String,
    pub member: MemberId,
    pub name: String,
    pub living: bool,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub branch_color: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct EdgeDump {
    pub id: String,
    pub from: String,
    pub to: String,
    pub kind: EdgeKind,
    pub points: Vec<[f32; 2]>,
    pub style: EdgeStyle,
}

impl LayoutDump {
    pub fn from_layout(layout: &Layout) -> Self {
        let nodes = layout
            .nodes
            .iter()
            .map(|node| NodeDump {
                id: node.id.clone(),
                member: node.data.member.id,
                name: node.data.member.display_name(),
                living: node.data.member.is_living(),
                x: node.x,
                y: node.y,
                width: node.width,
                height: node.height,
                branch_color: node.data.branch_color.clone(),
            })
            .collect();

        let edges = layout
            .edges
            .iter()
            .map(|edge| EdgeDump {
                id: edge.id.clone(),
                from: edge.from.clone(),
                to: edge.to.clone(),
                kind: edge.kind,
                points: edge.points.iter().map(|(x, y)| [*x, *y]).collect(),
                style: edge.style.clone(),
            })
            .collect();

        LayoutDump {
            view_mode: layout.view_mode,
            width: layout.width,
            height: layout.height,
            nodes,
            edges,
        }
    }
}

pub fn write_layout_dump(path: &Path, layout: &Layout) -> anyhow::Result<()> {
    let file = File::create(path)?;
    let writer = BufWriter::new(file);
    let dump = LayoutDump::from_layout(layout);
    serde_json::to_writer_pretty(writer, &dump)?;
    Ok(())
}
