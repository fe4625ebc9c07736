use crate::config::LayoutConfig;
#[cfg(feature = "png")]
use crate::config::RenderConfig;
use crate::graph::EdgeKind;
use crate::layout::{EdgeLayout, Layout, NodeLayout};
use crate::text_metrics::ellipsize;
use crate::theme::Theme;
use anyhow::Result;
use std::fmt::Write as _;
use std::path::Path;

const NODE_BORDER_WIDTH: f32 = 3.0;
const NODE_INSET: f32 = 10.0;
const AVATAR_RATIO: f32 = 0.45;
const BADGE_RADIUS: f32 = 10.0;
const DECEASED_MARK: &str = "†";

pub fn render_svg(layout: &Layout, theme: &Theme, config: &LayoutConfig) -> String {
    let mut svg = String::new();
    let width = layout.width.max(200.0);
    let height = layout.height.max(200.0);

    let _ = write!(
        svg,
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{width}\" height=\"{height}\" viewBox=\"0 0 {width} {height}\">",
    );
    let _ = write!(
        svg,
        "<rect width=\"100%\" height=\"100%\" fill=\"{}\"/>",
        escape_xml(&theme.background)
    );

    svg.push_str("<defs>");
    for node in layout.nodes.iter().filter(|n| n.data.member.photo.is_some()) {
        let (cx, cy, radius) = avatar_geometry(node);
        let _ = write!(
            svg,
            "<clipPath id=\"avatar-{}\"><circle cx=\"{cx:.2}\" cy=\"{cy:.2}\" r=\"{radius:.2}\"/></clipPath>",
            escape_xml(&node.id)
        );
    }
    svg.push_str("</defs>");

    for edge in &layout.edges {
        svg.push_str(&edge_svg(edge));
    }

    for node in &layout.nodes {
        svg.push_str(&node_svg(node, theme, config));
    }

    svg.push_str("</svg>");
    svg
}

fn edge_svg(edge: &EdgeLayout) -> String {
    let d = points_to_path(&edge.points);
    let kind = match edge.kind {
        EdgeKind::Parent => "parent",
        EdgeKind::Spouse => "spouse",
    };
    let mut out = format!(
        "<path id=\"{}\" class=\"edge {kind}\" d=\"{d}\" fill=\"none\" stroke=\"{}\" stroke-width=\"{}\"",
        escape_xml(&edge.id),
        escape_xml(&edge.style.stroke),
        edge.style.stroke_width
    );
    if let Some(dash) = &edge.style.dasharray {
        let _ = write!(out, " stroke-dasharray=\"{}\"", escape_xml(dash));
    }
    if edge.style.animated {
        out.push_str(" stroke-dasharray=\"5\">");
        out.push_str(
            "<animate attributeName=\"stroke-dashoffset\" from=\"10\" to=\"0\" dur=\"0.5s\" repeatCount=\"indefinite\"/>",
        );
        out.push_str("</path>");
    } else {
        out.push_str("/>");
    }
    out
}

fn node_svg(node: &NodeLayout, theme: &Theme, config: &LayoutConfig) -> String {
    let member = &node.data.member;
    let (gender_border, fill) = theme.gender_colors(member.gender);
    let gender_border = escape_xml(gender_border);
    let border = match &node.data.branch_color {
        Some(color) => escape_xml(color),
        None => gender_border.clone(),
    };
    let (cx, cy) = node.center();
    let radius = (node.width.min(node.height) / 2.0 - NODE_INSET).max(1.0);

    let mut out = String::new();
    let _ = write!(
        out,
        "<g class=\"member\" data-id=\"{}\"><circle cx=\"{cx:.2}\" cy=\"{cy:.2}\" r=\"{radius:.2}\" fill=\"{}\" stroke=\"{border}\" stroke-width=\"{NODE_BORDER_WIDTH}\"/>",
        escape_xml(&node.id),
        if member.photo.is_some() { "none".to_string() } else { escape_xml(fill) },
    );

    let (avatar_x, avatar_y, avatar_r) = avatar_geometry(node);
    match &member.photo {
        Some(photo) => {
            let _ = write!(
                out,
                "<image href=\"{}\" x=\"{:.2}\" y=\"{:.2}\" width=\"{:.2}\" height=\"{:.2}\" preserveAspectRatio=\"xMidYMid slice\" clip-path=\"url(#avatar-{})\"/>",
                escape_xml(photo),
                avatar_x - avatar_r,
                avatar_y - avatar_r,
                avatar_r * 2.0,
                avatar_r * 2.0,
                escape_xml(&node.id)
            );
        }
        None => {
            let _ = write!(
                out,
                "<circle cx=\"{avatar_x:.2}\" cy=\"{avatar_y:.2}\" r=\"{avatar_r:.2}\" fill=\"{gender_border}\"/>"
            );
            let _ = write!(
                out,
                "<text x=\"{avatar_x:.2}\" y=\"{:.2}\" text-anchor=\"middle\" dominant-baseline=\"central\" font-family=\"{}\" font-size=\"{:.1}\" font-weight=\"bold\" fill=\"{}\">{}</text>",
                avatar_y,
                escape_xml(&theme.font_family),
                avatar_r * 0.8,
                escape_xml(&theme.avatar_text_color),
                escape_xml(&member.initials())
            );
        }
    }

    let first = ellipsize(
        &member.first_name,
        config.label_max_width,
        theme.font_size,
        &theme.font_family,
    );
    let last = ellipsize(
        &member.last_name,
        config.label_max_width,
        theme.font_size,
        &theme.font_family,
    );
    let name_y = avatar_y + avatar_r + theme.font_size + 2.0;
    let _ = write!(
        out,
        "<text x=\"{cx:.2}\" y=\"{name_y:.2}\" text-anchor=\"middle\" font-family=\"{}\" font-size=\"{}\" font-weight=\"600\" fill=\"{}\"><tspan x=\"{cx:.2}\" dy=\"0\">{}</tspan><tspan x=\"{cx:.2}\" dy=\"{:.2}\">{}</tspan></text>",
        escape_xml(&theme.font_family),
        theme.font_size,
        escape_xml(&theme.text_color),
        escape_xml(&first),
        theme.font_size * 1.2,
        escape_xml(&last)
    );

    if !member.is_living() {
        let badge_x = node.x + node.width - BADGE_RADIUS;
        let badge_y = node.y + BADGE_RADIUS;
        let _ = write!(
            out,
            "<g class=\"deceased\"><circle cx=\"{badge_x:.2}\" cy=\"{badge_y:.2}\" r=\"{BADGE_RADIUS}\" fill=\"{}\"/><text x=\"{badge_x:.2}\" y=\"{badge_y:.2}\" text-anchor=\"middle\" dominant-baseline=\"central\" font-size=\"12\" font-weight=\"bold\" fill=\"#FFFFFF\">{DECEASED_MARK}</text></g>",
            escape_xml(&theme.deceased_badge)
        );
    }

    out.push_str("</g>");
    out
}

fn avatar_geometry(node: &NodeLayout) -> (f32, f32, f32) {
    let (cx, cy) = node.center();
    let radius = (node.width.min(node.height) / 2.0 - NODE_INSET).max(1.0);
    let avatar_r = radius * AVATAR_RATIO;
    (cx, cy - radius * 0.25, avatar_r)
}

fn points_to_path(points: &[(f32, f32)]) -> String {
    if points.is_empty() {
        return String::new();
    }
    let mut d = String::new();
    let _ = write!(d, "M {:.2} {:.2}", points[0].0, points[0].1);
    for point in points.iter().skip(1) {
        let _ = write!(d, " L {:.2} {:.2}", point.0, point.1);
    }
    d
}

pub fn write_output_svg(svg: &str, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => {
            std::fs::write(path, svg)?;
        }
        None => {
            print!("{}", svg);
        }
    }
    Ok(())
}

#[cfg(feature = "png")]
pub fn write_output_png(svg: &str, output: &Path, render_cfg: &RenderConfig) -> Result<()> {
    let mut opt = usvg::Options::default();
    opt.fontdb_mut().load_system_fonts();
    opt.default_size = usvg::Size::from_wh(render_cfg.width, render_cfg.height)
        .or_else(|| usvg::Size::from_wh(800.0, 600.0))
        .ok_or_else(|| anyhow::anyhow!("Invalid render size"))?;

    let tree = usvg::Tree::from_str(svg, &opt)?;
    let size = tree.size().to_int_size();
    let mut pixmap = resvg::tiny_skia::Pixmap::new(size.width(), size.height())
        .ok_or_else(|| anyhow::anyhow!("Failed to allocate pixmap"))?;

    let mut pixmap_mut = pixmap.as_mut();
    resvg::render(&tree, resvg::tiny_skia::Transform::default(), &mut pixmap_mut);
    pixmap.save_png(output)?;
    Ok(())
}

fn escape_xml(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}
