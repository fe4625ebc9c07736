#[cfg(feature = "api")]
pub mod api;
pub mod branches;
#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod graph;
pub mod layout;
pub mod layout_dump;
pub mod model;
pub mod parser;
pub mod render;
pub mod text_metrics;
pub mod theme;

#[cfg(feature = "cli")]
pub use cli::run;
pub use config::{Config, load_config};
pub use graph::{FamilyGraph, build_graph};
pub use layout::{Layout, compute_layout};
pub use model::{Member, MemberId, ViewMode};
pub use parser::parse_members;
pub use render::render_svg;

/// Build, lay out and draw `members` with the view mode from `config.layout`.
pub fn render_members_svg(members: &[Member], config: &Config) -> String {
    let graph = build_graph(members, config.layout.view_mode, &config.theme);
    let layout = compute_layout(&graph, &config.layout);
    render_svg(&layout, &config.theme, &config.layout)
}
