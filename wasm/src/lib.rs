use family_tree_renderer::config::Config;
use family_tree_renderer::theme::Theme;
use family_tree_renderer::{ViewMode, parse_members, render_members_svg};
use serde::Deserialize;
use wasm_bindgen::prelude::*;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FamilyRenderOptions {
    theme: Option<String>,
    font_family: Option<String>,
    font_size: Option<f32>,
    branches: Option<bool>,
}

fn build_config(options: FamilyRenderOptions) -> Config {
    let mut config = Config::default();
    if options.theme.as_deref() == Some("modern") {
        config.theme = Theme::modern();
    }
    if let Some(font_family) = options.font_family {
        config.theme.font_family = font_family;
    }
    if let Some(font_size) = options.font_size {
        config.theme.font_size = font_size;
    }
    if options.branches.unwrap_or(false) {
        config.layout.view_mode = ViewMode::Branches;
    }
    config
}

#[wasm_bindgen]
pub fn render_family_tree_svg(
    members_json: &str,
    options_json: Option<String>,
) -> Result<String, JsValue> {
    let options = if let Some(raw_options) = options_json {
        serde_json::from_str::<FamilyRenderOptions>(&raw_options)
            .map_err(|error| JsValue::from_str(&error.to_string()))?
    } else {
        FamilyRenderOptions::default()
    };

    let members =
        parse_members(members_json).map_err(|error| JsValue::from_str(&error.to_string()))?;
    Ok(render_members_svg(&members, &build_config(options)))
}

#[cfg(test)]
mod tests {
    use family_tree_renderer::{parse_members, render_members_svg};

    use crate::{FamilyRenderOptions, build_config};

    #[test]
    fn renders_branch_view_from_json() {
        let members = parse_members(
            r#"[
                {"id": 1, "first_name": "Ada", "last_name": "King", "spouse": 2},
                {"id": 2, "first_name": "William", "last_name": "King"},
                {"id": 3, "first_name": "Byron", "last_name": "King", "parent_ids": [1, 2]}
            ]"#,
        )
        .expect("member list should parse");

        let options = FamilyRenderOptions {
            branches: Some(true),
            ..Default::default()
        };
        let svg = render_members_svg(&members, &build_config(options));

        assert!(svg.contains("<svg"));
        assert!(svg.contains("Byron"));
        assert!(svg.contains("<animate"));
    }
}
