use crate::model::Gender;
use serde::{Deserialize, Serialize};

/// Colors cycled across family branches in branch view.
pub const BRANCH_PALETTE: [&str; 10] = [
    "#3b82f6", "#10b981", "#f59e0b", "#ef4444", "#8b5cf6", "#ec4899", "#14b8a6", "#f97316",
    "#6366f1", "#84cc16",
];

/// Palette entry for the branch at `index`, wrapping past the end of the palette.
pub fn palette_color(index: usize) -> &'static str {
    BRANCH_PALETTE[index % BRANCH_PALETTE.len()]
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Theme {
    pub font_family: String,
    pub font_size: f32,
    pub background: String,
    pub text_color: String,
    pub edge_color: String,
    pub spouse_color: String,
    pub male_border: String,
    pub male_fill: String,
    pub female_border: String,
    pub female_fill: String,
    pub other_border: String,
    pub other_fill: String,
    pub avatar_text_color: String,
    pub deceased_badge: String,
    pub branch_palette: Vec<String>,
}

impl Theme {
    pub fn classic() -> Self {
        Self {
            font_family: "Inter, Segoe UI, system-ui, -apple-system, sans-serif".to_string(),
            font_size: 12.0,
            background: "#FFFFFF".to_string(),
            text_color: "#374151".to_string(),
            edge_color: "#6b7280".to_string(),
            spouse_color: "#ec4899".to_string(),
            male_border: "#3b82f6".to_string(),
            male_fill: "#dbeafe".to_string(),
            female_border: "#ec4899".to_string(),
            female_fill: "#fce7f3".to_string(),
            other_border: "#6b7280".to_string(),
            other_fill: "#f3f4f6".to_string(),
            avatar_text_color: "#FFFFFF".to_string(),
            deceased_badge: "#ef4444".to_string(),
            branch_palette: BRANCH_PALETTE.iter().map(|c| c.to_string()).collect(),
        }
    }

    pub fn modern() -> Self {
        Self {
            font_family: "\"trebuchet ms\", verdana, arial, sans-serif".to_string(),
            font_size: 13.0,
            background: "#F8FAFF".to_string(),
            text_color: "#1C2430".to_string(),
            edge_color: "#7A8AA6".to_string(),
            spouse_color: "#D9468F".to_string(),
            male_border: "#4C7BD9".to_string(),
            male_fill: "#EEF2F8".to_string(),
            female_border: "#D9468F".to_string(),
            female_fill: "#FBEFF5".to_string(),
            other_border: "#7A8AA6".to_string(),
            other_fill: "#F7FAFF".to_string(),
            avatar_text_color: "#FFFFFF".to_string(),
            deceased_badge: "#D64545".to_string(),
            branch_palette: BRANCH_PALETTE.iter().map(|c| c.to_string()).collect(),
        }
    }

    /// Branch color from this theme's palette; an empty palette falls back to [`BRANCH_PALETTE`].
    pub fn branch_color(&self, index: usize) -> String {
        if self.branch_palette.is_empty() {
            return palette_color(index).to_string();
        }
        self.branch_palette[index % self.branch_palette.len()].clone()
    }

    /// Border and fill for a member node.
    pub fn gender_colors(&self, gender: Gender) -> (&str, &str) {
        match gender {
            Gender::Male => (&self.male_border, &self.male_fill),
            Gender::Female => (&self.female_border, &self.female_fill),
            Gender::Other | Gender::Unspecified => (&self.other_border, &self.other_fill),
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::classic()
    }
}
