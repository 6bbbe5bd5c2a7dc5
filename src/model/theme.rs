//! Visual theme configuration.

use serde::{Deserialize, Serialize};

/// Light or dark rendering mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemeMode {
    #[default]
    Light,
    Dark,
}

/// Colors and typography applied to every chart in a project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Theme {
    pub name: String,
    pub mode: ThemeMode,
    pub font_family: String,
    pub font_size: f64,
    pub title_font_size: f64,
    /// Series colors, cycled in order for series without an explicit color.
    pub color_palette: Vec<String>,
    pub background_color: String,
    pub grid_color: String,
    pub text_color: String,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            name: "default".to_owned(),
            mode: ThemeMode::Light,
            font_family: "sans-serif".to_owned(),
            font_size: 11.0,
            title_font_size: 14.0,
            color_palette: [
                "#1f77b4", "#ff7f0e", "#2ca02c", "#d62728", "#9467bd", "#8c564b", "#e377c2",
                "#7f7f7f", "#bcbd22", "#17becf",
            ]
            .map(str::to_owned)
            .to_vec(),
            background_color: "#ffffff".to_owned(),
            grid_color: "#e0e0e0".to_owned(),
            text_color: "#000000".to_owned(),
        }
    }
}

impl Theme {
    /// The palette color for the `idx`-th series, cycling when the palette
    /// runs out. Falls back to black on an empty palette.
    pub fn series_color(&self, idx: usize) -> &str {
        if self.color_palette.is_empty() {
            "#000000"
        } else {
            &self.color_palette[idx % self.color_palette.len()]
        }
    }
}
