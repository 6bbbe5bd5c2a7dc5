//! Chart styling and layout configuration.
//!
//! These types are pure configuration: the renderer consumes them together
//! with a transformed table. Every field carries a serde default so older
//! project files keep loading as the configuration grows.

use serde::{Deserialize, Serialize};

/// The overall chart family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartType {
    /// Connected line per series.
    #[default]
    Line,
    /// Filled area under each series.
    Area,
    /// Grouped vertical bars.
    Bar,
    /// Bars stacked per x position.
    StackedBar,
    /// Bars stacked and normalized to 100%.
    #[serde(rename = "bar_100")]
    Bar100,
    /// Unconnected markers.
    Scatter,
    /// Stepwise line.
    Step,
    /// Distribution histogram.
    Histogram,
    /// Kernel density estimate.
    Kde,
    /// Box-and-whisker per series.
    Box,
    /// Violin plot per series.
    Violin,
}

/// Line rendering style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineStyle {
    #[default]
    Solid,
    Dashed,
    Dotted,
    Dashdot,
}

/// Which y axis a series plots against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum YAxisSlot {
    #[default]
    Primary,
    Secondary,
}

/// Legend placement, using the renderer's location vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum LegendPosition {
    #[default]
    #[serde(rename = "best")]
    Best,
    #[serde(rename = "upper right")]
    UpperRight,
    #[serde(rename = "upper left")]
    UpperLeft,
    #[serde(rename = "lower left")]
    LowerLeft,
    #[serde(rename = "lower right")]
    LowerRight,
    #[serde(rename = "right")]
    Right,
    #[serde(rename = "center")]
    Center,
    #[serde(rename = "none")]
    None,
}

/// Axis scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AxisScale {
    #[default]
    Linear,
    Log,
}

/// Per-series styling, keyed by the column the series reads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesStyle {
    /// Column this series plots.
    pub column: String,
    #[serde(default = "default_true")]
    pub visible: bool,
    #[serde(default = "default_line_width")]
    pub line_width: f64,
    #[serde(default)]
    pub line_style: LineStyle,
    /// Marker glyph; empty means no markers.
    #[serde(default)]
    pub marker: String,
    #[serde(default = "default_marker_size")]
    pub marker_size: f64,
    /// Explicit color; `None` takes the next theme palette color.
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default = "default_alpha")]
    pub alpha: f64,
    #[serde(default)]
    pub y_axis: YAxisSlot,
    /// Legend label; `None` falls back to the column name.
    #[serde(default)]
    pub label: Option<String>,
}

impl SeriesStyle {
    /// A default style for the named column.
    pub fn new(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            visible: true,
            line_width: default_line_width(),
            line_style: LineStyle::default(),
            marker: String::new(),
            marker_size: default_marker_size(),
            color: None,
            alpha: default_alpha(),
            y_axis: YAxisSlot::default(),
            label: None,
        }
    }
}

/// One axis's configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AxisConfig {
    pub label: String,
    pub scale: AxisScale,
    pub show_grid: bool,
    pub invert: bool,
    /// Lower bound; `None` autoscales.
    pub min_value: Option<f64>,
    /// Upper bound; `None` autoscales.
    pub max_value: Option<f64>,
}

impl Default for AxisConfig {
    fn default() -> Self {
        Self {
            label: String::new(),
            scale: AxisScale::Linear,
            show_grid: true,
            invert: false,
            min_value: None,
            max_value: None,
        }
    }
}

/// The shape an [`Annotation`] draws.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnnotationType {
    /// Vertical line at an x position.
    Vline,
    /// Horizontal line at a y position.
    Hline,
    /// Shaded vertical span between two x positions.
    Span,
    /// Free text at a point.
    Text,
    /// Arrow from one point to another.
    Arrow,
    /// Shaded horizontal band between two y positions.
    Band,
}

/// A chart annotation. Parameters are shape-specific and stored loosely, the
/// same way transform step parameters are.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Annotation {
    pub annotation_type: AnnotationType,
    #[serde(default)]
    pub params: serde_json::Map<String, serde_json::Value>,
    #[serde(default = "default_true")]
    pub enabled: bool,
}

/// The complete chart specification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartConfig {
    pub chart_type: ChartType,
    pub title: String,
    pub subtitle: String,
    /// Column providing x values; `None` plots against the row index.
    pub x_column: Option<String>,
    pub series_styles: Vec<SeriesStyle>,
    pub x_axis: AxisConfig,
    pub y_axis_primary: AxisConfig,
    /// Present only when some series uses [`YAxisSlot::Secondary`].
    pub y_axis_secondary: Option<AxisConfig>,
    pub legend_position: LegendPosition,
    pub show_legend: bool,
    pub annotations: Vec<Annotation>,
    pub figure_width: f64,
    pub figure_height: f64,
    pub dpi: u32,
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            chart_type: ChartType::Line,
            title: String::new(),
            subtitle: String::new(),
            x_column: None,
            series_styles: Vec::new(),
            x_axis: AxisConfig::default(),
            y_axis_primary: AxisConfig::default(),
            y_axis_secondary: None,
            legend_position: LegendPosition::Best,
            show_legend: true,
            annotations: Vec::new(),
            figure_width: 10.0,
            figure_height: 6.0,
            dpi: 100,
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_line_width() -> f64 {
    2.0
}

fn default_marker_size() -> f64 {
    6.0
}

fn default_alpha() -> f64 {
    1.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chart_type_wire_names() {
        assert_eq!(
            serde_json::to_string(&ChartType::StackedBar).expect("serializable"),
            "\"stacked_bar\""
        );
        assert_eq!(
            serde_json::to_string(&ChartType::Bar100).expect("serializable"),
            "\"bar_100\""
        );
    }

    #[test]
    fn test_legend_position_uses_spaced_names() {
        assert_eq!(
            serde_json::to_string(&LegendPosition::UpperRight).expect("serializable"),
            "\"upper right\""
        );
        let parsed: LegendPosition =
            serde_json::from_str("\"lower left\"").expect("recognized");
        assert_eq!(parsed, LegendPosition::LowerLeft);
    }

    #[test]
    fn test_series_style_defaults_apply_on_sparse_input() {
        let style: SeriesStyle =
            serde_json::from_str(r#"{"column": "sales"}"#).expect("column is enough");
        assert_eq!(style, SeriesStyle::new("sales"));
    }

    #[test]
    fn test_chart_config_round_trip() {
        let config = ChartConfig {
            chart_type: ChartType::Scatter,
            title: "Revenue".to_owned(),
            x_column: Some("date".to_owned()),
            series_styles: vec![SeriesStyle::new("revenue")],
            y_axis_secondary: Some(AxisConfig {
                label: "margin".to_owned(),
                scale: AxisScale::Log,
                ..AxisConfig::default()
            }),
            ..ChartConfig::default()
        };
        let json = serde_json::to_string(&config).expect("serializable");
        let back: ChartConfig = serde_json::from_str(&json).expect("round trip");
        assert_eq!(back, config);
    }
}
