//! Persisted application state.
//!
//! Everything a project file stores lives here: the imported dataset, the
//! transform step list, the chart specification, and the theme. All of it is
//! plain serde data; behavior stays in `transform` and `project`.

mod chart;
mod source;
mod theme;

pub use chart::{
    Annotation, AnnotationType, AxisConfig, AxisScale, ChartConfig, ChartType, LegendPosition,
    LineStyle, SeriesStyle, YAxisSlot,
};
pub use source::{DataSource, SourceType};
pub use theme::{Theme, ThemeMode};

use crate::transform::TransformStep;
use serde::{Deserialize, Serialize};

/// Everything a `.graphproj` file holds.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectState {
    /// The imported dataset, if any.
    pub data_source: Option<DataSource>,
    /// Ordered transform pipeline.
    pub transforms: Vec<TransformStep>,
    /// Chart specification.
    pub chart_config: ChartConfig,
    /// Visual theme.
    pub theme: Theme,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_project_round_trips() {
        let state = ProjectState::default();
        let json = serde_json::to_string(&state).expect("serializable");
        let back: ProjectState = serde_json::from_str(&json).expect("round trip");
        assert_eq!(back, state);
    }

    #[test]
    fn test_project_with_pipeline_round_trips() {
        let state = ProjectState {
            transforms: vec![
                TransformStep::new("normalize").with_param("method", "z-score"),
                TransformStep::new("smooth").with_param("window", 5).disabled(),
            ],
            ..ProjectState::default()
        };
        let json = serde_json::to_string(&state).expect("serializable");
        let back: ProjectState = serde_json::from_str(&json).expect("round trip");
        assert_eq!(back, state);
        assert!(!back.transforms[1].enabled);
    }
}
