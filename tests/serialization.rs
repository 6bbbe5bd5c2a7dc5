//! Persisted-form round trips for every step kind and the project state.

use graphsmith::model::{
    Annotation, AnnotationType, AxisConfig, ChartConfig, ChartType, DataSource, LegendPosition,
    ProjectState, SeriesStyle, SourceType, Theme, YAxisSlot,
};
use graphsmith::table::{Column, Table};
use graphsmith::transform::TransformStep;

fn catalog_steps() -> Vec<TransformStep> {
    vec![
        TransformStep::new("column_math")
            .with_param("operation", "divide")
            .with_param("columns", vec!["A".to_owned(), "B".to_owned()])
            .with_param("new_column", "ratio"),
        TransformStep::new("normalize")
            .with_param("method", "robust")
            .with_param("columns", vec!["ratio".to_owned()]),
        TransformStep::new("smooth")
            .with_param("method", "rolling_median")
            .with_param("window", 5)
            .with_param("columns", vec!["A".to_owned()]),
        TransformStep::new("resample")
            .with_param("freq", "15min")
            .with_param("agg", "last")
            .with_param("date_column", "ts"),
        TransformStep::new("interpolate")
            .with_param("method", "nearest")
            .with_param("columns", vec!["A".to_owned()]),
        TransformStep::new("filter").with_param("query", "A > 0 and B < 100"),
        TransformStep::new("group")
            .with_param("group_by", vec!["region".to_owned()])
            .with_param("agg_func", "max"),
        TransformStep::new("computed_series")
            .with_param("expression", "A ** 2")
            .with_param("new_column", "squared"),
        TransformStep::new("rolling")
            .with_param("window", 7)
            .with_param("operation", "std")
            .with_param("columns", vec!["A".to_owned()]),
        TransformStep::new("diff").with_param("periods", 2),
        TransformStep::new("pct_change")
            .with_param("periods", 1)
            .disabled(),
    ]
}

#[test]
fn every_step_kind_round_trips() {
    for step in catalog_steps() {
        let json = serde_json::to_string(&step).expect("serializable");
        let back: TransformStep = serde_json::from_str(&json).expect("round trip");
        assert_eq!(back, step, "step kind '{}'", step.transform_type);
    }
}

#[test]
fn step_wire_shape_is_pinned() {
    let step = TransformStep::new("diff").with_param("periods", 2);
    let json = serde_json::to_value(&step).expect("serializable");
    assert_eq!(
        json,
        serde_json::json!({
            "transform_type": "diff",
            "params": {"periods": 2},
            "enabled": true,
        })
    );
}

#[test]
fn unknown_params_survive_a_round_trip() {
    let json = r#"{
        "transform_type": "normalize",
        "params": {"method": "min-max", "future_option": [1, 2, 3]},
        "enabled": false
    }"#;
    let step: TransformStep = serde_json::from_str(json).expect("lenient parse");
    let back = serde_json::to_value(&step).expect("serializable");
    assert_eq!(back["params"]["future_option"], serde_json::json!([1, 2, 3]));
    assert!(!step.enabled);
}

#[test]
fn enabled_defaults_to_true_when_absent() {
    let step: TransformStep =
        serde_json::from_str(r#"{"transform_type": "diff", "params": {}}"#).expect("parses");
    assert!(step.enabled);
}

#[test]
fn full_project_state_round_trips() {
    let table = Table::from_columns(vec![
        Column::timestamp("date", vec![Some(1_700_000_000_000), Some(1_700_086_400_000)]),
        Column::number("value", vec![Some(3.25), None]),
        Column::text("note", vec![None, Some("peak".to_owned())]),
    ])
    .expect("uniform columns");

    let project = ProjectState {
        data_source: Some(DataSource::new("metrics", table, SourceType::Json)),
        transforms: catalog_steps(),
        chart_config: ChartConfig {
            chart_type: ChartType::Area,
            title: "Quarterly".to_owned(),
            x_column: Some("date".to_owned()),
            series_styles: vec![
                SeriesStyle::new("value"),
                SeriesStyle {
                    y_axis: YAxisSlot::Secondary,
                    color: Some("#d62728".to_owned()),
                    ..SeriesStyle::new("squared")
                },
            ],
            y_axis_secondary: Some(AxisConfig::default()),
            legend_position: LegendPosition::UpperLeft,
            annotations: vec![Annotation {
                annotation_type: AnnotationType::Vline,
                params: serde_json::Map::new(),
                enabled: true,
            }],
            ..ChartConfig::default()
        },
        theme: Theme {
            name: "midnight".to_owned(),
            ..Theme::default()
        },
    };

    let json = serde_json::to_string_pretty(&project).expect("serializable");
    let back: ProjectState = serde_json::from_str(&json).expect("round trip");
    assert_eq!(back, project);
}

#[test]
fn project_state_tolerates_missing_sections() {
    let back: ProjectState = serde_json::from_str("{}").expect("all sections default");
    assert!(back.data_source.is_none());
    assert!(back.transforms.is_empty());
    assert_eq!(back.chart_config, ChartConfig::default());
    assert_eq!(back.theme, Theme::default());
}
