//! The persisted transform step record.
//!
//! A step is stored exactly as `{"transform_type": ..., "params": {...},
//! "enabled": ...}` so project files round-trip losslessly, including
//! parameter keys this version does not understand. Parameters are validated
//! lazily: the typed operation layer ([`super::op`]) reads them with
//! per-operation defaults when the pipeline runs, never at construction time.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One named, parameterized operation in the transform pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransformStep {
    /// Operation name, e.g. `"normalize"`. See [`super::op::Op`] for the
    /// recognized catalog.
    pub transform_type: String,

    /// Operation-specific parameters, kept as loose JSON.
    #[serde(default)]
    pub params: Map<String, Value>,

    /// Disabled steps are kept in the list but skipped by the pipeline.
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

impl TransformStep {
    /// Creates an enabled step with no parameters.
    pub fn new(transform_type: impl Into<String>) -> Self {
        Self {
            transform_type: transform_type.into(),
            params: Map::new(),
            enabled: true,
        }
    }

    /// Adds or replaces one parameter (builder style).
    #[must_use]
    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    /// Marks the step disabled (builder style).
    #[must_use]
    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    /// String parameter, if present and a string.
    pub(crate) fn param_str(&self, key: &str) -> Option<&str> {
        self.params.get(key).and_then(Value::as_str)
    }

    /// Non-negative integer parameter; accepts whole floats like `3.0`.
    pub(crate) fn param_usize(&self, key: &str) -> Option<usize> {
        let value = self.params.get(key)?;
        if let Some(n) = value.as_u64() {
            return usize::try_from(n).ok();
        }
        let f = value.as_f64()?;
        (f >= 0.0 && f.fract() == 0.0).then_some(f as usize)
    }

    /// List-of-strings parameter; non-string entries are ignored.
    pub(crate) fn param_str_list(&self, key: &str) -> Vec<String> {
        self.params
            .get(key)
            .and_then(Value::as_array)
            .map(|items| {
                items
                    .iter()
                    .filter_map(|v| v.as_str().map(str::to_owned))
                    .collect()
            })
            .unwrap_or_default()
    }
}

fn default_enabled() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_step_serialization_shape() {
        let step = TransformStep::new("diff")
            .with_param("periods", 1)
            .with_param("columns", vec!["A".to_owned()]);

        let json = serde_json::to_value(&step).expect("serializes");
        assert_eq!(json["transform_type"], "diff");
        assert_eq!(json["params"]["periods"], 1);
        assert_eq!(json["enabled"], true);
    }

    #[test]
    fn test_step_round_trip_preserves_unknown_params() {
        let text = r#"{
            "transform_type": "normalize",
            "params": {"method": "min-max", "columns": ["A"], "future_knob": 7},
            "enabled": false
        }"#;
        let step: TransformStep = serde_json::from_str(text).expect("parses");
        assert!(!step.enabled);
        assert_eq!(step.param_str("method"), Some("min-max"));
        assert_eq!(step.params.get("future_knob"), Some(&7.into()));

        let back = serde_json::to_string(&step).expect("serializes");
        let again: TransformStep = serde_json::from_str(&back).expect("parses again");
        assert_eq!(step, again);
    }

    #[test]
    fn test_enabled_defaults_to_true() {
        let step: TransformStep =
            serde_json::from_str(r#"{"transform_type": "filter"}"#).expect("parses");
        assert!(step.enabled);
        assert!(step.params.is_empty());
    }

    #[test]
    fn test_param_accessors_tolerate_wrong_types() {
        let step = TransformStep::new("smooth")
            .with_param("window", "three")
            .with_param("columns", 42);
        assert_eq!(step.param_usize("window"), None);
        assert!(step.param_str_list("columns").is_empty());
        assert_eq!(step.param_usize("missing"), None);
    }

    #[test]
    fn test_param_usize_accepts_whole_floats() {
        let step = TransformStep::new("rolling").with_param("window", 4.0);
        assert_eq!(step.param_usize("window"), Some(4));

        let step = TransformStep::new("rolling").with_param("window", 4.5);
        assert_eq!(step.param_usize("window"), None);
    }
}
