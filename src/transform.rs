//! The data transform pipeline.
//!
//! A pipeline is an ordered list of [`TransformStep`] records. Each enabled
//! step names one operation from a closed catalog ([`Op`]) and carries its
//! parameters as a loose JSON map, so foreign or future parameters survive a
//! save/load round trip. [`apply_pipeline`] resolves and runs the steps
//! against a [`crate::table::Table`], collecting recoverable issues as
//! warnings; only an unrecognized step kind is fatal.

mod engine;
mod group;
mod op;
mod series;
mod step;
mod window;

pub use engine::{PipelineRun, apply_pipeline};
pub use op::{
    GroupAgg, InterpolateMethod, MathOp, NormalizeMethod, Op, ResampleAgg, RollingStat,
    SmoothMethod, TransformError,
};
pub use step::TransformStep;
