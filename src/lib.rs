//! # Graphsmith - Chart-Building Data Engine
//!
//! Graphsmith is the data layer of an interactive chart builder: it imports
//! tabular data, runs a configurable transform pipeline over it, and
//! persists the whole project (dataset, pipeline, chart styling, theme) as a
//! `.graphproj` file. Rendering is left to a charting frontend that consumes
//! the transformed [`table::Table`] together with a [`model::ChartConfig`].
//!
//! ## Quick Start
//!
//! ```
//! use graphsmith::transform::{TransformStep, apply_pipeline};
//!
//! # fn example() -> anyhow::Result<()> {
//! let source = graphsmith::loader::from_csv("x,y\n1,10\n2,20\n3,30\n", "Data")?;
//!
//! let steps = vec![
//!     TransformStep::new("computed_series")
//!         .with_param("expression", "y / x")
//!         .with_param("new_column", "ratio"),
//!     TransformStep::new("filter").with_param("query", "x > 1"),
//! ];
//!
//! let run = apply_pipeline(&source.table, &steps)?;
//! assert_eq!(run.table.n_rows(), 2);
//! for warning in &run.warnings {
//!     println!("{warning}");
//! }
//! # Ok(())
//! # }
//! # example().unwrap();
//! ```
//!
//! ## Core Modules
//!
//! - [`table`]: The columnar in-memory table every stage consumes and produces
//! - [`transform`]: The step catalog and pipeline engine
//! - [`expr`]: The sandboxed expression language used by `filter` and
//!   `computed_series` steps
//! - [`loader`]: CSV/TSV/JSON/clipboard import with column type inference
//! - [`model`]: Persisted chart, theme, and project configuration
//! - [`project`]: `.graphproj` save/load and table export
//! - [`error`]: Error types and handling utilities
//!
//! ## Key Concepts
//!
//! ### Tables are values
//!
//! No pipeline stage mutates its input: each step takes a table by reference
//! and produces a new one, so the original import can always be re-derived.
//!
//! ### Warnings over failures
//!
//! Inside a recognized step, every recoverable problem (a missing column, a
//! bad filter query, a degenerate normalization) degrades to a warning on the
//! [`transform::PipelineRun`] so one bad step never destroys the rest of an
//! interactively edited pipeline. Only an unrecognized step kind is fatal.

pub mod error;
pub mod expr;
pub mod loader;
pub mod logging;
pub mod model;
pub mod project;
pub mod table;
pub mod transform;

pub use error::{GraphsmithError, Result};
