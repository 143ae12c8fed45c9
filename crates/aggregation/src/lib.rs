//! Aggregation pipeline engine.
//!
//! Every "list X with joined Y" query in the system is one reusable shape:
//! filter a source collection on an indexed field, coerce the foreign key,
//! left-join a second collection, flatten the join (dropping rows whose
//! target is absent), optionally filter on joined fields, project a fixed
//! output shape, and sort descending by creation time. [`Pipeline`] is a
//! small interpreter over that fixed stage vocabulary; services declare
//! pipelines instead of writing ad hoc query code.

pub mod error;
pub mod pipeline;
pub mod stage;

pub use error::{AggregationError, Result};
pub use pipeline::{DocumentStream, Pipeline};
pub use stage::{ProjectField, Stage};
