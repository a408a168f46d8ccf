#![forbid(unsafe_code)]

//! Widgets for clustertop: sample series, text graphs, table columns and
//! unit formatting.

pub mod column;
pub mod graph;
pub mod series;
pub mod units;

pub use column::{ColumnFormat, Justify};
pub use graph::{Graph, YLabelFormat};
pub use series::{AggregateKind, SampleSeries};
pub use units::{bytes_to_human, percent};
