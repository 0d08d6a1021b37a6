pub mod mps;
mod problem;
mod solution;

pub use problem::{Bound, BoundKind, Column, Entry, LpModel, ModelError, RhsEntry, Row, RowKind, Sense};
pub use solution::{read_columns, ColumnActivity, ReportReader, SolutionError, COLUMN_MARKER};
