//! Writing of [`LpModel`]s in the MPS exchange format.
//!
//! The layout is the tab separated variant read by `glpsol`: names are not padded to the fixed
//! MPS columns, and the widths of the separators match the files the regional model has always
//! been solved from, so that regenerated statements diff cleanly against older ones.
use std::io::{self, Write};

use crate::problem::{LpModel, RowKind};

pub const NAME: &str = "NAME";
pub const ROWS: &str = "ROWS";
pub const COLUMNS: &str = "COLUMNS";
pub const RHS: &str = "RHS";
pub const BOUNDS: &str = "BOUNDS";
pub const ENDATA: &str = "ENDATA";

/// Write `model` to `out`.
///
/// Sections without entries are left out. Rows, columns, RHS and bound entries are written in the
/// order they were added to the model, so the output is byte-identical across runs.
pub fn write<W: Write>(model: &LpModel, out: &mut W) -> io::Result<()> {
    writeln!(out, "{:<14}{}", NAME, model.name)?;

    writeln!(out, "{}", ROWS)?;
    for row in &model.rows {
        match row.kind {
            RowKind::Free => writeln!(out, " {}\t{}", row.kind.code(), row.name)?,
            _ => writeln!(out, " {}  {}", row.kind.code(), row.name)?,
        }
    }

    writeln!(out, "{}", COLUMNS)?;
    for column in &model.columns {
        for entry in &column.entries {
            writeln!(
                out,
                "\t{}\t\t{}\t\t\t{}",
                column.name,
                entry.row,
                format_number(entry.coefficient)
            )?;
        }
    }

    if !model.rhs.is_empty() {
        writeln!(out, "{}", RHS)?;
        for rhs in &model.rhs {
            writeln!(out, "\t{}\t\t{}\t\t{}", rhs.set, rhs.row, format_number(rhs.value))?;
        }
    }

    if !model.bounds.is_empty() {
        writeln!(out, "{}", BOUNDS)?;
        for bound in &model.bounds {
            writeln!(
                out,
                " {} {}\t\t\t{}\t\t{}",
                bound.kind.code(),
                bound.set,
                bound.column,
                format_number(bound.value)
            )?;
        }
    }

    writeln!(out, "{}", ENDATA)?;
    Ok(())
}

/// Render `model` into a string.
pub fn to_string(model: &LpModel) -> String {
    let mut buffer = Vec::new();
    // Writing into a Vec cannot fail.
    let _ = write(model, &mut buffer);
    String::from_utf8_lossy(&buffer).into_owned()
}

/// Integral values are written without a fractional part, `-0` is written as `0`.
pub fn format_number(value: f64) -> String {
    if value == 0.0 {
        return "0".to_string();
    }
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{}", value)
    }
}
