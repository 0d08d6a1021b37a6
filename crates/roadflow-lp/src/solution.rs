use thiserror::Error;
use tracing::debug;

/// Token that opens the column activity table of a solver report
pub const COLUMN_MARKER: &str = "Column";

/// Lines between the one holding the marker and the first data row (header tail and rule)
const HEADER_LINES: usize = 2;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SolutionError {
    #[error("Solver report has no column activity table (marker \"Column\" not found)")]
    MissingColumnTable,
    #[error("Malformed column activity row at line {line}: {reason}")]
    MalformedRow { line: usize, reason: String },
    #[error("Invalid {field} at line {line}: {value}")]
    InvalidNumber {
        line: usize,
        field: &'static str,
        value: String,
    },
}

/// One row of the column activity table
///
/// Rows look like `No. Column-name St Activity Lower-bound Upper-bound Marginal`, where the
/// marginal is left blank for basic variables.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnActivity {
    /// 1-based position in the table
    pub index: usize,
    pub name: String,
    /// Basis status as printed by the solver (B, NL, NU, NF, NS)
    pub status: String,
    pub activity: f64,
    pub lower: f64,
    pub upper: f64,
    /// Whatever follows the upper bound, e.g. a number or `< eps`
    pub marginal: Option<String>,
}

/// Reader for the column activity table of a textual solver report
#[derive(Debug, Clone, Default)]
pub struct ReportReader {
    /// Stop after this many rows even if the table continues
    row_limit: Option<usize>,
}

impl ReportReader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_row_limit(mut self, limit: usize) -> Self {
        self.row_limit = Some(limit);
        self
    }

    /// Extract the column activity table from `report`.
    ///
    /// Everything up to the first whitespace-separated `Column` token is skipped (this covers the
    /// row activity table). The table ends at the first line whose leading token is not the next
    /// expected row number, or at the end of the input.
    pub fn read(&self, report: &str) -> Result<Vec<ColumnActivity>, SolutionError> {
        let lines: Vec<&str> = report.lines().collect();
        let header = lines
            .iter()
            .position(|l| l.split_whitespace().any(|t| t == COLUMN_MARKER))
            .ok_or(SolutionError::MissingColumnTable)?;

        let mut rows = Vec::new();
        for (offset, line) in lines.iter().enumerate().skip(header + HEADER_LINES) {
            if self.row_limit.is_some_and(|limit| rows.len() >= limit) {
                break;
            }
            let expected = rows.len() + 1;
            let mut tokens = line.split_whitespace();
            match tokens.next() {
                Some(t) if t == expected.to_string() => {}
                _ => break,
            }
            rows.push(parse_row(expected, tokens, offset + 1)?);
        }

        debug!(rows = rows.len(), "read column activity table");
        Ok(rows)
    }
}

/// Read the column activity table with the default reader.
pub fn read_columns(report: &str) -> Result<Vec<ColumnActivity>, SolutionError> {
    ReportReader::new().read(report)
}

fn parse_row<'a>(
    index: usize,
    mut tokens: impl Iterator<Item = &'a str>,
    line: usize,
) -> Result<ColumnActivity, SolutionError> {
    let mut field = |what: &'static str| {
        tokens.next().ok_or_else(|| SolutionError::MalformedRow {
            line,
            reason: format!("missing {}", what),
        })
    };

    let name = field("column name")?.to_string();
    let status = field("status")?.to_string();
    let activity = parse_number(field("activity")?, "activity", line)?;
    let lower = parse_number(field("lower bound")?, "lower bound", line)?;
    let upper = parse_number(field("upper bound")?, "upper bound", line)?;

    let rest: Vec<&str> = tokens.collect();
    let marginal = if rest.is_empty() { None } else { Some(rest.join(" ")) };

    Ok(ColumnActivity {
        index,
        name,
        status,
        activity,
        lower,
        upper,
        marginal,
    })
}

fn parse_number(text: &str, field: &'static str, line: usize) -> Result<f64, SolutionError> {
    text.parse::<f64>().map_err(|_| SolutionError::InvalidNumber {
        line,
        field,
        value: text.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const REPORT: &str = "\
Problem:    PK_ROADS
Rows:       3
Columns:    2
Non-zeros:  5
Status:     OPTIMAL
Objective:  MAXFLOW = 233 (MAXimum)

   No.   Row name   St   Activity     Lower bound   Upper bound    Marginal
------ ------------ -- ------------- ------------- ------------- -------------
     1 MAXFLOW      B            233
     2 IO_YYYY      NS             0            -0             =             1
     3 SRC_DST      NS             0            -0             =         < eps

   No. Column name  St   Activity     Lower bound   Upper bound    Marginal
------ ------------ -- ------------- ------------- ------------- -------------
     1 XXXX_YYYY    B            233             0           466
     2 YYYY_ZZZZ    NU           233             0           233             1

Karush-Kuhn-Tucker optimality conditions:

KKT.PE: max.abs.err = 0.00e+00 on row 0
";

    #[test]
    fn test_read_column_table() {
        let rows = read_columns(REPORT).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].index, 1);
        assert_eq!(rows[0].name, "XXXX_YYYY");
        assert_eq!(rows[0].status, "B");
        assert_eq!(rows[0].activity, 233.0);
        assert_eq!(rows[0].lower, 0.0);
        assert_eq!(rows[0].upper, 466.0);
        assert_eq!(rows[0].marginal, None);
        assert_eq!(rows[1].name, "YYYY_ZZZZ");
        assert_eq!(rows[1].marginal.as_deref(), Some("1"));
    }

    #[test]
    fn test_missing_marker() {
        let report = "Problem: X\nRows: 1\n   No.   Row name   St   Activity\n";
        assert_eq!(read_columns(report), Err(SolutionError::MissingColumnTable));
    }

    #[test]
    fn test_table_ends_at_unexpected_index() {
        let report = "No. Column name St Activity Lower Upper Marginal\n\
                      ------\n\
                      1 AAAA_BBBB B 5 0 10\n\
                      3 BBBB_CCCC B 7 0 10\n";
        let rows = read_columns(report).unwrap();
        assert_eq!(rows.len(), 1);
    }

    #[test]
    fn test_empty_table_after_header() {
        let report = "No. Column name St Activity\n------\n";
        assert_eq!(read_columns(report), Ok(Vec::new()));
    }

    #[test]
    fn test_truncated_row_is_an_error() {
        let report = "No. Column name St Activity\n------\n1 AAAA_BBBB B 5 0\n";
        assert!(matches!(
            read_columns(report),
            Err(SolutionError::MalformedRow { line: 3, .. })
        ));
    }

    #[test]
    fn test_non_numeric_activity_is_an_error() {
        let report = "No. Column name St Activity\n------\n1 AAAA_BBBB B five 0 10\n";
        assert_eq!(
            read_columns(report),
            Err(SolutionError::InvalidNumber {
                line: 3,
                field: "activity",
                value: "five".to_string()
            })
        );
    }

    #[test]
    fn test_row_limit() {
        let rows = ReportReader::new().with_row_limit(1).read(REPORT).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].name, "XXXX_YYYY");
    }
}
