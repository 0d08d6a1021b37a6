use roadflow_lp::{ColumnActivity, ReportReader, SolutionError};
use thiserror::Error;
use tracing::{debug, info};

use crate::abbrev::{AbbrevError, AbbreviationRegistry, CODE_WIDTH, SEPARATOR};

/// Length of a composite `AAAA_BBBB` identifier
const COMPOSITE_WIDTH: usize = 2 * CODE_WIDTH + 1;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum DecodeError {
    #[error(transparent)]
    Solution(#[from] SolutionError),
    #[error("Column {0:?} is not of the form AAAA_BBBB")]
    MalformedIdentifier(String),
    #[error(transparent)]
    Abbreviation(#[from] AbbrevError),
}

/// A road carrying nonzero flow in the solved model
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct SolutionEdge {
    pub from: String,
    pub to: String,
    pub flow: f64,
    pub bound: f64,
}

/// Flow passing through a town's junction in the junction formulation
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct JunctionLoad {
    pub vertex: String,
    pub throughput: f64,
    pub bound: f64,
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DecodedFlows {
    /// Critical edges in table order
    pub edges: Vec<SolutionEdge>,
    pub junctions: Vec<JunctionLoad>,
}

/// Split a composite identifier at the fixed separator offset.
pub fn split_identifier(name: &str) -> Result<(&str, &str), DecodeError> {
    let malformed = || DecodeError::MalformedIdentifier(name.to_string());
    if name.len() != COMPOSITE_WIDTH || name.as_bytes()[CODE_WIDTH] != SEPARATOR as u8 {
        return Err(malformed());
    }
    let from = name.get(..CODE_WIDTH).ok_or_else(malformed)?;
    let to = name.get(CODE_WIDTH + 1..).ok_or_else(malformed)?;
    Ok((from, to))
}

/// Turns the solver's column activity table back into named flows
pub struct Decoder<'a> {
    registry: &'a AbbreviationRegistry,
    reader: ReportReader,
}

impl<'a> Decoder<'a> {
    pub fn new(registry: &'a AbbreviationRegistry) -> Self {
        Self {
            registry,
            reader: ReportReader::new(),
        }
    }

    /// Stop reading the table after `limit` rows.
    pub fn with_row_limit(mut self, limit: usize) -> Self {
        self.reader = self.reader.with_row_limit(limit);
        self
    }

    pub fn decode(&self, report: &str) -> Result<DecodedFlows, DecodeError> {
        let rows = self.reader.read(report)?;
        self.decode_rows(&rows)
    }

    /// Resolve every row with nonzero activity; zero-activity rows are dropped.
    pub fn decode_rows(&self, rows: &[ColumnActivity]) -> Result<DecodedFlows, DecodeError> {
        let mut flows = DecodedFlows::default();
        for row in rows.iter().filter(|r| r.activity != 0.0) {
            let (from, to) = split_identifier(&row.name)?;
            let from = self.registry.name(from)?;
            if is_junction(&row.name) {
                flows.junctions.push(JunctionLoad {
                    vertex: from.to_string(),
                    throughput: row.activity,
                    bound: row.upper,
                });
                continue;
            }
            let to = self.registry.name(to)?;
            flows.edges.push(SolutionEdge {
                from: from.to_string(),
                to: to.to_string(),
                flow: row.activity,
                bound: row.upper,
            });
        }

        let pruned = rows.len() - flows.edges.len() - flows.junctions.len();
        debug!(pruned, "dropped zero-flow columns");
        info!(
            rows = rows.len(),
            edges = flows.edges.len(),
            junctions = flows.junctions.len(),
            "decoded solution"
        );
        Ok(flows)
    }
}

/// Junction variables pair a code with itself.
fn is_junction(name: &str) -> bool {
    name.get(..CODE_WIDTH) == name.get(CODE_WIDTH + 1..)
}
