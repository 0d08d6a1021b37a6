//! Loading of the network input files.
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, info};

use crate::abbrev::{AbbrevError, AbbreviationRegistry};
use crate::graph::{Graph, GraphError};
use crate::parser::{ParseError, Parser};

#[derive(Error, Debug)]
pub enum LoadError {
    #[error("Cannot read {}: {source}", .path.display())]
    Io { path: PathBuf, source: io::Error },
    #[error("{}: {source}", .path.display())]
    Parse { path: PathBuf, source: ParseError },
    #[error(transparent)]
    Graph(#[from] GraphError),
    #[error(transparent)]
    Abbreviation(#[from] AbbrevError),
}

fn read(path: &Path) -> Result<String, LoadError> {
    fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn parsed<T>(path: &Path, result: Result<T, ParseError>) -> Result<T, LoadError> {
    result.map_err(|source| LoadError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Read the population and edge files and build the graph.
pub fn load_graph(populations: &Path, edges: &Path) -> Result<Graph, LoadError> {
    let popul = parsed(populations, Parser::parse_populations(&read(populations)?))?;
    let roads = parsed(edges, Parser::parse_edges(&read(edges)?))?;
    let graph = Graph::build(&popul, &roads)?;
    info!(vertices = graph.len(), roads = graph.road_count(), "loaded road network");
    Ok(graph)
}

pub fn load_registry(path: &Path) -> Result<AbbreviationRegistry, LoadError> {
    let records = parsed(path, Parser::parse_abbreviations(&read(path)?))?;
    let registry = AbbreviationRegistry::from_records(&records)?;
    debug!(codes = registry.len(), "loaded abbreviations");
    Ok(registry)
}

/// Source and destination vertex names
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    pub source: String,
    pub destination: String,
}

/// Resolve the endpoints from command line values and the endpoint file.
///
/// Values given on the command line win. The file is only read when one of them is missing, and
/// a file that does not exist counts as empty. Any other read or parse failure is an error.
/// Returns `None` when neither source provides both names.
pub fn resolve_endpoints(
    source: Option<String>,
    destination: Option<String>,
    file: &Path,
) -> Result<Option<Endpoints>, LoadError> {
    if let (Some(source), Some(destination)) = (&source, &destination) {
        return Ok(Some(Endpoints {
            source: source.clone(),
            destination: destination.clone(),
        }));
    }

    let from_file = match fs::read_to_string(file) {
        Ok(text) => parsed(file, Parser::parse_endpoints(&text))?,
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            debug!(path = %file.display(), "no endpoint file, using command line only");
            None
        }
        Err(source) => {
            return Err(LoadError::Io {
                path: file.to_path_buf(),
                source,
            });
        }
    };

    let (file_source, file_destination) = match from_file {
        Some(record) => (Some(record.source), Some(record.destination)),
        None => (None, None),
    };
    Ok(source
        .or(file_source)
        .zip(destination.or(file_destination))
        .map(|(source, destination)| Endpoints { source, destination }))
}
