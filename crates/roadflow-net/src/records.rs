use crate::lexer::Span;

/// `<vertex_name> <population>` from the population file
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct PopulationRecord {
    pub span: Span,
    pub name: String,
    pub population: u64,
}

/// `<vertex_a> <vertex_b> <distance>` from the edge file; the pair is unordered
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct EdgeRecord {
    pub span: Span,
    pub a: String,
    pub b: String,
    pub distance: u64,
}

/// `<full_name> <code>` from the abbreviation file
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct AbbreviationRecord {
    pub span: Span,
    pub name: String,
    pub code: String,
}

/// `<source> <destination>` from the endpoint file
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct EndpointRecord {
    pub span: Span,
    pub source: String,
    pub destination: String,
}
