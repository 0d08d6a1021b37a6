pub mod abbrev;
pub mod capacity;
pub mod compiler;
pub mod decoder;
pub mod formulation;
pub mod graph;
pub mod input;
pub mod lexer;
pub mod parser;
pub mod records;
pub mod render;

#[cfg(test)]
mod testutil;

pub use abbrev::{AbbrevError, AbbreviationRegistry, Code};
pub use capacity::EdgeCapacity;
pub use compiler::{CompileError, Compiler, Formulation, Network, DEFAULT_PROBLEM_NAME};
pub use decoder::{DecodeError, DecodedFlows, Decoder, JunctionLoad, SolutionEdge};
pub use formulation::{FormulationKind, JunctionFlow, MaxFlow, MinCostFlow, Terminals};
pub use graph::{Edge, Graph, GraphError, Vertex};
pub use input::{Endpoints, LoadError, load_graph, load_registry, resolve_endpoints};
pub use lexer::{Lexer, Span, Token, TokenKind};
pub use parser::{ParseError, Parser};
pub use records::*;
