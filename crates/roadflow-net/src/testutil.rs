use crate::abbrev::AbbreviationRegistry;
use crate::graph::Graph;
use crate::parser::Parser;

pub fn registry(abbrev: &str) -> AbbreviationRegistry {
    AbbreviationRegistry::from_records(&Parser::parse_abbreviations(abbrev).unwrap()).unwrap()
}

pub fn load(popul: &str, edges: &str, abbrev: &str) -> (Graph, AbbreviationRegistry) {
    let graph = Graph::build(
        &Parser::parse_populations(popul).unwrap(),
        &Parser::parse_edges(edges).unwrap(),
    )
    .unwrap();
    (graph, registry(abbrev))
}

/// Three towns in a line: X (100) - 10 - Y (50) - 5 - Z (10)
pub fn sample() -> (Graph, AbbreviationRegistry) {
    load(
        "X 100\nY 50\nZ 10\n",
        "X Y 10\nY Z 5\n",
        "X XXXX\nY YYYY\nZ ZZZZ\n",
    )
}
