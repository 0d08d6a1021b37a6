use roadflow_lp::{LpModel, ModelError, Sense};
use thiserror::Error;
use tracing::info;

use crate::abbrev::{AbbrevError, AbbreviationRegistry, Code};
use crate::graph::{Graph, GraphError};

/// Problem name written to the NAME card unless overridden
pub const DEFAULT_PROBLEM_NAME: &str = "PK_ROADS";

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CompileError {
    #[error(transparent)]
    Abbreviation(#[from] AbbrevError),
    #[error(transparent)]
    Graph(#[from] GraphError),
    #[error("Invalid model: {0}")]
    Model(#[from] ModelError),
    #[error("Source and destination are both {0}")]
    SameTerminals(String),
    #[error("The {0} formulation needs a source and a destination")]
    MissingTerminals(&'static str),
    #[error("Road graph has no vertices")]
    EmptyGraph,
    #[error("Capacity of the road {from} -> {to} with distance {distance} overflows")]
    CapacityOverflow { from: String, to: String, distance: u64 },
}

/// A way of expressing the road network as a linear program.
///
/// Implementations add their rows, columns, RHS values and bounds to an empty model; the
/// [`Compiler`] names the model and checks it afterwards.
pub trait Formulation {
    /// Short name used in logs
    fn name(&self) -> &'static str;

    /// Direction the solver has to optimize the objective row in
    fn sense(&self) -> Sense;

    fn emit(&self, network: &Network<'_>, model: &mut LpModel) -> Result<(), CompileError>;
}

/// Graph plus the code of every vertex, resolved once up front
pub struct Network<'a> {
    graph: &'a Graph,
    registry: &'a AbbreviationRegistry,
    codes: Vec<Code>,
}

impl<'a> Network<'a> {
    /// Fails on the first vertex without an abbreviation.
    pub fn new(graph: &'a Graph, registry: &'a AbbreviationRegistry) -> Result<Self, CompileError> {
        let codes = graph
            .vertices()
            .iter()
            .map(|v| registry.code(&v.name))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            graph,
            registry,
            codes,
        })
    }

    pub fn graph(&self) -> &'a Graph {
        self.graph
    }

    pub fn registry(&self) -> &'a AbbreviationRegistry {
        self.registry
    }

    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }

    /// Indices come from [`Graph::edges`] or [`Network::vertex`] and are always in range.
    pub(crate) fn code(&self, vertex: usize) -> Code {
        self.codes[vertex]
    }

    pub(crate) fn name(&self, vertex: usize) -> &'a str {
        &self.graph.vertices()[vertex].name
    }

    /// Column name of the flow from `from` to `to`
    pub(crate) fn edge_name(&self, from: usize, to: usize) -> String {
        self.codes[from].join(&self.codes[to])
    }

    /// Vertex index of a full vertex name
    pub fn vertex(&self, name: &str) -> Result<usize, CompileError> {
        Ok(self.graph.index_of(name)?)
    }
}

/// Compiler for turning the road network into LP models
pub struct Compiler<'a> {
    network: Network<'a>,
    problem_name: String,
}

impl<'a> Compiler<'a> {
    pub fn new(graph: &'a Graph, registry: &'a AbbreviationRegistry) -> Result<Self, CompileError> {
        if graph.is_empty() {
            return Err(CompileError::EmptyGraph);
        }
        Ok(Self {
            network: Network::new(graph, registry)?,
            problem_name: DEFAULT_PROBLEM_NAME.to_string(),
        })
    }

    pub fn with_problem_name(mut self, name: impl Into<String>) -> Self {
        self.problem_name = name.into();
        self
    }

    pub fn network(&self) -> &Network<'a> {
        &self.network
    }

    /// Compile the network under `formulation` into a validated model
    pub fn compile(&self, formulation: &dyn Formulation) -> Result<LpModel, CompileError> {
        let mut model = LpModel::new(self.problem_name.clone(), formulation.sense());
        formulation.emit(&self.network, &mut model)?;
        model.validate()?;

        info!(
            formulation = formulation.name(),
            rows = model.num_rows(),
            columns = model.num_columns(),
            nonzeros = model.num_entries(),
            bounds = model.bounds.len(),
            "compiled model"
        );
        Ok(model)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formulation::{JunctionFlow, MaxFlow, MinCostFlow, Terminals};
    use crate::testutil::{load, sample};
    use roadflow_lp::mps;

    #[test]
    fn test_missing_abbreviation_is_reported_early() {
        let (graph, _) = load("X 100 Y 50", "X Y 10", "X XXXX");
        let registry = crate::testutil::registry("X XXXX");
        let err = Compiler::new(&graph, &registry).err().unwrap();
        assert_eq!(
            err,
            CompileError::Abbreviation(AbbrevError::UnknownName("Y".to_string()))
        );
    }

    #[test]
    fn test_empty_graph() {
        let (graph, registry) = load("", "", "");
        assert!(matches!(
            Compiler::new(&graph, &registry),
            Err(CompileError::EmptyGraph)
        ));
    }

    #[test]
    fn test_three_town_max_flow_statement() {
        let (graph, registry) = sample();
        let compiler = Compiler::new(&graph, &registry).unwrap();
        let terminals = Terminals::resolve(compiler.network(), "X", "Z").unwrap();
        let model = compiler.compile(&MaxFlow::new(terminals)).unwrap();

        let expected = "NAME          PK_ROADS\n\
                        ROWS\n \
                        N\tMAXFLOW\n \
                        E  IO_YYYY\n \
                        E  SRC_DST\n\
                        COLUMNS\n\
                        \tXXXX_YYYY\t\tMAXFLOW\t\t\t1\n\
                        \tXXXX_YYYY\t\tSRC_DST\t\t\t-1\n\
                        \tXXXX_YYYY\t\tIO_YYYY\t\t\t1\n\
                        \tYYYY_ZZZZ\t\tIO_YYYY\t\t\t-1\n\
                        \tYYYY_ZZZZ\t\tSRC_DST\t\t\t1\n\
                        BOUNDS\n \
                        UP FLOW\t\t\tXXXX_YYYY\t\t466\n \
                        LO FLOW\t\t\tXXXX_YYYY\t\t0\n \
                        UP FLOW\t\t\tYYYY_ZZZZ\t\t233\n \
                        LO FLOW\t\t\tYYYY_ZZZZ\t\t0\n\
                        ENDATA\n";
        assert_eq!(mps::to_string(&model), expected);
    }

    #[test]
    fn test_compilation_is_deterministic() {
        let (graph, registry) = sample();
        let compiler = Compiler::new(&graph, &registry).unwrap();
        let terminals = Terminals::resolve(compiler.network(), "X", "Z").unwrap();

        let first = mps::to_string(&compiler.compile(&MaxFlow::new(terminals)).unwrap());
        let second = mps::to_string(&compiler.compile(&MaxFlow::new(terminals)).unwrap());
        assert_eq!(first, second);

        let first = mps::to_string(&compiler.compile(&JunctionFlow::default()).unwrap());
        let (graph2, registry2) = sample();
        let again = Compiler::new(&graph2, &registry2).unwrap();
        let second = mps::to_string(&again.compile(&JunctionFlow::default()).unwrap());
        assert_eq!(first, second);
    }

    #[test]
    fn test_sense_and_problem_name() {
        let (graph, registry) = sample();
        let compiler = Compiler::new(&graph, &registry)
            .unwrap()
            .with_problem_name("TEST");
        let terminals = Terminals::resolve(compiler.network(), "X", "Z").unwrap();

        let model = compiler.compile(&MinCostFlow::new(terminals)).unwrap();
        assert_eq!(model.name, "TEST");
        assert_eq!(model.sense, Sense::Minimize);

        let model = compiler.compile(&JunctionFlow::default()).unwrap();
        assert_eq!(model.sense, Sense::Maximize);
    }
}
