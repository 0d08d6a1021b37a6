//! The LP formulations of the road network.
//!
//! Every formulation emits rows in vertex order and columns in edge order (row index outer,
//! column index inner), so identical inputs give byte-identical statements.
use roadflow_lp::{BoundKind, Column, LpModel, RowKind, Sense};

use crate::abbrev::Code;
use crate::capacity::{self, EdgeCapacity};
use crate::compiler::{CompileError, Formulation, Network};
use crate::graph::Edge;

/// Objective of [`MaxFlow`]
pub const MAXFLOW_ROW: &str = "MAXFLOW";
/// Objective of [`JunctionFlow`]
pub const JUNCTION_OBJECTIVE_ROW: &str = "MAX_FLOW";
/// Objective of [`MinCostFlow`]
pub const COST_ROW: &str = "COST";
/// Ties total source outflow to total destination inflow
pub const SRC_DST_ROW: &str = "SRC_DST";
/// Bound set of every variable bound
pub const FLOW_BOUNDS: &str = "FLOW";
/// RHS set of the min-cost capacity rows
pub const CAPACITY_RHS: &str = "RHS1";

/// Conservation row of a vertex in the terminal formulations
pub fn io_row(code: Code) -> String {
    format!("IO_{}", code)
}

pub fn inbound_row(code: Code) -> String {
    format!("IN_{}", code)
}

pub fn outbound_row(code: Code) -> String {
    format!("OUT_{}", code)
}

pub fn capacity_row(network: &Network<'_>, edge: &Edge) -> String {
    format!("CAP_{}", network.edge_name(edge.from, edge.to))
}

/// Column of a vertex's junction variable. Self-loops never carry distance, so this cannot
/// collide with an edge column.
pub fn junction_column(code: Code) -> String {
    code.join(&code)
}

/// Which formulation to compile
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FormulationKind {
    /// Maximum flow from a source to a destination
    #[default]
    MaxFlow,
    /// Total throughput over all roads with population-capped junctions
    Junction,
    /// Flow between a source and a destination over class-dependent road capacities
    MinCost,
}

impl FormulationKind {
    pub fn needs_terminals(self) -> bool {
        !matches!(self, FormulationKind::Junction)
    }

    /// Build the formulation; `terminals` is required unless the kind is [`FormulationKind::Junction`].
    pub fn build(
        self,
        terminals: Option<Terminals>,
        capacity: EdgeCapacity,
    ) -> Result<Box<dyn Formulation>, CompileError> {
        Ok(match self {
            FormulationKind::MaxFlow => {
                let t = terminals.ok_or(CompileError::MissingTerminals("max-flow"))?;
                Box::new(MaxFlow::new(t).with_capacity(capacity))
            }
            FormulationKind::Junction => Box::new(JunctionFlow::new(capacity)),
            FormulationKind::MinCost => {
                let t = terminals.ok_or(CompileError::MissingTerminals("min-cost"))?;
                Box::new(MinCostFlow::new(t))
            }
        })
    }
}

/// Source and destination vertex indices
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Terminals {
    pub source: usize,
    pub sink: usize,
}

impl Terminals {
    pub fn resolve(network: &Network<'_>, source: &str, sink: &str) -> Result<Self, CompileError> {
        let source_idx = network.vertex(source)?;
        let sink_idx = network.vertex(sink)?;
        if source_idx == sink_idx {
            return Err(CompileError::SameTerminals(source.to_string()));
        }
        Ok(Self {
            source: source_idx,
            sink: sink_idx,
        })
    }

    fn is_terminal(&self, vertex: usize) -> bool {
        vertex == self.source || vertex == self.sink
    }

    /// Conservation entries for a flow on `edge`: leaving `from` and entering `to`.
    ///
    /// Flow out of the source and into the destination is booked on the joint row instead of a
    /// conservation row. A direct source to destination road touches neither.
    fn conservation(&self, network: &Network<'_>, edge: &Edge, column: Column) -> Column {
        let from_source = edge.from == self.source;
        let into_sink = edge.to == self.sink;
        match (from_source, into_sink) {
            (true, true) => column,
            (true, false) => column
                .entry(SRC_DST_ROW, -1.0)
                .entry(io_row(network.code(edge.to)), 1.0),
            (false, true) => column
                .entry(io_row(network.code(edge.from)), -1.0)
                .entry(SRC_DST_ROW, 1.0),
            (false, false) => column
                .entry(io_row(network.code(edge.from)), -1.0)
                .entry(io_row(network.code(edge.to)), 1.0),
        }
    }

    fn add_conservation_rows(&self, network: &Network<'_>, model: &mut LpModel) -> Result<(), CompileError> {
        for v in (0..network.len()).filter(|&v| !self.is_terminal(v)) {
            model.add_row(io_row(network.code(v)), RowKind::Equal)?;
        }
        model.add_row(SRC_DST_ROW, RowKind::Equal)?;
        Ok(())
    }
}

/// Turn a capacity that did not fit in a `u64` into an error naming the road.
fn checked_capacity(network: &Network<'_>, edge: &Edge, capacity: Option<u64>) -> Result<u64, CompileError> {
    capacity.ok_or_else(|| CompileError::CapacityOverflow {
        from: network.name(edge.from).to_string(),
        to: network.name(edge.to).to_string(),
        distance: edge.distance,
    })
}

fn add_flow_bounds(model: &mut LpModel, column: &str, upper: u64) {
    model.add_bound(BoundKind::Upper, FLOW_BOUNDS, column, upper as f64);
    model.add_bound(BoundKind::Lower, FLOW_BOUNDS, column, 0.0);
}

/// Maximum flow from one source to one destination.
///
/// Only roads that neither enter the source nor leave the destination get a variable. The
/// objective sums the flow leaving the source.
#[derive(Debug, Clone, Copy)]
pub struct MaxFlow {
    terminals: Terminals,
    capacity: EdgeCapacity,
}

impl MaxFlow {
    pub fn new(terminals: Terminals) -> Self {
        Self {
            terminals,
            capacity: EdgeCapacity::default(),
        }
    }

    pub fn with_capacity(mut self, capacity: EdgeCapacity) -> Self {
        self.capacity = capacity;
        self
    }
}

impl Formulation for MaxFlow {
    fn name(&self) -> &'static str {
        "max-flow"
    }

    fn sense(&self) -> Sense {
        Sense::Maximize
    }

    fn emit(&self, network: &Network<'_>, model: &mut LpModel) -> Result<(), CompileError> {
        let Terminals { source, sink } = self.terminals;

        model.add_row(MAXFLOW_ROW, RowKind::Free)?;
        self.terminals.add_conservation_rows(network, model)?;

        let edges: Vec<Edge> = network
            .graph()
            .edges()
            .filter(|e| e.to != source && e.from != sink)
            .collect();

        for edge in &edges {
            let mut column = Column::new(network.edge_name(edge.from, edge.to));
            if edge.from == source {
                column = column.entry(MAXFLOW_ROW, 1.0);
            }
            model.add_column(self.terminals.conservation(network, edge, column))?;
        }

        for edge in &edges {
            let name = network.edge_name(edge.from, edge.to);
            let cap = checked_capacity(network, edge, self.capacity.bound(edge.distance))?;
            add_flow_bounds(model, &name, cap);
        }
        Ok(())
    }
}

/// Total flow over every road, where each town passes at most a population-dependent amount.
///
/// Every vertex gets an inbound and an outbound balance row joined by a junction variable
/// bounded by [`capacity::junction_capacity`].
#[derive(Debug, Clone, Copy, Default)]
pub struct JunctionFlow {
    capacity: EdgeCapacity,
}

impl JunctionFlow {
    pub fn new(capacity: EdgeCapacity) -> Self {
        Self { capacity }
    }
}

impl Formulation for JunctionFlow {
    fn name(&self) -> &'static str {
        "junction"
    }

    fn sense(&self) -> Sense {
        Sense::Maximize
    }

    fn emit(&self, network: &Network<'_>, model: &mut LpModel) -> Result<(), CompileError> {
        model.add_row(JUNCTION_OBJECTIVE_ROW, RowKind::Free)?;
        for v in 0..network.len() {
            model.add_row(inbound_row(network.code(v)), RowKind::Equal)?;
            model.add_row(outbound_row(network.code(v)), RowKind::Equal)?;
        }

        let edges: Vec<Edge> = network.graph().edges().collect();
        for edge in &edges {
            model.add_column(
                Column::new(network.edge_name(edge.from, edge.to))
                    .entry(JUNCTION_OBJECTIVE_ROW, 1.0)
                    .entry(outbound_row(network.code(edge.from)), -1.0)
                    .entry(inbound_row(network.code(edge.to)), 1.0),
            )?;
        }
        for v in 0..network.len() {
            let code = network.code(v);
            model.add_column(
                Column::new(junction_column(code))
                    .entry(inbound_row(code), -1.0)
                    .entry(outbound_row(code), 1.0),
            )?;
        }

        for edge in &edges {
            let name = network.edge_name(edge.from, edge.to);
            let cap = checked_capacity(network, edge, self.capacity.bound(edge.distance))?;
            add_flow_bounds(model, &name, cap);
        }
        for (v, vertex) in network.graph().vertices().iter().enumerate() {
            let name = junction_column(network.code(v));
            add_flow_bounds(model, &name, capacity::junction_capacity(vertex.population));
        }
        Ok(())
    }
}

/// Flow from a source to a destination with one capacity row per road.
///
/// Capacities depend on the road class (see [`capacity::road_class_capacity`]). The objective
/// row carries `-1` per unit of flow and is minimized.
#[derive(Debug, Clone, Copy)]
pub struct MinCostFlow {
    terminals: Terminals,
}

impl MinCostFlow {
    pub fn new(terminals: Terminals) -> Self {
        Self { terminals }
    }
}

impl Formulation for MinCostFlow {
    fn name(&self) -> &'static str {
        "min-cost"
    }

    fn sense(&self) -> Sense {
        Sense::Minimize
    }

    fn emit(&self, network: &Network<'_>, model: &mut LpModel) -> Result<(), CompileError> {
        let Terminals { source, sink } = self.terminals;
        let edges: Vec<Edge> = network.graph().edges().collect();

        model.add_row(COST_ROW, RowKind::Free)?;
        for edge in &edges {
            model.add_row(capacity_row(network, edge), RowKind::Less)?;
        }
        self.terminals.add_conservation_rows(network, model)?;

        for edge in &edges {
            let column = Column::new(network.edge_name(edge.from, edge.to))
                .entry(COST_ROW, -1.0)
                .entry(capacity_row(network, edge), 1.0);
            // Roads back into the source or out of the destination are only capacity bound.
            let column = if edge.to == source || edge.from == sink {
                column
            } else {
                self.terminals.conservation(network, edge, column)
            };
            model.add_column(column)?;
        }

        let caps = edges
            .iter()
            .map(|e| checked_capacity(network, e, capacity::road_class_capacity(e.distance, e.from, e.to)))
            .collect::<Result<Vec<_>, _>>()?;
        for (edge, &cap) in edges.iter().zip(&caps) {
            model.add_rhs(CAPACITY_RHS, capacity_row(network, edge), cap as f64);
        }
        for (edge, &cap) in edges.iter().zip(&caps) {
            add_flow_bounds(model, &network.edge_name(edge.from, edge.to), cap);
        }
        Ok(())
    }
}
