use std::collections::HashMap;

use thiserror::Error;
use tracing::{debug, warn};

use crate::records::{EdgeRecord, PopulationRecord};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum GraphError {
    #[error("Vertex {0} is listed twice in the population data")]
    DuplicateVertex(String),
    #[error("Edge at line {line} references unknown vertex {name}")]
    UnknownVertex { name: String, line: usize },
    #[error("Unknown vertex {0}")]
    NotFound(String),
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct Vertex {
    pub name: String,
    pub population: u64,
}

/// A directed view of an undirected road: `from -> to` with positive distance
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Edge {
    pub from: usize,
    pub to: usize,
    pub distance: u64,
}

/// Road network with vertices ordered by descending population
///
/// Vertex indices follow that order; ties in population are broken by name so that the same
/// input always yields the same indices. `distance[i][j] == distance[j][i]`, and `0` means there
/// is no direct road.
#[derive(Debug, Clone, Default)]
pub struct Graph {
    vertices: Vec<Vertex>,
    index: HashMap<String, usize>,
    distance: Vec<Vec<u64>>,
}

impl Graph {
    pub fn build(populations: &[PopulationRecord], edges: &[EdgeRecord]) -> Result<Self, GraphError> {
        let mut vertices: Vec<Vertex> = Vec::with_capacity(populations.len());
        let mut seen = std::collections::HashSet::new();
        for p in populations {
            if !seen.insert(p.name.as_str()) {
                return Err(GraphError::DuplicateVertex(p.name.clone()));
            }
            vertices.push(Vertex {
                name: p.name.clone(),
                population: p.population,
            });
        }

        vertices.sort_by(|a, b| b.population.cmp(&a.population).then_with(|| a.name.cmp(&b.name)));

        let index: HashMap<String, usize> = vertices
            .iter()
            .enumerate()
            .map(|(i, v)| (v.name.clone(), i))
            .collect();

        let n = vertices.len();
        let mut graph = Self {
            vertices,
            index,
            distance: vec![vec![0; n]; n],
        };

        for e in edges {
            let a = graph.lookup_for_edge(&e.a, e.span.line)?;
            let b = graph.lookup_for_edge(&e.b, e.span.line)?;
            if a == b {
                warn!(vertex = %e.a, line = e.span.line, "ignoring self-loop road");
                continue;
            }
            graph.distance[a][b] = e.distance;
            graph.distance[b][a] = e.distance;
        }

        debug!(vertices = graph.len(), roads = graph.road_count(), "built road graph");
        Ok(graph)
    }

    fn lookup_for_edge(&self, name: &str, line: usize) -> Result<usize, GraphError> {
        self.index.get(name).copied().ok_or_else(|| GraphError::UnknownVertex {
            name: name.to_string(),
            line,
        })
    }

    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    pub fn vertex(&self, i: usize) -> Option<&Vertex> {
        self.vertices.get(i)
    }

    /// Index of the vertex called `name`.
    ///
    /// Names are commonly typed with `е` in place of `ё`, so when there is no exact match a
    /// single vertex whose name is equal up to that substitution is accepted.
    pub fn index_of(&self, name: &str) -> Result<usize, GraphError> {
        if let Some(&i) = self.index.get(name) {
            return Ok(i);
        }
        let folded = fold_yo(name);
        let mut matches = self
            .vertices
            .iter()
            .enumerate()
            .filter(|(_, v)| fold_yo(&v.name) == folded);
        match (matches.next(), matches.next()) {
            (Some((i, v)), None) => {
                debug!(given = name, vertex = %v.name, "matched vertex name up to ё");
                Ok(i)
            }
            _ => Err(GraphError::NotFound(name.to_string())),
        }
    }

    /// `0` when there is no direct road, including for indices out of range
    pub fn distance(&self, from: usize, to: usize) -> u64 {
        self.distance
            .get(from)
            .and_then(|row| row.get(to))
            .copied()
            .unwrap_or(0)
    }

    /// Every directed edge, row index outer and column index inner, both ascending
    pub fn edges(&self) -> impl Iterator<Item = Edge> + '_ {
        let n = self.len();
        (0..n).flat_map(move |from| {
            (0..n).filter_map(move |to| {
                let distance = self.distance[from][to];
                (distance > 0).then_some(Edge { from, to, distance })
            })
        })
    }

    /// Number of undirected roads
    pub fn road_count(&self) -> usize {
        self.edges().filter(|e| e.from < e.to).count()
    }
}

fn fold_yo(name: &str) -> String {
    name.replace('ё', "е").replace('Ё', "Е")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::Parser;

    fn graph(popul: &str, edges: &str) -> Result<Graph, GraphError> {
        Graph::build(
            &Parser::parse_populations(popul).unwrap(),
            &Parser::parse_edges(edges).unwrap(),
        )
    }

    #[test]
    fn test_sorted_by_descending_population() {
        let g = graph("Z 10 X 100 Y 50", "X Y 10\nZ Y 5\n").unwrap();
        let names: Vec<_> = g.vertices().iter().map(|v| v.name.as_str()).collect();
        assert_eq!(names, vec!["X", "Y", "Z"]);
        assert_eq!(g.index_of("Z").unwrap(), 2);
    }

    #[test]
    fn test_ties_broken_by_name() {
        let a = graph("B 5 C 5 A 5 D 9", "").unwrap();
        let b = graph("A 5 D 9 C 5 B 5", "").unwrap();
        let names = |g: &Graph| g.vertices().iter().map(|v| v.name.clone()).collect::<Vec<_>>();
        assert_eq!(names(&a), vec!["D", "A", "B", "C"]);
        assert_eq!(names(&a), names(&b));
    }

    #[test]
    fn test_distance_matrix_symmetric() {
        let g = graph("X 100 Y 50 Z 10", "Y X 10\nZ Y 5\n").unwrap();
        for i in 0..g.len() {
            assert_eq!(g.distance(i, i), 0);
            for j in 0..g.len() {
                assert_eq!(g.distance(i, j), g.distance(j, i));
            }
        }
        assert_eq!(g.distance(0, 1), 10);
        assert_eq!(g.distance(1, 2), 5);
        assert_eq!(g.distance(0, 2), 0);
        assert_eq!(g.road_count(), 2);
    }

    #[test]
    fn test_edge_order() {
        let g = graph("X 100 Y 50 Z 10", "X Y 10\nY Z 5\n").unwrap();
        let pairs: Vec<_> = g.edges().map(|e| (e.from, e.to)).collect();
        assert_eq!(pairs, vec![(0, 1), (1, 0), (1, 2), (2, 1)]);
    }

    #[test]
    fn test_self_loop_ignored() {
        let g = graph("X 100 Y 50", "X X 4\nX Y 1\n").unwrap();
        assert_eq!(g.distance(0, 0), 0);
        assert_eq!(g.road_count(), 1);
    }

    #[test]
    fn test_unknown_and_duplicate_vertices() {
        assert_eq!(
            graph("X 100 Y 50", "X W 3\n").unwrap_err(),
            GraphError::UnknownVertex {
                name: "W".to_string(),
                line: 1
            }
        );
        assert_eq!(
            graph("X 100 X 50", "").unwrap_err(),
            GraphError::DuplicateVertex("X".to_string())
        );
        let g = graph("X 1", "").unwrap();
        assert_eq!(g.index_of("Q"), Err(GraphError::NotFound("Q".to_string())));
    }

    #[test]
    fn test_lookup_ignores_yo() {
        let g = graph("Артём 100000 Ёлкино 500 Елкино 400", "").unwrap();
        assert_eq!(g.index_of("Артем"), g.index_of("Артём"));
        assert_eq!(g.index_of("Артем").unwrap(), 0);
        // Exact spellings win over folded ones.
        assert_eq!(g.index_of("Елкино").unwrap(), 2);
        assert_eq!(g.index_of("Ёлкино").unwrap(), 1);

        let ambiguous = graph("Сёлёк 500 Селек 400", "").unwrap();
        assert_eq!(
            ambiguous.index_of("Сёлек"),
            Err(GraphError::NotFound("Сёлек".to_string()))
        );
        let g = graph("Ёлкино 500 Артём 10", "").unwrap();
        assert_eq!(g.index_of("Елкино").unwrap(), 0);
    }

    #[test]
    fn test_out_of_range_indices() {
        let g = graph("X 100 Y 50", "X Y 3
").unwrap();
        assert_eq!(g.vertex(1).map(|v| v.name.as_str()), Some("Y"));
        assert_eq!(g.vertex(2), None);
        assert_eq!(g.distance(0, 1), 3);
        assert_eq!(g.distance(0, 7), 0);
        assert_eq!(g.distance(9, 0), 0);
    }
}
