//! Writers for the decoded flows and the vertex order.
use std::io::{self, Write};

use roadflow_lp::mps::format_number;

use crate::decoder::{JunctionLoad, SolutionEdge};
use crate::graph::Graph;

/// Graphviz digraph of the critical edges, labelled `<flow> / <bound>`
pub fn write_dot<W: Write>(edges: &[SolutionEdge], out: &mut W) -> io::Result<()> {
    writeln!(out, "digraph {{")?;
    for e in edges {
        writeln!(
            out,
            "\t{} -> {} [label=\" {} / {}\",arrowsize=0.5,fontsize=8]",
            quote(&e.from),
            quote(&e.to),
            format_number(e.flow),
            format_number(e.bound)
        )?;
    }
    writeln!(out, "}}")
}

fn quote(name: &str) -> String {
    format!("\"{}\"", name.replace('\\', "\\\\").replace('"', "\\\""))
}

/// One `<from> <to> <flow> <bound>` line per critical edge
pub fn write_table<W: Write>(edges: &[SolutionEdge], out: &mut W) -> io::Result<()> {
    for e in edges {
        writeln!(
            out,
            "{} {} {} {}",
            e.from,
            e.to,
            format_number(e.flow),
            format_number(e.bound)
        )?;
    }
    Ok(())
}

pub fn write_csv<W: Write>(edges: &[SolutionEdge], out: W) -> io::Result<()> {
    let mut writer = csv::Writer::from_writer(out);
    writer.write_record(["from", "to", "flow", "bound"])?;
    for e in edges {
        let flow = format_number(e.flow);
        let bound = format_number(e.bound);
        writer.write_record([e.from.as_str(), e.to.as_str(), flow.as_str(), bound.as_str()])?;
    }
    writer.flush()
}

/// One `<vertex> <throughput> <bound>` line per loaded junction
pub fn write_junctions<W: Write>(junctions: &[JunctionLoad], out: &mut W) -> io::Result<()> {
    for j in junctions {
        writeln!(
            out,
            "{} {} {}",
            j.vertex,
            format_number(j.throughput),
            format_number(j.bound)
        )?;
    }
    Ok(())
}

/// `<index>\t<name>` for every vertex, in index order
pub fn write_vertex_order<W: Write>(graph: &Graph, out: &mut W) -> io::Result<()> {
    for (i, v) in graph.vertices().iter().enumerate() {
        writeln!(out, "{}\t{}", i, v.name)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::sample;

    fn edges() -> Vec<SolutionEdge> {
        vec![
            SolutionEdge {
                from: "Владивосток".to_string(),
                to: "Артём".to_string(),
                flow: 233.0,
                bound: 466.0,
            },
            SolutionEdge {
                from: "Артём".to_string(),
                to: "Находка".to_string(),
                flow: 12.5,
                bound: 233.0,
            },
        ]
    }

    fn render(f: impl Fn(&mut Vec<u8>) -> io::Result<()>) -> String {
        let mut out = Vec::new();
        f(&mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_dot() {
        let dot = render(|out| write_dot(&edges(), out));
        assert_eq!(
            dot,
            "digraph {\n\
             \t\"Владивосток\" -> \"Артём\" [label=\" 233 / 466\",arrowsize=0.5,fontsize=8]\n\
             \t\"Артём\" -> \"Находка\" [label=\" 12.5 / 233\",arrowsize=0.5,fontsize=8]\n\
             }\n"
        );
    }

    #[test]
    fn test_dot_quotes_names() {
        let edges = vec![SolutionEdge {
            from: "Big \"A\"".to_string(),
            to: "B".to_string(),
            flow: 1.0,
            bound: 2.0,
        }];
        let dot = render(|out| write_dot(&edges, out));
        assert!(dot.contains("\t\"Big \\\"A\\\"\" -> \"B\""));
    }

    #[test]
    fn test_empty_dot() {
        assert_eq!(render(|out| write_dot(&[], out)), "digraph {\n}\n");
    }

    #[test]
    fn test_table() {
        let table = render(|out| write_table(&edges(), out));
        assert_eq!(table, "Владивосток Артём 233 466\nАртём Находка 12.5 233\n");
    }

    #[test]
    fn test_csv() {
        let csv = render(|out| write_csv(&edges(), out));
        assert_eq!(
            csv,
            "from,to,flow,bound\nВладивосток,Артём,233,466\nАртём,Находка,12.5,233\n"
        );
    }

    #[test]
    fn test_junctions() {
        let loads = vec![JunctionLoad {
            vertex: "X".to_string(),
            throughput: 120.0,
            bound: 5012.0,
        }];
        assert_eq!(render(|out| write_junctions(&loads, out)), "X 120 5012\n");
    }

    #[test]
    fn test_vertex_order() {
        let (graph, _) = sample();
        assert_eq!(
            render(|out| write_vertex_order(&graph, out)),
            "0\tX\n1\tY\n2\tZ\n"
        );
    }
}
