use std::path::{Path, PathBuf};

pub const DEFAULT_MODEL_DIR: &str = "pk_model";

pub const POPULATIONS_FILE: &str = "graph_popul.txt";
pub const EDGES_FILE: &str = "graph_edges.txt";
pub const ABBREVIATIONS_FILE: &str = "abbreviations.txt";
pub const ENDPOINTS_FILE: &str = "src_dst.txt";

pub const STATEMENT_FILE: &str = "statement.mps";
pub const SOLUTION_FILE: &str = "solution.out";
pub const DOT_FILE: &str = "flows.dot";
pub const TABLE_FILE: &str = "flows.txt";
pub const JUNCTIONS_FILE: &str = "junctions.txt";
pub const VERTEX_ORDER_FILE: &str = "verts_order.txt";

/// Where every stage reads its inputs from and writes its outputs to
#[derive(Debug, Clone)]
pub struct Layout {
    pub populations: PathBuf,
    pub edges: PathBuf,
    pub abbreviations: PathBuf,
    pub endpoints: PathBuf,
    pub statement: PathBuf,
    pub solution: PathBuf,
    pub dot: PathBuf,
    pub table: PathBuf,
    pub junctions: PathBuf,
    pub vertex_order: PathBuf,
}

impl Layout {
    /// Inputs are taken from `model_dir`, outputs go to `out_dir`.
    pub fn new(model_dir: &Path, out_dir: &Path) -> Self {
        Self {
            populations: model_dir.join(POPULATIONS_FILE),
            edges: model_dir.join(EDGES_FILE),
            abbreviations: model_dir.join(ABBREVIATIONS_FILE),
            endpoints: model_dir.join(ENDPOINTS_FILE),
            statement: out_dir.join(STATEMENT_FILE),
            solution: out_dir.join(SOLUTION_FILE),
            dot: out_dir.join(DOT_FILE),
            table: out_dir.join(TABLE_FILE),
            junctions: out_dir.join(JUNCTIONS_FILE),
            vertex_order: out_dir.join(VERTEX_ORDER_FILE),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_layout() {
        let layout = Layout::new(Path::new(DEFAULT_MODEL_DIR), Path::new("."));
        assert_eq!(layout.populations, Path::new("pk_model/graph_popul.txt"));
        assert_eq!(layout.endpoints, Path::new("pk_model/src_dst.txt"));
        assert_eq!(layout.statement, Path::new("./statement.mps"));
        assert_eq!(layout.vertex_order, Path::new("./verts_order.txt"));
    }
}
