use std::collections::HashSet;

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ModelError {
    #[error("Duplicate row: {0}")]
    DuplicateRow(String),
    #[error("Duplicate column: {0}")]
    DuplicateColumn(String),
    #[error("Column {column} references undeclared row {row}")]
    UnknownRow { column: String, row: String },
    #[error("Bound references undeclared column {0}")]
    UnknownBoundColumn(String),
    #[error("RHS references undeclared row {0}")]
    UnknownRhsRow(String),
    #[error("RHS given for objective row {0}")]
    RhsOnObjective(String),
    #[error("Model {0} has no objective row")]
    MissingObjective(String),
}

/// Represents a linear program in the row/column layout of the MPS format
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct LpModel {
    /// Problem name written to the NAME card
    pub name: String,
    /// Direction the external solver is asked to optimize in
    pub sense: Sense,
    /// Declared rows, objective first
    pub rows: Vec<Row>,
    /// Decision variables in emission order
    pub columns: Vec<Column>,
    /// Right-hand side values of constraint rows
    pub rhs: Vec<RhsEntry>,
    /// Variable bounds
    pub bounds: Vec<Bound>,
    #[cfg_attr(feature = "serde", serde(skip))]
    row_names: HashSet<String>,
    #[cfg_attr(feature = "serde", serde(skip))]
    column_names: HashSet<String>,
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sense {
    Maximize,
    Minimize,
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowKind {
    /// Free row (N); the first one is the objective
    Free,
    /// Equality (E)
    Equal,
    /// Less than or equal (L)
    Less,
    /// Greater than or equal (G)
    Greater,
}

impl RowKind {
    pub fn code(self) -> &'static str {
        match self {
            RowKind::Free => "N",
            RowKind::Equal => "E",
            RowKind::Less => "L",
            RowKind::Greater => "G",
        }
    }
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    pub name: String,
    pub kind: RowKind,
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    /// Nonzero coefficients of this variable, in emission order
    pub entries: Vec<Entry>,
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct Entry {
    pub row: String,
    pub coefficient: f64,
}

impl Column {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            entries: Vec::new(),
        }
    }

    pub fn entry(mut self, row: impl Into<String>, coefficient: f64) -> Self {
        self.entries.push(Entry {
            row: row.into(),
            coefficient,
        });
        self
    }

    /// Coefficient of this column in `row`, summed over repeated entries
    pub fn coefficient(&self, row: &str) -> Option<f64> {
        let mut found = None;
        for e in self.entries.iter().filter(|e| e.row == row) {
            *found.get_or_insert(0.0) += e.coefficient;
        }
        found
    }
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoundKind {
    /// Upper bound (UP)
    Upper,
    /// Lower bound (LO)
    Lower,
    /// Fixed value (FX)
    Fixed,
    /// Unbounded in both directions (FR)
    Free,
}

impl BoundKind {
    pub fn code(self) -> &'static str {
        match self {
            BoundKind::Upper => "UP",
            BoundKind::Lower => "LO",
            BoundKind::Fixed => "FX",
            BoundKind::Free => "FR",
        }
    }
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct Bound {
    pub kind: BoundKind,
    /// Bound set name
    pub set: String,
    pub column: String,
    pub value: f64,
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct RhsEntry {
    /// RHS set name
    pub set: String,
    pub row: String,
    pub value: f64,
}

impl LpModel {
    pub fn new(name: impl Into<String>, sense: Sense) -> Self {
        Self {
            name: name.into(),
            sense,
            rows: Vec::new(),
            columns: Vec::new(),
            rhs: Vec::new(),
            bounds: Vec::new(),
            row_names: HashSet::new(),
            column_names: HashSet::new(),
        }
    }

    pub fn add_row(&mut self, name: impl Into<String>, kind: RowKind) -> Result<(), ModelError> {
        let name = name.into();
        if !self.row_names.insert(name.clone()) {
            return Err(ModelError::DuplicateRow(name));
        }
        self.rows.push(Row { name, kind });
        Ok(())
    }

    /// Add a decision variable. Column names must be unique within the model.
    pub fn add_column(&mut self, column: Column) -> Result<(), ModelError> {
        if !self.column_names.insert(column.name.clone()) {
            return Err(ModelError::DuplicateColumn(column.name));
        }
        self.columns.push(column);
        Ok(())
    }

    pub fn add_bound(&mut self, kind: BoundKind, set: impl Into<String>, column: impl Into<String>, value: f64) {
        self.bounds.push(Bound {
            kind,
            set: set.into(),
            column: column.into(),
            value,
        });
    }

    pub fn add_rhs(&mut self, set: impl Into<String>, row: impl Into<String>, value: f64) {
        self.rhs.push(RhsEntry {
            set: set.into(),
            row: row.into(),
            value,
        });
    }

    /// The first free row, which MPS readers take as the objective
    pub fn objective(&self) -> Option<&Row> {
        self.rows.iter().find(|r| r.kind == RowKind::Free)
    }

    pub fn row(&self, name: &str) -> Option<&Row> {
        self.rows.iter().find(|r| r.name == name)
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Bounds given for `column`, in declaration order
    pub fn bounds_of<'a>(&'a self, column: &'a str) -> impl Iterator<Item = &'a Bound> + 'a {
        self.bounds.iter().filter(move |b| b.column == column)
    }

    pub fn upper_bound(&self, column: &str) -> Option<f64> {
        self.bounds_of(column)
            .filter(|b| matches!(b.kind, BoundKind::Upper | BoundKind::Fixed))
            .map(|b| b.value)
            .last()
    }

    pub fn num_rows(&self) -> usize {
        self.rows.len()
    }

    pub fn num_columns(&self) -> usize {
        self.columns.len()
    }

    pub fn num_entries(&self) -> usize {
        self.columns.iter().map(|c| c.entries.len()).sum()
    }

    /// Check that every name referenced in COLUMNS, RHS and BOUNDS is declared
    pub fn validate(&self) -> Result<(), ModelError> {
        let objective = self
            .objective()
            .ok_or_else(|| ModelError::MissingObjective(self.name.clone()))?;

        for column in &self.columns {
            for e in &column.entries {
                if !self.row_names.contains(&e.row) {
                    return Err(ModelError::UnknownRow {
                        column: column.name.clone(),
                        row: e.row.clone(),
                    });
                }
            }
        }

        for r in &self.rhs {
            if !self.row_names.contains(&r.row) {
                return Err(ModelError::UnknownRhsRow(r.row.clone()));
            }
            if r.row == objective.name {
                return Err(ModelError::RhsOnObjective(r.row.clone()));
            }
        }

        for b in &self.bounds {
            if !self.column_names.contains(&b.column) {
                return Err(ModelError::UnknownBoundColumn(b.column.clone()));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_model() -> LpModel {
        let mut model = LpModel::new("TEST", Sense::Maximize);
        model.add_row("OBJ", RowKind::Free).unwrap();
        model.add_row("BAL", RowKind::Equal).unwrap();
        model
            .add_column(Column::new("X").entry("OBJ", 1.0).entry("BAL", -1.0))
            .unwrap();
        model
            .add_column(Column::new("Y").entry("BAL", 1.0))
            .unwrap();
        model.add_bound(BoundKind::Upper, "BND", "X", 10.0);
        model.add_bound(BoundKind::Lower, "BND", "X", 0.0);
        model
    }

    #[test]
    fn test_valid_model() {
        let model = small_model();
        assert_eq!(model.validate(), Ok(()));
        assert_eq!(model.num_rows(), 2);
        assert_eq!(model.num_columns(), 2);
        assert_eq!(model.num_entries(), 3);
        assert_eq!(model.objective().map(|r| r.name.as_str()), Some("OBJ"));
        assert_eq!(model.upper_bound("X"), Some(10.0));
        assert_eq!(model.upper_bound("Y"), None);
    }

    #[test]
    fn test_duplicate_names_rejected() {
        let mut model = small_model();
        assert_eq!(
            model.add_row("BAL", RowKind::Less),
            Err(ModelError::DuplicateRow("BAL".to_string()))
        );
        assert_eq!(
            model.add_column(Column::new("X")),
            Err(ModelError::DuplicateColumn("X".to_string()))
        );
        assert_eq!(model.num_columns(), 2);
    }

    #[test]
    fn test_undeclared_references() {
        let mut model = small_model();
        model.add_column(Column::new("Z").entry("NOPE", 1.0)).unwrap();
        assert!(matches!(model.validate(), Err(ModelError::UnknownRow { .. })));

        let mut model = small_model();
        model.add_bound(BoundKind::Upper, "BND", "W", 1.0);
        assert_eq!(model.validate(), Err(ModelError::UnknownBoundColumn("W".to_string())));

        let mut model = small_model();
        model.add_rhs("RHS1", "MISSING", 3.0);
        assert_eq!(model.validate(), Err(ModelError::UnknownRhsRow("MISSING".to_string())));

        let mut model = small_model();
        model.add_rhs("RHS1", "OBJ", 3.0);
        assert_eq!(model.validate(), Err(ModelError::RhsOnObjective("OBJ".to_string())));
    }

    #[test]
    fn test_missing_objective() {
        let mut model = LpModel::new("EMPTY", Sense::Minimize);
        model.add_row("C1", RowKind::Less).unwrap();
        assert_eq!(model.validate(), Err(ModelError::MissingObjective("EMPTY".to_string())));
    }

    #[test]
    fn test_column_coefficient_lookup() {
        let column = Column::new("X").entry("A", 1.0).entry("B", -1.0).entry("A", 2.0);
        assert_eq!(column.coefficient("A"), Some(3.0));
        assert_eq!(column.coefficient("B"), Some(-1.0));
        assert_eq!(column.coefficient("C"), None);
    }
}
