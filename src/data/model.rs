use std::collections::BTreeSet;
use std::fmt;

// ---------------------------------------------------------------------------
// Value – a single cell of the table
// ---------------------------------------------------------------------------

/// A dynamically-typed cell mirroring the dtypes a CSV column can infer to.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    String(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    Null,
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::String(s) => write!(f, "{s}"),
            Value::Integer(i) => write!(f, "{i}"),
            Value::Float(v) => write!(f, "{v:.2}"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Null => write!(f, "<null>"),
        }
    }
}

impl Value {
    /// Interpret the value as an `f64`. Booleans, strings and nulls are not numeric.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Float(v) => Some(*v),
            Value::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Text of the cell without display rounding, used as a grouping key.
    pub fn label(&self) -> String {
        match self {
            Value::String(s) => s.clone(),
            Value::Float(v) => v.to_string(),
            other => other.to_string(),
        }
    }

    pub fn is_null(&self) -> bool {
        match self {
            Value::Null => true,
            Value::Float(v) => v.is_nan(),
            _ => false,
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Integer(i)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

// ---------------------------------------------------------------------------
// Table – ordered columns, ordered rows
// ---------------------------------------------------------------------------

/// An ordered collection of rows sharing one column set.
///
/// Every row holds exactly `columns.len()` cells; [`Table::push_row`] pads or
/// truncates to keep that true.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Vec<Value>>,
}

impl Table {
    pub fn new(columns: Vec<String>) -> Self {
        Table {
            columns,
            rows: Vec::new(),
        }
    }

    /// Build a table from rows, normalising each row to the column count.
    pub fn from_rows(columns: Vec<String>, rows: Vec<Vec<Value>>) -> Self {
        let mut table = Table::new(columns);
        for row in rows {
            table.push_row(row);
        }
        table
    }

    pub fn push_row(&mut self, mut row: Vec<Value>) {
        row.resize(self.columns.len(), Value::Null);
        self.rows.push(row);
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn rows(&self) -> impl Iterator<Item = &[Value]> {
        self.rows.iter().map(Vec::as_slice)
    }

    pub fn row(&self, index: usize) -> Option<&[Value]> {
        self.rows.get(index).map(Vec::as_slice)
    }

    /// Cell at `row` in the named column.
    pub fn get(&self, row: usize, column: &str) -> Option<&Value> {
        let col = self.column_index(column)?;
        self.rows.get(row).and_then(|r| r.get(col))
    }

    /// Numeric view of one column; `None` when the column is absent.
    /// Non-numeric cells come through as `None` entries.
    pub fn numeric_column(&self, column: &str) -> Option<Vec<Option<f64>>> {
        let col = self.column_index(column)?;
        Some(self.rows.iter().map(|r| r[col].as_f64()).collect())
    }

    /// Sorted distinct string values of a column (feeds the multiselect widgets).
    pub fn unique_strings(&self, column: &str) -> BTreeSet<String> {
        let Some(col) = self.column_index(column) else {
            return BTreeSet::new();
        };
        self.rows
            .iter()
            .filter_map(|r| r[col].as_str())
            .map(str::to_string)
            .collect()
    }

    /// New table with the given rows, in the given order, and every column.
    pub fn select_rows(&self, indices: &[usize]) -> Table {
        Table {
            columns: self.columns.clone(),
            rows: indices
                .iter()
                .filter_map(|&i| self.rows.get(i).cloned())
                .collect(),
        }
    }

    // -- Schema mutation, used while normalising a freshly loaded table --

    pub fn rename_column(&mut self, index: usize, name: &str) {
        if let Some(c) = self.columns.get_mut(index) {
            *c = name.to_string();
        }
    }

    /// Apply `f` to every column name.
    pub fn map_column_names(&mut self, f: impl Fn(&str) -> String) {
        for c in &mut self.columns {
            *c = f(c);
        }
    }

    /// Keep only the first occurrence of every column name.
    pub fn drop_duplicate_columns(&mut self) {
        let mut seen = BTreeSet::new();
        let keep: Vec<bool> = self
            .columns
            .iter()
            .map(|c| seen.insert(c.clone()))
            .collect();
        if keep.iter().all(|&k| k) {
            return;
        }

        let mut flags = keep.iter();
        self.columns.retain(|_| *flags.next().unwrap_or(&true));
        for row in &mut self.rows {
            let mut flags = keep.iter();
            row.retain(|_| *flags.next().unwrap_or(&true));
        }
    }

    /// Set a column computed row by row from the existing cells, replacing
    /// it when the name already exists and appending it otherwise.
    pub fn set_column_with(&mut self, name: &str, f: impl Fn(&[Value]) -> Value) {
        match self.column_index(name) {
            Some(col) => {
                for row in &mut self.rows {
                    let v = f(row);
                    row[col] = v;
                }
            }
            None => {
                for row in &mut self.rows {
                    let v = f(row);
                    row.push(v);
                }
                self.columns.push(name.to_string());
            }
        }
    }

    /// Replace every null (and NaN) cell with `fill`.
    pub fn fill_nulls(&mut self, fill: &Value) {
        for cell in self.rows.iter_mut().flatten() {
            if cell.is_null() {
                *cell = fill.clone();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Table {
        Table::from_rows(
            vec!["a".into(), "b".into(), "a".into()],
            vec![
                vec![Value::from("x"), Value::Integer(1), Value::Integer(9)],
                vec![Value::from("y"), Value::Null],
            ],
        )
    }

    #[test]
    fn short_rows_are_padded_with_null() {
        let t = sample();
        assert_eq!(t.row(1).map(<[Value]>::len), Some(3));
        assert_eq!(t.get(1, "b"), Some(&Value::Null));
    }

    #[test]
    fn duplicate_columns_keep_first_occurrence() {
        let mut t = sample();
        t.drop_duplicate_columns();
        assert_eq!(t.columns(), ["a", "b"]);
        assert_eq!(t.row(0), Some(&[Value::from("x"), Value::Integer(1)][..]));
    }

    #[test]
    fn label_keeps_full_float_precision() {
        assert_eq!(Value::Float(1.499).to_string(), "1.50");
        assert_eq!(Value::Float(1.499).label(), "1.499");
        assert_eq!(Value::Integer(7).label(), "7");
        assert_eq!(Value::from("Chad").label(), "Chad");
    }

    #[test]
    fn fill_nulls_replaces_nan_too() {
        let mut t = Table::from_rows(
            vec!["v".into()],
            vec![vec![Value::Float(f64::NAN)], vec![Value::Null], vec![Value::Integer(3)]],
        );
        t.fill_nulls(&Value::Integer(0));
        let vals = t.numeric_column("v").unwrap();
        assert_eq!(vals, vec![Some(0.0), Some(0.0), Some(3.0)]);
    }

    #[test]
    fn select_rows_keeps_columns_and_order() {
        let t = sample();
        let sel = t.select_rows(&[1, 0, 7]);
        assert_eq!(sel.columns(), t.columns());
        assert_eq!(sel.len(), 2);
        assert_eq!(sel.get(0, "b"), Some(&Value::Null));
    }

    #[test]
    fn unique_strings_skips_non_strings() {
        let t = Table::from_rows(
            vec!["c".into()],
            vec![
                vec![Value::from("b")],
                vec![Value::Integer(0)],
                vec![Value::from("a")],
                vec![Value::from("b")],
            ],
        );
        let u: Vec<_> = t.unique_strings("c").into_iter().collect();
        assert_eq!(u, vec!["a", "b"]);
        assert!(t.unique_strings("missing").is_empty());
    }
}
