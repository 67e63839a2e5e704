use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::fmt;

use anyhow::{Result, bail};

// ---------------------------------------------------------------------------
// Value – a single cell of a table
// ---------------------------------------------------------------------------

/// A dynamically-typed cell mirroring common Pandas dtypes.
///
/// Tables are deduplicated through hashing and genre values are collected
/// into `BTreeSet`s, so `Value` must be `Eq + Ord + Hash`. Floats compare
/// with `total_cmp`, which makes `NaN == NaN` for dedup purposes.
#[derive(Debug, Clone)]
pub enum Value {
    String(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    Null,
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Value {}

impl PartialOrd for Value {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Value {
    fn cmp(&self, other: &Self) -> Ordering {
        use Value::*;
        fn discriminant(v: &Value) -> u8 {
            match v {
                Null => 0,
                Bool(_) => 1,
                Integer(_) => 2,
                Float(_) => 3,
                String(_) => 4,
            }
        }
        let da = discriminant(self);
        let db = discriminant(other);
        if da != db {
            return da.cmp(&db);
        }
        match (self, other) {
            (Bool(a), Bool(b)) => a.cmp(b),
            (Integer(a), Integer(b)) => a.cmp(b),
            (Float(a), Float(b)) => a.total_cmp(b),
            (String(a), String(b)) => a.cmp(b),
            _ => Ordering::Equal,
        }
    }
}

impl std::hash::Hash for Value {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            Value::String(s) => s.hash(state),
            Value::Integer(i) => i.hash(state),
            Value::Float(f) => f.to_bits().hash(state),
            Value::Bool(b) => b.hash(state),
            Value::Null => {}
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::String(s) => write!(f, "{s}"),
            Value::Integer(i) => write!(f, "{i}"),
            Value::Float(v) => write!(f, "{v}"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Null => write!(f, "<null>"),
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

impl Value {
    /// Type a whole column of raw text cells at once, the way `pd.read_csv`
    /// does: Integer if every non-empty cell parses as `i64`, else Float,
    /// else Bool (`true`/`false`), else every cell stays the exact string.
    /// Empty cells are `Null` whatever the column type.
    pub fn parse_column(cells: &[&str]) -> Vec<Value> {
        enum Kind {
            Integer,
            Float,
            Bool,
            Text,
        }

        let filled = || cells.iter().filter(|c| !c.is_empty());
        let kind = if filled().all(|c| c.parse::<i64>().is_ok()) {
            Kind::Integer
        } else if filled().all(|c| c.parse::<f64>().is_ok()) {
            Kind::Float
        } else if filled().all(|c| *c == "true" || *c == "false") {
            Kind::Bool
        } else {
            Kind::Text
        };

        cells
            .iter()
            .map(|&c| match kind {
                _ if c.is_empty() => Value::Null,
                Kind::Integer => c.parse().map(Value::Integer).unwrap_or(Value::Null),
                Kind::Float => c.parse().map(Value::Float).unwrap_or(Value::Null),
                Kind::Bool => Value::Bool(c == "true"),
                Kind::Text => Value::String(c.to_string()),
            })
            .collect()
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Integer(i) => Some(*i),
            Value::Bool(b) => Some(*b as i64),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Table – an in-memory, row-major data frame
// ---------------------------------------------------------------------------

/// Ordered column names plus row-major cells. Every row has exactly
/// `columns.len()` values.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Value>>,
}

impl Table {
    pub fn new(columns: Vec<String>) -> Self {
        Table {
            columns,
            rows: Vec::new(),
        }
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Number of columns.
    pub fn width(&self) -> usize {
        self.columns.len()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Append a row, rejecting rows of the wrong width.
    pub fn push_row(&mut self, row: Vec<Value>) -> Result<()> {
        if row.len() != self.width() {
            bail!(
                "row has {} values but the table has {} columns",
                row.len(),
                self.width()
            );
        }
        self.rows.push(row);
        Ok(())
    }

    /// Iterate over the cells of one column, top to bottom.
    pub fn column_values(&self, name: &str) -> Option<impl Iterator<Item = &Value> + '_> {
        let idx = self.column_index(name)?;
        Some(self.rows.iter().map(move |r| &r[idx]))
    }

    /// Sorted set of the distinct values in a column.
    pub fn unique_values(&self, name: &str) -> Option<BTreeSet<Value>> {
        self.column_values(name).map(|vals| vals.cloned().collect())
    }

    /// Remove a column, returning its cells in row order.
    pub fn drop_column(&mut self, name: &str) -> Option<Vec<Value>> {
        let idx = self.column_index(name)?;
        self.columns.remove(idx);
        Some(self.rows.iter_mut().map(|r| r.remove(idx)).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Table {
        let mut t = Table::new(vec!["id".into(), "genre".into()]);
        t.push_row(vec![1i64.into(), "news".into()]).unwrap();
        t.push_row(vec![2i64.into(), "direct".into()]).unwrap();
        t.push_row(vec![3i64.into(), "news".into()]).unwrap();
        t
    }

    #[test]
    fn column_types_follow_every_cell() {
        assert_eq!(
            Value::parse_column(&["2", "", "12"]),
            vec![Value::Integer(2), Value::Null, Value::Integer(12)]
        );
        assert_eq!(
            Value::parse_column(&["1", "1.5"]),
            vec![Value::Float(1.0), Value::Float(1.5)]
        );
        assert_eq!(
            Value::parse_column(&["true", "false"]),
            vec![Value::Bool(true), Value::Bool(false)]
        );
    }

    #[test]
    fn text_column_keeps_exact_strings() {
        let cells = Value::parse_column(&["Help", "007", "1.50", "true", "inf", ""]);
        let text: Vec<Option<&str>> = cells.iter().map(Value::as_str).collect();
        assert_eq!(
            text,
            vec![Some("Help"), Some("007"), Some("1.50"), Some("true"), Some("inf"), None]
        );
        assert_eq!(cells[5], Value::Null);
    }

    #[test]
    fn nan_is_equal_to_itself() {
        assert_eq!(Value::Float(f64::NAN), Value::Float(f64::NAN));
    }

    #[test]
    fn push_row_rejects_wrong_width() {
        let mut t = sample();
        assert!(t.push_row(vec![4i64.into()]).is_err());
        assert_eq!(t.len(), 3);
    }

    #[test]
    fn unique_values_are_sorted() {
        let t = sample();
        let genres: Vec<Value> = t.unique_values("genre").unwrap().into_iter().collect();
        assert_eq!(genres, vec![Value::from("direct"), Value::from("news")]);
        assert!(t.unique_values("missing").is_none());
    }

    #[test]
    fn drop_column_returns_cells() {
        let mut t = sample();
        let dropped = t.drop_column("id").unwrap();
        assert_eq!(dropped, vec![Value::from(1i64), Value::from(2i64), Value::from(3i64)]);
        assert_eq!(t.columns, vec!["genre".to_string()]);
        assert!(t.rows.iter().all(|r| r.len() == 1));
    }
}
