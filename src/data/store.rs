use std::path::Path;

use anyhow::{Context, Result};
use rusqlite::types::{ToSqlOutput, Value as SqlValue};
use rusqlite::{Connection, ToSql, params_from_iter};

use super::model::{Table, Value};

/// Table name the cleaned dataset is written under.
pub const DEFAULT_TABLE: &str = "dftab";

impl ToSql for Value {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(match self {
            Value::String(s) => ToSqlOutput::from(s.as_str()),
            Value::Integer(i) => ToSqlOutput::from(*i),
            Value::Float(f) => ToSqlOutput::from(*f),
            Value::Bool(b) => ToSqlOutput::from(*b),
            Value::Null => ToSqlOutput::Owned(SqlValue::Null),
        })
    }
}

/// Quote an identifier for use in SQL.
fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// SQLite affinity for a column: INTEGER when every non-null cell is an
/// integer or bool, REAL when every non-null cell is numeric, else TEXT.
fn column_affinity<'a>(cells: impl Iterator<Item = &'a Value>) -> &'static str {
    let mut integral = true;
    let mut numeric = true;
    let mut any = false;
    for cell in cells {
        match cell {
            Value::Null => continue,
            Value::Integer(_) | Value::Bool(_) => {}
            Value::Float(_) => integral = false,
            Value::String(_) => {
                integral = false;
                numeric = false;
            }
        }
        any = true;
    }
    match (any, integral, numeric) {
        (false, _, _) => "TEXT",
        (true, true, _) => "INTEGER",
        (true, false, true) => "REAL",
        _ => "TEXT",
    }
}

/// Write `table` into the SQLite database at `path` as `name`, replacing any
/// existing table of that name. Runs in a single transaction, so a failed
/// write leaves the previous table in place. Returns the rows written.
pub fn save_table(table: &Table, path: &Path, name: &str) -> Result<usize> {
    let mut conn = Connection::open(path)
        .with_context(|| format!("opening database {}", path.display()))?;
    write_table(&mut conn, table, name)
}

/// Same as [`save_table`] on an already open connection.
pub fn write_table(conn: &mut Connection, table: &Table, name: &str) -> Result<usize> {
    let columns: Vec<String> = table
        .columns
        .iter()
        .enumerate()
        .map(|(i, col)| {
            let affinity = column_affinity(table.rows.iter().map(|r| &r[i]));
            format!("{} {affinity}", quote_ident(col))
        })
        .collect();

    let tx = conn.transaction().context("starting transaction")?;
    tx.execute(&format!("DROP TABLE IF EXISTS {}", quote_ident(name)), [])
        .context("dropping existing table")?;
    tx.execute(
        &format!("CREATE TABLE {} ({})", quote_ident(name), columns.join(", ")),
        [],
    )
    .context("creating table")?;

    {
        let placeholders = vec!["?"; table.width()].join(", ");
        let mut stmt = tx
            .prepare(&format!(
                "INSERT INTO {} VALUES ({placeholders})",
                quote_ident(name)
            ))
            .context("preparing insert")?;
        for (i, row) in table.rows.iter().enumerate() {
            stmt.execute(params_from_iter(row.iter()))
                .with_context(|| format!("inserting row {i}"))?;
        }
    }

    tx.commit().context("committing transaction")?;
    log::info!("wrote {} rows to table '{name}'", table.len());
    Ok(table.len())
}
