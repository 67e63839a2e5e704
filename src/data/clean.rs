use std::collections::HashSet;

use thiserror::Error;

use super::model::{Table, Value};

/// Column holding the compound `"name-0;name-1;..."` category string.
pub const CATEGORIES_COLUMN: &str = "categories";
/// Column holding the channel a message came from.
pub const GENRE_COLUMN: &str = "genre";

/// Failures raised while reshaping the merged table.
#[derive(Debug, Error, PartialEq)]
pub enum CleanError {
    #[error("missing '{0}' column")]
    MissingColumn(String),
    #[error("row {row}: malformed category '{part}', expected '<name>-<digit>'")]
    MalformedCategory { row: usize, part: String },
    #[error("row {row}: expected {expected} categories but found {found}")]
    CategoryCountMismatch {
        row: usize,
        expected: usize,
        found: usize,
    },
    #[error("row {row}: expected category '{expected}' but found '{found}'")]
    CategoryLabelMismatch {
        row: usize,
        expected: String,
        found: String,
    },
    #[error("row {row}: category '{label}' has value {value}, expected 0 or 1")]
    CategoryValueOutOfRange { row: usize, label: String, value: u32 },
    #[error("derived column '{0}' collides with an existing column")]
    DuplicateColumn(String),
}

/// Knobs for [`clean`].
#[derive(Debug, Clone, Copy, Default)]
pub struct CleanOptions {
    /// Map category values above 1 to 1 instead of failing.
    pub binarize: bool,
}

/// Split one `"<name>-<digit>"` part into its label and value.
fn parse_part(row: usize, part: &str) -> Result<(&str, u32), CleanError> {
    let malformed = || CleanError::MalformedCategory {
        row,
        part: part.to_string(),
    };
    let (label, digit) = part.rsplit_once('-').ok_or_else(malformed)?;
    let mut chars = digit.chars();
    let value = match (chars.next(), chars.next()) {
        (Some(c), None) => c.to_digit(10).ok_or_else(malformed)?,
        _ => return Err(malformed()),
    };
    if label.is_empty() {
        return Err(malformed());
    }
    Ok((label, value))
}

/// Expand the `categories` column into one 0/1 integer column per label.
///
/// Labels come from the first row; every other row must carry the same
/// labels in the same order. The raw column is dropped and the new columns
/// are appended on the right.
pub fn split_categories(table: &mut Table, options: CleanOptions) -> Result<(), CleanError> {
    let raw = table
        .drop_column(CATEGORIES_COLUMN)
        .ok_or_else(|| CleanError::MissingColumn(CATEGORIES_COLUMN.to_string()))?;

    let mut labels: Vec<String> = Vec::new();
    let mut derived = Vec::with_capacity(raw.len());

    for (row, cell) in raw.iter().enumerate() {
        let text = cell.as_str().ok_or_else(|| CleanError::MalformedCategory {
            row,
            part: cell.to_string(),
        })?;
        let parts: Vec<&str> = text.split(';').collect();

        if row == 0 {
            for part in &parts {
                let (label, _) = parse_part(row, part)?;
                labels.push(label.to_string());
            }
        } else if parts.len() != labels.len() {
            return Err(CleanError::CategoryCountMismatch {
                row,
                expected: labels.len(),
                found: parts.len(),
            });
        }

        let mut values = Vec::with_capacity(parts.len());
        for (part, expected) in parts.iter().zip(&labels) {
            let (label, value) = parse_part(row, part)?;
            if label != expected.as_str() {
                return Err(CleanError::CategoryLabelMismatch {
                    row,
                    expected: expected.clone(),
                    found: label.to_string(),
                });
            }
            let value = match value {
                0 | 1 => value,
                _ if options.binarize => 1,
                _ => {
                    return Err(CleanError::CategoryValueOutOfRange {
                        row,
                        label: label.to_string(),
                        value,
                    });
                }
            };
            values.push(Value::Integer(value as i64));
        }
        derived.push(values);
    }

    for label in &labels {
        if table.column_index(label).is_some() {
            return Err(CleanError::DuplicateColumn(label.clone()));
        }
    }
    if let Some(dup) = first_duplicate(&labels) {
        return Err(CleanError::DuplicateColumn(dup.to_string()));
    }

    log::debug!("split '{CATEGORIES_COLUMN}' into {} columns", labels.len());
    table.columns.extend(labels);
    for (row, values) in table.rows.iter_mut().zip(derived) {
        row.extend(values);
    }
    Ok(())
}

fn first_duplicate(labels: &[String]) -> Option<&str> {
    let mut seen = HashSet::new();
    labels
        .iter()
        .find(|l| !seen.insert(l.as_str()))
        .map(|l| l.as_str())
}

/// Remove rows identical across every column, keeping the first occurrence.
/// Returns the number of rows removed.
pub fn drop_duplicates(table: &mut Table) -> usize {
    let before = table.len();
    let mut seen: HashSet<Vec<Value>> = HashSet::with_capacity(before);
    table.rows.retain(|row| seen.insert(row.clone()));
    before - table.len()
}

/// Replace `genre` with one indicator column per distinct non-null value,
/// sorted by value and appended on the right. A null genre yields all zeros.
pub fn one_hot_genre(table: &mut Table) -> Result<(), CleanError> {
    let missing = || CleanError::MissingColumn(GENRE_COLUMN.to_string());
    let distinct: Vec<Value> = table
        .unique_values(GENRE_COLUMN)
        .ok_or_else(missing)?
        .into_iter()
        .filter(|g| !g.is_null())
        .collect();
    let genres = table.drop_column(GENRE_COLUMN).ok_or_else(missing)?;

    let names: Vec<String> = distinct.iter().map(|g| g.to_string()).collect();
    for name in &names {
        if table.column_index(name).is_some() {
            return Err(CleanError::DuplicateColumn(name.clone()));
        }
    }
    if let Some(dup) = first_duplicate(&names) {
        return Err(CleanError::DuplicateColumn(dup.to_string()));
    }

    for (row, genre) in table.rows.iter_mut().zip(&genres) {
        row.extend(
            distinct
                .iter()
                .map(|g| Value::Integer((g == genre) as i64)),
        );
    }
    log::debug!("one-hot encoded '{GENRE_COLUMN}' into {names:?}");
    table.columns.extend(names);
    Ok(())
}

/// Full cleaning pass: split categories, drop duplicates, one-hot genre.
pub fn clean(table: &mut Table, options: CleanOptions) -> Result<(), CleanError> {
    split_categories(table, options)?;
    let removed = drop_duplicates(table);
    if removed > 0 {
        log::info!("dropped {removed} duplicate rows");
    }
    one_hot_genre(table)
}
