use std::collections::HashMap;

use anyhow::{Context, Result};

use super::model::{Table, Value};

/// Inner-join two tables on a key column, `df.merge(other, on=key)` style.
///
/// Output rows follow `left`'s order; each left row is paired with every
/// matching right row in `right`'s order. Columns are all of `left`'s
/// followed by `right`'s minus the key. A non-key column present on both
/// sides is renamed with an `_x` / `_y` suffix. Null keys never match.
pub fn inner_join(left: &Table, right: &Table, key: &str) -> Result<Table> {
    let left_key = left
        .column_index(key)
        .with_context(|| format!("left table has no '{key}' column"))?;
    let right_key = right
        .column_index(key)
        .with_context(|| format!("right table has no '{key}' column"))?;

    let right_cols: Vec<usize> = (0..right.width()).filter(|&i| i != right_key).collect();

    let mut columns: Vec<String> = left
        .columns
        .iter()
        .map(|c| {
            if c != key && right.column_index(c).is_some() {
                format!("{c}_x")
            } else {
                c.clone()
            }
        })
        .collect();
    columns.extend(right_cols.iter().map(|&i| {
        let c = &right.columns[i];
        if left.column_index(c).is_some() {
            format!("{c}_y")
        } else {
            c.clone()
        }
    }));

    let mut index: HashMap<&Value, Vec<usize>> = HashMap::new();
    for (i, row) in right.rows.iter().enumerate() {
        let k = &row[right_key];
        if !k.is_null() {
            index.entry(k).or_default().push(i);
        }
    }

    let mut joined = Table::new(columns);
    let mut unmatched = 0usize;
    for row in &left.rows {
        let Some(matches) = index.get(&row[left_key]) else {
            unmatched += 1;
            continue;
        };
        for &r in matches {
            let mut out = row.clone();
            out.extend(right_cols.iter().map(|&i| right.rows[r][i].clone()));
            joined.rows.push(out);
        }
    }

    if unmatched > 0 {
        log::warn!("{unmatched} left rows had no match on '{key}' and were dropped");
    }
    log::debug!(
        "joined {} x {} rows on '{key}' into {} rows",
        left.len(),
        right.len(),
        joined.len()
    );
    Ok(joined)
}
