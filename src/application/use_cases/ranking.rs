use std::cmp::Ordering;

use crate::domain::analytics::{RankDirection, RankedRow};
use crate::domain::error::{AppError, Result};
use crate::domain::table::Table;

/// First `count` rows ordered by `column`, descending for `Top` and
/// ascending for `Bottom`.
///
/// Rows whose value is not coercible always sort last; equal values keep
/// their table order. `count` larger than the table returns every row.
pub fn rank_rows(
    table: &Table,
    column: &str,
    direction: RankDirection,
    count: usize,
) -> Result<Vec<RankedRow>> {
    if count == 0 {
        return Err(AppError::ValidationError(
            "Ranking count must be at least 1".to_string(),
        ));
    }
    let idx = table.require_column(column)?;

    let mut keyed: Vec<(usize, Option<f64>)> = table
        .rows()
        .iter()
        .enumerate()
        .map(|(row_index, row)| (row_index, row.get(idx).and_then(|c| c.as_number())))
        .collect();

    // sort_by is stable
    keyed.sort_by(|(_, a), (_, b)| match (a, b) {
        (Some(a), Some(b)) => match direction {
            RankDirection::Top => b.total_cmp(a),
            RankDirection::Bottom => a.total_cmp(b),
        },
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    });

    Ok(keyed
        .into_iter()
        .take(count)
        .enumerate()
        .map(|(position, (row_index, _))| RankedRow {
            rank: position + 1,
            row_index,
            row: table.rows()[row_index].clone(),
        })
        .collect())
}
