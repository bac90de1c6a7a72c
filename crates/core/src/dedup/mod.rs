//! Duplicate row removal
//!
//! A row is a duplicate when every cell equals the cell of an earlier row.
//! The first occurrence is always the one kept.

mod table;

use std::collections::HashSet;

use serde::Serialize;

pub use table::{Cell, Row, Table, TableRecord};

/// Outcome of `deduplicate`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct DeduplicationReport {
    pub duplicates_before: usize,
    pub duplicates_after: usize,
    pub table: Table,
}

/// `true` for every row that repeats an earlier row.
pub fn duplicate_mask(table: &Table) -> Vec<bool> {
    let mut seen: HashSet<&Row> = HashSet::with_capacity(table.len());
    table.rows().iter().map(|row| !seen.insert(row)).collect()
}

pub fn count_duplicates(table: &Table) -> usize {
    duplicate_mask(table).into_iter().filter(|duplicate| *duplicate).count()
}

/// Copy of `table` keeping the first occurrence of each distinct row.
pub fn drop_duplicates(table: &Table) -> Table {
    let mut seen: HashSet<&Row> = HashSet::with_capacity(table.len());
    let rows = table.rows().iter().filter(|row| seen.insert(*row)).cloned().collect();
    table.with_rows(rows)
}

/// Counts duplicates, removes them and recounts on the cleaned table.
pub fn deduplicate(table: &Table) -> DeduplicationReport {
    let duplicates_before = count_duplicates(table);
    let cleaned = drop_duplicates(table);
    let duplicates_after = count_duplicates(&cleaned);

    if duplicates_after != 0 {
        tracing::error!(
            event_name = "core.dedup.invariant_violated",
            duplicates_after,
            "cleaned table still contains duplicate rows"
        );
    }

    tracing::info!(
        event_name = "core.dedup.completed",
        rows_before = table.len(),
        rows_after = cleaned.len(),
        duplicates_before,
        duplicates_after,
        "duplicate rows removed"
    );

    DeduplicationReport { duplicates_before, duplicates_after, table: cleaned }
}
