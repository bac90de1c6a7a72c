use std::fs;
use std::path::Path;

use basketry_core::errors::ApplicationError;
use basketry_core::{deduplicate, Table, TableRecord};
use serde_json::{json, Value};

use crate::commands::{read_json, to_value, CommandResult};

pub fn run(input: &Path, output: Option<&Path>) -> CommandResult {
    CommandResult::from_outcome("dedupe", dedupe(input, output))
}

fn dedupe(input: &Path, output: Option<&Path>) -> Result<(String, Value), ApplicationError> {
    let record: TableRecord = read_json(input)?;
    let table = Table::from_record(record)?;
    let report = deduplicate(&table);

    let message = format!(
        "removed {} duplicate row(s); {} row(s) remain",
        report.duplicates_before,
        report.table.len()
    );

    let mut data = json!({
        "rows_before": table.len(),
        "rows_after": report.table.len(),
        "duplicates_before": report.duplicates_before,
        "duplicates_after": report.duplicates_after,
    });

    match output {
        Some(path) => {
            write_table(path, &report.table)?;
            data["output"] = Value::String(path.display().to_string());
        }
        None => data["table"] = to_value(&report.table)?,
    }

    Ok((message, data))
}

fn write_table(path: &Path, table: &Table) -> Result<(), ApplicationError> {
    let rendered = serde_json::to_string_pretty(table)
        .map_err(|error| ApplicationError::Input(format!("could not encode table: {error}")))?;
    fs::write(path, rendered).map_err(|error| {
        ApplicationError::Input(format!("could not write `{}`: {error}", path.display()))
    })
}
