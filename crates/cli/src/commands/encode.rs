use std::path::Path;

use basketry_core::TransactionSet;
use serde_json::Value;

use crate::commands::{read_json, to_value, CommandResult};

pub fn run(transactions: &Path) -> CommandResult {
    let outcome = read_json::<Vec<Value>>(transactions).and_then(|values| {
        let transactions = TransactionSet::from_values(&values)?;
        let matrix = transactions.one_hot();
        let message = format!(
            "encoded {} transaction(s) over {} item(s)",
            matrix.rows.len(),
            matrix.columns.len()
        );
        Ok((message, to_value(&matrix)?))
    });

    CommandResult::from_outcome("encode", outcome)
}
