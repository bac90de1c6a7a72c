use std::path::Path;

use basketry_core::{antecedent_items, RuleRecord, RuleSet};
use serde_json::json;

use crate::commands::{read_json, CommandResult};

pub fn run(rules: &Path) -> CommandResult {
    let outcome = read_json::<Vec<RuleRecord>>(rules).and_then(|records| {
        let rules = RuleSet::from_records(&records)?;
        let items = antecedent_items(&rules)?;
        let message = format!("listed {} antecedent item(s)", items.len());
        Ok((message, json!({ "antecedents": items })))
    });

    CommandResult::from_outcome("antecedents", outcome)
}
