use std::path::Path;

use basketry_core::config::LoadOptions;
use basketry_core::{PrecomputedRules, RuleRecord, RuleSet, RuleSource, TransactionSet};
use serde_json::{json, Value};

use crate::commands::{load_config, read_json, CommandResult};

/// Applies the configured thresholds to externally mined rules.
pub fn run(rules: &Path, transactions: &Path, options: LoadOptions) -> CommandResult {
    let outcome = load_config(options).and_then(|config| {
        let thresholds = config.mining.thresholds()?;
        let records: Vec<RuleRecord> = read_json(rules)?;
        let offered = RuleSet::from_records(&records)?;
        let corpus = TransactionSet::from_values(&read_json::<Vec<Value>>(transactions)?)?;

        let offered_count = offered.len();
        let kept = PrecomputedRules::new(offered).rules(&corpus, &thresholds)?;
        let message = format!("kept {} of {offered_count} rule(s)", kept.len());
        let data = json!({
            "min_support": thresholds.min_support(),
            "min_confidence": thresholds.min_confidence(),
            "rules": kept,
        });
        Ok((message, data))
    });

    CommandResult::from_outcome("mine", outcome)
}
