//! Contract with the frequent-itemset miner.
//!
//! Rule generation happens outside this crate. `RuleSource` is the seam a
//! miner plugs into; `PrecomputedRules` serves rules that were mined
//! elsewhere and exported.

use crate::domain::rule::{AssociationRule, RuleMetric, RuleSet};
use crate::domain::transaction::TransactionSet;
use crate::errors::MiningError;

/// Minimum support and confidence a rule must reach, both in `(0, 1]`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MiningThresholds {
    min_support: f64,
    min_confidence: f64,
}

impl MiningThresholds {
    pub fn new(min_support: f64, min_confidence: f64) -> Result<Self, MiningError> {
        check_threshold("min_support", min_support)?;
        check_threshold("min_confidence", min_confidence)?;
        Ok(Self { min_support, min_confidence })
    }

    pub fn min_support(&self) -> f64 {
        self.min_support
    }

    pub fn min_confidence(&self) -> f64 {
        self.min_confidence
    }

    pub fn admits(&self, rule: &AssociationRule) -> bool {
        let metrics = rule.metrics();
        metrics.support >= self.min_support && metrics.confidence >= self.min_confidence
    }
}

fn check_threshold(name: &'static str, value: f64) -> Result<(), MiningError> {
    if value > 0.0 && value <= 1.0 {
        Ok(())
    } else {
        Err(MiningError::InvalidThreshold { name, value })
    }
}

/// Produces a rule set from a transaction corpus.
pub trait RuleSource: Send + Sync {
    fn rules(
        &self,
        transactions: &TransactionSet,
        thresholds: &MiningThresholds,
    ) -> Result<RuleSet, MiningError>;
}

/// Rules mined by an external tool, filtered by the requested thresholds.
///
/// Every offered rule must carry well-formed support and confidence.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PrecomputedRules {
    rules: RuleSet,
}

impl PrecomputedRules {
    pub fn new(rules: RuleSet) -> Self {
        Self { rules }
    }
}

impl RuleSource for PrecomputedRules {
    fn rules(
        &self,
        transactions: &TransactionSet,
        thresholds: &MiningThresholds,
    ) -> Result<RuleSet, MiningError> {
        for (index, rule) in self.rules.iter().enumerate() {
            for metric in [RuleMetric::Support, RuleMetric::Confidence] {
                rule.checked_metric(metric).map_err(|violation| violation.at(index))?;
            }
        }

        let universe = transactions.item_universe();
        let kept: RuleSet =
            self.rules.iter().filter(|rule| thresholds.admits(rule)).cloned().collect();

        if !transactions.is_empty() {
            for (index, rule) in kept.iter().enumerate() {
                let unknown = rule
                    .antecedents()
                    .iter()
                    .chain(rule.consequents())
                    .find(|item| !universe.contains(*item));
                if let Some(item) = unknown {
                    return Err(MiningError::UnknownItem { index, item: item.to_string() });
                }
            }
        }

        tracing::info!(
            event_name = "core.mining.rules_filtered",
            transactions = transactions.len(),
            universe_size = universe.len(),
            offered = self.rules.len(),
            kept = kept.len(),
            min_support = thresholds.min_support(),
            min_confidence = thresholds.min_confidence(),
            "precomputed rules filtered by thresholds"
        );

        Ok(kept)
    }
}
