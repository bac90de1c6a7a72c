use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::item::{item_set_from_value, json_kind, ItemSet};
use crate::errors::{InvalidRuleError, RuleField, RuleViolation};

/// Metrics reported by the upstream miner. They are carried through for
/// caller-side ranking and threshold filtering only.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct RuleMetrics {
    pub support: f64,
    pub confidence: f64,
    pub lift: f64,
}

impl Default for RuleMetrics {
    fn default() -> Self {
        Self { support: 0.0, confidence: 1.0, lift: 1.0 }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleMetric {
    Support,
    Confidence,
    Lift,
}

impl RuleMetric {
    pub fn value(&self, rule: &AssociationRule) -> f64 {
        self.of(&rule.metrics)
    }

    pub fn field(&self) -> RuleField {
        match self {
            Self::Support => RuleField::Support,
            Self::Confidence => RuleField::Confidence,
            Self::Lift => RuleField::Lift,
        }
    }

    fn of(&self, metrics: &RuleMetrics) -> f64 {
        match self {
            Self::Support => metrics.support,
            Self::Confidence => metrics.confidence,
            Self::Lift => metrics.lift,
        }
    }

    /// Support and confidence are probabilities; lift is finite and non-negative.
    fn check(&self, metrics: &RuleMetrics) -> Option<RuleViolation> {
        let value = self.of(metrics);
        match self {
            Self::Support | Self::Confidence if !(0.0..=1.0).contains(&value) => Some(
                RuleViolation::new(self.field(), format!("must be in range 0..=1, got {value}")),
            ),
            Self::Lift if !value.is_finite() || value < 0.0 => Some(RuleViolation::new(
                self.field(),
                format!("must be a finite non-negative number, got {value}"),
            )),
            _ => None,
        }
    }
}

impl std::str::FromStr for RuleMetric {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "support" => Ok(Self::Support),
            "confidence" => Ok(Self::Confidence),
            "lift" => Ok(Self::Lift),
            other => {
                Err(format!("unsupported rule metric `{other}` (expected support|confidence|lift)"))
            }
        }
    }
}

/// `antecedents -> consequents` with the metrics it was mined with.
///
/// Metrics are not needed to propose a bundle, so a bad metric does not
/// reject the rule. It is recorded and reported by `checked_metric` when a
/// caller ranks or filters on it.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct AssociationRule {
    antecedents: ItemSet,
    consequents: ItemSet,
    #[serde(flatten)]
    metrics: RuleMetrics,
    #[serde(skip)]
    metric_issues: Vec<RuleViolation>,
}

impl AssociationRule {
    pub fn new(
        antecedents: ItemSet,
        consequents: ItemSet,
        metrics: RuleMetrics,
    ) -> Result<Self, RuleViolation> {
        if antecedents.is_empty() {
            return Err(RuleViolation::new(RuleField::Antecedents, "must not be empty"));
        }
        if consequents.is_empty() {
            return Err(RuleViolation::new(RuleField::Consequents, "must not be empty"));
        }
        if let Some(shared) = antecedents.intersection(&consequents).next() {
            return Err(RuleViolation::new(
                RuleField::Consequents,
                format!("repeats antecedent item `{shared}`"),
            ));
        }

        let metric_issues = [RuleMetric::Support, RuleMetric::Confidence, RuleMetric::Lift]
            .iter()
            .filter_map(|metric| metric.check(&metrics))
            .collect();

        Ok(Self { antecedents, consequents, metrics, metric_issues })
    }

    pub fn antecedents(&self) -> &ItemSet {
        &self.antecedents
    }

    pub fn consequents(&self) -> &ItemSet {
        &self.consequents
    }

    pub fn metrics(&self) -> RuleMetrics {
        self.metrics
    }

    /// The value of `metric`, or the problem found when the rule was read.
    pub fn checked_metric(&self, metric: RuleMetric) -> Result<f64, RuleViolation> {
        match self.metric_issues.iter().find(|issue| issue.field == metric.field()) {
            Some(issue) => Err(issue.clone()),
            None => Ok(metric.value(self)),
        }
    }

    pub fn has_valid_metrics(&self) -> bool {
        self.metric_issues.is_empty()
    }
}

/// Untyped rule as exported by a mining tool. Missing fields decode as
/// `null` so validation can name them.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RuleRecord {
    #[serde(default)]
    pub antecedents: Value,
    #[serde(default)]
    pub consequents: Value,
    #[serde(default)]
    pub support: Value,
    #[serde(default)]
    pub confidence: Value,
    #[serde(default)]
    pub lift: Value,
}

impl RuleRecord {
    /// Only the item sets can reject a record. A metric that is not a number
    /// decodes to its default and stays flagged on the rule.
    pub fn to_rule(&self) -> Result<AssociationRule, RuleViolation> {
        let antecedents = item_set_from_value(&self.antecedents)
            .map_err(|reason| RuleViolation::new(RuleField::Antecedents, reason))?;
        let consequents = item_set_from_value(&self.consequents)
            .map_err(|reason| RuleViolation::new(RuleField::Consequents, reason))?;

        let defaults = RuleMetrics::default();
        let mut type_issues = Vec::new();
        let mut decode = |field: RuleField, value: &Value, default: f64| {
            metric_from_value(field, value, default).unwrap_or_else(|violation| {
                type_issues.push(violation);
                default
            })
        };
        let metrics = RuleMetrics {
            support: decode(RuleField::Support, &self.support, defaults.support),
            confidence: decode(RuleField::Confidence, &self.confidence, defaults.confidence),
            lift: decode(RuleField::Lift, &self.lift, defaults.lift),
        };

        let mut rule = AssociationRule::new(antecedents, consequents, metrics)?;
        rule.metric_issues.extend(type_issues);
        Ok(rule)
    }
}

fn metric_from_value(field: RuleField, value: &Value, default: f64) -> Result<f64, RuleViolation> {
    match value {
        Value::Null => Ok(default),
        Value::Number(number) => number
            .as_f64()
            .ok_or_else(|| RuleViolation::new(field, "is not representable as a float")),
        other => {
            Err(RuleViolation::new(field, format!("expected a number, got {}", json_kind(other))))
        }
    }
}

/// Rules in mining output order.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct RuleSet {
    rules: Vec<AssociationRule>,
}

impl RuleSet {
    pub fn new(rules: Vec<AssociationRule>) -> Self {
        Self { rules }
    }

    pub fn from_records(records: &[RuleRecord]) -> Result<Self, InvalidRuleError> {
        records
            .iter()
            .enumerate()
            .map(|(index, record)| record.to_rule().map_err(|violation| violation.at(index)))
            .collect::<Result<Vec<_>, _>>()
            .map(Self::new)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, AssociationRule> {
        self.rules.iter()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Returns a copy ranked by `metric`, highest first. Equal values keep
    /// their mining order. Fails on the first rule whose `metric` is malformed.
    pub fn sorted_by(&self, metric: RuleMetric) -> Result<Self, InvalidRuleError> {
        let mut keyed = self
            .rules
            .iter()
            .enumerate()
            .map(|(index, rule)| {
                rule.checked_metric(metric)
                    .map(|value| (value, rule.clone()))
                    .map_err(|violation| violation.at(index))
            })
            .collect::<Result<Vec<_>, _>>()?;
        keyed.sort_by(|(left, _), (right, _)| right.total_cmp(left));

        Ok(Self { rules: keyed.into_iter().map(|(_, rule)| rule).collect() })
    }
}

impl FromIterator<AssociationRule> for RuleSet {
    fn from_iter<I: IntoIterator<Item = AssociationRule>>(iter: I) -> Self {
        Self { rules: iter.into_iter().collect() }
    }
}

impl<'a> IntoIterator for &'a RuleSet {
    type Item = &'a AssociationRule;
    type IntoIter = std::slice::Iter<'a, AssociationRule>;

    fn into_iter(self) -> Self::IntoIter {
        self.rules.iter()
    }
}
