//! Bundle proposal over an ordered rule set

use std::collections::HashSet;

use serde_json::Value;

use super::types::{BundleLimit, BundleProposal};
use crate::config::RecommenderConfig;
use crate::domain::cart::Cart;
use crate::domain::item::ItemId;
use crate::domain::rule::{RuleMetric, RuleRecord, RuleSet};
use crate::errors::{BundleError, InvalidRuleError, RuleField, RuleViolation};

/// Proposes items to bundle with `cart`.
///
/// A rule fires when its antecedents are a subset of the cart; it then
/// contributes its consequents minus the cart. Contributions are taken in
/// rule order, and consequent-set order within a rule. An item keeps the
/// rank of the first rule that proposed it. `limit` truncates after
/// deduplication, so kept items never change rank.
pub fn propose_bundle(cart: &Cart, rules: &RuleSet, limit: BundleLimit) -> BundleProposal {
    let candidates = rules
        .iter()
        .filter(|rule| rule.antecedents().is_subset(cart.items()))
        .flat_map(|rule| rule.consequents().difference(cart.items()));

    let max_items = limit.max_items();
    let mut seen: HashSet<&ItemId> = HashSet::new();
    let mut items = Vec::new();
    for item in candidates {
        if max_items.is_some_and(|max| items.len() >= max) {
            break;
        }
        if seen.insert(item) {
            items.push(item.clone());
        }
    }

    tracing::debug!(
        event_name = "core.bundles.proposed",
        cart_size = cart.len(),
        rule_count = rules.len(),
        limit = ?max_items,
        proposed = items.len(),
        "bundle proposal computed"
    );

    BundleProposal::new(items)
}

/// Validates untyped inputs, then proposes a bundle.
pub fn propose_bundle_from_records(
    cart: &[Value],
    records: &[RuleRecord],
    limit: BundleLimit,
) -> Result<BundleProposal, BundleError> {
    let cart = Cart::from_values(cart)?;
    let rules = RuleSet::from_records(records)?;
    Ok(propose_bundle(&cart, &rules, limit))
}

/// The single antecedent item of every rule, in rule order.
///
/// Fails on the first rule whose antecedent holds more than one item.
pub fn antecedent_items(rules: &RuleSet) -> Result<Vec<ItemId>, InvalidRuleError> {
    rules
        .iter()
        .enumerate()
        .map(|(index, rule)| {
            let mut antecedents = rule.antecedents().iter();
            match (antecedents.next(), antecedents.next()) {
                (Some(item), None) => Ok(item.clone()),
                _ => Err(RuleViolation::new(
                    RuleField::Antecedents,
                    format!("must hold exactly one item, found {}", rule.antecedents().len()),
                )
                .at(index)),
            }
        })
        .collect()
}

/// `propose_bundle` with a fixed limit and optional caller-side ranking.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BundleRecommender {
    limit: BundleLimit,
    rank_by: Option<RuleMetric>,
}

impl BundleRecommender {
    pub fn new(limit: BundleLimit) -> Self {
        Self { limit, rank_by: None }
    }

    pub fn from_config(config: &RecommenderConfig) -> Self {
        Self { limit: config.bundle_limit(), rank_by: config.sort_by }
    }

    /// Rank rules by `metric` (highest first) before proposing.
    pub fn with_ranking(mut self, metric: RuleMetric) -> Self {
        self.rank_by = Some(metric);
        self
    }

    pub fn with_limit(mut self, limit: BundleLimit) -> Self {
        self.limit = limit;
        self
    }

    pub fn limit(&self) -> BundleLimit {
        self.limit
    }

    pub fn rank_by(&self) -> Option<RuleMetric> {
        self.rank_by
    }

    /// Fails only when ranking is requested and a rule's ranking metric is
    /// malformed.
    pub fn propose(
        &self,
        cart: &Cart,
        rules: &RuleSet,
    ) -> Result<BundleProposal, InvalidRuleError> {
        match self.rank_by {
            Some(metric) => Ok(propose_bundle(cart, &rules.sorted_by(metric)?, self.limit)),
            None => Ok(propose_bundle(cart, rules, self.limit)),
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::{antecedent_items, propose_bundle, propose_bundle_from_records, BundleRecommender};
    use crate::bundles::BundleLimit;
    use crate::domain::cart::Cart;
    use crate::domain::rule::{RuleMetric, RuleRecord, RuleSet};
    use crate::errors::{BundleError, RuleField};

    fn rules(value: serde_json::Value) -> RuleSet {
        let records: Vec<RuleRecord> = serde_json::from_value(value).expect("rule records");
        RuleSet::from_records(&records).expect("valid rules")
    }

    fn cart(items: &[&str]) -> Cart {
        Cart::parse(items).expect("valid cart")
    }

    #[test]
    fn earlier_rule_keeps_rank_of_shared_item() {
        let rules = rules(json!([
            {"antecedents": ["bread"], "consequents": ["butter"]},
            {"antecedents": ["bread"], "consequents": ["jam", "butter"]},
        ]));

        let proposal = propose_bundle(&cart(&["bread"]), &rules, BundleLimit::Unbounded);

        assert_eq!(proposal.names(), vec!["butter", "jam"]);
    }

    #[test]
    fn multi_item_antecedent_fires_when_fully_in_cart() {
        let rules = rules(json!([
            {"antecedents": ["milk", "eggs"], "consequents": ["bacon"]},
        ]));

        let proposal = propose_bundle(&cart(&["milk", "eggs"]), &rules, BundleLimit::default());

        assert_eq!(proposal.names(), vec!["bacon"]);
    }

    #[test]
    fn rule_outside_cart_contributes_nothing() {
        let rules = rules(json!([{"antecedents": ["y"], "consequents": ["z"]}]));

        let proposal = propose_bundle(&cart(&["x"]), &rules, BundleLimit::Unbounded);

        assert!(proposal.is_empty());
    }

    #[test]
    fn empty_cart_and_empty_rules_give_empty_proposals() {
        let some_rules = rules(json!([{"antecedents": ["a"], "consequents": ["b"]}]));

        assert!(propose_bundle(&Cart::default(), &some_rules, BundleLimit::Unbounded).is_empty());
        assert!(propose_bundle(&cart(&["a"]), &RuleSet::default(), BundleLimit::Unbounded)
            .is_empty());
    }

    #[test]
    fn consequents_already_in_cart_are_skipped() {
        let rules = rules(json!([
            {"antecedents": ["bread"], "consequents": ["butter"]},
            {"antecedents": ["bread"], "consequents": ["butter", "jam"]},
        ]));

        let proposal =
            propose_bundle(&cart(&["bread", "butter"]), &rules, BundleLimit::Unbounded);

        assert_eq!(proposal.names(), vec!["jam"]);
    }

    #[test]
    fn unknown_cart_items_do_not_block_matches() {
        let rules = rules(json!([{"antecedents": ["tea"], "consequents": ["lemon"]}]));

        let proposal =
            propose_bundle(&cart(&["tea", "not-in-catalog"]), &rules, BundleLimit::Unbounded);

        assert_eq!(proposal.names(), vec!["lemon"]);
    }

    #[test]
    fn default_limit_truncates_after_deduplication() {
        let rules = rules(json!([
            {"antecedents": ["a"], "consequents": ["b", "c"]},
            {"antecedents": ["a"], "consequents": ["b", "d"]},
            {"antecedents": ["a"], "consequents": ["e", "f"]},
        ]));

        let limited = propose_bundle(&cart(&["a"]), &rules, BundleLimit::default());
        let full = propose_bundle(&cart(&["a"]), &rules, BundleLimit::Unbounded);

        assert_eq!(limited.names(), vec!["b", "c", "d"]);
        assert_eq!(full.names(), vec!["b", "c", "d", "e", "f"]);
    }

    #[test]
    fn record_entry_point_reports_malformed_rule_position() {
        let records: Vec<RuleRecord> = serde_json::from_value(json!([
            {"antecedents": ["bread"], "consequents": ["butter"]},
            {"antecedents": {"bread": true}, "consequents": ["jam"]},
        ]))
        .expect("rule records");

        let error = propose_bundle_from_records(&[json!("bread")], &records, BundleLimit::Unbounded)
            .expect_err("second rule is malformed");

        assert!(matches!(
            error,
            BundleError::InvalidRule(ref rule) if rule.index == 1 && rule.field == RuleField::Antecedents
        ));
    }

    #[test]
    fn record_entry_point_reports_malformed_cart() {
        let error = propose_bundle_from_records(&[json!(true)], &[], BundleLimit::Unbounded)
            .expect_err("boolean cart item");

        assert!(matches!(error, BundleError::InvalidCart(ref cart) if cart.position == 0));
    }

    #[test]
    fn record_entry_point_matches_typed_path() {
        let records: Vec<RuleRecord> = serde_json::from_value(json!([
            {"antecedents": "bread", "consequents": ["jam", "butter"], "confidence": 0.7},
        ]))
        .expect("rule records");

        let proposal = propose_bundle_from_records(&[json!("bread")], &records, BundleLimit::Unbounded)
            .expect("valid inputs");

        assert_eq!(proposal.names(), vec!["butter", "jam"]);
    }

    #[test]
    fn antecedent_items_lists_single_item_antecedents() {
        let rules = rules(json!([
            {"antecedents": ["bread"], "consequents": ["butter"]},
            {"antecedents": "milk", "consequents": ["eggs"]},
        ]));

        let items = antecedent_items(&rules).expect("single-item antecedents");

        assert_eq!(items.iter().map(|item| item.as_str()).collect::<Vec<_>>(), vec!["bread", "milk"]);
    }

    #[test]
    fn antecedent_items_rejects_multi_item_antecedent() {
        let rules = rules(json!([
            {"antecedents": ["bread"], "consequents": ["butter"]},
            {"antecedents": ["milk", "eggs"], "consequents": ["bacon"]},
        ]));

        let error = antecedent_items(&rules).expect_err("second antecedent has two items");

        assert_eq!(error.index, 1);
        assert_eq!(error.field, RuleField::Antecedents);
    }

    #[test]
    fn recommender_ranks_rules_before_proposing() {
        let rules = rules(json!([
            {"antecedents": ["a"], "consequents": ["low"], "lift": 1.1},
            {"antecedents": ["a"], "consequents": ["high"], "lift": 4.0},
        ]));

        let in_order = BundleRecommender::new(BundleLimit::Unbounded)
            .propose(&cart(&["a"]), &rules)
            .expect("no ranking");
        let ranked = BundleRecommender::new(BundleLimit::Unbounded)
            .with_ranking(RuleMetric::Lift)
            .propose(&cart(&["a"]), &rules)
            .expect("lift is valid");

        assert_eq!(in_order.names(), vec!["low", "high"]);
        assert_eq!(ranked.names(), vec!["high", "low"]);
    }

    #[test]
    fn malformed_metrics_only_matter_when_ranked_on() {
        let rules = rules(json!([
            {"antecedents": ["bread"], "consequents": ["butter"], "support": "0.3"},
            {"antecedents": ["bread"], "consequents": ["jam"], "lift": -0.1},
        ]));
        let recommender = BundleRecommender::new(BundleLimit::Unbounded);

        let unranked = recommender.propose(&cart(&["bread"]), &rules).expect("metrics unused");
        let by_confidence = recommender
            .with_ranking(RuleMetric::Confidence)
            .propose(&cart(&["bread"]), &rules)
            .expect("confidence defaults are valid");
        let error = recommender
            .with_ranking(RuleMetric::Lift)
            .propose(&cart(&["bread"]), &rules)
            .expect_err("negative lift cannot rank");

        assert_eq!(unranked.names(), vec!["butter", "jam"]);
        assert_eq!(by_confidence.names(), vec!["butter", "jam"]);
        assert_eq!((error.index, error.field), (1, RuleField::Lift));
    }

    mod properties {
        use std::collections::BTreeSet;

        use proptest::prelude::*;

        use crate::bundles::{propose_bundle, BundleLimit};
        use crate::domain::cart::Cart;
        use crate::domain::item::{ItemId, ItemSet};
        use crate::domain::rule::{AssociationRule, RuleMetrics, RuleSet};

        fn item_set(raw: BTreeSet<String>) -> ItemSet {
            raw.into_iter().filter_map(ItemId::parse).collect()
        }

        fn arb_items(max: usize) -> impl Strategy<Value = BTreeSet<String>> {
            prop::collection::btree_set("[a-h]", 1..=max)
        }

        fn arb_rules() -> impl Strategy<Value = RuleSet> {
            prop::collection::vec((arb_items(3), arb_items(3)), 0..12).prop_map(|pairs| {
                pairs
                    .into_iter()
                    .filter_map(|(antecedents, consequents)| {
                        AssociationRule::new(
                            item_set(antecedents),
                            item_set(consequents),
                            RuleMetrics::default(),
                        )
                        .ok()
                    })
                    .collect()
            })
        }

        fn arb_cart() -> impl Strategy<Value = Cart> {
            prop::collection::btree_set("[a-h]", 0..5).prop_map(|raw| Cart::new(item_set(raw)))
        }

        proptest! {
            #![proptest_config(ProptestConfig {
                cases: 256,
                ..ProptestConfig::default()
            })]

            /// Property: nothing already in the cart is proposed.
            #[test]
            fn proposal_never_repeats_cart_items(cart in arb_cart(), rules in arb_rules()) {
                let proposal = propose_bundle(&cart, &rules, BundleLimit::Unbounded);
                for item in proposal.items() {
                    prop_assert!(!cart.contains(item));
                }
            }

            /// Property: rules whose antecedents are not in the cart have no effect.
            #[test]
            fn non_matching_rules_do_not_influence_output(cart in arb_cart(), rules in arb_rules()) {
                let matching: RuleSet = rules
                    .iter()
                    .filter(|rule| rule.antecedents().is_subset(cart.items()))
                    .cloned()
                    .collect();

                prop_assert_eq!(
                    propose_bundle(&cart, &rules, BundleLimit::Unbounded),
                    propose_bundle(&cart, &matching, BundleLimit::Unbounded)
                );
            }

            /// Property: items appear in the order of the first rule proposing them.
            #[test]
            fn items_follow_first_proposing_rule(cart in arb_cart(), rules in arb_rules()) {
                let proposal = propose_bundle(&cart, &rules, BundleLimit::Unbounded);
                let first_rule = |item: &ItemId| {
                    rules.iter().position(|rule| {
                        rule.antecedents().is_subset(cart.items()) && rule.consequents().contains(item)
                    })
                };

                let ranks: Vec<Option<usize>> = proposal.items().iter().map(first_rule).collect();
                prop_assert!(ranks.iter().all(Option::is_some));
                prop_assert!(ranks.windows(2).all(|pair| pair[0] <= pair[1]));

                let distinct: BTreeSet<&ItemId> = proposal.items().iter().collect();
                prop_assert_eq!(distinct.len(), proposal.len());
            }

            /// Property: a limited proposal is a prefix of the unbounded one.
            #[test]
            fn limited_proposal_is_prefix(cart in arb_cart(), rules in arb_rules(), limit in 1usize..6) {
                let full = propose_bundle(&cart, &rules, BundleLimit::Unbounded);
                let limited = propose_bundle(&cart, &rules, BundleLimit::top(limit).unwrap());

                prop_assert_eq!(limited.len(), full.len().min(limit));
                prop_assert_eq!(limited.items(), &full.items()[..limited.len()]);
            }

            /// Property: identical inputs give identical output.
            #[test]
            fn proposal_is_deterministic(cart in arb_cart(), rules in arb_rules()) {
                prop_assert_eq!(
                    propose_bundle(&cart, &rules, BundleLimit::Unbounded),
                    propose_bundle(&cart, &rules, BundleLimit::Unbounded)
                );
            }
        }
    }
}
