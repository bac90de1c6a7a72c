use std::path::PathBuf;

use basketry_core::config::LoadOptions;
use basketry_core::{BundleRecommender, Cart, RuleMetric, RuleRecord, RuleSet};
use serde_json::json;

use crate::commands::{load_config, read_json, CommandResult};

#[derive(Debug, Clone, Default)]
pub struct ProposeRequest {
    pub rules: PathBuf,
    pub cart: Vec<String>,
    pub limit: Option<usize>,
    pub all: bool,
    pub sort_by: Option<RuleMetric>,
}

pub fn run(request: &ProposeRequest, mut options: LoadOptions) -> CommandResult {
    if request.limit.is_some() {
        options.overrides.limit = request.limit;
        options.overrides.unbounded = Some(false);
    }
    if request.all {
        options.overrides.unbounded = Some(true);
    }
    if request.sort_by.is_some() {
        options.overrides.sort_by = request.sort_by;
    }

    let outcome = load_config(options).and_then(|config| {
        let recommender = BundleRecommender::from_config(&config.recommender);
        let cart = Cart::parse(&request.cart)?;
        let records: Vec<RuleRecord> = read_json(&request.rules)?;
        let rules = RuleSet::from_records(&records)?;

        let proposal = recommender.propose(&cart, &rules)?;
        let message = format!(
            "proposed {} item(s) from {} rule(s) for a cart of {}",
            proposal.len(),
            rules.len(),
            cart.len()
        );
        let data = json!({
            "cart": cart,
            "limit": recommender.limit().max_items(),
            "sort_by": recommender.rank_by(),
            "bundle": proposal,
        });
        Ok((message, data))
    });

    CommandResult::from_outcome("propose", outcome)
}
