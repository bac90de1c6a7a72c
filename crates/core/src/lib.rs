pub mod bundles;
pub mod config;
pub mod dedup;
pub mod domain;
pub mod errors;
pub mod mining;

pub use bundles::{
    antecedent_items, propose_bundle, propose_bundle_from_records, BundleLimit, BundleProposal,
    BundleRecommender,
};
pub use dedup::{deduplicate, Cell, DeduplicationReport, Table, TableRecord};
pub use domain::cart::Cart;
pub use domain::item::{ItemId, ItemSet};
pub use domain::rule::{AssociationRule, RuleMetric, RuleMetrics, RuleRecord, RuleSet};
pub use domain::transaction::{OneHotMatrix, TransactionSet};
pub use errors::{
    ApplicationError, BundleError, DomainError, InvalidCartError, InvalidRuleError, MiningError,
    RuleField, TableError,
};
pub use mining::{MiningThresholds, PrecomputedRules, RuleSource};
