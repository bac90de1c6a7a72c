//! Bundle Recommender
//!
//! Proposes items to add to a cart from precomputed association rules.
//! Rules are evaluated in the order given; ranking is the caller's job.

mod engine;
mod types;

pub use engine::{antecedent_items, propose_bundle, propose_bundle_from_records, BundleRecommender};
pub use types::*;

/// Number of items proposed when no limit is configured.
pub const DEFAULT_BUNDLE_LIMIT: usize = 3;
