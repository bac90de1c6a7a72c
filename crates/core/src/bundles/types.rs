//! Types for the Bundle Recommender

use std::num::NonZeroUsize;

use serde::Serialize;

use crate::domain::item::ItemId;

/// How many items a proposal may hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BundleLimit {
    /// Keep the first `n` items after deduplication.
    Top(NonZeroUsize),
    /// Keep every matching item.
    Unbounded,
}

impl BundleLimit {
    /// `None` for a zero count.
    pub fn top(count: usize) -> Option<Self> {
        NonZeroUsize::new(count).map(Self::Top)
    }

    pub fn max_items(&self) -> Option<usize> {
        match self {
            Self::Top(count) => Some(count.get()),
            Self::Unbounded => None,
        }
    }
}

impl Default for BundleLimit {
    fn default() -> Self {
        match NonZeroUsize::new(super::DEFAULT_BUNDLE_LIMIT) {
            Some(count) => Self::Top(count),
            None => Self::Unbounded,
        }
    }
}

/// Ordered, duplicate-free items recommended for a cart.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct BundleProposal {
    items: Vec<ItemId>,
}

impl BundleProposal {
    pub(crate) fn new(items: Vec<ItemId>) -> Self {
        Self { items }
    }

    pub fn items(&self) -> &[ItemId] {
        &self.items
    }

    pub fn into_items(self) -> Vec<ItemId> {
        self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn contains(&self, item: &ItemId) -> bool {
        self.items.contains(item)
    }

    /// Item identifiers as plain strings, in rank order.
    pub fn names(&self) -> Vec<&str> {
        self.items.iter().map(ItemId::as_str).collect()
    }
}
