use serde::Serialize;
use serde_json::Value;

use crate::domain::item::{item_from_value, ItemId, ItemSet};
use crate::errors::InvalidCartError;

/// Items a customer currently holds. Read-only to the recommender.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Cart {
    items: ItemSet,
}

impl Cart {
    pub fn new(items: ItemSet) -> Self {
        Self { items }
    }

    /// Builds a cart from raw identifiers, rejecting blank entries.
    pub fn parse<I, S>(raw_items: I) -> Result<Self, InvalidCartError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        raw_items
            .into_iter()
            .enumerate()
            .map(|(position, raw)| {
                ItemId::parse(raw).ok_or_else(|| InvalidCartError {
                    position,
                    reason: "item identifier is empty".to_owned(),
                })
            })
            .collect::<Result<ItemSet, _>>()
            .map(Self::new)
    }

    pub fn from_values(values: &[Value]) -> Result<Self, InvalidCartError> {
        values
            .iter()
            .enumerate()
            .map(|(position, value)| {
                item_from_value(value).map_err(|reason| InvalidCartError { position, reason })
            })
            .collect::<Result<ItemSet, _>>()
            .map(Self::new)
    }

    pub fn items(&self) -> &ItemSet {
        &self.items
    }

    pub fn contains(&self, item: &ItemId) -> bool {
        self.items.contains(item)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl FromIterator<ItemId> for Cart {
    fn from_iter<I: IntoIterator<Item = ItemId>>(iter: I) -> Self {
        Self { items: iter.into_iter().collect() }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::Cart;

    #[test]
    fn parse_collapses_duplicates() {
        let cart = Cart::parse(["milk", "eggs", "milk"]).expect("valid cart");
        assert_eq!(cart.len(), 2);
    }

    #[test]
    fn parse_reports_position_of_blank_item() {
        let error = Cart::parse(["milk", " "]).expect_err("blank item");
        assert_eq!(error.position, 1);
    }

    #[test]
    fn from_values_rejects_non_scalar_entries() {
        let error = Cart::from_values(&[json!("milk"), json!({"sku": "eggs"})])
            .expect_err("object entry");

        assert_eq!(error.position, 1);
        assert_eq!(error.reason, "expected a string item identifier, got an object");
    }
}
