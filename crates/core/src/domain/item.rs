use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Product identifier as it appears in transactions, rules and carts.
///
/// Identifiers are trimmed and never empty.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(String);

/// Ordered set of items. Iteration is lexicographic by identifier.
pub type ItemSet = BTreeSet<ItemId>;

impl ItemId {
    pub fn parse(raw: impl AsRef<str>) -> Option<Self> {
        let trimmed = raw.as_ref().trim();
        (!trimmed.is_empty()).then(|| Self(trimmed.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ItemId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Converts one JSON value into an item. Strings and numbers are accepted;
/// numbers keep their JSON rendering so `7` and `"7"` name the same item.
pub(crate) fn item_from_value(value: &Value) -> Result<ItemId, String> {
    match value {
        Value::String(raw) => {
            ItemId::parse(raw).ok_or_else(|| "item identifier is empty".to_owned())
        }
        Value::Number(number) => ItemId::parse(number.to_string())
            .ok_or_else(|| "item identifier is empty".to_owned()),
        other => Err(format!("expected a string item identifier, got {}", json_kind(other))),
    }
}

/// Converts a JSON collection into an item set. A bare string or number is
/// read as a one-item collection. Repeated items collapse.
pub(crate) fn item_set_from_value(value: &Value) -> Result<ItemSet, String> {
    match value {
        Value::Array(values) => values
            .iter()
            .enumerate()
            .map(|(position, value)| {
                item_from_value(value).map_err(|reason| format!("item {position}: {reason}"))
            })
            .collect(),
        Value::String(_) | Value::Number(_) => {
            item_from_value(value).map(|item| ItemSet::from([item]))
        }
        Value::Null => Err("is missing".to_owned()),
        other => Err(format!("expected a collection of items, got {}", json_kind(other))),
    }
}

pub(crate) fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::{item_from_value, item_set_from_value, ItemId};

    #[test]
    fn parse_trims_and_rejects_blank_identifiers() {
        assert_eq!(ItemId::parse("  bread ").map(|item| item.to_string()), Some("bread".into()));
        assert!(ItemId::parse("   ").is_none());
        assert!(ItemId::parse("").is_none());
    }

    #[test]
    fn numbers_and_strings_name_the_same_item() {
        let from_number = item_from_value(&json!(7)).expect("number item");
        let from_string = item_from_value(&json!("7")).expect("string item");

        assert_eq!(from_number, from_string);
    }

    #[test]
    fn item_set_accepts_singleton_and_collapses_repeats() {
        let single = item_set_from_value(&json!("jam")).expect("singleton");
        let repeated = item_set_from_value(&json!(["jam", "jam", "butter"])).expect("array");

        assert_eq!(single.len(), 1);
        assert_eq!(
            repeated.iter().map(ItemId::as_str).collect::<Vec<_>>(),
            vec!["butter", "jam"]
        );
    }

    #[test]
    fn item_set_rejects_nested_and_missing_values() {
        let nested = item_set_from_value(&json!([["jam"]])).expect_err("nested array");
        let missing = item_set_from_value(&json!(null)).expect_err("null");
        let object = item_set_from_value(&json!({"jam": 1})).expect_err("object");

        assert_eq!(nested, "item 0: expected a string item identifier, got an array");
        assert_eq!(missing, "is missing");
        assert!(object.contains("an object"));
    }
}
