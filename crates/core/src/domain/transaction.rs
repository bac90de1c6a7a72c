use serde::Serialize;
use serde_json::Value;

use crate::domain::item::{item_set_from_value, ItemId, ItemSet};
use crate::errors::MiningError;

/// Purchase events in corpus order. Each event is a set of items.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct TransactionSet {
    transactions: Vec<ItemSet>,
}

/// Transactions encoded as boolean rows over the sorted item universe.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct OneHotMatrix {
    pub columns: Vec<ItemId>,
    pub rows: Vec<Vec<bool>>,
}

impl TransactionSet {
    pub fn new(transactions: Vec<ItemSet>) -> Self {
        Self { transactions }
    }

    pub fn from_values(values: &[Value]) -> Result<Self, MiningError> {
        values
            .iter()
            .enumerate()
            .map(|(index, value)| match value {
                Value::Array(_) => item_set_from_value(value)
                    .map_err(|reason| MiningError::InvalidTransaction { index, reason }),
                _ => Err(MiningError::InvalidTransaction {
                    index,
                    reason: "expected an array of items".to_owned(),
                }),
            })
            .collect::<Result<Vec<_>, _>>()
            .map(Self::new)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ItemSet> {
        self.transactions.iter()
    }

    pub fn len(&self) -> usize {
        self.transactions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }

    /// Every distinct item in the corpus.
    pub fn item_universe(&self) -> ItemSet {
        self.transactions.iter().flatten().cloned().collect()
    }

    pub fn one_hot(&self) -> OneHotMatrix {
        let columns: Vec<ItemId> = self.item_universe().into_iter().collect();
        let rows = self
            .transactions
            .iter()
            .map(|transaction| columns.iter().map(|item| transaction.contains(item)).collect())
            .collect();

        OneHotMatrix { columns, rows }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::TransactionSet;
    use crate::errors::MiningError;

    fn corpus() -> TransactionSet {
        TransactionSet::from_values(&[
            json!(["bread", "milk"]),
            json!(["bread", "butter", "jam"]),
            json!([]),
        ])
        .expect("valid transactions")
    }

    #[test]
    fn item_universe_is_sorted_and_distinct() {
        let universe: Vec<String> =
            corpus().item_universe().iter().map(|item| item.to_string()).collect();

        assert_eq!(universe, vec!["bread", "butter", "jam", "milk"]);
    }

    #[test]
    fn one_hot_marks_membership_per_transaction() {
        let matrix = corpus().one_hot();

        assert_eq!(matrix.columns.len(), 4);
        assert_eq!(matrix.rows[0], vec![true, false, false, true]);
        assert_eq!(matrix.rows[1], vec![true, true, true, false]);
        assert_eq!(matrix.rows[2], vec![false; 4]);
    }

    #[test]
    fn non_array_transaction_is_rejected_with_index() {
        let error = TransactionSet::from_values(&[json!(["bread"]), json!("milk")])
            .expect_err("bare string transaction");

        assert!(matches!(error, MiningError::InvalidTransaction { index: 1, .. }));
    }

    #[test]
    fn empty_corpus_encodes_to_empty_matrix() {
        let matrix = TransactionSet::default().one_hot();

        assert!(matrix.columns.is_empty());
        assert!(matrix.rows.is_empty());
    }
}
