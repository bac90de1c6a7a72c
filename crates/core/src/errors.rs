use std::fmt;

use serde::Serialize;
use thiserror::Error;

/// Field of a rule record that failed validation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleField {
    Antecedents,
    Consequents,
    Support,
    Confidence,
    Lift,
}

impl RuleField {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Antecedents => "antecedents",
            Self::Consequents => "consequents",
            Self::Support => "support",
            Self::Confidence => "confidence",
            Self::Lift => "lift",
        }
    }
}

impl fmt::Display for RuleField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A rule that is malformed without knowing its position in a rule set.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("field `{field}` {reason}")]
pub struct RuleViolation {
    pub field: RuleField,
    pub reason: String,
}

impl RuleViolation {
    pub fn new(field: RuleField, reason: impl Into<String>) -> Self {
        Self { field, reason: reason.into() }
    }

    pub fn at(self, index: usize) -> InvalidRuleError {
        InvalidRuleError { index, field: self.field, reason: self.reason }
    }
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("invalid rule at index {index}: field `{field}` {reason}")]
pub struct InvalidRuleError {
    pub index: usize,
    pub field: RuleField,
    pub reason: String,
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("invalid cart entry at position {position}: {reason}")]
pub struct InvalidCartError {
    pub position: usize,
    pub reason: String,
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum BundleError {
    #[error(transparent)]
    InvalidRule(#[from] InvalidRuleError),
    #[error(transparent)]
    InvalidCart(#[from] InvalidCartError),
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum TableError {
    #[error("row {row} has {found} cells but the table has {expected} columns")]
    RowWidth { row: usize, expected: usize, found: usize },
    #[error("unsupported cell at row {row}, column `{column}`: {reason}")]
    UnsupportedCell { row: usize, column: String, reason: String },
}

#[derive(Clone, Debug, Error, PartialEq)]
pub enum MiningError {
    #[error("{name} must be in range (0, 1], got {value}")]
    InvalidThreshold { name: &'static str, value: f64 },
    #[error("invalid transaction at index {index}: {reason}")]
    InvalidTransaction { index: usize, reason: String },
    #[error("rule at index {index} names item `{item}` that no transaction contains")]
    UnknownItem { index: usize, item: String },
    #[error(transparent)]
    InvalidRule(#[from] InvalidRuleError),
}

#[derive(Clone, Debug, Error, PartialEq)]
pub enum DomainError {
    #[error(transparent)]
    InvalidRule(#[from] InvalidRuleError),
    #[error(transparent)]
    InvalidCart(#[from] InvalidCartError),
    #[error(transparent)]
    Table(#[from] TableError),
    #[error(transparent)]
    Mining(#[from] MiningError),
}

impl From<BundleError> for DomainError {
    fn from(value: BundleError) -> Self {
        match value {
            BundleError::InvalidRule(error) => Self::InvalidRule(error),
            BundleError::InvalidCart(error) => Self::InvalidCart(error),
        }
    }
}

#[derive(Clone, Debug, Error, PartialEq)]
pub enum ApplicationError {
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error("input failure: {0}")]
    Input(String),
    #[error("configuration failure: {0}")]
    Configuration(String),
}

impl ApplicationError {
    /// Stable machine-readable class used in command output.
    pub fn error_class(&self) -> &'static str {
        match self {
            Self::Domain(DomainError::InvalidRule(_))
            | Self::Domain(DomainError::Mining(MiningError::InvalidRule(_))) => "invalid_rule",
            Self::Domain(DomainError::InvalidCart(_)) => "invalid_cart",
            Self::Domain(DomainError::Table(_)) => "invalid_table",
            Self::Domain(DomainError::Mining(_)) => "mining_contract",
            Self::Input(_) => "input",
            Self::Configuration(_) => "config_validation",
        }
    }

    pub fn exit_code(&self) -> u8 {
        match self {
            Self::Domain(_) | Self::Input(_) => 3,
            Self::Configuration(_) => 2,
        }
    }
}

impl From<BundleError> for ApplicationError {
    fn from(value: BundleError) -> Self {
        Self::Domain(value.into())
    }
}

impl From<InvalidRuleError> for ApplicationError {
    fn from(value: InvalidRuleError) -> Self {
        Self::Domain(value.into())
    }
}

impl From<InvalidCartError> for ApplicationError {
    fn from(value: InvalidCartError) -> Self {
        Self::Domain(value.into())
    }
}

impl From<TableError> for ApplicationError {
    fn from(value: TableError) -> Self {
        Self::Domain(value.into())
    }
}

impl From<MiningError> for ApplicationError {
    fn from(value: MiningError) -> Self {
        Self::Domain(value.into())
    }
}
