//! Strategy Parameters
//!
//! Stored promotions carry an untyped key/value bag whose shape depends on
//! the strategy type. The bag is read once, when a promotion is loaded, into
//! one typed parameter struct per strategy.

use std::str::FromStr;

use decimal_percentage::Percentage;
use rust_decimal::Decimal;
use serde_json::{Map, Value};
use thiserror::Error;

use crate::strategies::StrategyType;

/// Untyped strategy parameters as stored alongside a promotion.
pub type StrategyParams = Map<String, Value>;

/// Errors raised while reading strategy parameters.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum StrategyError {
    /// The strategy type is not one of the known strategies.
    #[error("unknown strategy type: {0}")]
    UnknownType(String),

    /// A required parameter is absent.
    #[error("{strategy} is missing required parameter `{field}`")]
    MissingField {
        /// Strategy being read.
        strategy: StrategyType,

        /// Missing parameter.
        field: &'static str,
    },

    /// A parameter is present but not a usable number.
    #[error("{strategy} parameter `{field}` is not a valid number: {value}")]
    InvalidNumber {
        /// Strategy being read.
        strategy: StrategyType,

        /// Offending parameter.
        field: &'static str,

        /// Raw value as stored.
        value: String,
    },

    /// A parameter is a number outside its permitted range.
    #[error("{strategy} parameter `{field}` is out of range: {value}")]
    OutOfRange {
        /// Strategy being read.
        strategy: StrategyType,

        /// Offending parameter.
        field: &'static str,

        /// Parsed value.
        value: Decimal,
    },
}

/// Typed accessors over a parameter bag for one strategy.
#[derive(Debug, Clone, Copy)]
pub(crate) struct ParamReader<'a> {
    strategy: StrategyType,
    params: &'a StrategyParams,
}

impl<'a> ParamReader<'a> {
    pub(crate) const fn new(strategy: StrategyType, params: &'a StrategyParams) -> Self {
        Self { strategy, params }
    }

    fn value(&self, field: &'static str) -> Result<&'a Value, StrategyError> {
        match self.params.get(field) {
            None | Some(Value::Null) => Err(StrategyError::MissingField {
                strategy: self.strategy,
                field,
            }),
            Some(value) => Ok(value),
        }
    }

    fn invalid(&self, field: &'static str, value: &Value) -> StrategyError {
        StrategyError::InvalidNumber {
            strategy: self.strategy,
            field,
            value: value.to_string(),
        }
    }

    /// Read a required decimal, accepting JSON numbers and numeric strings.
    pub(crate) fn decimal(&self, field: &'static str) -> Result<Decimal, StrategyError> {
        let value = self.value(field)?;

        decimal_from_value(value).ok_or_else(|| self.invalid(field, value))
    }

    /// Read a required, non-negative money amount.
    pub(crate) fn money(&self, field: &'static str) -> Result<Decimal, StrategyError> {
        let amount = self.decimal(field)?;

        if amount < Decimal::ZERO {
            return Err(StrategyError::OutOfRange {
                strategy: self.strategy,
                field,
                value: amount,
            });
        }

        Ok(amount)
    }

    /// Read a required percentage expressed as 0–100.
    pub(crate) fn percent(&self, field: &'static str) -> Result<Percentage, StrategyError> {
        let value = self.decimal(field)?;

        if value < Decimal::ZERO || value > Decimal::ONE_HUNDRED {
            return Err(StrategyError::OutOfRange {
                strategy: self.strategy,
                field,
                value,
            });
        }

        Ok(Percentage::from(value / Decimal::ONE_HUNDRED))
    }

    /// Read a required whole-number quantity.
    pub(crate) fn quantity(&self, field: &'static str) -> Result<u32, StrategyError> {
        let value = self.value(field)?;

        let quantity = match value {
            Value::Number(number) => number.as_u64().and_then(|n| u32::try_from(n).ok()),
            Value::String(s) => s.trim().parse::<u32>().ok(),
            _ => None,
        };

        quantity.ok_or_else(|| self.invalid(field, value))
    }

    /// Read a required array of objects, yielding a reader per element.
    pub(crate) fn objects(
        &self,
        field: &'static str,
    ) -> Result<Vec<ParamReader<'a>>, StrategyError> {
        let value = self.value(field)?;

        let Value::Array(elements) = value else {
            return Err(self.invalid(field, value));
        };

        elements
            .iter()
            .map(|element| match element {
                Value::Object(params) => Ok(ParamReader::new(self.strategy, params)),
                other => Err(self.invalid(field, other)),
            })
            .collect()
    }
}

fn decimal_from_value(value: &Value) -> Option<Decimal> {
    let text = match value {
        Value::Number(number) => number.to_string(),
        Value::String(s) => s.trim().to_string(),
        _ => return None,
    };

    Decimal::from_str(&text)
        .or_else(|_err| Decimal::from_scientific(&text))
        .ok()
}
