//! Buy X Get Y
//!
//! Lines with at least `buy_quantity` units qualify. The `get_quantity`
//! cheapest qualifying lines each have one unit discounted by
//! `get_percent`. The discount is per distinct line, not per unit.

use decimal_percentage::Percentage;
use rust_decimal::Decimal;

use crate::{
    cart::{Cart, CartLine},
    discounts::{DiscountError, percent_of},
    strategies::{
        StrategyOutcome, StrategyType,
        params::{ParamReader, StrategyError, StrategyParams},
    },
};

/// Buy X get Y strategy
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BuyXGetY {
    buy_quantity: u32,
    get_quantity: u32,
    get_percent: Percentage,
}

impl BuyXGetY {
    /// Create a new buy-x-get-y strategy.
    pub const fn new(buy_quantity: u32, get_quantity: u32, get_percent: Percentage) -> Self {
        Self {
            buy_quantity,
            get_quantity,
            get_percent,
        }
    }

    /// Read parameters: `buyQuantity` (≥ 1), `getQuantity`, `getPercentage` (0–100).
    ///
    /// # Errors
    ///
    /// Returns a [`StrategyError`] if any parameter is missing, malformed or out of range.
    pub fn from_params(params: &StrategyParams) -> Result<Self, StrategyError> {
        let reader = ParamReader::new(StrategyType::BuyXGetY, params);

        let buy_quantity = reader.quantity("buyQuantity")?;

        if buy_quantity == 0 {
            return Err(StrategyError::OutOfRange {
                strategy: StrategyType::BuyXGetY,
                field: "buyQuantity",
                value: Decimal::ZERO,
            });
        }

        Ok(Self::new(
            buy_quantity,
            reader.quantity("getQuantity")?,
            reader.percent("getPercentage")?,
        ))
    }

    /// Return the quantity a line needs to qualify.
    pub const fn buy_quantity(&self) -> u32 {
        self.buy_quantity
    }

    /// Return how many qualifying lines are discounted.
    pub const fn get_quantity(&self) -> u32 {
        self.get_quantity
    }

    /// Return the discount applied to each chosen line's unit price.
    pub const fn get_percent(&self) -> &Percentage {
        &self.get_percent
    }

    /// Calculate the discount.
    ///
    /// # Errors
    ///
    /// Returns a [`DiscountError`] if a percentage calculation overflows.
    pub fn calculate(&self, cart: &Cart) -> Result<StrategyOutcome, DiscountError> {
        let mut qualifying: Vec<&CartLine> = cart
            .lines()
            .iter()
            .filter(|line| line.quantity() >= self.buy_quantity)
            .collect();

        if qualifying.is_empty() {
            return Ok(StrategyOutcome::none());
        }

        // Stable, so equal prices keep cart order.
        qualifying.sort_by_key(|line| line.unit_price());

        let take = usize::try_from(self.get_quantity).unwrap_or(usize::MAX);

        qualifying.into_iter().take(take).try_fold(
            StrategyOutcome::none(),
            |mut outcome, line| {
                let amount = percent_of(&self.get_percent, line.unit_price())?;

                outcome.discount_amount = outcome
                    .discount_amount
                    .checked_add(amount)
                    .ok_or(DiscountError::Overflow)?;
                outcome.affected_items.push(line.variant_id());

                Ok(outcome)
            },
        )
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;
    use serde_json::json;
    use testresult::TestResult;

    use crate::strategies::test_support::{cart_of, params};

    use super::*;

    fn strategy(buy: u32, get: u32, percent: Decimal) -> BuyXGetY {
        BuyXGetY::new(buy, get, Percentage::from(percent))
    }

    #[test]
    fn no_qualifying_lines_discounts_nothing() -> TestResult {
        let cart = cart_of(&[(1, dec!(10)), (2, dec!(5))])?;

        let outcome = strategy(3, 1, dec!(1)).calculate(&cart)?;

        assert_eq!(outcome.discount_amount, Decimal::ZERO);
        assert!(outcome.affected_items.is_empty());

        Ok(())
    }

    #[test]
    fn discounts_cheapest_qualifying_lines_once_each() -> TestResult {
        let cart = cart_of(&[(2, dec!(9.00)), (1, dec!(1.00)), (3, dec!(4.00)), (2, dec!(6.00))])?;

        let outcome = strategy(2, 2, dec!(1)).calculate(&cart)?;

        let expected: Vec<_> = [2, 3]
            .iter()
            .filter_map(|i| cart.lines().get(*i).map(|line| line.variant_id()))
            .collect();

        // Cheapest qualifying lines are 4.00 and 6.00; the 1.00 line doesn't qualify.
        assert_eq!(outcome.discount_amount, dec!(10.00));
        assert_eq!(outcome.affected_items, expected);

        Ok(())
    }

    #[test]
    fn partial_percentage_rounds_each_line() -> TestResult {
        let cart = cart_of(&[(2, dec!(3.33)), (2, dec!(3.35))])?;

        let outcome = strategy(2, 2, dec!(0.5)).calculate(&cart)?;

        // 1.665 -> 1.67, 1.675 -> 1.68
        assert_eq!(outcome.discount_amount, dec!(3.35));

        Ok(())
    }

    #[test]
    fn get_quantity_beyond_qualifying_lines_takes_them_all() -> TestResult {
        let cart = cart_of(&[(2, dec!(2.00))])?;

        let outcome = strategy(1, 5, dec!(1)).calculate(&cart)?;

        assert_eq!(outcome.discount_amount, dec!(2.00));
        assert_eq!(outcome.affected_items.len(), 1);

        Ok(())
    }

    #[test]
    fn from_params_reads_camel_case_keys() -> TestResult {
        let parsed = BuyXGetY::from_params(&params(json!({
            "buyQuantity": 2,
            "getQuantity": 1,
            "getPercentage": 50,
        })))?;

        assert_eq!(parsed, strategy(2, 1, dec!(0.5)));

        Ok(())
    }

    #[test]
    fn from_params_rejects_zero_buy_quantity() {
        let result = BuyXGetY::from_params(&params(json!({
            "buyQuantity": 0,
            "getQuantity": 1,
            "getPercentage": 100,
        })));

        assert!(matches!(
            result,
            Err(StrategyError::OutOfRange {
                field: "buyQuantity",
                ..
            })
        ));
    }
}
