//! Buy One Get One
//!
//! The single cheapest line's unit price comes off the cart.

use crate::{cart::Cart, strategies::StrategyOutcome};

/// Calculate the discount: the unit price (not the line total) of the
/// cheapest line. Ties go to the earliest line.
pub fn calculate(cart: &Cart) -> StrategyOutcome {
    cart.lines()
        .iter()
        .min_by_key(|line| line.unit_price())
        .map_or_else(StrategyOutcome::none, |cheapest| {
            StrategyOutcome::discount(cheapest.unit_price(), vec![cheapest.variant_id()])
        })
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;
    use testresult::TestResult;

    use crate::strategies::test_support::cart_of;

    use super::*;

    #[test]
    fn discounts_one_unit_of_a_multi_quantity_line() -> TestResult {
        let cart = cart_of(&[(3, dec!(10))])?;

        let outcome = calculate(&cart);

        assert_eq!(outcome.discount_amount, dec!(10.00));
        assert_eq!(outcome.affected_items, cart.variant_ids());

        Ok(())
    }

    #[test]
    fn picks_cheapest_line() -> TestResult {
        let cart = cart_of(&[(1, dec!(12.00)), (2, dec!(4.99)), (1, dec!(8.00))])?;

        let outcome = calculate(&cart);
        let cheapest = cart.lines().get(1).map(|line| line.variant_id());

        assert_eq!(outcome.discount_amount, dec!(4.99));
        assert_eq!(outcome.affected_items.first().copied(), cheapest);
        assert_eq!(outcome.affected_items.len(), 1);

        Ok(())
    }

    #[test]
    fn ties_go_to_first_line() -> TestResult {
        let cart = cart_of(&[(1, dec!(5)), (1, dec!(5))])?;

        let outcome = calculate(&cart);

        assert_eq!(
            outcome.affected_items.first().copied(),
            cart.lines().first().map(|line| line.variant_id())
        );

        Ok(())
    }

    #[test]
    fn empty_cart_discounts_nothing() {
        let outcome = calculate(&Cart::empty(None));

        assert_eq!(outcome.discount_amount, Decimal::ZERO);
        assert!(outcome.affected_items.is_empty());
    }
}
