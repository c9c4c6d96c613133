//! Integration tests for resolving stacked promotions against a cart.

use decimal_percentage::Percentage;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use testresult::TestResult;

use storefront_promotions::{
    cart::{Cart, CartError, CartLine},
    conditions::{Comparator, ConditionNode, Predicate},
    context::EvaluationContext,
    discounts::{DiscountBreakdown, DiscountError, DiscountTotals},
    promotions::{Promotion, UsageBudget},
    stacking::resolve,
    strategies::{Bundle, FixedAmount, PercentageOff, Strategy, Tier, Tiered},
    uuids::{ProductUuid, TenantUuid, VariantUuid},
};

fn cart(lines: &[(ProductUuid, u32, Decimal)]) -> Result<Cart, CartError> {
    let lines: Vec<CartLine> = lines
        .iter()
        .map(|&(product, quantity, unit_price)| {
            CartLine::new(VariantUuid::new(), product, [], quantity, unit_price)
        })
        .collect();

    Cart::with_lines(lines, None)
}

fn percent_off(tenant: TenantUuid, name: &str, percent: Decimal) -> Promotion {
    Promotion::new(
        tenant,
        name,
        Strategy::PercentageOff(PercentageOff::new(Percentage::from(percent / dec!(100)))),
    )
}

fn names(breakdowns: &[DiscountBreakdown]) -> Vec<&str> {
    breakdowns
        .iter()
        .map(|breakdown| breakdown.promotion_name.as_str())
        .collect()
}

#[test]
fn resolving_twice_gives_identical_results() -> TestResult {
    let tenant = TenantUuid::new();
    let cart = cart(&[
        (ProductUuid::new(), 2, dec!(12.50)),
        (ProductUuid::new(), 1, dec!(30.00)),
    ])?;
    let promotions = [
        percent_off(tenant, "ten", dec!(10)).with_stackable(true),
        percent_off(tenant, "five", dec!(5)),
        Promotion::new(tenant, "ship", Strategy::FreeShipping).with_stackable(true),
    ];
    let context = EvaluationContext::default();

    let first = resolve(&promotions, &cart, &context);
    let second = resolve(&promotions, &cart, &context);

    assert_eq!(first, second);
    assert_eq!(names(&first), ["ten", "five", "ship"]);

    Ok(())
}

#[test]
fn first_non_stackable_promotion_wins() -> TestResult {
    let tenant = TenantUuid::new();
    let cart = cart(&[(ProductUuid::new(), 1, dec!(100.00))])?;
    let p1 = percent_off(tenant, "P1", dec!(10)).with_priority(0);
    let p2 = percent_off(tenant, "P2", dec!(50)).with_priority(1);

    let result = resolve([&p1, &p2], &cart, &EvaluationContext::default());

    assert_eq!(names(&result), ["P1"]);
    assert_eq!(
        result.first().map(|breakdown| breakdown.discount_amount),
        Some(dec!(10.00))
    );

    Ok(())
}

#[test]
fn stackable_promotions_each_discount_the_full_subtotal() -> TestResult {
    let tenant = TenantUuid::new();
    let cart = cart(&[(ProductUuid::new(), 4, dec!(25.00))])?;
    let p1 = percent_off(tenant, "P1", dec!(10)).with_stackable(true);
    let p2 = percent_off(tenant, "P2", dec!(20)).with_stackable(true);

    let result = resolve([&p1, &p2], &cart, &EvaluationContext::default());

    let amounts: Vec<Decimal> = result
        .iter()
        .map(|breakdown| breakdown.discount_amount)
        .collect();

    assert_eq!(amounts, [dec!(10.00), dec!(20.00)]);
    assert_eq!(
        DiscountTotals::from_breakdowns(&result)?.discount_amount,
        dec!(30.00)
    );

    Ok(())
}

#[test]
fn totals_of_stacked_discounts_report_overflow() -> TestResult {
    let tenant = TenantUuid::new();
    let cart = cart(&[(ProductUuid::new(), 1, Decimal::MAX - Decimal::ONE)])?;
    let promotions = [
        Promotion::new(tenant, "free", Strategy::Bundle(Bundle::new(dec!(0)))).with_stackable(true),
        Promotion::new(tenant, "also free", Strategy::Bundle(Bundle::new(dec!(0))))
            .with_stackable(true),
    ];

    let result = resolve(&promotions, &cart, &EvaluationContext::default());

    assert_eq!(result.len(), 2);
    assert_eq!(
        DiscountTotals::from_breakdowns(&result),
        Err(DiscountError::Overflow)
    );

    Ok(())
}

#[test]
fn stackable_promotions_are_not_blocked_by_an_exclusive_one() -> TestResult {
    let tenant = TenantUuid::new();
    let cart = cart(&[(ProductUuid::new(), 1, dec!(80.00))])?;
    let promotions = [
        percent_off(tenant, "exclusive", dec!(10)),
        percent_off(tenant, "blocked", dec!(15)),
        Promotion::new(
            tenant,
            "stacks",
            Strategy::FixedAmount(FixedAmount::new(dec!(5))),
        )
        .with_stackable(true),
    ];

    let result = resolve(&promotions, &cart, &EvaluationContext::default());

    assert_eq!(names(&result), ["exclusive", "stacks"]);

    Ok(())
}

#[test]
fn exhausted_usage_limit_is_never_applied() -> TestResult {
    let tenant = TenantUuid::new();
    let cart = cart(&[(ProductUuid::new(), 1, dec!(50.00))])?;
    let used_up = percent_off(tenant, "used up", dec!(10))
        .with_usage(UsageBudget::with_limit(5).with_count(5));
    let next = percent_off(tenant, "next", dec!(5));

    let result = resolve([&used_up, &next], &cart, &EvaluationContext::default());

    assert_eq!(names(&result), ["next"]);

    Ok(())
}

#[test]
fn promotions_with_no_effect_are_dropped_and_do_not_block() -> TestResult {
    let tenant = TenantUuid::new();
    let cart = cart(&[(ProductUuid::new(), 1, dec!(20.00))])?;
    let tiers_unreached = Promotion::new(
        tenant,
        "tiers",
        Strategy::Tiered(Tiered::new([Tier::new(
            dec!(100),
            Percentage::from(dec!(0.1)),
        )])),
    );
    let bundle_over_subtotal = Promotion::new(
        tenant,
        "bundle",
        Strategy::Bundle(Bundle::new(dec!(25.00))),
    );
    let fallback = percent_off(tenant, "fallback", dec!(5));

    let result = resolve(
        [&tiers_unreached, &bundle_over_subtotal, &fallback],
        &cart,
        &EvaluationContext::default(),
    );

    assert_eq!(names(&result), ["fallback"]);
    assert_eq!(
        result.first().map(|breakdown| breakdown.discount_amount),
        Some(dec!(1.00))
    );

    Ok(())
}

#[test]
fn inert_promotions_are_dropped() -> TestResult {
    let tenant = TenantUuid::new();
    let cart = cart(&[(ProductUuid::new(), 1, dec!(20.00))])?;
    let inert = Promotion::new(
        tenant,
        "inert",
        Strategy::Inert {
            strategy_type: "mystery_box".to_string(),
        },
    );

    assert!(resolve([&inert], &cart, &EvaluationContext::default()).is_empty());

    Ok(())
}

#[test]
fn product_in_partial_match_still_discounts_whole_cart() -> TestResult {
    let tenant = TenantUuid::new();
    let products: Vec<ProductUuid> = (0..5).map(|_| ProductUuid::new()).collect();
    let lines: Vec<(ProductUuid, u32, Decimal)> = products
        .iter()
        .map(|product| (*product, 1, dec!(10.00)))
        .collect();
    let cart = cart(&lines)?;

    let promotion = percent_off(tenant, "partial", dec!(10)).with_condition(
        Predicate::ProductIn {
            product_ids: products.iter().take(2).copied().collect(),
        },
    );

    let result = resolve([&promotion], &cart, &EvaluationContext::default());

    assert_eq!(
        result.first().map(|breakdown| breakdown.discount_amount),
        Some(dec!(5.00))
    );
    assert_eq!(
        result.first().map(|breakdown| breakdown.affected_items.len()),
        Some(5)
    );

    Ok(())
}

#[test]
fn conditions_and_context_gate_promotions() -> TestResult {
    let tenant = TenantUuid::new();
    let cart = cart(&[(ProductUuid::new(), 3, dec!(20.00))])?;
    let welcome = percent_off(tenant, "welcome", dec!(20)).with_condition(ConditionNode::all([
        Predicate::FirstPurchase.into(),
        Predicate::CartTotal {
            op: Comparator::Gte,
            value: dec!(50),
        }
        .into(),
    ]));

    let returning = resolve([&welcome], &cart, &EvaluationContext::default());
    let first_order = resolve([&welcome], &cart, &EvaluationContext::first_purchase());

    assert!(returning.is_empty());
    assert_eq!(names(&first_order), ["welcome"]);

    Ok(())
}

#[test]
fn empty_cart_and_empty_candidates_are_not_errors() -> TestResult {
    let tenant = TenantUuid::new();
    let promotion = percent_off(tenant, "any", dec!(10));
    let no_promotions: Vec<Promotion> = Vec::new();

    assert!(resolve([&promotion], &Cart::empty(None), &EvaluationContext::default()).is_empty());
    assert!(
        resolve(
            &no_promotions,
            &cart(&[(ProductUuid::new(), 1, dec!(1))])?,
            &EvaluationContext::default()
        )
        .is_empty()
    );

    Ok(())
}
