//! Promotion Conditions
//!
//! Nested boolean condition trees gating whether a promotion applies to a
//! cart. Conditions decide applicability only; what gets discounted is the
//! strategy's concern.

use rust_decimal::Decimal;
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};

use crate::{
    cart::Cart,
    context::EvaluationContext,
    uuids::{CollectionUuid, ProductUuid, SegmentUuid},
};

/// Comparison operator for numeric predicates and segment rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Comparator {
    /// Actual value must be greater than or equal to the threshold.
    Gte,

    /// Actual value must be less than or equal to the threshold.
    Lte,
}

impl Comparator {
    /// Compare `actual` against `threshold`.
    #[must_use]
    pub fn compare<T: PartialOrd>(self, actual: &T, threshold: &T) -> bool {
        match self {
            Self::Gte => actual >= threshold,
            Self::Lte => actual <= threshold,
        }
    }
}

/// Boolean operation used to combine child conditions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BoolOp {
    /// All children must hold. No children holds vacuously.
    And,

    /// At least one child must hold. No children never holds.
    Or,
}

/// Atomic condition evaluated against a cart and its context.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Predicate {
    /// Cart subtotal compared against a value.
    CartTotal {
        /// Comparison operator.
        op: Comparator,

        /// Threshold amount.
        value: Decimal,
    },

    /// Cart item count (sum of quantities) compared against a value.
    ItemCount {
        /// Comparison operator.
        op: Comparator,

        /// Threshold count.
        value: u64,
    },

    /// Any cart line is one of these products.
    ProductIn {
        /// Target products.
        product_ids: FxHashSet<ProductUuid>,
    },

    /// Any cart line belongs to one of these collections.
    CollectionIn {
        /// Target collections.
        collection_ids: FxHashSet<CollectionUuid>,
    },

    /// The customer is a member of this segment.
    CustomerSegment {
        /// Target segment.
        segment_id: SegmentUuid,
    },

    /// The customer has never completed an order.
    FirstPurchase,

    /// A single line of this product has at least this quantity.
    MinQuantity {
        /// Target product.
        product_id: ProductUuid,

        /// Minimum quantity on one line.
        quantity: u32,
    },
}

impl Predicate {
    /// Evaluate the predicate.
    #[must_use]
    pub fn evaluate(&self, cart: &Cart, context: &EvaluationContext) -> bool {
        match self {
            Self::CartTotal { op, value } => op.compare(&cart.subtotal(), value),
            Self::ItemCount { op, value } => op.compare(&cart.item_count(), value),
            Self::ProductIn { product_ids } => cart
                .lines()
                .iter()
                .any(|line| product_ids.contains(&line.product_id())),
            Self::CollectionIn { collection_ids } => cart.lines().iter().any(|line| {
                line.collection_ids()
                    .iter()
                    .any(|collection| collection_ids.contains(collection))
            }),
            Self::CustomerSegment { segment_id } => context.in_segment(*segment_id),
            Self::FirstPurchase => context.is_first_purchase,
            Self::MinQuantity {
                product_id,
                quantity,
            } => cart
                .lines()
                .iter()
                .any(|line| line.product_id() == *product_id && line.quantity() >= *quantity),
        }
    }
}

/// Condition tree node: an operator over children, or a predicate leaf.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ConditionNode {
    /// Operator node combining child conditions.
    Operator {
        /// How `children` are combined.
        operator: BoolOp,

        /// Child conditions.
        children: Vec<ConditionNode>,
    },

    /// Predicate leaf.
    Predicate(Predicate),
}

impl ConditionNode {
    /// A condition that always holds (an empty AND).
    #[must_use]
    pub const fn always() -> Self {
        Self::Operator {
            operator: BoolOp::And,
            children: Vec::new(),
        }
    }

    /// All of the given conditions must hold.
    #[must_use]
    pub fn all(children: impl IntoIterator<Item = ConditionNode>) -> Self {
        Self::Operator {
            operator: BoolOp::And,
            children: children.into_iter().collect(),
        }
    }

    /// Any of the given conditions must hold.
    #[must_use]
    pub fn any(children: impl IntoIterator<Item = ConditionNode>) -> Self {
        Self::Operator {
            operator: BoolOp::Or,
            children: children.into_iter().collect(),
        }
    }

    /// Evaluate the condition tree against a cart and its context.
    #[must_use]
    pub fn evaluate(&self, cart: &Cart, context: &EvaluationContext) -> bool {
        match self {
            Self::Operator { operator, children } => match operator {
                BoolOp::And => children.iter().all(|child| child.evaluate(cart, context)),
                BoolOp::Or => children.iter().any(|child| child.evaluate(cart, context)),
            },
            Self::Predicate(predicate) => predicate.evaluate(cart, context),
        }
    }
}

impl Default for ConditionNode {
    fn default() -> Self {
        Self::always()
    }
}

impl From<Predicate> for ConditionNode {
    fn from(predicate: Predicate) -> Self {
        Self::Predicate(predicate)
    }
}

/// Evaluate a condition tree against a cart and its context.
#[must_use]
pub fn evaluate(node: &ConditionNode, cart: &Cart, context: &EvaluationContext) -> bool {
    node.evaluate(cart, context)
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;
    use testresult::TestResult;

    use crate::{
        cart::CartLine,
        uuids::{CollectionUuid, VariantUuid},
    };

    use super::*;

    fn line(product: ProductUuid, quantity: u32, unit_price: Decimal) -> CartLine {
        CartLine::new(VariantUuid::new(), product, [], quantity, unit_price)
    }

    fn cart_total(op: Comparator, value: Decimal) -> ConditionNode {
        Predicate::CartTotal { op, value }.into()
    }

    #[test]
    fn empty_and_holds_and_empty_or_does_not() {
        let cart = Cart::empty(None);
        let context = EvaluationContext::default();

        assert!(ConditionNode::all([]).evaluate(&cart, &context));
        assert!(!ConditionNode::any([]).evaluate(&cart, &context));
        assert!(ConditionNode::default().evaluate(&cart, &context));
    }

    #[test]
    fn cart_total_compares_inclusively() -> TestResult {
        let cart = Cart::with_lines([line(ProductUuid::new(), 1, dec!(50.00))], None)?;
        let context = EvaluationContext::default();

        assert!(cart_total(Comparator::Gte, dec!(50)).evaluate(&cart, &context));
        assert!(cart_total(Comparator::Lte, dec!(50)).evaluate(&cart, &context));
        assert!(!cart_total(Comparator::Gte, dec!(50.01)).evaluate(&cart, &context));

        Ok(())
    }

    #[test]
    fn item_count_sums_quantities() -> TestResult {
        let cart = Cart::with_lines(
            [
                line(ProductUuid::new(), 2, dec!(1)),
                line(ProductUuid::new(), 3, dec!(1)),
            ],
            None,
        )?;
        let node: ConditionNode = Predicate::ItemCount {
            op: Comparator::Gte,
            value: 5,
        }
        .into();

        assert!(node.evaluate(&cart, &EvaluationContext::default()));

        Ok(())
    }

    #[test]
    fn product_in_matches_on_any_line() -> TestResult {
        let targeted = ProductUuid::new();
        let cart = Cart::with_lines(
            [
                line(ProductUuid::new(), 1, dec!(5)),
                line(targeted, 1, dec!(5)),
            ],
            None,
        )?;

        let hit: ConditionNode = Predicate::ProductIn {
            product_ids: [targeted, ProductUuid::new()].into_iter().collect(),
        }
        .into();

        let miss: ConditionNode = Predicate::ProductIn {
            product_ids: [ProductUuid::new()].into_iter().collect(),
        }
        .into();

        assert!(hit.evaluate(&cart, &EvaluationContext::default()));
        assert!(!miss.evaluate(&cart, &EvaluationContext::default()));

        Ok(())
    }

    #[test]
    fn collection_in_intersects_line_collections() -> TestResult {
        let summer = CollectionUuid::new();
        let cart = Cart::with_lines(
            [CartLine::new(
                VariantUuid::new(),
                ProductUuid::new(),
                [CollectionUuid::new(), summer],
                1,
                dec!(5),
            )],
            None,
        )?;

        let node: ConditionNode = Predicate::CollectionIn {
            collection_ids: [summer].into_iter().collect(),
        }
        .into();

        assert!(node.evaluate(&cart, &EvaluationContext::default()));

        Ok(())
    }

    #[test]
    fn customer_segment_and_first_purchase_read_context() {
        let cart = Cart::empty(None);
        let vip = SegmentUuid::new();
        let node = ConditionNode::all([
            Predicate::CustomerSegment { segment_id: vip }.into(),
            Predicate::FirstPurchase.into(),
        ]);

        assert!(node.evaluate(&cart, &EvaluationContext::new(true, [vip])));
        assert!(!node.evaluate(&cart, &EvaluationContext::new(false, [vip])));
        assert!(!node.evaluate(&cart, &EvaluationContext::new(true, [])));
    }

    #[test]
    fn min_quantity_is_per_line_not_summed() -> TestResult {
        let product = ProductUuid::new();
        let cart = Cart::with_lines(
            [line(product, 2, dec!(1)), line(product, 2, dec!(1))],
            None,
        )?;

        let three: ConditionNode = Predicate::MinQuantity {
            product_id: product,
            quantity: 3,
        }
        .into();

        let two: ConditionNode = Predicate::MinQuantity {
            product_id: product,
            quantity: 2,
        }
        .into();

        assert!(!three.evaluate(&cart, &EvaluationContext::default()));
        assert!(two.evaluate(&cart, &EvaluationContext::default()));

        Ok(())
    }

    #[test]
    fn supports_nested_boolean_groups() -> TestResult {
        let cart = Cart::with_lines([line(ProductUuid::new(), 1, dec!(30))], None)?;
        let context = EvaluationContext::default();

        let node = ConditionNode::all([
            cart_total(Comparator::Gte, dec!(20)),
            ConditionNode::any([
                Predicate::FirstPurchase.into(),
                cart_total(Comparator::Lte, dec!(40)),
            ]),
        ]);

        assert!(node.evaluate(&cart, &context));
        assert!(!evaluate(
            &ConditionNode::all([node, Predicate::FirstPurchase.into()]),
            &cart,
            &context
        ));

        Ok(())
    }

    #[test]
    fn deserializes_operator_and_predicate_nodes() -> TestResult {
        let yaml = r#"
operator: or
children:
  - type: first_purchase
  - operator: and
    children:
      - type: cart_total
        op: gte
        value: "100"
      - type: min_quantity
        product_id: "00000000-0000-0000-0000-00000000b001"
        quantity: 2
"#;
        let node: ConditionNode = serde_norway::from_str(yaml)?;

        assert!(matches!(
            &node,
            ConditionNode::Operator { operator: BoolOp::Or, children }
                if children.len() == 2
                    && children.first() == Some(&ConditionNode::Predicate(Predicate::FirstPurchase))
        ));

        Ok(())
    }

    #[test]
    fn rejects_unknown_predicate_tags() {
        let yaml = r"
type: lucky_dip
value: 7
";
        let result: Result<ConditionNode, _> = serde_norway::from_str(yaml);

        assert!(result.is_err());
    }

    #[test]
    fn rejects_unknown_operators() {
        let yaml = r"
operator: xor
children: []
";
        let result: Result<ConditionNode, _> = serde_norway::from_str(yaml);

        assert!(result.is_err());
    }
}
