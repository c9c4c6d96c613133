//! Cart
//!
//! The immutable cart snapshot handed to the promotion engine. Lines arrive
//! already joined to their product and collections; the snapshot derives the
//! subtotal and item count once, at construction.

use rust_decimal::Decimal;
use serde::Deserialize;
use smallvec::SmallVec;
use thiserror::Error;

use crate::uuids::{CollectionUuid, CustomerUuid, ProductUuid, VariantUuid};

/// Errors related to cart construction.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CartError {
    /// A line has a zero quantity (line index).
    #[error("line {0} has a zero quantity")]
    ZeroQuantity(usize),

    /// A line has a negative unit price (line index).
    #[error("line {0} has a negative unit price")]
    NegativePrice(usize),

    /// A line total or the subtotal could not be represented.
    #[error("cart totals overflowed")]
    Overflow,
}

/// A single cart line, enriched with product and collection membership.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(from = "CartLineInput")]
pub struct CartLine {
    variant_id: VariantUuid,
    product_id: ProductUuid,
    collection_ids: SmallVec<[CollectionUuid; 2]>,
    quantity: u32,
    unit_price: Decimal,
    line_total: Decimal,
}

impl CartLine {
    /// Create a new cart line. The line total is `unit_price × quantity`.
    ///
    /// If the multiplication overflows the line total saturates to
    /// [`Decimal::MAX`]; [`Cart::with_lines`] rejects such lines.
    pub fn new(
        variant_id: VariantUuid,
        product_id: ProductUuid,
        collection_ids: impl IntoIterator<Item = CollectionUuid>,
        quantity: u32,
        unit_price: Decimal,
    ) -> Self {
        let line_total = unit_price
            .checked_mul(Decimal::from(quantity))
            .unwrap_or(Decimal::MAX);

        Self {
            variant_id,
            product_id,
            collection_ids: collection_ids.into_iter().collect(),
            quantity,
            unit_price,
            line_total,
        }
    }

    /// Return the variant id.
    pub const fn variant_id(&self) -> VariantUuid {
        self.variant_id
    }

    /// Return the product id.
    pub const fn product_id(&self) -> ProductUuid {
        self.product_id
    }

    /// Return the collections the line's product belongs to.
    pub fn collection_ids(&self) -> &[CollectionUuid] {
        &self.collection_ids
    }

    /// Return the quantity.
    pub const fn quantity(&self) -> u32 {
        self.quantity
    }

    /// Return the price of a single unit.
    pub const fn unit_price(&self) -> Decimal {
        self.unit_price
    }

    /// Return `unit_price × quantity`.
    pub const fn line_total(&self) -> Decimal {
        self.line_total
    }
}

/// Serialized shape of a cart line; the line total is always derived.
#[derive(Debug, Deserialize)]
struct CartLineInput {
    variant_id: VariantUuid,
    product_id: ProductUuid,
    #[serde(default)]
    collection_ids: Vec<CollectionUuid>,
    quantity: u32,
    unit_price: Decimal,
}

impl From<CartLineInput> for CartLine {
    fn from(input: CartLineInput) -> Self {
        Self::new(
            input.variant_id,
            input.product_id,
            input.collection_ids,
            input.quantity,
            input.unit_price,
        )
    }
}

/// Cart-for-evaluation snapshot
#[derive(Debug, Clone, PartialEq)]
pub struct Cart {
    lines: Vec<CartLine>,
    subtotal: Decimal,
    item_count: u64,
    customer_id: Option<CustomerUuid>,
}

impl Cart {
    /// Create an empty cart.
    pub const fn empty(customer_id: Option<CustomerUuid>) -> Self {
        Self {
            lines: Vec::new(),
            subtotal: Decimal::ZERO,
            item_count: 0,
            customer_id,
        }
    }

    /// Create a cart from the given lines.
    ///
    /// # Errors
    ///
    /// Returns a [`CartError`] if a line has a zero quantity or negative price,
    /// or if the totals cannot be represented.
    pub fn with_lines(
        lines: impl Into<Vec<CartLine>>,
        customer_id: Option<CustomerUuid>,
    ) -> Result<Self, CartError> {
        let lines = lines.into();

        let (subtotal, item_count) = lines.iter().enumerate().try_fold(
            (Decimal::ZERO, 0u64),
            |(subtotal, item_count), (i, line)| {
                if line.quantity == 0 {
                    return Err(CartError::ZeroQuantity(i));
                }

                if line.unit_price < Decimal::ZERO {
                    return Err(CartError::NegativePrice(i));
                }

                if line.line_total == Decimal::MAX {
                    return Err(CartError::Overflow);
                }

                let subtotal = subtotal
                    .checked_add(line.line_total)
                    .ok_or(CartError::Overflow)?;

                Ok((subtotal, item_count + u64::from(line.quantity)))
            },
        )?;

        Ok(Self {
            lines,
            subtotal,
            item_count,
            customer_id,
        })
    }

    /// Return the cart lines.
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    /// Return the sum of all line totals.
    pub const fn subtotal(&self) -> Decimal {
        self.subtotal
    }

    /// Return the sum of all line quantities.
    pub const fn item_count(&self) -> u64 {
        self.item_count
    }

    /// Return the customer, if the cart belongs to one.
    pub const fn customer_id(&self) -> Option<CustomerUuid> {
        self.customer_id
    }

    /// Check if the cart has no lines.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Return every variant in the cart, in line order.
    pub fn variant_ids(&self) -> Vec<VariantUuid> {
        self.lines.iter().map(CartLine::variant_id).collect()
    }
}
