//! Order Ledger
//!
//! Read-only view of historical orders and customer accounts, queried in
//! bounded pages of per-customer aggregates.

use std::collections::BTreeMap;

use async_trait::async_trait;
use jiff::Timestamp;
use mockall::automock;
use rust_decimal::Decimal;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::uuids::{CustomerUuid, OrderUuid, TenantUuid};

/// Errors raised by an order ledger.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum LedgerError {
    /// Page limit was zero.
    #[error("ledger page limit must be greater than zero")]
    InvalidPage,

    /// Aggregated totals could not be represented.
    #[error("ledger aggregate overflowed")]
    Overflow,

    /// Backing store could not be read.
    #[error("ledger unavailable: {0}")]
    Unavailable(String),
}

/// A bounded window into an ordered result set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LedgerPage {
    /// Rows to skip.
    pub offset: usize,

    /// Maximum rows to return.
    pub limit: usize,
}

impl LedgerPage {
    /// First page of the given size.
    pub const fn first(limit: usize) -> Self {
        Self { offset: 0, limit }
    }

    /// Page following this one.
    #[must_use]
    pub const fn next(self) -> Self {
        Self {
            offset: self.offset.saturating_add(self.limit),
            limit: self.limit,
        }
    }
}

/// A customer's order history for one tenant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerAggregate {
    /// Customer id.
    pub customer_id: CustomerUuid,

    /// Account creation instant, if the customer has an account.
    pub registered_at: Option<Timestamp>,

    /// Number of orders for the tenant.
    pub order_count: u64,

    /// Sum of order totals for the tenant.
    pub total_spent: Decimal,
}

/// Source of per-customer order aggregates.
#[automock]
#[async_trait]
pub trait OrderLedger: Send + Sync {
    /// Return one page of aggregates for customers with at least one order
    /// for `tenant`, ordered by customer id.
    ///
    /// Customers without an account row are still returned, with no
    /// registration instant.
    async fn customer_aggregates(
        &self,
        tenant: TenantUuid,
        page: LedgerPage,
    ) -> Result<Vec<CustomerAggregate>, LedgerError>;
}

/// Every aggregate for one tenant, loaded page by page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LedgerSnapshot {
    aggregates: Vec<CustomerAggregate>,
}

impl LedgerSnapshot {
    /// Create a snapshot from aggregates already in hand.
    pub fn from_aggregates(aggregates: impl IntoIterator<Item = CustomerAggregate>) -> Self {
        Self {
            aggregates: aggregates.into_iter().collect(),
        }
    }

    /// Read every page of aggregates for the tenant.
    ///
    /// Stops at the first page shorter than `page_size`.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::InvalidPage`] if `page_size` is zero, or any error
    /// raised by the ledger.
    pub async fn load<L>(
        ledger: &L,
        tenant: TenantUuid,
        page_size: usize,
    ) -> Result<Self, LedgerError>
    where
        L: OrderLedger + ?Sized,
    {
        if page_size == 0 {
            return Err(LedgerError::InvalidPage);
        }

        let mut aggregates = Vec::new();
        let mut page = LedgerPage::first(page_size);

        loop {
            let rows = ledger.customer_aggregates(tenant, page).await?;
            let fetched = rows.len();

            aggregates.extend(rows);

            if fetched < page_size {
                break;
            }

            page = page.next();
        }

        Ok(Self { aggregates })
    }

    /// Return the aggregates.
    pub fn aggregates(&self) -> &[CustomerAggregate] {
        &self.aggregates
    }

    /// Number of customers in the snapshot.
    pub fn len(&self) -> usize {
        self.aggregates.len()
    }

    /// Whether no customer has ordered.
    pub fn is_empty(&self) -> bool {
        self.aggregates.is_empty()
    }
}

/// A customer account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerAccount {
    /// Customer id.
    pub customer_id: CustomerUuid,

    /// Account creation instant.
    pub registered_at: Timestamp,
}

/// A completed order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerOrder {
    /// Order id.
    #[serde(default)]
    pub id: OrderUuid,

    /// Tenant the order was placed with.
    pub tenant_id: TenantUuid,

    /// Customer who placed the order.
    pub customer_id: CustomerUuid,

    /// Order total.
    pub total: Decimal,
}

/// Ledger held in memory, for fixtures and tests.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct InMemoryLedger {
    #[serde(default)]
    accounts: Vec<LedgerAccount>,

    #[serde(default)]
    orders: Vec<LedgerOrder>,
}

impl InMemoryLedger {
    /// Create an empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a customer account.
    #[must_use]
    pub fn with_account(mut self, customer_id: CustomerUuid, registered_at: Timestamp) -> Self {
        self.accounts.push(LedgerAccount {
            customer_id,
            registered_at,
        });
        self
    }

    /// Add an order.
    #[must_use]
    pub fn with_order(
        mut self,
        tenant_id: TenantUuid,
        customer_id: CustomerUuid,
        total: Decimal,
    ) -> Self {
        self.orders.push(LedgerOrder {
            id: OrderUuid::new(),
            tenant_id,
            customer_id,
            total,
        });
        self
    }

    /// Return the accounts.
    pub fn accounts(&self) -> &[LedgerAccount] {
        &self.accounts
    }

    /// Return the orders.
    pub fn orders(&self) -> &[LedgerOrder] {
        &self.orders
    }

    fn aggregate(&self, tenant: TenantUuid) -> Result<Vec<CustomerAggregate>, LedgerError> {
        let registered: FxHashMap<CustomerUuid, Timestamp> = self
            .accounts
            .iter()
            .map(|account| (account.customer_id, account.registered_at))
            .collect();

        let mut totals: BTreeMap<CustomerUuid, (u64, Decimal)> = BTreeMap::new();

        for order in self.orders.iter().filter(|order| order.tenant_id == tenant) {
            let (count, spent) = totals
                .entry(order.customer_id)
                .or_insert((0, Decimal::ZERO));

            *count += 1;
            *spent = spent
                .checked_add(order.total)
                .ok_or(LedgerError::Overflow)?;
        }

        Ok(totals
            .into_iter()
            .map(|(customer_id, (order_count, total_spent))| CustomerAggregate {
                customer_id,
                registered_at: registered.get(&customer_id).copied(),
                order_count,
                total_spent,
            })
            .collect())
    }
}

#[async_trait]
impl OrderLedger for InMemoryLedger {
    async fn customer_aggregates(
        &self,
        tenant: TenantUuid,
        page: LedgerPage,
    ) -> Result<Vec<CustomerAggregate>, LedgerError> {
        if page.limit == 0 {
            return Err(LedgerError::InvalidPage);
        }

        Ok(self
            .aggregate(tenant)?
            .into_iter()
            .skip(page.offset)
            .take(page.limit)
            .collect())
    }
}
