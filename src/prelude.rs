//! Storefront promotions prelude.
//!
//! Convenience exports for common library consumers.

pub use crate::{
    cart::{Cart, CartError, CartLine},
    conditions::{BoolOp, Comparator, ConditionNode, Predicate},
    context::EvaluationContext,
    discounts::{DiscountBreakdown, DiscountError, DiscountTotals},
    fixtures::{Fixture, FixtureError},
    promotions::{
        Promotion, PromotionCatalog, PromotionKind, PromotionRecord, PromotionStatus, Schedule,
        UsageBudget,
    },
    segments::{
        CustomerAggregate, CustomerSegment, InMemoryLedger, InMemoryMembershipStore, LedgerError,
        LedgerPage, LedgerSnapshot, MembershipError, MembershipStore, OrderLedger, SegmentError,
        SegmentEvaluator, SegmentEvaluatorConfig, SegmentRefresher, SegmentRule,
    },
    stacking::{SkipReason, resolve},
    strategies::{
        Bundle, BuyXGetY, FixedAmount, PercentageOff, Strategy, StrategyError, StrategyOutcome,
        StrategyParams, StrategyType, Tier, Tiered,
    },
    uuids::{
        CollectionUuid, CustomerUuid, OrderUuid, ProductUuid, PromotionUuid, SegmentUuid,
        TenantUuid, TypedUuid, VariantUuid,
    },
};
