//! Storefront Promotions
//!
//! Promotion and discount evaluation for a multi-tenant storefront: condition
//! trees gating each promotion, the discount strategies, the stacking resolver
//! that combines candidates in a single priority-ordered pass, and the segment
//! rules that decide which customers a promotion can target.

pub mod cart;
pub mod conditions;
pub mod context;
pub mod discounts;
pub mod fixtures;
pub mod prelude;
pub mod promotions;
pub mod segments;
pub mod stacking;
pub mod strategies;
pub mod uuids;
