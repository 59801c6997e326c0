//! Tally prelude.
//!
//! Convenience exports for common library consumers.

pub use crate::{
    calculator::calculate,
    carts::{Cart, CartError, CartItem},
    catalog::{CatalogError, CouponCatalog, InMemoryCatalog},
    checkout::{Checkout, CheckoutError, CouponRef, Verdict},
    coupons::{
        AppliedCoupon, CouponCode, CouponDefinition, CouponKey, Discount, validation::Rejection,
    },
    stores::{RecognizedDomain, Store, StoreId},
    summary::{AppliedDiscount, DiscountSummary, SummaryError},
    usage::{InMemoryUsageHistory, UsageError, UsageHistory, UserId},
};
