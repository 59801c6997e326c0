//! Coupon Validation
//!
//! The ordered accept-or-reject decision for one coupon against one cart.
//! Rejections are expected outcomes returned as values, not errors; the
//! first failing check wins so callers always see the same reason for the
//! same state.

use jiff::Timestamp;
use rust_decimal::Decimal;
use thiserror::Error;

use crate::{
    carts::Cart,
    coupons::CouponDefinition,
    stores::{self, RecognizedDomain},
};

/// Why a coupon was not accepted.
///
/// The `Display` texts are defaults; callers own the user-facing phrasing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Rejection {
    /// The coupon is switched off in the catalog.
    #[error("coupon is not active")]
    Inactive,

    /// The validity window has not opened yet.
    #[error("coupon is not valid yet")]
    NotStarted,

    /// The validity window has closed.
    #[error("coupon has expired")]
    Expired,

    /// The global redemption cap is exhausted.
    #[error("coupon usage limit has been reached")]
    GlobalLimitReached,

    /// The requesting user has exhausted their personal cap.
    #[error("coupon usage limit for this user has been reached")]
    PerUserLimitReached,

    /// No cart item matches the coupon's store restriction.
    #[error("coupon does not apply to any store in this cart")]
    NoMatchingStore {
        /// The stores the coupon does apply to, for display.
        eligible: Vec<String>,
    },

    /// The applicable subtotal is below the coupon's minimum order amount.
    #[error("minimum order amount of {minimum} not met")]
    BelowMinimum {
        /// The required applicable subtotal.
        minimum: Decimal,
    },

    /// The code is already applied to this cart.
    #[error("coupon is already applied to this cart")]
    AlreadyApplied,

    /// The code does not resolve to any catalog entry.
    #[error("coupon not found")]
    NotFound,

    /// The cart has no items.
    #[error("cart is empty")]
    EmptyCart,
}

/// Run the full ordered check sequence for one coupon against one cart.
///
/// Checks run in a fixed order: active flag, validity window, global usage
/// cap, per-user cap, store restriction, minimum order amount, duplicate
/// application. Pass `None` for `user_usage_count` when the caller has no
/// user identity; the per-user check is then skipped.
///
/// # Errors
///
/// Returns the first failing check as a [`Rejection`].
pub fn validate(
    coupon: &CouponDefinition,
    cart: &Cart,
    now: Timestamp,
    user_usage_count: Option<u32>,
    domains: &[RecognizedDomain],
) -> Result<(), Rejection> {
    validate_standalone(coupon, now, user_usage_count)?;

    let resolved = stores::resolve_all(cart.items(), domains);
    let applicability = stores::applicability(cart.items(), &resolved, &coupon.applicable_stores);

    if !coupon.applicable_stores.is_empty() && !applicability.matched() {
        return Err(Rejection::NoMatchingStore {
            eligible: coupon.applicable_stores.clone(),
        });
    }

    if applicability.subtotal < coupon.minimum_order {
        return Err(Rejection::BelowMinimum {
            minimum: coupon.minimum_order,
        });
    }

    let duplicate = cart
        .coupons()
        .iter()
        .any(|applied| applied.is_active && applied.code == coupon.code);

    if duplicate {
        return Err(Rejection::AlreadyApplied);
    }

    Ok(())
}

/// Run the cart-free subset of the check sequence: active flag, validity
/// window and usage caps.
///
/// This is the preview validation offered before a cart exists, and the
/// check the calculator re-runs against live catalog state on every
/// recompute (with no user identity).
///
/// # Errors
///
/// Returns the first failing check as a [`Rejection`].
pub fn validate_standalone(
    coupon: &CouponDefinition,
    now: Timestamp,
    user_usage_count: Option<u32>,
) -> Result<(), Rejection> {
    if !coupon.is_active {
        return Err(Rejection::Inactive);
    }

    if now < coupon.valid_from {
        return Err(Rejection::NotStarted);
    }

    if now > coupon.valid_until {
        return Err(Rejection::Expired);
    }

    if let Some(limit) = coupon.usage_limit
        && coupon.used_count >= limit
    {
        return Err(Rejection::GlobalLimitReached);
    }

    if let Some(count) = user_usage_count
        && count >= coupon.per_user_limit
    {
        return Err(Rejection::PerUserLimitReached);
    }

    Ok(())
}
