//! Discount Calculation
//!
//! The full-recompute pass over a cart's applied coupons: every pass
//! re-derives the summary from scratch, so stale amounts can never survive a
//! mutation.

use std::cmp::Reverse;

use jiff::Timestamp;
use rust_decimal::Decimal;
use rustc_hash::FxHashMap;
use smallvec::SmallVec;
use tracing::debug;

use crate::{
    carts::Cart,
    catalog::{CatalogError, CouponCatalog},
    coupons::{AppliedCoupon, CouponDefinition, Discount, validation},
    stores::{self, RecognizedDomain, StoreId},
    summary::{AppliedDiscount, DiscountSummary},
};

/// Compute the discount summary for every coupon applied to the cart.
///
/// Coupons are taken in descending live priority, with ties broken by
/// application order. Each one is re-validated against its live catalog
/// entry and skipped without error when it no longer passes; the store scope
/// alone comes from the apply-time snapshot. Amounts are clamped so the
/// running total never exceeds the cart total, and coupons whose clamped
/// contribution is zero are dropped from the result.
///
/// # Errors
///
/// Returns a [`CatalogError`] if a catalog lookup fails. Rejections never
/// surface here; an invalid coupon is simply non-contributing.
pub fn calculate<C: CouponCatalog>(
    cart: &Cart,
    catalog: &C,
    domains: &[RecognizedDomain],
    now: Timestamp,
) -> Result<DiscountSummary, CatalogError> {
    let cart_total = cart.total();
    let resolved = stores::resolve_all(cart.items(), domains);

    // Pair each snapshot with its live definition; deleted entries drop out.
    let mut live: SmallVec<[(usize, &AppliedCoupon, CouponDefinition); 4]> = SmallVec::new();

    for (position, applied) in cart.coupons().iter().enumerate() {
        if !applied.is_active {
            debug!(code = %applied.code, "skipping coupon toggled off on the cart");
            continue;
        }

        let Some(definition) = catalog.find_by_key(applied.coupon)? else {
            debug!(code = %applied.code, "skipping coupon no longer in the catalog");
            continue;
        };

        live.push((position, applied, definition));
    }

    live.sort_by_key(|(position, _, definition)| (Reverse(definition.priority), *position));

    let mut applied_discounts: SmallVec<[AppliedDiscount; 4]> = SmallVec::new();
    let mut store_breakdown: FxHashMap<StoreId, Decimal> = FxHashMap::default();
    let mut total = Decimal::ZERO;

    for (_, applied, definition) in &live {
        if let Err(rejection) = validation::validate_standalone(definition, now, None) {
            debug!(code = %applied.code, %rejection, "skipping coupon that no longer validates");
            continue;
        }

        // Scope is pinned at apply time; everything else is live state.
        let applicability =
            stores::applicability(cart.items(), &resolved, &applied.applicable_stores);

        if !applied.applicable_stores.is_empty() && !applicability.matched() {
            debug!(code = %applied.code, "skipping coupon with no matching store");
            continue;
        }

        if applicability.subtotal < definition.minimum_order {
            debug!(code = %applied.code, "skipping coupon below its minimum order");
            continue;
        }

        let subtotal = applicability.subtotal;
        let raw = raw_discount(definition, subtotal);
        let amount = raw.min(cart_total - total);

        if amount <= Decimal::ZERO {
            debug!(code = %applied.code, "dropping coupon with nothing left to discount");
            continue;
        }

        for (store, matched) in applicability.by_store {
            let share = amount * matched / subtotal;
            *store_breakdown.entry(store).or_insert(Decimal::ZERO) += share;
        }

        total += amount;

        applied_discounts.push(AppliedDiscount {
            code: applied.code.clone(),
            coupon: applied.coupon,
            amount,
            discount: definition.discount,
            applicable_stores: applied.applicable_stores.clone(),
        });
    }

    Ok(DiscountSummary::aggregate(
        applied_discounts,
        store_breakdown,
        cart_total,
    ))
}

/// The amount one coupon takes before the stacking clamp.
///
/// Percentage discounts apply to the applicable subtotal, then honour the
/// per-coupon cap; neither kind may exceed the subtotal it was computed
/// from, so a coupon never discounts items it does not cover.
fn raw_discount(definition: &CouponDefinition, applicable_subtotal: Decimal) -> Decimal {
    match definition.discount {
        Discount::Percentage(fraction) => {
            let mut amount = fraction * applicable_subtotal;

            if let Some(cap) = definition.maximum_discount {
                amount = amount.min(cap);
            }

            amount.min(applicable_subtotal)
        }
        Discount::Fixed(value) => value.min(applicable_subtotal),
    }
}
