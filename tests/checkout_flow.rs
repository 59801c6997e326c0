//! Integration test for the storefront fixture set covering the full
//! checkout flow: apply, reject, remove, toggle and recompute.
//!
//! The storefront cart totals $124.00 across four lines:
//!
//! - Brightmart item: $45.00
//! - Local item resolved to `shop.hartley.coffee`: 2 × $18.50 = $37.00
//! - Local item resolved to `books.pellum.io`: $24.00
//! - Nova Outlet item: $18.00
//!
//! Expected stacking at 2026-08-01 (descending priority):
//!
//! 1. WELCOME10 (10%, priority 10, unrestricted) - $12.40 off,
//!    attributed proportionally: brightmart $4.50, shop.hartley.coffee
//!    $3.70, books.pellum.io $2.40, nova-outlet $1.80
//! 2. COFFEE5 ($5.00 fixed, priority 5, shop.hartley.coffee only) -
//!    $5.00 off the $37.00 coffee subtotal
//! 3. BOOKWORM (25%, priority 0, books.pellum.io only, min $20.00) -
//!    25% of $24.00 = $6.00 off
//!
//! Expected total: $12.40 + $5.00 + $6.00 = $23.40

use rust_decimal::Decimal;
use testresult::TestResult;

use jiff::Timestamp;
use tally::{
    checkout::Verdict,
    coupons::{CouponCode, validation::Rejection},
    fixtures::Fixture,
    stores::StoreId,
    usage::{InMemoryUsageHistory, UserId},
};

fn now() -> Timestamp {
    "2026-08-01T12:00:00Z".parse().expect("valid timestamp")
}

#[test]
fn coupons_stack_and_attribute_across_stores() -> TestResult {
    let fixture = Fixture::from_set("storefront")?;
    let checkout = fixture.checkout();
    let mut cart = fixture.cart(None)?;

    assert_eq!(cart.total(), Decimal::new(12400, 2));

    assert!(checkout.apply(&mut cart, "WELCOME10", now(), None)?.is_accepted());
    assert_eq!(cart.summary().total_discount(), Decimal::new(1240, 2));

    assert!(checkout.apply(&mut cart, "COFFEE5", now(), None)?.is_accepted());
    assert_eq!(cart.summary().total_discount(), Decimal::new(1740, 2));

    assert!(checkout.apply(&mut cart, "BOOKWORM", now(), None)?.is_accepted());
    assert_eq!(cart.summary().total_discount(), Decimal::new(2340, 2));

    let summary = cart.summary();
    let breakdown = summary.store_breakdown();

    assert_eq!(
        breakdown.get(&StoreId::new("brightmart")),
        Some(&Decimal::new(450, 2))
    );
    assert_eq!(
        breakdown.get(&StoreId::new("shop.hartley.coffee")),
        Some(&Decimal::new(870, 2))
    );
    assert_eq!(
        breakdown.get(&StoreId::new("books.pellum.io")),
        Some(&Decimal::new(840, 2))
    );
    assert_eq!(
        breakdown.get(&StoreId::new("nova-outlet")),
        Some(&Decimal::new(180, 2))
    );

    let attributed: Decimal = breakdown.values().copied().sum();
    assert_eq!(attributed, summary.total_discount(), "attribution covers the total");

    Ok(())
}

#[test]
fn rejected_codes_leave_the_cart_unchanged() -> TestResult {
    let fixture = Fixture::from_set("storefront")?;
    let checkout = fixture.checkout();
    let mut cart = fixture.cart(None)?;

    checkout.apply(&mut cart, "WELCOME10", now(), None)?;

    assert_eq!(
        checkout.apply(&mut cart, "RETRO15", now(), None)?,
        Verdict::Rejected(Rejection::Expired)
    );
    assert_eq!(
        checkout.apply(&mut cart, "BIGSPEND20", now(), None)?,
        Verdict::Rejected(Rejection::BelowMinimum {
            minimum: Decimal::new(15000, 2)
        })
    );
    assert_eq!(
        checkout.apply(&mut cart, "FLASH50", now(), None)?,
        Verdict::Rejected(Rejection::GlobalLimitReached)
    );
    assert_eq!(
        checkout.apply(&mut cart, "WELCOME10", now(), None)?,
        Verdict::Rejected(Rejection::AlreadyApplied)
    );

    assert_eq!(cart.coupons().len(), 1);
    assert_eq!(cart.summary().total_discount(), Decimal::new(1240, 2));

    Ok(())
}

#[test]
fn removing_and_toggling_recompute_the_summary() -> TestResult {
    let fixture = Fixture::from_set("storefront")?;
    let checkout = fixture.checkout();
    let mut cart = fixture.cart(None)?;

    checkout.apply(&mut cart, "WELCOME10", now(), None)?;
    checkout.apply(&mut cart, "COFFEE5", now(), None)?;
    checkout.apply(&mut cart, "BOOKWORM", now(), None)?;

    checkout.remove(&mut cart, &CouponCode::new("COFFEE5").into(), now())?;

    assert_eq!(cart.coupons().len(), 2);
    assert_eq!(cart.summary().total_discount(), Decimal::new(1840, 2));

    checkout.set_coupon_active(&mut cart, &CouponCode::new("BOOKWORM").into(), false, now())?;

    assert_eq!(cart.coupons().len(), 2, "a toggled coupon stays on the cart");
    assert_eq!(cart.summary().total_discount(), Decimal::new(1240, 2));

    checkout.set_coupon_active(&mut cart, &CouponCode::new("BOOKWORM").into(), true, now())?;

    assert_eq!(cart.summary().total_discount(), Decimal::new(1840, 2));

    Ok(())
}

#[test]
fn scoped_coupon_needs_a_matching_item() -> TestResult {
    let fixture = Fixture::from_set("storefront")?;
    let checkout = fixture.checkout();

    // Only the Brightmart line; no coffee item in sight.
    let mut cart = fixture.cart(Some(1))?;

    let verdict = checkout.apply(&mut cart, "COFFEE5", now(), None)?;

    assert_eq!(
        verdict,
        Verdict::Rejected(Rejection::NoMatchingStore {
            eligible: vec!["shop.hartley.coffee".to_string()]
        })
    );
    assert!(cart.coupons().is_empty());

    Ok(())
}

#[test]
fn deactivating_a_catalog_entry_zeroes_it_on_recompute() -> TestResult {
    let mut fixture = Fixture::from_set("storefront")?;
    let mut cart = fixture.cart(None)?;

    {
        let checkout = fixture.checkout();
        checkout.apply(&mut cart, "WELCOME10", now(), None)?;
        checkout.apply(&mut cart, "BOOKWORM", now(), None)?;
    }

    let key = fixture.coupon_key("welcome")?;
    if let Some(definition) = fixture.catalog_mut().get_mut(key) {
        definition.is_active = false;
    }

    let checkout = fixture.checkout();
    checkout.recompute(&mut cart, now())?;

    assert_eq!(cart.coupons().len(), 2, "the applied record survives");
    assert_eq!(
        cart.summary().total_discount(),
        Decimal::new(600, 2),
        "only BOOKWORM still contributes"
    );

    Ok(())
}

#[test]
fn user_limits_resolve_through_the_usage_history() -> TestResult {
    let fixture = Fixture::from_set("storefront")?;
    let checkout = fixture.checkout();
    let user = UserId::new("u-1001");

    let mut history = InMemoryUsageHistory::new();
    history.record_redemption(user.clone(), CouponCode::new("WELCOME10"));

    let mut cart = fixture.cart(None)?;
    let verdict = checkout.apply_for_user(&mut cart, "WELCOME10", now(), &user, &history)?;

    assert_eq!(verdict, Verdict::Rejected(Rejection::PerUserLimitReached));

    let verdict =
        checkout.apply_for_user(&mut cart, "WELCOME10", now(), &UserId::new("u-2002"), &history)?;

    assert!(verdict.is_accepted());

    Ok(())
}

#[test]
fn preview_validation_answers_without_a_cart() -> TestResult {
    let fixture = Fixture::from_set("storefront")?;
    let checkout = fixture.checkout();

    assert!(checkout.validate("bookworm", now(), None)?.is_accepted());
    assert_eq!(
        checkout.validate("RETRO15", now(), None)?,
        Verdict::Rejected(Rejection::Expired)
    );
    assert_eq!(
        checkout.validate("FLASH50", now(), None)?,
        Verdict::Rejected(Rejection::GlobalLimitReached)
    );
    assert_eq!(
        checkout.validate("NOSUCH", now(), None)?,
        Verdict::Rejected(Rejection::NotFound)
    );

    Ok(())
}
