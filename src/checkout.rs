//! Checkout
//!
//! The public entry points that sequence coupon validation, cart mutation
//! and recomputation. Every mutation ends in a full recompute, so the cart's
//! summary is always consistent with its items and coupons.

use jiff::Timestamp;
use thiserror::Error;
use tracing::debug;

use crate::{
    calculator,
    carts::Cart,
    catalog::{CatalogError, CouponCatalog},
    coupons::{
        AppliedCoupon, CouponCode, CouponKey,
        validation::{self, Rejection},
    },
    stores::RecognizedDomain,
    usage::{UsageError, UsageHistory, UserId},
};

/// Faults surfaced by checkout operations.
///
/// Expected rejections travel inside [`Verdict::Rejected`]; these are
/// genuine failures of a collaborator.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// A catalog lookup failed.
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    /// A usage-history lookup failed.
    #[error(transparent)]
    Usage(#[from] UsageError),
}

/// Outcome of an apply or validate operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    /// The coupon was accepted; for [`Checkout::apply`] it is now on the
    /// cart.
    Accepted(CouponKey),

    /// The coupon was not accepted, with the specific reason.
    Rejected(Rejection),
}

impl Verdict {
    /// Whether this verdict is an acceptance.
    #[must_use]
    pub fn is_accepted(&self) -> bool {
        matches!(self, Self::Accepted(_))
    }
}

/// Reference to an applied coupon, for removal or toggling.
#[derive(Debug, Clone)]
pub enum CouponRef {
    /// Match by catalog key.
    Key(CouponKey),

    /// Match by canonical code.
    Code(CouponCode),
}

impl CouponRef {
    /// Whether an applied coupon matches this reference.
    fn matches(&self, applied: &AppliedCoupon) -> bool {
        match self {
            Self::Key(key) => applied.coupon == *key,
            Self::Code(code) => applied.code == *code,
        }
    }
}

impl From<CouponKey> for CouponRef {
    fn from(key: CouponKey) -> Self {
        Self::Key(key)
    }
}

impl From<CouponCode> for CouponRef {
    fn from(code: CouponCode) -> Self {
        Self::Code(code)
    }
}

/// Checkout orchestrator over a coupon catalog and the recognized-domain
/// settings.
///
/// The orchestrator holds no cart state; callers pass the cart into each
/// operation along with the decision time, so a request-scoped `now` gives
/// every check in one operation the same clock.
#[derive(Debug)]
pub struct Checkout<'a, C: CouponCatalog> {
    catalog: &'a C,
    domains: &'a [RecognizedDomain],
}

impl<'a, C: CouponCatalog> Checkout<'a, C> {
    /// Create an orchestrator over a catalog and domain settings.
    #[must_use]
    pub fn new(catalog: &'a C, domains: &'a [RecognizedDomain]) -> Self {
        Self { catalog, domains }
    }

    /// Apply a coupon code to the cart.
    ///
    /// The code is canonicalized, looked up, and run through the full check
    /// sequence. On acceptance the cart gains an applied-coupon snapshot and
    /// a freshly recomputed summary; on rejection the cart is left exactly
    /// as it was.
    ///
    /// Pass `None` for `user_usage_count` when no user identity is known;
    /// the per-user check is then skipped. [`Checkout::apply_for_user`]
    /// resolves the count through a [`UsageHistory`] instead.
    ///
    /// # Errors
    ///
    /// Returns a [`CheckoutError`] if a collaborator fails; rejections are
    /// returned as [`Verdict::Rejected`] values.
    #[tracing::instrument(name = "checkout.apply", skip(self, cart), fields(code = %code), err)]
    pub fn apply(
        &self,
        cart: &mut Cart,
        code: &str,
        now: Timestamp,
        user_usage_count: Option<u32>,
    ) -> Result<Verdict, CheckoutError> {
        if cart.is_empty() {
            return Ok(Verdict::Rejected(Rejection::EmptyCart));
        }

        let code = CouponCode::new(code);

        let Some((key, definition)) = self.catalog.find_by_code(&code)? else {
            return Ok(Verdict::Rejected(Rejection::NotFound));
        };

        if let Err(rejection) =
            validation::validate(&definition, cart, now, user_usage_count, self.domains)
        {
            debug!(%code, %rejection, "coupon rejected");
            return Ok(Verdict::Rejected(rejection));
        }

        cart.push_coupon(AppliedCoupon::snapshot(key, &definition, now));
        self.recompute(cart, now)?;

        debug!(%code, total = %cart.summary().total_discount(), "coupon applied");

        Ok(Verdict::Accepted(key))
    }

    /// Apply a coupon code on behalf of a user, resolving their prior
    /// redemptions through the usage history.
    ///
    /// # Errors
    ///
    /// Returns a [`CheckoutError`] if the usage history or a catalog lookup
    /// fails.
    pub fn apply_for_user<H: UsageHistory>(
        &self,
        cart: &mut Cart,
        code: &str,
        now: Timestamp,
        user: &UserId,
        history: &H,
    ) -> Result<Verdict, CheckoutError> {
        let canonical = CouponCode::new(code);
        let prior = history.prior_redemptions(user, &canonical)?;

        self.apply(cart, code, now, Some(prior))
    }

    /// Remove applied coupons matching the reference, then recompute.
    ///
    /// A reference that matches nothing is a no-op; the recompute still
    /// runs, so the summary never goes stale.
    ///
    /// # Errors
    ///
    /// Returns a [`CheckoutError`] if a catalog lookup fails during the
    /// recompute.
    pub fn remove(
        &self,
        cart: &mut Cart,
        coupon: &CouponRef,
        now: Timestamp,
    ) -> Result<(), CheckoutError> {
        let before = cart.coupons().len();
        cart.coupons_mut().retain(|applied| !coupon.matches(applied));
        let removed = before - cart.coupons().len();

        if removed > 0 {
            debug!(removed, "removed applied coupons");
        }

        self.recompute(cart, now)
    }

    /// Toggle the per-cart active flag on applied coupons matching the
    /// reference, then recompute.
    ///
    /// Toggled-off coupons stay on the cart but stop contributing until
    /// toggled back on.
    ///
    /// # Errors
    ///
    /// Returns a [`CheckoutError`] if a catalog lookup fails during the
    /// recompute.
    pub fn set_coupon_active(
        &self,
        cart: &mut Cart,
        coupon: &CouponRef,
        active: bool,
        now: Timestamp,
    ) -> Result<(), CheckoutError> {
        for applied in cart
            .coupons_mut()
            .iter_mut()
            .filter(|applied| coupon.matches(applied))
        {
            applied.is_active = active;
        }

        self.recompute(cart, now)
    }

    /// Validate a coupon code without a cart.
    ///
    /// Runs the cart-free subset of the checks: active flag, validity window
    /// and usage caps. Store restrictions and minimum order amounts need a
    /// cart, so a code accepted here can still be rejected by
    /// [`Checkout::apply`].
    ///
    /// # Errors
    ///
    /// Returns a [`CheckoutError`] if the catalog lookup fails.
    pub fn validate(
        &self,
        code: &str,
        now: Timestamp,
        user_usage_count: Option<u32>,
    ) -> Result<Verdict, CheckoutError> {
        let code = CouponCode::new(code);

        let Some((key, definition)) = self.catalog.find_by_code(&code)? else {
            return Ok(Verdict::Rejected(Rejection::NotFound));
        };

        match validation::validate_standalone(&definition, now, user_usage_count) {
            Ok(()) => Ok(Verdict::Accepted(key)),
            Err(rejection) => Ok(Verdict::Rejected(rejection)),
        }
    }

    /// Recompute the cart's summary from its current items and coupons.
    ///
    /// Apply, remove and toggle already recompute; this entry point serves
    /// restored carts and catalog edits made behind the cart's back.
    ///
    /// # Errors
    ///
    /// Returns a [`CheckoutError`] if a catalog lookup fails.
    pub fn recompute(&self, cart: &mut Cart, now: Timestamp) -> Result<(), CheckoutError> {
        let summary = calculator::calculate(cart, self.catalog, self.domains, now)?;
        cart.set_summary(summary);

        Ok(())
    }
}
