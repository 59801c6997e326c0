//! Coupons
//!
//! Catalog coupon definitions and the per-cart applied-coupon snapshot.

use std::fmt;

use decimal_percentage::Percentage;
use jiff::Timestamp;
use rust_decimal::Decimal;
use rustc_hash::FxHashMap;
use slotmap::new_key_type;

pub mod validation;

new_key_type! {
    /// Coupon Key
    pub struct CouponKey;
}

/// A coupon code in canonical form: trimmed and upper-cased.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CouponCode(String);

impl CouponCode {
    /// Canonicalize a raw code.
    #[must_use]
    pub fn new(raw: &str) -> Self {
        Self(raw.trim().to_uppercase())
    }

    /// The canonical code text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CouponCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CouponCode {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}

/// Discount configuration for a coupon.
#[derive(Debug, Clone, Copy)]
pub enum Discount {
    /// A fraction of the applicable subtotal (e.g. 0.15 for 15% off).
    Percentage(Percentage),

    /// A fixed amount off the applicable subtotal.
    Fixed(Decimal),
}

impl PartialEq for Discount {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Percentage(a), Self::Percentage(b)) => {
                (*a * Decimal::ONE) == (*b * Decimal::ONE)
            }
            (Self::Fixed(a), Self::Fixed(b)) => a == b,
            _ => false,
        }
    }
}

/// A catalog coupon definition.
///
/// Definitions are owned by whatever administers the catalog; the engine
/// reads them and never writes them back.
#[derive(Debug, Clone, PartialEq)]
pub struct CouponDefinition {
    /// Canonical coupon code, unique within a catalog.
    pub code: CouponCode,

    /// Discount configuration.
    pub discount: Discount,

    /// Smallest applicable subtotal the coupon accepts.
    pub minimum_order: Decimal,

    /// Optional cap on the amount a percentage discount may reach.
    pub maximum_discount: Option<Decimal>,

    /// Store identifiers or domains the coupon is restricted to; empty means
    /// the whole cart is in scope.
    pub applicable_stores: Vec<String>,

    /// Start of the validity window (inclusive).
    pub valid_from: Timestamp,

    /// End of the validity window (inclusive).
    pub valid_until: Timestamp,

    /// Optional global redemption cap across all users.
    pub usage_limit: Option<u32>,

    /// Completed redemptions so far; maintained outside the engine.
    pub used_count: u32,

    /// Redemption cap per requesting user.
    pub per_user_limit: u32,

    /// Manual kill switch for the whole coupon.
    pub is_active: bool,

    /// Stacking order; higher priorities discount first.
    pub priority: i32,

    /// Reserved extension point; carried through but never evaluated.
    pub conditions: FxHashMap<String, String>,
}

impl CouponDefinition {
    /// Create a definition with the given code, discount and validity
    /// window.
    ///
    /// The remaining fields start at their defaults: no minimum order, no
    /// caps other than one redemption per user, unrestricted stores, active,
    /// priority zero.
    #[must_use]
    pub fn new(
        code: CouponCode,
        discount: Discount,
        valid_from: Timestamp,
        valid_until: Timestamp,
    ) -> Self {
        Self {
            code,
            discount,
            minimum_order: Decimal::ZERO,
            maximum_discount: None,
            applicable_stores: Vec::new(),
            valid_from,
            valid_until,
            usage_limit: None,
            used_count: 0,
            per_user_limit: 1,
            is_active: true,
            priority: 0,
            conditions: FxHashMap::default(),
        }
    }
}

/// A coupon attached to one cart: the snapshot taken when it was accepted.
///
/// The snapshot pins the store scope; everything else is re-read from the
/// catalog on every recompute.
#[derive(Debug, Clone, PartialEq)]
pub struct AppliedCoupon {
    /// Canonical code at apply time.
    pub code: CouponCode,

    /// Catalog entry the snapshot was taken from.
    pub coupon: CouponKey,

    /// When the coupon was accepted onto the cart.
    pub applied_at: Timestamp,

    /// Discount configuration at apply time, kept for the record.
    pub discount: Discount,

    /// Store scope at apply time; later catalog edits do not widen or
    /// narrow it.
    pub applicable_stores: Vec<String>,

    /// Per-cart toggle; an inactive entry stays on the cart but never
    /// contributes.
    pub is_active: bool,
}

impl AppliedCoupon {
    /// Snapshot a catalog definition at apply time.
    #[must_use]
    pub fn snapshot(coupon: CouponKey, definition: &CouponDefinition, applied_at: Timestamp) -> Self {
        Self {
            code: definition.code.clone(),
            coupon,
            applied_at,
            discount: definition.discount,
            applicable_stores: definition.applicable_stores.clone(),
            is_active: true,
        }
    }
}
