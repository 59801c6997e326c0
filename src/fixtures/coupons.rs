//! Coupon Fixtures

use decimal_percentage::Percentage;
use jiff::Timestamp;
use rust_decimal::Decimal;
use rustc_hash::FxHashMap;
use serde::Deserialize;

use crate::{
    coupons::{CouponCode, CouponDefinition, Discount},
    fixtures::FixtureError,
};

/// Wrapper for coupons in YAML
#[derive(Debug, Deserialize)]
pub struct CouponsFixture {
    /// Map of fixture key -> coupon fixture
    pub coupons: FxHashMap<String, CouponFixture>,
}

/// Coupon fixture from YAML
#[derive(Debug, Deserialize)]
pub struct CouponFixture {
    /// Coupon code; canonicalized on load
    pub code: String,

    /// Discount: a percentage like `10%`, or a fixed amount like `5.00`
    pub discount: String,

    /// Smallest applicable subtotal the coupon accepts
    #[serde(default)]
    pub minimum_order: Option<Decimal>,

    /// Cap on the amount a percentage discount may reach
    #[serde(default)]
    pub maximum_discount: Option<Decimal>,

    /// Store identifiers or domains the coupon is restricted to
    #[serde(default)]
    pub applicable_stores: Vec<String>,

    /// Start of the validity window
    pub valid_from: Timestamp,

    /// End of the validity window
    pub valid_until: Timestamp,

    /// Global redemption cap
    #[serde(default)]
    pub usage_limit: Option<u32>,

    /// Completed redemptions so far
    #[serde(default)]
    pub used_count: u32,

    /// Redemption cap per user
    #[serde(default = "default_per_user_limit")]
    pub per_user_limit: u32,

    /// Whether the coupon is switched on
    #[serde(default = "default_active")]
    pub is_active: bool,

    /// Stacking priority; higher discounts first
    #[serde(default)]
    pub priority: i32,

    /// Reserved extension point
    #[serde(default)]
    pub conditions: FxHashMap<String, String>,
}

impl TryFrom<CouponFixture> for CouponDefinition {
    type Error = FixtureError;

    fn try_from(fixture: CouponFixture) -> Result<Self, Self::Error> {
        let discount = parse_discount(&fixture.discount)?;

        Ok(Self {
            code: CouponCode::new(&fixture.code),
            discount,
            minimum_order: fixture.minimum_order.unwrap_or(Decimal::ZERO),
            maximum_discount: fixture.maximum_discount,
            applicable_stores: fixture.applicable_stores,
            valid_from: fixture.valid_from,
            valid_until: fixture.valid_until,
            usage_limit: fixture.usage_limit,
            used_count: fixture.used_count,
            per_user_limit: fixture.per_user_limit,
            is_active: fixture.is_active,
            priority: fixture.priority,
            conditions: fixture.conditions,
        })
    }
}

/// Parse a discount string (e.g., `15%` or `5.00`) into a `Discount`
///
/// Accepts two formats:
/// - Percentage format: "15%" for 15% off the applicable subtotal
/// - Amount format: "5.00" for a fixed amount off
///
/// # Errors
///
/// Returns an error if the value cannot be parsed, a percentage lies outside
/// 0-100, or a fixed amount is negative.
pub fn parse_discount(s: &str) -> Result<Discount, FixtureError> {
    let trimmed = s.trim();

    if let Some(points_str) = trimmed.strip_suffix('%') {
        let points = points_str
            .trim()
            .parse::<Decimal>()
            .map_err(|_err| FixtureError::InvalidDiscount(s.to_string()))?;

        if !(Decimal::ZERO..=Decimal::ONE_HUNDRED).contains(&points) {
            return Err(FixtureError::InvalidDiscount(s.to_string()));
        }

        Ok(Discount::Percentage(Percentage::from(
            points / Decimal::ONE_HUNDRED,
        )))
    } else {
        let amount = trimmed
            .parse::<Decimal>()
            .map_err(|_err| FixtureError::InvalidDiscount(s.to_string()))?;

        if amount < Decimal::ZERO {
            return Err(FixtureError::InvalidDiscount(s.to_string()));
        }

        Ok(Discount::Fixed(amount))
    }
}

/// Coupons are active unless the fixture says otherwise.
fn default_active() -> bool {
    true
}

/// One redemption per user unless the fixture says otherwise.
fn default_per_user_limit() -> u32 {
    1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_discount_reads_percentages() {
        let discount = parse_discount("15%").expect("valid percentage");

        assert_eq!(
            discount,
            Discount::Percentage(Percentage::from(0.15)),
            "percentage points become a fraction"
        );
    }

    #[test]
    fn parse_discount_reads_fixed_amounts() {
        let discount = parse_discount("5.00").expect("valid amount");

        assert_eq!(discount, Discount::Fixed(Decimal::new(500, 2)));
    }

    #[test]
    fn parse_discount_rejects_garbage() {
        let result = parse_discount("half off");

        assert!(matches!(result, Err(FixtureError::InvalidDiscount(_))));
    }

    #[test]
    fn parse_discount_rejects_out_of_range_percentages() {
        assert!(matches!(
            parse_discount("101%"),
            Err(FixtureError::InvalidDiscount(_))
        ));
        assert!(matches!(
            parse_discount("-5%"),
            Err(FixtureError::InvalidDiscount(_))
        ));
    }

    #[test]
    fn parse_discount_rejects_negative_amounts() {
        let result = parse_discount("-5.00");

        assert!(matches!(result, Err(FixtureError::InvalidDiscount(_))));
    }
}
