//! Usage History
//!
//! Per-user redemption counts backing the per-user limit check. Counts are
//! aggregated across every order-producing surface, so the contract lives
//! behind a trait and the engine only ever asks for one number.

use rustc_hash::FxHashMap;
use thiserror::Error;

use crate::coupons::CouponCode;

/// Identity of a requesting user.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct UserId(String);

impl UserId {
    /// Wrap a raw user identifier.
    #[must_use]
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// The raw identifier text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Errors surfaced by usage-history lookups.
#[derive(Debug, Error)]
pub enum UsageError {
    /// The backing store failed to answer a lookup.
    #[error("usage history backend error: {0}")]
    Backend(String),
}

/// Redemption counts per user and coupon code.
pub trait UsageHistory {
    /// How many completed redemptions of `code` the user already has.
    ///
    /// # Errors
    ///
    /// Returns a [`UsageError`] if the backing store fails to answer.
    fn prior_redemptions(&self, user: &UserId, code: &CouponCode) -> Result<u32, UsageError>;
}

/// In-memory usage counts for tests and demos.
#[derive(Debug, Default)]
pub struct InMemoryUsageHistory {
    counts: FxHashMap<UserId, FxHashMap<CouponCode, u32>>,
}

impl InMemoryUsageHistory {
    /// Create an empty history.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one completed redemption.
    pub fn record_redemption(&mut self, user: UserId, code: CouponCode) {
        let per_user = self.counts.entry(user).or_default();
        *per_user.entry(code).or_insert(0) += 1;
    }
}

impl UsageHistory for InMemoryUsageHistory {
    fn prior_redemptions(&self, user: &UserId, code: &CouponCode) -> Result<u32, UsageError> {
        let count = self
            .counts
            .get(user)
            .and_then(|per_user| per_user.get(code))
            .copied()
            .unwrap_or(0);

        Ok(count)
    }
}
