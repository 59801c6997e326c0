//! Coupon Catalog
//!
//! The lookup contract the engine reads coupon definitions through, plus the
//! in-memory implementation used by fixtures, tests and demos.

use rustc_hash::FxHashMap;
use slotmap::SlotMap;
use thiserror::Error;

use crate::coupons::{CouponCode, CouponDefinition, CouponKey};

/// Errors surfaced by catalog lookups.
///
/// Coupon rejections are not errors; these are genuine faults in the
/// catalog itself or its backing store.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// A definition with the same canonical code is already registered.
    #[error("coupon code {0} is already registered")]
    DuplicateCode(CouponCode),

    /// The backing store failed to answer a lookup.
    #[error("catalog backend error: {0}")]
    Backend(String),
}

/// Lookup contract for coupon definitions.
///
/// Implementations answer from whatever holds the catalog. Lookups return
/// owned snapshots; the engine never holds references into the backing
/// store across a calculation.
pub trait CouponCatalog {
    /// Find a definition by canonical code.
    ///
    /// # Errors
    ///
    /// Returns a [`CatalogError`] if the backing store fails to answer.
    fn find_by_code(
        &self,
        code: &CouponCode,
    ) -> Result<Option<(CouponKey, CouponDefinition)>, CatalogError>;

    /// Find a definition by key.
    ///
    /// # Errors
    ///
    /// Returns a [`CatalogError`] if the backing store fails to answer.
    fn find_by_key(&self, key: CouponKey) -> Result<Option<CouponDefinition>, CatalogError>;
}

/// In-memory catalog backed by a slotmap, with a canonical-code index.
#[derive(Debug, Default)]
pub struct InMemoryCatalog {
    coupons: SlotMap<CouponKey, CouponDefinition>,
    codes: FxHashMap<CouponCode, CouponKey>,
}

impl InMemoryCatalog {
    /// Create an empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a definition under its canonical code.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::DuplicateCode`] if the code is already
    /// registered.
    pub fn register(&mut self, definition: CouponDefinition) -> Result<CouponKey, CatalogError> {
        if self.codes.contains_key(&definition.code) {
            return Err(CatalogError::DuplicateCode(definition.code.clone()));
        }

        let code = definition.code.clone();
        let key = self.coupons.insert(definition);
        self.codes.insert(code, key);

        Ok(key)
    }

    /// Mutable access to a registered definition, for administrative edits.
    pub fn get_mut(&mut self, key: CouponKey) -> Option<&mut CouponDefinition> {
        self.coupons.get_mut(key)
    }

    /// The number of registered definitions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.coupons.len()
    }

    /// Whether the catalog has no definitions.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.coupons.is_empty()
    }
}

impl CouponCatalog for InMemoryCatalog {
    fn find_by_code(
        &self,
        code: &CouponCode,
    ) -> Result<Option<(CouponKey, CouponDefinition)>, CatalogError> {
        let found = self
            .codes
            .get(code)
            .and_then(|key| self.coupons.get(*key).map(|definition| (*key, definition.clone())));

        Ok(found)
    }

    fn find_by_key(&self, key: CouponKey) -> Result<Option<CouponDefinition>, CatalogError> {
        Ok(self.coupons.get(key).cloned())
    }
}
