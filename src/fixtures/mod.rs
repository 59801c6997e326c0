//! Fixtures
//!
//! YAML fixture loading for coupon catalogs, cart items and
//! recognized-domain settings, shared by tests and demos.

use std::{fs, path::PathBuf};

use thiserror::Error;

use crate::{
    carts::{Cart, CartError, CartItem},
    catalog::{CatalogError, InMemoryCatalog},
    checkout::Checkout,
    coupons::CouponKey,
    stores::RecognizedDomain,
};

pub mod carts;
pub mod coupons;
pub mod domains;

/// Fixture Parsing Errors
#[derive(Debug, Error)]
pub enum FixtureError {
    /// IO error reading fixture files
    #[error("Failed to read fixture file: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing error
    #[error("Failed to parse YAML: {0}")]
    Yaml(#[from] serde_norway::Error),

    /// Invalid discount format
    #[error("Invalid discount format: {0}")]
    InvalidDiscount(String),

    /// Coupon not found
    #[error("Coupon not found: {0}")]
    CouponNotFound(String),

    /// Catalog registration error
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    /// Cart creation error
    #[error(transparent)]
    Cart(#[from] CartError),

    /// Not enough items in fixture
    #[error("Not enough items in fixture, available: {available}, requested: {requested}")]
    NotEnoughItems {
        /// Number of items defined in the fixture
        available: usize,
        /// Number of items requested
        requested: usize,
    },
}

/// Fixture
#[derive(Debug)]
pub struct Fixture {
    /// Base path for fixture files
    base_path: PathBuf,

    /// Catalog built from coupon fixtures
    catalog: InMemoryCatalog,

    /// Fixture key -> catalog key mappings for lookups
    coupon_keys: Vec<(String, CouponKey)>,

    /// Recognized-domain settings
    domains: Vec<RecognizedDomain>,

    /// Cart line items, in fixture order
    items: Vec<CartItem>,
}

impl Fixture {
    /// Create a new empty fixture with the default base path
    #[must_use]
    pub fn new() -> Self {
        Self::with_base_path("./fixtures")
    }

    /// Create a new empty fixture with a custom base path
    #[must_use]
    pub fn with_base_path(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
            catalog: InMemoryCatalog::new(),
            coupon_keys: Vec::new(),
            domains: Vec::new(),
            items: Vec::new(),
        }
    }

    /// Load a complete fixture set (coupons, domains and cart items with the
    /// same name)
    ///
    /// # Errors
    ///
    /// Returns an error if any of the fixture files cannot be loaded.
    pub fn from_set(name: &str) -> Result<Self, FixtureError> {
        let mut fixture = Self::new();

        fixture
            .load_coupons(name)?
            .load_domains(name)?
            .load_items(name)?;

        Ok(fixture)
    }

    /// Load coupon definitions from a YAML fixture file into the catalog
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, a discount
    /// string is invalid, or a code is already registered.
    pub fn load_coupons(&mut self, name: &str) -> Result<&mut Self, FixtureError> {
        let file_path = self.base_path.join("coupons").join(format!("{name}.yml"));
        let contents = fs::read_to_string(&file_path)?;
        let fixture: coupons::CouponsFixture = serde_norway::from_str(&contents)?;

        for (key, coupon_fixture) in fixture.coupons {
            let definition = coupon_fixture.try_into()?;
            let coupon_key = self.catalog.register(definition)?;

            self.coupon_keys.push((key, coupon_key));
        }

        Ok(self)
    }

    /// Load recognized-domain settings from a YAML fixture file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load_domains(&mut self, name: &str) -> Result<&mut Self, FixtureError> {
        let file_path = self.base_path.join("domains").join(format!("{name}.yml"));
        let contents = fs::read_to_string(&file_path)?;
        let fixture: domains::DomainsFixture = serde_norway::from_str(&contents)?;

        self.domains
            .extend(fixture.domains.into_iter().map(RecognizedDomain::from));

        Ok(self)
    }

    /// Load cart line items from a YAML fixture file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load_items(&mut self, name: &str) -> Result<&mut Self, FixtureError> {
        let file_path = self.base_path.join("carts").join(format!("{name}.yml"));
        let contents = fs::read_to_string(&file_path)?;
        let fixture: carts::CartsFixture = serde_norway::from_str(&contents)?;

        self.items
            .extend(fixture.items.into_iter().map(CartItem::from));

        Ok(self)
    }

    /// Get a catalog key by its fixture key
    ///
    /// # Errors
    ///
    /// Returns an error if the coupon is not found.
    pub fn coupon_key(&self, key: &str) -> Result<CouponKey, FixtureError> {
        self.coupon_keys
            .iter()
            .find(|(fixture_key, _)| fixture_key == key)
            .map(|(_, coupon_key)| *coupon_key)
            .ok_or_else(|| FixtureError::CouponNotFound(key.to_string()))
    }

    /// Get the catalog built from the loaded coupons
    #[must_use]
    pub fn catalog(&self) -> &InMemoryCatalog {
        &self.catalog
    }

    /// Mutable access to the catalog, for administrative edits in tests
    pub fn catalog_mut(&mut self) -> &mut InMemoryCatalog {
        &mut self.catalog
    }

    /// Get the recognized-domain settings
    #[must_use]
    pub fn domains(&self) -> &[RecognizedDomain] {
        &self.domains
    }

    /// Get all loaded cart line items
    #[must_use]
    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    /// Create a cart from the first `n` loaded items (all items when `None`)
    ///
    /// # Errors
    ///
    /// Returns an error if more items are requested than the fixture
    /// provides, or if cart creation fails.
    pub fn cart(&self, n: Option<usize>) -> Result<Cart, FixtureError> {
        if let Some(n) = n
            && n > self.items.len()
        {
            return Err(FixtureError::NotEnoughItems {
                requested: n,
                available: self.items.len(),
            });
        }

        let items: Vec<CartItem> = self
            .items
            .iter()
            .take(n.unwrap_or(self.items.len()))
            .cloned()
            .collect();

        Ok(Cart::with_items(items)?)
    }

    /// Create a checkout over the loaded catalog and domain settings
    #[must_use]
    pub fn checkout(&self) -> Checkout<'_, InMemoryCatalog> {
        Checkout::new(&self.catalog, &self.domains)
    }
}

impl Default for Fixture {
    fn default() -> Self {
        Self::new()
    }
}
