//! Carts

use rust_decimal::Decimal;
use thiserror::Error;

use crate::{coupons::AppliedCoupon, stores::Store, summary::DiscountSummary};

/// Errors related to carts.
#[derive(Debug, Error)]
pub enum CartError {
    /// An item carries a negative unit price.
    #[error("Item {0} has a negative price ({1})")]
    NegativePrice(usize, Decimal),

    /// An item carries a zero quantity.
    #[error("Item {0} has a quantity of zero")]
    ZeroQuantity(usize),
}

/// One product line in a cart.
#[derive(Debug, Clone, PartialEq)]
pub struct CartItem {
    store: Store,
    product_url: Option<String>,
    price: Decimal,
    quantity: u32,
}

impl CartItem {
    /// Create a line item with the given store tag, unit price and quantity.
    #[must_use]
    pub fn new(store: Store, price: Decimal, quantity: u32) -> Self {
        Self {
            store,
            product_url: None,
            price,
            quantity,
        }
    }

    /// Create a line item carrying the product URL used to resolve local
    /// items to recognized domains.
    #[must_use]
    pub fn with_product_url(
        store: Store,
        product_url: impl Into<String>,
        price: Decimal,
        quantity: u32,
    ) -> Self {
        Self {
            store,
            product_url: Some(product_url.into()),
            price,
            quantity,
        }
    }

    /// The raw store tag.
    #[must_use]
    pub fn store(&self) -> &Store {
        &self.store
    }

    /// The product URL, when the line has one.
    #[must_use]
    pub fn product_url(&self) -> Option<&str> {
        self.product_url.as_deref()
    }

    /// The unit price.
    #[must_use]
    pub fn price(&self) -> Decimal {
        self.price
    }

    /// The number of units.
    #[must_use]
    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    /// Unit price times quantity.
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.price * Decimal::from(self.quantity)
    }
}

/// A shopping cart: line items, the coupons applied to them, and the
/// discount summary derived from both.
///
/// The item list is fixed at construction. Coupons and the summary change
/// only through [`Checkout`](crate::checkout::Checkout) operations, which
/// recompute the summary on every mutation.
#[derive(Debug, Clone, Default)]
pub struct Cart {
    items: Vec<CartItem>,
    coupons: Vec<AppliedCoupon>,
    summary: DiscountSummary,
}

impl Cart {
    /// Create a cart from the given line items.
    ///
    /// # Errors
    ///
    /// Returns a [`CartError`] if any item has a negative price or a zero
    /// quantity.
    pub fn with_items(items: impl Into<Vec<CartItem>>) -> Result<Self, CartError> {
        let items = items.into();
        validate_items(&items)?;

        Ok(Self {
            items,
            coupons: Vec::new(),
            summary: DiscountSummary::default(),
        })
    }

    /// Rebuild a cart from persisted line items and applied coupons.
    ///
    /// The summary starts empty; a recompute derives it from the restored
    /// state.
    ///
    /// # Errors
    ///
    /// Returns a [`CartError`] if any item has a negative price or a zero
    /// quantity.
    pub fn restore(
        items: impl Into<Vec<CartItem>>,
        coupons: Vec<AppliedCoupon>,
    ) -> Result<Self, CartError> {
        let mut cart = Self::with_items(items)?;
        cart.coupons = coupons;

        Ok(cart)
    }

    /// The line items.
    #[must_use]
    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    /// The number of line items.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the cart has no line items.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Sum of line totals before any discount.
    #[must_use]
    pub fn total(&self) -> Decimal {
        self.items.iter().map(CartItem::line_total).sum()
    }

    /// The applied coupons, in application order.
    #[must_use]
    pub fn coupons(&self) -> &[AppliedCoupon] {
        &self.coupons
    }

    /// The discount summary from the most recent recompute.
    #[must_use]
    pub fn summary(&self) -> &DiscountSummary {
        &self.summary
    }

    /// Append an applied-coupon snapshot.
    pub(crate) fn push_coupon(&mut self, coupon: AppliedCoupon) {
        self.coupons.push(coupon);
    }

    /// Mutable access to the applied coupons, for checkout operations.
    pub(crate) fn coupons_mut(&mut self) -> &mut Vec<AppliedCoupon> {
        &mut self.coupons
    }

    /// Replace the derived summary.
    pub(crate) fn set_summary(&mut self, summary: DiscountSummary) {
        self.summary = summary;
    }
}

/// Check every line item for a non-negative price and a positive quantity.
fn validate_items(items: &[CartItem]) -> Result<(), CartError> {
    for (index, item) in items.iter().enumerate() {
        if item.price < Decimal::ZERO {
            return Err(CartError::NegativePrice(index, item.price));
        }

        if item.quantity == 0 {
            return Err(CartError::ZeroQuantity(index));
        }
    }

    Ok(())
}
