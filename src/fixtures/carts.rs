//! Cart Fixtures

use rust_decimal::Decimal;
use serde::Deserialize;

use crate::{carts::CartItem, stores::Store};

/// Wrapper for cart items in YAML
#[derive(Debug, Deserialize)]
pub struct CartsFixture {
    /// Items in the order they appear in the file
    pub items: Vec<CartItemFixture>,
}

/// Cart item fixture from YAML
#[derive(Debug, Deserialize)]
pub struct CartItemFixture {
    /// Store tag; `local` or a merchant identifier
    pub store: String,

    /// Product URL, used to resolve local items to a domain
    #[serde(default)]
    pub product_url: Option<String>,

    /// Unit price
    pub price: Decimal,

    /// Units of this item
    pub quantity: u32,
}

impl From<CartItemFixture> for CartItem {
    fn from(fixture: CartItemFixture) -> Self {
        let store = Store::from_tag(&fixture.store);

        match fixture.product_url {
            Some(url) => Self::with_product_url(store, url, fixture.price, fixture.quantity),
            None => Self::new(store, fixture.price, fixture.quantity),
        }
    }
}
