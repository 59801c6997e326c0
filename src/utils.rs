//! Utils

use clap::Parser;

/// Arguments for the checkout examples
#[derive(Debug, Parser)]
pub struct ExampleCheckoutArgs {
    /// Number of items to add to the cart
    #[clap(short, long)]
    pub n: Option<usize>,

    /// Fixture set to use for the catalog, domains & cart
    #[clap(short, long, default_value = "storefront")]
    pub fixture: String,

    /// Coupon codes to apply or check, in order
    #[clap(short, long = "coupon")]
    pub coupons: Vec<String>,
}
