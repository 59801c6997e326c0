//! Coupon Preview Example
//!
//! This example checks coupon codes without a cart: active flag, validity
//! window and usage caps only. Store restrictions and minimum order amounts
//! need a cart, so an accepted code can still be rejected at apply time.
//!
//! Use `-f` to load a fixture set by name
//! Use `-c` to check a coupon code (repeatable)

use anyhow::Result;
use clap::Parser;
use jiff::Timestamp;

use tally::{checkout::Verdict, fixtures::Fixture, utils::ExampleCheckoutArgs};

/// Coupon Preview Example
#[expect(clippy::print_stdout, reason = "Example program output to user")]
pub fn main() -> Result<()> {
    let args = ExampleCheckoutArgs::parse();

    let fixture = Fixture::from_set(&args.fixture)?;
    let checkout = fixture.checkout();
    let now = Timestamp::now();

    let codes = if args.coupons.is_empty() {
        ["WELCOME10", "BOOKWORM", "RETRO15", "FLASH50", "NOSUCH"]
            .map(String::from)
            .to_vec()
    } else {
        args.coupons.clone()
    };

    for code in &codes {
        match checkout.validate(code, now, None)? {
            Verdict::Accepted(_) => println!("{code}: ok"),
            Verdict::Rejected(rejection) => println!("{code}: {rejection}"),
        }
    }

    Ok(())
}
