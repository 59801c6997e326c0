//! Checkout Example
//!
//! This example applies coupon codes to a fixture cart and prints the
//! resulting discount summary.
//!
//! Use `-f` to load a fixture set by name
//! Use `-n` to limit the number of cart items
//! Use `-c` to apply a coupon code (repeatable, applied in order)

use std::{io, io::Write, time::Instant};

use anyhow::Result;
use clap::Parser;
use humanize_duration::{Truncate, prelude::DurationExt};
use jiff::Timestamp;
use rusty_money::iso;

use tally::{checkout::Verdict, fixtures::Fixture, utils::ExampleCheckoutArgs};

/// Checkout Example
#[expect(clippy::print_stdout, reason = "Example program output to user")]
pub fn main() -> Result<()> {
    let args = ExampleCheckoutArgs::parse();

    let fixture = Fixture::from_set(&args.fixture)?;
    let checkout = fixture.checkout();
    let mut cart = fixture.cart(args.n)?;
    let now = Timestamp::now();

    let codes = if args.coupons.is_empty() {
        vec!["WELCOME10".to_string(), "COFFEE5".to_string()]
    } else {
        args.coupons.clone()
    };

    let start = Instant::now();

    for code in &codes {
        match checkout.apply(&mut cart, code, now, None)? {
            Verdict::Accepted(_) => println!("{code}: applied"),
            Verdict::Rejected(rejection) => println!("{code}: {rejection}"),
        }
    }

    let elapsed = start.elapsed();

    let stdout = io::stdout();
    let mut handle = stdout.lock();

    writeln!(handle)?;
    cart.summary().write_to(&mut handle, iso::USD)?;

    writeln!(
        handle,
        " {} ({}s)",
        elapsed.human(Truncate::Nano),
        elapsed.as_secs_f32()
    )?;

    Ok(())
}
