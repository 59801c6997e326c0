//! Tally
//!
//! Tally is a coupon validation and discount allocation engine: it decides which coupons apply to a cart, how much each one takes off, and which stores the discount is attributed to.

pub mod calculator;
pub mod carts;
pub mod catalog;
pub mod checkout;
pub mod coupons;
pub mod fixtures;
pub mod prelude;
pub mod stores;
pub mod summary;
pub mod usage;
pub mod utils;
