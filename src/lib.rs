//! Shopfront
//!
//! A small retail shopping cart: browse a fixed catalog, reserve stock into a
//! cart, check out into orders and review the order history, all from a
//! line-oriented text menu.

pub mod cart;
pub mod catalog;
pub mod fixtures;
pub mod orders;
pub mod prelude;
pub mod pricing;
pub mod products;
pub mod receipt;
pub mod session;
