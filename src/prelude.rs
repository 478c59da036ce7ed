//! Shopfront prelude.
//!
//! Convenience exports for common library consumers.

pub use crate::{
    cart::{Cart, CartError, CartLine},
    catalog::{Catalog, CatalogError},
    fixtures::{FixtureError, load_catalog, parse_catalog},
    orders::{CheckoutError, Order, OrderHistory, OrderId, OrderSequence},
    pricing::TotalPriceError,
    products::{Product, ProductId, ProductKey},
    receipt::ReceiptError,
    session::{InputError, MenuChoice, Session, SessionError},
};
