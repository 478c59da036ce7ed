//! Products

use std::{fmt, str::FromStr};

use rusty_money::{Money, iso::Currency};
use slotmap::new_key_type;

new_key_type! {
    /// Product Key
    pub struct ProductKey;
}

/// Externally assigned product identifier, as typed at the browse prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ProductId(u32);

impl ProductId {
    /// Typed at the browse prompt to go back; never assigned to a product.
    pub const RESERVED: Self = Self(0);

    /// Creates a new product id.
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Returns the raw id value.
    pub const fn get(self) -> u32 {
        self.0
    }
}

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for ProductId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse().map(Self)
    }
}

/// Product
///
/// Stock is only changed through the owning [`Catalog`](crate::catalog::Catalog).
#[derive(Debug, Clone, PartialEq)]
pub struct Product<'a> {
    /// Product id
    pub id: ProductId,

    /// Product name
    pub name: String,

    /// Product unit price
    pub price: Money<'a, Currency>,

    stock: u32,
}

impl<'a> Product<'a> {
    /// Creates a new product with the given opening stock.
    pub fn new(
        id: ProductId,
        name: impl Into<String>,
        price: Money<'a, Currency>,
        stock: u32,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            price,
            stock,
        }
    }

    /// Units currently available for reservation.
    pub fn stock(&self) -> u32 {
        self.stock
    }

    pub(crate) fn stock_mut(&mut self) -> &mut u32 {
        &mut self.stock
    }
}
