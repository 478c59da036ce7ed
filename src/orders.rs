//! Orders

use std::fmt;

use rusty_money::{Money, iso::Currency};
use smallvec::SmallVec;
use thiserror::Error;
use tracing::info;

use crate::{
    cart::{Cart, CartLine},
    pricing::TotalPriceError,
};

/// Errors that can occur at checkout.
#[derive(Debug, Error, PartialEq)]
pub enum CheckoutError {
    /// There is nothing to check out.
    #[error("Your shopping cart is empty!")]
    EmptyCart,

    /// The order total could not be calculated.
    #[error(transparent)]
    TotalPrice(#[from] TotalPriceError),
}

/// Sequential order identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct OrderId(u64);

impl OrderId {
    /// Returns the raw id value.
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Issues strictly increasing order ids, starting at 1.
#[derive(Debug, Clone)]
pub struct OrderSequence {
    next: u64,
}

impl OrderSequence {
    /// Create a sequence whose first id is 1.
    pub const fn new() -> Self {
        Self { next: 1 }
    }

    /// Issue the next id.
    pub fn next_id(&mut self) -> OrderId {
        let id = OrderId(self.next);

        self.next = self.next.saturating_add(1);

        id
    }

    /// The id the next call to [`OrderSequence::next_id`] will return.
    pub fn peek(&self) -> OrderId {
        OrderId(self.next)
    }
}

impl Default for OrderSequence {
    fn default() -> Self {
        Self::new()
    }
}

/// Immutable snapshot of a cart at checkout.
#[derive(Debug, Clone, PartialEq)]
pub struct Order<'a> {
    id: OrderId,
    lines: SmallVec<[CartLine<'a>; 8]>,
    total: Money<'a, Currency>,
}

impl<'a> Order<'a> {
    /// Copy the cart's lines and compute the order total once.
    ///
    /// # Errors
    ///
    /// Returns a `TotalPriceError` if the total cannot be calculated.
    pub fn from_cart(id: OrderId, cart: &Cart<'a>) -> Result<Self, TotalPriceError> {
        Ok(Self {
            id,
            lines: cart.iter().cloned().collect(),
            total: cart.total()?,
        })
    }

    /// Order id
    pub fn id(&self) -> OrderId {
        self.id
    }

    /// Lines captured at checkout
    pub fn lines(&self) -> &[CartLine<'a>] {
        &self.lines
    }

    /// Total computed at checkout
    pub fn total(&self) -> Money<'a, Currency> {
        self.total
    }
}

/// Append-only record of completed orders.
#[derive(Debug, Default)]
pub struct OrderHistory<'a> {
    orders: Vec<Order<'a>>,
    sequence: OrderSequence,
}

impl<'a> OrderHistory<'a> {
    /// Create an empty history.
    pub fn new() -> Self {
        Self {
            orders: Vec::new(),
            sequence: OrderSequence::new(),
        }
    }

    /// Issue an id for an order built outside [`OrderHistory::checkout`].
    pub fn issue_id(&mut self) -> OrderId {
        self.sequence.next_id()
    }

    /// Append an order.
    pub fn add_order(&mut self, order: Order<'a>) {
        self.orders.push(order);
    }

    /// Turn the cart into an order, record it and empty the cart.
    ///
    /// Nothing changes unless every step succeeds; an empty cart consumes no id.
    ///
    /// # Errors
    ///
    /// - [`CheckoutError::EmptyCart`]: the cart has no lines.
    /// - [`CheckoutError::TotalPrice`]: the total could not be calculated.
    #[tracing::instrument(name = "orders.checkout", skip_all, fields(lines = cart.len()), err)]
    pub fn checkout(&mut self, cart: &mut Cart<'a>) -> Result<Order<'a>, CheckoutError> {
        if cart.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }

        let order = Order::from_cart(self.sequence.peek(), cart)?;

        self.sequence.next_id();
        self.add_order(order.clone());
        cart.clear();

        info!(order = %order.id(), total = %order.total(), "checked out");

        Ok(order)
    }

    /// Orders in checkout order.
    pub fn iter(&self) -> impl Iterator<Item = &Order<'a>> {
        self.orders.iter()
    }

    /// Most recent order.
    pub fn last(&self) -> Option<&Order<'a>> {
        self.orders.last()
    }

    /// Number of recorded orders.
    pub fn len(&self) -> usize {
        self.orders.len()
    }

    /// Check if no orders have been recorded.
    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }
}
