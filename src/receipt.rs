//! Receipt
//!
//! Text rendering for the catalog, the cart, checkout summaries and the order
//! history.

use std::io;

use rusty_money::{Money, iso::Currency};
use tabled::{
    Table,
    builder::Builder,
    settings::{Alignment, Style, object::Columns},
};
use thiserror::Error;

use crate::{
    cart::{Cart, CartLine},
    catalog::Catalog,
    orders::{Order, OrderHistory},
    pricing::TotalPriceError,
};

/// Errors that can occur when rendering.
#[derive(Debug, Error)]
pub enum ReceiptError {
    /// Error calculating a total.
    #[error(transparent)]
    TotalPrice(#[from] TotalPriceError),

    /// IO error
    #[error("IO error: {0}")]
    IO(#[from] io::Error),
}

/// Write the product listing shown when browsing.
///
/// # Errors
///
/// Returns [`ReceiptError::IO`] if writing fails.
pub fn write_catalog(out: &mut impl io::Write, catalog: &Catalog<'_>) -> Result<(), ReceiptError> {
    let mut builder = Builder::default();

    builder.push_record(["ID", "Name", "Price", "Stock"].map(String::from));

    for product in catalog.iter() {
        builder.push_record([
            product.id.to_string(),
            product.name.clone(),
            product.price.to_string(),
            product.stock().to_string(),
        ]);
    }

    writeln!(out, "\nAvailable Products:")?;
    writeln!(out, "{}", finish_table(builder))?;

    Ok(())
}

/// Write the cart contents and running total, or the empty-cart notice.
///
/// # Errors
///
/// Returns a `ReceiptError` if the total cannot be calculated or writing fails.
pub fn write_cart(out: &mut impl io::Write, cart: &Cart<'_>) -> Result<(), ReceiptError> {
    if cart.is_empty() {
        writeln!(out, "Your shopping cart is empty!")?;

        return Ok(());
    }

    writeln!(out, "\nShopping Cart:")?;
    writeln!(out, "{}", lines_table(cart.lines(), "ID", "Qty")?)?;

    write_summary_line(out, "Total:", &cart.total()?)
}

/// Write the summary printed once an order has been placed.
///
/// # Errors
///
/// Returns a `ReceiptError` if a line total cannot be calculated or writing fails.
pub fn write_checkout_summary(
    out: &mut impl io::Write,
    order: &Order<'_>,
) -> Result<(), ReceiptError> {
    writeln!(out, "\nCheckout Summary:")?;
    writeln!(out, "Order ID: {}", order.id())?;
    writeln!(out, "{}", lines_table(order.lines(), "ID", "Qty")?)?;

    write_summary_line(out, "Total Price:", &order.total())?;

    writeln!(out, "You have successfully checked out the products!")?;

    Ok(())
}

/// Write every order in checkout order, or the empty-history notice.
///
/// # Errors
///
/// Returns a `ReceiptError` if a line total cannot be calculated or writing fails.
pub fn write_order_history(
    out: &mut impl io::Write,
    history: &OrderHistory<'_>,
) -> Result<(), ReceiptError> {
    if history.is_empty() {
        writeln!(out, "No orders found!")?;

        return Ok(());
    }

    for order in history.iter() {
        writeln!(out, "\nOrder ID: {}", order.id())?;
        writeln!(out, "Total Amount: {}", order.total())?;
        writeln!(out, "Order Details:")?;
        writeln!(
            out,
            "{}",
            lines_table(order.lines(), "Product ID", "Quantity")?
        )?;
    }

    Ok(())
}

fn lines_table(
    lines: &[CartLine<'_>],
    id_header: &str,
    quantity_header: &str,
) -> Result<Table, ReceiptError> {
    let mut builder = Builder::default();

    builder.push_record(
        [id_header, "Name", "Price", quantity_header, "Line Total"].map(String::from),
    );

    for line in lines {
        builder.push_record([
            line.product().to_string(),
            line.name().to_string(),
            line.unit_price().to_string(),
            line.quantity().to_string(),
            line.total()?.to_string(),
        ]);
    }

    Ok(finish_table(builder))
}

fn finish_table(builder: Builder) -> Table {
    let mut table = builder.build();

    table.with(Style::modern_rounded());
    table.modify(Columns::new(2..), Alignment::right());

    table
}

fn write_summary_line(
    out: &mut impl io::Write,
    label: &str,
    amount: &Money<'_, Currency>,
) -> Result<(), ReceiptError> {
    writeln!(out, "{label} {amount}")?;

    Ok(())
}
