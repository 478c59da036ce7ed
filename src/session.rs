//! Session
//!
//! The interactive menu loop. A session owns the catalog, the cart and the
//! order history, reads one answer per line from its input and writes prompts
//! and results to its output. Bad input is reported and the same prompt is
//! asked again; only I/O failures end a session early.

use std::{
    io::{BufRead, Write},
    ops::ControlFlow,
    str::FromStr,
};

use thiserror::Error;
use tracing::debug;

use crate::{
    cart::{Cart, CartError},
    catalog::Catalog,
    orders::OrderHistory,
    products::ProductId,
    receipt::{self, ReceiptError},
};

const MENU: &str = "\nMenu:
1. View Products & Buy
2. View Shopping Cart
3. View Orders
4. Exit
5. Remove Product from Cart";

/// Errors in a single line of user input. Never fatal.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum InputError {
    /// The line is not a whole number.
    #[error("Invalid input! Please enter a number.")]
    NonNumericInput(String),

    /// The number is not one of the menu options.
    #[error("Invalid choice! Please enter a valid option.")]
    InvalidMenuChoice(i64),
}

/// Errors that end a session.
#[derive(Debug, Error)]
pub enum SessionError {
    /// Reading input or writing output failed.
    #[error("Terminal I/O failed: {0}")]
    Io(#[from] std::io::Error),

    /// Rendering failed.
    #[error(transparent)]
    Receipt(#[from] ReceiptError),
}

/// Top-level menu options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuChoice {
    /// `1`: list products and add them to the cart
    Browse,
    /// `2`: show the cart, then offer checkout
    ViewCart,
    /// `3`: show the order history
    ViewOrders,
    /// `4`: leave the program
    Exit,
    /// `5`: drop a product from the cart, returning its stock
    RemoveFromCart,
}

impl FromStr for MenuChoice {
    type Err = InputError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match parse_number(s)? {
            1 => Ok(MenuChoice::Browse),
            2 => Ok(MenuChoice::ViewCart),
            3 => Ok(MenuChoice::ViewOrders),
            4 => Ok(MenuChoice::Exit),
            5 => Ok(MenuChoice::RemoveFromCart),
            other => Err(InputError::InvalidMenuChoice(other)),
        }
    }
}

/// Parse a whole, possibly negative, number from a line of input.
///
/// # Errors
///
/// Returns [`InputError::NonNumericInput`] if the trimmed line is not an integer.
pub fn parse_number(input: &str) -> Result<i64, InputError> {
    let trimmed = input.trim();

    trimmed
        .parse()
        .map_err(|_err| InputError::NonNumericInput(trimmed.to_string()))
}

/// Outcome of a prompt that can be backed out of.
enum Reply<T> {
    Value(T),
    Back,
    Closed,
}

/// Interactive shopping session.
#[derive(Debug)]
pub struct Session<'a, R, W> {
    catalog: Catalog<'a>,
    cart: Cart<'a>,
    history: OrderHistory<'a>,
    input: R,
    output: W,
}

impl<'a, R: BufRead, W: Write> Session<'a, R, W> {
    /// Start a session with an empty cart and no orders.
    pub fn new(catalog: Catalog<'a>, input: R, output: W) -> Self {
        let cart = Cart::new(catalog.currency());

        Self {
            catalog,
            cart,
            history: OrderHistory::new(),
            input,
            output,
        }
    }

    /// Run the menu loop until the user exits or input ends.
    ///
    /// # Errors
    ///
    /// Returns a `SessionError` if reading input or writing output fails.
    #[tracing::instrument(name = "session.run", skip_all)]
    pub fn run(&mut self) -> Result<(), SessionError> {
        while self.step()?.is_continue() {}

        writeln!(self.output, "Exiting program. Thank you!")?;
        self.output.flush()?;

        Ok(())
    }

    /// Show the menu once and handle one choice.
    fn step(&mut self) -> Result<ControlFlow<()>, SessionError> {
        writeln!(self.output, "{MENU}")?;

        let Some(line) = self.prompt("Enter your choice: ")? else {
            return Ok(ControlFlow::Break(()));
        };

        let choice = match line.parse::<MenuChoice>() {
            Ok(choice) => choice,
            Err(error) => {
                writeln!(self.output, "{error}")?;

                return Ok(ControlFlow::Continue(()));
            }
        };

        debug!(?choice, "menu choice");

        match choice {
            MenuChoice::Browse => self.browse(),
            MenuChoice::ViewCart => self.view_cart(),
            MenuChoice::ViewOrders => {
                receipt::write_order_history(&mut self.output, &self.history)?;

                Ok(ControlFlow::Continue(()))
            }
            MenuChoice::Exit => Ok(ControlFlow::Break(())),
            MenuChoice::RemoveFromCart => self.remove_from_cart(),
        }
    }

    fn browse(&mut self) -> Result<ControlFlow<()>, SessionError> {
        receipt::write_catalog(&mut self.output, &self.catalog)?;

        loop {
            let id = match self.prompt_product_id(
                "Enter the ID of the product you want to add to the shopping cart (0 to go back): ",
            )? {
                Reply::Value(id) => id,
                Reply::Back => return Ok(ControlFlow::Continue(())),
                Reply::Closed => return Ok(ControlFlow::Break(())),
            };

            if self.catalog.find_by_id(id).is_err() {
                writeln!(self.output, "Invalid Product ID!")?;

                continue;
            }

            let Some(quantity) = self.prompt_quantity()? else {
                return Ok(ControlFlow::Break(()));
            };

            let message = match self.cart.add_product(&mut self.catalog, id, quantity) {
                Ok(_) => "Product added successfully!".to_string(),
                Err(CartError::InvalidQuantity(_)) => "Invalid quantity!".to_string(),
                Err(CartError::InsufficientStock { .. }) => {
                    "Not enough stock available!".to_string()
                }
                Err(CartError::ProductNotFound(_)) => "Invalid Product ID!".to_string(),
                Err(other) => other.to_string(),
            };

            writeln!(self.output, "{message}")?;
        }
    }

    fn view_cart(&mut self) -> Result<ControlFlow<()>, SessionError> {
        receipt::write_cart(&mut self.output, &self.cart)?;

        if self.cart.is_empty() {
            return Ok(ControlFlow::Continue(()));
        }

        let Some(confirmed) =
            self.prompt_confirmation("Do you want to check out all the products? (Y/N): ")?
        else {
            return Ok(ControlFlow::Break(()));
        };

        if !confirmed {
            return Ok(ControlFlow::Continue(()));
        }

        match self.history.checkout(&mut self.cart) {
            Ok(order) => receipt::write_checkout_summary(&mut self.output, &order)?,
            Err(error) => writeln!(self.output, "{error}")?,
        }

        Ok(ControlFlow::Continue(()))
    }

    fn remove_from_cart(&mut self) -> Result<ControlFlow<()>, SessionError> {
        receipt::write_cart(&mut self.output, &self.cart)?;

        if self.cart.is_empty() {
            return Ok(ControlFlow::Continue(()));
        }

        loop {
            let id = match self
                .prompt_product_id("Enter the ID of the product to remove (0 to go back): ")?
            {
                Reply::Value(id) => id,
                Reply::Back => return Ok(ControlFlow::Continue(())),
                Reply::Closed => return Ok(ControlFlow::Break(())),
            };

            match self.cart.remove_product(&mut self.catalog, id) {
                Ok(line) => {
                    writeln!(
                        self.output,
                        "Removed {} x{}; stock returned.",
                        line.name(),
                        line.quantity()
                    )?;

                    return Ok(ControlFlow::Continue(()));
                }
                Err(CartError::NotInCart(_)) => {
                    writeln!(self.output, "That product is not in your cart!")?;
                }
                Err(other) => writeln!(self.output, "{other}")?,
            }
        }
    }

    /// Ask for a product id until one parses. `0` means go back.
    fn prompt_product_id(&mut self, text: &str) -> Result<Reply<ProductId>, SessionError> {
        loop {
            let Some(line) = self.prompt(text)? else {
                return Ok(Reply::Closed);
            };

            match parse_number(&line).map(u32::try_from) {
                Ok(Ok(id)) if id == ProductId::RESERVED.get() => return Ok(Reply::Back),
                Ok(Ok(id)) => return Ok(Reply::Value(ProductId::new(id))),
                Ok(Err(_)) => writeln!(self.output, "Invalid Product ID!")?,
                Err(_) => writeln!(
                    self.output,
                    "Invalid input! Please enter a valid product ID."
                )?,
            }
        }
    }

    /// Ask a Y/N question. The first non-blank character decides; blank lines ask again.
    fn prompt_confirmation(&mut self, text: &str) -> Result<Option<bool>, SessionError> {
        loop {
            let Some(line) = self.prompt(text)? else {
                return Ok(None);
            };

            if let Some(answer) = line.trim().chars().next() {
                return Ok(Some(answer.eq_ignore_ascii_case(&'y')));
            }
        }
    }

    /// Ask for a quantity until a whole number is entered.
    fn prompt_quantity(&mut self) -> Result<Option<i64>, SessionError> {
        loop {
            let Some(line) = self.prompt("Enter quantity: ")? else {
                return Ok(None);
            };

            match parse_number(&line) {
                Ok(quantity) => return Ok(Some(quantity)),
                Err(_) => writeln!(
                    self.output,
                    "Invalid input! Please enter a valid quantity."
                )?,
            }
        }
    }

    /// Write `text` and read one line. `None` once input is exhausted.
    fn prompt(&mut self, text: &str) -> Result<Option<String>, SessionError> {
        write!(self.output, "{text}")?;
        self.output.flush()?;

        let mut line = String::new();

        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }

        Ok(Some(line))
    }
}

impl<'a, R, W> Session<'a, R, W> {
    /// The session's catalog.
    pub fn catalog(&self) -> &Catalog<'a> {
        &self.catalog
    }

    /// The session's cart.
    pub fn cart(&self) -> &Cart<'a> {
        &self.cart
    }

    /// Orders placed during the session.
    pub fn history(&self) -> &OrderHistory<'a> {
        &self.history
    }

    /// Consume the session, returning its output.
    pub fn into_output(self) -> W {
        self.output
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use testresult::TestResult;

    use super::*;

    fn run_script(script: &str) -> TestResult<(Session<'static, Cursor<String>, Vec<u8>>, String)> {
        let mut session = Session::new(
            Catalog::builtin()?,
            Cursor::new(script.to_string()),
            Vec::new(),
        );

        session.run()?;

        let output = String::from_utf8(session.output.clone())?;

        Ok((session, output))
    }

    #[test]
    fn menu_choice_parses_every_option() -> TestResult {
        assert_eq!("1".parse::<MenuChoice>()?, MenuChoice::Browse);
        assert_eq!(" 2\n".parse::<MenuChoice>()?, MenuChoice::ViewCart);
        assert_eq!("3".parse::<MenuChoice>()?, MenuChoice::ViewOrders);
        assert_eq!("4".parse::<MenuChoice>()?, MenuChoice::Exit);
        assert_eq!("5".parse::<MenuChoice>()?, MenuChoice::RemoveFromCart);

        Ok(())
    }

    #[test]
    fn menu_choice_rejects_unknown_numbers_and_text() {
        assert_eq!(
            "9".parse::<MenuChoice>(),
            Err(InputError::InvalidMenuChoice(9))
        );
        assert_eq!(
            "buy".parse::<MenuChoice>(),
            Err(InputError::NonNumericInput("buy".to_string()))
        );
    }

    #[test]
    fn parse_number_accepts_negative_numbers() -> TestResult {
        assert_eq!(parse_number("-3\n")?, -3);

        Ok(())
    }

    #[test]
    fn exit_choice_ends_session() -> TestResult {
        let (_, output) = run_script("4\n")?;

        assert!(output.contains("Menu:"));
        assert!(output.ends_with("Exiting program. Thank you!\n"));

        Ok(())
    }

    #[test]
    fn end_of_input_ends_session() -> TestResult {
        let (_, output) = run_script("")?;

        assert!(output.ends_with("Exiting program. Thank you!\n"));

        Ok(())
    }

    #[test]
    fn invalid_menu_choice_reprompts() -> TestResult {
        let (_, output) = run_script("7\nabc\n4\n")?;

        assert!(output.contains("Invalid choice! Please enter a valid option."));
        assert!(output.contains("Invalid input! Please enter a number."));
        assert_eq!(output.matches("Enter your choice: ").count(), 3);

        Ok(())
    }

    #[test]
    fn browse_adds_product_and_returns_to_menu() -> TestResult {
        let (session, output) = run_script("1\n1\n3\n0\n4\n")?;

        assert!(output.contains("Product added successfully!"));
        assert_eq!(session.cart().quantity_of(ProductId::new(1)), Some(3));
        assert_eq!(session.catalog().find_by_id(ProductId::new(1))?.stock(), 7);

        Ok(())
    }

    #[test]
    fn non_numeric_quantity_reprompts_for_quantity() -> TestResult {
        let (session, output) = run_script("1\n2\nlots\n2\n0\n4\n")?;

        assert!(output.contains("Invalid input! Please enter a valid quantity."));
        assert_eq!(output.matches("Enter quantity: ").count(), 2);
        assert_eq!(session.cart().quantity_of(ProductId::new(2)), Some(2));

        Ok(())
    }

    #[test]
    fn declined_checkout_keeps_cart() -> TestResult {
        let (session, output) = run_script("1\n3\n1\n0\n2\nn\n4\n")?;

        assert!(output.contains("Shopping Cart:"));
        assert!(!output.contains("Checkout Summary:"));
        assert_eq!(session.cart().len(), 1);
        assert!(session.history().is_empty());

        Ok(())
    }

    #[test]
    fn blank_checkout_answer_asks_again() -> TestResult {
        let (session, output) = run_script("1\n3\n1\n0\n2\n\n   \ny\n4\n")?;

        assert_eq!(
            output
                .matches("Do you want to check out all the products?")
                .count(),
            3,
            "blank answers should repeat the question"
        );
        assert!(output.contains("Checkout Summary:"));
        assert!(session.cart().is_empty());
        assert_eq!(session.history().len(), 1);

        Ok(())
    }
}
