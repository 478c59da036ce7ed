//! Cart

use rusty_money::{Money, iso::Currency};
use thiserror::Error;
use tracing::{info, warn};

use crate::{
    catalog::{Catalog, CatalogError},
    pricing::{TotalPriceError, line_total, total_price},
    products::ProductId,
};

/// Errors related to cart mutation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CartError {
    /// Quantities must be at least one.
    #[error("Invalid quantity: {0}")]
    InvalidQuantity(i64),

    /// Not enough stock left to cover the request.
    #[error("Not enough stock for product {product}: requested {requested}, available {available}")]
    InsufficientStock {
        /// Product being added
        product: ProductId,
        /// Units requested
        requested: u64,
        /// Units left in the catalog
        available: u32,
    },

    /// No product has the requested id.
    #[error("Product not found: {0}")]
    ProductNotFound(ProductId),

    /// The product has no line in the cart.
    #[error("Product {0} is not in the cart")]
    NotInCart(ProductId),

    /// Any other stock ledger failure.
    #[error(transparent)]
    Catalog(CatalogError),
}

impl From<CatalogError> for CartError {
    fn from(error: CatalogError) -> Self {
        match error {
            CatalogError::ProductNotFound(id) => CartError::ProductNotFound(id),
            CatalogError::InsufficientStock {
                product,
                requested,
                available,
            } => CartError::InsufficientStock {
                product,
                requested,
                available,
            },
            other => CartError::Catalog(other),
        }
    }
}

/// One product's reserved quantity within a cart.
///
/// Name and unit price are captured when the line is created so orders can
/// keep an independent copy after the cart is cleared.
#[derive(Debug, Clone, PartialEq)]
pub struct CartLine<'a> {
    product: ProductId,
    name: String,
    unit_price: Money<'a, Currency>,
    quantity: u32,
}

impl<'a> CartLine<'a> {
    /// Creates a new cart line.
    pub fn new(
        product: ProductId,
        name: impl Into<String>,
        unit_price: Money<'a, Currency>,
        quantity: u32,
    ) -> Self {
        Self {
            product,
            name: name.into(),
            unit_price,
            quantity,
        }
    }

    /// Returns the product id of the line
    pub fn product(&self) -> ProductId {
        self.product
    }

    /// Returns the product name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the unit price
    pub fn unit_price(&self) -> &Money<'a, Currency> {
        &self.unit_price
    }

    /// Returns the reserved quantity
    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    /// Unit price multiplied by quantity.
    ///
    /// # Errors
    ///
    /// Returns [`TotalPriceError::Overflow`] if the total does not fit in minor units.
    pub fn total(&self) -> Result<Money<'a, Currency>, TotalPriceError> {
        line_total(&self.unit_price, self.quantity)
    }
}

/// Cart
#[derive(Debug, Clone)]
pub struct Cart<'a> {
    lines: Vec<CartLine<'a>>,
    currency: &'a Currency,
}

impl<'a> Cart<'a> {
    /// Create a new, empty cart.
    pub fn new(currency: &'a Currency) -> Self {
        Cart {
            lines: Vec::new(),
            currency,
        }
    }

    /// Reserve `quantity` units of a product and add them to the cart.
    ///
    /// Availability is checked against the catalog's current stock, which
    /// already excludes units reserved by earlier adds. When the product
    /// already has a line, the line's quantity plus the new quantity must
    /// not exceed that current stock either.
    ///
    /// Returns the line's quantity after the add.
    ///
    /// # Errors
    ///
    /// - [`CartError::InvalidQuantity`]: `quantity` is zero or negative.
    /// - [`CartError::ProductNotFound`]: unknown product id.
    /// - [`CartError::InsufficientStock`]: the request cannot be covered.
    ///
    /// The cart and catalog are untouched on error.
    #[tracing::instrument(
        name = "cart.add_product",
        skip(self, catalog),
        fields(product = %id),
        err
    )]
    pub fn add_product(
        &mut self,
        catalog: &mut Catalog<'a>,
        id: ProductId,
        quantity: i64,
    ) -> Result<u32, CartError> {
        if quantity <= 0 {
            warn!("rejected non-positive quantity");

            return Err(CartError::InvalidQuantity(quantity));
        }

        let product = catalog.find_by_id(id)?;
        let available = product.stock();

        let insufficient = |requested: u64| CartError::InsufficientStock {
            product: id,
            requested,
            available,
        };

        let requested = u32::try_from(quantity)
            .ok()
            .filter(|requested| *requested <= available)
            .ok_or_else(|| insufficient(quantity.unsigned_abs()))?;

        let position = self.lines.iter().position(|line| line.product == id);

        let existing = position
            .and_then(|index| self.lines.get(index))
            .map_or(0, CartLine::quantity);

        if u64::from(existing) + u64::from(requested) > u64::from(available) {
            warn!(existing, available, "line would exceed remaining stock");

            return Err(insufficient(u64::from(requested)));
        }

        let name = product.name.clone();
        let unit_price = product.price;

        catalog.reserve(id, requested)?;

        let line_quantity = match position.and_then(|index| self.lines.get_mut(index)) {
            Some(line) => {
                line.quantity += requested;
                line.quantity
            }
            None => {
                self.lines
                    .push(CartLine::new(id, name, unit_price, requested));
                requested
            }
        };

        info!(quantity = requested, line_quantity, "added to cart");

        Ok(line_quantity)
    }

    /// Drop a product's line and return its reserved units to the catalog.
    ///
    /// # Errors
    ///
    /// - [`CartError::NotInCart`]: the product has no line.
    /// - [`CartError::Catalog`]: the catalog rejected the release; the cart is untouched.
    #[tracing::instrument(
        name = "cart.remove_product",
        skip(self, catalog),
        fields(product = %id),
        err
    )]
    pub fn remove_product(
        &mut self,
        catalog: &mut Catalog<'a>,
        id: ProductId,
    ) -> Result<CartLine<'a>, CartError> {
        let (index, quantity) = self
            .lines
            .iter()
            .enumerate()
            .find(|(_, line)| line.product == id)
            .map(|(index, line)| (index, line.quantity))
            .ok_or(CartError::NotInCart(id))?;

        catalog.release(id, quantity)?;

        let line = self.lines.remove(index);

        info!(quantity, "removed from cart");

        Ok(line)
    }

    /// Calculate the cart total.
    ///
    /// # Errors
    ///
    /// Returns a `TotalPriceError` if there was a money arithmetic or overflow error.
    pub fn total(&self) -> Result<Money<'a, Currency>, TotalPriceError> {
        total_price(&self.lines, self.currency)
    }

    /// Remove every line. Reserved stock is not returned to the catalog.
    pub fn clear(&mut self) {
        self.lines.clear();
    }

    /// Reserved quantity for a product, if it has a line.
    pub fn quantity_of(&self, id: ProductId) -> Option<u32> {
        self.lines
            .iter()
            .find(|line| line.product == id)
            .map(CartLine::quantity)
    }

    /// Lines in the order they were first added.
    pub fn lines(&self) -> &[CartLine<'a>] {
        &self.lines
    }

    /// Iterate over the lines in the cart.
    pub fn iter(&self) -> impl Iterator<Item = &CartLine<'a>> {
        self.lines.iter()
    }

    /// Get the number of lines in the cart.
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Check if the cart is empty.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Get the currency of the cart.
    pub fn currency(&self) -> &'a Currency {
        self.currency
    }
}

#[cfg(test)]
mod tests {
    use rusty_money::iso::USD;
    use testresult::TestResult;

    use crate::products::Product;

    use super::*;

    const LAPTOP: ProductId = ProductId::new(1);
    const PHONE: ProductId = ProductId::new(2);

    fn catalog() -> Result<Catalog<'static>, CatalogError> {
        Catalog::with_products(
            USD,
            [
                Product::new(LAPTOP, "Laptop", Money::from_minor(99_999, USD), 10),
                Product::new(PHONE, "Smartphone", Money::from_minor(59_999, USD), 15),
            ],
        )
    }

    fn stock(catalog: &Catalog<'_>, id: ProductId) -> Result<u32, CatalogError> {
        catalog.find_by_id(id).map(Product::stock)
    }

    #[test]
    fn add_product_reserves_stock_and_appends_line() -> TestResult {
        let mut catalog = catalog()?;
        let mut cart = Cart::new(USD);

        assert_eq!(cart.add_product(&mut catalog, LAPTOP, 3)?, 3);

        assert_eq!(stock(&catalog, LAPTOP)?, 7);
        assert_eq!(cart.len(), 1);
        assert_eq!(cart.quantity_of(LAPTOP), Some(3));

        Ok(())
    }

    #[test]
    fn add_product_rejects_non_positive_quantity() -> TestResult {
        let mut catalog = catalog()?;
        let mut cart = Cart::new(USD);

        for quantity in [0, -1, i64::MIN] {
            assert_eq!(
                cart.add_product(&mut catalog, LAPTOP, quantity),
                Err(CartError::InvalidQuantity(quantity))
            );
        }

        assert!(cart.is_empty());
        assert_eq!(stock(&catalog, LAPTOP)?, 10);

        Ok(())
    }

    #[test]
    fn add_product_rejects_more_than_current_stock() -> TestResult {
        let mut catalog = catalog()?;
        let mut cart = Cart::new(USD);

        cart.add_product(&mut catalog, LAPTOP, 3)?;

        assert_eq!(
            cart.add_product(&mut catalog, LAPTOP, 8),
            Err(CartError::InsufficientStock {
                product: LAPTOP,
                requested: 8,
                available: 7,
            })
        );

        assert_eq!(stock(&catalog, LAPTOP)?, 7);
        assert_eq!(cart.quantity_of(LAPTOP), Some(3));

        Ok(())
    }

    #[test]
    fn add_product_checks_existing_line_against_remaining_stock() -> TestResult {
        let mut catalog = catalog()?;
        let mut cart = Cart::new(USD);

        cart.add_product(&mut catalog, LAPTOP, 3)?;

        // 5 <= 7 remaining, but 3 + 5 > 7.
        assert!(matches!(
            cart.add_product(&mut catalog, LAPTOP, 5),
            Err(CartError::InsufficientStock { available: 7, .. })
        ));

        assert_eq!(cart.add_product(&mut catalog, LAPTOP, 2)?, 5);
        assert_eq!(stock(&catalog, LAPTOP)?, 5);
        assert_eq!(cart.len(), 1);

        Ok(())
    }

    #[test]
    fn add_product_rejects_quantity_beyond_u32() -> TestResult {
        let mut catalog = catalog()?;
        let mut cart = Cart::new(USD);

        assert!(matches!(
            cart.add_product(&mut catalog, LAPTOP, i64::MAX),
            Err(CartError::InsufficientStock { available: 10, .. })
        ));

        Ok(())
    }

    #[test]
    fn add_product_unknown_id_returns_not_found() -> TestResult {
        let mut catalog = catalog()?;
        let mut cart = Cart::new(USD);

        assert_eq!(
            cart.add_product(&mut catalog, ProductId::new(9), 1),
            Err(CartError::ProductNotFound(ProductId::new(9)))
        );

        Ok(())
    }

    #[test]
    fn stock_plus_reserved_is_conserved() -> TestResult {
        let mut catalog = catalog()?;
        let mut cart = Cart::new(USD);

        for (id, quantity) in [(LAPTOP, 2), (PHONE, 4), (LAPTOP, 9), (PHONE, 1), (LAPTOP, 1)] {
            let _result = cart.add_product(&mut catalog, id, quantity);
        }

        for (id, opening) in [(LAPTOP, 10), (PHONE, 15)] {
            let reserved = cart.quantity_of(id).unwrap_or(0);

            assert_eq!(stock(&catalog, id)? + reserved, opening);
        }

        Ok(())
    }

    #[test]
    fn total_sums_lines() -> TestResult {
        let mut catalog = catalog()?;
        let mut cart = Cart::new(USD);

        cart.add_product(&mut catalog, LAPTOP, 3)?;
        cart.add_product(&mut catalog, PHONE, 1)?;

        assert_eq!(cart.total()?, Money::from_minor(359_996, USD));

        Ok(())
    }

    #[test]
    fn total_of_empty_cart_is_zero() -> TestResult {
        let cart = Cart::new(USD);

        assert_eq!(cart.total()?, Money::from_minor(0, USD));

        Ok(())
    }

    #[test]
    fn clear_keeps_reserved_stock() -> TestResult {
        let mut catalog = catalog()?;
        let mut cart = Cart::new(USD);

        cart.add_product(&mut catalog, LAPTOP, 3)?;
        cart.clear();

        assert!(cart.is_empty());
        assert_eq!(stock(&catalog, LAPTOP)?, 7);

        Ok(())
    }

    #[test]
    fn remove_product_releases_reserved_units() -> TestResult {
        let mut catalog = catalog()?;
        let mut cart = Cart::new(USD);

        cart.add_product(&mut catalog, LAPTOP, 3)?;
        cart.add_product(&mut catalog, PHONE, 2)?;

        let line = cart.remove_product(&mut catalog, LAPTOP)?;

        assert_eq!(line.quantity(), 3);
        assert_eq!(stock(&catalog, LAPTOP)?, 10);
        assert_eq!(cart.quantity_of(LAPTOP), None);
        assert_eq!(cart.len(), 1);

        Ok(())
    }

    #[test]
    fn remove_product_not_in_cart_errors() -> TestResult {
        let mut catalog = catalog()?;
        let mut cart = Cart::new(USD);

        assert_eq!(
            cart.remove_product(&mut catalog, LAPTOP),
            Err(CartError::NotInCart(LAPTOP))
        );

        Ok(())
    }

    #[test]
    fn lines_keep_insertion_order() -> TestResult {
        let mut catalog = catalog()?;
        let mut cart = Cart::new(USD);

        cart.add_product(&mut catalog, PHONE, 1)?;
        cart.add_product(&mut catalog, LAPTOP, 1)?;
        cart.add_product(&mut catalog, PHONE, 1)?;

        let names: Vec<&str> = cart.iter().map(CartLine::name).collect();

        assert_eq!(names, vec!["Smartphone", "Laptop"]);

        Ok(())
    }
}
