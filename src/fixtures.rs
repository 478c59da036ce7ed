//! Catalog Fixtures
//!
//! Loads a catalog from a YAML file in place of the built-in product list:
//!
//! ```yaml
//! products:
//!   - id: 1
//!     name: Laptop
//!     price: "999.99 USD"
//!     stock: 10
//! ```

use std::{fs, path::Path};

use rust_decimal::{Decimal, prelude::ToPrimitive};
use rusty_money::{
    Money,
    iso::{Currency, EUR, GBP, USD},
};
use serde::Deserialize;
use thiserror::Error;
use tracing::info;

use crate::{
    catalog::{Catalog, CatalogError},
    products::{Product, ProductId},
};

/// Fixture Parsing Errors
#[derive(Debug, Error)]
pub enum FixtureError {
    /// IO error reading fixture files
    #[error("Failed to read catalog file: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing error
    #[error("Failed to parse YAML: {0}")]
    Yaml(#[from] serde_norway::Error),

    /// Invalid price format
    #[error("Invalid price format: {0}")]
    InvalidPrice(String),

    /// Unknown currency code
    #[error("Unknown currency code: {0}")]
    UnknownCurrency(String),

    /// The file lists no products, so the currency is unknown
    #[error("Catalog file lists no products")]
    NoProducts,

    /// Catalog construction error
    #[error(transparent)]
    Catalog(#[from] CatalogError),
}

/// Wrapper for products in YAML
#[derive(Debug, Deserialize)]
pub struct CatalogFixture {
    /// Products in display order
    pub products: Vec<ProductFixture>,
}

/// Product Fixture
#[derive(Debug, Deserialize)]
pub struct ProductFixture {
    /// Product id
    pub id: u32,

    /// Product name
    pub name: String,

    /// Product price (e.g., "999.99 USD")
    pub price: String,

    /// Opening stock
    pub stock: u32,
}

impl TryFrom<ProductFixture> for Product<'static> {
    type Error = FixtureError;

    fn try_from(fixture: ProductFixture) -> Result<Self, Self::Error> {
        let (minor_units, currency) = parse_price(&fixture.price)?;

        Ok(Product::new(
            ProductId::new(fixture.id),
            fixture.name,
            Money::from_minor(minor_units, currency),
            fixture.stock,
        ))
    }
}

impl CatalogFixture {
    /// Build a catalog, taking its currency from the first product.
    ///
    /// # Errors
    ///
    /// - [`FixtureError::NoProducts`]: the fixture is empty.
    /// - [`FixtureError::InvalidPrice`] / [`FixtureError::UnknownCurrency`]: a price failed to parse.
    /// - [`FixtureError::Catalog`]: duplicate ids or mixed currencies.
    pub fn into_catalog(self) -> Result<Catalog<'static>, FixtureError> {
        let products = self
            .products
            .into_iter()
            .map(Product::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        let currency = products
            .first()
            .map(|product| product.price.currency())
            .ok_or(FixtureError::NoProducts)?;

        Ok(Catalog::with_products(currency, products)?)
    }
}

/// Parse a catalog from YAML text.
///
/// # Errors
///
/// Returns an error if the YAML is malformed or any product is invalid.
pub fn parse_catalog(contents: &str) -> Result<Catalog<'static>, FixtureError> {
    let fixture: CatalogFixture = serde_norway::from_str(contents)?;

    fixture.into_catalog()
}

/// Load a catalog from a YAML file.
///
/// # Errors
///
/// Returns an error if the file cannot be read, parsed, or if any product is invalid.
pub fn load_catalog(path: impl AsRef<Path>) -> Result<Catalog<'static>, FixtureError> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)?;
    let catalog = parse_catalog(&contents)?;

    info!(
        path = %path.display(),
        products = catalog.len(),
        currency = catalog.currency().iso_alpha_code,
        "loaded catalog"
    );

    Ok(catalog)
}

/// Parse price string (e.g., "2.99 GBP") into minor units and currency
///
/// # Errors
///
/// Returns an error if the string is not in the format "AMOUNT CURRENCY",
/// if the amount is not a non-negative decimal in whole minor units, or if
/// the currency code is not recognized.
pub fn parse_price(s: &str) -> Result<(i64, &'static Currency), FixtureError> {
    let parts: Vec<&str> = s.split_whitespace().collect();

    let [amount, currency_code] = parts.as_slice() else {
        return Err(FixtureError::InvalidPrice(format!(
            "Expected format 'AMOUNT CURRENCY', got: {s}"
        )));
    };

    let amount = amount
        .parse::<Decimal>()
        .map_err(|_err| FixtureError::InvalidPrice(s.to_string()))?;

    if amount.is_sign_negative() {
        return Err(FixtureError::InvalidPrice(s.to_string()));
    }

    // Amounts finer than one minor unit are rejected, never rounded.
    let minor_units = amount
        .checked_mul(Decimal::ONE_HUNDRED)
        .filter(|value| value.fract().is_zero())
        .as_ref()
        .and_then(ToPrimitive::to_i64)
        .ok_or_else(|| FixtureError::InvalidPrice(s.to_string()))?;

    let currency = match *currency_code {
        "GBP" => GBP,
        "USD" => USD,
        "EUR" => EUR,
        other => return Err(FixtureError::UnknownCurrency(other.to_string())),
    };

    Ok((minor_units, currency))
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    #[test]
    fn parse_price_rejects_invalid_format() {
        let result = parse_price("2.99GBP");

        assert!(matches!(result, Err(FixtureError::InvalidPrice(_))));
    }

    #[test]
    fn parse_price_rejects_unknown_currency() {
        let result = parse_price("2.99 ABC");

        assert!(matches!(result, Err(FixtureError::UnknownCurrency(code)) if code == "ABC"));
    }

    #[test]
    fn parse_price_rejects_negative_amounts() {
        let result = parse_price("-1.00 USD");

        assert!(matches!(result, Err(FixtureError::InvalidPrice(_))));
    }

    #[test]
    fn parse_price_rejects_fractions_of_a_minor_unit() {
        for price in ["0.005 USD", "1.999 GBP", "12.3401 EUR"] {
            let result = parse_price(price);

            assert!(
                matches!(result, Err(FixtureError::InvalidPrice(_))),
                "{price} should be rejected"
            );
        }
    }

    #[test]
    fn parse_price_accepts_trailing_zeros() -> Result<(), FixtureError> {
        let (minor, _) = parse_price("1.500 GBP")?;

        assert_eq!(minor, 150);

        Ok(())
    }

    #[test]
    fn parse_price_accepts_usd_and_eur() -> Result<(), FixtureError> {
        let (usd_minor, usd) = parse_price("999.99 USD")?;
        let (eur_minor, eur) = parse_price("2.50 EUR")?;

        assert_eq!(usd_minor, 99_999);
        assert_eq!(usd, USD);
        assert_eq!(eur_minor, 250);
        assert_eq!(eur, EUR);

        Ok(())
    }

    #[test]
    fn parse_catalog_preserves_order() -> TestResult {
        let catalog = parse_catalog(
            "products:\n  - id: 7\n    name: Kettle\n    price: \"24.50 GBP\"\n    stock: 3\n  - id: 2\n    name: Toaster\n    price: \"31.00 GBP\"\n    stock: 5\n",
        )?;

        let ids: Vec<u32> = catalog.iter().map(|p| p.id.get()).collect();

        assert_eq!(ids, vec![7, 2]);
        assert_eq!(catalog.currency(), GBP);
        assert_eq!(catalog.find_by_id(ProductId::new(7))?.stock(), 3);

        Ok(())
    }

    #[test]
    fn parse_catalog_rejects_empty_product_list() {
        let result = parse_catalog("products: []\n");

        assert!(matches!(result, Err(FixtureError::NoProducts)));
    }

    #[test]
    fn parse_catalog_rejects_mixed_currencies() {
        let result = parse_catalog(
            "products:\n  - id: 1\n    name: A\n    price: \"1.00 GBP\"\n    stock: 1\n  - id: 2\n    name: B\n    price: \"1.00 USD\"\n    stock: 1\n",
        );

        assert!(matches!(
            result,
            Err(FixtureError::Catalog(CatalogError::CurrencyMismatch("GBP", "USD")))
        ));
    }

    #[test]
    fn parse_catalog_rejects_sub_cent_price() {
        let result = parse_catalog(
            "products:\n  - id: 1\n    name: Gum\n    price: \"0.005 USD\"\n    stock: 5\n",
        );

        assert!(matches!(result, Err(FixtureError::InvalidPrice(_))));
    }

    #[test]
    fn parse_catalog_rejects_malformed_yaml() {
        let result = parse_catalog("products: [");

        assert!(matches!(result, Err(FixtureError::Yaml(_))));
    }
}
