//! Catalog
//!
//! The catalog owns every [`Product`] for the lifetime of a session and is the
//! only place stock changes. Carts reserve units through [`Catalog::reserve`]
//! and hand them back through [`Catalog::release`]; no other code path can
//! touch a product's stock.

use rustc_hash::FxHashMap;
use rusty_money::{
    Money,
    iso::{Currency, USD},
};
use slotmap::SlotMap;
use thiserror::Error;
use tracing::{debug, warn};

use crate::products::{Product, ProductId, ProductKey};

/// Errors raised by catalog lookups and the stock ledger.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CatalogError {
    /// No product has the requested id.
    #[error("Product not found: {0}")]
    ProductNotFound(ProductId),

    /// Id `0` means "go back" at the browse prompt and cannot name a product.
    #[error("Product id {0} is reserved")]
    ReservedId(ProductId),

    /// A product with this id is already in the catalog.
    #[error("Duplicate product id: {0}")]
    DuplicateProduct(ProductId),

    /// A product is priced in a different currency to the catalog (expected, found).
    #[error("Currency mismatch: expected {0}, found {1}")]
    CurrencyMismatch(&'static str, &'static str),

    /// The requested quantity exceeds the units available.
    #[error("Not enough stock for product {product}: requested {requested}, available {available}")]
    InsufficientStock {
        /// Product being reserved
        product: ProductId,
        /// Units requested
        requested: u64,
        /// Units available at the time of the request
        available: u32,
    },

    /// Releasing units would overflow the stock counter.
    #[error("Stock overflow releasing {quantity} units of product {product}")]
    StockOverflow {
        /// Product being released
        product: ProductId,
        /// Units being released
        quantity: u32,
    },
}

/// Ordered set of products, indexed by id.
#[derive(Debug)]
pub struct Catalog<'a> {
    products: SlotMap<ProductKey, Product<'a>>,

    /// Display order
    order: Vec<ProductKey>,

    /// Product id -> `SlotMap` key
    keys: FxHashMap<ProductId, ProductKey>,

    currency: &'a Currency,
}

impl<'a> Catalog<'a> {
    /// Create an empty catalog priced in the given currency.
    pub fn new(currency: &'a Currency) -> Self {
        Self {
            products: SlotMap::with_key(),
            order: Vec::new(),
            keys: FxHashMap::default(),
            currency,
        }
    }

    /// Create a catalog from a list of products, preserving their order.
    ///
    /// # Errors
    ///
    /// See [`Catalog::insert`].
    pub fn with_products(
        currency: &'a Currency,
        products: impl IntoIterator<Item = Product<'a>>,
    ) -> Result<Self, CatalogError> {
        let mut catalog = Self::new(currency);

        for product in products {
            catalog.insert(product)?;
        }

        Ok(catalog)
    }

    /// Add a product to the end of the catalog.
    ///
    /// # Errors
    ///
    /// - [`CatalogError::ReservedId`]: the id is `0`.
    /// - [`CatalogError::DuplicateProduct`]: the id is already taken.
    /// - [`CatalogError::CurrencyMismatch`]: the product is priced in another currency.
    pub fn insert(&mut self, product: Product<'a>) -> Result<ProductKey, CatalogError> {
        if product.id == ProductId::RESERVED {
            return Err(CatalogError::ReservedId(product.id));
        }

        if self.keys.contains_key(&product.id) {
            return Err(CatalogError::DuplicateProduct(product.id));
        }

        let product_currency = product.price.currency();

        if product_currency != self.currency {
            return Err(CatalogError::CurrencyMismatch(
                self.currency.iso_alpha_code,
                product_currency.iso_alpha_code,
            ));
        }

        let id = product.id;
        let key = self.products.insert(product);

        self.order.push(key);
        self.keys.insert(id, key);

        Ok(key)
    }

    /// Look up a product by its id.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::ProductNotFound`] if no product has this id.
    pub fn find_by_id(&self, id: ProductId) -> Result<&Product<'a>, CatalogError> {
        self.key(id)
            .and_then(|key| self.products.get(key))
            .ok_or(CatalogError::ProductNotFound(id))
    }


    /// Iterate over products in catalog order.
    pub fn iter(&self) -> impl Iterator<Item = &Product<'a>> {
        self.order.iter().filter_map(|key| self.products.get(*key))
    }

    /// Number of products in the catalog.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Check if the catalog has no products.
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Currency every product is priced in.
    pub fn currency(&self) -> &'a Currency {
        self.currency
    }

    /// Take `quantity` units of a product out of stock.
    ///
    /// Returns the units left afterwards.
    ///
    /// # Errors
    ///
    /// - [`CatalogError::ProductNotFound`]: unknown product id.
    /// - [`CatalogError::InsufficientStock`]: fewer than `quantity` units remain; stock is untouched.
    #[tracing::instrument(name = "catalog.reserve", skip(self), fields(product = %id), err)]
    pub fn reserve(&mut self, id: ProductId, quantity: u32) -> Result<u32, CatalogError> {
        let stock = self.stock_mut(id)?;

        let Some(remaining) = stock.checked_sub(quantity) else {
            warn!(available = *stock, "insufficient stock");

            return Err(CatalogError::InsufficientStock {
                product: id,
                requested: u64::from(quantity),
                available: *stock,
            });
        };

        *stock = remaining;

        debug!(remaining, "reserved stock");

        Ok(remaining)
    }

    /// Return `quantity` previously reserved units to stock.
    ///
    /// Returns the units available afterwards.
    ///
    /// # Errors
    ///
    /// - [`CatalogError::ProductNotFound`]: unknown product id.
    /// - [`CatalogError::StockOverflow`]: the stock counter would overflow.
    #[tracing::instrument(name = "catalog.release", skip(self), fields(product = %id), err)]
    pub fn release(&mut self, id: ProductId, quantity: u32) -> Result<u32, CatalogError> {
        let stock = self.stock_mut(id)?;

        let available = stock
            .checked_add(quantity)
            .ok_or(CatalogError::StockOverflow {
                product: id,
                quantity,
            })?;

        *stock = available;

        debug!(available, "released stock");

        Ok(available)
    }

    fn key(&self, id: ProductId) -> Option<ProductKey> {
        self.keys.get(&id).copied()
    }

    fn stock_mut(&mut self, id: ProductId) -> Result<&mut u32, CatalogError> {
        self.key(id)
            .and_then(|key| self.products.get_mut(key))
            .map(Product::stock_mut)
            .ok_or(CatalogError::ProductNotFound(id))
    }
}

impl Catalog<'static> {
    /// The catalog a session starts with when no catalog file is given.
    ///
    /// # Errors
    ///
    /// Never fails in practice; see [`Catalog::insert`].
    pub fn builtin() -> Result<Self, CatalogError> {
        Self::with_products(
            USD,
            [
                Product::new(
                    ProductId::new(1),
                    "Laptop",
                    Money::from_minor(99_999, USD),
                    10,
                ),
                Product::new(
                    ProductId::new(2),
                    "Smartphone",
                    Money::from_minor(59_999, USD),
                    15,
                ),
                Product::new(
                    ProductId::new(3),
                    "Headphones",
                    Money::from_minor(19_999, USD),
                    20,
                ),
                Product::new(
                    ProductId::new(4),
                    "Smartwatch",
                    Money::from_minor(24_999, USD),
                    12,
                ),
            ],
        )
    }
}
