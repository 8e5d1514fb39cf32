//! Catalog manager owning the product collection.

use thiserror::Error;

use crate::models::{Product, ProductCategory, ProductError};

/// Errors surfaced by catalog operations.
#[derive(Debug, Error)]
pub enum InventoryError {
    /// No product with the given ID exists in the catalog.
    #[error("Product ID {0} not found")]
    NotFound(u32),
    /// The underlying product operation failed.
    #[error(transparent)]
    Product(#[from] ProductError),
}

/// Ordered collection of products.
///
/// Insertion order is preserved so listings are reproducible. IDs are
/// expected unique but never enforced; lookups take the first match
/// in sequence order.
#[derive(Debug, Clone, Default)]
pub struct Inventory {
    products: Vec<Product>,
}

impl Inventory {
    /// Create an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Borrow the catalog in insertion order.
    pub fn products(&self) -> &[Product] {
        &self.products
    }

    /// Number of products in the catalog.
    pub fn len(&self) -> usize {
        self.products.len()
    }

    /// Whether the catalog is empty.
    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    /// First product with the given ID, if any.
    pub fn get(&self, id: u32) -> Option<&Product> {
        self.products.iter().find(|product| product.id == id)
    }

    fn get_mut(&mut self, id: u32) -> Option<&mut Product> {
        self.products.iter_mut().find(|product| product.id == id)
    }

    /// Replace the entire catalog, preserving the given order.
    pub(crate) fn replace(&mut self, products: Vec<Product>) {
        self.products = products;
    }

    /// Append a product and confirm with the new total count.
    pub fn add_product(&mut self, product: Product) -> String {
        let name = product.name.clone();
        self.products.push(product);
        format!("{name} added. Total products: {}", self.products.len())
    }

    /// Remove the first product matching the ID.
    pub fn remove_product(&mut self, id: u32) -> Result<String, InventoryError> {
        let index = self
            .products
            .iter()
            .position(|product| product.id == id)
            .ok_or(InventoryError::NotFound(id))?;
        self.products.remove(index);
        Ok(format!("Product ID {id} removed."))
    }

    /// Case-insensitive substring search over product names.
    ///
    /// An empty result is the no-match outcome; callers render their
    /// own sentinel.
    pub fn search_by_name(&self, query: &str) -> Vec<&Product> {
        let needle = query.to_lowercase();
        self.products
            .iter()
            .filter(|product| product.name.to_lowercase().contains(&needle))
            .collect()
    }

    /// All products of the given category, in catalog order.
    pub fn search_by_category(&self, category: ProductCategory) -> Vec<&Product> {
        self.products
            .iter()
            .filter(|product| product.category() == category)
            .collect()
    }

    /// Formatted line per product; empty when the catalog is empty.
    pub fn list_all(&self) -> Vec<String> {
        self.products.iter().map(Product::to_string).collect()
    }

    /// Sell units of a product.
    ///
    /// Insufficient stock propagates as a failure rather than a
    /// success-shaped confirmation.
    pub fn sell_product(&mut self, id: u32, quantity: u32) -> Result<String, InventoryError> {
        let product = self.get_mut(id).ok_or(InventoryError::NotFound(id))?;
        product.sell(quantity)?;
        Ok(format!("Sold {quantity} of {}.", product.name))
    }

    /// Restock units of a product.
    pub fn restock_product(&mut self, id: u32, quantity: u32) -> Result<String, InventoryError> {
        let product = self.get_mut(id).ok_or(InventoryError::NotFound(id))?;
        product.restock(quantity);
        Ok(format!("Restocked {quantity} of {}.", product.name))
    }

    /// Sum of `price * stock` across the catalog; zero when empty.
    pub fn total_inventory_value(&self) -> f64 {
        self.products.iter().map(Product::total_value).sum()
    }

    /// Remove every expired grocery, returning the removed names in
    /// catalog order. Non-grocery and fresh items are untouched.
    pub fn remove_expired_groceries(&mut self) -> Vec<String> {
        let mut removed = Vec::new();
        self.products.retain(|product| {
            if product.is_expired() {
                removed.push(product.name.clone());
                false
            } else {
                true
            }
        });
        removed
    }
}
