//! Product domain models.

use std::fmt;
use std::str::FromStr;

use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Date format accepted for grocery expiry dates.
pub const EXPIRY_DATE_FORMAT: &str = "%Y-%m-%d";

/// Errors raised by product construction and per-product operations.
#[derive(Debug, Error)]
pub enum ProductError {
    /// A sale requested more units than the product has in stock.
    #[error("insufficient stock: requested {requested}, available {available}")]
    InsufficientStock {
        /// Units the caller asked to sell.
        requested: u32,
        /// Units currently in stock.
        available: u32,
    },
    /// An expiry date did not parse as `YYYY-MM-DD`.
    #[error("invalid expiry date '{value}': {source}")]
    InvalidExpiryDate {
        /// The rejected input.
        value: String,
        /// Underlying date parse failure.
        #[source]
        source: chrono::ParseError,
    },
    /// A category tag did not name any known product type.
    #[error("unknown product type '{0}'")]
    UnknownCategory(String),
}

/// Fieldless discriminant for the closed set of product variants.
///
/// Used for type-based catalog searches and as the wire tag in the
/// persisted format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProductCategory {
    /// Electronics such as phones and cables.
    Electronics,
    /// Perishable groceries.
    Grocery,
    /// Clothing and apparel.
    Clothing,
}

impl ProductCategory {
    /// All categories, in menu order.
    pub const ALL: [ProductCategory; 3] = [
        ProductCategory::Electronics,
        ProductCategory::Grocery,
        ProductCategory::Clothing,
    ];

    /// Wire/display tag for the category.
    pub fn label(self) -> &'static str {
        match self {
            ProductCategory::Electronics => "Electronics",
            ProductCategory::Grocery => "Grocery",
            ProductCategory::Clothing => "Clothing",
        }
    }
}

impl fmt::Display for ProductCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for ProductCategory {
    type Err = ProductError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        match input.trim().to_lowercase().as_str() {
            "electronics" => Ok(ProductCategory::Electronics),
            "grocery" => Ok(ProductCategory::Grocery),
            "clothing" => Ok(ProductCategory::Clothing),
            _ => Err(ProductError::UnknownCategory(input.trim().to_string())),
        }
    }
}

/// Variant-specific attributes carried by a [`Product`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ProductKind {
    /// Electronics carry a warranty period and a brand.
    Electronics {
        /// Warranty length in whole years.
        warranty_years: u32,
        /// Manufacturer brand.
        brand: String,
    },
    /// Groceries carry an expiry date.
    Grocery {
        /// Last day the item is considered fresh.
        expiry_date: NaiveDate,
    },
    /// Clothing carries a size and a material.
    Clothing {
        /// Garment size label.
        size: String,
        /// Fabric or material description.
        material: String,
    },
}

impl ProductKind {
    /// Category tag for this payload.
    pub fn category(&self) -> ProductCategory {
        match self {
            ProductKind::Electronics { .. } => ProductCategory::Electronics,
            ProductKind::Grocery { .. } => ProductCategory::Grocery,
            ProductKind::Clothing { .. } => ProductCategory::Clothing,
        }
    }
}

/// A single catalog entry.
///
/// The serde shape mirrors the persisted file format: base fields at
/// the top level with the variant payload flattened in under its
/// `type` tag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    /// Identifier expected (but not enforced) to be unique per catalog.
    #[serde(rename = "product_id")]
    pub id: u32,
    /// Display name.
    pub name: String,
    /// Unit price; non-negative.
    pub price: f64,
    /// Units currently in stock.
    pub quantity_in_stock: u32,
    /// Variant payload.
    #[serde(flatten)]
    pub kind: ProductKind,
}

impl Product {
    /// Build a product from base fields and a variant payload.
    pub fn new(
        id: u32,
        name: impl Into<String>,
        price: f64,
        quantity_in_stock: u32,
        kind: ProductKind,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            price,
            quantity_in_stock,
            kind,
        }
    }

    /// Build an electronics product.
    pub fn electronics(
        id: u32,
        name: impl Into<String>,
        price: f64,
        quantity_in_stock: u32,
        warranty_years: u32,
        brand: impl Into<String>,
    ) -> Self {
        Self::new(
            id,
            name,
            price,
            quantity_in_stock,
            ProductKind::Electronics {
                warranty_years,
                brand: brand.into(),
            },
        )
    }

    /// Build a grocery product from an already-parsed expiry date.
    pub fn grocery(
        id: u32,
        name: impl Into<String>,
        price: f64,
        quantity_in_stock: u32,
        expiry_date: NaiveDate,
    ) -> Self {
        Self::new(
            id,
            name,
            price,
            quantity_in_stock,
            ProductKind::Grocery { expiry_date },
        )
    }

    /// Build a grocery product from a textual `YYYY-MM-DD` expiry date.
    ///
    /// A malformed date is fatal at construction.
    pub fn grocery_from_str(
        id: u32,
        name: impl Into<String>,
        price: f64,
        quantity_in_stock: u32,
        expiry_date: &str,
    ) -> Result<Self, ProductError> {
        let parsed = NaiveDate::parse_from_str(expiry_date.trim(), EXPIRY_DATE_FORMAT).map_err(
            |source| ProductError::InvalidExpiryDate {
                value: expiry_date.trim().to_string(),
                source,
            },
        )?;
        Ok(Self::grocery(id, name, price, quantity_in_stock, parsed))
    }

    /// Build a clothing product.
    pub fn clothing(
        id: u32,
        name: impl Into<String>,
        price: f64,
        quantity_in_stock: u32,
        size: impl Into<String>,
        material: impl Into<String>,
    ) -> Self {
        Self::new(
            id,
            name,
            price,
            quantity_in_stock,
            ProductKind::Clothing {
                size: size.into(),
                material: material.into(),
            },
        )
    }

    /// Category tag of this product's variant.
    pub fn category(&self) -> ProductCategory {
        self.kind.category()
    }

    /// Increase the stocked quantity. No upper bound.
    pub fn restock(&mut self, amount: u32) {
        self.quantity_in_stock += amount;
    }

    /// Sell units, failing without mutation when stock is insufficient.
    pub fn sell(&mut self, quantity: u32) -> Result<(), ProductError> {
        if quantity > self.quantity_in_stock {
            return Err(ProductError::InsufficientStock {
                requested: quantity,
                available: self.quantity_in_stock,
            });
        }
        self.quantity_in_stock -= quantity;
        Ok(())
    }

    /// Current value of the stocked units.
    pub fn total_value(&self) -> f64 {
        self.price * f64::from(self.quantity_in_stock)
    }

    /// Short variant-specific summary.
    pub fn describe(&self) -> String {
        match &self.kind {
            ProductKind::Electronics {
                warranty_years,
                brand,
            } => format!("{brand} - {}, Warranty: {warranty_years} years", self.name),
            ProductKind::Grocery { expiry_date } => {
                format!("{} - Expires on: {expiry_date}", self.name)
            }
            ProductKind::Clothing { size, material } => {
                format!("{} - Size: {size}, Material: {material}", self.name)
            }
        }
    }

    /// Whether a grocery product is past its expiry date.
    ///
    /// Strictly greater-than: an item expiring today is still fresh.
    /// Non-grocery products are never expired.
    pub fn is_expired(&self) -> bool {
        match &self.kind {
            ProductKind::Grocery { expiry_date } => Local::now().date_naive() > *expiry_date,
            _ => false,
        }
    }
}

impl fmt::Display for Product {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Product ID: {}, Name: {}, Price: {}, Stock: {}, Total Value: {}",
            self.id,
            self.name,
            self.price,
            self.quantity_in_stock,
            self.total_value()
        )?;
        match &self.kind {
            ProductKind::Electronics {
                warranty_years,
                brand,
            } => write!(f, ", Brand: {brand}, Warranty: {warranty_years} years"),
            ProductKind::Grocery { expiry_date } => {
                let status = if self.is_expired() { "Expired" } else { "Fresh" };
                write!(f, ", Expiry Date: {expiry_date}, Status: {status}")
            }
            ProductKind::Clothing { size, material } => {
                write!(f, ", Size: {size}, Material: {material}")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn total_value_tracks_restock_and_sell() -> Result<(), ProductError> {
        let mut phone = Product::electronics(1, "Phone", 500.0, 10, 2, "Acme");
        assert_eq!(phone.total_value(), 5000.0);

        phone.sell(3)?;
        assert_eq!(phone.quantity_in_stock, 7);
        assert_eq!(phone.total_value(), 3500.0);

        phone.restock(5);
        assert_eq!(phone.quantity_in_stock, 12);
        assert_eq!(phone.total_value(), 6000.0);
        Ok(())
    }

    #[test]
    fn overselling_leaves_stock_unchanged() {
        let mut shirt = Product::clothing(2, "Shirt", 19.99, 4, "M", "Cotton");
        let err = shirt.sell(5).unwrap_err();
        assert!(matches!(
            err,
            ProductError::InsufficientStock {
                requested: 5,
                available: 4
            }
        ));
        assert_eq!(shirt.quantity_in_stock, 4);
    }

    #[test]
    fn restock_then_sell_round_trips_quantity() -> Result<(), ProductError> {
        let mut shirt = Product::clothing(3, "Shirt", 19.99, 4, "L", "Wool");
        shirt.restock(6);
        shirt.sell(6)?;
        assert_eq!(shirt.quantity_in_stock, 4);
        Ok(())
    }

    #[test]
    fn grocery_expiry_is_strictly_past_dated() {
        let stale = Product::grocery_from_str(4, "Milk", 2.5, 8, "2000-01-01").unwrap();
        assert!(stale.is_expired());

        let today = Product::grocery(5, "Bread", 1.8, 3, Local::now().date_naive());
        assert!(!today.is_expired());

        let fresh = Product::grocery_from_str(6, "Juice", 3.0, 5, "2999-12-31").unwrap();
        assert!(!fresh.is_expired());
    }

    #[test]
    fn non_grocery_products_never_expire() {
        let phone = Product::electronics(7, "Phone", 500.0, 1, 2, "Acme");
        assert!(!phone.is_expired());
    }

    #[test]
    fn malformed_expiry_date_fails_construction() {
        let err = Product::grocery_from_str(8, "Milk", 2.5, 8, "01/02/2025").unwrap_err();
        assert!(matches!(err, ProductError::InvalidExpiryDate { .. }));
    }

    #[test]
    fn describe_is_variant_specific() {
        let phone = Product::electronics(1, "Phone", 500.0, 10, 2, "Acme");
        assert_eq!(phone.describe(), "Acme - Phone, Warranty: 2 years");

        let milk = Product::grocery_from_str(2, "Milk", 2.5, 8, "2030-06-15").unwrap();
        assert_eq!(milk.describe(), "Milk - Expires on: 2030-06-15");

        let shirt = Product::clothing(3, "Shirt", 19.99, 4, "M", "Cotton");
        assert_eq!(shirt.describe(), "Shirt - Size: M, Material: Cotton");
    }

    #[test]
    fn display_appends_variant_fields() {
        let phone = Product::electronics(1, "Phone", 500.0, 10, 2, "Acme");
        assert_eq!(
            phone.to_string(),
            "Product ID: 1, Name: Phone, Price: 500, Stock: 10, Total Value: 5000, \
             Brand: Acme, Warranty: 2 years"
        );

        let milk = Product::grocery_from_str(2, "Milk", 2.5, 8, "2999-12-31").unwrap();
        assert_eq!(
            milk.to_string(),
            "Product ID: 2, Name: Milk, Price: 2.5, Stock: 8, Total Value: 20, \
             Expiry Date: 2999-12-31, Status: Fresh"
        );

        let shirt = Product::clothing(3, "Shirt", 20.0, 4, "M", "Cotton");
        assert_eq!(
            shirt.to_string(),
            "Product ID: 3, Name: Shirt, Price: 20, Stock: 4, Total Value: 80, \
             Size: M, Material: Cotton"
        );
    }

    #[test]
    fn category_parses_case_insensitively() {
        assert_eq!(
            "electronics".parse::<ProductCategory>().unwrap(),
            ProductCategory::Electronics
        );
        assert_eq!(
            " Grocery ".parse::<ProductCategory>().unwrap(),
            ProductCategory::Grocery
        );
        assert_eq!(
            "CLOTHING".parse::<ProductCategory>().unwrap(),
            ProductCategory::Clothing
        );
        assert!(matches!(
            "furniture".parse::<ProductCategory>(),
            Err(ProductError::UnknownCategory(_))
        ));
    }
}
