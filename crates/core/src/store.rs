//! Flat-file persistence for the catalog.

use std::{fs, path::Path};

use anyhow::{Context, Result};
use serde_json::Value;
use tracing::warn;

use crate::{
    inventory::Inventory,
    models::{Product, ProductCategory},
};

/// Default file name used when no path is configured.
pub const DEFAULT_INVENTORY_FILE: &str = "inventory.json";

/// Summary of a completed load.
#[derive(Debug, Default)]
pub struct LoadReport {
    /// Number of products now in the catalog.
    pub loaded: usize,
    /// Per-item decode failures, in file order. These entries were
    /// dropped; the rest of the file still loaded.
    pub skipped: Vec<String>,
}

impl Inventory {
    /// Serialize the whole catalog to `path` as a pretty-printed JSON
    /// array, creating parent directories as needed.
    pub fn save_to_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
        let serialised = serde_json::to_vec_pretty(self.products())?;
        fs::write(path, serialised).with_context(|| format!("failed to write {}", path.display()))
    }

    /// Replace the catalog with the contents of `path`.
    ///
    /// Items with an unrecognised `type` tag are ignored. Items that
    /// fail to decode are skipped with an error recorded in the
    /// report. A missing file or an unparsable container is a
    /// whole-file failure and leaves the current catalog untouched.
    pub fn load_from_file(&mut self, path: impl AsRef<Path>) -> Result<LoadReport> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let items: Vec<Value> = serde_json::from_str(&content)
            .with_context(|| format!("failed to parse {}", path.display()))?;

        let mut products = Vec::with_capacity(items.len());
        let mut report = LoadReport::default();
        for (index, item) in items.into_iter().enumerate() {
            if let Some(tag) = item.get("type").and_then(Value::as_str) {
                if !ProductCategory::ALL.iter().any(|c| c.label() == tag) {
                    continue;
                }
            }
            match serde_json::from_value::<Product>(item) {
                Ok(product) => products.push(product),
                Err(err) => {
                    warn!("Skipping malformed product entry {index}: {err}");
                    report.skipped.push(format!("entry {index}: {err}"));
                }
            }
        }

        report.loaded = products.len();
        self.replace(products);
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ProductKind;
    use chrono::NaiveDate;
    use serde_json::json;
    use tempfile::tempdir;

    fn populated_inventory() -> Inventory {
        let mut inventory = Inventory::new();
        inventory.add_product(Product::electronics(1, "Phone", 500.0, 10, 2, "Acme"));
        inventory
            .add_product(Product::grocery_from_str(2, "Milk", 2.5, 8, "2030-06-15").unwrap());
        inventory.add_product(Product::clothing(3, "Shirt", 19.99, 4, "M", "Cotton"));
        inventory
    }

    #[test]
    fn save_load_round_trip_preserves_fields_and_order() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("inventory.json");
        let original = populated_inventory();
        original.save_to_file(&path)?;

        let mut restored = Inventory::new();
        let report = restored.load_from_file(&path)?;
        assert_eq!(report.loaded, 3);
        assert!(report.skipped.is_empty());
        assert_eq!(restored.products(), original.products());
        Ok(())
    }

    #[test]
    fn wire_format_is_internally_tagged() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("inventory.json");
        populated_inventory().save_to_file(&path)?;

        let raw: Vec<Value> = serde_json::from_str(&fs::read_to_string(&path)?)?;
        assert_eq!(raw.len(), 3);
        assert_eq!(raw[0]["type"], json!("Electronics"));
        assert_eq!(raw[0]["product_id"], json!(1));
        assert_eq!(raw[0]["quantity_in_stock"], json!(10));
        assert_eq!(raw[0]["warranty_years"], json!(2));
        assert_eq!(raw[0]["brand"], json!("Acme"));
        assert_eq!(raw[1]["type"], json!("Grocery"));
        assert_eq!(raw[1]["expiry_date"], json!("2030-06-15"));
        assert_eq!(raw[2]["type"], json!("Clothing"));
        assert_eq!(raw[2]["size"], json!("M"));
        assert_eq!(raw[2]["material"], json!("Cotton"));
        Ok(())
    }

    #[test]
    fn malformed_item_is_skipped_with_error_recorded() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("inventory.json");
        let contents = json!([
            {
                "type": "Electronics",
                "product_id": 1,
                "name": "Phone",
                "price": 500.0,
                "quantity_in_stock": 10,
                "warranty_years": 2,
                "brand": "Acme"
            },
            {
                "type": "Grocery",
                "product_id": 2,
                "name": "Milk",
                "price": 2.5,
                "quantity_in_stock": 8
            },
            {
                "type": "Clothing",
                "product_id": 3,
                "name": "Shirt",
                "price": 19.99,
                "quantity_in_stock": 4,
                "size": "M",
                "material": "Cotton"
            }
        ]);
        fs::write(&path, serde_json::to_vec_pretty(&contents)?)?;

        let mut inventory = Inventory::new();
        let report = inventory.load_from_file(&path)?;
        assert_eq!(report.loaded, 2);
        assert_eq!(report.skipped.len(), 1);
        assert!(report.skipped[0].starts_with("entry 1:"));
        assert_eq!(inventory.products()[0].name, "Phone");
        assert_eq!(inventory.products()[1].name, "Shirt");
        Ok(())
    }

    #[test]
    fn unknown_type_tags_are_ignored_silently() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("inventory.json");
        let contents = json!([
            {
                "type": "Furniture",
                "product_id": 1,
                "name": "Desk",
                "price": 120.0,
                "quantity_in_stock": 2
            },
            {
                "type": "Clothing",
                "product_id": 2,
                "name": "Shirt",
                "price": 19.99,
                "quantity_in_stock": 4,
                "size": "M",
                "material": "Cotton"
            }
        ]);
        fs::write(&path, serde_json::to_vec_pretty(&contents)?)?;

        let mut inventory = Inventory::new();
        let report = inventory.load_from_file(&path)?;
        assert_eq!(report.loaded, 1);
        assert!(report.skipped.is_empty());
        assert_eq!(inventory.products()[0].name, "Shirt");
        Ok(())
    }

    #[test]
    fn missing_type_field_is_a_recorded_skip() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("inventory.json");
        let contents = json!([
            {
                "product_id": 1,
                "name": "Mystery",
                "price": 1.0,
                "quantity_in_stock": 1
            }
        ]);
        fs::write(&path, serde_json::to_vec_pretty(&contents)?)?;

        let mut inventory = Inventory::new();
        let report = inventory.load_from_file(&path)?;
        assert_eq!(report.loaded, 0);
        assert_eq!(report.skipped.len(), 1);
        Ok(())
    }

    #[test]
    fn whole_file_failures_leave_prior_catalog_intact() -> Result<()> {
        let dir = tempdir()?;
        let mut inventory = populated_inventory();

        let missing = dir.path().join("absent.json");
        assert!(inventory.load_from_file(&missing).is_err());
        assert_eq!(inventory.len(), 3);

        let malformed = dir.path().join("broken.json");
        fs::write(&malformed, "not json at all")?;
        assert!(inventory.load_from_file(&malformed).is_err());
        assert_eq!(inventory.len(), 3);
        Ok(())
    }

    #[test]
    fn sell_restock_then_round_trip_reproduces_product() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("inventory.json");

        let mut inventory = Inventory::new();
        inventory.add_product(Product::electronics(1, "Phone", 500.0, 10, 2, "Acme"));
        inventory.sell_product(1, 3)?;
        let phone = inventory.get(1).unwrap();
        assert_eq!(phone.quantity_in_stock, 7);
        assert_eq!(phone.total_value(), 3500.0);
        inventory.restock_product(1, 5)?;
        assert_eq!(inventory.get(1).unwrap().quantity_in_stock, 12);

        inventory.save_to_file(&path)?;
        let mut restored = Inventory::new();
        restored.load_from_file(&path)?;
        let phone = restored.get(1).unwrap();
        assert_eq!(phone.name, "Phone");
        assert_eq!(phone.quantity_in_stock, 12);
        assert_eq!(
            phone.kind,
            ProductKind::Electronics {
                warranty_years: 2,
                brand: "Acme".to_string()
            }
        );
        Ok(())
    }

    #[test]
    fn grocery_dates_survive_the_round_trip() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("inventory.json");
        let expiry = NaiveDate::from_ymd_opt(2031, 2, 28).unwrap();

        let mut inventory = Inventory::new();
        inventory.add_product(Product::grocery(9, "Cheese", 6.4, 2, expiry));
        inventory.save_to_file(&path)?;

        let mut restored = Inventory::new();
        restored.load_from_file(&path)?;
        assert_eq!(
            restored.get(9).unwrap().kind,
            ProductKind::Grocery {
                expiry_date: expiry
            }
        );
        Ok(())
    }
}
