//! Inventory models.

use serde::{Deserialize, Serialize};

/// A drug row in the inventory store.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Drug {
    /// Store-assigned key
    pub id: i64,
    /// Drug name, matched case- and whitespace-insensitively
    pub name: String,
    pub brand: Option<String>,
    /// Current stock in units
    pub quantity: i64,
    pub expiry_date: Option<String>,
    pub price_per_unit: Option<f64>,
}

/// Drug fields as shown in the inventory panel (everything except the id).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DrugRecord {
    pub name: String,
    pub brand: Option<String>,
    pub quantity: i64,
    pub expiry_date: Option<String>,
    pub price_per_unit: Option<f64>,
}

impl DrugRecord {
    /// Create a record with only a name and stock level.
    pub fn new(name: impl Into<String>, quantity: i64) -> Self {
        Self {
            name: name.into(),
            brand: None,
            quantity,
            expiry_date: None,
            price_per_unit: None,
        }
    }

    pub fn with_brand(mut self, brand: impl Into<String>) -> Self {
        self.brand = Some(brand.into());
        self
    }

    pub fn with_expiry(mut self, expiry_date: impl Into<String>) -> Self {
        self.expiry_date = Some(expiry_date.into());
        self
    }

    pub fn with_price(mut self, price_per_unit: f64) -> Self {
        self.price_per_unit = Some(price_per_unit);
        self
    }
}

impl From<Drug> for DrugRecord {
    fn from(drug: Drug) -> Self {
        Self {
            name: drug.name,
            brand: drug.brand,
            quantity: drug.quantity,
            expiry_date: drug.expiry_date,
            price_per_unit: drug.price_per_unit,
        }
    }
}

/// An append-only sales ledger entry.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Sale {
    /// Ledger row id
    pub id: i64,
    pub drug_id: i64,
    /// Units sold (always positive)
    pub quantity_sold: i64,
    /// Calendar date of the sale, `YYYY-MM-DD`
    pub sale_date: String,
}

/// Matching key for drug names: whitespace removed, lowercased.
pub fn normalize_drug_name(name: &str) -> String {
    name.chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect()
}
