//! Farm records. Every field defaults so partially written or older data still loads;
//! unknown fields are ignored.

use serde::{Deserialize, Serialize};

/// Farm identity shown on the profile page and dashboard header.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FarmProfile {
    pub farm_name: String,
    pub owner_name: String,
    pub location: String,
    pub farm_type: String,
    pub phone: String,
    pub email: String,
    pub established: Option<String>,
}

impl FarmProfile {
    /// A profile counts as filled in once it has a farm name.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        !self.farm_name.trim().is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct InventoryItem {
    pub id: String,
    pub name: String,
    pub category: String,
    pub quantity: f64,
    pub unit: String,
    pub cost_per_unit: f64,
    pub date: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    Income,
    #[default]
    Expense,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Transaction {
    pub id: String,
    pub date: String,
    #[serde(rename = "type")]
    pub kind: TransactionKind,
    pub category: String,
    pub amount: f64,
    pub description: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Sale {
    pub id: String,
    pub date: String,
    pub product: String,
    pub quantity: f64,
    pub unit_price: f64,
    pub customer: String,
}

impl Sale {
    #[must_use]
    pub fn total(&self) -> f64 {
        self.quantity * self.unit_price
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FeedRecord {
    pub id: String,
    pub date: String,
    pub feed_type: String,
    pub quantity_kg: f64,
    pub cost: f64,
    pub batch: String,
    pub notes: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MortalityRecord {
    pub id: String,
    pub date: String,
    pub batch: String,
    pub count: u32,
    pub cause: String,
    pub notes: String,
}

/// User preferences.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Settings {
    pub currency: String,
    pub weight_unit: String,
    pub remote_sync: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self { currency: "USD".to_owned(), weight_unit: "kg".to_owned(), remote_sync: false }
    }
}
