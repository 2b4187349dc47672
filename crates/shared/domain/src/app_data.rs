//! The shared application snapshot.

use crate::constants::{
    FEED_RECORDS_KEY, INVENTORY_KEY, MORTALITY_KEY, PROFILE_KEY, SALES_KEY, SETTINGS_KEY,
    TRANSACTIONS_KEY,
};
use crate::records::{
    FarmProfile, FeedRecord, InventoryItem, MortalityRecord, Sale, Settings, Transaction,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Everything the modules share. Last writer wins; no cross-record invariants.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SharedAppData {
    pub profile: FarmProfile,
    pub inventory: Vec<InventoryItem>,
    pub transactions: Vec<Transaction>,
    pub sales: Vec<Sale>,
    pub feed_records: Vec<FeedRecord>,
    pub mortality_records: Vec<MortalityRecord>,
    pub settings: Settings,
}

/// Top-level keys of [`SharedAppData`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AppDataKey {
    Profile,
    Inventory,
    Transactions,
    Sales,
    FeedRecords,
    MortalityRecords,
    Settings,
}

impl AppDataKey {
    pub const ALL: [Self; 7] = [
        Self::Profile,
        Self::Inventory,
        Self::Transactions,
        Self::Sales,
        Self::FeedRecords,
        Self::MortalityRecords,
        Self::Settings,
    ];

    /// Field name inside the serialized snapshot.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Profile => "profile",
            Self::Inventory => "inventory",
            Self::Transactions => "transactions",
            Self::Sales => "sales",
            Self::FeedRecords => "feedRecords",
            Self::MortalityRecords => "mortalityRecords",
            Self::Settings => "settings",
        }
    }

    /// Per-collection local storage key used before the umbrella snapshot.
    #[must_use]
    pub const fn legacy_storage_key(self) -> &'static str {
        match self {
            Self::Profile => PROFILE_KEY,
            Self::Inventory => INVENTORY_KEY,
            Self::Transactions => TRANSACTIONS_KEY,
            Self::Sales => SALES_KEY,
            Self::FeedRecords => FEED_RECORDS_KEY,
            Self::MortalityRecords => MORTALITY_KEY,
            Self::Settings => SETTINGS_KEY,
        }
    }

    /// Whether the key holds an ordered record sequence (as opposed to an object).
    #[must_use]
    pub const fn is_collection(self) -> bool {
        !matches!(self, Self::Profile | Self::Settings)
    }
}

impl fmt::Display for AppDataKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a string names no top-level key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownKey(pub String);

impl fmt::Display for UnknownKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown app data key '{}'", self.0)
    }
}

impl std::error::Error for UnknownKey {}

impl FromStr for AppDataKey {
    type Err = UnknownKey;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL.into_iter().find(|k| k.as_str() == s).ok_or_else(|| UnknownKey(s.to_owned()))
    }
}

impl SharedAppData {
    /// Number of records in a collection key; `None` for object keys.
    #[must_use]
    pub fn collection_len(&self, key: AppDataKey) -> Option<usize> {
        match key {
            AppDataKey::Inventory => Some(self.inventory.len()),
            AppDataKey::Transactions => Some(self.transactions.len()),
            AppDataKey::Sales => Some(self.sales.len()),
            AppDataKey::FeedRecords => Some(self.feed_records.len()),
            AppDataKey::MortalityRecords => Some(self.mortality_records.len()),
            AppDataKey::Profile | AppDataKey::Settings => None,
        }
    }
}
