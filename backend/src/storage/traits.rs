//! # Storage Traits
//!
//! The storage abstraction the domain layer talks to. Any backend that can
//! insert, patch and list food entries by id can sit behind it.

use async_trait::async_trait;
use chrono::NaiveDate;
use shared::{FoodEntry, SortDirection, SortField};

/// Failure at the storage boundary
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Food entry {0} not found")]
    NotFound(String),
    #[error(transparent)]
    Backend(#[from] anyhow::Error),
}

pub type StorageResult<T> = std::result::Result<T, StorageError>;

/// A validated entry that has not been given an id yet
#[derive(Debug, Clone, PartialEq)]
pub struct NewFoodEntry {
    pub date: NaiveDate,
    pub meal_type: String,
    pub food_item: String,
    pub initial_weight: f64,
    pub remaining_weight: Option<f64>,
    pub created_at: String,
}

impl NewFoodEntry {
    /// The entry as it reads back once the store has assigned `id`.
    pub fn into_entry(self, id: String) -> FoodEntry {
        FoodEntry {
            id,
            date: self.date,
            meal_type: self.meal_type,
            food_item: self.food_item,
            initial_weight: self.initial_weight,
            remaining_weight: self.remaining_weight,
            created_at: self.created_at,
        }
    }
}

/// Fields to change on an existing entry. `None` leaves a field untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EntryPatch {
    pub remaining_weight: Option<f64>,
}

impl EntryPatch {
    pub fn remaining_weight(weight: f64) -> Self {
        Self {
            remaining_weight: Some(weight),
        }
    }

    pub fn apply(&self, entry: &mut FoodEntry) {
        if let Some(weight) = self.remaining_weight {
            entry.remaining_weight = Some(weight);
        }
    }
}

/// Trait defining the interface for food entry storage operations
///
/// Each write touches exactly one record and either fully succeeds or leaves
/// the stored data as it was.
#[async_trait]
pub trait EntryStorage: Send + Sync {
    /// Store a new entry and return the id assigned to it
    async fn insert(&self, entry: &NewFoodEntry) -> StorageResult<String>;

    /// Apply a patch to the entry with the given id
    async fn update(&self, id: &str, patch: &EntryPatch) -> StorageResult<()>;

    /// Look up a single entry
    async fn get(&self, id: &str) -> StorageResult<Option<FoodEntry>>;

    /// Every stored entry, ordered by the given column
    async fn query_all(
        &self,
        order_by: SortField,
        direction: SortDirection,
    ) -> StorageResult<Vec<FoodEntry>>;
}
