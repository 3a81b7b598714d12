//! Two-phase food entry lifecycle.
//!
//! An entry is first recorded with its initial weight only. Once the meal has
//! been served the remaining weight is recorded against the same id, which
//! makes the waste percentage available.
use chrono::{NaiveDate, Utc};
use shared::{CreateEntryRequest, FoodEntry, SortDirection, SortField};
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::domain::models::{
    parse_entry_date, validate_label, validate_weight, EntryError, EntryResult,
};
use crate::domain::waste;
use crate::storage::{EntryPatch, EntryStorage, NewFoodEntry, StorageError};

#[derive(Clone)]
pub struct EntryService {
    storage: Arc<dyn EntryStorage>,
}

impl EntryService {
    pub fn new(storage: Arc<dyn EntryStorage>) -> Self {
        Self { storage }
    }

    /// First phase: weigh the food before it is served.
    ///
    /// All input is validated before the store is touched.
    pub async fn record_initial(
        &self,
        date: NaiveDate,
        meal_type: &str,
        food_item: &str,
        initial_weight: f64,
    ) -> EntryResult<FoodEntry> {
        let new_entry = NewFoodEntry {
            date,
            meal_type: validate_label("meal_type", meal_type)?,
            food_item: validate_label("food_item", food_item)?,
            initial_weight: validate_weight("initial_weight", initial_weight)?,
            remaining_weight: None,
            created_at: Utc::now().to_rfc3339(),
        };

        let id = self
            .storage
            .insert(&new_entry)
            .await
            .map_err(|e| store_failure("recording initial entry", e))?;

        info!(
            "Recorded initial entry {}: {} ({}) {} kg on {}",
            id, new_entry.food_item, new_entry.meal_type, new_entry.initial_weight, new_entry.date
        );
        Ok(new_entry.into_entry(id))
    }

    /// [`record_initial`](Self::record_initial) from a request whose date is
    /// still text
    pub async fn create_entry(&self, request: CreateEntryRequest) -> EntryResult<FoodEntry> {
        let date = parse_entry_date(&request.date)?;
        self.record_initial(date, &request.meal_type, &request.food_item, request.initial_weight)
            .await
    }

    /// Second phase: weigh what is left over.
    ///
    /// Recording again on a completed entry overwrites the earlier value.
    pub async fn record_remaining(&self, id: &str, remaining_weight: f64) -> EntryResult<FoodEntry> {
        let remaining_weight = validate_weight("remaining_weight", remaining_weight)?;

        let mut entry = self
            .storage
            .get(id)
            .await
            .map_err(|e| store_failure("looking up entry", e))?
            .ok_or_else(|| EntryError::NotFound(id.to_string()))?;

        if let Some(previous) = entry.remaining_weight {
            warn!(
                "Correcting remaining weight of entry {} from {} kg to {} kg",
                id, previous, remaining_weight
            );
        }

        let patch = EntryPatch::remaining_weight(remaining_weight);
        self.storage
            .update(id, &patch)
            .await
            .map_err(|e| store_failure("recording remaining weight", e))?;
        patch.apply(&mut entry);

        if waste::is_anomalous(&entry) {
            warn!(
                "Entry {} has more left over ({} kg) than was weighed in ({} kg)",
                id, remaining_weight, entry.initial_weight
            );
        }
        info!(
            "Recorded remaining weight for entry {}: {} kg, waste {}%",
            id,
            remaining_weight,
            waste::waste_percentage(&entry)
        );
        Ok(entry)
    }

    /// Every entry, newest date first
    pub async fn list_entries(&self) -> EntryResult<Vec<FoodEntry>> {
        self.storage
            .query_all(SortField::Date, SortDirection::Desc)
            .await
            .map_err(|e| store_failure("listing entries", e))
    }

    /// Entries still waiting for their remaining weight
    pub async fn list_pending(&self) -> EntryResult<Vec<FoodEntry>> {
        let entries = self.list_entries().await?;
        Ok(entries.into_iter().filter(|e| !e.is_completed()).collect())
    }

    /// Completed entries with food left over, offered for redistribution
    pub async fn list_completed_with_surplus(&self) -> EntryResult<Vec<FoodEntry>> {
        let entries = self.list_entries().await?;
        Ok(entries.into_iter().filter(waste::has_surplus).collect())
    }
}

/// Convert a storage failure, logging the detail that the user-facing
/// message leaves out
fn store_failure(operation: &str, err: StorageError) -> EntryError {
    if let StorageError::Backend(source) = &err {
        error!("Food entry store failed while {}: {:?}", operation, source);
    }
    EntryError::from(err)
}
