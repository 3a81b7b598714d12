use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::NaiveDate;
use csv::{Reader, Writer};
use serde::{Deserialize, Serialize};
use shared::{FoodEntry, SortDirection, SortField};
use std::fs::{self, File, OpenOptions};
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;
use tracing::{debug, info};
use uuid::Uuid;

use super::traits::{EntryPatch, EntryStorage, NewFoodEntry, StorageError, StorageResult};
use crate::domain::query;
use crate::session::Session;

const ENTRIES_FILE: &str = "food_entries.csv";

/// One line of the entries file
#[derive(Debug, Clone, Serialize, Deserialize)]
struct EntryRecord {
    id: String,
    date: NaiveDate,
    meal_type: String,
    food_item: String,
    initial_weight: f64,
    remaining_weight: Option<f64>,
    created_by: String,
    created_at: String,
}

impl From<EntryRecord> for FoodEntry {
    fn from(record: EntryRecord) -> Self {
        FoodEntry {
            id: record.id,
            date: record.date,
            meal_type: record.meal_type,
            food_item: record.food_item,
            initial_weight: record.initial_weight,
            remaining_weight: record.remaining_weight,
            created_at: record.created_at,
        }
    }
}

/// CSV-based entry store keeping every entry in a single file
pub struct CsvEntryStorage {
    file_path: PathBuf,
    session: Session,
    /// Serializes read-modify-write cycles on the file
    write_lock: Mutex<()>,
}

impl CsvEntryStorage {
    /// Create a store rooted at `base_directory`, creating it if needed
    pub fn new<P: AsRef<Path>>(base_directory: P, session: Session) -> Result<Self> {
        let base_path = base_directory.as_ref().to_path_buf();
        if !base_path.exists() {
            fs::create_dir_all(&base_path)
                .with_context(|| format!("creating data directory {}", base_path.display()))?;
        }

        let file_path = base_path.join(ENTRIES_FILE);
        info!("Using CSV entry store at {}", file_path.display());
        Ok(Self {
            file_path,
            session,
            write_lock: Mutex::new(()),
        })
    }

    pub fn file_path(&self) -> &Path {
        &self.file_path
    }

    fn read_records(&self) -> Result<Vec<EntryRecord>> {
        if !self.file_path.exists() {
            return Ok(Vec::new());
        }

        let file = File::open(&self.file_path)?;
        let mut csv_reader = Reader::from_reader(BufReader::new(file));

        let mut records = Vec::new();
        for result in csv_reader.deserialize() {
            let record: EntryRecord =
                result.with_context(|| format!("reading {}", self.file_path.display()))?;
            records.push(record);
        }
        Ok(records)
    }

    /// Rewrite the whole file via a temporary file and an atomic rename
    fn write_records(&self, records: &[EntryRecord]) -> Result<()> {
        let temp_path = self.file_path.with_extension("tmp");

        {
            let file = OpenOptions::new()
                .write(true)
                .create(true)
                .truncate(true)
                .open(&temp_path)?;

            let mut csv_writer = Writer::from_writer(BufWriter::new(file));
            for record in records {
                csv_writer.serialize(record)?;
            }
            csv_writer.flush()?;
        }

        fs::rename(&temp_path, &self.file_path)?;
        Ok(())
    }
}

#[async_trait]
impl EntryStorage for CsvEntryStorage {
    async fn insert(&self, entry: &NewFoodEntry) -> StorageResult<String> {
        let _guard = self.write_lock.lock().await;

        let mut records = self.read_records()?;
        let id = Uuid::new_v4().to_string();
        records.push(EntryRecord {
            id: id.clone(),
            date: entry.date,
            meal_type: entry.meal_type.clone(),
            food_item: entry.food_item.clone(),
            initial_weight: entry.initial_weight,
            remaining_weight: entry.remaining_weight,
            created_by: self.session.id().to_string(),
            created_at: entry.created_at.clone(),
        });
        self.write_records(&records)?;

        debug!("Inserted food entry {} ({})", id, entry.food_item);
        Ok(id)
    }

    async fn update(&self, id: &str, patch: &EntryPatch) -> StorageResult<()> {
        let _guard = self.write_lock.lock().await;

        let mut records = self.read_records()?;
        let record = records
            .iter_mut()
            .find(|record| record.id == id)
            .ok_or_else(|| StorageError::NotFound(id.to_string()))?;

        if let Some(weight) = patch.remaining_weight {
            record.remaining_weight = Some(weight);
        }
        self.write_records(&records)?;
        Ok(())
    }

    async fn get(&self, id: &str) -> StorageResult<Option<FoodEntry>> {
        let records = self.read_records()?;
        Ok(records
            .into_iter()
            .find(|record| record.id == id)
            .map(FoodEntry::from))
    }

    async fn query_all(
        &self,
        order_by: SortField,
        direction: SortDirection,
    ) -> StorageResult<Vec<FoodEntry>> {
        let entries = self.read_records()?.into_iter().map(FoodEntry::from);
        Ok(query::sort(entries, order_by, direction))
    }
}
