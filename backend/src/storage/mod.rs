//! # Storage Module
//!
//! Persistence for food entries. The domain layer only sees the
//! [`EntryStorage`] trait; which backend sits behind it is decided once at
//! startup from configuration.
//!
//! - **sqlite**: `sqlx` connection pool over a single `food_entries` table
//! - **csv**: one `food_entries.csv` file rewritten atomically on each write

pub mod csv;
pub mod sqlite;
pub mod traits;

pub use self::csv::CsvEntryStorage;
pub use self::sqlite::SqliteEntryStorage;
pub use self::traits::{EntryPatch, EntryStorage, NewFoodEntry, StorageError, StorageResult};

use anyhow::Result;
use std::sync::Arc;

use crate::config::StorageBackend;
use crate::session::Session;

/// Open the configured backend under the given session
pub async fn open_storage(backend: &StorageBackend, session: Session) -> Result<Arc<dyn EntryStorage>> {
    let storage: Arc<dyn EntryStorage> = match backend {
        StorageBackend::Sqlite { database_url } => {
            Arc::new(SqliteEntryStorage::connect(database_url, session).await?)
        }
        StorageBackend::Csv { data_dir } => Arc::new(CsvEntryStorage::new(data_dir, session)?),
    };
    Ok(storage)
}
