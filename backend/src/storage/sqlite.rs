use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::NaiveDate;
use shared::{FoodEntry, SortDirection, SortField};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions, SqliteRow};
use sqlx::{Row, SqlitePool};
use std::str::FromStr;
use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;

use super::traits::{EntryPatch, EntryStorage, NewFoodEntry, StorageError, StorageResult};
use crate::domain::query;
use crate::session::Session;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// SQLite-backed entry store
#[derive(Clone)]
pub struct SqliteEntryStorage {
    pool: Arc<SqlitePool>,
    session: Session,
}

impl SqliteEntryStorage {
    /// Open (creating if needed) the database at `url`
    pub async fn connect(url: &str, session: Session) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(url)
            .with_context(|| format!("invalid SQLite url {}", url))?
            .create_if_missing(true);

        let pool = SqlitePoolOptions::new().connect_with(options).await?;
        Self::setup_schema(&pool).await?;

        info!("Connected to SQLite entry store at {}", url);
        Ok(Self {
            pool: Arc::new(pool),
            session,
        })
    }

    /// A private in-memory database, mostly for tests.
    ///
    /// Limited to one connection so every query sees the same database.
    pub async fn in_memory(session: Session) -> Result<Self> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?;
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?;
        Self::setup_schema(&pool).await?;

        Ok(Self {
            pool: Arc::new(pool),
            session,
        })
    }

    /// Set up the required database schema
    async fn setup_schema(pool: &SqlitePool) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS food_entries (
                id TEXT PRIMARY KEY,
                date TEXT NOT NULL,
                meal_type TEXT NOT NULL,
                food_item TEXT NOT NULL,
                initial_weight REAL NOT NULL CHECK (initial_weight >= 0),
                remaining_weight REAL CHECK (remaining_weight IS NULL OR remaining_weight >= 0),
                created_by TEXT NOT NULL,
                created_at TEXT NOT NULL
            );
            "#,
        )
        .execute(pool)
        .await?;

        Ok(())
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    async fn insert_row(&self, id: &str, entry: &NewFoodEntry) -> Result<()> {
        sqlx::query(
            "INSERT INTO food_entries \
             (id, date, meal_type, food_item, initial_weight, remaining_weight, created_by, created_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(id)
        .bind(entry.date.format(DATE_FORMAT).to_string())
        .bind(&entry.meal_type)
        .bind(&entry.food_item)
        .bind(entry.initial_weight)
        .bind(entry.remaining_weight)
        .bind(self.session.id())
        .bind(&entry.created_at)
        .execute(&*self.pool)
        .await?;
        Ok(())
    }

    /// Returns the number of rows touched
    async fn update_row(&self, id: &str, patch: &EntryPatch) -> Result<u64> {
        let result = sqlx::query(
            "UPDATE food_entries \
             SET remaining_weight = COALESCE(?, remaining_weight) \
             WHERE id = ?",
        )
        .bind(patch.remaining_weight)
        .bind(id)
        .execute(&*self.pool)
        .await?;
        Ok(result.rows_affected())
    }

    async fn fetch_one(&self, id: &str) -> Result<Option<FoodEntry>> {
        let row = sqlx::query(
            "SELECT id, date, meal_type, food_item, initial_weight, remaining_weight, created_at \
             FROM food_entries WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&*self.pool)
        .await?;

        row.as_ref().map(entry_from_row).transpose()
    }

    /// Every row in insertion order
    async fn fetch_all(&self) -> Result<Vec<FoodEntry>> {
        let rows = sqlx::query(
            "SELECT id, date, meal_type, food_item, initial_weight, remaining_weight, created_at \
             FROM food_entries ORDER BY rowid ASC",
        )
        .fetch_all(&*self.pool)
        .await?;
        rows.iter().map(entry_from_row).collect()
    }
}

fn entry_from_row(row: &SqliteRow) -> Result<FoodEntry> {
    let date: String = row.try_get("date")?;
    let date = NaiveDate::parse_from_str(&date, DATE_FORMAT)
        .with_context(|| format!("stored entry has malformed date {:?}", date))?;

    Ok(FoodEntry {
        id: row.try_get("id")?,
        date,
        meal_type: row.try_get("meal_type")?,
        food_item: row.try_get("food_item")?,
        initial_weight: row.try_get("initial_weight")?,
        remaining_weight: row.try_get("remaining_weight")?,
        created_at: row.try_get("created_at")?,
    })
}

#[async_trait]
impl EntryStorage for SqliteEntryStorage {
    async fn insert(&self, entry: &NewFoodEntry) -> StorageResult<String> {
        let id = Uuid::new_v4().to_string();
        self.insert_row(&id, entry).await?;
        debug!("Inserted food entry {} ({})", id, entry.food_item);
        Ok(id)
    }

    async fn update(&self, id: &str, patch: &EntryPatch) -> StorageResult<()> {
        match self.update_row(id, patch).await? {
            0 => Err(StorageError::NotFound(id.to_string())),
            _ => Ok(()),
        }
    }

    async fn get(&self, id: &str) -> StorageResult<Option<FoodEntry>> {
        Ok(self.fetch_one(id).await?)
    }

    async fn query_all(
        &self,
        order_by: SortField,
        direction: SortDirection,
    ) -> StorageResult<Vec<FoodEntry>> {
        // Ordered in process so both stores share one ordering for text ties
        // and pending entries
        let entries = self.fetch_all().await?;
        Ok(query::sort(entries, order_by, direction))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn setup_test() -> SqliteEntryStorage {
        SqliteEntryStorage::in_memory(Session::anonymous())
            .await
            .expect("Failed to create test database")
    }

    fn new_entry(date: &str, food_item: &str, initial_weight: f64) -> NewFoodEntry {
        NewFoodEntry {
            date: NaiveDate::parse_from_str(date, DATE_FORMAT).unwrap(),
            meal_type: "lunch".to_string(),
            food_item: food_item.to_string(),
            initial_weight,
            remaining_weight: None,
            created_at: "2024-01-10T12:00:00+00:00".to_string(),
        }
    }

    #[tokio::test]
    async fn test_insert_and_get_entry() {
        let store = setup_test().await;

        let id = store.insert(&new_entry("2024-01-10", "Rice", 2.0)).await.unwrap();
        let entry = store.get(&id).await.unwrap().expect("entry should exist");

        assert_eq!(entry.id, id);
        assert_eq!(entry.food_item, "Rice");
        assert_eq!(entry.date, NaiveDate::from_ymd_opt(2024, 1, 10).unwrap());
        assert_eq!(entry.initial_weight, 2.0);
        assert_eq!(entry.remaining_weight, None);
    }

    #[tokio::test]
    async fn test_get_unknown_entry() {
        let store = setup_test().await;
        assert!(store.get("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_update_sets_remaining_weight() {
        let store = setup_test().await;
        let id = store.insert(&new_entry("2024-01-10", "Rice", 2.0)).await.unwrap();

        store.update(&id, &EntryPatch::remaining_weight(0.5)).await.unwrap();
        let entry = store.get(&id).await.unwrap().unwrap();
        assert_eq!(entry.remaining_weight, Some(0.5));

        // An empty patch leaves the row alone
        store.update(&id, &EntryPatch::default()).await.unwrap();
        let entry = store.get(&id).await.unwrap().unwrap();
        assert_eq!(entry.remaining_weight, Some(0.5));
    }

    #[tokio::test]
    async fn test_update_unknown_entry_is_not_found() {
        let store = setup_test().await;
        let result = store.update("missing", &EntryPatch::remaining_weight(1.0)).await;
        assert!(matches!(result, Err(StorageError::NotFound(id)) if id == "missing"));
    }

    #[tokio::test]
    async fn test_negative_weight_rejected_by_schema() {
        let store = setup_test().await;
        let result = store.insert(&new_entry("2024-01-10", "Rice", -1.0)).await;
        assert!(matches!(result, Err(StorageError::Backend(_))));
        assert!(store
            .query_all(SortField::Date, SortDirection::Asc)
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_query_all_orders_by_column() {
        let store = setup_test().await;
        store.insert(&new_entry("2024-01-11", "rice", 3.0)).await.unwrap();
        store.insert(&new_entry("2024-01-09", "Bread", 1.0)).await.unwrap();
        store.insert(&new_entry("2024-01-10", "apple", 2.0)).await.unwrap();

        let by_date = store.query_all(SortField::Date, SortDirection::Desc).await.unwrap();
        let dates: Vec<String> = by_date.iter().map(|e| e.date.to_string()).collect();
        assert_eq!(dates, vec!["2024-01-11", "2024-01-10", "2024-01-09"]);

        let by_name = store.query_all(SortField::FoodItem, SortDirection::Asc).await.unwrap();
        let names: Vec<&str> = by_name.iter().map(|e| e.food_item.as_str()).collect();
        assert_eq!(names, vec!["apple", "Bread", "rice"]);

        let by_weight = store
            .query_all(SortField::InitialWeight, SortDirection::Desc)
            .await
            .unwrap();
        let weights: Vec<f64> = by_weight.iter().map(|e| e.initial_weight).collect();
        assert_eq!(weights, vec![3.0, 2.0, 1.0]);
    }

    #[tokio::test]
    async fn test_rows_record_session() {
        let store = setup_test().await;
        let id = store.insert(&new_entry("2024-01-10", "Rice", 2.0)).await.unwrap();

        let created_by: String = sqlx::query_scalar("SELECT created_by FROM food_entries WHERE id = ?")
            .bind(&id)
            .fetch_one(&*store.pool)
            .await
            .unwrap();
        assert_eq!(created_by, store.session().id());
    }
}
