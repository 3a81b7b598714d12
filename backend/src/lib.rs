//! # Food Waste Backend
//!
//! Records food in two weighing phases and reports how much of it was
//! wasted.
//!
//! ## Architecture
//!
//! ```text
//! IO Layer (REST API, handlers)
//!     ↓
//! Domain Layer (entry lifecycle, waste metrics, search and sort)
//!     ↓
//! Storage Layer (SQLite or CSV)
//! ```
//!
//! Stores are built from an explicit [`session::Session`] created at startup.

pub mod config;
pub mod domain;
pub mod io;
pub mod session;
pub mod storage;

use anyhow::Result;
use axum::{
    http::Method,
    routing::{get, put},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

use crate::config::AppConfig;
use crate::domain::{EntryService, EntryTableService};
use crate::io::AppState;
use crate::session::Session;

/// Initialize the backend with all required services
pub async fn initialize_backend(config: &AppConfig) -> Result<AppState> {
    info!("Establishing session");
    let session = Session::anonymous();

    info!("Setting up entry storage: {:?}", config.storage);
    let storage = storage::open_storage(&config.storage, session).await?;

    info!("Setting up domain model");
    let entry_service = EntryService::new(storage);
    let entry_table_service = EntryTableService::new();

    Ok(AppState::new(entry_service, entry_table_service))
}

/// Create the Axum router with all routes configured
pub fn create_router(app_state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::PUT])
        .allow_headers(Any);

    let api_routes = Router::new()
        .route("/entries", get(io::get_entry_table).post(io::create_entry))
        .route("/entries/pending", get(io::list_pending))
        .route("/entries/surplus", get(io::list_surplus))
        .route("/entries/:id/remaining", put(io::record_remaining));

    Router::new()
        .nest("/api", api_routes)
        .layer(cors)
        .with_state(app_state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StorageBackend;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_initialize_backend_with_csv_storage() {
        let temp_dir = TempDir::new().unwrap();
        let config = AppConfig {
            storage: StorageBackend::Csv {
                data_dir: temp_dir.path().to_path_buf(),
            },
            bind_addr: "127.0.0.1:0".parse().unwrap(),
        };

        let state = initialize_backend(&config).await.unwrap();
        assert!(state.entry_service.list_entries().await.unwrap().is_empty());
        let _router = create_router(state);
    }
}
