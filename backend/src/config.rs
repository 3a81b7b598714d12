//! Runtime configuration, read from `FOOD_WASTE_*` environment variables.

use anyhow::{anyhow, Context, Result};
use std::net::SocketAddr;
use std::path::PathBuf;

pub const DEFAULT_DATABASE_URL: &str = "sqlite:food_waste.db";
pub const DEFAULT_DATA_DIR: &str = "food_waste_data";
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:3000";

/// Where entries are persisted
#[derive(Debug, Clone, PartialEq)]
pub enum StorageBackend {
    Sqlite { database_url: String },
    Csv { data_dir: PathBuf },
}

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub storage: StorageBackend,
    pub bind_addr: SocketAddr,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let storage_kind = lookup("FOOD_WASTE_STORAGE").unwrap_or_else(|| "sqlite".to_string());

        let storage = match storage_kind.trim().to_lowercase().as_str() {
            "sqlite" => StorageBackend::Sqlite {
                database_url: lookup("FOOD_WASTE_DATABASE_URL")
                    .unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string()),
            },
            "csv" => StorageBackend::Csv {
                data_dir: lookup("FOOD_WASTE_DATA_DIR")
                    .map(PathBuf::from)
                    .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR)),
            },
            other => {
                return Err(anyhow!(
                    "FOOD_WASTE_STORAGE must be \"sqlite\" or \"csv\", got {:?}",
                    other
                ))
            }
        };

        let bind_addr = lookup("FOOD_WASTE_BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let bind_addr = bind_addr
            .parse::<SocketAddr>()
            .with_context(|| format!("FOOD_WASTE_BIND_ADDR is not a socket address: {}", bind_addr))?;

        Ok(Self { storage, bind_addr })
    }
}
