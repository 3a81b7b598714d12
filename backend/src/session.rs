//! Anonymous session bootstrap.
//!
//! Every store is built from a [`Session`], so the identity under which
//! entries are written is established once at startup and then passed along
//! explicitly instead of living in global state.

use tracing::info;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    id: String,
}

impl Session {
    /// Start a new anonymous session with a random identity.
    pub fn anonymous() -> Self {
        let session = Self {
            id: format!("anon::{}", Uuid::new_v4()),
        };
        info!("Started anonymous session {}", session.id);
        session
    }

    pub fn id(&self) -> &str {
        &self.id
    }
}
