use async_trait::async_trait;

use super::domain::{Property, PropertyDraft, SearchPropertiesResult};

/// Storage abstraction shared by the in-memory and SQLite stores.
///
/// Implementations own id/timestamp assignment, suburb averages, and page
/// slicing. The `suburb` filter passed to [`search_properties`] is already
/// normalized; averages always cover every stored record of a suburb, not just
/// the requested page.
///
/// [`search_properties`]: PropertyRepository::search_properties
#[async_trait]
pub trait PropertyRepository: Send + Sync {
    async fn add_property(&self, draft: PropertyDraft) -> Result<Property, StorageError>;

    async fn search_properties(
        &self,
        suburb: Option<&str>,
        page: u32,
        limit: u32,
    ) -> Result<SearchPropertiesResult, StorageError>;
}

/// Failure of the backing storage medium.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("storage unavailable: {0}")]
    Unavailable(String),
    #[error("failed to connect to property store")]
    Connect(#[source] sqlx::Error),
    #[error("failed to prepare property store schema")]
    Migrate(#[source] sqlx::Error),
    #[error("failed to insert property")]
    Insert(#[source] sqlx::Error),
    #[error("failed to search properties")]
    Search(#[source] sqlx::Error),
    #[error("failed to calculate suburb averages")]
    Averages(#[source] sqlx::Error),
}
