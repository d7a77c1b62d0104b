use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use axum::body::to_bytes;
use axum::response::Response;
use serde_json::Value;

use crate::properties::domain::{NewProperty, Property, PropertyDraft, SearchPropertiesResult};
use crate::properties::memory::InMemoryPropertyRepository;
use crate::properties::repository::{PropertyRepository, StorageError};
use crate::properties::service::PropertyService;
use crate::properties::sqlite::SqlitePropertyRepository;

pub(super) fn sale(address: &str, suburb: &str, price: f64) -> NewProperty {
    NewProperty {
        address: address.to_string(),
        suburb: suburb.to_string(),
        state: None,
        postcode: None,
        sale_price: price,
        description: Some(String::new()),
    }
}

pub(super) fn bondi_listing() -> NewProperty {
    NewProperty {
        address: "12 George Street".to_string(),
        suburb: "Bondi".to_string(),
        state: Some("nsw".to_string()),
        postcode: Some("2026".to_string()),
        sale_price: 2_850_000.0,
        description: Some(
            "4 bedroom coastal home within walking distance to <b>Bondi Beach</b>".to_string(),
        ),
    }
}

pub(super) fn memory_service() -> (
    PropertyService<InMemoryPropertyRepository>,
    Arc<InMemoryPropertyRepository>,
) {
    let repository = Arc::new(InMemoryPropertyRepository::new());
    (PropertyService::new(repository.clone()), repository)
}

pub(super) async fn sqlite_service() -> PropertyService<SqlitePropertyRepository> {
    let repository = SqlitePropertyRepository::connect("sqlite::memory:")
        .await
        .expect("in-memory sqlite opens");
    PropertyService::new(Arc::new(repository))
}

/// Delegates to an in-memory store while counting calls that reach storage.
#[derive(Default)]
pub(super) struct RecordingRepository {
    inner: InMemoryPropertyRepository,
    adds: AtomicUsize,
    searches: AtomicUsize,
}

impl RecordingRepository {
    pub(super) fn adds(&self) -> usize {
        self.adds.load(Ordering::SeqCst)
    }

    pub(super) fn searches(&self) -> usize {
        self.searches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PropertyRepository for RecordingRepository {
    async fn add_property(&self, draft: PropertyDraft) -> Result<Property, StorageError> {
        self.adds.fetch_add(1, Ordering::SeqCst);
        self.inner.add_property(draft).await
    }

    async fn search_properties(
        &self,
        suburb: Option<&str>,
        page: u32,
        limit: u32,
    ) -> Result<SearchPropertiesResult, StorageError> {
        self.searches.fetch_add(1, Ordering::SeqCst);
        self.inner.search_properties(suburb, page, limit).await
    }
}

pub(super) struct UnavailableRepository;

#[async_trait]
impl PropertyRepository for UnavailableRepository {
    async fn add_property(&self, _draft: PropertyDraft) -> Result<Property, StorageError> {
        Err(StorageError::Unavailable("database offline".to_string()))
    }

    async fn search_properties(
        &self,
        _suburb: Option<&str>,
        _page: u32,
        _limit: u32,
    ) -> Result<SearchPropertiesResult, StorageError> {
        Err(StorageError::Unavailable("database offline".to_string()))
    }
}

pub(super) async fn json_body(response: Response) -> Value {
    let body = to_bytes(response.into_body(), 1024 * 1024)
        .await
        .expect("body");
    serde_json::from_slice(&body).expect("json payload")
}
