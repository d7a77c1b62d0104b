use metrics_exporter_prometheus::PrometheusHandle;
use property_ledger::config::StorageConfig;
use property_ledger::error::AppError;
use property_ledger::properties::{
    InMemoryPropertyRepository, PropertyRepository, PropertyService, SqlitePropertyRepository,
};
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

pub(crate) type SharedPropertyService = PropertyService<dyn PropertyRepository>;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Opens the store selected by `PROPERTY_STORE`.
pub(crate) async fn open_repository(
    storage: &StorageConfig,
) -> Result<Arc<dyn PropertyRepository>, AppError> {
    let repository: Arc<dyn PropertyRepository> = match storage {
        StorageConfig::Memory => Arc::new(InMemoryPropertyRepository::new()),
        StorageConfig::Sqlite { url } => Arc::new(SqlitePropertyRepository::connect(url).await?),
    };
    Ok(repository)
}

pub(crate) async fn property_service(
    storage: &StorageConfig,
) -> Result<Arc<SharedPropertyService>, AppError> {
    let repository = open_repository(storage).await?;
    Ok(Arc::new(PropertyService::new(repository)))
}
