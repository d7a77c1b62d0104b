//! Property sale ledger: normalization, storage, suburb-average comparison, and paginated search.

pub mod comparison;
pub mod domain;
pub mod import;
pub mod memory;
pub mod payload;
pub mod repository;
pub mod router;
pub mod sanitize;
pub mod service;
pub mod sqlite;
pub mod validation;

#[cfg(test)]
mod tests;

pub use comparison::{classify, PriceComparison, PRICE_TOLERANCE};
pub use domain::{
    NewProperty, Property, PropertyDraft, PropertyId, PropertyWithComparison,
    SearchPropertiesResult,
};
pub use import::{ImportSummary, ImportedSale, SalesCsvImporter, SalesImportError};
pub use memory::InMemoryPropertyRepository;
pub use repository::{PropertyRepository, StorageError};
pub use router::{
    property_router, ApiError, ApiFailure, ErrorResponse, Pagination, PropertySearchResponse,
};
pub use service::{ErrorKind, PropertyService, PropertyServiceError, SearchQuery};
pub use sqlite::SqlitePropertyRepository;
pub use validation::{FieldViolation, ValidationError};
