use std::sync::Arc;

use super::domain::{NewProperty, Property, PropertyDraft, SearchPropertiesResult};
use super::repository::{PropertyRepository, StorageError};
use super::sanitize::{normalize_state, normalize_suburb, sanitize_optional, sanitize_text};
use super::validation::{ValidationError, Violations};

pub const DEFAULT_PAGE: u32 = 1;
pub const DEFAULT_LIMIT: u32 = 50;
pub const MAX_LIMIT: u32 = 100;

/// Search parameters as received from a caller; absent values take the defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchQuery {
    pub suburb: Option<String>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

impl SearchQuery {
    pub fn suburb(suburb: impl Into<String>) -> Self {
        Self {
            suburb: Some(suburb.into()),
            ..Self::default()
        }
    }

    pub fn with_page(mut self, page: u32, limit: u32) -> Self {
        self.page = Some(page);
        self.limit = Some(limit);
        self
    }
}

/// Coarse classification surfaced to the HTTP boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    Storage,
    Unknown,
}

/// Error raised by the property service.
#[derive(Debug, thiserror::Error)]
pub enum PropertyServiceError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl PropertyServiceError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            PropertyServiceError::Validation(_) => ErrorKind::Validation,
            PropertyServiceError::Storage(_) => ErrorKind::Storage,
        }
    }
}

/// Applies business rules and normalization in front of a [`PropertyRepository`].
pub struct PropertyService<R: ?Sized> {
    repository: Arc<R>,
}

impl<R> PropertyService<R>
where
    R: PropertyRepository + ?Sized + 'static,
{
    pub fn new(repository: Arc<R>) -> Self {
        Self { repository }
    }

    /// Validate, normalize, and store a new sale record.
    pub async fn add_property(&self, input: NewProperty) -> Result<Property, PropertyServiceError> {
        let draft = prepare_draft(input)?;
        let stored = self.repository.add_property(draft).await?;
        Ok(stored)
    }

    /// Search stored sales, optionally within one suburb, one page at a time.
    pub async fn search_properties(
        &self,
        query: SearchQuery,
    ) -> Result<SearchPropertiesResult, PropertyServiceError> {
        let page = query.page.unwrap_or(DEFAULT_PAGE);
        let limit = query.limit.unwrap_or(DEFAULT_LIMIT);

        if page < 1 {
            return Err(ValidationError::field("page", "page must be greater than 0").into());
        }
        if !(1..=MAX_LIMIT).contains(&limit) {
            return Err(
                ValidationError::field("limit", "limit must be between 1 and 100").into(),
            );
        }

        let suburb = query
            .suburb
            .as_deref()
            .map(normalize_suburb)
            .filter(|suburb| !suburb.is_empty());

        let result = self
            .repository
            .search_properties(suburb.as_deref(), page, limit)
            .await?;
        Ok(result)
    }
}

fn prepare_draft(input: NewProperty) -> Result<PropertyDraft, ValidationError> {
    let address = sanitize_text(&input.address);
    let suburb = normalize_suburb(&input.suburb);
    let price = input.sale_price;

    let mut missing = Violations::default();
    if address.is_empty() {
        missing.push("address", "Address is required");
    }
    if suburb.is_empty() {
        missing.push("suburb", "Suburb is required");
    }
    if price == 0.0 || price.is_nan() {
        missing.push("salePrice", "Sale price is required");
    }
    if !missing.is_empty() {
        return Err(missing.into_error("address, suburb and salePrice required"));
    }

    if !(price.is_finite() && price > 0.0) {
        return Err(ValidationError::field(
            "salePrice",
            "salePrice must be positive",
        ));
    }

    Ok(PropertyDraft {
        address,
        suburb,
        state: sanitize_optional(input.state.as_deref(), normalize_state),
        postcode: sanitize_optional(input.postcode.as_deref(), sanitize_text),
        sale_price: price,
        description: sanitize_optional(input.description.as_deref(), sanitize_text),
    })
}
