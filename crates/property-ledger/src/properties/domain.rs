use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::comparison::{classify, PriceComparison};

/// Opaque identifier assigned to a property when it is stored.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
pub struct PropertyId(pub String);

impl PropertyId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }
}

impl fmt::Display for PropertyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Sale record as supplied by a caller, before sanitization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NewProperty {
    #[schema(min_length = 1, example = "12 George Street")]
    pub address: String,
    #[schema(min_length = 1, example = "Bondi")]
    pub suburb: String,
    #[serde(default)]
    #[schema(example = "NSW")]
    pub state: Option<String>,
    #[serde(default)]
    #[schema(example = "2026")]
    pub postcode: Option<String>,
    #[schema(exclusive_minimum = 0.0, example = 2850000.0)]
    pub sale_price: f64,
    #[serde(default)]
    pub description: Option<String>,
}

/// Sanitized record handed to a repository; the repository assigns id and timestamp.
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyDraft {
    pub address: String,
    pub suburb: String,
    pub state: Option<String>,
    pub postcode: Option<String>,
    pub sale_price: f64,
    pub description: Option<String>,
}

impl PropertyDraft {
    pub fn into_property(self, id: PropertyId, created_at: DateTime<Utc>) -> Property {
        Property {
            id,
            address: self.address,
            suburb: self.suburb,
            state: self.state,
            postcode: self.postcode,
            sale_price: self.sale_price,
            description: self.description,
            created_at,
        }
    }
}

/// Stored property sale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Property {
    pub id: PropertyId,
    pub address: String,
    /// Lowercased suburb name.
    pub suburb: String,
    /// Uppercased state abbreviation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub postcode: Option<String>,
    pub sale_price: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Stored property annotated with its suburb average and price comparison.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PropertyWithComparison {
    #[serde(flatten)]
    pub property: Property,
    pub suburb_avg: f64,
    pub comparison: PriceComparison,
}

impl PropertyWithComparison {
    pub fn new(property: Property, suburb_avg: f64) -> Self {
        let comparison = classify(property.sale_price, suburb_avg);
        Self {
            property,
            suburb_avg,
            comparison,
        }
    }
}

/// One page of search results plus the counts needed to navigate the rest.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchPropertiesResult {
    pub properties: Vec<PropertyWithComparison>,
    pub total: u64,
    pub page: u32,
    pub limit: u32,
    pub total_pages: u64,
}

impl SearchPropertiesResult {
    pub fn new(properties: Vec<PropertyWithComparison>, total: u64, page: u32, limit: u32) -> Self {
        Self {
            properties,
            total,
            page,
            limit,
            total_pages: total_pages(total, limit),
        }
    }
}

/// Running price total for one suburb. Prices are added in insertion order so
/// every store arrives at the same floating-point average.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub(crate) struct SuburbTally {
    sum: f64,
    count: u64,
}

impl SuburbTally {
    pub(crate) fn record(&mut self, price: f64) {
        self.sum += price;
        self.count += 1;
    }

    pub(crate) fn average(&self) -> Option<f64> {
        (self.count > 0).then(|| self.sum / self.count as f64)
    }
}

pub(crate) fn total_pages(total: u64, limit: u32) -> u64 {
    if limit == 0 {
        return 0;
    }
    total.div_ceil(u64::from(limit))
}

/// Zero-based offset of the first record on `page`.
pub(crate) fn page_offset(page: u32, limit: u32) -> u64 {
    u64::from(page.saturating_sub(1)) * u64::from(limit)
}
