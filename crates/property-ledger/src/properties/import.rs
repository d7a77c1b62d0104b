use std::io::Read;
use std::path::Path;

use serde::{Deserialize, Deserializer};

use super::domain::NewProperty;
use super::repository::{PropertyRepository, StorageError};
use super::service::{PropertyService, PropertyServiceError};
use super::validation::ValidationError;

#[derive(Debug, thiserror::Error)]
pub enum SalesImportError {
    #[error("failed to read sales export: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid sales CSV data: {0}")]
    Csv(#[from] csv::Error),
}

/// One parsed CSV row and the line it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct ImportedSale {
    pub line: u64,
    pub property: NewProperty,
}

/// Outcome of feeding imported rows through the service.
#[derive(Debug, Default)]
pub struct ImportSummary {
    pub inserted: usize,
    pub rejected: Vec<(u64, ValidationError)>,
}

/// Reads sale records from CSV exports with an
/// `address,suburb,state,postcode,sale_price,description` header.
pub struct SalesCsvImporter;

impl SalesCsvImporter {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Vec<ImportedSale>, SalesImportError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Vec<ImportedSale>, SalesImportError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(reader);
        let headers = csv_reader.headers()?.clone();
        let mut sales = Vec::new();

        for record in csv_reader.records() {
            let record = record?;
            let line = record.position().map(|position| position.line()).unwrap_or_default();
            let row: SaleRow = record.deserialize(Some(&headers))?;

            sales.push(ImportedSale {
                line,
                property: row.into(),
            });
        }

        Ok(sales)
    }

    /// Adds every sale through `service`. Rows failing validation are skipped and
    /// reported; a storage failure aborts the import.
    pub async fn load_into<R>(
        service: &PropertyService<R>,
        sales: Vec<ImportedSale>,
    ) -> Result<ImportSummary, StorageError>
    where
        R: PropertyRepository + ?Sized + 'static,
    {
        let mut summary = ImportSummary::default();

        for sale in sales {
            match service.add_property(sale.property).await {
                Ok(_) => summary.inserted += 1,
                Err(PropertyServiceError::Validation(err)) => summary.rejected.push((sale.line, err)),
                Err(PropertyServiceError::Storage(err)) => return Err(err),
            }
        }

        Ok(summary)
    }
}

#[derive(Debug, Deserialize)]
struct SaleRow {
    address: String,
    suburb: String,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    state: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    postcode: Option<String>,
    #[serde(default, deserialize_with = "lenient_price")]
    sale_price: f64,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    description: Option<String>,
}

impl From<SaleRow> for NewProperty {
    fn from(row: SaleRow) -> Self {
        NewProperty {
            address: row.address,
            suburb: row.suburb,
            state: row.state,
            postcode: row.postcode,
            sale_price: row.sale_price,
            description: row.description,
        }
    }
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.filter(|value| !value.trim().is_empty()))
}

/// Accepts `1,250,000`-style and `$`-prefixed prices; unparseable values become 0
/// so the service rejects the row instead of the whole file.
fn lenient_price<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?.unwrap_or_default();
    let cleaned: String = raw
        .chars()
        .filter(|ch| !matches!(ch, '$' | ',' | ' '))
        .collect();
    Ok(cleaned.parse::<f64>().unwrap_or(0.0))
}
