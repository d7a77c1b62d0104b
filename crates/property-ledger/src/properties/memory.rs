use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use chrono::Utc;

use super::domain::{
    page_offset, Property, PropertyDraft, PropertyId, PropertyWithComparison,
    SearchPropertiesResult, SuburbTally,
};
use super::repository::{PropertyRepository, StorageError};

#[derive(Debug, Default)]
struct MemoryState {
    records: Vec<Property>,
    tallies: HashMap<String, SuburbTally>,
}

/// Process-local store keeping records in insertion order.
#[derive(Debug, Default, Clone)]
pub struct InMemoryPropertyRepository {
    state: Arc<RwLock<MemoryState>>,
}

impl InMemoryPropertyRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.state
            .read()
            .map(|state| state.records.len())
            .unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn poisoned() -> StorageError {
    StorageError::Unavailable("in-memory property store lock poisoned".to_string())
}

#[async_trait]
impl PropertyRepository for InMemoryPropertyRepository {
    async fn add_property(&self, draft: PropertyDraft) -> Result<Property, StorageError> {
        let property = draft.into_property(PropertyId::generate(), Utc::now());

        let mut state = self.state.write().map_err(|_| poisoned())?;
        state
            .tallies
            .entry(property.suburb.clone())
            .or_default()
            .record(property.sale_price);
        state.records.push(property.clone());

        Ok(property)
    }

    async fn search_properties(
        &self,
        suburb: Option<&str>,
        page: u32,
        limit: u32,
    ) -> Result<SearchPropertiesResult, StorageError> {
        let state = self.state.read().map_err(|_| poisoned())?;

        let candidates: Vec<&Property> = state
            .records
            .iter()
            .filter(|property| suburb.map_or(true, |filter| property.suburb == filter))
            .collect();
        let total = candidates.len() as u64;

        let offset = usize::try_from(page_offset(page, limit)).unwrap_or(usize::MAX);
        let properties = candidates
            .into_iter()
            .skip(offset)
            .take(limit as usize)
            .map(|property| {
                let suburb_avg = state
                    .tallies
                    .get(&property.suburb)
                    .and_then(SuburbTally::average)
                    .unwrap_or(property.sale_price);
                PropertyWithComparison::new(property.clone(), suburb_avg)
            })
            .collect();

        Ok(SearchPropertiesResult::new(properties, total, page, limit))
    }
}
