use std::collections::{BTreeSet, HashMap};
use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use sqlx::{QueryBuilder, Sqlite};

use super::domain::{
    page_offset, Property, PropertyDraft, PropertyId, PropertyWithComparison,
    SearchPropertiesResult, SuburbTally,
};
use super::repository::{PropertyRepository, StorageError};

const CREATE_TABLE: &str = "CREATE TABLE IF NOT EXISTS properties (
    id TEXT PRIMARY KEY NOT NULL,
    address TEXT NOT NULL,
    suburb TEXT NOT NULL,
    state TEXT,
    postcode TEXT,
    sale_price REAL NOT NULL,
    description TEXT,
    created_at TEXT NOT NULL
)";

const CREATE_SUBURB_INDEX: &str =
    "CREATE INDEX IF NOT EXISTS idx_properties_suburb ON properties (suburb)";

const SELECT_COLUMNS: &str =
    "SELECT id, address, suburb, state, postcode, sale_price, description, created_at FROM properties";

/// SQLite-backed store. Pages are returned in `rowid` (insertion) order.
#[derive(Debug, Clone)]
pub struct SqlitePropertyRepository {
    pool: SqlitePool,
}

#[derive(Debug, sqlx::FromRow)]
struct PropertyRow {
    id: String,
    address: String,
    suburb: String,
    state: Option<String>,
    postcode: Option<String>,
    sale_price: f64,
    description: Option<String>,
    created_at: DateTime<Utc>,
}

impl From<PropertyRow> for Property {
    fn from(row: PropertyRow) -> Self {
        Property {
            id: PropertyId(row.id),
            address: row.address,
            suburb: row.suburb,
            state: row.state,
            postcode: row.postcode,
            sale_price: row.sale_price,
            description: row.description,
            created_at: row.created_at,
        }
    }
}

impl SqlitePropertyRepository {
    /// Opens (creating if needed) the database at `url` and prepares the schema.
    pub async fn connect(url: &str) -> Result<Self, StorageError> {
        let options = SqliteConnectOptions::from_str(url)
            .map_err(StorageError::Connect)?
            .create_if_missing(true);

        // Every connection to `:memory:` is a separate database.
        let in_memory = url.contains(":memory:") || url.contains("mode=memory");
        let pool_options = if in_memory {
            SqlitePoolOptions::new()
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            SqlitePoolOptions::new().max_connections(5)
        };

        let pool = pool_options
            .connect_with(options)
            .await
            .map_err(StorageError::Connect)?;

        let repository = Self { pool };
        repository.migrate().await?;
        Ok(repository)
    }

    async fn migrate(&self) -> Result<(), StorageError> {
        sqlx::query(CREATE_TABLE)
            .execute(&self.pool)
            .await
            .map_err(StorageError::Migrate)?;
        sqlx::query(CREATE_SUBURB_INDEX)
            .execute(&self.pool)
            .await
            .map_err(StorageError::Migrate)?;
        Ok(())
    }

    async fn suburb_averages(
        &self,
        suburbs: &BTreeSet<&str>,
    ) -> Result<HashMap<String, f64>, StorageError> {
        if suburbs.is_empty() {
            return Ok(HashMap::new());
        }

        let mut builder: QueryBuilder<Sqlite> =
            QueryBuilder::new("SELECT suburb, sale_price FROM properties WHERE suburb IN (");
        let mut separated = builder.separated(", ");
        for suburb in suburbs {
            separated.push_bind(suburb.to_string());
        }
        separated.push_unseparated(") ORDER BY rowid");

        let rows: Vec<(String, f64)> = builder
            .build_query_as()
            .fetch_all(&self.pool)
            .await
            .map_err(StorageError::Averages)?;

        let mut tallies: HashMap<String, SuburbTally> = HashMap::new();
        for (suburb, price) in rows {
            tallies.entry(suburb).or_default().record(price);
        }

        Ok(tallies
            .into_iter()
            .filter_map(|(suburb, tally)| tally.average().map(|avg| (suburb, avg)))
            .collect())
    }
}

#[async_trait]
impl PropertyRepository for SqlitePropertyRepository {
    async fn add_property(&self, draft: PropertyDraft) -> Result<Property, StorageError> {
        let property = draft.into_property(PropertyId::generate(), Utc::now());

        sqlx::query(
            "INSERT INTO properties (id, address, suburb, state, postcode, sale_price, description, created_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&property.id.0)
        .bind(&property.address)
        .bind(&property.suburb)
        .bind(&property.state)
        .bind(&property.postcode)
        .bind(property.sale_price)
        .bind(&property.description)
        .bind(property.created_at)
        .execute(&self.pool)
        .await
        .map_err(StorageError::Insert)?;

        Ok(property)
    }

    async fn search_properties(
        &self,
        suburb: Option<&str>,
        page: u32,
        limit: u32,
    ) -> Result<SearchPropertiesResult, StorageError> {
        let mut count: QueryBuilder<Sqlite> = QueryBuilder::new("SELECT COUNT(*) FROM properties");
        if let Some(filter) = suburb {
            count.push(" WHERE suburb = ").push_bind(filter.to_string());
        }
        let total: i64 = count
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await
            .map_err(StorageError::Search)?;
        let total = u64::try_from(total).unwrap_or_default();

        let offset = i64::try_from(page_offset(page, limit)).unwrap_or(i64::MAX);
        let mut select: QueryBuilder<Sqlite> = QueryBuilder::new(SELECT_COLUMNS);
        if let Some(filter) = suburb {
            select.push(" WHERE suburb = ").push_bind(filter.to_string());
        }
        select
            .push(" ORDER BY rowid LIMIT ")
            .push_bind(i64::from(limit))
            .push(" OFFSET ")
            .push_bind(offset);

        let rows: Vec<PropertyRow> = select
            .build_query_as()
            .fetch_all(&self.pool)
            .await
            .map_err(StorageError::Search)?;
        let page_records: Vec<Property> = rows.into_iter().map(Property::from).collect();

        let suburbs: BTreeSet<&str> = page_records
            .iter()
            .map(|property| property.suburb.as_str())
            .collect();
        let averages = self.suburb_averages(&suburbs).await?;

        let properties = page_records
            .into_iter()
            .map(|property| {
                let suburb_avg = averages
                    .get(&property.suburb)
                    .copied()
                    .unwrap_or(property.sale_price);
                PropertyWithComparison::new(property, suburb_avg)
            })
            .collect();

        Ok(SearchPropertiesResult::new(properties, total, page, limit))
    }
}
