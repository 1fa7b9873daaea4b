use std::time::Duration;

use async_trait::async_trait;
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::{PgPool, Row};
use uuid::Uuid;

use crate::core::{ListingStore, StoreError};
use crate::models::{Category, Coordinate, FilterSpec, OrderKey, ProductListing};

/// Filter clause shared by the page query and the count query.
///
/// Each optional predicate collapses to TRUE when its parameter is NULL, so
/// one statement covers every `FilterSpec` shape. `$4` is the pre-escaped
/// ILIKE pattern for the search text.
const LISTING_FILTER: &str = r#"
    WHERE ($1::text IS NULL OR c.name = $1)
      AND ($2::float8 IS NULL OR l.price >= $2)
      AND ($3::float8 IS NULL OR l.price <= $3)
      AND ($4::text IS NULL OR l.title ILIKE $4 OR l.description ILIKE $4)
      AND (NOT $5 OR l.in_stock)
"#;

/// PostgreSQL-backed listing store
///
/// Compiles `FilterSpec` into SQL so filtering, ordering and pagination run
/// where the data lives; the engine only sees the returned page. Runs the
/// embedded migrations on startup.
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    /// Create a new store from a connection string
    pub async fn new(
        database_url: &str,
        max_connections: u32,
        min_connections: u32,
    ) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .min_connections(min_connections)
            .acquire_timeout(Duration::from_secs(5))
            .idle_timeout(Duration::from_secs(600))
            .test_before_acquire(true)
            .connect(database_url)
            .await?;

        // Run migrations on startup
        sqlx::migrate!("./migrations").run(&pool).await?;

        Ok(Self { pool })
    }

    /// Create a new store from settings
    pub async fn from_settings(
        url: &str,
        max_connections: Option<u32>,
        min_connections: Option<u32>,
    ) -> Result<Self, StoreError> {
        tracing::info!("Connecting to PostgreSQL");

        Self::new(
            url,
            max_connections.unwrap_or(10),
            min_connections.unwrap_or(1),
        )
        .await
    }

    /// Server-side mean of rating values for a listing
    ///
    /// An unrated listing yields 0, matching `core::rating::average_rating`.
    pub async fn average_rating(&self, listing_id: Uuid) -> Result<f64, StoreError> {
        let row = sqlx::query(
            "SELECT COALESCE(AVG(value), 0)::float8 AS average FROM ratings WHERE listing_id = $1",
        )
        .bind(listing_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.get("average"))
    }
}

#[async_trait]
impl ListingStore for PostgresStore {
    async fn find_listings(
        &self,
        filter: &FilterSpec,
        skip: u64,
        take: u32,
    ) -> Result<(Vec<ProductListing>, u64), StoreError> {
        let search_pattern = filter
            .search_text
            .as_deref()
            .map(|search| format!("%{}%", escape_like(search)));

        let page_query = format!(
            r#"
            SELECT l.id, l.seller_id, l.title, l.description, l.price,
                   l.latitude, l.longitude, l.address, l.in_stock, l.created_at,
                   l.primary_image_url, c.id AS category_id, c.name AS category_name
            FROM listings l
            JOIN categories c ON c.id = l.category_id
            {LISTING_FILTER}
            ORDER BY {}
            LIMIT $6 OFFSET $7
            "#,
            order_clause(filter.order_by)
        );

        let rows = sqlx::query(&page_query)
            .bind(&filter.category)
            .bind(filter.min_price)
            .bind(filter.max_price)
            .bind(&search_pattern)
            .bind(filter.in_stock_only)
            .bind(i64::from(take))
            .bind(skip as i64)
            .fetch_all(&self.pool)
            .await?;

        let listings = rows
            .iter()
            .map(listing_from_row)
            .collect::<Result<Vec<_>, sqlx::Error>>()?;

        let count_query = format!(
            r#"
            SELECT COUNT(*) AS total
            FROM listings l
            JOIN categories c ON c.id = l.category_id
            {LISTING_FILTER}
            "#
        );

        let total: i64 = sqlx::query(&count_query)
            .bind(&filter.category)
            .bind(filter.min_price)
            .bind(filter.max_price)
            .bind(&search_pattern)
            .bind(filter.in_stock_only)
            .fetch_one(&self.pool)
            .await?
            .get("total");

        tracing::debug!(
            "Listing query returned {} of {} rows (skip {}, take {})",
            listings.len(),
            total,
            skip,
            take
        );

        Ok((listings, total as u64))
    }

    async fn get_categories(&self) -> Result<Vec<Category>, StoreError> {
        let rows = sqlx::query("SELECT id, name FROM categories ORDER BY name")
            .fetch_all(&self.pool)
            .await?;

        let categories = rows
            .iter()
            .map(|row| {
                Ok(Category {
                    id: row.try_get("id")?,
                    name: row.try_get("name")?,
                })
            })
            .collect::<Result<Vec<_>, sqlx::Error>>()?;

        Ok(categories)
    }

    async fn health_check(&self) -> Result<bool, StoreError> {
        sqlx::query("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .map(|_| true)
            .map_err(Into::into)
    }
}

/// ORDER BY fragment for each key; id breaks ties so pagination stays stable.
fn order_clause(order: OrderKey) -> &'static str {
    match order {
        OrderKey::PriceAsc => "l.price ASC, l.id ASC",
        OrderKey::PriceDesc => "l.price DESC, l.id ASC",
        OrderKey::DateDesc => "l.created_at DESC, l.id ASC",
        OrderKey::DateAsc => "l.created_at ASC, l.id ASC",
    }
}

/// Escape ILIKE metacharacters so user input matches literally.
fn escape_like(raw: &str) -> String {
    raw.replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

fn listing_from_row(row: &PgRow) -> Result<ProductListing, sqlx::Error> {
    Ok(ProductListing {
        id: row.try_get("id")?,
        seller_id: row.try_get("seller_id")?,
        title: row.try_get("title")?,
        description: row.try_get("description")?,
        price: row.try_get("price")?,
        location: Coordinate::new(row.try_get("latitude")?, row.try_get("longitude")?),
        address: row.try_get("address")?,
        category: Category {
            id: row.try_get("category_id")?,
            name: row.try_get("category_name")?,
        },
        in_stock: row.try_get("in_stock")?,
        created_at: row.try_get("created_at")?,
        primary_image_url: row.try_get("primary_image_url")?,
    })
}
