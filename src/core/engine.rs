use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use crate::core::distance::haversine_km;
use crate::models::{Category, Coordinate, FilterSpec, ListingWithDistance, ProductListing};

/// Largest page a caller may request
pub const MAX_PAGE_SIZE: u32 = 100;

/// Errors surfaced by persistence adapters
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("migration error: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),

    #[error("not found: {0}")]
    NotFound(String),
}

/// Persistence collaborator for the query engine
///
/// `find_listings` applies the filter and ordering, then returns one page of
/// listings together with the filtered count before pagination.
#[async_trait]
pub trait ListingStore: Send + Sync {
    async fn find_listings(
        &self,
        filter: &FilterSpec,
        skip: u64,
        take: u32,
    ) -> Result<(Vec<ProductListing>, u64), StoreError>;

    async fn get_categories(&self) -> Result<Vec<Category>, StoreError>;

    async fn health_check(&self) -> Result<bool, StoreError>;
}

/// Errors produced by the query engine
#[derive(Debug, Error)]
pub enum QueryError {
    /// Malformed filter. Reported immediately; never retried, never
    /// partially applied.
    #[error("invalid query: {0}")]
    Validation(String),

    /// Persistence failure, propagated unchanged.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// One page of query results
#[derive(Debug, Clone)]
pub struct QueryPage {
    pub items: Vec<ListingWithDistance>,
    pub total_count: u64,
    pub page: u32,
    pub page_size: u32,
    pub total_pages: u32,
}

/// Listing query orchestrator
///
/// # Pipeline
/// 1. Validate pagination (strict: invalid page bounds error, never clamp)
/// 2. Delegate filter/order/page to the store
/// 3. Annotate the returned page with viewer distance
///
/// Stateless apart from the injected store; safe to share across workers.
#[derive(Clone)]
pub struct QueryEngine {
    store: Arc<dyn ListingStore>,
}

impl QueryEngine {
    pub fn new(store: Arc<dyn ListingStore>) -> Self {
        Self { store }
    }

    /// Run the full filter/order/paginate/annotate pipeline.
    pub async fn list_listings(
        &self,
        filter: &FilterSpec,
        viewer: Option<Coordinate>,
    ) -> Result<QueryPage, QueryError> {
        validate_pagination(filter)?;

        let skip = u64::from(filter.page - 1) * u64::from(filter.page_size);
        let (listings, total_count) = self
            .store
            .find_listings(filter, skip, filter.page_size)
            .await?;

        let total_pages = total_count.div_ceil(u64::from(filter.page_size)) as u32;

        // Distance is computed over the returned page only, never the full
        // filtered set, and only when the viewer position is known.
        let items = listings
            .into_iter()
            .map(|listing| {
                let distance_km = viewer.map(|v| haversine_km(v, listing.location));
                ListingWithDistance {
                    listing,
                    distance_km,
                }
            })
            .collect();

        Ok(QueryPage {
            items,
            total_count,
            page: filter.page,
            page_size: filter.page_size,
            total_pages,
        })
    }
}

fn validate_pagination(filter: &FilterSpec) -> Result<(), QueryError> {
    if filter.page < 1 {
        return Err(QueryError::Validation(format!(
            "page must be >= 1, got {}",
            filter.page
        )));
    }
    if filter.page_size < 1 || filter.page_size > MAX_PAGE_SIZE {
        return Err(QueryError::Validation(format!(
            "pageSize must be between 1 and {}, got {}",
            MAX_PAGE_SIZE, filter.page_size
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::InMemoryStore;

    fn engine_with_empty_store() -> QueryEngine {
        QueryEngine::new(Arc::new(InMemoryStore::default()))
    }

    #[tokio::test]
    async fn test_page_zero_rejected() {
        let engine = engine_with_empty_store();
        let filter = FilterSpec {
            page: 0,
            ..FilterSpec::default()
        };

        let result = engine.list_listings(&filter, None).await;
        assert!(matches!(result, Err(QueryError::Validation(_))));
    }

    #[tokio::test]
    async fn test_page_size_zero_rejected() {
        let engine = engine_with_empty_store();
        let filter = FilterSpec {
            page_size: 0,
            ..FilterSpec::default()
        };

        let result = engine.list_listings(&filter, None).await;
        assert!(matches!(result, Err(QueryError::Validation(_))));
    }

    #[tokio::test]
    async fn test_page_size_above_cap_rejected_not_clamped() {
        let engine = engine_with_empty_store();
        let filter = FilterSpec {
            page_size: MAX_PAGE_SIZE + 1,
            ..FilterSpec::default()
        };

        let result = engine.list_listings(&filter, None).await;
        assert!(matches!(result, Err(QueryError::Validation(_))));
    }

    #[tokio::test]
    async fn test_empty_result_is_success() {
        let engine = engine_with_empty_store();

        let page = engine
            .list_listings(&FilterSpec::default(), None)
            .await
            .unwrap();

        assert_eq!(page.total_count, 0);
        assert_eq!(page.total_pages, 0);
        assert!(page.items.is_empty());
    }
}
