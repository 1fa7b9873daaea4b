use async_trait::async_trait;

use crate::core::filters::{compare_listings, matches_filter};
use crate::core::{ListingStore, StoreError};
use crate::models::{Category, FilterSpec, ProductListing};

/// In-memory listing store
///
/// Applies the same pure predicates the SQL adapter compiles into a query,
/// over an owned collection. Backs the engine's unit and integration tests so
/// the pipeline can be exercised without a database.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    listings: Vec<ProductListing>,
    categories: Vec<Category>,
}

impl InMemoryStore {
    pub fn new(listings: Vec<ProductListing>, categories: Vec<Category>) -> Self {
        Self {
            listings,
            categories,
        }
    }
}

#[async_trait]
impl ListingStore for InMemoryStore {
    async fn find_listings(
        &self,
        filter: &FilterSpec,
        skip: u64,
        take: u32,
    ) -> Result<(Vec<ProductListing>, u64), StoreError> {
        let mut matched: Vec<ProductListing> = self
            .listings
            .iter()
            .filter(|listing| matches_filter(listing, filter))
            .cloned()
            .collect();

        matched.sort_by(|a, b| compare_listings(filter.order_by, a, b));

        let total_count = matched.len() as u64;
        let page = matched
            .into_iter()
            .skip(skip as usize)
            .take(take as usize)
            .collect();

        Ok((page, total_count))
    }

    async fn get_categories(&self) -> Result<Vec<Category>, StoreError> {
        Ok(self.categories.clone())
    }

    async fn health_check(&self) -> Result<bool, StoreError> {
        Ok(true)
    }
}
