use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::{Coordinate, FilterSpec, OrderKey};

/// Query parameters accepted by the listings endpoint
///
/// Everything is optional; the boundary parses and validates before a
/// `FilterSpec` is built. Coordinate ranges are enforced here, not in the
/// distance math.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ListListingsQuery {
    #[serde(default)]
    pub category: Option<String>,
    #[validate(range(min = 0.0))]
    #[serde(alias = "min_price", rename = "minPrice", default)]
    pub min_price: Option<f64>,
    #[validate(range(min = 0.0))]
    #[serde(alias = "max_price", rename = "maxPrice", default)]
    pub max_price: Option<f64>,
    #[serde(default)]
    pub search: Option<String>,
    #[serde(alias = "in_stock", rename = "inStock", default)]
    pub in_stock: bool,
    #[serde(alias = "order_by", rename = "orderBy", default)]
    pub order_by: Option<String>,
    #[serde(default = "default_page")]
    pub page: u32,
    #[serde(alias = "page_size", rename = "pageSize", default = "default_page_size")]
    pub page_size: u32,
    #[validate(range(min = -90.0, max = 90.0))]
    #[serde(default)]
    pub latitude: Option<f64>,
    #[validate(range(min = -180.0, max = 180.0))]
    #[serde(default)]
    pub longitude: Option<f64>,
}

fn default_page() -> u32 {
    1
}

fn default_page_size() -> u32 {
    20
}

impl ListListingsQuery {
    /// Viewer position, present only when both components were supplied.
    pub fn viewer(&self) -> Option<Coordinate> {
        match (self.latitude, self.longitude) {
            (Some(latitude), Some(longitude)) => Some(Coordinate::new(latitude, longitude)),
            _ => None,
        }
    }

    pub fn to_filter(&self) -> FilterSpec {
        FilterSpec {
            category: self.category.clone(),
            min_price: self.min_price,
            max_price: self.max_price,
            search_text: self.search.clone(),
            in_stock_only: self.in_stock,
            order_by: self
                .order_by
                .as_deref()
                .map(OrderKey::parse)
                .unwrap_or_default(),
            page: self.page,
            page_size: self.page_size,
        }
    }
}
