use serde::{Deserialize, Serialize};

use crate::models::domain::{Category, ListingWithDistance};

/// Response for the listings endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListingsResponse {
    pub items: Vec<ListingWithDistance>,
    #[serde(rename = "totalCount")]
    pub total_count: u64,
    pub page: u32,
    #[serde(rename = "pageSize")]
    pub page_size: u32,
    #[serde(rename = "totalPages")]
    pub total_pages: u32,
}

/// Response for the categories endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoriesResponse {
    pub categories: Vec<Category>,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

/// Error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub status_code: u16,
}
