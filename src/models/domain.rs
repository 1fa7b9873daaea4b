use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Geographic coordinate in degrees
///
/// Plain value type with no identity. Range validation happens at the request
/// boundary; the distance math accepts any real input.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// True when both components are inside the WGS84 ranges.
    pub fn in_range(&self) -> bool {
        (-90.0..=90.0).contains(&self.latitude) && (-180.0..=180.0).contains(&self.longitude)
    }
}

/// Product category
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: Uuid,
    pub name: String,
}

/// A geolocated, priced product listing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductListing {
    pub id: Uuid,
    #[serde(rename = "sellerId")]
    pub seller_id: Uuid,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub price: f64,
    #[serde(flatten)]
    pub location: Coordinate,
    pub address: String,
    pub category: Category,
    #[serde(rename = "inStock", default = "default_true")]
    pub in_stock: bool,
    #[serde(rename = "createdAt")]
    pub created_at: chrono::DateTime<chrono::Utc>,
    #[serde(rename = "primaryImageUrl", default)]
    pub primary_image_url: Option<String>,
}

fn default_true() -> bool {
    true
}

/// Ordering applied before pagination
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderKey {
    PriceAsc,
    PriceDesc,
    #[default]
    DateDesc,
    DateAsc,
}

impl OrderKey {
    /// Lenient parse: unrecognized keys fall back to the default ordering
    /// instead of erroring.
    pub fn parse(raw: &str) -> Self {
        match raw {
            "price_asc" => OrderKey::PriceAsc,
            "price_desc" => OrderKey::PriceDesc,
            "date_desc" => OrderKey::DateDesc,
            "date_asc" => OrderKey::DateAsc,
            _ => OrderKey::default(),
        }
    }
}

/// Validated, request-scoped query parameters
///
/// Absent optional fields mean "no constraint"; supplying none of them is the
/// unfiltered landing view. Never persisted.
#[derive(Debug, Clone)]
pub struct FilterSpec {
    pub category: Option<String>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    pub search_text: Option<String>,
    pub in_stock_only: bool,
    pub order_by: OrderKey,
    pub page: u32,
    pub page_size: u32,
}

impl Default for FilterSpec {
    fn default() -> Self {
        Self {
            category: None,
            min_price: None,
            max_price: None,
            search_text: None,
            in_stock_only: false,
            order_by: OrderKey::default(),
            page: 1,
            page_size: 20,
        }
    }
}

/// Listing annotated with distance from the viewer
///
/// `distance_km` is present only when a viewer coordinate was known for the
/// request; it is omitted, never zeroed, otherwise.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListingWithDistance {
    #[serde(flatten)]
    pub listing: ProductListing,
    #[serde(rename = "distanceKm", skip_serializing_if = "Option::is_none")]
    pub distance_km: Option<f64>,
}

/// A single rating left on a listing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Rating {
    #[serde(rename = "listingId")]
    pub listing_id: Uuid,
    pub value: f64,
}
