//! Souq Query - Geospatial listing query service for the Souq marketplace
//!
//! This library provides the listing search core behind the Souq map and
//! sidebar views: haversine distance annotation and the
//! filter/order/paginate pipeline over geolocated product listings.

pub mod config;
pub mod core;
pub mod models;
pub mod routes;
pub mod services;

// Re-export commonly used types
pub use crate::core::{haversine_km, QueryEngine, QueryError, QueryPage};
pub use crate::models::{
    Category, Coordinate, FilterSpec, ListingWithDistance, OrderKey, ProductListing,
};
