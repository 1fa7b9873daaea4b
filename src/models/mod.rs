// Model exports
pub mod domain;
pub mod requests;
pub mod responses;

pub use domain::{
    Category, Coordinate, FilterSpec, ListingWithDistance, OrderKey, ProductListing, Rating,
};
pub use requests::ListListingsQuery;
pub use responses::{CategoriesResponse, ErrorResponse, HealthResponse, ListingsResponse};
