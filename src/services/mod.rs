// Service exports
pub mod cache;
pub mod geoip;
pub mod memory;
pub mod postgres;

pub use cache::{CacheError, CacheKey, LocalCache};
pub use geoip::{GeoIpClient, GeoIpError};
pub use memory::InMemoryStore;
pub use postgres::PostgresStore;
