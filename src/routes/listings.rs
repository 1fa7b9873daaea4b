use std::sync::Arc;

use actix_web::{web, HttpRequest, HttpResponse, Responder};
use validator::Validate;

use crate::core::{ListingStore, QueryEngine, QueryError};
use crate::models::{
    CategoriesResponse, Category, Coordinate, ErrorResponse, HealthResponse, ListListingsQuery,
    ListingsResponse,
};
use crate::services::{CacheKey, GeoIpClient, LocalCache};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub engine: QueryEngine,
    pub store: Arc<dyn ListingStore>,
    pub cache: Arc<LocalCache>,
    pub geoip: Option<Arc<GeoIpClient>>,
    pub default_location: Option<Coordinate>,
}

/// Configure all listing-related routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health_check))
        .route("/listings", web::get().to(list_listings))
        .route("/categories", web::get().to(get_categories));
}

/// Health check endpoint
async fn health_check(state: web::Data<AppState>) -> impl Responder {
    let store_healthy = state.store.health_check().await.unwrap_or(false);

    let status = if store_healthy { "healthy" } else { "degraded" };

    HttpResponse::Ok().json(HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now(),
    })
}

/// Listing search endpoint
///
/// GET /api/v1/listings?category=...&minPrice=...&maxPrice=...&search=...
///     &inStock=true&orderBy=price_asc&page=1&pageSize=20
///     &latitude=...&longitude=...
async fn list_listings(
    state: web::Data<AppState>,
    query: web::Query<ListListingsQuery>,
    http_req: HttpRequest,
) -> impl Responder {
    // Validate request
    if let Err(errors) = query.validate() {
        tracing::info!("Validation failed for listings query: {:?}", errors);
        return HttpResponse::BadRequest().json(ErrorResponse {
            error: "Validation failed".to_string(),
            message: errors.to_string(),
            status_code: 400,
        });
    }

    let filter = query.to_filter();
    let viewer = resolve_viewer(&state, &query, &http_req).await;

    tracing::debug!(
        "Listing query: page {}, pageSize {}, viewer known: {}",
        filter.page,
        filter.page_size,
        viewer.is_some()
    );

    match state.engine.list_listings(&filter, viewer).await {
        Ok(page) => {
            tracing::info!(
                "Returning {} of {} listings (page {}/{})",
                page.items.len(),
                page.total_count,
                page.page,
                page.total_pages
            );

            HttpResponse::Ok().json(ListingsResponse {
                items: page.items,
                total_count: page.total_count,
                page: page.page,
                page_size: page.page_size,
                total_pages: page.total_pages,
            })
        }
        Err(QueryError::Validation(message)) => HttpResponse::BadRequest().json(ErrorResponse {
            error: "Invalid query".to_string(),
            message,
            status_code: 400,
        }),
        Err(QueryError::Store(e)) => {
            tracing::error!("Listing query failed: {}", e);
            HttpResponse::InternalServerError().json(ErrorResponse {
                error: "Failed to query listings".to_string(),
                message: e.to_string(),
                status_code: 500,
            })
        }
    }
}

/// Category list endpoint, served through the in-process cache
async fn get_categories(state: web::Data<AppState>) -> impl Responder {
    let cache_key = CacheKey::categories();

    if let Ok(categories) = state.cache.get::<Vec<Category>>(&cache_key).await {
        return HttpResponse::Ok().json(CategoriesResponse { categories });
    }

    match state.store.get_categories().await {
        Ok(categories) => {
            if let Err(e) = state.cache.set(&cache_key, &categories).await {
                tracing::warn!("Failed to cache categories: {}", e);
            }

            HttpResponse::Ok().json(CategoriesResponse { categories })
        }
        Err(e) => {
            tracing::error!("Failed to fetch categories: {}", e);
            HttpResponse::InternalServerError().json(ErrorResponse {
                error: "Failed to fetch categories".to_string(),
                message: e.to_string(),
                status_code: 500,
            })
        }
    }
}

/// Resolve the viewer position for distance annotation
///
/// Explicit coordinates win, then a GeoIP lookup of the client address, then
/// the configured default. Lookup failures degrade to the next source rather
/// than failing the request.
async fn resolve_viewer(
    state: &AppState,
    query: &ListListingsQuery,
    req: &HttpRequest,
) -> Option<Coordinate> {
    if let Some(coordinate) = query.viewer() {
        return Some(coordinate);
    }

    if let Some(geoip) = &state.geoip {
        if let Some(addr) = req.peer_addr() {
            match geoip.locate(&addr.ip().to_string()).await {
                Ok(coordinate) if coordinate.in_range() => return Some(coordinate),
                Ok(coordinate) => tracing::warn!(
                    "GeoIP returned out-of-range coordinate ({}, {}), falling back",
                    coordinate.latitude,
                    coordinate.longitude
                ),
                Err(e) => tracing::warn!("GeoIP lookup failed, falling back: {}", e),
            }
        }
    }

    state.default_location
}
