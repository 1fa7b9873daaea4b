use std::cmp::Ordering;

use crate::models::{FilterSpec, OrderKey, ProductListing};

/// Check whether a listing passes every predicate supplied in the filter
///
/// Absent optional fields are no-ops, so an empty filter is the "all
/// listings" branch. Shared by the in-memory store and the engine tests; the
/// SQL adapter compiles the same semantics into its WHERE clause.
#[inline]
pub fn matches_filter(listing: &ProductListing, filter: &FilterSpec) -> bool {
    // Category name match is exact and case-sensitive
    if let Some(category) = &filter.category {
        if listing.category.name != *category {
            return false;
        }
    }

    if let Some(min_price) = filter.min_price {
        if listing.price < min_price {
            return false;
        }
    }

    if let Some(max_price) = filter.max_price {
        if listing.price > max_price {
            return false;
        }
    }

    // Search is a case-insensitive substring match on title OR description
    if let Some(search) = &filter.search_text {
        let needle = search.to_lowercase();
        let in_title = listing.title.to_lowercase().contains(&needle);
        let in_description = listing.description.to_lowercase().contains(&needle);
        if !in_title && !in_description {
            return false;
        }
    }

    if filter.in_stock_only && !listing.in_stock {
        return false;
    }

    true
}

/// Total order over listings for the given key
///
/// Ties fall through to ascending id so pagination stays stable across
/// requests.
#[inline]
pub fn compare_listings(order: OrderKey, a: &ProductListing, b: &ProductListing) -> Ordering {
    let primary = match order {
        OrderKey::PriceAsc => a.price.total_cmp(&b.price),
        OrderKey::PriceDesc => b.price.total_cmp(&a.price),
        OrderKey::DateDesc => b.created_at.cmp(&a.created_at),
        OrderKey::DateAsc => a.created_at.cmp(&b.created_at),
    };
    primary.then_with(|| a.id.cmp(&b.id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Category, Coordinate};
    use chrono::{Duration, TimeZone, Utc};
    use uuid::Uuid;

    fn test_listing(title: &str, description: &str, price: f64, in_stock: bool) -> ProductListing {
        ProductListing {
            id: Uuid::new_v4(),
            seller_id: Uuid::new_v4(),
            title: title.to_string(),
            description: description.to_string(),
            price,
            location: Coordinate::new(29.05, 31.12),
            address: "12 Market St".to_string(),
            category: Category {
                id: Uuid::new_v4(),
                name: "Electronics".to_string(),
            },
            in_stock,
            created_at: Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap(),
            primary_image_url: None,
        }
    }

    #[test]
    fn test_empty_filter_passes_everything() {
        let listing = test_listing("Bluetooth speaker", "Loud", 49.99, false);
        assert!(matches_filter(&listing, &FilterSpec::default()));
    }

    #[test]
    fn test_category_match_is_case_sensitive() {
        let listing = test_listing("Bluetooth speaker", "Loud", 49.99, true);

        let filter = FilterSpec {
            category: Some("Electronics".to_string()),
            ..FilterSpec::default()
        };
        assert!(matches_filter(&listing, &filter));

        let filter = FilterSpec {
            category: Some("electronics".to_string()),
            ..FilterSpec::default()
        };
        assert!(!matches_filter(&listing, &filter));
    }

    #[test]
    fn test_price_bounds_are_inclusive() {
        let listing = test_listing("Yoga mat", "", 30.0, true);

        let filter = FilterSpec {
            min_price: Some(30.0),
            max_price: Some(30.0),
            ..FilterSpec::default()
        };
        assert!(matches_filter(&listing, &filter));

        let filter = FilterSpec {
            min_price: Some(30.01),
            ..FilterSpec::default()
        };
        assert!(!matches_filter(&listing, &filter));

        let filter = FilterSpec {
            max_price: Some(29.99),
            ..FilterSpec::default()
        };
        assert!(!matches_filter(&listing, &filter));
    }

    #[test]
    fn test_search_is_case_insensitive_over_title_or_description() {
        let listing = test_listing("Desk light", "Classic Lamp, barely used", 25.0, true);

        let filter = FilterSpec {
            search_text: Some("lamp".to_string()),
            ..FilterSpec::default()
        };
        assert!(matches_filter(&listing, &filter), "description should match");

        let filter = FilterSpec {
            search_text: Some("DESK".to_string()),
            ..FilterSpec::default()
        };
        assert!(matches_filter(&listing, &filter), "title should match");

        let filter = FilterSpec {
            search_text: Some("sofa".to_string()),
            ..FilterSpec::default()
        };
        assert!(!matches_filter(&listing, &filter));
    }

    #[test]
    fn test_stock_filter_only_applies_when_set() {
        let out_of_stock = test_listing("Fitness tracker", "", 59.99, false);

        let filter = FilterSpec {
            in_stock_only: true,
            ..FilterSpec::default()
        };
        assert!(!matches_filter(&out_of_stock, &filter));
        assert!(matches_filter(&out_of_stock, &FilterSpec::default()));
    }

    #[test]
    fn test_price_ordering() {
        let cheap = test_listing("A", "", 10.0, true);
        let pricey = test_listing("B", "", 99.0, true);

        assert_eq!(compare_listings(OrderKey::PriceAsc, &cheap, &pricey), Ordering::Less);
        assert_eq!(compare_listings(OrderKey::PriceDesc, &cheap, &pricey), Ordering::Greater);
    }

    #[test]
    fn test_date_ordering() {
        let mut older = test_listing("A", "", 10.0, true);
        let mut newer = test_listing("B", "", 10.0, true);
        older.created_at = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        newer.created_at = older.created_at + Duration::hours(1);

        assert_eq!(compare_listings(OrderKey::DateDesc, &newer, &older), Ordering::Less);
        assert_eq!(compare_listings(OrderKey::DateAsc, &older, &newer), Ordering::Less);
    }

    #[test]
    fn test_ties_break_on_id_ascending() {
        let mut a = test_listing("A", "", 25.0, true);
        let mut b = test_listing("B", "", 25.0, true);
        a.id = Uuid::from_u128(1);
        b.id = Uuid::from_u128(2);

        // Same price and same timestamp on every key
        for order in [
            OrderKey::PriceAsc,
            OrderKey::PriceDesc,
            OrderKey::DateDesc,
            OrderKey::DateAsc,
        ] {
            assert_eq!(compare_listings(order, &a, &b), Ordering::Less);
            assert_eq!(compare_listings(order, &b, &a), Ordering::Greater);
        }
    }
}
