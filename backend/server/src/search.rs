//! # Search
//!
//! Listing filters for `GET /food-posts`, read from the query string.
//!
//! - `query`: substring of title or description, case-insensitive
//! - `category_id`: exact category
//! - `city`, `state`: owner's profile location
//! - `is_available`: defaults to `true`, pass `false` for withdrawn posts
//! - `limit`: defaults to 20, capped at [`MAX_RESULTS`]
//!
//! Results are newest first. There is no offset, clients narrow the filters
//! instead.
use bank::{MAX_RESULTS, models::PostFilter};
use serde::Deserialize;

use crate::utils::sanitize;

pub const DEFAULT_LIMIT: usize = 20;

#[derive(Debug, Default, Deserialize)]
pub struct SearchParams {
    pub query: Option<String>,
    pub category_id: Option<i64>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub is_available: Option<bool>,
    pub limit: Option<usize>,
}

impl From<SearchParams> for PostFilter {
    fn from(params: SearchParams) -> Self {
        Self {
            query: params.query.as_deref().and_then(sanitize),
            category_id: params.category_id,
            city: params.city.as_deref().and_then(sanitize),
            state: params.state.as_deref().and_then(sanitize),
            is_available: Some(params.is_available.unwrap_or(true)),
            limit: params.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_RESULTS),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let filter = PostFilter::from(SearchParams::default());

        assert_eq!(filter.query, None);
        assert_eq!(filter.is_available, Some(true));
        assert_eq!(filter.limit, DEFAULT_LIMIT);
    }

    #[test]
    fn cleans_and_clamps() {
        let filter = PostFilter::from(SearchParams {
            query: Some("  ripe   mangoes ".to_string()),
            city: Some("   ".to_string()),
            is_available: Some(false),
            limit: Some(10_000),
            ..SearchParams::default()
        });

        assert_eq!(filter.query.as_deref(), Some("ripe mangoes"));
        assert_eq!(filter.city, None);
        assert_eq!(filter.is_available, Some(false));
        assert_eq!(filter.limit, MAX_RESULTS);

        let zero = PostFilter::from(SearchParams {
            limit: Some(0),
            ..SearchParams::default()
        });
        assert_eq!(zero.limit, 1);
    }
}
