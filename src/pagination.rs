//! Page/limit pagination shared by the listing endpoints.
//!
//! The wire envelope is `{results, currentPage, totalPages, totalResults}`.
//! Page numbering is 1-based; out-of-range values are clamped rather than
//! rejected.

use serde::{Deserialize, Serialize};

const DEFAULT_LIMIT: i64 = 10;
const MAX_LIMIT: i64 = 100;

/// The `page`/`limit` query parameters as clients send them.
#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

impl PageQuery {
    /// Effective 1-based page number.
    pub fn page(&self) -> i64 {
        self.page.unwrap_or(1).max(1)
    }

    /// Effective page size, clamped to `1..=100`.
    pub fn limit(&self) -> i64 {
        self.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT)
    }

    /// Row offset for the SQL query.
    pub fn offset(&self) -> i64 {
        (self.page() - 1) * self.limit()
    }
}

/// A single page of results plus the bookkeeping the client needs to render
/// pagination controls.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub results: Vec<T>,
    pub current_page: i64,
    pub total_pages: i64,
    pub total_results: i64,
}

impl<T> Page<T> {
    pub fn new(results: Vec<T>, query: &PageQuery, total_results: i64) -> Self {
        let limit = query.limit();
        // Ceiling division; an empty result set still reports 0 pages.
        let total_pages = (total_results + limit - 1) / limit;
        Self {
            results,
            current_page: query.page(),
            total_pages,
            total_results,
        }
    }
}
