//! Pagination for list endpoints.
//!
//! Clients pass 1-indexed `page` and `pageSize` query parameters; both are
//! optional. Pages past the end of the result set come back empty rather
//! than clamped, so clients can walk forward until `data` runs dry.

use serde::Serialize;

/// Rows per page when the client does not say.
pub const DEFAULT_PAGE_SIZE: i64 = 10;

/// Sanitized paging parameters for a list query.
#[derive(Debug, Clone, Copy)]
pub struct PageParams {
    /// Current page number (1-indexed)
    pub page: i64,
    /// Rows per page
    pub page_size: i64,
}

impl PageParams {
    /// Build paging parameters from raw query values.
    ///
    /// Missing values fall back to page 1 and [`DEFAULT_PAGE_SIZE`]; zero
    /// and negative values are raised to 1.
    pub fn from_options(page: Option<i64>, page_size: Option<i64>) -> Self {
        Self {
            page: page.unwrap_or(1).max(1),
            page_size: page_size.unwrap_or(DEFAULT_PAGE_SIZE).max(1),
        }
    }

    /// Offset for SQL LIMIT/OFFSET queries.
    pub fn offset(&self) -> i64 {
        (self.page - 1) * self.page_size
    }
}

/// Paging metadata echoed back with every list response.
#[derive(Debug, Serialize)]
pub struct PageInfo {
    pub total: i64,
    pub page: i64,
    #[serde(rename = "pageSize")]
    pub page_size: i64,
}

impl PageInfo {
    pub fn new(total: i64, params: PageParams) -> Self {
        Self {
            total,
            page: params.page,
            page_size: params.page_size,
        }
    }
}

/// List response envelope: one page of rows plus paging metadata.
#[derive(Debug, Serialize)]
pub struct Paged<T> {
    pub data: Vec<T>,
    pub pagination: PageInfo,
}

impl<T> Paged<T> {
    pub fn new(data: Vec<T>, total: i64, params: PageParams) -> Self {
        Self {
            data,
            pagination: PageInfo::new(total, params),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let p = PageParams::from_options(None, None);
        assert_eq!(p.page, 1);
        assert_eq!(p.page_size, DEFAULT_PAGE_SIZE);
        assert_eq!(p.offset(), 0);
    }

    #[test]
    fn test_offset_for_later_pages() {
        let p = PageParams::from_options(Some(3), Some(25));
        assert_eq!(p.offset(), 50);
    }

    #[test]
    fn test_out_of_bounds_low_is_raised() {
        let p = PageParams::from_options(Some(0), Some(-5));
        assert_eq!(p.page, 1);
        assert_eq!(p.page_size, 1);
        assert_eq!(p.offset(), 0);
    }

    #[test]
    fn test_envelope_shape() {
        let paged = Paged::new(vec!["a", "b"], 12, PageParams::from_options(Some(2), None));
        let json = serde_json::to_value(&paged).unwrap();
        assert_eq!(json["data"], serde_json::json!(["a", "b"]));
        assert_eq!(json["pagination"]["total"], 12);
        assert_eq!(json["pagination"]["page"], 2);
        assert_eq!(json["pagination"]["pageSize"], DEFAULT_PAGE_SIZE);
    }
}
