//! Pagination utilities for song listing
//!
//! Page numbers are 1-indexed. Missing, unparsable or non-positive values fall
//! back to the defaults rather than being rejected.

/// Page used when none (or an invalid one) is requested
pub const DEFAULT_PAGE: i64 = 1;

/// Page size used when none (or an invalid one) is requested
pub const DEFAULT_LIMIT: i64 = 10;

/// Sanitized page request for SQL LIMIT/OFFSET queries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    /// Current page number (1-indexed)
    pub page: i64,
    /// Maximum rows per page
    pub limit: i64,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            limit: DEFAULT_LIMIT,
        }
    }
}

impl PageRequest {
    /// Build a page request from raw query-string values
    ///
    /// # Examples
    /// ```
    /// use songlib_common::pagination::PageRequest;
    ///
    /// let p = PageRequest::from_params(Some("3"), Some("20"));
    /// assert_eq!(p.offset(), 40);
    ///
    /// // Garbage falls back to page 1, limit 10
    /// let p = PageRequest::from_params(Some("abc"), Some("-5"));
    /// assert_eq!((p.page, p.limit), (1, 10));
    /// ```
    pub fn from_params(page: Option<&str>, limit: Option<&str>) -> Self {
        Self {
            page: parse_positive(page).unwrap_or(DEFAULT_PAGE),
            limit: parse_positive(limit).unwrap_or(DEFAULT_LIMIT),
        }
    }

    /// Row offset for SQL OFFSET clause
    pub fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.limit)
    }
}

fn parse_positive(raw: Option<&str>) -> Option<i64> {
    raw.and_then(|s| s.trim().parse::<i64>().ok())
        .filter(|v| *v > 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_when_absent() {
        let p = PageRequest::from_params(None, None);
        assert_eq!(p, PageRequest::default());
        assert_eq!(p.offset(), 0);
    }

    #[test]
    fn test_explicit_page_and_limit() {
        let p = PageRequest::from_params(Some("2"), Some("25"));
        assert_eq!(p.page, 2);
        assert_eq!(p.limit, 25);
        assert_eq!(p.offset(), 25);
    }

    #[test]
    fn test_non_positive_values_fall_back() {
        let p = PageRequest::from_params(Some("0"), Some("0"));
        assert_eq!(p, PageRequest::default());

        let p = PageRequest::from_params(Some("-1"), Some("5"));
        assert_eq!(p.page, 1);
        assert_eq!(p.limit, 5);
    }

    #[test]
    fn test_unparsable_values_fall_back() {
        let p = PageRequest::from_params(Some("two"), Some(""));
        assert_eq!(p, PageRequest::default());
    }

    #[test]
    fn test_offset_does_not_overflow() {
        let p = PageRequest::from_params(Some(&i64::MAX.to_string()), Some("1000"));
        assert_eq!(p.offset(), i64::MAX);
    }
}
