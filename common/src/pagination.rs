//! Abstractions for page/limit pagination.

/// Default page number used when the requested one is missing or invalid.
pub const DEFAULT_PAGE: u32 = 1;

/// Default page size used when the requested one is missing or invalid.
pub const DEFAULT_LIMIT: u32 = 10;

/// Resolved pagination of a list query.
///
/// Both components are guaranteed to be positive: invalid requests clamp to
/// the defaults instead of erroring.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Pagination {
    /// 1-based page number.
    page: u32,

    /// Maximum number of items on a page.
    limit: u32,
}

impl Pagination {
    /// Creates a new [`Pagination`] from the provided raw arguments.
    ///
    /// A missing or non-positive `page` resolves to [`DEFAULT_PAGE`], and a
    /// missing or non-positive `limit` to [`DEFAULT_LIMIT`].
    #[must_use]
    pub fn new(page: Option<i64>, limit: Option<i64>) -> Self {
        Self {
            page: page
                .and_then(|p| u32::try_from(p).ok())
                .filter(|p| *p > 0)
                .unwrap_or(DEFAULT_PAGE),
            limit: limit
                .and_then(|l| u32::try_from(l).ok())
                .filter(|l| *l > 0)
                .unwrap_or(DEFAULT_LIMIT),
        }
    }

    /// Creates a new [`Pagination`] from raw query string arguments.
    ///
    /// Non-numeric input resolves to the defaults, never an error.
    #[must_use]
    pub fn from_raw(page: Option<&str>, limit: Option<&str>) -> Self {
        Self::new(
            page.and_then(|p| p.trim().parse().ok()),
            limit.and_then(|l| l.trim().parse().ok()),
        )
    }

    /// Returns the 1-based page number of this [`Pagination`].
    #[must_use]
    pub fn page(&self) -> u32 {
        self.page
    }

    /// Returns the page size of this [`Pagination`].
    #[must_use]
    pub fn limit(&self) -> u32 {
        self.limit
    }

    /// Returns the number of items to skip before this page starts.
    #[must_use]
    pub fn offset(&self) -> u64 {
        u64::from(self.page - 1) * u64::from(self.limit)
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self::new(None, None)
    }
}

#[cfg(test)]
mod spec {
    use super::Pagination;

    #[test]
    fn defaults_on_missing() {
        let p = Pagination::new(None, None);
        assert_eq!(p.page(), 1);
        assert_eq!(p.limit(), 10);
        assert_eq!(p.offset(), 0);
    }

    #[test]
    fn defaults_on_non_positive() {
        let p = Pagination::new(Some(0), Some(-3));
        assert_eq!(p.page(), 1);
        assert_eq!(p.limit(), 10);

        let p = Pagination::new(Some(-1), Some(0));
        assert_eq!(p.page(), 1);
        assert_eq!(p.limit(), 10);
    }

    #[test]
    fn defaults_on_non_numeric() {
        let p = Pagination::from_raw(Some("two"), Some(""));
        assert_eq!(p.page(), 1);
        assert_eq!(p.limit(), 10);
    }

    #[test]
    fn keeps_valid_arguments() {
        let p = Pagination::from_raw(Some("3"), Some("25"));
        assert_eq!(p.page(), 3);
        assert_eq!(p.limit(), 25);
        assert_eq!(p.offset(), 50);
    }
}
