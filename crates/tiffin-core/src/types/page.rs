//! Pagination request and response types.

use serde::{Deserialize, Serialize};

/// Default page size when none is requested.
pub const DEFAULT_PAGE_LIMIT: u32 = 20;

/// Largest page size a caller may request.
pub const MAX_PAGE_LIMIT: u32 = 100;

/// A request for one page of a listing.
///
/// Pages are 1-indexed. Out-of-range values are clamped rather than rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    /// Page number (1-indexed)
    pub page: u32,
    /// Items per page
    pub limit: u32,
}

impl PageRequest {
    /// Creates a clamped page request.
    ///
    /// # Examples
    ///
    /// ```
    /// use tiffin_core::PageRequest;
    ///
    /// let req = PageRequest::new(0, 500);
    /// assert_eq!(req.page, 1);
    /// assert_eq!(req.limit, 100);
    /// ```
    pub fn new(page: u32, limit: u32) -> Self {
        Self {
            page: page.max(1),
            limit: limit.clamp(1, MAX_PAGE_LIMIT),
        }
    }

    /// Builds a request from optional query parameters.
    pub fn from_optional(page: Option<u32>, limit: Option<u32>) -> Self {
        Self::new(page.unwrap_or(1), limit.unwrap_or(DEFAULT_PAGE_LIMIT))
    }

    /// Number of items to skip.
    pub fn offset(&self) -> usize {
        (self.page as usize - 1) * self.limit as usize
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(1, DEFAULT_PAGE_LIMIT)
    }
}

/// One page of results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    /// Items on this page
    pub items: Vec<T>,
    /// Total number of matching items
    pub total: usize,
    /// Page number (1-indexed)
    pub page: u32,
    /// Page size used
    pub limit: u32,
    /// Number of pages at this page size
    pub total_pages: u32,
}

impl<T> Page<T> {
    /// Slices an already filtered and sorted sequence into a page.
    pub fn from_sorted<I>(items: I, request: PageRequest) -> Self
    where
        I: IntoIterator<Item = T>,
    {
        let all: Vec<T> = items.into_iter().collect();
        let total = all.len();
        let items = all
            .into_iter()
            .skip(request.offset())
            .take(request.limit as usize)
            .collect();
        Self {
            items,
            total,
            page: request.page,
            limit: request.limit,
            total_pages: total.div_ceil(request.limit as usize) as u32,
        }
    }

    /// Maps the items of the page.
    pub fn map<U, F>(self, f: F) -> Page<U>
    where
        F: FnMut(T) -> U,
    {
        Page {
            items: self.items.into_iter().map(f).collect(),
            total: self.total,
            page: self.page,
            limit: self.limit,
            total_pages: self.total_pages,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_offset() {
        assert_eq!(PageRequest::new(1, 20).offset(), 0);
        assert_eq!(PageRequest::new(3, 10).offset(), 20);
    }

    #[test]
    fn test_page_slicing() {
        let page = Page::from_sorted(1..=25, PageRequest::new(3, 10));
        assert_eq!(page.items, vec![21, 22, 23, 24, 25]);
        assert_eq!(page.total, 25);
        assert_eq!(page.total_pages, 3);
    }

    #[test]
    fn test_page_past_end_is_empty() {
        let page = Page::from_sorted(1..=5, PageRequest::new(4, 5));
        assert!(page.items.is_empty());
        assert_eq!(page.total, 5);
        assert_eq!(page.total_pages, 1);
    }

    #[test]
    fn test_from_optional_defaults() {
        let req = PageRequest::from_optional(None, None);
        assert_eq!(req, PageRequest::new(1, DEFAULT_PAGE_LIMIT));
    }
}
