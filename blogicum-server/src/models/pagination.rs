//! Pagination types
//!
//! Page numbers are 1-indexed. `?page=last` jumps to the final page; any
//! other non-numeric value, zero, or a page past the end is rejected so the
//! handler can answer 404.

use serde::{Deserialize, Serialize};

/// Requested page, as parsed from the query string
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PageRequest {
    Number(u32),
    Last,
}

impl PageRequest {
    /// Parse the raw `page` query value. Missing means the first page.
    pub fn parse(raw: Option<&str>) -> Option<Self> {
        match raw.map(str::trim) {
            None | Some("") => Some(Self::Number(1)),
            Some("last") => Some(Self::Last),
            Some(s) => s.parse::<u32>().ok().filter(|n| *n >= 1).map(Self::Number),
        }
    }
}

/// Resolved pagination window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    /// Page number (1-indexed)
    pub page: u32,
    /// Items per page
    pub per_page: u32,
}

impl Pagination {
    /// Resolve a request against the total row count.
    ///
    /// Returns `None` when the page lies past the end. Page 1 of an empty
    /// listing is always valid.
    pub fn resolve(request: PageRequest, per_page: u32, total: i64) -> Option<Self> {
        let per_page = per_page.max(1);
        let last = total_pages(total, per_page);
        let page = match request {
            PageRequest::Last => last,
            PageRequest::Number(n) => n,
        };

        (page <= last).then_some(Self { page, per_page })
    }

    /// Calculate SQL OFFSET value.
    pub fn offset(&self) -> i64 {
        (self.page as i64 - 1) * self.per_page as i64
    }

    /// Get LIMIT value.
    pub fn limit(&self) -> i64 {
        self.per_page as i64
    }
}

fn total_pages(total: i64, per_page: u32) -> u32 {
    if total <= 0 {
        1
    } else {
        ((total as u64 + per_page as u64 - 1) / per_page as u64) as u32
    }
}

/// One page of results plus the navigation state a page template needs
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Paginated<T> {
    /// Items for current page
    pub items: Vec<T>,
    /// Total count across all pages
    pub total: i64,
    /// Current page number
    pub page: u32,
    /// Items per page
    pub per_page: u32,
    pub total_pages: u32,
    pub has_next: bool,
    pub has_previous: bool,
}

impl<T> Paginated<T> {
    pub fn new(items: Vec<T>, total: i64, window: Pagination) -> Self {
        let total_pages = total_pages(total, window.per_page);
        Self {
            items,
            total,
            page: window.page,
            per_page: window.per_page,
            total_pages,
            has_next: window.page < total_pages,
            has_previous: window.page > 1,
        }
    }

    /// Transform the items while keeping the navigation state.
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Paginated<U> {
        Paginated {
            items: self.items.into_iter().map(f).collect(),
            total: self.total,
            page: self.page,
            per_page: self.per_page,
            total_pages: self.total_pages,
            has_next: self.has_next,
            has_previous: self.has_previous,
        }
    }
}

/// Query parameters for paginated pages
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PageParams {
    pub page: Option<String>,
}

impl PageParams {
    pub fn request(&self) -> Option<PageRequest> {
        PageRequest::parse(self.page.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_page_values() {
        assert_eq!(PageRequest::parse(None), Some(PageRequest::Number(1)));
        assert_eq!(PageRequest::parse(Some("")), Some(PageRequest::Number(1)));
        assert_eq!(PageRequest::parse(Some("3")), Some(PageRequest::Number(3)));
        assert_eq!(PageRequest::parse(Some("last")), Some(PageRequest::Last));
        assert_eq!(PageRequest::parse(Some("0")), None);
        assert_eq!(PageRequest::parse(Some("-1")), None);
        assert_eq!(PageRequest::parse(Some("two")), None);
    }

    #[test]
    fn offset_calculation() {
        let p = Pagination::resolve(PageRequest::Number(1), 10, 100).unwrap();
        assert_eq!(p.offset(), 0);

        let p = Pagination::resolve(PageRequest::Number(2), 10, 100).unwrap();
        assert_eq!(p.offset(), 10);

        let p = Pagination::resolve(PageRequest::Number(3), 25, 100).unwrap();
        assert_eq!(p.offset(), 50);
        assert_eq!(p.limit(), 25);
    }

    #[test]
    fn empty_listing_has_one_page() {
        let p = Pagination::resolve(PageRequest::Number(1), 10, 0).unwrap();
        assert_eq!(p.page, 1);
        assert!(Pagination::resolve(PageRequest::Number(2), 10, 0).is_none());
    }

    #[test]
    fn rejects_page_past_end() {
        assert!(Pagination::resolve(PageRequest::Number(3), 10, 25).is_some());
        assert!(Pagination::resolve(PageRequest::Number(4), 10, 25).is_none());
    }

    #[test]
    fn last_page() {
        let p = Pagination::resolve(PageRequest::Last, 10, 25).unwrap();
        assert_eq!(p.page, 3);

        let p = Pagination::resolve(PageRequest::Last, 10, 0).unwrap();
        assert_eq!(p.page, 1);
    }

    #[test]
    fn navigation_flags() {
        let window = Pagination::resolve(PageRequest::Number(1), 10, 30).unwrap();
        let page: Paginated<()> = Paginated::new(vec![], 30, window);
        assert_eq!(page.total_pages, 3);
        assert!(page.has_next);
        assert!(!page.has_previous);

        let window = Pagination::resolve(PageRequest::Number(2), 10, 30).unwrap();
        let page: Paginated<()> = Paginated::new(vec![], 30, window);
        assert!(page.has_next);
        assert!(page.has_previous);

        let window = Pagination::resolve(PageRequest::Last, 10, 30).unwrap();
        let page: Paginated<()> = Paginated::new(vec![], 30, window);
        assert!(!page.has_next);
        assert!(page.has_previous);
    }

    #[test]
    fn map_keeps_navigation() {
        let window = Pagination::resolve(PageRequest::Number(2), 2, 5).unwrap();
        let page = Paginated::new(vec![1, 2], 5, window).map(|n| n * 10);
        assert_eq!(page.items, vec![10, 20]);
        assert_eq!(page.page, 2);
        assert_eq!(page.total_pages, 3);
    }
}
