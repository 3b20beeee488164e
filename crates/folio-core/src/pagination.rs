//! Pagination types for list operations.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A request for a page of results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    /// The page number (0-indexed).
    pub page: u32,
    /// The number of items per page.
    pub size: u32,
}

impl PageRequest {
    /// The default page size.
    pub const DEFAULT_SIZE: u32 = 20;
    /// The maximum allowed page size.
    pub const MAX_SIZE: u32 = 100;

    /// Creates a new page request, clamping the size to `1..=MAX_SIZE`.
    #[must_use]
    pub fn new(page: u32, size: u32) -> Self {
        Self {
            page,
            size: size.clamp(1, Self::MAX_SIZE),
        }
    }

    /// Creates a page request for the first page with default size.
    #[must_use]
    pub fn first() -> Self {
        Self::new(0, Self::DEFAULT_SIZE)
    }

    /// Returns the number of rows to skip.
    #[must_use]
    pub const fn offset(&self) -> u32 {
        self.page * self.size
    }

    /// Returns the maximum number of rows to fetch.
    #[must_use]
    pub const fn limit(&self) -> u32 {
        self.size
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::first()
    }
}

impl fmt::Display for PageRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "page={},size={}", self.page, self.size)
    }
}

/// Information about a page of results.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PageInfo {
    /// The current page number (0-indexed).
    pub page: u32,
    /// The number of items per page.
    pub size: u32,
    /// The total number of items across all pages.
    pub total_elements: u64,
    /// The total number of pages.
    pub total_pages: u64,
}

impl PageInfo {
    /// Creates a new page info.
    #[must_use]
    pub fn new(page: u32, size: u32, total_elements: u64) -> Self {
        let total_pages = if size > 0 {
            total_elements.div_ceil(u64::from(size))
        } else {
            0
        };

        Self {
            page,
            size,
            total_elements,
            total_pages,
        }
    }

    /// Whether another page follows this one.
    #[must_use]
    pub const fn has_next(&self) -> bool {
        (self.page as u64) + 1 < self.total_pages
    }
}

/// A page of results.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page<T> {
    /// The items on this page.
    pub content: Vec<T>,
    /// Information about this page.
    #[serde(flatten)]
    pub info: PageInfo,
}

impl<T> Page<T> {
    /// Creates a new page.
    #[must_use]
    pub fn new(content: Vec<T>, request: PageRequest, total_elements: u64) -> Self {
        Self {
            content,
            info: PageInfo::new(request.page, request.size, total_elements),
        }
    }

    /// Maps the page content to a different type.
    #[must_use]
    pub fn map<U, F: FnMut(T) -> U>(self, f: F) -> Page<U> {
        Page {
            content: self.content.into_iter().map(f).collect(),
            info: self.info,
        }
    }

    /// Returns true if the page is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    /// Returns the number of items on this page.
    #[must_use]
    pub fn len(&self) -> usize {
        self.content.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_request_offset() {
        let req = PageRequest::new(2, 10);
        assert_eq!(req.offset(), 20);
        assert_eq!(req.limit(), 10);
    }

    #[test]
    fn test_page_request_clamps_size() {
        assert_eq!(PageRequest::new(0, 1000).size, PageRequest::MAX_SIZE);
        assert_eq!(PageRequest::new(0, 0).size, 1);
    }

    #[test]
    fn test_page_request_display_is_stable() {
        assert_eq!(PageRequest::new(3, 25).to_string(), "page=3,size=25");
    }

    #[test]
    fn test_page_info_total_pages() {
        let page: Page<i32> = Page::new(vec![1], PageRequest::new(0, 5), 11);
        assert_eq!(page.info.total_pages, 3);
        assert!(page.info.has_next());
    }

    #[test]
    fn test_page_info_last_page() {
        let page: Page<i32> = Page::new(vec![1, 2], PageRequest::new(2, 10), 22);
        assert!(!page.info.has_next());
    }

    #[test]
    fn test_page_map() {
        let page = Page::new(vec![1, 2, 3], PageRequest::new(0, 10), 3);
        let mapped = page.map(|x| x * 2);
        assert_eq!(mapped.content, vec![2, 4, 6]);
        assert_eq!(mapped.len(), 3);
        assert!(!mapped.is_empty());
    }
}
