//! Pagination helper types for backend listings
//!
//! The backend pages with `start`/`end` query parameters; `end = -1` means
//! "everything from `start`".

use serde::{Deserialize, Serialize};

/// Page size used when walking a playlist to count its tracks.
pub const DEFAULT_PAGE_SIZE: u32 = 20;

/// Fixed-size page cursor, turned into a [`TrackWindow`] per request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    /// Zero-based
    pub page: u32,
    pub page_size: u32,
}

impl PageRequest {
    /// ```
    /// use core_library::repositories::PageRequest;
    ///
    /// let request = PageRequest::new(2, 20);
    /// assert_eq!(request.window().start, 40);
    /// assert_eq!(request.window().end, Some(60));
    /// ```
    pub fn new(page: u32, page_size: u32) -> Self {
        Self { page, page_size }
    }

    pub fn offset(&self) -> u32 {
        self.page.saturating_mul(self.page_size)
    }

    pub fn next(&self) -> Self {
        Self {
            page: self.page + 1,
            page_size: self.page_size,
        }
    }

    /// A page holding fewer items than requested is the last one.
    pub fn is_last(&self, received: usize) -> bool {
        received < self.page_size as usize
    }

    pub fn window(&self) -> TrackWindow {
        let start = self.offset();
        TrackWindow::new(start, start.saturating_add(self.page_size))
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: 0,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

/// `start`/`end` range sent to listing endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackWindow {
    pub start: u32,
    /// `None` requests everything from `start`.
    pub end: Option<u32>,
}

impl TrackWindow {
    pub fn new(start: u32, end: u32) -> Self {
        Self {
            start,
            end: Some(end),
        }
    }

    pub fn all() -> Self {
        Self {
            start: 0,
            end: None,
        }
    }

    /// Query pairs in backend form.
    pub fn query_pairs(&self) -> [(&'static str, String); 2] {
        let end = self.end.map(i64::from).unwrap_or(-1);
        [("start", self.start.to_string()), ("end", end.to_string())]
    }
}

impl From<PageRequest> for TrackWindow {
    fn from(request: PageRequest) -> Self {
        request.window()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pages_walk_forward_in_fixed_steps() {
        let first = PageRequest::default();
        assert_eq!((first.page, first.page_size), (0, DEFAULT_PAGE_SIZE));
        assert_eq!(first.offset(), 0);

        let third = first.next().next();
        assert_eq!(third.offset(), 40);
        assert_eq!(PageRequest::new(u32::MAX, 2).offset(), u32::MAX);
    }

    #[test]
    fn test_short_page_ends_walk() {
        let page = PageRequest::new(3, 20);
        assert!(page.is_last(0));
        assert!(page.is_last(19));
        assert!(!page.is_last(20));
    }

    #[test]
    fn test_window_query_pairs() {
        let window = TrackWindow::from(PageRequest::new(1, 20));
        assert_eq!(
            window.query_pairs(),
            [("start", "20".to_string()), ("end", "40".to_string())]
        );

        assert_eq!(
            TrackWindow::all().query_pairs(),
            [("start", "0".to_string()), ("end", "-1".to_string())]
        );
    }
}
