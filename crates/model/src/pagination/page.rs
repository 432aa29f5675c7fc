use serde::Serialize;
use thiserror::Error;

pub const DEFAULT_PAGE_SIZE: i64 = 50;
pub const DEFAULT_PAGE: i64 = 0;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PageError {
    #[error("pageSize must be greater than zero, got {0}")]
    InvalidPageSize(i64),
}

/// Raw page inputs as they arrive from the caller. Nothing is validated
/// until [`PageRequest::window`] is asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page_size: i64,
    pub current_page: i64,
}

impl Default for PageRequest {
    fn default() -> Self {
        PageRequest {
            page_size: DEFAULT_PAGE_SIZE,
            current_page: DEFAULT_PAGE,
        }
    }
}

/// A validated `(offset, limit)` pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    pub page_size: u64,
    pub current_page: u64,
    pub offset: u64,
}

impl PageRequest {
    pub fn new(page_size: i64, current_page: i64) -> Self {
        PageRequest {
            page_size,
            current_page,
        }
    }

    /// Pages are 1-based; anything below 1 is read as the first page.
    pub fn window(&self) -> Result<PageWindow, PageError> {
        if self.page_size <= 0 {
            return Err(PageError::InvalidPageSize(self.page_size));
        }
        let page_size = self.page_size as u64;
        let current_page = self.current_page.max(1) as u64;
        Ok(PageWindow {
            page_size,
            current_page,
            offset: page_size.saturating_mul(current_page - 1),
        })
    }
}

pub fn total_pages(total_count: u64, page_size: u64) -> u64 {
    if page_size == 0 {
        return 0;
    }
    total_count.div_ceil(page_size)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginationResult<T> {
    pub items: Vec<T>,
    pub page_size: u64,
    pub current_page: u64,
    pub total_pages: u64,
    pub total_count: u64,
}
