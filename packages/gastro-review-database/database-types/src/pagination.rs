use gastro_review_lib::config::PaginationConfig;
use serde::Serialize;

/// A zero-based page index paired with the page size in force.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: usize,
    pub size: usize,
}

impl PageRequest {
    pub fn offset(&self) -> usize {
        self.page.saturating_mul(self.size)
    }
}

/// One page of results plus the total number of matching rows.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: usize,
    pub size: usize,
    pub total: usize,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, request: PageRequest, total: usize) -> Self {
        Self {
            items,
            page: request.page,
            size: request.size,
            total,
        }
    }

    pub fn total_pages(&self) -> usize {
        if self.size == 0 {
            return 0;
        }
        (self.total + self.size - 1) / self.size
    }
}

/// Turns a caller's page index into a `PageRequest` using the configured size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Paginator {
    page_size: usize,
}

impl Paginator {
    pub fn new(page_size: usize) -> Self {
        Self {
            page_size: page_size.max(1),
        }
    }

    pub fn page(&self, page: usize) -> PageRequest {
        PageRequest {
            page,
            size: self.page_size,
        }
    }
}

impl Default for Paginator {
    fn default() -> Self {
        Self::from(&PaginationConfig::default())
    }
}

impl From<&PaginationConfig> for Paginator {
    fn from(config: &PaginationConfig) -> Self {
        Self::new(config.page_size)
    }
}
