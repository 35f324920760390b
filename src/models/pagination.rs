//! Author list query parameters and paging metadata.

use serde::{Deserialize, Serialize};

const MAX_PAGE_SIZE: u32 = 20;

/// Query string accepted by `GET /api/authors`.
///
/// ```text
/// GET /api/authors?mainCategory=Rum&searchQuery=an&pageNumber=2&pageSize=5
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AuthorsResourceParameters {
    pub main_category: Option<String>,
    pub search_query: Option<String>,
    pub page_number: u32,
    pub page_size: u32,
}

impl Default for AuthorsResourceParameters {
    fn default() -> Self {
        Self {
            main_category: None,
            search_query: None,
            page_number: 1,
            page_size: 10,
        }
    }
}

impl AuthorsResourceParameters {
    /// Page number, never below 1.
    pub fn page_number(&self) -> u32 {
        self.page_number.max(1)
    }

    /// Page size, between 1 and the maximum of 20.
    pub fn page_size(&self) -> u32 {
        self.page_size.clamp(1, MAX_PAGE_SIZE)
    }

    /// Trimmed main category filter, `None` when blank.
    pub fn main_category(&self) -> Option<&str> {
        non_blank(self.main_category.as_deref())
    }

    /// Trimmed search text, `None` when blank.
    pub fn search_query(&self) -> Option<&str> {
        non_blank(self.search_query.as_deref())
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// One page of a larger result set.
#[derive(Debug, Clone, PartialEq)]
pub struct PagedList<T> {
    pub items: Vec<T>,
    pub current_page: u32,
    pub page_size: u32,
    pub total_count: u64,
    pub total_pages: u32,
}

impl<T> PagedList<T> {
    pub fn new(items: Vec<T>, total_count: u64, current_page: u32, page_size: u32) -> Self {
        let page_size = page_size.max(1);
        let total_pages = total_count.div_ceil(u64::from(page_size)) as u32;

        Self {
            items,
            current_page,
            page_size,
            total_count,
            total_pages,
        }
    }

    pub fn has_previous(&self) -> bool {
        self.current_page > 1
    }

    pub fn has_next(&self) -> bool {
        self.current_page < self.total_pages
    }
}

/// Serialized into the `X-Pagination` response header.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginationMetadata {
    pub total_count: u64,
    pub page_size: u32,
    pub current_page: u32,
    pub total_pages: u32,
    pub previous_page_link: Option<String>,
    pub next_page_link: Option<String>,
}
