//! Page requests, sorting and paged results.

use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use std::str::FromStr;
use strum::{Display, EnumString};
use thiserror::Error;
use utoipa::{IntoParams, ToSchema};

pub const DEFAULT_PAGE_SIZE: u64 = 20;
pub const MAX_PAGE_SIZE: u64 = 100;
/// Highest page whose offset still fits a signed 64-bit SQL `OFFSET`.
pub const MAX_PAGE: u64 = i64::MAX as u64 / MAX_PAGE_SIZE;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumString, Serialize, Deserialize)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    #[default]
    Asc,
    Desc,
}

/// Column a listing can be ordered by.
pub trait SortKey: Copy + Debug + Default + FromStr + Send + Sync + 'static {}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumString)]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum ProductSort {
    #[default]
    Id,
    Name,
    Price,
    Date,
}

impl SortKey for ProductSort {}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumString)]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum CategorySort {
    #[default]
    Id,
    Name,
}

impl SortKey for CategorySort {}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Sort<S> {
    pub by: S,
    pub direction: Direction,
}

/// Zero-based page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest<S> {
    pub page: u64,
    pub size: u64,
    pub sort: Sort<S>,
}

impl<S: SortKey> PageRequest<S> {
    /// `page` is capped at [`MAX_PAGE`] and `size` clamped to `1..=MAX_PAGE_SIZE`.
    pub fn new(page: u64, size: u64) -> Self {
        Self {
            page: page.min(MAX_PAGE),
            size: size.clamp(1, MAX_PAGE_SIZE),
            sort: Sort::default(),
        }
    }

    pub fn sorted_by(mut self, by: S, direction: Direction) -> Self {
        self.sort = Sort { by, direction };
        self
    }
}

impl<S> PageRequest<S> {
    /// Index of the first row on this page.
    pub fn offset(&self) -> u64 {
        self.page.saturating_mul(self.size)
    }
}

impl<S: SortKey> Default for PageRequest<S> {
    fn default() -> Self {
        Self::new(0, DEFAULT_PAGE_SIZE)
    }
}

/// One page of results plus the totals of the whole listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Page<T> {
    pub content: Vec<T>,
    /// Zero-based page number
    pub page: u64,
    pub size: u64,
    pub total_elements: u64,
    pub total_pages: u64,
}

impl<T> Page<T> {
    pub fn new<S>(content: Vec<T>, request: &PageRequest<S>, total_elements: u64) -> Self {
        Self {
            content,
            page: request.page,
            size: request.size,
            total_elements,
            total_pages: total_elements.div_ceil(request.size.max(1)),
        }
    }

    /// Maps the content, leaving the paging metadata untouched.
    pub fn map<U, F>(self, f: F) -> Page<U>
    where
        F: FnMut(T) -> U,
    {
        Page {
            content: self.content.into_iter().map(f).collect(),
            page: self.page,
            size: self.size,
            total_elements: self.total_elements,
            total_pages: self.total_pages,
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PageQueryError {
    #[error("Unknown sort property '{0}'")]
    UnknownSortKey(String),

    #[error("Unknown sort direction '{0}', expected asc or desc")]
    UnknownDirection(String),

    #[error("Page {0} is out of range, the highest page is {max}", max = MAX_PAGE)]
    PageOutOfRange(u64),
}

impl From<PageQueryError> for axum_helpers::AppError {
    fn from(err: PageQueryError) -> Self {
        axum_helpers::AppError::InvalidQuery(err.to_string())
    }
}

/// Query string of listing endpoints, e.g. `?page=0&size=12&sort=name,desc`.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PageQuery {
    /// Zero-based page number (default 0)
    pub page: Option<u64>,
    /// Page size, 1 to 100 (default 20)
    pub size: Option<u64>,
    /// `property[,asc|desc]` (default `id,asc`)
    pub sort: Option<String>,
}

impl PageQuery {
    pub fn into_request<S: SortKey>(self) -> Result<PageRequest<S>, PageQueryError> {
        let page = self.page.unwrap_or(0);
        if page > MAX_PAGE {
            return Err(PageQueryError::PageOutOfRange(page));
        }
        let request = PageRequest::new(page, self.size.unwrap_or(DEFAULT_PAGE_SIZE));

        let Some(sort) = self.sort.as_deref().map(str::trim).filter(|s| !s.is_empty()) else {
            return Ok(request);
        };

        let (key, direction) = match sort.split_once(',') {
            Some((key, direction)) => (key.trim(), Some(direction.trim())),
            None => (sort, None),
        };

        let by = key
            .parse::<S>()
            .map_err(|_| PageQueryError::UnknownSortKey(key.to_string()))?;
        let direction = match direction {
            None | Some("") => Direction::Asc,
            Some(d) => d
                .parse()
                .map_err(|_| PageQueryError::UnknownDirection(d.to_string()))?,
        };

        Ok(request.sorted_by(by, direction))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(page: Option<u64>, size: Option<u64>, sort: Option<&str>) -> PageQuery {
        PageQuery {
            page,
            size,
            sort: sort.map(str::to_string),
        }
    }

    #[test]
    fn test_defaults() {
        let request: PageRequest<ProductSort> = PageQuery::default().into_request().unwrap();

        assert_eq!(request.page, 0);
        assert_eq!(request.size, DEFAULT_PAGE_SIZE);
        assert_eq!(request.sort.by, ProductSort::Id);
        assert_eq!(request.sort.direction, Direction::Asc);
    }

    #[test]
    fn test_sort_is_case_insensitive() {
        let request: PageRequest<ProductSort> = query(Some(2), Some(12), Some("Name,DESC"))
            .into_request()
            .unwrap();

        assert_eq!(request.page, 2);
        assert_eq!(request.size, 12);
        assert_eq!(request.sort.by, ProductSort::Name);
        assert_eq!(request.sort.direction, Direction::Desc);
        assert_eq!(request.offset(), 24);
    }

    #[test]
    fn test_size_is_clamped() {
        let big: PageRequest<CategorySort> =
            query(None, Some(10_000), None).into_request().unwrap();
        let zero: PageRequest<CategorySort> = query(None, Some(0), None).into_request().unwrap();

        assert_eq!(big.size, MAX_PAGE_SIZE);
        assert_eq!(zero.size, 1);
    }

    #[test]
    fn test_unknown_sort_is_rejected() {
        let key = query(None, None, Some("price"))
            .into_request::<CategorySort>()
            .unwrap_err();
        assert_eq!(key, PageQueryError::UnknownSortKey("price".to_string()));

        let direction = query(None, None, Some("name,sideways"))
            .into_request::<CategorySort>()
            .unwrap_err();
        assert_eq!(
            direction,
            PageQueryError::UnknownDirection("sideways".to_string())
        );
    }

    #[test]
    fn test_huge_page_is_rejected() {
        let err = query(Some(u64::MAX), Some(20), None)
            .into_request::<ProductSort>()
            .unwrap_err();
        assert_eq!(err, PageQueryError::PageOutOfRange(u64::MAX));

        let last: PageRequest<ProductSort> =
            query(Some(MAX_PAGE), Some(MAX_PAGE_SIZE), None).into_request().unwrap();
        assert!(last.offset() <= i64::MAX as u64);
    }

    #[test]
    fn test_new_caps_page() {
        let request = PageRequest::<CategorySort>::new(u64::MAX, u64::MAX);

        assert_eq!(request.page, MAX_PAGE);
        assert_eq!(request.size, MAX_PAGE_SIZE);
        assert!(request.offset() <= i64::MAX as u64);
    }

    #[test]
    fn test_page_totals_and_map() {
        let request = PageRequest::<ProductSort>::new(1, 10);
        let page = Page::new(vec![1, 2, 3], &request, 23);

        assert_eq!(page.total_pages, 3);

        let mapped = page.map(|n| n.to_string());
        assert_eq!(mapped.content, vec!["1", "2", "3"]);
        assert_eq!(mapped.page, 1);
        assert_eq!(mapped.total_elements, 23);
    }

    #[test]
    fn test_empty_listing_has_no_pages() {
        let page: Page<u8> = Page::new(vec![], &PageRequest::<ProductSort>::default(), 0);
        assert_eq!(page.total_pages, 0);
    }
}
