//! Page-number pagination.

use super::{int_param, Params};
use crate::error::{AppError, FieldErrors};
use serde::Serialize;

pub const DEFAULT_PAGE_SIZE: i64 = 20;
pub const MAX_PAGE_SIZE: i64 = 100;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PageRequest {
    pub page: i64,
    pub page_size: i64,
}

impl Default for PageRequest {
    fn default() -> Self {
        PageRequest {
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl PageRequest {
    /// `page` is 1-based; `page_size` is capped at [`MAX_PAGE_SIZE`].
    pub fn from_params(params: &Params) -> Result<Self, AppError> {
        let mut errors = FieldErrors::new();
        let page = int_param(params, "page", &mut errors);
        let page_size = int_param(params, "page_size", &mut errors);
        if matches!(page, Some(p) if p < 1) {
            errors.add("page", "Invalid page.");
        }
        if matches!(page_size, Some(s) if s < 1) {
            errors.add("page_size", "Ensure this value is greater than or equal to 1.");
        }
        errors.into_result()?;
        Ok(PageRequest {
            page: page.unwrap_or(1),
            page_size: page_size.unwrap_or(DEFAULT_PAGE_SIZE).min(MAX_PAGE_SIZE),
        })
    }

    pub fn limit(&self) -> i64 {
        self.page_size
    }

    pub fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.page_size)
    }
}

/// One page of a filtered collection plus the total match count.
#[derive(Debug, Serialize)]
pub struct Page<T> {
    pub count: i64,
    pub page: i64,
    pub page_size: i64,
    pub results: Vec<T>,
}

impl<T> Page<T> {
    pub fn new(request: &PageRequest, count: i64, results: Vec<T>) -> Self {
        Page {
            count,
            page: request.page,
            page_size: request.page_size,
            results,
        }
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            count: self.count,
            page: self.page,
            page_size: self.page_size,
            results: self.results.into_iter().map(f).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::params;

    #[test]
    fn defaults_and_cap() {
        let req = PageRequest::from_params(&params(&[])).unwrap();
        assert_eq!(req, PageRequest::default());
        assert_eq!(req.offset(), 0);

        let req = PageRequest::from_params(&params(&[("page", "3"), ("page_size", "500")])).unwrap();
        assert_eq!(req.page_size, MAX_PAGE_SIZE);
        assert_eq!(req.offset(), 200);
    }

    #[test]
    fn rejects_non_positive_and_garbage() {
        assert!(PageRequest::from_params(&params(&[("page", "0")])).is_err());
        assert!(PageRequest::from_params(&params(&[("page_size", "x")])).is_err());
    }

    #[test]
    fn map_keeps_window() {
        let page = Page::new(&PageRequest::default(), 41, vec![1, 2]).map(|n| n * 10);
        assert_eq!(page.count, 41);
        assert_eq!(page.results, vec![10, 20]);
        assert_eq!(page.page_size, 20);
    }
}
