use serde::{Deserialize, Serialize};

use crate::errors::{AppError, AppResult, ErrorCode};

/// 1-indexed pagination parameters, as they arrive from query strings.
#[derive(Debug, Clone, Deserialize)]
pub struct PageParams {
    #[serde(default = "default_page")]
    pub page: i64,
    #[serde(default = "default_per_page")]
    pub per_page: i64,
}

fn default_page() -> i64 {
    1
}

fn default_per_page() -> i64 {
    15
}

impl PageParams {
    pub fn validate(&self) -> AppResult<()> {
        if self.page < 1 {
            return Err(AppError::new(ErrorCode::InvalidPage, "page must be at least 1"));
        }
        if self.per_page < 1 {
            return Err(AppError::new(
                ErrorCode::InvalidPageSize,
                "page size must be at least 1",
            ));
        }
        Ok(())
    }

    pub fn offset(&self) -> i64 {
        (self.page - 1) * self.limit()
    }

    pub fn limit(&self) -> i64 {
        self.per_page.min(100)
    }
}

impl Default for PageParams {
    fn default() -> Self {
        Self {
            page: default_page(),
            per_page: default_per_page(),
        }
    }
}

/// One page of results plus whether neighbours exist.
#[derive(Debug, Serialize)]
pub struct Page<T: Serialize> {
    pub items: Vec<T>,
    pub page: i64,
    pub per_page: i64,
    pub has_next: bool,
    pub has_prev: bool,
}

impl<T: Serialize> Page<T> {
    /// Builds a page from rows fetched with `limit + 1`: the extra row, if
    /// present, only signals that a further page exists and is dropped.
    pub fn from_rows(mut rows: Vec<T>, params: &PageParams) -> Self {
        let limit = params.limit() as usize;
        let has_next = rows.len() > limit;
        rows.truncate(limit);
        Self {
            items: rows,
            page: params.page,
            per_page: params.limit(),
            has_next,
            has_prev: params.page > 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(page: i64, per_page: i64) -> PageParams {
        PageParams { page, per_page }
    }

    #[test]
    fn defaults() {
        let p = PageParams::default();
        assert_eq!(p.page, 1);
        assert_eq!(p.per_page, 15);
        assert_eq!(p.offset(), 0);
        assert!(p.validate().is_ok());
    }

    #[test]
    fn page_zero_rejected() {
        let err = params(0, 15).validate().unwrap_err();
        match err {
            AppError::Known { code, .. } => assert_eq!(code, ErrorCode::InvalidPage),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn non_positive_page_size_rejected() {
        for size in [0, -3] {
            let err = params(1, size).validate().unwrap_err();
            match err {
                AppError::Known { code, .. } => assert_eq!(code, ErrorCode::InvalidPageSize),
                other => panic!("unexpected error: {other:?}"),
            }
        }
    }

    #[test]
    fn offset_is_one_indexed() {
        assert_eq!(params(1, 15).offset(), 0);
        assert_eq!(params(2, 15).offset(), 15);
        assert_eq!(params(3, 7).offset(), 14);
    }

    #[test]
    fn from_rows_empty_first_page() {
        let page = Page::<i64>::from_rows(vec![], &params(1, 15));
        assert!(page.items.is_empty());
        assert!(!page.has_next);
        assert!(!page.has_prev);
    }

    #[test]
    fn from_rows_drops_lookahead_row() {
        let rows: Vec<i64> = (0..16).collect();
        let page = Page::from_rows(rows, &params(1, 15));
        assert_eq!(page.items.len(), 15);
        assert!(page.has_next);
        assert!(!page.has_prev);
    }

    #[test]
    fn from_rows_last_page() {
        let rows: Vec<i64> = (0..4).collect();
        let page = Page::from_rows(rows, &params(2, 15));
        assert_eq!(page.items.len(), 4);
        assert!(!page.has_next);
        assert!(page.has_prev);
    }

    #[test]
    fn pages_concatenate_without_overlap() {
        // 2 full pages of 5 and a final page of 2
        let all: Vec<i64> = (0..12).collect();
        let mut seen = Vec::new();
        for page_no in 1..=3 {
            let p = params(page_no, 5);
            let start = p.offset() as usize;
            let end = (start + p.limit() as usize + 1).min(all.len());
            let page = Page::from_rows(all[start..end].to_vec(), &p);
            assert!(page.items.len() <= 5);
            assert_eq!(page.has_next, page_no < 3);
            assert_eq!(page.has_prev, page_no > 1);
            seen.extend(page.items);
        }
        assert_eq!(seen, all);
    }
}
