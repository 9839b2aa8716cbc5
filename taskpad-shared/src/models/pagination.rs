/// Offset pagination
///
/// [`PageRequest`] normalizes the raw `page`/`per_page` query values and
/// [`Page`] is the envelope returned by list endpoints:
///
/// ```json
/// {
///   "data": [...],
///   "current_page": 2,
///   "last_page": 5,
///   "per_page": 10,
///   "total": 42,
///   "from": 11,
///   "to": 20
/// }
/// ```

use serde::Serialize;

/// Page size used when none (or garbage) is supplied
pub const DEFAULT_PER_PAGE: i64 = 10;

/// Largest page size a client may request
pub const MAX_PER_PAGE: i64 = 100;

/// A validated page selection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    /// 1-based page number
    pub page: i64,

    /// Items per page, within `1..=MAX_PER_PAGE`
    pub per_page: i64,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: 1,
            per_page: DEFAULT_PER_PAGE,
        }
    }
}

impl PageRequest {
    /// Builds a page request from raw query-string values
    ///
    /// Missing, non-numeric or non-positive values fall back to the defaults;
    /// `per_page` above [`MAX_PER_PAGE`] is clamped.
    pub fn from_params(page: Option<&str>, per_page: Option<&str>) -> Self {
        let parse = |raw: Option<&str>| {
            raw.and_then(|v| v.trim().parse::<i64>().ok())
                .filter(|n| *n >= 1)
        };

        Self {
            page: parse(page).unwrap_or(1),
            per_page: parse(per_page)
                .map(|n| n.min(MAX_PER_PAGE))
                .unwrap_or(DEFAULT_PER_PAGE),
        }
    }

    /// Number of rows to skip
    pub fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.per_page)
    }
}

/// One page of results plus the numbers a client needs to render pagination
#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub data: Vec<T>,
    pub current_page: i64,
    pub last_page: i64,
    pub per_page: i64,
    pub total: i64,
    pub from: Option<i64>,
    pub to: Option<i64>,
}

impl<T> Page<T> {
    pub fn new(data: Vec<T>, request: PageRequest, total: i64) -> Self {
        let last_page = ((total + request.per_page - 1) / request.per_page).max(1);
        let (from, to) = if data.is_empty() {
            (None, None)
        } else {
            let from = request.offset() + 1;
            (Some(from), Some(from + data.len() as i64 - 1))
        };

        Self {
            data,
            current_page: request.page,
            last_page,
            per_page: request.per_page,
            total,
            from,
            to,
        }
    }
}
