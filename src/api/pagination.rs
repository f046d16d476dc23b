// Page-number pagination
// `?page=N` (1-based, or `last`) over a fixed page size

use axum::http::{header::HOST, HeaderMap, Uri};
use serde::{Deserialize, Serialize};

use crate::api::errors::ApiError;

pub const PAGE_SIZE: u64 = 5;

const PAGE_PARAM: &str = "page";

#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    pub page: Option<String>,
}

/// One page of results plus links to its neighbours
#[derive(Debug, Serialize)]
pub struct Paginated<T> {
    pub count: u64,
    pub next: Option<String>,
    pub previous: Option<String>,
    pub results: Vec<T>,
}

/// A resolved page: which slice of the collection to fetch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    pub number: u64,
    pub num_pages: u64,
    pub offset: u64,
    pub limit: u64,
}

impl PageWindow {
    /// Resolves the requested page against the collection size
    ///
    /// An empty collection still has a page 1. Anything else out of range
    /// (or not a number) is a 404.
    pub fn resolve(raw: Option<&str>, count: u64, page_size: u64) -> Result<Self, ApiError> {
        let num_pages = count.div_ceil(page_size).max(1);

        let number = match raw.map(str::trim) {
            None | Some("") => 1,
            Some("last") => num_pages,
            Some(value) => value.parse::<u64>().map_err(|_| invalid_page())?,
        };

        if number == 0 || number > num_pages {
            return Err(invalid_page());
        }

        Ok(Self {
            number,
            num_pages,
            offset: (number - 1) * page_size,
            limit: page_size,
        })
    }

    pub fn has_next(&self) -> bool {
        self.number < self.num_pages
    }

    pub fn has_previous(&self) -> bool {
        self.number > 1
    }
}

fn invalid_page() -> ApiError {
    ApiError::new(axum::http::StatusCode::NOT_FOUND, "Invalid page.")
}

/// Builds absolute links to other pages of the current request
#[derive(Debug, Clone)]
pub struct PageLinks {
    base: String,
    params: Vec<String>,
}

impl PageLinks {
    pub fn from_request(headers: &HeaderMap, uri: &Uri) -> Self {
        let host = headers
            .get(HOST)
            .and_then(|value| value.to_str().ok())
            .or_else(|| uri.authority().map(|a| a.as_str()))
            .unwrap_or("localhost");
        let scheme = uri.scheme_str().unwrap_or("http");

        let params = uri
            .query()
            .unwrap_or_default()
            .split('&')
            .filter(|pair| !pair.is_empty())
            .filter(|pair| pair.split('=').next() != Some(PAGE_PARAM))
            .map(str::to_string)
            .collect();

        Self {
            base: format!("{}://{}{}", scheme, host, uri.path()),
            params,
        }
    }

    /// Link to `page`; page 1 drops the parameter altogether
    pub fn link(&self, page: u64) -> String {
        let mut params = self.params.clone();
        if page > 1 {
            params.push(format!("{}={}", PAGE_PARAM, page));
        }

        if params.is_empty() {
            self.base.clone()
        } else {
            format!("{}?{}", self.base, params.join("&"))
        }
    }

    pub fn paginate<T>(&self, window: &PageWindow, count: u64, results: Vec<T>) -> Paginated<T> {
        Paginated {
            count,
            next: window.has_next().then(|| self.link(window.number + 1)),
            previous: window.has_previous().then(|| self.link(window.number - 1)),
            results,
        }
    }
}
