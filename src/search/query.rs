//! Request parameters for the listing and lookup queries.
//!
//! Parameters arrive as raw query-string pairs. For each key only the first
//! non-empty value counts; an absent or empty value means "use the default".
//!
//! | key         | default | meaning                                         |
//! |-------------|---------|-------------------------------------------------|
//! | `page`      | 1       | 1-based page number, not clamped                |
//! | `per_page`  | 20      | page size, must not be zero                     |
//! | `search`    | empty   | substring of subject or sender                  |
//! | `sender`    | empty   | substring of sender                             |
//! | `from_date` | empty   | `YYYY-MM-DD`, inclusive lower bound at midnight |
//! | `to_date`   | empty   | `YYYY-MM-DD`, inclusive upper bound at midnight |
//! | `id`        | 0       | absolute archive position (lookup only)         |

use chrono::{NaiveDate, NaiveDateTime};

use crate::error::{MboxError, Result};

/// Page used when the request does not name one.
pub const DEFAULT_PAGE: i64 = 1;

/// Page size used when neither the request nor the config names one.
pub const DEFAULT_PER_PAGE: i64 = 20;

const BOUND_FORMAT: &str = "%Y-%m-%d";

/// Query-string pairs in request order.
#[derive(Debug, Clone, Default)]
pub struct QueryParams {
    pairs: Vec<(String, String)>,
}

impl QueryParams {
    pub fn new(pairs: Vec<(String, String)>) -> Self {
        Self { pairs }
    }

    /// First non-empty value for `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, v)| k == key && !v.is_empty())
            .map(|(_, v)| v.as_str())
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for QueryParams {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self::new(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

/// A fully parsed listing request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListQuery {
    pub page: i64,
    pub per_page: i64,
    /// Lowercased subject/sender needle; empty disables the filter.
    pub search: String,
    /// Lowercased sender needle; empty disables the filter.
    pub sender: String,
    pub from_date: Option<NaiveDateTime>,
    pub to_date: Option<NaiveDateTime>,
}

impl Default for ListQuery {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            per_page: DEFAULT_PER_PAGE,
            search: String::new(),
            sender: String::new(),
            from_date: None,
            to_date: None,
        }
    }
}

impl ListQuery {
    /// Parse listing parameters.
    ///
    /// Non-numeric `page` / `per_page`, a zero `per_page`, and date bounds
    /// that are not `YYYY-MM-DD` are [`MboxError::InvalidQuery`].
    pub fn from_params(params: &QueryParams, default_per_page: i64) -> Result<Self> {
        let page = parse_int(params, "page", DEFAULT_PAGE)?;
        let per_page = parse_int(params, "per_page", default_per_page)?;
        if per_page == 0 {
            return Err(MboxError::InvalidQuery(
                "per_page must not be zero".to_string(),
            ));
        }

        Ok(Self {
            page,
            per_page,
            search: params.get("search").unwrap_or_default().to_lowercase(),
            sender: params.get("sender").unwrap_or_default().to_lowercase(),
            from_date: parse_bound(params, "from_date")?,
            to_date: parse_bound(params, "to_date")?,
        })
    }
}

/// Parse the `id` of a single-message lookup (default 0).
pub fn lookup_id(params: &QueryParams) -> Result<i64> {
    parse_int(params, "id", 0)
}

fn parse_int(params: &QueryParams, key: &str, default: i64) -> Result<i64> {
    match params.get(key) {
        None => Ok(default),
        Some(raw) => raw.trim().parse::<i64>().map_err(|_| {
            MboxError::InvalidQuery(format!("{key} must be an integer, got '{raw}'"))
        }),
    }
}

fn parse_bound(params: &QueryParams, key: &str) -> Result<Option<NaiveDateTime>> {
    let Some(raw) = params.get(key) else {
        return Ok(None);
    };
    NaiveDate::parse_from_str(raw, BOUND_FORMAT)
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(Some)
        .ok_or_else(|| MboxError::InvalidQuery(format!("{key} must be YYYY-MM-DD, got '{raw}'")))
}
