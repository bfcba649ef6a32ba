//! Paginated listing result.

use super::mail::EmailRecord;

/// One page of a filtered listing, as returned by `GET /emails`.
///
/// `page` and `per_page` echo the request verbatim (no clamping), so
/// `total_pages` may be zero or negative for degenerate inputs.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct EmailPage {
    /// Records on the requested page, in archive order.
    pub emails: Vec<EmailRecord>,
    /// Number of messages that survived all filters.
    pub total: u64,
    /// Requested page number (1-based).
    pub page: i64,
    /// Requested page size.
    pub per_page: i64,
    /// `ceil(total / per_page)`.
    pub total_pages: i64,
}
