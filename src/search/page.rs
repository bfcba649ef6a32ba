//! Pagination over the filtered result list.
//!
//! `page` and `per_page` are used exactly as requested. The slice
//! `[(page - 1) * per_page, page * per_page)` follows sequence-slice rules:
//! negative bounds count back from the end, bounds past either end are
//! clamped, and an inverted range is empty. Nothing here can fail.

use crate::model::mail::EmailRecord;
use crate::model::page::EmailPage;

/// Cut one page out of the filtered records.
///
/// `per_page` must be non-zero (enforced when the query is parsed).
pub fn paginate(mut emails: Vec<EmailRecord>, page: i64, per_page: i64) -> EmailPage {
    let total = emails.len();
    let start = page.saturating_sub(1).saturating_mul(per_page);
    let end = start.saturating_add(per_page);
    let (lo, hi) = resolve_slice(start, end, total);

    emails.truncate(hi);
    let page_items = emails.split_off(lo);

    EmailPage {
        emails: page_items,
        total: total as u64,
        page,
        per_page,
        total_pages: total_pages(total as i64, per_page),
    }
}

/// `ceil(total / per_page)` computed as floor division of
/// `total + per_page - 1`, so it is 0 when `total` is 0.
pub fn total_pages(total: i64, per_page: i64) -> i64 {
    floor_div(total.saturating_add(per_page).saturating_sub(1), per_page)
}

fn floor_div(a: i64, b: i64) -> i64 {
    let q = a / b;
    if a % b != 0 && ((a < 0) != (b < 0)) {
        q - 1
    } else {
        q
    }
}

/// Turn possibly negative or out-of-range bounds into a valid `lo..hi`.
fn resolve_slice(start: i64, end: i64, len: usize) -> (usize, usize) {
    let len_i = len as i64;
    let clamp = |idx: i64| -> usize {
        let idx = if idx < 0 { idx.saturating_add(len_i) } else { idx };
        idx.clamp(0, len_i) as usize
    };
    let lo = clamp(start);
    let hi = clamp(end).max(lo);
    (lo, hi)
}
