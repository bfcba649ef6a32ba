//! Listing filters over header-derived fields.
//!
//! Applied in order: date range, sender, then the combined subject/sender
//! search. All text matching is case-insensitive substring matching.

use chrono::NaiveDateTime;

use crate::parser::extract::HeaderFields;

use super::query::ListQuery;

/// Check whether a message with the given fields and local date survives the query.
pub fn matches(fields: &HeaderFields, date: NaiveDateTime, query: &ListQuery) -> bool {
    in_date_range(date, query)
        && contains_ci(&fields.from, &query.sender)
        && (query.search.is_empty()
            || contains_ci(&fields.subject, &query.search)
            || contains_ci(&fields.from, &query.search))
}

/// Both bounds are inclusive and compared against the full datetime, so a
/// `to_date` only admits messages up to midnight at the start of that day.
fn in_date_range(date: NaiveDateTime, query: &ListQuery) -> bool {
    if let Some(from) = query.from_date {
        if date < from {
            return false;
        }
    }
    if let Some(to) = query.to_date {
        if date > to {
            return false;
        }
    }
    true
}

/// `needle` must already be lowercase. An empty needle always matches.
fn contains_ci(haystack: &str, needle: &str) -> bool {
    needle.is_empty() || haystack.to_lowercase().contains(needle)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(date: &str, time: (u32, u32, u32)) -> NaiveDateTime {
        NaiveDate::parse_from_str(date, "%Y-%m-%d")
            .unwrap()
            .and_hms_opt(time.0, time.1, time.2)
            .unwrap()
    }

    fn fields(subject: &str, from: &str) -> HeaderFields {
        HeaderFields {
            subject: subject.to_string(),
            from: from.to_string(),
            date: None,
        }
    }

    #[test]
    fn test_empty_query_matches_everything() {
        let q = ListQuery::default();
        assert!(matches(&fields("Hello", "a@x.com"), at("2024-01-01", (9, 0, 0)), &q));
    }

    #[test]
    fn test_search_matches_subject_case_insensitively() {
        let q = ListQuery {
            search: "invoice".to_string(),
            ..ListQuery::default()
        };
        assert!(matches(&fields("Your INVOICE", "a@x.com"), at("2024-01-01", (9, 0, 0)), &q));
        assert!(!matches(&fields("Receipt", "a@x.com"), at("2024-01-01", (9, 0, 0)), &q));
    }

    #[test]
    fn test_search_matches_sender() {
        let q = ListQuery {
            search: "billing".to_string(),
            ..ListQuery::default()
        };
        assert!(matches(
            &fields("Hello", "Billing Dept <billing@x.com>"),
            at("2024-01-01", (9, 0, 0)),
            &q
        ));
    }

    #[test]
    fn test_sender_filter_ignores_subject() {
        let q = ListQuery {
            sender: "alice".to_string(),
            ..ListQuery::default()
        };
        assert!(matches(&fields("x", "Alice <a@x.com>"), at("2024-01-01", (9, 0, 0)), &q));
        assert!(!matches(&fields("alice", "bob@x.com"), at("2024-01-01", (9, 0, 0)), &q));
    }

    #[test]
    fn test_date_range_inclusive_bounds() {
        let q = ListQuery {
            from_date: Some(at("2024-01-10", (0, 0, 0))),
            to_date: Some(at("2024-01-31", (0, 0, 0))),
            ..ListQuery::default()
        };
        let f = fields("x", "y");
        assert!(matches(&f, at("2024-01-10", (0, 0, 0)), &q));
        assert!(matches(&f, at("2024-01-15", (12, 0, 0)), &q));
        assert!(matches(&f, at("2024-01-31", (0, 0, 0)), &q));
        assert!(!matches(&f, at("2024-01-09", (23, 59, 59)), &q));
    }

    #[test]
    fn test_to_date_excludes_later_same_day() {
        let q = ListQuery {
            to_date: Some(at("2024-01-31", (0, 0, 0))),
            ..ListQuery::default()
        };
        assert!(!matches(&fields("x", "y"), at("2024-01-31", (8, 30, 0)), &q));
    }

    #[test]
    fn test_combined_filters() {
        let q = ListQuery {
            sender: "alice".to_string(),
            search: "budget".to_string(),
            from_date: Some(at("2024-01-01", (0, 0, 0))),
            ..ListQuery::default()
        };
        let date = at("2024-02-01", (10, 0, 0));
        assert!(matches(&fields("Budget Q1", "alice@x.com"), date, &q));
        assert!(!matches(&fields("Budget Q1", "bob@x.com"), date, &q));
        assert!(!matches(&fields("Budget Q1", "alice@x.com"), at("2023-12-31", (10, 0, 0)), &q));
    }
}
