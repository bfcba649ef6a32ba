//! Query engine: filtered, paginated listings and single-message lookups.
//!
//! Every call re-scans the archive from the start; nothing is cached between
//! calls, so results always reflect the file as it is when the scan runs.

pub mod filter;
pub mod page;
pub mod query;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::Result;
use crate::model::mail::EmailRecord;
use crate::model::page::EmailPage;
use crate::parser::extract::{self, Extracted, HeaderFields};
use crate::store::archive::Archive;

use self::query::ListQuery;

/// How records in a listing are numbered.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum IdMode {
    /// Absolute archive position; always valid for `/email?id=`.
    #[default]
    Absolute,
    /// Position among the filtered results (0, 1, 2, … in listing order).
    Filtered,
}

/// Scan the archive and return one page of matching messages.
///
/// Messages without a parseable date never appear in listings. A message
/// whose body cannot be resolved is logged and skipped; I/O failures abort
/// the listing.
pub fn list_emails(archive: &Archive, query: &ListQuery, id_mode: IdMode) -> Result<EmailPage> {
    let mut emails = Vec::new();

    for message in archive.scan()? {
        let message = message?;
        let fields = HeaderFields::from_message(&message);
        let Some(date) = fields.date else {
            continue;
        };
        if !filter::matches(&fields, date, query) {
            continue;
        }

        let body = match extract::render_body(&message) {
            Ok(body) => body,
            Err(e) if e.is_per_message() => {
                warn!(
                    sequence = message.sequence,
                    offset = message.offset,
                    error = %e,
                    "Skipping message that could not be processed"
                );
                continue;
            }
            Err(e) => return Err(e),
        };

        let id = match id_mode {
            IdMode::Absolute => message.sequence,
            IdMode::Filtered => emails.len() as u64,
        };
        emails.push(Extracted { fields, body }.into_record(id));
    }

    debug!(matched = emails.len(), page = query.page, "Listing complete");
    Ok(page::paginate(emails, query.page, query.per_page))
}

/// Return the message at absolute archive position `id`.
///
/// Every message counts towards the position, whatever its date or
/// structure. `Ok(None)` when no message sits at `id` (including negative
/// ids) or when the message there cannot be processed; the scan does not
/// move on to a later message in that case.
pub fn find_email(archive: &Archive, id: i64) -> Result<Option<EmailRecord>> {
    let Ok(target) = u64::try_from(id) else {
        debug!(id, "Negative id requested");
        return Ok(None);
    };

    for message in archive.scan()? {
        let message = message?;
        if message.sequence != target {
            continue;
        }
        return match extract::extract(&message) {
            Ok(extracted) => Ok(Some(extracted.into_record(target))),
            Err(e) if e.is_per_message() => {
                warn!(
                    sequence = message.sequence,
                    offset = message.offset,
                    error = %e,
                    "Requested message could not be processed"
                );
                Ok(None)
            }
            Err(e) => Err(e),
        };
    }

    debug!(id, "No message at requested position");
    Ok(None)
}
