//! Email parsing: MBOX streaming splitter, message splitting, header decoding,
//! MIME body structure, and field extraction.

pub mod eml;
pub mod extract;
pub mod header;
pub mod mbox;
pub mod mime;
