//! Core data model types: raw archive messages, normalized records, and result pages.

pub mod mail;
pub mod page;
