//! `mboxview`: browse an MBOX archive over HTTP.
//!
//! This crate provides the core library for streaming messages out of an
//! MBOX file, extracting display fields, running filtered and paginated
//! listings, and serving them as JSON next to a small browser client.

pub mod api;
pub mod config;
pub mod error;
pub mod model;
pub mod parser;
pub mod search;
pub mod store;
