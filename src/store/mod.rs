//! Read-only access to the MBOX archive being served.

pub mod archive;
