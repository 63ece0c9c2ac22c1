//! `dispatchmail` turns CBRE dispatch and status-update emails into
//! structured work-order records.
//!
//! The core is a pure, synchronous text-to-record transform:
//! [`parser::dispatch::parse_dispatch`] for new work orders and
//! [`parser::status::interpret`] for status updates. Everything else in the
//! crate (reading `.eml` files, batch import, notification texts, the CLI)
//! is plumbing around those two calls.

pub mod config;
pub mod error;
pub mod import;
pub mod model;
pub mod notify;
pub mod parser;
