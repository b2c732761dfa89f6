//! Channel Signal Relay
//!
//! Watches signal channels, extracts structured trading calls from their
//! free-text posts, checks them against the exchange ticker and hands them to
//! the coin monitor.

pub mod catalog;
pub mod client;
pub mod config;
pub mod dedup;
pub mod error;
pub mod extractor;
pub mod forward;
pub mod ingester;
pub mod pipeline;
pub mod report;
pub mod types;
