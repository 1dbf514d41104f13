//! Spreadsheet-service client for capforge.
//!
//! The spreadsheet is the control plane for the whole tool: it holds the
//! license table, the background/overlay pool directories, the hosting
//! account profiles, and the ad content. This crate wraps the values REST
//! API and exposes typed readers for each of those ranges.

pub mod client;
pub mod tables;

pub use client::{SheetsClient, SheetsError};
