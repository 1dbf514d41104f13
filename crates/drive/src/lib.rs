//! Cloud-drive client: folder listing and binary file fetch.

pub mod client;

pub use client::{DriveClient, DriveError};
