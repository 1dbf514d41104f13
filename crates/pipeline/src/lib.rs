//! Batch orchestration for capforge.
//!
//! Drives the end-to-end compositing run: validate inputs, gate on the
//! license table, resolve the background/overlay asset pools, then loop
//! over caption lines uploading and rendering one composite per line.
//! External services and UI affordances sit behind traits so the whole
//! pipeline runs against in-memory fakes in tests.

pub mod batch;
pub mod collaborators;
pub mod error;
pub mod license;
pub mod resolver;

pub use batch::{BatchOutcome, BatchRequest, BatchRunner, ControlData};
pub use error::BatchError;
pub use license::{LicenseGrant, LicenseKind, LicenseSession, LicenseStore};
