//! Aggregate error type for a batch run.
//!
//! Every failure mode surfaces to the caller as one human-readable
//! message; nothing is retried. Client-crate errors convert in via
//! `#[from]` so the orchestrator propagates with `?` throughout.

use capforge_core::error::CoreError;
use capforge_drive::DriveError;
use capforge_imagehost::ImageHostError;
use capforge_sheets::SheetsError;

/// Errors that can abort a batch run.
#[derive(Debug, thiserror::Error)]
pub enum BatchError {
    // --- input validation (before any network call) ---
    /// No email entered.
    #[error("No email entered")]
    MissingEmail,

    /// No logo URL entered.
    #[error("No logo URL entered")]
    MissingLogoUrl,

    /// No caption content entered (and captions were not skipped).
    #[error("No caption content entered")]
    MissingCaptions,

    // --- license gate ---
    /// The email exists in the license table but is already claimed.
    #[error("This email has already been used")]
    EmailInUse,

    /// A different email was entered after one was validated this session.
    #[error("Email does not match the one already checked this session")]
    EmailMismatch,

    // --- pool resolution ---
    /// The selected hosting account name matched no profile row.
    #[error("Hosting account '{0}' not found")]
    ServerNotFound(String),

    /// The selected pool name matched no configured pool.
    #[error("Pool '{0}' not found")]
    PoolNotFound(String),

    /// No background selection was supplied (no skip option exists).
    #[error("No background selected")]
    MissingBackground,

    /// Overlay was not skipped but no element selection was supplied.
    #[error("No overlay element selected")]
    MissingElement,

    /// A remote folder listing yielded zero supported image files.
    #[error("No supported images in folder {0}")]
    EmptyPool(String),

    // --- output selection ---
    /// The caller canceled output-directory selection.
    #[error("Output location selection was canceled")]
    OutputCanceled,

    // --- propagated collaborator failures ---
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error(transparent)]
    Sheets(#[from] SheetsError),

    #[error(transparent)]
    Drive(#[from] DriveError),

    #[error(transparent)]
    ImageHost(#[from] ImageHostError),

    /// Writing an output file failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
