//! Trait seams for the orchestrator's external collaborators.
//!
//! The drive store, the image host, and the two UI affordances (output
//! directory picker, progress display) are all injected as trait objects
//! so the batch loop can run against in-memory fakes in tests and against
//! the real clients in the app shell.

use std::path::PathBuf;

use async_trait::async_trait;

use capforge_core::assets::RemoteAsset;
use capforge_drive::DriveClient;
use capforge_imagehost::{ImageHostClient, UploadedImage};
use capforge_sheets::tables::ServerProfile;

use crate::error::BatchError;

/// Listing and binary fetch from the cloud image store.
#[async_trait]
pub trait ImageStore: Send + Sync {
    /// List the files of a folder (unfiltered).
    async fn list_folder(&self, folder_id: &str) -> Result<Vec<RemoteAsset>, BatchError>;

    /// Download one file's bytes.
    async fn fetch_binary(&self, file_id: &str) -> Result<Vec<u8>, BatchError>;
}

#[async_trait]
impl ImageStore for DriveClient {
    async fn list_folder(&self, folder_id: &str) -> Result<Vec<RemoteAsset>, BatchError> {
        Ok(DriveClient::list_folder(self, folder_id).await?)
    }

    async fn fetch_binary(&self, file_id: &str) -> Result<Vec<u8>, BatchError> {
        Ok(DriveClient::fetch_binary(self, file_id).await?)
    }
}

/// Upload and render operations on the image host.
#[async_trait]
pub trait ImageHost: Send + Sync {
    /// Upload raw image bytes to the given hosting account.
    async fn upload(
        &self,
        bytes: Vec<u8>,
        filename: &str,
        account: &ServerProfile,
    ) -> Result<UploadedImage, BatchError>;

    /// Fetch the rendered result of a transformation URL.
    async fn fetch_rendered(&self, url: &str) -> Result<Vec<u8>, BatchError>;

    /// Fetch arbitrary bytes over HTTP (the caller's logo URL).
    async fn fetch_url(&self, url: &str) -> Result<Vec<u8>, BatchError>;
}

/// Real image-host collaborator: the client plus the installation's
/// unsigned upload preset.
pub struct HostUploader {
    client: ImageHostClient,
    upload_preset: String,
}

impl HostUploader {
    /// Bind a client to the installation's upload preset.
    pub fn new(client: ImageHostClient, upload_preset: String) -> Self {
        Self {
            client,
            upload_preset,
        }
    }
}

#[async_trait]
impl ImageHost for HostUploader {
    async fn upload(
        &self,
        bytes: Vec<u8>,
        filename: &str,
        account: &ServerProfile,
    ) -> Result<UploadedImage, BatchError> {
        Ok(self
            .client
            .upload(bytes, filename, account, &self.upload_preset)
            .await?)
    }

    async fn fetch_rendered(&self, url: &str) -> Result<Vec<u8>, BatchError> {
        Ok(self.client.fetch_rendered(url).await?)
    }

    async fn fetch_url(&self, url: &str) -> Result<Vec<u8>, BatchError> {
        Ok(self.client.fetch_url(url).await?)
    }
}

/// Output-directory selection, the one cancelable step before the loop.
pub trait OutputPicker: Send + Sync {
    /// Return the chosen output directory, or `None` if canceled.
    fn pick_output_dir(&self) -> Option<PathBuf>;
}

/// Progress and status display.
pub trait ProgressSink: Send + Sync {
    /// Show a short status line.
    fn status(&self, message: &str);

    /// Report loop progress in `0.0..=1.0`.
    fn progress(&self, fraction: f64);
}

/// A sink that discards everything (headless runs, tests).
pub struct NullProgress;

impl ProgressSink for NullProgress {
    fn status(&self, _message: &str) {}
    fn progress(&self, _fraction: f64) {}
}
