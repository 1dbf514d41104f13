//! REST client for the cloud-drive file API.
//!
//! Two operations only: list the files of a folder (id, name, MIME type)
//! and download a file's bytes. There is no retry logic anywhere in this
//! client; a transport failure is fatal for the whole batch.

use serde::Deserialize;

use capforge_core::assets::RemoteAsset;

/// Default base URL of the drive file API.
pub const DEFAULT_API_BASE: &str = "https://www.googleapis.com/drive/v3";

/// HTTP client for the drive file API.
pub struct DriveClient {
    client: reqwest::Client,
    api_base: String,
    access_token: String,
}

/// Errors from the drive API layer.
#[derive(Debug, thiserror::Error)]
pub enum DriveError {
    /// The HTTP request itself failed (network, DNS, TLS, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The service returned a non-2xx status code.
    #[error("Drive API error ({status}): {body}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Raw response body for debugging.
        body: String,
    },
}

/// Response body of a file listing.
#[derive(Debug, Deserialize)]
struct FileList {
    #[serde(default)]
    files: Vec<FileEntry>,
}

#[derive(Debug, Deserialize)]
struct FileEntry {
    id: String,
    name: String,
    #[serde(rename = "mimeType")]
    mime_type: String,
}

impl DriveClient {
    /// Create a client with a bearer access token.
    pub fn new(access_token: String) -> Self {
        Self::with_client(reqwest::Client::new(), access_token)
    }

    /// Create a client reusing an existing [`reqwest::Client`].
    pub fn with_client(client: reqwest::Client, access_token: String) -> Self {
        Self {
            client,
            api_base: DEFAULT_API_BASE.to_string(),
            access_token,
        }
    }

    /// Override the API base URL (used by tests against a local server).
    pub fn with_api_base(mut self, api_base: String) -> Self {
        self.api_base = api_base;
        self
    }

    /// List all files directly inside a folder.
    ///
    /// Sends `GET {base}/files?q='{folder_id}' in parents` requesting only
    /// the id/name/MIME-type fields. No MIME filtering happens here; the
    /// resolver applies the allow-list.
    pub async fn list_folder(&self, folder_id: &str) -> Result<Vec<RemoteAsset>, DriveError> {
        let url = format!("{}/files", self.api_base);
        let query = format!("'{folder_id}' in parents");

        let response = self
            .client
            .get(url)
            .query(&[("q", query.as_str()), ("fields", "files(id, name, mimeType)")])
            .bearer_auth(&self.access_token)
            .send()
            .await?;

        let list: FileList = Self::parse_response(response).await?;
        tracing::debug!(folder_id, count = list.files.len(), "Listed drive folder");

        Ok(list
            .files
            .into_iter()
            .map(|f| RemoteAsset {
                id: f.id,
                name: f.name,
                mime_type: f.mime_type,
            })
            .collect())
    }

    /// Download a file's binary content.
    ///
    /// Sends `GET {base}/files/{file_id}?alt=media`.
    pub async fn fetch_binary(&self, file_id: &str) -> Result<Vec<u8>, DriveError> {
        let url = format!("{}/files/{}", self.api_base, file_id);

        let response = self
            .client
            .get(url)
            .query(&[("alt", "media")])
            .bearer_auth(&self.access_token)
            .send()
            .await?;

        let response = Self::ensure_success(response).await?;
        Ok(response.bytes().await?.to_vec())
    }

    // ---- private helpers ----

    /// Ensure the response has a success status code.
    async fn ensure_success(
        response: reqwest::Response,
    ) -> Result<reqwest::Response, DriveError> {
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(DriveError::Api {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }

    /// Parse a successful JSON response body into the expected type.
    async fn parse_response<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, DriveError> {
        let response = Self::ensure_success(response).await?;
        Ok(response.json::<T>().await?)
    }
}
