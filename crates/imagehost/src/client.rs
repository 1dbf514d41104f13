//! Upload and download operations against the image host.

use serde::Deserialize;

use capforge_sheets::tables::ServerProfile;

/// Default base URL of the image-host upload API.
pub const DEFAULT_UPLOAD_API_BASE: &str = "https://api.cloudinary.com/v1_1";

/// HTTP client for the image-host upload and render endpoints.
pub struct ImageHostClient {
    client: reqwest::Client,
    upload_api_base: String,
}

/// Metadata the host returns for an uploaded image.
///
/// `width`/`height` are the source pixel dimensions; the overlay sizing
/// in [`TransformChain`](crate::transform::TransformChain) derives from
/// them, so no local image decoding is ever needed.
#[derive(Debug, Clone, Deserialize)]
pub struct UploadedImage {
    /// Host-side identifier used in transformation URLs.
    pub public_id: String,
    /// Pixel width of the uploaded image.
    pub width: u32,
    /// Pixel height of the uploaded image.
    pub height: u32,
    /// Host-detected format (e.g. `jpg`, `png`, `webp`).
    pub format: String,
}

/// Errors from the image-host layer.
#[derive(Debug, thiserror::Error)]
pub enum ImageHostError {
    /// The HTTP request itself failed (network, DNS, TLS, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The upload endpoint answered with a client/server error status.
    #[error("Upload failed ({status}): {body}")]
    UploadFailed {
        /// HTTP status code (≥ 400).
        status: u16,
        /// Raw response body for debugging.
        body: String,
    },

    /// The render endpoint answered with a client/server error status.
    #[error("Render failed ({status})")]
    RenderFailed {
        /// HTTP status code (≥ 400).
        status: u16,
    },

    /// A plain byte fetch (logo URL) answered with an error status.
    #[error("Fetch of {url} failed ({status})")]
    FetchFailed {
        /// The requested URL.
        url: String,
        /// HTTP status code (≥ 400).
        status: u16,
    },
}

impl ImageHostClient {
    /// Create a client with a fresh connection pool.
    pub fn new() -> Self {
        Self::with_client(reqwest::Client::new())
    }

    /// Create a client reusing an existing [`reqwest::Client`].
    pub fn with_client(client: reqwest::Client) -> Self {
        Self {
            client,
            upload_api_base: DEFAULT_UPLOAD_API_BASE.to_string(),
        }
    }

    /// Override the upload API base URL (used by tests).
    pub fn with_upload_api_base(mut self, upload_api_base: String) -> Self {
        self.upload_api_base = upload_api_base;
        self
    }

    /// Upload image bytes to the account's unsigned upload endpoint.
    ///
    /// Sends `POST {base}/{cloud_name}/image/upload` as a multipart form
    /// with a `file` part and the `upload_preset` field. Status ≥ 400 is
    /// [`ImageHostError::UploadFailed`] regardless of transport success.
    pub async fn upload(
        &self,
        bytes: Vec<u8>,
        filename: &str,
        account: &ServerProfile,
        upload_preset: &str,
    ) -> Result<UploadedImage, ImageHostError> {
        let url = format!(
            "{}/{}/image/upload",
            self.upload_api_base, account.cloud_name
        );

        let part = reqwest::multipart::Part::bytes(bytes).file_name(filename.to_string());
        let form = reqwest::multipart::Form::new()
            .part("file", part)
            .text("upload_preset", upload_preset.to_string());

        let response = self.client.post(url).multipart(form).send().await?;

        let status = response.status();
        if status.as_u16() >= 400 {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            tracing::warn!(status = status.as_u16(), filename, "Image upload rejected");
            return Err(ImageHostError::UploadFailed {
                status: status.as_u16(),
                body,
            });
        }

        let uploaded: UploadedImage = response.json().await?;
        tracing::debug!(public_id = %uploaded.public_id, filename, "Uploaded image");
        Ok(uploaded)
    }

    /// Fetch the rendered result of a transformation URL.
    pub async fn fetch_rendered(&self, url: &str) -> Result<Vec<u8>, ImageHostError> {
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if status.as_u16() >= 400 {
            return Err(ImageHostError::RenderFailed {
                status: status.as_u16(),
            });
        }
        Ok(response.bytes().await?.to_vec())
    }

    /// Fetch arbitrary bytes over HTTP (used for the caller's logo URL).
    pub async fn fetch_url(&self, url: &str) -> Result<Vec<u8>, ImageHostError> {
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if status.as_u16() >= 400 {
            return Err(ImageHostError::FetchFailed {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }
        Ok(response.bytes().await?.to_vec())
    }
}

impl Default for ImageHostClient {
    fn default() -> Self {
        Self::new()
    }
}
