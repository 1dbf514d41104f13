//! REST client for the spreadsheet values API.
//!
//! Wraps range reads and writes against a single spreadsheet using
//! [`reqwest`]. Authentication is a bearer access token supplied by the
//! caller; obtaining it is outside this crate's scope.

use serde::Deserialize;

/// Default base URL of the spreadsheet values API.
pub const DEFAULT_API_BASE: &str = "https://sheets.googleapis.com/v4/spreadsheets";

/// HTTP client bound to one spreadsheet.
pub struct SheetsClient {
    client: reqwest::Client,
    api_base: String,
    spreadsheet_id: String,
    access_token: String,
}

/// Errors from the spreadsheet API layer.
#[derive(Debug, thiserror::Error)]
pub enum SheetsError {
    /// The HTTP request itself failed (network, DNS, TLS, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The service returned a non-2xx status code.
    #[error("Spreadsheet API error ({status}): {body}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Raw response body for debugging.
        body: String,
    },

    /// A response parsed but did not have the expected row/column shape.
    #[error("Unexpected sheet data: {0}")]
    Shape(String),
}

/// Response body of a values read.
#[derive(Debug, Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<serde_json::Value>>,
}

impl SheetsClient {
    /// Create a client for one spreadsheet.
    ///
    /// * `spreadsheet_id` - the sheet document identifier.
    /// * `access_token`   - OAuth bearer token with read/write scope.
    pub fn new(spreadsheet_id: String, access_token: String) -> Self {
        Self::with_client(reqwest::Client::new(), spreadsheet_id, access_token)
    }

    /// Create a client reusing an existing [`reqwest::Client`]
    /// (useful for connection pooling across service clients).
    pub fn with_client(
        client: reqwest::Client,
        spreadsheet_id: String,
        access_token: String,
    ) -> Self {
        Self {
            client,
            api_base: DEFAULT_API_BASE.to_string(),
            spreadsheet_id,
            access_token,
        }
    }

    /// Override the API base URL (used by tests against a local server).
    pub fn with_api_base(mut self, api_base: String) -> Self {
        self.api_base = api_base;
        self
    }

    /// Read a range of cells as rows of strings.
    ///
    /// Sends `GET {base}/{sheet}/values/{range}`. Missing trailing cells
    /// are returned as absent by the service; callers index defensively.
    pub async fn get_values(&self, range: &str) -> Result<Vec<Vec<String>>, SheetsError> {
        let url = format!(
            "{}/{}/values/{}",
            self.api_base, self.spreadsheet_id, range
        );
        let response = self
            .client
            .get(url)
            .bearer_auth(&self.access_token)
            .send()
            .await?;

        let value_range: ValueRange = Self::parse_response(response).await?;
        Ok(value_range
            .values
            .into_iter()
            .map(|row| row.into_iter().map(cell_to_string).collect())
            .collect())
    }

    /// Overwrite a range of cells with raw (unparsed) string values.
    ///
    /// Sends `PUT {base}/{sheet}/values/{range}?valueInputOption=RAW`.
    pub async fn update_values(
        &self,
        range: &str,
        values: &[Vec<String>],
    ) -> Result<(), SheetsError> {
        let url = format!(
            "{}/{}/values/{}?valueInputOption=RAW",
            self.api_base, self.spreadsheet_id, range
        );
        let body = serde_json::json!({ "values": values });

        let response = self
            .client
            .put(url)
            .bearer_auth(&self.access_token)
            .json(&body)
            .send()
            .await?;

        Self::check_status(response).await?;
        tracing::debug!(range, rows = values.len(), "Updated sheet range");
        Ok(())
    }

    // ---- private helpers ----

    /// Ensure the response has a success status code. Returns the
    /// response unchanged on success, or a [`SheetsError::Api`] with the
    /// status and body text on failure.
    async fn ensure_success(
        response: reqwest::Response,
    ) -> Result<reqwest::Response, SheetsError> {
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(SheetsError::Api {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }

    /// Parse a successful JSON response body into the expected type.
    async fn parse_response<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, SheetsError> {
        let response = Self::ensure_success(response).await?;
        Ok(response.json::<T>().await?)
    }

    /// Assert the response has a success status code, discarding the body.
    async fn check_status(response: reqwest::Response) -> Result<(), SheetsError> {
        Self::ensure_success(response).await?;
        Ok(())
    }
}

/// Render a cell value as the string the sheet displays.
///
/// The values API can return numbers or booleans for unformatted cells;
/// everything is flattened to a string since the control-plane tables are
/// all text.
fn cell_to_string(value: serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s,
        serde_json::Value::Null => String::new(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cell_to_string_passes_strings_through() {
        assert_eq!(cell_to_string(serde_json::json!("hello")), "hello");
    }

    #[test]
    fn cell_to_string_flattens_numbers() {
        assert_eq!(cell_to_string(serde_json::json!(42)), "42");
    }

    #[test]
    fn cell_to_string_maps_null_to_empty() {
        assert_eq!(cell_to_string(serde_json::Value::Null), "");
    }
}
