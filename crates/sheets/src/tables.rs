//! Typed readers for the control-plane tables.
//!
//! Column layout of the sheet (single tab, fixed ranges):
//!
//! | Range    | Contents                                          |
//! |----------|---------------------------------------------------|
//! | `B1:F`   | License table: B email, C expiry, F used marker   |
//! | `G1`     | Ad text, with optional `[marquee]`/`[color]` tags |
//! | `G2:G3`  | Ad banner image URL / click-through URL           |
//! | `J2:K`   | Overlay pools: name, drive folder id              |
//! | `M2:P`   | Hosting accounts: name, cloud name, key, secret   |
//! | `R2:S`   | Background pools: name, drive folder id           |
//!
//! Row parsing is split from I/O so the shape rules are unit-testable.

use serde::{Deserialize, Serialize};

use crate::client::{SheetsClient, SheetsError};

/// License table range (read and written back wholesale).
pub const RANGE_LICENSE: &str = "Sheet1!B1:F";
/// Ad text cell.
pub const RANGE_AD_TEXT: &str = "Sheet1!G1";
/// Ad banner image URL and click-through URL cells.
pub const RANGE_AD_BANNER: &str = "Sheet1!G2:G3";
/// Overlay pool directory range.
pub const RANGE_ELEMENT_POOLS: &str = "Sheet1!J2:K";
/// Hosting account directory range.
pub const RANGE_SERVERS: &str = "Sheet1!M2:P";
/// Background pool directory range.
pub const RANGE_BACKGROUND_POOLS: &str = "Sheet1!R2:S";

/// Ad text shown when the sheet has none or the fetch fails.
pub const DEFAULT_AD_TEXT: &str = "Contact support to order";

// ---------------------------------------------------------------------------
// Row types
// ---------------------------------------------------------------------------

/// One row of the license table.
///
/// Write-back does not go through this type: `mark_license_used`
/// re-fetches the raw range and locates the row by email.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LicenseRow {
    /// Licensed email address (column B), trimmed.
    pub email: String,
    /// Expiry date as displayed in the sheet (column C), may be empty.
    pub expiry: String,
    /// Used marker (column F); non-empty means the license is claimed.
    pub used_marker: String,
}

/// A named pool pointing at a drive folder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolEntry {
    pub name: String,
    pub folder_id: String,
}

/// An image-hosting account, selected once per batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerProfile {
    pub name: String,
    pub cloud_name: String,
    pub api_key: String,
    pub api_secret: String,
}

/// Ad text with its display-style tags parsed out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdText {
    pub text: String,
    pub marquee: bool,
    pub color: bool,
}

/// Ad banner content (both fields may be empty).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AdBanner {
    pub image_url: String,
    pub click_url: String,
}

// ---------------------------------------------------------------------------
// Pure row parsers
// ---------------------------------------------------------------------------

/// Cell at `index`, trimmed, or empty when the row is short.
fn cell(row: &[String], index: usize) -> String {
    row.get(index).map(|c| c.trim().to_string()).unwrap_or_default()
}

/// Parse license rows from the `B1:F` range.
///
/// Rows with a blank email are dropped; they can never match a lookup
/// and write-back works off the raw range, not these rows.
pub fn parse_license_rows(values: &[Vec<String>]) -> Vec<LicenseRow> {
    values
        .iter()
        .map(|row| LicenseRow {
            email: cell(row, 0),
            expiry: cell(row, 2),
            used_marker: cell(row, 4),
        })
        .filter(|row| !row.email.is_empty())
        .collect()
}

/// Parse name/folder-id pairs; rows missing either column are dropped.
pub fn parse_pool_entries(values: &[Vec<String>]) -> Vec<PoolEntry> {
    values
        .iter()
        .filter_map(|row| {
            let name = cell(row, 0);
            let folder_id = cell(row, 1);
            (!name.is_empty() && !folder_id.is_empty())
                .then_some(PoolEntry { name, folder_id })
        })
        .collect()
}

/// Parse hosting-account rows; rows missing any of the four columns are
/// dropped.
pub fn parse_server_profiles(values: &[Vec<String>]) -> Vec<ServerProfile> {
    values
        .iter()
        .filter_map(|row| {
            let profile = ServerProfile {
                name: cell(row, 0),
                cloud_name: cell(row, 1),
                api_key: cell(row, 2),
                api_secret: cell(row, 3),
            };
            let complete = !profile.name.is_empty()
                && !profile.cloud_name.is_empty()
                && !profile.api_key.is_empty()
                && !profile.api_secret.is_empty();
            complete.then_some(profile)
        })
        .collect()
}

/// Strip `[marquee]` and `[color]` tags out of the ad text, recording
/// which were present. Empty input falls back to [`DEFAULT_AD_TEXT`].
pub fn parse_ad_text(raw: &str) -> AdText {
    let marquee = raw.contains("[marquee]");
    let color = raw.contains("[color]");
    let text = raw
        .replacen("[marquee]", "", 1)
        .replacen("[color]", "", 1)
        .trim()
        .to_string();
    let text = if text.is_empty() {
        DEFAULT_AD_TEXT.to_string()
    } else {
        text
    };
    AdText { text, marquee, color }
}

// ---------------------------------------------------------------------------
// Typed fetchers
// ---------------------------------------------------------------------------

impl SheetsClient {
    /// Fetch and parse the full license table.
    pub async fn load_license_rows(&self) -> Result<Vec<LicenseRow>, SheetsError> {
        let values = self.get_values(RANGE_LICENSE).await?;
        Ok(parse_license_rows(&values))
    }

    /// Set the used marker of one license row and write the table back.
    ///
    /// Mirrors the read shape: the whole `B1:F{n}` block is refetched,
    /// mutated in memory, and overwritten. The read and the write are not
    /// atomic with the caller's earlier license check; that window is a
    /// known property of the design, not something this method closes.
    pub async fn mark_license_used(&self, email: &str) -> Result<(), SheetsError> {
        let mut values = self.get_values(RANGE_LICENSE).await?;
        let row = values
            .iter_mut()
            .find(|row| row.first().map(|c| c.trim()) == Some(email))
            .ok_or_else(|| SheetsError::Shape(format!("No license row for {email}")))?;

        // Column F is the 5th cell of the B:F block; pad short rows.
        while row.len() < 5 {
            row.push(String::new());
        }
        row[4] = email.to_string();

        let range = format!("Sheet1!B1:F{}", values.len());
        self.update_values(&range, &values).await
    }

    /// Fetch the background pool directory (`R2:S`).
    pub async fn load_background_pools(&self) -> Result<Vec<PoolEntry>, SheetsError> {
        let values = self.get_values(RANGE_BACKGROUND_POOLS).await?;
        Ok(parse_pool_entries(&values))
    }

    /// Fetch the overlay pool directory (`J2:K`).
    pub async fn load_element_pools(&self) -> Result<Vec<PoolEntry>, SheetsError> {
        let values = self.get_values(RANGE_ELEMENT_POOLS).await?;
        Ok(parse_pool_entries(&values))
    }

    /// Fetch the hosting-account directory (`M2:P`).
    pub async fn load_server_profiles(&self) -> Result<Vec<ServerProfile>, SheetsError> {
        let values = self.get_values(RANGE_SERVERS).await?;
        Ok(parse_server_profiles(&values))
    }

    /// Fetch the ad text cell, parsing out style tags.
    pub async fn load_ad_text(&self) -> Result<AdText, SheetsError> {
        let values = self.get_values(RANGE_AD_TEXT).await?;
        let raw = values
            .first()
            .and_then(|row| row.first())
            .cloned()
            .unwrap_or_default();
        Ok(parse_ad_text(&raw))
    }

    /// Fetch the ad banner URLs (`G2:G3`).
    pub async fn load_ad_banner(&self) -> Result<AdBanner, SheetsError> {
        let values = self.get_values(RANGE_AD_BANNER).await?;
        let first = |i: usize| -> String {
            values
                .get(i)
                .and_then(|row: &Vec<String>| row.first())
                .cloned()
                .unwrap_or_default()
        };
        Ok(AdBanner {
            image_url: first(0),
            click_url: first(1),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rows(data: &[&[&str]]) -> Vec<Vec<String>> {
        data.iter()
            .map(|row| row.iter().map(|c| c.to_string()).collect())
            .collect()
    }

    #[test]
    fn license_rows_map_columns_b_c_f() {
        let values = rows(&[
            &["a@x.com", "x", "2026-01-01", "y", ""],
            &["b@x.com", "", "2025-06-30", "", "b@x.com"],
        ]);
        let parsed = parse_license_rows(&values);
        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed[0].email, "a@x.com");
        assert_eq!(parsed[0].expiry, "2026-01-01");
        assert_eq!(parsed[0].used_marker, "");
        assert_eq!(parsed[1].used_marker, "b@x.com");
    }

    #[test]
    fn license_rows_drop_blank_emails() {
        let values = rows(&[
            &["a@x.com", "", "2026-01-01", "", ""],
            &["", "", "2026-01-01", "", ""],
            &["b@x.com"],
        ]);
        let rows = parse_license_rows(&values);
        let emails: Vec<&str> = rows.iter().map(|r| r.email.as_str()).collect();
        assert_eq!(emails, vec!["a@x.com", "b@x.com"]);
    }

    #[test]
    fn license_rows_tolerate_short_rows() {
        let values = rows(&[&["a@x.com"]]);
        let parsed = parse_license_rows(&values);
        assert_eq!(parsed[0].expiry, "");
        assert_eq!(parsed[0].used_marker, "");
    }

    #[test]
    fn pool_entries_drop_incomplete_rows() {
        let values = rows(&[
            &["Beach", "folder-1"],
            &["", "folder-2"],
            &["City", ""],
            &["Forest", "folder-3"],
        ]);
        let parsed = parse_pool_entries(&values);
        let names: Vec<&str> = parsed.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["Beach", "Forest"]);
    }

    #[test]
    fn server_profiles_require_all_four_columns() {
        let values = rows(&[
            &["main", "cloud-a", "key-1", "secret-1"],
            &["broken", "cloud-b", "key-2"],
        ]);
        let parsed = parse_server_profiles(&values);
        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed[0].name, "main");
        assert_eq!(parsed[0].cloud_name, "cloud-a");
    }

    #[test]
    fn ad_text_strips_tags_and_records_flags() {
        let parsed = parse_ad_text("[marquee][color] Big sale today ");
        assert_eq!(parsed.text, "Big sale today");
        assert!(parsed.marquee);
        assert!(parsed.color);
    }

    #[test]
    fn ad_text_without_tags() {
        let parsed = parse_ad_text("Plain message");
        assert_eq!(parsed.text, "Plain message");
        assert!(!parsed.marquee);
        assert!(!parsed.color);
    }

    #[test]
    fn empty_ad_text_falls_back_to_default() {
        let parsed = parse_ad_text("  ");
        assert_eq!(parsed.text, DEFAULT_AD_TEXT);
    }
}
