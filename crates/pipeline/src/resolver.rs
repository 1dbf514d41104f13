//! Asset pool resolution.
//!
//! Each of the two categories (background, overlay element) resolves to
//! an [`AssetSource`]: either an ordered remote pool the loop round-robins
//! through, or a single locally supplied override that was uploaded once
//! up front. A local override always wins over a named pool selection.

use std::path::PathBuf;

use capforge_core::assets::{filter_supported, RemoteAsset};
use capforge_imagehost::UploadedImage;
use capforge_sheets::tables::PoolEntry;

use crate::error::BatchError;

/// Caller's selection for one pool category.
#[derive(Debug, Clone, Default)]
pub struct PoolSelection {
    /// Path of a locally supplied override image. Takes precedence over
    /// any named pool.
    pub local_override: Option<PathBuf>,
    /// Name of a configured remote pool.
    pub pool_name: Option<String>,
}

impl PoolSelection {
    /// Selection naming a configured remote pool.
    pub fn pool(name: impl Into<String>) -> Self {
        Self {
            local_override: None,
            pool_name: Some(name.into()),
        }
    }

    /// Selection supplying a local file.
    pub fn local(path: impl Into<PathBuf>) -> Self {
        Self {
            local_override: Some(path.into()),
            pool_name: None,
        }
    }

    /// True when neither an override nor a pool name was supplied.
    pub fn is_empty(&self) -> bool {
        self.local_override.is_none() && self.pool_name.is_none()
    }
}

/// Resolved source the batch loop draws assets from.
#[derive(Debug, Clone)]
pub enum AssetSource {
    /// Ordered remote pool; assets are fetched and re-uploaded per
    /// iteration, selected by `cursor % len`.
    RemotePool {
        folder_id: String,
        assets: Vec<RemoteAsset>,
    },
    /// Single already-uploaded local image; every iteration reuses it.
    LocalOverride { uploaded: UploadedImage },
}

impl AssetSource {
    /// Pool size (a local override is a single-element pool).
    pub fn len(&self) -> usize {
        match self {
            AssetSource::RemotePool { assets, .. } => assets.len(),
            AssetSource::LocalOverride { .. } => 1,
        }
    }

    /// True when the pool has no assets (cannot happen post-resolution).
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Look up a named pool in the configured directory.
pub fn find_pool<'a>(pools: &'a [PoolEntry], name: &str) -> Result<&'a PoolEntry, BatchError> {
    pools
        .iter()
        .find(|p| p.name == name)
        .ok_or_else(|| BatchError::PoolNotFound(name.to_string()))
}

/// Apply the MIME allow-list to a folder listing and require a non-empty
/// result.
///
/// Unsupported types are excluded silently; only an entirely empty
/// outcome is an error.
pub fn build_remote_pool(
    folder_id: &str,
    listing: Vec<RemoteAsset>,
) -> Result<AssetSource, BatchError> {
    let assets = filter_supported(listing);
    if assets.is_empty() {
        return Err(BatchError::EmptyPool(folder_id.to_string()));
    }
    Ok(AssetSource::RemotePool {
        folder_id: folder_id.to_string(),
        assets,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn entry(name: &str, folder_id: &str) -> PoolEntry {
        PoolEntry {
            name: name.to_string(),
            folder_id: folder_id.to_string(),
        }
    }

    fn asset(name: &str, mime: &str) -> RemoteAsset {
        RemoteAsset {
            id: format!("id-{name}"),
            name: name.to_string(),
            mime_type: mime.to_string(),
        }
    }

    #[test]
    fn find_pool_matches_by_name() {
        let pools = vec![entry("Beach", "f1"), entry("City", "f2")];
        assert_eq!(find_pool(&pools, "City").unwrap().folder_id, "f2");
    }

    #[test]
    fn find_pool_unknown_name_errors() {
        let pools = vec![entry("Beach", "f1")];
        assert_matches!(find_pool(&pools, "Desert"), Err(BatchError::PoolNotFound(n)) if n == "Desert");
    }

    #[test]
    fn remote_pool_filters_unsupported_types() {
        let listing = vec![
            asset("a.png", "image/png"),
            asset("notes.txt", "text/plain"),
            asset("b.webp", "image/webp"),
        ];
        let source = build_remote_pool("f1", listing).unwrap();
        assert_eq!(source.len(), 2);
    }

    #[test]
    fn remote_pool_empty_after_filter_is_an_error() {
        let listing = vec![asset("movie.mp4", "video/mp4")];
        assert_matches!(
            build_remote_pool("f1", listing),
            Err(BatchError::EmptyPool(f)) if f == "f1"
        );
    }

    #[test]
    fn local_override_is_a_single_element_pool() {
        let source = AssetSource::LocalOverride {
            uploaded: UploadedImage {
                public_id: "custom".to_string(),
                width: 800,
                height: 600,
                format: "png".to_string(),
            },
        };
        assert_eq!(source.len(), 1);
        assert!(!source.is_empty());
    }
}
