//! Remote asset descriptors and the supported image-type allow-list.

use serde::{Deserialize, Serialize};

/// A single image file as listed in a cloud-drive folder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteAsset {
    /// Drive file identifier, used for binary fetches.
    pub id: String,
    /// Original filename, used as the upload name.
    pub name: String,
    /// MIME type as reported by the listing.
    pub mime_type: String,
}

/// JPEG image MIME type.
pub const MIME_JPEG: &str = "image/jpeg";
/// PNG image MIME type.
pub const MIME_PNG: &str = "image/png";
/// GIF image MIME type.
pub const MIME_GIF: &str = "image/gif";
/// BMP image MIME type.
pub const MIME_BMP: &str = "image/bmp";
/// WebP image MIME type.
pub const MIME_WEBP: &str = "image/webp";

/// MIME types accepted into an asset pool. Anything else is silently
/// excluded from the pool, never an error by itself.
pub const SUPPORTED_IMAGE_TYPES: &[&str] =
    &[MIME_JPEG, MIME_PNG, MIME_GIF, MIME_BMP, MIME_WEBP];

/// Whether a MIME type is on the supported allow-list.
pub fn is_supported_image(mime_type: &str) -> bool {
    SUPPORTED_IMAGE_TYPES.contains(&mime_type)
}

/// Drop assets whose MIME type is not on the allow-list, preserving order.
pub fn filter_supported(assets: Vec<RemoteAsset>) -> Vec<RemoteAsset> {
    assets
        .into_iter()
        .filter(|a| is_supported_image(&a.mime_type))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn asset(name: &str, mime: &str) -> RemoteAsset {
        RemoteAsset {
            id: format!("id-{name}"),
            name: name.to_string(),
            mime_type: mime.to_string(),
        }
    }

    #[test]
    fn allow_list_matches_expected_types() {
        for mime in ["image/jpeg", "image/png", "image/gif", "image/bmp", "image/webp"] {
            assert!(is_supported_image(mime), "{mime} should be supported");
        }
        assert!(!is_supported_image("image/tiff"));
        assert!(!is_supported_image("application/pdf"));
        assert!(!is_supported_image("video/mp4"));
    }

    #[test]
    fn filter_drops_unsupported_and_preserves_order() {
        let pool = vec![
            asset("a.png", MIME_PNG),
            asset("doc.pdf", "application/pdf"),
            asset("b.jpg", MIME_JPEG),
        ];
        let filtered = filter_supported(pool);
        let names: Vec<&str> = filtered.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, vec!["a.png", "b.jpg"]);
    }

    #[test]
    fn filter_of_unsupported_only_yields_empty() {
        let pool = vec![asset("clip.mp4", "video/mp4")];
        assert!(filter_supported(pool).is_empty());
    }
}
