//! Image-host client: binary upload and server-side transformation.
//!
//! The host does all compositing. We upload the raw background, overlay,
//! and logo, then build a transformation URL whose path encodes the
//! overlay chain; fetching that URL returns the rendered WebP.

pub mod client;
pub mod transform;

pub use client::{ImageHostClient, ImageHostError, UploadedImage};
pub use transform::TransformChain;
