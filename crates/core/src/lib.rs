//! Shared types and state for the capforge compositing pipeline.
//!
//! Holds the pieces every other crate needs: the domain error type,
//! the rotation-cursor store, caption slug derivation, the supported
//! image-type allow-list, and per-installation configuration.

pub mod assets;
pub mod config;
pub mod cursor;
pub mod error;
pub mod slug;
