//! The batch orchestrator.
//!
//! One batch runs to completion before another can start; there is no
//! parallel fan-out across caption lines. Uploads for line `i + 1` never
//! begin before line `i`'s output file is written. The only mutable
//! shared resource is the rotation-cursor file, touched exactly once at
//! the end of a clean run.

use std::path::PathBuf;

use capforge_core::cursor::{CursorStore, RotationCursor};
use capforge_core::slug::caption_slug;
use capforge_imagehost::{TransformChain, UploadedImage};
use capforge_sheets::tables::{PoolEntry, ServerProfile};

use crate::collaborators::{ImageHost, ImageStore, OutputPicker, ProgressSink};
use crate::error::BatchError;
use crate::license::{LicenseSession, LicenseStore};
use crate::resolver::{build_remote_pool, find_pool, AssetSource, PoolSelection};

/// Caller inputs for one batch run.
#[derive(Debug, Clone, Default)]
pub struct BatchRequest {
    /// Licensed email address.
    pub email: String,
    /// URL of the logo image to stamp on every composite.
    pub logo_url: String,
    /// Raw caption text, one caption per line.
    pub captions: String,
    /// Skip caption text entirely (single placeholder composite).
    pub skip_content: bool,
    /// Skip the overlay element entirely.
    pub skip_element: bool,
    /// Name of the hosting account to upload through.
    pub server_name: String,
    /// Background selection (mandatory, no skip option).
    pub background: PoolSelection,
    /// Overlay element selection (ignored when `skip_element`).
    pub element: PoolSelection,
}

/// Control-plane data loaded from the sheet once at startup.
#[derive(Debug, Clone, Default)]
pub struct ControlData {
    pub servers: Vec<ServerProfile>,
    pub background_pools: Vec<PoolEntry>,
    pub element_pools: Vec<PoolEntry>,
}

/// Result of a completed batch.
#[derive(Debug)]
pub struct BatchOutcome {
    /// Directory the composites were written to.
    pub output_dir: PathBuf,
    /// Number of files written.
    pub files_written: usize,
    /// True when this run consumed the one-shot trial; the shell is
    /// expected to terminate the process.
    pub trial_exhausted: bool,
}

/// Orchestrator wiring: every external collaborator behind a seam.
pub struct BatchRunner<'a> {
    pub license_store: &'a dyn LicenseStore,
    pub image_store: &'a dyn ImageStore,
    pub image_host: &'a dyn ImageHost,
    pub output_picker: &'a dyn OutputPicker,
    pub progress: &'a dyn ProgressSink,
    pub cursor_store: &'a CursorStore,
}

/// Split raw caption input into the batch's caption lines.
///
/// Lines are trimmed and blank lines dropped. Skipping content yields a
/// single empty placeholder line so the loop still runs once.
pub fn caption_batch(raw: &str, skip_content: bool) -> Vec<String> {
    if skip_content {
        return vec![String::new()];
    }
    raw.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

impl BatchRunner<'_> {
    /// Run one batch end to end.
    ///
    /// Progression: validate inputs, check the license, resolve pools,
    /// obtain the output directory, then loop over caption lines. Any
    /// failure inside the loop aborts the remaining iterations and leaves
    /// the persisted cursor at its pre-batch value.
    pub async fn run(
        &self,
        session: &mut LicenseSession,
        request: &BatchRequest,
        control: &ControlData,
    ) -> Result<BatchOutcome, BatchError> {
        // -- ValidatingInputs: nothing remote happens before these pass.
        let email = request.email.trim();
        if email.is_empty() {
            return Err(BatchError::MissingEmail);
        }
        if request.logo_url.trim().is_empty() {
            return Err(BatchError::MissingLogoUrl);
        }
        let mut captions = caption_batch(&request.captions, request.skip_content);
        if captions.is_empty() {
            return Err(BatchError::MissingCaptions);
        }

        // -- CheckingLicense
        self.progress.status("Checking email...");
        let grant = session.check(email, self.license_store).await?;
        if grant.is_trial() {
            self.progress.status("Trial run: one image only");
            captions.truncate(1);
        } else {
            self.progress.status("Running...");
        }

        let account = control
            .servers
            .iter()
            .find(|s| s.name == request.server_name)
            .ok_or_else(|| BatchError::ServerNotFound(request.server_name.clone()))?;

        // -- ResolvingPools
        let background = self
            .resolve_background(&request.background, &control.background_pools, account)
            .await?;
        let element = if request.skip_element {
            None
        } else {
            Some(
                self.resolve_element(&request.element, &control.element_pools, account)
                    .await?,
            )
        };

        let start_cursor = self.cursor_store.load()?;
        let mut background_index = start_cursor.background_index;
        let mut element_index = start_cursor.element_index;

        // -- SelectingOutputLocation: the one cancelable step.
        let output_dir = self
            .output_picker
            .pick_output_dir()
            .ok_or(BatchError::OutputCanceled)?;

        // -- Looping
        let total = captions.len();
        for (i, content) in captions.iter().enumerate() {
            // The bar shows the line being worked on, not lines finished.
            self.progress.progress((i + 1) as f64 / total as f64);

            let slug = caption_slug(content);
            tracing::info!(line = i + 1, total, slug = %slug, "Processing caption");

            let background_res = self
                .resolve_iteration_image(&background, background_index, account)
                .await?;

            let element_res = match &element {
                Some(source) => Some(
                    self.resolve_iteration_image(source, element_index, account)
                        .await?,
                ),
                None => None,
            };

            // The logo is re-fetched and re-uploaded every iteration; the
            // host-side public id is needed fresh per transform.
            let logo_bytes = self.image_host.fetch_url(request.logo_url.trim()).await?;
            let logo_res = self
                .image_host
                .upload(logo_bytes, "logo.png", account)
                .await?;

            let mut chain = TransformChain::new(&account.cloud_name, &background_res.public_id)
                .logo(&logo_res.public_id);
            if let Some(el) = &element_res {
                chain = chain.element(&el.public_id, background_res.width, background_res.height);
            }
            if !request.skip_content {
                chain = chain.caption(content);
            }
            let url = chain.build();
            tracing::debug!(url = %url, "Fetching rendered composite");

            let rendered = self.image_host.fetch_rendered(&url).await?;
            let output_path = output_dir.join(format!("{slug}-{i}.webp"));
            tokio::fs::write(&output_path, rendered).await?;
            tracing::info!(path = %output_path.display(), "Saved composite");

            background_index += 1;
            if element.is_some() {
                element_index += 1;
            }
        }

        // -- Persisting: post-modulo values only, and only after a clean
        // loop; a mid-loop failure never reaches this point.
        let final_cursor = RotationCursor {
            background_index: background_index % background.len() as u64,
            element_index: match &element {
                Some(source) => element_index % source.len() as u64,
                None => start_cursor.element_index,
            },
        };
        self.cursor_store.save(&final_cursor)?;

        Ok(BatchOutcome {
            output_dir,
            files_written: total,
            trial_exhausted: grant.is_trial(),
        })
    }

    /// Resolve the background source; its absence is an error since the
    /// background has no skip option.
    async fn resolve_background(
        &self,
        selection: &PoolSelection,
        pools: &[PoolEntry],
        account: &ServerProfile,
    ) -> Result<AssetSource, BatchError> {
        if let Some(path) = &selection.local_override {
            return self.upload_override(path, account).await;
        }
        match &selection.pool_name {
            Some(name) => self.resolve_remote(name, pools).await,
            None => Err(BatchError::MissingBackground),
        }
    }

    /// Resolve the overlay element source (caller has already handled the
    /// skip case).
    async fn resolve_element(
        &self,
        selection: &PoolSelection,
        pools: &[PoolEntry],
        account: &ServerProfile,
    ) -> Result<AssetSource, BatchError> {
        if let Some(path) = &selection.local_override {
            return self.upload_override(path, account).await;
        }
        match &selection.pool_name {
            Some(name) => self.resolve_remote(name, pools).await,
            None => Err(BatchError::MissingElement),
        }
    }

    /// Upload a local override file once; it becomes a one-element pool.
    async fn upload_override(
        &self,
        path: &std::path::Path,
        account: &ServerProfile,
    ) -> Result<AssetSource, BatchError> {
        let bytes = tokio::fs::read(path).await?;
        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "override.png".to_string());
        let uploaded = self.image_host.upload(bytes, &filename, account).await?;
        Ok(AssetSource::LocalOverride { uploaded })
    }

    /// Resolve a named remote pool to its filtered folder listing.
    async fn resolve_remote(
        &self,
        name: &str,
        pools: &[PoolEntry],
    ) -> Result<AssetSource, BatchError> {
        let entry = find_pool(pools, name)?;
        let listing = self.image_store.list_folder(&entry.folder_id).await?;
        build_remote_pool(&entry.folder_id, listing)
    }

    /// Produce the iteration's host-side image for one source.
    ///
    /// Remote assets are re-fetched and re-uploaded every iteration, even
    /// when the same file recurs within a batch; a local override reuses
    /// its single up-front upload.
    async fn resolve_iteration_image(
        &self,
        source: &AssetSource,
        cursor: u64,
        account: &ServerProfile,
    ) -> Result<UploadedImage, BatchError> {
        match source {
            AssetSource::LocalOverride { uploaded } => Ok(uploaded.clone()),
            AssetSource::RemotePool { assets, .. } => {
                let asset = &assets[(cursor % assets.len() as u64) as usize];
                let bytes = self.image_store.fetch_binary(&asset.id).await?;
                self.image_host.upload(bytes, &asset.name, account).await
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn caption_batch_trims_and_drops_blank_lines() {
        let captions = caption_batch("  first \n\n second\n   \n", false);
        assert_eq!(captions, vec!["first".to_string(), "second".to_string()]);
    }

    #[test]
    fn caption_batch_empty_input_is_empty() {
        assert!(caption_batch("\n  \n", false).is_empty());
    }

    #[test]
    fn skip_content_yields_single_placeholder() {
        let captions = caption_batch("ignored\nlines", true);
        assert_eq!(captions, vec![String::new()]);
    }
}
