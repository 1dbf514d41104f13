//! `capforge` -- batch image compositing from the command line.
//!
//! Reads the control-plane spreadsheet, gates on the license table, then
//! runs the compositing batch: one rendered WebP per caption line, written
//! to the chosen output directory.
//!
//! # Environment variables
//!
//! | Variable              | Required | Description                              |
//! |-----------------------|----------|------------------------------------------|
//! | `SPREADSHEET_ID`      | yes      | Control-plane spreadsheet identifier     |
//! | `GOOGLE_ACCESS_TOKEN` | yes      | OAuth bearer token (sheets + drive scope)|

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use capforge_core::config::{AppConfig, CURSOR_FILE_NAME};
use capforge_core::cursor::CursorStore;
use capforge_drive::DriveClient;
use capforge_imagehost::ImageHostClient;
use capforge_pipeline::collaborators::{HostUploader, OutputPicker, ProgressSink};
use capforge_pipeline::resolver::PoolSelection;
use capforge_pipeline::{BatchRequest, BatchRunner, ControlData, LicenseSession};
use capforge_sheets::tables::DEFAULT_AD_TEXT;
use capforge_sheets::SheetsClient;

#[derive(Debug, Parser)]
#[command(name = "capforge", about = "Batch image compositing tool")]
struct Cli {
    /// Licensed email address.
    #[arg(long)]
    email: String,

    /// URL of the logo image stamped on every composite.
    #[arg(long)]
    logo_url: String,

    /// Caption lines, inline (one caption per line).
    #[arg(long, conflicts_with = "captions_file")]
    captions: Option<String>,

    /// File containing the caption lines.
    #[arg(long)]
    captions_file: Option<PathBuf>,

    /// Produce a single captionless composite.
    #[arg(long)]
    skip_content: bool,

    /// Hosting account name (column M of the account directory).
    #[arg(long)]
    server: String,

    /// Background pool name (column R of the pool directory).
    #[arg(long, conflicts_with = "background_file")]
    background_pool: Option<String>,

    /// Local background image overriding any pool.
    #[arg(long)]
    background_file: Option<PathBuf>,

    /// Overlay element pool name (column J of the pool directory).
    #[arg(long, conflicts_with_all = ["element_file", "skip_element"])]
    element_pool: Option<String>,

    /// Local overlay image overriding any pool.
    #[arg(long, conflicts_with = "skip_element")]
    element_file: Option<PathBuf>,

    /// Render without an overlay element.
    #[arg(long)]
    skip_element: bool,

    /// Directory the composites are written to.
    #[arg(long)]
    output_dir: PathBuf,

    /// Explicit config file path (defaults to the platform data dir).
    #[arg(long)]
    config: Option<PathBuf>,
}

/// Output "picker" for a terminal run: the directory came from the CLI.
struct FixedOutputDir(PathBuf);

impl OutputPicker for FixedOutputDir {
    fn pick_output_dir(&self) -> Option<PathBuf> {
        Some(self.0.clone())
    }
}

/// Status lines and a percentage counter on stdout.
struct TerminalProgress;

impl ProgressSink for TerminalProgress {
    fn status(&self, message: &str) {
        println!("{message}");
    }

    fn progress(&self, fraction: f64) {
        println!("  {:>3.0}%", fraction * 100.0);
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "capforge=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => AppConfig::load(path)?,
        None => AppConfig::load_default()?,
    };

    let spreadsheet_id =
        std::env::var("SPREADSHEET_ID").context("SPREADSHEET_ID must be set")?;
    let access_token =
        std::env::var("GOOGLE_ACCESS_TOKEN").context("GOOGLE_ACCESS_TOKEN must be set")?;

    // One connection pool shared across all three service clients.
    let http = reqwest::Client::new();
    let sheets = SheetsClient::with_client(http.clone(), spreadsheet_id, access_token.clone());
    let drive = DriveClient::with_client(http.clone(), access_token);
    let host = HostUploader::new(
        ImageHostClient::with_client(http),
        config.upload_preset.clone(),
    );

    // The ad slots are best-effort; a fetch failure never blocks the run.
    match sheets.load_ad_text().await {
        Ok(ad) => println!("* {}", ad.text),
        Err(error) => {
            tracing::debug!(%error, "Ad text unavailable");
            println!("* {DEFAULT_AD_TEXT}");
        }
    }
    if let Ok(banner) = sheets.load_ad_banner().await {
        if !banner.image_url.is_empty() {
            println!("* {} ({})", banner.image_url, banner.click_url);
        }
    }

    let control = ControlData {
        servers: sheets
            .load_server_profiles()
            .await
            .context("Failed to load hosting accounts")?,
        background_pools: sheets
            .load_background_pools()
            .await
            .context("Failed to load background pools")?,
        element_pools: sheets
            .load_element_pools()
            .await
            .context("Failed to load overlay pools")?,
    };

    let captions = match (&cli.captions, &cli.captions_file) {
        (Some(text), _) => text.clone(),
        (None, Some(path)) => tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Cannot read captions from {}", path.display()))?,
        (None, None) => String::new(),
    };

    let request = BatchRequest {
        email: cli.email,
        logo_url: cli.logo_url,
        captions,
        skip_content: cli.skip_content,
        skip_element: cli.skip_element,
        server_name: cli.server,
        background: selection(cli.background_file, cli.background_pool),
        element: selection(cli.element_file, cli.element_pool),
    };

    tokio::fs::create_dir_all(&cli.output_dir)
        .await
        .with_context(|| format!("Cannot create {}", cli.output_dir.display()))?;

    let data_dir = AppConfig::data_dir()?;
    let cursor_store = CursorStore::new(data_dir.join(CURSOR_FILE_NAME));
    let output_picker = FixedOutputDir(cli.output_dir);

    let runner = BatchRunner {
        license_store: &sheets,
        image_store: &drive,
        image_host: &host,
        output_picker: &output_picker,
        progress: &TerminalProgress,
        cursor_store: &cursor_store,
    };

    let mut session = LicenseSession::new();
    let outcome = runner.run(&mut session, &request, &control).await?;

    println!(
        "Done: {} file(s) in {}",
        outcome.files_written,
        outcome.output_dir.display()
    );
    if let Some((_, grant)) = session.grant() {
        if let Some(expiry) = &grant.expiry_text {
            println!("License valid until {expiry}");
        }
    }

    if outcome.trial_exhausted {
        println!("Trial complete. Contact support for a license.");
        std::process::exit(0);
    }

    Ok(())
}

/// Fold the two mutually exclusive CLI options into a pool selection.
fn selection(file: Option<PathBuf>, pool: Option<String>) -> PoolSelection {
    match (file, pool) {
        (Some(path), _) => PoolSelection::local(path),
        (None, Some(name)) => PoolSelection::pool(name),
        (None, None) => PoolSelection::default(),
    }
}
