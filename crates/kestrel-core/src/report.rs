use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::PathBuf;

/// What one finished capture step looked like, for human or JSON output.
#[derive(Debug, Clone, Serialize)]
pub struct CaptureReport {
    /// Step name (the output file stem for single captures)
    pub name: String,
    /// Target URL that was loaded
    pub url: String,
    /// HTTP status of the main document response, when observed
    pub status: Option<u16>,
    /// Wall-clock navigation time in milliseconds
    pub nav_ms: u64,
    /// Wall-clock settle time in milliseconds
    pub settle_ms: u64,
    /// False when the settle bound was hit before the page went quiet
    pub settled: bool,
    /// Artifact path the screenshot was written to
    pub output: PathBuf,
    /// Artifact size in bytes
    pub bytes: u64,
    pub captured_at: DateTime<Utc>,
}
