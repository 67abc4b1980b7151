use crate::locator::Locator;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use url::Url;

/// Target the tool points at when no URL is given: a locally running dev server
pub const DEFAULT_URL: &str = "http://localhost:5173/";
/// Artifact path used when no output is given; overwritten on every run
pub const DEFAULT_OUTPUT: &str = "jules-scratch/verification/01-home-page-animation.png";
/// Upper bound on the settle phase, in milliseconds
pub const DEFAULT_SETTLE_MS: u64 = 5_000;
/// Quiet window the stable wait requires before declaring the page settled
pub const DEFAULT_QUIET_MS: u64 = 500;
/// Navigation timeout, in milliseconds
pub const DEFAULT_NAV_TIMEOUT_MS: u64 = 30_000;
/// Element visibility timeout, in milliseconds
pub const DEFAULT_ELEMENT_TIMEOUT_MS: u64 = 5_000;

/// How a capture decides the page has stopped moving.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WaitStrategy {
    /// Wait until no animation is running and the DOM stayed quiet for a
    /// window of `quiet_ms`, bounded by `settle_ms`.
    #[default]
    Stable,
    /// Sleep for exactly `settle_ms`. Heuristic upper bound, no early exit.
    Fixed,
}

/// Window dimensions for the headless browser.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
        }
    }
}

impl FromStr for Viewport {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let (w, h) = s.split_once(|c| c == 'x' || c == 'X').ok_or_else(|| {
            Error::InvalidConfig(format!("viewport must look like 1280x720, got: {}", s))
        })?;

        let width: u32 = w
            .trim()
            .parse()
            .map_err(|_| Error::InvalidConfig(format!("bad viewport width: {}", w)))?;
        let height: u32 = h
            .trim()
            .parse()
            .map_err(|_| Error::InvalidConfig(format!("bad viewport height: {}", h)))?;

        if width == 0 || height == 0 {
            return Err(Error::InvalidConfig(
                "viewport dimensions must be non-zero".to_string(),
            ));
        }

        Ok(Self { width, height })
    }
}

impl fmt::Display for Viewport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Everything one capture needs, as an explicit record with defaults that
/// reproduce a bare `kestrel capture` invocation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptureConfig {
    /// Target URL; the server behind it is expected to already be running
    pub url: String,
    /// PNG artifact path; parent directories are created, the file overwritten
    pub output: PathBuf,
    /// Element that must be uniquely visible before the capture proceeds
    pub selector: Locator,
    /// How to wait for the page to stop moving
    pub wait: WaitStrategy,
    /// Settle bound in milliseconds (exact sleep under `WaitStrategy::Fixed`)
    pub settle_ms: u64,
    /// Quiet window for `WaitStrategy::Stable`, in milliseconds
    pub quiet_ms: u64,
    /// Navigation timeout in milliseconds
    pub nav_timeout_ms: u64,
    /// Element visibility timeout in milliseconds
    pub element_timeout_ms: u64,
    /// Capture the full scrollable page instead of the viewport
    pub full_page: bool,
    /// Headless window size
    pub viewport: Viewport,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_URL.to_string(),
            output: PathBuf::from(DEFAULT_OUTPUT),
            selector: Locator::default(),
            wait: WaitStrategy::default(),
            settle_ms: DEFAULT_SETTLE_MS,
            quiet_ms: DEFAULT_QUIET_MS,
            nav_timeout_ms: DEFAULT_NAV_TIMEOUT_MS,
            element_timeout_ms: DEFAULT_ELEMENT_TIMEOUT_MS,
            full_page: false,
            viewport: Viewport::default(),
        }
    }
}

impl CaptureConfig {
    /// Reject configurations a run could not execute
    pub fn validate(&self) -> Result<()> {
        let url = Url::parse(&self.url)
            .map_err(|e| Error::InvalidConfig(format!("bad target URL {}: {}", self.url, e)))?;
        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(Error::InvalidConfig(format!(
                "target URL must be http or https, got: {}",
                self.url
            )));
        }

        self.selector.validate()?;

        if self.output.as_os_str().is_empty() {
            return Err(Error::InvalidConfig(
                "output path must not be empty".to_string(),
            ));
        }
        if self.quiet_ms == 0 {
            return Err(Error::InvalidConfig(
                "quiet window must be non-zero".to_string(),
            ));
        }
        if self.quiet_ms > self.settle_ms {
            return Err(Error::InvalidConfig(format!(
                "quiet window ({}ms) cannot exceed the settle bound ({}ms)",
                self.quiet_ms, self.settle_ms
            )));
        }

        Ok(())
    }
}
