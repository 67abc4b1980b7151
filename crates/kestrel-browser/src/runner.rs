use crate::{PageDriver, Result};
use kestrel_core::artifact;
use kestrel_core::config::CaptureConfig;
use kestrel_core::report::CaptureReport;
use std::time::{Duration, Instant};

/// Drive one capture over an open page: navigate, verify the target element
/// is uniquely visible, let the page settle, then persist the screenshot.
///
/// Strictly linear; any failure aborts the step and propagates. Nothing is
/// written unless the screenshot was taken, so a failed run leaves a stale
/// artifact from an earlier run untouched.
pub async fn run_capture(
    driver: &PageDriver,
    name: &str,
    config: &CaptureConfig,
) -> Result<CaptureReport> {
    let nav_started = Instant::now();
    let status = driver
        .navigate(&config.url, Duration::from_millis(config.nav_timeout_ms))
        .await?;
    let nav_ms = nav_started.elapsed().as_millis() as u64;

    driver
        .await_unique_visible(
            &config.selector,
            Duration::from_millis(config.element_timeout_ms),
        )
        .await?;

    let settle_started = Instant::now();
    let settled = driver
        .settle(
            config.wait,
            Duration::from_millis(config.settle_ms),
            Duration::from_millis(config.quiet_ms),
        )
        .await?;
    let settle_ms = settle_started.elapsed().as_millis() as u64;

    let bytes = driver.screenshot(config.full_page).await?;
    artifact::write_png(&config.output, &bytes)?;

    Ok(CaptureReport {
        name: name.to_string(),
        url: config.url.clone(),
        status,
        nav_ms,
        settle_ms,
        settled,
        output: config.output.clone(),
        bytes: bytes.len() as u64,
        captured_at: chrono::Utc::now(),
    })
}
