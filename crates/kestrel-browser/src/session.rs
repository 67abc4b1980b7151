use crate::{Error, Result};
use chromiumoxide::browser::Browser;
use chromiumoxide::cdp::browser_protocol::network::{
    EnableParams, EventResponseReceived, ResourceType,
};
use chromiumoxide::cdp::browser_protocol::page::CaptureScreenshotFormat;
use chromiumoxide::page::{Page, ScreenshotParams};
use futures::StreamExt;
use kestrel_core::config::WaitStrategy;
use kestrel_core::locator::Locator;
use serde::Deserialize;
use std::process::Child;
use std::time::{Duration, Instant};
use tokio::task::JoinHandle;

const POLL_INTERVAL: Duration = Duration::from_millis(250);

/// A connected CDP session wrapping the Chrome child process.
///
/// Teardown is guaranteed: `shutdown` closes the browser gracefully, and
/// `Drop` kills a child that is still running on any other exit path.
pub struct BrowserSession {
    browser: Browser,
    handler_task: JoinHandle<()>,
    chrome: Child,
}

impl BrowserSession {
    /// Attach to a Chrome process already listening on `debugging_port`.
    ///
    /// On connection failure the child is killed before the error is
    /// returned; a half-launched browser must not outlive the session.
    pub async fn connect(mut chrome: Child, debugging_port: u16) -> Result<Self> {
        let ws_url = format!("http://localhost:{}", debugging_port);

        // Chrome may not be ready to accept CDP connections yet
        let (browser, mut handler) = {
            let mut retries = 5;
            loop {
                tracing::debug!("Attempting CDP connection to {}...", ws_url);
                match Browser::connect(&ws_url).await {
                    Ok(result) => {
                        tracing::info!("CDP connection established");
                        break result;
                    }
                    Err(e) => {
                        retries -= 1;
                        if retries == 0 {
                            let _ = chrome.kill();
                            let _ = chrome.wait();
                            return Err(Error::Cdp(format!(
                                "Failed to connect to Chrome after 5 attempts: {}",
                                e
                            )));
                        }
                        tracing::debug!("CDP connection attempt failed, retrying... ({} left)", retries);
                        tokio::time::sleep(Duration::from_millis(500)).await;
                    }
                }
            }
        };

        // The handler task must run for any browser command to complete
        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    // Some CDP events are not fully parseable; keep going
                    tracing::debug!("CDP handler event error (continuing): {}", e);
                }
            }
        });

        Ok(Self {
            browser,
            handler_task,
            chrome,
        })
    }

    /// Open the page a capture will drive, with network events enabled
    pub async fn new_page(&self) -> Result<PageDriver> {
        // Give Chrome a moment to create its initial target
        tokio::time::sleep(Duration::from_millis(500)).await;

        let page = if let Some(page) = self.browser.pages().await?.first() {
            tracing::debug!("Reusing Chrome's initial page");
            page.clone()
        } else {
            tracing::debug!("No existing pages, creating a new one");
            self.browser.new_page("about:blank").await?
        };

        page.execute(EnableParams::default()).await?;

        Ok(PageDriver { page })
    }

    /// Graceful teardown. Consuming `self` keeps the release single-shot;
    /// the `Drop` backstop sees an already-reaped child and does nothing.
    pub async fn shutdown(mut self) {
        if let Err(e) = self.browser.close().await {
            tracing::debug!("Browser close failed, killing the process: {}", e);
        }
        self.handler_task.abort();
        let _ = self.chrome.kill();
        let _ = self.chrome.wait();
    }
}

impl Drop for BrowserSession {
    fn drop(&mut self) {
        self.handler_task.abort();
        if let Ok(None) = self.chrome.try_wait() {
            tracing::debug!("Chrome still running at session drop, killing it");
            let _ = self.chrome.kill();
            let _ = self.chrome.wait();
        }
    }
}

/// Drives one page through the capture sequence
pub struct PageDriver {
    page: Page,
}

#[derive(Debug, Deserialize)]
struct ElementProbe {
    total: u32,
    visible: u32,
}

#[derive(Debug, Deserialize)]
struct ActivityProbe {
    running: u32,
    mutations: u64,
}

impl PageDriver {
    /// Navigate to `url` and report the main document's HTTP status.
    ///
    /// Timeouts, load errors, and error statuses (>= 400) all surface as
    /// navigation failures; there is no retry.
    pub async fn navigate(&self, url: &str, timeout: Duration) -> Result<Option<u16>> {
        let mut responses = self
            .page
            .event_listener::<EventResponseReceived>()
            .await?;

        let nav = async {
            self.page
                .goto(url)
                .await
                .map_err(|e| Error::Navigation(format!("Failed to load {}: {}", url, e)))?;
            self.page
                .wait_for_navigation()
                .await
                .map_err(|e| Error::Navigation(format!("Load of {} did not finish: {}", url, e)))?;
            Ok::<(), Error>(())
        };

        match tokio::time::timeout(timeout, nav).await {
            Ok(result) => result?,
            Err(_) => {
                return Err(Error::Navigation(format!(
                    "Navigation to {} timed out after {}ms",
                    url,
                    timeout.as_millis()
                )));
            }
        }

        // The document response normally lands before the load signal; give
        // the event stream a short grace period to surface it
        let status = tokio::time::timeout(Duration::from_millis(1_000), async {
            while let Some(event) = responses.next().await {
                if event.r#type == ResourceType::Document {
                    return Some(event.response.status as u16);
                }
            }
            None
        })
        .await
        .unwrap_or(None);

        if let Some(code) = status
            && code >= 400
        {
            return Err(Error::Navigation(format!("{} answered HTTP {}", url, code)));
        }

        tracing::info!("Loaded {} (document status: {:?})", url, status);
        Ok(status)
    }

    /// Require the locator to match exactly one visible element before the
    /// deadline. Multiple matches fail immediately; the zero and hidden
    /// cases keep polling until the deadline.
    pub async fn await_unique_visible(&self, locator: &Locator, timeout: Duration) -> Result<()> {
        let deadline = Instant::now() + timeout;
        let expr = element_probe_js(locator.as_css());

        let last = loop {
            let probe: ElementProbe = self
                .page
                .evaluate(expr.as_str())
                .await?
                .into_value()
                .map_err(|e| Error::Cdp(format!("Element probe returned malformed data: {}", e)))?;

            if probe.total > 1 {
                return Err(Error::Verification(format!(
                    "Selector {} is ambiguous: {} elements match, expected exactly one",
                    locator, probe.total
                )));
            }
            if probe.total == 1 && probe.visible == 1 {
                tracing::debug!("Selector {} resolved to one visible element", locator);
                return Ok(());
            }

            if Instant::now() >= deadline {
                break probe;
            }
            tokio::time::sleep(POLL_INTERVAL).await;
        };

        if last.total == 0 {
            Err(Error::Verification(format!(
                "No element matches selector {} within {}ms",
                locator,
                timeout.as_millis()
            )))
        } else {
            Err(Error::Verification(format!(
                "Element matching {} never became visible within {}ms",
                locator,
                timeout.as_millis()
            )))
        }
    }

    /// Wait for the page to stop moving. Returns false when the bound was
    /// hit before the page went quiet (e.g. an infinite spinner).
    pub async fn settle(
        &self,
        strategy: WaitStrategy,
        bound: Duration,
        quiet: Duration,
    ) -> Result<bool> {
        match strategy {
            WaitStrategy::Fixed => {
                tracing::debug!("Fixed settle: sleeping {}ms", bound.as_millis());
                tokio::time::sleep(bound).await;
                Ok(true)
            }
            WaitStrategy::Stable => self.settle_stable(bound, quiet).await,
        }
    }

    async fn settle_stable(&self, bound: Duration, quiet: Duration) -> Result<bool> {
        self.page
            .evaluate(MUTATION_COUNTER_JS)
            .await
            .map_err(|e| Error::Cdp(format!("Failed to install mutation counter: {}", e)))?;

        let deadline = Instant::now() + bound;
        let mut last_mutations: Option<u64> = None;

        loop {
            tokio::time::sleep(quiet).await;

            let probe: ActivityProbe = self
                .page
                .evaluate(ACTIVITY_PROBE_JS)
                .await?
                .into_value()
                .map_err(|e| Error::Cdp(format!("Activity probe returned malformed data: {}", e)))?;

            if probe.running == 0 && last_mutations == Some(probe.mutations) {
                tracing::debug!("Page settled: no animations, DOM quiet");
                return Ok(true);
            }
            last_mutations = Some(probe.mutations);

            if Instant::now() >= deadline {
                tracing::warn!(
                    "Page never settled within {}ms ({} animations still running); capturing anyway",
                    bound.as_millis(),
                    probe.running
                );
                return Ok(false);
            }
        }
    }

    /// Capture PNG bytes of the viewport, or the full page when asked
    pub async fn screenshot(&self, full_page: bool) -> Result<Vec<u8>> {
        let params = ScreenshotParams::builder()
            .format(CaptureScreenshotFormat::Png)
            .full_page(full_page)
            .build();

        let bytes = self.page.screenshot(params).await?;
        Ok(bytes)
    }
}

/// Probe evaluated in the page: how many elements match the selector, and
/// how many of those are actually rendered.
fn element_probe_js(selector: &str) -> String {
    // serde_json::Value renders a correctly escaped JS string literal
    let quoted = serde_json::Value::String(selector.to_owned()).to_string();

    format!(
        r#"(() => {{
    const nodes = Array.from(document.querySelectorAll({quoted}));
    const visible = nodes.filter((el) => {{
        const rect = el.getBoundingClientRect();
        const style = window.getComputedStyle(el);
        return rect.width > 0 && rect.height > 0
            && style.visibility !== 'hidden' && style.display !== 'none';
    }});
    return {{ total: nodes.length, visible: visible.length }};
}})()"#
    )
}

const MUTATION_COUNTER_JS: &str = r#"(() => {
    if (window.__kestrelMutations === undefined) {
        window.__kestrelMutations = 0;
        new MutationObserver((records) => {
            window.__kestrelMutations += records.length;
        }).observe(document.documentElement, {
            subtree: true,
            childList: true,
            attributes: true,
            characterData: true,
        });
    }
    return window.__kestrelMutations;
})()"#;

const ACTIVITY_PROBE_JS: &str = r#"(() => ({
    running: document.getAnimations().filter((a) => a.playState === 'running').length,
    mutations: window.__kestrelMutations || 0,
}))()"#;
