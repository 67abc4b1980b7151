use crate::OutputFormat;
use anyhow::Result;
use console::style;
use indicatif::ProgressBar;
use kestrel_browser::{BrowserSession, ChromeFinder, ChromeLauncher, Profile, runner};
use kestrel_core::config::{CaptureConfig, Viewport};
use kestrel_core::report::CaptureReport;
use std::path::PathBuf;
use std::time::Duration;

pub fn execute(
    config: CaptureConfig,
    chrome_path: Option<PathBuf>,
    profile_name: Option<String>,
    format: OutputFormat,
) -> Result<()> {
    config.validate()?;

    // Create tokio runtime for async operations
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    let result = runtime.block_on(async {
        let (session, profile) = start_session(chrome_path, profile_name, config.viewport).await?;

        // Everything fallible happens in drive(); the session comes down
        // on every path before the result is inspected
        let outcome = drive(&session, &config).await;
        session.shutdown().await;
        drop(profile);

        let report = outcome?;
        print_report(&report, format);
        Ok(())
    });

    // Shutdown the runtime promptly instead of waiting on blocking tasks
    runtime.shutdown_timeout(Duration::from_millis(100));

    result
}

/// Locate Chrome, set up a profile, launch the process, and attach to it.
/// Shared with the plan command.
pub(crate) async fn start_session(
    chrome_path: Option<PathBuf>,
    profile_name: Option<String>,
    viewport: Viewport,
) -> Result<(BrowserSession, Profile)> {
    println!("🔍 Locating Chrome...");
    let finder = ChromeFinder::new(chrome_path);
    let chrome_binary = finder.find()?;
    println!("✅ Found Chrome at: {}", chrome_binary.display());

    let profile = if let Some(name) = profile_name {
        let profile_path = dirs::home_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not determine home directory"))?
            .join(".kestrel")
            .join("profiles")
            .join(name);

        println!("📁 Using profile: {}", profile_path.display());
        Profile::at(profile_path)?
    } else {
        Profile::ephemeral()?
    };

    let launcher = ChromeLauncher::new(chrome_binary, profile.path().to_path_buf(), viewport);
    let debugging_port = launcher.debugging_port();

    println!("🚀 Launching headless Chrome...");
    let chrome = launcher.launch()?;
    let session = BrowserSession::connect(chrome, debugging_port).await?;

    Ok((session, profile))
}

async fn drive(session: &BrowserSession, config: &CaptureConfig) -> Result<CaptureReport> {
    let driver = session.new_page().await?;

    let spinner = ProgressBar::new_spinner();
    spinner.set_message(format!("capturing {}", config.url));
    spinner.enable_steady_tick(Duration::from_millis(120));

    let name = config
        .output
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "capture".to_string());
    let report = runner::run_capture(&driver, &name, config).await;

    spinner.finish_and_clear();
    Ok(report?)
}

/// Render a finished capture. Shared with the plan command.
pub(crate) fn print_report(report: &CaptureReport, format: OutputFormat) {
    match format {
        OutputFormat::Json => match serde_json::to_string_pretty(report) {
            Ok(json) => println!("{}", json),
            Err(e) => tracing::error!("Failed to render report as JSON: {}", e),
        },
        OutputFormat::Pretty => {
            println!(
                "✅ {}",
                style(format!("Captured {}", report.output.display())).green()
            );
            println!("   URL:      {}", report.url);
            if let Some(code) = report.status {
                println!("   Status:   {}", code);
            }
            println!("   Load:     {}ms", report.nav_ms);
            if report.settled {
                println!("   Settle:   {}ms", report.settle_ms);
            } else {
                println!(
                    "   Settle:   {}ms {}",
                    report.settle_ms,
                    style("(bound reached, page still moving)").yellow()
                );
            }
            println!("   Size:     {} bytes", report.bytes);
        }
    }
}
