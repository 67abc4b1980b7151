use crate::OutputFormat;
use crate::commands::capture::{print_report, start_session};
use anyhow::Result;
use console::style;
use kestrel_browser::{BrowserSession, runner};
use kestrel_core::plan::CapturePlan;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub fn execute(
    file: &Path,
    halt: bool,
    chrome_path: Option<PathBuf>,
    format: OutputFormat,
) -> Result<()> {
    // Parse and validate before anything browser-shaped happens
    let plan = CapturePlan::from_file(file)?;
    println!(
        "📋 {} step(s) loaded from {}",
        plan.steps.len(),
        file.display()
    );

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    let result = runtime.block_on(async {
        // One session for the whole plan; the viewport comes from the first step
        let viewport = plan
            .steps
            .first()
            .map(|s| s.config.viewport)
            .unwrap_or_default();
        let (session, profile) = start_session(chrome_path, None, viewport).await?;

        let outcome = run_steps(&session, &plan, halt, format).await;
        session.shutdown().await;
        drop(profile);

        outcome
    });

    runtime.shutdown_timeout(Duration::from_millis(100));

    result
}

async fn run_steps(
    session: &BrowserSession,
    plan: &CapturePlan,
    halt: bool,
    format: OutputFormat,
) -> Result<()> {
    let driver = session.new_page().await?;

    let mut failed: Vec<String> = Vec::new();
    for step in &plan.steps {
        println!();
        println!("▶ {}", style(&step.name).bold());

        match runner::run_capture(&driver, &step.name, &step.config).await {
            Ok(report) => print_report(&report, format),
            Err(e) => {
                eprintln!("{} {}: {}", style("✗").red(), step.name, e);
                failed.push(step.name.clone());
                if halt {
                    break;
                }
            }
        }
    }

    println!();
    if failed.is_empty() {
        println!(
            "✅ {}",
            style(format!("{} step(s) captured", plan.steps.len())).green()
        );
        Ok(())
    } else {
        Err(anyhow::anyhow!(
            "{} of {} step(s) failed: {}",
            failed.len(),
            plan.steps.len(),
            failed.join(", ")
        ))
    }
}
