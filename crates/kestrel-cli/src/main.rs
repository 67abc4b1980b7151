use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use kestrel_cli::{OutputFormat, WaitArg, commands};
use kestrel_core::config::{
    CaptureConfig, DEFAULT_ELEMENT_TIMEOUT_MS, DEFAULT_NAV_TIMEOUT_MS, DEFAULT_OUTPUT,
    DEFAULT_QUIET_MS, DEFAULT_SETTLE_MS, DEFAULT_URL, Viewport,
};
use kestrel_core::locator::{DEFAULT_SELECTOR, Locator};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "kestrel")]
#[command(author, version, about, long_about = None)]
#[command(
    about = "Headless page captures for visual regression review",
    long_about = "Kestrel drives a headless Chrome session against a running web application, \
                  verifies the page rendered the element you expect, waits for animations to \
                  settle, and saves a PNG screenshot for visual review."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output format for run reports
    #[arg(short, long, global = true, value_enum, default_value = "pretty")]
    format: OutputFormat,
}

#[derive(Subcommand)]
enum Commands {
    /// Capture a screenshot of a page once it has rendered and settled
    Capture {
        /// Target URL (a dev server you have already started)
        #[arg(long, default_value = DEFAULT_URL)]
        url: String,

        /// Output PNG path; parent directories are created, the file overwritten
        #[arg(short, long, default_value = DEFAULT_OUTPUT)]
        output: PathBuf,

        /// CSS selector that must match exactly one visible element
        #[arg(long, default_value = DEFAULT_SELECTOR)]
        selector: String,

        /// How to wait for the page to stop moving before capturing
        #[arg(long, value_enum, default_value = "stable")]
        wait: WaitArg,

        /// Settle bound in milliseconds (exact sleep with --wait fixed)
        #[arg(long, default_value_t = DEFAULT_SETTLE_MS)]
        settle_ms: u64,

        /// Quiet window for --wait stable, in milliseconds
        #[arg(long, default_value_t = DEFAULT_QUIET_MS)]
        quiet_ms: u64,

        /// Navigation timeout in milliseconds
        #[arg(long, default_value_t = DEFAULT_NAV_TIMEOUT_MS)]
        nav_timeout_ms: u64,

        /// Element visibility timeout in milliseconds
        #[arg(long, default_value_t = DEFAULT_ELEMENT_TIMEOUT_MS)]
        element_timeout_ms: u64,

        /// Capture the full scrollable page instead of the viewport
        #[arg(long)]
        full_page: bool,

        /// Viewport size as WIDTHxHEIGHT
        #[arg(long, default_value = "1280x720")]
        viewport: String,

        /// Path to a Chrome/Chromium binary
        #[arg(long)]
        chrome_path: Option<PathBuf>,

        /// Reuse a named browser profile instead of a scratch one
        #[arg(long)]
        profile: Option<String>,
    },

    /// Run a JSON capture plan (a sequence of named captures)
    Plan {
        /// Path to the plan file
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Stop at the first failed step
        #[arg(long)]
        halt: bool,

        /// Path to a Chrome/Chromium binary
        #[arg(long)]
        chrome_path: Option<PathBuf>,
    },

    /// Check that a usable Chrome/Chromium binary can be found
    Doctor {
        /// Path to a Chrome/Chromium binary
        #[arg(long)]
        chrome_path: Option<PathBuf>,
    },

    /// Generate shell completion scripts
    #[command(
        long_about = "Generate shell completion scripts.\n\n\
                      SUPPORTED SHELLS: bash, zsh, fish, powershell, elvish\n\n\
                      INSTALLATION:\n  \
                      bash: kestrel completion --shell bash >> ~/.bashrc\n  \
                      zsh:  kestrel completion --shell zsh >> ~/.zshrc"
    )]
    Completion {
        /// Shell to generate completions for
        #[arg(long, value_enum)]
        shell: Shell,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    init_logging(cli.verbose);

    // Execute the command
    match cli.command {
        Commands::Capture {
            url,
            output,
            selector,
            wait,
            settle_ms,
            quiet_ms,
            nav_timeout_ms,
            element_timeout_ms,
            full_page,
            viewport,
            chrome_path,
            profile,
        } => {
            let config = CaptureConfig {
                url,
                output,
                selector: Locator::css(selector),
                wait: wait.into(),
                settle_ms,
                quiet_ms,
                nav_timeout_ms,
                element_timeout_ms,
                full_page,
                viewport: viewport.parse::<Viewport>()?,
            };
            commands::capture::execute(config, chrome_path, profile, cli.format)
        }
        Commands::Plan {
            file,
            halt,
            chrome_path,
        } => commands::plan::execute(&file, halt, chrome_path, cli.format),
        Commands::Doctor { chrome_path } => commands::doctor::execute(chrome_path),
        Commands::Completion { shell } => {
            let mut cmd = Cli::command();
            commands::completion::execute(shell, &mut cmd)
        }
    }
}

fn init_logging(verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let filter = if verbose {
        EnvFilter::new("kestrel=debug,kestrel_cli=debug,kestrel_core=debug,kestrel_browser=debug")
    } else {
        EnvFilter::new("kestrel=info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .init();
}
