use crate::{Error, Result};
use kestrel_core::config::Viewport;
use std::path::PathBuf;
use std::process::{Child, Command, Stdio};

/// Spawns the headless Chrome process a capture session attaches to
pub struct ChromeLauncher {
    chrome_path: PathBuf,
    profile_path: PathBuf,
    viewport: Viewport,
    debugging_port: u16,
}

impl ChromeLauncher {
    /// Create a new ChromeLauncher
    pub fn new(chrome_path: PathBuf, profile_path: PathBuf, viewport: Viewport) -> Self {
        Self {
            chrome_path,
            profile_path,
            viewport,
            debugging_port: 9222,
        }
    }

    /// Override the remote debugging port
    pub fn with_debugging_port(mut self, port: u16) -> Self {
        self.debugging_port = port;
        self
    }

    /// Launch the Chrome process
    pub fn launch(&self) -> Result<Child> {
        let args = self.build_args();

        Command::new(&self.chrome_path)
            .args(&args)
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| Error::Launch(format!("Failed to launch Chrome: {}", e)))
    }

    /// Build Chrome command-line arguments
    fn build_args(&self) -> Vec<String> {
        vec![
            "--headless=new".to_string(),
            "--disable-gpu".to_string(),
            "--hide-scrollbars".to_string(),
            "--no-first-run".to_string(),
            "--no-default-browser-check".to_string(),
            format!("--remote-debugging-port={}", self.debugging_port),
            format!("--user-data-dir={}", self.profile_path.display()),
            format!(
                "--window-size={},{}",
                self.viewport.width, self.viewport.height
            ),
            "about:blank".to_string(),
        ]
    }

    /// Get the debugging port
    pub fn debugging_port(&self) -> u16 {
        self.debugging_port
    }
}
