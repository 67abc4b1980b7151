use anyhow::Result;
use console::style;
use kestrel_browser::ChromeFinder;
use std::path::PathBuf;
use std::process::Command;

pub fn execute(chrome_path: Option<PathBuf>) -> Result<()> {
    let finder = ChromeFinder::new(chrome_path);
    let binary = finder.find()?;
    println!("✅ Chrome binary: {}", binary.display());

    match Command::new(&binary).arg("--version").output() {
        Ok(output) if output.status.success() => {
            let version = String::from_utf8_lossy(&output.stdout);
            println!("   Version: {}", style(version.trim()).cyan());
        }
        Ok(output) => {
            println!(
                "⚠️  {} exited with {} when asked for --version",
                binary.display(),
                output.status
            );
        }
        Err(e) => {
            return Err(anyhow::anyhow!(
                "Failed to run {} --version: {}",
                binary.display(),
                e
            ));
        }
    }

    Ok(())
}
