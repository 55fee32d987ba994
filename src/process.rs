// Editor process control
//
// Best effort only. The state files must not be written by the editor while
// we clean them, so callers can ask whether it is running and close it first.
// Windows uses tasklist/taskkill. macOS matches the app path with pgrep/pkill -f;
// Linux matches the exact process name (-x) so unrelated command lines that
// merely contain "code" are left alone.

use std::process::{Command, Output};

use crate::error::{MaintenanceError, Result};
use crate::paths::EditorFlavor;

/// Capability: observe and close the editor that owns the target files.
pub trait EditorProcess {
    fn is_running(&self) -> bool;

    /// Returns true when at least one process was closed.
    fn terminate(&self) -> Result<bool>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Platform {
    Windows,
    MacOs,
    Linux,
}

impl Platform {
    fn current() -> Self {
        if cfg!(windows) {
            Platform::Windows
        } else if cfg!(target_os = "macos") {
            Platform::MacOs
        } else {
            Platform::Linux
        }
    }
}

/// Process names to match for a flavor on a platform.
fn process_patterns(flavor: EditorFlavor, platform: Platform) -> &'static [&'static str] {
    match (platform, flavor) {
        // The main build also sweeps the helper executables of the other builds.
        (Platform::Windows, EditorFlavor::Code) => &["Code.exe", "Code - Insiders.exe", "Code - OSS.exe"],
        (Platform::Windows, EditorFlavor::Insiders) => &["Code - Insiders.exe"],
        (Platform::Windows, EditorFlavor::Oss) => &["Code - OSS.exe"],
        (Platform::MacOs, EditorFlavor::Code) => &["Visual Studio Code"],
        (Platform::MacOs, EditorFlavor::Insiders) => &["Visual Studio Code - Insiders"],
        (Platform::MacOs, EditorFlavor::Oss) => &["Code - OSS"],
        (Platform::Linux, EditorFlavor::Code) => &["code"],
        (Platform::Linux, EditorFlavor::Insiders) => &["code-insiders"],
        (Platform::Linux, EditorFlavor::Oss) => &["code-oss"],
    }
}

/// Shells out to the platform's process tools.
#[derive(Debug, Clone, Copy)]
pub struct SystemProcessControl {
    flavor: EditorFlavor,
    platform: Platform,
}

impl SystemProcessControl {
    pub fn new(flavor: EditorFlavor) -> Self {
        Self {
            flavor,
            platform: Platform::current(),
        }
    }

    fn patterns(&self) -> &'static [&'static str] {
        process_patterns(self.flavor, self.platform)
    }

    fn match_flag(&self) -> &'static str {
        match self.platform {
            Platform::Linux => "-x",
            _ => "-f",
        }
    }
}

fn run(program: &str, args: &[&str]) -> Result<Output> {
    Command::new(program)
        .args(args)
        .output()
        .map_err(|e| MaintenanceError::Process(format!("failed to run {}: {}", program, e)))
}

/// Hand a URL to the desktop's default handler.
pub fn open_in_browser(url: &str) -> Result<()> {
    let output = match Platform::current() {
        Platform::Windows => run("rundll32", &["url.dll,FileProtocolHandler", url])?,
        Platform::MacOs => run("open", &[url])?,
        Platform::Linux => run("xdg-open", &[url])?,
    };
    if !output.status.success() {
        return Err(MaintenanceError::Process(format!(
            "browser launcher exited with {}: {}",
            output.status,
            String::from_utf8_lossy(&output.stderr).trim()
        )));
    }
    Ok(())
}

impl EditorProcess for SystemProcessControl {
    fn is_running(&self) -> bool {
        // If we can't check, assume it is not running.
        self.patterns().iter().any(|&pattern| match self.platform {
            Platform::Windows => {
                let filter = format!("IMAGENAME eq {}", pattern);
                run("tasklist", &["/FI", &filter])
                    .map(|o| String::from_utf8_lossy(&o.stdout).contains(pattern))
                    .unwrap_or(false)
            }
            Platform::MacOs | Platform::Linux => run("pgrep", &[self.match_flag(), pattern])
                .map(|o| o.status.success())
                .unwrap_or(false),
        })
    }

    fn terminate(&self) -> Result<bool> {
        let mut closed_any = false;
        for &pattern in self.patterns() {
            let output = match self.platform {
                Platform::Windows => run("taskkill", &["/F", "/IM", pattern])?,
                Platform::MacOs | Platform::Linux => run("pkill", &[self.match_flag(), pattern])?,
            };
            if output.status.success() {
                log::info!("Closed editor processes matching '{}'", pattern);
                closed_any = true;
            } else {
                log::debug!(
                    "No editor process closed for '{}': {}",
                    pattern,
                    String::from_utf8_lossy(&output.stderr).trim()
                );
            }
        }
        Ok(closed_any)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_patterns_per_platform() {
        assert_eq!(process_patterns(EditorFlavor::Code, Platform::Linux), &["code"]);
        assert_eq!(
            process_patterns(EditorFlavor::Code, Platform::MacOs),
            &["Visual Studio Code"]
        );
        assert_eq!(process_patterns(EditorFlavor::Code, Platform::Windows)[0], "Code.exe");
        assert_eq!(
            process_patterns(EditorFlavor::Insiders, Platform::Windows),
            &["Code - Insiders.exe"]
        );
    }

    #[test]
    fn test_missing_tool_is_an_error_not_a_panic() {
        let err = run("augment-free-definitely-not-a-binary", &[]).unwrap_err();
        assert!(matches!(err, MaintenanceError::Process(_)));
    }
}
