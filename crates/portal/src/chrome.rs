use crate::Driver;
use crate::error::{ErrorKind, Result};
use async_trait::async_trait;
use exn::ResultExt;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tempfile::TempDir;
use tokio::process::Command;

/// Represents a Chrome/Chromium executable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Chrome {
    /// A directly executable binary.
    Binary { path: PathBuf },
    /// A Flatpak-installed application.
    Flatpak { flatpak: PathBuf, app_id: String },
}
impl Chrome {
    pub(crate) async fn discover() -> Result<Self> {
        // Check for direct executables
        let executables = ["google-chrome", "chromium", "chromium-browser", "chrome"];
        for exe in executables {
            if let Ok(path) = which::which(exe) {
                return Ok(Self::Binary { path });
            }
        }
        tracing::info!("Chrome executable not found in PATH");
        if let Ok(flatpak) = which::which("flatpak") {
            tracing::trace!(flatpak = %flatpak.display(), "Discovered Flatpak on system; searching installed apps");
            let flatpak_apps = ["com.google.Chrome", "org.chromium.Chromium"];
            for app_id in flatpak_apps {
                if flatpak_app_installed(&flatpak, app_id).await {
                    return Ok(Self::Flatpak { flatpak, app_id: app_id.to_string() });
                }
            }
        } else {
            tracing::info!("Flatpak not found; skipping containerized Chrome checks.");
        }
        exn::bail!(ErrorKind::ChromeNotFound);
    }

    fn command(&self, profile: &Path) -> Command {
        match self {
            Self::Binary { path } => Command::new(path),
            Self::Flatpak { flatpak, app_id } => {
                let mut command = Command::new(flatpak);
                command.arg("run").arg(format!("--filesystem={}", profile.display())).arg(app_id);
                command
            },
        }
    }
}

async fn flatpak_app_installed(flatpak: &Path, app_id: &str) -> bool {
    Command::new(flatpak)
        .args(["info", app_id])
        .kill_on_drop(true)
        .output()
        .await
        .is_ok_and(|o| o.status.success())
}

/// Headless Chrome rendering pages with `--dump-dom`.
///
/// Every page is rendered by a fresh browser process, but all of them share
/// one temporary profile directory, so cookies (and with them the portal's
/// server-side conversation) persist for the lifetime of the driver. The
/// profile is deleted when the driver is dropped, which ends the session.
///
/// The driver gives the page's scripts a virtual time budget to settle, but
/// cannot interact with the page. It does not implement [`Driver::search`],
/// and it cannot click the togglers of collapsed treegrid rows, which the
/// extractor then rejects.
// TODO: Submit the program search and expand collapsed treegrid rows once the
//       driver can run scripted interactions over the DevTools protocol.
#[derive(Debug)]
pub struct ChromeDriver {
    chrome: Chrome,
    profile: TempDir,
    timeout: Duration,
}
impl ChromeDriver {
    /// Open a session using the first Chrome/Chromium found on the system.
    pub async fn discover(timeout: Duration) -> Result<Self> {
        Self::with_chrome(Chrome::discover().await?, timeout)
    }

    /// Open a session using an explicit browser executable.
    pub fn with_executable(path: impl Into<PathBuf>, timeout: Duration) -> Result<Self> {
        let path = path.into();
        if !path.is_file() {
            tracing::warn!(path = %path.display(), "Configured Chrome executable does not exist");
            exn::bail!(ErrorKind::ChromeNotFound);
        }
        Self::with_chrome(Chrome::Binary { path }, timeout)
    }

    fn with_chrome(chrome: Chrome, timeout: Duration) -> Result<Self> {
        let profile = tempfile::Builder::new().prefix("mts-session-").tempdir().or_raise(|| ErrorKind::Session)?;
        tracing::debug!(?chrome, profile = %profile.path().display(), "Browser session opened");
        Ok(Self { chrome, profile, timeout })
    }
}

#[async_trait]
impl Driver for ChromeDriver {
    async fn render(&mut self, url: &str) -> Result<String> {
        let mut command = self.chrome.command(self.profile.path());
        command
            .arg("--headless=new")
            .arg("--disable-gpu")
            .arg(format!("--user-data-dir={}", self.profile.path().display()))
            .arg(format!("--virtual-time-budget={}", self.timeout.as_millis() / 2))
            .arg("--dump-dom")
            .arg(url)
            .kill_on_drop(true);
        let output = tokio::time::timeout(self.timeout, command.output())
            .await
            .or_raise(|| ErrorKind::Timeout(url.to_string()))?
            .or_raise(|| ErrorKind::Fetch(url.to_string()))?;
        if !output.status.success() {
            tracing::warn!(
                status = ?output.status,
                stderr = %String::from_utf8_lossy(&output.stderr).trim(),
                "Chrome exited unsuccessfully"
            );
            exn::bail!(ErrorKind::Fetch(url.to_string()));
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}
