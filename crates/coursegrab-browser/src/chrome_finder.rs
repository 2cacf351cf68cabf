use crate::{Error, Result};
use std::path::{Path, PathBuf};

/// Executable names looked up on `PATH` when no install location matches
const PATH_NAMES: &[&str] = &["google-chrome", "chromium", "chromium-browser", "chrome"];

/// One place a browser binary may live
#[derive(Debug, Clone, PartialEq, Eq)]
enum Candidate {
    Installed(PathBuf),
    OnPath(&'static str),
}

impl Candidate {
    fn resolve(&self) -> Result<PathBuf> {
        match self {
            Candidate::Installed(path) => check_executable(path),
            Candidate::OnPath(name) => which::which(name)
                .map_err(|_| Error::Browser(format!("{} is not on PATH", name))),
        }
    }

    fn describe(&self) -> String {
        match self {
            Candidate::Installed(path) => path.display().to_string(),
            Candidate::OnPath(name) => format!("{} (PATH)", name),
        }
    }
}

/// Locates a Chrome or Chromium binary
pub struct ChromeFinder {
    custom_path: Option<PathBuf>,
}

impl ChromeFinder {
    pub fn new(custom_path: Option<PathBuf>) -> Self {
        Self { custom_path }
    }

    /// An explicit path must be valid; otherwise the first usable candidate wins
    pub fn find(&self) -> Result<PathBuf> {
        if let Some(path) = &self.custom_path {
            return check_executable(path);
        }

        let candidates = Self::candidates();
        for candidate in &candidates {
            match candidate.resolve() {
                Ok(path) => {
                    tracing::debug!("Using Chrome at {}", path.display());
                    return Ok(path);
                }
                Err(e) => tracing::debug!("Skipping Chrome candidate: {}", e),
            }
        }

        let searched: Vec<String> = candidates.iter().map(Candidate::describe).collect();
        Err(Error::Browser(format!(
            "Chrome not found. Checked: {}. Use --chrome-path to specify location.",
            searched.join(", ")
        )))
    }

    /// Install locations for this platform, then `PATH` names
    fn candidates() -> Vec<Candidate> {
        Self::install_locations()
            .into_iter()
            .map(Candidate::Installed)
            .chain(PATH_NAMES.iter().copied().map(Candidate::OnPath))
            .collect()
    }

    fn install_locations() -> Vec<PathBuf> {
        let locations: &[&str] = if cfg!(target_os = "macos") {
            &[
                "/Applications/Google Chrome.app/Contents/MacOS/Google Chrome",
                "/Applications/Chromium.app/Contents/MacOS/Chromium",
            ]
        } else if cfg!(target_os = "windows") {
            &[
                r"C:\Program Files\Google\Chrome\Application\chrome.exe",
                r"C:\Program Files (x86)\Google\Chrome\Application\chrome.exe",
            ]
        } else if cfg!(target_os = "linux") {
            &[
                "/usr/bin/google-chrome",
                "/usr/bin/chromium",
                "/usr/bin/chromium-browser",
                "/snap/bin/chromium",
            ]
        } else {
            &[]
        };
        locations.iter().map(PathBuf::from).collect()
    }
}

/// The path exists and, on unix, carries an execute bit
fn check_executable(path: &Path) -> Result<PathBuf> {
    if !path.is_file() {
        return Err(Error::Browser(format!(
            "Chrome not found at: {}",
            path.display()
        )));
    }

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        if std::fs::metadata(path)?.permissions().mode() & 0o111 == 0 {
            return Err(Error::Browser(format!(
                "Chrome binary not executable: {}",
                path.display()
            )));
        }
    }

    Ok(path.to_path_buf())
}
