use crate::{ChromeFinder, ChromeSession, Error, ProfileManager, Result};
use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use coursegrab_core::{DriverResult, SessionLauncher};
use futures::StreamExt;
use std::path::PathBuf;

/// Which user-data directory the browser runs with
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ProfileChoice {
    /// Fresh directory removed when the session ends
    #[default]
    Temporary,
    Directory(PathBuf),
    /// Kept under `~/.coursegrab/profiles/<name>`
    Named(String),
}

impl ProfileChoice {
    fn prepare(&self) -> Result<ProfileManager> {
        match self {
            ProfileChoice::Temporary => ProfileManager::temporary(),
            ProfileChoice::Directory(path) => ProfileManager::persistent(path.clone()),
            ProfileChoice::Named(name) => ProfileManager::named(name),
        }
    }
}

/// How to start the browser for a discovery run
#[derive(Debug, Clone, Default)]
pub struct LaunchOptions {
    /// Explicit Chrome binary; discovered when `None`
    pub chrome_path: Option<PathBuf>,
    pub profile: ProfileChoice,
    pub headless: bool,
}

/// Starts one Chrome process per discovery run
pub struct ChromeLauncher {
    options: LaunchOptions,
}

impl ChromeLauncher {
    pub fn new(options: LaunchOptions) -> Self {
        Self { options }
    }

    /// Find Chrome, prepare the profile and launch
    pub async fn start(&self) -> Result<ChromeSession> {
        let chrome_binary = ChromeFinder::new(self.options.chrome_path.clone()).find()?;
        tracing::debug!("Found Chrome at: {}", chrome_binary.display());

        let profile = self.options.profile.prepare()?;
        if profile.is_in_use() {
            tracing::warn!(
                "Profile {} looks in use by another Chrome; launch may fail",
                profile.path().display()
            );
        }

        let mut builder = BrowserConfig::builder()
            .chrome_executable(chrome_binary)
            .user_data_dir(profile.path())
            .viewport(None)
            .args(self.build_args());
        if !self.options.headless {
            builder = builder.with_head();
        }
        let config = builder.build().map_err(Error::Browser)?;

        tracing::info!(
            "Launching Chrome ({}) with profile {}",
            if self.options.headless { "headless" } else { "windowed" },
            profile.path().display()
        );
        let (browser, mut handler) = Browser::launch(config).await?;

        // The handler drives the CDP connection; commands stall without it
        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    tracing::debug!("CDP handler event error (continuing): {}", e);
                }
            }
        });

        Ok(ChromeSession::new(browser, handler_task, profile))
    }

    /// Build Chrome command-line arguments
    fn build_args(&self) -> Vec<String> {
        let mut args = vec![
            "--no-first-run".to_string(),
            "--no-default-browser-check".to_string(),
        ];
        if self.options.headless {
            args.push("--window-size=1920,1080".to_string());
        } else {
            args.push("--start-maximized".to_string());
        }
        args
    }
}

#[async_trait]
impl SessionLauncher for ChromeLauncher {
    type Driver = ChromeSession;

    async fn launch(&self) -> DriverResult<ChromeSession> {
        Ok(self.start().await?)
    }
}
