use crate::driver::DriverError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Failed to start automation session: {0}")]
    SessionStart(DriverError),

    #[error("Automation session failed: {0}")]
    Session(#[from] DriverError),

    #[error("No tab labelled '{label}' after probing {probed} position(s)")]
    DiscoveryFailed { label: String, probed: u32 },

    #[error("Malformed link '{href}': {reason}")]
    MalformedLink { href: String, reason: String },

    #[error("Invalid page layout: {0}")]
    Layout(String),

    #[error("Failed to read layout file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse layout file: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Discovery cancelled")]
    Cancelled,
}

impl Error {
    pub(crate) fn malformed(href: &str, reason: impl Into<String>) -> Self {
        Error::MalformedLink {
            href: href.to_string(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
