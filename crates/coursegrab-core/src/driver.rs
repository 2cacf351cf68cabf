//! Capability interface over a browser-automation backend.
//!
//! The discovery engine only ever talks to a page through [`AutomationDriver`],
//! so the same code drives a real Chromium session and the deterministic fake
//! used by the test suite. A driver is used by one run at a time: every method
//! takes `&mut self`.

use crate::locator::LocatorQuery;
use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

/// Failures reported by a driver.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DriverError {
    /// The queried node did not satisfy its condition within the timeout
    #[error("Node not found: {0}")]
    NotFound(String),

    /// The node existed but clicking or reading it failed
    #[error("Interaction failed: {0}")]
    Interaction(String),

    /// The browser session itself is unusable (launch failure, lost connection)
    #[error("Session error: {0}")]
    Session(String),
}

impl DriverError {
    /// Whether the retry policy may try again after this failure
    pub fn is_retryable(&self) -> bool {
        matches!(self, DriverError::NotFound(_) | DriverError::Interaction(_))
    }
}

pub type DriverResult<T> = std::result::Result<T, DriverError>;

/// One open automation session against a single page.
#[async_trait]
pub trait AutomationDriver: Send {
    /// Handle to a located node, valid until the next navigation
    type Node: Send + Sync;

    /// Navigate to `url` and wait for the initial load
    async fn open_page(&mut self, url: &str) -> DriverResult<()>;

    /// Wait up to `timeout` for exactly one node matching `query`
    async fn locate(&mut self, query: &LocatorQuery, timeout: Duration)
    -> DriverResult<Self::Node>;

    async fn click(&mut self, node: &Self::Node) -> DriverResult<()>;

    /// Rendered text of the node
    async fn read_text(&mut self, node: &Self::Node) -> DriverResult<String>;

    /// Value of an attribute, `None` when the node does not carry it
    async fn read_attribute(&mut self, node: &Self::Node, name: &str)
    -> DriverResult<Option<String>>;

    /// Release the session. Called exactly once per session.
    async fn close(&mut self) -> DriverResult<()>;
}

/// Creates a fresh driver for each discovery run.
#[async_trait]
pub trait SessionLauncher: Send + Sync {
    type Driver: AutomationDriver;

    async fn launch(&self) -> DriverResult<Self::Driver>;
}
