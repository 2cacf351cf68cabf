pub mod config;
pub mod discovery;
pub mod driver;
pub mod error;
pub mod locator;
pub mod resource;
pub mod retry;

pub use config::{DiscoveryConfig, RetryBudgets};
pub use discovery::{
    Discovery, DiscoveryReport, DiscoveryStatus, ItemEnumerator, ItemOutcome, ItemReport,
    RunState, SkipReason, TabCursor, TabLocator, TabMatch, TabPosition,
};
pub use driver::{AutomationDriver, DriverError, DriverResult, SessionLauncher};
pub use error::{Error, Result};
pub use locator::{Condition, CoursePageLayout, LocatorQuery, PathTemplate};
pub use resource::{LinkResolver, ResourceKind, ResourceLink, ResourceMap};
pub use retry::{Probe, RetryAttempt, RetryPolicy};
