//! Chromium implementation of the discovery driver.

mod chrome_finder;
mod error;
mod launcher;
mod profile;
mod session;

pub use chrome_finder::ChromeFinder;
pub use error::{Error, Result};
pub use launcher::{ChromeLauncher, LaunchOptions, ProfileChoice};
pub use profile::ProfileManager;
pub use session::ChromeSession;
