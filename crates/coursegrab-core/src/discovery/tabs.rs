use crate::config::DiscoveryConfig;
use crate::driver::{AutomationDriver, DriverResult};
use crate::locator::CoursePageLayout;
use crate::retry::Probe;
use std::fmt;
use tracing::{debug, info, warn};

/// 1-based position of a tab among its siblings
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TabPosition(u32);

impl TabPosition {
    pub fn new(position: u32) -> Self {
        Self(position.max(1))
    }

    pub fn get(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for TabPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Scan position of one tab search. Starts at 1 and only moves forward.
#[derive(Debug)]
pub struct TabCursor {
    position: u32,
}

impl TabCursor {
    pub fn new() -> Self {
        Self { position: 1 }
    }

    pub fn position(&self) -> TabPosition {
        TabPosition(self.position)
    }

    pub fn advance(&mut self) {
        self.position += 1;
    }
}

impl Default for TabCursor {
    fn default() -> Self {
        Self::new()
    }
}

/// A probed tab header
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TabDescriptor {
    pub position: TabPosition,
    pub text: String,
}

/// Result of a tab search
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TabMatch {
    /// Matched and activated
    Found(TabPosition),
    /// Sibling list exhausted; `probed` positions were tried
    NotFound { probed: u32 },
}

/// Finds a tab by the text it renders
pub struct TabLocator<'a> {
    layout: &'a CoursePageLayout,
    config: &'a DiscoveryConfig,
}

impl<'a> TabLocator<'a> {
    pub fn new(layout: &'a CoursePageLayout, config: &'a DiscoveryConfig) -> Self {
        Self { layout, config }
    }

    /// Probe positions 1, 2, ... until a header containing `label` is found and clicked.
    ///
    /// Each position costs one probe under the `tab_probe` budget. The header is
    /// read and, on a case-sensitive substring match, clicked in the same probe.
    pub async fn locate<D: AutomationDriver>(
        &self,
        driver: &mut D,
        label: &str,
    ) -> DriverResult<TabMatch> {
        let policy = self.config.policy(self.config.budgets.tab_probe);
        let timeout = self.config.wait_timeout;
        let mut cursor = TabCursor::new();

        loop {
            let position = cursor.position();
            let query = self.layout.tab_header(position.get());

            let probe = policy
                .attempt(driver, |driver, _| {
                    let query = query.clone();
                    let label = label.to_string();
                    Box::pin(async move {
                        let node = driver.locate(&query, timeout).await?;
                        let text = driver.read_text(&node).await?;
                        let matched = text.contains(&label);
                        if matched {
                            driver.click(&node).await?;
                        }
                        Ok((text, matched))
                    })
                })
                .await?;

            match probe {
                Probe::Found((text, true)) => {
                    let tab = TabDescriptor { position, text };
                    info!("Found {} tab at position {}", label, tab.position);
                    return Ok(TabMatch::Found(tab.position));
                }
                Probe::Found((text, false)) => {
                    debug!("Tab {} reads '{}', looking for '{}'", position, text.trim(), label);
                    cursor.advance();
                }
                Probe::Absent { last_error, .. } => {
                    warn!(
                        "{} tab not found after checking {} tab(s): {}",
                        label,
                        position.get() - 1,
                        last_error
                    );
                    return Ok(TabMatch::NotFound {
                        probed: position.get(),
                    });
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cursor_starts_at_one_and_advances() {
        let mut cursor = TabCursor::new();
        assert_eq!(cursor.position().get(), 1);
        cursor.advance();
        cursor.advance();
        assert_eq!(cursor.position(), TabPosition::new(3));
    }

    #[test]
    fn test_position_is_never_zero() {
        assert_eq!(TabPosition::new(0).get(), 1);
    }
}
