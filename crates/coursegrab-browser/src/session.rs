use crate::profile::ProfileManager;
use async_trait::async_trait;
use chromiumoxide::browser::Browser;
use chromiumoxide::element::Element;
use chromiumoxide::page::Page;
use coursegrab_core::{AutomationDriver, Condition, DriverError, DriverResult, LocatorQuery};
use std::time::{Duration, Instant};
use tokio::task::JoinHandle;

/// Polling starts at this interval and doubles up to `MAX_POLL_INTERVAL`
const INITIAL_POLL_INTERVAL: Duration = Duration::from_millis(100);
const MAX_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// True when the node is rendered with a non-empty box and not disabled
const CLICKABLE_SCRIPT: &str = "function() { \
    const rect = this.getBoundingClientRect(); \
    const style = window.getComputedStyle(this); \
    return !this.disabled && rect.width > 0 && rect.height > 0 \
        && style.visibility !== 'hidden' && style.pointerEvents !== 'none'; \
}";

/// One Chromium instance driving one course page
pub struct ChromeSession {
    browser: Browser,
    page: Option<Page>,
    handler_task: Option<JoinHandle<()>>,
    profile: ProfileManager,
    closed: bool,
}

impl ChromeSession {
    pub(crate) fn new(browser: Browser, handler_task: JoinHandle<()>, profile: ProfileManager) -> Self {
        Self {
            browser,
            page: None,
            handler_task: Some(handler_task),
            profile,
            closed: false,
        }
    }

    fn page(&self) -> DriverResult<&Page> {
        self.page
            .as_ref()
            .ok_or_else(|| DriverError::Session("No page open".to_string()))
    }

    /// The CDP handler stops once the websocket to the browser is gone
    fn connection_lost(&self) -> bool {
        self.handler_task
            .as_ref()
            .map(|task| task.is_finished())
            .unwrap_or(true)
    }

    /// Classify a CDP failure on a node that was found
    fn interaction_error(&self, action: &str, err: impl std::fmt::Display) -> DriverError {
        if self.connection_lost() {
            DriverError::Session(format!("Browser connection lost during {}: {}", action, err))
        } else {
            DriverError::Interaction(format!("{} failed: {}", action, err))
        }
    }

    async fn is_clickable(element: &Element) -> bool {
        match element.call_js_fn(CLICKABLE_SCRIPT, false).await {
            Ok(returns) => returns
                .result
                .value
                .and_then(|value| value.as_bool())
                .unwrap_or(false),
            Err(e) => {
                tracing::debug!("Clickability check failed: {}", e);
                false
            }
        }
    }
}

#[async_trait]
impl AutomationDriver for ChromeSession {
    type Node = Element;

    async fn open_page(&mut self, url: &str) -> DriverResult<()> {
        tracing::info!("Opening {}", url);
        let page = self
            .browser
            .new_page(url)
            .await
            .map_err(|e| DriverError::Session(format!("Failed to open {}: {}", url, e)))?;
        page.wait_for_navigation()
            .await
            .map_err(|e| DriverError::Session(format!("Failed to load {}: {}", url, e)))?;
        self.page = Some(page);
        Ok(())
    }

    async fn locate(&mut self, query: &LocatorQuery, timeout: Duration) -> DriverResult<Element> {
        let page = self.page()?;
        let start = Instant::now();
        let mut poll_interval = INITIAL_POLL_INTERVAL;

        loop {
            match page.find_xpath(query.path.as_str()).await {
                Ok(element) => {
                    if query.condition == Condition::Present || Self::is_clickable(&element).await
                    {
                        return Ok(element);
                    }
                }
                Err(e) => {
                    if self.connection_lost() {
                        return Err(DriverError::Session(format!(
                            "Browser connection lost: {}",
                            e
                        )));
                    }
                }
            }

            if start.elapsed() >= timeout {
                return Err(DriverError::NotFound(format!(
                    "{} (timeout after {}ms)",
                    query,
                    timeout.as_millis()
                )));
            }

            tokio::time::sleep(poll_interval).await;
            poll_interval = (poll_interval * 2).min(MAX_POLL_INTERVAL);
        }
    }

    async fn click(&mut self, node: &Element) -> DriverResult<()> {
        node.click()
            .await
            .map(|_| ())
            .map_err(|e| self.interaction_error("click", e))
    }

    async fn read_text(&mut self, node: &Element) -> DriverResult<String> {
        node.inner_text()
            .await
            .map(|text| text.unwrap_or_default())
            .map_err(|e| self.interaction_error("read text", e))
    }

    async fn read_attribute(&mut self, node: &Element, name: &str) -> DriverResult<Option<String>> {
        // The property carries the resolved absolute URL for href
        let property = node
            .property(name)
            .await
            .map_err(|e| self.interaction_error("read property", e))?;
        if let Some(value) = property.as_ref().and_then(|v| v.as_str()) {
            return Ok(Some(value.to_string()));
        }

        node.attribute(name)
            .await
            .map_err(|e| self.interaction_error("read attribute", e))
    }

    async fn close(&mut self) -> DriverResult<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        self.page = None;

        let result = match self.browser.close().await {
            Ok(_) => {
                if let Err(e) = self.browser.wait().await {
                    tracing::debug!("Waiting for browser exit failed: {}", e);
                }
                Ok(())
            }
            Err(e) => Err(DriverError::Session(format!("Failed to close browser: {}", e))),
        };

        if let Some(task) = self.handler_task.take() {
            task.abort();
        }
        tracing::debug!(
            "Browser session closed ({} profile {})",
            if self.profile.is_temporary() { "temporary" } else { "persistent" },
            self.profile.path().display()
        );
        result
    }
}

impl Drop for ChromeSession {
    fn drop(&mut self) {
        if !self.closed {
            tracing::warn!("Browser session dropped without close, killing browser");
        }
        if let Some(task) = self.handler_task.take() {
            task.abort();
        }
    }
}
