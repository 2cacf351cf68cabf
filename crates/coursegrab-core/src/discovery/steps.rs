use crate::driver::{AutomationDriver, DriverError, DriverResult};
use crate::locator::LocatorQuery;
use crate::retry::{Probe, RetryPolicy};
use std::time::Duration;
use tracing::debug;

/// Locate `query` and click it, retried under `policy`
pub(crate) async fn click<D: AutomationDriver>(
    driver: &mut D,
    policy: RetryPolicy,
    query: &LocatorQuery,
    timeout: Duration,
) -> DriverResult<Probe<()>> {
    policy
        .attempt(driver, |driver, attempt| {
            let query = query.clone();
            Box::pin(async move {
                debug!(
                    "Attempt {}/{} to click {}",
                    attempt.number, attempt.max_attempts, query.path
                );
                let node = driver.locate(&query, timeout).await?;
                driver.click(&node).await
            })
        })
        .await
}

/// Locate `query` and read attribute `name`; a missing attribute counts as a failed attempt
pub(crate) async fn read_attribute<D: AutomationDriver>(
    driver: &mut D,
    policy: RetryPolicy,
    query: &LocatorQuery,
    name: &'static str,
    timeout: Duration,
) -> DriverResult<Probe<String>> {
    policy
        .attempt(driver, |driver, attempt| {
            let query = query.clone();
            Box::pin(async move {
                debug!(
                    "Attempt {}/{} to read {} of {}",
                    attempt.number, attempt.max_attempts, name, query.path
                );
                let node = driver.locate(&query, timeout).await?;
                driver
                    .read_attribute(&node, name)
                    .await?
                    .filter(|value| !value.is_empty())
                    .ok_or_else(|| {
                        DriverError::Interaction(format!("{} has no {} attribute", query.path, name))
                    })
            })
        })
        .await
}
