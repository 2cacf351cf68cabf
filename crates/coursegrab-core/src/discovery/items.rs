use super::steps;
use super::tabs::TabPosition;
use crate::config::DiscoveryConfig;
use crate::driver::{AutomationDriver, DriverError, DriverResult};
use crate::locator::CoursePageLayout;
use crate::resource::{LinkResolver, ResourceKind, ResourceLink};
use crate::retry::Probe;
use std::fmt;
use tracing::{debug, info, warn};

/// One addressable row inside a located tab
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ItemSlot {
    pub tab: TabPosition,
    pub index: u32,
}

/// Why a row that exists produced no link
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// The language option of an opened dropdown never became clickable
    OptionUnavailable(DriverError),
    /// The download anchor never appeared or carried no href
    AnchorUnavailable(DriverError),
    /// The href could not be resolved
    MalformedLink(String),
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::OptionUnavailable(e) => write!(f, "language option unavailable ({})", e),
            SkipReason::AnchorUnavailable(e) => write!(f, "download link unavailable ({})", e),
            SkipReason::MalformedLink(reason) => write!(f, "{}", reason),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemOutcome {
    Resolved(ResourceLink),
    Skipped(SkipReason),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemReport {
    pub index: u32,
    pub outcome: ItemOutcome,
}

/// Walks the rows of a tab in increasing index order.
///
/// The row count is unknown up front. A row is considered absent once its
/// first probe (the language dropdown for transcripts, the anchor itself for
/// lectures) exhausts its budget; rows are contiguous, so that ends the
/// sequence for good. Failures after the first probe only skip the row.
pub struct ItemEnumerator<'a> {
    kind: ResourceKind,
    tab: TabPosition,
    next_index: u32,
    finished: bool,
    layout: &'a CoursePageLayout,
    config: &'a DiscoveryConfig,
}

impl<'a> ItemEnumerator<'a> {
    pub fn new(
        kind: ResourceKind,
        tab: TabPosition,
        layout: &'a CoursePageLayout,
        config: &'a DiscoveryConfig,
    ) -> Self {
        Self {
            kind,
            tab,
            next_index: config.first_item_index,
            finished: false,
            layout,
            config,
        }
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Probe the next row. `None` once the rows are exhausted, and on every call after.
    pub async fn next<D: AutomationDriver>(
        &mut self,
        driver: &mut D,
    ) -> DriverResult<Option<ItemReport>> {
        if self.finished {
            return Ok(None);
        }

        let slot = ItemSlot {
            tab: self.tab,
            index: self.next_index,
        };
        let outcome = match self.kind {
            ResourceKind::Transcript => self.transcript(driver, slot).await,
            ResourceKind::Lecture => self.lecture(driver, slot).await,
        };

        match outcome {
            Ok(Some(outcome)) => {
                self.next_index += 1;
                Ok(Some(ItemReport {
                    index: slot.index,
                    outcome,
                }))
            }
            Ok(None) => {
                self.finished = true;
                info!(
                    "No more {} rows found after {} row(s)",
                    self.kind,
                    slot.index - self.config.first_item_index
                );
                Ok(None)
            }
            Err(e) => {
                self.finished = true;
                Err(e)
            }
        }
    }

    /// Drain the remaining rows
    pub async fn collect<D: AutomationDriver>(
        &mut self,
        driver: &mut D,
    ) -> DriverResult<Vec<ItemReport>> {
        let mut reports = Vec::new();
        while let Some(report) = self.next(driver).await? {
            reports.push(report);
        }
        Ok(reports)
    }

    async fn transcript<D: AutomationDriver>(
        &self,
        driver: &mut D,
        slot: ItemSlot,
    ) -> DriverResult<Option<ItemOutcome>> {
        let (tab, index) = (slot.tab.get(), slot.index);
        let timeout = self.config.wait_timeout;
        let budgets = &self.config.budgets;

        // Step 1: open the language dropdown; absence ends the tab
        let dropdown = self.layout.transcript_dropdown(tab, index);
        let policy = self.config.absence_policy(self.kind);
        if let Probe::Absent { last_error, .. } =
            steps::click(driver, policy, &dropdown, timeout).await?
        {
            debug!("No language dropdown at row {}: {}", index, last_error);
            return Ok(None);
        }

        // Step 2: pick the first language
        let option = self.layout.transcript_option(tab, index);
        let policy = self.config.policy(budgets.option);
        if let Probe::Absent { last_error, .. } =
            steps::click(driver, policy, &option, timeout).await?
        {
            warn!("Skipping transcript row {}: language option unavailable ({})", index, last_error);
            return Ok(Some(ItemOutcome::Skipped(SkipReason::OptionUnavailable(
                last_error,
            ))));
        }
        debug!("Selected language option for row {}", index);

        // Step 3: the anchor shows up once the selection has propagated
        let anchor = self.layout.transcript_anchor(tab, index);
        let policy = self.config.policy(budgets.transcript_anchor);
        match steps::read_attribute(driver, policy, &anchor, "href", timeout).await? {
            Probe::Found(href) => Ok(Some(self.resolve(slot, &href))),
            Probe::Absent { last_error, .. } => {
                warn!("Skipping transcript row {}: download link unavailable ({})", index, last_error);
                Ok(Some(ItemOutcome::Skipped(SkipReason::AnchorUnavailable(
                    last_error,
                ))))
            }
        }
    }

    async fn lecture<D: AutomationDriver>(
        &self,
        driver: &mut D,
        slot: ItemSlot,
    ) -> DriverResult<Option<ItemOutcome>> {
        let anchor = self.layout.lecture_anchor(slot.tab.get(), slot.index);
        let policy = self.config.absence_policy(self.kind);

        match steps::read_attribute(driver, policy, &anchor, "href", self.config.wait_timeout)
            .await?
        {
            Probe::Found(href) => Ok(Some(self.resolve(slot, &href))),
            Probe::Absent { last_error, .. } => {
                debug!("No lecture link at row {}: {}", slot.index, last_error);
                Ok(None)
            }
        }
    }

    fn resolve(&self, slot: ItemSlot, href: &str) -> ItemOutcome {
        match LinkResolver::resolve(self.kind, href) {
            Ok(link) => {
                info!("Download link stored for {} {}", self.kind, link.key);
                ItemOutcome::Resolved(link)
            }
            Err(e) => {
                warn!("Skipping {} row {}: {}", self.kind, slot.index, e);
                ItemOutcome::Skipped(SkipReason::MalformedLink(e.to_string()))
            }
        }
    }
}
