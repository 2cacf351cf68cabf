//! Discovery runs: open a course page, find a tab, enumerate its rows.
//!
//! A run walks `Idle → SessionOpen → TabLocated → Enumerating → Closed`.
//! `Failed` can be entered from any state after `Idle`. Whatever happens
//! after the session is launched, it is closed exactly once before
//! [`Discovery::run_until`] returns.

mod items;
mod steps;
mod tabs;

pub use items::{ItemEnumerator, ItemOutcome, ItemReport, ItemSlot, SkipReason};
pub use tabs::{TabCursor, TabDescriptor, TabLocator, TabMatch, TabPosition};

use crate::config::DiscoveryConfig;
use crate::driver::{AutomationDriver, SessionLauncher};
use crate::locator::CoursePageLayout;
use crate::resource::{ResourceKind, ResourceMap};
use crate::retry::Probe;
use crate::{Error, Result};
use std::future::Future;
use tracing::{debug, info, warn};

/// States of a discovery run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Idle,
    SessionOpen,
    TabLocated(TabPosition),
    Enumerating,
    Closed,
    Failed,
}

/// How a run ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiscoveryStatus {
    Completed,
    /// No tab carried the label; the run produced no links
    TabNotFound { label: String, probed: u32 },
}

/// Everything a finished run found
#[derive(Debug, Clone)]
pub struct DiscoveryReport {
    pub kind: ResourceKind,
    pub status: DiscoveryStatus,
    pub tab: Option<TabPosition>,
    pub links: ResourceMap,
    /// Rows that exist but yielded no link
    pub skipped: Vec<(u32, SkipReason)>,
    /// States visited, in order
    pub states: Vec<RunState>,
}

impl DiscoveryReport {
    fn new(kind: ResourceKind) -> Self {
        Self {
            kind,
            status: DiscoveryStatus::Completed,
            tab: None,
            links: ResourceMap::new(),
            skipped: Vec::new(),
            states: Vec::new(),
        }
    }

    pub fn is_complete(&self) -> bool {
        self.status == DiscoveryStatus::Completed
    }

    /// The tab-not-found condition as an error, for callers that want to report it
    pub fn failure(&self) -> Option<Error> {
        match &self.status {
            DiscoveryStatus::Completed => None,
            DiscoveryStatus::TabNotFound { label, probed } => Some(Error::DiscoveryFailed {
                label: label.clone(),
                probed: *probed,
            }),
        }
    }
}

struct StateTrail {
    kind: ResourceKind,
    states: Vec<RunState>,
}

impl StateTrail {
    fn new(kind: ResourceKind) -> Self {
        Self {
            kind,
            states: vec![RunState::Idle],
        }
    }

    fn enter(&mut self, state: RunState) {
        debug!("{} discovery: {:?}", self.kind, state);
        self.states.push(state);
    }
}

/// Runs discovery for one resource kind per call, each on its own session
pub struct Discovery<L> {
    launcher: L,
    layout: CoursePageLayout,
    config: DiscoveryConfig,
}

impl<L: SessionLauncher> Discovery<L> {
    pub fn new(launcher: L, layout: CoursePageLayout, config: DiscoveryConfig) -> Self {
        Self {
            launcher,
            layout,
            config,
        }
    }

    /// Discover every `kind` link on the course page
    pub async fn run(&self, course_url: &str, kind: ResourceKind) -> Result<DiscoveryReport> {
        self.run_until(course_url, kind, std::future::pending()).await
    }

    /// Like [`run`](Self::run), abandoning the run as soon as `cancel` resolves.
    ///
    /// A missing tab is reported through [`DiscoveryReport::status`]. Launch
    /// failures, page-open failures, lost sessions and cancellation are `Err`.
    pub async fn run_until<C>(
        &self,
        course_url: &str,
        kind: ResourceKind,
        cancel: C,
    ) -> Result<DiscoveryReport>
    where
        C: Future<Output = ()>,
    {
        let mut trail = StateTrail::new(kind);

        let mut driver = match self.launcher.launch().await {
            Ok(driver) => driver,
            Err(e) => {
                trail.enter(RunState::Failed);
                return Err(Error::SessionStart(e));
            }
        };
        trail.enter(RunState::SessionOpen);

        let outcome = tokio::select! {
            biased;
            _ = cancel => {
                warn!("{} discovery cancelled", kind);
                Err(Error::Cancelled)
            }
            result = self.discover(&mut driver, course_url, kind, &mut trail) => result,
        };

        if outcome.is_err() {
            trail.enter(RunState::Failed);
        }
        if let Err(e) = driver.close().await {
            warn!("Failed to close automation session: {}", e);
        }
        trail.enter(RunState::Closed);

        outcome.map(|mut report| {
            report.states = trail.states;
            report
        })
    }

    async fn discover(
        &self,
        driver: &mut L::Driver,
        course_url: &str,
        kind: ResourceKind,
        trail: &mut StateTrail,
    ) -> Result<DiscoveryReport> {
        let mut report = DiscoveryReport::new(kind);
        let label = kind.tab_label();
        let timeout = self.config.wait_timeout;

        driver.open_page(course_url).await?;
        info!("Opened course page: {}", course_url);

        // The tab list only renders once the downloads section is open
        let section = steps::click(
            driver,
            self.config.policy(self.config.budgets.tab_probe),
            &self.layout.downloads_button(),
            timeout,
        )
        .await?;
        if let Probe::Absent { last_error, .. } = section {
            warn!("Downloads section not available: {}", last_error);
            report.status = DiscoveryStatus::TabNotFound {
                label: label.to_string(),
                probed: 0,
            };
            return Ok(report);
        }

        let tab = match TabLocator::new(&self.layout, &self.config)
            .locate(driver, label)
            .await?
        {
            TabMatch::Found(tab) => tab,
            TabMatch::NotFound { probed } => {
                report.status = DiscoveryStatus::TabNotFound {
                    label: label.to_string(),
                    probed,
                };
                return Ok(report);
            }
        };
        trail.enter(RunState::TabLocated(tab));
        report.tab = Some(tab);

        trail.enter(RunState::Enumerating);
        let mut items = ItemEnumerator::new(kind, tab, &self.layout, &self.config);
        while let Some(item) = items.next(driver).await? {
            match item.outcome {
                ItemOutcome::Resolved(link) => {
                    report.links.insert(link);
                }
                ItemOutcome::Skipped(reason) => report.skipped.push((item.index, reason)),
            }
        }

        info!(
            "Discovered {} {} link(s), skipped {} row(s)",
            report.links.len(),
            kind,
            report.skipped.len()
        );
        Ok(report)
    }
}
