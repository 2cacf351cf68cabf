#![allow(dead_code)]

//! Deterministic in-memory course page for driving the discovery engine.

use async_trait::async_trait;
use coursegrab_core::{
    AutomationDriver, CoursePageLayout, DiscoveryConfig, DriverError, DriverResult, LocatorQuery,
    PathTemplate, SessionLauncher,
};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// A node of the fake page
#[derive(Debug, Clone, Default)]
pub struct FakeNode {
    text: String,
    href: Option<String>,
    /// Locates that fail with NotFound before the node shows up
    locate_failures: u32,
    /// Clicks that fail with Interaction before one succeeds
    click_failures: u32,
    /// Node that must have been clicked before this one renders
    requires: Option<String>,
}

impl FakeNode {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(mut self, text: &str) -> Self {
        self.text = text.to_string();
        self
    }

    pub fn href(mut self, href: &str) -> Self {
        self.href = Some(href.to_string());
        self
    }

    pub fn missing_for(mut self, locates: u32) -> Self {
        self.locate_failures = locates;
        self
    }

    pub fn failing_clicks(mut self, clicks: u32) -> Self {
        self.click_failures = clicks;
        self
    }

    pub fn after_click_of(mut self, path: &str) -> Self {
        self.requires = Some(path.to_string());
        self
    }
}

/// Everything the fake saw, shared between launcher and drivers
#[derive(Debug, Default)]
pub struct FakeLog {
    pub launches: u32,
    pub opened: Vec<String>,
    pub located: Vec<String>,
    pub clicked: Vec<String>,
    pub closes: u32,
}

impl FakeLog {
    pub fn located_matching(&self, prefix: &str) -> Vec<String> {
        self.located
            .iter()
            .filter(|path| path.starts_with(prefix))
            .cloned()
            .collect()
    }

    pub fn locate_count(&self, path: &str) -> usize {
        self.located.iter().filter(|p| p.as_str() == path).count()
    }
}

#[derive(Debug, Clone, Default)]
pub struct FakePage {
    nodes: HashMap<String, FakeNode>,
}

impl FakePage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Page with a downloads button and one header per label at positions 1..
    pub fn with_tabs(labels: &[&str]) -> Self {
        let mut page = Self::new().with_node(DOWNLOADS, FakeNode::new().text("Downloads"));
        for (i, label) in labels.iter().enumerate() {
            page = page.with_node(&tab(i as u32 + 1), FakeNode::new().text(label));
        }
        page
    }

    pub fn with_node(mut self, path: &str, node: FakeNode) -> Self {
        self.nodes.insert(path.to_string(), node);
        self
    }

    /// Transcript row: dropdown, option shown after the dropdown click, anchor after the option click
    pub fn with_transcript_row(self, tab: u32, item: u32, file_id: &str) -> Self {
        self.with_transcript_row_nodes(
            tab,
            item,
            FakeNode::new(),
            FakeNode::new().text("English"),
            FakeNode::new().href(&format!("https://drive.google.com/file/d/{}/view", file_id)),
        )
    }

    pub fn with_transcript_row_nodes(
        self,
        tab: u32,
        item: u32,
        dropdown: FakeNode,
        option: FakeNode,
        anchor: FakeNode,
    ) -> Self {
        let dropdown_path = transcript_dropdown(tab, item);
        let option_path = transcript_option(tab, item);
        self.with_node(&dropdown_path, dropdown)
            .with_node(&option_path, option.after_click_of(&dropdown_path))
            .with_node(&transcript_anchor(tab, item), anchor.after_click_of(&option_path))
    }

    pub fn with_lecture_row(self, tab: u32, item: u32, filename: &str) -> Self {
        self.with_node(
            &lecture_anchor(tab, item),
            FakeNode::new().href(&format!("https://media.example.com/videos/{}", filename)),
        )
    }
}

pub const DOWNLOADS: &str = "downloads";

pub fn tab(position: u32) -> String {
    format!("tab[{}]", position)
}

pub fn transcript_dropdown(tab: u32, item: u32) -> String {
    format!("tab[{}]/row[{}]/dropdown", tab, item)
}

pub fn transcript_option(tab: u32, item: u32) -> String {
    format!("tab[{}]/row[{}]/option", tab, item)
}

pub fn transcript_anchor(tab: u32, item: u32) -> String {
    format!("tab[{}]/row[{}]/download", tab, item)
}

pub fn lecture_anchor(tab: u32, item: u32) -> String {
    format!("tab[{}]/row[{}]/a", tab, item)
}

/// Layout addressing the fake page
pub fn layout() -> CoursePageLayout {
    CoursePageLayout {
        downloads_button: PathTemplate::parse(DOWNLOADS).unwrap(),
        tab_header: PathTemplate::parse("tab[{tab}]").unwrap(),
        transcript_dropdown: PathTemplate::parse("tab[{tab}]/row[{item}]/dropdown").unwrap(),
        transcript_option: PathTemplate::parse("tab[{tab}]/row[{item}]/option").unwrap(),
        transcript_anchor: PathTemplate::parse("tab[{tab}]/row[{item}]/download").unwrap(),
        lecture_anchor: PathTemplate::parse("tab[{tab}]/row[{item}]/a").unwrap(),
    }
}

pub fn config() -> DiscoveryConfig {
    DiscoveryConfig::new()
        .with_wait_timeout(Duration::from_millis(100))
        .with_backoff(Duration::from_secs(1))
}

pub struct FakeDriver {
    page: FakePage,
    clicked: HashSet<String>,
    log: Arc<Mutex<FakeLog>>,
    locate_delay: Duration,
    fail_open: bool,
}

impl FakeDriver {
    pub fn new(page: FakePage) -> Self {
        Self {
            page,
            clicked: HashSet::new(),
            log: Arc::new(Mutex::new(FakeLog::default())),
            locate_delay: Duration::ZERO,
            fail_open: false,
        }
    }

    pub fn log(&self) -> Arc<Mutex<FakeLog>> {
        Arc::clone(&self.log)
    }
}

#[async_trait]
impl AutomationDriver for FakeDriver {
    type Node = String;

    async fn open_page(&mut self, url: &str) -> DriverResult<()> {
        self.log.lock().unwrap().opened.push(url.to_string());
        if self.fail_open {
            return Err(DriverError::Session(format!("cannot open {}", url)));
        }
        Ok(())
    }

    async fn locate(&mut self, query: &LocatorQuery, _timeout: Duration) -> DriverResult<String> {
        if !self.locate_delay.is_zero() {
            tokio::time::sleep(self.locate_delay).await;
        }
        self.log.lock().unwrap().located.push(query.path.clone());

        let not_found = || DriverError::NotFound(query.path.clone());
        let node = self.page.nodes.get_mut(&query.path).ok_or_else(not_found)?;
        if let Some(required) = &node.requires {
            if !self.clicked.contains(required) {
                return Err(not_found());
            }
        }
        if node.locate_failures > 0 {
            node.locate_failures -= 1;
            return Err(not_found());
        }
        Ok(query.path.clone())
    }

    async fn click(&mut self, node: &String) -> DriverResult<()> {
        if let Some(fake) = self.page.nodes.get_mut(node) {
            if fake.click_failures > 0 {
                fake.click_failures -= 1;
                return Err(DriverError::Interaction(format!("{} is not clickable", node)));
            }
        }
        self.clicked.insert(node.clone());
        self.log.lock().unwrap().clicked.push(node.clone());
        Ok(())
    }

    async fn read_text(&mut self, node: &String) -> DriverResult<String> {
        Ok(self
            .page
            .nodes
            .get(node)
            .map(|n| n.text.clone())
            .unwrap_or_default())
    }

    async fn read_attribute(&mut self, node: &String, name: &str) -> DriverResult<Option<String>> {
        if name != "href" {
            return Ok(None);
        }
        Ok(self.page.nodes.get(node).and_then(|n| n.href.clone()))
    }

    async fn close(&mut self) -> DriverResult<()> {
        self.log.lock().unwrap().closes += 1;
        Ok(())
    }
}

/// Hands out a fresh driver over the same page for every run
pub struct FakeLauncher {
    page: FakePage,
    log: Arc<Mutex<FakeLog>>,
    locate_delay: Duration,
    fail_launch: bool,
    fail_open: bool,
}

impl FakeLauncher {
    pub fn new(page: FakePage) -> Self {
        Self {
            page,
            log: Arc::new(Mutex::new(FakeLog::default())),
            locate_delay: Duration::ZERO,
            fail_launch: false,
            fail_open: false,
        }
    }

    pub fn with_locate_delay(mut self, delay: Duration) -> Self {
        self.locate_delay = delay;
        self
    }

    pub fn failing_launch(mut self) -> Self {
        self.fail_launch = true;
        self
    }

    pub fn failing_open(mut self) -> Self {
        self.fail_open = true;
        self
    }

    pub fn log(&self) -> Arc<Mutex<FakeLog>> {
        Arc::clone(&self.log)
    }
}

#[async_trait]
impl SessionLauncher for FakeLauncher {
    type Driver = FakeDriver;

    async fn launch(&self) -> DriverResult<FakeDriver> {
        self.log.lock().unwrap().launches += 1;
        if self.fail_launch {
            return Err(DriverError::Session("no browser available".to_string()));
        }
        Ok(FakeDriver {
            page: self.page.clone(),
            clicked: HashSet::new(),
            log: Arc::clone(&self.log),
            locate_delay: self.locate_delay,
            fail_open: self.fail_open,
        })
    }
}
