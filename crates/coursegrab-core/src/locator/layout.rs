use super::{LocatorQuery, PathTemplate};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

const DOWNLOADS_ROOT: &str = "/html/body/app-root/app-course-details/main/section/app-course-detail-ui/div/div[3]/app-course-downloads/div";

/// XPath templates for every node the discovery engine touches on a course page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoursePageLayout {
    /// Control that reveals the downloads section
    pub downloads_button: PathTemplate,
    /// Header of the tab at `{tab}`
    pub tab_header: PathTemplate,
    /// Language dropdown trigger of transcript row `{item}`
    pub transcript_dropdown: PathTemplate,
    /// First option of the opened language dropdown
    pub transcript_option: PathTemplate,
    /// Download anchor shown once a language is selected
    pub transcript_anchor: PathTemplate,
    /// Download anchor of lecture row `{item}`
    pub lecture_anchor: PathTemplate,
}

impl Default for CoursePageLayout {
    fn default() -> Self {
        let row = format!("{}/div[{{tab}}]/div[2]/div[{{item}}]", DOWNLOADS_ROOT);
        Self {
            downloads_button: PathTemplate(
                "/html/body/app-root/app-course-details/main/section/app-course-detail-ui/div/div[2]/span[2]"
                    .to_string(),
            ),
            tab_header: PathTemplate(format!("{}/div[{{tab}}]/div[1]", DOWNLOADS_ROOT)),
            transcript_dropdown: PathTemplate(format!("{}/div[1]/app-nptel-dropdown/div", row)),
            transcript_option: PathTemplate(format!("{}/div[1]/app-nptel-dropdown/ul/li", row)),
            transcript_anchor: PathTemplate(format!("{}/div[2]/a", row)),
            lecture_anchor: PathTemplate(format!("{}/div/a", row)),
        }
    }
}

impl CoursePageLayout {
    /// Load a layout from a JSON file and validate it
    pub fn from_file(path: &Path) -> Result<Self> {
        tracing::debug!("Reading page layout from: {}", path.display());

        let file = File::open(path)?;
        let layout: CoursePageLayout = serde_json::from_reader(BufReader::new(file))?;
        layout.validate()?;
        Ok(layout)
    }

    /// Check placeholders: tab headers need `{tab}`, row paths need `{tab}` and `{item}`
    pub fn validate(&self) -> Result<()> {
        let all = [
            ("downloads_button", &self.downloads_button),
            ("tab_header", &self.tab_header),
            ("transcript_dropdown", &self.transcript_dropdown),
            ("transcript_option", &self.transcript_option),
            ("transcript_anchor", &self.transcript_anchor),
            ("lecture_anchor", &self.lecture_anchor),
        ];
        for (name, template) in all {
            PathTemplate::parse(template.as_str())
                .map_err(|e| Error::Layout(format!("{}: {}", name, e)))?;
        }

        if !self.tab_header.has_tab() {
            return Err(Error::Layout("tab_header must contain {tab}".to_string()));
        }
        for (name, template) in &all[2..] {
            if !template.has_tab() || !template.has_item() {
                return Err(Error::Layout(format!(
                    "{} must contain {{tab}} and {{item}}",
                    name
                )));
            }
        }
        Ok(())
    }

    pub fn downloads_button(&self) -> LocatorQuery {
        LocatorQuery::present(self.downloads_button.render(0, 0))
    }

    pub fn tab_header(&self, tab: u32) -> LocatorQuery {
        LocatorQuery::present(self.tab_header.render(tab, 0))
    }

    pub fn transcript_dropdown(&self, tab: u32, item: u32) -> LocatorQuery {
        LocatorQuery::present(self.transcript_dropdown.render(tab, item))
    }

    pub fn transcript_option(&self, tab: u32, item: u32) -> LocatorQuery {
        LocatorQuery::clickable(self.transcript_option.render(tab, item))
    }

    pub fn transcript_anchor(&self, tab: u32, item: u32) -> LocatorQuery {
        LocatorQuery::clickable(self.transcript_anchor.render(tab, item))
    }

    pub fn lecture_anchor(&self, tab: u32, item: u32) -> LocatorQuery {
        LocatorQuery::clickable(self.lecture_anchor.render(tab, item))
    }
}
