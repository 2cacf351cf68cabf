mod layout;

pub use layout::CoursePageLayout;

use serde::{Deserialize, Serialize};
use std::fmt;

/// Condition a located node has to satisfy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Condition {
    /// Attached to the DOM
    Present,
    /// Attached, visible and enabled
    Clickable,
}

/// Reference to exactly one UI node: an XPath plus the condition to wait for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocatorQuery {
    pub path: String,
    pub condition: Condition,
}

impl LocatorQuery {
    pub fn present(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            condition: Condition::Present,
        }
    }

    pub fn clickable(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            condition: Condition::Clickable,
        }
    }
}

impl fmt::Display for LocatorQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?} {}", self.condition, self.path)
    }
}

const TAB_PLACEHOLDER: &str = "{tab}";
const ITEM_PLACEHOLDER: &str = "{item}";

/// Structural path with `{tab}` and `{item}` placeholders
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PathTemplate(String);

impl PathTemplate {
    /// Parse a template, rejecting any placeholder other than `{tab}` and `{item}`
    pub fn parse(template: &str) -> crate::Result<Self> {
        let mut rest = template;
        while let Some(start) = rest.find('{') {
            let tail = &rest[start..];
            let end = tail.find('}').ok_or_else(|| {
                crate::Error::Layout(format!("Unclosed placeholder in '{}'", template))
            })?;
            let placeholder = &tail[..=end];
            if placeholder != TAB_PLACEHOLDER && placeholder != ITEM_PLACEHOLDER {
                return Err(crate::Error::Layout(format!(
                    "Unknown placeholder {} in '{}'",
                    placeholder, template
                )));
            }
            rest = &tail[end + 1..];
        }
        Ok(Self(template.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn has_tab(&self) -> bool {
        self.0.contains(TAB_PLACEHOLDER)
    }

    pub fn has_item(&self) -> bool {
        self.0.contains(ITEM_PLACEHOLDER)
    }

    /// Substitute the tab position and item index
    pub fn render(&self, tab: u32, item: u32) -> String {
        self.0
            .replace(TAB_PLACEHOLDER, &tab.to_string())
            .replace(ITEM_PLACEHOLDER, &item.to_string())
    }
}
