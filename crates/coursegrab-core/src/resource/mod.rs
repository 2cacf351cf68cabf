mod resolver;

pub use resolver::LinkResolver;

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Kind of downloadable course resource
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
    Transcript,
    Lecture,
}

impl ResourceKind {
    /// Text the tab header of this kind renders
    pub fn tab_label(&self) -> &'static str {
        match self {
            ResourceKind::Transcript => "Transcripts",
            ResourceKind::Lecture => "Videos",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceKind::Transcript => "transcript",
            ResourceKind::Lecture => "lecture",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A resolved, directly fetchable resource
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceLink {
    /// Transcript file id or lecture filename
    pub key: String,
    pub url: String,
    pub kind: ResourceKind,
}

/// Resource links of a run, in discovery order
///
/// Keys are namespaced by kind. Inserting an existing key replaces the earlier
/// link in place.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ResourceMap {
    links: Vec<ResourceLink>,
    #[serde(skip)]
    index: HashMap<(ResourceKind, String), usize>,
}

impl ResourceMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a link, returning the link it replaced
    pub fn insert(&mut self, link: ResourceLink) -> Option<ResourceLink> {
        let slot = (link.kind, link.key.clone());
        match self.index.get(&slot) {
            Some(&position) => Some(std::mem::replace(&mut self.links[position], link)),
            None => {
                self.index.insert(slot, self.links.len());
                self.links.push(link);
                None
            }
        }
    }

    /// Append every link of `other`, with the same overwrite rule as `insert`
    pub fn extend(&mut self, other: ResourceMap) {
        for link in other.links {
            self.insert(link);
        }
    }

    pub fn get(&self, kind: ResourceKind, key: &str) -> Option<&ResourceLink> {
        self.index
            .get(&(kind, key.to_string()))
            .map(|&position| &self.links[position])
    }

    pub fn iter(&self) -> impl Iterator<Item = &ResourceLink> {
        self.links.iter()
    }

    pub fn of_kind(&self, kind: ResourceKind) -> impl Iterator<Item = &ResourceLink> {
        self.links.iter().filter(move |link| link.kind == kind)
    }

    pub fn len(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }
}

impl<'a> IntoIterator for &'a ResourceMap {
    type Item = &'a ResourceLink;
    type IntoIter = std::slice::Iter<'a, ResourceLink>;

    fn into_iter(self) -> Self::IntoIter {
        self.links.iter()
    }
}
