use super::{ResourceKind, ResourceLink};
use crate::{Error, Result};
use url::Url;

/// Segment of a share URL path (`/file/d/<ID>/view`) holding the file id
const FILE_ID_SEGMENT: usize = 2;

const DIRECT_DOWNLOAD_URL: &str = "https://drive.google.com/uc?export=download&id=";

/// Turns raw anchor hrefs into canonical resource links
pub struct LinkResolver;

impl LinkResolver {
    pub fn resolve(kind: ResourceKind, href: &str) -> Result<ResourceLink> {
        match kind {
            ResourceKind::Transcript => Self::transcript(href),
            ResourceKind::Lecture => Self::lecture(href),
        }
    }

    /// Share link to a direct download, keyed by the file id
    pub fn transcript(href: &str) -> Result<ResourceLink> {
        let url = parse(href)?;
        let segments: Vec<&str> = url
            .path_segments()
            .map(|segments| segments.collect())
            .unwrap_or_default();

        let file_id = segments
            .get(FILE_ID_SEGMENT)
            .copied()
            .ok_or_else(|| {
                Error::malformed(
                    href,
                    format!(
                        "expected at least {} path segments, found {}",
                        FILE_ID_SEGMENT + 1,
                        segments.len()
                    ),
                )
            })?;
        if file_id.is_empty() {
            return Err(Error::malformed(href, "empty file id"));
        }

        Ok(ResourceLink {
            key: file_id.to_string(),
            url: format!("{}{}", DIRECT_DOWNLOAD_URL, file_id),
            kind: ResourceKind::Transcript,
        })
    }

    /// Media link kept as is, keyed by its filename
    pub fn lecture(href: &str) -> Result<ResourceLink> {
        let url = parse(href)?;
        let filename = url
            .path_segments()
            .and_then(|mut segments| segments.next_back())
            .filter(|segment| !segment.is_empty())
            .ok_or_else(|| Error::malformed(href, "no filename in path"))?;

        Ok(ResourceLink {
            key: filename.to_string(),
            url: href.to_string(),
            kind: ResourceKind::Lecture,
        })
    }
}

fn parse(href: &str) -> Result<Url> {
    Url::parse(href.trim()).map_err(|e| Error::malformed(href, e.to_string()))
}
