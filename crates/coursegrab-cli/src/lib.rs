use clap::ValueEnum;
use coursegrab_core::ResourceKind;

pub mod commands;

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
pub enum OutputFormat {
    Pretty,
    Json,
}

impl OutputFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutputFormat::Pretty => "pretty",
            OutputFormat::Json => "json",
        }
    }
}

/// Which resources to download, given as `-t`, `-l` or `-tl`
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum DownloadSelection {
    Transcripts,
    Lectures,
    Both,
}

impl DownloadSelection {
    /// Parse a `--download_type` value; the leading hyphen is optional
    pub fn parse(value: &str) -> Result<Self, String> {
        match value.trim_start_matches('-') {
            "t" => Ok(DownloadSelection::Transcripts),
            "l" => Ok(DownloadSelection::Lectures),
            "tl" | "lt" => Ok(DownloadSelection::Both),
            _ => Err(format!(
                "invalid download type '{}': expected -t, -l or -tl",
                value
            )),
        }
    }

    /// Kinds to discover, lectures first
    pub fn kinds(&self) -> Vec<ResourceKind> {
        match self {
            DownloadSelection::Transcripts => vec![ResourceKind::Transcript],
            DownloadSelection::Lectures => vec![ResourceKind::Lecture],
            DownloadSelection::Both => vec![ResourceKind::Lecture, ResourceKind::Transcript],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_download_selection() {
        assert_eq!(DownloadSelection::parse("-t"), Ok(DownloadSelection::Transcripts));
        assert_eq!(DownloadSelection::parse("-l"), Ok(DownloadSelection::Lectures));
        assert_eq!(DownloadSelection::parse("-tl"), Ok(DownloadSelection::Both));
        assert_eq!(DownloadSelection::parse("tl"), Ok(DownloadSelection::Both));
        assert!(DownloadSelection::parse("-x").is_err());
        assert!(DownloadSelection::parse("").is_err());
    }

    #[test]
    fn test_lectures_are_discovered_first() {
        assert_eq!(
            DownloadSelection::Both.kinds(),
            vec![ResourceKind::Lecture, ResourceKind::Transcript]
        );
        assert_eq!(
            DownloadSelection::Transcripts.kinds(),
            vec![ResourceKind::Transcript]
        );
    }
}
