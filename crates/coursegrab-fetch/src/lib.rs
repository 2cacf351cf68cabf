//! Downloads the resources a discovery run resolved.
//!
//! Transcripts are streamed over HTTP into `<dir>/transcripts/`. Lectures are
//! handed to `yt-dlp`, which extracts mp3 audio into `<dir>/lectures/`.

mod error;
mod lecture;
mod transcript;

pub use error::{Error, Result};
pub use lecture::{LectureFetcher, audio_path, build_args as ytdlp_args};
pub use transcript::{TranscriptFetcher, filename_from_content_disposition};

use coursegrab_core::{ResourceKind, ResourceLink, ResourceMap};
use std::future::Future;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Where and how resources are fetched
#[derive(Debug, Clone)]
pub struct FetchConfig {
    pub download_dir: PathBuf,
    /// Pause between consecutive items
    pub pause: Duration,
    pub ytdlp_binary: PathBuf,
}

impl FetchConfig {
    pub fn new(download_dir: impl Into<PathBuf>) -> Self {
        Self {
            download_dir: download_dir.into(),
            pause: Duration::from_secs(1),
            ytdlp_binary: PathBuf::from("yt-dlp"),
        }
    }

    pub fn with_pause(mut self, pause: Duration) -> Self {
        self.pause = pause;
        self
    }

    pub fn with_ytdlp_binary(mut self, binary: impl Into<PathBuf>) -> Self {
        self.ytdlp_binary = binary.into();
        self
    }

    pub fn dir_for(&self, kind: ResourceKind) -> PathBuf {
        match kind {
            ResourceKind::Transcript => self.download_dir.join("transcripts"),
            ResourceKind::Lecture => self.download_dir.join("lectures"),
        }
    }
}

/// A resource that could not be fetched
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchFailure {
    pub kind: ResourceKind,
    pub key: String,
    pub reason: String,
}

/// Outcome of `Fetcher::fetch_all`
#[derive(Debug, Clone, Default)]
pub struct FetchReport {
    pub downloaded: Vec<PathBuf>,
    pub failed: Vec<FetchFailure>,
}

impl FetchReport {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

pub struct Fetcher {
    config: FetchConfig,
    transcripts: TranscriptFetcher,
}

impl Fetcher {
    pub fn new(config: FetchConfig) -> Result<Self> {
        Ok(Self {
            config,
            transcripts: TranscriptFetcher::new()?,
        })
    }

    /// Fetch every link of `map` in order
    ///
    /// A failing item is recorded in the report and the next one proceeds.
    pub async fn fetch_all(&self, map: &ResourceMap) -> FetchReport {
        let (report, _) = self.fetch_until(map, std::future::pending()).await;
        report
    }

    /// Like [`fetch_all`](Self::fetch_all), stopping as soon as `cancel` resolves.
    ///
    /// The item in flight is abandoned: its HTTP transfer is dropped with the
    /// partial file, and a running `yt-dlp` is killed.
    pub async fn fetch_all_until<C>(&self, map: &ResourceMap, cancel: C) -> Result<FetchReport>
    where
        C: Future<Output = ()>,
    {
        match self.fetch_until(map, cancel).await {
            (report, false) => Ok(report),
            (report, true) => {
                tracing::warn!("Download cancelled after {} file(s)", report.downloaded.len());
                Err(Error::Cancelled {
                    downloaded: report.downloaded.len(),
                })
            }
        }
    }

    /// The report so far, and whether `cancel` cut the run short
    async fn fetch_until<C>(&self, map: &ResourceMap, cancel: C) -> (FetchReport, bool)
    where
        C: Future<Output = ()>,
    {
        tokio::pin!(cancel);
        let mut report = FetchReport::default();
        // Located on the first lecture, then reused
        let mut lectures: Option<std::result::Result<LectureFetcher, String>> = None;

        for (position, link) in map.iter().enumerate() {
            let fetch = async {
                if position > 0 && !self.config.pause.is_zero() {
                    tokio::time::sleep(self.config.pause).await;
                }
                self.fetch_one(link, &mut lectures).await
            };
            let result = tokio::select! {
                biased;
                _ = &mut cancel => return (report, true),
                result = fetch => result,
            };

            match result {
                Ok(path) => {
                    tracing::info!("Downloaded {} {}", link.kind, path.display());
                    report.downloaded.push(path);
                }
                Err(reason) => {
                    tracing::warn!("Failed to download {} {}: {}", link.kind, link.key, reason);
                    report.failed.push(FetchFailure {
                        kind: link.kind,
                        key: link.key.clone(),
                        reason,
                    });
                }
            }
        }

        (report, false)
    }

    async fn fetch_one(
        &self,
        link: &ResourceLink,
        lectures: &mut Option<std::result::Result<LectureFetcher, String>>,
    ) -> std::result::Result<PathBuf, String> {
        let dir = self.config.dir_for(link.kind);
        match link.kind {
            ResourceKind::Transcript => self.fetch_transcript(link, &dir).await,
            ResourceKind::Lecture => {
                let fetcher = lectures.get_or_insert_with(|| {
                    LectureFetcher::locate(&self.config.ytdlp_binary).map_err(|e| e.to_string())
                });
                match fetcher {
                    Ok(fetcher) => Self::fetch_lecture(fetcher, link, &dir).await,
                    Err(reason) => Err(reason.clone()),
                }
            }
        }
    }

    async fn fetch_transcript(
        &self,
        link: &ResourceLink,
        dir: &Path,
    ) -> std::result::Result<PathBuf, String> {
        ensure_dir(dir).await.map_err(|e| e.to_string())?;
        self.transcripts
            .fetch(link, dir)
            .await
            .map_err(|e| e.to_string())
    }

    async fn fetch_lecture(
        fetcher: &LectureFetcher,
        link: &ResourceLink,
        dir: &Path,
    ) -> std::result::Result<PathBuf, String> {
        ensure_dir(dir).await.map_err(|e| e.to_string())?;
        fetcher.fetch(link, dir).await.map_err(|e| e.to_string())
    }
}

async fn ensure_dir(dir: &Path) -> Result<()> {
    tokio::fs::create_dir_all(dir)
        .await
        .map_err(|e| Error::io(dir, e))
}
