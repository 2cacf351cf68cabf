use crate::{Error, Result};
use coursegrab_core::ResourceLink;
use futures::StreamExt;
use reqwest::header::CONTENT_DISPOSITION;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;

/// Downloads transcript files over HTTP
pub struct TranscriptFetcher {
    client: reqwest::Client,
}

impl TranscriptFetcher {
    pub fn new() -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("coursegrab/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { client })
    }

    /// Stream one transcript into `dir`, returning the written path
    ///
    /// The file is named from the response's `Content-Disposition` header,
    /// falling back to `<key>.txt`.
    pub async fn fetch(&self, link: &ResourceLink, dir: &Path) -> Result<PathBuf> {
        let response = self
            .client
            .get(&link.url)
            .send()
            .await?
            .error_for_status()?;

        let filename = response
            .headers()
            .get(CONTENT_DISPOSITION)
            .and_then(|value| value.to_str().ok())
            .and_then(filename_from_content_disposition)
            .unwrap_or_else(|| format!("{}.txt", link.key));
        let path = dir.join(filename);

        // Written under a temporary name, removed if dropped before `persist`
        let partial = tempfile::Builder::new()
            .prefix(".coursegrab-")
            .suffix(".part")
            .tempfile_in(dir)
            .map_err(|e| Error::io(dir, e))?;
        let std_file = partial.reopen().map_err(|e| Error::io(partial.path(), e))?;
        let mut file = tokio::fs::File::from_std(std_file);

        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let data = chunk?;
            file.write_all(&data)
                .await
                .map_err(|e| Error::io(partial.path(), e))?;
        }
        file.flush().await.map_err(|e| Error::io(partial.path(), e))?;
        drop(file);

        partial
            .persist(&path)
            .map_err(|e| Error::io(&path, e.error))?;

        Ok(path)
    }
}

/// Extract the `filename=` parameter of a `Content-Disposition` value
///
/// Surrounding quotes are stripped and only the final path component is kept.
pub fn filename_from_content_disposition(value: &str) -> Option<String> {
    let (_, rest) = value.split_once("filename=")?;
    let raw = rest.split(';').next().unwrap_or(rest).trim().trim_matches('"');
    let name = raw.rsplit(['/', '\\']).next().unwrap_or(raw).trim();

    if name.is_empty() || name == "." || name == ".." {
        None
    } else {
        Some(name.to_string())
    }
}
