use crate::{Error, Result};
use coursegrab_core::ResourceLink;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use tokio::process::Command;

/// Downloads lecture media as mp3 audio through `yt-dlp`
pub struct LectureFetcher {
    binary: PathBuf,
}

impl LectureFetcher {
    /// Resolve the `yt-dlp` executable, searching `PATH` for bare names
    pub fn locate(binary: &Path) -> Result<Self> {
        let binary = which::which(binary)
            .map_err(|_| Error::ToolMissing(binary.display().to_string()))?;
        tracing::debug!("Using yt-dlp at {}", binary.display());
        Ok(Self { binary })
    }

    /// Download one lecture, returning the extracted `dir/<key stem>.mp3`
    ///
    /// The child is killed if the returned future is dropped.
    pub async fn fetch(&self, link: &ResourceLink, dir: &Path) -> Result<PathBuf> {
        let output_path = dir.join(&link.key);
        let output = Command::new(&self.binary)
            .args(build_args(&link.url, &output_path))
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| Error::io(&self.binary, e))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(Error::Tool(format!(
                "{} ({})",
                stderr.trim(),
                output.status
            )));
        }

        Ok(audio_path(&output_path))
    }
}

/// Best audio stream, extracted and transcoded to mp3 at top quality
pub fn build_args(url: &str, output_path: &Path) -> Vec<OsString> {
    let mut args: Vec<OsString> = [
        "-f",
        "bestaudio/best",
        "-x",
        "--audio-format",
        "mp3",
        "--audio-quality",
        "0",
        "-o",
    ]
    .into_iter()
    .map(OsString::from)
    .collect();
    args.push(output_path.as_os_str().to_os_string());
    args.push(OsString::from(url));
    args
}

/// Where `yt-dlp -x --audio-format mp3` leaves the audio for `output_path`
pub fn audio_path(output_path: &Path) -> PathBuf {
    output_path.with_extension("mp3")
}
