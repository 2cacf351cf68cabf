use crate::{DownloadSelection, OutputFormat};
use anyhow::{Context, Result};
use coursegrab_browser::{ChromeLauncher, LaunchOptions};
use coursegrab_core::{
    CoursePageLayout, Discovery, DiscoveryConfig, DiscoveryReport, DiscoveryStatus, ResourceKind,
    ResourceLink, ResourceMap,
};
use coursegrab_fetch::{FetchConfig, Fetcher};
use serde::Serialize;
use std::path::PathBuf;
use std::time::Duration;

/// Everything one `coursegrab` invocation needs
pub struct DownloadArgs {
    pub course_url: String,
    pub download_dir: PathBuf,
    pub selection: DownloadSelection,
    pub launch: LaunchOptions,
    pub timeout: Duration,
    pub layout: Option<PathBuf>,
    /// Print the discovered links instead of downloading them
    pub list: bool,
    pub format: OutputFormat,
}

pub fn execute(args: DownloadArgs) -> Result<()> {
    let layout = match &args.layout {
        Some(path) => {
            println!("📐 Using page layout from {}", path.display());
            CoursePageLayout::from_file(path)
                .with_context(|| format!("Invalid layout file {}", path.display()))?
        }
        None => CoursePageLayout::default(),
    };
    let config = DiscoveryConfig::default().with_wait_timeout(args.timeout);

    // Create tokio runtime for async operations
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    let result = runtime.block_on(run(&args, layout, config));

    // Do not wait on a browser process that ignored shutdown
    runtime.shutdown_timeout(Duration::from_millis(100));

    result
}

async fn run(args: &DownloadArgs, layout: CoursePageLayout, config: DiscoveryConfig) -> Result<()> {
    let discovery = Discovery::new(ChromeLauncher::new(args.launch.clone()), layout, config);

    let mut links = ResourceMap::new();
    let mut reports = Vec::new();
    for kind in args.selection.kinds() {
        println!("🔍 Discovering {} links on {}", kind, args.course_url);
        let report = discovery
            .run_until(&args.course_url, kind, interrupted())
            .await
            .with_context(|| format!("{} discovery failed", kind))?;

        match &report.status {
            DiscoveryStatus::Completed => {
                println!("✅ Found {} {} link(s)", report.links.len(), kind)
            }
            DiscoveryStatus::TabNotFound { label, probed } => println!(
                "⚠️  No '{}' tab found after probing {} position(s), skipping {}s",
                label, probed, kind
            ),
        }
        for (index, reason) in &report.skipped {
            println!("⚠️  Skipped {} row {}: {}", kind, index, reason);
        }

        links.extend(report.links.clone());
        reports.push(report);
    }

    if args.list {
        tracing::debug!("Listing links as {}", args.format.as_str());
        return match args.format {
            OutputFormat::Json => output_json(&reports),
            OutputFormat::Pretty => {
                output_pretty(&reports);
                Ok(())
            }
        };
    }

    if links.is_empty() {
        println!("Nothing to download");
        return Ok(());
    }

    let fetcher = Fetcher::new(FetchConfig::new(&args.download_dir))?;
    println!(
        "📥 Downloading {} file(s) into {}",
        links.len(),
        args.download_dir.display()
    );
    let report = fetcher
        .fetch_all_until(&links, interrupted())
        .await
        .context("Download interrupted")?;

    println!(
        "✅ Downloaded {} of {} file(s)",
        report.downloaded.len(),
        links.len()
    );
    if !report.is_complete() {
        for failure in &report.failed {
            println!("❌ {} {}: {}", failure.kind, failure.key, failure.reason);
        }
        anyhow::bail!("{} download(s) failed", report.failed.len());
    }

    Ok(())
}

/// Resolves on Ctrl-C; never resolves where the signal is unavailable
///
/// Once installed, the listener replaces the default SIGINT handler for the
/// rest of the process. Every long-running phase races against its own call.
async fn interrupted() {
    if tokio::signal::ctrl_c().await.is_err() {
        std::future::pending::<()>().await;
    }
    println!("\n🛑 Interrupted, stopping...");
}

#[derive(Serialize)]
struct Listing<'a> {
    kind: ResourceKind,
    tab_found: bool,
    links: Vec<&'a ResourceLink>,
    skipped: Vec<SkippedRow>,
}

#[derive(Serialize)]
struct SkippedRow {
    index: u32,
    reason: String,
}

fn output_json(reports: &[DiscoveryReport]) -> Result<()> {
    let listings: Vec<Listing<'_>> = reports
        .iter()
        .map(|report| Listing {
            kind: report.kind,
            tab_found: report.is_complete(),
            links: report.links.iter().collect(),
            skipped: report
                .skipped
                .iter()
                .map(|(index, reason)| SkippedRow {
                    index: *index,
                    reason: reason.to_string(),
                })
                .collect(),
        })
        .collect();

    println!("{}", serde_json::to_string_pretty(&listings)?);
    Ok(())
}

fn output_pretty(reports: &[DiscoveryReport]) {
    use console::style;

    for report in reports {
        let title = format!("{} links ({})", report.kind, report.links.len());
        println!("\n{}", style(&title).bold().cyan());
        println!("{}", style("=".repeat(title.len())).cyan());

        if let Some(tab) = report.tab {
            println!("Tab position: {}", tab);
        }
        for link in &report.links {
            println!("  {}  {}", style(&link.key).bold(), style(&link.url).dim());
        }
        if !report.skipped.is_empty() {
            println!("{}", style("Skipped rows:").yellow());
            for (index, reason) in &report.skipped {
                println!("  {}: {}", index, reason);
            }
        }
    }
}
