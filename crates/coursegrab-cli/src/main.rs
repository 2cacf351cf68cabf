use anyhow::Result;
use clap::{CommandFactory, Parser};
use clap_complete::Shell;
use coursegrab_browser::{LaunchOptions, ProfileChoice};
use coursegrab_cli::commands::{self, download::DownloadArgs};
use coursegrab_cli::{DownloadSelection, OutputFormat};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser)]
#[command(name = "coursegrab")]
#[command(author, version, long_about = None)]
#[command(
    about = "Download transcripts and lecture audio from an NPTEL course page",
    long_about = "coursegrab opens the course page in Chrome, walks the Downloads section to \
                  collect transcript and lecture links, then downloads them. Transcripts are \
                  saved under <DOWNLOAD_DIR>/transcripts and lectures are converted to mp3 \
                  under <DOWNLOAD_DIR>/lectures (requires yt-dlp)."
)]
struct Cli {
    /// Course page URL
    #[arg(value_name = "COURSE_URL", required_unless_present = "completions")]
    course_url: Option<String>,

    /// Directory downloads are written to
    #[arg(value_name = "DOWNLOAD_DIR", required_unless_present = "completions")]
    download_dir: Option<PathBuf>,

    /// What to download: -t transcripts, -l lectures, -tl both
    #[arg(
        short = 'd',
        long = "download_type",
        value_name = "TYPE",
        default_value = "-tl",
        allow_hyphen_values = true,
        value_parser = DownloadSelection::parse
    )]
    download_type: DownloadSelection,

    /// Path to the Chrome binary
    #[arg(long, env = "COURSEGRAB_CHROME")]
    chrome_path: Option<PathBuf>,

    /// Chrome profile directory to reuse (e.g. an already logged-in profile)
    #[arg(long, value_name = "DIR", conflicts_with = "profile_name")]
    profile: Option<PathBuf>,

    /// Named profile kept under ~/.coursegrab/profiles
    #[arg(long, value_name = "NAME")]
    profile_name: Option<String>,

    /// Run Chrome without a window
    #[arg(long)]
    headless: bool,

    /// Seconds to wait for each page element
    #[arg(long, value_name = "SECS", default_value_t = 20)]
    timeout: u64,

    /// JSON file overriding the page element paths
    #[arg(long, value_name = "FILE")]
    layout: Option<PathBuf>,

    /// Discover and print links without downloading
    #[arg(long)]
    list: bool,

    /// Listing format
    #[arg(short, long, value_enum, default_value = "pretty")]
    format: OutputFormat,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Print a shell completion script and exit
    #[arg(long, value_name = "SHELL", exclusive = true)]
    completions: Option<Shell>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    init_logging(cli.verbose);

    if let Some(shell) = cli.completions {
        return commands::completion::execute(shell, &mut Cli::command());
    }

    let (Some(course_url), Some(download_dir)) = (cli.course_url, cli.download_dir) else {
        anyhow::bail!("COURSE_URL and DOWNLOAD_DIR are required");
    };

    let profile = match (cli.profile, cli.profile_name) {
        (Some(dir), _) => ProfileChoice::Directory(dir),
        (None, Some(name)) => ProfileChoice::Named(name),
        (None, None) => ProfileChoice::Temporary,
    };

    commands::download::execute(DownloadArgs {
        course_url,
        download_dir,
        selection: cli.download_type,
        launch: LaunchOptions {
            chrome_path: cli.chrome_path,
            profile,
            headless: cli.headless,
        },
        timeout: Duration::from_secs(cli.timeout),
        layout: cli.layout,
        list: cli.list,
        format: cli.format,
    })
}

fn init_logging(verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let filter = if verbose {
        EnvFilter::new(
            "coursegrab=debug,coursegrab_cli=debug,coursegrab_core=debug,coursegrab_browser=debug,coursegrab_fetch=debug",
        )
    } else {
        EnvFilter::new("coursegrab=info,coursegrab_cli=info,coursegrab_core=info,coursegrab_browser=info,coursegrab_fetch=info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .init();
}
