//! yuzu-manager - command-line front end.
//!
//! # Execution Flow
//!
//! 1. Parse arguments (clap)
//! 2. Initialize logging -> `<log-dir>/yuzu-manager.<date>`
//! 3. Build a current-thread tokio runtime
//! 4. Load `config.yaml` / `storage.yaml` into a [`ManagerContext`]
//! 5. Run the requested subcommand
//!
//! Configuration lives in `--config-dir` (default `config/`), and any key can
//! be overridden with `YUZU_MANAGER__SECTION__KEY` environment variables.

use anyhow::{Context, Result};
use camino::Utf8PathBuf;
use clap::{Parser, Subcommand};
use yuzu_manager::logging::{LoggingOptions, init_logging};
use yuzu_manager::notify::TracingNotifier;
use yuzu_manager::platform::SystemHost;
use yuzu_manager::services::commit_log::fetch_commit_log;
use yuzu_manager::services::firmware::{self, ArchiveFirmwareInstaller, FirmwareOutcome};
use yuzu_manager::services::launcher::{self, PathUpdate};
use yuzu_manager::services::{
    ArchiveUnpacker, DetectionOutcome, GitHubClient, GitHubReleaseFeed, HttpDownloader,
    InstallOutcome, Installer, PathResolver, VersionDetector,
};
use yuzu_manager::{APP_NAME, Branch, ConfigManager, ManagerContext, VERSION};

#[derive(Debug, Parser)]
#[command(name = "yuzu-manager", version, about = "Install and manage the yuzu / Eden emulator")]
struct Cli {
    /// Directory holding config.yaml and storage.yaml
    #[arg(long, global = true, default_value = "config")]
    config_dir: Utf8PathBuf,

    /// Directory for log files
    #[arg(long, global = true, default_value = "logs")]
    log_dir: Utf8PathBuf,

    /// Enable debug logging
    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Download and install a release
    Install {
        /// Release tag, e.g. v0.0.3
        version: String,
        #[arg(long, default_value_t = Branch::INSTALLABLE.to_string())]
        branch: String,
    },
    /// Launch the emulator and record the version shown in its window title
    Detect,
    /// Start the emulator
    Start,
    /// Install firmware from a local zip archive
    Firmware {
        #[arg(long)]
        archive: Utf8PathBuf,
        /// Version to record; taken from the archive name when omitted
        #[arg(long)]
        version: Option<String>,
    },
    /// Print the resolved executable and user-data paths
    Paths,
    /// Switch to another install directory
    SetPath { path: Utf8PathBuf },
    /// Open the keys folder in the file manager
    OpenKeys,
    /// Print recent upstream commits as Markdown
    Commits {
        /// Repository in owner/name form; defaults to the configured commit repo
        #[arg(long)]
        repo: Option<String>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let _guard = init_logging(&LoggingOptions {
        log_dir: cli.log_dir.clone(),
        debug_mode: cli.debug,
        ..LoggingOptions::default()
    })?;
    tracing::info!("Starting {} v{}", APP_NAME, VERSION);

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to build tokio runtime")?;

    let store = ConfigManager::new(&cli.config_dir)?;
    let mut ctx = ManagerContext::load(store)?;

    let result = runtime.block_on(run(cli.command, &mut ctx));
    if let Err(e) = &result {
        tracing::error!("{:#}", e);
    }
    result
}

async fn run(command: Command, ctx: &mut ManagerContext) -> Result<()> {
    let notifier = TracingNotifier;
    let host = SystemHost::new();

    match command {
        Command::Install { version, branch } => {
            let network = &ctx.config.setting.network;
            let client = GitHubClient::from_settings(network)?;
            let feed = GitHubReleaseFeed::new(client, network.release_repo.clone());

            let download_dir = match &ctx.config.setting.download.download_dir {
                Some(dir) => dir.clone(),
                None => Utf8PathBuf::from_path_buf(std::env::temp_dir())
                    .map_err(|p| anyhow::anyhow!("Temp dir is not UTF-8: {}", p.display()))?,
            };
            let installer = Installer::new(feed, HttpDownloader::new(download_dir)?, ArchiveUnpacker::new());

            match installer.install(ctx, &version, &branch, &notifier).await? {
                InstallOutcome::Installed { version, branch } => {
                    println!("Installed {} [{}]", branch.emulator_name(), version)
                }
                InstallOutcome::Skipped { version } => println!("Version [{}] already installed", version),
            }
        }
        Command::Detect => match VersionDetector::default().detect(ctx, &host, &notifier).await? {
            DetectionOutcome::Detected(found) => {
                println!("{} [{}] ({})", found.branch.emulator_name(), found.version, found.branch)
            }
            DetectionOutcome::NotDetected => println!("Version could not be detected"),
            DetectionOutcome::ExecutableMissing(path) => println!("Executable not found: {}", path),
            DetectionOutcome::Busy { pids } => println!("Emulator is running (pid {:?}), close it first", pids),
        },
        Command::Start => {
            let exe = launcher::start_emulator(ctx, &host)?;
            println!("Started {}", exe);
        }
        Command::Firmware { archive, version } => {
            let installer = ArchiveFirmwareInstaller::new(archive);
            match firmware::install_firmware(ctx, &installer, version.as_deref(), &notifier)? {
                FirmwareOutcome::Installed { version, path } => {
                    println!("Firmware [{}] installed to {}", version, path)
                }
                FirmwareOutcome::Skipped { version } => println!("Firmware [{}] already installed", version),
                FirmwareOutcome::Unchanged => println!("No firmware installed"),
            }
        }
        Command::Paths => {
            let resolver = PathResolver::new(&ctx.config);
            println!("install:  {}", resolver.install_dir());
            println!("exe:      {}", resolver.exe_path());
            println!("user:     {}", resolver.user_path());
            println!("keys:     {}", resolver.keys_path());
            println!("nand:     {}", resolver.nand_path());
            println!("load:     {}", resolver.load_path());
            println!("firmware: {}", resolver.firmware_path());
        }
        Command::SetPath { path } => match launcher::update_yuzu_path(ctx, &path, &notifier)? {
            PathUpdate::Changed(path) => println!("Install path set to {}", path),
            PathUpdate::Unchanged => println!("Install path unchanged"),
        },
        Command::OpenKeys => {
            let keys = launcher::open_keys_folder(ctx, &host)?;
            println!("Opened {}", keys);
        }
        Command::Commits { repo } => {
            let network = &ctx.config.setting.network;
            let client = GitHubClient::from_settings(network)?;
            let repo = repo.unwrap_or_else(|| network.commit_repo.clone());
            println!("{}", fetch_commit_log(&client, &repo).await?);
        }
    }

    Ok(())
}
