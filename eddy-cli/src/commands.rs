//! CLI command implementations

use std::net::IpAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Args, Subcommand};
use eddy_core::config::EddyConfig;
use eddy_core::tracing_setup::{CliLogLevel, init_tracing};
use eddy_core::{Catalog, EddyError, FlakeIdGenerator, JsonLinesStore};
use eddy_web::server::VIDEOS_TABLE;

/// Available CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Start the media server
    Serve {
        /// Host to bind to (overrides EDDY_HOST)
        #[arg(long)]
        host: Option<IpAddr>,
        /// Port to bind to (overrides EDDY_PORT, default 2000)
        #[arg(short, long)]
        port: Option<u16>,
        #[command(flatten)]
        dirs: DirectoryArgs,
        /// Console log level
        #[arg(long, value_enum, default_value_t = CliLogLevel::Info)]
        log_level: CliLogLevel,
        /// Directory for the run log
        #[arg(long)]
        logs_dir: Option<PathBuf>,
    },
    /// Print every video in the catalog
    List {
        #[command(flatten)]
        dirs: DirectoryArgs,
    },
}

/// Storage locations shared by commands
#[derive(Args, Debug, Default)]
pub struct DirectoryArgs {
    /// Directory holding uploaded video files (overrides EDDY_VIDEOS_DIR)
    #[arg(long)]
    videos_dir: Option<PathBuf>,
    /// Directory holding the metadata tables (overrides EDDY_DATABASE_DIR)
    #[arg(long)]
    database_dir: Option<PathBuf>,
    /// Root of the static frontend bundle (overrides EDDY_STATIC_DIR)
    #[arg(long)]
    static_dir: Option<PathBuf>,
}

impl DirectoryArgs {
    fn apply(self, config: &mut EddyConfig) {
        if let Some(dir) = self.videos_dir {
            config.storage.videos_dir = dir;
        }
        if let Some(dir) = self.database_dir {
            config.storage.database_dir = dir;
        }
        if let Some(dir) = self.static_dir {
            config.storage.static_dir = dir;
        }
    }
}

/// Handle the CLI command
///
/// # Errors
/// Returns appropriate error based on the command that fails
pub async fn handle_command(command: Commands) -> anyhow::Result<()> {
    match command {
        Commands::Serve {
            host,
            port,
            dirs,
            log_level,
            logs_dir,
        } => {
            let config = server_config(EddyConfig::from_env(), host, port, dirs);
            start_server(config, log_level, logs_dir).await
        }
        Commands::List { dirs } => {
            let mut config = EddyConfig::from_env();
            dirs.apply(&mut config);
            list_videos(config).await
        }
    }
}

fn server_config(
    mut config: EddyConfig,
    host: Option<IpAddr>,
    port: Option<u16>,
    dirs: DirectoryArgs,
) -> EddyConfig {
    if let Some(host) = host {
        config.server.host = host;
    }
    if let Some(port) = port {
        config.server.port = port;
    }
    dirs.apply(&mut config);
    config
}

/// Start the web server
///
/// # Errors
/// - Tracing could not be initialized
/// - The server failed to start or stopped with an error
pub async fn start_server(
    config: EddyConfig,
    log_level: CliLogLevel,
    logs_dir: Option<PathBuf>,
) -> anyhow::Result<()> {
    init_tracing(log_level.as_tracing_level(), logs_dir.as_deref())
        .context("failed to initialize logging")?;

    tracing::info!(
        bind = %config.server.bind_address(),
        videos_dir = %config.storage.videos_dir.display(),
        static_dir = %config.storage.static_dir.display(),
        "Starting Eddy"
    );

    eddy_web::run_server(config).await.map_err(|e| {
        tracing::error!(error = %e, "Media server failed");
        with_user_message(e)
    })
}

/// Wraps `error` so the top-level report leads with its user-facing message.
fn with_user_message(error: EddyError) -> anyhow::Error {
    let message = error.user_message();
    anyhow::Error::new(error).context(message)
}

/// Print the catalog, one video per line
///
/// # Errors
/// - The metadata table could not be opened or read
pub async fn list_videos(config: EddyConfig) -> anyhow::Result<()> {
    let store = JsonLinesStore::open(&config.storage.database_dir, VIDEOS_TABLE)
        .await
        .with_context(|| {
            format!(
                "failed to open metadata table in {}",
                config.storage.database_dir.display()
            )
        })?;
    let catalog = Catalog::new(Arc::new(store), Arc::new(FlakeIdGenerator::new()));

    let videos = catalog.list_all().await?;
    if videos.is_empty() {
        println!("No videos uploaded yet");
        return Ok(());
    }

    for video in &videos {
        let created = video
            .id
            .created_at()
            .map(|at| at.format("%Y-%m-%d %H:%M:%S").to_string())
            .unwrap_or_else(|| "-".to_string());
        println!(
            "{}  {}  {}  {}",
            video.id, created, video.content_type, video.name
        );
    }
    println!("{} video(s)", videos.len());

    Ok(())
}
