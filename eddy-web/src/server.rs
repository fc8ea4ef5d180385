//! Router and server lifecycle for Eddy
//!
//! Store, identifier generator and directories are injected through
//! [`AppState`], so tests can run the full router against in-memory doubles.

use std::path::PathBuf;
use std::sync::Arc;

use axum::Router;
use axum::routing::get;
use eddy_core::config::EddyConfig;
use eddy_core::{Catalog, EddyError, FlakeIdGenerator, JsonLinesStore, VideoStorage};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::handlers::{fallback, stream_video, upload_video, videos_page};

/// Name of the metadata table holding video records.
pub const VIDEOS_TABLE: &str = "videos";

/// Streaming limits shared by all handlers.
#[derive(Debug, Clone, Copy)]
pub struct StreamingSettings {
    /// Upper bound on bytes per partial-content response
    pub max_chunk_size: u64,
    /// Size of each sequential file read
    pub read_buffer_size: usize,
}

impl StreamingSettings {
    /// Settings from the streaming and storage sections of `config`.
    pub fn from_config(config: &EddyConfig) -> Self {
        Self {
            max_chunk_size: config.streaming.max_chunk_size.max(1),
            read_buffer_size: config.storage.read_buffer_size.max(1),
        }
    }
}

impl Default for StreamingSettings {
    fn default() -> Self {
        Self::from_config(&EddyConfig::default())
    }
}

/// Shared state handed to every handler
#[derive(Clone, Debug)]
pub struct AppState {
    /// Video metadata lookups and inserts
    pub catalog: Catalog,
    /// Video file layout
    pub storage: VideoStorage,
    /// Root of the static frontend bundle
    pub static_dir: Arc<PathBuf>,
    /// Streaming limits
    pub streaming: StreamingSettings,
}

impl AppState {
    /// Assembles state from already constructed parts.
    pub fn new(
        catalog: Catalog,
        storage: VideoStorage,
        static_dir: impl Into<PathBuf>,
        streaming: StreamingSettings,
    ) -> Self {
        Self {
            catalog,
            storage,
            static_dir: Arc::new(static_dir.into()),
            streaming,
        }
    }

    /// Builds production state: ensures the videos directory exists, opens the
    /// persistent metadata table and seeds a flake generator.
    ///
    /// # Errors
    /// - `EddyError::Storage` - The videos directory cannot be created
    /// - `EddyError::Catalog` - The metadata table cannot be opened
    pub async fn from_config(config: &EddyConfig) -> Result<Self, EddyError> {
        let storage = VideoStorage::new(&config.storage.videos_dir);
        storage.ensure_directory().await?;

        let store = JsonLinesStore::open(&config.storage.database_dir, VIDEOS_TABLE).await?;
        let ids = FlakeIdGenerator::new();
        info!(
            videos_dir = %config.storage.videos_dir.display(),
            table = %store.path().display(),
            machine_id = ids.machine_id(),
            "Storage ready"
        );

        Ok(Self::new(
            Catalog::new(Arc::new(store), Arc::new(ids)),
            storage,
            &config.storage.static_dir,
            StreamingSettings::from_config(config),
        ))
    }
}

/// Builds the application router.
///
/// `PUT` uploads on every path: the two named routes accept it explicitly and
/// the fallback handles the rest.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/videos.html", get(videos_page).put(upload_video))
        .route("/videos/{id}", get(stream_video).put(upload_video))
        .fallback(fallback)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serves `state` on an already bound listener until shutdown is signalled.
///
/// # Errors
/// - `std::io::Error` - The listener failed
pub async fn serve(listener: TcpListener, state: AppState) -> std::io::Result<()> {
    axum::serve(listener, build_router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
}

/// Prepares storage, binds the configured address and serves until Ctrl-C.
///
/// # Errors
/// - `EddyError::Configuration` - The configuration failed validation
/// - `EddyError::Storage` / `EddyError::Catalog` - Startup storage preparation failed
/// - `EddyError::Io` - Binding or serving failed
pub async fn run_server(config: EddyConfig) -> eddy_core::Result<()> {
    config.validate()?;
    let state = AppState::from_config(&config).await?;

    let listener = TcpListener::bind(config.server.bind_address()).await?;
    info!(
        "Eddy media server running on http://{}",
        listener.local_addr()?
    );

    serve(listener, state).await?;
    info!("Eddy media server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_err() {
        // No signal handler available; run until the process is killed.
        std::future::pending::<()>().await;
    }
}
