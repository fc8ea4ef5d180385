//! Centralized configuration for Eddy.
//!
//! All tunable parameters and settings are defined here to avoid
//! hard-coded values scattered throughout the codebase.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;

use crate::EddyError;

/// Largest window served by a single partial-content response (256 KiB).
pub const DEFAULT_MAX_CHUNK_SIZE: u64 = 262_144;

/// Port used when nothing else is configured.
pub const DEFAULT_PORT: u16 = 2000;

/// Central configuration for all Eddy components.
///
/// Groups related configuration settings into logical sections.
/// Supports environment variable overrides for runtime customization.
#[derive(Debug, Clone, Default)]
pub struct EddyConfig {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub streaming: StreamingConfig,
}

/// HTTP listener configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Interface to bind to
    pub host: IpAddr,
    /// Listen port
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: DEFAULT_PORT,
        }
    }
}

impl ServerConfig {
    /// Socket address the server listens on.
    pub fn bind_address(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

/// On-disk layout and disk I/O configuration.
///
/// Controls where uploaded videos, the metadata table and the prebuilt
/// frontend bundle live, and how large each sequential read is.
#[derive(Debug, Clone)]
pub struct StorageConfig {
    /// Directory holding one file per uploaded video, named by id
    pub videos_dir: PathBuf,
    /// Directory holding the metadata store tables
    pub database_dir: PathBuf,
    /// Root of the static frontend bundle
    pub static_dir: PathBuf,
    /// Buffer size for sequential file reads while streaming
    pub read_buffer_size: usize,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            videos_dir: PathBuf::from("videos"),
            database_dir: PathBuf::from("database"),
            static_dir: PathBuf::from("frontend/dist"),
            read_buffer_size: 65536, // 64 KiB
        }
    }
}

/// Range response configuration.
#[derive(Debug, Clone)]
pub struct StreamingConfig {
    /// Upper bound on bytes per partial-content response
    pub max_chunk_size: u64,
}

impl Default for StreamingConfig {
    fn default() -> Self {
        Self {
            max_chunk_size: DEFAULT_MAX_CHUNK_SIZE,
        }
    }
}

impl EddyConfig {
    /// Creates configuration with environment variable overrides.
    ///
    /// Values that fail to parse are ignored and the default is kept.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(host) = std::env::var("EDDY_HOST")
            && let Ok(addr) = host.parse::<IpAddr>()
        {
            config.server.host = addr;
        }

        if let Ok(port) = std::env::var("EDDY_PORT")
            && let Ok(port) = port.parse::<u16>()
        {
            config.server.port = port;
        }

        if let Ok(dir) = std::env::var("EDDY_VIDEOS_DIR") {
            config.storage.videos_dir = PathBuf::from(dir);
        }

        if let Ok(dir) = std::env::var("EDDY_DATABASE_DIR") {
            config.storage.database_dir = PathBuf::from(dir);
        }

        if let Ok(dir) = std::env::var("EDDY_STATIC_DIR") {
            config.storage.static_dir = PathBuf::from(dir);
        }

        config
    }

    /// Rejects settings the server cannot run with.
    ///
    /// # Errors
    ///
    /// - `EddyError::Configuration` - If a chunk or buffer size is zero
    pub fn validate(&self) -> crate::Result<()> {
        if self.streaming.max_chunk_size == 0 {
            return Err(EddyError::Configuration {
                reason: "max_chunk_size must be at least 1 byte".to_string(),
            });
        }
        if self.storage.read_buffer_size == 0 {
            return Err(EddyError::Configuration {
                reason: "read_buffer_size must be at least 1 byte".to_string(),
            });
        }
        Ok(())
    }

    /// Creates a configuration rooted in `base`, for tests and throwaway runs.
    pub fn rooted_at(base: &std::path::Path) -> Self {
        Self {
            storage: StorageConfig {
                videos_dir: base.join("videos"),
                database_dir: base.join("database"),
                static_dir: base.join("static"),
                ..StorageConfig::default()
            },
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_values() {
        let config = EddyConfig::default();

        assert_eq!(config.server.port, 2000);
        assert_eq!(config.server.host, IpAddr::V4(Ipv4Addr::UNSPECIFIED));
        assert_eq!(config.storage.videos_dir, PathBuf::from("videos"));
        assert_eq!(config.storage.read_buffer_size, 65536);
        assert_eq!(config.streaming.max_chunk_size, 262_144);
    }

    #[test]
    fn test_bind_address() {
        let config = ServerConfig {
            host: IpAddr::V4(Ipv4Addr::LOCALHOST),
            port: 8080,
        };
        assert_eq!(config.bind_address().to_string(), "127.0.0.1:8080");
    }

    #[test]
    fn test_rooted_at() {
        let config = EddyConfig::rooted_at(std::path::Path::new("/tmp/eddy"));
        assert_eq!(config.storage.videos_dir, PathBuf::from("/tmp/eddy/videos"));
        assert_eq!(
            config.storage.database_dir,
            PathBuf::from("/tmp/eddy/database")
        );
        assert_eq!(config.server.port, DEFAULT_PORT);
    }

    #[test]
    fn test_validate_rejects_zero_sizes() {
        assert!(EddyConfig::default().validate().is_ok());

        let mut config = EddyConfig::default();
        config.streaming.max_chunk_size = 0;
        assert!(matches!(
            config.validate(),
            Err(EddyError::Configuration { .. })
        ));

        let mut config = EddyConfig::default();
        config.storage.read_buffer_size = 0;
        let err = config.validate().unwrap_err();
        assert_eq!(
            err.user_message(),
            "Configuration error: read_buffer_size must be at least 1 byte"
        );
    }

    #[test]
    fn test_env_override() {
        unsafe {
            std::env::set_var("EDDY_PORT", "4321");
            std::env::set_var("EDDY_HOST", "not-an-address");
            std::env::set_var("EDDY_VIDEOS_DIR", "/srv/videos");
        }

        let config = EddyConfig::from_env();

        assert_eq!(config.server.port, 4321);
        assert_eq!(config.server.host, IpAddr::V4(Ipv4Addr::UNSPECIFIED));
        assert_eq!(config.storage.videos_dir, PathBuf::from("/srv/videos"));

        // Cleanup
        unsafe {
            std::env::remove_var("EDDY_PORT");
            std::env::remove_var("EDDY_HOST");
            std::env::remove_var("EDDY_VIDEOS_DIR");
        }
    }
}
