/// Configuration management for the lectern service
use crate::error::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;

/// Main server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub service: ServiceConfig,
    pub storage: StorageConfig,
    pub identity: IdentityConfig,
    pub logging: LoggingConfig,
}

/// Service-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    pub hostname: String,
    pub port: u16,
    /// Externally reachable base URL, used to mint durable media URLs
    /// when the disk backend serves uploads itself.
    pub public_url: String,
    pub version: String,
    pub upload_limit: usize,
}

/// Storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    pub data_directory: PathBuf,
    pub library_db: PathBuf,
    pub media: MediaStoreConfig,
    /// Host patterns a remote store's durable URLs are allowed to point at.
    pub allowed_image_hosts: Vec<String>,
}

/// Media storage backend configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum MediaStoreConfig {
    Disk {
        location: PathBuf,
    },
    Remote {
        endpoint: String,
        access_key: String,
    },
}

/// Identity configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentityConfig {
    /// Email of the administrative identity. Resolved to a role attribute
    /// by the identity resolver, never compared at call sites.
    pub admin_email: String,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
}

impl ServerConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> AppResult<Self> {
        dotenv::dotenv().ok();

        let hostname = env::var("LECTERN_HOSTNAME").unwrap_or_else(|_| "localhost".to_string());
        let port = env::var("LECTERN_PORT")
            .unwrap_or_else(|_| "8700".to_string())
            .parse()
            .map_err(|_| AppError::Validation("Invalid port number".to_string()))?;

        let public_url = env::var("LECTERN_PUBLIC_URL")
            .unwrap_or_else(|_| format!("http://{}:{}", hostname, port));
        let version = env::var("LECTERN_VERSION").unwrap_or_else(|_| "0.1.0".to_string());
        let upload_limit = env::var("LECTERN_UPLOAD_LIMIT")
            .unwrap_or_else(|_| "10485760".to_string())
            .parse()
            .unwrap_or(10 * 1024 * 1024);

        let data_directory: PathBuf = env::var("LECTERN_DATA_DIRECTORY")
            .unwrap_or_else(|_| "./data".to_string())
            .into();
        let library_db = env::var("LECTERN_DB_LOCATION")
            .map(PathBuf::from)
            .unwrap_or_else(|_| data_directory.join("library.sqlite"));

        let media = if let Ok(endpoint) = env::var("LECTERN_MEDIA_ENDPOINT") {
            MediaStoreConfig::Remote {
                endpoint,
                access_key: env::var("LECTERN_MEDIA_ACCESS_KEY").map_err(|_| {
                    AppError::Validation("Media store access key required".to_string())
                })?,
            }
        } else {
            MediaStoreConfig::Disk {
                location: env::var("LECTERN_MEDIA_DISK_LOCATION")
                    .map(PathBuf::from)
                    .unwrap_or_else(|_| data_directory.join("media")),
            }
        };

        let allowed_image_hosts = env::var("LECTERN_ALLOWED_IMAGE_HOSTS")
            .unwrap_or_else(|_| String::new())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect::<Vec<String>>();

        let admin_email = env::var("LECTERN_ADMIN_EMAIL")
            .map_err(|_| AppError::Validation("Admin email required".to_string()))?;

        let log_level = env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());

        Ok(ServerConfig {
            service: ServiceConfig {
                hostname,
                port,
                public_url,
                version,
                upload_limit,
            },
            storage: StorageConfig {
                data_directory,
                library_db,
                media,
                allowed_image_hosts,
            },
            identity: IdentityConfig { admin_email },
            logging: LoggingConfig { level: log_level },
        })
    }

    /// Validate configuration
    pub fn validate(&self) -> AppResult<()> {
        if self.service.hostname.is_empty() {
            return Err(AppError::Validation("Hostname cannot be empty".to_string()));
        }

        if !self.identity.admin_email.contains('@') {
            return Err(AppError::Validation(
                "Admin email must be a valid address".to_string(),
            ));
        }

        if self.service.upload_limit == 0 {
            return Err(AppError::Validation(
                "Upload limit must be non-zero".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> ServerConfig {
        ServerConfig {
            service: ServiceConfig {
                hostname: "localhost".to_string(),
                port: 8700,
                public_url: "http://localhost:8700".to_string(),
                version: "0.1.0".to_string(),
                upload_limit: 1024,
            },
            storage: StorageConfig {
                data_directory: "./data".into(),
                library_db: "./data/library.sqlite".into(),
                media: MediaStoreConfig::Disk {
                    location: "./data/media".into(),
                },
                allowed_image_hosts: vec![],
            },
            identity: IdentityConfig {
                admin_email: "admin@example.com".to_string(),
            },
            logging: LoggingConfig {
                level: "info".to_string(),
            },
        }
    }

    #[test]
    fn valid_config_passes() {
        assert!(test_config().validate().is_ok());
    }

    #[test]
    fn admin_email_must_look_like_an_address() {
        let mut config = test_config();
        config.identity.admin_email = "not-an-email".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn zero_upload_limit_rejected() {
        let mut config = test_config();
        config.service.upload_limit = 0;
        assert!(config.validate().is_err());
    }
}
