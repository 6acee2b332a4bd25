// src/config.rs

use std::{
    env,
    net::{IpAddr, Ipv4Addr, SocketAddr},
    path::PathBuf,
};
use dotenvy::dotenv;

use crate::error::AppError;

/// Upload cap shared by the multipart endpoints (16 MiB).
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 16 * 1024 * 1024;

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    /// Root of the ledgers, question files and question papers.
    pub data_dir: PathBuf,
    pub upload_dir: PathBuf,
    pub output_dir: PathBuf,
    /// Frontend assets served for every route the API does not claim.
    pub static_dir: PathBuf,
    /// Only the student app signs sessions; it refuses to start without one.
    pub session_secret: Option<String>,
    pub session_ttl_secs: u64,
    pub ocr_command: Option<String>,
    pub evaluate_command: Option<String>,
    pub max_upload_bytes: usize,
    pub rust_log: String,
}

impl Config {
    /// Reads the configuration of one application.
    ///
    /// `port_var` names the application's own port variable (e.g. `TEACHER_PORT`)
    /// and `default_port` is used when it is unset.
    pub fn from_env(port_var: &str, default_port: u16) -> Self {
        dotenv().ok();

        let host = env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());

        let port = env::var(port_var)
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(default_port);

        let session_secret = env::var("SESSION_SECRET")
            .ok()
            .filter(|s| !s.is_empty());

        let session_ttl_secs = env::var("SESSION_TTL_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(3600);

        let max_upload_bytes = env::var("MAX_UPLOAD_BYTES")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(DEFAULT_MAX_UPLOAD_BYTES);

        let rust_log = env::var("RUST_LOG")
            .unwrap_or_else(|_| "info".to_string());

        Self {
            host,
            port,
            data_dir: path_var("DATA_DIR", "Database"),
            upload_dir: path_var("UPLOAD_DIR", "uploads"),
            output_dir: path_var("OUTPUT_DIR", "outputs"),
            static_dir: path_var("STATIC_DIR", "UI"),
            session_secret,
            session_ttl_secs,
            ocr_command: env::var("OCR_COMMAND").ok().filter(|c| !c.trim().is_empty()),
            evaluate_command: env::var("EVALUATE_COMMAND").ok().filter(|c| !c.trim().is_empty()),
            max_upload_bytes,
            rust_log,
        }
    }

    /// Secret for signing student sessions.
    pub fn session_key(&self) -> Result<&str, AppError> {
        self.session_secret
            .as_deref()
            .ok_or_else(|| AppError::InternalServerError("SESSION_SECRET is not configured".to_string()))
    }

    /// Address the server binds to. Falls back to all interfaces when `HOST`
    /// is not a literal IP address.
    pub fn socket_addr(&self) -> SocketAddr {
        let ip: IpAddr = self
            .host
            .parse()
            .unwrap_or(IpAddr::V4(Ipv4Addr::UNSPECIFIED));
        SocketAddr::new(ip, self.port)
    }
}

fn path_var(key: &str, default: &str) -> PathBuf {
    env::var(key)
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(default))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(host: &str) -> Config {
        Config {
            host: host.to_string(),
            port: 5001,
            data_dir: PathBuf::from("Database"),
            upload_dir: PathBuf::from("uploads"),
            output_dir: PathBuf::from("outputs"),
            static_dir: PathBuf::from("UI"),
            session_secret: Some("secret".to_string()),
            session_ttl_secs: 60,
            ocr_command: None,
            evaluate_command: None,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            rust_log: "info".to_string(),
        }
    }

    #[test]
    fn session_secret_is_optional() {
        // SAFETY: no other test in this crate touches these variables.
        unsafe {
            env::remove_var("SESSION_SECRET");
            env::set_var("CONFIG_TEST_PORT", "6123");
        }

        let config = Config::from_env("CONFIG_TEST_PORT", 5002);

        assert_eq!(config.port, 6123);
        assert!(config.session_secret.is_none());
        assert!(config.session_key().is_err());
    }

    #[test]
    fn session_key_is_returned_when_set() {
        assert_eq!(sample("127.0.0.1").session_key().unwrap(), "secret");
    }

    #[test]
    fn socket_addr_uses_host_and_port() {
        let addr = sample("127.0.0.1").socket_addr();
        assert_eq!(addr.to_string(), "127.0.0.1:5001");
    }

    #[test]
    fn socket_addr_falls_back_for_hostnames() {
        let addr = sample("localhost").socket_addr();
        assert_eq!(addr.to_string(), "0.0.0.0:5001");
    }
}
