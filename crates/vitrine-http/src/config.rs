//! Server configuration.

use std::path::PathBuf;

/// Runtime configuration shared by the HTTP layer and the page handlers.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Port to listen on (0 for OS-assigned)
    pub port: u16,
    /// Hostname to bind to
    pub hostname: String,
    /// Directory templates are loaded from
    pub templates_dir: PathBuf,
    /// Directory served under `/static`
    pub static_dir: PathBuf,
    /// Directory scanned for videos
    pub media_dir: PathBuf,
    /// Directory scanned for package archives
    pub channel_dir: PathBuf,
    /// Items per listing page
    pub page_size: usize,
}

impl ServerConfig {
    pub fn address(&self) -> String {
        format!("{}:{}", self.hostname, self.port)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 8000,
            hostname: "127.0.0.1".into(),
            templates_dir: PathBuf::from("templates"),
            static_dir: PathBuf::from("static"),
            media_dir: PathBuf::from("media"),
            channel_dir: PathBuf::from("channel"),
            page_size: 12,
        }
    }
}
