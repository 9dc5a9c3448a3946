//! Configuration for the tertulia HTTP server.

use std::path::PathBuf;

use serde::Deserialize;
use tertulia_graph::GraphConfig;

/// Environment variable prefix, e.g. `TERTULIA__NEO4J__URI`.
pub const ENV_PREFIX: &str = "TERTULIA";

/// Everything the binary reads at start-up.
///
/// Loaded from `tertulia.toml` (`[neo4j]` and `[server]` sections) layered
/// under `TERTULIA__` environment variables.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub neo4j: GraphConfig,

    #[serde(default)]
    pub server: ServerConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Directory holding `interfaz.html` and its assets. Unset disables static serving.
    #[serde(default)]
    pub static_dir: Option<PathBuf>,

    /// Create constraints and indexes after connecting.
    #[serde(default = "default_true")]
    pub init_schema: bool,

    /// Request body cap, applied to CSV uploads.
    #[serde(default = "default_max_upload")]
    pub max_upload_bytes: usize,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    5000
}

fn default_true() -> bool {
    true
}

fn default_max_upload() -> usize {
    10 * 1024 * 1024
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            static_dir: None,
            init_schema: default_true(),
            max_upload_bytes: default_max_upload(),
        }
    }
}

impl ServerConfig {
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Load `{file_prefix}.toml` (optional) and `TERTULIA__*` overrides.
pub fn load_config(file_prefix: &str) -> Result<AppConfig, config::ConfigError> {
    config::Config::builder()
        .add_source(config::File::with_name(file_prefix).required(false))
        .add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .separator("__")
                .try_parsing(true),
        )
        .build()?
        .try_deserialize()
}
