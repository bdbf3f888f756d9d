use serde::Deserialize;

/// The root configuration structure for the entire application.
///
/// Keys are flat so that they map one-to-one onto environment variables
/// (`SERVER_PORT` -> `server_port`).
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// The interface the HTTP server binds to.
    pub server_host: String,
    pub server_port: u16,

    /// A full connection string. When set, the `db_*` parts are ignored.
    pub database_url: Option<String>,
    pub db_host: String,
    pub db_port: u16,
    pub db_name: String,
    pub db_user: String,
    pub db_password: String,
    pub db_max_connections: u32,

    /// A `tracing` level name: trace, debug, info, warn, error or off.
    pub log_level: String,

    /// Base URLs of the name-inference services.
    pub gender_api_url: String,
    pub age_api_url: String,
    pub nationality_api_url: String,
}

impl Settings {
    /// The `host:port` string the HTTP listener binds to.
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }
}

/// Default values for every optional key, applied before any source is read.
pub(crate) const DEFAULTS: &[(&str, &str)] = &[
    ("server_host", "0.0.0.0"),
    ("server_port", "8080"),
    ("db_host", "localhost"),
    ("db_port", "5432"),
    ("db_name", "persons"),
    ("db_user", "postgres"),
    ("db_password", ""),
    ("db_max_connections", "10"),
    ("log_level", "info"),
    ("gender_api_url", "https://api.genderize.io"),
    ("age_api_url", "https://api.agify.io"),
    ("nationality_api_url", "https://api.nationalize.io"),
];
