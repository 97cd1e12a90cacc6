//! Application settings, read from an optional `settings.toml` and
//! `STORERATE__*` environment variables (e.g. `STORERATE__AUTH__JWT_SECRET`).
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct App {
    pub level: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Database {
    Memory,
    /// Path of the SQLite file, created when missing.
    Sqlite(String),
}

#[derive(Debug, Deserialize)]
pub struct Server {
    pub bind: Option<String>,
    pub port: u16,
    pub base_path: String,
    pub database: Database,
}

#[derive(Debug, Deserialize)]
pub struct Auth {
    pub jwt_secret: String,
    pub token_ttl_days: i64,
    pub issuer: String,
}

#[derive(Debug, Deserialize)]
pub struct Settings {
    pub app: App,
    pub server: Server,
    pub auth: Auth,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .set_default("app.level", "info")?
            .set_default("server.port", 5000)?
            .set_default("server.base_path", "/api/v1/store_app")?
            .set_default("server.database", "memory")?
            .set_default("auth.token_ttl_days", 7)?
            .set_default("auth.issuer", "storerate")?
            .add_source(File::with_name("settings").required(false))
            .add_source(
                Environment::with_prefix("STORERATE")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        settings.try_deserialize()
    }
}
