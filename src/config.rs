use clap::Parser;
use serde::Deserialize;
use std::path::PathBuf;

pub const DATABASE_URL_VAR: &str = "DATABASE_URL";
pub const DATABASE_NAME_VAR: &str = "DATABASE_NAME";
pub const PORT_VAR: &str = "PORT";

#[derive(Parser, Debug)]
#[command(name = "saas-starter", about = "SaaS starter backend")]
pub struct Cli {
    /// Path to config file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Host to bind to
    #[arg(long)]
    pub host: Option<String>,

    /// Port to bind to
    #[arg(short, long)]
    pub port: Option<u16>,
}

#[derive(Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    #[serde(skip)]
    pub env: EnvPresence,
}

/// Which database variables the process environment supplied at load time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EnvPresence {
    pub database_url: bool,
    pub database_name: bool,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct DatabaseConfig {
    pub url: Option<String>,
    pub name: Option<String>,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct AuthConfig {
    pub bcrypt_cost: u32,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            bcrypt_cost: bcrypt::DEFAULT_COST,
        }
    }
}

impl DatabaseConfig {
    /// Both the URL and the database name, when the store is fully configured.
    pub fn connection(&self) -> Option<(&str, &str)> {
        match (self.url.as_deref(), self.name.as_deref()) {
            (Some(url), Some(name)) => Some((url, name)),
            _ => None,
        }
    }
}

impl Config {
    pub fn load(cli: &Cli) -> anyhow::Result<Self> {
        Self::load_with_env(cli, |key| std::env::var(key).ok())
    }

    /// Defaults < config file < environment < CLI flags.
    pub fn load_with_env(
        cli: &Cli,
        env: impl Fn(&str) -> Option<String>,
    ) -> anyhow::Result<Self> {
        let config_path = cli
            .config
            .clone()
            .unwrap_or_else(|| Self::config_dir().join("config.toml"));

        let mut config = if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            toml::from_str(&content)?
        } else {
            Config::default()
        };

        let lookup = |key: &str| env(key).filter(|value| !value.trim().is_empty());
        if let Some(url) = lookup(DATABASE_URL_VAR) {
            config.database.url = Some(url);
            config.env.database_url = true;
        }
        if let Some(name) = lookup(DATABASE_NAME_VAR) {
            config.database.name = Some(name);
            config.env.database_name = true;
        }
        if let Some(port) = lookup(PORT_VAR) {
            config.server.port = port
                .trim()
                .parse()
                .map_err(|e| anyhow::anyhow!("Invalid {} {:?}: {}", PORT_VAR, port, e))?;
        }

        if let Some(ref host) = cli.host {
            config.server.host = host.clone();
        }
        if let Some(port) = cli.port {
            config.server.port = port;
        }

        Ok(config)
    }

    pub fn config_dir() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".saas-starter")
    }
}
