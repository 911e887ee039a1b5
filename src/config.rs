use anyhow::{Context, bail};
use serde::Deserialize;
use std::{collections::HashSet, path::PathBuf};

use crate::fields::FieldConfig;

pub const DEFAULT_RESOLVE_URL: &str = "https://api.soundcloud.com/resolve.json";

#[derive(Debug, Deserialize)]
pub struct Config {
    pub version: u32,
    pub database: Database,
    pub http: HttpConfig,
    pub soundcloud: ResolverConfig,
    #[serde(default)]
    pub fields: Vec<FieldConfig>,
}

impl Config {
    pub fn load(path: &str) -> anyhow::Result<Config> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {path}"))?;
        Self::parse(&contents)
    }

    pub fn parse(contents: &str) -> anyhow::Result<Config> {
        let cfg: Config = toml::from_str(contents).with_context(|| "Failed to parse config TOML")?;

        let mut seen = HashSet::new();
        for field in &cfg.fields {
            if !seen.insert(field.key.as_str()) {
                bail!("field key '{}' is defined more than once", field.key);
            }
        }

        Ok(cfg)
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct HttpConfig {
    pub bind_addr: String,
    pub port: u16,
}

#[derive(Debug, Deserialize)]
pub struct Database {
    pub in_memory: bool,
    pub path: Option<PathBuf>,
}

/// Where and as whom track URLs get resolved
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct ResolverConfig {
    #[serde(default = "default_resolve_url")]
    pub base_url: String,
    pub client_id: String,
}

fn default_resolve_url() -> String {
    DEFAULT_RESOLVE_URL.to_string()
}
