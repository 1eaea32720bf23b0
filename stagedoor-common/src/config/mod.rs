mod defaults;

use std::path::PathBuf;
use std::time::Duration;

use defaults::*;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::{ListenEndpoint, Location, Secret};

#[derive(Debug, Deserialize, Serialize, Clone, JsonSchema)]
pub struct HttpConfig {
    #[serde(default = "_default_true")]
    pub enable: bool,

    #[serde(default = "_default_http_listen")]
    #[schemars(with = "String")]
    pub listen: ListenEndpoint,
}

impl Default for HttpConfig {
    fn default() -> Self {
        HttpConfig {
            enable: true,
            listen: _default_http_listen(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, JsonSchema)]
pub struct LogConfig {
    #[serde(default = "_default_retention", with = "humantime_serde")]
    #[schemars(with = "String")]
    pub retention: Duration,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            retention: _default_retention(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, JsonSchema)]
pub struct TeaserSweepConfig {
    #[serde(default = "_default_sweep_interval", with = "humantime_serde")]
    #[schemars(with = "String")]
    pub sweep_interval: Duration,
}

impl Default for TeaserSweepConfig {
    fn default() -> Self {
        Self {
            sweep_interval: _default_sweep_interval(),
        }
    }
}

/// A static IP-to-location mapping entry for the built-in resolver.
#[derive(Debug, Deserialize, Serialize, Clone, JsonSchema)]
pub struct GeoMappingEntry {
    pub ip: String,
    pub location: Location,
}

#[derive(Debug, Deserialize, Serialize, Clone, Default, JsonSchema)]
pub struct GeoConfig {
    #[serde(default)]
    pub entries: Vec<GeoMappingEntry>,

    #[serde(default)]
    pub fallback: Option<Location>,
}

#[derive(Debug, Deserialize, Serialize, Clone, JsonSchema)]
pub struct StagedoorConfigStore {
    #[serde(default = "_default_database_url")]
    #[schemars(with = "String")]
    pub database_url: Secret<String>,

    #[serde(default)]
    pub http: HttpConfig,

    #[serde(default)]
    pub log: LogConfig,

    #[serde(default)]
    pub teaser: TeaserSweepConfig,

    #[serde(default)]
    pub geo: GeoConfig,
}

impl Default for StagedoorConfigStore {
    fn default() -> Self {
        Self {
            database_url: _default_database_url(),
            http: HttpConfig::default(),
            log: LogConfig::default(),
            teaser: TeaserSweepConfig::default(),
            geo: GeoConfig::default(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct StagedoorConfig {
    pub store: StagedoorConfigStore,
    pub paths_relative_to: PathBuf,
}
