mod backend;
mod basic;

pub use backend::BackendConfig;
pub use basic::BasicConfig;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Application configuration managed by Figment.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct Config {
    /// Core server configuration (see `basic` table in config.toml).
    #[serde(default)]
    pub basic: BasicConfig,

    /// Hosted database endpoint and the queries run against it (see `backend` table).
    #[serde(default)]
    pub backend: BackendConfig,
}

const DEFAULT_CONFIG_FILE: &str = "config.toml";

/// Environment variable carrying the service endpoint URL.
pub const URL_ENV: &str = "SUPABASE_URL";
/// Environment variable carrying the public (anon) access key.
pub const ANON_KEY_ENV: &str = "SUPABASE_ANON_KEY";

const RESTAURANTS_TABLE_ENV: &str = "SUPABASE_RESTAURANTS_TABLE";
const TEST_TABLE_ENV: &str = "SUPABASE_TEST_TABLE";
const STATUS_TABLE_ENV: &str = "SUPABASE_STATUS_TABLE";
const PROXY_ENV: &str = "PROXY";

const BASIC_ENV: [&str; 3] = ["LISTEN_ADDR", "LISTEN_PORT", "LOGLEVEL"];

impl Config {
    /// Builds a Figment that merges defaults, `config.toml` if present, then the environment.
    ///
    /// `SUPABASE_RESTAURANTS_TABLE` wins over `SUPABASE_TEST_TABLE` when both are set.
    pub fn figment() -> Figment {
        let mut figment = Figment::new().merge(Serialized::defaults(Config::default()));
        if PathBuf::from(DEFAULT_CONFIG_FILE).is_file() {
            figment = figment.merge(Toml::file(DEFAULT_CONFIG_FILE));
        }

        figment
            .merge(
                Env::raw()
                    .only(&BASIC_ENV)
                    .map(|key| format!("basic.{}", key.as_str().to_ascii_lowercase()).into()),
            )
            .merge(Env::raw().only(&[TEST_TABLE_ENV]).map(|_| "backend.restaurants_table".into()))
            .merge(
                Env::raw()
                    .only(&[
                        URL_ENV,
                        ANON_KEY_ENV,
                        RESTAURANTS_TABLE_ENV,
                        STATUS_TABLE_ENV,
                        PROXY_ENV,
                    ])
                    .map(|key| backend_key(key.as_str()).into()),
            )
    }

    /// Loads configuration from defaults, `config.toml` and the environment.
    ///
    /// Missing backend values are not an error here: the client factory reports them
    /// and the UI degrades to an advisory. A malformed file or value is.
    pub fn load() -> Result<Self, figment::Error> {
        Self::figment().extract()
    }
}

fn backend_key(env_key: &str) -> String {
    let field = match env_key.to_ascii_uppercase().as_str() {
        URL_ENV => "url",
        ANON_KEY_ENV => "anon_key",
        RESTAURANTS_TABLE_ENV => "restaurants_table",
        STATUS_TABLE_ENV => "status_table",
        PROXY_ENV => "proxy",
        _ => return env_key.to_ascii_lowercase(),
    };
    format!("backend.{field}")
}
