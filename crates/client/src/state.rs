//! Configuration and the assembled application state.
//!
//! Everything lives under one roster directory (`~/.roster` unless
//! overridden): the `config.toml` written by `init` and the persisted
//! session slot. Loading reads the config, applies any overrides and
//! wires up the client, cache and gateway around one shared session.

use std::fmt;
use std::fs;
use std::io;
use std::path::PathBuf;

use reqwest::header::HeaderValue;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::api::{ApiClient, ApiError};
use crate::cache::QueryCache;
use crate::gateway::MutationGateway;
use crate::session::{SessionStore, SESSION_FILE};

/// File name of the config inside the roster directory.
pub const CONFIG_FILE: &str = "config.toml";

pub const DEFAULT_API_BASE: &str = "https://reqres.in/api";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub api_base: Url,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_base: Url::parse(DEFAULT_API_BASE).expect("default api base is valid"),
            api_key: None,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("could not determine a home directory")]
    NoHomeDir,
    #[error("io error at {path}: {source}")]
    Io {
        path: PathBuf,
        source: io::Error,
    },
    #[error("invalid config at {path}: {source}")]
    InvalidConfig {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("could not encode config: {0}")]
    EncodeConfig(#[from] toml::ser::Error),
    #[error("api key is not a valid header value")]
    InvalidApiKey,
    #[error(transparent)]
    Api(#[from] ApiError),
}

/// The wired-up data layer: one session store shared by the client, the
/// query cache over it and the mutation gateway that writes through it.
#[derive(Clone)]
pub struct AppState {
    pub roster_dir: PathBuf,
    pub config: AppConfig,
    pub session: SessionStore,
    pub client: ApiClient,
    pub cache: QueryCache,
    pub gateway: MutationGateway,
}

impl fmt::Debug for AppState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppState")
            .field("roster_dir", &self.roster_dir)
            .field("config", &self.config)
            .field("session", &self.session)
            .field("client", &self.client)
            .finish_non_exhaustive()
    }
}

impl AppState {
    /// Resolves the roster directory: the override if given, otherwise
    /// `.roster` under the home directory.
    pub fn roster_dir(override_dir: Option<PathBuf>) -> Result<PathBuf, StateError> {
        match override_dir {
            Some(dir) => Ok(dir),
            None => dirs::home_dir()
                .map(|home| home.join(".roster"))
                .ok_or(StateError::NoHomeDir),
        }
    }

    /// Writes `config` to the roster directory and assembles the state
    /// around it.
    pub fn init(dir: Option<PathBuf>, config: AppConfig) -> Result<Self, StateError> {
        let roster_dir = Self::roster_dir(dir)?;
        fs::create_dir_all(&roster_dir).map_err(|source| StateError::Io {
            path: roster_dir.clone(),
            source,
        })?;
        let path = roster_dir.join(CONFIG_FILE);
        let encoded = toml::to_string_pretty(&config)?;
        fs::write(&path, encoded).map_err(|source| StateError::Io { path, source })?;
        tracing::debug!(dir = %roster_dir.display(), "wrote config");
        Self::assemble(roster_dir, config)
    }

    /// Reads the config from the roster directory, falling back to
    /// defaults when none was written yet, and applies the overrides.
    pub fn load(
        dir: Option<PathBuf>,
        api_base: Option<Url>,
        api_key: Option<String>,
    ) -> Result<Self, StateError> {
        let roster_dir = Self::roster_dir(dir)?;
        let path = roster_dir.join(CONFIG_FILE);
        let mut config = match fs::read_to_string(&path) {
            Ok(raw) => toml::from_str(&raw).map_err(|source| StateError::InvalidConfig {
                path: path.clone(),
                source,
            })?,
            Err(err) if err.kind() == io::ErrorKind::NotFound => AppConfig::default(),
            Err(source) => return Err(StateError::Io { path, source }),
        };
        if let Some(api_base) = api_base {
            config.api_base = api_base;
        }
        if let Some(api_key) = api_key {
            config.api_key = Some(api_key);
        }
        Self::assemble(roster_dir, config)
    }

    fn assemble(roster_dir: PathBuf, config: AppConfig) -> Result<Self, StateError> {
        fs::create_dir_all(&roster_dir).map_err(|source| StateError::Io {
            path: roster_dir.clone(),
            source,
        })?;
        let session = SessionStore::open(roster_dir.join(SESSION_FILE));
        let api_key = match &config.api_key {
            Some(key) => {
                Some(HeaderValue::from_str(key).map_err(|_| StateError::InvalidApiKey)?)
            }
            None => None,
        };
        let client = ApiClient::new(&config.api_base, api_key, session.clone())?;
        let cache = QueryCache::new(client.clone());
        let gateway = MutationGateway::new(client.clone(), cache.clone());
        tracing::debug!(api_base = %config.api_base, "assembled state");
        Ok(Self {
            roster_dir,
            config,
            session,
            client,
            cache,
            gateway,
        })
    }
}
