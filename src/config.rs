//! Runtime configuration: the client's display settings and task catalog loaded from JSON,
//! and the server's settings read from the environment.

use std::{
    env, fs,
    io::ErrorKind,
    path::{Path, PathBuf},
    time::Duration,
};

use serde::Deserialize;
use tracing::{info, warn};

use crate::{client::view::BoardSettings, dao::models::ChannelEntity};

/// Default location on disk where the client looks for the JSON configuration.
const DEFAULT_CONFIG_PATH: &str = "config/scoreboard.json";
/// Environment variable that overrides [`DEFAULT_CONFIG_PATH`].
const CONFIG_PATH_ENV: &str = "SCOREBOARD_CONFIG_PATH";
/// Environment variable that overrides the configured server URL.
const BASE_URL_ENV: &str = "SCOREBOARD_BASE_URL";
const DEFAULT_BASE_URL: &str = "http://localhost:8080";
const DEFAULT_PORT: u16 = 8080;

/// Task with a fixed point value per completed unit.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TaskDefinition {
    /// Label shown in the task picker.
    pub name: String,
    /// Points per unit.
    pub points: u32,
}

impl TaskDefinition {
    fn new(name: &str, points: u32) -> Self {
        Self {
            name: name.into(),
            points,
        }
    }
}

/// Settings of the terminal client.
#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    /// Root URL of the scoreboard server.
    pub base_url: String,
    /// Board display constants.
    pub board: BoardSettings,
    /// How long a feedback message stays visible.
    pub feedback_ttl: Duration,
    /// Task catalog offered for task points.
    pub tasks: Vec<TaskDefinition>,
}

impl ClientConfig {
    /// Load the configuration from disk, falling back to built-in defaults.
    pub fn load() -> Self {
        let path = resolve_config_path();
        let config = match fs::read_to_string(&path) {
            Ok(contents) => match Self::from_json(&contents) {
                Ok(config) => {
                    info!(
                        path = %path.display(),
                        tasks = config.tasks.len(),
                        "loaded client config"
                    );
                    config
                }
                Err(err) => {
                    warn!(
                        path = %path.display(),
                        error = %err,
                        "failed to parse config; falling back to defaults"
                    );
                    Self::default()
                }
            },
            Err(err) if err.kind() == ErrorKind::NotFound => {
                info!(
                    path = %path.display(),
                    "config file not found; using built-in defaults"
                );
                Self::default()
            }
            Err(err) => {
                warn!(
                    path = %path.display(),
                    error = %err,
                    "failed to read config; falling back to defaults"
                );
                Self::default()
            }
        };

        match env::var(BASE_URL_ENV) {
            Ok(base_url) if !base_url.trim().is_empty() => Self {
                base_url: base_url.trim().to_string(),
                ..config
            },
            _ => config,
        }
    }

    /// Parse a configuration document; absent fields keep their defaults.
    pub fn from_json(contents: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str::<RawConfig>(contents).map(Into::into)
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.into(),
            board: BoardSettings::default(),
            feedback_ttl: Duration::from_millis(4_000),
            tasks: default_tasks(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
/// JSON representation of the file located at [`DEFAULT_CONFIG_PATH`].
struct RawConfig {
    base_url: String,
    prize_pool: f64,
    score_bar_ceiling: u32,
    channel_ceiling: i64,
    feedback_ttl_ms: u64,
    tasks: Vec<TaskDefinition>,
}

impl Default for RawConfig {
    fn default() -> Self {
        let board = BoardSettings::default();
        Self {
            base_url: DEFAULT_BASE_URL.into(),
            prize_pool: board.prize_pool,
            score_bar_ceiling: board.score_bar_ceiling,
            channel_ceiling: board.channel_ceiling,
            feedback_ttl_ms: 4_000,
            tasks: default_tasks(),
        }
    }
}

impl From<RawConfig> for ClientConfig {
    fn from(value: RawConfig) -> Self {
        Self {
            base_url: value.base_url,
            board: BoardSettings {
                prize_pool: value.prize_pool,
                score_bar_ceiling: value.score_bar_ceiling,
                channel_ceiling: value.channel_ceiling,
            },
            feedback_ttl: Duration::from_millis(value.feedback_ttl_ms),
            tasks: value.tasks,
        }
    }
}

/// Resolve the configuration path taking the environment override into account.
fn resolve_config_path() -> PathBuf {
    env::var_os(CONFIG_PATH_ENV)
        .map(PathBuf::from)
        .filter(|path| !path.as_os_str().is_empty())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
}

/// Built-in task catalog.
fn default_tasks() -> Vec<TaskDefinition> {
    vec![
        TaskDefinition::new("Telegram Post", 1),
        TaskDefinition::new("IG Story", 1),
        TaskDefinition::new("IG Redesign", 3),
        TaskDefinition::new("IG New Design", 7),
    ]
}

/// Settings of the server binary. Supabase credentials are read separately by the
/// Supabase store configuration.
#[derive(Debug, Clone, Default)]
pub struct ServerSettings {
    /// Listening port.
    pub port: u16,
    /// Password expected by the reset endpoint.
    pub admin_password: Option<String>,
    /// Channel rows seeding the in-memory store.
    pub seed_channels: Vec<ChannelEntity>,
}

impl ServerSettings {
    /// Read the settings from the process environment.
    pub fn from_env() -> Self {
        let port = env::var("PORT")
            .or_else(|_| env::var("SERVER_PORT"))
            .ok()
            .and_then(|value| value.parse::<u16>().ok())
            .unwrap_or(DEFAULT_PORT);

        let admin_password = non_empty_var("ADMIN_PASSWORD");
        if admin_password.is_none() {
            warn!("ADMIN_PASSWORD not set; score resets will be refused");
        }

        let seed_channels = env::var_os("SCOREBOARD_CHANNELS_PATH")
            .map(PathBuf::from)
            .map(|path| load_channels(&path))
            .unwrap_or_default();

        Self {
            port,
            admin_password,
            seed_channels,
        }
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn load_channels(path: &Path) -> Vec<ChannelEntity> {
    let parsed = fs::read_to_string(path)
        .map_err(|err| err.to_string())
        .and_then(|contents| {
            serde_json::from_str::<Vec<ChannelEntity>>(&contents).map_err(|err| err.to_string())
        });
    match parsed {
        Ok(channels) => {
            info!(path = %path.display(), count = channels.len(), "loaded seed channels");
            channels
        }
        Err(err) => {
            warn!(path = %path.display(), error = %err, "failed to load seed channels");
            Vec::new()
        }
    }
}
