use roomcast_core::Identity;
use std::env;
use std::net::SocketAddr;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {value}")]
    Invalid { var: &'static str, value: String },
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub addr: SocketAddr,
    pub room_capacity: usize,
    pub message_log_capacity: usize,
    pub seed_users: Vec<Identity>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: SocketAddr::from(([0, 0, 0, 0], 3000)),
            room_capacity: 10_000,
            message_log_capacity: 100,
            seed_users: Vec::new(),
        }
    }
}

impl ServerConfig {
    /// Read configuration from `ROOMCAST_*` environment variables,
    /// falling back to defaults for anything unset.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Ok(raw) = env::var("ROOMCAST_ADDR") {
            config.addr = raw.parse().map_err(|_| ConfigError::Invalid {
                var: "ROOMCAST_ADDR",
                value: raw.clone(),
            })?;
        }
        if let Ok(raw) = env::var("ROOMCAST_ROOM_CAPACITY") {
            config.room_capacity = parse_nonzero("ROOMCAST_ROOM_CAPACITY", &raw)?;
        }
        if let Ok(raw) = env::var("ROOMCAST_MESSAGE_LOG_CAPACITY") {
            config.message_log_capacity = parse_nonzero("ROOMCAST_MESSAGE_LOG_CAPACITY", &raw)?;
        }
        if let Ok(raw) = env::var("ROOMCAST_SEED_USERS") {
            config.seed_users = parse_seed_users(&raw)?;
        }

        Ok(config)
    }
}

fn parse_nonzero(var: &'static str, raw: &str) -> Result<usize, ConfigError> {
    match raw.parse::<usize>() {
        Ok(value) if value > 0 => Ok(value),
        _ => Err(ConfigError::Invalid {
            var,
            value: raw.to_owned(),
        }),
    }
}

/// Comma-separated `email:display_name` pairs.
fn parse_seed_users(raw: &str) -> Result<Vec<Identity>, ConfigError> {
    raw.split(',')
        .filter(|pair| !pair.trim().is_empty())
        .map(|pair| {
            let (email, display_name) =
                pair.trim()
                    .split_once(':')
                    .ok_or_else(|| ConfigError::Invalid {
                        var: "ROOMCAST_SEED_USERS",
                        value: pair.to_owned(),
                    })?;
            if email.is_empty() || display_name.is_empty() {
                return Err(ConfigError::Invalid {
                    var: "ROOMCAST_SEED_USERS",
                    value: pair.to_owned(),
                });
            }
            Ok(Identity::new(email, display_name))
        })
        .collect()
}
