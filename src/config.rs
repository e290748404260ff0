//! Server configuration loaded from the environment

use std::net::{IpAddr, Ipv4Addr};
use std::str::FromStr;
use std::time::Duration;

const DEFAULT_PORT: u16 = 3000;
const DEFAULT_GRACE_SECS: u64 = 60;
const DEFAULT_STATIC_DIR: &str = "static";

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind_addr: IpAddr,
    pub port: u16,
    /// How long a dropped player keeps their seat in a running game
    pub disconnect_grace: Duration,
    pub static_dir: String,
    /// Fixed seed for role, seating and deck randomness (reproducible games)
    pub game_seed: Option<u64>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: DEFAULT_PORT,
            disconnect_grace: Duration::from_secs(DEFAULT_GRACE_SECS),
            static_dir: DEFAULT_STATIC_DIR.to_string(),
            game_seed: None,
        }
    }
}

/// Parse an env var, warning and falling back to `default` on garbage
fn env_or<T: FromStr>(key: &str, default: T) -> T {
    match std::env::var(key) {
        Ok(raw) => match raw.trim().parse() {
            Ok(value) => value,
            Err(_) => {
                tracing::warn!("Invalid value {:?} for {}, using default", raw, key);
                default
            }
        },
        Err(_) => default,
    }
}

impl ServerConfig {
    /// Load config from environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let game_seed = std::env::var("GAME_SEED")
            .ok()
            .and_then(|raw| match raw.trim().parse() {
                Ok(seed) => Some(seed),
                Err(_) => {
                    tracing::warn!("Ignoring invalid GAME_SEED {:?}", raw);
                    None
                }
            });

        let config = Self {
            bind_addr: env_or("BIND_ADDR", defaults.bind_addr),
            port: env_or("PORT", defaults.port),
            disconnect_grace: Duration::from_secs(env_or(
                "DISCONNECT_GRACE_SECS",
                DEFAULT_GRACE_SECS,
            )),
            static_dir: std::env::var("STATIC_DIR").unwrap_or(defaults.static_dir),
            game_seed,
        };

        tracing::info!(
            bind_addr = %config.bind_addr,
            port = config.port,
            grace_secs = config.disconnect_grace.as_secs(),
            seeded = config.game_seed.is_some(),
            "Server config loaded"
        );

        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ServerConfig::default();
        assert_eq!(config.port, 3000);
        assert_eq!(config.disconnect_grace, Duration::from_secs(60));
        assert_eq!(config.bind_addr.to_string(), "0.0.0.0");
        assert!(config.game_seed.is_none());
    }

    #[test]
    fn test_env_or_falls_back_on_missing_key() {
        assert_eq!(env_or("SECRET_HITLER_TEST_UNSET_KEY", 42u16), 42);
    }
}
