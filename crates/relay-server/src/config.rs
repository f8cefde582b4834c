//! Configuration for the relay server.
//!
//! Defaults, overridable via a few environment variables:
//!
//! - `RELAY_BIND_ADDR`   (default: "127.0.0.1")
//! - `RELAY_PORT`        (default: "8765")
//! - `RELAY_MAX_CLIENTS` (default: "1024")
//!
//! Log filtering is separate and follows `RUST_LOG`.

use std::env;
use std::str::FromStr;

use anyhow::Context;

/// Server configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// IP address / interface to bind to (e.g. "0.0.0.0" or "127.0.0.1").
    pub bind_addr: String,

    /// TCP port to listen on. `0` picks a free port.
    pub port: u16,

    /// Maximum number of simultaneously connected clients.
    pub max_clients: usize,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            bind_addr: "127.0.0.1".to_string(),
            port: 8765,
            max_clients: 1024,
        }
    }
}

impl Config {
    /// Construct a `Config` from environment variables, falling back
    /// to the defaults above.
    pub fn from_env() -> anyhow::Result<Self> {
        let defaults = Config::default();

        let bind_addr = env::var("RELAY_BIND_ADDR").unwrap_or(defaults.bind_addr);
        let port = read_env_or_default("RELAY_PORT", defaults.port)?;
        let max_clients = read_env_or_default("RELAY_MAX_CLIENTS", defaults.max_clients)?;

        Ok(Config {
            bind_addr,
            port,
            max_clients,
        })
    }

    /// Convenience: `addr:port` socket string.
    pub fn socket_addr_string(&self) -> String {
        format!("{}:{}", self.bind_addr, self.port)
    }
}

fn read_env_or_default<T>(key: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(key) {
        Ok(val) => val
            .parse::<T>()
            .with_context(|| format!("invalid value for {}: {:?}", key, val)),
        Err(_) => Ok(default),
    }
}
