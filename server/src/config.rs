use std::{env, fmt::Display, fs::read_to_string, str::FromStr};

use tracing::{info, warn};

pub struct Config {
    pub port: u16,
    pub api_key: String,
    pub api_base_url: String,
    pub clawback_redis_url: String,
    pub prices_redis_url: String,
    pub roster_dir: String,
}

impl Config {
    pub fn load() -> Self {
        Self {
            port: try_load("RUST_PORT", "1111"),
            api_key: load_secret("API_KEY"),
            api_base_url: try_load("API_BASE_URL", ""),
            clawback_redis_url: try_load("CLAWBACK_REDIS_URL", "redis://127.0.0.1:6379/0"),
            prices_redis_url: try_load("PRICES_REDIS_URL", "redis://127.0.0.1:6379/1"),
            roster_dir: try_load("ROSTER_DIR", "data"),
        }
    }
}

fn var(key: &str) -> Result<String, ()> {
    env::var(key).map_err(|_| {
        warn!("Environment variable {key} not found, using default");
    })
}

fn try_load<T: FromStr>(key: &str, default: &str) -> T
where
    T::Err: Display,
{
    var(key)
        .unwrap_or_else(|_| {
            info!("{key} not set, using default: {default}");
            default.to_string()
        })
        .parse()
        .map_err(|e| {
            warn!("Invalid {key} value: {e}");
        })
        .expect("Environment misconfigured!")
}

/// Secrets come from the environment first, then the Docker secrets
/// mount. An absent secret disables keyed auth rather than failing
/// startup.
fn load_secret(secret_name: &str) -> String {
    if let Ok(value) = env::var(secret_name) {
        return value.trim().to_string();
    }

    let path = format!("/run/secrets/{secret_name}");

    read_to_string(&path)
        .map(|s| s.trim().to_string())
        .unwrap_or_else(|_| {
            warn!("{secret_name} not configured, keyed auth and proxy forwarding are disabled");
            String::new()
        })
}
