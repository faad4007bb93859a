use std::{env, fs};
use std::net::{IpAddr, Ipv4Addr};

use log::{debug, warn};
use serde_derive::Deserialize;
use thiserror::Error;

/// Default Stripe REST endpoint; overridable for local stub servers.
const STRIPE_API_URL: &str = "https://api.stripe.com/v1";

#[derive(Deserialize, Debug, Default)]
#[serde(default)]
pub struct Config {
    pub app: AppConf,
    pub server: ServerConf,
    pub stripe: StripeConf,
    pub notifications: NotificationsConf,
    pub log: LogConf,
}

#[derive(Deserialize, Debug)]
#[serde(default)]
pub struct AppConf {
    pub environment: String,
}

impl Default for AppConf {
    fn default() -> Self {
        AppConf {
            environment: "development".to_string(),
        }
    }
}

#[derive(Deserialize, Debug)]
#[serde(default)]
pub struct ServerConf {
    pub address: IpAddr,
    pub port: u16,
}

impl Default for ServerConf {
    fn default() -> Self {
        ServerConf {
            address: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: 4242,
        }
    }
}

#[derive(Deserialize, Debug)]
#[serde(default)]
pub struct StripeConf {
    pub secret_key: Option<String>,
    pub webhook_secret: Option<String>,
    pub api_url: String,
}

impl Default for StripeConf {
    fn default() -> Self {
        StripeConf {
            secret_key: None,
            webhook_secret: None,
            api_url: STRIPE_API_URL.to_string(),
        }
    }
}

#[derive(Deserialize, Debug)]
#[serde(default)]
pub struct NotificationsConf {
    pub store_file: String,
}

impl Default for NotificationsConf {
    fn default() -> Self {
        NotificationsConf {
            store_file: "notifications.json".to_string(),
        }
    }
}

#[derive(Deserialize, Debug)]
#[serde(default)]
pub struct LogConf {
    pub file: String,
}

impl Default for LogConf {
    fn default() -> Self {
        LogConf {
            file: "glowlink-payments.log".to_string(),
        }
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Config file could not be read")]
    ConfigNotFound(std::io::Error),

    #[error("Config file could not be parsed")]
    ParsingError(toml::de::Error),

    #[error("Env variable could not be found")]
    EnvVarNotFound(std::env::VarError),
}

impl Config {
    /// Loads the config file from the env path, then the default path,
    /// then falls back to built-in defaults. Environment variables win
    /// over whatever the file said.
    pub fn from_any() -> Self {
        let mut config = match Self::from_env_path() {
            Ok(config) => {
                debug!("Loaded config from env path");
                config
            }
            Err(env_error) => {
                debug!("Could not load config from env path: {}", env_error);
                match Self::from_default_path() {
                    Ok(config) => {
                        debug!("Loaded config from default path");
                        config
                    }
                    Err(error) => {
                        warn!("Could not load config file: {}. Using defaults", error);
                        Config::default()
                    }
                }
            }
        };

        config.apply_env();

        if config.stripe.secret_key.is_none() {
            warn!("STRIPE_SECRET_KEY not set. The server will still start but Stripe calls will fail.");
        }

        config
    }

    // Read Config from default path
    pub fn from_default_path() -> Result<Self, ConfigError> {
        let path = "config.toml";
        Self::from_file_path(path)
    }

    // Read Config from path in CONFIG_LOCATION env variable
    pub fn from_env_path() -> Result<Self, ConfigError> {
        let path = env::var("CONFIG_LOCATION").map_err(ConfigError::EnvVarNotFound)?;
        Self::from_file_path(&path)
    }

    // Read and Parse Config from path
    pub fn from_file_path(path: &str) -> Result<Self, ConfigError> {
        let data = fs::read_to_string(path).map_err(ConfigError::ConfigNotFound)?;

        toml::from_str(data.as_str()).map_err(ConfigError::ParsingError)
    }

    fn apply_env(&mut self) {
        if let Ok(key) = env::var("STRIPE_SECRET_KEY") {
            if !key.is_empty() {
                self.stripe.secret_key = Some(key);
            }
        }

        if let Ok(secret) = env::var("STRIPE_WEBHOOK_SECRET") {
            if !secret.is_empty() {
                self.stripe.webhook_secret = Some(secret);
            }
        }

        if let Ok(port) = env::var("STRIPE_PORT") {
            match port.parse::<u16>() {
                Ok(port) => self.server.port = port,
                Err(_) => warn!("Ignoring invalid STRIPE_PORT value: {}", port),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::sync::Mutex;

    // Env vars are process-wide; tests touching them take this lock.
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    fn clear_env() {
        env::remove_var("STRIPE_SECRET_KEY");
        env::remove_var("STRIPE_WEBHOOK_SECRET");
        env::remove_var("STRIPE_PORT");
        env::remove_var("CONFIG_LOCATION");
    }

    #[test]
    fn defaults_cover_a_missing_file() {
        let config = Config::default();

        assert_eq!(config.server.port, 4242);
        assert_eq!(config.app.environment, "development");
        assert_eq!(config.stripe.api_url, STRIPE_API_URL);
        assert!(config.stripe.secret_key.is_none());
        assert_eq!(config.notifications.store_file, "notifications.json");
    }

    #[test]
    fn partial_file_keeps_defaults_for_the_rest() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(
            file,
            "[server]\nport = 9000\n\n[stripe]\nsecret_key = \"sk_test_123\""
        )
        .unwrap();

        let config = Config::from_file_path(path.to_str().unwrap()).unwrap();

        assert_eq!(config.server.port, 9000);
        assert_eq!(config.stripe.secret_key.as_deref(), Some("sk_test_123"));
        assert_eq!(config.app.environment, "development");
        assert_eq!(config.log.file, "glowlink-payments.log");
    }

    #[test]
    fn unparseable_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "server = not toml").unwrap();

        let result = Config::from_file_path(path.to_str().unwrap());
        assert!(matches!(result, Err(ConfigError::ParsingError(_))));
    }

    #[test]
    fn corrupt_file_falls_back_to_defaults() {
        let _guard = ENV_LOCK.lock().unwrap();
        clear_env();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "server = not toml").unwrap();
        env::set_var("CONFIG_LOCATION", path.to_str().unwrap());

        let config = Config::from_any();

        assert_eq!(config.server.port, 4242);
        assert_eq!(config.stripe.api_url, STRIPE_API_URL);
        assert!(config.stripe.secret_key.is_none());
        assert_eq!(config.app.environment, "development");

        clear_env();
    }

    #[test]
    fn env_overrides_file_values() {
        let _guard = ENV_LOCK.lock().unwrap();
        clear_env();

        env::set_var("STRIPE_SECRET_KEY", "sk_env");
        env::set_var("STRIPE_WEBHOOK_SECRET", "whsec_env");
        env::set_var("STRIPE_PORT", "5555");

        let mut config = Config::default();
        config.stripe.secret_key = Some("sk_file".to_string());
        config.apply_env();

        assert_eq!(config.stripe.secret_key.as_deref(), Some("sk_env"));
        assert_eq!(config.stripe.webhook_secret.as_deref(), Some("whsec_env"));
        assert_eq!(config.server.port, 5555);

        clear_env();
    }

    #[test]
    fn invalid_port_and_empty_values_are_ignored() {
        let _guard = ENV_LOCK.lock().unwrap();
        clear_env();

        env::set_var("STRIPE_SECRET_KEY", "");
        env::set_var("STRIPE_PORT", "not-a-port");

        let mut config = Config::default();
        config.apply_env();

        assert!(config.stripe.secret_key.is_none());
        assert_eq!(config.server.port, 4242);

        clear_env();
    }
}
