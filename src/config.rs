use chrono::TimeDelta;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::ErrorKind;
use thiserror::Error;

/// Startup configuration errors. All of them are fatal.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },
    #[error("missing PORT (set gateway.port or the PORT environment variable)")]
    MissingPort,
    #[error("missing JWT_SECRET (set auth.jwt_secret or the JWT_SECRET environment variable)")]
    MissingSecret,
    #[error("invalid token ttl {0:?}; expected <n>s, <n>m, <n>h or <n>d")]
    InvalidTtl(String),
    #[error("invalid value {value:?} for environment variable {name}")]
    InvalidEnv { name: &'static str, value: String },
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct AppConfig {
    pub log_level: String,
    pub log_dir: String,
    pub log_file: String,
    pub use_json: bool,
    /// `hourly`, `daily` or anything else for a single file
    pub rotation: String,
    pub gateway: GatewayConfig,
    pub auth: AuthConfig,
    pub verifier: VerifierConfig,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct GatewayConfig {
    pub host: String,
    pub port: Option<u16>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct AuthConfig {
    pub jwt_secret: Option<String>,
    /// Session token lifetime, e.g. `1h` or `1d`
    pub token_ttl: String,
    /// When false, every middleware rejection reads "unauthorized"
    pub detailed_errors: bool,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct VerifierConfig {
    /// Endpoint that checks a sign-in message signature against the Farcaster id registry
    pub url: String,
    pub timeout_secs: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_dir: "./logs".to_string(),
            log_file: "farstack.log".to_string(),
            use_json: false,
            rotation: "daily".to_string(),
            gateway: GatewayConfig::default(),
            auth: AuthConfig::default(),
            verifier: VerifierConfig::default(),
        }
    }
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: None,
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: None,
            token_ttl: "1h".to_string(),
            detailed_errors: true,
        }
    }
}

impl Default for VerifierConfig {
    fn default() -> Self {
        Self {
            url: "http://127.0.0.1:8788/verify".to_string(),
            timeout_secs: 10,
        }
    }
}

impl AppConfig {
    /// Load `config/<env>.yaml`, apply environment overrides and validate.
    ///
    /// A missing file is not an error; the defaults plus the environment
    /// must then provide the port and the secret.
    pub fn load(env: &str) -> Result<Self, ConfigError> {
        let config_path = format!("config/{}.yaml", env);
        let mut config = match fs::read_to_string(&config_path) {
            Ok(content) => Self::from_yaml(&content, &config_path)?,
            Err(e) if e.kind() == ErrorKind::NotFound => Self::default(),
            Err(source) => {
                return Err(ConfigError::Read {
                    path: config_path,
                    source,
                });
            }
        };
        config.apply_env(|name| std::env::var(name).ok())?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_yaml(content: &str, path: &str) -> Result<Self, ConfigError> {
        serde_yaml::from_str(content).map_err(|source| ConfigError::Parse {
            path: path.to_string(),
            source,
        })
    }

    /// Override file values with `PORT`, `JWT_SECRET`, `TOKEN_TTL` and `VERIFIER_URL`.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(port) = lookup("PORT").filter(|v| !v.is_empty()) {
            let parsed = port.parse().map_err(|_| ConfigError::InvalidEnv {
                name: "PORT",
                value: port.clone(),
            })?;
            self.gateway.port = Some(parsed);
        }
        if let Some(secret) = lookup("JWT_SECRET").filter(|v| !v.is_empty()) {
            self.auth.jwt_secret = Some(secret);
        }
        if let Some(ttl) = lookup("TOKEN_TTL").filter(|v| !v.is_empty()) {
            self.auth.token_ttl = ttl;
        }
        if let Some(url) = lookup("VERIFIER_URL").filter(|v| !v.is_empty()) {
            self.verifier.url = url;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.gateway.port.is_none() {
            return Err(ConfigError::MissingPort);
        }
        if self.auth.secret().is_none() {
            return Err(ConfigError::MissingSecret);
        }
        self.auth.ttl()?;
        Ok(())
    }
}

impl AuthConfig {
    pub fn secret(&self) -> Option<&str> {
        self.jwt_secret.as_deref().filter(|s| !s.is_empty())
    }

    pub fn ttl(&self) -> Result<TimeDelta, ConfigError> {
        parse_ttl(&self.token_ttl)
    }
}

/// Parse a lifetime such as `45s`, `30m`, `1h` or `1d`. A bare number is seconds.
pub fn parse_ttl(raw: &str) -> Result<TimeDelta, ConfigError> {
    let invalid = || ConfigError::InvalidTtl(raw.to_string());
    let value = raw.trim();
    let (digits, unit_secs) = match value.char_indices().last() {
        Some((idx, 's')) => (&value[..idx], 1),
        Some((idx, 'm')) => (&value[..idx], 60),
        Some((idx, 'h')) => (&value[..idx], 3_600),
        Some((idx, 'd')) => (&value[..idx], 86_400),
        Some(_) => (value, 1),
        None => return Err(invalid()),
    };
    let count: i64 = digits.trim().parse().map_err(|_| invalid())?;
    if count <= 0 {
        return Err(invalid());
    }
    count
        .checked_mul(unit_secs)
        .and_then(TimeDelta::try_seconds)
        .ok_or_else(invalid)
}
