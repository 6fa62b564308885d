use std::{env, net::SocketAddr, sync::Arc};

use thiserror::Error;
use tracing::{info, warn};

use crate::middleware::auth::{AuthMode, Session};

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
const DEFAULT_DEV_USER_ID: &str = "686968c9e6ef528cc7e7aff3";
const DEFAULT_DEV_USER_ROLE: &str = "CUSTOMER";

#[derive(Clone, Debug)]
pub struct Config {
    pub database_url: String,
    pub bind_addr: SocketAddr,
    pub auth_mode: AuthMode,
    pub seed_demo_catalog: bool,
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("Invalid {key} value `{value}`: {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = lookup("DATABASE_URL").ok_or(ConfigError::Missing("DATABASE_URL"))?;

        let bind_addr = or_default(&lookup, "BIND_ADDR", DEFAULT_BIND_ADDR);
        let bind_addr = bind_addr
            .parse::<SocketAddr>()
            .map_err(|e| ConfigError::Invalid {
                key: "BIND_ADDR",
                value: bind_addr.clone(),
                reason: e.to_string(),
            })?;

        let auth_mode = if flag(&lookup, "AUTH_DEV_BYPASS")? {
            let session = Session {
                user_id: or_default(&lookup, "DEV_USER_ID", DEFAULT_DEV_USER_ID),
                role: or_default(&lookup, "DEV_USER_ROLE", DEFAULT_DEV_USER_ROLE),
            };
            warn!(
                user_id = %session.user_id,
                role = %session.role,
                "AUTH_DEV_BYPASS is on: every request runs as the development identity"
            );
            AuthMode::Development(session)
        } else {
            let secret = lookup("JWT_SECRET")
                .filter(|s| !s.is_empty())
                .ok_or(ConfigError::Missing("JWT_SECRET"))?;
            AuthMode::Jwt {
                secret: Arc::from(secret),
            }
        };

        Ok(Self {
            database_url,
            bind_addr,
            auth_mode,
            seed_demo_catalog: flag(&lookup, "SEED_DEMO_CATALOG")?,
        })
    }
}

fn or_default<F>(lookup: &F, key: &str, default: &str) -> String
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key).unwrap_or_else(|| {
        info!("{key} not set, using default: {default}");
        default.to_string()
    })
}

fn flag<F>(lookup: &F, key: &'static str) -> Result<bool, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        None => Ok(false),
        Some(value) => match value.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Ok(true),
            "0" | "false" | "no" | "off" | "" => Ok(false),
            _ => Err(ConfigError::Invalid {
                key,
                value,
                reason: "expected a boolean".into(),
            }),
        },
    }
}
