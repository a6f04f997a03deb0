use crate::{
    config::{Env, ReviewConfigError, ReviewConfigResult},
    defaults,
    utils::{is_opt_env_var, trim_opt_env_key},
};
use serde::Deserialize;
use std::str::FromStr;
use url::{ParseError, Url};

#[derive(Clone, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DatabaseConfig {
    Postgres {
        #[serde(default = "default_user")]
        user: String,
        #[serde(default)]
        password: String,
        #[serde(default = "default_host")]
        host: String,
        #[serde(default = "default_port")]
        port: String,
        #[serde(default = "default_database")]
        database: String,
    },
}

fn default_user() -> String {
    defaults::POSTGRES_USER.into()
}

fn default_host() -> String {
    defaults::POSTGRES_HOST.into()
}

fn default_port() -> String {
    defaults::POSTGRES_PORT.into()
}

fn default_database() -> String {
    defaults::POSTGRES_DATABASE.into()
}

impl Env for DatabaseConfig {
    fn inject_opt_env_vars(&mut self) -> ReviewConfigResult<()> {
        match self {
            DatabaseConfig::Postgres {
                user,
                password,
                host,
                port,
                database,
            } => {
                for value in [user, password, host, port, database] {
                    if is_opt_env_var(value) {
                        *value = std::env::var(trim_opt_env_key(value)?)?;
                    }
                }
            }
        }
        Ok(())
    }
}

impl std::fmt::Display for DatabaseConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DatabaseConfig::Postgres {
                user,
                password,
                host,
                port,
                database,
            } => {
                write!(f, "postgres://{user}:{password}@{host}:{port}/{database}")
            }
        }
    }
}

impl std::fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DatabaseConfig::Postgres {
                user,
                host,
                port,
                database,
                ..
            } => f
                .debug_struct("PostgresConfig")
                .field("user", &user)
                .field("password", &"XXXX")
                .field("host", &host)
                .field("port", &port)
                .field("database", &database)
                .finish(),
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        DatabaseConfig::Postgres {
            user: defaults::POSTGRES_USER.into(),
            password: defaults::POSTGRES_PASSWORD.into(),
            host: defaults::POSTGRES_HOST.into(),
            port: defaults::POSTGRES_PORT.into(),
            database: defaults::POSTGRES_DATABASE.into(),
        }
    }
}

impl FromStr for DatabaseConfig {
    type Err = ReviewConfigError;

    fn from_str(db_url: &str) -> ReviewConfigResult<Self> {
        let url = Url::parse(db_url)?;

        match url.scheme() {
            "postgres" | "postgresql" => {
                let host = url.host_str().ok_or(ParseError::EmptyHost)?;
                let port = url
                    .port()
                    .map(|p| p.to_string())
                    .unwrap_or_else(|| defaults::POSTGRES_PORT.to_string());
                let database = url
                    .path_segments()
                    .and_then(|mut segments| segments.next())
                    .filter(|s| !s.is_empty())
                    .unwrap_or(defaults::POSTGRES_DATABASE);

                Ok(DatabaseConfig::Postgres {
                    user: url.username().to_string(),
                    password: url.password().unwrap_or_default().to_string(),
                    host: host.to_string(),
                    port,
                    database: database.to_string(),
                })
            }
            scheme => Err(ReviewConfigError::UnsupportedDatabase(scheme.to_string())),
        }
    }
}
