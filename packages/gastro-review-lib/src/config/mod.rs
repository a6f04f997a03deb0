pub mod database;
pub mod pagination;

pub use crate::{
    config::{database::DatabaseConfig, pagination::PaginationConfig},
    defaults,
};
pub use clap::{Args, Parser};
use serde::Deserialize;
use std::{
    fs::File,
    io::Error,
    path::{Path, PathBuf},
    str::FromStr,
};
use strum::{AsRefStr, EnumString};
use thiserror::Error;

/// Error type returned by configuration operations.
#[derive(Error, Debug)]
pub enum ReviewConfigError {
    #[error("Error parsing env variables from config")]
    EnvVarParseError(#[from] std::env::VarError),
    #[error("Error processing file: {0:?}")]
    ConfigFileError(#[from] Error),
    #[error("Error processing YAML file: {0:?}")]
    SerdeYamlError(#[from] serde_yaml::Error),
    #[error("URL parser error: {0:?}")]
    ParseError(#[from] url::ParseError),
    #[error("Database backend not supported: {0:?}")]
    UnsupportedDatabase(String),
    #[error("Page size must be greater than zero.")]
    InvalidPageSize,
    #[error("Invalid environment variable reference: {0:?}")]
    InvalidEnvVarKey(String),
}

/// Result type returned by configuration operations.
pub type ReviewConfigResult<T> = core::result::Result<T, ReviewConfigError>;

/// Set of PostgresQL configuration constants.
#[derive(Debug, EnumString, AsRefStr)]
pub enum EnvVar {
    #[strum(serialize = "POSTGRES_HOST")]
    PostgresHost,
    #[strum(serialize = "POSTGRES_PASSWORD")]
    PostgresPassword,
    #[strum(serialize = "POSTGRES_DATABASE")]
    PostgresDatabase,
    #[strum(serialize = "POSTGRES_PORT")]
    PostgresPort,
    #[strum(serialize = "POSTGRES_USER")]
    PostgresUser,
}

/// Return the value of an environment variable or a default value.
pub fn env_or_default(var: EnvVar, default: String) -> String {
    std::env::var(var.as_ref()).unwrap_or(default)
}

/// Options shared by every `gastro-review` command that touches the database.
#[derive(Debug, Args, Clone)]
pub struct ReviewArgs {
    /// Log level passed to the Gastro Review tooling.
    #[clap(long, default_value = defaults::LOG_LEVEL, value_parser(["info", "debug", "error", "warn", "trace"]), help = "Log level passed to the Gastro Review tooling.")]
    pub log_level: String,

    /// Gastro Review config file.
    #[clap(short, long, value_name = "FILE", help = "Gastro Review config file.")]
    pub config: Option<PathBuf>,

    /// Database type.
    #[clap(long, help = "Database type.", default_value = defaults::DATABASE, value_parser(["postgres"]))]
    pub database: String,

    /// Postgres username.
    #[clap(long, help = "Postgres username.")]
    pub postgres_user: Option<String>,

    /// Postgres database.
    #[clap(long, help = "Postgres database.")]
    pub postgres_database: Option<String>,

    /// Postgres password.
    #[clap(long, help = "Postgres password.")]
    pub postgres_password: Option<String>,

    /// Postgres host.
    #[clap(long, help = "Postgres host.")]
    pub postgres_host: Option<String>,

    /// Postgres port.
    #[clap(long, help = "Postgres port.")]
    pub postgres_port: Option<String>,

    /// Postgres connection URL. Takes precedence over the individual Postgres flags.
    #[clap(long, value_name = "URL", help = "Postgres connection URL. Takes precedence over the individual Postgres flags.")]
    pub database_url: Option<String>,

    /// Run database migrations before executing the command.
    #[clap(long, help = "Run database migrations before executing the command.")]
    pub run_migrations: bool,

    /// Number of rows returned per page by listings.
    #[clap(long, help = "Number of rows returned per page by listings.", default_value_t = defaults::PAGE_SIZE)]
    pub page_size: usize,

    /// Enable verbose logging.
    #[clap(short, long, help = "Enable verbose logging.")]
    pub verbose: bool,
}

impl Default for ReviewArgs {
    fn default() -> Self {
        Self {
            log_level: defaults::LOG_LEVEL.to_string(),
            config: None,
            database: defaults::DATABASE.to_string(),
            postgres_user: None,
            postgres_database: None,
            postgres_password: None,
            postgres_host: None,
            postgres_port: None,
            database_url: None,
            run_migrations: defaults::RUN_MIGRATIONS,
            page_size: defaults::PAGE_SIZE,
            verbose: defaults::VERBOSE_LOGGING,
        }
    }
}

pub trait Env {
    fn inject_opt_env_vars(&mut self) -> ReviewConfigResult<()>;
}

fn default_log_level() -> String {
    defaults::LOG_LEVEL.to_string()
}

/// Gastro Review configuration.
#[derive(Clone, Deserialize, Debug, PartialEq, Eq)]
pub struct ReviewConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default)]
    pub verbose: bool,
    #[serde(default)]
    pub run_migrations: bool,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub pagination: PaginationConfig,
}

impl Default for ReviewConfig {
    fn default() -> Self {
        Self {
            log_level: defaults::LOG_LEVEL.to_string(),
            verbose: defaults::VERBOSE_LOGGING,
            run_migrations: defaults::RUN_MIGRATIONS,
            database: DatabaseConfig::default(),
            pagination: PaginationConfig::default(),
        }
    }
}

impl TryFrom<ReviewArgs> for ReviewConfig {
    type Error = ReviewConfigError;

    fn try_from(args: ReviewArgs) -> ReviewConfigResult<Self> {
        let database = match (args.database.as_str(), args.database_url.as_deref()) {
            ("postgres", Some(url)) => DatabaseConfig::from_str(url)?,
            ("postgres", None) => DatabaseConfig::Postgres {
                user: args.postgres_user.unwrap_or_else(|| {
                    env_or_default(
                        EnvVar::PostgresUser,
                        defaults::POSTGRES_USER.to_string(),
                    )
                }),
                password: args.postgres_password.unwrap_or_else(|| {
                    env_or_default(
                        EnvVar::PostgresPassword,
                        defaults::POSTGRES_PASSWORD.to_string(),
                    )
                }),
                host: args.postgres_host.unwrap_or_else(|| {
                    env_or_default(
                        EnvVar::PostgresHost,
                        defaults::POSTGRES_HOST.to_string(),
                    )
                }),
                port: args.postgres_port.unwrap_or_else(|| {
                    env_or_default(
                        EnvVar::PostgresPort,
                        defaults::POSTGRES_PORT.to_string(),
                    )
                }),
                database: args.postgres_database.unwrap_or_else(|| {
                    env_or_default(
                        EnvVar::PostgresDatabase,
                        defaults::POSTGRES_DATABASE.to_string(),
                    )
                }),
            },
            (other, _) => {
                return Err(ReviewConfigError::UnsupportedDatabase(other.to_string()))
            }
        };

        let mut config = ReviewConfig {
            log_level: args.log_level,
            verbose: args.verbose,
            run_migrations: args.run_migrations,
            database,
            pagination: PaginationConfig {
                page_size: args.page_size,
            },
        };

        config.inject_opt_env_vars()?;
        config.validate()?;

        Ok(config)
    }
}

impl ReviewConfig {
    /// Load the config from either the file passed on the command line or the
    /// command line flags themselves.
    pub fn from_args(args: ReviewArgs) -> ReviewConfigResult<Self> {
        match &args.config {
            Some(path) => Self::from_file(path),
            None => Self::try_from(args),
        }
    }

    // When building the config via a file, if any section (e.g., database, pagination, etc),
    // or if any individual setting in a section (e.g., database.postgres.host) is empty, replace it
    // with its respective default value.
    pub fn from_file(path: impl AsRef<Path>) -> ReviewConfigResult<Self> {
        let file = File::open(path)?;

        let mut config: ReviewConfig = serde_yaml::from_reader(file)?;

        config.inject_opt_env_vars()?;
        config.validate()?;

        Ok(config)
    }

    // Inject env vars into each section of the config
    pub fn inject_opt_env_vars(&mut self) -> ReviewConfigResult<()> {
        self.database.inject_opt_env_vars()?;

        Ok(())
    }

    fn validate(&self) -> ReviewConfigResult<()> {
        if self.pagination.page_size == 0 {
            return Err(ReviewConfigError::InvalidPageSize);
        }
        Ok(())
    }
}
