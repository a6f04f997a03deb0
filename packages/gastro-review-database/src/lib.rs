#![deny(unused_crate_dependencies)]

use crate::types::EntityKind;
use gastro_review_lib::{
    defaults,
    utils::{attempt_database_connection, ServiceStatus},
};
use gastro_review_postgres as postgres;
use sqlx::{
    pool::PoolConnection,
    postgres::{PgConnectOptions, PgPoolOptions},
    Error as SqlxError,
};
use std::{cmp::Ordering, str::FromStr};
use thiserror::Error;
use tracing::info;

pub mod queries;
pub mod store;

pub use store::{classify_entity_error, DatabaseStore};

pub mod types {
    pub use gastro_review_database_types::*;
}

#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("Invalid connection string: {0:?}")]
    InvalidConnectionString(String),
    #[error("Database backend not supported: {0:?}")]
    BackendNotSupported(String),
    #[error("Error from sqlx: {0:#?}")]
    SqlxError(#[from] SqlxError),
    #[error("A {entity} with the same unique fields already exists: {detail}")]
    AlreadyExists { entity: EntityKind, detail: String },
}

#[derive(Debug)]
pub enum ReviewConnection {
    Postgres(Box<PoolConnection<sqlx::Postgres>>),
}

#[derive(Clone, Debug)]
pub enum ReviewConnectionPool {
    Postgres(sqlx::Pool<sqlx::Postgres>),
}

impl ReviewConnectionPool {
    pub async fn connect(database_url: &str) -> Result<ReviewConnectionPool, DatabaseError> {
        Self::connect_with_max(database_url, defaults::MAX_DATABASE_CONNECTIONS).await
    }

    pub async fn connect_with_max(
        database_url: &str,
        max_connections: u32,
    ) -> Result<ReviewConnectionPool, DatabaseError> {
        let url = url::Url::parse(database_url)
            .map_err(|_| DatabaseError::InvalidConnectionString(database_url.into()))?;

        match url.scheme() {
            "postgres" | "postgresql" => {
                let options = PgConnectOptions::from_str(database_url)?;
                let pool = attempt_database_connection(|| {
                    PgPoolOptions::new()
                        .max_connections(max_connections)
                        .connect_with(options.clone())
                })
                .await?;

                info!(
                    "Connected to Postgres at {}:{}.",
                    url.host_str().unwrap_or_default(),
                    url.port().unwrap_or(5432)
                );

                Ok(ReviewConnectionPool::Postgres(pool))
            }
            err => Err(DatabaseError::BackendNotSupported(err.into())),
        }
    }

    pub async fn is_connected(&self) -> Result<ServiceStatus, DatabaseError> {
        match self {
            ReviewConnectionPool::Postgres(p) => {
                let mut conn = p.acquire().await?;
                let result =
                    postgres::execute_query(&mut conn, "SELECT true;".to_string()).await?;

                match result.cmp(&1) {
                    Ordering::Equal => Ok(ServiceStatus::OK),
                    _ => Ok(ServiceStatus::NotOk),
                }
            }
        }
    }

    pub async fn acquire(&self) -> sqlx::Result<ReviewConnection> {
        match self {
            ReviewConnectionPool::Postgres(p) => {
                Ok(ReviewConnection::Postgres(Box::new(p.acquire().await?)))
            }
        }
    }
}
