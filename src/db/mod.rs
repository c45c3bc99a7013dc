pub mod queries;
pub mod schema;
pub mod writer;

use sqlx::postgres::PgConnectOptions;
use sqlx::{Connection, PgConnection};

use crate::config::ConnectionParams;
use crate::error::AppError;

/// Where the vacancy database lives: a maintenance database used for
/// DROP/CREATE DATABASE plus the name of the target database.
#[derive(Debug, Clone)]
pub struct Database {
    maintenance: PgConnectOptions,
    name: String,
}

impl Database {
    pub fn from_params(params: &ConnectionParams) -> Self {
        let maintenance = PgConnectOptions::new()
            .host(&params.host)
            .port(params.port)
            .username(&params.user)
            .password(&params.password)
            .database(&params.maintenance_database);
        Self::new(maintenance, &params.database)
    }

    /// `maintenance` must point at an existing database other than `name`.
    pub fn new(maintenance: PgConnectOptions, name: impl Into<String>) -> Self {
        Self {
            maintenance,
            name: name.into(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn maintenance_options(&self) -> &PgConnectOptions {
        &self.maintenance
    }

    /// Options for the target database itself.
    pub fn options(&self) -> PgConnectOptions {
        self.maintenance.clone().database(&self.name)
    }
}

/// Open a dedicated connection. No pooling: each operation owns its connection.
pub async fn connect(options: &PgConnectOptions) -> Result<PgConnection, AppError> {
    PgConnection::connect_with(options)
        .await
        .map_err(AppError::Connection)
}
