use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use crate::error::AppError;

pub const DEFAULT_API_URL: &str = "https://api.hh.ru/vacancies";

#[derive(Parser, Debug, Clone)]
#[command(
    name = "vacancy-report",
    about = "Load HeadHunter vacancies into Postgres and report on them"
)]
pub struct Config {
    /// Dotenv file with connection parameters (defaults to ./.env when present)
    #[arg(long, global = true)]
    pub env_file: Option<PathBuf>,

    /// Database host
    #[arg(long, env = "DB_HOST", global = true)]
    pub db_host: Option<String>,

    /// Database port
    #[arg(long, env = "DB_PORT", global = true)]
    pub db_port: Option<u16>,

    /// Database user
    #[arg(long, env = "DB_USER", global = true)]
    pub db_user: Option<String>,

    /// Database password
    #[arg(long, env = "DB_PASSWORD", hide_env_values = true, global = true)]
    pub db_password: Option<String>,

    /// Target database, dropped and recreated on every ingest
    #[arg(long, env = "DB_NAME", default_value = "headhunter", global = true)]
    pub db_name: String,

    /// Database to connect to while dropping/creating the target
    #[arg(long, env = "DB_MAINTENANCE_NAME", default_value = "postgres", global = true)]
    pub db_maintenance_name: String,

    /// Vacancy listing endpoint
    #[arg(long, env = "HH_API_URL", default_value = DEFAULT_API_URL, global = true)]
    pub api_url: String,

    /// Log output format
    #[arg(long, env = "LOG_FORMAT", value_enum, default_value_t = LogFormat::Text, global = true)]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(clap::Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Recreate the database, load vacancies and print the report (default)
    Run,
    /// Recreate the database and load vacancies without reporting
    Ingest,
    /// Report on an already loaded database
    Report {
        /// Search keyword; prompts interactively when omitted
        #[arg(long)]
        keyword: Option<String>,
    },
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

/// Validated connection parameters.
#[derive(Debug, Clone)]
pub struct ConnectionParams {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub database: String,
    pub maintenance_database: String,
}

impl Config {
    /// Resolve the command, defaulting to Run if none specified.
    pub fn resolved_command(&self) -> Command {
        self.command.clone().unwrap_or(Command::Run)
    }

    /// Check that every connection parameter is present and the database
    /// name is safe to splice into DDL.
    pub fn connection_params(&self) -> Result<ConnectionParams, AppError> {
        let host = required(self.db_host.clone(), "host")?;
        let port = required(self.db_port, "port")?;
        let user = required(self.db_user.clone(), "user")?;
        let password = required(self.db_password.clone(), "password")?;

        validate_identifier(&self.db_name)?;
        validate_identifier(&self.db_maintenance_name)?;

        Ok(ConnectionParams {
            host,
            port,
            user,
            password,
            database: self.db_name.clone(),
            maintenance_database: self.db_maintenance_name.clone(),
        })
    }
}

/// Load the dotenv file before argument parsing so its values feed the
/// `env = ...` fallbacks. An explicitly named file must exist.
pub fn load_env_file(path: Option<&PathBuf>) -> Result<(), AppError> {
    match path {
        Some(path) => dotenvy::from_path(path).map_err(|e| {
            AppError::Config(format!("cannot read env file {}: {e}", path.display()))
        }),
        None => {
            dotenvy::dotenv().ok();
            Ok(())
        }
    }
}

fn required<T>(value: Option<T>, name: &str) -> Result<T, AppError> {
    value.ok_or_else(|| AppError::Config(format!("missing required connection parameter: {name}")))
}

pub fn validate_identifier(name: &str) -> Result<(), AppError> {
    let mut chars = name.chars();
    let valid_start = chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_');
    if valid_start && chars.all(|c| c.is_ascii_alphanumeric() || c == '_') {
        Ok(())
    } else {
        Err(AppError::Config(format!("invalid database name: '{name}'")))
    }
}
