use std::io::{self, Write};

use clap::Parser;
use tracing_subscriber::EnvFilter;

use vacancy_report::collectors::headhunter::HeadHunter;
use vacancy_report::collectors::runner;
use vacancy_report::config::{self, Command, Config, LogFormat};
use vacancy_report::db::Database;
use vacancy_report::db::queries::QueryService;
use vacancy_report::db::schema::PgSchema;
use vacancy_report::db::writer::PgWriter;
use vacancy_report::report;

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("vacancy_report=info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr);
    match format {
        LogFormat::Text => builder.init(),
        LogFormat::Json => builder.json().init(),
    }
}

async fn ingest(config: &Config, database: &Database) -> anyhow::Result<()> {
    let source = HeadHunter::new(
        config.api_url.clone(),
        tracing::info_span!("source", source = "headhunter"),
    )?;
    let schema = PgSchema::new(database.clone(), tracing::info_span!("schema"));
    let writer = PgWriter::new(database.options(), tracing::info_span!("writer"));

    runner::ingest(&source, &schema, &writer, database.name()).await?;
    Ok(())
}

async fn report(database: &Database, keyword: Option<String>) -> anyhow::Result<()> {
    let queries = QueryService::new(database.options(), tracing::info_span!("queries"));
    let mut out = io::stdout().lock();

    report::write_summary(&queries, &mut out).await?;

    let keyword = match keyword {
        Some(keyword) => Some(keyword),
        None => report::prompt_keyword(&mut io::stdin().lock(), &mut out)?,
    };
    report::write_search(&queries, keyword.as_deref(), &mut out).await?;
    out.flush()?;
    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    // First pass only to find --env-file; the second sees the loaded variables.
    let bootstrap = Config::parse();
    config::load_env_file(bootstrap.env_file.as_ref())?;
    let config = Config::parse();

    init_tracing(config.log_format);

    let params = config.connection_params()?;
    let database = Database::from_params(&params);

    match config.resolved_command() {
        Command::Run => {
            ingest(&config, &database).await?;
            report(&database, None).await?;
        }
        Command::Ingest => ingest(&config, &database).await?,
        Command::Report { keyword } => report(&database, keyword).await?,
    }

    Ok(())
}
