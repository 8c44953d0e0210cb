use crate::{
    error::CliError,
    output::{PlanOutput, print_cursor, print_plan},
};
use chrono::DateTime;
use clap::Parser;
use commands::Commands;
use engine_core::{list::Paginator, settings::PaginationSettings};
use model::{
    core::value::Value,
    pagination::{
        cursor::{Cursor, SortContract},
        page::PageRequest,
    },
};
use planner::query::dialect::dialect_for;
use tracing::info;
use tracing_subscriber::EnvFilter;

mod commands;
mod error;
mod output;
mod token;

#[derive(Parser)]
#[command(
    name = "keyset",
    version = "0.1.0",
    about = "Keyset pagination developer tool"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    // Logs go to stderr so plans and cursors can be piped.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Plan {
            entity,
            sort_by,
            desc,
            per_page,
            cursor,
            archived,
            dialect,
            settings,
            json,
        } => {
            let settings = load_settings(settings.as_deref()).await?;
            let paginator = Paginator::new(settings)?;

            let mut request = PageRequest::new().descending(desc).show_archived(archived);
            request.sort_by = sort_by;
            request.per_page = per_page;
            if let Some(token) = cursor {
                request.cursor = Some(token::decode(&token)?);
            }

            let sql_dialect =
                dialect_for(&dialect).ok_or_else(|| CliError::UnknownDialect(dialect.clone()))?;
            let plan = paginator.plan(&entity, &request)?;
            let (sql, params) = plan.to_sql(sql_dialect.as_ref());
            info!(entity = %entity, dialect = %sql_dialect.name(), "planned page query");

            print_plan(
                PlanOutput {
                    dialect: sql_dialect.name(),
                    sql: &sql,
                    params: &params,
                    page_size: plan.reconciler.page_size,
                    backwards: plan.reconciler.is_backwards,
                    first_page: plan.reconciler.is_first_page,
                },
                json,
            )?;
        }
        Commands::InspectCursor {
            token,
            sort_by,
            desc,
            json,
        } => {
            let bytes = token::decode(&token)?;
            let cursor = Cursor::decode(&bytes)?;
            let contract_ok = sort_by
                .as_deref()
                .map(|column| cursor.verify(&SortContract::new(column, desc)).is_ok());

            print_cursor(&cursor, contract_ok, json)?;
        }
        Commands::EncodeCursor {
            id,
            int,
            text,
            timestamp,
            sort_by,
            desc,
            backwards,
        } => {
            let value = match (int, text, timestamp) {
                (Some(v), _, _) => Value::Int64(v),
                (_, Some(v), _) => Value::String(v),
                (_, _, Some(v)) => Value::Timestamp(DateTime::parse_from_rfc3339(&v)?.to_utc()),
                _ => return Err(CliError::MissingSortValue),
            };
            let contract = SortContract::new(&sort_by, desc);
            let cursor = Cursor::from_value(id, &value, backwards, &contract)?;

            println!("{}", token::encode(&cursor.encode()?));
        }
    }

    Ok(())
}

async fn load_settings(path: Option<&str>) -> Result<PaginationSettings, CliError> {
    match path {
        Some(path) => {
            let raw = tokio::fs::read_to_string(path).await?;
            Ok(PaginationSettings::from_json(&raw)?)
        }
        None => Ok(PaginationSettings::default()),
    }
}
