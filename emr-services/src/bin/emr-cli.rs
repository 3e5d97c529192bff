//! EMR data access CLI
//!
//! Runs the entity service operations against Postgres and prints JSON.
//!
//! Usage:
//!   emr-cli patient list --filters '[{"PropertyName":"LastName","Operator":"StartsWith","Value":"Sm"}]' --sort last_name
//!   emr-cli invoice get <id> --fields invoice_number,total_amount
//!   emr-cli visit patch <id> --document '[{"op":"replace","path":"/status","value":"closed"}]'
//!
//! Configuration comes from an optional file (`--config`) and `EMR__*`
//! environment variables; `.env` is loaded first when present.

use anyhow::Context;
use clap::{Parser, Subcommand};
use config_engine::EmrConfig;
use database_layer::{
    parse_patch, DatabasePool, Entity, FilterCriterion, PgRepository, PoolOptions, QueryParams,
};
use emr_services::models::*;
use emr_services::{EntityKind, EntityService};
use logger_redacted::{init_logging, PiiRedactor, RedactionConfig};
use serde_json::{json, Value};
use sqlx::postgres::PgRow;
use sqlx::FromRow;
use std::time::Duration;
use tracing::info;
use uuid::Uuid;

#[derive(Parser, Debug)]
#[command(name = "emr-cli")]
#[command(about = "Query and maintain EMR entities")]
#[command(version)]
struct Cli {
    /// Configuration file (TOML or YAML)
    #[arg(long, env = "EMR_CONFIG")]
    config: Option<String>,

    /// Entity to operate on
    #[arg(value_enum)]
    entity: EntityKind,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Filtered, sorted, paged listing
    List {
        /// JSON array of {PropertyName, Operator, Value}
        #[arg(long)]
        filters: Option<String>,

        /// Free-text search across searchable fields
        #[arg(long)]
        search: Option<String>,

        #[arg(long, default_value = "1", allow_hyphen_values = true)]
        page: i64,

        /// Defaults to query.default_page_size
        #[arg(long, allow_hyphen_values = true)]
        page_size: Option<i64>,

        #[arg(long)]
        sort: Option<String>,

        /// asc or desc
        #[arg(long)]
        order: Option<String>,

        /// Comma-separated projection
        #[arg(long)]
        fields: Option<String>,
    },

    /// Fetch one entity by id
    Get {
        id: Uuid,

        #[arg(long)]
        fields: Option<String>,
    },

    /// Count matching entities
    Count {
        #[arg(long)]
        filters: Option<String>,

        #[arg(long)]
        search: Option<String>,
    },

    /// Apply a JSON Patch document
    Patch {
        id: Uuid,

        #[arg(long)]
        document: Option<String>,
    },

    Delete {
        id: Uuid,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let config = EmrConfig::load(cli.config.as_deref()).context("loading configuration")?;
    init_logging(&config.logging)?;

    info!(entity = %cli.entity, table = cli.entity.table(), "Starting emr-cli");
    info!("Database: {}", mask_url(&config.database.url));

    let options = PoolOptions {
        max_connections: config.database.max_connections,
        min_connections: config.database.min_connections,
        acquire_timeout: Duration::from_secs(config.database.acquire_timeout_secs),
    };
    let pool = DatabasePool::connect(&config.database.url, &options).await?;

    let redactor = if config.logging.redaction_enabled {
        PiiRedactor::new(RedactionConfig::default())?
    } else {
        PiiRedactor::disabled()?
    };

    let output = match cli.entity {
        EntityKind::Patient => run::<Patient>(&pool, &config, redactor, cli.command).await,
        EntityKind::Doctor => run::<Doctor>(&pool, &config, redactor, cli.command).await,
        EntityKind::Comorbidity => run::<Comorbidity>(&pool, &config, redactor, cli.command).await,
        EntityKind::Visit => run::<Visit>(&pool, &config, redactor, cli.command).await,
        EntityKind::DayVisit => run::<DayVisit>(&pool, &config, redactor, cli.command).await,
        EntityKind::Currency => run::<Currency>(&pool, &config, redactor, cli.command).await,
        EntityKind::Product => run::<Product>(&pool, &config, redactor, cli.command).await,
        EntityKind::Invoice => run::<Invoice>(&pool, &config, redactor, cli.command).await,
    };
    pool.close().await;

    println!("{}", serde_json::to_string_pretty(&output?)?);
    Ok(())
}

async fn run<E>(
    pool: &DatabasePool,
    config: &EmrConfig,
    redactor: PiiRedactor,
    command: Command,
) -> anyhow::Result<Value>
where
    E: Entity + for<'r> FromRow<'r, PgRow>,
{
    let service = EntityService::<E, _>::new(PgRepository::new(pool.clone()), config.query)
        .with_redactor(redactor);

    let value = match command {
        Command::List {
            filters,
            search,
            page,
            page_size,
            sort,
            order,
            fields,
        } => {
            let params = QueryParams {
                filters: FilterCriterion::parse_list(filters.as_deref().unwrap_or(""))?,
                search,
                page_number: page,
                page_size: page_size.unwrap_or(i64::from(config.query.default_page_size)),
                sort_field: sort,
                sort_order: order,
                fields,
            };
            serde_json::to_value(service.get_page(&params).await?)?
        }
        Command::Get { id, fields } => service
            .get_by_id(id, fields.as_deref())
            .await?
            .unwrap_or(Value::Null),
        Command::Count { filters, search } => {
            let filters = FilterCriterion::parse_list(filters.as_deref().unwrap_or(""))?;
            json!({ "count": service.count(&filters, search.as_deref()).await? })
        }
        Command::Patch { id, document } => {
            let patch = document.as_deref().map(parse_patch).transpose()?;
            serde_json::to_value(service.patch(id, patch.as_ref()).await?)?
        }
        Command::Delete { id } => {
            service.delete(id).await?;
            json!({ "deleted": id })
        }
    };

    Ok(value)
}

/// Hide credentials in a connection URL
fn mask_url(url: &str) -> String {
    match (url.find("://"), url.rfind('@')) {
        (Some(scheme_end), Some(at_pos)) if at_pos > scheme_end => {
            let scheme = url.get(..scheme_end + 3).unwrap_or_default();
            let host_part = url.get(at_pos..).unwrap_or_default();
            format!("{}***:***{}", scheme, host_part)
        }
        _ => url.to_string(),
    }
}
