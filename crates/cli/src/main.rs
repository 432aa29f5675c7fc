use crate::{env::EnvManager, error::CliError};
use clap::Parser;
use commands::Commands;
use connectors::{
    adapter::{Adapter, Driver},
    sql::base::query::generator::QueryGenerator,
};
use engine_core::service::QueryService;
use planner::{
    assemble::Assembler,
    params::ParamBag,
    plan::ResultWindow,
    query::dialect::{Dialect, MySql, Postgres},
    repository::Catalog,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

mod commands;
mod conn;
mod env;
mod error;
mod output;

#[derive(Parser)]
#[command(
    name = "querygate",
    version = "0.1.0",
    about = "Plans and paginates declarative filter/join/order queries"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    // Initialize logger; RUST_LOG overrides the default level
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Plan {
            catalog,
            repository,
            params,
            dialect,
            output,
        } => {
            let catalog = load_catalog(&catalog).await?;
            let params = load_params(&params).await?;
            let repo = catalog
                .get(&repository)
                .ok_or_else(|| CliError::UnknownRepository(repository.clone()))?;

            let mut plan = Assembler::new().assemble(repo, &params)?;
            let window = params.page_request().window()?;
            plan.set_window(ResultWindow::new(window.offset, window.page_size));

            let dialect: &dyn Dialect = match dialect.parse::<Driver>()? {
                Driver::Postgres => &Postgres,
                Driver::MySql => &MySql,
            };
            let generator = QueryGenerator::new(dialect, &catalog);
            output::emit(&output::rendered_plan(&generator, &plan)?, output).await?;
        }
        Commands::Query {
            catalog,
            repository,
            params,
            conn_str,
            driver,
            env_file,
            output,
        } => {
            let catalog = load_catalog(&catalog).await?;
            let params = load_params(&params).await?;
            let (driver, conn_str) = load_env(env_file)?.connection(conn_str, driver)?;

            info!("Querying `{}` through {}", repository, driver);
            let executor = Adapter::sql(driver, &conn_str)
                .await?
                .into_executor(catalog.clone());
            let service = QueryService::new(catalog, executor);

            let page = service.query_params(&repository, &params).await?;
            output::emit(&page, output).await?;
        }
        Commands::TestConn {
            driver,
            conn_str,
            env_file,
        } => {
            let (driver, conn_str) = load_env(env_file)?.connection(conn_str, driver)?;
            conn::ping(driver, &conn_str).await?;
        }
    }

    Ok(())
}

async fn load_catalog(path: &str) -> Result<Catalog, CliError> {
    let source = tokio::fs::read_to_string(path).await?;
    Ok(Catalog::from_json(&source)?)
}

async fn load_params(path: &str) -> Result<ParamBag, CliError> {
    let source = tokio::fs::read_to_string(path).await?;
    let json: serde_json::Value = serde_json::from_str(&source)?;
    Ok(ParamBag::from_json(&json)?)
}

fn load_env(env_file: Option<String>) -> Result<EnvManager, CliError> {
    let mut env = EnvManager::new();
    if let Some(path) = env_file {
        env.load_from_file(path)?;
    }
    Ok(env)
}
