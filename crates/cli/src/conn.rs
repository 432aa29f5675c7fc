use crate::error::CliError;
use connectors::adapter::{Adapter, Driver};
use tracing::{error, info};

/// Connects with `driver` and round-trips a trivial statement.
pub async fn ping(driver: Driver, conn_str: &str) -> Result<(), CliError> {
    info!("Pinging {} at '{}'", driver, conn_str);

    let adapter = Adapter::sql(driver, conn_str).await.map_err(|e| {
        error!("{} connection to '{}' failed: {}", driver, conn_str, e);
        CliError::Adapter(e)
    })?;

    adapter.get_sql().ping().await.map_err(|e| {
        error!("{} ping query on '{}' failed: {}", driver, conn_str, e);
        CliError::Database(e)
    })?;

    info!("{} ping to '{}' succeeded", driver, conn_str);
    Ok(())
}
