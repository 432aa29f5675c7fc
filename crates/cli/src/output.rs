use crate::error::CliError;
use connectors::sql::base::query::generator::QueryGenerator;
use model::core::value::Value;
use planner::plan::QueryPlan;
use serde_json::json;

/// The statements a plan renders to, with their positional parameters.
pub fn rendered_plan(
    generator: &QueryGenerator<'_>,
    plan: &QueryPlan,
) -> Result<serde_json::Value, CliError> {
    let (page_sql, page_params) = generator.page_query(plan)?;
    let (count_sql, count_params) = generator.count_query(plan)?;

    Ok(json!({
        "pageQuery": {"sql": page_sql, "params": params_json(&page_params)},
        "countQuery": {"sql": count_sql, "params": params_json(&count_params)},
    }))
}

fn params_json(params: &[Value]) -> Vec<serde_json::Value> {
    params.iter().map(Value::to_json).collect()
}

/// Pretty-prints `value` to `path`, or to stdout without one.
pub async fn emit(value: &impl serde::Serialize, path: Option<String>) -> Result<(), CliError> {
    let json = serde_json::to_string_pretty(value).map_err(CliError::JsonSerialize)?;
    match path {
        Some(path) => tokio::fs::write(path, json).await?,
        None => println!("{json}"),
    }
    Ok(())
}
