#![allow(dead_code)]

use async_trait::async_trait;
use connectors::{
    adapter::Driver,
    executor::{QueryExecutor, SqlExecutor},
    sql::base::{
        adapter::{DatabaseKind, SqlAdapter},
        error::{ConnectorError, DbError},
    },
};
use engine_core::service::QueryService;
use model::{
    core::value::Value,
    records::row::{FieldValue, Row},
};
use planner::{
    alias::SequentialAlias,
    assemble::Assembler,
    query::dialect::{Dialect, MySql, Postgres},
    repository::{Catalog, Repository},
};
use std::sync::{Arc, Mutex};

/// Rows in the `users` fixture.
pub const FIXTURE_USERS: u64 = 101;

/// Schema shared by the Postgres and MySQL fixtures.
pub const FIXTURE_DDL: &str = r#"
    CREATE TABLE users (
        id INTEGER PRIMARY KEY,
        name VARCHAR(64) NOT NULL,
        email VARCHAR(128) NULL,
        country VARCHAR(2) NOT NULL,
        age INTEGER NOT NULL,
        deleted_at TIMESTAMP NULL
    );
    CREATE TABLE orders (
        id INTEGER PRIMARY KEY,
        user_id INTEGER NOT NULL,
        total INTEGER NOT NULL
    );
"#;

/// Inserts for the fixture: 101 users, every tenth one soft-deleted and
/// every seventh one without an email, plus one order for each of the
/// first 20 users.
pub fn fixture_rows() -> String {
    let users = (1..=FIXTURE_USERS)
        .map(|id| {
            let email = if id % 7 == 0 {
                "NULL".to_string()
            } else {
                format!("'user{id}@example.com'")
            };
            let country = if id % 2 == 0 { "DE" } else { "FR" };
            let deleted = if id % 10 == 0 {
                "'2024-01-01 00:00:00'"
            } else {
                "NULL"
            };
            format!(
                "({id}, 'user{id:03}', {email}, '{country}', {}, {deleted})",
                18 + id % 50
            )
        })
        .collect::<Vec<_>>()
        .join(", ");
    let orders = (1..=20)
        .map(|id| format!("({id}, {id}, {})", id * 10))
        .collect::<Vec<_>>()
        .join(", ");

    format!(
        "INSERT INTO users (id, name, email, country, age, deleted_at) VALUES {users};
         INSERT INTO orders (id, user_id, total) VALUES {orders};"
    )
}

pub fn catalog() -> Catalog {
    Catalog::new([
        Repository::new("users", "users").with_relation("orders", "orders", "id", "user_id"),
        Repository::new("orders", "orders").with_relation("owner", "users", "user_id", "id"),
    ])
}

/// An adapter that renders in a real dialect but never touches a network.
/// Every statement it receives is recorded.
pub struct ScriptedAdapter {
    driver: Driver,
    count: u64,
    rows: Vec<Row>,
    statements: Mutex<Vec<(String, Vec<Value>)>>,
}

impl ScriptedAdapter {
    pub fn new(driver: Driver, count: u64) -> Self {
        ScriptedAdapter {
            driver,
            count,
            rows: Vec::new(),
            statements: Mutex::new(Vec::new()),
        }
    }

    pub fn with_rows(mut self, rows: Vec<Row>) -> Self {
        self.rows = rows;
        self
    }

    pub fn statements(&self) -> Vec<(String, Vec<Value>)> {
        self.statements.lock().unwrap().clone()
    }

    pub fn count_statements(&self) -> usize {
        self.statements()
            .iter()
            .filter(|(sql, _)| sql.starts_with("SELECT COUNT(*)"))
            .count()
    }

    fn record(&self, sql: &str, params: Vec<Value>) {
        self.statements.lock().unwrap().push((sql.to_string(), params));
    }
}

#[async_trait]
impl SqlAdapter for ScriptedAdapter {
    async fn connect(url: &str) -> Result<Self, ConnectorError> {
        Driver::from_url(url)
            .map(|driver| ScriptedAdapter::new(driver, 0))
            .ok_or_else(|| ConnectorError::InvalidUrl(url.to_string()))
    }

    async fn query_rows(&self, sql: &str, params: Vec<Value>) -> Result<Vec<Row>, DbError> {
        self.record(sql, params);
        Ok(self.rows.clone())
    }

    async fn query_count(&self, sql: &str, params: Vec<Value>) -> Result<u64, DbError> {
        self.record(sql, params);
        Ok(self.count)
    }

    async fn ping(&self) -> Result<(), DbError> {
        Ok(())
    }

    fn kind(&self) -> DatabaseKind {
        match self.driver {
            Driver::MySql => DatabaseKind::MySql,
            Driver::Postgres => DatabaseKind::Postgres,
        }
    }

    fn dialect(&self) -> &dyn Dialect {
        match self.driver {
            Driver::MySql => &MySql,
            Driver::Postgres => &Postgres,
        }
    }
}

/// A service over [`catalog`] with predictable aliases, plus the executor
/// so tests can inspect what was sent.
pub fn scripted_service(
    adapter: ScriptedAdapter,
) -> (QueryService, Arc<SqlExecutor<ScriptedAdapter>>) {
    let executor = Arc::new(SqlExecutor::new(adapter, catalog()));
    let shared: Arc<dyn QueryExecutor> = executor.clone();
    let service = QueryService::new(catalog(), shared)
        .with_assembler(Assembler::with_alias_source(Arc::new(SequentialAlias::default())));
    (service, executor)
}

pub fn id_row(id: i64) -> Row {
    Row::new(vec![FieldValue {
        name: "id".to_string(),
        value: Value::Int(id),
    }])
}
