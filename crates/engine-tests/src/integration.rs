//! Runs queries against live databases seeded with the fixture in
//! [`crate::utils`]. Point `QUERYGATE_TEST_PG_URL` and
//! `QUERYGATE_TEST_MYSQL_URL` at scratch databases and run with
//! `--ignored`.

#[cfg(test)]
mod tests {
    use crate::{
        mysql_pool, mysql_url, pg_client, pg_url, seed_mysql, seed_postgres,
        utils::{FIXTURE_USERS, catalog, fixture_rows},
    };
    use connectors::{
        executor::{QueryExecutor, SqlExecutor},
        sql::{
            base::adapter::SqlAdapter, mysql::adapter::MySqlAdapter,
            postgres::adapter::PgAdapter,
        },
    };
    use engine_core::service::QueryService;
    use model::core::{params::ParamValue, value::Value};
    use mysql_async::prelude::Queryable;
    use serde_json::json;
    use std::sync::Arc;
    use tracing_test::traced_test;

    async fn postgres_service() -> QueryService {
        seed_postgres().await;
        pg_client()
            .await
            .batch_execute(&fixture_rows())
            .await
            .expect("insert postgres fixture");

        let adapter = PgAdapter::connect(&pg_url()).await.expect("pg adapter");
        let executor: Arc<dyn QueryExecutor> = Arc::new(SqlExecutor::new(adapter, catalog()));
        QueryService::new(catalog(), executor)
    }

    async fn mysql_service() -> QueryService {
        seed_mysql().await;
        let pool = mysql_pool();
        let mut conn = pool.get_conn().await.expect("mysql connection");
        conn.query_drop(fixture_rows()).await.expect("insert mysql fixture");
        drop(conn);
        pool.disconnect().await.expect("disconnect mysql");

        let adapter = MySqlAdapter::connect(&mysql_url()).await.expect("mysql adapter");
        let executor: Arc<dyn QueryExecutor> = Arc::new(SqlExecutor::new(adapter, catalog()));
        QueryService::new(catalog(), executor)
    }

    fn request(json: serde_json::Value) -> ParamValue {
        ParamValue::from(json)
    }

    #[traced_test]
    #[tokio::test]
    #[ignore = "needs a live Postgres"]
    async fn pg_pages_over_fixture() {
        let service = postgres_service().await;

        let page = service
            .query("users", &request(json!({"pageSize": 50, "page": 3, "orderBy": "id"})))
            .await
            .unwrap();

        assert_eq!(page.total_count, FIXTURE_USERS);
        assert_eq!(page.total_pages, 3);
        assert_eq!(page.items.len(), 1);
        assert_eq!(page.items[0].get_value("id"), Value::Int(101));
    }

    #[traced_test]
    #[tokio::test]
    #[ignore = "needs a live Postgres"]
    async fn pg_filters_with_parameters() {
        let service = postgres_service().await;

        let page = service
            .query(
                "users",
                &request(json!({
                    "where": {
                        "deleted_at": "isNull",
                        "country": "DE",
                        "age": {"between": [":low", ":high"]}
                    },
                    "params": {"low": 20, "high": 29},
                    "orderBy": "id DESC",
                    "pageSize": 100
                })),
            )
            .await
            .unwrap();

        let expected = (1..=FIXTURE_USERS)
            .filter(|id| id % 10 != 0 && id % 2 == 0 && (20..=29).contains(&(18 + id % 50)))
            .count() as u64;
        assert_eq!(page.total_count, expected);
        assert!(page.items.iter().all(|row| row.get_value("country") == Value::String("DE".into())));
    }

    #[traced_test]
    #[tokio::test]
    #[ignore = "needs a live Postgres"]
    async fn pg_join_and_group() {
        let service = postgres_service().await;

        let page = service
            .query(
                "users",
                &request(json!({
                    "alias": "u",
                    "join": {"orders": "o"},
                    "select": ["country", "SUM(o.total) AS spent"],
                    "groupBy": "country",
                    "orderBy": "country",
                    "pageSize": 10
                })),
            )
            .await
            .unwrap();

        assert_eq!(page.total_count, 2);
        assert_eq!(page.items.len(), 2);
        assert_eq!(page.items[0].get_value("country"), Value::String("DE".into()));
    }

    #[traced_test]
    #[tokio::test]
    #[ignore = "needs a live MySQL"]
    async fn mysql_pages_with_contains_and_in() {
        let service = mysql_service().await;

        let page = service
            .query(
                "users",
                &request(json!({
                    "where": {
                        "email": {"contains": "@example"},
                        "id": {"in": [":ids"]}
                    },
                    "params": {"ids": [1, 2, 7, 14, 30]},
                    "orderBy": "id",
                    "pageSize": 2,
                    "page": 2
                })),
            )
            .await
            .unwrap();

        // 7 and 14 have no email.
        assert_eq!(page.total_count, 3);
        assert_eq!(page.total_pages, 2);
        assert_eq!(page.items.len(), 1);
        assert_eq!(page.items[0].get_value("id"), Value::Int(30));
    }

    #[tokio::test]
    #[ignore = "needs a live MySQL"]
    async fn mysql_ping() {
        seed_mysql().await;
        let adapter = MySqlAdapter::connect(&mysql_url()).await.expect("mysql adapter");
        adapter.ping().await.expect("ping");
    }
}
