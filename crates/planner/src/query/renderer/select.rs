use crate::query::{
    ast::{
        common::{JoinKind, OrderDir, TableRef},
        select::{FromClause, JoinClause, OrderByExpr, Select, TableSource},
    },
    renderer::{Render, Renderer},
};

impl Render for Select {
    fn render(&self, r: &mut Renderer) {
        // 1. SELECT clause
        r.sql.push_str("SELECT ");
        if self.distinct {
            r.sql.push_str("DISTINCT ");
        }
        r.push_list(&self.columns);

        // 2. FROM
        if let Some(from) = &self.from {
            r.sql.push(' ');
            from.render(r);
        }

        // 3. JOIN
        for join in &self.joins {
            r.sql.push(' ');
            join.render(r);
        }

        // 4. WHERE
        if let Some(where_clause) = &self.where_clause {
            r.sql.push_str(" WHERE ");
            where_clause.render(r);
        }

        // 5. GROUP BY
        if !self.group_by.is_empty() {
            r.sql.push_str(" GROUP BY ");
            r.push_list(&self.group_by);
        }

        // 6. ORDER BY
        if !self.order_by.is_empty() {
            r.sql.push_str(" ORDER BY ");
            r.push_list(&self.order_by);
        }

        // 7. LIMIT
        if let Some(limit) = &self.limit {
            r.sql.push_str(" LIMIT ");
            limit.render(r);
        }

        // 8. OFFSET
        if let Some(offset) = &self.offset {
            r.sql.push_str(" OFFSET ");
            offset.render(r);
        }
    }
}

impl Render for TableRef {
    fn render(&self, r: &mut Renderer) {
        if let Some(schema) = &self.schema {
            r.sql.push_str(&r.dialect.quote_identifier(schema));
            r.sql.push('.');
        }
        r.sql.push_str(&r.dialect.quote_identifier(&self.name));
    }
}

impl Render for FromClause {
    fn render(&self, r: &mut Renderer) {
        r.sql.push_str("FROM ");
        match &self.source {
            TableSource::Table(table) => table.render(r),
            TableSource::Derived(inner) => {
                r.sql.push('(');
                inner.render(r);
                r.sql.push(')');
            }
        }
        if let Some(alias) = &self.alias {
            r.sql.push_str(" AS ");
            r.sql.push_str(&r.dialect.quote_identifier(alias));
        }
    }
}

impl Render for JoinClause {
    fn render(&self, r: &mut Renderer) {
        let join_str = match self.kind {
            JoinKind::Inner => "INNER JOIN",
            JoinKind::Left => "LEFT JOIN",
        };
        r.sql.push_str(join_str);
        r.sql.push(' ');
        self.table.render(r);
        if let Some(alias) = &self.alias {
            r.sql.push_str(" AS ");
            r.sql.push_str(&r.dialect.quote_identifier(alias));
        }
        r.sql.push_str(" ON ");
        self.on.render(r);
    }
}

impl Render for OrderByExpr {
    fn render(&self, r: &mut Renderer) {
        self.expr.render(r);
        if let Some(dir) = &self.direction {
            let dir_str = match dir {
                OrderDir::Asc => "ASC",
                OrderDir::Desc => "DESC",
            };
            r.sql.push(' ');
            r.sql.push_str(dir_str);
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::query::{
        ast::{
            common::{JoinKind, OrderDir, TableRef},
            expr::{BinaryOperator, Expr, FunctionCall, Ident},
            select::{FromClause, JoinClause, OrderByExpr, Select, TableSource},
        },
        dialect::{MySql, Postgres},
        renderer::{Render, Renderer},
    };
    use model::core::value::Value;

    fn ident(name: &str) -> Expr {
        Expr::Identifier(Ident::parse(name))
    }

    fn value(val: Value) -> Expr {
        Expr::Value(val)
    }

    fn table(name: &str) -> TableRef {
        TableRef {
            schema: None,
            name: name.to_string(),
        }
    }

    #[test]
    fn test_simple_select_postgres() {
        let ast = Select {
            columns: vec![ident("id"), ident("name")],
            from: Some(FromClause {
                source: TableSource::Table(table("users")),
                alias: None,
            }),
            where_clause: Some(Expr::binary(
                ident("id"),
                BinaryOperator::Eq,
                value(Value::Int(123)),
            )),
            ..Default::default()
        };

        let dialect = Postgres;
        let mut renderer = Renderer::new(&dialect);
        ast.render(&mut renderer);
        let (sql, params) = renderer.finish().unwrap();

        assert_eq!(sql, r#"SELECT "id", "name" FROM "users" WHERE ("id" = $1)"#);
        assert_eq!(params, vec![Value::Int(123)]);
    }

    #[test]
    fn test_simple_select_mysql() {
        let ast = Select {
            distinct: true,
            columns: vec![ident("id"), ident("name")],
            from: Some(FromClause {
                source: TableSource::Table(table("users")),
                alias: None,
            }),
            where_clause: Some(Expr::binary(
                ident("id"),
                BinaryOperator::Eq,
                value(Value::String("abc".to_string())),
            )),
            ..Default::default()
        };

        let dialect = MySql;
        let mut renderer = Renderer::new(&dialect);
        ast.render(&mut renderer);
        let (sql, params) = renderer.finish().unwrap();

        assert_eq!(
            sql,
            "SELECT DISTINCT `id`, `name` FROM `users` WHERE (`id` = ?)"
        );
        assert_eq!(params, vec![Value::String("abc".to_string())]);
    }

    #[test]
    fn test_complex_select_postgres() {
        let ast = Select {
            distinct: false,
            columns: vec![
                ident("u.id"),
                Expr::FunctionCall(FunctionCall {
                    name: "COUNT".to_string(),
                    args: vec![ident("p.id")],
                    wildcard: false,
                }),
            ],
            from: Some(FromClause {
                source: TableSource::Table(table("users")),
                alias: Some("u".to_string()),
            }),
            joins: vec![JoinClause {
                kind: JoinKind::Left,
                table: table("posts"),
                alias: Some("p".to_string()),
                on: Expr::binary(ident("u.id"), BinaryOperator::Eq, ident("p.user_id")),
            }],
            where_clause: Some(Expr::binary(
                ident("u.status"),
                BinaryOperator::NotEq,
                value(Value::String("inactive".to_string())),
            )),
            group_by: vec![ident("u.id")],
            order_by: vec![OrderByExpr {
                expr: ident("u.created_at"),
                direction: Some(OrderDir::Desc),
            }],
            limit: Some(value(Value::Int(10))),
            offset: Some(value(Value::Int(20))),
        };

        let dialect = Postgres;
        let mut renderer = Renderer::new(&dialect);
        ast.render(&mut renderer);
        let (sql, params) = renderer.finish().unwrap();

        let expected_sql = r#"SELECT "u"."id", COUNT("p"."id") FROM "users" AS "u" LEFT JOIN "posts" AS "p" ON ("u"."id" = "p"."user_id") WHERE ("u"."status" <> $1) GROUP BY "u"."id" ORDER BY "u"."created_at" DESC LIMIT $2 OFFSET $3"#;
        assert_eq!(sql, expected_sql);
        assert_eq!(
            params,
            vec![
                Value::String("inactive".to_string()),
                Value::Int(10),
                Value::Int(20)
            ]
        );
    }

    #[test]
    fn test_derived_table_count() {
        let inner = Select {
            distinct: true,
            columns: vec![ident("u.email")],
            from: Some(FromClause {
                source: TableSource::Table(table("users")),
                alias: Some("u".to_string()),
            }),
            ..Default::default()
        };
        let outer = Select {
            columns: vec![Expr::FunctionCall(FunctionCall {
                name: "COUNT".to_string(),
                args: vec![],
                wildcard: true,
            })],
            from: Some(FromClause {
                source: TableSource::Derived(Box::new(inner)),
                alias: Some("count_q".to_string()),
            }),
            ..Default::default()
        };

        let dialect = MySql;
        let mut renderer = Renderer::new(&dialect);
        outer.render(&mut renderer);
        let (sql, _) = renderer.finish().unwrap();
        assert_eq!(
            sql,
            "SELECT COUNT(*) FROM (SELECT DISTINCT `u`.`email` FROM `users` AS `u`) AS `count_q`"
        );
    }
}
