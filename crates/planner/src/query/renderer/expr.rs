use crate::query::{
    ast::expr::{BinaryOp, BinaryOperator, Expr, FunctionCall, Ident},
    renderer::{Render, Renderer},
};

impl Render for Expr {
    fn render(&self, r: &mut Renderer) {
        match self {
            Expr::Identifier(ident) => ident.render(r),
            Expr::Wildcard(qualifier) => {
                if let Some(qualifier) = qualifier {
                    r.sql.push_str(&r.dialect.quote_identifier(qualifier));
                    r.sql.push('.');
                }
                r.sql.push('*');
            }
            Expr::Value(val) => r.add_param(val.clone()),
            Expr::Parameter(name) => r.add_named_param(name),
            Expr::Raw(fragment) => r.push_raw(fragment),
            Expr::BinaryOp(op) => op.render(r),
            Expr::InList {
                expr,
                list,
                negated,
            } => {
                r.sql.push('(');
                expr.render(r);
                r.sql
                    .push_str(if *negated { " NOT IN (" } else { " IN (" });
                r.push_list(list);
                r.sql.push_str("))");
            }
            Expr::Between { expr, low, high } => {
                r.sql.push('(');
                expr.render(r);
                r.sql.push_str(" BETWEEN ");
                low.render(r);
                r.sql.push_str(" AND ");
                high.render(r);
                r.sql.push(')');
            }
            Expr::IsNull { expr, negated } => {
                r.sql.push('(');
                expr.render(r);
                r.sql
                    .push_str(if *negated { " IS NOT NULL)" } else { " IS NULL)" });
            }
            Expr::FunctionCall(func) => func.render(r),
        }
    }
}

impl Render for Ident {
    fn render(&self, r: &mut Renderer) {
        if let Some(qualifier) = &self.qualifier {
            r.sql.push_str(&r.dialect.quote_identifier(qualifier));
            r.sql.push('.');
        }
        r.sql.push_str(&r.dialect.quote_identifier(&self.name));
    }
}

impl Render for BinaryOp {
    fn render(&self, r: &mut Renderer) {
        r.sql.push('(');
        self.left.render(r);

        let op_str = match self.op {
            BinaryOperator::Eq => " = ",
            BinaryOperator::NotEq => " <> ",
            BinaryOperator::Lt => " < ",
            BinaryOperator::LtEq => " <= ",
            BinaryOperator::Gt => " > ",
            BinaryOperator::GtEq => " >= ",
            BinaryOperator::Like => " LIKE ",
            BinaryOperator::NotLike => " NOT LIKE ",
            BinaryOperator::And => " AND ",
            BinaryOperator::Or => " OR ",
        };
        r.sql.push_str(op_str);

        self.right.render(r);
        r.sql.push(')');
    }
}

impl Render for FunctionCall {
    fn render(&self, r: &mut Renderer) {
        r.sql.push_str(&self.name);
        r.sql.push('(');
        if self.wildcard {
            r.sql.push('*');
        } else {
            r.push_list(&self.args);
        }
        r.sql.push(')');
    }
}

#[cfg(test)]
mod tests {
    use crate::query::{
        ast::expr::{BinaryOperator, Expr, Ident},
        dialect::{MySql, Postgres},
        renderer::{Render, Renderer},
    };
    use model::core::value::Value;
    use std::collections::BTreeMap;

    fn ident(path: &str) -> Expr {
        Expr::Identifier(Ident::parse(path))
    }

    fn render_pg(expr: &Expr) -> (String, Vec<Value>) {
        let dialect = Postgres;
        let mut r = Renderer::new(&dialect);
        expr.render(&mut r);
        r.finish().unwrap()
    }

    #[test]
    fn test_render_like_and_or() {
        let expr = Expr::binary(
            Expr::binary(
                ident("u.name"),
                BinaryOperator::Like,
                Expr::Value(Value::String("Jo%".into())),
            ),
            BinaryOperator::Or,
            Expr::binary(
                ident("u.name"),
                BinaryOperator::NotLike,
                Expr::Value(Value::String("%x%".into())),
            ),
        );
        let (sql, params) = render_pg(&expr);
        assert_eq!(
            sql,
            r#"(("u"."name" LIKE $1) OR ("u"."name" NOT LIKE $2))"#
        );
        assert_eq!(
            params,
            vec![Value::String("Jo%".into()), Value::String("%x%".into())]
        );
    }

    #[test]
    fn test_render_in_between_null_mysql() {
        let expr = Expr::fold(
            vec![
                Expr::InList {
                    expr: Box::new(ident("u.id")),
                    list: vec![Expr::Value(Value::Int(1)), Expr::Value(Value::Int(2))],
                    negated: true,
                },
                Expr::Between {
                    expr: Box::new(ident("u.age")),
                    low: Box::new(Expr::Value(Value::Int(18))),
                    high: Box::new(Expr::Value(Value::Int(30))),
                },
                Expr::IsNull {
                    expr: Box::new(ident("u.deleted_at")),
                    negated: false,
                },
            ],
            BinaryOperator::And,
        )
        .unwrap();

        let dialect = MySql;
        let mut r = Renderer::new(&dialect);
        expr.render(&mut r);
        let (sql, params) = r.finish().unwrap();

        assert_eq!(
            sql,
            "(((`u`.`id` NOT IN (?, ?)) AND (`u`.`age` BETWEEN ? AND ?)) AND (`u`.`deleted_at` IS NULL))"
        );
        assert_eq!(params.len(), 4);
    }

    #[test]
    fn test_render_named_parameter() {
        let bindings = BTreeMap::from([("since".to_string(), Value::String("2024-01-01".into()))]);
        let expr = Expr::binary(
            ident("u.created_at"),
            BinaryOperator::GtEq,
            Expr::Parameter("since".into()),
        );
        let dialect = Postgres;
        let mut r = Renderer::with_bindings(&dialect, &bindings);
        expr.render(&mut r);
        let (sql, params) = r.finish().unwrap();
        assert_eq!(sql, r#"("u"."created_at" >= $1)"#);
        assert_eq!(params, vec![Value::String("2024-01-01".into())]);
    }

    #[test]
    fn test_render_wildcard_and_raw() {
        let (sql, _) = render_pg(&Expr::Wildcard(Some("u".into())));
        assert_eq!(sql, r#""u".*"#);
        let (sql, _) = render_pg(&Expr::Raw("u.id = o.user_id".into()));
        assert_eq!(sql, "u.id = o.user_id");
    }
}
