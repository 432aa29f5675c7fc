#[macro_export]
macro_rules! add_joins {
    ($builder:expr, $joins:expr) => {{
        $joins.into_iter().fold(
            $builder,
            |b, join: $crate::sql::base::query::generator::ResolvedJoin| {
                b.join(join.kind, join.table, Some(&join.alias), join.on)
            },
        )
    }};
}

#[macro_export]
macro_rules! add_where {
    ($builder:expr, $filter:expr) => {{
        let mut builder = $builder;
        if let Some(filter) = $filter {
            builder = builder.where_clause($crate::sql::base::query::lower::filter_expr(filter)?);
        }
        builder
    }};
}
