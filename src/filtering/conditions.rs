use sea_orm::sea_query::{Alias, Expr, Func, LikeExpr, Query, SimpleExpr};

use super::{
    lookup::{Operator, ResolvedFilter, Transform},
    values::FilterValue,
};

const LIKE_ESCAPE: char = '\\';

/// Escape LIKE wildcards so user input only matches literally
fn escape_like_wildcards(input: &str) -> String {
    input
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

fn like_pattern(pattern: String) -> LikeExpr {
    LikeExpr::new(pattern).escape(LIKE_ESCAPE)
}

fn column_ref(table: &str, column: &str) -> Expr {
    Expr::col((Alias::new(table), Alias::new(column)))
}

/// The compared expression: the column, or `DATE(column)` for day lookups
fn operand(filter: &ResolvedFilter) -> SimpleExpr {
    let column = column_ref(&filter.table, &filter.column);
    match filter.lookup.transform {
        Some(Transform::Date) => Func::cust(Alias::new("DATE")).arg(column).into(),
        None => column.into(),
    }
}

fn compare(operand: SimpleExpr, operator: Operator, value: &sea_orm::Value) -> SimpleExpr {
    let operand = Expr::expr(operand);
    let value = value.clone();
    match operator {
        Operator::Gt => operand.gt(value),
        Operator::Gte => operand.gte(value),
        Operator::Lt => operand.lt(value),
        Operator::Lte => operand.lte(value),
        // coercion only produces single values for exact and the comparisons
        _ => operand.eq(value),
    }
}

fn match_text(target: SimpleExpr, operator: Operator, pattern: &str) -> SimpleExpr {
    let escaped = escape_like_wildcards(pattern);
    let upper = || Expr::expr(Func::upper(target.clone()));

    match operator {
        Operator::IExact => upper().eq(pattern.to_uppercase()),
        Operator::Contains => Expr::expr(target.clone()).like(like_pattern(format!("%{escaped}%"))),
        Operator::IContains => {
            upper().like(like_pattern(format!("%{}%", escaped.to_uppercase())))
        }
        Operator::StartsWith => Expr::expr(target.clone()).like(like_pattern(format!("{escaped}%"))),
        Operator::IStartsWith => upper().like(like_pattern(format!("{}%", escaped.to_uppercase()))),
        Operator::EndsWith => Expr::expr(target.clone()).like(like_pattern(format!("%{escaped}"))),
        Operator::IEndsWith => upper().like(like_pattern(format!("%{}", escaped.to_uppercase()))),
        _ => Expr::expr(target.clone()).eq(pattern),
    }
}

fn leaf_condition(filter: &ResolvedFilter) -> SimpleExpr {
    let operand = operand(filter);

    match &filter.value {
        FilterValue::Single(value) => compare(operand, filter.lookup.operator, value),
        FilterValue::Pattern(pattern) => {
            let target = if filter.kind.is_text() || filter.lookup.transform.is_some() {
                operand
            } else {
                Expr::expr(operand).cast_as(Alias::new("TEXT"))
            };
            match_text(target, filter.lookup.operator, pattern)
        }
        FilterValue::List(values) => Expr::expr(operand).is_in(values.iter().cloned()),
        FilterValue::Range(low, high) => Expr::expr(operand).between(low.clone(), high.clone()),
        FilterValue::Flag(true) => Expr::expr(operand).is_null(),
        FilterValue::Flag(false) => Expr::expr(operand).is_not_null(),
    }
}

/// Build the `WHERE` expression for a resolved filter.
///
/// Each relation hop wraps the condition in
/// `local_column IN (SELECT remote_column FROM related_table WHERE ...)`,
/// innermost hop first.
#[must_use]
pub fn build_condition(filter: &ResolvedFilter) -> SimpleExpr {
    filter
        .hops
        .iter()
        .rev()
        .fold(leaf_condition(filter), |inner, hop| {
            let related = Query::select()
                .column((Alias::new(&hop.related_table), Alias::new(&hop.remote_column)))
                .from(Alias::new(&hop.related_table))
                .and_where(inner)
                .to_owned();
            column_ref(&hop.table, &hop.local_column).in_subquery(related)
        })
}
