use sea_orm::{
    EntityTrait, Order, QueryOrder, Select,
    sea_query::{Alias, Expr, Query, SimpleExpr, SubQueryStatement},
};

use super::{
    FilterBackend,
    path::{RelationHop, follow_relations, split_first},
};
use crate::{config::FilterConfig, errors::FilterError, models::QueryParams, schema::ModelSchema};

const REVERSE_PREFIX: char = '-';

/// One `ORDER BY` entry
#[derive(Debug, Clone, PartialEq)]
pub struct OrderingTerm {
    /// The entry as written in the parameter, sign included
    pub raw: String,
    pub hops: Vec<RelationHop>,
    pub table: String,
    pub column: String,
    pub direction: Order,
}

impl OrderingTerm {
    /// Expression to sort by.
    ///
    /// Related columns are read with a correlated scalar subquery per hop;
    /// related tables are aliased so self-relations stay unambiguous.
    #[must_use]
    pub fn expr(&self) -> SimpleExpr {
        if self.hops.is_empty() {
            return Expr::col((Alias::new(&self.table), Alias::new(&self.column))).into();
        }

        let aliases: Vec<String> = (0..self.hops.len())
            .map(|depth| format!("{}_{depth}", self.hops[depth].related_table))
            .collect();
        let leaf_alias = &aliases[aliases.len() - 1];
        let leaf: SimpleExpr = Expr::col((Alias::new(leaf_alias), Alias::new(&self.column))).into();

        self.hops
            .iter()
            .enumerate()
            .rev()
            .fold(leaf, |inner, (depth, hop)| {
                let outer = if depth == 0 { &hop.table } else { &aliases[depth - 1] };
                let related = Query::select()
                    .expr(inner)
                    .from_as(Alias::new(&hop.related_table), Alias::new(&aliases[depth]))
                    .and_where(
                        Expr::col((Alias::new(&aliases[depth]), Alias::new(&hop.remote_column)))
                            .equals((Alias::new(outer), Alias::new(&hop.local_column))),
                    )
                    .limit(1)
                    .to_owned();
                SimpleExpr::SubQuery(None, Box::new(SubQueryStatement::SelectStatement(related)))
            })
    }
}

/// Parse an ordering parameter value such as `-published_at,author__name`.
///
/// Empty entries are skipped.
///
/// # Errors
///
/// Returns `FilterError::UnknownField` when an entry names no field, or a
/// path continues past a non-relation field.
pub fn parse_ordering(
    schema: &ModelSchema,
    param: &str,
    raw: &str,
    config: &FilterConfig,
) -> Result<Vec<OrderingTerm>, FilterError> {
    let separator = config.separator.as_str();

    config
        .split_list(raw)
        .into_iter()
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(|entry| {
            let (path, direction) = match entry.strip_prefix(REVERSE_PREFIX) {
                Some(path) => (path, Order::Desc),
                None => (entry, Order::Asc),
            };

            let (field_name, postfix) = split_first(path, separator);
            let field = schema
                .field(field_name)
                .ok_or_else(|| FilterError::unknown_field(param, field_name))?;
            let resolved = follow_relations(param, schema, field, postfix, separator, |_| false)?;
            if let Some(remainder) = resolved.remainder {
                return Err(FilterError::unknown_field(param, remainder));
            }

            Ok(OrderingTerm {
                raw: entry.to_string(),
                hops: resolved.hops,
                table: resolved.table.to_string(),
                column: resolved.field.column.clone(),
                direction,
            })
        })
        .collect()
}

/// Orders a query by the comma-separated `order_by` parameter.
///
/// ```text
/// GET /books?order_by=-published_at,title
/// ```
#[derive(Debug, Clone)]
pub struct OrderFilterBackend {
    schema: ModelSchema,
    config: FilterConfig,
}

impl OrderFilterBackend {
    #[must_use]
    pub fn new(schema: ModelSchema) -> Self {
        Self {
            schema,
            config: FilterConfig::default(),
        }
    }

    #[must_use]
    pub fn for_entity<E: EntityTrait>() -> Self {
        Self::new(ModelSchema::from_entity::<E>())
    }

    /// Pass the same config to the paired [`FieldsFilterBackend`](super::FieldsFilterBackend).
    #[must_use]
    pub fn with_config(mut self, config: FilterConfig) -> Self {
        self.config = config;
        self
    }

    /// The ordering requested by `params`; empty when the parameter is absent.
    ///
    /// # Errors
    ///
    /// Returns a `FilterError` when an entry names an unknown field.
    pub fn terms(&self, params: &QueryParams) -> Result<Vec<OrderingTerm>, FilterError> {
        let param = self.config.ordering_param.as_str();
        params.get(param).map_or_else(
            || Ok(Vec::new()),
            |raw| parse_ordering(&self.schema, param, raw, &self.config),
        )
    }
}

impl<E: EntityTrait> FilterBackend<E> for OrderFilterBackend {
    fn filter_query(&self, params: &QueryParams, query: Select<E>) -> Result<Select<E>, FilterError> {
        let terms = self.terms(params)?;
        Ok(terms.into_iter().fold(query, |query, term| {
            tracing::debug!(entry = %term.raw, table = %term.table, column = %term.column, "Applying ordering");
            query.order_by(term.expr(), term.direction)
        }))
    }
}
