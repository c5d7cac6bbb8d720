use sea_orm::{Condition, EntityTrait, QueryFilter, Select};

use super::{
    FilterBackend,
    conditions::build_condition,
    lookup::{ResolvedFilter, resolve_filter_param},
};
use crate::{config::FilterConfig, errors::FilterError, models::QueryParams, schema::ModelSchema};

/// Filters a query by `field__...__lookup=value` parameters.
///
/// ```rust,ignore
/// let backend = FieldsFilterBackend::new(book_schema());
/// // GET /books?title=rust&author__name__istartswith=a&pages__gte=300
/// let query = backend.filter_query(&params, book::Entity::find())?;
/// ```
#[derive(Debug, Clone)]
pub struct FieldsFilterBackend {
    schema: ModelSchema,
    config: FilterConfig,
}

impl FieldsFilterBackend {
    #[must_use]
    pub fn new(schema: ModelSchema) -> Self {
        Self {
            schema,
            config: FilterConfig::default(),
        }
    }

    /// Filter on every column of `E`, without relations
    #[must_use]
    pub fn for_entity<E: EntityTrait>() -> Self {
        Self::new(ModelSchema::from_entity::<E>())
    }

    /// Use the same config as the paired [`OrderFilterBackend`](super::OrderFilterBackend)
    /// so its ordering parameter is not read as a filter.
    #[must_use]
    pub fn with_config(mut self, config: FilterConfig) -> Self {
        self.config = config;
        self
    }

    #[must_use]
    pub fn schema(&self) -> &ModelSchema {
        &self.schema
    }

    /// Resolve every filter parameter, skipping ignored and unknown names.
    ///
    /// # Errors
    ///
    /// Returns the first `FilterError` raised by a parameter.
    pub fn resolve(&self, params: &QueryParams) -> Result<Vec<ResolvedFilter>, FilterError> {
        params
            .iter()
            .filter(|(param, _)| !self.config.is_ignored(param))
            .filter_map(|(param, value)| {
                resolve_filter_param(&self.schema, param, value, &self.config).transpose()
            })
            .collect()
    }

    /// All filter parameters AND-ed into one condition.
    ///
    /// # Errors
    ///
    /// Returns the first `FilterError` raised by a parameter.
    pub fn condition(&self, params: &QueryParams) -> Result<Condition, FilterError> {
        let filters = self.resolve(params)?;
        Ok(filters.iter().fold(Condition::all(), |condition, filter| {
            tracing::debug!(
                param = %filter.param,
                table = %filter.table,
                column = %filter.column,
                lookup = %filter.lookup,
                hops = filter.hops.len(),
                "Applying field filter"
            );
            condition.add(build_condition(filter))
        }))
    }
}

impl<E: EntityTrait> FilterBackend<E> for FieldsFilterBackend {
    fn filter_query(&self, params: &QueryParams, query: Select<E>) -> Result<Select<E>, FilterError> {
        Ok(query.filter(self.condition(params)?))
    }
}
