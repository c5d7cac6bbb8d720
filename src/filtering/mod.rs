//! # Query-String Filtering & Ordering
//!
//! Two filter backends turn request query parameters into conditions on a
//! Sea-ORM [`Select`]. Both implement [`FilterBackend`] and can be chained with
//! [`apply_backends`].
//!
//! ## Field lookups
//!
//! ```text
//! GET /books?title=rust                         UPPER(title) LIKE '%RUST%'
//! GET /books?title__exact=Rust                  title = 'Rust'
//! GET /books?pages__gte=300                     pages >= 300
//! GET /books?published_at=2024-01-15            DATE(published_at) = '2024-01-15'
//! GET /books?published_at__lt=2024-01-15        DATE(published_at) < '2024-01-15'
//! GET /books?id__in=1,2,3                       id IN (1, 2, 3)
//! GET /books?author__name=ann                   author_id IN (SELECT id FROM authors WHERE ...)
//! GET /books?author__publisher__name__iexact=x  two nested subqueries
//! ```
//!
//! Parameters that name no field of the model are ignored. Values that cannot
//! be converted to the field's type and unknown lookups fail with
//! [`FilterError`](crate::FilterError).
//!
//! ## Ordering
//!
//! ```text
//! GET /books?order_by=-published_at,title
//! GET /books?order_by=author__name
//! ```

pub mod conditions;
pub mod fields;
pub mod lookup;
pub mod ordering;
pub mod path;
pub mod values;

pub use conditions::build_condition;
pub use fields::FieldsFilterBackend;
pub use lookup::{Lookup, Operator, ResolvedFilter, Transform, resolve_filter_param};
pub use ordering::{OrderFilterBackend, OrderingTerm, parse_ordering};
pub use path::RelationHop;
pub use values::FilterValue;

use sea_orm::{EntityTrait, Select};

use crate::{errors::FilterError, models::QueryParams};

/// A stage that narrows or orders a query from request parameters.
pub trait FilterBackend<E: EntityTrait>: Send + Sync {
    /// Return `query` with this backend's conditions applied
    ///
    /// # Errors
    ///
    /// Returns a `FilterError` if a parameter this backend handles is invalid.
    fn filter_query(&self, params: &QueryParams, query: Select<E>) -> Result<Select<E>, FilterError>;
}

/// Run `backends` over `query` in order, stopping at the first error.
///
/// # Errors
///
/// Returns the first `FilterError` raised by a backend.
pub fn apply_backends<E: EntityTrait>(
    backends: &[&dyn FilterBackend<E>],
    params: &QueryParams,
    query: Select<E>,
) -> Result<Select<E>, FilterError> {
    backends
        .iter()
        .try_fold(query, |query, backend| backend.filter_query(params, query))
}
