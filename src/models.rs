use axum::{
    extract::{FromRequestParts, Query, rejection::QueryRejection},
    http::{Uri, request::Parts},
};
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};

/// Decoded query-string parameters, in request order.
///
/// Repeated keys are all kept; [`QueryParams::get`] returns the last one.
/// Use it directly as an Axum extractor:
///
/// ```rust,ignore
/// async fn list_books(params: QueryParams) -> impl IntoResponse { /* ... */ }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams {
    pairs: Vec<(String, String)>,
}

impl QueryParams {
    pub fn from_pairs<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            pairs: pairs
                .into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        }
    }

    /// Decode the query component of `uri`
    ///
    /// # Errors
    ///
    /// Returns a `QueryRejection` if the query string is not valid
    /// `application/x-www-form-urlencoded` data.
    pub fn from_uri(uri: &Uri) -> Result<Self, QueryRejection> {
        let Query(pairs) = Query::<Vec<(String, String)>>::try_from_uri(uri)?;
        Ok(Self { pairs })
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.pairs
            .iter()
            .map(|(key, value)| (key.as_str(), value.as_str()))
    }

    /// Last value sent for `key`
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .rev()
            .find(|(k, _)| k == key)
            .map(|(_, value)| value.as_str())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for QueryParams {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self::from_pairs(iter)
    }
}

impl<S> FromRequestParts<S> for QueryParams
where
    S: Send + Sync,
{
    type Rejection = QueryRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Self::from_uri(&parts.uri)
    }
}

/// Ordering query parameter, for OpenAPI documentation of list endpoints.
///
/// Field filters are open-ended (`<field>__<lookup>=<value>`) and cannot be
/// listed statically; ordering can.
#[derive(Deserialize, IntoParams, ToSchema, Default)]
#[into_params(parameter_in = Query)]
pub struct OrderingOptions {
    /// Comma-separated fields to order by; prefix a field with `-` for descending order.
    ///
    /// Related fields use `__`, for example `author__name`.
    #[param(example = "-published_at,title")]
    pub order_by: Option<String>,
}
