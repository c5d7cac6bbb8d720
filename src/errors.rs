//! # Filter Errors
//!
//! Every rejected query parameter surfaces as a [`FilterError`]. Clients always
//! see the same generic message together with the parameter name; the variant
//! and its details are only written to the log.
//!
//! ```rust,ignore
//! use fieldsfilter::{FilterBackend, FilterError, QueryParams};
//!
//! async fn list_books(
//!     State(state): State<AppState>,
//!     params: QueryParams,
//! ) -> Result<Json<Vec<book::Model>>, FilterError> {
//!     let query = state.fields.filter_query(&params, book::Entity::find())?;
//!     // ...
//! }
//! ```

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use std::fmt;

const INVALID_PARAMETER_MESSAGE: &str = "The parameter is invalid";

/// Error raised when a query parameter cannot be turned into a filter or ordering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterError {
    /// The value could not be converted to the field's type
    InvalidValue {
        /// Query parameter name as sent by the client
        param: String,
        /// Raw value as sent by the client
        value: String,
        /// Why the conversion failed
        reason: String,
    },

    /// The postfix chain names a lookup that does not exist
    UnknownLookup {
        /// Query parameter name as sent by the client
        param: String,
        /// The unrecognised postfix token
        lookup: String,
    },

    /// A nested or ordering field does not exist on its model
    UnknownField {
        /// Query parameter name as sent by the client
        param: String,
        /// The unresolved field path
        field: String,
    },
}

impl FilterError {
    pub fn invalid_value(
        param: impl Into<String>,
        value: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::InvalidValue {
            param: param.into(),
            value: value.into(),
            reason: reason.into(),
        }
    }

    pub fn unknown_lookup(param: impl Into<String>, lookup: impl Into<String>) -> Self {
        Self::UnknownLookup {
            param: param.into(),
            lookup: lookup.into(),
        }
    }

    pub fn unknown_field(param: impl Into<String>, field: impl Into<String>) -> Self {
        Self::UnknownField {
            param: param.into(),
            field: field.into(),
        }
    }

    /// Name of the query parameter that was rejected
    #[must_use]
    pub fn param(&self) -> &str {
        match self {
            Self::InvalidValue { param, .. }
            | Self::UnknownLookup { param, .. }
            | Self::UnknownField { param, .. } => param,
        }
    }

    /// All filter errors are client errors
    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        StatusCode::BAD_REQUEST
    }

    /// The sanitized message sent to clients
    #[must_use]
    pub fn user_message(&self) -> &'static str {
        INVALID_PARAMETER_MESSAGE
    }

    fn log_details(&self) {
        match self {
            Self::InvalidValue {
                param,
                value,
                reason,
            } => {
                tracing::warn!(param = %param, value = %value, reason = %reason, "Rejected filter value");
            }
            Self::UnknownLookup { param, lookup } => {
                tracing::warn!(param = %param, lookup = %lookup, "Rejected unknown lookup");
            }
            Self::UnknownField { param, field } => {
                tracing::warn!(param = %param, field = %field, "Rejected unknown field");
            }
        }
    }
}

/// Error body sent to clients
#[derive(Serialize)]
struct ErrorResponse<'a> {
    error: &'static str,
    parameter: &'a str,
}

impl IntoResponse for FilterError {
    fn into_response(self) -> Response {
        self.log_details();

        let body = ErrorResponse {
            error: self.user_message(),
            parameter: self.param(),
        };
        (self.status_code(), Json(body)).into_response()
    }
}

impl fmt::Display for FilterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.user_message(), self.param())
    }
}

impl std::error::Error for FilterError {}
