//! # fieldsfilter
//!
//! Query-string filtering and ordering for list endpoints built with Axum and
//! Sea-ORM.
//!
//! ```rust,ignore
//! use fieldsfilter::{
//!     FieldsFilterBackend, FilterBackend, ModelSchema, OrderFilterBackend, QueryParams,
//!     apply_backends,
//! };
//!
//! let schema = ModelSchema::from_entity::<book::Entity>()
//!     .with_relation("author", "author_id", "id", ModelSchema::from_entity::<author::Entity>());
//! let fields = FieldsFilterBackend::new(schema.clone());
//! let ordering = OrderFilterBackend::new(schema);
//!
//! // GET /books?title=rust&author__name__istartswith=a&order_by=-published_at
//! let query = apply_backends(&[&fields, &ordering], &params, book::Entity::find())?;
//! let books = query.all(&db).await?;
//! ```

pub mod config;
pub mod errors;
pub mod filtering;
pub mod models;
pub mod schema;

pub use config::FilterConfig;
pub use errors::FilterError;
pub use filtering::{FieldsFilterBackend, FilterBackend, OrderFilterBackend, apply_backends};
pub use models::{OrderingOptions, QueryParams};
pub use schema::{FieldDescriptor, FieldKind, ModelSchema, RelationDescriptor};
