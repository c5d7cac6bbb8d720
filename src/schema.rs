//! Model schema descriptors used to resolve query parameters.
//!
//! A [`ModelSchema`] is built once from a Sea-ORM entity and describes which
//! names a client may filter or order on. Column kinds are read from each
//! column's [`ColumnType`]; relations are registered by hand because Sea-ORM
//! relation definitions do not carry the target entity's columns.
//!
//! ```rust,ignore
//! let publisher = ModelSchema::from_entity::<publisher::Entity>();
//! let author = ModelSchema::from_entity::<author::Entity>()
//!     .with_relation("publisher", "publisher_id", "id", publisher);
//! let book = ModelSchema::from_entity::<book::Entity>()
//!     .with_relation("author", "author_id", "id", author);
//! ```

use sea_orm::{ColumnTrait, ColumnType, EntityTrait, IdenStatic, Iterable};

/// What kind of value a field holds, which decides default lookups and value parsing.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldKind {
    Text,
    Integer,
    Float,
    Boolean,
    Uuid,
    Date,
    /// Timestamp without an offset
    DateTime,
    /// Timestamp stored with an offset; values bind as UTC instants
    DateTimeTz,
    /// Anything else (enums, json, binary); compared as text
    Other,
    /// A foreign key to another model
    Relation(Box<RelationDescriptor>),
}

impl FieldKind {
    /// Map a database column type to a field kind
    #[must_use]
    pub fn from_column_type(column_type: &ColumnType) -> Self {
        match column_type {
            ColumnType::Char(_) | ColumnType::String(_) | ColumnType::Text => Self::Text,
            ColumnType::TinyInteger
            | ColumnType::SmallInteger
            | ColumnType::Integer
            | ColumnType::BigInteger
            | ColumnType::TinyUnsigned
            | ColumnType::SmallUnsigned
            | ColumnType::Unsigned
            | ColumnType::BigUnsigned => Self::Integer,
            ColumnType::Float
            | ColumnType::Double
            | ColumnType::Decimal(_)
            | ColumnType::Money(_) => Self::Float,
            ColumnType::Boolean => Self::Boolean,
            ColumnType::Uuid => Self::Uuid,
            ColumnType::Date => Self::Date,
            ColumnType::DateTime | ColumnType::Timestamp => Self::DateTime,
            ColumnType::TimestampWithTimeZone => Self::DateTimeTz,
            _ => Self::Other,
        }
    }

    #[must_use]
    pub fn is_text(&self) -> bool {
        matches!(self, Self::Text)
    }

    /// Either timestamp kind; both accept the `date` transform
    #[must_use]
    pub fn is_datetime(&self) -> bool {
        matches!(self, Self::DateTime | Self::DateTimeTz)
    }

    #[must_use]
    pub fn as_relation(&self) -> Option<&RelationDescriptor> {
        match self {
            Self::Relation(relation) => Some(relation),
            _ => None,
        }
    }
}

/// Foreign key from one model to another
#[derive(Debug, Clone, PartialEq)]
pub struct RelationDescriptor {
    /// Column on the related table the foreign key points at
    pub remote_column: String,
    /// Kind of the local foreign-key column
    pub key_kind: FieldKind,
    /// Schema of the related model
    pub target: ModelSchema,
}

/// A filterable/orderable name on a model
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDescriptor {
    /// Name used in query parameters
    pub name: String,
    /// Database column backing the field (the foreign-key column for relations)
    pub column: String,
    pub kind: FieldKind,
}

impl FieldDescriptor {
    pub fn new(name: impl Into<String>, kind: FieldKind) -> Self {
        let name = name.into();
        Self {
            column: name.clone(),
            name,
            kind,
        }
    }

    #[must_use]
    pub fn relation(&self) -> Option<&RelationDescriptor> {
        self.kind.as_relation()
    }
}

/// The set of fields a query parameter may reference on one model.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelSchema {
    table: String,
    fields: Vec<FieldDescriptor>,
}

impl ModelSchema {
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            fields: Vec::new(),
        }
    }

    /// Describe every column of a Sea-ORM entity
    #[must_use]
    pub fn from_entity<E: EntityTrait>() -> Self {
        let fields = E::Column::iter()
            .map(|column| {
                FieldDescriptor::new(
                    column.as_str(),
                    FieldKind::from_column_type(column.def().get_column_type()),
                )
            })
            .collect();

        Self {
            table: E::default().table_name().to_string(),
            fields,
        }
    }

    /// Add or replace a plain field
    #[must_use]
    pub fn with_field(mut self, name: impl Into<String>, kind: FieldKind) -> Self {
        self.insert(FieldDescriptor::new(name, kind));
        self
    }

    /// Register a foreign key named `name`, stored in `local_column` and
    /// pointing at `remote_column` of `target`.
    ///
    /// A field already called `name` is replaced; the kind of `local_column`
    /// (if known) is kept for comparisons against the key itself.
    #[must_use]
    pub fn with_relation(
        mut self,
        name: impl Into<String>,
        local_column: impl Into<String>,
        remote_column: impl Into<String>,
        target: ModelSchema,
    ) -> Self {
        let local_column = local_column.into();
        let key_kind = self
            .fields
            .iter()
            .find(|field| field.column == local_column && field.relation().is_none())
            .map_or(FieldKind::Other, |field| field.kind.clone());

        self.insert(FieldDescriptor {
            name: name.into(),
            column: local_column,
            kind: FieldKind::Relation(Box::new(RelationDescriptor {
                remote_column: remote_column.into(),
                key_kind,
                target,
            })),
        });
        self
    }

    /// Remove a field so clients can no longer reference it
    #[must_use]
    pub fn without_field(mut self, name: &str) -> Self {
        self.fields.retain(|field| field.name != name);
        self
    }

    fn insert(&mut self, descriptor: FieldDescriptor) {
        if let Some(existing) = self
            .fields
            .iter_mut()
            .find(|field| field.name == descriptor.name)
        {
            *existing = descriptor;
        } else {
            self.fields.push(descriptor);
        }
    }

    #[must_use]
    pub fn table(&self) -> &str {
        &self.table
    }

    /// Look up a field by its query-parameter name
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|field| field.name == name)
    }

    pub fn fields(&self) -> impl Iterator<Item = &FieldDescriptor> {
        self.fields.iter()
    }
}
