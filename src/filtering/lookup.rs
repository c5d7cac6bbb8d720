//! Resolving a `field__...__lookup=value` parameter against a model schema.
//!
//! The parameter is split on the separator. The first segment must name a
//! field of the model or the parameter is ignored. Relations are followed for
//! as long as the next segment names a field of the related model; whatever
//! is left is the lookup postfix, `[date][__operator]`.
//!
//! Without an explicit operator one is inferred from the field:
//!
//! | field              | postfix                    | value        | lookup         |
//! |--------------------|----------------------------|--------------|----------------|
//! | text               | none                       | any          | `icontains`    |
//! | datetime           | none/exact/gt/gte/lt/lte   | `YYYY-MM-DD` | `date__<op>`   |
//! | any                | `in`                       | `a,b,c`      | list of values |
//! | anything else      | none                       | any          | `exact`        |

use std::fmt;

use super::{
    path::{RelationHop, follow_relations, split_first},
    values::{FilterValue, coerce, parse_date},
};
use crate::{
    config::FilterConfig,
    errors::FilterError,
    schema::{FieldKind, ModelSchema},
};

/// Comparison selected by a lookup postfix
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Exact,
    IExact,
    Contains,
    IContains,
    StartsWith,
    IStartsWith,
    EndsWith,
    IEndsWith,
    Gt,
    Gte,
    Lt,
    Lte,
    In,
    Range,
    IsNull,
}

impl Operator {
    const ALL: [Self; 15] = [
        Self::Exact,
        Self::IExact,
        Self::Contains,
        Self::IContains,
        Self::StartsWith,
        Self::IStartsWith,
        Self::EndsWith,
        Self::IEndsWith,
        Self::Gt,
        Self::Gte,
        Self::Lt,
        Self::Lte,
        Self::In,
        Self::Range,
        Self::IsNull,
    ];

    #[must_use]
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|op| op.keyword() == keyword)
    }

    #[must_use]
    pub fn keyword(self) -> &'static str {
        match self {
            Self::Exact => "exact",
            Self::IExact => "iexact",
            Self::Contains => "contains",
            Self::IContains => "icontains",
            Self::StartsWith => "startswith",
            Self::IStartsWith => "istartswith",
            Self::EndsWith => "endswith",
            Self::IEndsWith => "iendswith",
            Self::Gt => "gt",
            Self::Gte => "gte",
            Self::Lt => "lt",
            Self::Lte => "lte",
            Self::In => "in",
            Self::Range => "range",
            Self::IsNull => "isnull",
        }
    }

    /// Operators that match text patterns and take the raw value as-is
    #[must_use]
    pub fn is_text_match(self) -> bool {
        matches!(
            self,
            Self::IExact
                | Self::Contains
                | Self::IContains
                | Self::StartsWith
                | Self::IStartsWith
                | Self::EndsWith
                | Self::IEndsWith
        )
    }

    /// Operators after which a datetime field is compared by calendar day
    /// when the value is a bare date
    #[must_use]
    pub fn is_comparison(self) -> bool {
        matches!(
            self,
            Self::Exact | Self::Gt | Self::Gte | Self::Lt | Self::Lte
        )
    }
}

/// Transform applied to the column before comparing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transform {
    /// Truncate a datetime to its calendar day
    Date,
}

impl Transform {
    const DATE_KEYWORD: &'static str = "date";

    fn from_keyword(keyword: &str) -> Option<Self> {
        (keyword == Self::DATE_KEYWORD).then_some(Self::Date)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Lookup {
    pub transform: Option<Transform>,
    pub operator: Operator,
}

impl Lookup {
    #[must_use]
    pub fn new(operator: Operator) -> Self {
        Self {
            transform: None,
            operator,
        }
    }
}

impl fmt::Display for Lookup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.transform {
            Some(Transform::Date) => write!(f, "date__{}", self.operator.keyword()),
            None => f.write_str(self.operator.keyword()),
        }
    }
}

/// A query parameter resolved to a column, lookup and typed value
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedFilter {
    /// Parameter name as sent by the client
    pub param: String,
    /// Relations crossed from the queried model to `table`
    pub hops: Vec<RelationHop>,
    pub table: String,
    pub column: String,
    /// Kind of the compared column (the key kind for a bare relation)
    pub kind: FieldKind,
    pub lookup: Lookup,
    pub value: FilterValue,
}

fn is_lookup_keyword(keyword: &str) -> bool {
    Operator::from_keyword(keyword).is_some() || Transform::from_keyword(keyword).is_some()
}

/// Parse an explicit `[date][__operator]` postfix
fn parse_postfix(
    param: &str,
    postfix: Option<&str>,
    kind: &FieldKind,
    separator: &str,
) -> Result<(Option<Transform>, Option<Operator>), FilterError> {
    let Some(postfix) = postfix else {
        return Ok((None, None));
    };

    let (head, tail) = split_first(postfix, separator);
    let (transform, operator_keyword) = match Transform::from_keyword(head) {
        Some(transform) if kind.is_datetime() => (Some(transform), tail),
        Some(_) => return Err(FilterError::unknown_lookup(param, head)),
        None => (None, Some(postfix)),
    };

    let operator = operator_keyword
        .map(|keyword| {
            Operator::from_keyword(keyword)
                .ok_or_else(|| FilterError::unknown_lookup(param, keyword))
        })
        .transpose()?;

    Ok((transform, operator))
}

/// Pick the lookup for a field when the client did not fully specify one
fn infer_lookup(
    kind: &FieldKind,
    transform: Option<Transform>,
    operator: Option<Operator>,
    raw: &str,
) -> Lookup {
    match (kind, transform, operator) {
        (FieldKind::Text, None, None) => Lookup::new(Operator::IContains),
        (kind, None, op)
            if kind.is_datetime()
                && op.is_none_or(Operator::is_comparison)
                && parse_date(raw).is_some() =>
        {
            Lookup {
                transform: Some(Transform::Date),
                operator: op.unwrap_or(Operator::Exact),
            }
        }
        (_, transform, op) => Lookup {
            transform,
            operator: op.unwrap_or(Operator::Exact),
        },
    }
}

/// Resolve one query parameter against `schema`.
///
/// Returns `Ok(None)` when the first segment names no field of the model.
///
/// # Errors
///
/// Returns a `FilterError` when a nested field does not exist, the postfix
/// names an unknown lookup, or the value does not fit the field.
pub fn resolve_filter_param(
    schema: &ModelSchema,
    param: &str,
    raw: &str,
    config: &FilterConfig,
) -> Result<Option<ResolvedFilter>, FilterError> {
    let separator = config.separator.as_str();
    let (field_name, postfix) = split_first(param, separator);

    let Some(field) = schema.field(field_name) else {
        tracing::debug!(param = %param, table = %schema.table(), "Ignoring parameter with no matching field");
        return Ok(None);
    };

    let path = follow_relations(param, schema, field, postfix, separator, is_lookup_keyword)?;

    let (transform, operator) = parse_postfix(param, path.remainder, &path.field.kind, separator)?;
    let lookup = infer_lookup(&path.field.kind, transform, operator, raw);

    // A bare relation compares its key column
    let kind = match path.field.relation() {
        Some(relation) => relation.key_kind.clone(),
        None => path.field.kind.clone(),
    };
    let value = coerce(param, raw, &kind, lookup, config)?;

    Ok(Some(ResolvedFilter {
        param: param.to_string(),
        hops: path.hops,
        table: path.table.to_string(),
        column: path.field.column.clone(),
        kind,
        lookup,
        value,
    }))
}
