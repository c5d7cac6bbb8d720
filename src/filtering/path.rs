//! Walking `__`-separated field paths through relations.

use crate::{
    errors::FilterError,
    schema::{FieldDescriptor, ModelSchema},
};

/// One step from a model to a related model through a foreign key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelationHop {
    /// Table holding the foreign key
    pub table: String,
    /// Foreign-key column on `table`
    pub local_column: String,
    /// Table the key points at
    pub related_table: String,
    /// Referenced column on `related_table`
    pub remote_column: String,
}

/// Where a field path ended up.
#[derive(Debug)]
pub struct ResolvedPath<'s, 'p> {
    pub hops: Vec<RelationHop>,
    /// Table of the final field
    pub table: &'s str,
    pub field: &'s FieldDescriptor,
    /// Postfix left over once no further relation could be followed
    pub remainder: Option<&'p str>,
}

/// Split `param` at the first `separator` into head and optional rest.
#[must_use]
pub fn split_first<'p>(param: &'p str, separator: &str) -> (&'p str, Option<&'p str>) {
    match param.split_once(separator) {
        Some((head, rest)) => (head, Some(rest)),
        None => (param, None),
    }
}

/// Follow relations from `field` (already resolved on `schema`) through `postfix`.
///
/// At each relation the head of the remaining postfix is looked up on the
/// related model. When it names no related field, `stop` decides whether the
/// remainder is handed back to the caller (a lookup keyword) or rejected.
///
/// # Errors
///
/// Returns `FilterError::UnknownField` when a segment after a relation is
/// neither a related field nor accepted by `stop`.
pub fn follow_relations<'s, 'p>(
    param: &str,
    schema: &'s ModelSchema,
    field: &'s FieldDescriptor,
    postfix: Option<&'p str>,
    separator: &str,
    stop: impl Fn(&str) -> bool,
) -> Result<ResolvedPath<'s, 'p>, FilterError> {
    let mut hops = Vec::new();
    let mut table = schema.table();
    let mut field = field;
    let mut remainder = postfix;

    while let (Some(relation), Some(rest)) = (field.relation(), remainder) {
        let (head, tail) = split_first(rest, separator);
        match relation.target.field(head) {
            Some(next) => {
                hops.push(RelationHop {
                    table: table.to_string(),
                    local_column: field.column.clone(),
                    related_table: relation.target.table().to_string(),
                    remote_column: relation.remote_column.clone(),
                });
                table = relation.target.table();
                field = next;
                remainder = tail;
            }
            None if stop(head) => break,
            None => return Err(FilterError::unknown_field(param, head)),
        }
    }

    Ok(ResolvedPath {
        hops,
        table,
        field,
        remainder,
    })
}
