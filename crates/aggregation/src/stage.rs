//! Pipeline stage vocabulary.

use doc_store::Filter;

/// One field of a projection: a source path copied to an output name.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectField {
    /// Dotted path into the (possibly joined) row, e.g. `"event.title"`.
    pub source: String,
    /// Field name in the projected output.
    pub target: String,
}

impl ProjectField {
    /// Creates a projection field.
    pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
        }
    }
}

/// A single pipeline stage.
///
/// Stages execute strictly in the order they were added; the canonical
/// order is match, coerce, lookup, unwind, match, project, sort.
#[derive(Debug, Clone, PartialEq)]
pub enum Stage {
    /// Filters rows by a predicate. As the first stage it is pushed down
    /// into the store query; after a lookup it may use dotted paths into
    /// the joined document.
    Match(Filter),

    /// Normalizes a foreign-key field to the join target's canonical UUID
    /// form. Rows whose key is missing or unparsable are dropped.
    CoerceId { field: String },

    /// Left-lookup against another collection: rows gain `as_field`, an
    /// array of the documents from `from` whose `foreign_field` equals
    /// this row's `local_field`.
    Lookup {
        from: &'static str,
        local_field: String,
        foreign_field: String,
        as_field: String,
    },

    /// Flattens the array at `field` to one row per element, dropping rows
    /// whose array is empty. After a lookup on a unique key this turns the
    /// one-element array into a scalar document.
    Unwind { field: String },

    /// Projects a fixed output shape; unresolved paths become `null`.
    Project(Vec<ProjectField>),

    /// Sorts rows descending by the value at `field` (timestamp-aware).
    SortDesc { field: String },
}
