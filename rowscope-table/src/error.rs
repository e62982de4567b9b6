//! Error types for table construction, pipeline reads and lookups.

use crate::{ColumnId, RowId};

/// Configuration and lookup failures.
///
/// Configuration errors surface from [`crate::Table::new`] or from the first row-model read that
/// needs the offending piece of state. Lookup errors are caller bugs, not data conditions.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TableError {
    /// A column id (in a lookup or in state) does not name a column of the table.
    #[error("Column '{id}' not found")]
    ColumnNotFound { id: ColumnId },

    /// A row id does not name a row of the table.
    #[error("Row '{id}' not found")]
    RowNotFound { id: RowId },

    /// Two rows resolved to the same id.
    #[error("Duplicate row id '{id}'")]
    DuplicateRowId { id: RowId },

    /// A column definition (leaf or group) has an empty id.
    #[error("Column definition has an empty id")]
    MissingColumnId,

    /// Two column definitions (leaf or group) share an id.
    #[error("Duplicate column id '{id}'")]
    DuplicateColumnId { id: ColumnId },

    /// A column without an accessor was asked to take part in filtering, sorting or grouping.
    #[error("Column '{id}' has no accessor and cannot be used for {feature}")]
    MissingAccessor {
        id: ColumnId,
        feature: &'static str,
    },

    /// A `Named` strategy that is neither registered nor built in.
    #[error("No {kind} function named '{name}'")]
    UnknownFunction { kind: &'static str, name: String },
}

impl TableError {
    pub fn column_not_found(id: impl Into<ColumnId>) -> Self {
        Self::ColumnNotFound { id: id.into() }
    }

    pub fn row_not_found(id: impl Into<RowId>) -> Self {
        Self::RowNotFound { id: id.into() }
    }

    pub fn duplicate_row_id(id: impl Into<RowId>) -> Self {
        Self::DuplicateRowId { id: id.into() }
    }

    pub fn duplicate_column_id(id: impl Into<ColumnId>) -> Self {
        Self::DuplicateColumnId { id: id.into() }
    }

    pub fn missing_accessor(id: impl Into<ColumnId>, feature: &'static str) -> Self {
        Self::MissingAccessor {
            id: id.into(),
            feature,
        }
    }

    pub fn unknown_function(kind: &'static str, name: impl Into<String>) -> Self {
        Self::UnknownFunction {
            kind,
            name: name.into(),
        }
    }
}

/// A failure reported by a column accessor.
///
/// Never fatal: the cell value becomes [`crate::Value::Undefined`] and a warning is logged.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AccessorError {
    /// A dotted `accessor_key` path did not resolve.
    #[error("Key '{path}' not found in record")]
    MissingKey { path: String },

    /// The accessor ran but produced `Undefined`.
    #[error("Accessor yielded undefined")]
    UndefinedValue,

    #[error("{message}")]
    Failed { message: String },
}

impl AccessorError {
    pub fn missing_key(path: impl Into<String>) -> Self {
        Self::MissingKey { path: path.into() }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self::Failed {
            message: message.into(),
        }
    }
}
