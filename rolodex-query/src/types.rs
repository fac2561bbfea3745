//! Common types used by the search engine and the stores.

use std::cmp::Ordering;
use std::fmt;

use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};

use crate::error::{QueryError, QueryResult};

/// Identifier of a contact, person or address book.
pub type RecordId = i64;

/// A set of unique record ids produced by one predicate or composite.
pub type IdSet = IndexSet<RecordId>;

/// A stored row: column name to cell value, in schema column order.
pub type Row = IndexMap<&'static str, Value>;

/// A single cell value in a store table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    /// Null value.
    Null,
    /// Boolean value.
    Bool(bool),
    /// Integer value.
    Int(i64),
    /// Text value.
    Text(String),
}

impl Value {
    /// Check if this is a null value.
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Get the integer payload, if any.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(v) => Some(*v),
            _ => None,
        }
    }

    /// Get the boolean payload. Integers are accepted as stored by SQLite.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(v) => Some(*v),
            Self::Int(v) => Some(*v != 0),
            _ => None,
        }
    }

    /// Get the text payload, if any.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(v) => Some(v),
            _ => None,
        }
    }

    /// Compare two non-null values of the same kind.
    ///
    /// Booleans order `false < true`. Returns `None` for nulls and for
    /// values of different kinds.
    pub fn compare(&self, other: &Value) -> Option<Ordering> {
        match (self, other) {
            (Self::Int(a), Self::Int(b)) => Some(a.cmp(b)),
            (Self::Text(a), Self::Text(b)) => Some(a.cmp(b)),
            (Self::Bool(_) | Self::Int(_), Self::Bool(_) | Self::Int(_)) => {
                Some(self.as_bool()?.cmp(&other.as_bool()?))
            }
            _ => None,
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Self::Int(v as i64)
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::Text(v.to_string())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        match v {
            Some(v) => v.into(),
            None => Self::Null,
        }
    }
}

/// Sort order for query results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum SortOrder {
    /// Ascending order (A-Z, 0-9, oldest first).
    #[default]
    #[serde(rename = "ASC")]
    Asc,
    /// Descending order (Z-A, 9-0, newest first).
    #[serde(rename = "DESC")]
    Desc,
}

impl SortOrder {
    /// Get the SQL keyword for this sort order.
    pub fn as_sql(&self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }

    /// Whether this is ascending order.
    pub fn is_ascending(&self) -> bool {
        matches!(self, Self::Asc)
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_sql())
    }
}

/// A requested ordering of `find()` results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SortMode {
    /// The attribute to sort by, resolved through the attribute registry.
    pub attribute_name: String,
    /// The sort order.
    #[serde(default)]
    pub order: SortOrder,
}

impl SortMode {
    /// Create a new sort mode.
    pub fn new(attribute_name: impl Into<String>, order: SortOrder) -> Self {
        Self {
            attribute_name: attribute_name.into(),
            order,
        }
    }

    /// Ascending sort on an attribute.
    pub fn asc(attribute_name: impl Into<String>) -> Self {
        Self::new(attribute_name, SortOrder::Asc)
    }

    /// Descending sort on an attribute.
    pub fn desc(attribute_name: impl Into<String>) -> Self {
        Self::new(attribute_name, SortOrder::Desc)
    }

    /// Parse a sort mode from its JSON form.
    ///
    /// `null` means "no sorting". Anything other than an object is a type
    /// mismatch; an `order` other than `ASC`/`DESC` is an invalid value.
    pub fn from_json(json: &serde_json::Value) -> QueryResult<Option<Self>> {
        let obj = match json {
            serde_json::Value::Null => return Ok(None),
            serde_json::Value::Object(obj) => obj,
            _ => return Err(QueryError::type_mismatch("sortMode must be an object")),
        };

        let attribute_name = obj
            .get("attributeName")
            .and_then(serde_json::Value::as_str)
            .ok_or_else(|| QueryError::type_mismatch("sortMode.attributeName must be a string"))?;

        let order = match obj.get("order") {
            None | Some(serde_json::Value::Null) => SortOrder::Asc,
            Some(serde_json::Value::String(s)) => match s.as_str() {
                "ASC" => SortOrder::Asc,
                "DESC" => SortOrder::Desc,
                other => {
                    return Err(QueryError::invalid_values(format!(
                        "Unknown sort order: {}",
                        other
                    )));
                }
            },
            Some(_) => return Err(QueryError::type_mismatch("sortMode.order must be a string")),
        };

        Ok(Some(Self::new(attribute_name, order)))
    }
}
