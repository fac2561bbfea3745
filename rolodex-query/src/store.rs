//! The storage abstraction the search engine and address books run against.
//!
//! A store holds the tables described in [`crate::schema`]. Reads are keyed
//! queries: "which join-key values have a row in this table satisfying these
//! conditions". Writes are applied as atomic [`Mutation`] batches.

use std::fmt;

use crate::error::QueryResult;
use crate::schema::Table;
use crate::types::{IdSet, RecordId, Row, SortOrder, Value};

/// Comparison applied to one column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Comparison {
    /// Exact equality.
    Equals,
    /// Case-insensitive equality (text only).
    EqualsIgnoreCase,
    /// Case-insensitive substring (text only).
    Contains,
    /// Case-insensitive prefix (text only).
    StartsWith,
    /// Case-insensitive suffix (text only).
    EndsWith,
    /// Greater than or equal.
    Gte,
    /// Less than or equal.
    Lte,
    /// The column is not null; the operand is ignored.
    Exists,
}

impl Comparison {
    /// Evaluate this comparison against a stored cell.
    ///
    /// Nulls only satisfy nothing; kinds that cannot be compared never match.
    pub fn matches(&self, cell: &Value, operand: &Value) -> bool {
        if cell.is_null() {
            return false;
        }
        match self {
            Self::Exists => true,
            Self::Equals => cell.compare(operand).is_some_and(|o| o.is_eq()),
            Self::Gte => cell.compare(operand).is_some_and(|o| o.is_ge()),
            Self::Lte => cell.compare(operand).is_some_and(|o| o.is_le()),
            Self::EqualsIgnoreCase | Self::Contains | Self::StartsWith | Self::EndsWith => {
                let (Some(cell), Some(operand)) = (cell.as_text(), operand.as_text()) else {
                    return false;
                };
                let cell = cell.to_lowercase();
                let operand = operand.to_lowercase();
                match self {
                    Self::EqualsIgnoreCase => cell == operand,
                    Self::Contains => cell.contains(&operand),
                    Self::StartsWith => cell.starts_with(&operand),
                    _ => cell.ends_with(&operand),
                }
            }
        }
    }
}

/// One column condition.
#[derive(Debug, Clone, PartialEq)]
pub struct Condition {
    /// Column name.
    pub column: &'static str,
    /// Comparison.
    pub op: Comparison,
    /// Right-hand operand.
    pub value: Value,
}

impl Condition {
    /// Create a condition.
    pub fn new(column: &'static str, op: Comparison, value: impl Into<Value>) -> Self {
        Self {
            column,
            op,
            value: value.into(),
        }
    }

    /// Equality condition.
    pub fn eq(column: &'static str, value: impl Into<Value>) -> Self {
        Self::new(column, Comparison::Equals, value)
    }

    /// Check this condition against a row.
    pub fn matches(&self, row: &Row) -> bool {
        row.get(self.column)
            .is_some_and(|cell| self.op.matches(cell, &self.value))
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {:?} {:?}", self.column, self.op, self.value)
    }
}

/// A keyed query against one table.
///
/// Selects the `key` column of every row that satisfies all `conditions`
/// and, when `keys` is set, whose key is one of the listed values.
#[derive(Debug, Clone, PartialEq)]
pub struct TableQuery {
    /// Table to read.
    pub table: Table,
    /// Column whose values are returned.
    pub key: &'static str,
    /// Conditions, combined with AND.
    pub conditions: Vec<Condition>,
    /// Optional restriction of the key column to an explicit id set.
    pub keys: Option<IdSet>,
}

impl TableQuery {
    /// Query every row of `table`, returning `key`.
    pub fn new(table: Table, key: &'static str) -> Self {
        Self {
            table,
            key,
            conditions: Vec::new(),
            keys: None,
        }
    }

    /// Add a condition.
    pub fn filter(mut self, condition: Condition) -> Self {
        self.conditions.push(condition);
        self
    }

    /// Restrict the key column to the given ids.
    pub fn keys_in(mut self, keys: impl IntoIterator<Item = RecordId>) -> Self {
        self.keys = Some(keys.into_iter().collect());
        self
    }

    /// Check a row against the conditions and key restriction.
    pub fn matches(&self, row: &Row) -> bool {
        if let Some(ref keys) = self.keys {
            let Some(key) = row.get(self.key).and_then(Value::as_int) else {
                return false;
            };
            if !keys.contains(&key) {
                return false;
            }
        }
        self.conditions.iter().all(|c| c.matches(row))
    }
}

/// Ordering applied by [`ContactStore::select_sorted`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortKey {
    /// Column to order by. Nulls sort last, ties break by ascending key.
    pub column: &'static str,
    /// Direction.
    pub order: SortOrder,
}

/// A single write.
#[derive(Debug, Clone, PartialEq)]
pub enum Mutation {
    /// Insert a full row.
    Insert {
        /// Target table.
        table: Table,
        /// Row values, one per schema column.
        row: Row,
    },
    /// Delete every row whose `column` equals `key`.
    Delete {
        /// Target table.
        table: Table,
        /// Column to match.
        column: &'static str,
        /// Value to match.
        key: RecordId,
    },
}

impl Mutation {
    /// Create an insert.
    pub fn insert(table: Table, row: Row) -> Self {
        Self::Insert { table, row }
    }

    /// Create a delete.
    pub fn delete(table: Table, column: &'static str, key: RecordId) -> Self {
        Self::Delete { table, column, key }
    }
}

/// A backing store for contacts, persons and address books.
///
/// Implementations must be safe to share between threads; every method
/// takes `&self` and performs its own locking.
pub trait ContactStore: Send + Sync {
    /// Distinct key values of the rows matching `query`.
    fn select_keys(&self, query: &TableQuery) -> QueryResult<IdSet>;

    /// Key values of the rows matching `query`, ordered by `sort`.
    ///
    /// A key appears once per matching row, so keys may repeat.
    fn select_sorted(&self, query: &TableQuery, sort: SortKey) -> QueryResult<Vec<RecordId>>;

    /// Every row of `table` whose `column` equals `key`, in insertion order.
    fn fetch(&self, table: Table, column: &'static str, key: RecordId) -> QueryResult<Vec<Row>>;

    /// Apply a batch of writes atomically.
    fn apply(&self, mutations: Vec<Mutation>) -> QueryResult<()>;

    /// Allocate a fresh id for a table with a primary key.
    fn next_id(&self, table: Table) -> QueryResult<RecordId>;
}

impl<S: ContactStore + ?Sized> ContactStore for std::sync::Arc<S> {
    fn select_keys(&self, query: &TableQuery) -> QueryResult<IdSet> {
        (**self).select_keys(query)
    }

    fn select_sorted(&self, query: &TableQuery, sort: SortKey) -> QueryResult<Vec<RecordId>> {
        (**self).select_sorted(query, sort)
    }

    fn fetch(&self, table: Table, column: &'static str, key: RecordId) -> QueryResult<Vec<Row>> {
        (**self).fetch(table, column, key)
    }

    fn apply(&self, mutations: Vec<Mutation>) -> QueryResult<()> {
        (**self).apply(mutations)
    }

    fn next_id(&self, table: Table) -> QueryResult<RecordId> {
        (**self).next_id(table)
    }
}
