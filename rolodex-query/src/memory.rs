//! In-memory [`ContactStore`].
//!
//! Tables are plain vectors of rows behind a single `RwLock`, so concurrent
//! searches share the lock and writes are serialized.
//!
//! ```rust
//! use rolodex_query::memory::MemoryStore;
//! use rolodex_query::schema::Table;
//! use rolodex_query::store::{ContactStore, TableQuery};
//!
//! let store = MemoryStore::new();
//! let ids = store.select_keys(&TableQuery::new(Table::Contacts, "id")).unwrap();
//! assert!(ids.is_empty());
//! ```

use std::cmp::Ordering;
use std::collections::HashMap;

use parking_lot::RwLock;
use tracing::{debug, info};

use crate::error::{QueryError, QueryResult};
use crate::schema::Table;
use crate::store::{ContactStore, Mutation, SortKey, TableQuery};
use crate::types::{IdSet, RecordId, Row, Value};

#[derive(Debug, Default)]
struct Tables {
    rows: HashMap<Table, Vec<Row>>,
    sequences: HashMap<Table, RecordId>,
}

impl Tables {
    fn rows(&self, table: Table) -> &[Row] {
        self.rows.get(&table).map(Vec::as_slice).unwrap_or(&[])
    }
}

/// A [`ContactStore`] holding every table in memory.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        info!("MemoryStore initialized");
        Self::default()
    }

    /// Number of rows currently held in `table`.
    pub fn row_count(&self, table: Table) -> usize {
        self.tables.read().rows(table).len()
    }
}

fn validate(table: Table, row: &Row) -> QueryResult<()> {
    for column in row.keys() {
        if table.column(column).is_none() {
            return Err(QueryError::storage(format!(
                "Table {} has no column {}",
                table, column
            )));
        }
    }
    Ok(())
}

/// Order two cells: nulls last, otherwise by value in the given direction.
fn compare_cells(a: &Value, b: &Value, ascending: bool) -> Ordering {
    match (a.is_null(), b.is_null()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => {
            let ord = a.compare(b).unwrap_or(Ordering::Equal);
            if ascending { ord } else { ord.reverse() }
        }
    }
}

impl ContactStore for MemoryStore {
    fn select_keys(&self, query: &TableQuery) -> QueryResult<IdSet> {
        let tables = self.tables.read();
        let keys: IdSet = tables
            .rows(query.table)
            .iter()
            .filter(|row| query.matches(row))
            .filter_map(|row| row.get(query.key).and_then(Value::as_int))
            .collect();

        debug!(table = %query.table, conditions = query.conditions.len(), matched = keys.len(), "MemoryStore::select_keys()");
        Ok(keys)
    }

    fn select_sorted(&self, query: &TableQuery, sort: SortKey) -> QueryResult<Vec<RecordId>> {
        let tables = self.tables.read();
        let mut matched: Vec<(RecordId, &Value)> = tables
            .rows(query.table)
            .iter()
            .filter(|row| query.matches(row))
            .filter_map(|row| {
                let key = row.get(query.key).and_then(Value::as_int)?;
                Some((key, row.get(sort.column).unwrap_or(&Value::Null)))
            })
            .collect();

        let ascending = sort.order.is_ascending();
        matched.sort_by(|(ka, va), (kb, vb)| {
            compare_cells(va, vb, ascending).then_with(|| ka.cmp(kb))
        });

        debug!(table = %query.table, column = sort.column, order = %sort.order, rows = matched.len(), "MemoryStore::select_sorted()");
        Ok(matched.into_iter().map(|(key, _)| key).collect())
    }

    fn fetch(&self, table: Table, column: &'static str, key: RecordId) -> QueryResult<Vec<Row>> {
        let tables = self.tables.read();
        Ok(tables
            .rows(table)
            .iter()
            .filter(|row| row.get(column).and_then(Value::as_int) == Some(key))
            .cloned()
            .collect())
    }

    fn apply(&self, mutations: Vec<Mutation>) -> QueryResult<()> {
        for mutation in &mutations {
            if let Mutation::Insert { table, row } = mutation {
                validate(*table, row)?;
            }
        }

        let mut tables = self.tables.write();
        let count = mutations.len();
        for mutation in mutations {
            match mutation {
                Mutation::Insert { table, row } => {
                    if table.has_primary_key() {
                        if let Some(id) = row.get("id").and_then(Value::as_int) {
                            let seq = tables.sequences.entry(table).or_insert(0);
                            *seq = (*seq).max(id);
                        }
                    }
                    tables.rows.entry(table).or_default().push(row);
                }
                Mutation::Delete { table, column, key } => {
                    if let Some(rows) = tables.rows.get_mut(&table) {
                        rows.retain(|row| row.get(column).and_then(Value::as_int) != Some(key));
                    }
                }
            }
        }

        debug!(mutations = count, "MemoryStore::apply()");
        Ok(())
    }

    fn next_id(&self, table: Table) -> QueryResult<RecordId> {
        if !table.has_primary_key() {
            return Err(QueryError::storage(format!("Table {} has no id column", table)));
        }
        let mut tables = self.tables.write();
        let seq = tables.sequences.entry(table).or_insert(0);
        *seq += 1;
        Ok(*seq)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::Condition;
    use crate::types::SortOrder;
    use pretty_assertions::assert_eq;

    fn number(contact_id: i64, number: Option<&str>) -> Mutation {
        let mut row = Row::new();
        row.insert("contact_id", contact_id.into());
        row.insert("number", number.into());
        Mutation::insert(Table::Numbers, row)
    }

    #[test]
    fn test_select_keys_deduplicates() {
        let store = MemoryStore::new();
        store
            .apply(vec![
                number(1, Some("100")),
                number(1, Some("101")),
                number(2, Some("200")),
            ])
            .unwrap();

        let keys = store
            .select_keys(&TableQuery::new(Table::Numbers, "contact_id"))
            .unwrap();
        assert_eq!(keys.into_iter().collect::<Vec<_>>(), vec![1, 2]);
    }

    #[test]
    fn test_select_sorted_puts_nulls_last() {
        let store = MemoryStore::new();
        store
            .apply(vec![
                number(3, None),
                number(1, Some("300")),
                number(2, Some("100")),
                number(1, Some("050")),
            ])
            .unwrap();

        let query = TableQuery::new(Table::Numbers, "contact_id");
        let asc = store
            .select_sorted(&query, SortKey { column: "number", order: SortOrder::Asc })
            .unwrap();
        assert_eq!(asc, vec![1, 2, 1, 3]);

        let desc = store
            .select_sorted(&query, SortKey { column: "number", order: SortOrder::Desc })
            .unwrap();
        assert_eq!(desc, vec![1, 2, 1, 3]);
    }

    #[test]
    fn test_delete_and_fetch() {
        let store = MemoryStore::new();
        store
            .apply(vec![number(1, Some("100")), number(2, Some("200"))])
            .unwrap();
        store
            .apply(vec![Mutation::delete(Table::Numbers, "contact_id", 1)])
            .unwrap();

        assert!(store.fetch(Table::Numbers, "contact_id", 1).unwrap().is_empty());
        assert_eq!(store.fetch(Table::Numbers, "contact_id", 2).unwrap().len(), 1);
        assert_eq!(store.row_count(Table::Numbers), 1);
    }

    #[test]
    fn test_next_id_follows_inserted_ids() {
        let store = MemoryStore::new();
        let mut row = Row::new();
        row.insert("id", Value::Int(41));
        store.apply(vec![Mutation::insert(Table::Contacts, row)]).unwrap();

        assert_eq!(store.next_id(Table::Contacts).unwrap(), 42);
        assert_eq!(store.next_id(Table::Persons).unwrap(), 1);
        assert!(store.next_id(Table::Numbers).is_err());
    }

    #[test]
    fn test_unknown_column_rejects_whole_batch() {
        let store = MemoryStore::new();
        let mut bad = Row::new();
        bad.insert("nope", Value::Int(1));

        let err = store
            .apply(vec![number(1, Some("100")), Mutation::insert(Table::Numbers, bad)])
            .unwrap_err();
        assert!(err.is_storage_error());
        assert_eq!(store.row_count(Table::Numbers), 0);
    }

    #[test]
    fn test_conditions_filter_rows() {
        let store = MemoryStore::new();
        store
            .apply(vec![number(1, Some("+33 1")), number(2, Some("+39 2"))])
            .unwrap();

        let query = TableQuery::new(Table::Numbers, "contact_id")
            .filter(Condition::new("number", crate::store::Comparison::StartsWith, "+33"));
        let keys = store.select_keys(&query).unwrap();
        assert_eq!(keys.into_iter().collect::<Vec<_>>(), vec![1]);
    }
}
