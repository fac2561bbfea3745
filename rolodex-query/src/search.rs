//! The search engine behind every `find()`.
//!
//! Evaluation happens in three steps:
//!
//! 1. Every attribute name in the filter and sort mode is resolved against the
//!    registry, so an unknown name fails before the store sees a query.
//! 2. The filter tree is evaluated recursively. Each leaf predicate becomes one
//!    [`TableQuery`] against the table named by its attribute descriptor and
//!    yields the set of matching record ids; each composite folds the sets of
//!    its children by intersection or union.
//! 3. The resulting id set (or every record, when unfiltered) is ordered,
//!    either by id or by a sort attribute.
//!
//! Some predicates cannot be evaluated at all: filters on multi-value
//! enumeration attributes such as `phoneNumbers.types`, and range filters
//! with neither bound. They do not fail; they make the whole result empty,
//! whatever composite they are nested in.
//!
//! ```rust
//! use std::sync::Arc;
//! use rolodex_query::{AttributeRegistry, FilterNode, MemoryStore, SearchEngine};
//!
//! let engine = SearchEngine::new(Arc::new(AttributeRegistry::contacts()), MemoryStore::new());
//! let ids = engine.find(Some(&FilterNode::exactly("isFavorite", true)), None).unwrap();
//! assert!(ids.is_empty());
//! ```

use std::sync::Arc;

use serde_json::Value as JsonValue;
use tracing::{debug, warn};

use crate::attributes::{Attribute, AttributeDescriptor, AttributeRegistry, PrimitiveKind};
use crate::convert::to_store_value;
use crate::error::{QueryError, QueryResult};
use crate::filter::{CompositeType, FilterNode, MatchFlag};
use crate::store::{Comparison, Condition, ContactStore, SortKey, TableQuery};
use crate::types::{IdSet, RecordId, SortMode, Value};

/// Result of evaluating one filter node.
#[derive(Debug, Clone, PartialEq)]
enum Selection {
    /// The node places no constraint (an `id` EXISTS filter).
    Skip,
    /// The node matched exactly these ids.
    Ids(IdSet),
    /// The node cannot be evaluated; the whole result must be empty.
    Rejected,
}

/// Evaluates filters and sort modes against a store.
#[derive(Debug, Clone)]
pub struct SearchEngine<S> {
    registry: Arc<AttributeRegistry>,
    store: S,
}

impl<S: ContactStore> SearchEngine<S> {
    /// Create an engine over `store`, resolving attributes with `registry`.
    pub fn new(registry: Arc<AttributeRegistry>, store: S) -> Self {
        Self { registry, store }
    }

    /// The attribute registry.
    pub fn registry(&self) -> &AttributeRegistry {
        &self.registry
    }

    /// The backing store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Find the ids of the records matching `filter`, ordered by `sort`.
    ///
    /// Without a filter every record matches. Without a sort mode ids are
    /// returned in ascending order. Every matching record appears once.
    pub fn find(
        &self,
        filter: Option<&FilterNode>,
        sort: Option<&SortMode>,
    ) -> QueryResult<Vec<RecordId>> {
        if let Some(filter) = filter {
            self.check_attributes(filter)?;
        }
        let sort_key = sort.map(|mode| self.resolve_sort(mode)).transpose()?;

        let filtered = match filter {
            Some(filter) => self.evaluate(filter)?,
            None => None,
        };

        let ids = self.order(filtered, sort_key)?;
        debug!(primary = %self.registry.primary(), results = ids.len(), "SearchEngine::find()");
        Ok(ids)
    }

    /// Like [`find`](Self::find), taking the filter and sort mode as JSON.
    ///
    /// Either may be `null`.
    pub fn find_json(&self, filter: &JsonValue, sort: &JsonValue) -> QueryResult<Vec<RecordId>> {
        let filter = FilterNode::from_optional_json(filter)?;
        let sort = SortMode::from_json(sort)?;
        self.find(filter.as_ref(), sort.as_ref())
    }

    /// Evaluate a filter to the set of matching ids.
    ///
    /// Returns `None` when the filter places no constraint at all.
    pub fn evaluate(&self, filter: &FilterNode) -> QueryResult<Option<IdSet>> {
        self.check_attributes(filter)?;
        Ok(match self.visit(filter)? {
            Selection::Skip => None,
            Selection::Ids(ids) => Some(ids),
            Selection::Rejected => Some(IdSet::new()),
        })
    }

    fn check_attributes(&self, filter: &FilterNode) -> QueryResult<()> {
        for name in filter.attribute_names() {
            self.registry.lookup(name)?;
        }
        Ok(())
    }

    fn visit(&self, node: &FilterNode) -> QueryResult<Selection> {
        match node {
            FilterNode::Attribute {
                attribute_name,
                match_flag,
                match_value,
            } => self.visit_attribute(attribute_name, *match_flag, match_value.as_ref()),
            FilterNode::Range {
                attribute_name,
                initial_value,
                end_value,
            } => self.visit_range(attribute_name, initial_value.as_ref(), end_value.as_ref()),
            FilterNode::Composite { kind, filters } => {
                let mut children = Vec::with_capacity(filters.len());
                let mut skipped = 0;
                for child in filters {
                    match self.visit(child)? {
                        Selection::Ids(ids) => children.push(ids),
                        Selection::Skip => skipped += 1,
                        Selection::Rejected => return Ok(Selection::Rejected),
                    }
                }

                if children.is_empty() && skipped > 0 {
                    return Ok(Selection::Skip);
                }
                Ok(Selection::Ids(combine(*kind, children)))
            }
        }
    }

    fn visit_attribute(
        &self,
        name: &str,
        flag: MatchFlag,
        value: Option<&JsonValue>,
    ) -> QueryResult<Selection> {
        let descriptor = match self.registry.lookup(name)? {
            Attribute::Unsupported => {
                warn!(attribute = name, "Filter on unsupported attribute, result is empty");
                return Ok(Selection::Rejected);
            }
            Attribute::Id(descriptor) => return id_selection(descriptor, flag, value),
            Attribute::Supported(descriptor) => descriptor,
        };

        let condition = predicate(name, descriptor, flag, value)?;
        let mut query = TableQuery::new(descriptor.table, descriptor.join_key).filter(condition);
        if let Some(ref d) = descriptor.discriminator {
            query = query.filter(Condition::eq(d.column, d.value.clone()));
        }

        let ids = self.store.select_keys(&query)?;
        debug!(attribute = name, flag = %flag, matched = ids.len(), "Attribute filter evaluated");
        Ok(Selection::Ids(ids))
    }

    fn visit_range(
        &self,
        name: &str,
        initial: Option<&JsonValue>,
        end: Option<&JsonValue>,
    ) -> QueryResult<Selection> {
        let descriptor = match self.registry.lookup(name)? {
            Attribute::Unsupported => {
                warn!(attribute = name, "Range on unsupported attribute, result is empty");
                return Ok(Selection::Rejected);
            }
            Attribute::Id(descriptor) | Attribute::Supported(descriptor) => descriptor,
        };

        if initial.is_none() && end.is_none() {
            warn!(attribute = name, "Range filter without bounds, result is empty");
            return Ok(Selection::Rejected);
        }

        let mut query = TableQuery::new(descriptor.table, descriptor.join_key);
        if let Some(initial) = initial {
            let value = to_store_value(descriptor, initial)?;
            query = query.filter(Condition::new(descriptor.column, Comparison::Gte, value));
        }
        if let Some(end) = end {
            let value = to_store_value(descriptor, end)?;
            query = query.filter(Condition::new(descriptor.column, Comparison::Lte, value));
        }
        if let Some(ref d) = descriptor.discriminator {
            query = query.filter(Condition::eq(d.column, d.value.clone()));
        }

        let ids = self.store.select_keys(&query)?;
        debug!(attribute = name, matched = ids.len(), "Range filter evaluated");
        Ok(Selection::Ids(ids))
    }

    fn resolve_sort(&self, mode: &SortMode) -> QueryResult<(AttributeDescriptor, SortKey)> {
        match self.registry.lookup(&mode.attribute_name)? {
            Attribute::Unsupported => Err(QueryError::invalid_values(format!(
                "Cannot sort by {}",
                mode.attribute_name
            ))
            .with_attribute(&mode.attribute_name)),
            Attribute::Id(descriptor) | Attribute::Supported(descriptor) => Ok((
                descriptor.clone(),
                SortKey {
                    column: descriptor.column,
                    order: mode.order,
                },
            )),
        }
    }

    fn order(
        &self,
        filtered: Option<IdSet>,
        sort: Option<(AttributeDescriptor, SortKey)>,
    ) -> QueryResult<Vec<RecordId>> {
        if filtered.as_ref().is_some_and(IdSet::is_empty) {
            return Ok(Vec::new());
        }

        let restrict = filtered.map(|ids| {
            let mut ids: Vec<RecordId> = ids.into_iter().collect();
            ids.sort_unstable();
            ids
        });

        let mut primary = TableQuery::new(self.registry.primary(), "id");
        if let Some(ref ids) = restrict {
            primary = primary.keys_in(ids.iter().copied());
        }
        let mut records: Vec<RecordId> = self.store.select_keys(&primary)?.into_iter().collect();
        records.sort_unstable();

        let Some((descriptor, key)) = sort else {
            return Ok(records);
        };

        let mut query = TableQuery::new(descriptor.table, descriptor.join_key);
        if let Some(ref d) = descriptor.discriminator {
            query = query.filter(Condition::eq(d.column, d.value.clone()));
        }
        if let Some(ids) = restrict {
            query = query.keys_in(ids);
        }

        let existing: IdSet = records.iter().copied().collect();
        let mut seen = IdSet::with_capacity(existing.len());
        let mut ordered = Vec::with_capacity(existing.len());
        for id in self.store.select_sorted(&query, key)? {
            if existing.contains(&id) && seen.insert(id) {
                ordered.push(id);
            }
        }

        // Records without a value for the sort attribute go last.
        ordered.extend(records.into_iter().filter(|id| !seen.contains(id)));
        Ok(ordered)
    }
}

/// Translate an attribute filter into a column condition.
fn predicate(
    name: &str,
    descriptor: &AttributeDescriptor,
    flag: MatchFlag,
    value: Option<&JsonValue>,
) -> QueryResult<Condition> {
    let column = descriptor.column;
    let required = || {
        let json = value.ok_or_else(|| {
            QueryError::invalid_values(format!("matchValue is required for {}", flag))
                .with_attribute(name)
        })?;
        to_store_value(descriptor, json)
    };

    Ok(match descriptor.kind {
        // EXISTS on a boolean means "is true".
        PrimitiveKind::Boolean => match flag {
            MatchFlag::Exists => Condition::eq(column, true),
            _ => Condition::eq(column, required()?),
        },
        PrimitiveKind::String => match flag {
            MatchFlag::Exists => Condition::new(column, Comparison::Exists, ""),
            MatchFlag::Exactly => Condition::new(column, Comparison::Equals, required()?),
            MatchFlag::Fullstring => {
                Condition::new(column, Comparison::EqualsIgnoreCase, required()?)
            }
            MatchFlag::Contains => Condition::new(column, Comparison::Contains, required()?),
            MatchFlag::Startswith => Condition::new(column, Comparison::StartsWith, required()?),
            MatchFlag::Endswith => Condition::new(column, Comparison::EndsWith, required()?),
        },
        // Numbers have no prefix or substring; STARTSWITH and CONTAINS are
        // lower bounds and ENDSWITH an upper bound.
        PrimitiveKind::Long => match flag {
            MatchFlag::Exists => Condition::new(column, Comparison::Gte, 0),
            MatchFlag::Startswith | MatchFlag::Contains => {
                Condition::new(column, Comparison::Gte, required()?)
            }
            MatchFlag::Endswith => Condition::new(column, Comparison::Lte, required()?),
            MatchFlag::Exactly | MatchFlag::Fullstring => {
                Condition::new(column, Comparison::Equals, required()?)
            }
        },
    })
}

/// Filters on `id` name their result directly.
fn id_selection(
    descriptor: &AttributeDescriptor,
    flag: MatchFlag,
    value: Option<&JsonValue>,
) -> QueryResult<Selection> {
    if flag == MatchFlag::Exists {
        return Ok(Selection::Skip);
    }
    let json = value.ok_or_else(|| {
        QueryError::invalid_values("matchValue is required for id").with_attribute("id")
    })?;
    let id = match to_store_value(descriptor, json)? {
        Value::Int(id) if id >= 0 => id,
        _ => {
            return Err(
                QueryError::invalid_values(format!("Invalid id: {}", json)).with_attribute("id")
            );
        }
    };
    Ok(Selection::Ids(IdSet::from_iter([id])))
}

/// Fold child id sets into one.
///
/// Zero children combine to the empty set for both kinds.
fn combine(kind: CompositeType, mut sets: Vec<IdSet>) -> IdSet {
    match sets.len() {
        0 => IdSet::new(),
        1 => sets.pop().unwrap_or_default(),
        _ => match kind {
            CompositeType::Intersection => {
                let pivot = sets
                    .iter()
                    .enumerate()
                    .min_by_key(|(_, set)| set.len())
                    .map(|(i, _)| i)
                    .unwrap_or(0);
                let smallest = sets.swap_remove(pivot);
                smallest
                    .into_iter()
                    .filter(|id| sets.iter().all(|other| other.contains(id)))
                    .collect()
            }
            CompositeType::Union => sets.into_iter().flatten().collect(),
        },
    }
}
