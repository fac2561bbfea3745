//! Filter trees sent by clients, and the visitor that parses them.
//!
//! A filter arrives as untyped JSON:
//!
//! ```json
//! {
//!   "filterType": "CompositeFilter",
//!   "type": "INTERSECTION",
//!   "filters": [
//!     { "filterType": "AttributeFilter", "attributeName": "isFavorite",
//!       "matchFlag": "EXACTLY", "matchValue": true },
//!     { "filterType": "AttributeRangeFilter", "attributeName": "birthday",
//!       "initialValue": "1980-01-01", "endValue": null }
//!   ]
//! }
//! ```
//!
//! [`FilterNode::from_json`] walks that tree once and produces a typed
//! [`FilterNode`]. Attribute names and match values stay unresolved here; the
//! search engine checks them against its registry.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};

use crate::error::{QueryError, QueryResult};

/// How an attribute filter compares the stored value with the match value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum MatchFlag {
    /// Exact, case-sensitive equality.
    #[default]
    Exactly,
    /// Case-insensitive equality.
    Fullstring,
    /// Case-insensitive substring.
    Contains,
    /// Case-insensitive prefix.
    Startswith,
    /// Case-insensitive suffix.
    Endswith,
    /// The attribute has a value.
    Exists,
}

impl MatchFlag {
    /// Parse a match flag from its wire name.
    pub fn parse(s: &str) -> QueryResult<Self> {
        match s {
            "EXACTLY" => Ok(Self::Exactly),
            "FULLSTRING" => Ok(Self::Fullstring),
            "CONTAINS" => Ok(Self::Contains),
            "STARTSWITH" => Ok(Self::Startswith),
            "ENDSWITH" => Ok(Self::Endswith),
            "EXISTS" => Ok(Self::Exists),
            other => Err(QueryError::invalid_values(format!(
                "Unknown match flag: {}",
                other
            ))),
        }
    }

    /// The wire name of this flag.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Exactly => "EXACTLY",
            Self::Fullstring => "FULLSTRING",
            Self::Contains => "CONTAINS",
            Self::Startswith => "STARTSWITH",
            Self::Endswith => "ENDSWITH",
            Self::Exists => "EXISTS",
        }
    }
}

impl fmt::Display for MatchFlag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a composite filter combines its children.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum CompositeType {
    /// Records matching any child.
    Union,
    /// Records matching every child.
    Intersection,
}

impl CompositeType {
    /// Parse a composite type from its wire name.
    pub fn parse(s: &str) -> QueryResult<Self> {
        match s {
            "UNION" => Ok(Self::Union),
            "INTERSECTION" => Ok(Self::Intersection),
            other => Err(QueryError::invalid_values(format!(
                "Unknown composite filter type: {}",
                other
            ))),
        }
    }

    /// The wire name of this type.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Union => "UNION",
            Self::Intersection => "INTERSECTION",
        }
    }
}

impl fmt::Display for CompositeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A parsed filter tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "filterType")]
pub enum FilterNode {
    /// Compare one attribute with a value.
    #[serde(rename = "AttributeFilter", rename_all = "camelCase")]
    Attribute {
        /// Dotted attribute name.
        attribute_name: String,
        /// Comparison kind.
        match_flag: MatchFlag,
        /// Value to compare with; unused for [`MatchFlag::Exists`].
        match_value: Option<JsonValue>,
    },
    /// Bound one attribute from either or both sides.
    #[serde(rename = "AttributeRangeFilter", rename_all = "camelCase")]
    Range {
        /// Dotted attribute name.
        attribute_name: String,
        /// Inclusive lower bound, `None` when unbounded.
        initial_value: Option<JsonValue>,
        /// Inclusive upper bound, `None` when unbounded.
        end_value: Option<JsonValue>,
    },
    /// Combine child filters.
    #[serde(rename = "CompositeFilter")]
    Composite {
        /// Union or intersection.
        #[serde(rename = "type")]
        kind: CompositeType,
        /// Child filters, in client order.
        filters: Vec<FilterNode>,
    },
}

impl FilterNode {
    /// Create an attribute filter.
    pub fn attribute(
        attribute_name: impl Into<String>,
        match_flag: MatchFlag,
        match_value: Option<JsonValue>,
    ) -> Self {
        Self::Attribute {
            attribute_name: attribute_name.into(),
            match_flag,
            match_value: match_value.filter(|v| !v.is_null()),
        }
    }

    /// Create an exact-match attribute filter.
    pub fn exactly(attribute_name: impl Into<String>, value: impl Into<JsonValue>) -> Self {
        Self::attribute(attribute_name, MatchFlag::Exactly, Some(value.into()))
    }

    /// Create an EXISTS attribute filter.
    pub fn exists(attribute_name: impl Into<String>) -> Self {
        Self::attribute(attribute_name, MatchFlag::Exists, None)
    }

    /// Create a range filter.
    pub fn range(
        attribute_name: impl Into<String>,
        initial_value: Option<JsonValue>,
        end_value: Option<JsonValue>,
    ) -> Self {
        Self::Range {
            attribute_name: attribute_name.into(),
            initial_value: initial_value.filter(|v| !v.is_null()),
            end_value: end_value.filter(|v| !v.is_null()),
        }
    }

    /// Create a union of filters.
    pub fn union(filters: impl IntoIterator<Item = FilterNode>) -> Self {
        Self::Composite {
            kind: CompositeType::Union,
            filters: filters.into_iter().collect(),
        }
    }

    /// Create an intersection of filters.
    pub fn intersection(filters: impl IntoIterator<Item = FilterNode>) -> Self {
        Self::Composite {
            kind: CompositeType::Intersection,
            filters: filters.into_iter().collect(),
        }
    }

    /// Parse a filter tree from JSON.
    ///
    /// The first malformed node aborts the walk.
    pub fn from_json(json: &JsonValue) -> QueryResult<Self> {
        let obj = json
            .as_object()
            .ok_or_else(|| QueryError::type_mismatch("Filter must be an object"))?;

        let filter_type = obj
            .get("filterType")
            .and_then(JsonValue::as_str)
            .ok_or_else(|| QueryError::type_mismatch("Filter has no filterType"))?;

        match filter_type {
            "AttributeFilter" => visit_attribute(obj),
            "AttributeRangeFilter" => visit_range(obj),
            "CompositeFilter" => visit_composite(obj),
            other => Err(QueryError::invalid_values(format!(
                "Unknown filterType: {}",
                other
            ))),
        }
    }

    /// Parse an optional filter: `null` means "no filter".
    pub fn from_optional_json(json: &JsonValue) -> QueryResult<Option<Self>> {
        if json.is_null() {
            Ok(None)
        } else {
            Self::from_json(json).map(Some)
        }
    }

    /// Serialize this filter to its JSON wire form.
    pub fn to_json(&self) -> JsonValue {
        // Only string keys and JSON leaves; serialization cannot fail.
        serde_json::to_value(self).unwrap_or(JsonValue::Null)
    }

    /// Collect every attribute name referenced in this tree.
    pub fn attribute_names(&self) -> Vec<&str> {
        let mut names = Vec::new();
        self.collect_attribute_names(&mut names);
        names
    }

    fn collect_attribute_names<'a>(&'a self, names: &mut Vec<&'a str>) {
        match self {
            Self::Attribute { attribute_name, .. } | Self::Range { attribute_name, .. } => {
                names.push(attribute_name)
            }
            Self::Composite { filters, .. } => {
                for filter in filters {
                    filter.collect_attribute_names(names);
                }
            }
        }
    }
}

fn attribute_name(obj: &Map<String, JsonValue>) -> QueryResult<String> {
    obj.get("attributeName")
        .and_then(JsonValue::as_str)
        .map(str::to_string)
        .ok_or_else(|| QueryError::type_mismatch("attributeName must be a string"))
}

fn optional_value(obj: &Map<String, JsonValue>, key: &str) -> Option<JsonValue> {
    obj.get(key).filter(|v| !v.is_null()).cloned()
}

fn visit_attribute(obj: &Map<String, JsonValue>) -> QueryResult<FilterNode> {
    let attribute_name = attribute_name(obj)?;
    let match_flag = match obj.get("matchFlag") {
        None | Some(JsonValue::Null) => MatchFlag::default(),
        Some(JsonValue::String(s)) => MatchFlag::parse(s)?,
        Some(_) => return Err(QueryError::type_mismatch("matchFlag must be a string")),
    };

    Ok(FilterNode::Attribute {
        attribute_name,
        match_flag,
        match_value: optional_value(obj, "matchValue"),
    })
}

fn visit_range(obj: &Map<String, JsonValue>) -> QueryResult<FilterNode> {
    Ok(FilterNode::Range {
        attribute_name: attribute_name(obj)?,
        initial_value: optional_value(obj, "initialValue"),
        end_value: optional_value(obj, "endValue"),
    })
}

fn visit_composite(obj: &Map<String, JsonValue>) -> QueryResult<FilterNode> {
    let kind = obj
        .get("type")
        .and_then(JsonValue::as_str)
        .ok_or_else(|| QueryError::type_mismatch("CompositeFilter type must be a string"))
        .and_then(CompositeType::parse)?;

    let children = obj
        .get("filters")
        .and_then(JsonValue::as_array)
        .ok_or_else(|| QueryError::type_mismatch("CompositeFilter filters must be an array"))?;

    let filters = children
        .iter()
        .map(FilterNode::from_json)
        .collect::<QueryResult<Vec<_>>>()?;

    Ok(FilterNode::Composite { kind, filters })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_parse_attribute_filter() {
        let node = FilterNode::from_json(&json!({
            "filterType": "AttributeFilter",
            "attributeName": "name.firstName",
            "matchFlag": "STARTSWITH",
            "matchValue": "Jo"
        }))
        .unwrap();

        assert_eq!(
            node,
            FilterNode::attribute("name.firstName", MatchFlag::Startswith, Some(json!("Jo")))
        );
    }

    #[test]
    fn test_match_flag_defaults_to_exactly() {
        let node = FilterNode::from_json(&json!({
            "filterType": "AttributeFilter",
            "attributeName": "isFavorite",
            "matchValue": true
        }))
        .unwrap();

        assert_eq!(node, FilterNode::exactly("isFavorite", true));
    }

    #[test]
    fn test_parse_range_filter_with_null_bound() {
        let node = FilterNode::from_json(&json!({
            "filterType": "AttributeRangeFilter",
            "attributeName": "contactCount",
            "initialValue": 5,
            "endValue": null
        }))
        .unwrap();

        assert_eq!(node, FilterNode::range("contactCount", Some(json!(5)), None));
    }

    #[test]
    fn test_parse_nested_composite() {
        let node = FilterNode::from_json(&json!({
            "filterType": "CompositeFilter",
            "type": "UNION",
            "filters": [
                {"filterType": "AttributeFilter", "attributeName": "isFavorite",
                 "matchFlag": "EXISTS"},
                {"filterType": "CompositeFilter", "type": "INTERSECTION", "filters": []}
            ]
        }))
        .unwrap();

        assert_eq!(
            node,
            FilterNode::union([
                FilterNode::exists("isFavorite"),
                FilterNode::intersection(Vec::new()),
            ])
        );
        assert_eq!(node.attribute_names(), vec!["isFavorite"]);
    }

    #[test]
    fn test_non_object_is_type_mismatch() {
        let err = FilterNode::from_json(&json!([1, 2])).unwrap_err();
        assert_eq!(err.code, ErrorCode::TypeMismatch);
    }

    #[test]
    fn test_missing_filter_type_is_type_mismatch() {
        let err = FilterNode::from_json(&json!({"attributeName": "id"})).unwrap_err();
        assert_eq!(err.code, ErrorCode::TypeMismatch);
    }

    #[test]
    fn test_unknown_filter_type_is_invalid() {
        let err = FilterNode::from_json(&json!({"filterType": "NotFilter"})).unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidValues);
    }

    #[test]
    fn test_unknown_match_flag_is_invalid() {
        let err = FilterNode::from_json(&json!({
            "filterType": "AttributeFilter",
            "attributeName": "id",
            "matchFlag": "LIKE",
            "matchValue": 1
        }))
        .unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidValues);
    }

    #[test]
    fn test_unknown_composite_type_is_invalid() {
        let err = FilterNode::from_json(&json!({
            "filterType": "CompositeFilter",
            "type": "XOR",
            "filters": []
        }))
        .unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidValues);
    }

    #[test]
    fn test_child_failure_aborts_walk() {
        let err = FilterNode::from_json(&json!({
            "filterType": "CompositeFilter",
            "type": "UNION",
            "filters": [
                {"filterType": "AttributeFilter", "attributeName": "id", "matchValue": 1},
                "not a filter"
            ]
        }))
        .unwrap_err();
        assert_eq!(err.code, ErrorCode::TypeMismatch);
    }

    #[test]
    fn test_wire_form_round_trips_through_parser() {
        let node = FilterNode::intersection([
            FilterNode::exactly("addresses.city", "Paris"),
            FilterNode::range("birthday", Some(json!("1980-01-01")), None),
        ]);

        let wire = node.to_json();
        assert_eq!(wire["filterType"], "CompositeFilter");
        assert_eq!(wire["type"], "INTERSECTION");
        assert_eq!(FilterNode::from_json(&wire).unwrap(), node);
    }
}
