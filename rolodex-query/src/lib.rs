//! # rolodex-query
//!
//! Filter evaluation and address-book core for Rolodex.
//!
//! This crate provides:
//! - The filter model sent by clients (`AttributeFilter`, `AttributeRangeFilter`,
//!   `CompositeFilter`) and its JSON parser
//! - Attribute registries mapping dotted attribute names to storage
//! - The [`ContactStore`] abstraction and an in-memory implementation
//! - The [`SearchEngine`] evaluating filters and sort modes to ordered ids
//! - Contact, person and address book records with CRUD through
//!   [`ContactManager`] and [`AddressBook`]
//!
//! ## Filters
//!
//! Filters arrive as JSON and parse to a [`FilterNode`]:
//!
//! ```rust
//! use rolodex_query::{FilterNode, MatchFlag};
//! use serde_json::json;
//!
//! let filter = FilterNode::from_json(&json!({
//!     "filterType": "CompositeFilter",
//!     "type": "INTERSECTION",
//!     "filters": [
//!         {"filterType": "AttributeFilter", "attributeName": "isFavorite", "matchFlag": "EXISTS"},
//!         {"filterType": "AttributeFilter", "attributeName": "addresses.city",
//!          "matchFlag": "FULLSTRING", "matchValue": "paris"}
//!     ]
//! }))
//! .unwrap();
//!
//! assert_eq!(filter.attribute_names(), vec!["isFavorite", "addresses.city"]);
//!
//! // Or built directly
//! let same = FilterNode::intersection([
//!     FilterNode::exists("isFavorite"),
//!     FilterNode::attribute("addresses.city", MatchFlag::Fullstring, Some(json!("paris"))),
//! ]);
//! assert_eq!(filter, same);
//! ```
//!
//! ## Searching
//!
//! ```rust
//! use rolodex_query::{ContactManager, FilterNode, MemoryStore, SortMode};
//! use rolodex_query::records::{Contact, ContactAddress};
//!
//! let manager = ContactManager::open(MemoryStore::new()).unwrap();
//! let book = manager.default_address_book().unwrap();
//! book.add(Contact {
//!     is_favorite: true,
//!     addresses: vec![ContactAddress::in_city("Paris")],
//!     ..Default::default()
//! })
//! .unwrap();
//!
//! let found = book
//!     .find(Some(&FilterNode::exactly("addresses.city", "Paris")), Some(&SortMode::asc("id")))
//!     .unwrap();
//! assert_eq!(found.len(), 1);
//! ```
//!
//! ## Error Handling
//!
//! ```rust
//! use rolodex_query::{ErrorCode, QueryError};
//!
//! let err = QueryError::not_found("Contact", 7);
//! assert_eq!(err.code, ErrorCode::NotFound);
//! assert_eq!(err.code.name(), "NotFoundError");
//! ```

pub mod address_book;
pub mod attributes;
pub mod convert;
pub mod error;
pub mod filter;
pub mod logging;
pub mod manager;
mod mapping;
pub mod memory;
mod person;
pub mod records;
pub mod schema;
pub mod search;
pub mod store;
pub mod types;

pub use address_book::{AddressBook, DEFAULT_ADDRESS_BOOK_ID};
pub use attributes::{
    Attribute, AttributeDescriptor, AttributeRegistry, AttributeRegistryBuilder, PrimitiveKind,
    ValueFormat,
};
pub use error::{ErrorCode, ErrorContext, QueryError, QueryResult};
pub use filter::{CompositeType, FilterNode, MatchFlag};
pub use manager::ContactManager;
pub use memory::MemoryStore;
pub use records::{AddressBookInfo, Contact, Person};
pub use schema::Table;
pub use search::SearchEngine;
pub use store::{Comparison, Condition, ContactStore, Mutation, SortKey, TableQuery};
pub use types::{IdSet, RecordId, Row, SortMode, SortOrder, Value};

// Re-export logging utilities
pub use logging::{LogFormat, init as init_logging, init_with as init_logging_with};

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::error::{QueryError, QueryResult};
    pub use crate::filter::{CompositeType, FilterNode, MatchFlag};
    pub use crate::manager::ContactManager;
    pub use crate::records::{Contact, Person};
    pub use crate::store::ContactStore;
    pub use crate::types::{SortMode, SortOrder};
}
