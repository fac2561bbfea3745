//! # Rolodex
//!
//! Contact and person search over pluggable address-book stores.
//!
//! Rolodex provides:
//! - A JSON filter language (attribute, range and composite filters) with
//!   sorting by any supported attribute
//! - Address books of contacts, grouped into persons
//! - An in-memory store and, with the `sqlite` feature, a SQLite store
//!
//! ## Quick Start
//!
//! ```rust
//! use rolodex::prelude::*;
//! use rolodex::records::ContactAddress;
//! use serde_json::json;
//!
//! let manager = ContactManager::open(MemoryStore::new()).unwrap();
//! let book = manager.default_address_book().unwrap();
//!
//! for city in ["Paris", "Rome", "Paris"] {
//!     book.add(Contact {
//!         addresses: vec![ContactAddress::in_city(city)],
//!         ..Default::default()
//!     })
//!     .unwrap();
//! }
//!
//! let in_paris = book
//!     .find_json(
//!         &json!({
//!             "filterType": "AttributeFilter",
//!             "attributeName": "addresses.city",
//!             "matchFlag": "EXACTLY",
//!             "matchValue": "Paris"
//!         }),
//!         &json!({"attributeName": "id", "order": "DESC"}),
//!     )
//!     .unwrap();
//!
//! let ids: Vec<_> = in_paris.iter().filter_map(|c| c.id).collect();
//! assert_eq!(ids, vec![3, 1]);
//! ```

#![cfg_attr(docsrs, feature(doc_cfg))]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub use rolodex_query::*;

/// SQLite store.
#[cfg(feature = "sqlite")]
#[cfg_attr(docsrs, doc(cfg(feature = "sqlite")))]
pub mod sqlite {
    pub use rolodex_sqlite::*;
}

#[cfg(feature = "sqlite")]
pub use rolodex_sqlite::{SqliteConfig, SqliteStore};

/// Prelude module for convenient imports.
pub mod prelude {
    pub use rolodex_query::prelude::*;
    pub use rolodex_query::{AddressBook, MemoryStore};

    #[cfg(feature = "sqlite")]
    pub use rolodex_sqlite::{SqliteConfig, SqliteStore};
}
