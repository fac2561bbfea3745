//! SQLite contact store for Rolodex.
//!
//! This crate provides [`SqliteStore`], a [`ContactStore`] implementation
//! on a single `rusqlite` connection. The schema is created on open, so a
//! new file or `:memory:` database is ready to use.
//!
//! # Example
//!
//! ```rust
//! use rolodex_query::{ContactManager, FilterNode};
//! use rolodex_query::records::{Contact, ContactAddress};
//! use rolodex_sqlite::{SqliteConfig, SqliteStore};
//!
//! let store = SqliteStore::open(SqliteConfig::from_url("sqlite::memory:").unwrap()).unwrap();
//! let manager = ContactManager::open(store).unwrap();
//!
//! let book = manager.default_address_book().unwrap();
//! book.add(Contact {
//!     addresses: vec![ContactAddress::in_city("Rome")],
//!     ..Default::default()
//! })
//! .unwrap();
//!
//! let ids = book
//!     .find_ids(Some(&FilterNode::exactly("addresses.city", "Rome")), None)
//!     .unwrap();
//! assert_eq!(ids.len(), 1);
//! ```
//!
//! [`ContactStore`]: rolodex_query::ContactStore

pub mod config;
pub mod error;
pub mod store;

pub use config::{DatabasePath, JournalMode, SqliteConfig, SynchronousMode};
pub use error::{SqliteError, SqliteResult};
pub use store::{SqliteStore, schema_sql, sqlite_version};
