//! The contact manager: address books and persons over one store.

use std::sync::Arc;

use serde_json::Value as JsonValue;
use tracing::info;

use crate::address_book::{AddressBook, DEFAULT_ADDRESS_BOOK_ID, remove_address_book};
use crate::attributes::AttributeRegistry;
use crate::error::{QueryError, QueryResult};
use crate::filter::FilterNode;
use crate::mapping::{address_book_from_row, address_book_row, delete_contact, load_person};
use crate::person;
use crate::records::{AddressBookInfo, Person};
use crate::schema::Table;
use crate::search::SearchEngine;
use crate::store::{ContactStore, Mutation, TableQuery};
use crate::types::{RecordId, SortMode};

/// Name given to the default address book.
pub const DEFAULT_ADDRESS_BOOK_NAME: &str = "Default";

/// Entry point over a [`ContactStore`].
///
/// ```rust
/// use rolodex_query::{ContactManager, MemoryStore};
/// use rolodex_query::records::{Contact, ContactName};
///
/// let manager = ContactManager::open(MemoryStore::new()).unwrap();
/// let book = manager.default_address_book().unwrap();
/// let contact = book
///     .add(Contact { name: Some(ContactName::new("Ada", "Lovelace")), ..Default::default() })
///     .unwrap();
///
/// let person = manager.get(contact.person_id.unwrap()).unwrap();
/// assert_eq!(person.display_name.as_deref(), Some("Ada Lovelace"));
/// ```
#[derive(Debug)]
pub struct ContactManager<S> {
    store: Arc<S>,
    contacts: Arc<AttributeRegistry>,
    persons: SearchEngine<Arc<S>>,
}

impl<S: ContactStore> ContactManager<S> {
    /// Open a manager with the standard attribute registries.
    ///
    /// Creates the default address book when the store has none.
    pub fn open(store: S) -> QueryResult<Self> {
        Self::with_registries(
            Arc::new(store),
            Arc::new(AttributeRegistry::contacts()),
            Arc::new(AttributeRegistry::persons()),
        )
    }

    /// Open a manager with explicit registries.
    pub fn with_registries(
        store: Arc<S>,
        contacts: Arc<AttributeRegistry>,
        persons: Arc<AttributeRegistry>,
    ) -> QueryResult<Self> {
        if store
            .fetch(Table::AddressBooks, "id", DEFAULT_ADDRESS_BOOK_ID)?
            .is_empty()
        {
            let info = AddressBookInfo {
                name: DEFAULT_ADDRESS_BOOK_NAME.to_string(),
                ..Default::default()
            };
            store.apply(vec![Mutation::insert(
                Table::AddressBooks,
                address_book_row(&info, DEFAULT_ADDRESS_BOOK_ID),
            )])?;
            info!("Default address book created");
        }

        let persons = SearchEngine::new(persons, Arc::clone(&store));
        Ok(Self {
            store,
            contacts,
            persons,
        })
    }

    /// The backing store.
    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    // ==================== Address books ====================

    /// Every address book, by id.
    pub fn address_books(&self) -> QueryResult<Vec<AddressBookInfo>> {
        let mut ids: Vec<RecordId> = self
            .store
            .select_keys(&TableQuery::new(Table::AddressBooks, "id"))?
            .into_iter()
            .collect();
        ids.sort_unstable();

        let mut books = Vec::with_capacity(ids.len());
        for id in ids {
            books.extend(
                self.store
                    .fetch(Table::AddressBooks, "id", id)?
                    .first()
                    .map(address_book_from_row),
            );
        }
        Ok(books)
    }

    /// A handle on the address book with the given id.
    pub fn address_book(&self, id: RecordId) -> QueryResult<AddressBook<S>> {
        let info = self
            .store
            .fetch(Table::AddressBooks, "id", id)?
            .first()
            .map(address_book_from_row)
            .ok_or_else(|| QueryError::not_found("AddressBook", id))?;
        Ok(AddressBook::new(info, Arc::clone(&self.store), Arc::clone(&self.contacts)))
    }

    /// A handle on the default address book.
    pub fn default_address_book(&self) -> QueryResult<AddressBook<S>> {
        self.address_book(DEFAULT_ADDRESS_BOOK_ID)
    }

    /// A handle spanning every address book.
    pub fn unified_address_book(&self) -> AddressBook<S> {
        let info = AddressBookInfo {
            id: None,
            name: String::new(),
            account_id: None,
            read_only: false,
        };
        AddressBook::new(info, Arc::clone(&self.store), Arc::clone(&self.contacts))
    }

    /// Create an address book.
    pub fn add_address_book(&self, name: impl Into<String>) -> QueryResult<AddressBookInfo> {
        let mut info = AddressBookInfo {
            name: name.into(),
            ..Default::default()
        };
        let id = self.store.next_id(Table::AddressBooks)?;
        self.store.apply(vec![Mutation::insert(
            Table::AddressBooks,
            address_book_row(&info, id),
        )])?;
        info.id = Some(id);
        info!(address_book = id, name = %info.name, "Address book created");
        Ok(info)
    }

    /// Remove an address book and every contact in it.
    ///
    /// The default address book cannot be removed.
    pub fn remove_address_book(&self, id: RecordId) -> QueryResult<()> {
        if id == DEFAULT_ADDRESS_BOOK_ID {
            return Err(QueryError::invalid_values(
                "The default address book cannot be removed",
            ));
        }
        self.address_book(id)?;
        remove_address_book(&*self.store, id)?;
        info!(address_book = id, "Address book removed");
        Ok(())
    }

    // ==================== Persons ====================

    /// Get a person by id.
    pub fn get(&self, person_id: RecordId) -> QueryResult<Person> {
        load_person(&*self.store, person_id)?
            .ok_or_else(|| QueryError::not_found("Person", person_id))
    }

    /// Update a person's favorite flag and display contact.
    ///
    /// The favorite flag is written through to every linked contact. The
    /// display contact must be one of the person's contacts.
    pub fn update(&self, person: &Person) -> QueryResult<Person> {
        let existing = self.get(person.id)?;
        let linked = person::contact_ids(&*self.store, person.id)?;
        if !linked.contains(&person.display_contact_id) {
            return Err(QueryError::invalid_values(format!(
                "Contact {} is not linked to person {}",
                person.display_contact_id, person.id
            )));
        }

        if person.is_favorite != existing.is_favorite {
            person::propagate_favorite(&*self.store, person.id, person.is_favorite)?;
        }
        person::refresh(&*self.store, person.id, Some(person.display_contact_id))?
            .ok_or_else(|| QueryError::not_found("Person", person.id))
    }

    /// Remove a person and every contact linked to it.
    pub fn remove(&self, person_id: RecordId) -> QueryResult<()> {
        self.get(person_id)?;
        let mut mutations = Vec::new();
        for contact_id in person::contact_ids(&*self.store, person_id)? {
            mutations.extend(delete_contact(contact_id));
        }
        mutations.push(Mutation::delete(Table::Persons, "id", person_id));
        self.store.apply(mutations)?;
        info!(person_id, "Person removed");
        Ok(())
    }

    /// Find the ids of persons matching `filter`, ordered by `sort`.
    pub fn find_ids(
        &self,
        filter: Option<&FilterNode>,
        sort: Option<&SortMode>,
    ) -> QueryResult<Vec<RecordId>> {
        self.persons.find(filter, sort)
    }

    /// Find persons matching `filter`, ordered by `sort`.
    pub fn find(
        &self,
        filter: Option<&FilterNode>,
        sort: Option<&SortMode>,
    ) -> QueryResult<Vec<Person>> {
        let mut persons = Vec::new();
        for id in self.find_ids(filter, sort)? {
            persons.extend(load_person(&*self.store, id)?);
        }
        Ok(persons)
    }

    /// Like [`find`](Self::find), taking the filter and sort mode as JSON.
    pub fn find_json(&self, filter: &JsonValue, sort: &JsonValue) -> QueryResult<Vec<Person>> {
        let filter = FilterNode::from_optional_json(filter)?;
        let sort = SortMode::from_json(sort)?;
        self.find(filter.as_ref(), sort.as_ref())
    }

    /// Merge `other` into `person_id`: every contact of `other` is linked to
    /// `person_id` and `other` disappears.
    pub fn link(&self, person_id: RecordId, other: RecordId) -> QueryResult<Person> {
        if person_id == other {
            return Err(QueryError::invalid_values("Cannot link a person to itself"));
        }
        self.get(person_id)?;
        self.get(other)?;

        let moved = person::contact_ids(&*self.store, other)?;
        person::relink(&*self.store, &moved, person_id)?;
        person::refresh(&*self.store, other, None)?;
        info!(person_id, other, contacts = moved.len(), "Persons linked");
        person::refresh(&*self.store, person_id, None)?
            .ok_or_else(|| QueryError::not_found("Person", person_id))
    }

    /// Split `contact_id` off `person_id` into a new person, returned.
    ///
    /// A person's only contact cannot be unlinked.
    pub fn unlink(&self, person_id: RecordId, contact_id: RecordId) -> QueryResult<Person> {
        self.get(person_id)?;
        let linked = person::contact_ids(&*self.store, person_id)?;
        if !linked.contains(&contact_id) {
            return Err(QueryError::invalid_values(format!(
                "Contact {} is not linked to person {}",
                contact_id, person_id
            )));
        }
        if linked.len() == 1 {
            return Err(QueryError::invalid_values(format!(
                "Contact {} is the only contact of person {}",
                contact_id, person_id
            )));
        }

        let new_person = self.store.next_id(Table::Persons)?;
        person::relink(&*self.store, &[contact_id], new_person)?;
        person::refresh(&*self.store, person_id, None)?;
        info!(person_id, contact_id, new_person, "Contact unlinked");
        person::refresh(&*self.store, new_person, None)?
            .ok_or_else(|| QueryError::not_found("Person", new_person))
    }
}
