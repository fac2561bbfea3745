//! Address books: contact CRUD and search.
//!
//! An [`AddressBook`] is a cheap handle obtained from a
//! [`ContactManager`](crate::manager::ContactManager). A handle bound to one
//! address book only sees that book's contacts; the unified handle sees all
//! of them.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use indexmap::IndexSet;
use serde_json::Value as JsonValue;
use tracing::{debug, info};

use crate::attributes::AttributeRegistry;
use crate::error::{QueryError, QueryResult};
use crate::filter::FilterNode;
use crate::mapping::{delete_contact, insert_contact, load_contact, load_person};
use crate::person;
use crate::records::{AddressBookInfo, Contact};
use crate::schema::Table;
use crate::search::SearchEngine;
use crate::store::{ContactStore, Mutation};
use crate::types::{RecordId, SortMode};

/// Id of the address book created with every store.
pub const DEFAULT_ADDRESS_BOOK_ID: RecordId = 0;

/// A handle on one address book, or on all of them.
#[derive(Debug)]
pub struct AddressBook<S> {
    info: AddressBookInfo,
    store: Arc<S>,
    engine: SearchEngine<Arc<S>>,
}

impl<S: ContactStore> AddressBook<S> {
    pub(crate) fn new(info: AddressBookInfo, store: Arc<S>, registry: Arc<AttributeRegistry>) -> Self {
        let engine = SearchEngine::new(registry, Arc::clone(&store));
        Self { info, store, engine }
    }

    /// The address book's id, `None` for the unified address book.
    pub fn id(&self) -> Option<RecordId> {
        self.info.id
    }

    /// The address book's name.
    pub fn name(&self) -> &str {
        &self.info.name
    }

    /// Summary of this address book.
    pub fn info(&self) -> &AddressBookInfo {
        &self.info
    }

    /// Add a new contact and return it as stored.
    ///
    /// The contact must not have an id yet. When it names no person a new
    /// person is created for it.
    pub fn add(&self, contact: Contact) -> QueryResult<Contact> {
        let mut added = self.add_batch(vec![contact])?;
        added
            .pop()
            .ok_or_else(|| QueryError::storage("Added contact was not stored"))
    }

    /// Add several contacts in one atomic write.
    pub fn add_batch(&self, contacts: Vec<Contact>) -> QueryResult<Vec<Contact>> {
        let mut prepared = Vec::with_capacity(contacts.len());
        for contact in contacts {
            prepared.push(self.prepare_new(contact)?);
        }

        let mut mutations = Vec::new();
        for contact in &prepared {
            mutations.extend(insert_contact(contact)?);
        }
        self.store.apply(mutations)?;

        let ids: Vec<RecordId> = prepared.iter().filter_map(|c| c.id).collect();
        self.refresh_persons(prepared.iter().filter_map(|c| c.person_id))?;
        info!(address_book = ?self.info.id, count = ids.len(), "Contacts added");

        ids.into_iter().map(|id| self.get(id)).collect()
    }

    /// Get a contact by id.
    pub fn get(&self, id: RecordId) -> QueryResult<Contact> {
        load_contact(&*self.store, id)?
            .filter(|contact| self.owns(contact))
            .ok_or_else(|| QueryError::not_found("Contact", id))
    }

    /// Replace a stored contact and return it as stored.
    ///
    /// Contacts cannot move between address books. Naming another person
    /// relinks the contact to it.
    pub fn update(&self, mut contact: Contact) -> QueryResult<Contact> {
        self.check_writable()?;
        let id = contact
            .id
            .ok_or_else(|| QueryError::invalid_values("Contact to update has no id"))?;
        let existing = self.get(id)?;

        if contact.address_book_id.is_some() && contact.address_book_id != existing.address_book_id
        {
            return Err(QueryError::invalid_values(format!(
                "Contact {} belongs to another address book",
                id
            )));
        }
        let old_person = existing.person_id;
        let new_person = contact.person_id.or(old_person);
        if new_person != old_person {
            if let Some(person_id) = new_person {
                self.check_person(person_id)?;
            }
        }

        contact.address_book_id = existing.address_book_id;
        contact.person_id = new_person;
        contact.last_updated = now();

        let mut mutations = delete_contact(id);
        mutations.extend(insert_contact(&contact)?);
        self.store.apply(mutations)?;

        self.refresh_persons(old_person.into_iter().chain(new_person))?;
        debug!(contact_id = id, "Contact updated");
        self.get(id)
    }

    /// Remove a contact.
    pub fn remove(&self, id: RecordId) -> QueryResult<()> {
        self.remove_batch(&[id])
    }

    /// Remove several contacts in one atomic write.
    ///
    /// Fails without removing anything when one of the ids is unknown.
    pub fn remove_batch(&self, ids: &[RecordId]) -> QueryResult<()> {
        self.check_writable()?;
        let mut persons = Vec::with_capacity(ids.len());
        for id in ids {
            persons.extend(self.get(*id)?.person_id);
        }

        self.store
            .apply(ids.iter().flat_map(|id| delete_contact(*id)).collect())?;
        self.refresh_persons(persons)?;
        info!(address_book = ?self.info.id, count = ids.len(), "Contacts removed");
        Ok(())
    }

    /// Find the ids of contacts matching `filter`, ordered by `sort`.
    pub fn find_ids(
        &self,
        filter: Option<&FilterNode>,
        sort: Option<&SortMode>,
    ) -> QueryResult<Vec<RecordId>> {
        match self.info.id {
            None => self.engine.find(filter, sort),
            Some(book) => {
                let scope = FilterNode::exactly("addressBookId", book);
                let scoped = match filter {
                    Some(filter) => FilterNode::intersection([scope, filter.clone()]),
                    None => scope,
                };
                self.engine.find(Some(&scoped), sort)
            }
        }
    }

    /// Find contacts matching `filter`, ordered by `sort`.
    pub fn find(
        &self,
        filter: Option<&FilterNode>,
        sort: Option<&SortMode>,
    ) -> QueryResult<Vec<Contact>> {
        self.load_all(self.find_ids(filter, sort)?)
    }

    /// Like [`find`](Self::find), taking the filter and sort mode as JSON.
    pub fn find_json(&self, filter: &JsonValue, sort: &JsonValue) -> QueryResult<Vec<Contact>> {
        let filter = FilterNode::from_optional_json(filter)?;
        let sort = SortMode::from_json(sort)?;
        self.find(filter.as_ref(), sort.as_ref())
    }

    fn load_all(&self, ids: Vec<RecordId>) -> QueryResult<Vec<Contact>> {
        let mut contacts = Vec::with_capacity(ids.len());
        for id in ids {
            contacts.extend(load_contact(&*self.store, id)?);
        }
        Ok(contacts)
    }

    fn owns(&self, contact: &Contact) -> bool {
        self.info.id.is_none() || contact.address_book_id == self.info.id
    }

    fn check_writable(&self) -> QueryResult<()> {
        if self.info.read_only {
            return Err(QueryError::invalid_values(format!(
                "Address book {} is read only",
                self.info.name
            )));
        }
        Ok(())
    }

    fn check_person(&self, person_id: RecordId) -> QueryResult<()> {
        load_person(&*self.store, person_id)?
            .map(|_| ())
            .ok_or_else(|| QueryError::not_found("Person", person_id))
    }

    /// Assign ids, address book, person and timestamp to a new contact.
    fn prepare_new(&self, mut contact: Contact) -> QueryResult<Contact> {
        self.check_writable()?;
        if let Some(id) = contact.id {
            return Err(QueryError::invalid_values(format!(
                "Contact already has id {}",
                id
            )));
        }

        contact.address_book_id = Some(match (self.info.id, contact.address_book_id) {
            (Some(book), Some(other)) if book != other => {
                return Err(QueryError::invalid_values(format!(
                    "Contact names address book {} but is added to {}",
                    other, book
                )));
            }
            (Some(book), _) => book,
            (None, Some(other)) => {
                if self.store.fetch(Table::AddressBooks, "id", other)?.is_empty() {
                    return Err(QueryError::not_found("AddressBook", other));
                }
                other
            }
            (None, None) => DEFAULT_ADDRESS_BOOK_ID,
        });

        contact.person_id = Some(match contact.person_id {
            Some(person_id) => {
                self.check_person(person_id)?;
                person_id
            }
            None => self.store.next_id(Table::Persons)?,
        });
        contact.id = Some(self.store.next_id(Table::Contacts)?);
        contact.last_updated = now();
        Ok(contact)
    }

    fn refresh_persons(&self, persons: impl IntoIterator<Item = RecordId>) -> QueryResult<()> {
        let persons: IndexSet<RecordId> = persons.into_iter().collect();
        for person_id in persons {
            person::refresh(&*self.store, person_id, None)?;
        }
        Ok(())
    }
}

/// Current time truncated to whole seconds, the precision stored.
fn now() -> Option<DateTime<Utc>> {
    DateTime::from_timestamp(Utc::now().timestamp(), 0)
}

/// Remove an address book row and every contact stored in it.
pub(crate) fn remove_address_book<S: ContactStore + ?Sized>(
    store: &S,
    id: RecordId,
) -> QueryResult<()> {
    let contacts: Vec<_> = store.fetch(Table::Contacts, "address_book_id", id)?;
    let mut persons = IndexSet::new();
    let mut mutations = vec![Mutation::delete(Table::AddressBooks, "id", id)];
    for row in &contacts {
        if let Some(contact_id) = row.get("id").and_then(|v| v.as_int()) {
            mutations.extend(delete_contact(contact_id));
        }
        if let Some(person_id) = row.get("person_id").and_then(|v| v.as_int()) {
            persons.insert(person_id);
        }
    }
    store.apply(mutations)?;
    for person_id in persons {
        person::refresh(store, person_id, None)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use crate::manager::ContactManager;
    use crate::memory::MemoryStore;
    use crate::records::{ContactAddress, ContactEmailAddress, ContactName, ContactPhoneNumber};
    use pretty_assertions::assert_eq;

    fn manager() -> ContactManager<MemoryStore> {
        ContactManager::open(MemoryStore::new()).unwrap()
    }

    fn named(first: &str, last: &str) -> Contact {
        Contact {
            name: Some(ContactName::new(first, last)),
            ..Default::default()
        }
    }

    #[test]
    fn test_add_assigns_ids_and_person() {
        let book = manager().default_address_book().unwrap();
        let contact = book.add(named("Ada", "Lovelace")).unwrap();

        assert!(contact.id.is_some());
        assert!(contact.person_id.is_some());
        assert!(contact.last_updated.is_some());
        assert_eq!(contact.address_book_id, Some(DEFAULT_ADDRESS_BOOK_ID));
        assert_eq!(
            contact.name.as_ref().and_then(|n| n.display_name.as_deref()),
            Some("Ada Lovelace")
        );
    }

    #[test]
    fn test_add_rejects_existing_id() {
        let book = manager().default_address_book().unwrap();
        let err = book
            .add(Contact {
                id: Some(5),
                ..Default::default()
            })
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidValues);
    }

    #[test]
    fn test_add_to_unknown_person() {
        let book = manager().default_address_book().unwrap();
        let err = book
            .add(Contact {
                person_id: Some(99),
                ..Default::default()
            })
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);
    }

    #[test]
    fn test_get_unknown_contact() {
        let book = manager().default_address_book().unwrap();
        assert!(book.get(42).unwrap_err().is_not_found());
        assert!(book.remove(42).unwrap_err().is_not_found());
    }

    #[test]
    fn test_update_replaces_details() {
        let book = manager().default_address_book().unwrap();
        let mut contact = book
            .add(Contact {
                phone_numbers: vec![ContactPhoneNumber::new("555-0100")],
                ..named("Grace", "Hopper")
            })
            .unwrap();

        contact.phone_numbers = vec![ContactPhoneNumber::new("555-0199")];
        contact.addresses = vec![ContactAddress::in_city("Arlington")];
        let updated = book.update(contact.clone()).unwrap();

        assert_eq!(updated.id, contact.id);
        assert_eq!(updated.phone_numbers, vec![ContactPhoneNumber::new("555-0199")]);
        assert_eq!(updated.addresses.len(), 1);
    }

    #[test]
    fn test_display_name_only_survives_update() {
        let book = manager().default_address_book().unwrap();
        let boss = FilterNode::exactly("name.displayName", "Boss");
        let added = book
            .add(Contact {
                name: Some(ContactName {
                    display_name: Some("Boss".into()),
                    ..Default::default()
                }),
                emails: vec![ContactEmailAddress::new("boss@example.com")],
                ..Default::default()
            })
            .unwrap();

        assert_eq!(
            added.name.as_ref().and_then(|n| n.display_name.as_deref()),
            Some("Boss")
        );
        assert_eq!(book.find_ids(Some(&boss), None).unwrap(), vec![added.id.unwrap()]);

        let updated = book.update(added.clone()).unwrap();
        assert_eq!(updated.display_name().as_deref(), Some("Boss"));
        assert_eq!(book.find_ids(Some(&boss), None).unwrap(), vec![added.id.unwrap()]);
    }

    #[test]
    fn test_update_cannot_move_address_book() {
        let manager = manager();
        let other = manager.add_address_book("Work").unwrap();
        let book = manager.default_address_book().unwrap();
        let mut contact = book.add(named("Alan", "Turing")).unwrap();

        contact.address_book_id = other.id;
        let err = book.update(contact).unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidValues);
    }

    #[test]
    fn test_books_only_see_their_contacts() {
        let manager = manager();
        let work = manager.add_address_book("Work").unwrap();
        let work = manager.address_book(work.id.unwrap()).unwrap();
        let home = manager.default_address_book().unwrap();

        let at_work = work.add(named("Alan", "Turing")).unwrap();
        let at_home = home.add(named("Ada", "Lovelace")).unwrap();

        assert!(home.get(at_work.id.unwrap()).is_err());
        assert_eq!(home.find_ids(None, None).unwrap(), vec![at_home.id.unwrap()]);
        assert_eq!(work.find_ids(None, None).unwrap(), vec![at_work.id.unwrap()]);

        let unified = manager.unified_address_book();
        assert_eq!(unified.find_ids(None, None).unwrap().len(), 2);
        assert!(unified.get(at_work.id.unwrap()).is_ok());
    }

    #[test]
    fn test_remove_batch_is_all_or_nothing() {
        let book = manager().default_address_book().unwrap();
        let a = book.add(named("A", "A")).unwrap().id.unwrap();
        let b = book.add(named("B", "B")).unwrap().id.unwrap();

        assert!(book.remove_batch(&[a, 999]).is_err());
        assert_eq!(book.find_ids(None, None).unwrap(), vec![a, b]);

        book.remove_batch(&[a, b]).unwrap();
        assert!(book.find_ids(None, None).unwrap().is_empty());
    }

    #[test]
    fn test_find_contacts() {
        let book = manager().default_address_book().unwrap();
        book.add_batch(vec![
            Contact {
                addresses: vec![ContactAddress::in_city("Paris")],
                ..named("Marie", "Curie")
            },
            Contact {
                addresses: vec![ContactAddress::in_city("Rome")],
                ..named("Enrico", "Fermi")
            },
        ])
        .unwrap();

        let found = book
            .find(Some(&FilterNode::exactly("addresses.city", "Rome")), None)
            .unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(
            found[0].name.as_ref().and_then(|n| n.last_name.as_deref()),
            Some("Fermi")
        );

        let sorted = book
            .find(None, Some(&SortMode::desc("name.lastName")))
            .unwrap();
        let names: Vec<_> = sorted
            .iter()
            .filter_map(|c| c.name.as_ref().and_then(|n| n.last_name.clone()))
            .collect();
        assert_eq!(names, vec!["Fermi".to_string(), "Curie".to_string()]);
    }
}
