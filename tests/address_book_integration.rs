//! Integration tests for address books and persons on both stores.

use pretty_assertions::assert_eq;

use rolodex::records::{Contact, ContactAddress, ContactName, ContactPhoneNumber};
use rolodex::sqlite::SqliteConfig;
use rolodex::{
    ContactManager, ContactStore, DEFAULT_ADDRESS_BOOK_ID, ErrorCode, FilterNode, MemoryStore,
    SqliteStore,
};

fn named(first: &str, last: &str) -> Contact {
    Contact {
        name: Some(ContactName::new(first, last)),
        ..Default::default()
    }
}

fn crud<S: ContactStore>(manager: ContactManager<S>) {
    let book = manager.default_address_book().unwrap();

    let added = book.add(named("Ada", "Lovelace")).unwrap();
    let id = added.id.unwrap();
    assert_eq!(added.address_book_id, Some(DEFAULT_ADDRESS_BOOK_ID));
    assert!(added.person_id.is_some());
    assert!(added.last_updated.is_some());

    let mut changed = book.get(id).unwrap();
    changed.addresses.push(ContactAddress::in_city("London"));
    book.update(changed).unwrap();

    let found = book
        .find_ids(Some(&FilterNode::exactly("addresses.city", "London")), None)
        .unwrap();
    assert_eq!(found, vec![id]);

    let err = book.add(added.clone()).unwrap_err();
    assert_eq!(err.code, ErrorCode::InvalidValues);

    book.remove(id).unwrap();
    assert_eq!(book.get(id).unwrap_err().code, ErrorCode::NotFound);
    assert_eq!(book.remove(id).unwrap_err().code, ErrorCode::NotFound);

    // The person went with its only contact
    let person_id = added.person_id.unwrap();
    assert_eq!(manager.get(person_id).unwrap_err().code, ErrorCode::NotFound);
}

fn address_books<S: ContactStore>(manager: ContactManager<S>) {
    let work = manager.add_address_book("Work").unwrap();
    let work_id = work.id.unwrap();
    let work_book = manager.address_book(work_id).unwrap();
    let default_book = manager.default_address_book().unwrap();

    let at_work = work_book.add(named("Bea", "Arthur")).unwrap();
    let at_home = default_book.add(named("Cid", "Highwind")).unwrap();

    assert_eq!(work_book.find_ids(None, None).unwrap(), vec![at_work.id.unwrap()]);
    assert_eq!(default_book.find_ids(None, None).unwrap(), vec![at_home.id.unwrap()]);
    assert_eq!(manager.unified_address_book().find_ids(None, None).unwrap().len(), 2);

    // A contact is only visible through its own book
    let err = default_book.get(at_work.id.unwrap()).unwrap_err();
    assert_eq!(err.code, ErrorCode::NotFound);

    manager.remove_address_book(work_id).unwrap();
    assert_eq!(manager.address_books().unwrap().len(), 1);
    assert_eq!(manager.unified_address_book().find_ids(None, None).unwrap().len(), 1);

    let err = manager.remove_address_book(DEFAULT_ADDRESS_BOOK_ID).unwrap_err();
    assert_eq!(err.code, ErrorCode::InvalidValues);
}

fn persons<S: ContactStore>(manager: ContactManager<S>) {
    let book = manager.default_address_book().unwrap();

    let first = book.add(named("Ada", "Lovelace")).unwrap();
    let second = book
        .add(Contact {
            phone_numbers: vec![ContactPhoneNumber::new("555-0100")],
            ..named("Ada", "King")
        })
        .unwrap();

    let person_id = first.person_id.unwrap();
    let person = manager.link(person_id, second.person_id.unwrap()).unwrap();
    assert_eq!(person.contact_count, 2);
    assert!(person.has_phone_number);

    let mut person = manager.get(person_id).unwrap();
    person.is_favorite = true;
    manager.update(&person).unwrap();

    // Favorite propagates to every linked contact
    let favorites = book
        .find_ids(Some(&FilterNode::exists("isFavorite")), None)
        .unwrap();
    assert_eq!(favorites, vec![first.id.unwrap(), second.id.unwrap()]);

    let split = manager.unlink(person_id, second.id.unwrap()).unwrap();
    assert_eq!(split.contact_count, 1);
    assert!(split.has_phone_number);
    assert!(!manager.get(person_id).unwrap().has_phone_number);

    let err = manager.unlink(person_id, first.id.unwrap()).unwrap_err();
    assert_eq!(err.code, ErrorCode::InvalidValues);

    manager.remove(split.id).unwrap();
    assert_eq!(book.get(second.id.unwrap()).unwrap_err().code, ErrorCode::NotFound);
}

macro_rules! for_each_store {
    ($($check:ident),* $(,)?) => {
        mod memory {
            use super::*;
            $(
                #[test]
                fn $check() {
                    super::$check(ContactManager::open(MemoryStore::new()).unwrap());
                }
            )*
        }

        mod sqlite {
            use super::*;
            $(
                #[test]
                fn $check() {
                    super::$check(ContactManager::open(SqliteStore::memory().unwrap()).unwrap());
                }
            )*
        }
    };
}

for_each_store!(crud, address_books, persons);

#[test]
fn test_sqlite_file_persists_across_opens() {
    let dir = tempfile::tempdir().unwrap();
    let config = SqliteConfig::file(dir.path().join("contacts.db"));

    let id = {
        let manager = ContactManager::open(SqliteStore::open(config.clone()).unwrap()).unwrap();
        let book = manager.default_address_book().unwrap();
        book.add(named("Ada", "Lovelace")).unwrap().id.unwrap()
    };

    let manager = ContactManager::open(SqliteStore::open(config).unwrap()).unwrap();
    let book = manager.default_address_book().unwrap();
    let contact = book.get(id).unwrap();
    assert_eq!(contact.display_name().as_deref(), Some("Ada Lovelace"));

    // Ids keep counting after a reopen
    let next = book.add(named("Bea", "Arthur")).unwrap();
    assert!(next.id.unwrap() > id);
    assert_eq!(manager.address_books().unwrap().len(), 1);
}
