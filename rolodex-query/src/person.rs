//! Person aggregation.
//!
//! A person row is a cache over the contacts linked to it. After any write
//! touching a contact, the affected persons are recomputed with
//! [`refresh`]; a person left without contacts is deleted.

use tracing::debug;

use crate::convert::path_to_uri;
use crate::error::QueryResult;
use crate::mapping::{load_person, person_row};
use crate::records::Person;
use crate::schema::Table;
use crate::store::{ContactStore, Mutation};
use crate::types::{RecordId, Row, Value};

/// Recompute the person row for `person_id` from its linked contacts.
///
/// `preferred` selects the display contact when it is one of the linked
/// contacts; otherwise the previous display contact is kept while it is
/// still linked, falling back to the lowest contact id.
pub(crate) fn refresh<S: ContactStore + ?Sized>(
    store: &S,
    person_id: RecordId,
    preferred: Option<RecordId>,
) -> QueryResult<Option<Person>> {
    let mut contacts = store.fetch(Table::Contacts, "person_id", person_id)?;
    contacts.sort_by_key(|row| row.get("id").and_then(Value::as_int));

    if contacts.is_empty() {
        store.apply(vec![Mutation::delete(Table::Persons, "id", person_id)])?;
        debug!(person_id, "Person removed, no contacts left");
        return Ok(None);
    }

    let previous = load_person(store, person_id)?;
    let ids: Vec<RecordId> = contacts
        .iter()
        .filter_map(|row| row.get("id").and_then(Value::as_int))
        .collect();
    let linked = |id: &RecordId| ids.contains(id);

    let display_contact_id = preferred
        .filter(linked)
        .or_else(|| {
            previous
                .as_ref()
                .map(|p| p.display_contact_id)
                .filter(linked)
        })
        .or_else(|| ids.first().copied())
        .unwrap_or_default();

    let mut has_phone_number = false;
    let mut has_email = false;
    for id in &ids {
        has_phone_number |= !store.fetch(Table::Numbers, "contact_id", *id)?.is_empty();
        has_email |= !store.fetch(Table::Emails, "contact_id", *id)?.is_empty();
    }

    let display: Option<&Row> = contacts
        .iter()
        .find(|row| row.get("id").and_then(Value::as_int) == Some(display_contact_id));
    let display_text = |column: &str| {
        display
            .and_then(|row| row.get(column))
            .and_then(Value::as_text)
            .map(str::to_string)
    };

    let is_favorite = contacts.iter().any(|row| {
        row.get("is_favorite")
            .and_then(Value::as_bool)
            .unwrap_or(false)
    });

    let person = Person {
        id: person_id,
        display_name: display_text("display_name"),
        contact_count: ids.len() as i64,
        has_phone_number,
        has_email,
        is_favorite,
        photo_uri: display_text("image_path").map(|p| path_to_uri(&p)),
        ringtone_uri: display_text("ringtone_path").map(|p| path_to_uri(&p)),
        display_contact_id,
    };

    store.apply(vec![
        Mutation::delete(Table::Persons, "id", person_id),
        Mutation::insert(Table::Persons, person_row(&person)),
    ])?;
    debug!(person_id, contacts = person.contact_count, "Person refreshed");
    Ok(Some(person))
}

/// Set `is_favorite` on every contact linked to `person_id`.
pub(crate) fn propagate_favorite<S: ContactStore + ?Sized>(
    store: &S,
    person_id: RecordId,
    favorite: bool,
) -> QueryResult<()> {
    let mut mutations = Vec::new();
    for mut row in store.fetch(Table::Contacts, "person_id", person_id)? {
        let Some(id) = row.get("id").and_then(Value::as_int) else {
            continue;
        };
        row.insert("is_favorite", Value::Bool(favorite));
        mutations.push(Mutation::delete(Table::Contacts, "id", id));
        mutations.push(Mutation::insert(Table::Contacts, row));
    }
    store.apply(mutations)
}

/// Link the given contacts to person `to`.
pub(crate) fn relink<S: ContactStore + ?Sized>(
    store: &S,
    contact_ids: &[RecordId],
    to: RecordId,
) -> QueryResult<()> {
    let mut mutations = Vec::new();
    for id in contact_ids {
        for mut row in store.fetch(Table::Contacts, "id", *id)? {
            row.insert("person_id", Value::Int(to));
            mutations.push(Mutation::delete(Table::Contacts, "id", *id));
            mutations.push(Mutation::insert(Table::Contacts, row));
        }
    }
    store.apply(mutations)
}

/// Ids of the contacts linked to `person_id`, ascending.
pub(crate) fn contact_ids<S: ContactStore + ?Sized>(
    store: &S,
    person_id: RecordId,
) -> QueryResult<Vec<RecordId>> {
    let mut ids: Vec<RecordId> = store
        .fetch(Table::Contacts, "person_id", person_id)?
        .iter()
        .filter_map(|row| row.get("id").and_then(Value::as_int))
        .collect();
    ids.sort_unstable();
    Ok(ids)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapping::insert_contact;
    use crate::memory::MemoryStore;
    use crate::records::{Contact, ContactEmailAddress, ContactPhoneNumber};
    use pretty_assertions::assert_eq;

    fn store_contact(store: &MemoryStore, contact: Contact) {
        store.apply(insert_contact(&contact).unwrap()).unwrap();
    }

    fn linked(id: RecordId, person_id: RecordId) -> Contact {
        Contact {
            id: Some(id),
            person_id: Some(person_id),
            address_book_id: Some(0),
            ..Default::default()
        }
    }

    #[test]
    fn test_aggregates_linked_contacts() {
        let store = MemoryStore::new();
        store_contact(
            &store,
            Contact {
                phone_numbers: vec![ContactPhoneNumber::new("555-0100")],
                ..linked(1, 10)
            },
        );
        store_contact(
            &store,
            Contact {
                is_favorite: true,
                emails: vec![ContactEmailAddress::new("b@example.com")],
                ..linked(2, 10)
            },
        );

        let person = refresh(&store, 10, None).unwrap().unwrap();
        assert_eq!(person.contact_count, 2);
        assert!(person.has_phone_number);
        assert!(person.has_email);
        assert!(person.is_favorite);
        assert_eq!(person.display_contact_id, 1);
        assert_eq!(person.display_name.as_deref(), Some("555-0100"));
        assert_eq!(load_person(&store, 10).unwrap(), Some(person));
    }

    #[test]
    fn test_display_contact_is_kept_while_linked() {
        let store = MemoryStore::new();
        store_contact(&store, linked(1, 10));
        store_contact(&store, linked(2, 10));

        refresh(&store, 10, Some(2)).unwrap();
        let person = refresh(&store, 10, None).unwrap().unwrap();
        assert_eq!(person.display_contact_id, 2);

        store.apply(crate::mapping::delete_contact(2)).unwrap();
        let person = refresh(&store, 10, None).unwrap().unwrap();
        assert_eq!(person.display_contact_id, 1);
    }

    #[test]
    fn test_person_without_contacts_is_removed() {
        let store = MemoryStore::new();
        store_contact(&store, linked(1, 10));
        refresh(&store, 10, None).unwrap();

        store.apply(crate::mapping::delete_contact(1)).unwrap();
        assert_eq!(refresh(&store, 10, None).unwrap(), None);
        assert_eq!(store.row_count(Table::Persons), 0);
    }

    #[test]
    fn test_relink_and_propagate() {
        let store = MemoryStore::new();
        store_contact(&store, linked(1, 10));
        store_contact(&store, linked(2, 20));

        relink(&store, &[2], 10).unwrap();
        assert_eq!(contact_ids(&store, 10).unwrap(), vec![1, 2]);
        assert!(contact_ids(&store, 20).unwrap().is_empty());

        propagate_favorite(&store, 10, true).unwrap();
        let person = refresh(&store, 10, None).unwrap().unwrap();
        assert!(person.is_favorite);
    }
}
