//! Mapping between records and table rows.

use chrono::DateTime;

use crate::convert::{date_to_int, int_to_date, path_to_uri, uri_to_path};
use crate::error::{QueryError, QueryResult};
use crate::records::{
    AddressBookInfo, Contact, ContactAddress, ContactAnniversary, ContactEmailAddress,
    ContactInstantMessenger, ContactName, ContactOrganization, ContactPhoneNumber,
    ContactRelationship, ContactWebSite, Person,
};
use crate::schema::{Table, event_type};
use crate::store::{ContactStore, Mutation};
use crate::types::{RecordId, Row, Value};

fn row<const N: usize>(pairs: [(&'static str, Value); N]) -> Row {
    pairs.into_iter().collect()
}

fn text(row: &Row, column: &str) -> Option<String> {
    row.get(column).and_then(Value::as_text).map(str::to_string)
}

fn int(row: &Row, column: &str) -> Option<i64> {
    row.get(column).and_then(Value::as_int)
}

fn flag(row: &Row, column: &str) -> bool {
    row.get(column).and_then(Value::as_bool).unwrap_or(false)
}

fn uri(row: &Row, column: &str) -> Option<String> {
    text(row, column).map(|path| path_to_uri(&path))
}

fn join_types(types: &[String]) -> Value {
    if types.is_empty() {
        Value::Null
    } else {
        Value::Text(types.join(","))
    }
}

fn split_types(row: &Row, column: &str) -> Vec<String> {
    text(row, column)
        .map(|types| {
            types
                .split(',')
                .filter(|t| !t.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

/// Deletes for a contact's row and every one of its detail rows.
pub(crate) fn delete_contact(id: RecordId) -> Vec<Mutation> {
    let mut mutations = vec![Mutation::delete(Table::Contacts, "id", id)];
    mutations.extend(
        Table::DETAILS
            .iter()
            .map(|table| Mutation::delete(*table, "contact_id", id)),
    );
    mutations
}

/// Inserts for a contact's row and its detail rows.
///
/// The contact must carry its id, person and address book.
pub(crate) fn insert_contact(contact: &Contact) -> QueryResult<Vec<Mutation>> {
    let (Some(id), Some(person_id), Some(address_book_id)) =
        (contact.id, contact.person_id, contact.address_book_id)
    else {
        return Err(QueryError::invalid_values(
            "Contact must have an id, a person and an address book before it is stored",
        ));
    };

    let mut mutations = vec![Mutation::insert(
        Table::Contacts,
        row([
            ("id", id.into()),
            ("person_id", person_id.into()),
            ("address_book_id", address_book_id.into()),
            ("changed_time", contact.last_updated.map(|t| t.timestamp()).into()),
            ("is_favorite", contact.is_favorite.into()),
            ("display_name", contact.display_name().into()),
            ("image_path", contact.photo_uri.as_deref().map(uri_to_path).into()),
            ("ringtone_path", contact.ringtone_uri.as_deref().map(uri_to_path).into()),
        ]),
    )];
    let mut detail = |table: Table, row: Row| {
        let mut full = Row::with_capacity(row.len() + 1);
        full.insert("contact_id", Value::Int(id));
        full.extend(row);
        mutations.push(Mutation::insert(table, full));
    };

    // A name always gets its row, even one carrying only a display name
    if let Some(ref name) = contact.name {
        detail(
            Table::Names,
            row([
                ("prefix", name.prefix.clone().into()),
                ("suffix", name.suffix.clone().into()),
                ("first", name.first_name.clone().into()),
                ("addition", name.middle_name.clone().into()),
                ("last", name.last_name.clone().into()),
                ("phonetic_first", name.phonetic_first_name.clone().into()),
                ("phonetic_middle", name.phonetic_middle_name.clone().into()),
                ("phonetic_last", name.phonetic_last_name.clone().into()),
            ]),
        );
        for nickname in &name.nicknames {
            detail(Table::Nicknames, row([("name", nickname.as_str().into())]));
        }
    }

    for address in &contact.addresses {
        detail(
            Table::Addresses,
            row([
                ("country", address.country.clone().into()),
                ("region", address.region.clone().into()),
                ("locality", address.city.clone().into()),
                ("street", address.street_address.clone().into()),
                ("extended", address.additional_information.clone().into()),
                ("postal_code", address.postal_code.clone().into()),
                ("is_default", address.is_default.into()),
                ("type", join_types(&address.types)),
                ("label", address.label.clone().into()),
            ]),
        );
    }

    for number in &contact.phone_numbers {
        detail(
            Table::Numbers,
            row([
                ("number", number.number.as_str().into()),
                ("is_default", number.is_default.into()),
                ("type", join_types(&number.types)),
                ("label", number.label.clone().into()),
            ]),
        );
    }

    for email in &contact.emails {
        detail(
            Table::Emails,
            row([
                ("email", email.email.as_str().into()),
                ("is_default", email.is_default.into()),
                ("type", join_types(&email.types)),
                ("label", email.label.clone().into()),
            ]),
        );
    }

    if let Some(birthday) = contact.birthday {
        detail(
            Table::Events,
            row([
                ("date", date_to_int(birthday).into()),
                ("type", event_type::BIRTHDAY.into()),
                ("label", Value::Null),
            ]),
        );
    }
    for anniversary in &contact.anniversaries {
        detail(
            Table::Events,
            row([
                ("date", date_to_int(anniversary.date).into()),
                ("type", event_type::ANNIVERSARY.into()),
                ("label", anniversary.label.clone().into()),
            ]),
        );
    }

    for organization in &contact.organizations {
        detail(
            Table::Companies,
            row([
                ("name", organization.name.clone().into()),
                ("department", organization.department.clone().into()),
                ("job_title", organization.title.clone().into()),
                ("role", organization.role.clone().into()),
                ("logo", organization.logo_uri.as_deref().map(uri_to_path).into()),
            ]),
        );
    }

    for note in &contact.notes {
        detail(Table::Notes, row([("note", note.as_str().into())]));
    }

    for url in &contact.urls {
        detail(
            Table::Urls,
            row([("url", url.url.as_str().into()), ("type", url.kind.clone().into())]),
        );
    }

    for group_id in &contact.group_ids {
        detail(Table::GroupRelations, row([("group_id", (*group_id).into())]));
    }

    for relationship in &contact.relationships {
        detail(
            Table::Relationships,
            row([
                ("name", relationship.relative_name.as_str().into()),
                ("type", relationship.kind.clone().into()),
                ("label", relationship.label.clone().into()),
            ]),
        );
    }

    for messenger in &contact.messengers {
        detail(
            Table::Messengers,
            row([
                ("im_id", messenger.im_address.as_str().into()),
                ("type", messenger.kind.clone().into()),
                ("label", messenger.label.clone().into()),
            ]),
        );
    }

    Ok(mutations)
}

/// Load a contact with all its details.
pub(crate) fn load_contact<S: ContactStore + ?Sized>(
    store: &S,
    id: RecordId,
) -> QueryResult<Option<Contact>> {
    let Some(main) = store.fetch(Table::Contacts, "id", id)?.into_iter().next() else {
        return Ok(None);
    };
    let details = |table| store.fetch(table, "contact_id", id);

    let names = details(Table::Names)?;
    let nicknames: Vec<String> = details(Table::Nicknames)?
        .iter()
        .filter_map(|r| text(r, "name"))
        .collect();
    let name = if names.is_empty() && nicknames.is_empty() {
        None
    } else {
        let mut name = names
            .first()
            .map(|r| ContactName {
                prefix: text(r, "prefix"),
                suffix: text(r, "suffix"),
                first_name: text(r, "first"),
                middle_name: text(r, "addition"),
                last_name: text(r, "last"),
                phonetic_first_name: text(r, "phonetic_first"),
                phonetic_middle_name: text(r, "phonetic_middle"),
                phonetic_last_name: text(r, "phonetic_last"),
                ..Default::default()
            })
            .unwrap_or_default();
        name.nicknames = nicknames;
        name.display_name = text(&main, "display_name");
        Some(name)
    };

    let mut birthday = None;
    let mut anniversaries = Vec::new();
    for event in details(Table::Events)? {
        let Some(date) = int(&event, "date").and_then(int_to_date) else {
            continue;
        };
        match int(&event, "type") {
            Some(event_type::BIRTHDAY) => birthday = Some(date),
            _ => anniversaries.push(ContactAnniversary {
                date,
                label: text(&event, "label"),
            }),
        }
    }

    Ok(Some(Contact {
        id: Some(id),
        person_id: int(&main, "person_id"),
        address_book_id: int(&main, "address_book_id"),
        last_updated: int(&main, "changed_time").and_then(|t| DateTime::from_timestamp(t, 0)),
        is_favorite: flag(&main, "is_favorite"),
        name,
        addresses: details(Table::Addresses)?
            .iter()
            .map(|r| ContactAddress {
                country: text(r, "country"),
                region: text(r, "region"),
                city: text(r, "locality"),
                street_address: text(r, "street"),
                additional_information: text(r, "extended"),
                postal_code: text(r, "postal_code"),
                is_default: flag(r, "is_default"),
                types: split_types(r, "type"),
                label: text(r, "label"),
            })
            .collect(),
        photo_uri: uri(&main, "image_path"),
        phone_numbers: details(Table::Numbers)?
            .iter()
            .map(|r| ContactPhoneNumber {
                number: text(r, "number").unwrap_or_default(),
                is_default: flag(r, "is_default"),
                types: split_types(r, "type"),
                label: text(r, "label"),
            })
            .collect(),
        emails: details(Table::Emails)?
            .iter()
            .map(|r| ContactEmailAddress {
                email: text(r, "email").unwrap_or_default(),
                is_default: flag(r, "is_default"),
                types: split_types(r, "type"),
                label: text(r, "label"),
            })
            .collect(),
        birthday,
        anniversaries,
        organizations: details(Table::Companies)?
            .iter()
            .map(|r| ContactOrganization {
                name: text(r, "name"),
                department: text(r, "department"),
                title: text(r, "job_title"),
                role: text(r, "role"),
                logo_uri: uri(r, "logo"),
            })
            .collect(),
        notes: details(Table::Notes)?
            .iter()
            .filter_map(|r| text(r, "note"))
            .collect(),
        urls: details(Table::Urls)?
            .iter()
            .map(|r| ContactWebSite {
                url: text(r, "url").unwrap_or_default(),
                kind: text(r, "type"),
            })
            .collect(),
        ringtone_uri: uri(&main, "ringtone_path"),
        group_ids: details(Table::GroupRelations)?
            .iter()
            .filter_map(|r| int(r, "group_id"))
            .collect(),
        relationships: details(Table::Relationships)?
            .iter()
            .map(|r| ContactRelationship {
                relative_name: text(r, "name").unwrap_or_default(),
                kind: text(r, "type"),
                label: text(r, "label"),
            })
            .collect(),
        messengers: details(Table::Messengers)?
            .iter()
            .map(|r| ContactInstantMessenger {
                im_address: text(r, "im_id").unwrap_or_default(),
                kind: text(r, "type"),
                label: text(r, "label"),
            })
            .collect(),
    }))
}

pub(crate) fn person_row(person: &Person) -> Row {
    row([
        ("id", person.id.into()),
        ("display_name", person.display_name.clone().into()),
        ("display_contact_id", person.display_contact_id.into()),
        ("contact_count", person.contact_count.into()),
        ("has_phonenumber", person.has_phone_number.into()),
        ("has_email", person.has_email.into()),
        ("is_favorite", person.is_favorite.into()),
        ("image_path", person.photo_uri.as_deref().map(uri_to_path).into()),
        ("ringtone_path", person.ringtone_uri.as_deref().map(uri_to_path).into()),
    ])
}

pub(crate) fn load_person<S: ContactStore + ?Sized>(
    store: &S,
    id: RecordId,
) -> QueryResult<Option<Person>> {
    Ok(store
        .fetch(Table::Persons, "id", id)?
        .first()
        .map(|r| Person {
            id,
            display_name: text(r, "display_name"),
            contact_count: int(r, "contact_count").unwrap_or(0),
            has_phone_number: flag(r, "has_phonenumber"),
            has_email: flag(r, "has_email"),
            is_favorite: flag(r, "is_favorite"),
            photo_uri: uri(r, "image_path"),
            ringtone_uri: uri(r, "ringtone_path"),
            display_contact_id: int(r, "display_contact_id").unwrap_or(0),
        }))
}

pub(crate) fn address_book_row(info: &AddressBookInfo, id: RecordId) -> Row {
    row([
        ("id", id.into()),
        ("name", info.name.as_str().into()),
        ("account_id", info.account_id.into()),
        ("read_only", info.read_only.into()),
    ])
}

pub(crate) fn address_book_from_row(r: &Row) -> AddressBookInfo {
    AddressBookInfo {
        id: int(r, "id"),
        name: text(r, "name").unwrap_or_default(),
        account_id: int(r, "account_id"),
        read_only: flag(r, "read_only"),
    }
}
