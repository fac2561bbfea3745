//! Integration tests for contact search.
//!
//! Every check runs against both the in-memory store and the SQLite store,
//! which must agree on every result.

use pretty_assertions::assert_eq;
use serde_json::json;

use rolodex::records::{
    Contact, ContactAddress, ContactAnniversary, ContactEmailAddress, ContactName,
    ContactPhoneNumber,
};
use rolodex::{
    AddressBook, ContactManager, ContactStore, ErrorCode, FilterNode, MatchFlag, MemoryStore,
    RecordId, SortMode, SqliteStore,
};

fn date(s: &str) -> chrono::NaiveDate {
    s.parse().unwrap()
}

/// Four contacts:
///
/// | id | name | city  | phone numbers      | events                 |
/// |----|------|-------|--------------------|------------------------|
/// | 1  | Ada  | Paris | 0300               | birthday 1815-12-10    |
/// | 2  | Bea  | Paris | 0100               | anniversary 2001-06-01 |
/// | 3  | Cid  | Rome  | 0050, 0500, 0200   | birthday 1990-01-01    |
/// | 4  | Dee  |       |                    |                        |
fn fixture<S: ContactStore>(store: S) -> ContactManager<S> {
    let manager = ContactManager::open(store).unwrap();
    let book = manager.default_address_book().unwrap();

    let phones = |numbers: &[&str]| -> Vec<ContactPhoneNumber> {
        numbers.iter().map(|n| ContactPhoneNumber::new(*n)).collect()
    };

    book.add_batch(vec![
        Contact {
            name: Some(ContactName::new("Ada", "Lovelace")),
            addresses: vec![ContactAddress::in_city("Paris")],
            phone_numbers: phones(&["0300"]),
            emails: vec![ContactEmailAddress::new("ada@example.com")],
            birthday: Some(date("1815-12-10")),
            is_favorite: true,
            ..Default::default()
        },
        Contact {
            name: Some(ContactName::new("Bea", "Arthur")),
            addresses: vec![ContactAddress::in_city("Paris")],
            phone_numbers: phones(&["0100"]),
            anniversaries: vec![ContactAnniversary {
                date: date("2001-06-01"),
                label: None,
            }],
            ..Default::default()
        },
        Contact {
            name: Some(ContactName::new("Cid", "Highwind")),
            addresses: vec![ContactAddress::in_city("Rome")],
            phone_numbers: phones(&["0050", "0500", "0200"]),
            birthday: Some(date("1990-01-01")),
            ..Default::default()
        },
        Contact {
            name: Some(ContactName::new("Dee", "Dee")),
            ..Default::default()
        },
    ])
    .unwrap();

    manager
}

fn ids<S: ContactStore>(
    book: &AddressBook<S>,
    filter: Option<FilterNode>,
    sort: Option<SortMode>,
) -> Vec<RecordId> {
    book.find_ids(filter.as_ref(), sort.as_ref()).unwrap()
}

fn city(flag: MatchFlag, value: &str) -> FilterNode {
    FilterNode::attribute("addresses.city", flag, Some(json!(value)))
}

fn paris() -> FilterNode {
    FilterNode::exactly("addresses.city", "Paris")
}

fn rome() -> FilterNode {
    FilterNode::exactly("addresses.city", "Rome")
}

fn paris_and_rome<S: ContactStore>(manager: &ContactManager<S>) {
    let book = manager.unified_address_book();

    assert_eq!(ids(&book, Some(paris()), None), vec![1, 2]);
    assert_eq!(ids(&book, Some(rome()), None), vec![3]);
    assert_eq!(ids(&book, Some(FilterNode::union([paris(), rome()])), None), vec![1, 2, 3]);
    assert_eq!(
        ids(&book, Some(FilterNode::intersection([paris(), rome()])), None),
        Vec::<RecordId>::new()
    );
    assert_eq!(ids(&book, None, None), vec![1, 2, 3, 4]);
}

fn string_match_flags<S: ContactStore>(manager: &ContactManager<S>) {
    let book = manager.unified_address_book();

    assert_eq!(ids(&book, Some(city(MatchFlag::Exactly, "paris")), None), Vec::<RecordId>::new());
    assert_eq!(ids(&book, Some(city(MatchFlag::Fullstring, "paris")), None), vec![1, 2]);
    assert_eq!(ids(&book, Some(city(MatchFlag::Contains, "ari")), None), vec![1, 2]);
    assert_eq!(ids(&book, Some(city(MatchFlag::Startswith, "Ro")), None), vec![3]);
    assert_eq!(ids(&book, Some(city(MatchFlag::Endswith, "ome")), None), vec![3]);
    assert_eq!(
        ids(&book, Some(FilterNode::exists("addresses.city")), None),
        vec![1, 2, 3]
    );
}

fn boolean_exists_means_true<S: ContactStore>(manager: &ContactManager<S>) {
    let book = manager.unified_address_book();
    assert_eq!(ids(&book, Some(FilterNode::exists("isFavorite")), None), vec![1]);
    assert_eq!(ids(&book, Some(FilterNode::exactly("isFavorite", false)), None), vec![2, 3, 4]);
}

fn idempotence<S: ContactStore>(manager: &ContactManager<S>) {
    let book = manager.unified_address_book();
    let filter = FilterNode::union([paris(), FilterNode::exists("birthday")]);
    let sort = SortMode::desc("phoneNumbers.number");

    let first = ids(&book, Some(filter.clone()), Some(sort.clone()));
    let second = ids(&book, Some(filter), Some(sort));
    assert_eq!(first, second);
}

fn order_independence<S: ContactStore>(manager: &ContactManager<S>) {
    let book = manager.unified_address_book();
    let birthday = FilterNode::exists("birthday");

    assert_eq!(
        ids(&book, Some(FilterNode::union([paris(), birthday.clone()])), None),
        ids(&book, Some(FilterNode::union([birthday.clone(), paris()])), None)
    );
    assert_eq!(
        ids(&book, Some(FilterNode::intersection([paris(), birthday.clone()])), None),
        ids(&book, Some(FilterNode::intersection([birthday, paris()])), None)
    );
}

fn fail_closed_on_unsupported_attributes<S: ContactStore>(manager: &ContactManager<S>) {
    let book = manager.unified_address_book();
    let types = FilterNode::exactly("addresses.types", "HOME");

    assert_eq!(ids(&book, Some(types.clone()), None), Vec::<RecordId>::new());
    assert_eq!(
        ids(&book, Some(FilterNode::union([paris(), types])), None),
        Vec::<RecordId>::new()
    );
}

fn ranges<S: ContactStore>(manager: &ContactManager<S>) {
    let book = manager.unified_address_book();
    let range = |lo: Option<&str>, hi: Option<&str>| {
        Some(FilterNode::range("birthday", lo.map(|v| json!(v)), hi.map(|v| json!(v))))
    };

    assert_eq!(ids(&book, range(Some("1900-01-01"), None), None), vec![3]);
    assert_eq!(ids(&book, range(None, Some("1900-01-01")), None), vec![1]);
    assert_eq!(ids(&book, range(Some("1800-01-01"), Some("2000-01-01")), None), vec![1, 3]);
    assert_eq!(ids(&book, range(None, None), None), Vec::<RecordId>::new());

    // The anniversary shares the events table but not the event type
    assert_eq!(ids(&book, range(Some("1950-01-01"), None), None), vec![3]);
}

fn sort_with_multi_row_attribute<S: ContactStore>(manager: &ContactManager<S>) {
    let book = manager.unified_address_book();

    assert_eq!(ids(&book, None, Some(SortMode::asc("phoneNumbers.number"))), vec![3, 2, 1, 4]);
    assert_eq!(ids(&book, None, Some(SortMode::desc("phoneNumbers.number"))), vec![3, 1, 2, 4]);
    assert_eq!(ids(&book, Some(paris()), Some(SortMode::desc("name.firstName"))), vec![2, 1]);
    assert_eq!(ids(&book, None, Some(SortMode::desc("id"))), vec![4, 3, 2, 1]);
}

fn empty_filter_result_skips_sorting<S: ContactStore>(manager: &ContactManager<S>) {
    let book = manager.unified_address_book();
    let nobody = FilterNode::exactly("addresses.city", "Oslo");
    assert_eq!(
        ids(&book, Some(nobody), Some(SortMode::asc("phoneNumbers.number"))),
        Vec::<RecordId>::new()
    );
    assert_eq!(ids(&book, Some(FilterNode::union(Vec::new())), None), Vec::<RecordId>::new());
}

fn invalid_requests<S: ContactStore>(manager: &ContactManager<S>) {
    let book = manager.unified_address_book();

    let err = book
        .find_ids(Some(&FilterNode::exactly("shoeSize", 42)), None)
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::InvalidValues);

    let err = book
        .find_ids(None, Some(&SortMode::asc("addresses.types")))
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::InvalidValues);

    let err = book
        .find_ids(Some(&FilterNode::exactly("id", -1)), None)
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::InvalidValues);

    let err = book
        .find_json(&json!({"attributeName": "id"}), &json!(null))
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::TypeMismatch);
}

fn id_filters<S: ContactStore>(manager: &ContactManager<S>) {
    let book = manager.unified_address_book();
    assert_eq!(ids(&book, Some(FilterNode::exactly("id", 2)), None), vec![2]);
    assert_eq!(ids(&book, Some(FilterNode::exactly("id", 99)), None), Vec::<RecordId>::new());
    assert_eq!(
        ids(&book, Some(FilterNode::intersection([FilterNode::exists("id"), rome()])), None),
        vec![3]
    );
}

fn json_round_trip<S: ContactStore>(manager: &ContactManager<S>) {
    let book = manager.unified_address_book();
    let found = book
        .find_json(
            &json!({
                "filterType": "CompositeFilter",
                "type": "UNION",
                "filters": [
                    {"filterType": "AttributeFilter", "attributeName": "addresses.city",
                     "matchFlag": "EXACTLY", "matchValue": "Rome"},
                    {"filterType": "AttributeRangeFilter", "attributeName": "birthday",
                     "initialValue": null, "endValue": "1900-01-01"}
                ]
            }),
            &json!({"attributeName": "name.lastName", "order": "ASC"}),
        )
        .unwrap();

    let names: Vec<_> = found
        .iter()
        .filter_map(|c| c.name.as_ref().and_then(|n| n.last_name.clone()))
        .collect();
    assert_eq!(names, vec!["Highwind", "Lovelace"]);
}

fn person_search<S: ContactStore>(manager: &ContactManager<S>) {
    let found = manager
        .find_ids(
            Some(&FilterNode::exists("hasPhoneNumber")),
            Some(&SortMode::desc("displayName")),
        )
        .unwrap();
    assert_eq!(found, vec![3, 2, 1]);

    let found = manager.find_ids(Some(&FilterNode::exists("hasEmail")), None).unwrap();
    assert_eq!(found, vec![1]);

    let crowded = manager
        .find_json(
            &json!({"filterType": "AttributeRangeFilter", "attributeName": "contactCount",
                    "initialValue": 5, "endValue": null}),
            &json!(null),
        )
        .unwrap();
    assert!(crowded.is_empty());

    let at_least = |n: i64| FilterNode::range("contactCount", Some(json!(n)), None);
    assert_eq!(manager.find_ids(Some(&at_least(1)), None).unwrap(), vec![1, 2, 3, 4]);

    manager.link(1, 2).unwrap();
    assert_eq!(manager.find_ids(Some(&at_least(2)), None).unwrap(), vec![1]);
    assert_eq!(manager.find_ids(Some(&at_least(1)), None).unwrap(), vec![1, 3, 4]);
}

macro_rules! for_each_store {
    ($($check:ident),* $(,)?) => {
        mod memory {
            use super::*;
            $(
                #[test]
                fn $check() {
                    super::$check(&fixture(MemoryStore::new()));
                }
            )*
        }

        mod sqlite {
            use super::*;
            $(
                #[test]
                fn $check() {
                    super::$check(&fixture(SqliteStore::memory().unwrap()));
                }
            )*
        }
    };
}

for_each_store!(
    paris_and_rome,
    string_match_flags,
    boolean_exists_means_true,
    idempotence,
    order_independence,
    fail_closed_on_unsupported_attributes,
    ranges,
    sort_with_multi_row_attribute,
    empty_filter_result_skips_sorting,
    invalid_requests,
    id_filters,
    json_round_trip,
    person_search,
);
