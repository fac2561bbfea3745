//! Fuzz target for filter evaluation.
//!
//! Generates arbitrary filter trees over a small contact set and checks
//! that evaluation never panics and that results stay within the store.
//!
//! Run with:
//! ```bash
//! cargo +nightly fuzz run fuzz_filter_evaluation
//! ```

#![no_main]

use std::sync::OnceLock;

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use rolodex_query::records::{Contact, ContactAddress, ContactPhoneNumber};
use rolodex_query::{CompositeType, ContactManager, FilterNode, MatchFlag, MemoryStore, SortMode};
use serde_json::{Value, json};

const ATTRIBUTES: [&str; 8] = [
    "id",
    "isFavorite",
    "addresses.city",
    "addresses.types",
    "phoneNumbers.number",
    "birthday",
    "lastUpdated",
    "shoeSize",
];

#[derive(Debug, Arbitrary)]
enum FuzzValue {
    Null,
    Bool(bool),
    Int(i64),
    String(String),
}

impl From<FuzzValue> for Option<Value> {
    fn from(value: FuzzValue) -> Self {
        match value {
            FuzzValue::Null => None,
            FuzzValue::Bool(b) => Some(json!(b)),
            FuzzValue::Int(i) => Some(json!(i)),
            FuzzValue::String(s) => Some(json!(s)),
        }
    }
}

#[derive(Debug, Arbitrary)]
enum FuzzFilter {
    Attribute(u8, u8, FuzzValue),
    Range(u8, FuzzValue, FuzzValue),
    Composite(bool, Vec<FuzzFilter>),
}

impl FuzzFilter {
    fn build(self, depth: usize) -> FilterNode {
        let name = |i: u8| ATTRIBUTES[i as usize % ATTRIBUTES.len()];
        match self {
            Self::Attribute(attr, flag, value) => {
                let flag = match flag % 6 {
                    0 => MatchFlag::Exactly,
                    1 => MatchFlag::Fullstring,
                    2 => MatchFlag::Contains,
                    3 => MatchFlag::Startswith,
                    4 => MatchFlag::Endswith,
                    _ => MatchFlag::Exists,
                };
                FilterNode::attribute(name(attr), flag, value.into())
            }
            Self::Range(attr, lo, hi) => FilterNode::range(name(attr), lo.into(), hi.into()),
            Self::Composite(union, children) if depth < 8 => FilterNode::Composite {
                kind: if union {
                    CompositeType::Union
                } else {
                    CompositeType::Intersection
                },
                filters: children.into_iter().map(|c| c.build(depth + 1)).collect(),
            },
            Self::Composite(..) => FilterNode::exists("id"),
        }
    }
}

fn manager() -> &'static ContactManager<MemoryStore> {
    static MANAGER: OnceLock<ContactManager<MemoryStore>> = OnceLock::new();
    MANAGER.get_or_init(|| {
        let manager = ContactManager::open(MemoryStore::new()).unwrap();
        let book = manager.default_address_book().unwrap();
        for (i, city) in ["Paris", "Rome", "Paris"].into_iter().enumerate() {
            book.add(Contact {
                is_favorite: i == 0,
                addresses: vec![ContactAddress::in_city(city)],
                phone_numbers: vec![ContactPhoneNumber::new(format!("0{}00", i))],
                ..Default::default()
            })
            .unwrap();
        }
        manager
    })
}

fuzz_target!(|input: (FuzzFilter, Option<(u8, bool)>)| {
    let (filter, sort) = input;
    let filter = filter.build(0);
    let sort = sort.map(|(attr, desc)| {
        let name = ATTRIBUTES[attr as usize % ATTRIBUTES.len()];
        if desc { SortMode::desc(name) } else { SortMode::asc(name) }
    });

    let book = manager().unified_address_book();
    if let Ok(ids) = book.find_ids(Some(&filter), sort.as_ref()) {
        assert!(ids.len() <= 3);
        assert!(ids.iter().all(|id| (1..=3).contains(id)));
    }
});
