//! Attribute registries: client-facing attribute names mapped to storage.
//!
//! A registry is built once and shared read-only by every search. Two are
//! provided, [`AttributeRegistry::contacts`] and [`AttributeRegistry::persons`];
//! tests and embedders can build their own with [`AttributeRegistry::builder`].

use indexmap::IndexMap;

use crate::error::{QueryError, QueryResult};
use crate::schema::{Table, event_type};
use crate::types::Value;

/// Primitive kind of an attribute, deciding how predicates are translated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveKind {
    /// Boolean flag.
    Boolean,
    /// Text.
    String,
    /// Integer, id, timestamp or `yyyymmdd` date.
    Long,
}

/// Extra equality every query on an attribute must satisfy.
///
/// Used where several attributes share one table, such as birthdays and
/// anniversaries in the events table.
#[derive(Debug, Clone, PartialEq)]
pub struct Discriminator {
    /// Column holding the discriminator.
    pub column: &'static str,
    /// Required value.
    pub value: Value,
}

/// How a match value is converted before comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ValueFormat {
    /// Used as given.
    #[default]
    Plain,
    /// `file://` URI normalized to a local path.
    Uri,
    /// `yyyymmdd` integer, or an ISO `YYYY-MM-DD` string.
    Date,
    /// Epoch seconds, or an RFC 3339 timestamp string.
    Timestamp,
}

/// Where an attribute lives and how to compare it.
#[derive(Debug, Clone, PartialEq)]
pub struct AttributeDescriptor {
    /// Backing table.
    pub table: Table,
    /// Column joining a row back to its owning record.
    pub join_key: &'static str,
    /// Column holding the value.
    pub column: &'static str,
    /// Primitive kind.
    pub kind: PrimitiveKind,
    /// Value conversion applied to match values.
    pub format: ValueFormat,
    /// Row selector for shared tables.
    pub discriminator: Option<Discriminator>,
}

impl AttributeDescriptor {
    /// Create a descriptor.
    pub fn new(
        table: Table,
        join_key: &'static str,
        column: &'static str,
        kind: PrimitiveKind,
    ) -> Self {
        Self {
            table,
            join_key,
            column,
            kind,
            format: ValueFormat::Plain,
            discriminator: None,
        }
    }

    /// Set the value conversion.
    pub fn format(mut self, format: ValueFormat) -> Self {
        self.format = format;
        self
    }

    /// Restrict rows to those whose `column` equals `value`.
    pub fn discriminated(mut self, column: &'static str, value: impl Into<Value>) -> Self {
        self.discriminator = Some(Discriminator {
            column,
            value: value.into(),
        });
        self
    }
}

/// Registry entry for one attribute name.
#[derive(Debug, Clone, PartialEq)]
pub enum Attribute {
    /// The record id itself; filters on it bypass the store.
    Id(AttributeDescriptor),
    /// An attribute the engine can evaluate.
    Supported(AttributeDescriptor),
    /// A multi-value enumeration that no scalar predicate can express.
    Unsupported,
}

/// Mapping from attribute names to storage locations.
#[derive(Debug, Clone)]
pub struct AttributeRegistry {
    primary: Table,
    attributes: IndexMap<&'static str, Attribute>,
}

impl AttributeRegistry {
    /// Start building a registry whose records live in `primary`.
    pub fn builder(primary: Table) -> AttributeRegistryBuilder {
        AttributeRegistryBuilder {
            primary,
            attributes: IndexMap::new(),
        }
    }

    /// The table holding one row per record.
    pub fn primary(&self) -> Table {
        self.primary
    }

    /// Resolve an attribute name.
    pub fn lookup(&self, name: &str) -> QueryResult<&Attribute> {
        self.attributes
            .get(name)
            .ok_or_else(|| QueryError::unknown_attribute(name))
    }

    /// Check whether an attribute name is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.attributes.contains_key(name)
    }

    /// Registered attribute names, in registration order.
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.attributes.keys().copied()
    }

    /// Number of registered attributes.
    pub fn len(&self) -> usize {
        self.attributes.len()
    }

    /// Check if the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }

    /// The registry used to search contacts.
    pub fn contacts() -> Self {
        use PrimitiveKind::{Boolean, Long, String};
        use Table::*;

        let contact = |column, kind| AttributeDescriptor::new(Contacts, "id", column, kind);
        let detail = |table, column, kind| AttributeDescriptor::new(table, "contact_id", column, kind);

        Self::builder(Contacts)
            .id(contact("id", Long))
            .attribute("personId", contact("person_id", Long))
            .attribute("addressBookId", contact("address_book_id", Long))
            .attribute(
                "lastUpdated",
                contact("changed_time", Long).format(ValueFormat::Timestamp),
            )
            .attribute("isFavorite", contact("is_favorite", Boolean))
            .attribute("name.prefix", detail(Names, "prefix", String))
            .attribute("name.suffix", detail(Names, "suffix", String))
            .attribute("name.firstName", detail(Names, "first", String))
            .attribute("name.middleName", detail(Names, "addition", String))
            .attribute("name.lastName", detail(Names, "last", String))
            .attribute("name.nicknames", detail(Nicknames, "name", String))
            .attribute("name.phoneticFirstName", detail(Names, "phonetic_first", String))
            .attribute("name.phoneticMiddleName", detail(Names, "phonetic_middle", String))
            .attribute("name.phoneticLastName", detail(Names, "phonetic_last", String))
            .attribute("name.displayName", contact("display_name", String))
            .attribute("addresses.country", detail(Addresses, "country", String))
            .attribute("addresses.region", detail(Addresses, "region", String))
            .attribute("addresses.city", detail(Addresses, "locality", String))
            .attribute("addresses.streetAddress", detail(Addresses, "street", String))
            .attribute("addresses.additionalInformation", detail(Addresses, "extended", String))
            .attribute("addresses.postalCode", detail(Addresses, "postal_code", String))
            .attribute("addresses.isDefault", detail(Addresses, "is_default", Boolean))
            .attribute("addresses.label", detail(Addresses, "label", String))
            .unsupported("addresses.types")
            .attribute(
                "photoURI",
                contact("image_path", String).format(ValueFormat::Uri),
            )
            .attribute("phoneNumbers.number", detail(Numbers, "number", String))
            .attribute("phoneNumbers.isDefault", detail(Numbers, "is_default", Boolean))
            .attribute("phoneNumbers.label", detail(Numbers, "label", String))
            .unsupported("phoneNumbers.types")
            .attribute("emails.email", detail(Emails, "email", String))
            .attribute("emails.isDefault", detail(Emails, "is_default", Boolean))
            .attribute("emails.label", detail(Emails, "label", String))
            .unsupported("emails.types")
            .attribute(
                "birthday",
                detail(Events, "date", Long)
                    .format(ValueFormat::Date)
                    .discriminated("type", event_type::BIRTHDAY),
            )
            .attribute(
                "anniversaries.date",
                detail(Events, "date", Long)
                    .format(ValueFormat::Date)
                    .discriminated("type", event_type::ANNIVERSARY),
            )
            .attribute(
                "anniversaries.label",
                detail(Events, "label", String).discriminated("type", event_type::ANNIVERSARY),
            )
            .attribute("organizations.name", detail(Companies, "name", String))
            .attribute("organizations.department", detail(Companies, "department", String))
            .attribute("organizations.title", detail(Companies, "job_title", String))
            .attribute("organizations.role", detail(Companies, "role", String))
            .attribute(
                "organizations.logoURI",
                detail(Companies, "logo", String).format(ValueFormat::Uri),
            )
            .attribute("notes", detail(Notes, "note", String))
            .attribute("urls.url", detail(Urls, "url", String))
            .unsupported("urls.type")
            .attribute(
                "ringtoneURI",
                contact("ringtone_path", String).format(ValueFormat::Uri),
            )
            .attribute("groupIds", detail(GroupRelations, "group_id", Long))
            .attribute("relationships.relativeName", detail(Relationships, "name", String))
            .attribute("relationships.label", detail(Relationships, "label", String))
            .unsupported("relationships.type")
            .attribute("messengers.imAddress", detail(Messengers, "im_id", String))
            .attribute("messengers.label", detail(Messengers, "label", String))
            .unsupported("messengers.type")
            .build()
    }

    /// The registry used to search persons.
    pub fn persons() -> Self {
        use PrimitiveKind::{Boolean, Long, String};

        let person = |column, kind| AttributeDescriptor::new(Table::Persons, "id", column, kind);

        Self::builder(Table::Persons)
            .id(person("id", Long))
            .attribute("displayName", person("display_name", String))
            .attribute("contactCount", person("contact_count", Long))
            .attribute("hasPhoneNumber", person("has_phonenumber", Boolean))
            .attribute("hasEmail", person("has_email", Boolean))
            .attribute("isFavorite", person("is_favorite", Boolean))
            .attribute(
                "photoURI",
                person("image_path", String).format(ValueFormat::Uri),
            )
            .attribute(
                "ringtoneURI",
                person("ringtone_path", String).format(ValueFormat::Uri),
            )
            .attribute("displayContactId", person("display_contact_id", Long))
            .build()
    }
}

/// Builder for [`AttributeRegistry`].
#[derive(Debug)]
pub struct AttributeRegistryBuilder {
    primary: Table,
    attributes: IndexMap<&'static str, Attribute>,
}

impl AttributeRegistryBuilder {
    /// Register the `id` attribute.
    pub fn id(mut self, descriptor: AttributeDescriptor) -> Self {
        self.attributes.insert("id", Attribute::Id(descriptor));
        self
    }

    /// Register a supported attribute.
    pub fn attribute(mut self, name: &'static str, descriptor: AttributeDescriptor) -> Self {
        self.attributes.insert(name, Attribute::Supported(descriptor));
        self
    }

    /// Register an attribute that filters cannot evaluate.
    pub fn unsupported(mut self, name: &'static str) -> Self {
        self.attributes.insert(name, Attribute::Unsupported);
        self
    }

    /// Finish the registry.
    pub fn build(self) -> AttributeRegistry {
        AttributeRegistry {
            primary: self.primary,
            attributes: self.attributes,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;

    #[test]
    fn test_contacts_registry() {
        let registry = AttributeRegistry::contacts();
        assert_eq!(registry.primary(), Table::Contacts);

        match registry.lookup("addresses.city").unwrap() {
            Attribute::Supported(d) => {
                assert_eq!(d.table, Table::Addresses);
                assert_eq!(d.join_key, "contact_id");
                assert_eq!(d.column, "locality");
                assert_eq!(d.kind, PrimitiveKind::String);
            }
            other => panic!("unexpected {:?}", other),
        }

        assert!(matches!(registry.lookup("id").unwrap(), Attribute::Id(_)));
        assert!(matches!(
            registry.lookup("phoneNumbers.types").unwrap(),
            Attribute::Unsupported
        ));
    }

    #[test]
    fn test_events_are_discriminated() {
        let registry = AttributeRegistry::contacts();
        let Attribute::Supported(birthday) = registry.lookup("birthday").unwrap() else {
            panic!("birthday must be supported");
        };
        let Attribute::Supported(anniversary) = registry.lookup("anniversaries.date").unwrap() else {
            panic!("anniversaries.date must be supported");
        };

        assert_eq!(birthday.table, anniversary.table);
        assert_eq!(birthday.format, ValueFormat::Date);
        assert_eq!(
            birthday.discriminator.as_ref().map(|d| d.value.clone()),
            Some(Value::Int(event_type::BIRTHDAY))
        );
        assert_eq!(
            anniversary.discriminator.as_ref().map(|d| d.value.clone()),
            Some(Value::Int(event_type::ANNIVERSARY))
        );
    }

    #[test]
    fn test_registry_columns_exist() {
        for registry in [AttributeRegistry::contacts(), AttributeRegistry::persons()] {
            for name in registry.names() {
                if let Attribute::Supported(d) | Attribute::Id(d) = registry.lookup(name).unwrap() {
                    assert!(d.table.column(d.column).is_some(), "{} -> {}", name, d.column);
                    assert!(d.table.column(d.join_key).is_some(), "{} -> {}", name, d.join_key);
                }
            }
        }
    }

    #[test]
    fn test_unknown_attribute() {
        let err = AttributeRegistry::persons().lookup("name.firstName").unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidValues);
    }
}
