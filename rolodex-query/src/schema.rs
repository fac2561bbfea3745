//! Table layout shared by every store.
//!
//! Contacts are stored relationally: one row per contact in [`Table::Contacts`],
//! one row per person in [`Table::Persons`], and one row per child value
//! (phone number, address, event, ...) in a detail table joined back to its
//! contact through `contact_id`.

use std::fmt;

/// Storage type of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColumnType {
    /// 64-bit integer.
    Integer,
    /// Boolean (stored as 0/1 by SQL backends).
    Boolean,
    /// UTF-8 text.
    Text,
}

impl ColumnType {
    /// SQL type affinity for this column.
    pub fn as_sql(&self) -> &'static str {
        match self {
            Self::Integer | Self::Boolean => "INTEGER",
            Self::Text => "TEXT",
        }
    }
}

/// A column definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Column {
    /// Column name.
    pub name: &'static str,
    /// Storage type.
    pub ty: ColumnType,
}

const fn col(name: &'static str, ty: ColumnType) -> Column {
    Column { name, ty }
}

use ColumnType::{Boolean, Integer, Text};

/// Discriminator values of the `events.type` column.
pub mod event_type {
    /// The contact's birthday.
    pub const BIRTHDAY: i64 = 1;
    /// An anniversary.
    pub const ANNIVERSARY: i64 = 2;
}

/// Every table a store holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Table {
    /// Address books.
    AddressBooks,
    /// Persons (aggregates of linked contacts).
    Persons,
    /// Contacts.
    Contacts,
    /// Structured names, at most one per contact.
    Names,
    /// Nicknames.
    Nicknames,
    /// Postal addresses.
    Addresses,
    /// Phone numbers.
    Numbers,
    /// Email addresses.
    Emails,
    /// Dated events: birthdays and anniversaries.
    Events,
    /// Organizations.
    Companies,
    /// Free-form notes.
    Notes,
    /// Web sites.
    Urls,
    /// Group memberships.
    GroupRelations,
    /// Relationships to other people.
    Relationships,
    /// Instant messenger accounts.
    Messengers,
}

impl Table {
    /// All tables, parents before children.
    pub const ALL: [Table; 15] = [
        Table::AddressBooks,
        Table::Persons,
        Table::Contacts,
        Table::Names,
        Table::Nicknames,
        Table::Addresses,
        Table::Numbers,
        Table::Emails,
        Table::Events,
        Table::Companies,
        Table::Notes,
        Table::Urls,
        Table::GroupRelations,
        Table::Relationships,
        Table::Messengers,
    ];

    /// Detail tables keyed by `contact_id`.
    pub const DETAILS: [Table; 12] = [
        Table::Names,
        Table::Nicknames,
        Table::Addresses,
        Table::Numbers,
        Table::Emails,
        Table::Events,
        Table::Companies,
        Table::Notes,
        Table::Urls,
        Table::GroupRelations,
        Table::Relationships,
        Table::Messengers,
    ];

    /// The table name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::AddressBooks => "address_books",
            Self::Persons => "persons",
            Self::Contacts => "contacts",
            Self::Names => "names",
            Self::Nicknames => "nicknames",
            Self::Addresses => "addresses",
            Self::Numbers => "numbers",
            Self::Emails => "emails",
            Self::Events => "events",
            Self::Companies => "companies",
            Self::Notes => "notes",
            Self::Urls => "urls",
            Self::GroupRelations => "group_relations",
            Self::Relationships => "relationships",
            Self::Messengers => "messengers",
        }
    }

    /// Whether rows of this table carry their own `id` primary key.
    pub fn has_primary_key(&self) -> bool {
        matches!(self, Self::AddressBooks | Self::Persons | Self::Contacts)
    }

    /// Column definitions, in storage order.
    pub fn columns(&self) -> &'static [Column] {
        match self {
            Self::AddressBooks => const { &[
                col("id", Integer),
                col("name", Text),
                col("account_id", Integer),
                col("read_only", Boolean),
            ] },
            Self::Persons => const { &[
                col("id", Integer),
                col("display_name", Text),
                col("display_contact_id", Integer),
                col("contact_count", Integer),
                col("has_phonenumber", Boolean),
                col("has_email", Boolean),
                col("is_favorite", Boolean),
                col("image_path", Text),
                col("ringtone_path", Text),
            ] },
            Self::Contacts => const { &[
                col("id", Integer),
                col("person_id", Integer),
                col("address_book_id", Integer),
                col("changed_time", Integer),
                col("is_favorite", Boolean),
                col("display_name", Text),
                col("image_path", Text),
                col("ringtone_path", Text),
            ] },
            Self::Names => const { &[
                col("contact_id", Integer),
                col("prefix", Text),
                col("suffix", Text),
                col("first", Text),
                col("addition", Text),
                col("last", Text),
                col("phonetic_first", Text),
                col("phonetic_middle", Text),
                col("phonetic_last", Text),
            ] },
            Self::Nicknames => const { &[col("contact_id", Integer), col("name", Text)] },
            Self::Addresses => const { &[
                col("contact_id", Integer),
                col("country", Text),
                col("region", Text),
                col("locality", Text),
                col("street", Text),
                col("extended", Text),
                col("postal_code", Text),
                col("is_default", Boolean),
                col("type", Text),
                col("label", Text),
            ] },
            Self::Numbers => const { &[
                col("contact_id", Integer),
                col("number", Text),
                col("is_default", Boolean),
                col("type", Text),
                col("label", Text),
            ] },
            Self::Emails => const { &[
                col("contact_id", Integer),
                col("email", Text),
                col("is_default", Boolean),
                col("type", Text),
                col("label", Text),
            ] },
            Self::Events => const { &[
                col("contact_id", Integer),
                col("date", Integer),
                col("type", Integer),
                col("label", Text),
            ] },
            Self::Companies => const { &[
                col("contact_id", Integer),
                col("name", Text),
                col("department", Text),
                col("job_title", Text),
                col("role", Text),
                col("logo", Text),
            ] },
            Self::Notes => const { &[col("contact_id", Integer), col("note", Text)] },
            Self::Urls => const { &[
                col("contact_id", Integer),
                col("url", Text),
                col("type", Text),
            ] },
            Self::GroupRelations => const { &[col("contact_id", Integer), col("group_id", Integer)] },
            Self::Relationships => const { &[
                col("contact_id", Integer),
                col("name", Text),
                col("type", Text),
                col("label", Text),
            ] },
            Self::Messengers => const { &[
                col("contact_id", Integer),
                col("im_id", Text),
                col("type", Text),
                col("label", Text),
            ] },
        }
    }

    /// Look up a column definition by name.
    pub fn column(&self, name: &str) -> Option<&'static Column> {
        self.columns().iter().find(|c| c.name == name)
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
