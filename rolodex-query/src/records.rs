//! Contact, person and address book records as exchanged with clients.
//!
//! Every record serializes to camelCase JSON. Fields a client leaves out
//! take their default value.
//!
//! ```rust
//! use rolodex_query::records::{Contact, ContactName, ContactPhoneNumber};
//!
//! let contact = Contact {
//!     name: Some(ContactName::new("Ada", "Lovelace")),
//!     phone_numbers: vec![ContactPhoneNumber::new("+44 20 7946 0000")],
//!     ..Default::default()
//! };
//! assert_eq!(contact.display_name().as_deref(), Some("Ada Lovelace"));
//! ```

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::types::RecordId;

/// A contact's name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ContactName {
    /// Honorific before the name, such as "Dr.".
    pub prefix: Option<String>,
    /// Suffix after the name, such as "Jr.".
    pub suffix: Option<String>,
    /// Given name.
    pub first_name: Option<String>,
    /// Middle name.
    pub middle_name: Option<String>,
    /// Family name.
    pub last_name: Option<String>,
    /// Nicknames, one row each.
    pub nicknames: Vec<String>,
    /// Phonetic spelling of the given name.
    pub phonetic_first_name: Option<String>,
    /// Phonetic spelling of the middle name.
    pub phonetic_middle_name: Option<String>,
    /// Phonetic spelling of the family name.
    pub phonetic_last_name: Option<String>,
    /// Set by the store; derived from the other fields when not given.
    pub display_name: Option<String>,
}

impl ContactName {
    /// Create a name from first and last name.
    pub fn new(first_name: impl Into<String>, last_name: impl Into<String>) -> Self {
        Self {
            first_name: Some(first_name.into()),
            last_name: Some(last_name.into()),
            ..Default::default()
        }
    }

    /// "Prefix First Middle Last, Suffix" with missing parts left out.
    pub fn full_name(&self) -> Option<String> {
        let mut name = [
            &self.prefix,
            &self.first_name,
            &self.middle_name,
            &self.last_name,
        ]
        .iter()
        .filter_map(|part| part.as_deref())
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ");

        if let Some(suffix) = self.suffix.as_deref().filter(|s| !s.is_empty()) {
            if !name.is_empty() {
                name.push_str(", ");
            }
            name.push_str(suffix);
        }

        (!name.is_empty()).then_some(name)
    }
}

/// A postal address.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ContactAddress {
    pub country: Option<String>,
    pub region: Option<String>,
    pub city: Option<String>,
    pub street_address: Option<String>,
    pub additional_information: Option<String>,
    pub postal_code: Option<String>,
    pub is_default: bool,
    /// `HOME`, `WORK`, `OTHER` or `CUSTOM`.
    pub types: Vec<String>,
    pub label: Option<String>,
}

impl ContactAddress {
    /// Create an address in `city`.
    pub fn in_city(city: impl Into<String>) -> Self {
        Self {
            city: Some(city.into()),
            ..Default::default()
        }
    }
}

/// A phone number.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ContactPhoneNumber {
    pub number: String,
    pub is_default: bool,
    /// `HOME`, `WORK`, `VOICE`, `FAX`, `CELL`, ...
    pub types: Vec<String>,
    pub label: Option<String>,
}

impl ContactPhoneNumber {
    /// Create a phone number without types.
    pub fn new(number: impl Into<String>) -> Self {
        Self {
            number: number.into(),
            ..Default::default()
        }
    }
}

/// An email address.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ContactEmailAddress {
    pub email: String,
    pub is_default: bool,
    pub types: Vec<String>,
    pub label: Option<String>,
}

impl ContactEmailAddress {
    /// Create an email address without types.
    pub fn new(email: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            ..Default::default()
        }
    }
}

/// An anniversary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactAnniversary {
    pub date: NaiveDate,
    #[serde(default)]
    pub label: Option<String>,
}

/// An organization the contact belongs to.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ContactOrganization {
    pub name: Option<String>,
    pub department: Option<String>,
    pub title: Option<String>,
    pub role: Option<String>,
    #[serde(rename = "logoURI")]
    pub logo_uri: Option<String>,
}

/// A web site.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ContactWebSite {
    pub url: String,
    #[serde(rename = "type")]
    pub kind: Option<String>,
}

/// A relationship to another person.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ContactRelationship {
    pub relative_name: String,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub label: Option<String>,
}

/// An instant messenger account.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ContactInstantMessenger {
    pub im_address: String,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub label: Option<String>,
}

/// A contact stored in an address book.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Contact {
    /// Assigned when the contact is added.
    pub id: Option<RecordId>,
    /// The person this contact is linked to. A new person is created when
    /// a contact without one is added.
    pub person_id: Option<RecordId>,
    /// Book holding the contact; the default book when not given.
    pub address_book_id: Option<RecordId>,
    /// Set by the store on every write.
    pub last_updated: Option<DateTime<Utc>>,
    /// Mirrors the favorite flag of the linked person.
    pub is_favorite: bool,
    /// Structured name.
    pub name: Option<ContactName>,
    /// Postal addresses.
    pub addresses: Vec<ContactAddress>,
    /// `file://` URI or path of the contact photo.
    #[serde(rename = "photoURI")]
    pub photo_uri: Option<String>,
    /// Phone numbers.
    pub phone_numbers: Vec<ContactPhoneNumber>,
    /// Email addresses.
    pub emails: Vec<ContactEmailAddress>,
    /// Birthday, stored as an event.
    pub birthday: Option<NaiveDate>,
    /// Anniversaries, stored as events.
    pub anniversaries: Vec<ContactAnniversary>,
    /// Organizations.
    pub organizations: Vec<ContactOrganization>,
    /// Free-form notes.
    pub notes: Vec<String>,
    /// Web sites.
    pub urls: Vec<ContactWebSite>,
    /// `file://` URI or path of the ringtone.
    #[serde(rename = "ringtoneURI")]
    pub ringtone_uri: Option<String>,
    /// Groups the contact belongs to.
    pub group_ids: Vec<RecordId>,
    /// Relationships to other people.
    pub relationships: Vec<ContactRelationship>,
    /// Instant messenger accounts.
    pub messengers: Vec<ContactInstantMessenger>,
}

impl Contact {
    /// The name shown for this contact.
    ///
    /// An explicit display name wins, then the full name, the first
    /// nickname, the first email and the first phone number.
    pub fn display_name(&self) -> Option<String> {
        let name = self.name.as_ref();
        name.and_then(|n| n.display_name.clone())
            .filter(|n| !n.is_empty())
            .or_else(|| name.and_then(ContactName::full_name))
            .or_else(|| name.and_then(|n| n.nicknames.first().cloned()))
            .or_else(|| self.emails.first().map(|e| e.email.clone()))
            .or_else(|| self.phone_numbers.first().map(|p| p.number.clone()))
    }
}

/// An aggregate of linked contacts.
///
/// Persons are never written directly; every field but the display contact
/// and the favorite flag is recomputed from the linked contacts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Person {
    /// Person id.
    pub id: RecordId,
    /// Display name of the display contact.
    pub display_name: Option<String>,
    /// Number of linked contacts, never zero for a stored person.
    pub contact_count: i64,
    /// Whether any linked contact has a phone number.
    pub has_phone_number: bool,
    /// Whether any linked contact has an email address.
    pub has_email: bool,
    /// Whether any linked contact is a favorite. Updating it writes through
    /// to every linked contact.
    pub is_favorite: bool,
    /// Photo of the display contact.
    #[serde(rename = "photoURI")]
    pub photo_uri: Option<String>,
    /// Ringtone of the display contact.
    #[serde(rename = "ringtoneURI")]
    pub ringtone_uri: Option<String>,
    /// The linked contact whose name and photo represent the person.
    pub display_contact_id: RecordId,
}

/// Summary of an address book.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AddressBookInfo {
    /// `None` for the unified address book.
    pub id: Option<RecordId>,
    /// Human readable name.
    pub name: String,
    /// Account owning the book, if any.
    pub account_id: Option<RecordId>,
    /// Read-only books reject every contact write.
    pub read_only: bool,
}
