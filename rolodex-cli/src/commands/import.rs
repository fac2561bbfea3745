//! `rolodex import` command - Add contacts from a JSON file.

use std::io::Read;

use serde::Deserialize;

use rolodex_query::records::Contact;

use crate::cli::ImportArgs;
use crate::commands::Context;
use crate::error::CliResult;
use crate::output;

/// A single contact or a list of contacts.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ImportInput {
    Many(Vec<Contact>),
    One(Box<Contact>),
}

impl ImportInput {
    fn into_contacts(self) -> Vec<Contact> {
        match self {
            Self::Many(contacts) => contacts,
            Self::One(contact) => vec![*contact],
        }
    }
}

/// Run the import command
pub fn run(context: &Context, args: ImportArgs) -> CliResult<()> {
    let content = if args.file.as_os_str() == "-" {
        let mut content = String::new();
        std::io::stdin().read_to_string(&mut content)?;
        content
    } else {
        std::fs::read_to_string(&args.file)?
    };
    let contacts = parse_contacts(&content)?;

    let manager = context.manager()?;
    let book = match args.book {
        Some(id) => manager.address_book(id)?,
        None => manager.default_address_book()?,
    };

    let added = book.add_batch(contacts)?;
    output::info(&format!("Imported {} contacts into {}", added.len(), book.name()));
    context.emit(&added)
}

fn parse_contacts(content: &str) -> CliResult<Vec<Contact>> {
    let input: ImportInput = serde_json::from_str(content)?;
    Ok(input.into_contacts())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_contacts() {
        let many = parse_contacts(r#"[{"isFavorite": true}, {"notes": ["hi"]}]"#).unwrap();
        assert_eq!(many.len(), 2);
        assert!(many[0].is_favorite);

        let one = parse_contacts(r#"{"addresses": [{"city": "Paris"}]}"#).unwrap();
        assert_eq!(one.len(), 1);
        assert_eq!(one[0].addresses[0].city.as_deref(), Some("Paris"));

        assert!(parse_contacts("42").is_err());
    }
}
