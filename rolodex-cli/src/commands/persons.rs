//! `rolodex persons` command - Person operations.

use rolodex_query::{FilterNode, SortMode};

use crate::cli::{PersonsArgs, PersonsSubcommand};
use crate::commands::{Context, parse_json_arg};
use crate::error::CliResult;
use crate::output;

/// Run the persons command
pub fn run(context: &Context, args: PersonsArgs) -> CliResult<()> {
    let manager = context.manager()?;

    match args.command {
        PersonsSubcommand::Find { filter, sort, ids } => {
            let filter = parse_json_arg(filter.as_deref())?;
            let sort = parse_json_arg(sort.as_deref())?;
            if ids {
                let filter = FilterNode::from_optional_json(&filter)?;
                let sort = SortMode::from_json(&sort)?;
                context.emit(&manager.find_ids(filter.as_ref(), sort.as_ref())?)
            } else {
                context.emit(&manager.find_json(&filter, &sort)?)
            }
        }
        PersonsSubcommand::Get { id } => context.emit(&manager.get(id)?),
        PersonsSubcommand::Update {
            id,
            favorite,
            display_contact,
        } => {
            let mut person = manager.get(id)?;
            if let Some(favorite) = favorite {
                person.is_favorite = favorite;
            }
            if let Some(contact) = display_contact {
                person.display_contact_id = contact;
            }
            context.emit(&manager.update(&person)?)
        }
        PersonsSubcommand::Link { id, other } => {
            let person = manager.link(id, other)?;
            output::info(&format!("Linked person {} into {}", other, id));
            context.emit(&person)
        }
        PersonsSubcommand::Unlink { id, contact } => {
            let person = manager.unlink(id, contact)?;
            output::info(&format!("Unlinked contact {} from person {}", contact, id));
            context.emit(&person)
        }
        PersonsSubcommand::Remove { id } => {
            manager.remove(id)?;
            output::info(&format!("Removed person {}", id));
            context.emit(&id)
        }
    }
}
