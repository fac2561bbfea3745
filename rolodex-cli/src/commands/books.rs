//! `rolodex books` command - Address book operations.

use crate::cli::{BooksArgs, BooksSubcommand};
use crate::commands::Context;
use crate::error::CliResult;
use crate::output;

/// Run the books command
pub fn run(context: &Context, args: BooksArgs) -> CliResult<()> {
    let manager = context.manager()?;

    match args.command {
        BooksSubcommand::List => context.emit(&manager.address_books()?),
        BooksSubcommand::Add { name } => {
            let info = manager.add_address_book(name)?;
            output::info(&format!("Created address book {}", info.name));
            context.emit(&info)
        }
        BooksSubcommand::Remove { id } => {
            manager.remove_address_book(id)?;
            output::info(&format!("Removed address book {}", id));
            context.emit(&id)
        }
    }
}
