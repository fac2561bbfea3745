//! `rolodex get` command - Show a contact.

use crate::cli::GetArgs;
use crate::commands::Context;
use crate::error::CliResult;

/// Run the get command
pub fn run(context: &Context, args: GetArgs) -> CliResult<()> {
    let manager = context.manager()?;
    let book = context.address_book(&manager, args.book)?;
    context.emit(&book.get(args.id)?)
}
