//! `rolodex remove` command - Remove contacts.

use crate::cli::RemoveArgs;
use crate::commands::Context;
use crate::error::CliResult;
use crate::output;

/// Run the remove command
pub fn run(context: &Context, args: RemoveArgs) -> CliResult<()> {
    let manager = context.manager()?;
    let book = context.address_book(&manager, args.book)?;

    book.remove_batch(&args.ids)?;
    output::info(&format!("Removed {} contacts", args.ids.len()));
    context.emit(&args.ids)
}
