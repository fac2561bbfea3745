//! `rolodex find` command - Search contacts.

use rolodex_query::{FilterNode, SortMode};

use crate::cli::FindArgs;
use crate::commands::{Context, parse_json_arg};
use crate::error::CliResult;

/// Run the find command
pub fn run(context: &Context, args: FindArgs) -> CliResult<()> {
    let filter = parse_json_arg(args.filter.as_deref())?;
    let sort = parse_json_arg(args.sort.as_deref())?;

    let manager = context.manager()?;
    let book = context.address_book(&manager, args.book)?;

    if args.ids {
        let filter = FilterNode::from_optional_json(&filter)?;
        let sort = SortMode::from_json(&sort)?;
        context.emit(&book.find_ids(filter.as_ref(), sort.as_ref())?)
    } else {
        context.emit(&book.find_json(&filter, &sort)?)
    }
}
