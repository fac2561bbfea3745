//! CLI argument definitions using clap.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::config::CONFIG_FILE_NAME;

/// Rolodex - contact search and address books
#[derive(Parser, Debug)]
#[command(name = "rolodex")]
#[command(author = "Pegasus Heavy Industries LLC")]
#[command(version)]
#[command(about = "Rolodex - contact search and address books", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to the configuration file
    #[arg(short, long, global = true, env = "ROLODEX_CONFIG", default_value = CONFIG_FILE_NAME)]
    pub config: PathBuf,

    /// Database path or URL, overriding the configuration file
    #[arg(short, long, global = true, env = "ROLODEX_DATABASE")]
    pub database: Option<String>,

    /// Pretty-print JSON output
    #[arg(long, global = true)]
    pub pretty: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create a configuration file and an empty database
    Init(InitArgs),

    /// Import contacts from a JSON file
    Import(ImportArgs),

    /// Find contacts matching a filter
    Find(FindArgs),

    /// Get a contact by id
    Get(GetArgs),

    /// Remove contacts by id
    Remove(RemoveArgs),

    /// Person commands
    Persons(PersonsArgs),

    /// Address book commands
    Books(BooksArgs),

    /// Display version information
    Version,
}

// =============================================================================
// Init Command
// =============================================================================

/// Arguments for the `init` command
#[derive(Args, Debug)]
pub struct InitArgs {
    /// Directory to initialize (defaults to current directory)
    #[arg(default_value = ".")]
    pub path: PathBuf,

    /// Overwrite an existing configuration file
    #[arg(short, long)]
    pub force: bool,
}

// =============================================================================
// Contact Commands
// =============================================================================

/// Arguments for the `import` command
#[derive(Args, Debug)]
pub struct ImportArgs {
    /// JSON file holding a contact or an array of contacts ("-" for stdin)
    pub file: PathBuf,

    /// Address book to import into (defaults to the default address book)
    #[arg(short, long)]
    pub book: Option<i64>,
}

/// Arguments for the `find` command
#[derive(Args, Debug)]
pub struct FindArgs {
    /// Filter as JSON, e.g. '{"filterType":"AttributeFilter",...}'
    #[arg(short, long)]
    pub filter: Option<String>,

    /// Sort mode as JSON, e.g. '{"attributeName":"id","order":"DESC"}'
    #[arg(short, long)]
    pub sort: Option<String>,

    /// Address book to search (defaults to every address book)
    #[arg(short, long)]
    pub book: Option<i64>,

    /// Print matching ids instead of contacts
    #[arg(long)]
    pub ids: bool,
}

/// Arguments for the `get` command
#[derive(Args, Debug)]
pub struct GetArgs {
    /// Contact id
    pub id: i64,

    /// Address book holding the contact (defaults to every address book)
    #[arg(short, long)]
    pub book: Option<i64>,
}

/// Arguments for the `remove` command
#[derive(Args, Debug)]
pub struct RemoveArgs {
    /// Contact ids
    #[arg(required = true)]
    pub ids: Vec<i64>,

    /// Address book holding the contacts (defaults to every address book)
    #[arg(short, long)]
    pub book: Option<i64>,
}

// =============================================================================
// Persons Command
// =============================================================================

/// Arguments for the `persons` command
#[derive(Args, Debug)]
pub struct PersonsArgs {
    #[command(subcommand)]
    pub command: PersonsSubcommand,
}

/// Person subcommands
#[derive(Subcommand, Debug)]
pub enum PersonsSubcommand {
    /// Find persons matching a filter
    Find {
        /// Filter as JSON
        #[arg(short, long)]
        filter: Option<String>,

        /// Sort mode as JSON
        #[arg(short, long)]
        sort: Option<String>,

        /// Print matching ids instead of persons
        #[arg(long)]
        ids: bool,
    },

    /// Get a person by id
    Get {
        /// Person id
        id: i64,
    },

    /// Update a person's favorite flag or display contact
    Update {
        /// Person id
        id: i64,

        /// Mark the person and all of its contacts as favorite
        #[arg(long)]
        favorite: Option<bool>,

        /// Contact whose details represent the person
        #[arg(long)]
        display_contact: Option<i64>,
    },

    /// Merge another person's contacts into a person
    Link {
        /// Person that keeps the contacts
        id: i64,

        /// Person to merge
        other: i64,
    },

    /// Move a contact out of a person into a new person
    Unlink {
        /// Person id
        id: i64,

        /// Contact to move
        contact: i64,
    },

    /// Remove a person and all of its contacts
    Remove {
        /// Person id
        id: i64,
    },
}

// =============================================================================
// Books Command
// =============================================================================

/// Arguments for the `books` command
#[derive(Args, Debug)]
pub struct BooksArgs {
    #[command(subcommand)]
    pub command: BooksSubcommand,
}

/// Address book subcommands
#[derive(Subcommand, Debug)]
pub enum BooksSubcommand {
    /// List address books
    List,

    /// Create an address book
    Add {
        /// Address book name
        name: String,
    },

    /// Remove an address book and its contacts
    Remove {
        /// Address book id
        id: i64,
    },
}
