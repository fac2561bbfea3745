//! `rolodex init` command - Create a configuration file and database.

use serde_json::json;

use rolodex_query::ContactManager;
use rolodex_sqlite::SqliteStore;

use crate::cli::{Cli, InitArgs};
use crate::config::{CONFIG_FILE_NAME, Config};
use crate::error::{CliError, CliResult};
use crate::output;

/// Run the init command
pub fn run(args: &InitArgs, cli: &Cli) -> CliResult<()> {
    std::fs::create_dir_all(&args.path)?;
    let config_path = args.path.join(CONFIG_FILE_NAME);

    if config_path.exists() && !args.force {
        return Err(CliError::Config(format!(
            "{} already exists, use --force to overwrite it",
            config_path.display()
        )));
    }

    let mut config = Config::default();
    if let Some(database) = &cli.database {
        config.database.path = database.clone();
    }
    config.save(&config_path)?;

    // Opening creates the schema and the default address book
    let sqlite = config.sqlite_config(None, &args.path)?;
    let database = sqlite.path.to_string();
    let manager = ContactManager::open(SqliteStore::open(sqlite)?)?;
    let books = manager.address_books()?;

    output::success(&format!("Initialized {}", config_path.display()));
    output::print_success(
        &json!({
            "config": config_path.display().to_string(),
            "database": database,
            "addressBooks": books,
        }),
        cli.pretty,
    )
}
