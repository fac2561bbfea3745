//! CLI command implementations.

pub mod books;
pub mod find;
pub mod get;
pub mod import;
pub mod init;
pub mod persons;
pub mod remove;
pub mod version;

use std::path::PathBuf;

use serde::Serialize;
use serde_json::Value as JsonValue;

use rolodex_query::{AddressBook, ContactManager, RecordId};
use rolodex_sqlite::SqliteStore;

use crate::cli::Cli;
use crate::config::{self, Config};
use crate::error::CliResult;
use crate::output;

/// Settings shared by the commands that open the database.
#[derive(Debug)]
pub struct Context {
    pub config: Config,
    pub config_path: PathBuf,
    pub database: Option<String>,
    pub pretty: bool,
}

impl Context {
    /// Load the configuration named on the command line and initialize
    /// logging from it.
    pub fn from_cli(cli: &Cli) -> CliResult<Self> {
        let config = Config::load_or_default(&cli.config)?;
        init_logging(&config)?;

        Ok(Self {
            config,
            config_path: cli.config.clone(),
            database: cli.database.clone(),
            pretty: cli.pretty,
        })
    }

    /// Open the database.
    pub fn manager(&self) -> CliResult<ContactManager<SqliteStore>> {
        let sqlite = self
            .config
            .sqlite_config(self.database.as_deref(), &config::base_dir(&self.config_path))?;
        let store = SqliteStore::open(sqlite)?;
        Ok(ContactManager::open(store)?)
    }

    /// The address book `id`, or the unified address book when `None`.
    pub fn address_book(
        &self,
        manager: &ContactManager<SqliteStore>,
        id: Option<RecordId>,
    ) -> CliResult<AddressBook<SqliteStore>> {
        match id {
            Some(id) => Ok(manager.address_book(id)?),
            None => Ok(manager.unified_address_book()),
        }
    }

    /// Print a command result.
    pub fn emit<T: Serialize>(&self, result: &T) -> CliResult<()> {
        output::print_success(result, self.pretty)
    }
}

/// Environment settings win over the config file: the first initialization
/// takes effect and `init_logging` does nothing without them.
fn init_logging(config: &Config) -> CliResult<()> {
    rolodex_query::init_logging();
    if let Some(level) = &config.logging.level {
        rolodex_query::init_logging_with(level, config.log_format()?);
    }
    Ok(())
}

/// Parse an optional JSON argument, `null` when absent.
pub(crate) fn parse_json_arg(arg: Option<&str>) -> CliResult<JsonValue> {
    match arg {
        Some(text) => Ok(serde_json::from_str(text)?),
        None => Ok(JsonValue::Null),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CliError;
    use serde_json::json;

    #[test]
    fn test_parse_json_arg() {
        assert_eq!(parse_json_arg(None).unwrap(), JsonValue::Null);
        assert_eq!(
            parse_json_arg(Some(r#"{"attributeName":"id"}"#)).unwrap(),
            json!({"attributeName": "id"})
        );
        assert!(matches!(parse_json_arg(Some("{")), Err(CliError::Input(_))));
    }
}
