//! `rolodex version` command - Display version information.

use crate::error::CliResult;
use crate::output::{self, kv};

/// Package version
const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Package name
const NAME: &str = env!("CARGO_PKG_NAME");

/// Run the version command
pub fn run() -> CliResult<()> {
    output::section("Rolodex");
    kv("Version", VERSION);
    kv("Binary", NAME);

    #[cfg(debug_assertions)]
    let build_mode = "debug";
    #[cfg(not(debug_assertions))]
    let build_mode = "release";

    kv("Build", build_mode);
    kv("SQLite", rolodex_sqlite::sqlite_version());

    output::newline();
    output::section("Components");
    kv("rolodex-query", VERSION);
    kv("rolodex-sqlite", VERSION);

    output::newline();
    output::dim("https://github.com/pegasusheavy/rolodex");

    Ok(())
}
