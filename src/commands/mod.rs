pub mod explain;
pub mod feed;
pub mod filter;
pub mod init;
pub mod search;

use std::path::Path;

use crate::config::Config;
use crate::error::Result;

/// Load the config for a command: explicit path, discovered file, or defaults.
pub(crate) fn load_config(explicit: Option<&Path>) -> Result<Config> {
    Config::discover(explicit)
}
