//! Config command implementation.

use crate::cli::{ConfigAction, ConfigArgs};
use crate::config::Config;
use crate::error::Result;
use crate::output::Formatter;
use std::path::Path;

/// Execute the config command.
pub fn execute_config(
    args: ConfigArgs,
    config: &Config,
    path: &Path,
    formatter: &Formatter,
) -> Result<()> {
    match args.action {
        ConfigAction::Show => {
            if !path.exists() {
                eprintln!(
                    "{}",
                    formatter.info(&format!("{} not found, showing defaults", path.display()))
                );
            }
            print!("{}", config.to_toml()?);
        }
        ConfigAction::Default => print!("{}", Config::default().to_toml()?),
        ConfigAction::Path => println!("{}", path.display()),
    }
    Ok(())
}
