//! Configuration management CLI commands.
//!
//! Provides `config show`, `config path` and `config init` for the
//! `[map_query]` settings.

use std::path::Path;

use clap::Subcommand;
use navmap::config::config_file_path;
use navmap::QueryConfig;

use crate::error::CliError;

/// Config subcommands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommands {
    /// Show the effective configuration
    Show,

    /// Show the configuration file path
    Path,

    /// Write a configuration file with default values
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

/// Run a config subcommand against `path` or the default location.
pub fn run(command: ConfigCommands, path: Option<&Path>) -> Result<(), CliError> {
    let path = path.map(Path::to_path_buf).unwrap_or_else(config_file_path);
    match command {
        ConfigCommands::Show => run_show(&path),
        ConfigCommands::Path => {
            println!("{}", path.display());
            Ok(())
        }
        ConfigCommands::Init { force } => run_init(&path, force).map(|written| {
            if written {
                println!("Wrote {}", path.display());
            } else {
                println!("{} already exists (use --force to overwrite)", path.display());
            }
        }),
    }
}

fn run_show(path: &Path) -> Result<(), CliError> {
    let config = QueryConfig::load_from(path)?;

    println!("Configuration ({})", path.display());
    println!();
    println!("[map_query]");
    println!("  rect_inflation_factor = {}", config.rect_inflation_factor);
    println!("  rect_inflation_increment = {}", config.rect_inflation_increment);
    println!("  row_limit = {}", config.row_limit);
    println!("  geometry_cache_size = {}", config.geometry_cache_size);
    println!("  overview_cache_size = {}", config.overview_cache_size);

    Ok(())
}

/// Write defaults to `path`; returns false if the file exists and `force` is unset.
fn run_init(path: &Path, force: bool) -> Result<bool, CliError> {
    if path.exists() && !force {
        return Ok(false);
    }
    QueryConfig::default().save_to(path)?;
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_init_writes_loadable_defaults() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("nested").join("config.ini");

        assert!(run_init(&path, false).unwrap());

        let loaded = QueryConfig::load_from(&path).unwrap();
        assert_eq!(loaded, QueryConfig::default());
    }

    #[test]
    fn test_init_keeps_existing_file_without_force() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.ini");
        std::fs::write(&path, "[map_query]\nrow_limit = 42\n").unwrap();

        assert!(!run_init(&path, false).unwrap());
        assert_eq!(QueryConfig::load_from(&path).unwrap().row_limit, 42);

        assert!(run_init(&path, true).unwrap());
        assert_eq!(QueryConfig::load_from(&path).unwrap(), QueryConfig::default());
    }
}
