use super::commands::config::ConfigCommands;
use super::commands::mappings::MappingsCommands;
use super::commands::settings::SettingsCommands;
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "mes-fieldset")]
#[command(about = "Edit MES page display settings and CSV import mappings")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Page display settings (list and search field order, flags)
    Settings(SettingsCommands),
    /// CSV import column mappings
    Mappings(MappingsCommands),
    /// Local configuration
    Config(ConfigCommands),
}
