use anyhow::Result;
use clap::Parser;
use log::info;

use mes_fieldset::cli::Cli;
use mes_fieldset::cli::app::Commands;
use mes_fieldset::cli::commands::config::ConfigSubcommands;
use mes_fieldset::cli::commands::mappings::MappingsSubcommands;
use mes_fieldset::cli::commands::settings::SettingsSubcommands;
use mes_fieldset::commands;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logger to file (truncate on each run)
    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open("mes-fieldset.log")?;
    env_logger::Builder::from_default_env()
        .target(env_logger::Target::Pipe(Box::new(log_file)))
        .init();

    // A missing .env is fine
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    info!("Starting mes-fieldset");

    match cli.command {
        Commands::Settings(settings) => match settings.command {
            SettingsSubcommands::Show { data_type, axis } => {
                commands::settings::show_command(&data_type, axis.into()).await
            }
            SettingsSubcommands::Move {
                data_type,
                axis,
                from,
                to,
                yes,
            } => commands::settings::move_command(&data_type, axis.into(), from, to, yes).await,
            SettingsSubcommands::Toggle {
                data_type,
                field,
                flag,
                yes,
            } => commands::settings::toggle_command(&data_type, &field, flag.into(), yes).await,
        },
        Commands::Mappings(mappings) => match mappings.command {
            MappingsSubcommands::List { data_type } => commands::mappings::list_command(&data_type).await,
            MappingsSubcommands::Add {
                data_type,
                header,
                field,
                display_name,
                update_key,
            } => commands::mappings::add_command(&data_type, header, field, display_name, update_key).await,
            MappingsSubcommands::Delete { data_type, id, force } => {
                commands::mappings::delete_command(&data_type, &id, force).await
            }
        },
        Commands::Config(config) => match config.command {
            ConfigSubcommands::Show => commands::config::show_command().await,
            ConfigSubcommands::SetUrl { url } => commands::config::set_url_command(&url).await,
        },
    }
}
