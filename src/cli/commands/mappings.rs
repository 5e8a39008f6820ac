use clap::{Args, Subcommand};

#[derive(Args)]
pub struct MappingsCommands {
    #[command(subcommand)]
    pub command: MappingsSubcommands,
}

#[derive(Subcommand)]
pub enum MappingsSubcommands {
    /// List CSV column mappings of a data type
    List {
        #[arg(short, long)]
        data_type: String,
    },
    /// Add a mapping after the existing ones
    Add {
        #[arg(short, long)]
        data_type: String,
        /// Column header in the CSV file
        #[arg(long)]
        header: String,
        /// Model field the column is imported into
        #[arg(long)]
        field: String,
        #[arg(long, default_value = "")]
        display_name: String,
        /// Use this column to find existing records
        #[arg(long)]
        update_key: bool,
    },
    /// Delete a mapping by id
    Delete {
        #[arg(short, long)]
        data_type: String,
        id: String,
        /// Skip confirmation prompt
        #[arg(short, long)]
        force: bool,
    },
}
