use crate::fieldset::{OrderAxis, SettingFlag};
use clap::{Args, Subcommand, ValueEnum};

#[derive(Args)]
pub struct SettingsCommands {
    #[command(subcommand)]
    pub command: SettingsSubcommands,
}

#[derive(Subcommand)]
pub enum SettingsSubcommands {
    /// Show the fields of a data type in display order
    Show {
        /// Page data type, e.g. goods_receipt
        #[arg(short, long)]
        data_type: String,
        /// Which ordering to show
        #[arg(short, long, value_enum, default_value_t = AxisArg::List)]
        axis: AxisArg,
    },
    /// Move a field within one ordering and save
    Move {
        #[arg(short, long)]
        data_type: String,
        #[arg(short, long, value_enum)]
        axis: AxisArg,
        /// Current 1-based position as printed by `show`
        #[arg(long)]
        from: usize,
        /// New 1-based position
        #[arg(long)]
        to: usize,
        /// Skip confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
    /// Flip a flag of one field and save
    Toggle {
        #[arg(short, long)]
        data_type: String,
        /// Model field name
        #[arg(long)]
        field: String,
        #[arg(long, value_enum)]
        flag: FlagArg,
        /// Skip confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum AxisArg {
    List,
    Search,
}

impl From<AxisArg> for OrderAxis {
    fn from(axis: AxisArg) -> Self {
        match axis {
            AxisArg::List => OrderAxis::List,
            AxisArg::Search => OrderAxis::Search,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum FlagArg {
    List,
    Search,
    Filter,
}

impl From<FlagArg> for SettingFlag {
    fn from(flag: FlagArg) -> Self {
        match flag {
            FlagArg::List => SettingFlag::ListDisplay,
            FlagArg::Search => SettingFlag::SearchField,
            FlagArg::Filter => SettingFlag::ListFilter,
        }
    }
}
