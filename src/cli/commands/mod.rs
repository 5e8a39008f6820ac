pub mod config;
pub mod mappings;
pub mod settings;
