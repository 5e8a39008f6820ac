pub mod api;
pub mod cli;
pub mod commands;
pub mod config;
pub mod editor;
pub mod fieldset;
pub mod formset;
pub mod ui;
