use super::connect;
use crate::config::Config;
use crate::editor::CsvMappingEditor;
use crate::ui::prompts::prompt_confirmation;
use anyhow::{Result, bail};
use colored::*;

/// List the CSV column mappings of a data type
pub async fn list_command(data_type: &str) -> Result<()> {
    let config = Config::load()?;
    let mut editor = CsvMappingEditor::new(connect(&config)?, data_type);
    if let Err(err) = editor.load().await {
        bail!("Failed to load mappings: {}", err.banner());
    }

    if editor.mappings().is_empty() {
        println!("No CSV mappings for '{}'.", data_type);
        return Ok(());
    }

    println!("CSV Mappings ({}):", data_type);
    println!("=============");
    for mapping in editor.mappings() {
        let line = format!(
            "{:>5}  {:<24} → {:<24} {}{}{}",
            mapping.order,
            mapping.csv_header,
            mapping.model_field_name,
            mapping.display_name,
            if mapping.is_required { " [required]" } else { "" },
            if mapping.is_update_key { " [key]" } else { "" },
        );
        if mapping.is_active {
            println!("{}", line);
        } else {
            println!("{}", line.dimmed());
        }
        if let Some(id) = &mapping.id {
            println!("       {}", id.dimmed());
        }
    }
    println!("\nTotal mappings: {}", editor.mappings().len());
    Ok(())
}

/// Append a mapping after the existing ones
pub async fn add_command(
    data_type: &str,
    header: String,
    field: String,
    display_name: String,
    update_key: bool,
) -> Result<()> {
    let config = Config::load()?;
    let mut editor = CsvMappingEditor::new(connect(&config)?, data_type);
    if let Err(err) = editor.load().await {
        bail!("Failed to load mappings: {}", err.banner());
    }

    let draft = editor.open_new();
    draft.csv_header = header.clone();
    draft.model_field_name = field;
    draft.display_name = display_name;
    draft.is_update_key = update_key;

    if editor.save_draft().await.is_err() {
        if let Some(draft) = editor.draft() {
            for (name, message) in &draft.errors {
                println!("  {} {}: {}", "✗".bright_red(), name, message);
            }
        }
        let banner = editor.banner().map(|banner| banner.text.clone()).unwrap_or_default();
        bail!("Failed to add mapping: {}", banner);
    }

    println!("{} Mapping '{}' added", "✓".bright_green().bold(), header.bright_green().bold());
    Ok(())
}

/// Delete a mapping after confirmation
pub async fn delete_command(data_type: &str, id: &str, force: bool) -> Result<()> {
    if !force && !prompt_confirmation(&format!("Delete CSV mapping '{}'?", id), false)? {
        println!("Cancelled.");
        return Ok(());
    }

    let config = Config::load()?;
    let mut editor = CsvMappingEditor::new(connect(&config)?, data_type);
    if let Err(err) = editor.delete(id).await {
        bail!("Failed to delete mapping: {}", err.banner());
    }

    println!("{} Mapping '{}' deleted", "✓".bright_green().bold(), id);
    Ok(())
}
