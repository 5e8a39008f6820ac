use super::connect;
use crate::api::MesClient;
use crate::config::Config;
use crate::editor::{Banner, DisplaySettingsEditor};
use crate::fieldset::{OrderAxis, SettingFlag};
use crate::ui::prompts::confirm_bulk_save;
use anyhow::{Result, bail};
use colored::*;
use log::info;

async fn load_editor(config: &Config, data_type: &str) -> Result<DisplaySettingsEditor<MesClient>> {
    let client = connect(config)?;
    let mut editor = DisplaySettingsEditor::new(client, data_type, config.sources_for(data_type));
    if let Err(err) = editor.load().await {
        bail!("Failed to load settings for '{}': {}", data_type, err.banner());
    }
    Ok(editor)
}

fn print_projection(editor: &DisplaySettingsEditor<MesClient>, axis: OrderAxis) {
    println!("{} ({})", axis.title().bold(), editor.data_type());
    println!("{}", "=".repeat(40));

    for (index, projected) in editor.projection(axis).iter().enumerate() {
        let row = &editor.rows()[projected.position];
        let line = format!(
            "{:>3}  {:>5}  {:<30} {}",
            index + 1,
            projected.order,
            row.name,
            row.effective_display_name()
        );
        if projected.active {
            println!("{}", line);
        } else {
            println!("{}", line.dimmed());
        }
    }
}

fn print_banner(banner: Option<&Banner>) {
    match banner {
        Some(banner) if banner.is_error() => println!("{} {}", "✗".bright_red().bold(), banner.text),
        Some(banner) => println!("{} {}", "✓".bright_green().bold(), banner.text),
        None => {}
    }
}

async fn save(editor: &mut DisplaySettingsEditor<MesClient>, yes: bool) -> Result<()> {
    let changed = editor.changed_count();
    if changed == 0 {
        println!("{}", "Nothing changed.".dimmed());
        return Ok(());
    }
    if !yes && !confirm_bulk_save(editor.data_type(), changed)? {
        println!("Cancelled.");
        return Ok(());
    }

    let result = editor.save().await;
    print_banner(editor.banner());
    if let Err(err) = result {
        bail!("Save failed: {}", err);
    }
    Ok(())
}

/// Print the fields of a data type in `axis` order
pub async fn show_command(data_type: &str, axis: OrderAxis) -> Result<()> {
    let config = Config::load()?;
    let editor = load_editor(&config, data_type).await?;

    if editor.rows().is_empty() {
        println!("No configurable fields for '{}'.", data_type);
        return Ok(());
    }

    print_projection(&editor, axis);
    println!("\nTotal fields: {}", editor.rows().len());
    Ok(())
}

/// Move the field at 1-based position `from` to `to` and save
pub async fn move_command(data_type: &str, axis: OrderAxis, from: usize, to: usize, yes: bool) -> Result<()> {
    if from == 0 || to == 0 {
        bail!("Positions start at 1");
    }

    let config = Config::load()?;
    let mut editor = load_editor(&config, data_type).await?;
    editor.drag(axis, from - 1, Some(to - 1))?;
    info!("Moved {:?} position {} to {} for '{}'", axis, from, to, data_type);

    print_projection(&editor, axis);
    save(&mut editor, yes).await
}

/// Flip one flag of `field` and save
pub async fn toggle_command(data_type: &str, field: &str, flag: SettingFlag, yes: bool) -> Result<()> {
    let config = Config::load()?;
    let mut editor = load_editor(&config, data_type).await?;

    if !editor.toggle(field, flag) {
        bail!("Field '{}' not found for '{}'", field, data_type);
    }
    let value = editor
        .rows()
        .iter()
        .find(|row| row.name == field)
        .is_some_and(|row| row.flag(flag));
    println!("{} {} = {}", field.bold(), flag.field_name(), value);

    save(&mut editor, yes).await
}
