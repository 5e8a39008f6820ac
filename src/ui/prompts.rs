use anyhow::Result;
use dialoguer::Select;

/// Interactive confirmation prompt using arrow-key navigable selection
///
/// # Returns
/// * `Ok(true)` if user selects "Yes"
/// * `Ok(false)` if user selects "No"
pub fn prompt_confirmation(prompt: &str, default_yes: bool) -> Result<bool> {
    let items = vec!["Yes", "No"];
    let default_index = if default_yes { 0 } else { 1 };

    let selection = Select::new()
        .with_prompt(prompt)
        .items(&items)
        .default(default_index)
        .interact()?;

    Ok(selection == 0)
}

/// Ask before a save that replaces every setting of a data type
pub fn confirm_bulk_save(data_type: &str, changed: usize) -> Result<bool> {
    prompt_confirmation(
        &format!("Save {} changed setting(s) for '{}'? All settings are replaced.", changed, data_type),
        true,
    )
}
