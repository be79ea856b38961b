use crate::libcommon::{Choice, CHOICES};
use dialoguer::{theme::ColorfulTheme, Confirm, Select};

/// Blocks on the terminal until a choice is picked.
pub fn ask_move(message: &str) -> dialoguer::Result<Choice> {
    let labels: Vec<&str> = CHOICES.iter().map(|c| c.as_str()).collect();
    let index = Select::with_theme(&ColorfulTheme::default())
        .with_prompt(message)
        .items(&labels)
        .default(0)
        .interact()?;
    Ok(CHOICES[index])
}

pub fn ask_rematch() -> dialoguer::Result<bool> {
    Confirm::with_theme(&ColorfulTheme::default())
        .with_prompt("Do you want to play again?")
        .default(true)
        .interact()
}
