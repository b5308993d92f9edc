use dialoguer::theme::ColorfulTheme;
use dialoguer::{Confirm, Select};

use crate::errors::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuAction {
    Backup,
    Restore,
    Exit,
}

impl MenuAction {
    pub const ALL: [MenuAction; 3] = [MenuAction::Backup, MenuAction::Restore, MenuAction::Exit];

    pub fn label(self) -> &'static str {
        match self {
            MenuAction::Backup => "Backup",
            MenuAction::Restore => "Restore",
            MenuAction::Exit => "Exit",
        }
    }
}

/// Everything the tool asks the operator.
pub trait Prompter {
    fn choose_action(&self) -> Result<MenuAction>;

    /// Index into `labels` of the chosen backup.
    fn select_backup(&self, labels: &[String]) -> Result<usize>;

    /// Yes/no question whose default answer is no.
    fn confirm(&self, question: &str) -> Result<bool>;
}

pub struct TerminalPrompter {
    theme: ColorfulTheme,
}

impl TerminalPrompter {
    pub fn new() -> Self {
        Self {
            theme: ColorfulTheme::default(),
        }
    }
}

impl Default for TerminalPrompter {
    fn default() -> Self {
        Self::new()
    }
}

impl Prompter for TerminalPrompter {
    fn choose_action(&self) -> Result<MenuAction> {
        let labels: Vec<&str> = MenuAction::ALL.iter().map(|a| a.label()).collect();
        let selection = Select::with_theme(&self.theme)
            .with_prompt("What do you want to do?")
            .items(&labels[..])
            .default(0)
            .interact()?;
        Ok(MenuAction::ALL[selection])
    }

    fn select_backup(&self, labels: &[String]) -> Result<usize> {
        let selection = Select::with_theme(&self.theme)
            .with_prompt("Select a backup to restore")
            .items(labels)
            .default(0)
            .interact()?;
        Ok(selection)
    }

    fn confirm(&self, question: &str) -> Result<bool> {
        let answer = Confirm::with_theme(&self.theme)
            .with_prompt(question)
            .default(false)
            .interact()?;
        Ok(answer)
    }
}
