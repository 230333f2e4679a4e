//! Yes/no confirmation prompts.

use anyhow::{Context, Result};
use dialoguer::Confirm;

pub trait Confirmer {
    fn confirm(&self, prompt: &str) -> Result<bool>;
}

/// Blocking terminal prompt; anything but an explicit yes declines.
pub struct TerminalConfirmer;

impl Confirmer for TerminalConfirmer {
    fn confirm(&self, prompt: &str) -> Result<bool> {
        Confirm::new()
            .with_prompt(prompt)
            .default(false)
            .interact()
            .context("read confirmation from prompt")
    }
}

#[cfg(test)]
pub(crate) struct CannedAnswer(pub bool);

#[cfg(test)]
impl Confirmer for CannedAnswer {
    fn confirm(&self, _prompt: &str) -> Result<bool> {
        Ok(self.0)
    }
}
