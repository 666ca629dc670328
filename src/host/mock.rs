//! Scripted input for driving the host without a terminal

use std::collections::VecDeque;
use std::sync::{Mutex, PoisonError};

use super::input::{Result, UserInput};

/// One scripted answer to a select prompt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Choice {
    /// Pick the line at this index
    Index(usize),
    /// Pick the first line containing this text
    Containing(String),
    /// Press ESC
    Escape,
}

/// Input that replays predetermined answers
///
/// Once the script runs out every select prompt is answered with ESC, so a
/// host loop always terminates.
#[derive(Debug, Default)]
pub struct ScriptedInput {
    choices: Mutex<VecDeque<Choice>>,
    /// Answer to every confirmation prompt
    pub confirm: bool,
}

impl ScriptedInput {
    /// Script picking lines by the text they contain
    #[must_use]
    pub fn new<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::from_choices(lines.into_iter().map(|s| Choice::Containing(s.into())))
    }

    #[must_use]
    pub fn from_choices(choices: impl IntoIterator<Item = Choice>) -> Self {
        Self {
            choices: Mutex::new(choices.into_iter().collect()),
            confirm: true,
        }
    }

    #[must_use]
    pub const fn confirming(mut self, confirm: bool) -> Self {
        self.confirm = confirm;
        self
    }

    /// Answers not consumed yet
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.choices
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

impl UserInput for ScriptedInput {
    fn prompt_confirm(&self, _prompt: &str, _default: bool) -> Result<Option<bool>> {
        Ok(Some(self.confirm))
    }

    fn prompt_select(
        &self,
        _prompt: &str,
        items: &[String],
        _default: Option<usize>,
    ) -> Result<Option<usize>> {
        let next = self
            .choices
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front();

        Ok(match next {
            Some(Choice::Index(index)) => Some(index),
            Some(Choice::Containing(text)) => items.iter().position(|item| item.contains(&text)),
            Some(Choice::Escape) | None => None,
        })
    }
}
