//! Modal prompt in the message bar (save-as file name, search query).

use super::search::{SearchSession, SearchStep};
use super::Editor;
use crate::keys::{ctrl, Key};
use crate::terminal::Console;
use anyhow::Result;

impl Editor {
    /// Read a line of input in the message bar.
    ///
    /// `template` is shown with `{}` replaced by the text typed so far. Runs its own
    /// render → read → update loop until Enter (with non-empty input) or Escape. When a search
    /// session is given it is advanced after every key, so matches follow the typing.
    ///
    /// Returns `None` if the prompt was cancelled.
    pub(crate) fn prompt<C: Console + ?Sized>(
        &mut self,
        console: &mut C,
        template: &str,
        mut session: Option<&mut SearchSession>,
    ) -> Result<Option<String>> {
        let mut input = String::new();

        loop {
            self.set_status(template.replace("{}", &input));
            self.refresh_screen(console)?;

            let Some(key) = console.read_key()? else {
                continue;
            };

            let done = match edit_input(&mut input, key) {
                PromptEdit::Ignored => continue,
                PromptEdit::Editing => None,
                PromptEdit::Cancel => {
                    self.set_status("");
                    Some(None)
                }
                PromptEdit::Submit => {
                    self.set_status("");
                    Some(Some(input.clone()))
                }
            };

            if let Some(session) = session.as_deref_mut() {
                let step = session.advance(&mut self.buf, input.as_bytes(), key);
                self.apply_search_step(step);
            }

            if let Some(result) = done {
                return Ok(result);
            }
        }
    }

    fn apply_search_step(&mut self, step: SearchStep) {
        if let SearchStep::Found { row, cx } = step {
            self.cursor.cy = row;
            self.cursor.cx = cx;
            // Push the offset past the end so the next scroll puts the match on the top row.
            self.view.row_off = self.buf.row_count();
        }
    }
}

/// What one key did to the prompt's input line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PromptEdit {
    /// The prompt stays open (the text may have changed).
    Editing,
    /// Enter on an empty line: nothing happens at all.
    Ignored,
    Cancel,
    Submit,
}

fn edit_input(input: &mut String, key: Key) -> PromptEdit {
    match key {
        Key::Delete | Key::Backspace => {
            input.pop();
        }
        Key::Char(c) if c == ctrl(b'h') => {
            input.pop();
        }
        Key::Escape => return PromptEdit::Cancel,
        Key::Char(b'\r') if input.is_empty() => return PromptEdit::Ignored,
        Key::Char(b'\r') => return PromptEdit::Submit,
        Key::Char(c) if c.is_ascii() && !c.is_ascii_control() => input.push(char::from(c)),
        _ => {}
    }
    PromptEdit::Editing
}
