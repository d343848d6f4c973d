//! Key dispatch: one logical key → one editor action.

use super::Editor;
use crate::keys::{ctrl, Key};
use crate::terminal::Console;
use crate::types::Cursor;
use anyhow::Result;

const QUIT: u8 = ctrl(b'q');
const SAVE: u8 = ctrl(b's');
const FIND: u8 = ctrl(b'f');
const REFRESH: u8 = ctrl(b'l');
const BACKSPACE: u8 = ctrl(b'h');

impl Editor {
    /// Apply one key.
    ///
    /// Returns `Ok(true)` if the editor should quit, `Ok(false)` otherwise. Saving and searching
    /// open a prompt, which reads further keys from `console` until it is closed.
    pub fn process_key<C: Console + ?Sized>(&mut self, key: Key, console: &mut C) -> Result<bool> {
        match key {
            Key::Char(QUIT) => {
                if self.buf.dirty > 0 && !self.quit_guard.press() {
                    let n = self.quit_guard.remaining();
                    self.set_status(format!(
                        "WARNING!!! File has unsaved changes. Press Ctrl-Q {n} more times to quit."
                    ));
                    return Ok(false);
                }
                return Ok(true);
            }

            Key::Char(b'\r') => self.insert_newline(),
            Key::Char(SAVE) => self.save(console)?,
            Key::Char(FIND) => self.find(console)?,

            Key::Backspace | Key::Char(BACKSPACE) => self.delete_char(),
            Key::Delete => {
                self.move_cursor(Key::ArrowRight);
                self.delete_char();
            }

            Key::Home => self.move_home(),
            Key::End => self.move_end(),
            Key::PageUp | Key::PageDown => self.page(key),
            Key::ArrowLeft | Key::ArrowRight | Key::ArrowUp | Key::ArrowDown => {
                self.move_cursor(key);
            }

            Key::Char(REFRESH) | Key::Escape => {}

            Key::Char(c) => self.insert_char(c),
        }

        self.quit_guard.reset();
        Ok(false)
    }

    /// Insert a byte at the cursor. On the line past the end a new row is started first.
    pub fn insert_char(&mut self, c: u8) {
        if self.cursor.cy == self.buf.row_count() {
            self.buf.insert_row(self.buf.row_count(), b"");
        }
        self.buf.insert_char(self.cursor.cy, self.cursor.cx, c);
        self.cursor.cx += 1;
    }

    /// Enter: split the current row at the cursor and move to the start of the new row.
    pub fn insert_newline(&mut self) {
        if self.cursor.cy == self.buf.row_count() {
            self.buf.insert_row(self.cursor.cy, b"");
        } else {
            self.buf.split_at(self.cursor.cy, self.cursor.cx);
        }
        self.cursor.cy += 1;
        self.cursor.cx = 0;
    }

    /// Backspace: delete the byte left of the cursor, or join with the previous row at column 0.
    pub fn delete_char(&mut self) {
        let Cursor { cx, cy, .. } = self.cursor;
        if cy == self.buf.row_count() || (cx == 0 && cy == 0) {
            return;
        }
        if cx > 0 {
            self.buf.delete_char(cy, cx - 1);
            self.cursor.cx -= 1;
        } else if let Some(join) = self.buf.join_with_previous(cy) {
            self.cursor.cy -= 1;
            self.cursor.cx = join;
        }
    }
}
