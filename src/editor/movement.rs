//! Cursor movement.

use super::Editor;
use crate::keys::Key;

impl Editor {
    /// Move the cursor one step for an arrow key.
    ///
    /// Left at column 0 wraps to the end of the previous row, right at the end of a row wraps to
    /// the start of the next one. The column is then clamped to the landing row.
    pub fn move_cursor(&mut self, key: Key) {
        let c = &mut self.cursor;
        let row_len = self.buf.row(c.cy).map(|r| r.len());

        match key {
            Key::ArrowLeft => {
                if c.cx > 0 {
                    c.cx -= 1;
                } else if c.cy > 0 {
                    c.cy -= 1;
                    c.cx = self.buf.row_len(c.cy);
                }
            }
            Key::ArrowRight => match row_len {
                Some(len) if c.cx < len => c.cx += 1,
                Some(_) => {
                    c.cy += 1;
                    c.cx = 0;
                }
                None => {}
            },
            Key::ArrowUp => {
                c.cy = c.cy.saturating_sub(1);
            }
            Key::ArrowDown => {
                if c.cy < self.buf.row_count() {
                    c.cy += 1;
                }
            }
            _ => {}
        }

        c.cx = c.cx.min(self.buf.row_len(c.cy));
    }

    /// Page Up / Page Down: jump to the top or bottom edge of the screen, then scroll a full
    /// screen further.
    pub fn page(&mut self, key: Key) {
        let step = match key {
            Key::PageUp => {
                self.cursor.cy = self.view.row_off;
                Key::ArrowUp
            }
            Key::PageDown => {
                self.cursor.cy = (self.view.row_off + self.view.screen_rows)
                    .saturating_sub(1)
                    .min(self.buf.row_count());
                Key::ArrowDown
            }
            _ => return,
        };
        for _ in 0..self.view.screen_rows {
            self.move_cursor(step);
        }
    }

    pub fn move_home(&mut self) {
        self.cursor.cx = 0;
    }

    pub fn move_end(&mut self) {
        if self.cursor.cy < self.buf.row_count() {
            self.cursor.cx = self.buf.row_len(self.cursor.cy);
        }
    }
}
