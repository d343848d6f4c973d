//! Rendering: composing one frame of escape sequences and text.
//!
//! The whole frame is built in a `Vec<u8>` and handed to the console in a single write, so the
//! terminal never shows a half-drawn screen.

use super::{Editor, BAR_ROWS};
use crate::syntax::Highlight;
use crate::terminal::Console;
use anyhow::Result;
use std::io::Write;
use std::time::Instant;

const HIDE_CURSOR: &[u8] = b"\x1b[?25l";
const SHOW_CURSOR: &[u8] = b"\x1b[?25h";
const CURSOR_HOME: &[u8] = b"\x1b[H";
const CLEAR_LINE: &[u8] = b"\x1b[K";
const INVERT: &[u8] = b"\x1b[7m";
const RESET_ATTRS: &[u8] = b"\x1b[m";
const DEFAULT_FG: &[u8] = b"\x1b[39m";

/// Clear the whole screen and home the cursor (used on quit).
pub const CLEAR_SCREEN: &[u8] = b"\x1b[2J\x1b[H";

impl Editor {
    /// Recompute the render column and scroll it into view.
    pub fn scroll(&mut self) {
        self.cursor.rx = self
            .buf
            .row(self.cursor.cy)
            .map_or(0, |row| row.cx_to_rx(self.cursor.cx, self.buf.tab_stop));
        self.view.scroll(self.cursor.cy, self.cursor.rx);
    }

    /// Draw the editor.
    pub fn refresh_screen<C: Console + ?Sized>(&mut self, console: &mut C) -> Result<()> {
        let frame = self.compose_frame(Instant::now());
        console.write_frame(&frame)
    }

    /// Build one complete frame as of `now` (which decides whether the message is still shown).
    pub fn compose_frame(&mut self, now: Instant) -> Vec<u8> {
        self.scroll();

        let mut ab = Vec::with_capacity(self.view.screen_rows * (self.view.screen_cols + 8));
        ab.extend_from_slice(HIDE_CURSOR);
        ab.extend_from_slice(CURSOR_HOME);

        self.draw_rows(&mut ab);
        self.draw_status_bar(&mut ab);
        self.draw_message_bar(&mut ab, now);

        // Writing into a Vec<u8> cannot fail.
        let _ = write!(
            ab,
            "\x1b[{};{}H",
            self.cursor.cy.saturating_sub(self.view.row_off) + 1,
            self.cursor.rx.saturating_sub(self.view.col_off) + 1
        );
        ab.extend_from_slice(SHOW_CURSOR);
        ab
    }

    fn draw_rows(&self, ab: &mut Vec<u8>) {
        let cols = self.view.screen_cols;
        // A third of the way down the whole window, bars included.
        let banner_row = (self.view.screen_rows + BAR_ROWS) / 3;

        for y in 0..self.view.screen_rows {
            let filerow = y + self.view.row_off;
            match self.buf.row(filerow) {
                Some(row) => {
                    let start = self.view.col_off.min(row.render.len());
                    let end = (start + cols).min(row.render.len());
                    draw_highlighted(ab, &row.render[start..end], &row.hl[start..end]);
                }
                None if self.buf.row_count() == 0 && y == banner_row => {
                    let welcome = format!("rowpad editor -- version {}", env!("CARGO_PKG_VERSION"));
                    let welcome = &welcome.as_bytes()[..welcome.len().min(cols)];
                    let mut padding = (cols - welcome.len()) / 2;
                    if padding > 0 {
                        ab.push(b'~');
                        padding -= 1;
                    }
                    ab.resize(ab.len() + padding, b' ');
                    ab.extend_from_slice(welcome);
                }
                None => ab.push(b'~'),
            }

            ab.extend_from_slice(CLEAR_LINE);
            ab.extend_from_slice(b"\r\n");
        }
    }

    fn draw_status_bar(&self, ab: &mut Vec<u8>) {
        let cols = self.view.screen_cols;
        let rows = self.buf.row_count();

        let name = self
            .buf
            .filename()
            .map_or_else(|| "[No Name]".to_string(), |p| p.to_string_lossy().into_owned());
        let name = &name.as_bytes()[..name.len().min(20)];
        let mut status = Vec::with_capacity(cols);
        status.extend_from_slice(name);
        let _ = write!(
            status,
            " - {rows} lines {}",
            if self.buf.dirty > 0 { "(modified)" } else { "" }
        );
        let filetype = self.buf.syntax.as_ref().map_or("no ft", |s| s.filetype.as_str());
        let rstatus = format!("{} | {}/{}", filetype, self.cursor.cy + 1, rows);

        ab.extend_from_slice(INVERT);
        let mut len = status.len().min(cols);
        ab.extend_from_slice(&status[..len]);
        while len < cols {
            if cols - len == rstatus.len() {
                ab.extend_from_slice(rstatus.as_bytes());
                break;
            }
            ab.push(b' ');
            len += 1;
        }
        ab.extend_from_slice(RESET_ATTRS);
        ab.extend_from_slice(b"\r\n");
    }

    fn draw_message_bar(&self, ab: &mut Vec<u8>, now: Instant) {
        ab.extend_from_slice(CLEAR_LINE);
        if let Some(msg) = &self.status {
            if msg.is_fresh(now, self.message_timeout) {
                let text = msg.text.as_bytes();
                ab.extend_from_slice(&text[..text.len().min(self.view.screen_cols)]);
            }
        }
    }
}

/// Emit `render` with colour changes only where the highlight class changes.
fn draw_highlighted(ab: &mut Vec<u8>, render: &[u8], hl: &[Highlight]) {
    let mut current: Option<u8> = None;

    for (&c, &h) in render.iter().zip(hl) {
        if c.is_ascii_control() {
            let sym = if c <= 26 { b'@' + c } else { b'?' };
            ab.extend_from_slice(INVERT);
            ab.push(sym);
            ab.extend_from_slice(RESET_ATTRS);
            if let Some(color) = current {
                let _ = write!(ab, "\x1b[{color}m");
            }
        } else if h == Highlight::Normal {
            if current.take().is_some() {
                ab.extend_from_slice(DEFAULT_FG);
            }
            ab.push(c);
        } else {
            let color = h.color();
            if current != Some(color) {
                current = Some(color);
                let _ = write!(ab, "\x1b[{color}m");
            }
            ab.push(c);
        }
    }
    ab.extend_from_slice(DEFAULT_FG);
}
