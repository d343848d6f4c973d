//! The document buffer: a list of rows plus the editing operations on them.
//!
//! Every row keeps three parallel views of the same line:
//! - `chars`: the raw bytes as stored on disk (no line terminator),
//! - `render`: what is drawn, with tabs expanded to spaces,
//! - `hl`: one highlight class per `render` byte.
//!
//! Only `chars` is ever edited directly; `render` and `hl` are rebuilt by [`Row::update`] after
//! every change, so they can never drift apart.

use crate::syntax::{highlight_row, Highlight, Syntax};
use std::path::{Path, PathBuf};

pub const DEFAULT_TAB_STOP: usize = 8;

/// One line of the document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Row {
    pub chars: Vec<u8>,
    pub render: Vec<u8>,
    pub hl: Vec<Highlight>,
}

impl Row {
    fn new(chars: Vec<u8>, tab_stop: usize, syntax: Option<&Syntax>) -> Self {
        let mut row = Row {
            chars,
            ..Row::default()
        };
        row.update(tab_stop, syntax);
        row
    }

    pub fn len(&self) -> usize {
        self.chars.len()
    }

    /// Rebuild `render` (tab expansion) and `hl` from `chars`.
    pub fn update(&mut self, tab_stop: usize, syntax: Option<&Syntax>) {
        self.render.clear();
        for &c in &self.chars {
            if c == b'\t' {
                self.render.push(b' ');
                while self.render.len() % tab_stop != 0 {
                    self.render.push(b' ');
                }
            } else {
                self.render.push(c);
            }
        }
        self.rehighlight(syntax);
    }

    /// Rebuild `hl` only (the render text is unchanged).
    pub fn rehighlight(&mut self, syntax: Option<&Syntax>) {
        self.hl = highlight_row(&self.render, syntax);
    }

    /// File column → render column.
    pub fn cx_to_rx(&self, cx: usize, tab_stop: usize) -> usize {
        self.chars
            .iter()
            .take(cx)
            .fold(0, |rx, &c| advance(rx, c, tab_stop))
    }

    /// Render column → file column.
    ///
    /// Returns the first column whose end lies past `rx`. A render column inside the spaces of an
    /// expanded tab therefore maps to the tab itself. Past the end of the row, returns the row
    /// length.
    pub fn rx_to_cx(&self, rx: usize, tab_stop: usize) -> usize {
        let mut cur_rx = 0;
        for (cx, &c) in self.chars.iter().enumerate() {
            cur_rx = advance(cur_rx, c, tab_stop);
            if cur_rx > rx {
                return cx;
            }
        }
        self.chars.len()
    }
}

/// Render column after drawing byte `c` starting at `rx`.
fn advance(rx: usize, c: u8, tab_stop: usize) -> usize {
    if c == b'\t' {
        rx + (tab_stop - rx % tab_stop)
    } else {
        rx + 1
    }
}

/// The document: rows, dirty counter, file name and active language profile.
pub struct Buffer {
    pub rows: Vec<Row>,
    /// Number of changes since the last save (0 = clean).
    pub dirty: usize,
    pub filename: Option<PathBuf>,
    pub syntax: Option<Syntax>,
    pub tab_stop: usize,
}

impl Buffer {
    /// An empty, unnamed document.
    pub fn new(tab_stop: usize) -> Self {
        Self {
            rows: Vec::new(),
            dirty: 0,
            filename: None,
            syntax: None,
            tab_stop,
        }
    }

    /// Build a document from already-split lines. Loading does not count as a change.
    pub fn from_lines<I>(lines: I, tab_stop: usize) -> Self
    where
        I: IntoIterator<Item = Vec<u8>>,
    {
        let mut buf = Self::new(tab_stop);
        buf.rows = lines
            .into_iter()
            .map(|l| Row::new(l, tab_stop, None))
            .collect();
        buf
    }

    /// Serialize for saving: every row followed by `\n`.
    pub fn to_bytes(&self) -> Vec<u8> {
        let total: usize = self.rows.iter().map(|r| r.len() + 1).sum();
        let mut out = Vec::with_capacity(total);
        for row in &self.rows {
            out.extend_from_slice(&row.chars);
            out.push(b'\n');
        }
        out
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn row(&self, at: usize) -> Option<&Row> {
        self.rows.get(at)
    }

    pub fn row_len(&self, at: usize) -> usize {
        self.rows.get(at).map_or(0, Row::len)
    }

    /// Associate a file name and pick the matching profile from `profiles`.
    pub fn set_filename(&mut self, filename: PathBuf, profiles: &[Syntax]) {
        let syntax = Syntax::select(profiles, &filename).cloned();
        self.filename = Some(filename);
        self.set_syntax(syntax);
    }

    /// Change the active profile, re-highlighting every row.
    pub fn set_syntax(&mut self, syntax: Option<Syntax>) {
        if let Some(s) = &syntax {
            log::info!("language profile: {}", s.filetype);
        }
        self.syntax = syntax;
        for row in &mut self.rows {
            row.rehighlight(self.syntax.as_ref());
        }
    }

    pub fn filename(&self) -> Option<&Path> {
        self.filename.as_deref()
    }

    fn update_row(&mut self, at: usize) {
        let (tab_stop, syntax) = (self.tab_stop, self.syntax.as_ref());
        self.rows[at].update(tab_stop, syntax);
    }

    // ==================== row operations ====================

    /// Insert a new row at `at` (`0..=row_count`). Out-of-range indices are ignored.
    pub fn insert_row(&mut self, at: usize, text: &[u8]) {
        if at > self.rows.len() {
            return;
        }
        let row = Row::new(text.to_vec(), self.tab_stop, self.syntax.as_ref());
        self.rows.insert(at, row);
        self.dirty += 1;
    }

    /// Remove row `at` (`0..row_count`). Out-of-range indices are ignored.
    pub fn delete_row(&mut self, at: usize) {
        if at >= self.rows.len() {
            return;
        }
        self.rows.remove(at);
        self.dirty += 1;
    }

    /// Insert `ch` into row `at` at column `col`, clamped to the row length.
    pub fn insert_char(&mut self, at: usize, col: usize, ch: u8) {
        let Some(row) = self.rows.get_mut(at) else {
            return;
        };
        let col = col.min(row.len());
        row.chars.insert(col, ch);
        self.update_row(at);
        self.dirty += 1;
    }

    /// Remove the byte at `col` of row `at`; no-op if `col` is not inside the row.
    pub fn delete_char(&mut self, at: usize, col: usize) {
        let Some(row) = self.rows.get_mut(at) else {
            return;
        };
        if col >= row.len() {
            return;
        }
        row.chars.remove(col);
        self.update_row(at);
        self.dirty += 1;
    }

    /// Append `text` to the end of row `at`.
    pub fn append_text(&mut self, at: usize, text: &[u8]) {
        let Some(row) = self.rows.get_mut(at) else {
            return;
        };
        row.chars.extend_from_slice(text);
        self.update_row(at);
        self.dirty += 1;
    }

    /// Break row `at` at `col` (newline insertion).
    ///
    /// At column 0 an empty row is inserted above; otherwise `[col, len)` moves to a new row
    /// below.
    pub fn split_at(&mut self, at: usize, col: usize) {
        if col == 0 {
            self.insert_row(at, b"");
            return;
        }
        let Some(row) = self.rows.get_mut(at) else {
            return;
        };
        let col = col.min(row.len());
        let tail = row.chars.split_off(col);
        self.update_row(at);
        self.insert_row(at + 1, &tail);
    }

    /// Append row `at` onto row `at - 1` and delete it. Returns the join column (the previous
    /// row's length before the join), or `None` if there is no previous row.
    pub fn join_with_previous(&mut self, at: usize) -> Option<usize> {
        if at == 0 || at >= self.rows.len() {
            return None;
        }
        let join = self.rows[at - 1].len();
        let text = std::mem::take(&mut self.rows[at].chars);
        self.append_text(at - 1, &text);
        self.delete_row(at);
        Some(join)
    }
}
