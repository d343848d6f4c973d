//! Incremental search.
//!
//! A [`SearchSession`] lives while the search prompt is open. After every key the prompt calls
//! [`SearchSession::advance`] with the query typed so far; the session finds the next matching
//! row, and marks the match in that row's highlight array (restoring the previous row's
//! highlighting first).

use super::Editor;
use crate::buffer::Buffer;
use crate::keys::Key;
use crate::syntax::Highlight;
use crate::terminal::Console;
use anyhow::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Forward,
    Backward,
}

/// Outcome of one search step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchStep {
    /// The query matched at byte column `cx` of `row`.
    Found { row: usize, cx: usize },
    /// A full pass over the document found nothing.
    NotFound,
    /// Nothing to search for (empty query or empty document).
    Pending,
    /// Enter or Escape closed the prompt.
    Finished,
}

#[derive(Debug)]
pub struct SearchSession {
    last_match: Option<usize>,
    direction: Direction,
    /// Row a fresh scan starts from (inclusive): the cursor row at first, then the latest match.
    anchor: usize,
    /// Highlighting of the matched row before the match was painted over it.
    saved_hl: Option<(usize, Vec<Highlight>)>,
}

impl SearchSession {
    pub fn new(anchor: usize) -> Self {
        Self {
            last_match: None,
            direction: Direction::Forward,
            anchor,
            saved_hl: None,
        }
    }

    /// Handle one prompt key with the current `query`.
    pub fn advance(&mut self, buf: &mut Buffer, query: &[u8], key: Key) -> SearchStep {
        if let Some((row, hl)) = self.saved_hl.take() {
            if let Some(r) = buf.rows.get_mut(row) {
                r.hl = hl;
            }
        }

        match key {
            Key::Char(b'\r') | Key::Escape => {
                self.last_match = None;
                self.direction = Direction::Forward;
                return SearchStep::Finished;
            }
            Key::ArrowRight | Key::ArrowDown => self.direction = Direction::Forward,
            Key::ArrowLeft | Key::ArrowUp => self.direction = Direction::Backward,
            _ => {
                self.last_match = None;
                self.direction = Direction::Forward;
            }
        }

        let n = buf.row_count();
        if query.is_empty() || n == 0 {
            return SearchStep::Pending;
        }

        let mut current = match self.last_match {
            Some(m) => self.next_row(m, n),
            None => self.anchor.min(n - 1),
        };
        for _ in 0..n {
            let row = &mut buf.rows[current];
            if let Some(rx) = find(&row.render, query) {
                let cx = row.rx_to_cx(rx, buf.tab_stop);
                self.saved_hl = Some((current, row.hl.clone()));
                row.hl[rx..rx + query.len()].fill(Highlight::Match);
                self.last_match = Some(current);
                self.anchor = current;
                return SearchStep::Found { row: current, cx };
            }
            current = self.next_row(current, n);
        }
        SearchStep::NotFound
    }

    fn next_row(&self, row: usize, n: usize) -> usize {
        match self.direction {
            Direction::Forward => (row + 1) % n,
            Direction::Backward => row.checked_sub(1).unwrap_or(n - 1),
        }
    }
}

/// Byte offset of the first occurrence of `needle` in `haystack`.
fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|w| w == needle)
}

impl Editor {
    /// Ctrl-F: incremental search. Escape puts the cursor and the view back where they were.
    pub fn find<C: Console + ?Sized>(&mut self, console: &mut C) -> Result<()> {
        let saved_cursor = self.cursor;
        let saved_view = self.view;

        let mut session = SearchSession::new(self.cursor.cy);
        let query = self.prompt(
            console,
            "Search: {} (Use ESC/Arrows/Enter)",
            Some(&mut session),
        )?;

        if query.is_none() {
            self.cursor = saved_cursor;
            self.view = saved_view;
        }
        Ok(())
    }
}
