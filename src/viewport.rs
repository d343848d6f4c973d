//! The visible window onto the document.

/// Scroll offsets plus the size of the text area, in rows/render columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub row_off: usize,
    pub col_off: usize,
    pub screen_rows: usize,
    pub screen_cols: usize,
}

impl Viewport {
    /// The text area is at least one cell, however small the window.
    pub fn new(screen_rows: usize, screen_cols: usize) -> Self {
        Self {
            row_off: 0,
            col_off: 0,
            screen_rows: screen_rows.max(1),
            screen_cols: screen_cols.max(1),
        }
    }

    /// Adjust the offsets by the smallest amount that brings (`cy`, `rx`) into view.
    pub fn scroll(&mut self, cy: usize, rx: usize) {
        if cy < self.row_off {
            self.row_off = cy;
        }
        if cy >= self.row_off + self.screen_rows {
            self.row_off = (cy + 1).saturating_sub(self.screen_rows);
        }
        if rx < self.col_off {
            self.col_off = rx;
        }
        if rx >= self.col_off + self.screen_cols {
            self.col_off = (rx + 1).saturating_sub(self.screen_cols);
        }
    }
}
