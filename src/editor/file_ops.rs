//! File operations: open and save.

use super::Editor;
use crate::buffer::Buffer;
use crate::error::FatalError;
use crate::terminal::Console;
use anyhow::Result;
use std::fs;
use std::path::{Path, PathBuf};

/// Split file contents into rows, dropping the `\n` / `\r\n` terminators.
pub fn split_lines(data: &[u8]) -> Vec<Vec<u8>> {
    let mut lines: Vec<Vec<u8>> = data
        .split(|&b| b == b'\n')
        .map(|l| {
            let end = l.iter().rposition(|&b| b != b'\r').map_or(0, |i| i + 1);
            l[..end].to_vec()
        })
        .collect();
    // A trailing newline terminates the last row rather than starting a new one.
    if lines.last().is_some_and(Vec::is_empty) {
        lines.pop();
    }
    lines
}

impl Editor {
    /// Load `path` into a fresh document. Failing to read it is fatal.
    pub fn open(&mut self, path: &Path) -> Result<()> {
        let data = fs::read(path).map_err(|source| FatalError::Open {
            path: path.to_path_buf(),
            source,
        })?;

        let mut buf = Buffer::from_lines(split_lines(&data), self.buf.tab_stop);
        buf.set_filename(path.to_path_buf(), &self.profiles);
        log::info!("opened {} ({} rows)", path.display(), buf.row_count());
        self.buf = buf;
        Ok(())
    }

    /// Ctrl-S: write the document, asking for a file name first if it has none.
    ///
    /// Write errors are reported in the message bar; the document then stays dirty.
    pub fn save<C: Console + ?Sized>(&mut self, console: &mut C) -> Result<()> {
        if self.buf.filename().is_none() {
            match self.prompt(console, "Save as: {} (ESC to cancel)", None)? {
                Some(name) => self.buf.set_filename(PathBuf::from(name), &self.profiles),
                None => {
                    self.set_status("Save aborted");
                    return Ok(());
                }
            }
        }
        let Some(path) = self.buf.filename().map(Path::to_path_buf) else {
            return Ok(());
        };

        let data = self.buf.to_bytes();
        match fs::write(&path, &data) {
            Ok(()) => {
                self.buf.dirty = 0;
                log::info!("saved {} bytes to {}", data.len(), path.display());
                self.set_status(format!("{} bytes written to disk", data.len()));
            }
            Err(e) => {
                log::warn!("save to {} failed: {e}", path.display());
                self.set_status(format!("Can't save! I/O error: {e}"));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::super::testing::{editor_with, row_text, ScriptedConsole};
    use super::*;
    use crate::keys::Key;
    use crate::syntax::Highlight;

    // ==================== loading ====================

    #[test]
    fn split_lines_strips_terminators() {
        assert_eq!(split_lines(b"a\nb\r\n\nc"), vec![b"a".to_vec(), b"b".to_vec(), vec![], b"c".to_vec()]);
        assert_eq!(split_lines(b"a\n"), vec![b"a".to_vec()]);
        assert!(split_lines(b"").is_empty());
    }

    #[test]
    fn open_loads_clean_and_selects_profile() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("main.c");
        fs::write(&path, "int x = 1;\n// done\n").unwrap();

        let mut ed = editor_with(&[]);
        ed.open(&path).unwrap();
        assert_eq!(ed.buf.row_count(), 2);
        assert_eq!(row_text(&ed, 1), "// done");
        assert_eq!(ed.buf.dirty, 0);
        assert_eq!(ed.buf.rows[0].hl[8], Highlight::Number);
        assert!(ed.buf.rows[1].hl.iter().all(|h| *h == Highlight::Comment));
    }

    #[test]
    fn open_missing_file_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let mut ed = editor_with(&[]);
        let err = ed.open(&dir.path().join("missing.txt")).unwrap_err();
        assert!(matches!(err.downcast_ref::<FatalError>(), Some(FatalError::Open { .. })));
    }

    // ==================== saving ====================

    #[test]
    fn save_writes_rows_and_clears_dirty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.txt");
        let mut ed = editor_with(&["one", "two"]);
        ed.buf.filename = Some(path.clone());
        ed.buf.dirty = 4;

        ed.save(&mut ScriptedConsole::default()).unwrap();
        assert_eq!(fs::read(&path).unwrap(), b"one\ntwo\n");
        assert_eq!(ed.buf.dirty, 0);
        assert_eq!(ed.status.as_ref().unwrap().text, "8 bytes written to disk");
    }

    #[test]
    fn save_without_name_prompts() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("new.c");
        let mut keys = ScriptedConsole::typing(path.to_str().unwrap());
        keys.push(Key::Char(b'\r'));

        let mut ed = editor_with(&["x"]);
        ed.buf.dirty = 1;
        ed.save(&mut ScriptedConsole::new(&keys)).unwrap();
        assert_eq!(fs::read(&path).unwrap(), b"x\n");
        assert_eq!(ed.buf.filename(), Some(path.as_path()));
        assert_eq!(ed.buf.syntax.as_ref().map(|s| s.filetype.as_str()), Some("c"));
    }

    #[test]
    fn cancelled_save_as_keeps_document_dirty() {
        let mut ed = editor_with(&["x"]);
        ed.buf.dirty = 1;
        ed.save(&mut ScriptedConsole::new(&[Key::Escape])).unwrap();
        assert_eq!(ed.buf.dirty, 1);
        assert!(ed.buf.filename().is_none());
        assert_eq!(ed.status.as_ref().unwrap().text, "Save aborted");
    }

    #[test]
    fn failed_write_is_reported_and_stays_dirty() {
        let dir = tempfile::tempdir().unwrap();
        let mut ed = editor_with(&["x"]);
        ed.buf.filename = Some(dir.path().join("no/such/dir/file.txt"));
        ed.buf.dirty = 2;
        ed.save(&mut ScriptedConsole::default()).unwrap();
        assert_eq!(ed.buf.dirty, 2);
        assert!(ed.status.as_ref().unwrap().text.starts_with("Can't save! I/O error:"));
    }
}
