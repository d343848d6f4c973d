//! Editor: the main application state and all editing operations.

mod file_ops;
mod input;
mod movement;
mod prompt;
mod render;
mod search;

use crate::buffer::Buffer;
use crate::config::Config;
use crate::syntax::Syntax;
use crate::types::{Cursor, QuitGuard, StatusMsg};
use crate::viewport::Viewport;
use std::time::Duration;

pub use render::CLEAR_SCREEN;

/// Screen rows below the text area: the status bar and the message bar.
pub const BAR_ROWS: usize = 2;

pub const HELP_MESSAGE: &str = "HELP: Ctrl-S = save | Ctrl-Q = quit | Ctrl-F = find";

/// The top-level application state.
///
/// One `Editor` value owns the document, the cursor, the viewport and the UI state, and is
/// passed by `&mut` through the main loop.
pub struct Editor {
    /// The document being edited.
    pub buf: Buffer,
    pub cursor: Cursor,
    pub view: Viewport,
    /// Short-lived message shown below the status bar.
    pub(crate) status: Option<StatusMsg>,
    pub(crate) quit_guard: QuitGuard,
    /// Language profiles to choose from, built-in first.
    pub(crate) profiles: Vec<Syntax>,
    pub(crate) message_timeout: Duration,
}

impl Editor {
    /// Create an editor with an empty document and a text area of `screen_rows` x `screen_cols`.
    pub fn new(config: &Config, screen_rows: usize, screen_cols: usize) -> Self {
        let mut profiles = Syntax::builtin();
        profiles.extend(config.languages.iter().map(Syntax::from));

        Self {
            buf: Buffer::new(config.tab_stop),
            cursor: Cursor::default(),
            view: Viewport::new(screen_rows, screen_cols),
            status: None,
            quit_guard: QuitGuard::new(config.quit_times),
            profiles,
            message_timeout: config.message_timeout(),
        }
    }

    /// Show a message in the message bar.
    pub fn set_status(&mut self, msg: impl Into<String>) {
        self.status = Some(StatusMsg::new(msg));
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::Editor;
    use crate::config::Config;
    use crate::keys::Key;
    use crate::terminal::Console;
    use anyhow::Result;
    use std::collections::VecDeque;

    /// A console fed from a script of keys; records every frame written.
    #[derive(Default)]
    pub struct ScriptedConsole {
        pub keys: VecDeque<Key>,
        pub frames: Vec<Vec<u8>>,
    }

    impl ScriptedConsole {
        pub fn new(keys: &[Key]) -> Self {
            Self {
                keys: keys.iter().copied().collect(),
                frames: Vec::new(),
            }
        }

        /// Bytes to keys: one `Key::Char` per byte.
        pub fn typing(text: &str) -> Vec<Key> {
            text.bytes().map(Key::Char).collect()
        }
    }

    impl Console for ScriptedConsole {
        fn read_key(&mut self) -> Result<Option<Key>> {
            // Running out of script behaves like the user pressing Escape.
            Ok(Some(self.keys.pop_front().unwrap_or(Key::Escape)))
        }

        fn write_frame(&mut self, frame: &[u8]) -> Result<()> {
            self.frames.push(frame.to_vec());
            Ok(())
        }
    }

    /// An editor over `lines`, with a 10 x 40 text area and default settings.
    pub fn editor_with(lines: &[&str]) -> Editor {
        let mut ed = Editor::new(&Config::default(), 10, 40);
        ed.buf = crate::buffer::Buffer::from_lines(
            lines.iter().map(|l| l.as_bytes().to_vec()),
            ed.buf.tab_stop,
        );
        ed
    }

    pub fn row_text(ed: &Editor, at: usize) -> String {
        String::from_utf8(ed.buf.rows[at].chars.clone()).unwrap()
    }
}
