//! Errors that end the editor session.
//!
//! Everything else (a failed save, a cancelled prompt, a search with no match) is reported in the
//! message bar and never becomes an `Err`.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FatalError {
    #[error("could not switch terminal mode")]
    TerminalMode(#[source] io::Error),
    #[error("reading input failed")]
    Read(#[source] io::Error),
    #[error("could not determine window size")]
    WindowSize,
    #[error("could not open {}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}
