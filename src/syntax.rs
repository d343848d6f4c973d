//! Line-oriented syntax highlighting.
//!
//! Each row is classified on its own (no state carries over between rows), one [`Highlight`]
//! per rendered byte. A [`Syntax`] profile decides which categories are active.

use crate::config::LanguageConfig;
use std::path::Path;

/// Highlight category of a single rendered byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Highlight {
    #[default]
    Normal,
    Comment,
    String,
    Number,
    /// Current search match; only ever set by the search session.
    Match,
}

impl Highlight {
    /// ANSI SGR foreground code for this category.
    pub fn color(self) -> u8 {
        match self {
            Highlight::Comment => 36,
            Highlight::String => 35,
            Highlight::Number => 31,
            Highlight::Match => 34,
            Highlight::Normal => 37,
        }
    }
}

/// A language profile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Syntax {
    /// Shown in the status bar.
    pub filetype: String,
    /// `.ext` patterns match the extension exactly; anything else matches as a substring of the
    /// file name.
    pub filematch: Vec<String>,
    /// Single-line comment token; empty disables comments.
    pub comment: String,
    pub numbers: bool,
    pub strings: bool,
}

impl Syntax {
    /// The profiles compiled into the editor.
    pub fn builtin() -> Vec<Syntax> {
        vec![Syntax {
            filetype: "c".to_string(),
            filematch: vec![".c".to_string(), ".h".to_string(), ".cpp".to_string()],
            comment: "//".to_string(),
            numbers: true,
            strings: true,
        }]
    }

    /// Whether this profile applies to `filename`.
    pub fn matches(&self, filename: &Path) -> bool {
        let name = filename.to_string_lossy();
        let ext = name.rfind('.').map(|i| &name[i..]);
        self.filematch.iter().any(|pat| {
            if pat.starts_with('.') {
                ext == Some(pat.as_str())
            } else {
                name.contains(pat.as_str())
            }
        })
    }

    /// Pick the first profile matching `filename`.
    pub fn select<'a>(profiles: &'a [Syntax], filename: &Path) -> Option<&'a Syntax> {
        profiles.iter().find(|s| s.matches(filename))
    }
}

impl From<&LanguageConfig> for Syntax {
    fn from(cfg: &LanguageConfig) -> Self {
        Syntax {
            filetype: cfg.name.clone(),
            filematch: cfg.filematch.clone(),
            comment: cfg.comment.clone().unwrap_or_default(),
            numbers: cfg.numbers,
            strings: cfg.strings,
        }
    }
}

fn is_separator(c: u8) -> bool {
    c.is_ascii_whitespace() || c == 0 || b",.()+-/*=~%<>[];".contains(&c)
}

/// Classify every byte of `render`. Without a profile everything is `Normal`.
pub fn highlight_row(render: &[u8], syntax: Option<&Syntax>) -> Vec<Highlight> {
    let mut hl = vec![Highlight::Normal; render.len()];
    let Some(syntax) = syntax else {
        return hl;
    };
    let comment = syntax.comment.as_bytes();

    let mut prev_sep = true;
    let mut in_string: Option<u8> = None;
    let mut i = 0;

    while i < render.len() {
        let c = render[i];
        let prev_hl = if i > 0 { hl[i - 1] } else { Highlight::Normal };

        if !comment.is_empty() && in_string.is_none() && render[i..].starts_with(comment) {
            hl[i..].fill(Highlight::Comment);
            break;
        }

        if syntax.strings {
            if let Some(quote) = in_string {
                hl[i] = Highlight::String;
                if c == b'\\' && i + 1 < render.len() {
                    hl[i + 1] = Highlight::String;
                    i += 2;
                    continue;
                }
                if c == quote {
                    in_string = None;
                }
                i += 1;
                prev_sep = true;
                continue;
            } else if c == b'"' || c == b'\'' {
                in_string = Some(c);
                hl[i] = Highlight::String;
                i += 1;
                continue;
            }
        }

        if syntax.numbers
            && ((c.is_ascii_digit() && (prev_sep || prev_hl == Highlight::Number))
                || (c == b'.' && prev_hl == Highlight::Number))
        {
            hl[i] = Highlight::Number;
            i += 1;
            prev_sep = false;
            continue;
        }

        prev_sep = is_separator(c);
        i += 1;
    }

    hl
}
