#![forbid(unsafe_code)]

//! ANSI color pairs keyed by semantic role.
//!
//! Every role has a begin and an end sequence. A single syntax-highlighting
//! flag gates all of them: a disabled [`Palette`] hands out empty strings,
//! so callers can interpolate colors unconditionally.
//!
//! | Role | Begin | End |
//! |------|-------|-----|
//! | Directory | `CSI 1;34 m` | `CSI 0 m` |
//! | Header | `CSI 30;47 m` | `CSI 0 m` |
//! | User | `CSI 1;33 m` | `CSI 0 m` |
//! | Host | `CSI 32 m` | `CSI 0 m` |
//! | Command | `CSI 1;2 m CSI 38;5;46 m` | `CSI 0 m` |
//! | Error | `CSI 1;31 m` | `CSI 0 m` |
//! | Title | `CSI 0;30;46 m` | `CSI 0 m` |
//! | TitleBold | `CSI 1;30;46 m` | `CSI 0 m` |

use unicode_width::UnicodeWidthStr;

/// SGR reset: `CSI 0 m`
pub const SGR_RESET: &str = "\x1b[0m";

/// Semantic color roles used by the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColorRole {
    Directory,
    /// Table header row.
    Header,
    User,
    Host,
    /// Process command line.
    Command,
    Error,
    /// Title bar background.
    Title,
    /// Emphasized text inside the title bar.
    TitleBold,
}

impl ColorRole {
    /// The escape sequence that starts this role.
    #[must_use]
    pub const fn begin_code(self) -> &'static str {
        match self {
            Self::Directory => "\x1b[1;34m",
            Self::Header => "\x1b[30;47m",
            Self::User => "\x1b[1;33m",
            Self::Host => "\x1b[32m",
            Self::Command => "\x1b[1;2m\x1b[38;5;46m",
            Self::Error => "\x1b[1;31m",
            Self::Title => "\x1b[0;30;46m",
            Self::TitleBold => "\x1b[1;30;46m",
        }
    }
}

/// Color lookup gated by the syntax-highlighting flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Palette {
    enabled: bool,
}

impl Palette {
    #[must_use]
    pub const fn new(syntax_highlight: bool) -> Self {
        Self {
            enabled: syntax_highlight,
        }
    }

    /// A palette that never emits escape codes.
    #[must_use]
    pub const fn plain() -> Self {
        Self::new(false)
    }

    /// Whether syntax highlighting is on.
    #[must_use]
    pub const fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Begin sequence for `role`, or `""` when highlighting is off.
    #[must_use]
    pub const fn begin(&self, role: ColorRole) -> &'static str {
        if self.enabled { role.begin_code() } else { "" }
    }

    /// End sequence for `role`, or `""` when highlighting is off.
    #[must_use]
    pub const fn end(&self, _role: ColorRole) -> &'static str {
        if self.enabled { SGR_RESET } else { "" }
    }

    /// Both halves at once.
    #[must_use]
    pub const fn pair(&self, role: ColorRole) -> (&'static str, &'static str) {
        (self.begin(role), self.end(role))
    }

    /// Wrap `text` in the role's colors.
    #[must_use]
    pub fn paint(&self, role: ColorRole, text: &str) -> String {
        format!("{}{}{}", self.begin(role), text, self.end(role))
    }
}

/// Remove CSI escape sequences (`ESC [ ... final`) from `text`.
#[must_use]
pub fn strip_ansi(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    while let Some(ch) = chars.next() {
        if ch == '\x1b' && chars.peek() == Some(&'[') {
            chars.next();
            // Parameters and intermediates run until a final byte in 0x40..=0x7e.
            for c in chars.by_ref() {
                if ('\x40'..='\x7e').contains(&c) {
                    break;
                }
            }
            continue;
        }
        out.push(ch);
    }
    out
}

/// Display width of `text` in terminal cells, ignoring escape sequences.
#[must_use]
pub fn visible_width(text: &str) -> usize {
    strip_ansi(text).width()
}
