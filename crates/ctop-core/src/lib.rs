#![forbid(unsafe_code)]

//! Core: terminal lifecycle, key events, output surface and colors.

pub mod event;
pub mod palette;
pub mod surface;
pub mod terminal_session;

pub use event::{KeyCode, KeyEvent, KeyEventKind, Modifiers};
pub use palette::{ColorRole, Palette};
pub use surface::{CrosstermSurface, TermSize, TerminalSurface};
pub use terminal_session::{SessionOptions, TerminalSession};

#[cfg(any(test, feature = "test-helpers"))]
pub use surface::CaptureSurface;
