#![forbid(unsafe_code)]

//! Canonical key events.
//!
//! The dashboard only needs keyboard input, so this module keeps a small
//! key model and maps Crossterm events (or raw bytes read in raw mode) onto
//! it. Mouse, paste and focus events are dropped at the mapping boundary.
//!
//! # Design Notes
//!
//! - `KeyEventKind` defaults to `Press` when not available from the terminal
//! - `Modifiers` use bitflags for easy combination
//! - Cancellation keys are `q`, `Q`, Escape and Ctrl-C

use std::io;
use std::time::Duration;

use bitflags::bitflags;
use crossterm::event as cte;

/// Raw byte sent by the terminal for Escape.
pub const BYTE_ESCAPE: u8 = 0x1b;

/// Raw byte sent by the terminal for Ctrl-C in raw mode.
pub const BYTE_CTRL_C: u8 = 0x03;

/// A keyboard event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    /// The key code that was pressed.
    pub code: KeyCode,

    /// Modifier keys held during the event.
    pub modifiers: Modifiers,

    /// The type of key event (press, repeat, or release).
    pub kind: KeyEventKind,
}

impl KeyEvent {
    /// Create a new key event with default modifiers and Press kind.
    #[must_use]
    pub const fn new(code: KeyCode) -> Self {
        Self {
            code,
            modifiers: Modifiers::NONE,
            kind: KeyEventKind::Press,
        }
    }

    /// Create a key event with modifiers.
    #[must_use]
    pub const fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    /// Create a key event with a specific kind.
    #[must_use]
    pub const fn with_kind(mut self, kind: KeyEventKind) -> Self {
        self.kind = kind;
        self
    }

    /// Map a single raw byte read in raw mode.
    ///
    /// Control bytes 0x01..=0x1a become `Ctrl` + letter, 0x1b is Escape.
    #[must_use]
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            BYTE_ESCAPE => Some(Self::new(KeyCode::Escape)),
            b'\r' | b'\n' => Some(Self::new(KeyCode::Enter)),
            b'\t' => Some(Self::new(KeyCode::Tab)),
            0x7f => Some(Self::new(KeyCode::Backspace)),
            0x01..=0x1a => {
                let letter = char::from(b'a' + byte - 1);
                Some(Self::new(KeyCode::Char(letter)).with_modifiers(Modifiers::CTRL))
            }
            0x20..=0x7e => Some(Self::new(KeyCode::Char(char::from(byte)))),
            _ => None,
        }
    }

    /// Convert a Crossterm event, ignoring everything that is not a key.
    #[must_use]
    pub fn from_crossterm(event: cte::Event) -> Option<Self> {
        match event {
            cte::Event::Key(key) => map_key_event(key),
            _ => None,
        }
    }

    /// Check if this is a specific character key.
    #[must_use]
    pub fn is_char(&self, c: char) -> bool {
        matches!(self.code, KeyCode::Char(ch) if ch == c)
    }

    /// Check if Ctrl modifier is held.
    #[must_use]
    pub const fn ctrl(&self) -> bool {
        self.modifiers.contains(Modifiers::CTRL)
    }

    /// Whether this key asks the dashboard to quit.
    ///
    /// Release events never cancel, so a key is acted on exactly once on
    /// terminals that report both edges.
    #[must_use]
    pub fn is_cancel(&self) -> bool {
        if self.kind == KeyEventKind::Release {
            return false;
        }
        match self.code {
            KeyCode::Escape => true,
            KeyCode::Char('q' | 'Q') => !self.ctrl(),
            KeyCode::Char('c' | 'C') => self.ctrl(),
            _ => false,
        }
    }
}

/// Key codes for keyboard events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyCode {
    /// A regular character key.
    Char(char),
    /// Enter/Return key.
    Enter,
    /// Escape key.
    Escape,
    /// Backspace key.
    Backspace,
    /// Tab key.
    Tab,
    Up,
    Down,
    Left,
    Right,
    /// Function key (F1-F24).
    F(u8),
}

/// The type of key event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum KeyEventKind {
    /// Key was pressed (default when not distinguishable).
    #[default]
    Press,
    /// Key is being held (repeat event).
    Repeat,
    /// Key was released.
    Release,
}

bitflags! {
    /// Modifier keys that can be held during a key event.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Modifiers: u8 {
        /// No modifiers.
        const NONE  = 0b0000;
        /// Shift key.
        const SHIFT = 0b0001;
        /// Alt/Option key.
        const ALT   = 0b0010;
        /// Control key.
        const CTRL  = 0b0100;
    }
}

impl Default for Modifiers {
    fn default() -> Self {
        Self::NONE
    }
}

/// Wait up to `timeout` for the next terminal key.
///
/// Returns `Ok(None)` on timeout and for events that are not keys. Reads
/// from the process-wide Crossterm event queue, so it may be called from
/// any thread.
pub fn read_key(timeout: Duration) -> io::Result<Option<KeyEvent>> {
    if cte::poll(timeout)? {
        return Ok(KeyEvent::from_crossterm(cte::read()?));
    }
    Ok(None)
}

fn map_key_event(event: cte::KeyEvent) -> Option<KeyEvent> {
    let code = map_key_code(event.code)?;
    Some(KeyEvent {
        code,
        modifiers: map_modifiers(event.modifiers),
        kind: map_key_kind(event.kind),
    })
}

fn map_key_kind(kind: cte::KeyEventKind) -> KeyEventKind {
    match kind {
        cte::KeyEventKind::Press => KeyEventKind::Press,
        cte::KeyEventKind::Repeat => KeyEventKind::Repeat,
        cte::KeyEventKind::Release => KeyEventKind::Release,
    }
}

fn map_key_code(code: cte::KeyCode) -> Option<KeyCode> {
    match code {
        cte::KeyCode::Backspace => Some(KeyCode::Backspace),
        cte::KeyCode::Enter => Some(KeyCode::Enter),
        cte::KeyCode::Left => Some(KeyCode::Left),
        cte::KeyCode::Right => Some(KeyCode::Right),
        cte::KeyCode::Up => Some(KeyCode::Up),
        cte::KeyCode::Down => Some(KeyCode::Down),
        cte::KeyCode::Tab => Some(KeyCode::Tab),
        cte::KeyCode::F(n) => Some(KeyCode::F(n)),
        cte::KeyCode::Char(c) => Some(KeyCode::Char(c)),
        cte::KeyCode::Esc => Some(KeyCode::Escape),
        _ => None,
    }
}

fn map_modifiers(modifiers: cte::KeyModifiers) -> Modifiers {
    let mut mapped = Modifiers::NONE;
    if modifiers.contains(cte::KeyModifiers::SHIFT) {
        mapped |= Modifiers::SHIFT;
    }
    if modifiers.contains(cte::KeyModifiers::ALT) {
        mapped |= Modifiers::ALT;
    }
    if modifiers.contains(cte::KeyModifiers::CONTROL) {
        mapped |= Modifiers::CTRL;
    }
    mapped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quit_keys_cancel() {
        assert!(KeyEvent::new(KeyCode::Char('q')).is_cancel());
        assert!(KeyEvent::new(KeyCode::Char('Q')).is_cancel());
        assert!(KeyEvent::new(KeyCode::Escape).is_cancel());
        assert!(
            KeyEvent::new(KeyCode::Char('c'))
                .with_modifiers(Modifiers::CTRL)
                .is_cancel()
        );
    }

    #[test]
    fn other_keys_are_ignored() {
        assert!(!KeyEvent::new(KeyCode::Char('c')).is_cancel());
        assert!(!KeyEvent::new(KeyCode::Char('x')).is_cancel());
        assert!(!KeyEvent::new(KeyCode::Enter).is_cancel());
        assert!(!KeyEvent::new(KeyCode::F(1)).is_cancel());
    }

    #[test]
    fn release_never_cancels() {
        let release = KeyEvent::new(KeyCode::Char('q')).with_kind(KeyEventKind::Release);
        assert!(!release.is_cancel());
    }

    #[test]
    fn raw_bytes_map_to_keys() {
        assert!(KeyEvent::from_byte(BYTE_ESCAPE).unwrap().is_cancel());
        assert!(KeyEvent::from_byte(BYTE_CTRL_C).unwrap().is_cancel());
        assert!(KeyEvent::from_byte(b'q').unwrap().is_cancel());
        assert!(KeyEvent::from_byte(b'Q').unwrap().is_cancel());

        let ctrl_a = KeyEvent::from_byte(0x01).unwrap();
        assert!(ctrl_a.is_char('a'));
        assert!(ctrl_a.ctrl());

        assert_eq!(
            KeyEvent::from_byte(b'\r').map(|k| k.code),
            Some(KeyCode::Enter)
        );
        assert_eq!(KeyEvent::from_byte(0x80), None);
    }

    #[test]
    fn crossterm_key_mapping() {
        let ct = cte::Event::Key(cte::KeyEvent::new(
            cte::KeyCode::Char('c'),
            cte::KeyModifiers::CONTROL,
        ));
        let key = KeyEvent::from_crossterm(ct).unwrap();
        assert!(key.ctrl());
        assert!(key.is_cancel());

        let esc = cte::Event::Key(cte::KeyEvent::new(cte::KeyCode::Esc, cte::KeyModifiers::NONE));
        assert_eq!(
            KeyEvent::from_crossterm(esc).map(|k| k.code),
            Some(KeyCode::Escape)
        );
    }

    #[test]
    fn non_key_events_are_dropped() {
        assert_eq!(KeyEvent::from_crossterm(cte::Event::Resize(80, 24)), None);
        assert_eq!(KeyEvent::from_crossterm(cte::Event::FocusGained), None);
    }
}
