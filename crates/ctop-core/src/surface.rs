#![forbid(unsafe_code)]

//! Output surface for frame drawing.
//!
//! [`TerminalSurface`] is the thin sink the dashboard draws through: cursor
//! home, text, clear-to-end-of-line, line breaks and a size query. Frames are
//! written top to bottom as a single ordered stream; nothing here buffers or
//! diffs.
//!
//! [`CrosstermSurface`] queues Crossterm commands on any [`Write`] and
//! flushes once per frame. With the `test-helpers` feature (or in unit
//! tests) [`CaptureSurface`] records frames as plain lines instead.

use std::io::{self, Write};

use crossterm::{cursor, queue, style, terminal};

/// Fallback terminal width used when the size query fails.
pub const FALLBACK_COLUMNS: u16 = 80;

/// Fallback terminal height used when the size query fails.
pub const FALLBACK_ROWS: u16 = 24;

/// Terminal geometry in cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TermSize {
    pub columns: u16,
    pub rows: u16,
}

impl TermSize {
    #[must_use]
    pub const fn new(columns: u16, rows: u16) -> Self {
        Self { columns, rows }
    }

    /// The fixed size assumed when the terminal cannot be queried.
    #[must_use]
    pub const fn fallback() -> Self {
        Self::new(FALLBACK_COLUMNS, FALLBACK_ROWS)
    }
}

impl Default for TermSize {
    fn default() -> Self {
        Self::fallback()
    }
}

/// Raw terminal control consumed by the dashboard and the graph renderer.
pub trait TerminalSurface {
    /// Query the terminal size (columns, rows).
    fn size(&self) -> io::Result<TermSize>;

    /// Move the cursor to the top-left cell.
    fn cursor_home(&mut self) -> io::Result<()>;

    /// Write text at the cursor. The text may contain SGR sequences.
    fn write_str(&mut self, text: &str) -> io::Result<()>;

    /// Erase from the cursor to the end of the current line.
    fn clear_to_end_of_line(&mut self) -> io::Result<()>;

    /// Move to the start of the next line (`\r\n` in raw mode).
    fn next_line(&mut self) -> io::Result<()>;

    /// Push everything written so far to the terminal.
    fn flush(&mut self) -> io::Result<()>;

    /// Size with the fixed fallback applied when the query fails.
    ///
    /// A reported size of zero is passed through unchanged.
    fn size_or_fallback(&self) -> TermSize {
        match self.size() {
            Ok(size) => size,
            Err(_err) => {
                #[cfg(feature = "tracing")]
                tracing::warn!(error = %_err, "terminal size unavailable, using fallback");
                TermSize::fallback()
            }
        }
    }
}

impl<S: TerminalSurface + ?Sized> TerminalSurface for &mut S {
    fn size(&self) -> io::Result<TermSize> {
        (**self).size()
    }

    fn cursor_home(&mut self) -> io::Result<()> {
        (**self).cursor_home()
    }

    fn write_str(&mut self, text: &str) -> io::Result<()> {
        (**self).write_str(text)
    }

    fn clear_to_end_of_line(&mut self) -> io::Result<()> {
        (**self).clear_to_end_of_line()
    }

    fn next_line(&mut self) -> io::Result<()> {
        (**self).next_line()
    }

    fn flush(&mut self) -> io::Result<()> {
        (**self).flush()
    }
}

/// A surface that emits Crossterm commands to a writer (stdout by default).
#[derive(Debug)]
pub struct CrosstermSurface<W: Write> {
    writer: W,
}

impl CrosstermSurface<io::Stdout> {
    /// Surface on the process's stdout.
    #[must_use]
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> CrosstermSurface<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    /// Consume the surface and return the writer.
    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> TerminalSurface for CrosstermSurface<W> {
    fn size(&self) -> io::Result<TermSize> {
        let (columns, rows) = terminal::size()?;
        Ok(TermSize::new(columns, rows))
    }

    fn cursor_home(&mut self) -> io::Result<()> {
        queue!(self.writer, cursor::MoveTo(0, 0))
    }

    fn write_str(&mut self, text: &str) -> io::Result<()> {
        queue!(self.writer, style::Print(text))
    }

    fn clear_to_end_of_line(&mut self) -> io::Result<()> {
        queue!(self.writer, terminal::Clear(terminal::ClearType::UntilNewLine))
    }

    fn next_line(&mut self) -> io::Result<()> {
        self.writer.write_all(b"\r\n")
    }

    fn flush(&mut self) -> io::Result<()> {
        self.writer.flush()
    }
}

#[cfg(any(test, feature = "test-helpers"))]
pub use capture::CaptureSurface;

#[cfg(any(test, feature = "test-helpers"))]
mod capture {
    use super::{TermSize, TerminalSurface};
    use std::io;

    /// In-memory surface that records frames line by line.
    ///
    /// `cursor_home` starts a new frame; the previous frame is kept in
    /// [`CaptureSurface::frames`]. Text is stored verbatim, escape codes
    /// included, so tests can assert on colors as well as on layout.
    #[derive(Debug, Clone)]
    pub struct CaptureSurface {
        size: Option<TermSize>,
        current: Vec<String>,
        frames: Vec<Vec<String>>,
        clears: usize,
        flushes: usize,
    }

    impl CaptureSurface {
        /// A surface reporting a fixed size.
        #[must_use]
        pub fn new(columns: u16, rows: u16) -> Self {
            Self {
                size: Some(TermSize::new(columns, rows)),
                current: Vec::new(),
                frames: Vec::new(),
                clears: 0,
                flushes: 0,
            }
        }

        /// A surface whose size query always fails.
        #[must_use]
        pub fn without_size() -> Self {
            Self {
                size: None,
                ..Self::new(0, 0)
            }
        }

        /// Every completed or in-progress frame, oldest first.
        #[must_use]
        pub fn frames(&self) -> Vec<Vec<String>> {
            let mut frames = self.frames.clone();
            if !self.current.is_empty() {
                frames.push(self.current.clone());
            }
            frames
        }

        /// Lines of the most recent frame.
        #[must_use]
        pub fn last_frame(&self) -> Vec<String> {
            self.frames().pop().unwrap_or_default()
        }

        /// Number of `clear_to_end_of_line` calls so far.
        #[must_use]
        pub fn clear_count(&self) -> usize {
            self.clears
        }

        /// Number of `flush` calls so far.
        #[must_use]
        pub fn flush_count(&self) -> usize {
            self.flushes
        }
    }

    impl TerminalSurface for CaptureSurface {
        fn size(&self) -> io::Result<TermSize> {
            self.size
                .ok_or_else(|| io::Error::new(io::ErrorKind::Unsupported, "no terminal"))
        }

        fn cursor_home(&mut self) -> io::Result<()> {
            if !self.current.is_empty() {
                self.frames.push(std::mem::take(&mut self.current));
            }
            self.current.push(String::new());
            Ok(())
        }

        fn write_str(&mut self, text: &str) -> io::Result<()> {
            if self.current.is_empty() {
                self.current.push(String::new());
            }
            if let Some(line) = self.current.last_mut() {
                line.push_str(text);
            }
            Ok(())
        }

        fn clear_to_end_of_line(&mut self) -> io::Result<()> {
            self.clears += 1;
            Ok(())
        }

        fn next_line(&mut self) -> io::Result<()> {
            self.current.push(String::new());
            Ok(())
        }

        fn flush(&mut self) -> io::Result<()> {
            self.flushes += 1;
            Ok(())
        }
    }
}
