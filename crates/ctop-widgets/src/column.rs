#![forbid(unsafe_code)]

//! Two-pass table columns.
//!
//! A [`ColumnFormat`] is used in two strictly ordered passes per frame:
//!
//! 1. **Measure** - call [`ColumnFormat::widen`] for every value that will be
//!    shown (and for the header literal). The width only grows.
//! 2. **Print** - call [`ColumnFormat::print`] for the same values in display
//!    order. Each cell is padded to the final width.
//!
//! Printing before measuring has finished produces misaligned columns. Debug
//! builds catch the two detectable forms of misuse: printing a column that
//! was never widened, and widening a column that has already printed in the
//! current frame. [`ColumnFormat::reset`] starts the next frame.
//!
//! Widths are measured in terminal cells (`unicode-width`), not bytes, and
//! color codes never count toward the width.
//!
//! ```
//! use ctop_widgets::column::ColumnFormat;
//!
//! let mut pid = ColumnFormat::new().right_justified();
//! for value in [7, 1234, 56] {
//!     pid.widen(value);
//! }
//! pid.widen("PID");
//! assert_eq!(pid.cell(7, false), "   7");
//! assert_eq!(pid.cell("PID", false), " PID");
//! ```

use std::fmt::{self, Display, Write};

use ctop_core::palette::{ColorRole, Palette};
use unicode_width::UnicodeWidthStr;

/// Horizontal alignment inside a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Justify {
    #[default]
    Left,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum Phase {
    #[default]
    Fresh,
    Measuring,
    Printing,
}

/// Width, alignment and color of one table column.
#[derive(Debug, Clone, Default)]
pub struct ColumnFormat {
    width: usize,
    justify: Justify,
    color_begin: &'static str,
    color_end: &'static str,
    phase: Phase,
}

impl ColumnFormat {
    /// Left-justified, uncolored, zero width.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Column wrapped in explicit begin/end codes.
    #[must_use]
    pub fn with_color(begin: &'static str, end: &'static str) -> Self {
        Self {
            color_begin: begin,
            color_end: end,
            ..Self::default()
        }
    }

    /// Column colored by `role`; plain when the palette is disabled.
    #[must_use]
    pub fn with_role(palette: &Palette, role: ColorRole) -> Self {
        let (begin, end) = palette.pair(role);
        Self::with_color(begin, end)
    }

    #[must_use]
    pub fn right_justified(mut self) -> Self {
        self.justify = Justify::Right;
        self
    }

    pub fn set_right_justify(&mut self) {
        self.justify = Justify::Right;
    }

    pub fn set_left_justify(&mut self) {
        self.justify = Justify::Left;
    }

    #[must_use]
    pub fn justify(&self) -> Justify {
        self.justify
    }

    /// Current width in cells.
    #[must_use]
    pub fn width(&self) -> usize {
        self.width
    }

    /// Grow the width to fit `value`.
    pub fn widen(&mut self, value: impl Display) {
        debug_assert!(
            self.phase != Phase::Printing,
            "ColumnFormat::widen called after print in the same frame; call reset() first"
        );
        self.phase = Phase::Measuring;
        let text = value.to_string();
        self.width = self.width.max(text.width());
    }

    /// Write `value` padded to the column width.
    ///
    /// Color codes are emitted only when `with_color` is set and the column
    /// has a color. A value wider than the column is written unpadded.
    pub fn print<W: Write>(&mut self, out: &mut W, value: impl Display, with_color: bool) -> fmt::Result {
        debug_assert!(
            self.phase != Phase::Fresh,
            "ColumnFormat::print called before any widen in this frame"
        );
        self.phase = Phase::Printing;

        let text = value.to_string();
        let padding = self.width.saturating_sub(text.width());
        let colored = with_color && !self.color_begin.is_empty();

        if colored {
            out.write_str(self.color_begin)?;
        }
        match self.justify {
            Justify::Left => {
                out.write_str(&text)?;
                pad(out, padding)?;
            }
            Justify::Right => {
                pad(out, padding)?;
                out.write_str(&text)?;
            }
        }
        if colored {
            out.write_str(self.color_end)?;
        }
        Ok(())
    }

    /// [`print`](Self::print) into a new string.
    #[must_use]
    pub fn cell(&mut self, value: impl Display, with_color: bool) -> String {
        let mut out = String::new();
        // Writing into a String cannot fail.
        let _ = self.print(&mut out, value, with_color);
        out
    }

    /// Start a new frame: width back to zero, ready to measure.
    pub fn reset(&mut self) {
        self.width = 0;
        self.phase = Phase::Fresh;
    }
}

fn pad<W: Write>(out: &mut W, count: usize) -> fmt::Result {
    for _ in 0..count {
        out.write_char(' ')?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ctop_core::palette::visible_width;

    #[test]
    fn widen_takes_maximum() {
        let mut col = ColumnFormat::new();
        col.widen("ab");
        col.widen("abcdef");
        col.widen("abc");
        assert_eq!(col.width(), 6);
    }

    #[test]
    fn widen_accepts_numbers() {
        let mut col = ColumnFormat::new();
        col.widen(12345);
        col.widen(-1);
        assert_eq!(col.width(), 5);
    }

    #[test]
    fn left_and_right_justification() {
        let mut left = ColumnFormat::new();
        left.widen("root");
        left.widen("mysql");
        assert_eq!(left.cell("root", false), "root ");

        let mut right = ColumnFormat::new().right_justified();
        right.widen("1.5GB");
        right.widen("12MB");
        assert_eq!(right.cell("12MB", false), " 12MB");
    }

    #[test]
    fn color_only_when_requested_and_present() {
        let mut col = ColumnFormat::with_color("\x1b[32m", "\x1b[0m");
        col.widen("db1");
        col.widen("db10");
        assert_eq!(col.cell("db1", true), "\x1b[32mdb1 \x1b[0m");
        assert_eq!(col.cell("db1", false), "db1 ");
    }

    #[test]
    fn disabled_palette_yields_plain_cells() {
        let mut col = ColumnFormat::with_role(&Palette::plain(), ColorRole::User);
        col.widen("admin");
        assert_eq!(col.cell("admin", true), "admin");
    }

    #[test]
    fn colored_cell_has_exact_visible_width() {
        let mut col = ColumnFormat::with_role(&Palette::new(true), ColorRole::Command);
        for v in ["sh", "mysqld", "java"] {
            col.widen(v);
        }
        for v in ["sh", "mysqld", "java"] {
            let cell = col.cell(v, true);
            assert_eq!(visible_width(&cell), 6);
            assert!(cell.len() > 6);
        }
    }

    #[test]
    fn wide_glyphs_are_measured_in_cells() {
        let mut col = ColumnFormat::new();
        col.widen("日本");
        col.widen("abc");
        assert_eq!(col.width(), 4);
        assert_eq!(col.cell("abc", false), "abc ");
    }

    #[test]
    fn minimum_width_by_pre_seeding() {
        let mut col = ColumnFormat::new();
        col.widen("xxxxxxxxxx");
        col.widen("root");
        assert_eq!(col.cell("root", false).len(), 10);
    }

    #[test]
    fn oversized_value_is_not_truncated() {
        let mut col = ColumnFormat::new();
        col.widen("ab");
        assert_eq!(col.cell("abcd", false), "abcd");
    }

    #[test]
    fn reset_starts_a_new_frame() {
        let mut col = ColumnFormat::new();
        col.widen("long value");
        let _ = col.cell("long value", false);
        col.reset();
        assert_eq!(col.width(), 0);
        col.widen("x");
        assert_eq!(col.cell("x", false), "x");
    }

    #[test]
    fn set_justify_switches_alignment() {
        let mut col = ColumnFormat::new();
        col.set_right_justify();
        assert_eq!(col.justify(), Justify::Right);
        col.set_left_justify();
        assert_eq!(col.justify(), Justify::Left);
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "after print")]
    fn widen_after_print_is_rejected_in_debug() {
        let mut col = ColumnFormat::new();
        col.widen("a");
        let _ = col.cell("a", false);
        col.widen("b");
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "before any widen")]
    fn print_before_widen_is_rejected_in_debug() {
        let mut col = ColumnFormat::new();
        let _ = col.cell("a", false);
    }
}
