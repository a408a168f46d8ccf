#![forbid(unsafe_code)]

//! Text bar graph over a [`SampleSeries`].
//!
//! The graph is rebuilt from the raw samples on every [`Graph::transform`];
//! the previous grid is never an input, so shrinking and regrowing the
//! terminal does not compound resolution loss.
//!
//! Each column is one bucket. Its value is scaled linearly against the
//! series' observed maximum onto `height` cells, and the fractional top cell
//! uses one of 9 block glyphs (`' '`, `▁` .. `█`), rounding to the nearest
//! tier.
//!
//! # Example
//!
//! ```
//! use ctop_widgets::graph::Graph;
//! use ctop_widgets::series::AggregateKind;
//!
//! let mut graph = Graph::new("CPU", AggregateKind::Max);
//! for v in [0.0, 50.0, 100.0] {
//!     graph.append_value(v);
//! }
//! graph.transform(3, 1);
//! graph.create_lines();
//! assert_eq!(graph.lines()[0], " ▄█");
//! ```

use std::io;

use ctop_core::surface::TerminalSurface;
use unicode_width::UnicodeWidthStr;

use crate::series::{AggregateKind, SampleSeries};

/// Block glyphs, empty plus 8 bar heights.
pub const GLYPHS: [char; 9] = [' ', '▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];

/// Separator between the y-axis labels and the plot.
const AXIS: &str = " │";

/// Number format for y-axis labels.
///
/// Precision follows the magnitude of the series maximum (two decimals
/// below 10, one below 100, none above) and the width is that of the
/// formatted maximum, so labels stay put while the data is unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct YLabelFormat {
    pub precision: usize,
    pub width: usize,
}

impl YLabelFormat {
    #[must_use]
    pub fn for_max(max: f64) -> Self {
        let max = if max.is_finite() { max } else { 0.0 };
        let precision = match max.abs() {
            m if m >= 100.0 => 0,
            m if m >= 10.0 => 1,
            _ => 2,
        };
        let width = format!("{max:.precision$}").len().max(1);
        Self { precision, width }
    }

    /// Format `value` right-aligned to the label width.
    #[must_use]
    pub fn format(&self, value: f64) -> String {
        format!(
            "{value:>width$.precision$}",
            width = self.width,
            precision = self.precision
        )
    }

    /// Blank label of the same width.
    #[must_use]
    pub fn blank(&self) -> String {
        " ".repeat(self.width)
    }
}

/// A titled bar graph with its own raw series.
#[derive(Debug, Clone, Default)]
pub struct Graph {
    title: String,
    series: SampleSeries,
    width: u16,
    height: u16,
    levels: Vec<f64>,
    lines: Vec<String>,
}

impl Graph {
    pub fn new(title: impl Into<String>, kind: AggregateKind) -> Self {
        Self::with_series(title, SampleSeries::new(kind))
    }

    pub fn with_series(title: impl Into<String>, series: SampleSeries) -> Self {
        Self {
            title: title.into(),
            series,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn append_value(&mut self, value: f64) {
        self.series.append(value);
    }

    #[must_use]
    pub fn n_values(&self) -> usize {
        self.series.len()
    }

    /// Maximum over all raw samples, 0 for an empty series.
    #[must_use]
    pub fn max(&self) -> f64 {
        self.series.max().unwrap_or(0.0)
    }

    #[must_use]
    pub fn y_label_format(&self) -> YLabelFormat {
        YLabelFormat::for_max(self.max())
    }

    /// Recompute bucket levels for a `width` x `height` plot.
    ///
    /// Zero width or height leaves an empty grid.
    pub fn transform(&mut self, width: u16, height: u16) {
        self.width = width;
        self.height = height;
        self.levels = if width == 0 || height == 0 {
            Vec::new()
        } else {
            scale_levels(&self.series.reduce(usize::from(width)), self.max(), height)
        };
        self.lines.clear();

        #[cfg(feature = "tracing")]
        tracing::trace!(
            title = %self.title,
            samples = self.series.len(),
            width,
            height,
            buckets = self.levels.len(),
            "graph transformed"
        );
    }

    /// Fractional level of each bucket, in `[0, height]`.
    #[must_use]
    pub fn levels(&self) -> &[f64] {
        &self.levels
    }

    /// Turn the current levels into `height` rows of `width` cells.
    pub fn create_lines(&mut self) {
        self.lines = create_lines(&self.levels, self.width, self.height);
    }

    /// Plot rows, top to bottom, without labels.
    #[must_use]
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Lay out for a total area of `width` x `height` cells.
    ///
    /// One row goes to the title and the y-axis gutter is taken from the
    /// width; the rest is the plot.
    pub fn realize(&mut self, width: u16, height: u16) {
        let gutter = self.gutter_width();
        let plot_width = usize::from(width).saturating_sub(gutter);
        let plot_width = u16::try_from(plot_width).unwrap_or(u16::MAX);
        self.transform(plot_width, height.saturating_sub(1));
        self.create_lines();
    }

    fn gutter_width(&self) -> usize {
        self.y_label_format().width + AXIS.width()
    }

    /// Title plus labelled plot rows, ready to print.
    ///
    /// The top, middle and bottom rows are labelled with the value at the
    /// top edge of that row, so the top row reads the maximum and the bottom
    /// row reads `max / rows`.
    #[must_use]
    pub fn printable_lines(&self) -> Vec<String> {
        let format = self.y_label_format();
        let rows = self.lines.len();
        let mut out = Vec::with_capacity(rows + 1);
        out.push(self.title.clone());
        for (idx, row) in self.lines.iter().enumerate() {
            let labelled = idx == 0 || idx + 1 == rows || (rows >= 3 && idx == rows / 2);
            let label = if labelled {
                format.format(self.max() * (rows - idx) as f64 / rows as f64)
            } else {
                format.blank()
            };
            out.push(format!("{label}{AXIS}{row}"));
        }
        out
    }

    /// Write the title and rows to `surface`, one line each.
    pub fn print(&self, surface: &mut impl TerminalSurface) -> io::Result<()> {
        for line in self.printable_lines() {
            surface.write_str(&line)?;
            surface.clear_to_end_of_line()?;
            surface.next_line()?;
        }
        Ok(())
    }
}

/// Scale bucket values onto `[0, height]` against `max`.
///
/// A non-positive maximum maps everything to 0; negative and non-finite
/// buckets clamp to 0.
#[must_use]
pub fn scale_levels(buckets: &[f64], max: f64, height: u16) -> Vec<f64> {
    let height = f64::from(height);
    buckets
        .iter()
        .map(|&value| {
            if max.is_nan() || max <= 0.0 || !value.is_finite() {
                return 0.0;
            }
            (value.max(0.0) / max * height).clamp(0.0, height)
        })
        .collect()
}

/// Render levels into `height` rows of exactly `width` glyphs.
///
/// Columns past the last bucket are blank; a zero dimension yields no rows.
#[must_use]
pub fn create_lines(levels: &[f64], width: u16, height: u16) -> Vec<String> {
    if width == 0 {
        return Vec::new();
    }
    let width = usize::from(width);
    (0..height)
        .map(|row| {
            let base = f64::from(height - 1 - row);
            let mut line: String = levels
                .iter()
                .take(width)
                .map(|&level| glyph_for((level - base).clamp(0.0, 1.0)))
                .collect();
            let filled = levels.len().min(width);
            line.extend(std::iter::repeat_n(' ', width - filled));
            line
        })
        .collect()
}

/// Glyph for a cell filled to `fill` (0.0 ..= 1.0).
#[must_use]
pub fn glyph_for(fill: f64) -> char {
    let tier = (fill.clamp(0.0, 1.0) * 8.0).round() as usize;
    GLYPHS[tier.min(8)]
}
