//! Textual progress bar redrawn in place on the current terminal line.

use std::{io, iter};

/// Number of glyphs between the brackets of the bar.
pub const BAR_WIDTH: usize = 34;

/// Glyph of the completed part of the bar.
#[expect(clippy::non_ascii_literal, reason = "block glyph of the bar")]
const FILLED: char = '█';

/// Glyph of the remaining part of the bar.
const EMPTY: char = '-';

/// Snapshot of a transfer, reported after every received block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[expect(clippy::exhaustive_structs, reason = "plain data")]
pub struct Progress {
    /// Number of blocks received so far.
    pub blocks: u64,
    /// Size of a single block in bytes.
    pub block_size: u64,
    /// Announced size of the whole transfer, if known.
    pub total: Option<u64>,
}

impl Progress {
    /// Bytes covered by the received blocks.
    ///
    /// The last block may be partial, so this can overshoot the total.
    #[inline]
    #[must_use]
    pub const fn bytes(&self) -> u64 {
        self.blocks.saturating_mul(self.block_size)
    }

    /// `100 * blocks * block_size / total`, capped at 100.
    ///
    /// [`None`] if the total size is unknown. An empty transfer is complete.
    #[inline]
    #[must_use]
    #[expect(clippy::cast_precision_loss, reason = "only used for display")]
    #[expect(clippy::float_arithmetic, reason = "percentage")]
    pub fn percentage(&self) -> Option<f64> {
        let total = self.total?;
        if total == 0 {
            return Some(100.0);
        }
        let percentage = 100.0 * self.bytes() as f64 / total as f64;
        Some(percentage.min(100.0))
    }

    /// Number of filled glyphs out of `width`, truncated towards zero.
    ///
    /// Truncation means the label may read 100% a redraw before the last glyph
    /// is filled; that is left as is.
    #[inline]
    #[must_use]
    pub fn filled(&self, width: usize) -> usize {
        let Some(total) = self.total else {
            return 0;
        };
        if total == 0 {
            return width;
        }
        let filled = u128::from(self.bytes()) * width as u128 / u128::from(total);
        usize::try_from(filled).map_or(width, |filled| filled.min(width))
    }
}

/// Draws [`Progress`] as `[████------]42.0% / 100%` over the current line.
#[derive(Debug)]
pub struct ProgressBar<W> {
    /// Where the bar is drawn.
    writer: W,
    /// Glyphs between the brackets.
    width: usize,
}

impl<W: io::Write> ProgressBar<W> {
    /// Creates a bar of [`BAR_WIDTH`] glyphs drawing into `writer`.
    #[inline]
    pub const fn new(writer: W) -> Self {
        Self {
            writer,
            width: BAR_WIDTH,
        }
    }

    /// Redraws the bar for the given progress.
    ///
    /// # Errors
    ///
    /// Returns an error if writing to the underlying writer fails.
    #[inline]
    pub fn draw(&mut self, progress: Progress) -> io::Result<()> {
        let line = render(progress, self.width);
        self.writer.write_all(line.as_bytes())?;
        self.writer.flush()
    }

    /// Moves past the bar so the next output starts on a fresh line.
    ///
    /// # Errors
    ///
    /// Returns an error if writing to the underlying writer fails.
    #[inline]
    pub fn finish(mut self) -> io::Result<W> {
        self.writer.write_all(b"\n\n")?;
        self.writer.flush()?;
        Ok(self.writer)
    }
}

/// Renders one frame of the bar, starting with a carriage return.
#[must_use]
pub fn render(progress: Progress, width: usize) -> String {
    let filled = progress.filled(width);
    let mut line = String::with_capacity(width * FILLED.len_utf8() + 24);
    line.push('\r');
    line.push('[');
    line.extend(iter::repeat(FILLED).take(filled));
    line.extend(iter::repeat(EMPTY).take(width - filled));
    line.push(']');
    match progress.percentage() {
        Some(percentage) => line.push_str(&format!("{percentage:.1}% / 100%")),
        None => line.push_str(&format!("{} KiB", progress.bytes() / 1024)),
    }
    line
}
