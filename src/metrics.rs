//! Terminal metrics probe: character grid plus pixel dimensions.

use crossterm::terminal;
use std::io;

/// A snapshot of the terminal's character grid and pixel dimensions.
///
/// Captured fresh before every layout computation - the terminal may be
/// resized between batches, so a snapshot is never reused. A terminal that
/// does not report pixel sizes leaves the pixel fields at zero; the layout
/// engine rejects those as degenerate rather than guessing cell metrics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TerminalMetrics {
    pub columns: u16,
    pub rows: u16,
    pub pixel_width: u32,
    pub pixel_height: u32,
}

impl TerminalMetrics {
    pub fn pixels_per_col(&self) -> f64 {
        self.pixel_width as f64 / self.columns as f64
    }

    pub fn pixels_per_row(&self) -> f64 {
        self.pixel_height as f64 / self.rows as f64
    }

    /// Shrinks the row budget by `n` rows (for prompt/status chrome),
    /// preserving the pixels-per-row ratio to within a single rounding step.
    pub fn reserve_rows(&self, n: u16) -> TerminalMetrics {
        let rows = self.rows.saturating_sub(n);
        let pixel_height = if self.rows > 0 {
            (rows as f64 * self.pixel_height as f64 / self.rows as f64).round() as u32
        } else {
            0
        };
        TerminalMetrics {
            columns: self.columns,
            rows,
            pixel_width: self.pixel_width,
            pixel_height,
        }
    }
}

/// Reads the current terminal metrics. Called before every layout
/// computation; the result is never cached.
pub fn probe() -> io::Result<TerminalMetrics> {
    let size = terminal::window_size()?;
    Ok(TerminalMetrics {
        columns: size.columns,
        rows: size.rows,
        pixel_width: size.width as u32,
        pixel_height: size.height as u32,
    })
}
