//! Terminal grid: cell matrix, cursor, scroll region, tab stops, history.
//!
//! Cells are stored in row-major order in a flat `Vec<Cell>`. The grid owns
//! everything the escape parser mutates: cursor position (including the
//! deferred-wrap rest column), the DECSTBM scrolling region, the tab-stop
//! vector, the DECSC save slot, and the scrollback ring fed by rows retired
//! off the top of the region.
//!
//! All operations clamp rather than fail; no input can leave the grid with a
//! row count, column count, or cursor outside its invariants.

use unicode_width::UnicodeWidthChar;

use crate::cell::Cell;
use crate::scrollback::{DEFAULT_CAPACITY, Scrollback};
use crate::style::Style;

/// Tab stops default to every multiple of this many columns.
const TAB_INTERVAL: u16 = 8;

/// The DECSC save slot: cursor position plus the style in effect.
#[derive(Debug, Clone, Copy, Default)]
pub struct SavedCursor {
    pub row: u16,
    pub col: u16,
    pub style: Style,
}

/// 2D terminal cell grid with cursor and scrollback.
#[derive(Debug, Clone)]
pub struct Grid {
    cells: Vec<Cell>,
    rows: u16,
    cols: u16,
    cursor_row: u16,
    /// May rest at `cols` after writing the last column (deferred wrap).
    cursor_col: u16,
    saved: SavedCursor,
    scroll_top: u16,
    scroll_bottom: u16,
    tab_stops: Vec<bool>,
    scrollback: Scrollback,
}

impl Grid {
    /// Create a grid of blank cells. Dimensions are clamped to at least 1x1.
    #[must_use]
    pub fn new(rows: u16, cols: u16) -> Self {
        let rows = rows.max(1);
        let cols = cols.max(1);
        Self {
            cells: vec![Cell::default(); usize::from(rows) * usize::from(cols)],
            rows,
            cols,
            cursor_row: 0,
            cursor_col: 0,
            saved: SavedCursor::default(),
            scroll_top: 0,
            scroll_bottom: rows - 1,
            tab_stops: default_tab_stops(cols),
            scrollback: Scrollback::new(DEFAULT_CAPACITY),
        }
    }

    // ── Accessors ───────────────────────────────────────────────────

    #[must_use]
    pub fn rows(&self) -> u16 {
        self.rows
    }

    #[must_use]
    pub fn cols(&self) -> u16 {
        self.cols
    }

    /// Cursor position `(row, col)`; `col == cols()` while a wrap is pending.
    #[must_use]
    pub fn cursor(&self) -> (u16, u16) {
        (self.cursor_row, self.cursor_col)
    }

    /// The scrolling region as a closed interval `(top, bottom)`.
    #[must_use]
    pub fn scroll_region(&self) -> (u16, u16) {
        (self.scroll_top, self.scroll_bottom)
    }

    /// Cell at `(row, col)`, or `None` out of bounds.
    #[must_use]
    pub fn cell(&self, row: u16, col: u16) -> Option<&Cell> {
        if row < self.rows && col < self.cols {
            Some(&self.cells[self.index(row, col)])
        } else {
            None
        }
    }

    /// The cells of one row.
    #[must_use]
    pub fn row_cells(&self, row: u16) -> Option<&[Cell]> {
        if row < self.rows {
            let start = usize::from(row) * usize::from(self.cols);
            Some(&self.cells[start..start + usize::from(self.cols)])
        } else {
            None
        }
    }

    /// Retired-line history.
    #[must_use]
    pub fn scrollback(&self) -> &Scrollback {
        &self.scrollback
    }

    /// Number of lines in history.
    #[must_use]
    pub fn history_len(&self) -> usize {
        self.scrollback.len()
    }

    /// Change the history cap.
    pub fn set_scrollback_capacity(&mut self, capacity: usize) {
        self.scrollback.set_capacity(capacity);
    }

    /// Whether the column has a tab stop.
    #[must_use]
    pub fn tab_stop_at(&self, col: u16) -> bool {
        self.tab_stops.get(usize::from(col)).copied().unwrap_or(false)
    }

    /// The `rows()` lines visible when scrolled back by `offset` lines:
    /// the tail of the history spliced above the top of the live grid.
    ///
    /// `offset` is clamped to the history length. Renderers call this under
    /// the shared lock and copy what they need.
    #[must_use]
    pub fn view_rows(&self, offset: usize) -> Vec<&[Cell]> {
        let off = offset.min(self.scrollback.len());
        let mut out = Vec::with_capacity(usize::from(self.rows));
        for i in 0..usize::from(self.rows) {
            if i < off {
                let idx = self.scrollback.len() - off + i;
                // In-range by construction.
                if let Some(line) = self.scrollback.get(idx) {
                    out.push(line);
                }
            } else if let Some(row) = self.row_cells((i - off) as u16) {
                out.push(row);
            }
        }
        out
    }

    // ── Cursor movement ─────────────────────────────────────────────

    /// Clamp the cursor into bounds: `col` to `[0, cols-1]`, `row` to
    /// `[0, rows-1]`, or to the scrolling region when origin mode is on.
    pub fn clamp_cursor(&mut self, origin: bool) {
        if self.cursor_col > self.cols - 1 {
            self.cursor_col = self.cols - 1;
        }
        if origin {
            self.cursor_row = self.cursor_row.clamp(self.scroll_top, self.scroll_bottom);
        } else if self.cursor_row > self.rows - 1 {
            self.cursor_row = self.rows - 1;
        }
    }

    /// Absolute cursor placement; in origin mode `row` is relative to the
    /// scrolling top. Always followed by a clamp.
    pub fn set_cursor(&mut self, row: u16, col: u16, origin: bool) {
        self.cursor_row = if origin {
            row.saturating_add(self.scroll_top)
        } else {
            row
        };
        self.cursor_col = col;
        self.clamp_cursor(origin);
    }

    /// Relative cursor movement, clamped.
    pub fn move_cursor(&mut self, d_row: i32, d_col: i32, origin: bool) {
        self.clamp_cursor(origin);
        self.cursor_row = add_clamped(self.cursor_row, d_row);
        self.cursor_col = add_clamped(self.cursor_col, d_col);
        self.clamp_cursor(origin);
    }

    /// Place the cursor column directly (CR, CNL/CPL).
    pub fn set_col(&mut self, col: u16) {
        self.cursor_col = col.min(self.cols - 1);
    }

    /// Move down one row, scrolling the region if the bottom was crossed.
    pub fn index_down(&mut self) {
        self.cursor_row += 1;
        self.drop_first_row_if_overflow();
    }

    /// BS: one column left, stopping at the left margin.
    pub fn backspace(&mut self) {
        if self.cursor_col > 0 {
            self.cursor_col -= 1;
        }
    }

    // ── Printing ────────────────────────────────────────────────────

    /// Write one printable scalar at the cursor with the given style and
    /// advance, honouring deferred wrap, insert mode, and glyph width.
    ///
    /// Zero-width scalars (combining marks) are consumed without moving the
    /// cursor. A wide glyph that cannot fit before the right margin wraps
    /// when `autowrap` is on and is dropped otherwise.
    pub fn insert_cell(&mut self, ch: char, style: Style, autowrap: bool, insert: bool) {
        let width = match ch.width().unwrap_or(0) {
            0 => return,
            w => w.min(2) as u16,
        };

        // Cursor resting one past the last column: deferred wrap.
        if self.cursor_col == self.cols {
            if autowrap {
                self.cursor_col = 0;
                self.index_down();
            } else {
                // Overwrite in place at the right edge without advancing.
                let col = self.cols.saturating_sub(width);
                if width <= self.cols {
                    self.write_glyph(self.cursor_row, col, ch, style, width, insert);
                }
                return;
            }
        }

        // A wide glyph with only one free column left.
        if width == 2 && self.cursor_col + 1 >= self.cols {
            if !autowrap {
                return;
            }
            self.cursor_col = 0;
            self.index_down();
            if self.cols < 2 {
                return;
            }
        }

        let (row, col) = (self.cursor_row, self.cursor_col);
        self.write_glyph(row, col, ch, style, width, insert);
        self.cursor_col += width;
    }

    fn write_glyph(&mut self, row: u16, col: u16, ch: char, style: Style, width: u16, insert: bool) {
        if insert {
            self.insert_blanks_at(row, col, width);
        }
        // Keep the stub invariant: never leave a stub without its lead or a
        // lead without its stub.
        self.unlink_wide(row, col);
        if width == 2 {
            self.unlink_wide(row, col + 1);
            let idx = self.index(row, col);
            self.cells[idx] = Cell::new(ch, style);
            let idx = self.index(row, col + 1);
            self.cells[idx] = Cell::wide_stub(style);
        } else {
            let idx = self.index(row, col);
            self.cells[idx] = Cell::new(ch, style);
        }
    }

    /// Break any wide pair overlapping `col`, blanking the partner cell.
    fn unlink_wide(&mut self, row: u16, col: u16) {
        if col >= self.cols {
            return;
        }
        let idx = self.index(row, col);
        if self.cells[idx].is_wide_stub() {
            if col > 0 {
                let lead = self.index(row, col - 1);
                self.cells[lead] = Cell::default();
            }
        } else if col + 1 < self.cols {
            let next = self.index(row, col + 1);
            if self.cells[next].is_wide_stub() {
                self.cells[next] = Cell::default();
            }
        }
    }

    // ── Scrolling ───────────────────────────────────────────────────

    /// After moving one past the scrolling bottom, retire the region's top
    /// row to history, shift the region up, blank the bottom row, and pull
    /// the cursor back. Outside that path an out-of-range row is clamped.
    pub fn drop_first_row_if_overflow(&mut self) {
        if self.cursor_row == self.scroll_bottom + 1 {
            let top = usize::from(self.scroll_top) * usize::from(self.cols);
            let retired = self.cells[top..top + usize::from(self.cols)].to_vec();
            self.scrollback.push_row(retired);
            self.shift_region_up(self.scroll_top, 1);
            self.cursor_row -= 1;
        } else if self.cursor_row >= self.rows {
            self.cursor_row = self.rows - 1;
        }
    }

    /// SU: scroll the region up `n` lines, blanking at the bottom.
    /// Does not touch history.
    pub fn scroll_up(&mut self, n: u16) {
        self.shift_region_up(self.scroll_top, n);
    }

    /// Scroll the region down `n` lines, blanking at the top (reverse-index
    /// path). Never touches history.
    pub fn scroll_down(&mut self, n: u16) {
        self.shift_region_down(self.scroll_top, n);
    }

    /// RI at the top margin: region down one; otherwise cursor up one.
    pub fn reverse_index(&mut self, origin: bool) {
        if self.cursor_row == self.scroll_top {
            self.scroll_down(1);
        } else {
            self.cursor_row = self.cursor_row.saturating_sub(1);
            self.clamp_cursor(origin);
        }
    }

    /// Shift rows of `[from, scroll_bottom]` up by `n`, blanking the vacated
    /// bottom rows.
    fn shift_region_up(&mut self, from: u16, n: u16) {
        if from > self.scroll_bottom || n == 0 {
            return;
        }
        let n = n.min(self.scroll_bottom - from + 1);
        let cols = usize::from(self.cols);
        let src = usize::from(from + n) * cols;
        let dst = usize::from(from) * cols;
        let len = usize::from(self.scroll_bottom + 1 - from - n) * cols;
        self.cells.copy_within(src..src + len, dst);
        let blank_start = usize::from(self.scroll_bottom + 1 - n) * cols;
        let blank_end = usize::from(self.scroll_bottom + 1) * cols;
        self.cells[blank_start..blank_end].fill(Cell::default());
    }

    /// Shift rows of `[from, scroll_bottom]` down by `n`, blanking the
    /// vacated top rows.
    fn shift_region_down(&mut self, from: u16, n: u16) {
        if from > self.scroll_bottom || n == 0 {
            return;
        }
        let n = n.min(self.scroll_bottom - from + 1);
        let cols = usize::from(self.cols);
        let src = usize::from(from) * cols;
        let dst = usize::from(from + n) * cols;
        let len = usize::from(self.scroll_bottom + 1 - from - n) * cols;
        self.cells.copy_within(src..src + len, dst);
        let blank_end = usize::from(from + n) * cols;
        self.cells[src..blank_end].fill(Cell::default());
    }

    /// DECSTBM: set the scrolling region. Returns whether the bounds were
    /// accepted (`top < bottom`, both in range).
    pub fn set_scroll_region(&mut self, top: u16, bottom: u16) -> bool {
        if top < bottom && bottom <= self.rows - 1 {
            self.scroll_top = top;
            self.scroll_bottom = bottom;
            true
        } else {
            false
        }
    }

    // ── Erasing ─────────────────────────────────────────────────────

    /// ED 0: from the cursor to the end of the display.
    pub fn erase_below(&mut self) {
        let (row, col) = (self.cursor_row, self.cursor_col.min(self.cols - 1));
        let start = self.index(row, col);
        self.cells[start..].fill(Cell::default());
    }

    /// ED 1: from the start of the display through the cursor.
    pub fn erase_above(&mut self) {
        let (row, col) = (self.cursor_row, self.cursor_col.min(self.cols - 1));
        let end = self.index(row, col) + 1;
        self.cells[..end].fill(Cell::default());
    }

    /// ED 2: the whole display.
    pub fn erase_all(&mut self) {
        self.cells.fill(Cell::default());
    }

    /// EL 0: from the cursor to the end of the line.
    pub fn erase_line_right(&mut self) {
        let col = self.cursor_col.min(self.cols - 1);
        let start = self.index(self.cursor_row, col);
        let end = self.index(self.cursor_row, 0) + usize::from(self.cols);
        self.cells[start..end].fill(Cell::default());
    }

    /// EL 1: from the start of the line through the cursor.
    pub fn erase_line_left(&mut self) {
        let col = self.cursor_col.min(self.cols - 1);
        let start = self.index(self.cursor_row, 0);
        let end = self.index(self.cursor_row, col) + 1;
        self.cells[start..end].fill(Cell::default());
    }

    /// EL 2: the whole line.
    pub fn erase_line(&mut self) {
        let start = self.index(self.cursor_row, 0);
        self.cells[start..start + usize::from(self.cols)].fill(Cell::default());
    }

    /// ECH: blank `n` cells from the cursor without moving anything.
    pub fn erase_chars(&mut self, n: u16) {
        let col = self.cursor_col.min(self.cols - 1);
        let end = col.saturating_add(n).min(self.cols);
        let start = self.index(self.cursor_row, col);
        let stop = self.index(self.cursor_row, 0) + usize::from(end);
        self.cells[start..stop].fill(Cell::default());
    }

    // ── Insert / delete ─────────────────────────────────────────────

    /// ICH: insert `n` blank cells at the cursor, shifting the rest of the
    /// row right; cells pushed past the margin are lost.
    pub fn insert_blanks(&mut self, n: u16) {
        let col = self.cursor_col.min(self.cols - 1);
        self.insert_blanks_at(self.cursor_row, col, n);
    }

    fn insert_blanks_at(&mut self, row: u16, col: u16, n: u16) {
        if col >= self.cols || n == 0 {
            return;
        }
        let n = n.min(self.cols - col);
        let start = self.index(row, 0);
        let row_slice = &mut self.cells[start..start + usize::from(self.cols)];
        row_slice[usize::from(col)..].rotate_right(usize::from(n));
        row_slice[usize::from(col)..usize::from(col + n)].fill(Cell::default());
    }

    /// DCH: delete `n` cells at the cursor, shifting the rest of the row
    /// left and blanking at the margin.
    pub fn delete_chars(&mut self, n: u16) {
        let col = self.cursor_col.min(self.cols - 1);
        if n == 0 {
            return;
        }
        let n = n.min(self.cols - col);
        let start = self.index(self.cursor_row, 0);
        let row_slice = &mut self.cells[start..start + usize::from(self.cols)];
        row_slice[usize::from(col)..].rotate_left(usize::from(n));
        let blank_from = usize::from(self.cols - n);
        row_slice[blank_from..].fill(Cell::default());
    }

    /// IL: insert `n` blank lines at the cursor row inside the scrolling
    /// region (no-op outside); the cursor moves to column 0.
    pub fn insert_lines(&mut self, n: u16) {
        if self.cursor_row < self.scroll_top || self.cursor_row > self.scroll_bottom {
            return;
        }
        self.shift_region_down(self.cursor_row, n);
        self.cursor_col = 0;
    }

    /// DL: delete `n` lines at the cursor row inside the scrolling region
    /// (no-op outside); the cursor moves to column 0.
    pub fn delete_lines(&mut self, n: u16) {
        if self.cursor_row < self.scroll_top || self.cursor_row > self.scroll_bottom {
            return;
        }
        self.shift_region_up(self.cursor_row, n);
        self.cursor_col = 0;
    }

    // ── Tab stops ───────────────────────────────────────────────────

    /// HTS: set a stop at the cursor column.
    pub fn set_tab_stop(&mut self) {
        let col = usize::from(self.cursor_col.min(self.cols - 1));
        self.tab_stops[col] = true;
    }

    /// TBC 0: clear the stop at the cursor column.
    pub fn clear_tab_stop(&mut self) {
        let col = usize::from(self.cursor_col.min(self.cols - 1));
        self.tab_stops[col] = false;
    }

    /// TBC 3: clear every stop.
    pub fn clear_all_tab_stops(&mut self) {
        self.tab_stops.fill(false);
    }

    /// HT: advance to the next stop, or to the last column if none remain.
    /// The cursor never wraps on tab.
    pub fn tab_forward(&mut self) {
        let mut col = self.cursor_col.saturating_add(1);
        while col < self.cols && !self.tab_stops[usize::from(col)] {
            col += 1;
        }
        self.cursor_col = col.min(self.cols - 1);
    }

    // ── Save / restore ──────────────────────────────────────────────

    /// DECSC: remember `(row, col)` and the style in effect.
    pub fn save_cursor(&mut self, style: Style) {
        self.saved = SavedCursor {
            row: self.cursor_row,
            col: self.cursor_col,
            style,
        };
    }

    /// DECRC: restore the saved position (clamped) and hand back the style.
    pub fn restore_cursor(&mut self, origin: bool) -> Style {
        self.cursor_row = self.saved.row;
        self.cursor_col = self.saved.col;
        self.clamp_cursor(origin);
        self.saved.style
    }

    // ── Whole-grid operations ───────────────────────────────────────

    /// DECALN: fill every cell with `ch` in the default style.
    pub fn fill_all(&mut self, ch: char) {
        self.cells.fill(Cell::new(ch, Style::default()));
    }

    /// Resize, preserving content where it fits.
    ///
    /// Each row is padded or truncated, the scrolling region resets to the
    /// full height, the cursor is clamped into the new bounds, and tab stops
    /// gain the default every-8 stops over any newly exposed columns.
    /// Dimensions are clamped to at least 1x1. Callers owning a PTY push the
    /// new window size themselves; the grid is pure.
    pub fn resize_to(&mut self, rows: u16, cols: u16) {
        let rows = rows.max(1);
        let cols = cols.max(1);
        if rows == self.rows && cols == self.cols {
            self.scroll_top = 0;
            self.scroll_bottom = rows - 1;
            return;
        }

        let mut cells = vec![Cell::default(); usize::from(rows) * usize::from(cols)];
        let copy_cols = usize::from(self.cols.min(cols));
        for r in 0..usize::from(self.rows.min(rows)) {
            let old = r * usize::from(self.cols);
            let new = r * usize::from(cols);
            cells[new..new + copy_cols].copy_from_slice(&self.cells[old..old + copy_cols]);
        }
        self.cells = cells;

        let mut tab_stops = default_tab_stops(cols);
        for (col, stop) in self.tab_stops.iter().enumerate().take(usize::from(cols)) {
            tab_stops[col] = *stop;
        }
        self.tab_stops = tab_stops;

        self.rows = rows;
        self.cols = cols;
        self.scroll_top = 0;
        self.scroll_bottom = rows - 1;
        if self.cursor_row > rows - 1 {
            self.cursor_row = rows - 1;
        }
        if self.cursor_col > cols - 1 {
            self.cursor_col = cols - 1;
        }
    }

    #[inline]
    fn index(&self, row: u16, col: u16) -> usize {
        usize::from(row) * usize::from(self.cols) + usize::from(col)
    }
}

fn default_tab_stops(cols: u16) -> Vec<bool> {
    (0..cols).map(|c| c % TAB_INTERVAL == 0).collect()
}

fn add_clamped(value: u16, delta: i32) -> u16 {
    let v = i32::from(value) + delta;
    u16::try_from(v.max(0)).unwrap_or(u16::MAX)
}
