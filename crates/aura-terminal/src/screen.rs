//! Terminal screen buffer
//!
//! The 2-D grid of styled cells plus cursor, pen state and the bounded
//! scrollback ring. The interpreter is the only writer; renderers read
//! through the snapshot accessors.

use std::collections::VecDeque;

use crate::palette::{Rgba, DEFAULT_BACKGROUND, DEFAULT_FOREGROUND};

/// Default scrollback capacity in rows.
pub const DEFAULT_SCROLLBACK: usize = 10_000;

/// A single styled character cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cell {
    pub ch: char,
    pub fg: Rgba,
    pub bg: Rgba,
    pub bold: bool,
}

impl Default for Cell {
    fn default() -> Self {
        Self {
            ch: ' ',
            fg: DEFAULT_FOREGROUND,
            bg: DEFAULT_BACKGROUND,
            bold: false,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ScreenBuffer {
    cols: usize,
    rows: usize,
    /// Cells in row-major order.
    cells: Vec<Cell>,
    cursor_row: usize,
    /// Deferred-wrap column: may sit at `cols` after writing into the last
    /// column; the public accessor clamps, the next write wraps first.
    cursor_col: usize,
    saved_cursor: (usize, usize),
    pen_fg: Rgba,
    pen_bg: Rgba,
    pen_bold: bool,
    scrollback: VecDeque<Vec<Cell>>,
    scrollback_capacity: usize,
}

impl ScreenBuffer {
    pub fn new(cols: usize, rows: usize) -> Self {
        Self::with_scrollback_capacity(cols, rows, DEFAULT_SCROLLBACK)
    }

    pub fn with_scrollback_capacity(cols: usize, rows: usize, capacity: usize) -> Self {
        Self {
            cols,
            rows,
            cells: vec![Cell::default(); cols * rows],
            cursor_row: 0,
            cursor_col: 0,
            saved_cursor: (0, 0),
            pen_fg: DEFAULT_FOREGROUND,
            pen_bg: DEFAULT_BACKGROUND,
            pen_bold: false,
            scrollback: VecDeque::new(),
            scrollback_capacity: capacity,
        }
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cursor_row(&self) -> usize {
        self.cursor_row
    }

    pub fn cursor_col(&self) -> usize {
        self.cursor_col.min(self.cols.saturating_sub(1))
    }

    /// Move the cursor, clamping both axes into the grid.
    pub fn set_cursor_position(&mut self, row: usize, col: usize) {
        self.cursor_row = row.min(self.rows.saturating_sub(1));
        self.cursor_col = col.min(self.cols.saturating_sub(1));
    }

    /// Overwrite the single saved-cursor slot.
    pub fn save_cursor(&mut self) {
        self.saved_cursor = (self.cursor_row(), self.cursor_col());
    }

    pub fn restore_cursor(&mut self) {
        let (row, col) = self.saved_cursor;
        self.set_cursor_position(row, col);
    }

    pub fn pen_foreground(&self) -> Rgba {
        self.pen_fg
    }

    pub fn pen_background(&self) -> Rgba {
        self.pen_bg
    }

    pub fn pen_bold(&self) -> bool {
        self.pen_bold
    }

    pub fn set_foreground(&mut self, color: Rgba) {
        self.pen_fg = color;
    }

    pub fn set_background(&mut self, color: Rgba) {
        self.pen_bg = color;
    }

    pub fn set_bold(&mut self, bold: bool) {
        self.pen_bold = bold;
    }

    pub fn reset_pen(&mut self) {
        self.pen_fg = DEFAULT_FOREGROUND;
        self.pen_bg = DEFAULT_BACKGROUND;
        self.pen_bold = false;
    }

    /// Write a character at the cursor with the current pen, wrapping to a
    /// fresh line first when the previous write filled the last column.
    pub fn put_char(&mut self, ch: char) {
        if self.cols == 0 || self.rows == 0 {
            return;
        }
        if self.cursor_col >= self.cols {
            self.cursor_col = 0;
            self.newline();
        }
        let idx = self.cursor_row * self.cols + self.cursor_col;
        self.cells[idx] = Cell {
            ch,
            fg: self.pen_fg,
            bg: self.pen_bg,
            bold: self.pen_bold,
        };
        self.cursor_col += 1;
    }

    /// Line feed: down one row, scrolling at the bottom. The column is left
    /// alone; that is carriage return's job.
    pub fn newline(&mut self) {
        if self.rows == 0 {
            return;
        }
        self.cursor_row += 1;
        if self.cursor_row >= self.rows {
            self.scroll_up();
            self.cursor_row = self.rows - 1;
        }
    }

    pub fn carriage_return(&mut self) {
        self.cursor_col = 0;
    }

    pub fn backspace(&mut self) {
        // Subtract from the raw column so a pending wrap steps back onto
        // the last cell, not past it.
        self.cursor_col = self.cursor_col.saturating_sub(1);
    }

    /// Advance to the next multiple-of-8 column, clamped to the last column.
    pub fn tab(&mut self) {
        self.cursor_col = (((self.cursor_col() / 8) + 1) * 8).min(self.cols.saturating_sub(1));
    }

    /// Shift the grid up one row, evicting the top row into scrollback.
    pub fn scroll_up(&mut self) {
        if self.rows == 0 || self.cols == 0 {
            return;
        }
        if self.scrollback_capacity > 0 {
            if self.scrollback.len() >= self.scrollback_capacity {
                self.scrollback.pop_front();
            }
            self.scrollback.push_back(self.cells[..self.cols].to_vec());
        }
        self.cells.rotate_left(self.cols);
        for cell in &mut self.cells[(self.rows - 1) * self.cols..] {
            *cell = Cell::default();
        }
    }

    /// Erase in display: 0 = cursor to end, 1 = start to cursor, 2/3 =
    /// whole screen. Erased cells become defaults; nothing is pushed to
    /// scrollback.
    pub fn erase_in_display(&mut self, mode: u16) {
        if self.rows == 0 || self.cols == 0 {
            return;
        }
        match mode {
            0 => {
                self.erase_in_line(0);
                let start = (self.cursor_row + 1) * self.cols;
                for cell in &mut self.cells[start.min(self.cols * self.rows)..] {
                    *cell = Cell::default();
                }
            }
            1 => {
                let start = self.cursor_row * self.cols;
                for cell in &mut self.cells[..start] {
                    *cell = Cell::default();
                }
                self.erase_in_line(1);
            }
            2 | 3 => {
                for cell in &mut self.cells {
                    *cell = Cell::default();
                }
            }
            _ => {}
        }
    }

    /// Erase in line: 0 = cursor to end of row, 1 = start through cursor,
    /// 2 = whole row.
    pub fn erase_in_line(&mut self, mode: u16) {
        if self.rows == 0 || self.cols == 0 {
            return;
        }
        let row_start = self.cursor_row * self.cols;
        let col = self.cursor_col();
        let range = match mode {
            0 => col..self.cols,
            1 => 0..col + 1,
            2 => 0..self.cols,
            _ => return,
        };
        for c in range {
            self.cells[row_start + c] = Cell::default();
        }
    }

    /// Reallocate the grid, keeping the top-left overlapping region and
    /// clamping the cursor. Scrollback is unaffected.
    pub fn resize(&mut self, new_cols: usize, new_rows: usize) {
        let mut new_cells = vec![Cell::default(); new_cols * new_rows];
        let copy_cols = self.cols.min(new_cols);
        for row in 0..self.rows.min(new_rows) {
            let old = row * self.cols;
            let new = row * new_cols;
            new_cells[new..new + copy_cols].copy_from_slice(&self.cells[old..old + copy_cols]);
        }
        self.cells = new_cells;
        self.cols = new_cols;
        self.rows = new_rows;
        self.cursor_row = self.cursor_row.min(new_rows.saturating_sub(1));
        self.cursor_col = self.cursor_col.min(new_cols.saturating_sub(1));
    }

    /// Wipe the grid, home the cursor and reset the pen. Scrollback is
    /// kept.
    pub fn clear(&mut self) {
        for cell in &mut self.cells {
            *cell = Cell::default();
        }
        self.cursor_row = 0;
        self.cursor_col = 0;
        self.reset_pen();
    }

    pub fn cell_at(&self, row: usize, col: usize) -> Option<&Cell> {
        if row >= self.rows || col >= self.cols {
            return None;
        }
        self.cells.get(row * self.cols + col)
    }

    /// Snapshot of the live grid, rows of cells.
    pub fn screen_contents(&self) -> Vec<Vec<Cell>> {
        self.cells.chunks(self.cols.max(1)).map(<[Cell]>::to_vec).collect()
    }

    /// Snapshot of the scrollback, oldest row first.
    pub fn scrollback_contents(&self) -> Vec<Vec<Cell>> {
        self.scrollback.iter().cloned().collect()
    }

    pub fn scrollback_len(&self) -> usize {
        self.scrollback.len()
    }

    /// Extract the text between two grid positions, in reading order. The
    /// endpoints may be given in either order; trailing whitespace is
    /// trimmed.
    pub fn text_range(
        &self,
        start_row: usize,
        start_col: usize,
        end_row: usize,
        end_col: usize,
    ) -> String {
        let forward = start_row < end_row || (start_row == end_row && start_col <= end_col);
        let (sr, sc, er, ec) = if forward {
            (start_row, start_col, end_row, end_col)
        } else {
            (end_row, end_col, start_row, start_col)
        };

        let mut text = String::new();
        for row in sr..=er {
            if row >= self.rows {
                continue;
            }
            let col_start = if row == sr { sc } else { 0 };
            let col_end = if row == er {
                ec.min(self.cols.saturating_sub(1))
            } else {
                self.cols.saturating_sub(1)
            };
            for col in col_start..=col_end {
                if col < self.cols {
                    text.push(self.cells[row * self.cols + col].ch);
                }
            }
            if row < er {
                text.push('\n');
            }
        }
        text.trim_end().to_string()
    }

    /// The whole grid as text, rows joined by newlines, trailing whitespace
    /// trimmed.
    pub fn all_text(&self) -> String {
        let mut text = String::new();
        for row in 0..self.rows {
            for col in 0..self.cols {
                text.push(self.cells[row * self.cols + col].ch);
            }
            if row + 1 < self.rows {
                text.push('\n');
            }
        }
        text.trim_end().to_string()
    }
}
