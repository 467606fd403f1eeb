//! Terminal emulator facade
//!
//! Bundles the decode/scan/interpret pipeline with a screen buffer behind
//! the surface the rendering collaborator consumes. `process` takes
//! `&mut self`, so the buffer has exactly one writer by construction.

use crate::interpreter::VtInterpreter;
use crate::screen::{Cell, ScreenBuffer, DEFAULT_SCROLLBACK};
use crate::TerminalError;

pub struct Terminal {
    interpreter: VtInterpreter,
    screen: ScreenBuffer,
}

impl Terminal {
    pub fn new(cols: usize, rows: usize) -> Self {
        Self::with_scrollback_capacity(cols, rows, DEFAULT_SCROLLBACK)
    }

    pub fn with_scrollback_capacity(cols: usize, rows: usize, capacity: usize) -> Self {
        Self {
            interpreter: VtInterpreter::new(),
            screen: ScreenBuffer::with_scrollback_capacity(cols, rows, capacity),
        }
    }

    /// Feed one chunk of raw shell output through the pipeline. Chunk
    /// boundaries are arbitrary; split escape sequences and split UTF-8 are
    /// resumed on the next call.
    pub fn process(&mut self, bytes: &[u8]) {
        self.interpreter.process(&mut self.screen, bytes);
    }

    pub fn resize(&mut self, cols: usize, rows: usize) -> Result<(), TerminalError> {
        if cols == 0 || rows == 0 {
            return Err(TerminalError::InvalidSize { cols, rows });
        }
        self.screen.resize(cols, rows);
        Ok(())
    }

    /// Wipe the grid and home the cursor; scrollback is untouched.
    pub fn clear(&mut self) {
        self.screen.clear();
    }

    /// Most recent OSC window title seen in the stream.
    pub fn title(&self) -> Option<&str> {
        self.interpreter.title()
    }

    pub fn screen(&self) -> &ScreenBuffer {
        &self.screen
    }

    pub fn screen_mut(&mut self) -> &mut ScreenBuffer {
        &mut self.screen
    }

    pub fn dimensions(&self) -> (usize, usize) {
        (self.screen.cols(), self.screen.rows())
    }

    pub fn cursor_position(&self) -> (usize, usize) {
        (self.screen.cursor_row(), self.screen.cursor_col())
    }

    pub fn screen_contents(&self) -> Vec<Vec<Cell>> {
        self.screen.screen_contents()
    }

    pub fn scrollback_contents(&self) -> Vec<Vec<Cell>> {
        self.screen.scrollback_contents()
    }

    pub fn text_range(
        &self,
        start_row: usize,
        start_col: usize,
        end_row: usize,
        end_col: usize,
    ) -> String {
        self.screen.text_range(start_row, start_col, end_row, end_col)
    }

    pub fn all_text(&self) -> String {
        self.screen.all_text()
    }
}
