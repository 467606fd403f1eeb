//! Terminal emulation engine for Aura
//!
//! A VT state machine that consumes the raw byte stream of a shell running
//! inside a PTY, interprets ANSI/xterm escape sequences and maintains a 2-D
//! grid of styled cells with cursor and scrollback. The rendering layer
//! reads snapshots through [`Terminal`]; it never mutates the buffer itself.

pub mod decoder;
pub mod emulator;
pub mod interpreter;
pub mod palette;
pub mod scanner;
pub mod screen;

pub use decoder::Utf8Decoder;
pub use emulator::Terminal;
pub use interpreter::VtInterpreter;
pub use palette::{indexed_color, Rgba, ANSI_COLORS, DEFAULT_BACKGROUND, DEFAULT_FOREGROUND};
pub use scanner::{Scanner, Token};
pub use screen::{Cell, ScreenBuffer, DEFAULT_SCROLLBACK};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum TerminalError {
    #[error("invalid terminal size: {cols}x{rows}")]
    InvalidSize { cols: usize, rows: usize },
}
