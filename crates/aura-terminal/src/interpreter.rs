//! VT command interpreter
//!
//! Maps scanner tokens onto screen buffer mutations. Protocol errors never
//! surface: missing parameters take command defaults, out-of-range targets
//! clamp, unknown commands are dropped.

use tracing::trace;

use crate::decoder::Utf8Decoder;
use crate::palette::{indexed_color, Rgba, ANSI_COLORS, DEFAULT_BACKGROUND, DEFAULT_FOREGROUND};
use crate::scanner::{Scanner, Token};
use crate::screen::ScreenBuffer;

#[derive(Debug, Default)]
pub struct VtInterpreter {
    decoder: Utf8Decoder,
    scanner: Scanner,
    /// Most recent OSC 0/2 window title, if any.
    title: Option<String>,
    // Scratch buffers reused across chunks.
    text: String,
    tokens: Vec<Token>,
}

impl VtInterpreter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    /// Decode, scan and apply one chunk of raw shell output.
    pub fn process(&mut self, screen: &mut ScreenBuffer, bytes: &[u8]) {
        self.text.clear();
        self.decoder.feed(bytes, &mut self.text);

        let mut tokens = std::mem::take(&mut self.tokens);
        tokens.clear();
        self.scanner.scan(&self.text, &mut tokens);
        for token in tokens.drain(..) {
            self.apply(screen, token);
        }
        self.tokens = tokens;
    }

    fn apply(&mut self, screen: &mut ScreenBuffer, token: Token) {
        match token {
            Token::Literal(ch) => screen.put_char(ch),
            Token::Control(ch) => match ch {
                '\r' => screen.carriage_return(),
                '\n' => screen.newline(),
                '\x08' => screen.backspace(),
                '\t' => screen.tab(),
                _ => {}
            },
            Token::Csi { params, final_byte } => apply_csi(screen, &params, final_byte),
            Token::Osc(payload) => {
                if let Some(title) = parse_title(&payload) {
                    self.title = Some(title.to_string());
                }
            }
            Token::Ignored => {}
        }
    }
}

fn apply_csi(screen: &mut ScreenBuffer, params: &[u16], final_byte: char) {
    match final_byte {
        'A' => {
            let row = screen.cursor_row().saturating_sub(count(params));
            screen.set_cursor_position(row, screen.cursor_col());
        }
        'B' => {
            let row = screen.cursor_row() + count(params);
            screen.set_cursor_position(row, screen.cursor_col());
        }
        'C' => {
            let col = screen.cursor_col() + count(params);
            screen.set_cursor_position(screen.cursor_row(), col);
        }
        'D' => {
            let col = screen.cursor_col().saturating_sub(count(params));
            screen.set_cursor_position(screen.cursor_row(), col);
        }
        'E' => {
            let row = screen.cursor_row() + count(params);
            screen.set_cursor_position(row, 0);
        }
        'F' => {
            let row = screen.cursor_row().saturating_sub(count(params));
            screen.set_cursor_position(row, 0);
        }
        'G' => {
            let col = param(params, 0, 1).saturating_sub(1);
            screen.set_cursor_position(screen.cursor_row(), col);
        }
        'H' | 'f' => {
            let row = param(params, 0, 1).saturating_sub(1);
            let col = param(params, 1, 1).saturating_sub(1);
            screen.set_cursor_position(row, col);
        }
        'J' => screen.erase_in_display(params.first().copied().unwrap_or(0)),
        'K' => screen.erase_in_line(params.first().copied().unwrap_or(0)),
        'm' => apply_sgr(screen, params),
        's' => screen.save_cursor(),
        'u' => screen.restore_cursor(),
        'd' => {
            let row = param(params, 0, 1).saturating_sub(1);
            screen.set_cursor_position(row, screen.cursor_col());
        }
        _ => trace!(%final_byte, "ignoring unsupported CSI command"),
    }
}

fn apply_sgr(screen: &mut ScreenBuffer, params: &[u16]) {
    if params.is_empty() {
        screen.reset_pen();
        return;
    }
    let mut i = 0;
    while i < params.len() {
        let code = params[i];
        match code {
            0 => screen.reset_pen(),
            1 => screen.set_bold(true),
            22 => screen.set_bold(false),
            30..=37 => screen.set_foreground(ANSI_COLORS[(code - 30) as usize]),
            39 => screen.set_foreground(DEFAULT_FOREGROUND),
            90..=97 => screen.set_foreground(ANSI_COLORS[(code - 90 + 8) as usize]),
            40..=47 => screen.set_background(ANSI_COLORS[(code - 40) as usize]),
            49 => screen.set_background(DEFAULT_BACKGROUND),
            100..=107 => screen.set_background(ANSI_COLORS[(code - 100 + 8) as usize]),
            38 | 48 => {
                if let Some((color, consumed)) = extended_color(&params[i + 1..]) {
                    if code == 38 {
                        screen.set_foreground(color);
                    } else {
                        screen.set_background(color);
                    }
                    i += consumed;
                }
                // Malformed extended color: only the 38/48 itself is
                // consumed, leftovers fall through as unknown codes.
            }
            _ => trace!(code, "ignoring unsupported SGR code"),
        }
        i += 1;
    }
}

/// Parse the tail of a 38/48 extended-color code; returns the color and the
/// number of extra parameters consumed, or `None` when malformed.
fn extended_color(rest: &[u16]) -> Option<(Rgba, usize)> {
    match rest.first()? {
        5 => {
            let index = *rest.get(1)?;
            Some((indexed_color(clamp8(index)), 2))
        }
        2 => {
            let r = *rest.get(1)?;
            let g = *rest.get(2)?;
            let b = *rest.get(3)?;
            Some((Rgba::opaque(clamp8(r), clamp8(g), clamp8(b)), 4))
        }
        _ => None,
    }
}

fn clamp8(value: u16) -> u8 {
    value.min(255) as u8
}

/// First parameter at `index`, falling back to the command's default.
fn param(params: &[u16], index: usize, default: u16) -> usize {
    params.get(index).copied().unwrap_or(default) as usize
}

/// Movement distance: first parameter, 1 when absent. An explicit 0
/// moves by 0.
fn count(params: &[u16]) -> usize {
    param(params, 0, 1)
}

/// OSC payloads look like `0;title` or `2;title`; anything else is dropped.
fn parse_title(payload: &str) -> Option<&str> {
    let (code, rest) = payload.split_once(';')?;
    match code {
        "0" | "2" => Some(rest),
        _ => None,
    }
}
