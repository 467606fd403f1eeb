//! Escape sequence tokenizer
//!
//! Classifies the decoded character stream into printable literals, C0
//! controls and ESC-introduced sequences. The scanner is re-entrant: a
//! sequence split across chunk boundaries is carried in scanner state and
//! resumed on the next call, never emitted as literal text.

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// A printable character.
    Literal(char),
    /// One of `\r`, `\n`, backspace or `\t`.
    Control(char),
    /// `ESC [ params final`. Params are `;`-separated; non-numeric items
    /// (private-mode markers like `?25`) are dropped.
    Csi { params: Vec<u16>, final_byte: char },
    /// `ESC ] payload (BEL | ESC \)`.
    Osc(String),
    /// A recognized sequence with no screen effect: charset selects, the
    /// fixed single-byte ESC commands, DCS/SOS/PM/APC strings.
    Ignored,
}

#[derive(Debug, Default)]
enum State {
    #[default]
    Ground,
    Escape,
    Csi(String),
    Osc {
        payload: String,
        esc: bool,
    },
    /// DCS/SOS/PM/APC, swallowed up to the string terminator.
    Swallow {
        esc: bool,
    },
    /// `ESC (` / `ESC )`; one designator character follows.
    Charset,
}

#[derive(Debug, Default)]
pub struct Scanner {
    state: State,
}

impl Scanner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Tokenize `text`, appending to `out`. An incomplete trailing sequence
    /// stays pending until the next call.
    pub fn scan(&mut self, text: &str, out: &mut Vec<Token>) {
        for ch in text.chars() {
            self.step(ch, out);
        }
    }

    fn step(&mut self, ch: char, out: &mut Vec<Token>) {
        match std::mem::take(&mut self.state) {
            State::Ground => match ch {
                '\x1b' => self.state = State::Escape,
                '\r' | '\n' | '\x08' | '\t' => out.push(Token::Control(ch)),
                // BEL and the remaining C0 controls are consumed silently.
                c if (c as u32) < 0x20 || c == '\x7f' => {}
                c => out.push(Token::Literal(c)),
            },
            State::Escape => match ch {
                '[' => self.state = State::Csi(String::new()),
                ']' => {
                    self.state = State::Osc {
                        payload: String::new(),
                        esc: false,
                    }
                }
                '(' | ')' => self.state = State::Charset,
                'P' | 'X' | '^' | '_' => self.state = State::Swallow { esc: false },
                '\x1b' => {
                    out.push(Token::Ignored);
                    self.state = State::Escape;
                }
                // `= > M 7 8 N O H D E` and anything else single-byte.
                _ => out.push(Token::Ignored),
            },
            State::Csi(mut params) => {
                if ch.is_ascii_digit() || ch == ';' || ch == '?' {
                    params.push(ch);
                    self.state = State::Csi(params);
                } else if ch.is_ascii_alphabetic() || ch == '@' {
                    out.push(Token::Csi {
                        params: parse_params(&params),
                        final_byte: ch,
                    });
                } else {
                    // Any other byte aborts the sequence and is handled
                    // again from ground state, so an ESC here opens the
                    // next sequence instead of printing as text.
                    out.push(Token::Ignored);
                    self.step(ch, out);
                }
            }
            State::Osc { mut payload, esc } => {
                if esc {
                    if ch == '\\' {
                        out.push(Token::Osc(payload));
                    } else {
                        // ESC inside the payload that is not ST: abandon the
                        // OSC, the ESC starts a new sequence.
                        out.push(Token::Ignored);
                        self.state = State::Escape;
                        self.step(ch, out);
                    }
                } else if ch == '\x07' {
                    out.push(Token::Osc(payload));
                } else if ch == '\x1b' {
                    self.state = State::Osc { payload, esc: true };
                } else {
                    payload.push(ch);
                    self.state = State::Osc {
                        payload,
                        esc: false,
                    };
                }
            }
            State::Swallow { esc } => {
                if (esc && ch == '\\') || ch == '\x07' {
                    out.push(Token::Ignored);
                } else {
                    self.state = State::Swallow { esc: ch == '\x1b' };
                }
            }
            State::Charset => out.push(Token::Ignored),
        }
    }
}

fn parse_params(raw: &str) -> Vec<u16> {
    raw.split(';').filter_map(|p| p.parse().ok()).collect()
}
