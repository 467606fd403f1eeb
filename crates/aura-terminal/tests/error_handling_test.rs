//! The pipeline must never panic or corrupt state on hostile input:
//! malformed escapes default or get dropped, malformed bytes become U+FFFD.

use aura_terminal::{ScreenBuffer, Terminal, VtInterpreter, DEFAULT_FOREGROUND};

#[test]
fn screen_out_of_bounds_access() {
    let screen = ScreenBuffer::new(80, 24);

    assert!(screen.cell_at(24, 0).is_none());
    assert!(screen.cell_at(0, 80).is_none());
    assert!(screen.cell_at(usize::MAX, usize::MAX).is_none());
}

#[test]
fn incomplete_escape_sequences_do_not_panic() {
    let incomplete: &[&[u8]] = &[
        b"\x1b",
        b"\x1b[",
        b"\x1b[3",
        b"\x1b[38;5",
        b"\x1b[38;5;",
        b"\x1b]",
        b"\x1b]0",
        b"\x1b]0;half a title",
        b"\x1b(",
        b"\x1bP",
    ];

    for bytes in incomplete {
        let mut term = Terminal::new(80, 24);
        term.process(bytes);
        // The dangling sequence stays pending; no literal text appears.
        assert_eq!(term.all_text(), "");
    }
}

#[test]
fn invalid_escape_sequences_are_recovered() {
    let invalid: &[&[u8]] = &[
        b"\x1b[999999999999999999m", // parameter overflow
        b"\x1b[38;5;999m",           // palette index out of range
        b"\x1b[38;2;999;999;999m",   // RGB components out of range
        b"\x1b[;;;;;m",              // empty parameters
        b"\x1b[\x00m",               // control byte inside CSI
        b"\x1b[38;5m",               // missing color value
    ];

    for bytes in invalid {
        let mut term = Terminal::new(80, 24);
        term.process(bytes);
        term.process(b"ok");
        assert!(term.all_text().contains("ok"), "survived {bytes:?}");
    }
}

#[test]
fn interpreter_defaults_unparsable_parameters() {
    let mut screen = ScreenBuffer::new(10, 5);
    let mut vt = VtInterpreter::new();

    // '?25' is dropped from the parameter list; 'h' is then ignored.
    vt.process(&mut screen, b"\x1b[?25h");
    // Movement with a garbage parameter moves by the default of 1.
    vt.process(&mut screen, b"\x1b[2;2H\x1b[?A");
    assert_eq!((screen.cursor_row(), screen.cursor_col()), (0, 1));
}

#[test]
fn malformed_utf8_is_replaced_not_fatal() {
    let mut term = Terminal::new(20, 2);
    term.process(b"a\x80b\xC3(\xFFc");

    let text = term.all_text();
    assert!(text.starts_with('a'));
    assert!(text.contains('b'));
    assert!(text.contains('c'));
    assert!(text.contains('\u{FFFD}'));
}

#[test]
fn pen_state_survives_garbage() {
    let mut term = Terminal::new(20, 2);
    term.process(b"\x1b[31m\x1b[zzz\x1b[98mx");
    // Unknown codes leave the last valid color in place.
    assert_ne!(term.screen().cell_at(0, 0).unwrap().fg, DEFAULT_FOREGROUND);
}
