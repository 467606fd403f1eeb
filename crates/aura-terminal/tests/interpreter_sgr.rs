use aura_terminal::{indexed_color, Rgba, Terminal, ANSI_COLORS, DEFAULT_BACKGROUND, DEFAULT_FOREGROUND};
use pretty_assertions::assert_eq;

#[test]
fn sgr_zero_resets_everything() {
    let mut term = Terminal::new(10, 2);
    term.process(b"\x1b[31;1mX\x1b[0mY");

    let x = *term.screen().cell_at(0, 0).unwrap();
    assert_eq!(x.ch, 'X');
    assert_eq!(x.fg, ANSI_COLORS[1]);
    assert!(x.bold);

    let y = *term.screen().cell_at(0, 1).unwrap();
    assert_eq!(y.ch, 'Y');
    assert_eq!(y.fg, DEFAULT_FOREGROUND);
    assert_eq!(y.bg, DEFAULT_BACKGROUND);
    assert!(!y.bold);
}

#[test]
fn truncated_csi_does_not_leak_into_the_next_sequence() {
    let mut term = Terminal::new(10, 2);
    term.process(b"\x1b[1\x1b[31mX");

    let x = *term.screen().cell_at(0, 0).unwrap();
    assert_eq!(x.ch, 'X');
    assert_eq!(x.fg, ANSI_COLORS[1]);
    assert_eq!(term.text_range(0, 0, 0, 9), "X");
}

#[test]
fn standard_and_bright_colors() {
    let mut term = Terminal::new(10, 2);
    term.process(b"\x1b[32ma\x1b[95mb\x1b[44mc");

    assert_eq!(term.screen().cell_at(0, 0).unwrap().fg, ANSI_COLORS[2]);
    assert_eq!(term.screen().cell_at(0, 1).unwrap().fg, ANSI_COLORS[13]);
    let c = term.screen().cell_at(0, 2).unwrap();
    assert_eq!(c.bg, ANSI_COLORS[4]);
    // Foreground carries over from the previous code.
    assert_eq!(c.fg, ANSI_COLORS[13]);
}

#[test]
fn bright_background_range() {
    let mut term = Terminal::new(10, 2);
    term.process(b"\x1b[101mx");
    assert_eq!(term.screen().cell_at(0, 0).unwrap().bg, ANSI_COLORS[9]);
}

#[test]
fn default_color_codes_restore_defaults() {
    let mut term = Terminal::new(10, 2);
    term.process(b"\x1b[31;41ma\x1b[39;49mb");
    let b = term.screen().cell_at(0, 1).unwrap();
    assert_eq!(b.fg, DEFAULT_FOREGROUND);
    assert_eq!(b.bg, DEFAULT_BACKGROUND);
}

#[test]
fn bold_set_and_cleared() {
    let mut term = Terminal::new(10, 2);
    term.process(b"\x1b[1ma\x1b[22mb");
    assert!(term.screen().cell_at(0, 0).unwrap().bold);
    assert!(!term.screen().cell_at(0, 1).unwrap().bold);
}

#[test]
fn palette_256_cube_and_grayscale() {
    let mut term = Terminal::new(10, 2);
    term.process(b"\x1b[38;5;196ma\x1b[48;5;240mb\x1b[38;5;10mc");

    assert_eq!(term.screen().cell_at(0, 0).unwrap().fg, Rgba::opaque(255, 0, 0));
    assert_eq!(
        term.screen().cell_at(0, 1).unwrap().bg,
        indexed_color(240)
    );
    assert_eq!(term.screen().cell_at(0, 2).unwrap().fg, ANSI_COLORS[10]);
}

#[test]
fn truecolor_foreground_and_background() {
    let mut term = Terminal::new(10, 2);
    term.process(b"\x1b[38;2;12;34;56ma\x1b[48;2;200;100;50mb");

    assert_eq!(
        term.screen().cell_at(0, 0).unwrap().fg,
        Rgba::opaque(12, 34, 56)
    );
    assert_eq!(
        term.screen().cell_at(0, 1).unwrap().bg,
        Rgba::opaque(200, 100, 50)
    );
}

#[test]
fn multiple_codes_apply_left_to_right() {
    let mut term = Terminal::new(10, 2);
    // The trailing 0 undoes everything set before it.
    term.process(b"\x1b[1;31;44;0mx");
    let x = term.screen().cell_at(0, 0).unwrap();
    assert_eq!(x.fg, DEFAULT_FOREGROUND);
    assert_eq!(x.bg, DEFAULT_BACKGROUND);
    assert!(!x.bold);
}

#[test]
fn malformed_extended_color_skips_gracefully() {
    let mut term = Terminal::new(10, 2);
    // 38 with no selector, 38;5 with no index, then a valid red.
    term.process(b"\x1b[38ma\x1b[38;5mb\x1b[31mc");
    assert_eq!(term.screen().cell_at(0, 0).unwrap().fg, DEFAULT_FOREGROUND);
    assert_eq!(term.screen().cell_at(0, 1).unwrap().fg, DEFAULT_FOREGROUND);
    assert_eq!(term.screen().cell_at(0, 2).unwrap().fg, ANSI_COLORS[1]);
}

#[test]
fn unknown_sgr_codes_are_ignored() {
    let mut term = Terminal::new(10, 2);
    term.process(b"\x1b[31m\x1b[4m\x1b[73mx");
    assert_eq!(term.screen().cell_at(0, 0).unwrap().fg, ANSI_COLORS[1]);
}

#[test]
fn empty_sgr_resets() {
    let mut term = Terminal::new(10, 2);
    term.process(b"\x1b[31;1ma\x1b[mb");
    let b = term.screen().cell_at(0, 1).unwrap();
    assert_eq!(b.fg, DEFAULT_FOREGROUND);
    assert!(!b.bold);
}
