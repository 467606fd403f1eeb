use aura_terminal::Terminal;
use pretty_assertions::assert_eq;

fn row_text(row: &[aura_terminal::Cell]) -> String {
    row.iter().map(|c| c.ch).collect::<String>().trim_end().to_string()
}

#[test]
fn overflow_moves_oldest_rows_to_scrollback_in_order() {
    let mut term = Terminal::new(8, 3);
    term.process(b"one\r\ntwo\r\nthree\r\nfour\r\nfive");

    let scrollback = term.scrollback_contents();
    assert_eq!(scrollback.len(), 2);
    assert_eq!(row_text(&scrollback[0]), "one");
    assert_eq!(row_text(&scrollback[1]), "two");
    assert_eq!(term.all_text(), "three\nfour\nfive");
    assert_eq!(term.cursor_position(), (2, 4));
}

#[test]
fn scrollback_capacity_evicts_oldest_first() {
    let mut term = Terminal::with_scrollback_capacity(4, 2, 3);
    for i in 0..8 {
        term.process(format!("l{i}\r\n").as_bytes());
    }

    let scrollback = term.scrollback_contents();
    assert_eq!(scrollback.len(), 3);
    // Rows l0..l3 scrolled off and were evicted; the newest three survive.
    assert_eq!(row_text(&scrollback[0]), "l4");
    assert_eq!(row_text(&scrollback[1]), "l5");
    assert_eq!(row_text(&scrollback[2]), "l6");
}

#[test]
fn resize_smaller_preserves_top_left_and_clamps_cursor() {
    let mut term = Terminal::new(10, 4);
    term.process(b"abcdef\r\nghijkl\r\nmnopqr");
    assert_eq!(term.cursor_position(), (2, 6));

    term.resize(4, 2).expect("resize");
    assert_eq!(term.dimensions(), (4, 2));
    assert_eq!(term.all_text(), "abcd\nghij");
    let (row, col) = term.cursor_position();
    assert!(row < 2 && col < 4);
}

#[test]
fn resize_larger_pads_with_blank_cells() {
    let mut term = Terminal::new(3, 2);
    term.process(b"ab");
    term.resize(6, 3).expect("resize");
    assert_eq!(term.dimensions(), (6, 3));
    assert_eq!(term.all_text(), "ab");
    assert_eq!(term.screen().cell_at(2, 5).unwrap().ch, ' ');
}

#[test]
fn resize_rejects_zero_dimensions() {
    let mut term = Terminal::new(4, 2);
    assert!(term.resize(0, 2).is_err());
    assert!(term.resize(4, 0).is_err());
    // Failed resize leaves the grid untouched.
    assert_eq!(term.dimensions(), (4, 2));
}

#[test]
fn resize_preserves_scrollback() {
    let mut term = Terminal::new(4, 2);
    term.process(b"a\r\nb\r\nc\r\nd");
    let before = term.scrollback_contents().len();
    assert!(before > 0);
    term.resize(8, 4).expect("resize");
    assert_eq!(term.scrollback_contents().len(), before);
}

#[test]
fn clear_wipes_grid_but_not_scrollback() {
    let mut term = Terminal::new(4, 2);
    term.process(b"a\r\nb\r\nc");
    let scrollback = term.scrollback_contents().len();
    assert!(scrollback > 0);

    term.clear();
    assert_eq!(term.all_text(), "");
    assert_eq!(term.cursor_position(), (0, 0));
    assert_eq!(term.scrollback_contents().len(), scrollback);
}

#[test]
fn getters_for_text_ranges() {
    let mut term = Terminal::new(6, 3);
    term.process(b"hello\r\nworld");

    assert_eq!(term.text_range(0, 0, 1, 4), "hello\nworld");
    // Reversed endpoints normalize to the same span.
    assert_eq!(term.text_range(1, 4, 0, 0), "hello\nworld");
    assert_eq!(term.text_range(0, 1, 0, 3), "ell");
    assert_eq!(term.all_text(), "hello\nworld");
}
