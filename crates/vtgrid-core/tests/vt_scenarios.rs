//! End-to-end scenarios driving the full engine through byte streams,
//! plus recorded traces checked cell-by-cell against expected screens.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use vtgrid_core::{ANSI_PALETTE, Host, Modes, NullHost, ParseState, Style, Terminal, xterm_256};

/// Collects reply bytes and clipboard traffic.
#[derive(Debug, Default)]
struct ScriptedHost {
    written: Vec<u8>,
    copied: Vec<String>,
    paste_requests: usize,
}

impl Host for ScriptedHost {
    fn write_to_pty(&mut self, bytes: &[u8]) {
        self.written.extend_from_slice(bytes);
    }
    fn copy(&mut self, base64: &str) {
        self.copied.push(base64.to_string());
    }
    fn request_paste(&mut self) {
        self.paste_requests += 1;
    }
}

fn feed(term: &mut Terminal, bytes: &[u8]) {
    term.feed(bytes, &mut NullHost);
}

fn screen(term: &Terminal) -> Vec<String> {
    (0..term.grid().rows())
        .map(|r| {
            term.grid()
                .row_cells(r)
                .unwrap()
                .iter()
                .map(|c| c.ch)
                .collect()
        })
        .collect()
}

fn assert_invariants(term: &Terminal) {
    let grid = term.grid();
    let (row, col) = grid.cursor();
    assert!(row < grid.rows());
    assert!(col <= grid.cols());
    let (top, bottom) = grid.scroll_region();
    assert!(top < bottom || grid.rows() == 1);
    assert!(bottom <= grid.rows() - 1);
    assert!(grid.history_len() <= 5000);
    for r in 0..grid.rows() {
        assert_eq!(grid.row_cells(r).unwrap().len(), usize::from(grid.cols()));
    }
}

// ── The eight reference scenarios ───────────────────────────────────

#[test]
fn scenario_simple_write() {
    let mut term = Terminal::new(24, 80);
    feed(&mut term, b"a");
    assert_eq!(term.grid().cursor(), (0, 1));
    assert_eq!(term.grid().cell(0, 0).unwrap().ch, 'a');
}

#[test]
fn scenario_cr_lf() {
    let mut term = Terminal::new(2, 80);
    feed(&mut term, b"a\r\n");
    assert_eq!(term.grid().cursor(), (1, 0));
    assert_eq!(term.grid().cell(0, 0).unwrap().ch, 'a');
}

#[test]
fn scenario_tab_advance() {
    let mut term = Terminal::new(24, 80);
    feed(&mut term, b"a\t");
    assert_eq!(term.grid().cursor(), (0, 8));
}

#[test]
fn scenario_ich_insert() {
    let mut term = Terminal::new(24, 80);
    feed(&mut term, b"a\r\x1b[2@");
    assert_eq!(term.grid().cell(0, 0).unwrap().ch, ' ');
    assert_eq!(term.grid().cell(0, 1).unwrap().ch, ' ');
    assert_eq!(term.grid().cell(0, 2).unwrap().ch, 'a');
    assert_eq!(term.grid().cursor(), (0, 0));
}

#[test]
fn scenario_cursor_up_respects_scroll_region() {
    let mut term = Terminal::new(24, 80);
    feed(&mut term, b"b\r\x1b[2;3r");
    assert_eq!(term.grid().scroll_region(), (1, 2));
    assert_eq!(term.grid().cursor(), (1, 0));
    feed(&mut term, b"\r\x1b[A");
    assert_eq!(term.grid().cursor(), (1, 0));
}

#[test]
fn scenario_decaln() {
    let mut term = Terminal::new(2, 3);
    feed(&mut term, b"\x1b#8");
    for r in 0..2 {
        for c in 0..3 {
            assert_eq!(term.grid().cell(r, c).unwrap().ch, 'E');
        }
    }
}

#[test]
fn scenario_primary_da_reply() {
    let mut term = Terminal::new(24, 80);
    let mut host = ScriptedHost::default();
    term.feed(b"\x1b[c", &mut host);
    assert_eq!(host.written, vec![0x1b, 0x5b, 0x3f, 0x31, 0x3b, 0x32, 0x63]);
}

#[test]
fn scenario_el_then_rewrite() {
    let mut term = Terminal::new(24, 80);
    feed(&mut term, b"ab\x08\x1b[K");
    assert_eq!(term.grid().cell(0, 0).unwrap().ch, 'a');
    assert_eq!(term.grid().cell(0, 1).unwrap().ch, ' ');
    assert_eq!(term.grid().cursor(), (0, 1));
}

// ── Property laws ───────────────────────────────────────────────────

#[test]
fn law_sgr_reset_is_idempotent() {
    let mut term = Terminal::new(4, 4);
    feed(&mut term, b"\x1b[1;5;38;5;99;48;2;9;8;7m");
    feed(&mut term, b"\x1b[0m");
    let once = term.style();
    feed(&mut term, b"\x1b[0m");
    assert_eq!(term.style(), once);
}

#[test]
fn law_inverse_round_trip_restores_style() {
    let mut term = Terminal::new(4, 4);
    feed(&mut term, b"\x1b[1;33;44;5m");
    let prior = term.style();
    feed(&mut term, b"\x1b[7m\x1b[27m");
    assert_eq!(term.style(), prior);
}

#[test]
fn law_wrap_invariance_with_autowrap_off() {
    let mut term = Terminal::new(4, 10);
    feed(&mut term, b"\x1b[?7l\x1b[1;8H");
    // Writing 5 characters starting at col 7 overflows the margin.
    feed(&mut term, b"vwxyz");
    assert_eq!(term.grid().cell(0, 9).unwrap().ch, 'z');
    assert_eq!(term.grid().cursor(), (0, 10));
    assert_eq!(term.grid().cell(1, 0).unwrap().ch, ' ');
}

#[test]
fn law_erase_leaves_default_cells() {
    let mut term = Terminal::new(3, 5);
    feed(&mut term, b"\x1b[31;44;1mXXXXX\r\nYYYYY\r\nZZZZZ");
    feed(&mut term, b"\x1b[H\x1b[2J");
    let blank = Style::default();
    for r in 0..3 {
        for c in 0..5 {
            let cell = term.grid().cell(r, c).unwrap();
            assert_eq!(cell.ch, ' ');
            assert_eq!(cell.style, blank);
        }
    }
}

#[test]
fn law_retired_rows_reach_scrollback_tail() {
    let mut term = Terminal::new(2, 3);
    feed(&mut term, b"one\r\ntwo\r\nxyz");
    // "one" scrolled out when "xyz" arrived on the bottom row.
    assert_eq!(term.grid().history_len(), 1);
    let retired: String = term
        .grid()
        .scrollback()
        .get(0)
        .unwrap()
        .iter()
        .map(|c| c.ch)
        .collect();
    assert_eq!(retired, "one");
}

#[test]
fn law_scrollback_respects_cap() {
    let mut term = Terminal::new(2, 2);
    term.set_scrollback_capacity(16);
    for _ in 0..200 {
        feed(&mut term, b"ab\r\n");
    }
    assert!(term.grid().history_len() <= 16);
    assert_invariants(&term);
}

#[test]
fn invariants_hold_across_mixed_stream() {
    let mut term = Terminal::new(6, 12);
    let chunks: [&[u8]; 8] = [
        b"hello world this wraps around the margin",
        b"\x1b[2;5r\x1b[?6h\x1b[Hinside",
        b"\x1b[?6l\x1b[3;3H\x1b[2L\x1b[M",
        b"\x1b[38;5;100mcolour\x1b[0m\x1b[2J\x1b[H",
        "UTF-8: é中😀".as_bytes(),
        b"\x1b[?7l-------------\x1b[?7h",
        b"\x1b]52;c;aGVsbG8=\x07\x1bP ignored \x1b\\",
        b"\x1b[9999;9999H\x1b[6n\x1b[r",
    ];
    for chunk in chunks {
        feed(&mut term, chunk);
        assert_invariants(&term);
        assert_eq!(term.state(), ParseState::Ground);
    }
}

// ── Recorded traces, checked cell-by-cell ───────────────────────────

#[test]
fn trace_sgr_styling_run() {
    let mut term = Terminal::new(4, 20);
    feed(
        &mut term,
        b"\x1b[1;31mred\x1b[0m \x1b[38;5;196midx\x1b[0m \x1b[4munder\x1b[24m",
    );
    let row = screen(&term)[0].clone();
    assert_eq!(&row[..3], "red");
    assert_eq!(term.grid().cell(0, 0).unwrap().style.fg, ANSI_PALETTE[1]);
    assert_eq!(term.grid().cell(0, 4).unwrap().style.fg, xterm_256(196));
    // SGR 4 is recognised with no visual effect; the glyphs still land.
    assert_eq!(&row[8..13], "under");
    assert_eq!(term.grid().cell(0, 8).unwrap().style, Style::default());
}

#[test]
fn trace_full_screen_repaint() {
    let mut term = Terminal::new(3, 10);
    feed(&mut term, b"garbage everywhere");
    feed(&mut term, b"\x1b[2J\x1b[H\x1b[1;1Htop\x1b[2;1Hmid\x1b[3;1Hbot");
    assert_eq!(
        screen(&term),
        vec![
            "top       ".to_string(),
            "mid       ".to_string(),
            "bot       ".to_string(),
        ]
    );
}

#[test]
fn trace_insert_delete_lines_inside_region() {
    let mut term = Terminal::new(5, 3);
    feed(&mut term, b"aaa\r\nbbb\r\nccc\r\nddd\r\neee");
    feed(&mut term, b"\x1b[2;4r\x1b[2;1H\x1b[L");
    assert_eq!(
        screen(&term),
        vec![
            "aaa".to_string(),
            "   ".to_string(),
            "bbb".to_string(),
            "ccc".to_string(),
            "eee".to_string(),
        ]
    );
    feed(&mut term, b"\x1b[2M");
    assert_eq!(
        screen(&term),
        vec![
            "aaa".to_string(),
            "ccc".to_string(),
            "   ".to_string(),
            "   ".to_string(),
            "eee".to_string(),
        ]
    );
}

#[test]
fn trace_scroll_region_preserves_outer_rows_and_history() {
    let mut term = Terminal::new(4, 3);
    feed(&mut term, b"hdr\r\naaa\r\nbbb\r\nftr");
    feed(&mut term, b"\x1b[2;3r\x1b[3;1H\nccc");
    // "aaa" retired into history; header and footer untouched.
    assert_eq!(term.grid().history_len(), 1);
    assert_eq!(
        screen(&term),
        vec![
            "hdr".to_string(),
            "bbb".to_string(),
            "ccc".to_string(),
            "ftr".to_string(),
        ]
    );
}

#[test]
fn trace_origin_mode_placements() {
    let mut term = Terminal::new(6, 6);
    feed(&mut term, b"\x1b[3;5r\x1b[?6h\x1b[Ha\x1b[2;2Hb\x1b[9;9Hc");
    // Home lands on the region top; addressing is region-relative and
    // clamps to the region bottom.
    assert_eq!(term.grid().cell(2, 0).unwrap().ch, 'a');
    assert_eq!(term.grid().cell(3, 1).unwrap().ch, 'b');
    assert_eq!(term.grid().cell(4, 5).unwrap().ch, 'c');
}

#[test]
fn trace_tab_stop_set_and_clear() {
    let mut term = Terminal::new(2, 32);
    feed(&mut term, b"\x1b[3g");
    feed(&mut term, b"\x1b[5G\x1bH\x1b[12G\x1bH\r");
    feed(&mut term, b"\tA\tB\tC");
    assert_eq!(term.grid().cell(0, 4).unwrap().ch, 'A');
    assert_eq!(term.grid().cell(0, 11).unwrap().ch, 'B');
    // Past the last stop the tab parks at the final column.
    assert_eq!(term.grid().cell(0, 31).unwrap().ch, 'C');
    assert_eq!(term.grid().cursor(), (0, 32));
}

#[test]
fn trace_hyperlink_osc_is_transparent() {
    let mut term = Terminal::new(2, 20);
    feed(
        &mut term,
        b"\x1b]8;;https://example.net\x1b\\click\x1b]8;;\x1b\\ here",
    );
    assert_eq!(&screen(&term)[0][..10], "click here");
}

#[test]
fn trace_utf8_and_wide_cells() {
    let mut term = Terminal::new(2, 8);
    feed(&mut term, "ab中c".as_bytes());
    assert_eq!(term.grid().cell(0, 0).unwrap().ch, 'a');
    assert_eq!(term.grid().cell(0, 2).unwrap().ch, '中');
    assert!(term.grid().cell(0, 3).unwrap().is_wide_stub());
    assert_eq!(term.grid().cell(0, 4).unwrap().ch, 'c');
    assert_eq!(term.grid().cursor(), (0, 5));
}

#[test]
fn trace_deferred_wrap_against_reference() {
    let mut term = Terminal::new(3, 4);
    // CR after resting at the margin must return to column 0 of the same
    // row; only a printable triggers the wrap.
    feed(&mut term, b"wxyz\rA");
    assert_eq!(screen(&term)[0], "Axyz");
    assert_eq!(term.grid().cursor(), (0, 1));
}

// ── Clipboard and reply streams ─────────────────────────────────────

#[test]
fn osc52_round_trip_with_real_base64() {
    let payload = STANDARD.encode("copied text");
    let mut term = Terminal::new(4, 20);
    let mut host = ScriptedHost::default();
    let mut stream = Vec::new();
    stream.extend_from_slice(b"\x1b]52;c;");
    stream.extend_from_slice(payload.as_bytes());
    stream.push(0x07);
    term.feed(&stream, &mut host);
    assert_eq!(host.copied, vec![payload.clone()]);
    assert_eq!(
        STANDARD.decode(&host.copied[0]).unwrap(),
        b"copied text".to_vec()
    );

    term.feed(b"\x1b]52;c;?\x07", &mut host);
    assert_eq!(host.paste_requests, 1);
}

#[test]
fn reply_bytes_are_exact_per_wire_contract() {
    let mut term = Terminal::new(24, 80);
    let mut host = ScriptedHost::default();
    term.feed(b"\x1b[>c", &mut host);
    assert_eq!(
        host.written,
        vec![0x1b, 0x5b, 0x3e, 0x30, 0x3b, 0x32, 0x37, 0x36, 0x3b, 0x30, 0x63]
    );

    let mut host = ScriptedHost::default();
    term.feed(b"\x1b[5n", &mut host);
    assert_eq!(host.written, vec![0x1b, 0x5b, 0x30, 0x6e]);

    let mut host = ScriptedHost::default();
    term.feed(b"\x1b]10;?\x1b\\", &mut host);
    assert_eq!(
        host.written,
        vec![
            0x1b, 0x5d, 0x31, 0x30, 0x3b, 0x72, 0x67, 0x62, 0x3a, 0x30, 0x2f, 0x30, 0x2f, 0x30,
            0x1b, 0x5c
        ]
    );
}

#[test]
fn parser_and_decoder_states_stay_in_range() {
    let mut term = Terminal::new(4, 4);
    feed(&mut term, &[0x1b, b'[', b'1', 0xE4]);
    // A control aborts the CSI; the stray lead byte is then consumed as
    // printable-stream input.
    assert!(matches!(
        term.state(),
        ParseState::Ground | ParseState::Csi
    ));
    feed(&mut term, &[0xB8, 0xAD]);
    assert_eq!(term.state(), ParseState::Ground);
    assert!(term.modes().contains(Modes::AUTOWRAP));
}
