//! Escape-sequence dispatch: the ESC, CSI, OSC, and DCS states.
//!
//! Ground-state handling lives in `terminal`; this module covers everything
//! between an introducer and its final byte. The failure contract is shared
//! by every arm: unknown finals and parameters are logged and discarded, the
//! state machine returns to ground, and the grid is never corrupted.

use tracing::{debug, warn};

use crate::host::Host;
use crate::modes::Modes;
use crate::style::{FontWeight, Rgb, ansi_color, xterm_256};
use crate::terminal::{ParseState, Terminal};

/// Primary Device Attributes: VT100 with Advanced Video Option.
const DA1_REPLY: &[u8] = b"\x1b[?1;2c";
/// Secondary Device Attributes: VT100, firmware 2.7.6.
const DA2_REPLY: &[u8] = b"\x1b[>0;276;0c";
/// DSR 5: device OK.
const DSR_OK_REPLY: &[u8] = b"\x1b[0n";
/// OSC 10 query: foreground is black.
const OSC_FG_REPLY: &[u8] = b"\x1b]10;rgb:0/0/0\x1b\\";
/// OSC 11 query: background is white. The command number in the reply is
/// literally `10`, preserved as a compatibility contract.
const OSC_BG_REPLY: &[u8] = b"\x1b]10;rgb:f/f/f\x1b\\";

impl Terminal {
    // ── ESC ─────────────────────────────────────────────────────────

    pub(crate) fn escape(&mut self, byte: u8) {
        match byte {
            b'[' => {
                self.seq.clear();
                self.state = ParseState::Csi;
                return;
            }
            b']' => {
                self.seq.clear();
                self.state = ParseState::Osc;
                return;
            }
            b'P' => {
                self.seq.clear();
                self.state = ParseState::Dcs;
                return;
            }
            b'#' | b'(' | b')' => {
                self.seq.push(byte);
                return;
            }
            _ => {}
        }

        self.state = ParseState::Ground;
        let origin = self.origin();
        match (self.seq.as_slice(), byte) {
            // DECALN: fill the viewport with a test pattern.
            (b"#", b'8') => self.grid.fill_all('E'),
            (b"", b'7') => self.grid.save_cursor(self.style),
            (b"", b'8') => self.style = self.grid.restore_cursor(origin),
            (b"", b'A') => self.grid.move_cursor(-1, 0, origin),
            (b"", b'B') => self.grid.move_cursor(1, 0, origin),
            (b"", b'C') => self.grid.move_cursor(0, 1, origin),
            // IND: line feed with scroll, xterm behaviour.
            (b"", b'D') => self.grid.index_down(),
            // NEL: CR + LF combined.
            (b"", b'E') => {
                self.grid.index_down();
                self.grid.set_col(0);
            }
            (b"", b'H') => self.grid.set_tab_stop(),
            (b"", b'M') => self.grid.reverse_index(origin),
            // Keypad application/normal mode: input-side, host concern.
            (b"", b'=') | (b"", b'>') => {}
            (inter, _) if matches!(inter.first(), Some(&b'(') | Some(&b')')) => {
                // Charset designation; only the default charset is supported.
                debug!(final_byte = byte, "charset designation ignored");
            }
            (inter, _) => {
                warn!(
                    intermediates = %String::from_utf8_lossy(inter),
                    final_byte = byte,
                    "unknown escape sequence after ESC"
                );
            }
        }
    }

    // ── CSI ─────────────────────────────────────────────────────────

    pub(crate) fn csi(&mut self, byte: u8, host: &mut dyn Host) {
        match byte {
            // Parameter bytes in [0x30, 0x3F], intermediates in [0x20, 0x2F].
            0x20..=0x3F => self.seq.push(byte),
            0x40..=0x7E => {
                self.state = ParseState::Ground;
                self.dispatch_csi(byte, host);
            }
            _ => {
                warn!(
                    buffer = %String::from_utf8_lossy(&self.seq),
                    byte,
                    "invalid byte inside CSI"
                );
                self.state = ParseState::Ground;
            }
        }
    }

    fn dispatch_csi(&mut self, final_byte: u8, host: &mut dyn Host) {
        let raw = String::from_utf8_lossy(&self.seq).into_owned();
        let (prefix, body) = match raw.as_bytes().first() {
            Some(b'?') => (Some('?'), &raw[1..]),
            Some(b'>') => (Some('>'), &raw[1..]),
            _ => (None, raw.as_str()),
        };
        let params = split_params(body);
        let origin = self.origin();

        match final_byte {
            // ICH: insert blanks at the cursor.
            b'@' if prefix.is_none() => self.grid.insert_blanks(param(&params, 0, 1)),
            // CUU: up, stopping at the top margin when inside the region.
            b'A' if prefix.is_none() => {
                let n = param(&params, 0, 1);
                let (row, _) = self.grid.cursor();
                let (top, _) = self.grid.scroll_region();
                let n = if row >= top { n.min(row - top) } else { n };
                self.grid.move_cursor(-i32::from(n), 0, origin);
            }
            // CUD: down, stopping at the bottom margin when inside the region.
            b'B' if prefix.is_none() => {
                let n = param(&params, 0, 1);
                let (row, _) = self.grid.cursor();
                let (_, bottom) = self.grid.scroll_region();
                let n = if row <= bottom { n.min(bottom - row) } else { n };
                self.grid.move_cursor(i32::from(n), 0, origin);
            }
            // CUF / CUB.
            b'C' if prefix.is_none() => {
                self.grid.move_cursor(0, i32::from(param(&params, 0, 1)), origin);
            }
            b'D' if prefix.is_none() => {
                self.grid.move_cursor(0, -i32::from(param(&params, 0, 1)), origin);
            }
            // CNL / CPL: vertical move plus carriage return.
            b'E' if prefix.is_none() => {
                self.grid.move_cursor(i32::from(param(&params, 0, 1)), 0, origin);
                self.grid.set_col(0);
            }
            b'F' if prefix.is_none() => {
                self.grid.move_cursor(-i32::from(param(&params, 0, 1)), 0, origin);
                self.grid.set_col(0);
            }
            // CHA: absolute column.
            b'G' if prefix.is_none() => {
                self.grid.set_col(param(&params, 0, 1).saturating_sub(1));
            }
            // CUP / HVP.
            b'H' | b'f' if prefix.is_none() => {
                let row = param(&params, 0, 1).saturating_sub(1);
                let col = if params.len() >= 2 {
                    param(&params, 1, 1).saturating_sub(1)
                } else {
                    0
                };
                self.grid.set_cursor(row, col, origin);
            }
            // ED.
            b'J' if prefix.is_none() => match param(&params, 0, 0) {
                0 => self.grid.erase_below(),
                1 => self.grid.erase_above(),
                2 => self.grid.erase_all(),
                mode => warn!(mode, "unknown erase-in-display mode"),
            },
            // EL.
            b'K' if prefix.is_none() => match param(&params, 0, 0) {
                0 => self.grid.erase_line_right(),
                1 => self.grid.erase_line_left(),
                2 => self.grid.erase_line(),
                mode => warn!(mode, "unknown erase-in-line mode"),
            },
            // IL / DL.
            b'L' if prefix.is_none() => self.grid.insert_lines(param(&params, 0, 1)),
            b'M' if prefix.is_none() => self.grid.delete_lines(param(&params, 0, 1)),
            // DCH.
            b'P' if prefix.is_none() => self.grid.delete_chars(param(&params, 0, 1)),
            // SU.
            b'S' if prefix.is_none() => self.grid.scroll_up(param(&params, 0, 1)),
            // ECH.
            b'X' if prefix.is_none() => self.grid.erase_chars(param(&params, 0, 1)),
            // DA1 / DA2, mimicking xterm's replies.
            b'c' if prefix.is_none() && param(&params, 0, 0) == 0 => {
                host.write_to_pty(DA1_REPLY);
            }
            b'c' if prefix == Some('>') && param(&params, 0, 0) == 0 => {
                host.write_to_pty(DA2_REPLY);
            }
            // VPA.
            b'd' if prefix.is_none() => {
                let row = param(&params, 0, 1).saturating_sub(1);
                let (_, col) = self.grid.cursor();
                self.grid.set_cursor(row, col.min(self.grid.cols() - 1), false);
                if origin {
                    self.grid.clamp_cursor(true);
                }
            }
            // TBC.
            b'g' if prefix.is_none() => match param(&params, 0, 0) {
                0 => self.grid.clear_tab_stop(),
                3 => self.grid.clear_all_tab_stops(),
                mode => warn!(mode, "unknown tab-clear mode"),
            },
            // SM / RM and DECSET / DECRST.
            b'h' if prefix.is_none() => self.set_ansi_modes(&params, true),
            b'l' if prefix.is_none() => self.set_ansi_modes(&params, false),
            b'h' if prefix == Some('?') => self.set_dec_modes(&params, true, host),
            b'l' if prefix == Some('?') => self.set_dec_modes(&params, false, host),
            // SGR; `CSI > m` (XTMODKEYS) is accepted and dropped.
            b'm' if prefix.is_none() => self.apply_sgr(&params),
            b'm' if prefix == Some('>') => {}
            // DSR.
            b'n' if prefix.is_none() => match param(&params, 0, 0) {
                5 => host.write_to_pty(DSR_OK_REPLY),
                6 => {
                    let (row, col) = self.grid.cursor();
                    let reply = format!("\x1b[{};{}R", row + 1, col + 1);
                    host.write_to_pty(reply.as_bytes());
                }
                mode => warn!(mode, "unknown device status report"),
            },
            // DECSTBM.
            b'r' if prefix.is_none() => {
                let rows = self.grid.rows();
                let accepted = if body.is_empty() {
                    self.grid.set_scroll_region(0, rows - 1)
                } else if params.len() == 1 {
                    let top = param(&params, 0, 1).saturating_sub(1);
                    self.grid.set_scroll_region(top, rows - 1)
                } else {
                    let top = param(&params, 0, 1).saturating_sub(1);
                    let bottom = param(&params, 1, rows).saturating_sub(1);
                    self.grid.set_scroll_region(top, bottom)
                };
                if accepted {
                    let (top, _) = self.grid.scroll_region();
                    self.grid.set_cursor(top, 0, false);
                }
            }
            _ => {
                warn!(
                    buffer = %raw,
                    final_byte = %(final_byte as char),
                    "unknown escape sequence in CSI"
                );
            }
        }
    }

    fn set_ansi_modes(&mut self, params: &[Option<u16>], enable: bool) {
        for p in params.iter().copied().flatten() {
            match p {
                // IRM.
                4 => self.modes.set(Modes::INSERT, enable),
                mode => warn!(mode, enable, "unknown ANSI mode"),
            }
        }
    }

    fn set_dec_modes(&mut self, params: &[Option<u16>], enable: bool, host: &mut dyn Host) {
        for p in params.iter().copied().flatten() {
            match p {
                // DECCKM: application cursor keys; input-side, host concern.
                1 => {}
                // DECCOLM: 132/80-column switch, resizing grid, PTY, window.
                3 => {
                    let cols = if enable { 132 } else { 80 };
                    let rows = self.grid.rows();
                    self.grid.resize_to(rows, cols);
                    host.pty_resize(rows, cols);
                    host.resize_window_cols(cols);
                }
                // DECSCNM.
                5 => self.modes.set(Modes::REVERSE_VIDEO, enable),
                // DECOM.
                6 => self.modes.set(Modes::ORIGIN, enable),
                // DECAWM.
                7 => self.modes.set(Modes::AUTOWRAP, enable),
                // Blinking cursor.
                12 => self.modes.set(Modes::BLINK_CURSOR, enable),
                // DECTCEM.
                25 => self.modes.set(Modes::SHOW_CURSOR, enable),
                // Mouse reporting and bracketed paste: recognised, no grid
                // effect; input encoding is out of scope.
                1000 | 1002 | 1006 | 2004 => {}
                mode => warn!(mode, enable, "unknown DEC private mode"),
            }
        }
    }

    // ── SGR ─────────────────────────────────────────────────────────

    fn apply_sgr(&mut self, params: &[Option<u16>]) {
        // An empty parameter list means reset; empty items default to 0.
        let list: Vec<u16> = params.iter().map(|p| p.unwrap_or(0)).collect();
        let mut i = 0;
        while i < list.len() {
            match list[i] {
                0 | 10 => self.style.reset(),
                1 => self.style.weight = FontWeight::Bold,
                22 => self.style.weight = FontWeight::Regular,
                5 | 6 => self.style.blink = true,
                25 => self.style.blink = false,
                7 => self.style.set_reversed(true),
                27 => self.style.set_reversed(false),
                // Faint, underline, strikethrough, double underline, and
                // their resets: recognised, no visual effect here.
                2 | 4 | 9 | 21 | 24 => {}
                n @ 30..=37 => self.style.fg = ansi_color((n - 30) as u8),
                n @ 90..=97 => self.style.fg = ansi_color((n - 90 + 8) as u8),
                39 => self.style.reset_fg(),
                n @ 40..=47 => self.style.bg = ansi_color((n - 40) as u8),
                n @ 100..=107 => self.style.bg = ansi_color((n - 100 + 8) as u8),
                49 => self.style.reset_bg(),
                38 => {
                    if let Some(color) = extended_color(&list, &mut i) {
                        self.style.fg = color;
                    }
                }
                48 => {
                    if let Some(color) = extended_color(&list, &mut i) {
                        self.style.bg = color;
                    }
                }
                n => debug!(param = n, "unknown SGR parameter"),
            }
            i += 1;
        }
    }

    // ── OSC ─────────────────────────────────────────────────────────

    pub(crate) fn osc(&mut self, byte: u8, host: &mut dyn Host) {
        match byte {
            // BEL terminator.
            0x07 => {
                self.state = ParseState::Ground;
                self.dispatch_osc(host);
            }
            // ST terminator: this byte is `\` and the previous was ESC.
            b'\\' if self.seq.last() == Some(&0x1b) => {
                self.seq.pop();
                self.state = ParseState::Ground;
                self.dispatch_osc(host);
            }
            0x1b => self.seq.push(byte),
            0x20..=0x7E => self.seq.push(byte),
            _ => {
                warn!(
                    buffer = %String::from_utf8_lossy(&self.seq),
                    byte,
                    "invalid byte inside OSC"
                );
                self.seq.clear();
                self.state = ParseState::Ground;
            }
        }
    }

    fn dispatch_osc(&mut self, host: &mut dyn Host) {
        let data = String::from_utf8_lossy(&self.seq).into_owned();
        self.seq.clear();
        let parts: Vec<&str> = data.split(';').collect();
        match parts.as_slice() {
            // OSC 52: clipboard. `?` asks for a paste; the reply is emitted
            // by the worker once the host's clipboard yields data.
            ["52", "c", "?"] => host.request_paste(),
            ["52", "c", payload] => host.copy(payload),
            // Colour queries; replies mirror the default palette poles.
            ["10", "?"] => host.write_to_pty(OSC_FG_REPLY),
            ["11", "?"] => host.write_to_pty(OSC_BG_REPLY),
            // Titles, hyperlinks, and the rest are accepted and dropped.
            _ => debug!(command = %data, "OSC command ignored"),
        }
    }

    // ── DCS ─────────────────────────────────────────────────────────

    pub(crate) fn dcs(&mut self, byte: u8) {
        match byte {
            b'\\' if self.seq.last() == Some(&0x1b) => {
                self.seq.clear();
                self.state = ParseState::Ground;
            }
            0x1b => self.seq.push(byte),
            0x20..=0x7E => self.seq.push(byte),
            _ => {
                warn!(
                    buffer = %String::from_utf8_lossy(&self.seq),
                    byte,
                    "invalid byte inside DCS"
                );
                self.seq.clear();
                self.state = ParseState::Ground;
            }
        }
    }
}

/// Split a CSI parameter string on `;`. Empty items stay empty so callers
/// can apply per-command defaults; values clamp to `u16`.
fn split_params(body: &str) -> Vec<Option<u16>> {
    body.split(';')
        .map(|p| {
            p.parse::<u32>()
                .ok()
                .map(|v| v.min(u32::from(u16::MAX)) as u16)
        })
        .collect()
}

/// Parameter at `idx`, falling back to `default` when absent or empty.
fn param(params: &[Option<u16>], idx: usize, default: u16) -> u16 {
    params.get(idx).copied().flatten().unwrap_or(default)
}

/// Parse `38;5;N` / `38;2;R;G;B` (and the `48` forms) starting at the
/// introducer index, advancing `i` past the consumed parameters.
fn extended_color(list: &[u16], i: &mut usize) -> Option<Rgb> {
    match list.get(*i + 1) {
        Some(&5) if *i + 2 < list.len() => {
            let index = list[*i + 2].min(255) as u8;
            *i += 2;
            Some(xterm_256(index))
        }
        Some(&2) if *i + 4 < list.len() => {
            let r = list[*i + 2].min(255) as u8;
            let g = list[*i + 3].min(255) as u8;
            let b = list[*i + 4].min(255) as u8;
            *i += 4;
            Some(Rgb::new(r, g, b))
        }
        _ => {
            debug!("malformed extended colour in SGR");
            // The remaining parameters belong to the broken introducer;
            // consume them rather than misread them as attributes.
            *i = list.len();
            None
        }
    }
}
