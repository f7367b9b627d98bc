//! Strict UTF-8 decoding as a byte-at-a-time state machine.
//!
//! The decoder accepts only the well-formed subset: overlong encodings are
//! rejected by splitting the 3- and 4-byte paths on their first continuation
//! byte (E0 expects A0..=BF, F0 expects 90..=BF), plane overflow by the F4
//! path (80..=8F), and C0/C1/F5..=FF never start a sequence. Malformed input
//! is dropped silently; the terminal is lossless only for well-formed bytes.

/// Decoder state: which byte of which sequence shape is expected next.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Utf8State {
    #[default]
    Initial,
    /// 2nd byte of a 2-byte sequence.
    B2Of2,
    /// 2nd byte of a 3-byte sequence led by 0xE0 (continuation A0..=BF).
    B2Of3E0,
    /// 2nd byte of a 3-byte sequence led by 0xE1..=0xEF.
    B2Of3,
    /// 3rd byte of a 3-byte sequence.
    B3Of3,
    /// 2nd byte of a 4-byte sequence led by 0xF0 (continuation 90..=BF).
    B2Of4F0,
    /// 2nd byte of a 4-byte sequence led by 0xF1..=0xF3.
    B2Of4,
    /// 2nd byte of a 4-byte sequence led by 0xF4 (continuation 80..=8F).
    B2Of4F4,
    /// 3rd byte of a 4-byte sequence.
    B3Of4,
    /// 4th byte of a 4-byte sequence.
    B4Of4,
}

/// Incremental UTF-8 decoder.
#[derive(Debug, Clone, Default)]
pub struct Utf8Decoder {
    state: Utf8State,
    codepoint: u32,
}

impl Utf8Decoder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current state, for invariant checks.
    #[must_use]
    pub fn state(&self) -> Utf8State {
        self.state
    }

    /// Whether a multi-byte sequence is in flight.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.state != Utf8State::Initial
    }

    /// Feed one byte; yields a scalar when a sequence completes.
    ///
    /// In `Initial`, printable ASCII (0x20..=0x7E) yields immediately and
    /// lead bytes 0xC2..=0xF4 arm the matching continuation state. Invalid
    /// lead bytes, invalid continuations, and surrogate codepoints are
    /// swallowed: the state resets and nothing is emitted.
    pub fn feed(&mut self, byte: u8) -> Option<char> {
        match self.state {
            Utf8State::Initial => match byte {
                0x20..=0x7E => Some(byte as char),
                0xC2..=0xDF => {
                    self.state = Utf8State::B2Of2;
                    self.codepoint = u32::from(byte & 0x1F) << 6;
                    None
                }
                0xE0 => {
                    self.state = Utf8State::B2Of3E0;
                    self.codepoint = u32::from(byte & 0x0F) << 12;
                    None
                }
                0xE1..=0xEF => {
                    self.state = Utf8State::B2Of3;
                    self.codepoint = u32::from(byte & 0x0F) << 12;
                    None
                }
                0xF0 => {
                    self.state = Utf8State::B2Of4F0;
                    self.codepoint = u32::from(byte & 0x07) << 18;
                    None
                }
                0xF1..=0xF3 => {
                    self.state = Utf8State::B2Of4;
                    self.codepoint = u32::from(byte & 0x07) << 18;
                    None
                }
                0xF4 => {
                    self.state = Utf8State::B2Of4F4;
                    self.codepoint = u32::from(byte & 0x07) << 18;
                    None
                }
                _ => None,
            },
            Utf8State::B2Of2 => {
                self.state = Utf8State::Initial;
                if (0x80..=0xBF).contains(&byte) {
                    char::from_u32(self.codepoint | u32::from(byte & 0x3F))
                } else {
                    None
                }
            }
            Utf8State::B2Of3E0 => self.continue_mid(byte, 0xA0..=0xBF, 6, Utf8State::B3Of3),
            Utf8State::B2Of3 => self.continue_mid(byte, 0x80..=0xBF, 6, Utf8State::B3Of3),
            Utf8State::B3Of3 => self.finish(byte),
            Utf8State::B2Of4F0 => self.continue_mid(byte, 0x90..=0xBF, 12, Utf8State::B3Of4),
            Utf8State::B2Of4 => self.continue_mid(byte, 0x80..=0xBF, 12, Utf8State::B3Of4),
            Utf8State::B2Of4F4 => self.continue_mid(byte, 0x80..=0x8F, 12, Utf8State::B3Of4),
            Utf8State::B3Of4 => self.continue_mid(byte, 0x80..=0xBF, 6, Utf8State::B4Of4),
            Utf8State::B4Of4 => self.finish(byte),
        }
    }

    /// Abort any in-flight sequence.
    pub fn reset(&mut self) {
        self.state = Utf8State::Initial;
        self.codepoint = 0;
    }

    fn continue_mid(
        &mut self,
        byte: u8,
        accept: core::ops::RangeInclusive<u8>,
        shift: u32,
        next: Utf8State,
    ) -> Option<char> {
        if accept.contains(&byte) {
            self.codepoint |= u32::from(byte & 0x3F) << shift;
            self.state = next;
        } else {
            self.reset();
        }
        None
    }

    fn finish(&mut self, byte: u8) -> Option<char> {
        self.state = Utf8State::Initial;
        if (0x80..=0xBF).contains(&byte) {
            // Surrogates fall out of char::from_u32.
            char::from_u32(self.codepoint | u32::from(byte & 0x3F))
        } else {
            None
        }
    }
}
