// Copyright (c) 2023 Huawei Device Co., Ltd.
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Validating UTF-8 decoding with a configurable error policy.
//!
//! HPACK string literals are octet sequences. This crate exposes them as
//! `String`s, so every literal name and value passes through the decoder
//! here. The decoder consumes bytes in arbitrary fragments and validates
//! the continuation-byte ranges each leading byte allows (RFC 3629),
//! which excludes overlong forms, surrogate code points and values above
//! U+10FFFF.
//!
//! What happens on an invalid or truncated sequence is controlled by
//! [`UtfErrorMode`]: fail the decode, or substitute U+FFFD and continue.
//! Encoding needs no counterpart: Rust strings are UTF-8 by construction.

use crate::error::HpackError;

/// Policy applied when a byte sequence is not valid UTF-8.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UtfErrorMode {
    /// Any invalid or truncated sequence fails the decode.
    #[default]
    Fatal,

    /// Any invalid or truncated sequence decodes to U+FFFD.
    Replace,
}

/// Incremental UTF-8 decoder.
///
/// Bytes may arrive in arbitrary fragments; [`decode`] consumes each
/// fragment and [`finish`] applies the truncation policy to a dangling
/// final sequence.
///
/// [`decode`]: Utf8Decoder::decode
/// [`finish`]: Utf8Decoder::finish
#[derive(Clone)]
pub struct Utf8Decoder {
    mode: UtfErrorMode,
    out: String,
    /// Code point bits accumulated from the sequence in progress.
    acc: u32,
    /// Continuation bytes still expected; 0 between sequences.
    need: u8,
    /// Bounds for the first continuation byte, which depend on the
    /// leading byte.
    first_lo: u8,
    first_hi: u8,
    /// The next continuation byte is the first one of its sequence.
    first: bool,
}

impl Utf8Decoder {
    /// Creates a new, empty `Utf8Decoder` with the given error policy.
    pub fn new(mode: UtfErrorMode) -> Self {
        Self {
            mode,
            out: String::new(),
            acc: 0,
            need: 0,
            first_lo: 0x80,
            first_hi: 0xbf,
            first: false,
        }
    }

    /// Consumes one input fragment.
    pub fn decode(&mut self, src: &[u8]) -> Result<(), HpackError> {
        for &byte in src {
            self.step(byte)?;
        }
        Ok(())
    }

    /// Ends the stream, applying the truncation policy to any sequence
    /// still in progress, and returns the decoded string.
    pub fn finish(mut self) -> Result<String, HpackError> {
        if self.need != 0 {
            self.invalid()?;
        }
        Ok(self.out)
    }

    fn step(&mut self, byte: u8) -> Result<(), HpackError> {
        if self.need == 0 {
            return self.lead(byte);
        }
        let (lo, hi) = if self.first {
            (self.first_lo, self.first_hi)
        } else {
            (0x80, 0xbf)
        };
        if byte < lo || byte > hi {
            self.invalid()?;
            // The offending byte starts over as a leading byte.
            return self.lead(byte);
        }
        self.acc = (self.acc << 6) | (byte & 0x3f) as u32;
        self.first = false;
        self.need -= 1;
        if self.need == 0 {
            match char::from_u32(self.acc) {
                Some(ch) => self.out.push(ch),
                None => self.invalid()?,
            }
        }
        Ok(())
    }

    fn lead(&mut self, byte: u8) -> Result<(), HpackError> {
        match byte {
            0x00..=0x7f => self.out.push(byte as char),
            0xc2..=0xdf => self.begin(byte & 0x1f, 1, 0x80, 0xbf),
            0xe0 => self.begin(0x00, 2, 0xa0, 0xbf),
            0xe1..=0xec => self.begin(byte & 0x0f, 2, 0x80, 0xbf),
            // 0xed excludes the surrogate range U+D800..=U+DFFF.
            0xed => self.begin(0x0d, 2, 0x80, 0x9f),
            0xee..=0xef => self.begin(byte & 0x0f, 2, 0x80, 0xbf),
            0xf0 => self.begin(0x00, 3, 0x90, 0xbf),
            0xf1..=0xf3 => self.begin(byte & 0x07, 3, 0x80, 0xbf),
            // 0xf4 caps the range at U+10FFFF.
            0xf4 => self.begin(0x04, 3, 0x80, 0x8f),
            _ => self.invalid()?,
        }
        Ok(())
    }

    fn begin(&mut self, bits: u8, need: u8, first_lo: u8, first_hi: u8) {
        self.acc = bits as u32;
        self.need = need;
        self.first_lo = first_lo;
        self.first_hi = first_hi;
        self.first = true;
    }

    fn invalid(&mut self) -> Result<(), HpackError> {
        self.acc = 0;
        self.need = 0;
        self.first = false;
        match self.mode {
            UtfErrorMode::Fatal => Err(HpackError::InvalidUtf8),
            UtfErrorMode::Replace => {
                self.out.push('\u{fffd}');
                Ok(())
            }
        }
    }
}

/// Decodes a complete octet sequence with the given error policy.
pub(crate) fn decode_string(octets: &[u8], mode: UtfErrorMode) -> Result<String, HpackError> {
    let mut decoder = Utf8Decoder::new(mode);
    decoder.decode(octets)?;
    decoder.finish()
}
