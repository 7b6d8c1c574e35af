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

//! [Integer Representation] of HPACK.
//!
//! [Integer Representation]: https://httpwg.org/specs/rfc7541.html#integer.representation
//!
//! Integers represent header field indexes, string lengths and table
//! sizes. A value smaller than `2^N - 1` lives entirely in the N-bit
//! prefix of its first octet; anything larger fills the prefix with ones
//! and continues as a little-endian base-128 sequence whose final octet
//! clears the `0x80` continuation flag. Both directions below work one
//! octet at a time, so a value may be split across any number of buffer
//! chunks.

use core::cmp::Ordering;

use crate::error::HpackError;

/// Octet-at-a-time integer decoder (RFC 7541 Section 5.1).
///
/// `first_byte` resolves values that fit the prefix immediately;
/// otherwise the returned decoder accumulates continuation octets via
/// `next_byte` until one arrives without the continuation flag.
#[derive(Clone)]
pub(crate) struct IntegerDecoder {
    value: usize,
    shift: u32,
}

impl IntegerDecoder {
    /// Calculates an integer based on the incoming first byte and prefix
    /// mask. If the value fits the prefix, returns it directly, otherwise
    /// returns the decoder itself.
    pub(crate) fn first_byte(byte: u8, mask: u8) -> Result<usize, Self> {
        let prefix = byte & mask;
        match prefix.cmp(&mask) {
            Ordering::Less => Ok(prefix as usize),
            _ => Err(Self {
                value: prefix as usize,
                shift: 1,
            }),
        }
    }

    /// Continues the calculation with the next octet. Returns
    /// `Ok(Some(value))` once the sequence ends, `Ok(None)` while more
    /// octets follow, and an error on overflow.
    pub(crate) fn next_byte(&mut self, byte: u8) -> Result<Option<usize>, HpackError> {
        self.value = 1usize
            .checked_shl(self.shift - 1)
            .and_then(|scale| scale.checked_mul((byte & 0x7f) as usize))
            .and_then(|add| add.checked_add(self.value))
            .ok_or(HpackError::MalformedInteger)?;
        self.shift += 7;
        match (byte & 0x80) == 0x00 {
            true => Ok(Some(self.value)),
            false => Ok(None),
        }
    }
}

/// Octet-at-a-time integer encoder (RFC 7541 Section 5.1).
///
/// `next_byte` yields the encoded octets one by one so a caller can stop
/// at a full output buffer and resume later; `is_finished` reports
/// completion.
#[derive(Clone)]
pub(crate) struct IntegerEncoder {
    value: usize,
    mask: u8,
    prefix: u8,
    state: IntegerEncodeState,
}

#[derive(Clone)]
enum IntegerEncodeState {
    First,
    Trailing,
    Finish,
}

impl IntegerEncoder {
    /// Creates a new `IntegerEncoder`. `mask` is the all-ones prefix of
    /// the instruction's integer field and `prefix` holds the instruction
    /// bits above it.
    pub(crate) fn new(value: usize, mask: u8, prefix: u8) -> Self {
        Self {
            value,
            mask,
            prefix,
            state: IntegerEncodeState::First,
        }
    }

    /// Gets the next octet of the encoding, or `None` once complete.
    pub(crate) fn next_byte(&mut self) -> Option<u8> {
        match self.state {
            IntegerEncodeState::First => {
                if self.value < self.mask as usize {
                    self.state = IntegerEncodeState::Finish;
                    return Some(self.prefix | (self.value as u8));
                }
                self.value -= self.mask as usize;
                self.state = IntegerEncodeState::Trailing;
                Some(self.prefix | self.mask)
            }
            IntegerEncodeState::Trailing => Some(if self.value >= 128 {
                let octet = (self.value & 0x7f) as u8;
                self.value >>= 7;
                octet | 0x80
            } else {
                self.state = IntegerEncodeState::Finish;
                (self.value & 0x7f) as u8
            }),
            IntegerEncodeState::Finish => None,
        }
    }

    /// Checks if the encoding is complete.
    pub(crate) fn is_finished(&self) -> bool {
        matches!(self.state, IntegerEncodeState::Finish)
    }
}
