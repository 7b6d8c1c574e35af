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

//! Errors that may occur in this crate.
//!
//! Every [`HpackError`] is terminal for the connection direction that
//! produced it. Once a header block fails to decode or encode, the dynamic
//! tables on the two sides of the connection can no longer be assumed to
//! match, so the caller must discard the codec pair and tear down the
//! connection (see RFC 7541 Section 2.2 and RFC 9113 Section 4.3).

use core::fmt::{Display, Formatter};
use std::error::Error;

/// Errors produced while decoding or encoding a header block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HpackError {
    /// A prefix-integer continuation sequence overflowed the accumulator.
    MalformedInteger,

    /// A string literal contained an invalid Huffman code, a decoded EOS
    /// symbol, or invalid padding.
    MalformedHuffman,

    /// A literal name or value was not valid UTF-8 and the decoder is in
    /// [`UtfErrorMode::Fatal`] mode.
    ///
    /// [`UtfErrorMode::Fatal`]: crate::utf8::UtfErrorMode
    InvalidUtf8,

    /// A representation referenced index 0 or an index beyond the combined
    /// static and dynamic table bounds.
    InvalidIndex(usize),

    /// A dynamic table size update exceeded the decoder's configured limit.
    InvalidSizeUpdate(usize),

    /// The input cursor was marked final but ended in the middle of an
    /// instruction.
    Truncated,

    /// The output cursor was marked final but filled up with encoding work
    /// still pending.
    OutputTruncated,

    /// The decoded header list exceeded the configured list size limit.
    HeaderListOverflow,
}

impl Display for HpackError {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::MalformedInteger => write!(f, "malformed prefix integer"),
            Self::MalformedHuffman => write!(f, "malformed huffman sequence"),
            Self::InvalidUtf8 => write!(f, "string literal is not valid utf-8"),
            Self::InvalidIndex(index) => write!(f, "header field index {index} out of range"),
            Self::InvalidSizeUpdate(size) => {
                write!(f, "dynamic table size update {size} exceeds the limit")
            }
            Self::Truncated => write!(f, "header block ended in the middle of an instruction"),
            Self::OutputTruncated => write!(f, "output ended with encoding unfinished"),
            Self::HeaderListOverflow => write!(f, "header list size limit exceeded"),
        }
    }
}

impl Error for HpackError {}

#[cfg(test)]
mod ut_error {
    use super::HpackError;

    /// UT test cases for `HpackError`.
    ///
    /// # Brief
    /// 1. Formats each `HpackError` variant.
    /// 2. Checks that every message is non-empty and variant comparison
    ///    works.
    #[test]
    fn ut_error_display() {
        let errors = [
            HpackError::MalformedInteger,
            HpackError::MalformedHuffman,
            HpackError::InvalidUtf8,
            HpackError::InvalidIndex(62),
            HpackError::InvalidSizeUpdate(8192),
            HpackError::Truncated,
            HpackError::OutputTruncated,
            HpackError::HeaderListOverflow,
        ];
        for error in errors.iter() {
            assert!(!error.to_string().is_empty());
        }
        assert_eq!(HpackError::InvalidIndex(62), HpackError::InvalidIndex(62));
        assert_ne!(HpackError::InvalidIndex(62), HpackError::InvalidIndex(63));
    }
}
