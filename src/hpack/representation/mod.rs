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

//! [Header Field Representation] of HPACK.
//!
//! [Header Field Representation]: https://www.rfc-editor.org/rfc/rfc7541.html#section-2.4
//!
//! An encoded header field is either an index into the combined table
//! space or a literal. A literal carries its value as a string and its
//! name either as an index or as another string, and comes in three
//! flavours that differ in what happens to the dynamic table: with
//! incremental indexing (the field is inserted), without indexing, and
//! never indexed (identical locally, but intermediaries must not re-encode
//! the field with indexing). A fifth instruction changes the dynamic table
//! size limit.
//!
//! Each instruction is identified by the leading bits of its first octet;
//! the remaining low bits start the instruction's prefix integer.

mod decoder;
mod encoder;

pub(crate) use decoder::{ReprDecStateHolder, ReprDecoder};
pub(crate) use encoder::{ReprEncStateHolder, ReprEncoder};

/// One decoded header field instruction.
///
/// # Binary Format
/// ```text
///   0   1   2   3   4   5   6   7
/// +---+---+---+---+---+---+---+---+
/// | 1 |        Index (7+)         |  Indexed
/// +---+---+---+---+---+---+---+---+
/// | 0 | 1 |      Index (6+)       |  Literal with incremental indexing
/// +---+---+---+---+---+---+---+---+
/// | 0 | 0 | 1 |   Max size (5+)   |  Dynamic table size update
/// +---+---+---+---+---+---+---+---+
/// | 0 | 0 | 0 | 1 |  Index (4+)   |  Literal never indexed
/// +---+---+---+---+---+---+---+---+
/// | 0 | 0 | 0 | 0 |  Index (4+)   |  Literal without indexing
/// +---+---+---+---+---+---+---+---+
/// ```
///
/// A literal whose index field is 0 carries its name as a string; the
/// strings that follow are length-prefixed and optionally Huffman coded.
pub(crate) enum Representation {
    /// A reference to an entry in the combined table space. Emits the
    /// referenced field; never touches the dynamic table.
    Indexed { index: usize },

    /// A literal that is emitted and also inserted at the front of the
    /// dynamic table.
    LiteralWithIndexing { name: Name, value: Vec<u8> },

    /// A literal that is emitted and leaves the dynamic table unchanged.
    LiteralWithoutIndexing { name: Name, value: Vec<u8> },

    /// Like [`Representation::LiteralWithoutIndexing`], with the added
    /// promise that intermediaries re-encode the field as a literal.
    LiteralNeverIndexed { name: Name, value: Vec<u8> },

    /// A new size limit for the dynamic table.
    SizeUpdate { max_size: usize },
}

/// The instruction bits in the first octet of a `Representation`.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub(crate) struct PrefixBit(pub(crate) u8);

impl PrefixBit {
    pub(crate) const INDEXED: Self = Self(0x80);
    pub(crate) const LITERAL_WITH_INDEXING: Self = Self(0x40);
    pub(crate) const SIZE_UPDATE: Self = Self(0x20);
    pub(crate) const LITERAL_NEVER_INDEXED: Self = Self(0x10);
    pub(crate) const LITERAL_WITHOUT_INDEXING: Self = Self(0x00);

    /// Classifies the first octet of an instruction.
    pub(crate) fn from_u8(byte: u8) -> Self {
        match byte {
            x if x >= 0x80 => Self::INDEXED,
            x if x >= 0x40 => Self::LITERAL_WITH_INDEXING,
            x if x >= 0x20 => Self::SIZE_UPDATE,
            x if x >= 0x10 => Self::LITERAL_NEVER_INDEXED,
            _ => Self::LITERAL_WITHOUT_INDEXING,
        }
    }

    /// Returns the prefix-integer mask that goes with these instruction
    /// bits.
    pub(crate) fn prefix_index_mask(&self) -> PrefixIndexMask {
        match self.0 {
            0x80 => PrefixIndexMask::INDEXED,
            0x40 => PrefixIndexMask::LITERAL_WITH_INDEXING,
            0x20 => PrefixIndexMask::SIZE_UPDATE,
            0x10 => PrefixIndexMask::LITERAL_NEVER_INDEXED,
            _ => PrefixIndexMask::LITERAL_WITHOUT_INDEXING,
        }
    }
}

/// The all-ones prefix below an instruction's bits: the first octet of the
/// instruction's integer.
pub(crate) struct PrefixIndexMask(pub(crate) u8);

impl PrefixIndexMask {
    pub(crate) const INDEXED: Self = Self(0x7f);
    pub(crate) const LITERAL_WITH_INDEXING: Self = Self(0x3f);
    pub(crate) const SIZE_UPDATE: Self = Self(0x1f);
    pub(crate) const LITERAL_NEVER_INDEXED: Self = Self(0x0f);
    pub(crate) const LITERAL_WITHOUT_INDEXING: Self = Self(0x0f);
}

/// The name part of a literal representation: an index into the combined
/// table space or a string of its own.
#[derive(Clone)]
pub(crate) enum Name {
    Index(usize),
    Literal(Vec<u8>),
}

#[cfg(test)]
mod ut_prefix_bit {
    use super::{PrefixBit, PrefixIndexMask};

    /// UT test cases for `PrefixBit::from_u8`.
    ///
    /// # Brief
    /// 1. Classifies bytes on both sides of every instruction boundary.
    /// 2. Checks the classification and the associated mask.
    #[test]
    fn ut_prefix_bit_from_u8() {
        assert_eq!(PrefixBit::from_u8(0xff), PrefixBit::INDEXED);
        assert_eq!(PrefixBit::from_u8(0x80), PrefixBit::INDEXED);
        assert_eq!(PrefixBit::from_u8(0x7f), PrefixBit::LITERAL_WITH_INDEXING);
        assert_eq!(PrefixBit::from_u8(0x40), PrefixBit::LITERAL_WITH_INDEXING);
        assert_eq!(PrefixBit::from_u8(0x3f), PrefixBit::SIZE_UPDATE);
        assert_eq!(PrefixBit::from_u8(0x20), PrefixBit::SIZE_UPDATE);
        assert_eq!(PrefixBit::from_u8(0x1f), PrefixBit::LITERAL_NEVER_INDEXED);
        assert_eq!(PrefixBit::from_u8(0x10), PrefixBit::LITERAL_NEVER_INDEXED);
        assert_eq!(PrefixBit::from_u8(0x0f), PrefixBit::LITERAL_WITHOUT_INDEXING);
        assert_eq!(PrefixBit::from_u8(0x00), PrefixBit::LITERAL_WITHOUT_INDEXING);

        assert_eq!(PrefixBit::INDEXED.prefix_index_mask().0, 0x7f);
        assert_eq!(PrefixBit::LITERAL_WITH_INDEXING.prefix_index_mask().0, 0x3f);
        assert_eq!(PrefixBit::SIZE_UPDATE.prefix_index_mask().0, 0x1f);
        assert_eq!(PrefixBit::LITERAL_NEVER_INDEXED.prefix_index_mask().0, 0x0f);
        assert_eq!(
            PrefixBit::LITERAL_WITHOUT_INDEXING.prefix_index_mask().0,
            0x0f
        );
    }
}
