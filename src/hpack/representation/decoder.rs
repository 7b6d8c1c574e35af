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

use crate::error::HpackError;
use crate::hpack::integer::IntegerDecoder;
use crate::hpack::representation::{Name, PrefixBit, Representation};
use crate::huffman::HuffmanDecoder;
use crate::io::{DecodeStep, Input};

/// Instruction-level decoder. Every call to `decode` tries to finish one
/// `Representation` from the input cursor. When the cursor runs dry the
/// in-flight state must be saved to a [`ReprDecStateHolder`] and loaded
/// again once the next chunk arrives.
pub(crate) struct ReprDecoder<'a, 'b> {
    /// Cursor over the chunk being decoded.
    input: &'a mut Input<'b>,
    /// State left over from the previous `decode` call.
    state: Option<ReprDecodeState>,
}

impl<'a, 'b> ReprDecoder<'a, 'b> {
    /// Creates a new `ReprDecoder` whose `state` is empty.
    pub(crate) fn new(input: &'a mut Input<'b>) -> Self {
        Self { input, state: None }
    }

    /// Loads state from a holder.
    pub(crate) fn load(&mut self, holder: &mut ReprDecStateHolder) {
        self.state = holder.state.take();
    }

    /// Tries to decode one `Representation`. Returns `Ok(None)` once the
    /// cursor is exhausted; the caller then saves the state and resumes
    /// with the next chunk.
    pub(crate) fn decode(&mut self) -> Result<Option<Representation>, HpackError> {
        // If the cursor is exhausted, leave the state unchanged.
        if self.input.is_empty() {
            return Ok(None);
        }

        // An empty state starts over at the instruction's first octet.
        match self
            .state
            .take()
            .unwrap_or_else(|| ReprDecodeState::Index(Index::new()))
            .decode(self.input)
        {
            DecodeStep::Suspend(state) => {
                self.state = Some(state);
                Ok(None)
            }
            DecodeStep::Complete(repr) => Ok(Some(repr)),
            DecodeStep::Failed(error) => Err(error),
        }
    }

    /// Saves the in-flight state to a `ReprDecStateHolder`.
    pub(crate) fn save(self, holder: &mut ReprDecStateHolder) {
        holder.state = self.state;
    }
}

/// Holds the in-flight decode state between input chunks.
#[derive(Clone, Default)]
pub(crate) struct ReprDecStateHolder {
    state: Option<ReprDecodeState>,
}

impl ReprDecStateHolder {
    pub(crate) fn new() -> Self {
        Self { state: None }
    }

    /// `true` when no instruction is partially decoded, i.e. the stream is
    /// at an instruction boundary.
    pub(crate) fn is_empty(&self) -> bool {
        self.state.is_none()
    }
}

macro_rules! state_def {
    ($name: ident, $decoded: ty, $($state: ident),* $(,)?) => {
        #[derive(Clone)]
        pub(crate) enum $name {
            $(
                $state($state),
            )*
        }

        impl $name {
            fn decode(self, input: &mut Input<'_>) -> DecodeStep<$decoded, $name> {
                match self {
                    $(
                        Self::$state(state) => state.decode(input),
                    )*
                }
            }
        }

        $(
            impl From<$state> for $name {
                fn from(s: $state) -> Self {
                    Self::$state(s)
                }
            }
        )*
    }
}

// `Representation` decoding state diagram:
//
//                    ┌ `Index` ─ `IndexInner` ┬ `FirstByte`
//                    │                        └ `TrailingBytes`
//                    │
// `ReprDecodeState`  ┼ `NameString`  ┐                 ┌ `LengthFirstByte`
//                    │               ├ `LiteralString` ┼ `LengthTrailingBytes`
//                    └ `ValueString` ┘                 ├ `RawStringBytes`
//                                                      └ `HuffmanStringBytes`

state_def!(
    ReprDecodeState,
    Representation,
    Index,
    NameString,
    ValueString
);

state_def!(IndexInner, (PrefixBit, usize), FirstByte, TrailingBytes);

state_def!(
    LiteralString,
    Vec<u8>,
    LengthFirstByte,
    LengthTrailingBytes,
    RawStringBytes,
    HuffmanStringBytes,
);

/// Decodes the instruction bits and the index integer that starts every
/// instruction, then hands over to the state the instruction calls for.
#[derive(Clone)]
pub(crate) struct Index {
    inner: IndexInner,
}

impl Index {
    fn new() -> Self {
        Self::from_inner(FirstByte.into())
    }

    fn from_inner(inner: IndexInner) -> Self {
        Self { inner }
    }

    fn decode(self, input: &mut Input<'_>) -> DecodeStep<Representation, ReprDecodeState> {
        match self.inner.decode(input) {
            // RFC7541-6.1: The index value of 0 is not used. It MUST be
            // treated as a decoding error if found in an indexed header
            // field representation.
            DecodeStep::Complete((PrefixBit::INDEXED, 0)) => HpackError::InvalidIndex(0).into(),
            DecodeStep::Complete((PrefixBit::INDEXED, index)) => {
                DecodeStep::Complete(Representation::Indexed { index })
            }
            DecodeStep::Complete((PrefixBit::SIZE_UPDATE, max_size)) => {
                DecodeStep::Complete(Representation::SizeUpdate { max_size })
            }
            DecodeStep::Complete((repr, 0)) => NameString::new(repr).decode(input),
            DecodeStep::Complete((repr, index)) => {
                ValueString::new(repr, Name::Index(index)).decode(input)
            }
            DecodeStep::Suspend(inner) => DecodeStep::Suspend(Index::from_inner(inner).into()),
            DecodeStep::Failed(e) => e.into(),
        }
    }
}

/// Decodes the name string of a literal whose index field was 0.
#[derive(Clone)]
pub(crate) struct NameString {
    repr: PrefixBit,
    inner: LiteralString,
}

impl NameString {
    fn new(repr: PrefixBit) -> Self {
        Self::from_inner(repr, LengthFirstByte.into())
    }

    fn from_inner(repr: PrefixBit, inner: LiteralString) -> Self {
        Self { repr, inner }
    }

    fn decode(self, input: &mut Input<'_>) -> DecodeStep<Representation, ReprDecodeState> {
        match self.inner.decode(input) {
            DecodeStep::Complete(octets) => {
                ValueString::new(self.repr, Name::Literal(octets)).decode(input)
            }
            DecodeStep::Suspend(inner) => {
                DecodeStep::Suspend(Self::from_inner(self.repr, inner).into())
            }
            DecodeStep::Failed(e) => e.into(),
        }
    }
}

/// Decodes the value string that ends every literal representation.
#[derive(Clone)]
pub(crate) struct ValueString {
    repr: PrefixBit,
    name: Name,
    inner: LiteralString,
}

impl ValueString {
    fn new(repr: PrefixBit, name: Name) -> Self {
        Self::from_inner(repr, name, LengthFirstByte.into())
    }

    fn from_inner(repr: PrefixBit, name: Name, inner: LiteralString) -> Self {
        Self { repr, name, inner }
    }

    fn decode(self, input: &mut Input<'_>) -> DecodeStep<Representation, ReprDecodeState> {
        match (self.repr, self.inner.decode(input)) {
            (PrefixBit::LITERAL_WITH_INDEXING, DecodeStep::Complete(value)) => {
                DecodeStep::Complete(Representation::LiteralWithIndexing {
                    name: self.name,
                    value,
                })
            }
            (PrefixBit::LITERAL_WITHOUT_INDEXING, DecodeStep::Complete(value)) => {
                DecodeStep::Complete(Representation::LiteralWithoutIndexing {
                    name: self.name,
                    value,
                })
            }
            (_, DecodeStep::Complete(value)) => {
                DecodeStep::Complete(Representation::LiteralNeverIndexed {
                    name: self.name,
                    value,
                })
            }
            (_, DecodeStep::Suspend(inner)) => {
                DecodeStep::Suspend(Self::from_inner(self.repr, self.name, inner).into())
            }
            (_, DecodeStep::Failed(e)) => e.into(),
        }
    }
}

/// Decodes the first octet of an instruction: the instruction bits plus
/// the start of its prefix integer.
#[derive(Clone)]
pub(crate) struct FirstByte;

impl FirstByte {
    fn decode(self, input: &mut Input<'_>) -> DecodeStep<(PrefixBit, usize), IndexInner> {
        let byte = match input.step() {
            Some(byte) => byte,
            None => return DecodeStep::Suspend(self.into()),
        };
        let repr = PrefixBit::from_u8(byte);
        let mask = repr.prefix_index_mask();
        match IntegerDecoder::first_byte(byte, mask.0) {
            Ok(index) => DecodeStep::Complete((repr, index)),
            Err(int) => TrailingBytes::new(repr, int).decode(input),
        }
    }
}

/// Decodes the continuation octets of an instruction's prefix integer.
#[derive(Clone)]
pub(crate) struct TrailingBytes {
    repr: PrefixBit,
    index: IntegerDecoder,
}

impl TrailingBytes {
    fn new(repr: PrefixBit, index: IntegerDecoder) -> Self {
        Self { repr, index }
    }

    fn decode(mut self, input: &mut Input<'_>) -> DecodeStep<(PrefixBit, usize), IndexInner> {
        loop {
            let byte = match input.step() {
                Some(byte) => byte,
                None => return DecodeStep::Suspend(self.into()),
            };
            match self.index.next_byte(byte) {
                Ok(None) => {}
                Ok(Some(index)) => return DecodeStep::Complete((self.repr, index)),
                Err(e) => return e.into(),
            }
        }
    }
}

/// Decodes the first octet of a string length: the Huffman flag plus the
/// start of the length integer.
#[derive(Clone)]
pub(crate) struct LengthFirstByte;

impl LengthFirstByte {
    fn decode(self, input: &mut Input<'_>) -> DecodeStep<Vec<u8>, LiteralString> {
        let byte = match input.step() {
            Some(byte) => byte,
            None => return DecodeStep::Suspend(self.into()),
        };
        match (
            IntegerDecoder::first_byte(byte, 0x7f),
            (byte & 0x80) == 0x80,
        ) {
            (Ok(len), true) => HuffmanStringBytes::new(len).decode(input),
            (Ok(len), false) => RawStringBytes::new(len).decode(input),
            (Err(int), huffman) => LengthTrailingBytes::new(huffman, int).decode(input),
        }
    }
}

/// Decodes the continuation octets of a string length.
#[derive(Clone)]
pub(crate) struct LengthTrailingBytes {
    is_huffman: bool,
    length: IntegerDecoder,
}

impl LengthTrailingBytes {
    fn new(is_huffman: bool, length: IntegerDecoder) -> Self {
        Self { is_huffman, length }
    }

    fn decode(mut self, input: &mut Input<'_>) -> DecodeStep<Vec<u8>, LiteralString> {
        loop {
            let byte = match input.step() {
                Some(byte) => byte,
                None => return DecodeStep::Suspend(self.into()),
            };
            match (self.length.next_byte(byte), self.is_huffman) {
                (Ok(None), _) => {}
                (Err(e), _) => return e.into(),
                (Ok(Some(length)), true) => return HuffmanStringBytes::new(length).decode(input),
                (Ok(Some(length)), false) => return RawStringBytes::new(length).decode(input),
            }
        }
    }
}

/// Collects the octets of a raw (non-Huffman) string literal.
#[derive(Clone)]
pub(crate) struct RawStringBytes {
    octets: Vec<u8>,
    length: usize,
}

impl RawStringBytes {
    fn new(length: usize) -> Self {
        Self {
            octets: Vec::new(),
            length,
        }
    }

    fn decode(mut self, input: &mut Input<'_>) -> DecodeStep<Vec<u8>, LiteralString> {
        let want = self.length - self.octets.len();
        self.octets.extend_from_slice(input.take(want));
        if self.octets.len() == self.length {
            DecodeStep::Complete(self.octets)
        } else {
            DecodeStep::Suspend(self.into())
        }
    }
}

/// Feeds the octets of a Huffman-coded string literal through a
/// [`HuffmanDecoder`].
#[derive(Clone)]
pub(crate) struct HuffmanStringBytes {
    huffman: HuffmanDecoder,
    read: usize,
    length: usize,
}

impl HuffmanStringBytes {
    fn new(length: usize) -> Self {
        Self {
            huffman: HuffmanDecoder::new(),
            read: 0,
            length,
        }
    }

    fn decode(mut self, input: &mut Input<'_>) -> DecodeStep<Vec<u8>, LiteralString> {
        let want = self.length - self.read;
        let chunk = input.take(want);
        if let Err(e) = self.huffman.decode(chunk) {
            return e.into();
        }
        self.read += chunk.len();
        if self.read == self.length {
            match self.huffman.finish() {
                Ok(octets) => DecodeStep::Complete(octets),
                Err(e) => e.into(),
            }
        } else {
            DecodeStep::Suspend(self.into())
        }
    }
}
