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

use std::vec::IntoIter;

use crate::hpack::integer::IntegerEncoder;
use crate::hpack::representation::{PrefixBit, PrefixIndexMask};
use crate::hpack::table::{DynamicTable, HpackHeader, TableIndex, TableSearcher};
use crate::huffman::huffman_encode;
use crate::io::Output;

/// Instruction-level encoder. `encode` writes representations into the
/// output cursor until the block is finished or the cursor fills; the
/// in-flight state must then be saved to a [`ReprEncStateHolder`] and
/// loaded again once the next buffer arrives.
///
/// The dynamic table is updated the moment a field's representation is
/// chosen, before its octets are necessarily written out, so the table
/// stays in lockstep with the wire as seen by the peer's decoder.
pub(crate) struct ReprEncoder<'a> {
    table: &'a mut DynamicTable,
    /// Size update instructions to emit before any header field.
    updates: Vec<usize>,
    /// Fields of the block still waiting for a representation.
    iter: Option<IntoIter<HpackHeader>>,
    /// Partially written representation.
    state: Option<ReprEncodeState>,
}

impl<'a> ReprEncoder<'a> {
    /// Creates a new, empty `ReprEncoder` over the given dynamic table.
    pub(crate) fn new(table: &'a mut DynamicTable) -> Self {
        Self {
            table,
            updates: Vec::new(),
            iter: None,
            state: None,
        }
    }

    /// Loads states from a holder.
    pub(crate) fn load(&mut self, holder: &mut ReprEncStateHolder) {
        self.updates = std::mem::take(&mut holder.updates);
        self.iter = holder.iter.take();
        self.state = holder.state.take();
    }

    /// Saves the in-flight states to a holder.
    pub(crate) fn save(self, holder: &mut ReprEncStateHolder) {
        holder.updates = self.updates;
        holder.iter = self.iter;
        holder.state = self.state;
    }

    /// Writes as much of the block as fits into `output`. Encoding is
    /// complete when no state remains afterwards; it is the caller's job
    /// to save the states and decide whether a full cursor means "wait
    /// for the next buffer" or "truncated output".
    pub(crate) fn encode(&mut self, output: &mut Output<'_>, use_huffman: bool) {
        if let Some(state) = self.state.take() {
            if let Err(state) = state.encode(output) {
                self.state = Some(state);
                return;
            }
        }

        while !self.updates.is_empty() {
            let max_size = self.updates.remove(0);
            if let Err(state) = SizeUpdate::new(max_size).encode(output) {
                self.state = Some(state);
                return;
            }
        }

        if let Some(mut iter) = self.iter.take() {
            while let Some(field) = iter.next() {
                let searcher = TableSearcher::new(self.table);
                let result = match searcher.index(field.name(), field.value()) {
                    Some(TableIndex::Field(index)) => Indexed::new(index).encode(output),
                    Some(TableIndex::Name(index)) => {
                        let value = field.value().as_bytes().to_vec();
                        // Insert first: the index above was resolved
                        // against the pre-insertion table, exactly as the
                        // peer's decoder will resolve it.
                        self.table.add(field);
                        Indexing::new(index, value, use_huffman).encode(output)
                    }
                    None => {
                        let name = field.name().as_bytes().to_vec();
                        let value = field.value().as_bytes().to_vec();
                        self.table.add(field);
                        IndexingWithName::new(name, value, use_huffman).encode(output)
                    }
                };
                if let Err(state) = result {
                    self.state = Some(state);
                    self.iter = Some(iter);
                    return;
                }
            }
        }
    }
}

/// Holds the in-flight encode states between output buffers.
#[derive(Default)]
pub(crate) struct ReprEncStateHolder {
    updates: Vec<usize>,
    iter: Option<IntoIter<HpackHeader>>,
    state: Option<ReprEncodeState>,
}

impl ReprEncStateHolder {
    /// Creates a new, empty `ReprEncStateHolder`.
    pub(crate) fn new() -> Self {
        Self {
            updates: Vec::new(),
            iter: None,
            state: None,
        }
    }

    /// Queues one header block: the size updates to announce first, then
    /// the fields to represent.
    pub(crate) fn set_block(&mut self, updates: Vec<usize>, fields: Vec<HpackHeader>) {
        self.updates = updates;
        self.iter = Some(fields.into_iter());
    }

    /// `true` when nothing remains to encode.
    pub(crate) fn is_empty(&self) -> bool {
        self.updates.is_empty() && self.iter.is_none() && self.state.is_none()
    }
}

/// A representation whose octets are partially written.
pub(crate) enum ReprEncodeState {
    Indexed(Indexed),
    Indexing(Indexing),
    IndexingWithName(IndexingWithName),
    SizeUpdate(SizeUpdate),
}

impl ReprEncodeState {
    fn encode(self, output: &mut Output<'_>) -> Result<(), Self> {
        match self {
            Self::Indexed(s) => s.encode(output),
            Self::Indexing(s) => s.encode(output),
            Self::IndexingWithName(s) => s.encode(output),
            Self::SizeUpdate(s) => s.encode(output),
        }
    }
}

/// Indexed header field representation.
pub(crate) struct Indexed {
    index: Integer,
}

impl Indexed {
    fn new(index: usize) -> Self {
        Self {
            index: Integer::index(index, PrefixIndexMask::INDEXED.0, PrefixBit::INDEXED.0),
        }
    }

    fn from(index: Integer) -> Self {
        Self { index }
    }

    fn encode(self, output: &mut Output<'_>) -> Result<(), ReprEncodeState> {
        self.index
            .encode(output)
            .map_err(|e| ReprEncodeState::Indexed(Indexed::from(e)))
    }
}

/// Literal with incremental indexing, name given as an index.
pub(crate) struct Indexing {
    inner: IndexAndValue,
}

impl Indexing {
    fn new(index: usize, value: Vec<u8>, is_huffman: bool) -> Self {
        Self {
            inner: IndexAndValue::new()
                .set_index(
                    index,
                    PrefixIndexMask::LITERAL_WITH_INDEXING.0,
                    PrefixBit::LITERAL_WITH_INDEXING.0,
                )
                .set_value(value, is_huffman),
        }
    }

    fn from(inner: IndexAndValue) -> Self {
        Self { inner }
    }

    fn encode(self, output: &mut Output<'_>) -> Result<(), ReprEncodeState> {
        self.inner
            .encode(output)
            .map_err(|e| ReprEncodeState::Indexing(Indexing::from(e)))
    }
}

/// Literal with incremental indexing, name given as a string.
pub(crate) struct IndexingWithName {
    inner: NameAndValue,
}

impl IndexingWithName {
    fn new(name: Vec<u8>, value: Vec<u8>, is_huffman: bool) -> Self {
        Self {
            inner: NameAndValue::new()
                .set_index(
                    PrefixIndexMask::LITERAL_WITH_INDEXING.0,
                    PrefixBit::LITERAL_WITH_INDEXING.0,
                )
                .set_name_and_value(name, value, is_huffman),
        }
    }

    fn from(inner: NameAndValue) -> Self {
        Self { inner }
    }

    fn encode(self, output: &mut Output<'_>) -> Result<(), ReprEncodeState> {
        self.inner
            .encode(output)
            .map_err(|e| ReprEncodeState::IndexingWithName(IndexingWithName::from(e)))
    }
}

/// Dynamic table size update instruction.
pub(crate) struct SizeUpdate {
    max_size: Integer,
}

impl SizeUpdate {
    fn new(max_size: usize) -> Self {
        Self {
            max_size: Integer::index(
                max_size,
                PrefixIndexMask::SIZE_UPDATE.0,
                PrefixBit::SIZE_UPDATE.0,
            ),
        }
    }

    fn from(max_size: Integer) -> Self {
        Self { max_size }
    }

    fn encode(self, output: &mut Output<'_>) -> Result<(), ReprEncodeState> {
        self.max_size
            .encode(output)
            .map_err(|e| ReprEncodeState::SizeUpdate(SizeUpdate::from(e)))
    }
}

macro_rules! check_and_encode {
    ($item: expr, $output: expr, $self: expr) => {{
        if let Some(i) = $item.take() {
            if let Err(e) = i.encode($output) {
                $item = Some(e);
                return Err($self);
            }
        }
    }};
}

/// Octets of a name index plus a value string.
pub(crate) struct IndexAndValue {
    index: Option<Integer>,
    value_length: Option<Integer>,
    value_octets: Option<Octets>,
}

impl IndexAndValue {
    fn new() -> Self {
        Self {
            index: None,
            value_length: None,
            value_octets: None,
        }
    }

    fn set_index(mut self, index: usize, mask: u8, prefix: u8) -> Self {
        self.index = Some(Integer::index(index, mask, prefix));
        self
    }

    fn set_value(mut self, value: Vec<u8>, is_huffman: bool) -> Self {
        let octets = Octets::new(value, is_huffman);
        self.value_length = Some(Integer::length(octets.len(), is_huffman));
        self.value_octets = Some(octets);
        self
    }

    fn encode(mut self, output: &mut Output<'_>) -> Result<(), Self> {
        check_and_encode!(self.index, output, self);
        check_and_encode!(self.value_length, output, self);
        check_and_encode!(self.value_octets, output, self);
        Ok(())
    }
}

/// Octets of a name string plus a value string.
pub(crate) struct NameAndValue {
    index: Option<Integer>,
    name_length: Option<Integer>,
    name_octets: Option<Octets>,
    value_length: Option<Integer>,
    value_octets: Option<Octets>,
}

impl NameAndValue {
    fn new() -> Self {
        Self {
            index: None,
            name_length: None,
            name_octets: None,
            value_length: None,
            value_octets: None,
        }
    }

    fn set_index(mut self, mask: u8, prefix: u8) -> Self {
        self.index = Some(Integer::index(0, mask, prefix));
        self
    }

    fn set_name_and_value(mut self, name: Vec<u8>, value: Vec<u8>, is_huffman: bool) -> Self {
        let name_octets = Octets::new(name, is_huffman);
        self.name_length = Some(Integer::length(name_octets.len(), is_huffman));
        self.name_octets = Some(name_octets);
        let value_octets = Octets::new(value, is_huffman);
        self.value_length = Some(Integer::length(value_octets.len(), is_huffman));
        self.value_octets = Some(value_octets);
        self
    }

    fn encode(mut self, output: &mut Output<'_>) -> Result<(), Self> {
        check_and_encode!(self.index, output, self);
        check_and_encode!(self.name_length, output, self);
        check_and_encode!(self.name_octets, output, self);
        check_and_encode!(self.value_length, output, self);
        check_and_encode!(self.value_octets, output, self);
        Ok(())
    }
}

/// A resumable prefix integer.
pub(crate) struct Integer {
    int: IntegerEncoder,
}

impl Integer {
    fn index(index: usize, mask: u8, prefix: u8) -> Self {
        Self {
            int: IntegerEncoder::new(index, mask, prefix),
        }
    }

    fn length(length: usize, is_huffman: bool) -> Self {
        let prefix = if is_huffman { 0x80 } else { 0x00 };
        Self {
            int: IntegerEncoder::new(length, 0x7f, prefix),
        }
    }

    fn encode(mut self, output: &mut Output<'_>) -> Result<(), Self> {
        while !self.int.is_finished() {
            if output.is_full() {
                return Err(self);
            }
            if let Some(byte) = self.int.next_byte() {
                output.push(byte);
            }
        }
        Ok(())
    }
}

/// A string literal's octets, Huffman coded up front so the length prefix
/// preceding them is known.
pub(crate) struct Octets {
    src: Vec<u8>,
    index: usize,
}

impl Octets {
    fn new(src: Vec<u8>, is_huffman: bool) -> Self {
        if is_huffman {
            let mut dst = Vec::with_capacity(src.len());
            huffman_encode(src.as_slice(), &mut dst);
            Self { src: dst, index: 0 }
        } else {
            Self { src, index: 0 }
        }
    }

    fn len(&self) -> usize {
        self.src.len()
    }

    fn encode(mut self, output: &mut Output<'_>) -> Result<(), Self> {
        self.index += output.write(&self.src[self.index..]);
        if self.index == self.src.len() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

#[cfg(test)]
mod ut_repr_encoder {
    use super::*;

    /// UT test cases for the representation encode states.
    ///
    /// # Brief
    /// 1. Encodes each representation kind into a roomy buffer.
    /// 2. Checks the emitted octets.
    #[test]
    fn ut_repr_encode_states() {
        let mut buf = [0u8; 64];

        let mut output = Output::last(&mut buf);
        assert!(Indexed::new(2).encode(&mut output).is_ok());
        assert_eq!(output.index(), 1);
        assert_eq!(buf[..1], [0x82]);

        let mut output = Output::last(&mut buf);
        assert!(Indexing::new(24, b"no-cache".to_vec(), false)
            .encode(&mut output)
            .is_ok());
        assert_eq!(output.index(), 10);
        assert_eq!(buf[..2], [0x58, 0x08]);
        assert_eq!(&buf[2..10], b"no-cache");

        let mut output = Output::last(&mut buf);
        assert!(
            IndexingWithName::new(b"custom-key".to_vec(), b"custom-header".to_vec(), false)
                .encode(&mut output)
                .is_ok()
        );
        assert_eq!(output.index(), 26);
        assert_eq!(buf[..2], [0x40, 0x0a]);

        let mut output = Output::last(&mut buf);
        assert!(SizeUpdate::new(4096).encode(&mut output).is_ok());
        assert_eq!(output.index(), 3);
        assert_eq!(buf[..3], [0x3f, 0xe1, 0x1f]);
    }

    /// UT test cases for resuming an interrupted representation.
    ///
    /// # Brief
    /// 1. Encodes a literal into a buffer too small to hold it.
    /// 2. Resumes the returned state into a second buffer.
    /// 3. Checks the concatenated octets.
    #[test]
    fn ut_repr_encode_resume() {
        let state = Indexing::new(24, b"no-cache".to_vec(), false);

        let mut first = [0u8; 4];
        let mut output = Output::part(&mut first);
        let state = match state.encode(&mut output) {
            Err(state) => state,
            Ok(()) => panic!("a 4-byte buffer cannot hold this literal"),
        };

        let mut second = [0u8; 16];
        let mut output = Output::last(&mut second);
        assert!(state.encode(&mut output).is_ok());
        assert_eq!(output.index(), 6);

        let mut joined = first.to_vec();
        joined.extend_from_slice(&second[..6]);
        assert_eq!(joined[..2], [0x58, 0x08]);
        assert_eq!(&joined[2..], b"no-cache");
    }
}
