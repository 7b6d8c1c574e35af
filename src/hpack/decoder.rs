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

use core::mem::take;

use crate::error::HpackError;
use crate::hpack::representation::{Name, Representation, ReprDecStateHolder, ReprDecoder};
use crate::hpack::table::{DynamicTable, HpackHeader, TableSearcher};
use crate::io::Input;
use crate::utf8::{decode_string, UtfErrorMode};

/// Dynamic table size every connection starts from (RFC 9113
/// Section 6.5.2).
const DEFAULT_HEADER_TABLE_SIZE: usize = 4096;

/// Default bound on the accounted size of one decoded header list.
const DEFAULT_MAX_HEADER_LIST_SIZE: usize = 16 << 20;

/// Decoder half of [HPACK].
///
/// [HPACK]: https://httpwg.org/specs/rfc7541.html
///
/// A decoder owns the dynamic table for one direction of a connection and
/// decodes one header block at a time. Input may arrive in arbitrary
/// fragments: every fragment but the last is fed through
/// [`Input::part`], the last through [`Input::last`], and the block's
/// fields come back once the final fragment has been consumed.
///
/// ```
/// use ylong_hpack::io::Input;
/// use ylong_hpack::HpackDecoder;
///
/// let mut decoder = HpackDecoder::new();
/// // C.2.4: an indexed reference to ":method: GET".
/// let fields = decoder.decode(&mut Input::last(&[0x82])).unwrap().unwrap();
/// assert_eq!(fields[0].name(), ":method");
/// assert_eq!(fields[0].value(), "GET");
/// ```
///
/// A decoder is `Clone`: cloning mid-block branches the decode, giving an
/// independent table and in-flight state, which supports speculative
/// decoding and test harnesses that replay a block from a split point.
#[derive(Clone)]
pub struct HpackDecoder {
    table: DynamicTable,
    /// Upper bound for size update instructions; the table's initial
    /// limit.
    size_limit: usize,
    max_header_list_size: usize,
    utf8_mode: UtfErrorMode,
    fields: Vec<HpackHeader>,
    list_size: usize,
    holder: ReprDecStateHolder,
}

impl HpackDecoder {
    /// Creates an `HpackDecoder` with the protocol-default table size of
    /// 4096 octets.
    pub fn new() -> Self {
        Self::with_max_size(DEFAULT_HEADER_TABLE_SIZE)
    }

    /// Creates an `HpackDecoder` whose dynamic table is bounded by
    /// `max_size` octets. Size updates above this limit are rejected.
    pub fn with_max_size(max_size: usize) -> Self {
        Self {
            table: DynamicTable::with_max_size(max_size),
            size_limit: max_size,
            max_header_list_size: DEFAULT_MAX_HEADER_LIST_SIZE,
            utf8_mode: UtfErrorMode::default(),
            fields: Vec::new(),
            list_size: 0,
            holder: ReprDecStateHolder::new(),
        }
    }

    /// Sets the policy applied to literal names and values that are not
    /// valid UTF-8.
    pub fn with_utf8_mode(mut self, mode: UtfErrorMode) -> Self {
        self.utf8_mode = mode;
        self
    }

    /// Bounds the accounted size (name + value + 32 per field) of one
    /// decoded header list.
    pub fn set_max_header_list_size(&mut self, max_size: usize) {
        self.max_header_list_size = max_size;
    }

    /// Current dynamic table size in accounted octets.
    pub fn table_size(&self) -> usize {
        self.table.size()
    }

    /// Number of dynamic table entries.
    pub fn table_len(&self) -> usize {
        self.table.len()
    }

    /// Decodes as much of the header block as the cursor holds.
    ///
    /// For a cursor created with [`Input::part`] the call returns
    /// `Ok(None)` once the chunk is consumed; decoding resumes with the
    /// next chunk. For a cursor created with [`Input::last`] the call
    /// terminates the block: it returns the decoded fields, or
    /// [`HpackError::Truncated`] if the block ended mid-instruction.
    ///
    /// Any error poisons the block; the decoder must not be fed further
    /// input afterwards.
    pub fn decode(&mut self, input: &mut Input<'_>) -> Result<Option<Vec<HpackHeader>>, HpackError> {
        let mut decoder = ReprDecoder::new(input);
        decoder.load(&mut self.holder);
        loop {
            match decoder.decode()? {
                // Table and field list are updated after every
                // instruction, in wire order.
                Some(repr) => self.apply(repr)?,
                // The chunk is exhausted; save the intermediate state.
                None => {
                    decoder.save(&mut self.holder);
                    break;
                }
            }
        }
        if input.is_part() {
            return Ok(None);
        }
        if !self.holder.is_empty() {
            return Err(HpackError::Truncated);
        }
        self.list_size = 0;
        Ok(Some(take(&mut self.fields)))
    }

    fn apply(&mut self, repr: Representation) -> Result<(), HpackError> {
        match repr {
            Representation::Indexed { index } => {
                let searcher = TableSearcher::new(&self.table);
                let field = searcher
                    .field(index)
                    .ok_or(HpackError::InvalidIndex(index))?;
                self.push_field(field)
            }
            Representation::LiteralWithIndexing { name, value } => {
                let field = self.literal_field(name, value)?;
                self.table.add(field.clone());
                self.push_field(field)
            }
            Representation::LiteralWithoutIndexing { name, value }
            | Representation::LiteralNeverIndexed { name, value } => {
                let field = self.literal_field(name, value)?;
                self.push_field(field)
            }
            Representation::SizeUpdate { max_size } => {
                if max_size > self.size_limit {
                    return Err(HpackError::InvalidSizeUpdate(max_size));
                }
                self.table.set_max_size(max_size);
                Ok(())
            }
        }
    }

    fn literal_field(&self, name: Name, value: Vec<u8>) -> Result<HpackHeader, HpackError> {
        let name = match name {
            Name::Index(index) => TableSearcher::new(&self.table)
                .field_name(index)
                .ok_or(HpackError::InvalidIndex(index))?,
            Name::Literal(octets) => decode_string(&octets, self.utf8_mode)?,
        };
        let value = decode_string(&value, self.utf8_mode)?;
        Ok(HpackHeader::new(name, value))
    }

    fn push_field(&mut self, field: HpackHeader) -> Result<(), HpackError> {
        self.list_size += field.table_size();
        if self.list_size > self.max_header_list_size {
            return Err(HpackError::HeaderListOverflow);
        }
        self.fields.push(field);
        Ok(())
    }
}

impl Default for HpackDecoder {
    fn default() -> Self {
        Self::new()
    }
}
