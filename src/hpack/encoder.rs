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
use crate::hpack::representation::{ReprEncStateHolder, ReprEncoder};
use crate::hpack::table::{DynamicTable, HpackHeader};
use crate::io::Output;

/// Encoder half of [HPACK].
///
/// [HPACK]: https://httpwg.org/specs/rfc7541.html
///
/// An encoder owns the dynamic table for one direction of a connection,
/// mirroring the table the peer's decoder maintains: every representation
/// that reaches the wire mutates both in lockstep, so a decoder fed this
/// encoder's output reconstructs an identical table.
///
/// Representation policy: an exact (name, value) match in the combined
/// table space becomes an indexed field; a name-only match becomes a
/// name-indexed literal with incremental indexing; everything else becomes
/// a new-name literal with incremental indexing. String literals are
/// Huffman coded whenever the encoder was built with `use_huffman`.
///
/// Output may be produced into a sequence of partial buffers: encode into
/// buffers wrapped by [`Output::part`] until [`is_finished`] reports true,
/// or use a single [`Output::last`] buffer and let the encoder fail with
/// [`HpackError::OutputTruncated`] if the block does not fit.
///
/// [`is_finished`]: HpackEncoder::is_finished
pub struct HpackEncoder {
    table: DynamicTable,
    holder: ReprEncStateHolder,
    use_huffman: bool,
    /// Size limits changed since the last block: the smallest one and the
    /// most recent one (RFC 7541 Section 4.2 requires signalling both).
    pending_updates: Option<(usize, usize)>,
}

impl HpackEncoder {
    /// Creates an `HpackEncoder` with the given dynamic table limit and
    /// Huffman policy.
    pub fn new(max_size: usize, use_huffman: bool) -> Self {
        Self {
            table: DynamicTable::with_max_size(max_size),
            holder: ReprEncStateHolder::new(),
            use_huffman,
            pending_updates: None,
        }
    }

    /// Changes the dynamic table size limit. Eviction applies immediately;
    /// the corresponding size update instruction is written at the start
    /// of the next block.
    pub fn update_max_size(&mut self, max_size: usize) {
        self.table.set_max_size(max_size);
        self.pending_updates = match self.pending_updates {
            None => Some((max_size, max_size)),
            Some((min, _)) => Some((min.min(max_size), max_size)),
        };
    }

    /// Queues one header block. The previous block must be finished.
    pub fn set_block(&mut self, fields: Vec<HpackHeader>) {
        let updates = match self.pending_updates.take() {
            None => Vec::new(),
            Some((min, last)) if min == last => vec![last],
            Some((min, last)) => vec![min, last],
        };
        self.holder.set_block(updates, fields);
    }

    /// Writes as much of the queued block as fits into `output`.
    ///
    /// For a cursor created with [`Output::part`] a full buffer suspends
    /// the block; encoding resumes into the next buffer. For a cursor
    /// created with [`Output::last`] running out of space is
    /// [`HpackError::OutputTruncated`].
    pub fn encode(&mut self, output: &mut Output<'_>) -> Result<(), HpackError> {
        let mut encoder = ReprEncoder::new(&mut self.table);
        encoder.load(&mut self.holder);
        encoder.encode(output, self.use_huffman);
        encoder.save(&mut self.holder);
        if !self.holder.is_empty() && !output.is_part() {
            return Err(HpackError::OutputTruncated);
        }
        Ok(())
    }

    /// Checks whether the queued block has been written out completely.
    pub fn is_finished(&self) -> bool {
        self.holder.is_empty()
    }

    /// Current dynamic table size in accounted octets.
    pub fn table_size(&self) -> usize {
        self.table.size()
    }

    /// Number of dynamic table entries.
    pub fn table_len(&self) -> usize {
        self.table.len()
    }
}
