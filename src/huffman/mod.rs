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

//! [Huffman coding] for HPACK string literals.
//!
//! [RFC 7541] defines a fixed canonical Huffman code over 257 symbols: the
//! 256 byte values plus an EOS symbol. The code was generated from
//! statistics over a large sample of HTTP headers, with codes aligned most
//! significant bit first within each octet.
//!
//! The encoder concatenates the code of every input byte and pads the
//! final octet with 1-bits (a prefix of the EOS code). The decoder walks
//! the code tree bit by bit and emits a byte every time a code resolves;
//! it accepts an all-ones partial code shorter than one octet as padding
//! and rejects everything else, including an explicitly encoded EOS.
//!
//! [Huffman coding]: https://en.wikipedia.org/wiki/Huffman_coding
//! [RFC 7541]: https://www.rfc-editor.org/rfc/rfc7541.html#appendix-B

mod consts;

use consts::{decode_tree, Node, EOS, HUFFMAN_TABLE};

use crate::error::HpackError;

/// Huffman-encodes `src`, appending the code bits to `dst`. The final
/// partial octet, if any, is padded with 1-bits.
pub(crate) fn huffman_encode(src: &[u8], dst: &mut Vec<u8>) {
    // Codes are at most 30 bits and at most 7 bits are pending between
    // bytes, so a 64-bit accumulator never overflows.
    let mut state = 0u64;
    let mut pending = 0u8;

    for &byte in src {
        let (nbits, code) = HUFFMAN_TABLE[byte as usize];
        state = (state << nbits) | code as u64;
        pending += nbits;
        while pending >= 8 {
            pending -= 8;
            dst.push((state >> pending) as u8);
        }
    }

    if pending > 0 {
        state <<= 8 - pending;
        state |= (1u64 << (8 - pending)) - 1;
        dst.push(state as u8);
    }
}

/// Incremental Huffman decoder.
///
/// The input string may be split into arbitrary fragments and passed to
/// [`decode`] one by one; [`finish`] validates the padding and returns the
/// decoded bytes.
///
/// [`decode`]: HuffmanDecoder::decode
/// [`finish`]: HuffmanDecoder::finish
#[derive(Clone)]
pub(crate) struct HuffmanDecoder {
    /// Current tree node; 0 is the root.
    at: u16,
    /// Every bit since the last emitted symbol was a 1-bit.
    ones: bool,
    /// Bits consumed since the last emitted symbol.
    depth: u8,
    out: Vec<u8>,
}

impl HuffmanDecoder {
    /// Creates a new, empty `HuffmanDecoder`.
    pub(crate) fn new() -> Self {
        Self {
            at: 0,
            ones: true,
            depth: 0,
            out: Vec::new(),
        }
    }

    /// Consumes one input fragment.
    pub(crate) fn decode(&mut self, src: &[u8]) -> Result<(), HpackError> {
        let tree = decode_tree();
        for &byte in src {
            for pos in (0..8).rev() {
                let one = (byte >> pos) & 1 == 1;
                let next = match tree[self.at as usize] {
                    Node::Branch { zero, one: o } => {
                        if one {
                            o
                        } else {
                            zero
                        }
                    }
                    Node::Leaf { .. } => unreachable!("cursor rests on branches"),
                };
                if next == 0 {
                    return Err(HpackError::MalformedHuffman);
                }
                match tree[next as usize] {
                    Node::Leaf { symbol } => {
                        // RFC 7541-5.2: a decoded EOS is a coding error.
                        if symbol == EOS {
                            return Err(HpackError::MalformedHuffman);
                        }
                        self.out.push(symbol as u8);
                        self.at = 0;
                        self.ones = true;
                        self.depth = 0;
                    }
                    Node::Branch { .. } => {
                        self.at = next;
                        self.ones &= one;
                        self.depth = self.depth.saturating_add(1);
                    }
                }
            }
        }
        Ok(())
    }

    /// Ends the string. A partial code is accepted only as padding: all
    /// 1-bits and strictly shorter than one octet.
    pub(crate) fn finish(self) -> Result<Vec<u8>, HpackError> {
        if self.at != 0 && !(self.ones && self.depth < 8) {
            return Err(HpackError::MalformedHuffman);
        }
        Ok(self.out)
    }
}
