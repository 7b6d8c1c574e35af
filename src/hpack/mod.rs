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

//! [HPACK] header compression.
//!
//! [HPACK]: https://httpwg.org/specs/rfc7541.html
//!
//! HPACK eliminates redundant header fields from HTTP/2 header blocks
//! while keeping a strictly bounded memory footprint. A block is a
//! sequence of instructions: references into a fixed static table of 61
//! well-known fields, references into a dynamic table of recently seen
//! fields, literals (optionally inserted into the dynamic table), and
//! dynamic table size updates. The two sides of a connection direction
//! each hold one dynamic table and mutate it in lockstep, instruction by
//! instruction, which is why blocks must be processed strictly in wire
//! order and why a single decoding error is fatal for the connection.
//!
//! [`HpackDecoder`] and [`HpackEncoder`] process one block at a time over
//! the cursors in [`crate::io`], suspending whenever a cursor runs out of
//! bytes or space.

mod decoder;
mod encoder;
mod integer;
mod representation;
mod table;

pub use decoder::HpackDecoder;
pub use encoder::HpackEncoder;
pub use table::HpackHeader;
