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

//! `ylong_hpack` is an incremental implementation of [HPACK], the header
//! compression format of the [HTTP/2 protocol].
//!
//! [HPACK]: https://httpwg.org/specs/rfc7541.html
//! [HTTP/2 protocol]: https://httpwg.org/specs/rfc9113.html
//!
//! Header blocks rarely arrive in one piece: they are spread over HEADERS
//! and CONTINUATION frames, which in turn are spread over partial TCP
//! reads. Everything in this crate is therefore built to stop and resume
//! at any byte boundary without blocking a thread. Decoding and encoding
//! operate over the cursors in [`io`]; when a cursor runs out of bytes or
//! space, the in-flight work is kept as a plain state value and picked up
//! again with the next chunk or buffer.
//!
//! - [`HpackDecoder`] turns encoded header blocks into [`HpackHeader`]
//!   lists while maintaining the dynamic table for its connection
//!   direction.
//! - [`HpackEncoder`] does the reverse over its own dynamic table,
//!   mutated in lockstep with the octets it emits.
//! - [`utf8`] controls what happens to literal strings that are not valid
//!   UTF-8.

pub mod error;
pub mod hpack;
pub mod io;
pub mod utf8;

mod huffman;

pub(crate) mod util;

pub use crate::error::HpackError;
pub use crate::hpack::{HpackDecoder, HpackEncoder, HpackHeader};
