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

//! Incremental I/O primitives.
//!
//! A header block usually arrives as a sequence of partial reads, and the
//! encoded form of a block may have to be written into a sequence of
//! partial buffers. This module provides the two pieces the codec is built
//! on:
//!
//! - [`Input`] and [`Output`], non-blocking cursors over one borrowed chunk
//!   of a byte stream. A cursor is owned by a decoding or encoding call for
//!   the duration of that call and is never retained afterwards. Its
//!   `is_part` flag declares whether exhaustion means "pause and wait for
//!   the next chunk" or "the stream is complete".
//! - [`DecodeStep`], the result of one decoding step. A step consumes what
//!   the cursor has and either completes with a value, suspends into a
//!   plain state value that resumes the work against a later chunk, or
//!   fails. Suspended states are ordinary values: they can be stored in a
//!   holder and cloned to branch a decode mid-stream.
//!
//! Nothing here blocks. A caller drives the codec by repeatedly supplying
//! fresh cursors; suspension happens exactly when a cursor leaves its
//! "continue" state.

mod input;
mod output;

pub use input::{Input, InputState};
pub use output::{Output, OutputState};

use crate::error::HpackError;

/// Outcome of a single decoding step.
#[derive(Clone)]
pub enum DecodeStep<D, S> {
    /// The step produced a complete `D`.
    Complete(D),

    /// The cursor ran dry before an item completed; `S` resumes the work
    /// when more input arrives.
    Suspend(S),

    /// The step failed. Terminal: the suspended work is gone and the
    /// stream must be abandoned.
    Failed(HpackError),
}

impl<D, S> DecodeStep<D, S> {
    /// Returns `true` if the step completed.
    pub fn is_complete(&self) -> bool {
        matches!(self, Self::Complete(_))
    }

    /// Returns `true` if the step suspended waiting for input.
    pub fn is_suspend(&self) -> bool {
        matches!(self, Self::Suspend(_))
    }

    /// Returns `true` if the step failed.
    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed(_))
    }

    /// Returns the bound result if the step completed.
    pub fn bind(self) -> Option<D> {
        match self {
            Self::Complete(value) => Some(value),
            _ => None,
        }
    }

    /// Returns the trapped failure if the step failed.
    pub fn trap(self) -> Option<HpackError> {
        match self {
            Self::Failed(error) => Some(error),
            _ => None,
        }
    }
}

impl<D, S> From<HpackError> for DecodeStep<D, S> {
    fn from(error: HpackError) -> Self {
        Self::Failed(error)
    }
}
