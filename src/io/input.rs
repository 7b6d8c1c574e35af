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

/// Non-blocking read cursor over one borrowed chunk of a byte stream.
///
/// [`head`] peeks at the current byte without consuming it and [`step`]
/// consumes it. When the chunk is exhausted the cursor reports either
/// [`InputState::Pause`] (the stream continues in a later chunk) or
/// [`InputState::End`] (the stream is complete), depending on its
/// `is_part` flag.
///
/// The cursor is array-backed, so it is `Clone`: a clone is an independent
/// cursor over the same chunk, which supports backtracking.
///
/// [`head`]: Input::head
/// [`step`]: Input::step
#[derive(Clone)]
pub struct Input<'a> {
    bytes: &'a [u8],
    index: usize,
    part: bool,
}

/// Observable state of an [`Input`] cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputState {
    /// A byte is available.
    Next(u8),

    /// The chunk is exhausted but the stream continues; feed the next
    /// chunk to resume.
    Pause,

    /// The chunk is exhausted and the stream is complete.
    End,
}

impl<'a> Input<'a> {
    /// Creates a cursor over a non-final chunk: exhaustion pauses decoding.
    pub fn part(bytes: &'a [u8]) -> Self {
        Self {
            bytes,
            index: 0,
            part: true,
        }
    }

    /// Creates a cursor over the final chunk: exhaustion terminates
    /// decoding.
    pub fn last(bytes: &'a [u8]) -> Self {
        Self {
            bytes,
            index: 0,
            part: false,
        }
    }

    /// Peeks at the current byte without consuming it.
    pub fn head(&self) -> Option<u8> {
        self.bytes.get(self.index).copied()
    }

    /// Consumes and returns the current byte.
    pub fn step(&mut self) -> Option<u8> {
        let byte = self.head()?;
        self.index += 1;
        Some(byte)
    }

    /// Reports the current cursor state.
    pub fn state(&self) -> InputState {
        match self.head() {
            Some(byte) => InputState::Next(byte),
            None if self.part => InputState::Pause,
            None => InputState::End,
        }
    }

    /// Returns `true` if later chunks follow this one.
    pub fn is_part(&self) -> bool {
        self.part
    }

    /// Re-declares whether later chunks follow this one.
    pub fn set_part(&mut self, part: bool) {
        self.part = part;
    }

    /// Number of bytes consumed so far.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Returns `true` if the chunk is exhausted.
    pub fn is_empty(&self) -> bool {
        self.index >= self.bytes.len()
    }

    /// Unconsumed remainder of the chunk.
    pub fn remaining(&self) -> &'a [u8] {
        &self.bytes[self.index..]
    }

    /// Consumes up to `n` bytes and returns the consumed slice.
    pub fn take(&mut self, n: usize) -> &'a [u8] {
        let end = (self.index + n).min(self.bytes.len());
        let slice = &self.bytes[self.index..end];
        self.index = end;
        slice
    }
}

#[cfg(test)]
mod ut_input {
    use super::{Input, InputState};

    /// UT test cases for `Input`.
    ///
    /// # Brief
    /// 1. Creates an `Input` over a small chunk.
    /// 2. Peeks, steps and bulk-takes bytes.
    /// 3. Checks the reported state at each stage.
    #[test]
    fn ut_input_cursor() {
        let mut input = Input::part(&[0x82, 0x86, 0x84]);
        assert_eq!(input.head(), Some(0x82));
        assert_eq!(input.state(), InputState::Next(0x82));
        assert_eq!(input.step(), Some(0x82));
        assert_eq!(input.index(), 1);

        assert_eq!(input.take(8), &[0x86, 0x84]);
        assert!(input.is_empty());
        assert_eq!(input.state(), InputState::Pause);
        assert_eq!(input.step(), None);

        input.set_part(false);
        assert_eq!(input.state(), InputState::End);
    }

    /// UT test cases for `Input::clone`.
    ///
    /// # Brief
    /// 1. Clones a partially consumed cursor.
    /// 2. Advances the clone and checks the original is unaffected.
    #[test]
    fn ut_input_clone_is_independent() {
        let mut input = Input::last(&[1, 2, 3]);
        input.step();
        let mut branch = input.clone();
        assert_eq!(branch.step(), Some(2));
        assert_eq!(branch.step(), Some(3));
        assert_eq!(input.head(), Some(2));
        assert_eq!(input.index(), 1);
    }
}
