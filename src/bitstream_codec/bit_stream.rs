/*
    FluxFox
    https://github.com/dbalsom/fluxfox

    Copyright 2024 Daniel Balsom

    Permission is hereby granted, free of charge, to any person obtaining a
    copy of this software and associated documentation files (the “Software”),
    to deal in the Software without restriction, including without limitation
    the rights to use, copy, modify, merge, publish, distribute, sublicense,
    and/or sell copies of the Software, and to permit persons to whom the
    Software is furnished to do so, subject to the following conditions:

    The above copyright notice and this permission notice shall be included in
    all copies or substantial portions of the Software.

    THE SOFTWARE IS PROVIDED “AS IS”, WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
    IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
    FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE
    AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
    LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING
    FROM, OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER
    DEALINGS IN THE SOFTWARE.

    --------------------------------------------------------------------------
*/

//! A [BitStream] reads the bitcells of a track as a continuous stream. A disk
//! track is a topological ring, and a sync mark may lie anywhere on it - including
//! across the index. A [BitStream] therefore keeps reading past the end of the
//! track, wrapping to the beginning, for a configurable number of revolutions
//! before reporting exhaustion.

use crate::bitstream_codec::BitStreamReader;
use bit_vec::BitVec;

/// The default number of revolutions to read before a [BitStream] is exhausted. Two revolutions
/// guarantee that a full track's worth of data is seen contiguously regardless of where the
/// sync mark lies relative to the index.
pub const DEFAULT_REVOLUTIONS: usize = 2;

/// A [BitStream] is a [BitStreamReader] over a track represented as a [BitVec] from the bit_vec
/// crate (not to be confused with the bitvec crate).
#[derive(Clone)]
pub struct BitStream {
    bits: BitVec,
    revolutions: usize,
    cursor: usize,
    word: u32,
}

/// Produce a [BitStream] from a [BitVec].
impl From<BitVec> for BitStream {
    fn from(bits: BitVec) -> BitStream {
        BitStream {
            bits,
            revolutions: DEFAULT_REVOLUTIONS,
            cursor: 0,
            word: 0,
        }
    }
}

/// Produce a [BitStream] from a byte slice.
impl From<&[u8]> for BitStream {
    fn from(bytes: &[u8]) -> BitStream {
        BitStream::from(BitVec::from_bytes(bytes))
    }
}

impl BitStream {
    /// Create a new [BitStream] over `bits`, reading [DEFAULT_REVOLUTIONS] revolutions.
    pub fn new(bits: BitVec) -> BitStream {
        BitStream::from(bits)
    }

    /// Create a new [BitStream] from a byte slice. Every byte contributes 8 bitcells, MSB first.
    pub fn from_bytes(bytes: &[u8]) -> BitStream {
        BitStream::from(bytes)
    }

    /// Set the number of revolutions of the track to read before the stream is exhausted.
    pub fn with_revolutions(mut self, revolutions: usize) -> BitStream {
        self.revolutions = revolutions;
        self
    }

    /// Return the total number of bitcells this stream will produce.
    #[inline]
    pub fn stream_len(&self) -> usize {
        self.bits.len() * self.revolutions
    }

    /// Return the number of bitcells read so far.
    #[inline]
    pub fn bits_read(&self) -> usize {
        self.cursor
    }

    /// Return a bool indicating if all bitcells of the stream have been read.
    #[inline]
    pub fn is_exhausted(&self) -> bool {
        self.cursor >= self.stream_len()
    }

    /// Return a reference to the underlying [BitVec] representation.
    #[inline]
    pub fn bits(&self) -> &BitVec {
        &self.bits
    }

    /// Rewind the stream to the index.
    pub fn rewind(&mut self) {
        self.cursor = 0;
        self.word = 0;
    }
}

impl BitStreamReader for BitStream {
    fn next_bit(&mut self) -> Option<bool> {
        if self.is_exhausted() {
            return None;
        }
        let bit = self.bits[self.cursor % self.bits.len()];
        self.cursor += 1;
        self.word = (self.word << 1) | bit as u32;
        Some(bit)
    }

    fn word(&self) -> u32 {
        self.word
    }

    fn index_offset(&self) -> usize {
        if self.bits.is_empty() {
            0
        }
        else {
            self.cursor.saturating_sub(1) % self.bits.len()
        }
    }

    fn track_len(&self) -> usize {
        self.bits.len()
    }
}
