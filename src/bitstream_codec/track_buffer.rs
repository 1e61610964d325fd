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

    src/bitstream_codec/track_buffer.rs

    Implements a TrackBufferWriter that renders bit emissions into MFM
    bitcells stored in a BitVec.
*/

use crate::{
    bitstream_codec::{bit_stream::BitStream, BitTag, TrackBufferWriter, DEFAULT_SPEED},
    track_schema::meta_encoding::odd_even::odd_even_deinterleave,
};
use bit_vec::BitVec;

/// A [TrackBuffer] collects MFM bitcells for a single track, along with the timing of each
/// bitcell.
///
/// Bitcells are written sequentially starting from the offset given to
/// [init](TrackBufferWriter::init), wrapping around the index. MFM clock bits are generated
/// from the previous bitcell written, so emissions of different [BitTag]s may be freely mixed.
#[derive(Clone)]
pub struct TrackBuffer {
    bits: BitVec,
    speeds: Vec<u16>,
    start: usize,
    cursor: usize,
    prev_bit: bool,
    overflow: usize,
    finalized: bool,
}

impl Default for TrackBuffer {
    fn default() -> Self {
        TrackBuffer::new(0, 0)
    }
}

impl TrackBuffer {
    pub fn new(start: usize, len: usize) -> TrackBuffer {
        let mut tbuf = TrackBuffer {
            bits: BitVec::new(),
            speeds: Vec::new(),
            start: 0,
            cursor: 0,
            prev_bit: false,
            overflow: 0,
            finalized: false,
        };
        tbuf.init(start, len);
        tbuf
    }

    /// Return the length of the track in bitcells.
    #[inline]
    pub fn len(&self) -> usize {
        self.bits.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bits.is_empty()
    }

    /// Return the number of bitcells written since [init](TrackBufferWriter::init), not
    /// including any gap filled by [finalize](TrackBufferWriter::finalize).
    #[inline]
    pub fn cells_written(&self) -> usize {
        self.cursor
    }

    /// Return the number of bitcells that were discarded because the track was full.
    #[inline]
    pub fn overflow(&self) -> usize {
        self.overflow
    }

    #[inline]
    pub fn is_finalized(&self) -> bool {
        self.finalized
    }

    /// Return a reference to the track bitcells as a [BitVec].
    #[inline]
    pub fn bit_vec(&self) -> &BitVec {
        &self.bits
    }

    /// Consume the [TrackBuffer], returning the track bitcells.
    pub fn into_bits(self) -> BitVec {
        self.bits
    }

    /// Return the timing of each bitcell.
    #[inline]
    pub fn speeds(&self) -> &[u16] {
        &self.speeds
    }

    /// Return a [BitStream] that reads back the contents of this track.
    pub fn to_stream(&self) -> BitStream {
        BitStream::new(self.bits.clone())
    }

    fn push_cell(&mut self, bit: bool, speed: u16) {
        let len = self.bits.len();
        if self.cursor >= len {
            if self.overflow == 0 {
                log::warn!(
                    "TrackBuffer::push_cell(): Track of {} bitcells is full, discarding further bits",
                    len
                );
            }
            self.overflow += 1;
            return;
        }
        let index = (self.start + self.cursor) % len;
        self.bits.set(index, bit);
        self.speeds[index] = speed;
        self.cursor += 1;
        self.prev_bit = bit;
    }

    /// MFM encode a single data bit. The clock bit is set only between two zero data bits.
    fn push_data_bit(&mut self, bit: bool, speed: u16) {
        let clock = !(self.prev_bit || bit);
        self.push_cell(clock, speed);
        self.push_cell(bit, speed);
    }
}

impl TrackBufferWriter for TrackBuffer {
    fn init(&mut self, start: usize, len: usize) {
        self.bits = BitVec::from_elem(len, false);
        self.speeds = vec![DEFAULT_SPEED; len];
        self.start = if len > 0 { start % len } else { 0 };
        self.cursor = 0;
        self.prev_bit = false;
        self.overflow = 0;
        self.finalized = false;
    }

    fn bits(&mut self, speed: u16, tag: BitTag, count: u32, value: u32) {
        debug_assert!(count <= 32);
        match tag {
            BitTag::Raw => {
                for i in (0..count).rev() {
                    self.push_cell((value >> i) & 1 != 0, speed);
                }
            }
            BitTag::All => {
                for i in (0..count).rev() {
                    self.push_data_bit((value >> i) & 1 != 0, speed);
                }
            }
            BitTag::Even | BitTag::Odd => {
                let (even_plane, odd_plane) = odd_even_deinterleave(value);
                let plane = if tag == BitTag::Even { even_plane } else { odd_plane };
                for i in (0..count / 2).rev() {
                    self.push_data_bit((plane >> i) & 1 != 0, speed);
                }
            }
        }
    }

    fn finalize(&mut self) {
        let len = self.bits.len();
        if self.overflow > 0 {
            log::warn!(
                "TrackBuffer::finalize(): {} bitcells did not fit on a track of {} bitcells",
                self.overflow,
                len
            );
        }

        // Fill the remainder of the track with MFM-encoded zeros.
        let gap = len.saturating_sub(self.cursor);
        log::trace!("TrackBuffer::finalize(): filling {} bitcells of gap", gap);
        while self.cursor + 2 <= len {
            self.push_data_bit(false, DEFAULT_SPEED);
        }
        if self.cursor < len {
            let clock = !self.prev_bit;
            self.push_cell(clock, DEFAULT_SPEED);
        }
        self.finalized = true;
    }
}
