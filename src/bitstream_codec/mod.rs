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

    src/bitstream_codec/mod.rs

    Interfaces between the track codec and the bitstream it reads from or
    writes to.
*/

pub mod bit_stream;
pub mod track_buffer;

/// The nominal bitcell timing, expressed as a fraction of 1000. A value of 1000 is a standard
/// 2us bitcell.
pub const DEFAULT_SPEED: u16 = 1000;

/// A [BitTag] describes how the bits passed to [TrackBufferWriter::bits] are to be rendered
/// into bitcells.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, strum::EnumIter, strum::Display)]
pub enum BitTag {
    /// Bits are raw bitcells and are written as-is. Used for sync marks, which deliberately
    /// violate MFM clocking rules.
    Raw,
    /// Every bit is a data bit, and is MFM encoded.
    All,
    /// Only the bits at odd bit positions (mask 0xAAAA) are MFM encoded.
    Even,
    /// Only the bits at even bit positions (mask 0x5555) are MFM encoded.
    Odd,
}

impl BitTag {
    /// Return the number of bitcells produced by writing `count` bits with this tag.
    pub const fn cell_count(&self, count: u32) -> usize {
        match self {
            BitTag::Raw => count as usize,
            BitTag::All => count as usize * 2,
            BitTag::Even | BitTag::Odd => count as usize,
        }
    }
}

/// A [BitStreamReader] produces the bitcells of a track one at a time, maintaining a shift
/// register of the most recently read bits.
pub trait BitStreamReader {
    /// Read the next bitcell. Returns `None` once the stream is exhausted.
    fn next_bit(&mut self) -> Option<bool>;

    /// Read the next `count` bitcells (up to 32), returning them MSB first. Returns `None` if the
    /// stream was exhausted before `count` bits could be read.
    fn next_bits(&mut self, count: u32) -> Option<u32> {
        debug_assert!(count <= 32);
        for _ in 0..count {
            self.next_bit()?;
        }
        if count >= 32 {
            Some(self.word())
        }
        else {
            Some(self.word() & ((1u32 << count) - 1))
        }
    }

    /// Return the shift register holding the last 32 bits read, with the most recent bit in the
    /// LSB.
    fn word(&self) -> u32;

    /// Return the index-relative bit offset of the most recently read bit.
    fn index_offset(&self) -> usize;

    /// Return the length of the underlying track in bitcells.
    fn track_len(&self) -> usize;
}

/// A [TrackBufferWriter] accepts a sequence of bit emissions and renders them into track
/// bitcells, starting at a specified offset from the index.
pub trait TrackBufferWriter {
    /// Reset the writer to produce a track of `len` bitcells, with the first emitted bitcell
    /// placed `start` bitcells after the index.
    fn init(&mut self, start: usize, len: usize);

    /// Emit the low `count` bits of `value` (up to 32), MSB first, rendered according to `tag`
    /// at the bitcell timing `speed`.
    fn bits(&mut self, speed: u16, tag: BitTag, count: u32, value: u32);

    /// Complete the track. Any bitcells not written are filled.
    fn finalize(&mut self);
}
