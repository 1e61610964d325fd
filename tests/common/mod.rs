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

    tests/common/mod.rs

    Common support routines for tests
*/
#![allow(dead_code)]

use bit_vec::BitVec;
use lemfox::{
    prelude::*,
    track_schema::lemmings::{SECTOR_SPAN_WORDS, SYNC_BITS, WORD_CELLS},
};
use rand::{rngs::StdRng, Rng, SeedableRng};

pub fn init() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Produce a block of pseudo-random sector data.
pub fn random_block(seed: u64) -> SectorBlock {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut bytes = vec![0u8; TRACK_DATA_SIZE];
    rng.fill(&mut bytes[..]);
    SectorBlock::from_bytes(&bytes).unwrap()
}

/// Encode `block` into the bitcells of a standard length track with its sync mark at
/// `data_bitoff`.
pub fn encode_bits(block: &SectorBlock, valid: SectorValidity, data_bitoff: u32) -> BitVec {
    let mut header = TrackHeader::new(DEFAULT_TRACK_BITS);
    header.data_bitoff = data_bitoff;
    header.valid_sectors = valid;

    let mut tbuf = TrackBuffer::default();
    encode_track(&header, block, &mut tbuf);
    assert_eq!(tbuf.overflow(), 0);
    tbuf.into_bits()
}

/// Flip the first data bitcell of a data word of `sector`, for a track encoded with its sync
/// mark at `data_bitoff`.
pub fn corrupt_sector(bits: &mut BitVec, data_bitoff: usize, sector: usize) {
    let word_index = sector * SECTOR_SPAN_WORDS + 1 + 100;
    let cell = (data_bitoff + SYNC_BITS + word_index * WORD_CELLS + 1) % bits.len();
    let bit = bits[cell];
    bits.set(cell, !bit);
}

/// Append the bits of `other` to `bits`.
pub fn concat_bits(mut bits: BitVec, other: &BitVec) -> BitVec {
    bits.extend(other.iter());
    bits
}
