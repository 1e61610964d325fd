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

    src/types/header.rs

    Track header metadata persisted alongside decoded sector data.
*/

use crate::{types::flags::SectorValidity, LemfoxError, SECTOR_COUNT, SECTOR_SIZE, TRACK_DATA_SIZE};
use binrw::{binrw, BinRead, BinWrite};
use std::io::Cursor;

/// The length in bitcells of a double-density track at 300RPM with 2us bitcells, with a little
/// slack for drive speed variation.
pub const DEFAULT_TRACK_BITS: u32 = 100_150;

/// Metadata describing a decoded track.
///
/// The header is produced by [decode_track](crate::decode_track) and consumed by
/// [encode_track](crate::encode_track). The validity map is stored here rather than being
/// derived from sector data, as an invalid sector's contents are indistinguishable from
/// valid data.
#[binrw]
#[brw(big, magic = b"LTRK")]
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TrackHeader {
    /// Bit offset from the index of the first bit of the track sync mark.
    pub data_bitoff: u32,
    /// Length of the track in bitcells.
    pub total_bits: u32,
    pub bytes_per_sector: u16,
    pub nr_sectors: u16,
    /// Total length of decoded track data in bytes.
    pub len: u32,
    #[br(map = |map: u32| SectorValidity::from_map(map))]
    #[bw(map = |valid: &SectorValidity| valid.to_map())]
    pub valid_sectors: SectorValidity,
}

impl Default for TrackHeader {
    fn default() -> Self {
        TrackHeader::new(DEFAULT_TRACK_BITS)
    }
}

impl TrackHeader {
    /// Create an empty header for a track of `total_bits` bitcells.
    pub fn new(total_bits: u32) -> Self {
        TrackHeader {
            data_bitoff: 0,
            total_bits,
            bytes_per_sector: 0,
            nr_sectors: 0,
            len: 0,
            valid_sectors: SectorValidity::empty(),
        }
    }

    /// Fill in the track geometry and the validity map once at least one sector has been
    /// recovered.
    pub(crate) fn finalize(&mut self, valid_sectors: SectorValidity) {
        self.bytes_per_sector = SECTOR_SIZE as u16;
        self.nr_sectors = SECTOR_COUNT as u16;
        self.len = TRACK_DATA_SIZE as u32;
        self.valid_sectors = valid_sectors;
    }

    /// Read a header from its persisted binary representation.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, LemfoxError> {
        let mut cursor = Cursor::new(bytes);
        let header = TrackHeader::read(&mut cursor)?;
        log::trace!("TrackHeader::from_bytes(): read {:?}", header);
        Ok(header)
    }

    /// Produce the persisted binary representation of this header.
    pub fn to_bytes(&self) -> Result<Vec<u8>, LemfoxError> {
        let mut cursor = Cursor::new(Vec::new());
        self.write(&mut cursor)?;
        Ok(cursor.into_inner())
    }
}
