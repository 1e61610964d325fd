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

    flags.rs

    Defines common bitflags
*/

use crate::SECTOR_COUNT;
use bitflags::bitflags;

bitflags! {
    /// The set of sectors on a track whose checksum verified when the track was decoded.
    #[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    #[rustfmt::skip]
    pub struct SectorValidity: u8 {
        #[doc = "Sector 0 checksum verified"]
        const SECTOR_0 = 0b0000_0001;
        #[doc = "Sector 1 checksum verified"]
        const SECTOR_1 = 0b0000_0010;
        #[doc = "Sector 2 checksum verified"]
        const SECTOR_2 = 0b0000_0100;
        #[doc = "Sector 3 checksum verified"]
        const SECTOR_3 = 0b0000_1000;
        #[doc = "Sector 4 checksum verified"]
        const SECTOR_4 = 0b0001_0000;
        #[doc = "Sector 5 checksum verified"]
        const SECTOR_5 = 0b0010_0000;
    }
}

impl SectorValidity {
    /// Return the flag for the sector at `index`. Indices beyond the track's sector
    /// count produce an empty set.
    pub fn sector(index: usize) -> SectorValidity {
        if index < SECTOR_COUNT {
            SectorValidity::from_bits_truncate(1 << index)
        }
        else {
            SectorValidity::empty()
        }
    }

    #[inline]
    pub fn is_valid(&self, index: usize) -> bool {
        index < SECTOR_COUNT && self.contains(SectorValidity::sector(index))
    }

    pub fn set_valid(&mut self, index: usize) {
        self.insert(SectorValidity::sector(index));
    }

    /// Return the number of sectors marked valid.
    pub fn valid_count(&self) -> usize {
        self.bits().count_ones() as usize
    }

    /// Pack the set into the representation persisted in a track header.
    pub fn to_map(&self) -> u32 {
        self.bits() as u32
    }

    /// Unpack a persisted validity map. Bits for sectors that do not exist are discarded.
    pub fn from_map(map: u32) -> SectorValidity {
        SectorValidity::from_bits_truncate((map & 0xFF) as u8)
    }

    /// Iterate over the indices of valid sectors, in ascending order.
    pub fn valid_sectors(&self) -> impl Iterator<Item = usize> + '_ {
        (0..SECTOR_COUNT).filter(move |&i| self.is_valid(i))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sector_flags() {
        let mut v = SectorValidity::empty();
        v.set_valid(0);
        v.set_valid(5);
        assert!(v.is_valid(0));
        assert!(!v.is_valid(1));
        assert!(v.is_valid(5));
        assert_eq!(v.valid_count(), 2);
        assert_eq!(v.valid_sectors().collect::<Vec<_>>(), vec![0, 5]);

        // Out of range sectors are never valid.
        v.set_valid(6);
        assert!(!v.is_valid(6));
        assert_eq!(v, SectorValidity::SECTOR_0 | SectorValidity::SECTOR_5);
    }

    #[test]
    fn test_validity_map() {
        assert_eq!(SectorValidity::all().to_map(), 0x3F);
        assert_eq!(SectorValidity::from_map(0x3F), SectorValidity::all());
        assert_eq!(SectorValidity::from_map(0xFFFF_FFC0), SectorValidity::empty());

        for map in 0..64u32 {
            assert_eq!(SectorValidity::from_map(map).to_map(), map);
        }
    }
}
