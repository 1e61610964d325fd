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

//! An implementation of the [TrackSchema] trait for the custom track format used
//! by *Lemmings* on the Commodore Amiga.
//!
//! A Lemmings track has a minimal layout: a single sync mark followed by six
//! sectors of 1024 bytes, stored back-to-back with no gaps and no sector headers.
//!
//! ```text
//!  u16 0x4489, u32 0x552AAAAA  :: sync mark (0x552AAAAA is 0xF000, MFM encoded)
//!  6 x {
//!      u16 checksum            :: 16-bit wrapping sum of the data words
//!      u16 data[512]
//!  }
//! ```
//!
//! Each 16-bit word is odd/even meta-encoded: the even plane and then the odd
//! plane are MFM encoded, occupying 32 bitcells per word. See
//! [odd_even](crate::track_schema::meta_encoding::odd_even).
//!
//! Despite storing 6KB of data, the lack of per-sector metadata means a Lemmings
//! track fits on a standard length track with standard 2us bitcells.
//!
//! The checksum of a sector that could not be read is deliberately inverted when
//! the track is re-encoded, so that any reader of the resynthesized track will
//! reject the sector just as it was rejected on the original media.

use crate::{
    bitstream_codec::{BitStreamReader, BitTag, TrackBufferWriter, DEFAULT_SPEED},
    track_schema::{meta_encoding::odd_even::mfm_odd_even_decode_u16, TrackSchema},
    types::{flags::SectorValidity, header::TrackHeader},
    LemfoxError,
    SECTOR_COUNT,
    SECTOR_SIZE,
    SECTOR_WORDS,
    TRACK_DATA_SIZE,
};
use std::{fmt, iter::FusedIterator};

/// The first part of the sync mark, recorded as raw bitcells.
pub const SYNC_WORD: u16 = 0x4489;
/// The second part of the sync mark, as raw bitcells.
pub const SYNC_MARK: u32 = 0x552A_AAAA;
/// The data word that MFM encodes to [SYNC_MARK] when following [SYNC_WORD].
pub const SYNC_MARK_DATA: u16 = 0xF000;
/// The total length of the sync mark in bitcells.
pub const SYNC_BITS: usize = 48;

const SYNC_PATTERN: u64 = (SYNC_WORD as u64) << 32 | SYNC_MARK as u64;
const SYNC_MASK: u64 = 0xFFFF_FFFF_FFFF;

/// The number of words in a sector on disk: a checksum word followed by the data words.
pub const SECTOR_SPAN_WORDS: usize = SECTOR_WORDS + 1;
/// The number of words following the sync mark.
pub const TRACK_SPAN_WORDS: usize = SECTOR_COUNT * SECTOR_SPAN_WORDS;
/// The number of bitcells occupied by a single encoded word.
pub const WORD_CELLS: usize = 32;
/// The number of bitcells occupied by the sync mark and all sectors.
pub const ENCODED_TRACK_BITS: usize = BitTag::Raw.cell_count(16)
    + BitTag::All.cell_count(16)
    + TRACK_SPAN_WORDS * (BitTag::Even.cell_count(16) + BitTag::Odd.cell_count(16));

/// The pattern filling sectors that could not be recovered.
pub const SENTINEL: [u8; 4] = *b"NLEM";

/// Compute the checksum of a sector: the sum of its data words, discarding overflow.
pub fn sector_checksum(words: impl IntoIterator<Item = u16>) -> u16 {
    words.into_iter().fold(0u16, |sum, word| sum.wrapping_add(word))
}

/// Iterate over the big-endian 16-bit words of a sector.
///
/// # Panics
/// Panics if `sector` is not an even number of bytes long.
pub fn sector_words(sector: &[u8]) -> impl Iterator<Item = u16> + '_ {
    bytemuck::cast_slice::<u8, [u8; 2]>(sector)
        .iter()
        .map(|pair| u16::from_be_bytes(*pair))
}

fn verify_sector(index: usize, stored: u16, body: &[u16]) -> Result<(), LemfoxError> {
    let computed = sector_checksum(body.iter().copied());
    if computed != stored {
        return Err(LemfoxError::ChecksumMismatch {
            sector: index,
            stored,
            computed,
        });
    }
    Ok(())
}

/// Convert a bit offset or length to its persisted `u32` form.
fn bit_count_u32(value: usize, what: &str) -> Result<u32, LemfoxError> {
    u32::try_from(value).map_err(|_| {
        log::error!("bit_count_u32(): {} of {} bitcells exceeds the range of a track header", what, value);
        LemfoxError::ParameterError
    })
}

/// Step `offset` back by `distance` bitcells on a track of `track_len` bitcells, wrapping
/// around the index.
fn backdate_offset(offset: usize, distance: usize, track_len: usize) -> usize {
    if track_len == 0 {
        return 0;
    }
    (offset + track_len - (distance % track_len)) % track_len
}

/// A [SectorBlock] holds the decoded data of all six sectors of a track, 1024 bytes each.
/// Data words are stored big-endian.
#[derive(Clone, PartialEq, Eq)]
pub struct SectorBlock {
    data: Vec<u8>,
}

impl Default for SectorBlock {
    fn default() -> Self {
        SectorBlock::new()
    }
}

impl fmt::Debug for SectorBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let unrecovered: Vec<usize> = (0..SECTOR_COUNT).filter(|&i| self.is_sentinel(i)).collect();
        f.debug_struct("SectorBlock")
            .field("len", &self.data.len())
            .field("unrecovered", &unrecovered)
            .finish()
    }
}

impl SectorBlock {
    /// Create a new [SectorBlock] with every sector filled with the [SENTINEL] pattern.
    pub fn new() -> Self {
        SectorBlock {
            data: SENTINEL.iter().copied().cycle().take(TRACK_DATA_SIZE).collect(),
        }
    }

    /// Create a [SectorBlock] from a buffer of exactly six sectors of data.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, LemfoxError> {
        if bytes.len() != TRACK_DATA_SIZE {
            log::error!(
                "SectorBlock::from_bytes(): Expected {} bytes of sector data, got {}",
                TRACK_DATA_SIZE,
                bytes.len()
            );
            return Err(LemfoxError::ParameterError);
        }
        Ok(SectorBlock { data: bytes.to_vec() })
    }

    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn into_inner(self) -> Vec<u8> {
        self.data
    }

    /// Return the data of the sector at `index`, or `None` if there is no such sector.
    pub fn sector(&self, index: usize) -> Option<&[u8]> {
        self.data.get(index * SECTOR_SIZE..(index + 1) * SECTOR_SIZE)
    }

    /// Iterate over the data of each sector in order.
    pub fn sectors(&self) -> impl Iterator<Item = &[u8]> {
        self.data.chunks_exact(SECTOR_SIZE)
    }

    /// Return a bool indicating if the sector at `index` holds nothing but the [SENTINEL]
    /// pattern, as it would if it was never recovered.
    pub fn is_sentinel(&self, index: usize) -> bool {
        self.sector(index)
            .map(|sector| sector.chunks_exact(SENTINEL.len()).all(|chunk| chunk == SENTINEL))
            .unwrap_or(false)
    }

    fn write_sector(&mut self, index: usize, words: &[u16]) {
        let range = index * SECTOR_SIZE..(index + 1) * SECTOR_SIZE;
        for (pair, word) in self.data[range].chunks_exact_mut(2).zip(words) {
            pair.copy_from_slice(&word.to_be_bytes());
        }
    }
}

/// A decoded Lemmings track.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LemmingsTrack {
    pub header: TrackHeader,
    pub data: SectorBlock,
}

/// The demodulated contents of a track following one occurrence of the sync mark.
#[derive(Clone, Debug)]
pub struct SyncSpan {
    /// Index-relative bit offset of the first bitcell of the sync mark.
    pub data_bitoff: usize,
    /// The [TRACK_SPAN_WORDS] decoded words following the sync mark.
    pub words: Vec<u16>,
}

impl SyncSpan {
    /// Iterate over the `(stored checksum, data words)` of each sector in the span.
    pub fn sectors(&self) -> impl Iterator<Item = (u16, &[u16])> {
        self.words
            .chunks_exact(SECTOR_SPAN_WORDS)
            .map(|sector| (sector[0], &sector[1..]))
    }
}

/// A [SyncScanner] is an iterator over every occurrence of the sync mark in a bit stream,
/// yielding the demodulated [SyncSpan] that follows each one.
///
/// The stream is scanned one bitcell at a time through a 48-bit window, so every bit position
/// is tested - including positions inside a sync word candidate that turned out not to be
/// followed by the rest of the mark. Once the stream is exhausted, the scanner is exhausted
/// for good.
pub struct SyncScanner<'a, S: BitStreamReader + ?Sized> {
    stream: &'a mut S,
    window: u64,
    window_bits: usize,
    mismatches: usize,
    exhausted: bool,
}

impl<'a, S: BitStreamReader + ?Sized> SyncScanner<'a, S> {
    pub fn new(stream: &'a mut S) -> Self {
        SyncScanner {
            stream,
            window: 0,
            window_bits: 0,
            mismatches: 0,
            exhausted: false,
        }
    }

    /// Return the number of sync word candidates that were not followed by the rest of the
    /// sync mark.
    pub fn mismatches(&self) -> usize {
        self.mismatches
    }

    pub fn is_exhausted(&self) -> bool {
        self.exhausted
    }

    /// Test the window for a sync mark. Returns `None` if the window does not start with a sync
    /// word, otherwise the bit offset of the mark or a [LemfoxError::SyncMismatch].
    fn match_sync(&self) -> Option<Result<usize, LemfoxError>> {
        if self.window_bits < SYNC_BITS || (self.window >> 32) as u16 != SYNC_WORD {
            return None;
        }
        let mark_offset = backdate_offset(self.stream.index_offset(), SYNC_BITS - 1, self.stream.track_len());
        if self.window & SYNC_MASK != SYNC_PATTERN {
            return Some(Err(LemfoxError::SyncMismatch(mark_offset)));
        }
        Some(Ok(mark_offset))
    }

    fn demodulate_span(&mut self) -> Result<Vec<u16>, LemfoxError> {
        let mut words = Vec::with_capacity(TRACK_SPAN_WORDS);
        for _ in 0..TRACK_SPAN_WORDS {
            let raw = self.stream.next_bits(WORD_CELLS as u32).ok_or(LemfoxError::StreamExhausted)?;
            words.push(mfm_odd_even_decode_u16(raw));
        }
        Ok(words)
    }
}

impl<S: BitStreamReader + ?Sized> Iterator for SyncScanner<'_, S> {
    type Item = SyncSpan;

    fn next(&mut self) -> Option<Self::Item> {
        while !self.exhausted {
            let Some(bit) = self.stream.next_bit()
            else {
                self.exhausted = true;
                break;
            };
            self.window = (self.window << 1) | bit as u64;
            self.window_bits = (self.window_bits + 1).min(SYNC_BITS);

            match self.match_sync() {
                None => {}
                Some(Err(err)) => {
                    log::trace!("SyncScanner::next(): {}", err);
                    self.mismatches += 1;
                }
                Some(Ok(data_bitoff)) => {
                    log::debug!("SyncScanner::next(): Found sync mark at bit offset {}", data_bitoff);
                    match self.demodulate_span() {
                        Ok(words) => {
                            // Keep the tail of the span, so a sync mark starting inside the final
                            // word is still found.
                            self.window = self.stream.word() as u64;
                            self.window_bits = WORD_CELLS;
                            return Some(SyncSpan { data_bitoff, words });
                        }
                        Err(err) => {
                            log::debug!(
                                "SyncScanner::next(): {} reading sectors following sync mark at bit offset {}",
                                err,
                                data_bitoff
                            );
                            self.exhausted = true;
                        }
                    }
                }
            }
        }
        None
    }
}

impl<S: BitStreamReader + ?Sized> FusedIterator for SyncScanner<'_, S> {}

/// Decode a Lemmings track from a bit stream.
///
/// The stream is scanned for sync marks until every sector has been recovered or the stream is
/// exhausted. A sector failing its checksum is not an error - a later copy of the track data may
/// still recover it. The header's `data_bitoff` records the sync mark offset of the last
/// occurrence that yielded at least one valid sector.
///
/// Returns [LemfoxError::NoSectorsRecovered] if no sector could be recovered.
pub fn decode_track<S: BitStreamReader + ?Sized>(stream: &mut S) -> Result<LemmingsTrack, LemfoxError> {
    let mut data = SectorBlock::new();
    let mut header = TrackHeader::new(bit_count_u32(stream.track_len(), "Track length")?);
    let mut valid_sectors = SectorValidity::empty();

    let mut scanner = SyncScanner::new(stream);
    for span in scanner.by_ref() {
        let mut nr_valid = 0;
        for (index, (stored, body)) in span.sectors().enumerate() {
            match verify_sector(index, stored, body) {
                Ok(()) => {
                    data.write_sector(index, body);
                    valid_sectors.set_valid(index);
                    nr_valid += 1;
                }
                Err(err) => {
                    log::debug!("decode_track(): {}", err);
                }
            }
        }

        log::debug!(
            "decode_track(): {} valid sectors following sync at bit offset {}, {} recovered in total",
            nr_valid,
            span.data_bitoff,
            valid_sectors.valid_count()
        );

        if nr_valid > 0 {
            header.data_bitoff = bit_count_u32(span.data_bitoff, "Sync offset")?;
        }
        if valid_sectors.is_all() {
            break;
        }
    }

    if scanner.mismatches() > 0 {
        log::trace!("decode_track(): {} sync mismatches", scanner.mismatches());
    }

    if valid_sectors.is_empty() {
        log::debug!("decode_track(): {}", LemfoxError::NoSectorsRecovered);
        return Err(LemfoxError::NoSectorsRecovered);
    }

    header.finalize(valid_sectors);
    Ok(LemmingsTrack { header, data })
}

/// Emit a word as its even plane followed by its odd plane.
fn emit_word<W: TrackBufferWriter + ?Sized>(tbuf: &mut W, word: u16) {
    tbuf.bits(DEFAULT_SPEED, BitTag::Even, 16, word as u32);
    tbuf.bits(DEFAULT_SPEED, BitTag::Odd, 16, word as u32);
}

/// Encode a Lemmings track into a track buffer.
///
/// The sync mark is placed at the header's `data_bitoff` on a track of `total_bits` bitcells.
/// Sectors not marked valid in the header have their checksum inverted.
pub fn encode_track<W: TrackBufferWriter + ?Sized>(header: &TrackHeader, data: &SectorBlock, tbuf: &mut W) {
    if (header.total_bits as usize) < ENCODED_TRACK_BITS {
        log::warn!(
            "encode_track(): Track of {} bitcells is too short for {} bitcells of track data",
            header.total_bits,
            ENCODED_TRACK_BITS
        );
    }

    tbuf.init(header.data_bitoff as usize, header.total_bits as usize);
    tbuf.bits(DEFAULT_SPEED, BitTag::Raw, 16, SYNC_WORD as u32);
    tbuf.bits(DEFAULT_SPEED, BitTag::All, 16, SYNC_MARK_DATA as u32);

    for (index, sector) in data.sectors().enumerate() {
        let mut checksum = sector_checksum(sector_words(sector));
        if !header.valid_sectors.is_valid(index) {
            checksum = !checksum;
        }
        emit_word(tbuf, checksum);
        for word in sector_words(sector) {
            emit_word(tbuf, word);
        }
    }

    tbuf.finalize();
}

/// The Lemmings [TrackSchema].
#[derive(Copy, Clone, Debug, Default)]
pub struct LemmingsSchema;

impl TrackSchema for LemmingsSchema {
    type Track = LemmingsTrack;

    fn name(&self) -> &'static str {
        "Lemmings"
    }

    fn decode<S: BitStreamReader + ?Sized>(&self, stream: &mut S) -> Result<LemmingsTrack, LemfoxError> {
        decode_track(stream)
    }

    fn encode<W: TrackBufferWriter + ?Sized>(&self, track: &LemmingsTrack, tbuf: &mut W) {
        encode_track(&track.header, &track.data, tbuf)
    }
}
