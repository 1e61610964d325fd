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

//! # lemfox
//!
//! lemfox is a bitstream codec for the custom track format used by *Lemmings* on
//! the Commodore Amiga.
//!
//! A Lemmings track carries no per-sector headers and no inter-sector gaps. After a
//! single sync mark, six sectors of 1024 bytes are stored back-to-back, each preceded
//! by a 16-bit additive checksum. Every 16-bit word is split into its odd and even
//! bits, and each half is MFM encoded separately.
//!
//! The crate provides:
//! * [decode_track] - scan a flux-derived [BitStreamReader] for sync marks and
//!   recover as many sectors as possible into a [SectorBlock].
//! * [encode_track] - render a [SectorBlock] and its [SectorValidity] map back into
//!   MFM bitcells through a [TrackBufferWriter].
//! * [BitStream] and [TrackBuffer], minimal [BitVec](bit_vec::BitVec)-backed
//!   implementations of the reader and writer interfaces.

pub mod bitstream_codec;
pub mod track_schema;
pub mod types;

use thiserror::Error;

pub const SECTOR_COUNT: usize = 6;
pub const SECTOR_SIZE: usize = 1024;
pub const SECTOR_WORDS: usize = SECTOR_SIZE / 2;
pub const TRACK_DATA_SIZE: usize = SECTOR_COUNT * SECTOR_SIZE;

#[derive(Debug, Error)]
pub enum LemfoxError {
    #[error("The bit stream was exhausted")]
    StreamExhausted,
    #[error("Sync word at bit offset {0} was not followed by the expected sync mark")]
    SyncMismatch(usize),
    #[error("Sector {sector} checksum mismatch: stored {stored:04X}, computed {computed:04X}")]
    ChecksumMismatch { sector: usize, stored: u16, computed: u16 },
    #[error("No sectors could be recovered from the track")]
    NoSectorsRecovered,
    #[error("Invalid parameters were specified to a library function")]
    ParameterError,
    #[error("An error occurred reading or writing a track header: {0}")]
    HeaderError(String),
}

impl From<binrw::Error> for LemfoxError {
    fn from(err: binrw::Error) -> Self {
        LemfoxError::HeaderError(err.to_string())
    }
}

pub use crate::{
    bitstream_codec::{
        bit_stream::BitStream,
        track_buffer::TrackBuffer,
        BitStreamReader,
        BitTag,
        TrackBufferWriter,
        DEFAULT_SPEED,
    },
    track_schema::{
        lemmings::{
            decode_track,
            encode_track,
            sector_checksum,
            LemmingsSchema,
            LemmingsTrack,
            SectorBlock,
            SyncScanner,
            SyncSpan,
        },
        TrackSchema,
    },
    types::{
        flags::SectorValidity,
        header::{TrackHeader, DEFAULT_TRACK_BITS},
    },
};

pub mod prelude {
    pub use crate::{
        decode_track,
        encode_track,
        BitStream,
        BitStreamReader,
        BitTag,
        LemfoxError,
        LemmingsSchema,
        LemmingsTrack,
        SectorBlock,
        SectorValidity,
        TrackBuffer,
        TrackBufferWriter,
        TrackHeader,
        TrackSchema,
        DEFAULT_TRACK_BITS,
        SECTOR_COUNT,
        SECTOR_SIZE,
        TRACK_DATA_SIZE,
    };
}
