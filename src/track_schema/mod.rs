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

//! The `track_schema` module defines the [TrackSchema] trait, which represents a
//! track schema used to interpret the layout of a track.
//!
//! A track schema is responsible for interpreting the layout of syncs, checksums
//! and sector data on a track, relying on a [BitStreamReader] to supply the
//! underlying bitcells when decoding and a [TrackBufferWriter] to render them when
//! encoding. A schema is not fully encoding agnostic - the Lemmings schema is only
//! ever paired with MFM and odd/even meta-encoding.
//!
//! A `TrackSchema` typically contains no state.
//!
//! Only the custom Lemmings track schema is implemented.

pub mod lemmings;
pub mod meta_encoding;

use crate::{
    bitstream_codec::{BitStreamReader, TrackBufferWriter},
    LemfoxError,
};

pub use lemmings::LemmingsTrack;

/// A [TrackSchema] converts between the bitcells of a track and its decoded representation.
pub trait TrackSchema {
    /// The decoded representation of a track.
    type Track;

    /// Return a human-readable name for the schema.
    fn name(&self) -> &'static str;

    /// Decode a track from a bit stream.
    fn decode<S: BitStreamReader + ?Sized>(&self, stream: &mut S) -> Result<Self::Track, LemfoxError>;

    /// Encode a decoded track into a track buffer.
    fn encode<W: TrackBufferWriter + ?Sized>(&self, track: &Self::Track, tbuf: &mut W);
}
