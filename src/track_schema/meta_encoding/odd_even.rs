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
//! A module for handling odd/even meta-encoding, such as that used by the
//! Commodore Amiga trackdisk system and by the custom Lemmings track format.
//!
//! Odd/even encoding splits a value into two bit planes, which are MFM encoded
//! and recorded one after the other:
//! * The `even` plane holds the bits at odd bit positions (mask `0xAAAA`),
//!   that is, bits 15, 13 .. 1 of a 16-bit word. It is recorded first.
//! * The `odd` plane holds the bits at even bit positions (mask `0x5555`),
//!   that is, bits 14, 12 .. 0 of a 16-bit word.
//!
//! Each plane therefore holds half the bits of the value, and once MFM encoded
//! occupies the same number of bitcells as the value has bits.

const EVN_BITS_U32: u32 = 0x5555_5555;
const ODD_BITS_U32: u32 = 0xAAAA_AAAA;

const EVN_BITS_U16: u16 = 0x5555;
/// The data bits of clock-aligned MFM bitcells. The MSB of an aligned cell pair is always a clock
/// bit, making the LSB a data bit.
const DATA_BITS_U16: u16 = EVN_BITS_U16;

/// Decode an interleaved 16-bit word from 32 raw, clock-aligned MFM bitcells.
///
/// The upper 16 bitcells hold the MFM encoded even plane and the lower 16 bitcells the odd
/// plane. Clock bits are ignored.
#[inline]
pub fn mfm_odd_even_decode_u16(raw: u32) -> u16 {
    let even = (raw >> 16) as u16;
    let odd = raw as u16;
    // The even plane's data bits need to be shifted left by 1 bit to become the odd-position
    // bits of the decoded value.
    ((even & DATA_BITS_U16) << 1) | (odd & DATA_BITS_U16)
}

/// Interleave a pair of 16-bit planes into a single 32-bit value. Bits of the `even` plane are
/// distributed to odd bit positions, bits of the `odd` plane to even bit positions.
pub fn odd_even_interleave(even: u16, odd: u16) -> u32 {
    odd_even_decode_u32((even as u32) << 16 | odd as u32)
}

/// Split a 32-bit value into its `(even, odd)` 16-bit planes. This is the inverse of
/// [odd_even_interleave].
pub fn odd_even_deinterleave(value: u32) -> (u16, u16) {
    let planes = odd_even_encode_u32(value);
    ((planes >> 16) as u16, planes as u16)
}

/// Decode a u32 value holding odd bits compressed in the upper 16 bits and even bits compressed
/// in the lower 16 bits.
pub(crate) fn odd_even_decode_u32(x: u32) -> u32 {
    let mut o = x & 0xFFFF0000; // Extract odd bits compressed in upper 16 bits
    let mut e = x & 0x0000FFFF; // Extract even bits compressed in lower 16 bits

    // Distribute even bits to even positions
    e = (e | (e << 8)) & 0x00FF00FF;
    e = (e | (e << 4)) & 0x0F0F0F0F;
    e = (e | (e << 2)) & 0x33333333;
    e = (e | (e << 1)) & EVN_BITS_U32;

    // Distribute odd bits to odd positions
    o = (o | (o >> 8)) & 0xFF00FF00;
    o = (o | (o >> 4)) & 0xF0F0F0F0;
    o = (o | (o >> 2)) & 0xCCCCCCCC;
    o = (o | (o >> 1)) & ODD_BITS_U32;

    // Combine even and odd bits
    o | e
}

/// Gather the bits at even positions of `x` (mask `0x5555_5555`) into the lower 16 bits.
fn compress_even_bits(x: u32) -> u32 {
    let mut e = x & EVN_BITS_U32;
    e = (e | (e >> 1)) & 0x33333333;
    e = (e | (e >> 2)) & 0x0F0F0F0F;
    e = (e | (e >> 4)) & 0x00FF00FF;
    e = (e | (e >> 8)) & 0x0000FFFF;
    e
}

/// Encode a normal u32 value into odd/even bit words: odd bits compressed into the upper 16 bits
/// and even bits compressed into the lower 16 bits. This is the inverse of [odd_even_decode_u32].
pub(crate) fn odd_even_encode_u32(x: u32) -> u32 {
    let o = compress_even_bits(x >> 1);
    let e = compress_even_bits(x);
    (o << 16) | e
}
