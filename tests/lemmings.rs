mod common;

use bit_vec::BitVec;
use common::*;
use lemfox::{prelude::*, track_schema::lemmings::ENCODED_TRACK_BITS};

#[test]
fn test_round_trip_all_masks() {
    init();
    let block = random_block(0x4E4C_454D);

    for map in 0..64u32 {
        let valid = SectorValidity::from_map(map);
        let bits = encode_bits(&block, valid, 777);

        let result = decode_track(&mut BitStream::new(bits));
        if valid.is_empty() {
            assert!(matches!(result, Err(LemfoxError::NoSectorsRecovered)));
            continue;
        }

        let track = result.unwrap();
        assert_eq!(track.header.valid_sectors, valid, "map {:02X}", map);
        assert_eq!(track.header.data_bitoff, 777);
        for i in 0..SECTOR_COUNT {
            if valid.is_valid(i) {
                assert_eq!(track.data.sector(i), block.sector(i), "map {:02X} sector {}", map, i);
            }
            else {
                assert!(track.data.is_sentinel(i), "map {:02X} sector {}", map, i);
            }
        }
    }
}

#[test]
fn test_round_trip_header() {
    init();
    let block = random_block(1);
    let bits = encode_bits(&block, SectorValidity::all(), 12345);

    let track = decode_track(&mut BitStream::new(bits)).unwrap();
    assert_eq!(track.data, block);
    assert_eq!(track.header.data_bitoff, 12345);
    assert_eq!(track.header.total_bits, DEFAULT_TRACK_BITS);
    assert_eq!(track.header.bytes_per_sector, SECTOR_SIZE as u16);
    assert_eq!(track.header.nr_sectors, SECTOR_COUNT as u16);
    assert_eq!(track.header.len, TRACK_DATA_SIZE as u32);

    // The persisted header re-encodes the same track.
    let header = TrackHeader::from_bytes(&track.header.to_bytes().unwrap()).unwrap();
    let mut tbuf = TrackBuffer::default();
    encode_track(&header, &track.data, &mut tbuf);
    assert_eq!(tbuf.into_bits(), encode_bits(&block, SectorValidity::all(), 12345));
}

#[test]
fn test_sync_across_index() {
    init();
    let block = random_block(2);
    // The sync mark lies just before the index, so the sector data wraps around it.
    let data_bitoff = DEFAULT_TRACK_BITS - 20;
    let bits = encode_bits(&block, SectorValidity::all(), data_bitoff);

    let track = decode_track(&mut BitStream::new(bits)).unwrap();
    assert_eq!(track.header.data_bitoff, data_bitoff);
    assert_eq!(track.header.valid_sectors, SectorValidity::all());
    assert_eq!(track.data, block);
}

#[test]
fn test_partial_recovery() {
    init();
    let block = random_block(3);
    let mut bits = encode_bits(&block, SectorValidity::all(), 64);
    corrupt_sector(&mut bits, 64, 1);
    corrupt_sector(&mut bits, 64, 4);

    // A single revolution holds a single copy of the track data.
    let track = decode_track(&mut BitStream::new(bits).with_revolutions(1)).unwrap();
    let expected = SectorValidity::SECTOR_0 | SectorValidity::SECTOR_2 | SectorValidity::SECTOR_3 | SectorValidity::SECTOR_5;
    assert_eq!(track.header.valid_sectors, expected);
    assert_eq!(track.header.valid_sectors.valid_count(), 4);
    assert!(track.data.is_sentinel(1));
    assert!(track.data.is_sentinel(4));
    for i in expected.valid_sectors() {
        assert_eq!(track.data.sector(i), block.sector(i));
    }
}

#[test]
fn test_recovery_from_second_copy() {
    init();
    let block = random_block(4);

    // First copy has sectors 0 and 5 damaged, second copy sector 2.
    let mut first = encode_bits(&block, SectorValidity::all(), 0);
    corrupt_sector(&mut first, 0, 0);
    corrupt_sector(&mut first, 0, 5);
    let mut second = encode_bits(&block, SectorValidity::all(), 0);
    corrupt_sector(&mut second, 0, 2);

    let track_len = first.len() as u32;
    let bits = concat_bits(first, &second);
    let track = decode_track(&mut BitStream::new(bits).with_revolutions(1)).unwrap();
    assert_eq!(track.header.valid_sectors, SectorValidity::all());
    assert_eq!(track.data, block);
    assert_eq!(track.header.data_bitoff, track_len);
}

#[test]
fn test_last_successful_offset_wins() {
    init();
    let block = random_block(5);

    // First copy recovers four sectors, the second copy the remaining two.
    let mut first = encode_bits(&block, SectorValidity::all(), 100);
    corrupt_sector(&mut first, 100, 1);
    corrupt_sector(&mut first, 100, 3);
    let second = encode_bits(&block, SectorValidity::all(), 300);

    let track_len = first.len() as u32;
    let bits = concat_bits(first, &second);
    let track = decode_track(&mut BitStream::new(bits).with_revolutions(1)).unwrap();
    assert_eq!(track.header.valid_sectors, SectorValidity::all());
    assert_eq!(track.header.data_bitoff, track_len + 300);
}

#[test]
fn test_failed_copy_does_not_record_offset() {
    init();
    let block = random_block(6);

    // The first copy is fine, the second copy is entirely corrupt.
    let mut first = encode_bits(&block, SectorValidity::all(), 200);
    corrupt_sector(&mut first, 200, 2);
    let mut second = encode_bits(&block, SectorValidity::all(), 400);
    for sector in 0..SECTOR_COUNT {
        corrupt_sector(&mut second, 400, sector);
    }

    let bits = concat_bits(first, &second);
    let track = decode_track(&mut BitStream::new(bits).with_revolutions(1)).unwrap();
    assert_eq!(track.header.valid_sectors, SectorValidity::all() - SectorValidity::SECTOR_2);
    assert_eq!(track.header.data_bitoff, 200);
}

#[test]
fn test_no_sync() {
    init();
    // An unformatted track of MFM zeros.
    let bits = BitVec::from_bytes(&vec![0xAA; DEFAULT_TRACK_BITS as usize / 8]);
    let result = decode_track(&mut BitStream::new(bits));
    assert!(matches!(result, Err(LemfoxError::NoSectorsRecovered)));

    let result = decode_track(&mut BitStream::new(BitVec::new()));
    assert!(matches!(result, Err(LemfoxError::NoSectorsRecovered)));
}

#[test]
fn test_all_sectors_corrupt() {
    init();
    let block = random_block(7);
    let mut bits = encode_bits(&block, SectorValidity::all(), 0);
    for sector in 0..SECTOR_COUNT {
        corrupt_sector(&mut bits, 0, sector);
    }
    let result = decode_track(&mut BitStream::new(bits));
    assert!(matches!(result, Err(LemfoxError::NoSectorsRecovered)));
}

#[test]
fn test_boundary_bodies() {
    init();
    // All-zero and all-ones sectors, each both valid and invalid.
    let mut bytes = vec![0u8; TRACK_DATA_SIZE];
    for sector in [1, 3, 5] {
        bytes[sector * SECTOR_SIZE..(sector + 1) * SECTOR_SIZE].fill(0xFF);
    }
    let block = SectorBlock::from_bytes(&bytes).unwrap();

    let valid = SectorValidity::SECTOR_0 | SectorValidity::SECTOR_1;
    let bits = encode_bits(&block, valid, 0);
    let track = decode_track(&mut BitStream::new(bits)).unwrap();
    assert_eq!(track.header.valid_sectors, valid);
    assert_eq!(track.data.sector(0), block.sector(0));
    assert_eq!(track.data.sector(1), block.sector(1));
    for i in 2..SECTOR_COUNT {
        assert!(track.data.is_sentinel(i));
    }
}

#[test]
fn test_sync_inside_final_word() {
    init();
    let block = random_block(8);

    // The second copy's sync word overwrites the last 16 bitcells of the first copy's span.
    let mut first = encode_bits(&block, SectorValidity::all(), 0);
    corrupt_sector(&mut first, 0, 0);
    let second = encode_bits(&block, SectorValidity::all(), 0);

    let mark_offset = ENCODED_TRACK_BITS - 16;
    let mut bits: BitVec = first.iter().take(mark_offset).collect();
    bits.extend(second.iter());

    let track = decode_track(&mut BitStream::new(bits).with_revolutions(1)).unwrap();
    assert_eq!(track.header.valid_sectors, SectorValidity::all());
    assert_eq!(track.header.data_bitoff, mark_offset as u32);
    assert_eq!(track.data, block);
}
