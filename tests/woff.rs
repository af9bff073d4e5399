//! WOFF 1.0 round-trip tests against fonts synthesized in memory.

use woffle::assemble::FontBuilder;
use woffle::binary::read::ReadScope;
use woffle::error::{ParseError, ReadWriteError};
use woffle::tables::{Fixed, HeadTable, IndexToLocFormat, MaxpTable, TTF_MAGIC};
use woffle::{tag, woff};

fn build_font() -> Vec<u8> {
    let head = HeadTable {
        major_version: 1,
        minor_version: 0,
        font_revision: Fixed::new(0x00020000),
        check_sum_adjustment: 0,
        magic_number: 0x5F0F3CF5,
        flags: 0b0011,
        units_per_em: 2048,
        created: 3_400_000_000,
        modified: 3_400_000_001,
        x_min: 0,
        y_min: -400,
        x_max: 2000,
        y_max: 1600,
        mac_style: 0,
        lowest_rec_ppem: 6,
        font_direction_hint: 2,
        index_to_loc_format: IndexToLocFormat::Long,
        glyph_data_format: 0,
    };
    let maxp = MaxpTable {
        num_glyphs: 11,
        version1_sub_table: None,
    };

    // A highly repetitive table that zlib will shrink, and a short one it won't
    let repetitive: Vec<u8> = (0..512u32).flat_map(|_| [0xDE, 0xAD]).collect();

    let mut builder = FontBuilder::new(TTF_MAGIC);
    builder
        .add_table::<_, MaxpTable>(tag::MAXP, &maxp, ())
        .unwrap();
    builder.add_table_bytes(tag::HDMX, &repetitive).unwrap();
    builder.add_table_bytes(tag::CVT, &[0, 1, 0, 2]).unwrap();
    let builder = builder.add_head_table(&head).unwrap();
    builder.data().unwrap()
}

#[test]
fn encode_decode_is_identity() {
    let sfnt = build_font();
    let woff = woff::encode(&sfnt, &woff::WoffEncodeOptions::default()).unwrap();
    assert_eq!(&woff[0..4], b"wOFF");

    // WOFF 1.0 rewrites nothing, so the SFNT comes back byte for byte
    let out = woff::decode(&woff).unwrap();
    assert_eq!(out, sfnt);
}

#[test]
fn compressible_tables_are_deflated() {
    let sfnt = build_font();
    let woff = woff::encode(&sfnt, &woff::WoffEncodeOptions::default()).unwrap();

    // The repetitive table compresses well enough to offset the header overhead
    assert!(woff.len() < sfnt.len());

    let font = ReadScope::new(&woff).read::<woff::WoffFont<'_>>().unwrap();
    let hdmx = font.find_table_directory_entry(tag::HDMX).unwrap();
    assert!(hdmx.comp_length < hdmx.orig_length);
    let cvt = font.find_table_directory_entry(tag::CVT).unwrap();
    assert_eq!(cvt.comp_length, cvt.orig_length);
}

#[test]
fn low_compression_level_still_round_trips() {
    let sfnt = build_font();
    let woff = woff::encode(&sfnt, &woff::WoffEncodeOptions { zlib_level: 1 }).unwrap();
    assert_eq!(woff::decode(&woff).unwrap(), sfnt);
}

#[test]
fn bad_signature_is_rejected() {
    assert!(matches!(
        woff::decode(b"OTTO\x00\x00\x00\x00"),
        Err(ReadWriteError::Read(ParseError::BadSignature))
    ));
}

#[test]
fn truncated_input_is_rejected() {
    let sfnt = build_font();
    let woff = woff::encode(&sfnt, &woff::WoffEncodeOptions::default()).unwrap();
    assert!(matches!(
        woff::decode(&woff[..woff.len() - 1]),
        Err(ReadWriteError::Read(
            ParseError::BadDirectory | ParseError::BadEof
        ))
    ));
}
