use std::io::{self, Read};

use utfconv::detection::EncodingDetector;
use utfconv::{
    Converter, DecodeError, Encoding, EncodingVariant, Endianness, Error, SliceCursor,
    StreamCursor, TranscodeOptions, Transcoder, host_endianness,
};

const UTF8: Converter = Converter::new(EncodingVariant::Utf8);
const UTF16: Converter = Converter::new(EncodingVariant::Utf16);

#[test]
fn test_utf8_bom_then_ascii() {
    let mut cursor = SliceCursor::new(&[0xEF, 0xBB, 0xBF, 0x41]);
    assert_eq!(UTF8.check_bom(&mut cursor).unwrap(), host_endianness());
    assert_eq!(UTF8.decode_one(&mut cursor, Endianness::Unknown).unwrap(), Some(0x41));
}

#[test]
fn test_utf8_euro_sign() {
    let mut cursor = SliceCursor::new(&[0xE2, 0x82, 0xAC]);
    assert_eq!(UTF8.decode_one(&mut cursor, Endianness::Unknown).unwrap(), Some(0x20AC));
}

#[test]
fn test_utf16le_surrogate_pair() {
    let encoded = UTF16.encode_one(0x1F600, Endianness::Little).unwrap();
    assert_eq!(&*encoded, &[0x3D, 0xD8, 0x00, 0xDE]);

    let mut cursor = SliceCursor::new(&encoded);
    assert_eq!(UTF16.decode_one(&mut cursor, Endianness::Little).unwrap(), Some(0x1F600));
}

#[test]
fn test_truncated_utf8_is_not_nul() {
    let mut cursor = SliceCursor::new(&[0xC2]);
    let result = UTF8.decode_one(&mut cursor, Endianness::Unknown);
    assert!(matches!(result, Err(DecodeError::UnexpectedEndOfInput { .. })));
}

#[test]
fn test_utf16_without_bom_needs_byte_order() {
    let mut cursor = SliceCursor::new(&[0x00, 0x41, 0x00, 0x42]);
    let endian = UTF16.check_bom(&mut cursor).unwrap();
    assert_eq!(endian, Endianness::Unknown);
    assert!(!UTF16.endian_legal(endian));
}

/// Reader that hands out at most one byte per call
struct OneByte<'a>(&'a [u8]);

impl Read for OneByte<'_> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match (self.0.split_first(), buf.first_mut()) {
            (Some((&byte, rest)), Some(slot)) => {
                *slot = byte;
                self.0 = rest;
                Ok(1)
            }
            _ => Ok(0),
        }
    }
}

#[test]
fn test_stream_surrogate_rewind_across_reads() {
    // unpaired high surrogate, then 'B'
    let bytes = [0xD8, 0x3D, 0x00, 0x42];
    let mut cursor = StreamCursor::new(OneByte(&bytes));

    let mut decoded = UTF16.decode_all(&mut cursor, Endianness::Big);
    assert!(matches!(
        decoded.next(),
        Some(Err(DecodeError::MalformedSurrogate { unit: 0xD83D, position: 0 }))
    ));
    drop(decoded);

    assert_eq!(UTF16.decode_one(&mut cursor, Endianness::Big).unwrap(), Some(0x42));
    assert_eq!(UTF16.decode_one(&mut cursor, Endianness::Big).unwrap(), None);
}

#[test]
fn test_transcode_utf16_file_with_bom_to_utf8() {
    let mut input = vec![0xFE, 0xFF];
    for unit in "Grüße 🌍".encode_utf16() {
        input.extend_from_slice(&unit.to_be_bytes());
    }

    // the BOM settles the byte order even though the name does not
    let transcoder = Transcoder::new(Encoding::UTF16, Encoding::UTF8);
    let mut output: Vec<u8> = Vec::new();
    let report = transcoder
        .convert_stream(OneByte(&input), &mut output)
        .unwrap();

    assert_eq!(output, "Grüße 🌍".as_bytes());
    assert!(report.bom_detected);
    assert_eq!(report.source_endianness, Endianness::Big);
    assert_eq!(report.bytes_read, input.len());
    assert_eq!(report.code_points, 7);
}

#[test]
fn test_transcode_needs_byte_order_for_bare_utf16() {
    let input = [0x41, 0x00, 0x42, 0x00];

    let result = Transcoder::new(Encoding::UTF16, Encoding::UTF8).convert(&input);
    assert!(matches!(result, Err(Error::UnknownEndianness { .. })));

    let options = TranscodeOptions {
        write_bom: false,
        fallback_endianness: Some(Endianness::Little),
    };
    let output = Transcoder::with_options(Encoding::UTF16, Encoding::UTF8, options)
        .convert(&input)
        .unwrap();
    assert_eq!(output, b"AB");
}

#[test]
fn test_transcode_writes_target_bom() {
    let options = TranscodeOptions {
        write_bom: true,
        fallback_endianness: None,
    };
    let output = Transcoder::with_options(Encoding::UTF8, Encoding::UTF16BE, options)
        .convert(b"A")
        .unwrap();
    assert_eq!(output, [0xFE, 0xFF, 0x00, 0x41]);
}

#[test]
fn test_transcode_stops_at_malformed_input() {
    let result = Transcoder::new(Encoding::UTF8, Encoding::UTF16LE).convert(&[0x41, 0xFF, 0x42]);
    match result {
        Err(Error::Decode(e)) => assert_eq!(e.position(), Some(1)),
        other => panic!("expected a decode error, got {other:?}"),
    }
}

#[test]
fn test_detect_then_transcode() {
    let mut input = Vec::new();
    for unit in "plain text".encode_utf16() {
        input.extend_from_slice(&unit.to_le_bytes());
    }

    let detected = EncodingDetector::new().detect(&input);
    assert_eq!(detected.encoding, Some(Encoding::UTF16LE));
    assert!(!detected.bom_detected);

    let output = Transcoder::new(Encoding::UTF16LE, Encoding::UTF8)
        .convert(&input)
        .unwrap();
    assert_eq!(output, b"plain text");
}

#[test]
fn test_detect_bom_beats_content() {
    let input = [0xEF, 0xBB, 0xBF, 0x00, 0x41, 0x00, 0x42];
    let detected = EncodingDetector::new().detect(&input);
    assert_eq!(detected.encoding, Some(Encoding::UTF8));
    assert_eq!(detected.confidence, 1.0);
}
