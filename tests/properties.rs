use proptest::prelude::*;

use utfconv::{
    ByteCursor, Converter, Encoding, EncodingVariant, Endianness, MAX_CODE_POINT, SliceCursor,
    StreamCursor, Transcoder,
};

fn byte_order() -> impl Strategy<Value = Endianness> {
    prop_oneof![Just(Endianness::Little), Just(Endianness::Big)]
}

proptest! {
    #[test]
    fn utf8_round_trip(ch in any::<char>()) {
        let utf8 = Converter::new(EncodingVariant::Utf8);
        let encoded = utf8.encode_one(ch as u32, Endianness::Unknown).unwrap();

        let mut buf = [0u8; 4];
        prop_assert_eq!(&*encoded, ch.encode_utf8(&mut buf).as_bytes());

        let mut cursor = SliceCursor::new(&encoded);
        prop_assert_eq!(utf8.decode_one(&mut cursor, Endianness::Unknown).unwrap(), Some(ch as u32));
        prop_assert!(cursor.is_empty());
    }

    #[test]
    fn utf16_round_trip(ch in any::<char>(), endian in byte_order()) {
        let utf16 = Converter::new(EncodingVariant::Utf16);
        let encoded = utf16.encode_one(ch as u32, endian).unwrap();
        prop_assert_eq!(encoded.len(), ch.len_utf16() * 2);

        let mut cursor = SliceCursor::new(&encoded);
        prop_assert_eq!(utf16.decode_one(&mut cursor, endian).unwrap(), Some(ch as u32));
        prop_assert_eq!(utf16.decode_one(&mut cursor, endian).unwrap(), None);
    }

    #[test]
    fn encoders_reject_non_scalars(
        code_point in prop_oneof![0xD800u32..=0xDFFF, MAX_CODE_POINT + 1..=u32::MAX],
        endian in byte_order(),
    ) {
        let utf8 = Converter::new(EncodingVariant::Utf8);
        let utf16 = Converter::new(EncodingVariant::Utf16);
        prop_assert!(utf8.encode_one(code_point, endian).is_err());
        prop_assert!(utf16.encode_one(code_point, endian).is_err());
    }

    #[test]
    fn decoded_code_points_are_scalars(bytes in proptest::collection::vec(any::<u8>(), 0..64)) {
        let utf8 = Converter::new(EncodingVariant::Utf8);
        for code_point in utf8.decode_all(SliceCursor::new(&bytes), Endianness::Unknown) {
            let Ok(code_point) = code_point else { break };
            prop_assert!(utfconv::is_scalar_value(code_point));
        }

        let utf16 = Converter::new(EncodingVariant::Utf16);
        for code_point in utf16.decode_all(SliceCursor::new(&bytes), Endianness::Little) {
            let Ok(code_point) = code_point else { break };
            prop_assert!(utfconv::is_scalar_value(code_point));
        }
    }

    #[test]
    fn bom_round_trip(endian in byte_order()) {
        let utf16 = Converter::new(EncodingVariant::Utf16);
        let mut out: Vec<u8> = Vec::new();
        utf16.write_bom(&mut out, endian).unwrap();
        prop_assert_eq!(utf16.check_bom(&mut SliceCursor::new(&out)).unwrap(), endian);
    }

    #[test]
    fn text_survives_utf16_and_back(text in any::<String>(), to in prop_oneof![
        Just(Encoding::UTF16LE),
        Just(Encoding::UTF16BE),
    ]) {
        let utf16 = Transcoder::new(Encoding::UTF8, to).convert(text.as_bytes()).unwrap();
        let back = Transcoder::new(to, Encoding::UTF8).convert(&utf16).unwrap();
        prop_assert_eq!(back, text.as_bytes());
    }

    #[test]
    fn stream_and_slice_cursors_agree(text in any::<String>()) {
        let utf8 = Converter::new(EncodingVariant::Utf8);
        let from_slice: Vec<_> = utf8
            .decode_all(SliceCursor::new(text.as_bytes()), Endianness::Unknown)
            .collect::<Result<_, _>>()
            .unwrap();
        let mut stream = StreamCursor::new(text.as_bytes());
        let from_stream: Vec<_> = utf8
            .decode_all(&mut stream, Endianness::Unknown)
            .collect::<Result<_, _>>()
            .unwrap();
        prop_assert_eq!(&from_slice, &from_stream);
        prop_assert_eq!(stream.position(), text.len());
    }
}
