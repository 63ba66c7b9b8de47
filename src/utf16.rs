//! UTF-16 codec
//!
//! Code points up to U+FFFF take one 16-bit unit. Larger ones are split into
//! a high surrogate (`D800..=DBFF`) followed by a low surrogate
//! (`DC00..=DFFF`). Byte order only decides how each unit is laid out in its
//! two bytes; the high unit always comes first.

use std::io::{self, Write};
use std::ops::RangeInclusive;

use crate::cursor::ByteCursor;
use crate::endian::Endianness;
use crate::{CodePoint, DecodeError, EncodeError, EncodedBytes, check_scalar};

/// Little-endian byte-order mark
pub const BOM_LE: [u8; 2] = [0xFF, 0xFE];
/// Big-endian byte-order mark
pub const BOM_BE: [u8; 2] = [0xFE, 0xFF];

/// Leading half of a surrogate pair
pub const HIGH_SURROGATES: RangeInclusive<u16> = 0xD800..=0xDBFF;
/// Trailing half of a surrogate pair
pub const LOW_SURROGATES: RangeInclusive<u16> = 0xDC00..=0xDFFF;

/// Consume a leading UTF-16 BOM if there is one and report the byte order it
/// signals.
///
/// Nothing is consumed when no mark is present, so the caller can still
/// decode the input with a byte order of its own choosing.
pub fn check_bom<C: ByteCursor + ?Sized>(cursor: &mut C) -> io::Result<Endianness> {
    let endian = match cursor.peek(2)? {
        [0xFF, 0xFE] => Endianness::Little,
        [0xFE, 0xFF] => Endianness::Big,
        _ => return Ok(Endianness::Unknown),
    };
    cursor.advance(2);
    Ok(endian)
}

/// Write the BOM for `endian`.
pub fn write_bom<W: Write + ?Sized>(output: &mut W, endian: Endianness) -> Result<(), EncodeError> {
    let bom = match endian {
        Endianness::Big => BOM_BE,
        Endianness::Little => BOM_LE,
        Endianness::Unknown => return Err(EncodeError::UnknownEndianness),
    };
    output.write_all(&bom)?;
    Ok(())
}

/// UTF-16 can only be read or written in a known byte order.
#[inline]
pub fn endian_legal(endian: Endianness) -> bool {
    endian.is_known()
}

#[inline]
fn unit_from_bytes(bytes: [u8; 2], endian: Endianness) -> u16 {
    match endian {
        Endianness::Big => u16::from_be_bytes(bytes),
        Endianness::Little => u16::from_le_bytes(bytes),
        Endianness::Unknown => unreachable!("byte order is checked before decoding"),
    }
}

#[inline]
fn unit_to_bytes(unit: u16, endian: Endianness) -> [u8; 2] {
    match endian {
        Endianness::Big => unit.to_be_bytes(),
        Endianness::Little => unit.to_le_bytes(),
        Endianness::Unknown => unreachable!("byte order is checked before encoding"),
    }
}

/// Read one unit, or `None` at end of input. A single dangling byte is a
/// truncated unit.
fn read_unit<C: ByteCursor + ?Sized>(
    cursor: &mut C,
    endian: Endianness,
) -> Result<Option<u16>, DecodeError> {
    let position = cursor.position();
    let unit = match *cursor.peek(2)? {
        [] => return Ok(None),
        [_] => return Err(DecodeError::UnexpectedEndOfInput { position }),
        [first, second, ..] => unit_from_bytes([first, second], endian),
    };
    cursor.advance(2);
    Ok(Some(unit))
}

/// Decode the code point at the cursor.
///
/// `Ok(None)` means the input is exhausted. A high surrogate is combined
/// with the unit after it; if that unit is not a low surrogate the cursor is
/// stepped back so it stays unread, and the unpaired high surrogate is
/// reported.
pub fn decode_one<C: ByteCursor + ?Sized>(
    cursor: &mut C,
    endian: Endianness,
) -> Result<Option<CodePoint>, DecodeError> {
    if !endian_legal(endian) {
        return Err(DecodeError::UnknownEndianness);
    }

    let start = cursor.position();
    let Some(high) = read_unit(cursor, endian)? else {
        return Ok(None);
    };

    if LOW_SURROGATES.contains(&high) {
        return Err(DecodeError::MalformedSurrogate {
            unit: high,
            position: start,
        });
    }
    if !HIGH_SURROGATES.contains(&high) {
        return Ok(Some(CodePoint::from(high)));
    }

    let low = match read_unit(cursor, endian) {
        Ok(Some(low)) => low,
        Ok(None) | Err(DecodeError::UnexpectedEndOfInput { .. }) => {
            return Err(DecodeError::UnexpectedEndOfInput { position: start });
        }
        Err(e) => return Err(e),
    };
    if !LOW_SURROGATES.contains(&low) {
        cursor.rewind(2);
        return Err(DecodeError::MalformedSurrogate {
            unit: high,
            position: start,
        });
    }

    let high = CodePoint::from(high - HIGH_SURROGATES.start());
    let low = CodePoint::from(low - LOW_SURROGATES.start());
    Ok(Some(((high << 10) | low) + 0x10000))
}

/// Encode one code point into 2 or 4 bytes in the given byte order.
pub fn encode_one(code_point: CodePoint, endian: Endianness) -> Result<EncodedBytes, EncodeError> {
    if !endian_legal(endian) {
        return Err(EncodeError::UnknownEndianness);
    }
    check_scalar(code_point)?;

    if code_point <= 0xFFFF {
        let [a, b] = unit_to_bytes(code_point as u16, endian);
        return Ok(EncodedBytes::from_array([a, b, 0, 0], 2));
    }

    let offset = code_point - 0x10000;
    let high = (offset >> 10) as u16 + HIGH_SURROGATES.start();
    let low = (offset & 0x3FF) as u16 + LOW_SURROGATES.start();
    let [a, b] = unit_to_bytes(high, endian);
    let [c, d] = unit_to_bytes(low, endian);
    Ok(EncodedBytes::from_array([a, b, c, d], 4))
}
