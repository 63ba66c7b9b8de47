//! UTF-8 codec
//!
//! A code point is stored in 1 to 4 bytes. The number of leading one bits of
//! the lead byte gives the sequence length (none for ASCII); every following
//! byte is a `10xxxxxx` continuation byte carrying 6 bits of payload.

use std::io::{self, Write};

use crate::cursor::ByteCursor;
use crate::endian::{Endianness, host_endianness};
use crate::{CodePoint, DecodeError, EncodeError, EncodedBytes, check_scalar, is_scalar_value};

/// UTF-8 byte-order mark (U+FEFF encoded as UTF-8)
pub const BOM: [u8; 3] = [0xEF, 0xBB, 0xBF];

/// Lead byte prefix by sequence length
const LEAD_PREFIX: [u8; 5] = [0x00, 0x00, 0b1100_0000, 0b1110_0000, 0b1111_0000];

/// Consume a leading UTF-8 BOM if there is one.
///
/// Returns the host byte order when the mark is present, since UTF-8 has no
/// byte order of its own, and [`Endianness::Unknown`] otherwise. Nothing is
/// consumed on a mismatch.
pub fn check_bom<C: ByteCursor + ?Sized>(cursor: &mut C) -> io::Result<Endianness> {
    if cursor.peek(BOM.len())? == BOM {
        cursor.advance(BOM.len());
        Ok(host_endianness())
    } else {
        Ok(Endianness::Unknown)
    }
}

/// Write the UTF-8 BOM
pub fn write_bom<W: Write + ?Sized>(output: &mut W) -> io::Result<()> {
    output.write_all(&BOM)
}

/// Length of the sequence a lead byte starts, or `None` if the byte cannot
/// start one (a continuation byte, or five or more leading ones).
#[inline]
pub const fn sequence_len(lead: u8) -> Option<usize> {
    match lead.leading_ones() {
        0 => Some(1),
        n @ 2..=4 => Some(n as usize),
        _ => None,
    }
}

/// Decode the code point at the cursor.
///
/// `Ok(None)` means the input is exhausted. A sequence cut short by the end
/// of input is an error, never a partial value.
pub fn decode_one<C: ByteCursor + ?Sized>(
    cursor: &mut C,
) -> Result<Option<CodePoint>, DecodeError> {
    let start = cursor.position();
    let Some(lead) = cursor.next_byte()? else {
        return Ok(None);
    };

    let len = sequence_len(lead).ok_or(DecodeError::MalformedLeadByte {
        byte: lead,
        position: start,
    })?;
    if len == 1 {
        return Ok(Some(CodePoint::from(lead)));
    }

    let mut code_point = CodePoint::from(lead & (0x7F >> len));
    for _ in 1..len {
        let position = cursor.position();
        let byte = match cursor.peek(1)?.first() {
            Some(&byte) => byte,
            None => return Err(DecodeError::UnexpectedEndOfInput { position: start }),
        };
        if byte & 0b1100_0000 != 0b1000_0000 {
            return Err(DecodeError::MalformedContinuationByte { byte, position });
        }
        cursor.advance(1);
        code_point = (code_point << 6) | CodePoint::from(byte & 0b0011_1111);
    }

    if !is_scalar_value(code_point) {
        return Err(DecodeError::InvalidCodePoint {
            value: code_point,
            position: start,
        });
    }
    Ok(Some(code_point))
}

/// Encode one code point into 1 to 4 bytes.
pub fn encode_one(code_point: CodePoint) -> Result<EncodedBytes, EncodeError> {
    check_scalar(code_point)?;

    let len = match code_point {
        0..=0x7F => return Ok(EncodedBytes::from_array([code_point as u8, 0, 0, 0], 1)),
        0x80..=0x7FF => 2,
        0x800..=0xFFFF => 3,
        _ => 4,
    };

    let mut bytes = [0u8; 4];
    let mut rest = code_point;
    for slot in bytes[1..len].iter_mut().rev() {
        *slot = 0b1000_0000 | (rest & 0b0011_1111) as u8;
        rest >>= 6;
    }
    bytes[0] = LEAD_PREFIX[len] | rest as u8;

    Ok(EncodedBytes::from_array(bytes, len))
}
