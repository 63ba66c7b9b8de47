//! One entry point for both codecs.
//!
//! A [`Converter`] is bound to a single [`EncodingVariant`] when it is built
//! and forwards every operation to that codec, so callers drive UTF-8 and
//! UTF-16 through the same calls.

use std::io::{self, Write};
use std::iter::FusedIterator;

use serde::Serialize;

use crate::cursor::ByteCursor;
use crate::endian::Endianness;
use crate::{CodePoint, DecodeError, EncodeError, EncodedBytes, Encoding, utf8, utf16};

/// Codec family a [`Converter`] delegates to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum EncodingVariant {
    /// UTF-8
    Utf8,
    /// UTF-16 in either byte order
    Utf16,
}

/// Codec facade owning exactly one codec variant
///
/// Not `Clone`: a conversion job owns its converter.
#[derive(Debug, PartialEq, Eq)]
pub struct Converter {
    variant: EncodingVariant,
}

impl Converter {
    /// Create a converter for `variant`
    pub const fn new(variant: EncodingVariant) -> Self {
        Self { variant }
    }

    /// Create a converter for the codec behind `encoding`
    pub fn for_encoding(encoding: Encoding) -> Self {
        Self::new(encoding.variant())
    }

    /// Codec this converter delegates to
    pub fn variant(&self) -> EncodingVariant {
        self.variant
    }

    /// Consume a BOM at the cursor if present.
    ///
    /// Anything other than [`Endianness::Unknown`] means a mark was found.
    /// For UTF-8 that is the host byte order.
    pub fn check_bom<C: ByteCursor + ?Sized>(&self, cursor: &mut C) -> io::Result<Endianness> {
        match self.variant {
            EncodingVariant::Utf8 => utf8::check_bom(cursor),
            EncodingVariant::Utf16 => utf16::check_bom(cursor),
        }
    }

    /// Write the BOM. UTF-8 ignores `endian`.
    pub fn write_bom<W: Write + ?Sized>(
        &self,
        output: &mut W,
        endian: Endianness,
    ) -> Result<(), EncodeError> {
        match self.variant {
            EncodingVariant::Utf8 => Ok(utf8::write_bom(output)?),
            EncodingVariant::Utf16 => utf16::write_bom(output, endian),
        }
    }

    /// Whether this codec can operate in byte order `endian`
    pub fn endian_legal(&self, endian: Endianness) -> bool {
        match self.variant {
            EncodingVariant::Utf8 => true,
            EncodingVariant::Utf16 => utf16::endian_legal(endian),
        }
    }

    /// Decode one code point; `Ok(None)` at end of input.
    pub fn decode_one<C: ByteCursor + ?Sized>(
        &self,
        cursor: &mut C,
        endian: Endianness,
    ) -> Result<Option<CodePoint>, DecodeError> {
        match self.variant {
            EncodingVariant::Utf8 => utf8::decode_one(cursor),
            EncodingVariant::Utf16 => utf16::decode_one(cursor, endian),
        }
    }

    /// Encode one code point
    pub fn encode_one(
        &self,
        code_point: CodePoint,
        endian: Endianness,
    ) -> Result<EncodedBytes, EncodeError> {
        match self.variant {
            EncodingVariant::Utf8 => utf8::encode_one(code_point),
            EncodingVariant::Utf16 => utf16::encode_one(code_point, endian),
        }
    }

    /// Lazily decode everything left at the cursor.
    ///
    /// The iterator ends at end of input. An error is yielded as the last
    /// item. To decode again, start from a fresh cursor.
    pub fn decode_all<C: ByteCursor>(&self, cursor: C, endian: Endianness) -> DecodeAll<C> {
        DecodeAll {
            variant: self.variant,
            cursor,
            endian,
            done: false,
        }
    }

    /// Encode `code_points` in order into `output`.
    ///
    /// Returns the number of bytes written. Stops at the first error; nothing
    /// after the failing code point is written.
    pub fn encode_all<I, W>(
        &self,
        code_points: I,
        endian: Endianness,
        output: &mut W,
    ) -> Result<usize, EncodeError>
    where
        I: IntoIterator<Item = CodePoint>,
        W: Write + ?Sized,
    {
        let mut written = 0;
        for code_point in code_points {
            let bytes = self.encode_one(code_point, endian)?;
            output.write_all(&bytes)?;
            written += bytes.len();
        }
        Ok(written)
    }
}

/// Iterator returned by [`Converter::decode_all`]
#[derive(Debug)]
pub struct DecodeAll<C> {
    variant: EncodingVariant,
    cursor: C,
    endian: Endianness,
    done: bool,
}

impl<C: ByteCursor> DecodeAll<C> {
    /// Current read position of the underlying cursor
    pub fn position(&self) -> usize {
        self.cursor.position()
    }

    /// Give back the cursor
    pub fn into_cursor(self) -> C {
        self.cursor
    }
}

impl<C: ByteCursor> Iterator for DecodeAll<C> {
    type Item = Result<CodePoint, DecodeError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let result = match self.variant {
            EncodingVariant::Utf8 => utf8::decode_one(&mut self.cursor),
            EncodingVariant::Utf16 => utf16::decode_one(&mut self.cursor, self.endian),
        };
        match result {
            Ok(Some(code_point)) => Some(Ok(code_point)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}

impl<C: ByteCursor> FusedIterator for DecodeAll<C> {}
