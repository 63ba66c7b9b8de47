//! # utfconv - UTF-8 / UTF-16 transcoding
//!
//! Byte-level codecs for UTF-8 and UTF-16 with byte-order mark handling and
//! explicit endianness.
//!
//! ## Features
//!
//! - **BOM detection and writing** for UTF-8 (`EF BB BF`) and UTF-16 (`FF FE` / `FE FF`)
//! - **One code point at a time** decoding and encoding over slices or readers
//! - **Surrogate pairs** with look-ahead that never loses the following unit
//! - **Explicit errors** for malformed input; end of input is never confused with U+0000
//!
//! ## Quick Start
//!
//! ```rust
//! use utfconv::{Encoding, Transcoder};
//!
//! let transcoder = Transcoder::new(Encoding::UTF8, Encoding::UTF16LE);
//! let utf16 = transcoder.convert("Hi €".as_bytes()).unwrap();
//! assert_eq!(utf16, [0x48, 0x00, 0x69, 0x00, 0x20, 0x00, 0xAC, 0x20]);
//! ```
//!
//! Driving a codec directly:
//!
//! ```rust
//! use utfconv::{Converter, EncodingVariant, Endianness, SliceCursor};
//!
//! let utf16 = Converter::new(EncodingVariant::Utf16);
//! let mut input = SliceCursor::new(&[0xFF, 0xFE, 0x3D, 0xD8, 0x00, 0xDE]);
//!
//! let endian = utf16.check_bom(&mut input).unwrap();
//! assert_eq!(endian, Endianness::Little);
//! assert_eq!(utf16.decode_one(&mut input, endian).unwrap(), Some(0x1F600));
//! assert_eq!(utf16.decode_one(&mut input, endian).unwrap(), None);
//! ```

#![deny(missing_docs)]

use std::io::{self, Read, Write};
use std::ops::Deref;
use std::str::FromStr;

use serde::Serialize;

pub mod converter;
pub mod cursor;
pub mod detection;
pub mod endian;
pub mod utf16;
pub mod utf8;

pub use converter::{Converter, DecodeAll, EncodingVariant};
pub use cursor::{ByteCursor, SliceCursor, StreamCursor};
pub use endian::{Endianness, host_endianness};

/// A Unicode code point
pub type CodePoint = u32;

/// Largest Unicode code point
pub const MAX_CODE_POINT: CodePoint = 0x10FFFF;

/// Result type for transcoding jobs
pub type Result<T> = std::result::Result<T, Error>;

/// `true` if `code_point` is in `0..=0x10FFFF` and not a surrogate
#[inline]
pub const fn is_scalar_value(code_point: CodePoint) -> bool {
    char::from_u32(code_point).is_some()
}

#[inline]
pub(crate) fn check_scalar(code_point: CodePoint) -> std::result::Result<(), EncodeError> {
    if is_scalar_value(code_point) {
        Ok(())
    } else {
        Err(EncodeError::CodePointOutOfRange(code_point))
    }
}

/// Errors from decoding one code point
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    /// Byte cannot start a UTF-8 sequence
    #[error("malformed lead byte 0x{byte:02X} at position {position}")]
    MalformedLeadByte {
        /// The offending byte
        byte: u8,
        /// Offset of the byte in the input
        position: usize,
    },
    /// Byte inside a UTF-8 sequence is not a `10xxxxxx` continuation byte
    #[error("malformed continuation byte 0x{byte:02X} at position {position}")]
    MalformedContinuationByte {
        /// The offending byte
        byte: u8,
        /// Offset of the byte in the input
        position: usize,
    },
    /// Input ended inside a sequence or a UTF-16 unit
    #[error("input ends inside the sequence starting at position {position}")]
    UnexpectedEndOfInput {
        /// Offset where the unfinished sequence starts
        position: usize,
    },
    /// UTF-16 surrogate without its partner
    #[error("unpaired surrogate 0x{unit:04X} at position {position}")]
    MalformedSurrogate {
        /// The unpaired unit
        unit: u16,
        /// Offset of the unit in the input
        position: usize,
    },
    /// UTF-8 sequence that spells a value outside the Unicode scalar range
    #[error("sequence at position {position} decodes to 0x{value:X}, which is not a Unicode scalar value")]
    InvalidCodePoint {
        /// The decoded value
        value: u32,
        /// Offset where the sequence starts
        position: usize,
    },
    /// UTF-16 decode was asked to run without a byte order
    #[error("UTF-16 cannot be decoded without a byte order")]
    UnknownEndianness,
    /// Reading the input failed
    #[error(transparent)]
    Io(#[from] io::Error),
}

impl DecodeError {
    /// Input offset the error refers to, if any
    pub fn position(&self) -> Option<usize> {
        match *self {
            DecodeError::MalformedLeadByte { position, .. }
            | DecodeError::MalformedContinuationByte { position, .. }
            | DecodeError::UnexpectedEndOfInput { position }
            | DecodeError::MalformedSurrogate { position, .. }
            | DecodeError::InvalidCodePoint { position, .. } => Some(position),
            DecodeError::UnknownEndianness | DecodeError::Io(_) => None,
        }
    }
}

/// Errors from encoding one code point
#[derive(Debug, thiserror::Error)]
pub enum EncodeError {
    /// Value above U+10FFFF or a lone surrogate
    #[error("code point 0x{0:X} is not a Unicode scalar value")]
    CodePointOutOfRange(CodePoint),
    /// UTF-16 encode or BOM write was asked to run without a byte order
    #[error("UTF-16 cannot be encoded without a byte order")]
    UnknownEndianness,
    /// Writing the output failed
    #[error(transparent)]
    Io(#[from] io::Error),
}

/// Errors from a transcoding job
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Source input is malformed
    #[error(transparent)]
    Decode(#[from] DecodeError),
    /// A code point cannot be written in the target encoding
    #[error(transparent)]
    Encode(#[from] EncodeError),
    /// Source byte order could not be determined
    #[error("byte order of {encoding} input is unknown: no byte-order mark and no fallback given")]
    UnknownEndianness {
        /// Source encoding name
        encoding: &'static str,
    },
    /// Encoding name not recognized
    #[error("unknown encoding: {0}")]
    UnknownEncoding(String),
    /// Reading or writing failed
    #[error(transparent)]
    Io(#[from] io::Error),
}

/// Bytes produced by encoding one code point (1 to 4)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncodedBytes {
    bytes: [u8; 4],
    len: u8,
}

impl EncodedBytes {
    #[inline]
    pub(crate) const fn from_array(bytes: [u8; 4], len: usize) -> Self {
        Self {
            bytes,
            len: len as u8,
        }
    }

    /// The encoded bytes
    #[inline]
    pub fn as_slice(&self) -> &[u8] {
        &self.bytes[..self.len as usize]
    }
}

impl Deref for EncodedBytes {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        self.as_slice()
    }
}

impl AsRef<[u8]> for EncodedBytes {
    fn as_ref(&self) -> &[u8] {
        self.as_slice()
    }
}

/// Supported byte formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[allow(non_camel_case_types)]
pub enum Encoding {
    /// UTF-8 (variable length, 1-4 bytes)
    #[serde(rename = "UTF-8")]
    UTF8,
    /// UTF-16 with the byte order taken from the BOM
    #[serde(rename = "UTF-16")]
    UTF16,
    /// UTF-16 little endian
    #[serde(rename = "UTF-16LE")]
    UTF16LE,
    /// UTF-16 big endian
    #[serde(rename = "UTF-16BE")]
    UTF16BE,
}

impl Encoding {
    /// Every supported encoding
    pub const ALL: [Encoding; 4] = [
        Encoding::UTF8,
        Encoding::UTF16,
        Encoding::UTF16LE,
        Encoding::UTF16BE,
    ];

    /// Canonical name of this encoding
    pub fn name(self) -> &'static str {
        match self {
            Encoding::UTF8 => "UTF-8",
            Encoding::UTF16 => "UTF-16",
            Encoding::UTF16LE => "UTF-16LE",
            Encoding::UTF16BE => "UTF-16BE",
        }
    }

    /// Codec family
    pub fn variant(self) -> EncodingVariant {
        match self {
            Encoding::UTF8 => EncodingVariant::Utf8,
            Encoding::UTF16 | Encoding::UTF16LE | Encoding::UTF16BE => EncodingVariant::Utf16,
        }
    }

    /// Byte order fixed by the encoding name, `Unknown` when it has none
    pub fn endianness(self) -> Endianness {
        match self {
            Encoding::UTF16LE => Endianness::Little,
            Encoding::UTF16BE => Endianness::Big,
            Encoding::UTF8 | Encoding::UTF16 => Endianness::Unknown,
        }
    }

    /// Byte order mark, if the encoding has a fixed one
    pub fn bom(self) -> Option<&'static [u8]> {
        match self {
            Encoding::UTF8 => Some(&utf8::BOM),
            Encoding::UTF16LE => Some(&utf16::BOM_LE),
            Encoding::UTF16BE => Some(&utf16::BOM_BE),
            Encoding::UTF16 => None,
        }
    }

    /// Byte order to read input in.
    ///
    /// A BOM found in the input (`detected`) wins, then the order the
    /// encoding name fixes, then `fallback`.
    pub fn source_endianness(self, detected: Endianness, fallback: Option<Endianness>) -> Endianness {
        if detected.is_known() {
            detected
        } else if self.endianness().is_known() {
            self.endianness()
        } else {
            fallback.unwrap_or(Endianness::Unknown)
        }
    }

    /// Consume the BOM at the start of a source in this encoding and settle
    /// the byte order to decode it in, per [`source_endianness`](Self::source_endianness).
    pub fn read_byte_order<C: ByteCursor + ?Sized>(
        self,
        cursor: &mut C,
        fallback: Option<Endianness>,
    ) -> Result<SourceByteOrder> {
        let decoder = Converter::for_encoding(self);
        let detected = decoder.check_bom(cursor).map_err(DecodeError::from)?;
        let endian = self.source_endianness(detected, fallback);
        if !decoder.endian_legal(endian) {
            return Err(Error::UnknownEndianness {
                encoding: self.name(),
            });
        }
        Ok(SourceByteOrder {
            endian,
            bom_detected: detected.is_known(),
        })
    }

    /// Byte order to write output in: the fixed one, else the host's
    pub fn target_endianness(self) -> Endianness {
        match self.endianness() {
            Endianness::Unknown => host_endianness(),
            endian => endian,
        }
    }
}

impl FromStr for Encoding {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let encoding = match s.to_ascii_uppercase().as_str() {
            "UTF8" | "UTF-8" => Encoding::UTF8,
            "UTF16" | "UTF-16" => Encoding::UTF16,
            "UTF16LE" | "UTF-16LE" => Encoding::UTF16LE,
            "UTF16BE" | "UTF-16BE" => Encoding::UTF16BE,
            _ => return Err(Error::UnknownEncoding(s.to_string())),
        };
        Ok(encoding)
    }
}

/// Byte order a source is decoded in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceByteOrder {
    /// Order to pass to the decoder
    pub endian: Endianness,
    /// Whether a BOM was found and consumed
    pub bom_detected: bool,
}

/// Options for a [`Transcoder`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TranscodeOptions {
    /// Start the output with the target encoding's BOM
    pub write_bom: bool,
    /// Byte order for UTF-16 input that has no BOM and no fixed order
    pub fallback_endianness: Option<Endianness>,
}

/// Summary of a finished transcoding job
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TranscodeReport {
    /// Code points converted
    pub code_points: usize,
    /// Input bytes consumed, BOM included
    pub bytes_read: usize,
    /// Output bytes written, BOM included
    pub bytes_written: usize,
    /// Whether the input started with a BOM
    pub bom_detected: bool,
    /// Whether a BOM was written
    pub bom_written: bool,
    /// Byte order the input was read in
    pub source_endianness: Endianness,
    /// Byte order the output was written in
    pub target_endianness: Endianness,
}

/// Converts text from one encoding to another
#[derive(Debug)]
pub struct Transcoder {
    from: Encoding,
    to: Encoding,
    decoder: Converter,
    encoder: Converter,
    options: TranscodeOptions,
}

impl Transcoder {
    /// Create a transcoder with default options
    pub fn new(from: Encoding, to: Encoding) -> Self {
        Self::with_options(from, to, TranscodeOptions::default())
    }

    /// Create a transcoder with explicit options
    pub fn with_options(from: Encoding, to: Encoding, options: TranscodeOptions) -> Self {
        Self {
            from,
            to,
            decoder: Converter::for_encoding(from),
            encoder: Converter::for_encoding(to),
            options,
        }
    }

    /// Get source encoding
    pub fn from_encoding(&self) -> Encoding {
        self.from
    }

    /// Get target encoding
    pub fn to_encoding(&self) -> Encoding {
        self.to
    }

    /// Get options
    pub fn options(&self) -> TranscodeOptions {
        self.options
    }

    /// Convert everything at `cursor` into `output`.
    ///
    /// The source BOM, if present, is consumed and decides the input byte
    /// order. Stops at the first decode, encode or I/O error; bytes already
    /// written stay written.
    pub fn transcode<C, W>(&self, mut cursor: C, output: &mut W) -> Result<TranscodeReport>
    where
        C: ByteCursor,
        W: Write + ?Sized,
    {
        let SourceByteOrder {
            endian: source,
            bom_detected,
        } = self
            .from
            .read_byte_order(&mut cursor, self.options.fallback_endianness)?;
        let target = self.to.target_endianness();

        let mut report = TranscodeReport {
            code_points: 0,
            bytes_read: 0,
            bytes_written: 0,
            bom_detected,
            bom_written: false,
            source_endianness: source,
            target_endianness: target,
        };

        if self.options.write_bom {
            let mut bom: Vec<u8> = Vec::with_capacity(3);
            self.encoder.write_bom(&mut bom, target)?;
            output.write_all(&bom)?;
            report.bytes_written += bom.len();
            report.bom_written = true;
        }

        for code_point in self.decoder.decode_all(&mut cursor, source) {
            let bytes = self.encoder.encode_one(code_point?, target)?;
            output.write_all(&bytes)?;
            report.code_points += 1;
            report.bytes_written += bytes.len();
        }

        report.bytes_read = cursor.position();
        Ok(report)
    }

    /// Convert an in-memory buffer
    pub fn convert(&self, input: &[u8]) -> Result<Vec<u8>> {
        let mut output = Vec::with_capacity(input.len() * 2);
        self.transcode(SliceCursor::new(input), &mut output)?;
        Ok(output)
    }

    /// Convert from a reader into a writer
    pub fn convert_stream<R, W>(&self, reader: R, writer: &mut W) -> Result<TranscodeReport>
    where
        R: Read,
        W: Write + ?Sized,
    {
        self.transcode(StreamCursor::new(reader), writer)
    }
}
