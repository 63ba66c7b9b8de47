//! Encoding detection from a byte-order mark or, failing that, from how the
//! bytes decode.

use serde::Serialize;

use crate::cursor::{ByteCursor, SliceCursor};
use crate::{Converter, DecodeError, Encoding, EncodingVariant, Endianness, utf8};

/// Result of encoding detection with confidence score
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DetectionResult {
    /// Most likely encoding, `None` if the data fits none of them
    pub encoding: Option<Encoding>,
    /// Confidence score (0.0 to 1.0)
    pub confidence: f64,
    /// Whether a BOM was detected
    pub bom_detected: bool,
    /// All candidate encodings with their scores, best first
    pub candidates: Vec<(Encoding, f64)>,
}

/// Encoding detector looking at the first bytes of the input
#[derive(Debug, Clone)]
pub struct EncodingDetector {
    /// Maximum bytes to analyze for detection
    max_sample_size: usize,
}

impl Default for EncodingDetector {
    fn default() -> Self {
        Self {
            max_sample_size: 8192,
        }
    }
}

impl EncodingDetector {
    /// Create a new encoding detector
    pub fn new() -> Self {
        Self::default()
    }

    /// Create detector with custom sample size
    pub fn with_sample_size(max_sample_size: usize) -> Self {
        Self { max_sample_size }
    }

    /// Detect encoding of the given data
    pub fn detect(&self, data: &[u8]) -> DetectionResult {
        let truncated = data.len() > self.max_sample_size;
        let sample = &data[..data.len().min(self.max_sample_size)];

        if let Some(encoding) = detect_bom(sample) {
            return DetectionResult {
                encoding: Some(encoding),
                confidence: 1.0,
                bom_detected: true,
                candidates: vec![(encoding, 1.0)],
            };
        }

        let mut candidates = Vec::new();
        if let Some(confidence) = detect_utf8(sample, truncated) {
            candidates.push((Encoding::UTF8, confidence));
        }
        if let Some((encoding, confidence)) = detect_utf16(sample, truncated) {
            candidates.push((encoding, confidence));
        }
        candidates.sort_by(|a, b| b.1.total_cmp(&a.1));

        let best = candidates.first().copied();
        DetectionResult {
            encoding: best.map(|(encoding, _)| encoding),
            confidence: best.map_or(0.0, |(_, confidence)| confidence),
            bom_detected: false,
            candidates,
        }
    }
}

/// Encoding named by a leading BOM
fn detect_bom(sample: &[u8]) -> Option<Encoding> {
    let utf8 = Converter::new(EncodingVariant::Utf8);
    if utf8.check_bom(&mut SliceCursor::new(sample)).ok()?.is_known() {
        return Some(Encoding::UTF8);
    }

    let utf16 = Converter::new(EncodingVariant::Utf16);
    match utf16.check_bom(&mut SliceCursor::new(sample)).ok()? {
        Endianness::Little => Some(Encoding::UTF16LE),
        Endianness::Big => Some(Encoding::UTF16BE),
        Endianness::Unknown => None,
    }
}

/// Score UTF-8 by the share of multi-byte sequences; `None` if the sample
/// does not decode. Pure ASCII scores low since it fits many encodings.
fn detect_utf8(sample: &[u8], truncated: bool) -> Option<f64> {
    let mut cursor = SliceCursor::new(sample);
    let mut sequences = 0usize;
    let mut multibyte = 0usize;

    loop {
        let start = cursor.position();
        match utf8::decode_one(&mut cursor) {
            Ok(Some(_)) => {
                sequences += 1;
                if cursor.position() - start > 1 {
                    multibyte += 1;
                }
            }
            Ok(None) => break,
            // sequence cut by the sample limit
            Err(DecodeError::UnexpectedEndOfInput { .. }) if truncated => break,
            Err(_) => return None,
        }
    }

    if sequences == 0 {
        return None;
    }
    if multibyte == 0 {
        return Some(0.5);
    }
    Some(0.7 + (multibyte as f64 / sequences as f64) * 0.3)
}

/// Score UTF-16 by where the zero bytes sit in each unit. Text in the Latin
/// range has a zero high byte, which lands second in little endian and first
/// in big endian.
fn detect_utf16(sample: &[u8], truncated: bool) -> Option<(Encoding, f64)> {
    if sample.len() < 2 || (sample.len() % 2 != 0 && !truncated) {
        return None;
    }
    let even = &sample[..sample.len() & !1];

    let mut le_score = 0.0;
    let mut be_score = 0.0;
    let mut units = 0;
    for chunk in even.chunks_exact(2) {
        units += 1;
        match (chunk[0], chunk[1]) {
            (0, 0) => {}
            (_, 0) => le_score += 1.0,
            (0, _) => be_score += 1.0,
            _ => {}
        }
    }
    le_score /= units as f64;
    be_score /= units as f64;

    let (encoding, endian, score) = if le_score > be_score {
        (Encoding::UTF16LE, Endianness::Little, le_score)
    } else if be_score > le_score {
        (Encoding::UTF16BE, Endianness::Big, be_score)
    } else {
        return None;
    };
    if score < 0.3 {
        return None;
    }

    let decodes = Converter::new(EncodingVariant::Utf16)
        .decode_all(SliceCursor::new(even), endian)
        .all(|result| match result {
            Ok(_) => true,
            Err(DecodeError::UnexpectedEndOfInput { .. }) => truncated,
            Err(_) => false,
        });
    decodes.then_some((encoding, score * 0.9))
}
