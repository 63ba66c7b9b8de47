//! Byte order of 16-bit code units and of the host.

use serde::Serialize;

/// Byte order of a multi-byte unit
///
/// `Unknown` is what BOM detection reports when no mark is present. It is a
/// legal answer to "which order is this input in?" but never a legal
/// operating mode for UTF-16.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Endianness {
    /// Most significant byte first
    Big,
    /// Least significant byte first
    Little,
    /// No byte order could be determined
    Unknown,
}

impl Endianness {
    /// Short human-readable label
    pub fn name(self) -> &'static str {
        match self {
            Endianness::Big => "big-endian",
            Endianness::Little => "little-endian",
            Endianness::Unknown => "unknown",
        }
    }

    /// `true` for `Big` and `Little`
    pub fn is_known(self) -> bool {
        !matches!(self, Endianness::Unknown)
    }
}

/// Native byte order of the platform this code runs on.
///
/// Never returns [`Endianness::Unknown`].
pub const fn host_endianness() -> Endianness {
    match u16::from_ne_bytes([0x12, 0x34]) {
        0x1234 => Endianness::Big,
        _ => Endianness::Little,
    }
}
