use core::fmt::{Display, Formatter, Result as FmtResult};

use crate::error::{WavError, WavResult};

/// Per-sample widths this codec can carry.
pub const SUPPORTED_BIT_DEPTHS: [u16; 5] = [8, 16, 24, 32, 64];

/// Logical audio format of a stream, independent of which container variant
/// stored it.
///
/// Immutable once a reader or writer session is open. `bit_depth` is the
/// logical per-sample width in bits; 8, 16, 24 and 32 carry integer PCM,
/// 32 and 64 carry IEEE float.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FormatSpec {
    /// Number of audio channels, at least 1
    pub num_channels: u16,
    /// Sample rate in Hz, non-zero
    pub sample_rate: u32,
    /// Bits per sample (8, 16, 24, 32 or 64)
    pub bit_depth: u16,
}

impl FormatSpec {
    pub const fn new(num_channels: u16, sample_rate: u32, bit_depth: u16) -> Self {
        FormatSpec {
            num_channels,
            sample_rate,
            bit_depth,
        }
    }

    /// Check the field-range invariants a reader/writer session relies on.
    pub fn validate(&self) -> WavResult<()> {
        if self.num_channels == 0 {
            return Err(WavError::unsupported("channel count must be at least 1"));
        }
        if self.sample_rate == 0 {
            return Err(WavError::unsupported("sample rate must be non-zero"));
        }
        if !SUPPORTED_BIT_DEPTHS.contains(&self.bit_depth) {
            return Err(WavError::unsupported(format!(
                "unsupported bit depth: {}",
                self.bit_depth
            )));
        }
        // block align is a u16 on disk
        if self.frame_size() > u16::MAX as usize {
            return Err(WavError::unsupported(format!(
                "frame size {} exceeds the container's block align field",
                self.frame_size()
            )));
        }
        Ok(())
    }

    pub const fn bytes_per_sample(&self) -> usize {
        (self.bit_depth / 8) as usize
    }

    /// Byte size of one frame (all channels), a.k.a. block align.
    pub const fn frame_size(&self) -> usize {
        self.num_channels as usize * self.bytes_per_sample()
    }
}

impl Display for FormatSpec {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(
            f,
            "{} Hz, {} ch, {}-bit",
            self.sample_rate, self.num_channels, self.bit_depth
        )
    }
}

/// Numeric interpretation of the on-disk sample payload.
///
/// Derived from the `fmt ` chunk's format code or, for the extensible
/// variant, from the leading four bytes of the sub-format GUID.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SampleEncoding {
    /// Signed linear PCM
    IntegerPcm,
    /// IEEE 754 float
    IeeeFloat,
}

impl SampleEncoding {
    pub const fn as_str(self) -> &'static str {
        match self {
            SampleEncoding::IntegerPcm => "PCM",
            SampleEncoding::IeeeFloat => "IEEE_FLOAT",
        }
    }
}

impl Display for SampleEncoding {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.as_str())
    }
}
