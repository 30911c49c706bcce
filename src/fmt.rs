//! `fmt ` chunk parsing and sample-encoding resolution.

use core::fmt::{Display, Formatter, Result as FmtResult};

use crate::error::{WavError, WavResult};
use crate::types::{FormatSpec, SampleEncoding};

/// WAV format codes (wFormatTag)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum FormatCode {
    /// PCM (uncompressed)
    Pcm,
    /// IEEE Float
    IeeeFloat,
    /// WAVE_FORMAT_EXTENSIBLE
    Extensible,
    /// Unknown or unsupported format
    Unknown(u16),
}

impl FormatCode {
    /// Canonical numeric WAV format tag
    pub const fn as_u16(self) -> u16 {
        match self {
            FormatCode::Pcm => 0x0001,
            FormatCode::IeeeFloat => 0x0003,
            FormatCode::Extensible => 0xFFFE,
            FormatCode::Unknown(code) => code,
        }
    }

    pub const fn const_from(code: u16) -> Self {
        match code {
            0x0001 => FormatCode::Pcm,
            0x0003 => FormatCode::IeeeFloat,
            0xFFFE => FormatCode::Extensible,
            other => FormatCode::Unknown(other),
        }
    }

    /// Short symbolic name
    pub const fn as_str(self) -> &'static str {
        match self {
            FormatCode::Pcm => "PCM",
            FormatCode::IeeeFloat => "IEEE_FLOAT",
            FormatCode::Extensible => "EXTENSIBLE",
            FormatCode::Unknown(_) => "UNKNOWN",
        }
    }
}

impl From<u16> for FormatCode {
    fn from(code: u16) -> Self {
        FormatCode::const_from(code)
    }
}

impl From<FormatCode> for u16 {
    fn from(val: FormatCode) -> Self {
        val.as_u16()
    }
}

impl Display for FormatCode {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            FormatCode::Unknown(code) => write!(f, "UNKNOWN(0x{:04X})", code),
            other => write!(f, "{}", other.as_str()),
        }
    }
}

/// GUID tail shared by every registered WAV sub-format; the leading four
/// bytes carry the format code.
pub const SUBFORMAT_GUID_TAIL: [u8; 12] = [
    0x00, 0x00, 0x10, 0x00, 0x80, 0x00, 0x00, 0xAA, 0x00, 0x38, 0x9B, 0x71,
];

/// Extended fields of a WAVE_FORMAT_EXTENSIBLE `fmt ` chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FmtExtension {
    /// Valid bits per sample (may be less than the container width)
    pub valid_bits_per_sample: u16,
    /// Channel mask indicating speaker positions
    pub channel_mask: u32,
    /// 16-byte sub-format GUID; the leading 4 bytes select the encoding
    pub sub_format: [u8; 16],
}

impl FmtExtension {
    /// Resolves the sub-format GUID to a sample encoding. Only the leading
    /// four bytes are consulted; bit depth always comes from the base
    /// `bits_per_sample` field, not the GUID.
    pub fn encoding(&self) -> WavResult<SampleEncoding> {
        let code = u32::from_le_bytes([
            self.sub_format[0],
            self.sub_format[1],
            self.sub_format[2],
            self.sub_format[3],
        ]);
        match code {
            1 => Ok(SampleEncoding::IntegerPcm),
            3 => Ok(SampleEncoding::IeeeFloat),
            other => Err(WavError::unsupported(format!(
                "unknown sub-format GUID code 0x{:08X}",
                other
            ))),
        }
    }
}

/// Parsed `fmt ` chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FmtChunk {
    pub format_code: FormatCode,
    pub num_channels: u16,
    pub sample_rate: u32,
    /// Read but never relied upon; derivable from the other fields
    pub byte_rate: u32,
    pub block_align: u16,
    pub bits_per_sample: u16,
    /// Present iff `format_code` is `Extensible`
    pub extension: Option<FmtExtension>,
}

impl FmtChunk {
    /// Parses a `fmt ` chunk payload.
    ///
    /// Accepted payload sizes: 16, or 18 with an ignored zero extension-size
    /// field, for plain PCM/float; at least 40 with an extension size of at
    /// least 22 for the extensible variant. `offset` is the payload's
    /// position in the stream, for error reporting.
    pub fn from_bytes(bytes: &[u8], offset: u64) -> WavResult<Self> {
        if bytes.len() < 16 {
            return Err(WavError::structural(
                format!("fmt chunk payload is {} bytes, need at least 16", bytes.len()),
                offset,
            ));
        }

        let format_code = FormatCode::const_from(u16::from_le_bytes([bytes[0], bytes[1]]));
        let num_channels = u16::from_le_bytes([bytes[2], bytes[3]]);
        let sample_rate = u32::from_le_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]);
        let byte_rate = u32::from_le_bytes([bytes[8], bytes[9], bytes[10], bytes[11]]);
        let block_align = u16::from_le_bytes([bytes[12], bytes[13]]);
        let bits_per_sample = u16::from_le_bytes([bytes[14], bytes[15]]);

        let extension = match format_code {
            FormatCode::Extensible => {
                if bytes.len() < 40 {
                    return Err(WavError::structural(
                        format!(
                            "extensible fmt chunk payload is {} bytes, need at least 40",
                            bytes.len()
                        ),
                        offset,
                    ));
                }
                let extension_size = u16::from_le_bytes([bytes[16], bytes[17]]);
                if extension_size < 22 {
                    return Err(WavError::structural(
                        format!("fmt extension size is {}, need at least 22", extension_size),
                        offset + 16,
                    ));
                }
                let mut sub_format = [0u8; 16];
                sub_format.copy_from_slice(&bytes[24..40]);
                Some(FmtExtension {
                    valid_bits_per_sample: u16::from_le_bytes([bytes[18], bytes[19]]),
                    channel_mask: u32::from_le_bytes([bytes[20], bytes[21], bytes[22], bytes[23]]),
                    sub_format,
                })
            }
            _ => {
                // 18-byte base form carries an extension-size field of 0;
                // the field is ignored either way.
                None
            }
        };

        Ok(FmtChunk {
            format_code,
            num_channels,
            sample_rate,
            byte_rate,
            block_align,
            bits_per_sample,
            extension,
        })
    }

    /// Resolves the sample encoding from the format code or, for the
    /// extensible variant, the sub-format GUID.
    pub fn encoding(&self) -> WavResult<SampleEncoding> {
        match self.format_code {
            FormatCode::Pcm => Ok(SampleEncoding::IntegerPcm),
            FormatCode::IeeeFloat => Ok(SampleEncoding::IeeeFloat),
            FormatCode::Extensible => match &self.extension {
                Some(ext) => ext.encoding(),
                None => Err(WavError::structural(
                    "extensible fmt chunk without extension fields",
                    0,
                )),
            },
            FormatCode::Unknown(code) => Err(WavError::unsupported(format!(
                "unknown audio format code 0x{:04X}",
                code
            ))),
        }
    }

    /// Checks the consistency invariants the reader relies on. `offset` is
    /// the chunk payload's stream position, for error reporting.
    pub fn validate(&self, offset: u64) -> WavResult<()> {
        let expected_block_align = self.num_channels as u32 * (self.bits_per_sample as u32 / 8);
        if self.block_align as u32 != expected_block_align {
            return Err(WavError::structural(
                format!(
                    "block align {} does not match channels {} * {} bytes per sample",
                    self.block_align,
                    self.num_channels,
                    self.bits_per_sample / 8
                ),
                offset + 12,
            ));
        }
        Ok(())
    }

    pub const fn format_spec(&self) -> FormatSpec {
        FormatSpec::new(self.num_channels, self.sample_rate, self.bits_per_sample)
    }
}

impl Display for FmtChunk {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(
            f,
            "FmtChunk {{ format: {}, channels: {}, sample_rate: {}, byte_rate: {}, block_align: {}, bits_per_sample: {} }}",
            self.format_code,
            self.num_channels,
            self.sample_rate,
            self.byte_rate,
            self.block_align,
            self.bits_per_sample
        )
    }
}
