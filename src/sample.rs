//! Sample value conversion between on-disk encodings and in-memory types.
//!
//! On-disk representations are signed PCM at 8, 16, 24 or 32 bits and IEEE
//! float at 32 or 64 bits. In-memory values are `i16`, `f32` or `f64`.
//!
//! Scaling uses the signed maximum as the full-scale divisor (32767 for
//! 16-bit, 8388607 for 24-bit, and so on), not `2^(n-1)`. Decoding a float
//! payload to `i16` rounds half away from zero and clamps to the `i16`
//! range; encoding a float value to PCM truncates toward zero with a
//! saturating cast, which reproduces the reference byte corpus exactly.

use crate::error::{WavError, WavResult};
use crate::types::SampleEncoding;

/// Resolved on-disk sample layout: encoding plus width.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SampleLayout {
    /// 8-bit signed PCM
    Pcm8,
    /// 16-bit signed PCM
    Pcm16,
    /// 24-bit signed PCM, three bytes per sample
    Pcm24,
    /// 32-bit signed PCM
    Pcm32,
    /// IEEE 754 binary32
    F32,
    /// IEEE 754 binary64
    F64,
}

impl SampleLayout {
    /// Resolves an encoding/bit-depth pair to a concrete layout.
    pub fn from_format(encoding: SampleEncoding, bit_depth: u16) -> WavResult<Self> {
        match (encoding, bit_depth) {
            (SampleEncoding::IntegerPcm, 8) => Ok(SampleLayout::Pcm8),
            (SampleEncoding::IntegerPcm, 16) => Ok(SampleLayout::Pcm16),
            (SampleEncoding::IntegerPcm, 24) => Ok(SampleLayout::Pcm24),
            (SampleEncoding::IntegerPcm, 32) => Ok(SampleLayout::Pcm32),
            (SampleEncoding::IeeeFloat, 32) => Ok(SampleLayout::F32),
            (SampleEncoding::IeeeFloat, 64) => Ok(SampleLayout::F64),
            (encoding, bits) => Err(WavError::unsupported(format!(
                "{}-bit {} samples are not supported",
                bits, encoding
            ))),
        }
    }

    pub const fn bytes_per_sample(self) -> usize {
        match self {
            SampleLayout::Pcm8 => 1,
            SampleLayout::Pcm16 => 2,
            SampleLayout::Pcm24 => 3,
            SampleLayout::Pcm32 | SampleLayout::F32 => 4,
            SampleLayout::F64 => 8,
        }
    }

    pub const fn encoding(self) -> SampleEncoding {
        match self {
            SampleLayout::Pcm8
            | SampleLayout::Pcm16
            | SampleLayout::Pcm24
            | SampleLayout::Pcm32 => SampleEncoding::IntegerPcm,
            SampleLayout::F32 | SampleLayout::F64 => SampleEncoding::IeeeFloat,
        }
    }
}

// Full-scale divisors: the signed maximum of each PCM width.
const FULL_SCALE_8: f64 = 127.0;
const FULL_SCALE_16: f64 = 32_767.0;
const FULL_SCALE_24: f64 = 8_388_607.0;
const FULL_SCALE_32: f64 = 2_147_483_647.0;

/// Sign-extends a 3-byte little-endian PCM sample.
#[inline]
fn read_i24(bytes: &[u8]) -> i32 {
    (i32::from_le_bytes([bytes[0], bytes[1], bytes[2], 0]) << 8) >> 8
}

#[inline]
fn write_i24(value: i32, out: &mut [u8]) {
    out[..3].copy_from_slice(&value.to_le_bytes()[..3]);
}

/// Rounds half away from zero and clamps to the `i16` range.
#[inline]
fn round_to_i16(value: f64) -> i16 {
    value.round().clamp(-32_768.0, 32_767.0) as i16
}

/// In-memory sample value usable as a reader sink or writer source.
///
/// Implemented for `i16`, `f32` and `f64`.
pub trait Sample: Copy + Default + PartialEq + core::fmt::Debug + Send + Sync + 'static {
    /// Decodes one on-disk sample; `bytes` holds at least
    /// `layout.bytes_per_sample()` bytes.
    fn decode(bytes: &[u8], layout: SampleLayout) -> Self;

    /// Encodes into `out`, which holds exactly `layout.bytes_per_sample()`
    /// bytes.
    fn encode(self, layout: SampleLayout, out: &mut [u8]);
}

impl Sample for i16 {
    fn decode(bytes: &[u8], layout: SampleLayout) -> Self {
        match layout {
            SampleLayout::Pcm8 => (bytes[0] as i8 as i16) << 8,
            SampleLayout::Pcm16 => i16::from_le_bytes([bytes[0], bytes[1]]),
            SampleLayout::Pcm24 => (read_i24(bytes) >> 8) as i16,
            SampleLayout::Pcm32 => {
                (i32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]) >> 16) as i16
            }
            SampleLayout::F32 => {
                let raw = f32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]);
                round_to_i16(raw as f64 * FULL_SCALE_16)
            }
            SampleLayout::F64 => {
                let raw = f64::from_le_bytes([
                    bytes[0], bytes[1], bytes[2], bytes[3], bytes[4], bytes[5], bytes[6], bytes[7],
                ]);
                round_to_i16(raw * FULL_SCALE_16)
            }
        }
    }

    fn encode(self, layout: SampleLayout, out: &mut [u8]) {
        match layout {
            SampleLayout::Pcm8 => out[0] = (self >> 8) as i8 as u8,
            SampleLayout::Pcm16 => out[..2].copy_from_slice(&self.to_le_bytes()),
            SampleLayout::Pcm24 => write_i24((self as i32) << 8, out),
            SampleLayout::Pcm32 => {
                out[..4].copy_from_slice(&((self as i32) << 16).to_le_bytes())
            }
            SampleLayout::F32 => {
                let value = self as f64 / FULL_SCALE_16;
                out[..4].copy_from_slice(&(value as f32).to_le_bytes());
            }
            SampleLayout::F64 => {
                let value = self as f64 / FULL_SCALE_16;
                out[..8].copy_from_slice(&value.to_le_bytes());
            }
        }
    }
}

impl Sample for f32 {
    fn decode(bytes: &[u8], layout: SampleLayout) -> Self {
        match layout {
            SampleLayout::Pcm8 => (bytes[0] as i8 as f64 / FULL_SCALE_8) as f32,
            SampleLayout::Pcm16 => {
                (i16::from_le_bytes([bytes[0], bytes[1]]) as f64 / FULL_SCALE_16) as f32
            }
            SampleLayout::Pcm24 => (read_i24(bytes) as f64 / FULL_SCALE_24) as f32,
            SampleLayout::Pcm32 => {
                (i32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]) as f64
                    / FULL_SCALE_32) as f32
            }
            SampleLayout::F32 => f32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]),
            SampleLayout::F64 => f64::from_le_bytes([
                bytes[0], bytes[1], bytes[2], bytes[3], bytes[4], bytes[5], bytes[6], bytes[7],
            ]) as f32,
        }
    }

    fn encode(self, layout: SampleLayout, out: &mut [u8]) {
        match layout {
            SampleLayout::Pcm8 => {
                out[0] = ((self as f64 * FULL_SCALE_8) as i8) as u8;
            }
            SampleLayout::Pcm16 => {
                let value = (self as f64 * FULL_SCALE_16) as i16;
                out[..2].copy_from_slice(&value.to_le_bytes());
            }
            SampleLayout::Pcm24 => {
                let value = ((self as f64 * FULL_SCALE_24) as i64).clamp(-8_388_608, 8_388_607);
                write_i24(value as i32, out);
            }
            SampleLayout::Pcm32 => {
                let value = (self as f64 * FULL_SCALE_32) as i32;
                out[..4].copy_from_slice(&value.to_le_bytes());
            }
            SampleLayout::F32 => out[..4].copy_from_slice(&self.to_le_bytes()),
            SampleLayout::F64 => out[..8].copy_from_slice(&(self as f64).to_le_bytes()),
        }
    }
}

impl Sample for f64 {
    fn decode(bytes: &[u8], layout: SampleLayout) -> Self {
        match layout {
            SampleLayout::Pcm8 => bytes[0] as i8 as f64 / FULL_SCALE_8,
            SampleLayout::Pcm16 => i16::from_le_bytes([bytes[0], bytes[1]]) as f64 / FULL_SCALE_16,
            SampleLayout::Pcm24 => read_i24(bytes) as f64 / FULL_SCALE_24,
            SampleLayout::Pcm32 => {
                i32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]) as f64 / FULL_SCALE_32
            }
            SampleLayout::F32 => {
                f32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]) as f64
            }
            SampleLayout::F64 => f64::from_le_bytes([
                bytes[0], bytes[1], bytes[2], bytes[3], bytes[4], bytes[5], bytes[6], bytes[7],
            ]),
        }
    }

    fn encode(self, layout: SampleLayout, out: &mut [u8]) {
        match layout {
            SampleLayout::Pcm8 => out[0] = ((self * FULL_SCALE_8) as i8) as u8,
            SampleLayout::Pcm16 => {
                let value = (self * FULL_SCALE_16) as i16;
                out[..2].copy_from_slice(&value.to_le_bytes());
            }
            SampleLayout::Pcm24 => {
                let value = ((self * FULL_SCALE_24) as i64).clamp(-8_388_608, 8_388_607);
                write_i24(value as i32, out);
            }
            SampleLayout::Pcm32 => {
                let value = (self * FULL_SCALE_32) as i32;
                out[..4].copy_from_slice(&value.to_le_bytes());
            }
            SampleLayout::F32 => out[..4].copy_from_slice(&(self as f32).to_le_bytes()),
            SampleLayout::F64 => out[..8].copy_from_slice(&self.to_le_bytes()),
        }
    }
}

/// Decodes one frame from `bytes` into `out`.
///
/// Copies exactly `min(out.len(), channels)` values; elements past the
/// channel count are left untouched so callers can reuse one
/// maximum-channel buffer across files.
pub(crate) fn decode_frame<T: Sample>(
    bytes: &[u8],
    layout: SampleLayout,
    channels: usize,
    out: &mut [T],
) {
    let step = layout.bytes_per_sample();
    let count = out.len().min(channels);
    for (ch, slot) in out.iter_mut().take(count).enumerate() {
        *slot = T::decode(&bytes[ch * step..], layout);
    }
}

/// Encodes one frame from `values` into `bytes`.
///
/// Reads exactly `min(values.len(), channels)` input values; extra input is
/// ignored and missing trailing channels encode the default value.
pub(crate) fn encode_frame<T: Sample>(
    values: &[T],
    layout: SampleLayout,
    channels: usize,
    bytes: &mut [u8],
) {
    let step = layout.bytes_per_sample();
    for ch in 0..channels {
        let value = values.get(ch).copied().unwrap_or_default();
        value.encode(layout, &mut bytes[ch * step..(ch + 1) * step]);
    }
}
