//! 64-bit size overlay for RF64 containers.
//!
//! RF64 keeps the classic 32-bit chunk layout but stores `0xFFFFFFFF` in any
//! size field that overflows and carries the true 64-bit values in a `ds64`
//! chunk, which must be the first chunk after the 12-byte container header.

use crate::error::{WavError, WavResult};

/// 32-bit size value that redirects to the `ds64` overlay.
pub const SIZE_SENTINEL: u32 = 0xFFFF_FFFF;

/// Fixed-size prefix of a `ds64` payload.
pub const DS64_FIXED_SIZE: usize = 28;

/// Which 64-bit override a sentinel size resolves to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SizeKind {
    /// RIFF-level size at offset 4
    Riff,
    /// `data` chunk payload size
    Data,
    /// `fact` chunk per-channel sample count
    SampleCount,
}

/// True sizes captured from a parsed `ds64` chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Ds64Overrides {
    pub riff_size: u64,
    pub data_size: u64,
    pub sample_count: u64,
    /// Entry count of the optional per-chunk size table. Anything non-zero
    /// is an extension this codec rejects.
    pub table_entry_count: u32,
}

impl Ds64Overrides {
    /// Parses the fixed 28-byte prefix of a `ds64` payload. `offset` is the
    /// payload's position in the stream, for error reporting.
    pub fn parse(payload: &[u8], offset: u64) -> WavResult<Self> {
        if payload.len() < DS64_FIXED_SIZE {
            return Err(WavError::structural(
                format!("ds64 chunk payload is {} bytes, need 28", payload.len()),
                offset,
            ));
        }

        let le_u64 = |range: core::ops::Range<usize>| {
            let mut buf = [0u8; 8];
            buf.copy_from_slice(&payload[range]);
            u64::from_le_bytes(buf)
        };

        let overrides = Ds64Overrides {
            riff_size: le_u64(0..8),
            data_size: le_u64(8..16),
            sample_count: le_u64(16..24),
            table_entry_count: u32::from_le_bytes([
                payload[24],
                payload[25],
                payload[26],
                payload[27],
            ]),
        };

        if overrides.table_entry_count != 0 {
            return Err(WavError::unsupported(format!(
                "ds64 size table with {} entries is not supported",
                overrides.table_entry_count
            )));
        }

        Ok(overrides)
    }

    pub const fn field(&self, kind: SizeKind) -> u64 {
        match kind {
            SizeKind::Riff => self.riff_size,
            SizeKind::Data => self.data_size,
            SizeKind::SampleCount => self.sample_count,
        }
    }
}

/// Widens a 32-bit on-disk size to 64 bits.
///
/// Non-sentinel values pass through unchanged. The sentinel resolves to the
/// matching `ds64` override, and is a Structural error when no `ds64` chunk
/// preceded it. Callers engage this only for RF64 containers; in classic
/// RIFF the sentinel is an ordinary (if improbable) size.
pub fn resolve_size(
    raw: u32,
    kind: SizeKind,
    overrides: Option<&Ds64Overrides>,
    offset: u64,
) -> WavResult<u64> {
    if raw != SIZE_SENTINEL {
        return Ok(raw as u64);
    }
    match overrides {
        Some(ov) => Ok(ov.field(kind)),
        None => Err(WavError::structural(
            "sentinel size with no preceding ds64 chunk",
            offset,
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ds64_payload(riff: u64, data: u64, samples: u64, table: u32) -> Vec<u8> {
        let mut buf = Vec::with_capacity(28);
        buf.extend_from_slice(&riff.to_le_bytes());
        buf.extend_from_slice(&data.to_le_bytes());
        buf.extend_from_slice(&samples.to_le_bytes());
        buf.extend_from_slice(&table.to_le_bytes());
        buf
    }

    #[test]
    fn test_parse_ds64() {
        let payload = ds64_payload(0x1_0000_0024, 0x1_0000_0000, 0x4000_0000, 0);
        let ov = Ds64Overrides::parse(&payload, 20).unwrap();
        assert_eq!(ov.riff_size, 0x1_0000_0024);
        assert_eq!(ov.data_size, 0x1_0000_0000);
        assert_eq!(ov.sample_count, 0x4000_0000);
    }

    #[test]
    fn test_parse_ds64_rejects_table_entries() {
        let payload = ds64_payload(100, 50, 10, 2);
        let err = Ds64Overrides::parse(&payload, 20).unwrap_err();
        assert!(matches!(err, WavError::UnsupportedFormat(_)));
    }

    #[test]
    fn test_parse_ds64_rejects_short_payload() {
        let err = Ds64Overrides::parse(&[0u8; 20], 20).unwrap_err();
        assert!(matches!(err, WavError::Structural { .. }));
    }

    #[test]
    fn test_resolve_passthrough() {
        assert_eq!(resolve_size(1234, SizeKind::Data, None, 0).unwrap(), 1234);
        // Non-sentinel values never consult the overrides
        let ov = Ds64Overrides {
            data_size: 99,
            ..Default::default()
        };
        assert_eq!(
            resolve_size(1234, SizeKind::Data, Some(&ov), 0).unwrap(),
            1234
        );
    }

    #[test]
    fn test_resolve_sentinel_with_overrides() {
        let payload = ds64_payload(0x2_0000_0000, 0x1_FFFF_FFDC, 7, 0);
        let ov = Ds64Overrides::parse(&payload, 20).unwrap();
        assert_eq!(
            resolve_size(SIZE_SENTINEL, SizeKind::Riff, Some(&ov), 4).unwrap(),
            0x2_0000_0000
        );
        assert_eq!(
            resolve_size(SIZE_SENTINEL, SizeKind::Data, Some(&ov), 40).unwrap(),
            0x1_FFFF_FFDC
        );
        assert_eq!(
            resolve_size(SIZE_SENTINEL, SizeKind::SampleCount, Some(&ov), 48).unwrap(),
            7
        );
    }

    #[test]
    fn test_resolve_sentinel_without_ds64_fails() {
        let err = resolve_size(SIZE_SENTINEL, SizeKind::Data, None, 40).unwrap_err();
        assert!(err.to_string().contains("no preceding ds64"));
    }
}
