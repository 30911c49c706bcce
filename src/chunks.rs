//! Top-level RIFF/RF64 structure and sub-chunk headers.

use core::fmt::{Display, Formatter, Result as FmtResult};
use std::io::Read;

use crate::bytes::ReadLe;
use crate::error::{WavError, WavResult};

/// FourCC chunk identifier wrapper -- does not own the data
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ChunkId {
    pub id: [u8; 4],
}

impl ChunkId {
    #[inline]
    pub const fn new(id: &[u8; 4]) -> Self {
        ChunkId { id: *id }
    }

    #[inline]
    pub const fn as_bytes(&self) -> &[u8; 4] {
        &self.id
    }

    #[inline]
    pub fn as_str(&self) -> Option<&str> {
        core::str::from_utf8(&self.id).ok()
    }
}

impl AsRef<[u8]> for ChunkId {
    #[inline]
    fn as_ref(&self) -> &[u8] {
        &self.id
    }
}

impl From<&[u8; 4]> for ChunkId {
    fn from(value: &[u8; 4]) -> Self {
        ChunkId { id: *value }
    }
}

impl Display for ChunkId {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match core::str::from_utf8(&self.id) {
            Ok(s) => write!(f, "{}", s),
            Err(_) => write!(
                f,
                "0x{:02X}{:02X}{:02X}{:02X}",
                self.id[0], self.id[1], self.id[2], self.id[3]
            ),
        }
    }
}

pub const RIFF_ID: ChunkId = ChunkId::new(b"RIFF");
pub const RF64_ID: ChunkId = ChunkId::new(b"RF64");
pub const WAVE_ID: ChunkId = ChunkId::new(b"WAVE");
pub const FMT_ID: ChunkId = ChunkId::new(b"fmt ");
pub const DATA_ID: ChunkId = ChunkId::new(b"data");
pub const FACT_ID: ChunkId = ChunkId::new(b"fact");
pub const DS64_ID: ChunkId = ChunkId::new(b"ds64");

/// Top-level container variant, from the first four bytes of the stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContainerKind {
    /// Classic container with 32-bit size fields
    Riff,
    /// 64-bit extension; sentinel sizes redirect to the `ds64` chunk
    Rf64,
}

impl Display for ContainerKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            ContainerKind::Riff => write!(f, "RIFF"),
            ContainerKind::Rf64 => write!(f, "RF64"),
        }
    }
}

/// Header of one sub-chunk with its size already widened to 64 bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkHeader {
    pub id: ChunkId,
    /// Resolved payload size
    pub size: u64,
    /// The 32-bit size field as stored on disk
    pub raw_size: u32,
}

impl ChunkHeader {
    /// Bytes to advance past the payload, including the trailing pad byte.
    /// Evenness is judged on the raw 32-bit field, never the resolved size.
    #[inline]
    pub const fn skip_distance(&self) -> u64 {
        self.size + (self.raw_size & 1) as u64
    }
}

/// Reads and validates the 12-byte container header.
///
/// # Returns
///
/// The container kind and the raw 32-bit RIFF-level size (possibly the
/// sentinel for RF64).
pub(crate) fn read_container_header<R: Read>(source: &mut R) -> WavResult<(ContainerKind, u32)> {
    let top = ChunkId::new(
        &source
            .read_tag()
            .map_err(|e| WavError::from_header_io(e, "the container id", 0))?,
    );
    let kind = if top == RIFF_ID {
        ContainerKind::Riff
    } else if top == RF64_ID {
        ContainerKind::Rf64
    } else {
        return Err(WavError::structural(
            format!("stream does not start with RIFF or RF64 (found '{}')", top),
            0,
        ));
    };

    let riff_size = source
        .read_le_u32()
        .map_err(|e| WavError::from_header_io(e, "the RIFF size field", 4))?;

    let format = ChunkId::new(
        &source
            .read_tag()
            .map_err(|e| WavError::from_header_io(e, "the WAVE id", 8))?,
    );
    if format != WAVE_ID {
        return Err(WavError::structural(
            format!("container format id is not WAVE (found '{}')", format),
            8,
        ));
    }

    Ok((kind, riff_size))
}

/// Reads the next `(id, raw 32-bit size)` pair, or `None` at a clean end of
/// stream. Ending mid-header is a Structural error.
pub(crate) fn read_chunk_header<R: Read>(
    source: &mut R,
    offset: u64,
) -> WavResult<Option<(ChunkId, u32)>> {
    let Some(tag) = source
        .read_tag_or_eof()
        .map_err(|e| WavError::from_header_io(e, "a chunk id", offset))?
    else {
        return Ok(None);
    };
    let raw_size = source
        .read_le_u32()
        .map_err(|e| WavError::from_header_io(e, "a chunk size field", offset + 4))?;
    Ok(Some((ChunkId::new(&tag), raw_size)))
}
