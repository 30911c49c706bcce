//! Little-endian primitives over byte streams.
//!
//! Every multi-byte integer in a RIFF/RF64 container is little-endian on
//! disk; `from_le_bytes`/`to_le_bytes` normalise them on any host, so these
//! helpers are the only place byte order is handled.

use std::io::{self, Read, Write};

/// Extension trait for reading little-endian container fields.
pub(crate) trait ReadLe: Read {
    /// Reads a 4-byte tag, or `None` if the stream ends cleanly before the
    /// first byte. Ending mid-tag is an `UnexpectedEof` error.
    fn read_tag_or_eof(&mut self) -> io::Result<Option<[u8; 4]>> {
        let mut tag = [0u8; 4];
        let mut filled = 0;
        while filled < 4 {
            let n = self.read(&mut tag[filled..])?;
            if n == 0 {
                if filled == 0 {
                    return Ok(None);
                }
                return Err(io::Error::new(
                    io::ErrorKind::UnexpectedEof,
                    "stream ended inside a chunk tag",
                ));
            }
            filled += n;
        }
        Ok(Some(tag))
    }

    fn read_tag(&mut self) -> io::Result<[u8; 4]> {
        let mut buf = [0u8; 4];
        self.read_exact(&mut buf)?;
        Ok(buf)
    }

    fn read_le_u16(&mut self) -> io::Result<u16> {
        let mut buf = [0u8; 2];
        self.read_exact(&mut buf)?;
        Ok(u16::from_le_bytes(buf))
    }

    fn read_le_u32(&mut self) -> io::Result<u32> {
        let mut buf = [0u8; 4];
        self.read_exact(&mut buf)?;
        Ok(u32::from_le_bytes(buf))
    }

    /// Discards exactly `n` bytes, erroring with `UnexpectedEof` if the
    /// stream ends first. Used to advance past skipped chunk payloads on
    /// sources that cannot seek.
    fn skip_bytes(&mut self, mut n: u64) -> io::Result<()> {
        let mut scratch = [0u8; 512];
        while n > 0 {
            let want = n.min(scratch.len() as u64) as usize;
            let got = self.read(&mut scratch[..want])?;
            if got == 0 {
                return Err(io::Error::new(
                    io::ErrorKind::UnexpectedEof,
                    "stream ended inside a skipped chunk",
                ));
            }
            n -= got as u64;
        }
        Ok(())
    }
}

impl<R: Read + ?Sized> ReadLe for R {}

/// Extension trait for writing little-endian container fields.
pub(crate) trait WriteLe: Write {
    fn write_tag(&mut self, tag: &[u8; 4]) -> io::Result<()> {
        self.write_all(tag)
    }

    fn write_le_u16(&mut self, value: u16) -> io::Result<()> {
        self.write_all(&value.to_le_bytes())
    }

    fn write_le_u32(&mut self, value: u32) -> io::Result<()> {
        self.write_all(&value.to_le_bytes())
    }
}

impl<W: Write + ?Sized> WriteLe for W {}
